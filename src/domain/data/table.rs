// データセット（不変の数値テーブル）

use anyhow::{anyhow, Result};

use super::variable::Variable;

/// 不変の数値テーブル。列指向で保持し、NaNを欠損として扱う。
///
/// 探索の実行中は読み取り専用であり、部分集合の行列化と
/// 有効行マスクの計算だけを提供する。
#[derive(Clone, Debug)]
pub struct Dataset {
    variables: Vec<Variable>,
    columns: Vec<Vec<f64>>,
    n_rows: usize,
}

impl Dataset {
    pub fn new(variables: Vec<Variable>, columns: Vec<Vec<f64>>) -> Result<Self> {
        if variables.len() != columns.len() {
            return Err(anyhow!(
                "変数数と列数が一致しません: {} != {}",
                variables.len(),
                columns.len()
            ));
        }
        let n_rows = columns.first().map(|c| c.len()).unwrap_or(0);
        if columns.iter().any(|c| c.len() != n_rows) {
            return Err(anyhow!("全列の行数が一致していません"));
        }
        for (i, v) in variables.iter().enumerate() {
            if variables[..i].iter().any(|u| u.name() == v.name()) {
                return Err(anyhow!("変数名が重複しています: {}", v.name()));
            }
        }
        Ok(Self {
            variables,
            columns,
            n_rows,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// 名前から列インデックスを引く
    pub fn variable_index(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v.name() == name)
    }

    pub fn column(&self, index: usize) -> &[f64] {
        &self.columns[index]
    }

    /// 指定列すべてに欠損のない行のマスクを返す
    pub fn valid_mask(&self, indices: &[usize]) -> Vec<bool> {
        (0..self.n_rows)
            .map(|r| indices.iter().all(|&c| self.columns[c][r].is_finite()))
            .collect()
    }

    /// 指定列（順序保持）をマスクの真の行だけ行優先で取り出す
    pub fn select_rows(&self, indices: &[usize], mask: &[bool]) -> Vec<Vec<f64>> {
        (0..self.n_rows)
            .filter(|&r| mask[r])
            .map(|r| indices.iter().map(|&c| self.columns[c][r]).collect())
            .collect()
    }

    /// 単一列をマスクの真の行だけ取り出す
    pub fn select_column(&self, index: usize, mask: &[bool]) -> Vec<f64> {
        (0..self.n_rows)
            .filter(|&r| mask[r])
            .map(|r| self.columns[index][r])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(
            vec![
                Variable::continuous("a"),
                Variable::continuous("b"),
                Variable::discrete("y"),
            ],
            vec![
                vec![1.0, 2.0, f64::NAN, 4.0],
                vec![0.5, f64::NAN, 1.5, 2.0],
                vec![0.0, 1.0, 0.0, 1.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn rejects_mismatched_columns() {
        let result = Dataset::new(
            vec![Variable::continuous("a")],
            vec![vec![1.0], vec![2.0]],
        );
        assert!(result.is_err());

        let result = Dataset::new(
            vec![Variable::continuous("a"), Variable::continuous("b")],
            vec![vec![1.0, 2.0], vec![3.0]],
        );
        assert!(result.is_err());
    }

    #[test]
    fn rejects_duplicate_names() {
        let result = Dataset::new(
            vec![Variable::continuous("a"), Variable::discrete("a")],
            vec![vec![1.0], vec![2.0]],
        );
        assert!(result.is_err());
    }

    #[test]
    fn valid_mask_excludes_missing_rows() {
        let ds = sample();
        assert_eq!(ds.valid_mask(&[0, 1, 2]), vec![true, false, false, true]);
        assert_eq!(ds.valid_mask(&[0, 2]), vec![true, true, false, true]);
    }

    #[test]
    fn select_rows_keeps_column_order() {
        let ds = sample();
        let mask = ds.valid_mask(&[0, 1, 2]);
        let rows = ds.select_rows(&[1, 0], &mask);
        assert_eq!(rows, vec![vec![0.5, 1.0], vec![2.0, 4.0]]);
        assert_eq!(ds.select_column(2, &mask), vec![0.0, 1.0]);
    }

    #[test]
    fn variable_lookup_by_name() {
        let ds = sample();
        assert_eq!(ds.variable_index("b"), Some(1));
        assert_eq!(ds.variable_index("missing"), None);
    }
}
