// ランキング探索エンジン（協調的な逐次実行）

use crossbeam_channel::Sender;
use num_bigint::BigUint;
use num_traits::Zero;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::constants::{
    MAX_SUBSET_SIZE, MIN_SUBSET_SIZE, MIN_VALID_ROWS, PRERANK_ITERATIONS, PRERANK_NEIGHBORS,
    UNSCORABLE_SCORE,
};
use crate::domain::data::{Dataset, VarKind, Variable};
use crate::domain::scoring::{ranked_order, relieff_weights, rrelieff_weights};
use crate::domain::search::{
    total_states, CheckpointMismatch, PreconditionError, RankConfig, ScoredState,
    SearchCheckpoint, StateEnumerator, SubsetSize,
};
use crate::infrastructure::storage::{CheckpointStore, MemoryCheckpointStore};
use crate::vlog;

use super::evaluator::ProjectionEvaluator;
use super::event::{RankEvent, RankProgress};
use super::leaderboard::{Leaderboard, RankedResult};
use crate::application::progress::ProgressManager;

/// step()の結果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// 続行中（評価済み状態数）
    Continuing(u64),
    /// 列挙が尽きた（または実行中でない）
    Finished,
}

/// エンジンの実行状態
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineStatus {
    Idle,
    Running,
    Paused,
    Finished,
}

/// ランキング探索エンジン
///
/// 外部の駆動側が`step()`を繰り返し呼ぶ協調モデルで動く。1ステップは
/// 列挙器から次の状態を取り出して評価し切るまで中断しない。
/// リーダーボードとチェックポイントはこのエンジンだけが変更する。
pub struct RankSearchEngine {
    config: RankConfig,
    dataset: Option<Arc<Dataset>>,
    target: Option<Variable>,
    target_column: usize,
    target_discrete: bool,
    candidates: Vec<Variable>,
    candidate_columns: Vec<usize>,
    /// 実行ごとに固定される候補順（事前ランキング順）
    ranked_variables: Vec<Variable>,
    ranked_columns: Vec<usize>,
    enumerator: Option<StateEnumerator>,
    evaluator: Option<ProjectionEvaluator>,
    leaderboard: Leaderboard,
    checkpoint: Option<SearchCheckpoint>,
    last_run_size: Option<usize>,
    status: EngineStatus,
    progress: ProgressManager,
    total: BigUint,
    events: Option<Sender<RankEvent>>,
    store: Box<dyn CheckpointStore>,
}

impl RankSearchEngine {
    pub fn new(config: RankConfig) -> Self {
        Self {
            config,
            dataset: None,
            target: None,
            target_column: 0,
            target_discrete: false,
            candidates: Vec::new(),
            candidate_columns: Vec::new(),
            ranked_variables: Vec::new(),
            ranked_columns: Vec::new(),
            enumerator: None,
            evaluator: None,
            leaderboard: Leaderboard::new(),
            checkpoint: None,
            last_run_size: None,
            status: EngineStatus::Idle,
            progress: ProgressManager::new(),
            total: BigUint::zero(),
            events: None,
            store: Box::new(MemoryCheckpointStore::new()),
        }
    }

    /// イベント送信先を設定する
    pub fn with_events(mut self, sender: Sender<RankEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// チェックポイントの保存先を差し替える
    pub fn with_checkpoint_store(mut self, store: Box<dyn CheckpointStore>) -> Self {
        self.store = store;
        self
    }

    pub fn config(&self) -> &RankConfig {
        &self.config
    }

    /// 設定を差し替える（実行中は拒否される）
    pub fn set_config(&mut self, config: RankConfig) -> Result<(), PreconditionError> {
        if self.status == EngineStatus::Running {
            return Err(PreconditionError::RunActive);
        }
        self.config = config;
        Ok(())
    }

    pub fn status(&self) -> EngineStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == EngineStatus::Running
    }

    /// 実行中はサイズ設定が固定される（UI側はこれで操作を無効化する）
    pub fn is_size_locked(&self) -> bool {
        self.status == EngineStatus::Running
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    /// 現在のターゲット変数
    pub fn target(&self) -> Option<&Variable> {
        self.target.as_ref()
    }

    /// 実行ごとに固定された候補順（事前ランキング順）
    pub fn ranked_variables(&self) -> &[Variable] {
        &self.ranked_variables
    }

    pub fn checkpoint(&self) -> Option<&SearchCheckpoint> {
        self.checkpoint.as_ref()
    }

    /// 現在の設定で列挙される状態総数の見積もり
    pub fn total_state_count(&self) -> &BigUint {
        &self.total
    }

    /// 探索対象を設定する。前提条件を満たさない場合は実行を開始できない。
    ///
    /// データセットの差し替えは既存のリーダーボードとチェックポイントを
    /// 無効化する。
    pub fn initialize(
        &mut self,
        candidates: Vec<Variable>,
        target: Variable,
        dataset: Arc<Dataset>,
    ) -> Result<(), PreconditionError> {
        if self.status == EngineStatus::Running {
            return Err(PreconditionError::RunActive);
        }

        let target_column = dataset.variable_index(target.name()).ok_or_else(|| {
            PreconditionError::UnknownVariable {
                name: target.name().to_string(),
            }
        })?;

        let mut usable = Vec::new();
        let mut usable_columns = Vec::new();
        for variable in candidates {
            if variable.name() == target.name() {
                continue;
            }
            let column = dataset.variable_index(variable.name()).ok_or_else(|| {
                PreconditionError::UnknownVariable {
                    name: variable.name().to_string(),
                }
            })?;
            usable.push(variable);
            usable_columns.push(column);
        }
        if usable.len() < MIN_SUBSET_SIZE {
            return Err(PreconditionError::TooFewVariables {
                found: usable.len(),
                min: MIN_SUBSET_SIZE,
            });
        }

        let target_values = dataset.column(target_column);
        let finite: Vec<f64> = target_values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .collect();
        if finite.is_empty() {
            return Err(PreconditionError::TargetAllMissing);
        }
        let lo = finite.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = finite.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if hi <= lo {
            return Err(PreconditionError::TargetConstant);
        }

        let mut involved = usable_columns.clone();
        involved.push(target_column);
        let valid_rows = dataset
            .valid_mask(&involved)
            .iter()
            .filter(|&&m| m)
            .count();
        if valid_rows < MIN_VALID_ROWS {
            return Err(PreconditionError::TooFewRows {
                found: valid_rows,
                min: MIN_VALID_ROWS,
            });
        }

        self.target_discrete = target.is_discrete();
        self.target = Some(target);
        self.target_column = target_column;
        self.dataset = Some(dataset);
        self.candidates = usable;
        self.candidate_columns = usable_columns;
        self.leaderboard.clear();
        self.checkpoint = None;
        self.enumerator = None;
        self.evaluator = None;
        self.ranked_variables.clear();
        self.ranked_columns.clear();
        self.last_run_size = None;
        self.total = BigUint::zero();
        self.status = EngineStatus::Idle;
        self.progress.reset();
        Ok(())
    }

    /// 探索を開始または再開する
    ///
    /// 前回実行とサイズが異なるかチェックポイントがなければ最初から。
    /// 同じサイズで有効なチェックポイントがあれば、リーダーボードを
    /// 保ったまま保存位置の続きから列挙する。
    pub fn start(&mut self, max_subset_size: usize) -> Result<(), PreconditionError> {
        if self.status == EngineStatus::Running {
            return Err(PreconditionError::RunActive);
        }
        if self.dataset.is_none() {
            return Err(PreconditionError::NotInitialized);
        }
        let upper = MAX_SUBSET_SIZE.min(self.candidates.len().saturating_sub(1));
        let out_of_range = PreconditionError::SizeOutOfRange {
            size: max_subset_size,
            min: MIN_SUBSET_SIZE,
            max: upper,
        };
        if max_subset_size < MIN_SUBSET_SIZE || max_subset_size > upper {
            return Err(out_of_range);
        }
        self.config.max_subset_size =
            SubsetSize::new(max_subset_size).map_err(|_| out_of_range)?;

        if self.last_run_size == Some(max_subset_size) && self.checkpoint.is_some() {
            match self.try_resume(max_subset_size) {
                Ok(()) => {
                    self.status = EngineStatus::Running;
                    self.emit(RankEvent::Log(format!(
                        "チェックポイントから再開します: 評価済み={}",
                        self.progress.get_stats().evaluated
                    )));
                    return Ok(());
                }
                Err(mismatch) => {
                    self.emit(RankEvent::Log(format!(
                        "チェックポイントが無効なため最初からやり直します: {}",
                        mismatch
                    )));
                    self.checkpoint = None;
                }
            }
        }

        self.start_fresh(max_subset_size);
        Ok(())
    }

    /// 次の未評価状態をひとつ評価する
    pub fn step(&mut self) -> StepOutcome {
        if self.status != EngineStatus::Running {
            return StepOutcome::Finished;
        }

        let state = match self.enumerator.as_mut().and_then(StateEnumerator::next_state) {
            Some(state) => state,
            None => {
                self.finish();
                return StepOutcome::Finished;
            }
        };

        let score = match self.evaluator.as_ref().map(|e| e.score_state(&state)) {
            Some(Ok(score)) => score,
            Some(Err(reason)) => {
                self.progress.add_unscorable();
                vlog!("評価不能のため最悪スコアを割り当てます: {:?} ({})", state, reason);
                UNSCORABLE_SCORE
            }
            None => {
                self.finish();
                return StepOutcome::Finished;
            }
        };

        let variables: Vec<Variable> = state
            .iter()
            .map(|&i| self.ranked_variables[i].clone())
            .collect();
        let checkpoint_state = state.clone();
        let entry = self.leaderboard.push(ScoredState { state, score }, variables);
        vlog!("{}", entry.description);

        let evaluated = self.progress.add_evaluated();
        let checkpoint = SearchCheckpoint {
            last_state: checkpoint_state,
            ranked_names: self.ranked_names(),
            max_size: self.config.max_subset_size.get(),
            evaluated,
        };
        if let Err(error) = self.store.save(&checkpoint) {
            self.emit(RankEvent::Error(format!(
                "チェックポイントを保存できませんでした: {}",
                error
            )));
        }
        self.checkpoint = Some(checkpoint);

        self.emit(RankEvent::Progress(self.snapshot(true)));
        StepOutcome::Continuing(evaluated)
    }

    /// 中断フラグを確認しながら完了まで駆動する補助ループ
    pub fn run(&mut self, abort: &AtomicBool) -> RankProgress {
        while self.status == EngineStatus::Running {
            if abort.load(Ordering::Relaxed) {
                self.pause();
                break;
            }
            if matches!(self.step(), StepOutcome::Finished) {
                break;
            }
        }
        self.snapshot(self.status == EngineStatus::Running)
    }

    /// 一時停止する。チェックポイントとリーダーボードは保持され、
    /// サイズ設定の固定が解除される。
    pub fn pause(&mut self) {
        if self.status == EngineStatus::Running {
            self.status = EngineStatus::Paused;
        }
    }

    /// 中止する。一時停止と同じだが、呼び出し側はチェックポイントを
    /// 破棄してよい。
    pub fn cancel(&mut self) {
        if matches!(self.status, EngineStatus::Running | EngineStatus::Paused) {
            self.status = EngineStatus::Idle;
        }
    }

    /// チェックポイントを破棄する
    pub fn discard_checkpoint(&mut self) {
        self.checkpoint = None;
        if let Err(error) = self.store.clear() {
            self.emit(RankEvent::Error(format!(
                "チェックポイントを破棄できませんでした: {}",
                error
            )));
        }
    }

    /// 外部ストアから読み込んだチェックポイントを取り込む
    ///
    /// 妥当性は次のstartで検証され、不一致なら破棄して最初からになる。
    pub fn restore_checkpoint(&mut self, checkpoint: SearchCheckpoint) {
        self.progress.set_evaluated(checkpoint.evaluated);
        self.last_run_size = Some(checkpoint.max_size);
        self.checkpoint = Some(checkpoint);
    }

    /// スコア昇順（同点は連結変数名の辞書順）で上位n件
    pub fn best_results(&self, n: usize) -> Vec<RankedResult> {
        self.leaderboard.best(n)
    }

    /// リーダーボード行の変数リスト（選択コールバック用）
    pub fn selection_variables(&self, row: usize) -> Option<Vec<Variable>> {
        self.leaderboard.variables_at(row).map(<[Variable]>::to_vec)
    }

    /// 現在の進捗スナップショット
    pub fn progress_snapshot(&self) -> RankProgress {
        self.snapshot(self.is_running())
    }

    fn snapshot(&self, searching: bool) -> RankProgress {
        let stats = self.progress.get_stats();
        RankProgress {
            searching,
            evaluated: stats.evaluated,
            unscorable: stats.unscorable,
            total_states: self.total.clone(),
            rate: self.progress.states_per_second(),
            leaderboard_len: self.leaderboard.len(),
        }
    }

    fn emit(&self, event: RankEvent) {
        if let Some(sender) = &self.events {
            let _ = sender.send(event);
        }
    }

    fn ranked_names(&self) -> Vec<String> {
        self.ranked_variables
            .iter()
            .map(|v| v.name().to_string())
            .collect()
    }

    /// 事前ランキング順を計算し、評価器を現在の設定で組み直す
    fn ensure_ranked(&mut self) {
        let Some(dataset) = self.dataset.clone() else {
            return;
        };
        if self.ranked_variables.is_empty() {
            let mut involved = self.candidate_columns.clone();
            involved.push(self.target_column);
            let mask = dataset.valid_mask(&involved);
            let rows = dataset.select_rows(&self.candidate_columns, &mask);
            let targets = dataset.select_column(self.target_column, &mask);
            let kinds: Vec<VarKind> = self.candidates.iter().map(Variable::kind).collect();
            let weights = if self.target_discrete {
                relieff_weights(
                    &rows,
                    &kinds,
                    &targets,
                    PRERANK_ITERATIONS,
                    PRERANK_NEIGHBORS,
                    self.config.sample_seed,
                )
            } else {
                rrelieff_weights(
                    &rows,
                    &kinds,
                    &targets,
                    PRERANK_ITERATIONS,
                    PRERANK_NEIGHBORS,
                    self.config.sample_seed,
                )
            };
            let order = ranked_order(&self.candidates, &weights);
            self.ranked_columns = order.iter().map(|&i| self.candidate_columns[i]).collect();
            self.ranked_variables = order.iter().map(|&i| self.candidates[i].clone()).collect();
        }
        self.evaluator = Some(ProjectionEvaluator::new(
            dataset,
            self.ranked_columns.clone(),
            self.target_column,
            self.target_discrete,
            self.config.sample_percent.get(),
            self.config.sample_seed,
        ));
    }

    /// 保存済みチェックポイントの続きから列挙を組み立てる
    fn try_resume(&mut self, max_subset_size: usize) -> Result<(), CheckpointMismatch> {
        self.ensure_ranked();
        let Some(checkpoint) = self.checkpoint.clone() else {
            return Err(CheckpointMismatch::BadState);
        };
        if checkpoint.max_size != max_subset_size {
            return Err(CheckpointMismatch::SizeChanged {
                saved: checkpoint.max_size,
                current: max_subset_size,
            });
        }
        if checkpoint.ranked_names != self.ranked_names() {
            return Err(CheckpointMismatch::OrderChanged);
        }
        let candidate_count = self.ranked_columns.len();
        self.enumerator = Some(StateEnumerator::resume(
            candidate_count,
            max_subset_size,
            &checkpoint.last_state,
        )?);
        self.total = total_states(candidate_count, max_subset_size);
        self.progress.set_evaluated(checkpoint.evaluated);
        Ok(())
    }

    /// 最初から探索を組み立てる
    fn start_fresh(&mut self, max_subset_size: usize) {
        self.leaderboard.clear();
        self.progress.reset();
        self.checkpoint = None;
        self.ranked_variables.clear();
        self.ranked_columns.clear();
        self.ensure_ranked();

        let candidate_count = self.ranked_columns.len();
        self.total = total_states(candidate_count, max_subset_size);
        self.enumerator = Some(StateEnumerator::new(candidate_count, max_subset_size));
        self.last_run_size = Some(max_subset_size);
        self.status = EngineStatus::Running;
        self.emit(RankEvent::Log(format!(
            "探索開始: 候補変数={} / 最大サイズ={} / 状態総数={}",
            candidate_count, max_subset_size, self.total
        )));
    }

    fn finish(&mut self) {
        self.status = EngineStatus::Finished;
        self.emit(RankEvent::Finished(self.snapshot(false)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2クラスが分かれる5候補の小さなデータセット
    fn dataset() -> Arc<Dataset> {
        let n = 12;
        let mut columns: Vec<Vec<f64>> = vec![Vec::new(); 5];
        for i in 0..n {
            let class = f64::from(i % 2);
            let jitter = f64::from(i / 2) * 0.05;
            columns[0].push(class * 4.0 + jitter);
            columns[1].push((1.0 - class) * 3.0 + jitter);
            columns[2].push(class * 2.0 + 1.0 + jitter);
            columns[3].push(f64::from((i / 2) % 3));
            columns[4].push(class);
        }
        Arc::new(
            Dataset::new(
                vec![
                    Variable::continuous("a"),
                    Variable::continuous("b"),
                    Variable::continuous("c"),
                    Variable::continuous("d"),
                    Variable::discrete("y"),
                ],
                columns,
            )
            .unwrap(),
        )
    }

    fn candidates() -> Vec<Variable> {
        vec![
            Variable::continuous("a"),
            Variable::continuous("b"),
            Variable::continuous("c"),
            Variable::continuous("d"),
        ]
    }

    fn initialized_engine() -> RankSearchEngine {
        let mut engine = RankSearchEngine::new(RankConfig::default());
        engine
            .initialize(candidates(), Variable::discrete("y"), dataset())
            .unwrap();
        engine
    }

    #[test]
    fn initialize_rejects_too_few_candidates() {
        let mut engine = RankSearchEngine::new(RankConfig::default());
        let result = engine.initialize(
            vec![Variable::continuous("a"), Variable::continuous("b")],
            Variable::discrete("y"),
            dataset(),
        );
        assert!(matches!(
            result,
            Err(PreconditionError::TooFewVariables { found: 2, .. })
        ));
    }

    #[test]
    fn initialize_rejects_unknown_variable() {
        let mut engine = RankSearchEngine::new(RankConfig::default());
        let mut with_unknown = candidates();
        with_unknown.push(Variable::continuous("ghost"));
        let result = engine.initialize(with_unknown, Variable::discrete("y"), dataset());
        assert!(matches!(
            result,
            Err(PreconditionError::UnknownVariable { .. })
        ));
    }

    #[test]
    fn initialize_rejects_constant_target() {
        let mut engine = RankSearchEngine::new(RankConfig::default());
        let data = Arc::new(
            Dataset::new(
                vec![
                    Variable::continuous("a"),
                    Variable::continuous("b"),
                    Variable::continuous("c"),
                    Variable::discrete("y"),
                ],
                vec![
                    vec![1.0, 2.0, 3.0],
                    vec![2.0, 3.0, 4.0],
                    vec![3.0, 4.0, 5.0],
                    vec![1.0, 1.0, 1.0],
                ],
            )
            .unwrap(),
        );
        let result = engine.initialize(
            vec![
                Variable::continuous("a"),
                Variable::continuous("b"),
                Variable::continuous("c"),
            ],
            Variable::discrete("y"),
            data,
        );
        assert_eq!(result, Err(PreconditionError::TargetConstant));
    }

    #[test]
    fn initialize_rejects_all_missing_target() {
        let mut engine = RankSearchEngine::new(RankConfig::default());
        let data = Arc::new(
            Dataset::new(
                vec![
                    Variable::continuous("a"),
                    Variable::continuous("b"),
                    Variable::continuous("c"),
                    Variable::discrete("y"),
                ],
                vec![
                    vec![1.0, 2.0],
                    vec![2.0, 3.0],
                    vec![3.0, 4.0],
                    vec![f64::NAN, f64::NAN],
                ],
            )
            .unwrap(),
        );
        let result = engine.initialize(
            vec![
                Variable::continuous("a"),
                Variable::continuous("b"),
                Variable::continuous("c"),
            ],
            Variable::discrete("y"),
            data,
        );
        assert_eq!(result, Err(PreconditionError::TargetAllMissing));
    }

    #[test]
    fn start_rejects_size_out_of_range() {
        let mut engine = initialized_engine();
        // 候補4個なので上限は3
        assert!(matches!(
            engine.start(4),
            Err(PreconditionError::SizeOutOfRange { max: 3, .. })
        ));
        assert!(engine.start(3).is_ok());
    }

    #[test]
    fn start_before_initialize_is_rejected() {
        let mut engine = RankSearchEngine::new(RankConfig::default());
        assert_eq!(engine.start(3), Err(PreconditionError::NotInitialized));
    }

    #[test]
    fn size_is_locked_while_running() {
        let mut engine = initialized_engine();
        assert!(!engine.is_size_locked());
        engine.start(3).unwrap();
        assert!(engine.is_size_locked());
        assert_eq!(engine.start(3), Err(PreconditionError::RunActive));
        assert_eq!(
            engine.set_config(RankConfig::default()),
            Err(PreconditionError::RunActive)
        );

        engine.pause();
        assert!(!engine.is_size_locked());
    }

    #[test]
    fn step_outside_a_run_reports_finished() {
        let mut engine = initialized_engine();
        assert_eq!(engine.step(), StepOutcome::Finished);
    }

    #[test]
    fn full_run_covers_every_state() {
        let mut engine = initialized_engine();
        engine.start(3).unwrap();
        let abort = AtomicBool::new(false);
        let progress = engine.run(&abort);

        // 候補4・最大サイズ3なら状態は4つ
        assert_eq!(progress.evaluated, 4);
        assert_eq!(engine.leaderboard().len(), 4);
        assert_eq!(engine.status(), EngineStatus::Finished);
        assert!(!engine.is_size_locked());
    }

    #[test]
    fn cancel_keeps_checkpoint_until_discarded() {
        let mut engine = initialized_engine();
        engine.start(3).unwrap();
        engine.step();
        engine.cancel();
        assert!(engine.checkpoint().is_some());

        engine.discard_checkpoint();
        assert!(engine.checkpoint().is_none());
    }

    #[test]
    fn size_change_restarts_from_scratch() {
        let mut engine = RankSearchEngine::new(RankConfig::default());
        // 5候補用のデータセット（ターゲット込みで6列）
        let mut columns: Vec<Vec<f64>> = vec![Vec::new(); 6];
        for i in 0..12 {
            let class = f64::from(i % 2);
            let jitter = f64::from(i / 2) * 0.05;
            columns[0].push(class * 4.0 + jitter);
            columns[1].push((1.0 - class) * 3.0 + jitter);
            columns[2].push(class * 2.0 + 1.0 + jitter);
            columns[3].push(f64::from((i / 2) % 3));
            columns[4].push(f64::from((i / 3) % 2) * 1.5);
            columns[5].push(class);
        }
        let data = Arc::new(
            Dataset::new(
                vec![
                    Variable::continuous("a"),
                    Variable::continuous("b"),
                    Variable::continuous("c"),
                    Variable::continuous("d"),
                    Variable::continuous("e"),
                    Variable::discrete("y"),
                ],
                columns,
            )
            .unwrap(),
        );
        let mut all = candidates();
        all.push(Variable::continuous("e"));
        engine.initialize(all, Variable::discrete("y"), data).unwrap();

        engine.start(3).unwrap();
        engine.step();
        engine.step();
        engine.pause();
        let evaluated_before = engine.progress_snapshot().evaluated;
        assert_eq!(evaluated_before, 2);

        // サイズ変更は進捗とリーダーボードを捨てて最初から
        engine.start(4).unwrap();
        assert_eq!(engine.progress_snapshot().evaluated, 0);
        assert_eq!(engine.leaderboard().len(), 0);
    }
}
