//! 列生成主迴圈
//!
//! 狀態轉移：`Seeding → Relaxing → Pricing → (Relaxing | Converged) → Done`

use cutstock_core::{
    CutStockError, PartDemand, Pattern, PatternPool, RelaxationSolution, Result, StockType,
};

use crate::context::OptimizationContext;
use crate::lp::LpBackend;
use crate::master::MasterProblemSolver;
use crate::pricing::PricingSolver;
use crate::trivial::PatternGenerator;
use crate::{OptimizerWarning, WarningKind};

/// 列生成狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnGenerationState {
    Seeding,
    Relaxing,
    Pricing,
    Converged,
    Done,
}

/// 列生成結果
#[derive(Debug, Clone)]
pub struct ColumnGenerationOutcome {
    /// 最後一次成功的線性鬆弛（其對偶價格供整數修復使用）
    pub relaxation: RelaxationSolution,

    /// 求解 RMP 的次數
    pub iterations: usize,

    /// 是否達到最佳（無改善模式）
    pub converged: bool,

    /// 列生成期間新增的模式數
    pub patterns_added: usize,

    pub warnings: Vec<OptimizerWarning>,
}

/// 列生成迴圈
pub struct ColumnGenerationLoop<'a, B: LpBackend + ?Sized> {
    backend: &'a B,
    ctx: &'a OptimizationContext,
    state: ColumnGenerationState,
}

impl<'a, B: LpBackend + ?Sized> ColumnGenerationLoop<'a, B> {
    pub fn new(backend: &'a B, ctx: &'a OptimizationContext) -> Self {
        Self {
            backend,
            ctx,
            state: ColumnGenerationState::Seeding,
        }
    }

    pub fn state(&self) -> ColumnGenerationState {
        self.state
    }

    /// 以初始模式為種子執行列生成，模式池由呼叫端持有
    pub fn run(
        &mut self,
        parts: &[PartDemand],
        stocks: &[StockType],
        pool: &mut PatternPool,
    ) -> Result<ColumnGenerationOutcome> {
        self.state = ColumnGenerationState::Seeding;
        if pool.is_empty() {
            *pool = PatternGenerator::seed_pool(parts, stocks)?;
        }
        tracing::info!("[{}] 列生成開始：初始模式 {} 個", self.ctx.run_id(), pool.len());

        self.iterate(pool)
    }

    /// 從目前模式池開始迭代（不重新播種）
    pub fn iterate(&mut self, pool: &mut PatternPool) -> Result<ColumnGenerationOutcome> {
        let max_iterations = self.ctx.config().max_lp_iterations;
        let mut warnings = Vec::new();
        let mut last: Option<RelaxationSolution> = None;
        let mut iterations = 0;
        let mut patterns_added = 0;

        self.state = ColumnGenerationState::Relaxing;

        while self.state != ColumnGenerationState::Done {
            match self.state {
                ColumnGenerationState::Relaxing => {
                    if iterations >= max_iterations {
                        let message = format!(
                            "列生成達到迭代上限 {}，使用目前最佳鬆弛解",
                            max_iterations
                        );
                        tracing::warn!("[{}] {}", self.ctx.run_id(), message);
                        warnings.push(OptimizerWarning::warning(
                            WarningKind::NonConvergence,
                            message,
                        ));
                        self.state = ColumnGenerationState::Done;
                        continue;
                    }

                    match MasterProblemSolver::solve_relaxation(self.backend, self.ctx, pool) {
                        Ok(relaxation) => {
                            iterations += 1;
                            last = Some(relaxation);
                            self.state = ColumnGenerationState::Pricing;
                        }
                        Err(err) if err.is_recoverable() && last.is_some() => {
                            let message = format!("{}，回退到第 {} 次迭代的鬆弛解", err, iterations);
                            tracing::warn!("[{}] {}", self.ctx.run_id(), message);
                            warnings.push(OptimizerWarning::warning(
                                WarningKind::SolverTimeout,
                                message,
                            ));
                            self.state = ColumnGenerationState::Done;
                        }
                        Err(err) => return Err(err),
                    }
                }
                ColumnGenerationState::Pricing => {
                    let Some(relaxation) = last.as_ref() else {
                        self.state = ColumnGenerationState::Relaxing;
                        continue;
                    };

                    match PricingSolver::find_improving_pattern(self.ctx, &relaxation.duals, pool) {
                        Some(column) => {
                            let pattern = Pattern::new(
                                column.stock_index,
                                self.ctx.stock_lengths()[column.stock_index],
                                column.counts,
                                self.ctx.part_lengths(),
                            )?;
                            tracing::debug!(
                                "第 {} 次迭代：新增模式 {:?}（原料 {}，縮減成本 {:.6}）",
                                iterations,
                                pattern.counts(),
                                pattern.stock_length(),
                                column.reduced_cost
                            );
                            pool.push(pattern);
                            patterns_added += 1;
                            self.state = ColumnGenerationState::Relaxing;
                        }
                        None => self.state = ColumnGenerationState::Converged,
                    }
                }
                ColumnGenerationState::Converged => {
                    tracing::info!(
                        "[{}] 列生成收斂：{} 次迭代，模式 {} 個",
                        self.ctx.run_id(),
                        iterations,
                        pool.len()
                    );
                    self.state = ColumnGenerationState::Done;
                }
                ColumnGenerationState::Seeding | ColumnGenerationState::Done => {
                    self.state = ColumnGenerationState::Relaxing;
                }
            }
        }

        let relaxation =
            last.ok_or_else(|| CutStockError::Solver("列生成未取得任何鬆弛解".to_string()))?;
        let converged = warnings.is_empty();

        tracing::debug!(
            "列生成結束：目標值 {:.6}，鬆弛原料用量 {:.3}，新增模式 {} 個",
            relaxation.objective,
            relaxation.stock_units(),
            patterns_added
        );

        Ok(ColumnGenerationOutcome {
            relaxation,
            iterations,
            converged,
            patterns_added,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MicroLpBackend;
    use crate::lp::{LinearProgram, LpOutcome};
    use cutstock_core::SolverConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// 前 `successes` 次正常求解，之後一律逾時
    struct FlakyBackend {
        successes: usize,
        calls: AtomicUsize,
    }

    impl FlakyBackend {
        fn new(successes: usize) -> Self {
            Self {
                successes,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl LpBackend for FlakyBackend {
        fn name(&self) -> &str {
            "flaky"
        }

        fn solve(&self, program: &LinearProgram, timeout: Option<Duration>) -> Result<LpOutcome> {
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.successes {
                return MicroLpBackend.solve(program, None);
            }
            Err(CutStockError::SolverTimeout {
                phase: program.name.clone(),
                timeout_ms: timeout.map(|t| t.as_millis() as u64).unwrap_or(0),
            })
        }
    }

    fn context(parts: &[PartDemand], stocks: &[StockType], config: SolverConfig) -> OptimizationContext {
        OptimizationContext::new(parts, stocks, config).unwrap()
    }

    #[test]
    fn test_converges_on_trivial_example() {
        let parts = vec![PartDemand::new("A", 3, 4), PartDemand::new("B", 5, 2)];
        let stocks = vec![StockType::new(10, 3)];
        let ctx = context(&parts, &stocks, SolverConfig::default());
        let mut pool = PatternPool::new();

        let mut cg = ColumnGenerationLoop::new(&MicroLpBackend, &ctx);
        let outcome = cg.run(&parts, &stocks, &mut pool).unwrap();

        assert!(outcome.converged);
        assert!(outcome.warnings.is_empty());
        assert_eq!(cg.state(), ColumnGenerationState::Done);
        assert!(pool.contains(0, &[3, 0]));
        assert!(pool.contains(0, &[0, 2]));
        assert!((outcome.relaxation.objective - 70.0 / 3.0).abs() < 1e-6);

        // 收斂時任何原料都沒有改善模式
        assert!(PricingSolver::find_improving_pattern(&ctx, &outcome.relaxation.duals, &pool).is_none());
    }

    #[test]
    fn test_generates_mixed_pattern() {
        // 4+3+3 = 10 比單一零件模式更省
        let parts = vec![PartDemand::new("A", 4, 10), PartDemand::new("B", 3, 20)];
        let stocks = vec![StockType::new(10, 100)];
        let ctx = context(&parts, &stocks, SolverConfig::default());
        let mut pool = PatternPool::new();

        let outcome = ColumnGenerationLoop::new(&MicroLpBackend, &ctx)
            .run(&parts, &stocks, &mut pool)
            .unwrap();

        assert!(outcome.converged);
        assert!(outcome.patterns_added > 0);
        assert!(pool.contains(0, &[1, 2]));
        assert!((outcome.relaxation.objective - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_iteration_cap_yields_warning() {
        let parts = vec![PartDemand::new("A", 4, 10), PartDemand::new("B", 3, 20)];
        let stocks = vec![StockType::new(10, 100)];
        let ctx = context(&parts, &stocks, SolverConfig::default().with_max_lp_iterations(1));
        let mut pool = PatternPool::new();

        let outcome = ColumnGenerationLoop::new(&MicroLpBackend, &ctx)
            .run(&parts, &stocks, &mut pool)
            .unwrap();

        assert!(!outcome.converged);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].kind, WarningKind::NonConvergence);
    }

    #[test]
    fn test_infeasible_input_is_fatal() {
        let parts = vec![PartDemand::new("A", 15, 1)];
        let stocks = vec![StockType::new(10, 1)];
        let ctx = context(&parts, &stocks, SolverConfig::default());
        let mut pool = PatternPool::new();

        let result = ColumnGenerationLoop::new(&MicroLpBackend, &ctx).run(&parts, &stocks, &mut pool);
        assert!(matches!(result, Err(CutStockError::InfeasibleInput(_))));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_timeout_falls_back_to_last_relaxation() {
        // 第一次鬆弛後仍有改善模式，第二次鬆弛逾時
        let parts = vec![PartDemand::new("A", 4, 10), PartDemand::new("B", 3, 20)];
        let stocks = vec![StockType::new(10, 100)];
        let ctx = context(&parts, &stocks, SolverConfig::default());
        let mut pool = PatternPool::new();

        let backend = FlakyBackend::new(1);
        let outcome = ColumnGenerationLoop::new(&backend, &ctx)
            .run(&parts, &stocks, &mut pool)
            .unwrap();

        assert!(!outcome.converged);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].kind, WarningKind::SolverTimeout);
        assert_eq!(outcome.relaxation.values.len(), 2);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_timeout_before_any_relaxation_propagates() {
        let parts = vec![PartDemand::new("A", 3, 4), PartDemand::new("B", 5, 2)];
        let stocks = vec![StockType::new(10, 3)];
        let ctx = context(&parts, &stocks, SolverConfig::default());
        let mut pool = PatternPool::new();

        let backend = FlakyBackend::new(0);
        let result = ColumnGenerationLoop::new(&backend, &ctx).run(&parts, &stocks, &mut pool);

        assert!(matches!(result, Err(CutStockError::SolverTimeout { .. })));
        assert_eq!(pool.len(), 2);
    }
}
