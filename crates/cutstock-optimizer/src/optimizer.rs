//! 最佳化演算法介面與列生成實作

use cutstock_calc::{
    ColumnGenerationLoop, IntegerRecoveryLoop, LpBackend, MicroLpBackend, OptimizationContext,
};
use cutstock_core::{PartDemand, PatternPool, Result, SolverConfig, StockType};

use crate::validation::validate_input;
use crate::CuttingPlan;

/// 最佳化演算法
pub trait Optimizer: Send + Sync {
    /// 演算法名稱
    fn name(&self) -> &str;

    /// 求解裁切問題
    fn optimize(&self, parts: &[PartDemand], stocks: &[StockType]) -> Result<CuttingPlan>;
}

/// 列生成 + 整數修復
pub struct ColumnGenerationOptimizer<B: LpBackend = MicroLpBackend> {
    backend: B,
    config: SolverConfig,
}

impl ColumnGenerationOptimizer<MicroLpBackend> {
    /// 使用 microlp 求解器
    pub fn new(config: SolverConfig) -> Self {
        Self::with_backend(MicroLpBackend::new(), config)
    }
}

impl Default for ColumnGenerationOptimizer<MicroLpBackend> {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

impl<B: LpBackend> ColumnGenerationOptimizer<B> {
    /// 使用指定的求解器
    pub fn with_backend(backend: B, config: SolverConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// 以既有上下文求解（`run_id` 由呼叫端決定）
    pub fn optimize_with_context(
        &self,
        ctx: &OptimizationContext,
        parts: &[PartDemand],
        stocks: &[StockType],
    ) -> Result<CuttingPlan> {
        let start_time = std::time::Instant::now();

        tracing::info!(
            "[{}] 開始列生成最佳化：零件 {} 種，原料 {} 種，求解器 {}",
            ctx.run_id(),
            parts.len(),
            stocks.len(),
            self.backend.name()
        );

        // Step 1: 列生成（含初始模式）
        tracing::debug!("Step 1: 列生成");
        let mut pool = PatternPool::new();
        let cg = ColumnGenerationLoop::new(&self.backend, ctx).run(parts, stocks, &mut pool)?;

        // Step 2: 整數修復
        tracing::debug!("Step 2: 整數修復");
        let recovery = IntegerRecoveryLoop::new(&self.backend, ctx).run(&mut pool, &cg.relaxation)?;

        let mut warnings = cg.warnings;
        warnings.extend(recovery.warnings);

        let elapsed = start_time.elapsed();
        tracing::info!(
            "[{}] 最佳化完成：{}，模式 {} 個，使用原料 {} 支，耗時 {:?}",
            ctx.run_id(),
            recovery.solution.status,
            pool.len(),
            recovery.solution.stock_units(),
            elapsed
        );

        Ok(CuttingPlan {
            run_id: ctx.run_id(),
            optimizer: self.name().to_string(),
            parts: parts.to_vec(),
            stocks: stocks.to_vec(),
            patterns: pool,
            relaxation: cg.relaxation,
            integer: recovery.solution,
            lp_iterations: cg.iterations,
            repair_attempts: recovery.repair_attempts,
            converged: cg.converged,
            warnings,
            calculation_time_ms: Some(elapsed.as_millis()),
        })
    }
}

impl<B: LpBackend> Optimizer for ColumnGenerationOptimizer<B> {
    fn name(&self) -> &str {
        "column_generation"
    }

    fn optimize(&self, parts: &[PartDemand], stocks: &[StockType]) -> Result<CuttingPlan> {
        self.config.validate()?;
        validate_input(parts, stocks)?;

        let ctx = OptimizationContext::new(parts, stocks, self.config.clone())?;
        self.optimize_with_context(&ctx, parts, stocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cutstock_core::{CutStockError, IntegerStatus};

    #[test]
    fn test_optimize_small_instance() {
        let parts = vec![PartDemand::new("A", 3, 4), PartDemand::new("B", 5, 2)];
        let stocks = vec![StockType::new(10, 3)];

        let plan = ColumnGenerationOptimizer::new(SolverConfig::default())
            .optimize(&parts, &stocks)
            .unwrap();

        assert_eq!(plan.optimizer, "column_generation");
        assert_eq!(plan.integer.status, IntegerStatus::Feasible);
        assert!(plan.converged);
        assert!(plan.stock_units_used() <= 3);
        assert!(plan.integer.satisfies(&plan.patterns, &[4, 2], &[3]));
        assert!(plan.calculation_time_ms.is_some());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let parts = vec![PartDemand::new("A", 3, 4)];
        let stocks = vec![StockType::new(10, 3)];
        let optimizer = ColumnGenerationOptimizer::new(SolverConfig::new().with_max_lp_iterations(0));

        assert!(matches!(
            optimizer.optimize(&parts, &stocks),
            Err(CutStockError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_context_run_id_is_kept() {
        let parts = vec![PartDemand::new("A", 4, 3)];
        let stocks = vec![StockType::new(12, 2)];
        let optimizer = ColumnGenerationOptimizer::new(SolverConfig::default());
        let ctx = OptimizationContext::new(&parts, &stocks, optimizer.config().clone()).unwrap();

        let plan = optimizer.optimize_with_context(&ctx, &parts, &stocks).unwrap();

        assert_eq!(plan.run_id, ctx.run_id());
        assert_eq!(plan.stock_units_used(), 1);
    }
}
