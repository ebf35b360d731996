//! 最佳化協調服務

use rayon::prelude::*;

use cutstock_core::{PartDemand, Result, SolverConfig, StockType};

use crate::optimizer::{ColumnGenerationOptimizer, Optimizer};
use crate::CuttingPlan;

/// 批次中的單一工作
#[derive(Debug, Clone)]
pub struct OptimizationJob {
    pub name: String,
    pub parts: Vec<PartDemand>,
    pub stocks: Vec<StockType>,
}

impl OptimizationJob {
    pub fn new(name: impl Into<String>, parts: Vec<PartDemand>, stocks: Vec<StockType>) -> Self {
        Self {
            name: name.into(),
            parts,
            stocks,
        }
    }
}

/// 協調服務：選擇演算法並執行單次或批次最佳化
pub struct OptimizerService {
    optimizer: Box<dyn Optimizer>,
}

impl Default for OptimizerService {
    fn default() -> Self {
        Self::with_config(SolverConfig::default())
    }
}

impl OptimizerService {
    pub fn new(optimizer: Box<dyn Optimizer>) -> Self {
        Self { optimizer }
    }

    /// 使用列生成演算法與指定配置
    pub fn with_config(config: SolverConfig) -> Self {
        Self::new(Box::new(ColumnGenerationOptimizer::new(config)))
    }

    /// 替換演算法
    pub fn set_optimizer(&mut self, optimizer: Box<dyn Optimizer>) {
        self.optimizer = optimizer;
    }

    pub fn optimizer_name(&self) -> &str {
        self.optimizer.name()
    }

    /// 執行一次最佳化
    pub fn run(&self, parts: &[PartDemand], stocks: &[StockType]) -> Result<CuttingPlan> {
        self.optimizer.optimize(parts, stocks)
    }

    /// 平行執行多個獨立工作，結果順序與輸入相同
    pub fn run_batch(&self, jobs: &[OptimizationJob]) -> Vec<Result<CuttingPlan>> {
        tracing::info!("批次最佳化：{} 個工作", jobs.len());

        jobs.par_iter()
            .map(|job| {
                let result = self.run(&job.parts, &job.stocks);
                match &result {
                    Ok(plan) => tracing::debug!(
                        "工作 {} 完成（run {}）：{}",
                        job.name,
                        plan.run_id,
                        plan.integer.status
                    ),
                    Err(err) => tracing::warn!("工作 {} 失敗: {}", job.name, err),
                }
                result
            })
            .collect()
    }
}
