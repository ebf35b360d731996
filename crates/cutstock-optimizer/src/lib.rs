//! # Cutstock Optimizer
//!
//! 最佳化演算法介面、協調服務與輸出格式

pub mod export;
pub mod optimizer;
pub mod service;
pub mod validation;

// Re-export 主要類型
pub use cutstock_calc::{OptimizerWarning, WarningKind, WarningSeverity};
pub use export::{CuttingReport, ExportSource, RoundingMode};
pub use optimizer::{ColumnGenerationOptimizer, Optimizer};
pub use service::{OptimizationJob, OptimizerService};

use cutstock_core::{
    IntegerSolution, PartDemand, Pattern, PatternPool, RelaxationSolution, StockType,
};

/// 裁切計劃（一次最佳化的完整結果）
#[derive(Debug, Clone)]
pub struct CuttingPlan {
    /// 本次執行的識別碼（亦為求解器名稱前綴）
    pub run_id: uuid::Uuid,

    /// 使用的演算法名稱
    pub optimizer: String,

    /// 輸入的零件需求
    pub parts: Vec<PartDemand>,

    /// 輸入的原料清單
    pub stocks: Vec<StockType>,

    /// 最終模式池（含整數修復加入的模式）
    pub patterns: PatternPool,

    /// 最後一次線性鬆弛解
    pub relaxation: RelaxationSolution,

    /// 整數解
    pub integer: IntegerSolution,

    /// 列生成迭代次數
    pub lp_iterations: usize,

    /// 整數修復次數
    pub repair_attempts: usize,

    /// 列生成是否收斂
    pub converged: bool,

    /// 警告信息
    pub warnings: Vec<OptimizerWarning>,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl CuttingPlan {
    /// 添加警告
    pub fn add_warning(&mut self, warning: OptimizerWarning) {
        self.warnings.push(warning);
    }

    pub fn is_feasible(&self) -> bool {
        self.integer.is_feasible()
    }

    /// 下界：列生成收斂時的鬆弛目標值
    pub fn lower_bound(&self) -> Option<f64> {
        self.converged.then_some(self.relaxation.objective)
    }

    /// 上界：整數解目標值
    pub fn upper_bound(&self) -> Option<f64> {
        self.integer.objective.filter(|_| self.integer.is_feasible())
    }

    /// 相對差距 (上界 − 下界) / 上界
    pub fn gap(&self) -> Option<f64> {
        match (self.lower_bound(), self.upper_bound()) {
            (Some(lb), Some(ub)) if ub > 0.0 => Some(((ub - lb) / ub).max(0.0)),
            _ => None,
        }
    }

    /// 整數解實際使用的模式與數量
    pub fn used_patterns(&self) -> impl Iterator<Item = (&Pattern, u64)> {
        self.patterns
            .iter()
            .enumerate()
            .map(|(j, p)| (p, self.integer.amount(j)))
            .filter(|(_, amount)| *amount > 0)
    }

    /// 整數解使用的原料總支數
    pub fn stock_units_used(&self) -> u64 {
        self.integer.stock_units()
    }

    /// 是否有指定類型的警告
    pub fn has_warning(&self, kind: WarningKind) -> bool {
        self.warnings.iter().any(|w| w.kind == kind)
    }
}
