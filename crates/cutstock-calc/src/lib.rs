//! # Cutstock Calculation Engine
//!
//! 列生成（Gilmore–Gomory）求解引擎：初始模式、受限主問題、背包定價與整數修復

pub mod backend;
pub mod column_generation;
pub mod context;
pub mod integer_recovery;
pub mod lp;
pub mod master;
pub mod pricing;
pub mod trivial;

// Re-export 主要類型
pub use backend::MicroLpBackend;
pub use column_generation::{ColumnGenerationLoop, ColumnGenerationOutcome, ColumnGenerationState};
pub use context::OptimizationContext;
pub use integer_recovery::{IntegerRecoveryLoop, IntegerRecoveryOutcome, IntegerRecoveryState};
pub use lp::{LinearProgram, LpBackend, LpOutcome, LpStatus};
pub use master::MasterProblemSolver;
pub use pricing::{PricedColumn, PricingSolver};
pub use trivial::PatternGenerator;

/// 最佳化警告（非致命）
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct OptimizerWarning {
    pub kind: WarningKind,
    pub message: String,
    pub severity: WarningSeverity,
}

impl OptimizerWarning {
    pub fn new(kind: WarningKind, message: String, severity: WarningSeverity) -> Self {
        Self {
            kind,
            message,
            severity,
        }
    }

    pub fn info(kind: WarningKind, message: String) -> Self {
        Self::new(kind, message, WarningSeverity::Info)
    }

    pub fn warning(kind: WarningKind, message: String) -> Self {
        Self::new(kind, message, WarningSeverity::Warning)
    }

    pub fn error(kind: WarningKind, message: String) -> Self {
        Self::new(kind, message, WarningSeverity::Error)
    }
}

/// 警告類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum WarningKind {
    /// 列生成達到迭代上限
    NonConvergence,
    /// 求解逾時，已回退到目前最佳解
    SolverTimeout,
    /// 整數修復用盡仍不可行
    IntegerInfeasible,
    /// 整數解未通過需求/庫存檢查
    CoverageCheckFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum WarningSeverity {
    Info,
    Warning,
    Error,
}
