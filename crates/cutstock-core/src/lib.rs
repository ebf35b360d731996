//! # Cutstock Core
//!
//! 一維裁切（cutting-stock）核心資料模型與類型定義

pub mod config;
pub mod part;
pub mod pattern;
pub mod solution;
pub mod stock;

// Re-export 主要類型
pub use config::SolverConfig;
pub use part::{PartDemand, PartItem};
pub use pattern::{Pattern, PatternPool};
pub use solution::{DualPrices, IntegerSolution, IntegerStatus, RelaxationSolution};
pub use stock::StockType;

/// 裁切求解錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum CutStockError {
    /// 沒有任何零件能放入任何原料（致命，立即回報）
    #[error("輸入不可行: {0}")]
    InfeasibleInput(String),

    /// LP/ILP 求解器回傳非預期的狀態
    #[error("求解器狀態錯誤（{phase}）: {status}")]
    SolverStatus { phase: String, status: String },

    /// 求解器無法提供對偶價格，列生成無法繼續
    #[error("無法取得對偶價格: 約束 {constraint}")]
    DualsUnavailable { constraint: String },

    /// 單次求解超過時限
    #[error("求解逾時（{timeout_ms} ms）: {phase}")]
    SolverTimeout { phase: String, timeout_ms: u64 },

    #[error("無效的輸入: {0}")]
    InvalidInput(String),

    #[error("無效的配置: {0}")]
    InvalidConfig(String),

    #[error("求解器錯誤: {0}")]
    Solver(String),
}

impl CutStockError {
    /// 是否可由呼叫端回退到目前最佳解
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CutStockError::SolverTimeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, CutStockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_timeout_is_recoverable() {
        let timeout = CutStockError::SolverTimeout {
            phase: "relaxation".to_string(),
            timeout_ms: 500,
        };
        assert!(timeout.is_recoverable());

        let status = CutStockError::SolverStatus {
            phase: "relaxation".to_string(),
            status: "Infeasible".to_string(),
        };
        assert!(!status.is_recoverable());
        assert!(!CutStockError::InfeasibleInput("x".to_string()).is_recoverable());
    }

    #[test]
    fn test_error_messages_carry_context() {
        let err = CutStockError::DualsUnavailable {
            constraint: "dem_0".to_string(),
        };
        assert!(err.to_string().contains("dem_0"));
    }
}
