//! 求解器配置

use serde::{Deserialize, Serialize};

use crate::{CutStockError, Result};

/// 列生成 / 整數修復的求解參數
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// 縮減成本門檻（低於 -tolerance 才視為改善）
    pub tolerance: f64,

    /// 列生成迭代上限
    pub max_lp_iterations: usize,

    /// 整數修復重試上限
    pub max_integer_retries: usize,

    /// 單次 LP/ILP 求解時限（毫秒），None 表示不限
    pub solver_timeout_ms: Option<u64>,

    /// 整數主問題是否只使用鬆弛值為正的模式
    pub integer_active_only: bool,

    /// 判定「鬆弛值為正」的門檻
    pub active_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-8,
            max_lp_iterations: 200,
            max_integer_retries: 10,
            solver_timeout_ms: None,
            integer_active_only: false,
            active_tolerance: 1e-9,
        }
    }
}

impl SolverConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：設置縮減成本門檻
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// 建構器模式：設置列生成迭代上限
    pub fn with_max_lp_iterations(mut self, iterations: usize) -> Self {
        self.max_lp_iterations = iterations;
        self
    }

    /// 建構器模式：設置整數修復重試上限
    pub fn with_max_integer_retries(mut self, retries: usize) -> Self {
        self.max_integer_retries = retries;
        self
    }

    /// 建構器模式：設置單次求解時限
    pub fn with_solver_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.solver_timeout_ms = Some(timeout_ms);
        self
    }

    /// 建構器模式：整數主問題只使用鬆弛值為正的模式
    pub fn with_integer_active_only(mut self, active_only: bool) -> Self {
        self.integer_active_only = active_only;
        self
    }

    /// 單次求解時限
    pub fn solver_timeout(&self) -> Option<std::time::Duration> {
        self.solver_timeout_ms.map(std::time::Duration::from_millis)
    }

    /// 檢查配置是否有效
    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance > 0.0) {
            return Err(CutStockError::InvalidConfig(format!(
                "tolerance 必須為正數: {}",
                self.tolerance
            )));
        }
        if self.active_tolerance < 0.0 {
            return Err(CutStockError::InvalidConfig(format!(
                "active_tolerance 不可為負: {}",
                self.active_tolerance
            )));
        }
        if self.max_lp_iterations == 0 {
            return Err(CutStockError::InvalidConfig(
                "max_lp_iterations 必須大於 0".to_string(),
            ));
        }
        if self.solver_timeout_ms == Some(0) {
            return Err(CutStockError::InvalidConfig(
                "solver_timeout_ms 必須大於 0".to_string(),
            ));
        }
        Ok(())
    }

    /// 從 JSON 載入（缺少的欄位使用預設值）
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CutStockError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 輸出為 JSON
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| CutStockError::InvalidConfig(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_config() {
        let config = SolverConfig::default();

        assert_eq!(config.tolerance, 1e-8);
        assert_eq!(config.max_lp_iterations, 200);
        assert_eq!(config.max_integer_retries, 10);
        assert_eq!(config.solver_timeout_ms, None);
        assert!(!config.integer_active_only);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = SolverConfig::new()
            .with_tolerance(1e-6)
            .with_max_lp_iterations(50)
            .with_max_integer_retries(3)
            .with_solver_timeout_ms(2000)
            .with_integer_active_only(true);

        assert_eq!(config.tolerance, 1e-6);
        assert_eq!(config.max_lp_iterations, 50);
        assert_eq!(config.max_integer_retries, 3);
        assert_eq!(
            config.solver_timeout(),
            Some(std::time::Duration::from_millis(2000))
        );
        assert!(config.integer_active_only);
    }

    #[rstest]
    #[case(SolverConfig::new().with_tolerance(0.0))]
    #[case(SolverConfig::new().with_tolerance(-1e-8))]
    #[case(SolverConfig::new().with_max_lp_iterations(0))]
    #[case(SolverConfig::new().with_solver_timeout_ms(0))]
    fn test_invalid_config(#[case] config: SolverConfig) {
        assert!(matches!(
            config.validate(),
            Err(CutStockError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_integer_retries_is_allowed() {
        // 0 次重試表示只求解一次整數主問題
        assert!(SolverConfig::new().with_max_integer_retries(0).validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config =
            SolverConfig::from_json_str(r#"{ "max_lp_iterations": 25, "solver_timeout_ms": 1500 }"#)
                .unwrap();

        assert_eq!(config.max_lp_iterations, 25);
        assert_eq!(config.solver_timeout_ms, Some(1500));
        assert_eq!(config.max_integer_retries, 10);
        assert_eq!(config.tolerance, 1e-8);
    }

    #[test]
    fn test_json_round_trip_and_rejection() {
        let config = SolverConfig::new().with_max_integer_retries(4);
        let json = config.to_json_string().unwrap();
        assert_eq!(SolverConfig::from_json_str(&json).unwrap(), config);

        assert!(SolverConfig::from_json_str(r#"{ "tolerance": 0.0 }"#).is_err());
        assert!(SolverConfig::from_json_str("not json").is_err());
    }
}
