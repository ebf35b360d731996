//! 單次最佳化的呼叫上下文
//!
//! 上下文保存正規化後的問題資料、求解參數與本次執行的 `run_id`。
//! 所有傳給求解器的變數/約束名稱都以 `run_id` 為前綴，
//! 多個獨立執行共用同一個求解器時不會互相衝突。

use rust_decimal::prelude::ToPrimitive;
use uuid::Uuid;

use cutstock_core::{CutStockError, PartDemand, Result, SolverConfig, StockType};

/// 最佳化上下文（唯讀）
#[derive(Debug, Clone)]
pub struct OptimizationContext {
    run_id: Uuid,
    part_lengths: Vec<u64>,
    demands: Vec<u64>,
    stock_lengths: Vec<u64>,
    stock_limits: Vec<u64>,
    stock_costs: Vec<f64>,
    config: SolverConfig,
}

impl OptimizationContext {
    /// 由零件需求與原料清單建立上下文，並產生新的 `run_id`
    pub fn new(parts: &[PartDemand], stocks: &[StockType], config: SolverConfig) -> Result<Self> {
        let stock_costs = stocks
            .iter()
            .map(|s| {
                s.cost.to_f64().ok_or_else(|| {
                    CutStockError::InvalidInput(format!("原料成本無法轉換: {}", s.cost))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        Ok(Self {
            run_id: Uuid::new_v4(),
            part_lengths: parts.iter().map(|p| p.length).collect(),
            demands: parts.iter().map(|p| p.quantity).collect(),
            stock_lengths: stocks.iter().map(|s| s.length).collect(),
            stock_limits: stocks.iter().map(|s| s.quantity).collect(),
            stock_costs,
            config,
        })
    }

    /// 建構器模式：指定 `run_id`
    pub fn with_run_id(mut self, run_id: Uuid) -> Self {
        self.run_id = run_id;
        self
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn part_lengths(&self) -> &[u64] {
        &self.part_lengths
    }

    pub fn demands(&self) -> &[u64] {
        &self.demands
    }

    pub fn stock_lengths(&self) -> &[u64] {
        &self.stock_lengths
    }

    pub fn stock_limits(&self) -> &[u64] {
        &self.stock_limits
    }

    pub fn stock_costs(&self) -> &[f64] {
        &self.stock_costs
    }

    pub fn part_count(&self) -> usize {
        self.part_lengths.len()
    }

    fn prefix(&self) -> String {
        self.run_id.simple().to_string()
    }

    /// 主問題名稱，例如 `<run>:rmp`
    pub fn program_name(&self, phase: &str) -> String {
        format!("{}:{}", self.prefix(), phase)
    }

    /// 零件需求約束名稱
    pub fn demand_row(&self, part_index: usize) -> String {
        format!("{}:dem_{}", self.prefix(), part_index)
    }

    /// 原料庫存約束名稱
    pub fn stock_row(&self, stock_index: usize) -> String {
        format!("{}:stock_limit_{}", self.prefix(), stock_index)
    }

    /// 模式使用量變數名稱
    pub fn pattern_var(&self, pattern_index: usize) -> String {
        format!("{}:x_{}", self.prefix(), pattern_index)
    }
}
