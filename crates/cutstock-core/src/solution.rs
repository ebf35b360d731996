//! 求解結果模型（線性鬆弛與整數解）

use serde::{Deserialize, Serialize};

use crate::pattern::PatternPool;

/// 對偶價格（每個零件需求約束一個）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DualPrices {
    values: Vec<f64>,
}

impl DualPrices {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// 線性鬆弛解（每次列生成迭代重新計算）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelaxationSolution {
    /// 每個模式的連續使用量 x_j
    pub values: Vec<f64>,

    /// 目標值
    pub objective: f64,

    /// 零件需求約束的對偶價格
    pub duals: DualPrices,
}

impl RelaxationSolution {
    /// 模式 j 的鬆弛值（新加入、尚未求解的模式視為 0）
    pub fn value(&self, pattern_index: usize) -> f64 {
        self.values.get(pattern_index).copied().unwrap_or(0.0)
    }

    /// 鬆弛值大於門檻的模式索引
    pub fn active_patterns(&self, tolerance: f64) -> Vec<usize> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, &x)| x > tolerance)
            .map(|(j, _)| j)
            .collect()
    }

    /// 使用的原料總支數（連續值）
    pub fn stock_units(&self) -> f64 {
        self.values.iter().sum()
    }
}

/// 整數解狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntegerStatus {
    /// 找到滿足需求與庫存限制的整數解
    Feasible,
    /// 修復迴圈用盡仍不可行
    Infeasible,
    /// 求解器錯誤或逾時
    Error,
}

impl std::fmt::Display for IntegerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Feasible => write!(f, "FEASIBLE"),
            Self::Infeasible => write!(f, "INFEASIBLE"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// 整數解
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegerSolution {
    /// 每個模式的整數使用量（與模式池順序對齊）
    pub amounts: Vec<u64>,

    /// 目標值（不可行時為 None）
    pub objective: Option<f64>,

    pub status: IntegerStatus,
}

impl IntegerSolution {
    /// 創建可行解
    pub fn feasible(amounts: Vec<u64>, objective: f64) -> Self {
        Self {
            amounts,
            objective: Some(objective),
            status: IntegerStatus::Feasible,
        }
    }

    /// 創建不可行結果（使用量全為 0）
    pub fn infeasible(pattern_count: usize) -> Self {
        Self {
            amounts: vec![0; pattern_count],
            objective: None,
            status: IntegerStatus::Infeasible,
        }
    }

    /// 創建錯誤結果
    pub fn error(pattern_count: usize) -> Self {
        Self {
            amounts: vec![0; pattern_count],
            objective: None,
            status: IntegerStatus::Error,
        }
    }

    pub fn is_feasible(&self) -> bool {
        self.status == IntegerStatus::Feasible
    }

    /// 模式 j 的使用量
    pub fn amount(&self, pattern_index: usize) -> u64 {
        self.amounts.get(pattern_index).copied().unwrap_or(0)
    }

    /// 使用的原料總支數
    pub fn stock_units(&self) -> u64 {
        self.amounts.iter().sum()
    }

    /// 各零件實際切出的數量
    pub fn produced(&self, pool: &PatternPool, part_count: usize) -> Vec<u64> {
        let mut produced = vec![0u64; part_count];
        for (j, pattern) in pool.iter().enumerate() {
            let amount = self.amount(j);
            if amount == 0 {
                continue;
            }
            for (i, &count) in pattern.counts().iter().enumerate().take(part_count) {
                produced[i] += count * amount;
            }
        }
        produced
    }

    /// 各原料類型的使用支數
    pub fn consumed(&self, pool: &PatternPool, stock_count: usize) -> Vec<u64> {
        let mut consumed = vec![0u64; stock_count];
        for (j, pattern) in pool.iter().enumerate() {
            if let Some(slot) = consumed.get_mut(pattern.stock_index()) {
                *slot += self.amount(j);
            }
        }
        consumed
    }

    /// 未滿足需求的零件索引
    pub fn uncovered_parts(&self, pool: &PatternPool, demands: &[u64]) -> Vec<usize> {
        self.produced(pool, demands.len())
            .iter()
            .zip(demands)
            .enumerate()
            .filter(|(_, (produced, demand))| produced < demand)
            .map(|(i, _)| i)
            .collect()
    }

    /// 超出可用數量的原料索引
    pub fn overdrawn_stocks(&self, pool: &PatternPool, limits: &[u64]) -> Vec<usize> {
        self.consumed(pool, limits.len())
            .iter()
            .zip(limits)
            .enumerate()
            .filter(|(_, (consumed, limit))| consumed > limit)
            .map(|(k, _)| k)
            .collect()
    }

    /// 同時滿足需求覆蓋與庫存限制
    pub fn satisfies(&self, pool: &PatternPool, demands: &[u64], limits: &[u64]) -> bool {
        self.uncovered_parts(pool, demands).is_empty()
            && self.overdrawn_stocks(pool, limits).is_empty()
    }
}
