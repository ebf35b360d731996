//! 原料庫存模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 原料類型（每種長度一筆）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockType {
    /// 長度（已正規化的整數單位）
    pub length: u64,

    /// 可用數量上限
    pub quantity: u64,

    /// 單位成本（預設等於長度）
    pub cost: Decimal,
}

impl StockType {
    /// 創建新的原料類型，成本預設為長度
    pub fn new(length: u64, quantity: u64) -> Self {
        Self {
            length,
            quantity,
            cost: Decimal::from(length),
        }
    }

    /// 建構器模式：設置單位成本
    pub fn with_cost(mut self, cost: Decimal) -> Self {
        self.cost = cost;
        self
    }

    /// 檢查零件長度是否能放入
    pub fn fits(&self, part_length: u64) -> bool {
        part_length > 0 && part_length <= self.length
    }

    /// 可用總長度
    pub fn total_length(&self) -> u128 {
        self.length as u128 * self.quantity as u128
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_defaults_to_length() {
        let stock = StockType::new(6000, 10);

        assert_eq!(stock.cost, Decimal::from(6000));
        assert_eq!(stock.total_length(), 60000);
    }

    #[test]
    fn test_stock_builder() {
        let stock = StockType::new(10, 3).with_cost(Decimal::new(125, 1));

        assert_eq!(stock.cost, Decimal::new(125, 1));
        assert!(stock.fits(10));
        assert!(!stock.fits(11));
        assert!(!stock.fits(0));
    }
}
