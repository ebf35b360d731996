//! 零件需求模型

use serde::{Deserialize, Serialize};

/// 零件需求（每種零件一筆，數量為總需求）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartDemand {
    /// 零件類型
    pub part_type: String,

    /// 長度（已正規化的整數單位）
    pub length: u64,

    /// 需求數量
    pub quantity: u64,
}

/// 單一零件（展開後）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartItem {
    pub part_type: String,
    pub length: u64,
}

impl PartDemand {
    /// 創建新的零件需求
    pub fn new(part_type: impl Into<String>, length: u64, quantity: u64) -> Self {
        Self {
            part_type: part_type.into(),
            length,
            quantity,
        }
    }

    /// 總需求長度
    pub fn total_length(&self) -> u128 {
        self.length as u128 * self.quantity as u128
    }

    /// 展開為逐件清單
    pub fn itemize(&self) -> Vec<PartItem> {
        (0..self.quantity)
            .map(|_| PartItem {
                part_type: self.part_type.clone(),
                length: self.length,
            })
            .collect()
    }
}
