//! 裁切模式模型

use serde::Serialize;

use crate::{CutStockError, Result};

/// 裁切模式：一支原料切成的零件組合與餘料
///
/// 建立後不可變更；`counts` 依零件需求清單的順序對齊。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Pattern {
    stock_index: usize,
    stock_length: u64,
    counts: Vec<u64>,
    waste: u64,
}

impl Pattern {
    /// 創建新的裁切模式
    ///
    /// 餘料 = 原料長度 − Σ(數量 × 零件長度)，放不下時回傳錯誤。
    pub fn new(
        stock_index: usize,
        stock_length: u64,
        counts: Vec<u64>,
        part_lengths: &[u64],
    ) -> Result<Self> {
        if counts.len() != part_lengths.len() {
            return Err(CutStockError::InvalidInput(format!(
                "模式長度 {} 與零件種類數 {} 不符",
                counts.len(),
                part_lengths.len()
            )));
        }

        let used: u64 = counts
            .iter()
            .zip(part_lengths)
            .map(|(count, length)| count * length)
            .sum();

        if used > stock_length {
            return Err(CutStockError::InvalidInput(format!(
                "模式使用長度 {} 超過原料長度 {}",
                used, stock_length
            )));
        }

        Ok(Self {
            stock_index,
            stock_length,
            counts,
            waste: stock_length - used,
        })
    }

    /// 原料類型索引
    pub fn stock_index(&self) -> usize {
        self.stock_index
    }

    pub fn stock_length(&self) -> u64 {
        self.stock_length
    }

    /// 各零件的切割數量
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// 餘料長度
    pub fn waste(&self) -> u64 {
        self.waste
    }

    /// 實際使用長度
    pub fn used_length(&self) -> u64 {
        self.stock_length - self.waste
    }

    /// 一支原料切出的零件總數
    pub fn piece_count(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// 是否為空模式（不切任何零件）
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    /// 是否與給定的原料/數量組合相同
    pub fn same_cut(&self, stock_index: usize, counts: &[u64]) -> bool {
        self.stock_index == stock_index && self.counts == counts
    }
}

/// 模式池：跨求解階段共用、只增不減、保持順序
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatternPool {
    patterns: Vec<Pattern>,
}

impl PatternPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// 由既有模式建立
    pub fn from_patterns(patterns: Vec<Pattern>) -> Self {
        Self { patterns }
    }

    /// 追加模式，回傳其索引
    pub fn push(&mut self, pattern: Pattern) -> usize {
        self.patterns.push(pattern);
        self.patterns.len() - 1
    }

    /// 是否已有相同的模式
    pub fn contains(&self, stock_index: usize, counts: &[u64]) -> bool {
        self.patterns.iter().any(|p| p.same_cut(stock_index, counts))
    }

    pub fn get(&self, index: usize) -> Option<&Pattern> {
        self.patterns.get(index)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pattern> {
        self.patterns.iter()
    }

}

impl<'a> IntoIterator for &'a PatternPool {
    type Item = &'a Pattern;
    type IntoIter = std::slice::Iter<'a, Pattern>;

    fn into_iter(self) -> Self::IntoIter {
        self.patterns.iter()
    }
}
