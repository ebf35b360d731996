//! 初始（單一零件）模式產生

use cutstock_core::{CutStockError, PartDemand, Pattern, PatternPool, Result, StockType};

/// 初始模式產生器
pub struct PatternGenerator;

impl PatternGenerator {
    /// 為每個 (原料, 零件) 組合產生只切單一零件的模式
    ///
    /// 外層走訪原料、內層走訪零件；放不下的組合略過，結果可能為空。
    pub fn generate_trivial(parts: &[PartDemand], stocks: &[StockType]) -> Result<Vec<Pattern>> {
        let part_lengths: Vec<u64> = parts.iter().map(|p| p.length).collect();
        let mut patterns = Vec::new();

        for (k, stock) in stocks.iter().enumerate() {
            for (i, part) in parts.iter().enumerate() {
                if part.length == 0 {
                    continue;
                }
                let count = stock.length / part.length;
                if count == 0 {
                    continue;
                }

                let mut counts = vec![0u64; parts.len()];
                counts[i] = count;
                patterns.push(Pattern::new(k, stock.length, counts, &part_lengths)?);
            }
        }

        tracing::debug!("初始模式數量: {}", patterns.len());
        Ok(patterns)
    }

    /// 產生初始模式池；沒有任何零件放得進任何原料時回傳 `InfeasibleInput`
    pub fn seed_pool(parts: &[PartDemand], stocks: &[StockType]) -> Result<PatternPool> {
        let patterns = Self::generate_trivial(parts, stocks)?;

        if patterns.is_empty() {
            return Err(CutStockError::InfeasibleInput(format!(
                "{} 種零件都無法放入 {} 種原料",
                parts.len(),
                stocks.len()
            )));
        }

        Ok(PatternPool::from_patterns(patterns))
    }
}
