//! 定價子問題（無界背包）
//!
//! 給定對偶價格，找出每種原料上價值最高的切法；
//! 縮減成本 = 原料成本 − 對偶價值，為負時代表新模式能改善主問題。

use cutstock_core::{DualPrices, PatternPool};

use crate::context::OptimizationContext;

/// 定價結果（單一原料類型）
#[derive(Debug, Clone, PartialEq)]
pub struct PricedColumn {
    pub stock_index: usize,
    pub counts: Vec<u64>,
    pub value: f64,
    pub reduced_cost: f64,
}

/// 定價求解器
pub struct PricingSolver;

impl PricingSolver {
    /// 無界背包：max Σ dual_i × count_i  s.t.  Σ count_i × length_i ≤ capacity
    ///
    /// `dp[c]` 為總長度恰為 `c` 時的最佳價值。最佳值不一定在滿容量，
    /// 所以掃描全部容量取最大者（同值取最小容量）。
    /// 同一容量下以第一個嚴格改善的零件索引為準。
    pub fn price(duals: &[f64], part_lengths: &[u64], capacity: u64) -> (f64, Vec<u64>) {
        let capacity = capacity as usize;
        let mut dp = vec![f64::NEG_INFINITY; capacity + 1];
        let mut choice: Vec<Option<usize>> = vec![None; capacity + 1];
        dp[0] = 0.0;

        for c in 1..=capacity {
            for (i, (&length, &dual)) in part_lengths.iter().zip(duals).enumerate() {
                let length = length as usize;
                if length == 0 || length > c || dp[c - length] == f64::NEG_INFINITY {
                    continue;
                }
                let candidate = dp[c - length] + dual;
                if candidate > dp[c] {
                    dp[c] = candidate;
                    choice[c] = Some(i);
                }
            }
        }

        let mut best_capacity = 0;
        for c in 1..=capacity {
            if dp[c] > dp[best_capacity] {
                best_capacity = c;
            }
        }

        let mut counts = vec![0u64; part_lengths.len()];
        let mut c = best_capacity;
        while c > 0 {
            match choice[c] {
                Some(i) => {
                    counts[i] += 1;
                    c -= part_lengths[i] as usize;
                }
                None => break,
            }
        }

        (dp[best_capacity], counts)
    }

    /// 對每種可用原料定價
    ///
    /// 可用數量為 0 的原料略過。
    pub fn price_all(ctx: &OptimizationContext, duals: &DualPrices) -> Vec<PricedColumn> {
        ctx.stock_lengths()
            .iter()
            .enumerate()
            .filter(|(k, _)| ctx.stock_limits()[*k] > 0)
            .map(|(k, &length)| {
                let (value, counts) = Self::price(duals.values(), ctx.part_lengths(), length);
                PricedColumn {
                    stock_index: k,
                    counts,
                    value,
                    reduced_cost: ctx.stock_costs()[k] - value,
                }
            })
            .collect()
    }

    /// 挑出縮減成本最負（且低於 −tolerance）的新模式
    ///
    /// 空模式與模式池中已存在的模式不列入候選。
    pub fn find_improving_pattern(
        ctx: &OptimizationContext,
        duals: &DualPrices,
        pool: &PatternPool,
    ) -> Option<PricedColumn> {
        let tolerance = ctx.config().tolerance;
        let mut best_rc = 0.0;
        let mut best: Option<PricedColumn> = None;

        for column in Self::price_all(ctx, duals) {
            if column.counts.iter().all(|&c| c == 0) {
                continue;
            }
            if pool.contains(column.stock_index, &column.counts) {
                tracing::debug!(
                    "原料 {} 的最佳模式 {:?} 已存在（縮減成本 {:.6}）",
                    column.stock_index,
                    column.counts,
                    column.reduced_cost
                );
                continue;
            }
            if column.reduced_cost < best_rc - tolerance {
                best_rc = column.reduced_cost;
                best = Some(column);
            }
        }

        best
    }
}
