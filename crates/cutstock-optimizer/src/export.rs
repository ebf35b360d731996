//! 裁切計劃輸出
//!
//! 將模式池與使用量轉成三種紀錄：
//! - 模式摘要：相同 (原料長度, 切法) 的模式合併為 `P1`、`P2`…
//! - 實例明細：每支實際裁切的原料一筆 `P1_1`、`P1_2`…
//! - 總體指標：原料用量、餘料、效率、上下界

use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use cutstock_core::{CutStockError, IntegerStatus, Result};

use crate::{CuttingPlan, OptimizerWarning};

const EPSILON: f64 = 1e-8;

/// 鬆弛解使用量的取整方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RoundingMode {
    /// 保留小數，每個模式只輸出一筆 `_FRAC` 明細
    Fractional,
    Round,
    Floor,
    Ceil,
}

impl RoundingMode {
    fn apply(self, amount: f64) -> u64 {
        let rounded = match self {
            RoundingMode::Fractional => 0.0,
            RoundingMode::Round => amount.round(),
            RoundingMode::Floor => amount.floor(),
            RoundingMode::Ceil => (amount - EPSILON).ceil(),
        };
        rounded.max(0.0) as u64
    }
}

/// 使用量來源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportSource {
    /// 整數解
    Integer,
    /// 線性鬆弛解，依指定方式取整
    Relaxation(RoundingMode),
}

/// 切法中的一種零件
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CutEntry {
    pub part_type: String,
    pub length: u64,
    pub count: u64,
}

/// 模式摘要
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternRecord {
    pub pattern_id: String,
    pub stock_index: usize,
    pub stock_length: u64,
    pub cuts: Vec<CutEntry>,
    /// 單支餘料
    pub waste: u64,
    /// 合併後的使用量（鬆弛解為小數）
    pub amount: f64,
    /// 輸出的原料支數
    pub count: u64,
    pub total_waste: f64,
}

/// 實例明細（一支原料）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceRecord {
    pub instance_id: String,
    pub pattern_id: String,
    pub stock_index: usize,
    pub stock_length: u64,
    pub cuts: Vec<CutEntry>,
    pub waste: u64,
    /// 只有 `Fractional` 模式才有
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fractional: Option<f64>,
}

/// 總體指標
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub stock_units: f64,
    pub stock_length_used: f64,
    pub cut_length: f64,
    pub waste: f64,
    /// 餘料率（%）
    pub waste_ratio: f64,
    /// 利用率（%）
    pub efficiency: f64,
    pub items_cut: f64,
    pub total_cost: Decimal,
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
    pub gap: Option<f64>,
    pub generated_at: DateTime<Utc>,
}

/// 完整輸出
#[derive(Debug, Clone, Serialize)]
pub struct CuttingReport {
    pub run_id: uuid::Uuid,
    pub optimizer: String,
    pub status: IntegerStatus,
    pub patterns: Vec<PatternRecord>,
    pub instances: Vec<InstanceRecord>,
    pub metrics: SummaryMetrics,
    pub warnings: Vec<OptimizerWarning>,
}

struct PatternGroup {
    stock_index: usize,
    stock_length: u64,
    counts: Vec<u64>,
    piece_count: u64,
    waste: u64,
    amount: f64,
}

impl CuttingReport {
    /// 由裁切計劃產生輸出紀錄
    pub fn from_plan(plan: &CuttingPlan, source: ExportSource) -> Result<Self> {
        let mode = match source {
            ExportSource::Integer => RoundingMode::Round,
            ExportSource::Relaxation(mode) => mode,
        };
        // 取整後為 0 支的模式不輸出
        let groups: Vec<PatternGroup> = group_patterns(plan, source)
            .into_iter()
            .filter(|g| mode == RoundingMode::Fractional || mode.apply(g.amount) > 0)
            .collect();

        let mut patterns = Vec::with_capacity(groups.len());
        let mut instances = Vec::new();

        for (n, group) in groups.iter().enumerate() {
            let pattern_id = format!("P{}", n + 1);
            let cuts = cut_entries(plan, &group.counts);
            let count = mode.apply(group.amount);
            let effective = effective_count(mode, group.amount, count);

            if mode == RoundingMode::Fractional {
                instances.push(InstanceRecord {
                    instance_id: format!("{}_FRAC", pattern_id),
                    pattern_id: pattern_id.clone(),
                    stock_index: group.stock_index,
                    stock_length: group.stock_length,
                    cuts: cuts.clone(),
                    waste: group.waste,
                    fractional: Some(round_to(group.amount, 6)),
                });
            } else {
                instances.extend((1..=count).map(|k| InstanceRecord {
                    instance_id: format!("{}_{}", pattern_id, k),
                    pattern_id: pattern_id.clone(),
                    stock_index: group.stock_index,
                    stock_length: group.stock_length,
                    cuts: cuts.clone(),
                    waste: group.waste,
                    fractional: None,
                }));
            }

            patterns.push(PatternRecord {
                pattern_id,
                stock_index: group.stock_index,
                stock_length: group.stock_length,
                cuts,
                waste: group.waste,
                amount: group.amount,
                count,
                total_waste: group.waste as f64 * effective,
            });
        }

        let metrics = summarize(plan, &groups, mode)?;

        tracing::debug!(
            "輸出模式 {} 筆、實例 {} 筆，利用率 {:.2}%",
            patterns.len(),
            instances.len(),
            metrics.efficiency
        );

        Ok(Self {
            run_id: plan.run_id,
            optimizer: plan.optimizer.clone(),
            status: plan.integer.status,
            patterns,
            instances,
            metrics,
            warnings: plan.warnings.clone(),
        })
    }

    /// 輸出為 JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| CutStockError::Solver(e.to_string()))
    }
}

/// 依 (原料類型, 切法) 合併模式，保留第一次出現的順序；使用量為 0 的模式不輸出
///
/// 長度相同但成本不同的原料類型分開計算。
fn group_patterns(plan: &CuttingPlan, source: ExportSource) -> Vec<PatternGroup> {
    let mut groups: Vec<PatternGroup> = Vec::new();

    for (j, pattern) in plan.patterns.iter().enumerate() {
        let amount = match source {
            ExportSource::Integer => plan.integer.amount(j) as f64,
            ExportSource::Relaxation(_) => plan.relaxation.value(j),
        };
        if amount <= EPSILON {
            continue;
        }

        match groups
            .iter_mut()
            .find(|g| g.stock_index == pattern.stock_index() && g.counts == pattern.counts())
        {
            Some(group) => group.amount += amount,
            None => groups.push(PatternGroup {
                stock_index: pattern.stock_index(),
                stock_length: pattern.stock_length(),
                counts: pattern.counts().to_vec(),
                piece_count: pattern.piece_count(),
                waste: pattern.waste(),
                amount,
            }),
        }
    }

    groups
}

fn cut_entries(plan: &CuttingPlan, counts: &[u64]) -> Vec<CutEntry> {
    plan.parts
        .iter()
        .zip(counts)
        .filter(|(_, &count)| count > 0)
        .map(|(part, &count)| CutEntry {
            part_type: part.part_type.clone(),
            length: part.length,
            count,
        })
        .collect()
}

fn effective_count(mode: RoundingMode, amount: f64, count: u64) -> f64 {
    match mode {
        RoundingMode::Fractional => amount,
        _ => count as f64,
    }
}

fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

fn summarize(plan: &CuttingPlan, groups: &[PatternGroup], mode: RoundingMode) -> Result<SummaryMetrics> {
    let mut stock_units = 0.0;
    let mut stock_length_used = 0.0;
    let mut cut_length = 0.0;
    let mut waste = 0.0;
    let mut items_cut = 0.0;
    let mut total_cost = Decimal::ZERO;

    for group in groups {
        let n = effective_count(mode, group.amount, mode.apply(group.amount));

        stock_units += n;
        stock_length_used += group.stock_length as f64 * n;
        cut_length += (group.stock_length - group.waste) as f64 * n;
        waste += group.waste as f64 * n;
        items_cut += group.piece_count as f64 * n;

        let cost = plan
            .stocks
            .get(group.stock_index)
            .map(|s| s.cost)
            .unwrap_or_default();
        let units = Decimal::from_f64(n).ok_or_else(|| {
            CutStockError::InvalidInput(format!("無法轉換使用量: {}", n))
        })?;
        total_cost += cost * units;
    }

    let waste_ratio = if stock_length_used > 0.0 {
        waste / stock_length_used * 100.0
    } else {
        0.0
    };

    Ok(SummaryMetrics {
        stock_units,
        stock_length_used,
        cut_length,
        waste,
        waste_ratio: round_to(waste_ratio, 4),
        efficiency: round_to(100.0 - waste_ratio, 4),
        items_cut,
        total_cost,
        lower_bound: plan.lower_bound(),
        upper_bound: plan.upper_bound(),
        gap: plan.gap(),
        generated_at: Utc::now(),
    })
}
