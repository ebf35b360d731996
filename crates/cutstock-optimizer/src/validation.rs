//! 輸入檢查

use cutstock_core::{CutStockError, PartDemand, Result, StockType};

/// 求解前檢查零件與原料
///
/// - 長度為 0 或成本為負：`InvalidInput`
/// - 有需求的零件放不進任何可用原料：`InfeasibleInput`
/// - 可用原料總長度小於需求總長度：`InfeasibleInput`
pub fn validate_input(parts: &[PartDemand], stocks: &[StockType]) -> Result<()> {
    if parts.is_empty() {
        return Err(CutStockError::InvalidInput("零件需求清單為空".to_string()));
    }

    for part in parts {
        if part.length == 0 {
            return Err(CutStockError::InvalidInput(format!(
                "零件 {} 長度為 0",
                part.part_type
            )));
        }
    }

    for (k, stock) in stocks.iter().enumerate() {
        if stock.length == 0 {
            return Err(CutStockError::InvalidInput(format!("原料 #{} 長度為 0", k)));
        }
        if stock.cost.is_sign_negative() {
            return Err(CutStockError::InvalidInput(format!(
                "原料 #{} 成本為負: {}",
                k, stock.cost
            )));
        }
    }

    for part in parts.iter().filter(|p| p.quantity > 0) {
        let fits = stocks
            .iter()
            .any(|s| s.quantity > 0 && s.fits(part.length));
        if !fits {
            return Err(CutStockError::InfeasibleInput(format!(
                "零件 {}（長度 {}）放不進任何可用原料",
                part.part_type, part.length
            )));
        }
    }

    let demand_length: u128 = parts.iter().map(PartDemand::total_length).sum();
    let stock_length: u128 = stocks.iter().map(StockType::total_length).sum();
    if demand_length > stock_length {
        return Err(CutStockError::InfeasibleInput(format!(
            "需求總長度 {} 超過原料總長度 {}",
            demand_length, stock_length
        )));
    }

    Ok(())
}
