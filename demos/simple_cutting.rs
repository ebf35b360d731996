//! 簡單裁切示例

use cutstock::{CuttingReport, ExportSource, OptimizerService, PartDemand, StockType};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== 簡單裁切示例 ===\n");

    // 零件需求
    let parts = vec![PartDemand::new("A", 3, 4), PartDemand::new("B", 5, 2)];
    // 原料：長度 10，共 3 支
    let stocks = vec![StockType::new(10, 3)];

    println!("零件需求:");
    for part in &parts {
        println!("  - {}: 長度 {}, 數量 {}", part.part_type, part.length, part.quantity);
    }
    println!("原料:");
    for stock in &stocks {
        println!("  - 長度 {}, 可用 {} 支", stock.length, stock.quantity);
    }

    let plan = OptimizerService::default().run(&parts, &stocks)?;
    tracing::info!("執行 {} 完成，耗時 {:?} ms", plan.run_id, plan.calculation_time_ms);

    println!("\n求解狀態: {}", plan.integer.status);
    println!("列生成迭代: {} 次", plan.lp_iterations);
    println!("使用原料: {} 支", plan.stock_units_used());

    println!("\n裁切模式:");
    for (pattern, amount) in plan.used_patterns() {
        println!(
            "  - 原料 {}, 切法 {:?}, 餘料 {}, 使用 {} 支",
            pattern.stock_length(),
            pattern.counts(),
            pattern.waste(),
            amount
        );
    }

    let report = CuttingReport::from_plan(&plan, ExportSource::Integer)?;
    println!(
        "\n利用率: {:.2}%, 餘料率: {:.2}%",
        report.metrics.efficiency, report.metrics.waste_ratio
    );

    Ok(())
}
