//! 多種原料長度與鬆弛解輸出示例

use cutstock::{
    CuttingReport, ExportSource, OptimizationJob, OptimizerService, PartDemand, RoundingMode,
    SolverConfig, StockType,
};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== 多種原料裁切示例 ===\n");

    let config = SolverConfig::default()
        .with_integer_active_only(true)
        .with_solver_timeout_ms(10_000);
    let service = OptimizerService::with_config(config);

    let jobs = vec![
        OptimizationJob::new(
            "鋁擠型",
            vec![
                PartDemand::new("L-1200", 1200, 14),
                PartDemand::new("L-850", 850, 9),
                PartDemand::new("L-430", 430, 22),
            ],
            vec![
                StockType::new(6000, 10).with_cost(Decimal::new(60, 0)),
                StockType::new(4000, 10).with_cost(Decimal::new(45, 0)),
            ],
        ),
        OptimizationJob::new(
            "鋼管",
            vec![PartDemand::new("P-700", 700, 8), PartDemand::new("P-450", 450, 5)],
            vec![StockType::new(2400, 6)],
        ),
    ];

    tracing::info!("使用 {} 演算法執行 {} 個工作", service.optimizer_name(), jobs.len());

    for (job, result) in jobs.iter().zip(service.run_batch(&jobs)) {
        println!("--- 工作: {} ---", job.name);
        let plan = match result {
            Ok(plan) => plan,
            Err(err) => {
                println!("  求解失敗: {}", err);
                continue;
            }
        };

        println!("  狀態: {}", plan.integer.status);
        if let (Some(lower), Some(upper)) = (plan.lower_bound(), plan.upper_bound()) {
            println!("  下界: {:.3}, 上界: {:.3}", lower, upper);
        }
        if let Some(gap) = plan.gap() {
            println!("  間隙: {:.2}%", gap * 100.0);
        }
        for warning in &plan.warnings {
            println!("  警告: {:?} {}", warning.kind, warning.message);
        }

        // 整數解
        let report = CuttingReport::from_plan(&plan, ExportSource::Integer)?;
        println!("  整數解模式:");
        for record in &report.patterns {
            println!(
                "    {} 原料 {} × {} 支，餘料 {}",
                record.pattern_id, record.stock_length, record.count, record.waste
            );
        }
        println!(
            "  成本: {}, 利用率: {:.2}%",
            report.metrics.total_cost, report.metrics.efficiency
        );

        // 鬆弛解（保留小數）
        let fractional =
            CuttingReport::from_plan(&plan, ExportSource::Relaxation(RoundingMode::Fractional))?;
        println!("  鬆弛解原料用量: {:.3}", fractional.metrics.stock_units);

        println!("\n{}", report.to_json()?);
    }

    Ok(())
}
