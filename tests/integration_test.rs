//! 集成測試

use cutstock::calc::{MicroLpBackend, OptimizationContext, PatternGenerator};
use cutstock::{
    ColumnGenerationOptimizer, CutStockError, CuttingReport, ExportSource, IntegerStatus,
    OptimizationJob, Optimizer, OptimizerService, PartDemand, SolverConfig, StockType,
    WarningKind,
};
use rstest::rstest;
use rust_decimal::Decimal;

fn demand_covered(plan: &cutstock::CuttingPlan) -> bool {
    let demands: Vec<u64> = plan.parts.iter().map(|p| p.quantity).collect();
    let limits: Vec<u64> = plan.stocks.iter().map(|s| s.quantity).collect();
    plan.integer.satisfies(&plan.patterns, &demands, &limits)
}

#[test]
fn test_end_to_end_small_instance() {
    // 零件 A(3)×4、B(5)×2，原料 10×3
    let parts = vec![PartDemand::new("A", 3, 4), PartDemand::new("B", 5, 2)];
    let stocks = vec![StockType::new(10, 3)];

    let plan = OptimizerService::default().run(&parts, &stocks).unwrap();

    // 1. 初始模式仍在模式池中
    assert!(plan.patterns.contains(0, &[3, 0]));
    assert!(plan.patterns.contains(0, &[0, 2]));
    let first = plan.patterns.get(0).unwrap();
    assert_eq!(first.waste(), 1);
    assert_eq!(plan.patterns.get(1).unwrap().waste(), 0);

    // 2. 整數解可行並滿足需求
    assert_eq!(plan.integer.status, IntegerStatus::Feasible);
    assert!(demand_covered(&plan));

    // 3. 切出長度覆蓋 12 + 10
    let produced = plan.integer.produced(&plan.patterns, 2);
    assert!(produced[0] * 3 >= 12);
    assert!(produced[1] * 5 >= 10);

    // 4. 使用原料不超過 3 支
    assert!(plan.stock_units_used() <= 3);
    assert!(plan.warnings.is_empty());
}

#[test]
fn test_infeasible_input() {
    let parts = vec![PartDemand::new("A", 15, 1)];
    let stocks = vec![StockType::new(10, 1)];

    assert!(PatternGenerator::generate_trivial(&parts, &stocks)
        .unwrap()
        .is_empty());

    let result = OptimizerService::default().run(&parts, &stocks);
    assert!(matches!(result, Err(CutStockError::InfeasibleInput(_))));
}

#[rstest]
#[case(SolverConfig::default())]
#[case(SolverConfig::default().with_integer_active_only(true))]
#[case(SolverConfig::default().with_solver_timeout_ms(30_000))]
fn test_mixed_stock_lengths(#[case] config: SolverConfig) {
    let parts = vec![
        PartDemand::new("L-1200", 1200, 14),
        PartDemand::new("L-850", 850, 9),
        PartDemand::new("L-430", 430, 22),
    ];
    let stocks = vec![StockType::new(6000, 10), StockType::new(4000, 10)];

    let plan = OptimizerService::with_config(config).run(&parts, &stocks).unwrap();

    assert!(plan.is_feasible());
    assert!(demand_covered(&plan));
    assert!(plan.converged);

    // 整數解不低於線性下界
    let lower = plan.lower_bound().unwrap();
    let upper = plan.upper_bound().unwrap();
    assert!(upper + 1e-6 >= lower);
}

#[test]
fn test_custom_costs_prefer_cheaper_stock() {
    // 兩種原料長度相同，第二種成本較低
    let parts = vec![PartDemand::new("A", 5, 4)];
    let stocks = vec![
        StockType::new(10, 5).with_cost(Decimal::from(20)),
        StockType::new(10, 5).with_cost(Decimal::from(8)),
    ];

    let plan = OptimizerService::default().run(&parts, &stocks).unwrap();
    let consumed = plan.integer.consumed(&plan.patterns, 2);

    assert_eq!(consumed, vec![0, 2]);
    assert_eq!(plan.upper_bound(), Some(16.0));
}

#[test]
fn test_integer_infeasible_is_typed_result() {
    // 鬆弛解只需 0.83 支原料，但整數解需要 2 支
    let parts = vec![PartDemand::new("A", 4, 1), PartDemand::new("B", 6, 1)];
    let stocks = vec![StockType::new(12, 1)];
    let config = SolverConfig::default();
    let ctx = OptimizationContext::new(&parts, &stocks, config.clone()).unwrap();

    let optimizer = ColumnGenerationOptimizer::with_backend(MicroLpBackend, config);
    let plan = optimizer.optimize_with_context(&ctx, &parts, &stocks).unwrap();

    assert!(plan.converged);
    assert_eq!(plan.integer.status, IntegerStatus::Infeasible);
    assert!(plan.has_warning(WarningKind::IntegerInfeasible));
    assert_eq!(plan.patterns.len(), 2);
    assert_eq!(plan.integer.amounts, vec![0, 0]);
    assert_eq!(plan.upper_bound(), None);
}

#[test]
fn test_infeasible_initial_relaxation_reports_status() {
    // 單一零件模式需要 2.33 支原料，只有 2 支
    let parts = vec![PartDemand::new("A", 3, 4), PartDemand::new("B", 5, 2)];
    let stocks = vec![StockType::new(11, 2)];

    let result = ColumnGenerationOptimizer::new(SolverConfig::default()).optimize(&parts, &stocks);
    assert!(matches!(result, Err(CutStockError::SolverStatus { .. })));
}

#[test]
fn test_batch_and_export() {
    let service = OptimizerService::default();
    let jobs = vec![
        OptimizationJob::new(
            "job-a",
            vec![PartDemand::new("A", 3, 4), PartDemand::new("B", 5, 2)],
            vec![StockType::new(10, 3)],
        ),
        OptimizationJob::new(
            "job-b",
            vec![PartDemand::new("C", 700, 8), PartDemand::new("D", 450, 5)],
            vec![StockType::new(2400, 6)],
        ),
    ];

    let plans: Vec<_> = service
        .run_batch(&jobs)
        .into_iter()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(plans.len(), 2);

    for plan in &plans {
        assert!(demand_covered(plan));

        let report = CuttingReport::from_plan(plan, ExportSource::Integer).unwrap();
        assert_eq!(report.instances.len() as u64, plan.stock_units_used());
        assert!(report.metrics.efficiency > 0.0 && report.metrics.efficiency <= 100.0);

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["status"], "Feasible");
        assert_eq!(json["patterns"][0]["pattern_id"], "P1");
    }
}
