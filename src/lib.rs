//! # Cutstock
//!
//! 一維裁切最佳化（列生成 + 整數修復）
//!
//! ```no_run
//! use cutstock::{OptimizerService, PartDemand, StockType};
//!
//! let parts = vec![PartDemand::new("A", 3, 4), PartDemand::new("B", 5, 2)];
//! let stocks = vec![StockType::new(10, 3)];
//!
//! let plan = OptimizerService::default().run(&parts, &stocks)?;
//! println!("使用原料 {} 支", plan.stock_units_used());
//! # Ok::<(), cutstock::CutStockError>(())
//! ```

pub use cutstock_calc as calc;
pub use cutstock_core as model;
pub use cutstock_optimizer as optimizer;

pub use cutstock_core::{
    CutStockError, IntegerSolution, IntegerStatus, PartDemand, Pattern, PatternPool, Result,
    SolverConfig, StockType,
};
pub use cutstock_optimizer::{
    ColumnGenerationOptimizer, CuttingPlan, CuttingReport, ExportSource, OptimizationJob,
    Optimizer, OptimizerService, OptimizerWarning, RoundingMode, WarningKind,
};
