//! 受限主問題（RMP）
//!
//! ```text
//! min  Σ_j cost(stock_j) × x_j
//! s.t. Σ_j counts[j][i] × x_j ≥ demand_i     (每種零件)
//!      Σ_{j 使用原料 k} x_j   ≤ limit_k      (每種原料)
//!      x_j ≥ 0（連續）或 x_j ∈ ℕ（整數）
//! ```

use cutstock_core::{
    CutStockError, DualPrices, IntegerSolution, PatternPool, RelaxationSolution, Result,
};

use crate::context::OptimizationContext;
use crate::lp::{LinearProgram, LpBackend, LpStatus, Relation, VarDomain};

/// 主問題求解器
pub struct MasterProblemSolver;

impl MasterProblemSolver {
    /// 求解線性鬆弛並取出零件需求約束的對偶價格
    pub fn solve_relaxation<B: LpBackend + ?Sized>(
        backend: &B,
        ctx: &OptimizationContext,
        pool: &PatternPool,
    ) -> Result<RelaxationSolution> {
        let columns: Vec<usize> = (0..pool.len()).collect();
        let program = Self::build_program(ctx, pool, &columns, VarDomain::Continuous, "rmp");

        let outcome = backend.solve(&program, ctx.config().solver_timeout())?;
        if outcome.status != LpStatus::Optimal {
            return Err(CutStockError::SolverStatus {
                phase: "relaxation".to_string(),
                status: outcome.status.to_string(),
            });
        }

        let mut duals = Vec::with_capacity(ctx.part_count());
        for i in 0..ctx.part_count() {
            let row = ctx.demand_row(i);
            if !program.constraints.iter().any(|c| c.name == row) {
                // 沒有模式能切出、需求為 0 的零件不建約束
                duals.push(0.0);
                continue;
            }
            let dual = outcome
                .dual(&row)
                .ok_or(CutStockError::DualsUnavailable { constraint: row })?;
            duals.push(dual);
        }

        let mut values = outcome.values;
        values.resize(pool.len(), 0.0);

        tracing::debug!(
            "RMP 目標值 {:.6}，模式 {} 個，對偶價格 {:?}",
            outcome.objective,
            pool.len(),
            duals
        );

        Ok(RelaxationSolution {
            values,
            objective: outcome.objective,
            duals: DualPrices::new(duals),
        })
    }

    /// 求解整數主問題
    ///
    /// `relaxation` 與設定 `integer_active_only` 同時存在時，只使用鬆弛值為正的模式
    /// 以及鬆弛之後才加入的模式，其餘模式使用量固定為 0。
    pub fn solve_integer<B: LpBackend + ?Sized>(
        backend: &B,
        ctx: &OptimizationContext,
        pool: &PatternPool,
        relaxation: Option<&RelaxationSolution>,
    ) -> Result<IntegerSolution> {
        let columns = Self::integer_columns(ctx, pool, relaxation);
        if columns.is_empty() {
            return Ok(IntegerSolution::infeasible(pool.len()));
        }

        let program = Self::build_program(ctx, pool, &columns, VarDomain::Integer, "imp");
        let outcome = backend.solve(&program, ctx.config().solver_timeout())?;

        match outcome.status {
            LpStatus::Optimal | LpStatus::IntegerFeasible => {
                let mut amounts = vec![0u64; pool.len()];
                for (&j, &value) in columns.iter().zip(&outcome.values) {
                    amounts[j] = value.round().max(0.0) as u64;
                }
                tracing::debug!(
                    "整數主問題目標值 {:.6}，使用原料 {} 支",
                    outcome.objective,
                    amounts.iter().sum::<u64>()
                );
                Ok(IntegerSolution::feasible(amounts, outcome.objective))
            }
            LpStatus::Infeasible => Ok(IntegerSolution::infeasible(pool.len())),
            status => {
                tracing::warn!("整數主問題狀態異常: {}", status);
                Ok(IntegerSolution::error(pool.len()))
            }
        }
    }

    fn integer_columns(
        ctx: &OptimizationContext,
        pool: &PatternPool,
        relaxation: Option<&RelaxationSolution>,
    ) -> Vec<usize> {
        match relaxation {
            Some(relaxation) if ctx.config().integer_active_only => {
                let mut columns = relaxation.active_patterns(ctx.config().active_tolerance);
                columns.retain(|&j| j < pool.len());
                columns.extend(relaxation.values.len()..pool.len());
                columns
            }
            _ => (0..pool.len()).collect(),
        }
    }

    /// 建立主問題；`columns` 為納入的模式索引
    fn build_program(
        ctx: &OptimizationContext,
        pool: &PatternPool,
        columns: &[usize],
        domain: VarDomain,
        phase: &str,
    ) -> LinearProgram {
        let mut program = LinearProgram::new(ctx.program_name(phase));
        let integer = domain == VarDomain::Integer;

        let vars: Vec<(usize, usize)> = columns
            .iter()
            .filter_map(|&j| pool.get(j).map(|p| (j, p)))
            .map(|(j, pattern)| {
                let k = pattern.stock_index();
                let upper = integer.then(|| ctx.stock_limits()[k] as f64);
                let var = program.add_variable(ctx.pattern_var(j), ctx.stock_costs()[k], domain, upper);
                (var, j)
            })
            .collect();

        for (i, &demand) in ctx.demands().iter().enumerate() {
            let terms: Vec<(usize, f64)> = vars
                .iter()
                .filter_map(|&(var, j)| {
                    let count = pool.get(j)?.counts()[i];
                    (count > 0).then_some((var, count as f64))
                })
                .collect();
            if terms.is_empty() && demand == 0 {
                continue;
            }
            program.add_constraint(ctx.demand_row(i), terms, Relation::GreaterEq, demand as f64);
        }

        for (k, &limit) in ctx.stock_limits().iter().enumerate() {
            let terms: Vec<(usize, f64)> = vars
                .iter()
                .filter(|&&(_, j)| pool.get(j).is_some_and(|p| p.stock_index() == k))
                .map(|&(var, _)| (var, 1.0))
                .collect();
            if terms.is_empty() {
                continue;
            }
            program.add_constraint(ctx.stock_row(k), terms, Relation::LessEq, limit as f64);
        }

        program
    }
}
