//! microlp 求解器後端
//!
//! microlp 只回傳原始解，因此連續問題的對偶價格由另一個顯式建立的對偶 LP 求得：
//!
//! ```text
//! 原問題  min c·x   s.t.  A_r·x (≥ | ≤ | =) b_r,  0 ≤ x_j ≤ u_j
//! 對偶    max b·y + u·z  s.t.  Σ_r a_rj y_r + z_j ≤ c_j
//!         y_r ≥ 0 (≥ 列)、y_r ≤ 0 (≤ 列)、y_r 自由 (= 列)、z_j ≤ 0
//! ```

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use cutstock_core::{CutStockError, Result};
use microlp::{ComparisonOp, LinearExpr, OptimizationDirection, Problem};

use crate::lp::{LinearProgram, LpBackend, LpOutcome, LpStatus, Relation, VarDomain};

/// 以 microlp 實作的 LP/ILP 求解器
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpBackend;

impl MicroLpBackend {
    pub fn new() -> Self {
        Self
    }

    /// 在目前執行緒上求解（不設時限）
    pub fn solve_blocking(program: &LinearProgram) -> LpOutcome {
        let (problem, vars) = build_primal(program);

        let solution = match problem.solve() {
            Ok(solution) => solution,
            Err(err) => return LpOutcome::without_solution(status_of(&err)),
        };

        let values: Vec<f64> = vars.iter().map(|&v| *solution.var_value(v)).collect();
        let is_integer = program.is_integer();

        let duals = if is_integer {
            None
        } else {
            solve_duals(program)
        };

        LpOutcome {
            status: if is_integer {
                LpStatus::IntegerFeasible
            } else {
                LpStatus::Optimal
            },
            objective: solution.objective(),
            values,
            duals,
        }
    }
}

impl LpBackend for MicroLpBackend {
    fn name(&self) -> &str {
        "microlp"
    }

    fn solve(&self, program: &LinearProgram, timeout: Option<Duration>) -> Result<LpOutcome> {
        let Some(timeout) = timeout else {
            return Ok(Self::solve_blocking(program));
        };

        let (tx, rx) = mpsc::channel();
        let job = program.clone();

        // 逾時後工作執行緒無法中止，結果會被丟棄
        thread::Builder::new()
            .name(format!("lp-{}", program.name))
            .spawn(move || {
                let outcome = catch_unwind(AssertUnwindSafe(|| Self::solve_blocking(&job)));
                let _ = tx.send(outcome);
            })
            .map_err(|e| CutStockError::Solver(format!("無法啟動求解執行緒: {}", e)))?;

        match rx.recv_timeout(timeout) {
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(_)) => Err(CutStockError::Solver(format!(
                "求解器在 {} 中途崩潰",
                program.name
            ))),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::warn!("{} 求解逾時（{:?}）", program.name, timeout);
                Err(CutStockError::SolverTimeout {
                    phase: program.name.clone(),
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(CutStockError::Solver(format!(
                "求解執行緒中斷: {}",
                program.name
            ))),
        }
    }
}

fn status_of(err: &microlp::Error) -> LpStatus {
    match err {
        microlp::Error::Infeasible => LpStatus::Infeasible,
        microlp::Error::Unbounded => LpStatus::Unbounded,
        microlp::Error::InternalError(msg) => {
            tracing::debug!("microlp 內部錯誤: {}", msg);
            LpStatus::Error
        }
    }
}

fn comparison(relation: Relation) -> ComparisonOp {
    match relation {
        Relation::GreaterEq => ComparisonOp::Ge,
        Relation::LessEq => ComparisonOp::Le,
        Relation::Equal => ComparisonOp::Eq,
    }
}

/// 合併同一變數的重複係數（microlp 不接受重複索引）
fn merged_terms(terms: &[(usize, f64)]) -> Vec<(usize, f64)> {
    let mut merged: Vec<(usize, f64)> = Vec::with_capacity(terms.len());
    for &(var, coef) in terms {
        match merged.iter_mut().find(|(v, _)| *v == var) {
            Some((_, c)) => *c += coef,
            None => merged.push((var, coef)),
        }
    }
    merged
}

fn build_primal(program: &LinearProgram) -> (Problem, Vec<microlp::Variable>) {
    let mut problem = Problem::new(OptimizationDirection::Minimize);

    let vars: Vec<microlp::Variable> = program
        .variables
        .iter()
        .zip(&program.objective)
        .map(|(spec, &cost)| match spec.domain {
            VarDomain::Continuous => {
                problem.add_var(cost, (0.0, spec.upper_bound.unwrap_or(f64::INFINITY)))
            }
            VarDomain::Integer => {
                let max = spec
                    .upper_bound
                    .map(|u| u.floor().clamp(0.0, i32::MAX as f64) as i32)
                    .unwrap_or(i32::MAX);
                problem.add_integer_var(cost, (0, max))
            }
        })
        .collect();

    for constraint in &program.constraints {
        let mut expr = LinearExpr::empty();
        for (var, coef) in merged_terms(&constraint.terms) {
            if let Some(&v) = vars.get(var) {
                expr.add(v, coef);
            }
        }
        problem.add_constraint(expr, comparison(constraint.relation), constraint.rhs);
    }

    (problem, vars)
}

/// 求解對偶 LP，回傳每個約束名稱對應的對偶價格
fn solve_duals(program: &LinearProgram) -> Option<HashMap<String, f64>> {
    let mut dual = Problem::new(OptimizationDirection::Maximize);

    let row_vars: Vec<microlp::Variable> = program
        .constraints
        .iter()
        .map(|c| {
            let bounds = match c.relation {
                Relation::GreaterEq => (0.0, f64::INFINITY),
                Relation::LessEq => (f64::NEG_INFINITY, 0.0),
                Relation::Equal => (f64::NEG_INFINITY, f64::INFINITY),
            };
            dual.add_var(c.rhs, bounds)
        })
        .collect();

    // 每個原變數一列：Σ_r a_rj y_r (+ z_j) ≤ c_j
    let mut columns: Vec<Vec<(usize, f64)>> = vec![Vec::new(); program.num_variables()];
    for (r, constraint) in program.constraints.iter().enumerate() {
        for (var, coef) in merged_terms(&constraint.terms) {
            if let Some(column) = columns.get_mut(var) {
                column.push((r, coef));
            }
        }
    }

    // 變數須全部建立後才能加入約束
    let bound_vars: Vec<Option<microlp::Variable>> = program
        .variables
        .iter()
        .map(|spec| {
            spec.upper_bound
                .map(|upper| dual.add_var(upper, (f64::NEG_INFINITY, 0.0)))
        })
        .collect();

    for (j, column) in columns.iter().enumerate() {
        let mut expr = LinearExpr::empty();
        for &(r, coef) in column {
            expr.add(row_vars[r], coef);
        }
        if let Some(z) = bound_vars[j] {
            expr.add(z, 1.0);
        }
        dual.add_constraint(expr, ComparisonOp::Le, program.objective[j]);
    }

    match dual.solve() {
        Ok(solution) => Some(
            program
                .constraints
                .iter()
                .zip(&row_vars)
                .map(|(c, &y)| (c.name.clone(), *solution.var_value(y)))
                .collect(),
        ),
        Err(err) => {
            tracing::warn!("{} 對偶問題求解失敗: {}", program.name, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    /// 零件 3×4、5×2，原料 10×3，模式 (3,0) 與 (0,2)
    fn trivial_master(integer: bool) -> LinearProgram {
        let domain = if integer {
            VarDomain::Integer
        } else {
            VarDomain::Continuous
        };
        let mut program = LinearProgram::new("test:rmp");
        let a = program.add_variable("x_0", 10.0, domain, None);
        let b = program.add_variable("x_1", 10.0, domain, None);
        program.add_constraint("dem_0", vec![(a, 3.0)], Relation::GreaterEq, 4.0);
        program.add_constraint("dem_1", vec![(b, 2.0)], Relation::GreaterEq, 2.0);
        program.add_constraint("stock_limit_0", vec![(a, 1.0), (b, 1.0)], Relation::LessEq, 3.0);
        program
    }

    #[test]
    fn test_relaxation_with_duals() {
        let outcome = MicroLpBackend.solve(&trivial_master(false), None).unwrap();

        assert_eq!(outcome.status, LpStatus::Optimal);
        assert!((outcome.objective - (40.0 / 3.0 + 10.0)).abs() < EPS);
        assert!((outcome.values[0] - 4.0 / 3.0).abs() < EPS);
        assert!((outcome.values[1] - 1.0).abs() < EPS);

        // 庫存約束不緊，對偶價格 = 成本 / 每支切出數
        assert!((outcome.dual("dem_0").unwrap() - 10.0 / 3.0).abs() < EPS);
        assert!((outcome.dual("dem_1").unwrap() - 5.0).abs() < EPS);
        assert!(outcome.dual("stock_limit_0").unwrap().abs() < EPS);
    }

    #[test]
    fn test_integer_program_has_no_duals() {
        let outcome = MicroLpBackend.solve(&trivial_master(true), None).unwrap();

        assert_eq!(outcome.status, LpStatus::IntegerFeasible);
        assert!(outcome.duals.is_none());
        assert!((outcome.values[0] - 2.0).abs() < EPS);
        assert!((outcome.values[1] - 1.0).abs() < EPS);
        assert!((outcome.objective - 30.0).abs() < EPS);
    }

    #[test]
    fn test_infeasible_program() {
        let mut program = trivial_master(true);
        program.constraints[2].rhs = 2.0;

        let outcome = MicroLpBackend.solve(&program, None).unwrap();
        assert_eq!(outcome.status, LpStatus::Infeasible);
        assert!(outcome.values.is_empty());
    }

    #[test]
    fn test_binding_less_eq_row_has_non_positive_dual() {
        // min -x  s.t. x ≤ 4  →  y = -1
        let mut program = LinearProgram::new("test:le");
        let x = program.add_variable("x", -1.0, VarDomain::Continuous, None);
        program.add_constraint("cap", vec![(x, 1.0)], Relation::LessEq, 4.0);

        let outcome = MicroLpBackend.solve(&program, None).unwrap();
        assert!((outcome.objective + 4.0).abs() < EPS);
        assert!((outcome.dual("cap").unwrap() + 1.0).abs() < EPS);
    }

    #[test]
    fn test_duplicate_terms_are_merged() {
        let merged = merged_terms(&[(0, 1.0), (1, 2.0), (0, 2.0)]);
        assert_eq!(merged, vec![(0, 3.0), (1, 2.0)]);
    }

    #[test]
    fn test_solve_with_timeout_returns_result() {
        let outcome = MicroLpBackend
            .solve(&trivial_master(false), Some(Duration::from_secs(30)))
            .unwrap();
        assert_eq!(outcome.status, LpStatus::Optimal);
        assert!(outcome.duals.is_some());
    }
}
