//! 整數修復迴圈
//!
//! 狀態轉移：`IntegerSolving → (Repairing → IntegerSolving)* → {Done | Failed}`
//!
//! 整數主問題不可行時，以最後一次鬆弛解的對偶價格再定價一次，
//! 若找到新的改善模式就加入模式池重試。

use cutstock_core::{IntegerSolution, IntegerStatus, Pattern, PatternPool, RelaxationSolution, Result};

use crate::context::OptimizationContext;
use crate::lp::LpBackend;
use crate::master::MasterProblemSolver;
use crate::pricing::PricingSolver;
use crate::{OptimizerWarning, WarningKind};

/// 整數修復狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerRecoveryState {
    IntegerSolving,
    Repairing,
    Done,
    Failed,
}

/// 整數修復結果
#[derive(Debug, Clone)]
pub struct IntegerRecoveryOutcome {
    pub solution: IntegerSolution,

    /// 加入模式後重試的次數
    pub repair_attempts: usize,

    pub warnings: Vec<OptimizerWarning>,
}

/// 整數修復迴圈
pub struct IntegerRecoveryLoop<'a, B: LpBackend + ?Sized> {
    backend: &'a B,
    ctx: &'a OptimizationContext,
    state: IntegerRecoveryState,
}

impl<'a, B: LpBackend + ?Sized> IntegerRecoveryLoop<'a, B> {
    pub fn new(backend: &'a B, ctx: &'a OptimizationContext) -> Self {
        Self {
            backend,
            ctx,
            state: IntegerRecoveryState::IntegerSolving,
        }
    }

    pub fn state(&self) -> IntegerRecoveryState {
        self.state
    }

    /// 執行整數修復
    ///
    /// `relaxation` 提供修復用的對偶價格；模式池只會增加。
    /// 修復失敗時回傳 `Infeasible` 狀態的解，而不是錯誤。
    pub fn run(
        &mut self,
        pool: &mut PatternPool,
        relaxation: &RelaxationSolution,
    ) -> Result<IntegerRecoveryOutcome> {
        let max_retries = self.ctx.config().max_integer_retries;
        let mut warnings = Vec::new();
        let mut attempts = 0;
        let mut solution = IntegerSolution::infeasible(pool.len());

        self.state = IntegerRecoveryState::IntegerSolving;

        loop {
            match self.state {
                IntegerRecoveryState::IntegerSolving => {
                    let attempt = MasterProblemSolver::solve_integer(
                        self.backend,
                        self.ctx,
                        pool,
                        Some(relaxation),
                    );
                    solution = match attempt {
                        Ok(solution) => solution,
                        Err(err) if err.is_recoverable() => {
                            let message = format!("整數主問題{}", err);
                            tracing::warn!("[{}] {}", self.ctx.run_id(), message);
                            warnings.push(OptimizerWarning::error(
                                WarningKind::SolverTimeout,
                                message,
                            ));
                            IntegerSolution::error(pool.len())
                        }
                        Err(err) => return Err(err),
                    };

                    let status = solution.status;
                    self.state = match status {
                        IntegerStatus::Feasible => {
                            self.verify(pool, &mut solution, &mut warnings);
                            IntegerRecoveryState::Done
                        }
                        IntegerStatus::Error => IntegerRecoveryState::Done,
                        IntegerStatus::Infeasible if attempts >= max_retries => {
                            tracing::debug!("整數修復已達重試上限 {}", max_retries);
                            IntegerRecoveryState::Failed
                        }
                        IntegerStatus::Infeasible => IntegerRecoveryState::Repairing,
                    };
                }
                IntegerRecoveryState::Repairing => {
                    match PricingSolver::find_improving_pattern(self.ctx, &relaxation.duals, pool) {
                        Some(column) => {
                            let pattern = Pattern::new(
                                column.stock_index,
                                self.ctx.stock_lengths()[column.stock_index],
                                column.counts,
                                self.ctx.part_lengths(),
                            )?;
                            attempts += 1;
                            tracing::debug!(
                                "整數修復第 {} 次：新增模式 {:?}（原料 {}）",
                                attempts,
                                pattern.counts(),
                                pattern.stock_length()
                            );
                            pool.push(pattern);
                            self.state = IntegerRecoveryState::IntegerSolving;
                        }
                        None => {
                            tracing::debug!("整數修復找不到新的改善模式");
                            self.state = IntegerRecoveryState::Failed;
                        }
                    }
                }
                IntegerRecoveryState::Failed => {
                    let message = format!(
                        "整數主問題不可行（重試 {} 次，模式 {} 個）",
                        attempts,
                        pool.len()
                    );
                    tracing::warn!("[{}] {}", self.ctx.run_id(), message);
                    warnings.push(OptimizerWarning::error(WarningKind::IntegerInfeasible, message));
                    solution = IntegerSolution::infeasible(pool.len());
                    break;
                }
                IntegerRecoveryState::Done => break,
            }
        }

        tracing::info!(
            "[{}] 整數求解結束：{}，使用原料 {} 支",
            self.ctx.run_id(),
            solution.status,
            solution.stock_units()
        );

        Ok(IntegerRecoveryOutcome {
            solution,
            repair_attempts: attempts,
            warnings,
        })
    }

    /// 重新檢查需求覆蓋與庫存限制，不通過時降級為 `Error`
    fn verify(
        &self,
        pool: &PatternPool,
        solution: &mut IntegerSolution,
        warnings: &mut Vec<OptimizerWarning>,
    ) {
        let uncovered = solution.uncovered_parts(pool, self.ctx.demands());
        let overdrawn = solution.overdrawn_stocks(pool, self.ctx.stock_limits());
        if uncovered.is_empty() && overdrawn.is_empty() {
            return;
        }

        let message = format!(
            "整數解檢查失敗：未滿足零件 {:?}，超量原料 {:?}",
            uncovered, overdrawn
        );
        tracing::warn!("[{}] {}", self.ctx.run_id(), message);
        warnings.push(OptimizerWarning::error(WarningKind::CoverageCheckFailed, message));
        solution.status = IntegerStatus::Error;
    }
}
