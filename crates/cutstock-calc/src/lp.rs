//! LP/ILP 求解器介面
//!
//! 核心不實作線性規劃求解，只透過 [`LpBackend`] 描述問題並取得結果：
//! 目標係數、具名線性約束、每個變數的定義域（連續或整數，下界皆為 0）。
//! 連續問題必須回傳每個具名約束的對偶價格；取不到時以 `duals: None` 表示，
//! 呼叫端不得以 0 代替。

use std::collections::HashMap;
use std::time::Duration;

use cutstock_core::Result;

/// 變數定義域
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarDomain {
    /// 連續 ≥ 0
    Continuous,
    /// 整數 ≥ 0
    Integer,
}

/// 約束關係
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    GreaterEq,
    LessEq,
    Equal,
}

/// 變數定義
#[derive(Debug, Clone)]
pub struct VariableSpec {
    pub name: String,
    pub domain: VarDomain,
    pub upper_bound: Option<f64>,
}

/// 具名線性約束：Σ coef × x (relation) rhs
#[derive(Debug, Clone)]
pub struct LinearConstraint {
    pub name: String,
    /// (變數索引, 係數)，同一變數只出現一次
    pub terms: Vec<(usize, f64)>,
    pub relation: Relation,
    pub rhs: f64,
}

/// 最小化問題
#[derive(Debug, Clone, Default)]
pub struct LinearProgram {
    pub name: String,
    pub objective: Vec<f64>,
    pub variables: Vec<VariableSpec>,
    pub constraints: Vec<LinearConstraint>,
}

impl LinearProgram {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// 新增變數，回傳索引
    pub fn add_variable(
        &mut self,
        name: impl Into<String>,
        cost: f64,
        domain: VarDomain,
        upper_bound: Option<f64>,
    ) -> usize {
        self.objective.push(cost);
        self.variables.push(VariableSpec {
            name: name.into(),
            domain,
            upper_bound,
        });
        self.variables.len() - 1
    }

    /// 新增約束
    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        terms: Vec<(usize, f64)>,
        relation: Relation,
        rhs: f64,
    ) {
        self.constraints.push(LinearConstraint {
            name: name.into(),
            terms,
            relation,
            rhs,
        });
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// 是否含整數變數
    pub fn is_integer(&self) -> bool {
        self.variables.iter().any(|v| v.domain == VarDomain::Integer)
    }
}

/// 求解狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LpStatus {
    Optimal,
    Infeasible,
    Unbounded,
    IntegerFeasible,
    Error,
}

impl LpStatus {
    /// 是否有可用的解
    pub fn has_solution(&self) -> bool {
        matches!(self, LpStatus::Optimal | LpStatus::IntegerFeasible)
    }
}

impl std::fmt::Display for LpStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Optimal => write!(f, "OPTIMAL"),
            Self::Infeasible => write!(f, "INFEASIBLE"),
            Self::Unbounded => write!(f, "UNBOUNDED"),
            Self::IntegerFeasible => write!(f, "INTEGER_FEASIBLE"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// 求解結果
#[derive(Debug, Clone)]
pub struct LpOutcome {
    pub status: LpStatus,
    pub objective: f64,
    /// 與變數順序對齊
    pub values: Vec<f64>,
    /// 依約束名稱索引的對偶價格（僅連續問題）
    pub duals: Option<HashMap<String, f64>>,
}

impl LpOutcome {
    /// 無解的結果
    pub fn without_solution(status: LpStatus) -> Self {
        Self {
            status,
            objective: f64::NAN,
            values: Vec::new(),
            duals: None,
        }
    }

    pub fn dual(&self, constraint: &str) -> Option<f64> {
        self.duals.as_ref().and_then(|d| d.get(constraint).copied())
    }
}

/// LP/ILP 求解器
pub trait LpBackend: Send + Sync {
    /// 求解器名稱
    fn name(&self) -> &str;

    /// 求解最小化問題；超過 `timeout` 時回傳 `CutStockError::SolverTimeout`
    fn solve(&self, program: &LinearProgram, timeout: Option<Duration>) -> Result<LpOutcome>;
}

impl<B: LpBackend + ?Sized> LpBackend for &B {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn solve(&self, program: &LinearProgram, timeout: Option<Duration>) -> Result<LpOutcome> {
        (**self).solve(program, timeout)
    }
}

impl<B: LpBackend + ?Sized> LpBackend for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn solve(&self, program: &LinearProgram, timeout: Option<Duration>) -> Result<LpOutcome> {
        (**self).solve(program, timeout)
    }
}
