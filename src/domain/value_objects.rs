// Domain value objects representing core business concepts

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Comparison sign of a linear constraint row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintSign {
    /// Less than or equal (≤)
    #[serde(rename = "<=")]
    LessEqual,
    /// Greater than or equal (≥)
    #[serde(rename = ">=")]
    GreaterEqual,
    /// Equal (=)
    #[serde(rename = "=")]
    Equal,
}

impl ConstraintSign {
    /// Sign obtained after multiplying both sides of the row by -1.
    pub fn flipped(self) -> Self {
        match self {
            ConstraintSign::LessEqual => ConstraintSign::GreaterEqual,
            ConstraintSign::GreaterEqual => ConstraintSign::LessEqual,
            ConstraintSign::Equal => ConstraintSign::Equal,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConstraintSign::LessEqual => "<=",
            ConstraintSign::GreaterEqual => ">=",
            ConstraintSign::Equal => "=",
        }
    }
}

impl fmt::Display for ConstraintSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a textual constraint sign is not one of `<=`, `>=`, `=`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown constraint sign '{0}', expected one of <=, >=, =")]
pub struct ParseSignError(pub String);

impl FromStr for ConstraintSign {
    type Err = ParseSignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "<=" | "≤" => Ok(ConstraintSign::LessEqual),
            ">=" | "≥" => Ok(ConstraintSign::GreaterEqual),
            "=" | "==" => Ok(ConstraintSign::Equal),
            other => Err(ParseSignError(other.to_string())),
        }
    }
}

/// Direction of optimization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizationDirection {
    /// Minimize the objective function
    Minimize,
    /// Maximize the objective function
    Maximize,
}

impl OptimizationDirection {
    pub fn from_maximize(maximize: bool) -> Self {
        if maximize {
            OptimizationDirection::Maximize
        } else {
            OptimizationDirection::Minimize
        }
    }

    pub fn is_maximize(self) -> bool {
        self == OptimizationDirection::Maximize
    }
}

/// Status of a solve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// Found optimal solution
    Optimal,
    /// Problem has no feasible solution
    Infeasible,
    /// Objective can be improved infinitely
    Unbounded,
    /// Pivot budget exhausted before optimality was proven
    IterationLimit,
}

impl SolutionStatus {
    pub fn is_success(self) -> bool {
        self == SolutionStatus::Optimal
    }
}

impl fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolutionStatus::Optimal => write!(f, "Optimal"),
            SolutionStatus::Infeasible => write!(f, "Infeasible"),
            SolutionStatus::Unbounded => write!(f, "Unbounded"),
            SolutionStatus::IterationLimit => write!(f, "Iteration Limit Reached"),
        }
    }
}
