// Domain service interface for the solver engines
// Every engine is a pure function of its input; implementations hold only settings.

use super::validation::Validate;

/// Error types for the solver service
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    #[error("Solver execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(String),

    #[error("Malformed request: {0}")]
    Json(#[from] serde_json::Error),
}

impl SolverError {
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, SolverError::InvalidProblem(_) | SolverError::Json(_))
    }
}

pub type Result<T> = std::result::Result<T, SolverError>;

/// Domain service interface for optimization engines
///
/// `solve` must reject invalid input through [`SolverService::validate`]
/// before touching any working matrix. Algorithmic outcomes such as an
/// infeasible program are reported inside `Self::Solution`, never as `Err`.
pub trait SolverService: Send + Sync {
    type Problem: Validate;
    type Solution;

    /// Solve a problem
    fn solve(&self, problem: &Self::Problem) -> Result<Self::Solution>;

    /// Validate a problem without solving it
    fn validate(&self, problem: &Self::Problem) -> Result<()> {
        problem.validate()
    }

    /// Get the name of this engine
    fn name(&self) -> &str;

    /// Short human readable capabilities of this engine
    fn capabilities(&self) -> Vec<&'static str> {
        Vec::new()
    }
}
