use super::value_objects::{ConstraintSign, OptimizationDirection, SolutionStatus};

/// Linear program over non-negative decision variables.
///
/// Rows are kept as parallel vectors so that shape mismatches coming from a
/// caller survive until validation instead of being silently truncated.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearProgram {
    pub direction: OptimizationDirection,
    pub objective: Vec<f64>,
    pub constraints: Vec<Vec<f64>>,
    pub rhs: Vec<f64>,
    pub signs: Vec<ConstraintSign>,
}

impl LinearProgram {
    pub fn new(direction: OptimizationDirection, objective: Vec<f64>) -> Self {
        Self {
            direction,
            objective,
            constraints: Vec::new(),
            rhs: Vec::new(),
            signs: Vec::new(),
        }
    }

    pub fn maximize(objective: Vec<f64>) -> Self {
        Self::new(OptimizationDirection::Maximize, objective)
    }

    pub fn minimize(objective: Vec<f64>) -> Self {
        Self::new(OptimizationDirection::Minimize, objective)
    }

    pub fn add_constraint(mut self, coefficients: Vec<f64>, sign: ConstraintSign, rhs: f64) -> Self {
        self.constraints.push(coefficients);
        self.signs.push(sign);
        self.rhs.push(rhs);
        self
    }

    pub fn num_variables(&self) -> usize {
        self.objective.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Value of the objective at `x`.
    pub fn objective_value(&self, x: &[f64]) -> f64 {
        dot(&self.objective, x)
    }

    /// Left-hand side of every constraint row at `x`.
    pub fn row_activities(&self, x: &[f64]) -> Vec<f64> {
        self.constraints.iter().map(|row| dot(row, x)).collect()
    }
}

/// Square cost matrix for the assignment problem.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentProblem {
    pub costs: Vec<Vec<f64>>,
}

impl AssignmentProblem {
    pub fn new(costs: Vec<Vec<f64>>) -> Self {
        Self { costs }
    }

    pub fn size(&self) -> usize {
        self.costs.len()
    }
}

/// Sources with fixed supply shipping to destinations with fixed demand.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportationProblem {
    pub supply: Vec<f64>,
    pub demand: Vec<f64>,
    pub costs: Vec<Vec<f64>>,
}

impl TransportationProblem {
    pub fn new(supply: Vec<f64>, demand: Vec<f64>, costs: Vec<Vec<f64>>) -> Self {
        Self {
            supply,
            demand,
            costs,
        }
    }

    pub fn num_sources(&self) -> usize {
        self.supply.len()
    }

    pub fn num_destinations(&self) -> usize {
        self.demand.len()
    }

    pub fn total_supply(&self) -> f64 {
        self.supply.iter().sum()
    }

    pub fn total_demand(&self) -> f64 {
        self.demand.iter().sum()
    }
}

/// Numeric knobs shared by every engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverSettings {
    /// Absolute tolerance for every floating-point comparison
    pub tolerance: f64,
    /// Upper bound on pivots (simplex) or improvement steps (MODI)
    pub max_iterations: usize,
}

impl SolverSettings {
    pub const DEFAULT_TOLERANCE: f64 = 1e-9;
    pub const DEFAULT_MAX_ITERATIONS: usize = 5000;

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            tolerance: Self::DEFAULT_TOLERANCE,
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Statistics about the solve process
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolverStatistics {
    pub iterations: u64,
    pub phase_one_iterations: u64,
    pub solve_time_ms: f64,
    pub num_rows: u32,
    pub num_columns: u32,
}

/// Outcome of a linear program solve
#[derive(Debug, Clone)]
pub struct LpSolution {
    pub status: SolutionStatus,
    pub optimal_value: Option<f64>,
    pub variable_values: Vec<f64>,
    /// Per-constraint slack, empty unless optimal
    pub slack: Vec<f64>,
    pub message: String,
    pub statistics: SolverStatistics,
}

impl LpSolution {
    pub fn new(status: SolutionStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            optimal_value: None,
            variable_values: Vec::new(),
            slack: Vec::new(),
            message: message.into(),
            statistics: SolverStatistics::default(),
        }
    }

    pub fn optimal(value: f64, variable_values: Vec<f64>, slack: Vec<f64>) -> Self {
        Self {
            status: SolutionStatus::Optimal,
            optimal_value: Some(value),
            variable_values,
            slack,
            message: "Optimal solution found".to_string(),
            statistics: SolverStatistics::default(),
        }
    }

    pub fn with_statistics(mut self, statistics: SolverStatistics) -> Self {
        self.statistics = statistics;
        self
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }
}

/// A perfect matching of rows to columns
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// `(row, col)` pairs ordered by row
    pub pairs: Vec<(usize, usize)>,
    /// Sum of the original costs at the selected cells
    pub total_cost: f64,
    pub statistics: SolverStatistics,
}

impl Assignment {
    /// Column assigned to `row`.
    pub fn column_of(&self, row: usize) -> Option<usize> {
        self.pairs.iter().find(|&&(r, _)| r == row).map(|&(_, c)| c)
    }
}

/// Flows from every real source to every real destination
#[derive(Debug, Clone)]
pub struct ShipmentPlan {
    pub status: SolutionStatus,
    pub flows: Vec<Vec<f64>>,
    pub total_cost: f64,
    pub message: String,
    pub statistics: SolverStatistics,
}

impl ShipmentPlan {
    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }

    pub fn shipped_from(&self, source: usize) -> f64 {
        self.flows.get(source).map(|row| row.iter().sum()).unwrap_or(0.0)
    }

    pub fn delivered_to(&self, destination: usize) -> f64 {
        self.flows
            .iter()
            .filter_map(|row| row.get(destination))
            .sum()
    }
}

pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_rows_parallel() {
        let lp = LinearProgram::maximize(vec![3.0, 5.0])
            .add_constraint(vec![1.0, 0.0], ConstraintSign::LessEqual, 4.0)
            .add_constraint(vec![0.0, 2.0], ConstraintSign::LessEqual, 12.0);
        assert_eq!(lp.num_variables(), 2);
        assert_eq!(lp.num_constraints(), 2);
        assert_eq!(lp.rhs, vec![4.0, 12.0]);
        assert_eq!(lp.objective_value(&[2.0, 6.0]), 36.0);
        assert_eq!(lp.row_activities(&[2.0, 6.0]), vec![2.0, 12.0]);
    }

    #[test]
    fn plan_marginals() {
        let plan = ShipmentPlan {
            status: SolutionStatus::Optimal,
            flows: vec![vec![1.0, 2.0], vec![3.0, 4.0]],
            total_cost: 0.0,
            message: String::new(),
            statistics: SolverStatistics::default(),
        };
        assert_eq!(plan.shipped_from(1), 7.0);
        assert_eq!(plan.delivered_to(0), 4.0);
        assert_eq!(plan.shipped_from(5), 0.0);
    }
}
