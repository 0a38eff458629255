// Two-phase dense tableau simplex
// Minimizes internally; a maximization request is solved on the negated objective.

use crate::domain::{
    models::{dot, LinearProgram, LpSolution, SolverSettings, SolverStatistics},
    solver_service::{Result, SolverError, SolverService},
    value_objects::{ConstraintSign, SolutionStatus},
};
use std::time::Instant;
use tracing::{debug, warn};

pub struct SimplexSolver {
    settings: SolverSettings,
}

impl SimplexSolver {
    pub fn new(settings: SolverSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }
}

impl Default for SimplexSolver {
    fn default() -> Self {
        Self::new(SolverSettings::default())
    }
}

/// Column ranges of the standardized problem.
///
/// `[0, structural)` decision variables, `[structural, real)` slack and
/// surplus columns, `[real, total)` artificial columns.
#[derive(Debug, Clone, Copy)]
struct Layout {
    structural: usize,
    real: usize,
    total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PivotOutcome {
    Optimal,
    Unbounded,
    IterationLimit,
}

/// Constraint rows plus a reduced-cost row.
///
/// Every row stores its right-hand side in the last position. The last entry
/// of `costs` holds the negated objective value of the current basis.
#[derive(Debug, Clone)]
struct Tableau {
    rows: Vec<Vec<f64>>,
    basis: Vec<usize>,
    costs: Vec<f64>,
    columns: usize,
}

impl Tableau {
    fn standardize(problem: &LinearProgram) -> (Self, Layout) {
        let structural = problem.num_variables();

        // Rows with a negative right-hand side are mirrored so every basic value starts non-negative.
        let rows: Vec<(Vec<f64>, ConstraintSign, f64)> = problem
            .constraints
            .iter()
            .zip(&problem.signs)
            .zip(&problem.rhs)
            .map(|((row, &sign), &b)| {
                if b < 0.0 {
                    (row.iter().map(|a| -a).collect(), sign.flipped(), -b)
                } else {
                    (row.clone(), sign, b)
                }
            })
            .collect();

        let slack_count = rows
            .iter()
            .filter(|(_, sign, _)| *sign != ConstraintSign::Equal)
            .count();
        let artificial_count = rows
            .iter()
            .filter(|(_, sign, _)| *sign != ConstraintSign::LessEqual)
            .count();
        let layout = Layout {
            structural,
            real: structural + slack_count,
            total: structural + slack_count + artificial_count,
        };

        let mut next_slack = layout.structural;
        let mut next_artificial = layout.real;
        let mut tableau_rows = Vec::with_capacity(rows.len());
        let mut basis = Vec::with_capacity(rows.len());

        for (coefficients, sign, b) in rows {
            let mut row = vec![0.0; layout.total + 1];
            row[..structural].copy_from_slice(&coefficients);
            row[layout.total] = b;

            match sign {
                ConstraintSign::LessEqual => {
                    row[next_slack] = 1.0;
                    basis.push(next_slack);
                    next_slack += 1;
                }
                ConstraintSign::GreaterEqual => {
                    row[next_slack] = -1.0;
                    row[next_artificial] = 1.0;
                    basis.push(next_artificial);
                    next_slack += 1;
                    next_artificial += 1;
                }
                ConstraintSign::Equal => {
                    row[next_artificial] = 1.0;
                    basis.push(next_artificial);
                    next_artificial += 1;
                }
            }
            tableau_rows.push(row);
        }

        let tableau = Tableau {
            rows: tableau_rows,
            basis,
            costs: vec![0.0; layout.total + 1],
            columns: layout.total,
        };
        (tableau, layout)
    }

    fn rhs(&self, row: usize) -> f64 {
        self.rows[row][self.columns]
    }

    fn objective(&self) -> f64 {
        -self.costs[self.columns]
    }

    /// Rebuild the reduced-cost row for the given column costs and the current basis.
    fn price_out(&mut self, column_costs: &[f64]) {
        self.costs = column_costs.to_vec();
        self.costs.push(0.0);
        for (row, &basic) in self.rows.iter().zip(&self.basis) {
            let cb = column_costs[basic];
            if cb != 0.0 {
                for (c, a) in self.costs.iter_mut().zip(row) {
                    *c -= cb * a;
                }
            }
        }
    }

    /// Most negative reduced cost, smallest column index on ties.
    fn entering_column(&self, tolerance: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (j, &d) in self.costs[..self.columns].iter().enumerate() {
            if d < -tolerance && best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((j, d));
            }
        }
        best.map(|(j, _)| j)
    }

    /// Minimum ratio over rows with a positive pivot entry, smallest basic index on ties.
    fn leaving_row(&self, column: usize, tolerance: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, row) in self.rows.iter().enumerate() {
            let a = row[column];
            if a <= tolerance {
                continue;
            }
            let ratio = self.rhs(i).max(0.0) / a;
            best = match best {
                None => Some((i, ratio)),
                Some((r, best_ratio)) => {
                    if ratio < best_ratio - tolerance
                        || ((ratio - best_ratio).abs() <= tolerance
                            && self.basis[i] < self.basis[r])
                    {
                        Some((i, ratio))
                    } else {
                        Some((r, best_ratio))
                    }
                }
            };
        }
        best.map(|(i, _)| i)
    }

    fn pivot(&mut self, row: usize, column: usize) {
        let scale = self.rows[row][column];
        for a in self.rows[row].iter_mut() {
            *a /= scale;
        }
        self.rows[row][column] = 1.0;

        let pivot_row = self.rows[row].clone();
        for (i, other) in self.rows.iter_mut().enumerate() {
            if i != row {
                eliminate(other, &pivot_row, column);
            }
        }
        eliminate(&mut self.costs, &pivot_row, column);
        self.basis[row] = column;
    }

    /// Pivot until optimal, unbounded, or `*iterations` reaches `limit`.
    fn run(&mut self, tolerance: f64, iterations: &mut usize, limit: usize) -> PivotOutcome {
        loop {
            let Some(column) = self.entering_column(tolerance) else {
                return PivotOutcome::Optimal;
            };
            let Some(row) = self.leaving_row(column, tolerance) else {
                return PivotOutcome::Unbounded;
            };
            if *iterations >= limit {
                return PivotOutcome::IterationLimit;
            }
            self.pivot(row, column);
            *iterations += 1;
        }
    }

    /// Move zero-valued artificial variables out of the basis and drop redundant rows.
    fn expel_artificials(&mut self, layout: Layout, tolerance: f64) {
        let mut redundant = Vec::new();
        for i in 0..self.rows.len() {
            if self.basis[i] < layout.real {
                continue;
            }
            let replacement = (0..layout.real).find(|&j| self.rows[i][j].abs() > tolerance);
            match replacement {
                Some(j) => self.pivot(i, j),
                None => redundant.push(i),
            }
        }
        for &i in redundant.iter().rev() {
            self.rows.remove(i);
            self.basis.remove(i);
        }
    }

    fn drop_artificial_columns(&mut self, layout: Layout) {
        for row in self.rows.iter_mut() {
            let rhs = row[self.columns];
            row.truncate(layout.real);
            row.push(rhs);
        }
        self.columns = layout.real;
    }

    fn basic_values(&self, structural: usize, tolerance: f64) -> Vec<f64> {
        let mut values = vec![0.0; structural];
        for (i, &basic) in self.basis.iter().enumerate() {
            if basic < structural {
                values[basic] = clean(self.rhs(i), tolerance);
            }
        }
        values
    }
}

fn eliminate(target: &mut [f64], pivot_row: &[f64], column: usize) {
    let factor = target[column];
    if factor == 0.0 {
        return;
    }
    for (t, p) in target.iter_mut().zip(pivot_row) {
        *t -= factor * p;
    }
    target[column] = 0.0;
}

/// Snap values within tolerance of zero to exactly zero.
fn clean(value: f64, tolerance: f64) -> f64 {
    if value.abs() <= tolerance {
        0.0
    } else {
        value
    }
}

fn constraint_slack(problem: &LinearProgram, x: &[f64], tolerance: f64) -> Vec<f64> {
    problem
        .constraints
        .iter()
        .zip(&problem.signs)
        .zip(&problem.rhs)
        .map(|((row, sign), &b)| {
            let activity = dot(row, x);
            let slack = match sign {
                ConstraintSign::GreaterEqual => activity - b,
                ConstraintSign::LessEqual | ConstraintSign::Equal => b - activity,
            };
            clean(slack, tolerance)
        })
        .collect()
}

impl SolverService for SimplexSolver {
    type Problem = LinearProgram;
    type Solution = LpSolution;

    fn solve(&self, problem: &LinearProgram) -> Result<LpSolution> {
        self.validate(problem)?;

        let start_time = Instant::now();
        let tolerance = self.settings.tolerance;
        let limit = self.settings.max_iterations;
        let maximize = problem.direction.is_maximize();

        let (mut tableau, layout) = Tableau::standardize(problem);
        let mut statistics = SolverStatistics {
            num_rows: problem.num_constraints() as u32,
            num_columns: layout.total as u32,
            ..SolverStatistics::default()
        };
        let mut iterations = 0usize;

        // Phase 1: minimize the sum of artificial variables
        if layout.total > layout.real {
            let phase_one_costs: Vec<f64> = (0..layout.total)
                .map(|j| if j >= layout.real { 1.0 } else { 0.0 })
                .collect();
            tableau.price_out(&phase_one_costs);

            match tableau.run(tolerance, &mut iterations, limit) {
                PivotOutcome::Optimal => {}
                PivotOutcome::IterationLimit => {
                    return Ok(iteration_limit(limit, iterations, statistics, start_time));
                }
                PivotOutcome::Unbounded => {
                    return Err(SolverError::ExecutionFailed(
                        "phase one reported an unbounded auxiliary problem".to_string(),
                    ));
                }
            }
            statistics.phase_one_iterations = iterations as u64;

            let scale = 1.0 + problem.rhs.iter().map(|b| b.abs()).sum::<f64>();
            let infeasibility = tableau.objective();
            debug!(iterations, infeasibility, "simplex phase one finished");
            if infeasibility > tolerance * scale {
                statistics.iterations = iterations as u64;
                statistics.solve_time_ms = elapsed_ms(start_time);
                return Ok(LpSolution::new(
                    SolutionStatus::Infeasible,
                    "Problem is infeasible: no solution satisfies all constraints",
                )
                .with_statistics(statistics));
            }

            tableau.expel_artificials(layout, tolerance);
            tableau.drop_artificial_columns(layout);
        }

        // Phase 2: minimize the real objective over the feasible basis
        let mut phase_two_costs = vec![0.0; layout.real];
        for (cost, &c) in phase_two_costs.iter_mut().zip(&problem.objective) {
            *cost = if maximize { -c } else { c };
        }
        tableau.price_out(&phase_two_costs);

        let outcome = tableau.run(tolerance, &mut iterations, limit);
        statistics.iterations = iterations as u64;
        debug!(
            iterations,
            phase_two = iterations as u64 - statistics.phase_one_iterations,
            "simplex phase two finished"
        );

        match outcome {
            PivotOutcome::Optimal => {
                let values = tableau.basic_values(layout.structural, tolerance);
                let minimized = tableau.objective();
                let value = clean(if maximize { -minimized } else { minimized }, tolerance);
                let slack = constraint_slack(problem, &values, tolerance);
                statistics.solve_time_ms = elapsed_ms(start_time);
                Ok(LpSolution::optimal(value, values, slack).with_statistics(statistics))
            }
            PivotOutcome::Unbounded => {
                statistics.solve_time_ms = elapsed_ms(start_time);
                Ok(LpSolution::new(
                    SolutionStatus::Unbounded,
                    "Problem is unbounded: objective can be improved infinitely",
                )
                .with_statistics(statistics))
            }
            PivotOutcome::IterationLimit => {
                Ok(iteration_limit(limit, iterations, statistics, start_time))
            }
        }
    }

    fn name(&self) -> &str {
        "Two-Phase Simplex"
    }

    fn capabilities(&self) -> Vec<&'static str> {
        vec![
            "Linear Programming",
            "Maximize and Minimize",
            "<=, >= and = constraints",
            "Infeasibility and unboundedness detection",
        ]
    }
}

fn iteration_limit(
    limit: usize,
    iterations: usize,
    mut statistics: SolverStatistics,
    start_time: Instant,
) -> LpSolution {
    warn!(limit, "simplex stopped at the iteration limit");
    statistics.iterations = iterations as u64;
    statistics.solve_time_ms = elapsed_ms(start_time);
    LpSolution::new(
        SolutionStatus::IterationLimit,
        format!(
            "Iteration limit of {} pivots reached before optimality was proven",
            limit
        ),
    )
    .with_statistics(statistics)
}

pub(crate) fn elapsed_ms(start_time: Instant) -> f64 {
    start_time.elapsed().as_secs_f64() * 1000.0
}
