// Hungarian method for the square assignment problem
// Row and column reduction seed the dual labels; each row is then matched by
// growing one alternating tree over zero reduced-cost cells, shifting the
// labels by the smallest slack whenever the tree cannot grow.

use crate::domain::{
    models::{Assignment, AssignmentProblem, SolverSettings, SolverStatistics},
    solver_service::{Result, SolverError, SolverService},
};
use std::time::Instant;
use tracing::debug;

use super::simplex::elapsed_ms;

pub struct HungarianSolver {
    settings: SolverSettings,
}

impl HungarianSolver {
    pub fn new(settings: SolverSettings) -> Self {
        Self { settings }
    }
}

impl Default for HungarianSolver {
    fn default() -> Self {
        Self::new(SolverSettings::default())
    }
}

fn overflow(stage: &str) -> SolverError {
    SolverError::ExecutionFailed(format!(
        "cost magnitudes overflow during {}; rescale the cost matrix",
        stage
    ))
}

/// Dual labels plus the current matching.
///
/// Reduced cost of cell `(i, j)` is `costs[i][j] - row_label[i] - column_label[j]`
/// and never drops below zero. Column `n` is a virtual root that holds the row
/// being inserted.
struct Labels<'a> {
    costs: &'a [Vec<f64>],
    row_label: Vec<f64>,
    column_label: Vec<f64>,
    row_of_column: Vec<Option<usize>>,
    tolerance: f64,
    /// Label shifts by a strictly positive amount
    adjustments: u64,
}

impl<'a> Labels<'a> {
    /// Row reduction followed by column reduction.
    fn reduce(costs: &'a [Vec<f64>], tolerance: f64) -> Result<Self> {
        let n = costs.len();
        let row_label: Vec<f64> = costs
            .iter()
            .map(|row| row.iter().copied().fold(f64::INFINITY, f64::min))
            .collect();
        let mut column_label: Vec<f64> = (0..n)
            .map(|j| {
                costs
                    .iter()
                    .zip(&row_label)
                    .map(|(row, u)| row[j] - u)
                    .fold(f64::INFINITY, f64::min)
            })
            .collect();
        column_label.push(0.0);

        if !row_label.iter().chain(&column_label).all(|x| x.is_finite()) {
            return Err(overflow("matrix reduction"));
        }

        Ok(Self {
            costs,
            row_label,
            column_label,
            row_of_column: vec![None; n + 1],
            tolerance,
            adjustments: 0,
        })
    }

    fn size(&self) -> usize {
        self.costs.len()
    }

    fn reduced(&self, row: usize, column: usize) -> f64 {
        self.costs[row][column] - self.row_label[row] - self.column_label[column]
    }

    /// Extend the matching by `row` along a shortest alternating path.
    ///
    /// Every pass of the loop adds one column to the tree, so it runs at most
    /// `n` times; columns are scanned in ascending order and the smallest
    /// index wins slack ties.
    fn insert_row(&mut self, row: usize) -> Result<()> {
        let n = self.size();
        let root = n;
        self.row_of_column[root] = Some(row);

        let mut slack = vec![f64::INFINITY; n];
        let mut previous = vec![root; n];
        let mut in_tree = vec![false; n + 1];
        let mut current = root;

        loop {
            in_tree[current] = true;
            let tree_row = self.row_of_column[current].ok_or_else(|| {
                SolverError::ExecutionFailed("alternating tree lost its row".to_string())
            })?;

            let mut delta = f64::INFINITY;
            let mut next = None;
            for column in (0..n).filter(|&j| !in_tree[j]) {
                let reduced = self.reduced(tree_row, column);
                if reduced < slack[column] {
                    slack[column] = reduced;
                    previous[column] = current;
                }
                if slack[column] < delta {
                    delta = slack[column];
                    next = Some(column);
                }
            }
            let next = match next {
                Some(column) if delta.is_finite() => column,
                _ => return Err(overflow("label adjustment")),
            };

            if delta > self.tolerance {
                self.adjustments += 1;
            }
            for column in 0..=n {
                if in_tree[column] {
                    if let Some(r) = self.row_of_column[column] {
                        self.row_label[r] += delta;
                    }
                    self.column_label[column] -= delta;
                } else {
                    slack[column] -= delta;
                }
            }

            current = next;
            if self.row_of_column[current].is_none() {
                break;
            }
        }

        // Flip the matched edges along the path back to the root.
        while current != root {
            let parent = previous[current];
            self.row_of_column[current] = self.row_of_column[parent];
            current = parent;
        }
        self.row_of_column[root] = None;
        Ok(())
    }

    /// `(row, column)` pairs ordered by row.
    fn pairs(&self) -> Vec<(usize, usize)> {
        let n = self.size();
        let mut column_of_row = vec![None; n];
        for (column, row) in self.row_of_column[..n].iter().enumerate() {
            if let Some(r) = row {
                column_of_row[*r] = Some(column);
            }
        }
        column_of_row
            .into_iter()
            .enumerate()
            .filter_map(|(row, column)| column.map(|c| (row, c)))
            .collect()
    }
}

impl SolverService for HungarianSolver {
    type Problem = AssignmentProblem;
    type Solution = Assignment;

    fn solve(&self, problem: &AssignmentProblem) -> Result<Assignment> {
        self.validate(problem)?;

        let start_time = Instant::now();
        let n = problem.size();
        let mut labels = Labels::reduce(&problem.costs, self.settings.tolerance)?;

        for row in 0..n {
            labels.insert_row(row)?;
        }
        debug!(adjustments = labels.adjustments, size = n, "hungarian labels settled");

        let pairs = labels.pairs();
        if pairs.len() != n {
            return Err(SolverError::ExecutionFailed(format!(
                "matching covers {} of {} rows",
                pairs.len(),
                n
            )));
        }
        let total_cost: f64 = pairs.iter().map(|&(i, j)| problem.costs[i][j]).sum();
        if !total_cost.is_finite() {
            return Err(overflow("cost summation"));
        }

        Ok(Assignment {
            pairs,
            total_cost,
            statistics: SolverStatistics {
                iterations: labels.adjustments,
                phase_one_iterations: 0,
                solve_time_ms: elapsed_ms(start_time),
                num_rows: n as u32,
                num_columns: n as u32,
            },
        })
    }

    fn name(&self) -> &str {
        "Hungarian Method"
    }

    fn capabilities(&self) -> Vec<&'static str> {
        vec![
            "Minimum-cost perfect matching",
            "Square cost matrices",
            "O(n^3) shortest augmenting paths",
        ]
    }
}
