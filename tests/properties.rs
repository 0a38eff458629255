//! Property-based tests for the solver engines
//!
//! - assignments are bijections and match brute-force permutation search
//! - shipment plans conserve supply and demand and match the simplex engine
//! - optimal LP solutions satisfy every constraint
//! - two-variable programs agree with exhaustive vertex enumeration

use orsolve::{
    AssignmentProblem, ConstraintSign, HungarianSolver, LinearProgram, SimplexSolver,
    SolutionStatus, SolverService, TransportationProblem, TransportationSolver,
};
use proptest::prelude::*;

const EPS: f64 = 1e-6;

fn permutations(n: usize) -> Vec<Vec<usize>> {
    if n == 0 {
        return vec![Vec::new()];
    }
    let mut out = Vec::new();
    for perm in permutations(n - 1) {
        for pos in 0..=perm.len() {
            let mut next = perm.clone();
            next.insert(pos, n - 1);
            out.push(next);
        }
    }
    out
}

fn square_matrix() -> impl Strategy<Value = Vec<Vec<f64>>> {
    (1usize..=5).prop_flat_map(|n| {
        prop::collection::vec(prop::collection::vec(-10i32..30, n), n).prop_map(|rows| {
            rows.into_iter()
                .map(|row| row.into_iter().map(f64::from).collect())
                .collect()
        })
    })
}

fn transportation_instance() -> impl Strategy<Value = TransportationProblem> {
    (1usize..=4, 1usize..=4).prop_flat_map(|(m, n)| {
        (
            prop::collection::vec(0u32..40, m),
            prop::collection::vec(0u32..40, n),
            prop::collection::vec(prop::collection::vec(0u32..20, n), m),
        )
            .prop_map(|(supply, demand, costs)| {
                TransportationProblem::new(
                    supply.into_iter().map(f64::from).collect(),
                    demand.into_iter().map(f64::from).collect(),
                    costs
                        .into_iter()
                        .map(|row| row.into_iter().map(f64::from).collect())
                        .collect(),
                )
            })
    })
}

/// The same shipment problem written as a linear program over `m * n` flows.
fn as_linear_program(problem: &TransportationProblem) -> LinearProgram {
    let m = problem.num_sources();
    let n = problem.num_destinations();
    let surplus = problem.total_supply() >= problem.total_demand();
    let (source_sign, destination_sign) = if surplus {
        (ConstraintSign::LessEqual, ConstraintSign::Equal)
    } else {
        (ConstraintSign::Equal, ConstraintSign::LessEqual)
    };

    let mut lp = LinearProgram::minimize(problem.costs.iter().flatten().copied().collect());
    for i in 0..m {
        let row = (0..m * n).map(|k| if k / n == i { 1.0 } else { 0.0 }).collect();
        lp = lp.add_constraint(row, source_sign, problem.supply[i]);
    }
    for j in 0..n {
        let row = (0..m * n).map(|k| if k % n == j { 1.0 } else { 0.0 }).collect();
        lp = lp.add_constraint(row, destination_sign, problem.demand[j]);
    }
    lp
}

fn linear_program() -> impl Strategy<Value = LinearProgram> {
    linear_program_over(1..=4)
}

fn linear_program_over(
    variables: std::ops::RangeInclusive<usize>,
) -> impl Strategy<Value = LinearProgram> {
    (variables, 1usize..=4).prop_flat_map(|(vars, rows)| {
        (
            prop::collection::vec(-5i32..10, vars),
            prop::collection::vec(prop::collection::vec(-3i32..8, vars), rows),
            prop::collection::vec(-5i32..25, rows),
            prop::collection::vec(0u8..4, rows),
            any::<bool>(),
        )
            .prop_map(|(objective, matrix, rhs, signs, maximize)| {
                let objective = objective.into_iter().map(f64::from).collect();
                let mut lp = if maximize {
                    LinearProgram::maximize(objective)
                } else {
                    LinearProgram::minimize(objective)
                };
                for ((row, b), sign) in matrix.into_iter().zip(rhs).zip(signs) {
                    let sign = match sign {
                        0 | 1 => ConstraintSign::LessEqual,
                        2 => ConstraintSign::GreaterEqual,
                        _ => ConstraintSign::Equal,
                    };
                    lp = lp.add_constraint(row.into_iter().map(f64::from).collect(), sign, f64::from(b));
                }
                lp
            })
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Reference {
    Infeasible,
    Unbounded,
    Optimal(f64),
}

fn satisfies(lp: &LinearProgram, activities: &[f64], homogeneous: bool) -> bool {
    activities.iter().zip(&lp.signs).zip(&lp.rhs).all(|((&a, sign), &b)| {
        let b = if homogeneous { 0.0 } else { b };
        match sign {
            ConstraintSign::LessEqual => a <= b + EPS,
            ConstraintSign::GreaterEqual => a >= b - EPS,
            ConstraintSign::Equal => (a - b).abs() <= EPS,
        }
    })
}

fn improves(lp: &LinearProgram, gain: f64) -> bool {
    if lp.direction.is_maximize() {
        gain > EPS
    } else {
        gain < -EPS
    }
}

/// Exhaustive answer for a two-variable program.
///
/// The feasible region lies in the non-negative quadrant, so it is empty
/// exactly when no pairwise intersection of constraint lines and axes is
/// feasible. Unboundedness is decided on the extreme rays of the recession
/// cone, which lie on `d1 + d2 = 1`.
fn enumerate_vertices(lp: &LinearProgram) -> Reference {
    let mut lines: Vec<([f64; 2], f64)> = lp
        .constraints
        .iter()
        .zip(&lp.rhs)
        .map(|(row, &b)| ([row[0], row[1]], b))
        .collect();
    lines.push(([1.0, 0.0], 0.0));
    lines.push(([0.0, 1.0], 0.0));

    let mut best: Option<f64> = None;
    for (k, &(a, b)) in lines.iter().enumerate() {
        for &(c, d) in &lines[k + 1..] {
            let det = a[0] * c[1] - c[0] * a[1];
            if det.abs() < 1e-12 {
                continue;
            }
            let x = [(b * c[1] - d * a[1]) / det, (a[0] * d - c[0] * b) / det];
            if x.iter().any(|&v| v < -EPS) || !satisfies(lp, &lp.row_activities(&x), false) {
                continue;
            }
            let value = lp.objective_value(&x);
            let better = match best {
                None => true,
                Some(current) => improves(lp, value - current),
            };
            if better {
                best = Some(value);
            }
        }
    }
    let Some(best) = best else {
        return Reference::Infeasible;
    };

    let mut rays = vec![[1.0, 0.0], [0.0, 1.0]];
    for row in &lp.constraints {
        let denominator = row[1] - row[0];
        if denominator != 0.0 {
            let t = row[1] / denominator;
            if (0.0..=1.0).contains(&t) {
                rays.push([t, 1.0 - t]);
            }
        }
    }
    let unbounded = rays.iter().any(|ray| {
        satisfies(lp, &lp.row_activities(ray), true) && improves(lp, lp.objective_value(ray))
    });
    if unbounded {
        Reference::Unbounded
    } else {
        Reference::Optimal(best)
    }
}

proptest! {
    #[test]
    fn assignment_is_a_minimal_bijection(costs in square_matrix()) {
        let n = costs.len();
        let problem = AssignmentProblem::new(costs.clone());
        let assignment = HungarianSolver::default().solve(&problem).unwrap();

        prop_assert_eq!(assignment.pairs.len(), n);
        let mut columns: Vec<usize> = assignment.pairs.iter().map(|&(_, c)| c).collect();
        columns.sort_unstable();
        prop_assert_eq!(columns, (0..n).collect::<Vec<_>>());
        let rows: Vec<usize> = assignment.pairs.iter().map(|&(r, _)| r).collect();
        prop_assert_eq!(rows, (0..n).collect::<Vec<_>>());

        let recomputed: f64 = assignment.pairs.iter().map(|&(r, c)| costs[r][c]).sum();
        prop_assert!((recomputed - assignment.total_cost).abs() < EPS);

        let best = permutations(n)
            .iter()
            .map(|perm| perm.iter().enumerate().map(|(r, &c)| costs[r][c]).sum::<f64>())
            .fold(f64::INFINITY, f64::min);
        prop_assert!((best - assignment.total_cost).abs() < EPS);
    }

    #[test]
    fn shipment_plan_conserves_and_is_minimal(problem in transportation_instance()) {
        let plan = TransportationSolver::default().solve(&problem).unwrap();
        prop_assert!(plan.is_optimal());
        prop_assert_eq!(plan.flows.len(), problem.num_sources());

        let surplus = problem.total_supply() >= problem.total_demand();
        for (i, &s) in problem.supply.iter().enumerate() {
            let shipped = plan.shipped_from(i);
            if surplus {
                prop_assert!(shipped <= s + EPS);
            } else {
                prop_assert!((shipped - s).abs() < EPS);
            }
        }
        for (j, &d) in problem.demand.iter().enumerate() {
            let delivered = plan.delivered_to(j);
            if surplus {
                prop_assert!((delivered - d).abs() < EPS);
            } else {
                prop_assert!(delivered <= d + EPS);
            }
        }
        prop_assert!(plan.flows.iter().flatten().all(|&x| x >= 0.0));

        let reference = SimplexSolver::default().solve(&as_linear_program(&problem)).unwrap();
        prop_assert_eq!(reference.status, SolutionStatus::Optimal);
        let reference_cost = reference.optimal_value.unwrap();
        prop_assert!(
            (reference_cost - plan.total_cost).abs() < EPS,
            "MODI cost {} differs from simplex cost {}",
            plan.total_cost,
            reference_cost
        );
    }

    #[test]
    fn optimal_lp_solutions_are_feasible(lp in linear_program()) {
        let solution = SimplexSolver::default().solve(&lp).unwrap();
        if solution.is_optimal() {
            let x = &solution.variable_values;
            prop_assert_eq!(x.len(), lp.num_variables());
            prop_assert!(x.iter().all(|&v| v >= -EPS));

            for ((activity, sign), &b) in lp.row_activities(x).iter().zip(&lp.signs).zip(&lp.rhs) {
                match sign {
                    ConstraintSign::LessEqual => prop_assert!(*activity <= b + EPS),
                    ConstraintSign::GreaterEqual => prop_assert!(*activity >= b - EPS),
                    ConstraintSign::Equal => prop_assert!((*activity - b).abs() < EPS),
                }
            }
            let value = solution.optimal_value.unwrap();
            prop_assert!((lp.objective_value(x) - value).abs() < EPS);
            prop_assert!(solution.slack.iter().all(|&s| s >= -EPS));
        } else {
            prop_assert!(solution.optimal_value.is_none());
            prop_assert!(!solution.message.is_empty());
        }
    }

    #[test]
    fn two_variable_programs_match_vertex_enumeration(lp in linear_program_over(2..=2)) {
        let solution = SimplexSolver::default().solve(&lp).unwrap();
        match enumerate_vertices(&lp) {
            Reference::Infeasible => {
                prop_assert_eq!(solution.status, SolutionStatus::Infeasible);
            }
            Reference::Unbounded => {
                prop_assert_eq!(solution.status, SolutionStatus::Unbounded);
            }
            Reference::Optimal(best) => {
                prop_assert_eq!(solution.status, SolutionStatus::Optimal);
                let value = solution.optimal_value.unwrap();
                prop_assert!(
                    (value - best).abs() < EPS,
                    "simplex value {} differs from best vertex {}",
                    value,
                    best
                );
            }
        }
    }

    #[test]
    fn solves_are_deterministic(lp in linear_program(), problem in transportation_instance()) {
        let simplex = SimplexSolver::default();
        let a = simplex.solve(&lp).unwrap();
        let b = simplex.solve(&lp).unwrap();
        prop_assert_eq!(a.status, b.status);
        prop_assert_eq!(a.variable_values, b.variable_values);
        prop_assert_eq!(a.optimal_value, b.optimal_value);

        let planner = TransportationSolver::default();
        let p = planner.solve(&problem).unwrap();
        let q = planner.solve(&problem).unwrap();
        prop_assert_eq!(p.flows, q.flows);
        prop_assert_eq!(p.total_cost, q.total_cost);
    }
}
