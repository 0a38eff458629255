// Transportation engine
// Balance with a zero-cost dummy node, seed a basis with Vogel's approximation,
// then improve it with the modified distribution (MODI) method.

use crate::domain::{
    models::{ShipmentPlan, SolverSettings, SolverStatistics, TransportationProblem},
    solver_service::{Result, SolverError, SolverService},
    value_objects::SolutionStatus,
};
use std::collections::VecDeque;
use std::time::Instant;
use tracing::{debug, warn};

use super::simplex::elapsed_ms;

pub struct TransportationSolver {
    settings: SolverSettings,
}

impl TransportationSolver {
    pub fn new(settings: SolverSettings) -> Self {
        Self { settings }
    }
}

impl Default for TransportationSolver {
    fn default() -> Self {
        Self::new(SolverSettings::default())
    }
}

/// Synthetic node added to absorb a supply/demand difference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DummyNode {
    Source,
    Destination,
}

/// Balanced network the engine works on; may be one row or column larger
/// than the caller's problem.
#[derive(Debug, Clone)]
struct Network {
    costs: Vec<Vec<f64>>,
    supply: Vec<f64>,
    demand: Vec<f64>,
    dummy: Option<(DummyNode, f64)>,
}

impl Network {
    fn balance(problem: &TransportationProblem, tolerance: f64) -> Self {
        let mut network = Network {
            costs: problem.costs.clone(),
            supply: problem.supply.clone(),
            demand: problem.demand.clone(),
            dummy: None,
        };

        let total_supply = problem.total_supply();
        let total_demand = problem.total_demand();
        let scale = 1.0 + total_supply.max(total_demand);
        let difference = total_supply - total_demand;

        if difference > tolerance * scale {
            for row in network.costs.iter_mut() {
                row.push(0.0);
            }
            network.demand.push(difference);
            network.dummy = Some((DummyNode::Destination, difference));
        } else if -difference > tolerance * scale {
            network.costs.push(vec![0.0; problem.num_destinations()]);
            network.supply.push(-difference);
            network.dummy = Some((DummyNode::Source, -difference));
        }
        network
    }

    fn sources(&self) -> usize {
        self.supply.len()
    }

    fn destinations(&self) -> usize {
        self.demand.len()
    }

    fn max_abs_cost(&self) -> f64 {
        self.costs
            .iter()
            .flatten()
            .fold(0.0, |acc: f64, c| acc.max(c.abs()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line {
    Row(usize),
    Column(usize),
}

/// Allocation matrix plus the set of basic cells.
///
/// Basic cells always form a spanning tree over the `m + n` nodes, so a basic
/// cell may carry zero flow.
#[derive(Debug, Clone)]
struct Basis {
    flows: Vec<Vec<f64>>,
    basic: Vec<Vec<bool>>,
}

impl Basis {
    fn empty(m: usize, n: usize) -> Self {
        Self {
            flows: vec![vec![0.0; n]; m],
            basic: vec![vec![false; n]; m],
        }
    }

    fn size(&self) -> usize {
        self.basic.iter().flatten().filter(|&&b| b).count()
    }

    fn basic_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.basic.iter().enumerate().flat_map(|(i, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &b)| b)
                .map(move |(j, _)| (i, j))
        })
    }
}

/// Penalty of a line: gap between its two cheapest active cells, or the
/// cost itself when only one cell remains.
fn penalty(costs: impl Iterator<Item = f64>) -> Option<f64> {
    let mut lowest = f64::INFINITY;
    let mut second = f64::INFINITY;
    let mut count = 0;
    for c in costs {
        count += 1;
        if c < lowest {
            second = lowest;
            lowest = c;
        } else if c < second {
            second = c;
        }
    }
    match count {
        0 => None,
        1 => Some(lowest),
        _ => Some(second - lowest),
    }
}

/// Cheapest active index, lowest index on ties.
fn cheapest(candidates: impl Iterator<Item = (usize, f64)>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (k, c) in candidates {
        if best.map_or(true, |(_, best_c)| c < best_c) {
            best = Some((k, c));
        }
    }
    best.map(|(k, _)| k)
}

/// Vogel's approximation method.
///
/// Exactly one line is retired per allocation, except when the last row and
/// column are exhausted together, so the result has `m + n - 1` basic cells
/// (some possibly zero).
fn vogel(network: &Network, tolerance: f64) -> Basis {
    let m = network.sources();
    let n = network.destinations();
    let costs = &network.costs;
    let mut supply = network.supply.clone();
    let mut demand = network.demand.clone();
    let mut row_active = vec![true; m];
    let mut column_active = vec![true; n];
    let mut active_rows = m;
    let mut active_columns = n;
    let mut basis = Basis::empty(m, n);

    while active_rows > 0 && active_columns > 0 {
        let mut selected: Option<(Line, f64)> = None;
        let mut consider = |line: Line, value: Option<f64>| {
            if let Some(p) = value {
                if selected.map_or(true, |(_, best)| p > best + tolerance) {
                    selected = Some((line, p));
                }
            }
        };
        for i in (0..m).filter(|&i| row_active[i]) {
            let line_costs = (0..n).filter(|&j| column_active[j]).map(|j| costs[i][j]);
            consider(Line::Row(i), penalty(line_costs));
        }
        for j in (0..n).filter(|&j| column_active[j]) {
            let line_costs = (0..m).filter(|&i| row_active[i]).map(|i| costs[i][j]);
            consider(Line::Column(j), penalty(line_costs));
        }

        let cell = match selected.map(|(line, _)| line) {
            Some(Line::Row(i)) => cheapest(
                (0..n)
                    .filter(|&j| column_active[j])
                    .map(|j| (j, costs[i][j])),
            )
            .map(|j| (i, j)),
            Some(Line::Column(j)) => cheapest(
                (0..m)
                    .filter(|&i| row_active[i])
                    .map(|i| (i, costs[i][j])),
            )
            .map(|i| (i, j)),
            None => None,
        };
        let Some((i, j)) = cell else {
            break;
        };

        let amount = supply[i].min(demand[j]);
        basis.flows[i][j] += amount;
        basis.basic[i][j] = true;
        supply[i] -= amount;
        demand[j] -= amount;

        let row_done = supply[i] <= tolerance;
        let column_done = demand[j] <= tolerance;
        if row_done && (!column_done || active_rows > 1) {
            supply[i] = 0.0;
            row_active[i] = false;
            active_rows -= 1;
        } else if column_done {
            demand[j] = 0.0;
            column_active[j] = false;
            active_columns -= 1;
        } else {
            // Only reachable through rounding drift; retire the row to guarantee progress.
            row_active[i] = false;
            active_rows -= 1;
        }
    }

    basis
}

/// Disjoint sets over the `m + n` row and column nodes.
struct Components {
    parent: Vec<usize>,
}

impl Components {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, mut node: usize) -> usize {
        while self.parent[node] != node {
            self.parent[node] = self.parent[self.parent[node]];
            node = self.parent[node];
        }
        node
    }

    fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        self.parent[ra.max(rb)] = ra.min(rb);
        true
    }
}

/// Add zero-flow basic cells until the basis spans every node.
///
/// Candidates are taken cheapest first, row-major on equal cost, and only
/// when they join two different components.
fn complete_basis(network: &Network, basis: &mut Basis) -> usize {
    let m = network.sources();
    let n = network.destinations();
    let required = m + n - 1;
    let mut components = Components::new(m + n);
    for (i, j) in basis.basic_cells().collect::<Vec<_>>() {
        components.union(i, m + j);
    }

    let mut size = basis.size();
    if size >= required {
        return 0;
    }

    let mut candidates: Vec<(f64, usize, usize)> = (0..m)
        .flat_map(|i| (0..n).map(move |j| (i, j)))
        .filter(|&(i, j)| !basis.basic[i][j])
        .map(|(i, j)| (network.costs[i][j], i, j))
        .collect();
    candidates.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut added = 0;
    for (_, i, j) in candidates {
        if size >= required {
            break;
        }
        if components.union(i, m + j) {
            basis.basic[i][j] = true;
            basis.flows[i][j] = 0.0;
            size += 1;
            added += 1;
        }
    }
    added
}

/// Node adjacency of the basis tree: rows are `0..m`, columns `m..m + n`.
fn adjacency(basis: &Basis, m: usize, n: usize) -> Vec<Vec<usize>> {
    let mut neighbours = vec![Vec::new(); m + n];
    for (i, j) in basis.basic_cells() {
        neighbours[i].push(m + j);
        neighbours[m + j].push(i);
    }
    neighbours
}

/// Dual values with `u[0] = 0` and `u[i] + v[j] = c[i][j]` on every basic cell.
fn duals(network: &Network, basis: &Basis) -> Option<(Vec<f64>, Vec<f64>)> {
    let m = network.sources();
    let n = network.destinations();
    let neighbours = adjacency(basis, m, n);
    let mut potential: Vec<Option<f64>> = vec![None; m + n];
    potential[0] = Some(0.0);
    let mut queue = VecDeque::from([0]);

    while let Some(node) = queue.pop_front() {
        let value = potential[node]?;
        for &next in &neighbours[node] {
            if potential[next].is_some() {
                continue;
            }
            let (i, j) = if node < m { (node, next - m) } else { (next, node - m) };
            potential[next] = Some(network.costs[i][j] - value);
            queue.push_back(next);
        }
    }

    let potential: Option<Vec<f64>> = potential.into_iter().collect();
    let mut u = potential?;
    let v = u.split_off(m);
    Some((u, v))
}

/// Non-basic cell with the most negative opportunity cost, row-major on ties.
fn entering_cell(
    network: &Network,
    basis: &Basis,
    u: &[f64],
    v: &[f64],
    threshold: f64,
) -> Option<(usize, usize)> {
    let mut best: Option<((usize, usize), f64)> = None;
    for (i, row) in network.costs.iter().enumerate() {
        for (j, &c) in row.iter().enumerate() {
            if basis.basic[i][j] {
                continue;
            }
            let reduced = c - u[i] - v[j];
            if reduced < -threshold && best.map_or(true, |(_, best_r)| reduced < best_r) {
                best = Some(((i, j), reduced));
            }
        }
    }
    best.map(|(cell, _)| cell)
}

/// Basic cells on the tree path from row `p` to column `q`, starting next to row `p`.
///
/// Together with the entering cell `(p, q)` they form the unique closed loop;
/// cells at even positions lose flow, cells at odd positions gain it.
fn loop_path(
    basis: &Basis,
    m: usize,
    n: usize,
    (p, q): (usize, usize),
) -> Option<Vec<(usize, usize)>> {
    let neighbours = adjacency(basis, m, n);
    let target = m + q;
    let mut parent: Vec<Option<usize>> = vec![None; m + n];
    let mut seen = vec![false; m + n];
    seen[p] = true;
    let mut queue = VecDeque::from([p]);

    while let Some(node) = queue.pop_front() {
        if node == target {
            break;
        }
        for &next in &neighbours[node] {
            if !seen[next] {
                seen[next] = true;
                parent[next] = Some(node);
                queue.push_back(next);
            }
        }
    }
    if !seen[target] {
        return None;
    }

    let mut nodes = vec![target];
    let mut node = target;
    while let Some(prev) = parent[node] {
        nodes.push(prev);
        node = prev;
    }
    nodes.reverse();

    Some(
        nodes
            .windows(2)
            .map(|pair| {
                let (a, b) = (pair[0], pair[1]);
                if a < m {
                    (a, b - m)
                } else {
                    (b, a - m)
                }
            })
            .collect(),
    )
}

/// Shift flow around the loop closed by `entering`; the first donor cell with
/// the smallest flow (row-major on ties) leaves the basis.
fn shift_along_loop(
    basis: &mut Basis,
    entering: (usize, usize),
    path: &[(usize, usize)],
    tolerance: f64,
) -> f64 {
    let mut leaving: Option<((usize, usize), f64)> = None;
    for &(i, j) in path.iter().step_by(2) {
        let flow = basis.flows[i][j];
        let better = match leaving {
            None => true,
            Some((cell, best)) => {
                flow < best - tolerance || ((flow - best).abs() <= tolerance && (i, j) < cell)
            }
        };
        if better {
            leaving = Some(((i, j), flow));
        }
    }
    let Some(((li, lj), theta)) = leaving else {
        return 0.0;
    };

    for (k, &(i, j)) in path.iter().enumerate() {
        if k % 2 == 0 {
            basis.flows[i][j] -= theta;
        } else {
            basis.flows[i][j] += theta;
        }
    }
    let (ei, ej) = entering;
    basis.flows[ei][ej] += theta;
    basis.basic[ei][ej] = true;
    basis.flows[li][lj] = 0.0;
    basis.basic[li][lj] = false;
    theta
}

fn clean(value: f64, tolerance: f64) -> f64 {
    if value.abs() <= tolerance {
        0.0
    } else {
        value
    }
}

impl SolverService for TransportationSolver {
    type Problem = TransportationProblem;
    type Solution = ShipmentPlan;

    fn solve(&self, problem: &TransportationProblem) -> Result<ShipmentPlan> {
        self.validate(problem)?;

        let start_time = Instant::now();
        let tolerance = self.settings.tolerance;
        let limit = self.settings.max_iterations;
        let m = problem.num_sources();
        let n = problem.num_destinations();

        let network = Network::balance(problem, tolerance);
        if let Some((node, amount)) = network.dummy {
            debug!(?node, amount, "transportation problem balanced with a dummy node");
        }

        let mut basis = vogel(&network, tolerance);
        let placeholders = complete_basis(&network, &mut basis);
        debug!(basic_cells = basis.size(), placeholders, "vogel initial basis built");

        let threshold = tolerance * (1.0 + network.max_abs_cost());
        let mut iterations = 0usize;
        let status = loop {
            let (u, v) = duals(&network, &basis).ok_or_else(|| {
                SolverError::ExecutionFailed("basis does not span the network".to_string())
            })?;
            let Some(entering) = entering_cell(&network, &basis, &u, &v, threshold) else {
                break SolutionStatus::Optimal;
            };
            if iterations >= limit {
                warn!(limit, "MODI stopped at the iteration limit");
                break SolutionStatus::IterationLimit;
            }
            let path = loop_path(&basis, network.sources(), network.destinations(), entering)
                .ok_or_else(|| {
                    SolverError::ExecutionFailed(format!(
                        "no closed loop through cell ({}, {})",
                        entering.0, entering.1
                    ))
                })?;
            let theta = shift_along_loop(&mut basis, entering, &path, tolerance);
            iterations += 1;
            debug!(iterations, ?entering, theta, "MODI improvement step");
        };

        let statistics = SolverStatistics {
            iterations: iterations as u64,
            phase_one_iterations: 0,
            solve_time_ms: elapsed_ms(start_time),
            num_rows: m as u32,
            num_columns: n as u32,
        };

        if status != SolutionStatus::Optimal {
            return Ok(ShipmentPlan {
                status,
                flows: Vec::new(),
                total_cost: 0.0,
                message: format!(
                    "Iteration limit of {} improvement steps reached before optimality was proven",
                    limit
                ),
                statistics,
            });
        }

        let flows: Vec<Vec<f64>> = basis.flows[..m]
            .iter()
            .map(|row| row[..n].iter().map(|&x| clean(x, tolerance)).collect())
            .collect();
        let total_cost = flows
            .iter()
            .zip(&problem.costs)
            .flat_map(|(row, costs)| row.iter().zip(costs))
            .map(|(x, c)| x * c)
            .sum();

        let message = match network.dummy {
            None => "Optimal shipment plan found".to_string(),
            Some((DummyNode::Destination, amount)) => format!(
                "Optimal shipment plan found; {} units of surplus supply stay at the sources",
                amount
            ),
            Some((DummyNode::Source, amount)) => format!(
                "Optimal shipment plan found; {} units of demand cannot be met",
                amount
            ),
        };

        Ok(ShipmentPlan {
            status,
            flows,
            total_cost,
            message,
            statistics,
        })
    }

    fn name(&self) -> &str {
        "Vogel + MODI Transportation"
    }

    fn capabilities(&self) -> Vec<&'static str> {
        vec![
            "Minimum-cost transportation",
            "Unbalanced supply and demand",
            "Vogel's approximation start",
            "Modified distribution optimality test",
        ]
    }
}
