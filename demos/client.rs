// Demo client calling all three engines of the orsolve gRPC service
//
// Start the server first:
//   cargo run --features server --bin orsolve-server
// Then:
//   cargo run --features server --example client

use tonic::Request;

pub mod or_solver {
    tonic::include_proto!("or_solver");
}

use or_solver::{
    operations_research_solver_client::OperationsResearchSolverClient, AssignmentRequest,
    ConstraintSign, Empty, Row, SimplexRequest, TransportationRequest,
};

fn rows(values: &[&[f64]]) -> Vec<Row> {
    values
        .iter()
        .map(|row| Row {
            values: row.to_vec(),
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut client = OperationsResearchSolverClient::connect("http://127.0.0.1:50051").await?;

    let solvers = client
        .get_available_solvers(Request::new(Empty {}))
        .await?
        .into_inner();
    println!("=== Available engines ===");
    for solver in &solvers.solvers {
        println!("  {:<15} {}", solver.problem, solver.name);
    }

    // Maximize 3x + 5y subject to x <= 4, 2y <= 12, 3x + 2y <= 18
    println!("\n=== Product mix ===");
    let response = client
        .solve_simplex(Request::new(SimplexRequest {
            objective: vec![3.0, 5.0],
            constraints: rows(&[&[1.0, 0.0], &[0.0, 2.0], &[3.0, 2.0]]),
            rhs: vec![4.0, 12.0, 18.0],
            signs: vec![ConstraintSign::LessEqual as i32; 3],
            maximize: Some(true),
        }))
        .await?
        .into_inner();
    println!("{}", response.message);
    if let Some(value) = response.optimal_value {
        println!("profit: {:.2}", value);
        println!("plan:   {:?}", response.solution);
        println!("slack:  {:?}", response.slack);
    }

    println!("\n=== Crew assignment ===");
    let response = client
        .solve_assignment(Request::new(AssignmentRequest {
            cost_matrix: rows(&[
                &[9.0, 2.0, 7.0, 8.0],
                &[6.0, 4.0, 3.0, 7.0],
                &[5.0, 8.0, 1.0, 8.0],
                &[7.0, 6.0, 9.0, 4.0],
            ]),
        }))
        .await?
        .into_inner();
    println!("total cost: {:.2}", response.total_cost);
    for pair in &response.assignments {
        println!("  worker {} -> job {}", pair.row, pair.col);
    }

    println!("\n=== Shipping plan ===");
    let response = client
        .solve_transportation(Request::new(TransportationRequest {
            supply: vec![300.0, 400.0, 500.0],
            demand: vec![250.0, 350.0, 400.0, 200.0],
            costs: rows(&[
                &[3.0, 1.0, 7.0, 4.0],
                &[2.0, 6.0, 5.0, 9.0],
                &[8.0, 3.0, 3.0, 2.0],
            ]),
        }))
        .await?
        .into_inner();
    println!("{}", response.message);
    println!("total cost: {:.2}", response.total_cost);
    for (i, row) in response.transport_matrix.iter().enumerate() {
        println!("  source {}: {:?}", i, row.values);
    }

    Ok(())
}
