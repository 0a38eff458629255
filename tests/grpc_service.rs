#![cfg(feature = "server")]

use orsolve::application::mappers::or_solver::{
    self, operations_research_solver_server::OperationsResearchSolver,
};
use orsolve::{GrpcOrSolverService, SolverSettings};
use tonic::{Code, Request};

fn rows(values: &[&[f64]]) -> Vec<or_solver::Row> {
    values
        .iter()
        .map(|row| or_solver::Row {
            values: row.to_vec(),
        })
        .collect()
}

#[tokio::test]
async fn solves_simplex_over_grpc() {
    let service = GrpcOrSolverService::new(SolverSettings::default());
    let response = service
        .solve_simplex(Request::new(or_solver::SimplexRequest {
            objective: vec![3.0, 5.0],
            constraints: rows(&[&[1.0, 0.0], &[0.0, 2.0], &[3.0, 2.0]]),
            rhs: vec![4.0, 12.0, 18.0],
            signs: vec![or_solver::ConstraintSign::LessEqual as i32; 3],
            maximize: Some(true),
        }))
        .await
        .unwrap()
        .into_inner();

    assert!(response.success);
    assert!((response.optimal_value.unwrap() - 36.0).abs() < 1e-6);
    assert_eq!(response.slack.len(), 3);
}

#[tokio::test]
async fn unset_direction_maximizes() {
    let service = GrpcOrSolverService::default();
    let response = service
        .solve_simplex(Request::new(or_solver::SimplexRequest {
            objective: vec![1.0],
            constraints: rows(&[&[1.0]]),
            rhs: vec![3.0],
            signs: vec![or_solver::ConstraintSign::LessEqual as i32],
            maximize: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert!(response.success);
    assert!((response.optimal_value.unwrap() - 3.0).abs() < 1e-6);
}

#[tokio::test]
async fn unknown_sign_is_invalid_argument() {
    let service = GrpcOrSolverService::default();
    let status = service
        .solve_simplex(Request::new(or_solver::SimplexRequest {
            objective: vec![1.0],
            constraints: rows(&[&[1.0]]),
            rhs: vec![1.0],
            signs: vec![42],
            maximize: Some(true),
        }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
}

#[tokio::test]
async fn non_square_assignment_is_invalid_argument() {
    let service = GrpcOrSolverService::default();
    let status = service
        .solve_assignment(Request::new(or_solver::AssignmentRequest {
            cost_matrix: rows(&[&[1.0, 2.0]]),
        }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
}

#[tokio::test]
async fn assignment_and_transportation_over_grpc() {
    let service = GrpcOrSolverService::default();

    let assignment = service
        .solve_assignment(Request::new(or_solver::AssignmentRequest {
            cost_matrix: rows(&[&[4.0, 1.0, 3.0], &[2.0, 0.0, 5.0], &[3.0, 2.0, 2.0]]),
        }))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(assignment.total_cost, 5.0);
    assert_eq!(assignment.assignments.len(), 3);

    let plan = service
        .solve_transportation(Request::new(or_solver::TransportationRequest {
            supply: vec![20.0, 30.0, 25.0],
            demand: vec![10.0, 25.0, 40.0],
            costs: rows(&[&[2.0, 3.0, 1.0], &[5.0, 4.0, 8.0], &[5.0, 6.0, 8.0]]),
        }))
        .await
        .unwrap()
        .into_inner();
    assert!(plan.success);
    assert!((plan.total_cost - 330.0).abs() < 1e-6);
    assert_eq!(plan.transport_matrix.len(), 3);
}

#[tokio::test]
async fn lists_the_engine_triad() {
    let service = GrpcOrSolverService::default();
    let solvers = service
        .get_available_solvers(Request::new(or_solver::Empty {}))
        .await
        .unwrap()
        .into_inner()
        .solvers;
    let problems: Vec<&str> = solvers.iter().map(|s| s.problem.as_str()).collect();
    assert_eq!(problems, vec!["simplex", "assignment", "transportation"]);
    assert!(solvers.iter().all(|s| !s.capabilities.is_empty()));
}
