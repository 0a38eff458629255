// Mappers: convert between wire types and domain models
// Keeps serde and protobuf types out of the engines.

use super::api::{
    AssignmentRequest, AssignmentResponse, SimplexRequest, SimplexResponse, TransportationRequest,
    TransportationResponse,
};
use crate::domain::{
    models::{Assignment, AssignmentProblem, LinearProgram, LpSolution, ShipmentPlan, TransportationProblem},
    value_objects::OptimizationDirection,
};

/// Convert a simplex request into a domain linear program
pub fn simplex_request_to_domain(request: &SimplexRequest) -> LinearProgram {
    LinearProgram {
        direction: OptimizationDirection::from_maximize(request.maximize),
        objective: request.objective.clone(),
        constraints: request.constraints.clone(),
        rhs: request.rhs.clone(),
        signs: request.signs.clone(),
    }
}

/// Convert a domain LP solution into the simplex response
pub fn domain_to_simplex_response(solution: LpSolution) -> SimplexResponse {
    let success = solution.is_optimal();
    SimplexResponse {
        success,
        message: solution.message,
        optimal_value: solution.optimal_value,
        solution: solution.variable_values,
        slack: success.then_some(solution.slack),
    }
}

pub fn assignment_request_to_domain(request: &AssignmentRequest) -> AssignmentProblem {
    AssignmentProblem::new(request.cost_matrix.clone())
}

pub fn domain_to_assignment_response(assignment: Assignment) -> AssignmentResponse {
    AssignmentResponse {
        total_cost: assignment.total_cost,
        assignments: assignment.pairs.iter().map(|&(r, c)| [r, c]).collect(),
    }
}

pub fn transportation_request_to_domain(request: &TransportationRequest) -> TransportationProblem {
    TransportationProblem::new(
        request.supply.clone(),
        request.demand.clone(),
        request.costs.clone(),
    )
}

pub fn domain_to_transportation_response(plan: ShipmentPlan) -> TransportationResponse {
    TransportationResponse {
        success: plan.is_optimal(),
        message: plan.message,
        total_cost: plan.total_cost,
        transport_matrix: plan.flows,
    }
}

#[cfg(feature = "server")]
pub mod or_solver {
    tonic::include_proto!("or_solver");
}

#[cfg(feature = "server")]
pub use self::grpc::*;

#[cfg(feature = "server")]
mod grpc {
    use super::or_solver as proto;
    use super::*;
    use crate::domain::value_objects::ConstraintSign;
    use tonic::Status;

    fn rows_from_proto(rows: Vec<proto::Row>) -> Vec<Vec<f64>> {
        rows.into_iter().map(|row| row.values).collect()
    }

    fn rows_to_proto(rows: Vec<Vec<f64>>) -> Vec<proto::Row> {
        rows.into_iter().map(|values| proto::Row { values }).collect()
    }

    fn proto_to_domain_sign(raw: i32) -> std::result::Result<ConstraintSign, Box<Status>> {
        match proto::ConstraintSign::try_from(raw) {
            Ok(proto::ConstraintSign::LessEqual) => Ok(ConstraintSign::LessEqual),
            Ok(proto::ConstraintSign::GreaterEqual) => Ok(ConstraintSign::GreaterEqual),
            Ok(proto::ConstraintSign::Equal) => Ok(ConstraintSign::Equal),
            Err(_) => Err(Box::new(Status::invalid_argument(format!(
                "Invalid constraint sign: {}",
                raw
            )))),
        }
    }

    /// Convert protobuf SimplexRequest to the wire request
    pub fn proto_to_simplex_request(
        request: proto::SimplexRequest,
    ) -> std::result::Result<SimplexRequest, Box<Status>> {
        let signs = request
            .signs
            .iter()
            .map(|&raw| proto_to_domain_sign(raw))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(SimplexRequest {
            objective: request.objective,
            constraints: rows_from_proto(request.constraints),
            rhs: request.rhs,
            signs,
            maximize: request.maximize.unwrap_or(true),
        })
    }

    pub fn simplex_response_to_proto(response: SimplexResponse) -> proto::SimplexResponse {
        proto::SimplexResponse {
            success: response.success,
            message: response.message,
            optimal_value: response.optimal_value,
            solution: response.solution,
            slack: response.slack.unwrap_or_default(),
        }
    }

    pub fn proto_to_assignment_request(request: proto::AssignmentRequest) -> AssignmentRequest {
        AssignmentRequest {
            cost_matrix: rows_from_proto(request.cost_matrix),
        }
    }

    pub fn assignment_response_to_proto(response: AssignmentResponse) -> proto::AssignmentResponse {
        proto::AssignmentResponse {
            total_cost: response.total_cost,
            assignments: response
                .assignments
                .into_iter()
                .map(|[row, col]| proto::AssignmentPair {
                    row: row as u32,
                    col: col as u32,
                })
                .collect(),
        }
    }

    pub fn proto_to_transportation_request(
        request: proto::TransportationRequest,
    ) -> TransportationRequest {
        TransportationRequest {
            supply: request.supply,
            demand: request.demand,
            costs: rows_from_proto(request.costs),
        }
    }

    pub fn transportation_response_to_proto(
        response: TransportationResponse,
    ) -> proto::TransportationResponse {
        proto::TransportationResponse {
            success: response.success,
            message: response.message,
            total_cost: response.total_cost,
            transport_matrix: rows_to_proto(response.transport_matrix),
        }
    }
}
