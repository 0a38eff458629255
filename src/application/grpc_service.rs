use tonic::{Request, Response, Status};
use tracing::info;

use super::api::OrSolverApi;
use super::mappers::{self, or_solver};
use crate::domain::{models::SolverSettings, solver_service::SolverError};

/// gRPC service implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct GrpcOrSolverService {
    api: OrSolverApi,
}

impl GrpcOrSolverService {
    pub fn new(settings: SolverSettings) -> Self {
        Self {
            api: OrSolverApi::new(settings),
        }
    }
}

fn to_status(error: SolverError) -> Status {
    if error.is_invalid_input() {
        Status::invalid_argument(error.to_string())
    } else {
        Status::internal(format!("Solver error: {}", error))
    }
}

#[tonic::async_trait]
impl or_solver::operations_research_solver_server::OperationsResearchSolver
    for GrpcOrSolverService
{
    async fn solve_simplex(
        &self,
        request: Request<or_solver::SimplexRequest>,
    ) -> Result<Response<or_solver::SimplexResponse>, Status> {
        let request = mappers::proto_to_simplex_request(request.into_inner()).map_err(|e| *e)?;
        let response = self.api.solve_simplex(&request).map_err(to_status)?;
        Ok(Response::new(mappers::simplex_response_to_proto(response)))
    }

    async fn solve_assignment(
        &self,
        request: Request<or_solver::AssignmentRequest>,
    ) -> Result<Response<or_solver::AssignmentResponse>, Status> {
        let request = mappers::proto_to_assignment_request(request.into_inner());
        let response = self.api.solve_assignment(&request).map_err(to_status)?;
        Ok(Response::new(mappers::assignment_response_to_proto(response)))
    }

    async fn solve_transportation(
        &self,
        request: Request<or_solver::TransportationRequest>,
    ) -> Result<Response<or_solver::TransportationResponse>, Status> {
        let request = mappers::proto_to_transportation_request(request.into_inner());
        let response = self.api.solve_transportation(&request).map_err(to_status)?;
        Ok(Response::new(mappers::transportation_response_to_proto(
            response,
        )))
    }

    async fn get_available_solvers(
        &self,
        _request: Request<or_solver::Empty>,
    ) -> Result<Response<or_solver::AvailableSolvers>, Status> {
        info!("listing available solvers");
        let solvers = self
            .api
            .factory()
            .catalogue()
            .into_iter()
            .map(|(name, problem, capabilities)| or_solver::SolverInfo {
                name,
                problem: problem.to_string(),
                capabilities: capabilities.into_iter().map(String::from).collect(),
            })
            .collect();

        Ok(Response::new(or_solver::AvailableSolvers { solvers }))
    }
}
