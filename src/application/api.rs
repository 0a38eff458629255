// Wire contract: request/response shapes shared by every transport
// Field names are part of the public contract and must not be renamed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

use super::mappers;
use crate::domain::{
    models::SolverSettings,
    solver_service::{Result, SolverError},
    value_objects::ConstraintSign,
};
use crate::solver::SolverFactory;

fn default_maximize() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplexRequest {
    pub objective: Vec<f64>,
    #[serde(default)]
    pub constraints: Vec<Vec<f64>>,
    #[serde(default)]
    pub rhs: Vec<f64>,
    #[serde(default)]
    pub signs: Vec<ConstraintSign>,
    #[serde(default = "default_maximize")]
    pub maximize: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplexResponse {
    pub success: bool,
    pub message: String,
    pub optimal_value: Option<f64>,
    pub solution: Vec<f64>,
    pub slack: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRequest {
    pub cost_matrix: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentResponse {
    pub total_cost: f64,
    /// `[row, col]` pairs ordered by row
    pub assignments: Vec<[usize; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportationRequest {
    pub supply: Vec<f64>,
    pub demand: Vec<f64>,
    pub costs: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportationResponse {
    pub success: bool,
    pub message: String,
    pub total_cost: f64,
    pub transport_matrix: Vec<Vec<f64>>,
}

/// Body returned in place of a response when a request is rejected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Problem kinds reachable through [`OrSolverApi::dispatch_json`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Simplex,
    Assignment,
    Transportation,
}

impl Endpoint {
    pub const ALL: [Endpoint; 3] = [Endpoint::Simplex, Endpoint::Assignment, Endpoint::Transportation];

    pub fn as_str(self) -> &'static str {
        match self {
            Endpoint::Simplex => "simplex",
            Endpoint::Assignment => "assignment",
            Endpoint::Transportation => "transportation",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Endpoint {
    type Err = SolverError;

    /// Accepts a bare kind (`simplex`) or a route (`/solve/simplex`).
    fn from_str(s: &str) -> Result<Self> {
        let kind = s.trim().trim_start_matches("/solve/").trim_matches('/');
        Endpoint::ALL
            .into_iter()
            .find(|e| e.as_str() == kind)
            .ok_or_else(|| SolverError::UnknownEndpoint(s.to_string()))
    }
}

/// Stateless entry point: validate, solve, format
#[derive(Debug, Clone, Copy, Default)]
pub struct OrSolverApi {
    factory: SolverFactory,
}

impl OrSolverApi {
    pub fn new(settings: SolverSettings) -> Self {
        Self {
            factory: SolverFactory::new(settings),
        }
    }

    pub fn factory(&self) -> &SolverFactory {
        &self.factory
    }

    pub fn solve_simplex(&self, request: &SimplexRequest) -> Result<SimplexResponse> {
        let problem = mappers::simplex_request_to_domain(request);
        info!(
            variables = problem.num_variables(),
            constraints = problem.num_constraints(),
            maximize = request.maximize,
            "solving linear program"
        );

        let solution = self.factory.linear_program().solve(&problem)?;
        info!(
            status = %solution.status,
            iterations = solution.statistics.iterations,
            solve_time_ms = solution.statistics.solve_time_ms,
            "linear program finished"
        );
        Ok(mappers::domain_to_simplex_response(solution))
    }

    pub fn solve_assignment(&self, request: &AssignmentRequest) -> Result<AssignmentResponse> {
        let problem = mappers::assignment_request_to_domain(request);
        info!(size = problem.size(), "solving assignment problem");

        let assignment = self.factory.assignment().solve(&problem)?;
        info!(
            total_cost = assignment.total_cost,
            adjustments = assignment.statistics.iterations,
            solve_time_ms = assignment.statistics.solve_time_ms,
            "assignment problem finished"
        );
        Ok(mappers::domain_to_assignment_response(assignment))
    }

    pub fn solve_transportation(
        &self,
        request: &TransportationRequest,
    ) -> Result<TransportationResponse> {
        let problem = mappers::transportation_request_to_domain(request);
        info!(
            sources = problem.num_sources(),
            destinations = problem.num_destinations(),
            "solving transportation problem"
        );

        let plan = self.factory.transportation().solve(&problem)?;
        info!(
            status = %plan.status,
            iterations = plan.statistics.iterations,
            solve_time_ms = plan.statistics.solve_time_ms,
            "transportation problem finished"
        );
        Ok(mappers::domain_to_transportation_response(plan))
    }

    /// Decode `body` for `endpoint`, solve, and encode the response.
    pub fn dispatch_json(&self, endpoint: &str, body: &str) -> Result<String> {
        let json = match endpoint.parse::<Endpoint>()? {
            Endpoint::Simplex => {
                let request: SimplexRequest = serde_json::from_str(body)?;
                serde_json::to_string(&self.solve_simplex(&request)?)?
            }
            Endpoint::Assignment => {
                let request: AssignmentRequest = serde_json::from_str(body)?;
                serde_json::to_string(&self.solve_assignment(&request)?)?
            }
            Endpoint::Transportation => {
                let request: TransportationRequest = serde_json::from_str(body)?;
                serde_json::to_string(&self.solve_transportation(&request)?)?
            }
        };
        Ok(json)
    }

    /// Like [`OrSolverApi::dispatch_json`], but failures are rendered as an
    /// [`ErrorResponse`] body instead of being returned.
    pub fn respond_json(&self, endpoint: &str, body: &str) -> String {
        self.dispatch_json(endpoint, body)
            .unwrap_or_else(|e| render_error(&e))
    }
}

pub fn render_error(error: &SolverError) -> String {
    let body = ErrorResponse {
        detail: error.to_string(),
    };
    serde_json::to_string(&body).unwrap_or_else(|_| String::from(r#"{"detail":"internal error"}"#))
}
