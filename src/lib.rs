// Domain layer: problem models, validation and the engine contract
pub mod domain;

// Solver engines: simplex, Hungarian and transportation
pub mod solver;

// Application layer: wire contract, mappers and the gRPC service
pub mod application;

// Infrastructure layer: configuration and server lifecycle
pub mod infrastructure;

// Re-export commonly used types
pub use domain::{
    Assignment, AssignmentProblem, ConstraintSign, LinearProgram, LpSolution,
    OptimizationDirection, ShipmentPlan, SolutionStatus, SolverError, SolverService,
    SolverSettings, TransportationProblem, Validate,
};

pub use application::{
    AssignmentRequest, AssignmentResponse, OrSolverApi, SimplexRequest, SimplexResponse,
    TransportationRequest, TransportationResponse,
};

pub use infrastructure::{ConfigError, ServerConfig};

pub use solver::{HungarianSolver, SimplexSolver, SolverFactory, TransportationSolver};

#[cfg(feature = "server")]
pub use application::GrpcOrSolverService;

#[cfg(feature = "server")]
pub use infrastructure::start_server;
