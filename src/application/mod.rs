// Application layer: wire contract, mappers and transports

pub mod api;
pub mod mappers;

#[cfg(feature = "server")]
pub mod grpc_service;

pub use api::{
    render_error, AssignmentRequest, AssignmentResponse, Endpoint, ErrorResponse, OrSolverApi,
    SimplexRequest, SimplexResponse, TransportationRequest, TransportationResponse,
};

#[cfg(feature = "server")]
pub use grpc_service::GrpcOrSolverService;
