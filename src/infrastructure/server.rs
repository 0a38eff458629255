// Infrastructure: server setup

use std::net::SocketAddr;
use tonic::transport::Server;
use tracing::info;

use super::config::ServerConfig;
use crate::application::mappers::or_solver::operations_research_solver_server::OperationsResearchSolverServer;
use crate::application::GrpcOrSolverService;
use crate::solver::SolverFactory;

pub async fn start_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let service = GrpcOrSolverService::new(config.settings);

    log_banner(&config);

    Server::builder()
        .add_service(OperationsResearchSolverServer::new(service))
        .serve(config.address)
        .await?;

    Ok(())
}

fn log_banner(config: &ServerConfig) {
    let address: &SocketAddr = &config.address;
    info!(%address, "orsolve operations research solver listening");
    info!(
        tolerance = config.settings.tolerance,
        max_iterations = config.settings.max_iterations,
        "solver settings"
    );
    for (name, problem, _) in SolverFactory::new(config.settings).catalogue() {
        info!(problem, engine = %name, "engine available");
    }
}
