// Server configuration loaded from the environment

use std::net::SocketAddr;

use crate::domain::models::SolverSettings;

pub const ADDRESS_VAR: &str = "ORSOLVE_ADDR";
pub const TOLERANCE_VAR: &str = "ORSOLVE_TOLERANCE";
pub const MAX_ITERATIONS_VAR: &str = "ORSOLVE_MAX_ITERATIONS";
pub const DEFAULT_ADDRESS: &str = "0.0.0.0:50051";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value}")]
    InvalidAddress { var: &'static str, value: String },

    #[error("{var} must be a finite positive number, got {value}")]
    InvalidTolerance { var: &'static str, value: String },

    #[error("{var} must be a positive integer, got {value}")]
    InvalidIterations { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub address: SocketAddr,
    pub settings: SolverSettings,
}

impl ServerConfig {
    pub fn new(address: SocketAddr, settings: SolverSettings) -> Self {
        Self { address, settings }
    }

    /// Read `ORSOLVE_ADDR`, `ORSOLVE_TOLERANCE` and `ORSOLVE_MAX_ITERATIONS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_address = lookup(ADDRESS_VAR).unwrap_or_else(|| DEFAULT_ADDRESS.to_string());
        let address = raw_address
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidAddress {
                var: ADDRESS_VAR,
                value: raw_address.clone(),
            })?;

        let mut settings = SolverSettings::default();

        if let Some(value) = lookup(TOLERANCE_VAR) {
            let tolerance = value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|t| t.is_finite() && *t > 0.0)
                .ok_or_else(|| ConfigError::InvalidTolerance {
                    var: TOLERANCE_VAR,
                    value: value.clone(),
                })?;
            settings = settings.with_tolerance(tolerance);
        }

        if let Some(value) = lookup(MAX_ITERATIONS_VAR) {
            let max_iterations = value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::InvalidIterations {
                    var: MAX_ITERATIONS_VAR,
                    value: value.clone(),
                })?;
            settings = settings.with_max_iterations(max_iterations);
        }

        Ok(Self { address, settings })
    }
}
