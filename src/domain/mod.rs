// Domain module: problem models, value objects and the engine contract

pub mod models;
pub mod solver_service;
pub mod validation;
pub mod value_objects;

pub use models::*;
pub use solver_service::*;
pub use validation::*;
pub use value_objects::*;
