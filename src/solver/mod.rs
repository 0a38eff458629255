// Solver engines: concrete implementations of SolverService

pub mod factory;
pub mod hungarian;
pub mod simplex;
pub mod transportation;

pub use factory::SolverFactory;
pub use hungarian::HungarianSolver;
pub use simplex::SimplexSolver;
pub use transportation::{DummyNode, TransportationSolver};
