use crate::domain::{
    models::{
        Assignment, AssignmentProblem, LinearProgram, LpSolution, ShipmentPlan, SolverSettings,
        TransportationProblem,
    },
    solver_service::SolverService,
};
use crate::solver::{HungarianSolver, SimplexSolver, TransportationSolver};
use std::sync::Arc;

pub type LinearProgramSolver = dyn SolverService<Problem = LinearProgram, Solution = LpSolution>;
pub type AssignmentSolver = dyn SolverService<Problem = AssignmentProblem, Solution = Assignment>;
pub type TransportationPlanner =
    dyn SolverService<Problem = TransportationProblem, Solution = ShipmentPlan>;

/// Factory for creating engine instances that share one set of settings
#[derive(Debug, Clone, Copy, Default)]
pub struct SolverFactory {
    settings: SolverSettings,
}

impl SolverFactory {
    pub fn new(settings: SolverSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> SolverSettings {
        self.settings
    }

    /// Engine for general linear programs
    pub fn linear_program(&self) -> Arc<LinearProgramSolver> {
        Arc::new(SimplexSolver::new(self.settings))
    }

    /// Engine for square assignment problems
    pub fn assignment(&self) -> Arc<AssignmentSolver> {
        Arc::new(HungarianSolver::new(self.settings))
    }

    /// Engine for supply/demand transportation problems
    pub fn transportation(&self) -> Arc<TransportationPlanner> {
        Arc::new(TransportationSolver::new(self.settings))
    }

    /// `(name, problem kind, capabilities)` for every engine
    pub fn catalogue(&self) -> Vec<(String, &'static str, Vec<&'static str>)> {
        let simplex = self.linear_program();
        let hungarian = self.assignment();
        let transportation = self.transportation();
        vec![
            (simplex.name().to_string(), "simplex", simplex.capabilities()),
            (hungarian.name().to_string(), "assignment", hungarian.capabilities()),
            (
                transportation.name().to_string(),
                "transportation",
                transportation.capabilities(),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConstraintSign;

    #[test]
    fn engines_share_settings() {
        let factory = SolverFactory::new(SolverSettings::default().with_max_iterations(1));
        let lp = LinearProgram::maximize(vec![3.0, 5.0])
            .add_constraint(vec![1.0, 0.0], ConstraintSign::LessEqual, 4.0)
            .add_constraint(vec![0.0, 2.0], ConstraintSign::LessEqual, 12.0)
            .add_constraint(vec![3.0, 2.0], ConstraintSign::LessEqual, 18.0);
        let solution = factory.linear_program().solve(&lp).unwrap();
        assert!(!solution.is_optimal());
    }

    #[test]
    fn catalogue_lists_the_three_engines() {
        let kinds: Vec<&str> = SolverFactory::default()
            .catalogue()
            .into_iter()
            .map(|(_, kind, _)| kind)
            .collect();
        assert_eq!(kinds, vec!["simplex", "assignment", "transportation"]);
    }
}
