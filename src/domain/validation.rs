// Shape and numeric sanity checks run before any engine touches a problem

use super::models::{AssignmentProblem, LinearProgram, TransportationProblem};
use super::solver_service::{Result, SolverError};

/// Problems that can check their own shape before solving
pub trait Validate {
    /// Every violation found, in a stable order. Empty means valid.
    fn validation_errors(&self) -> Vec<String>;

    fn validate(&self) -> Result<()> {
        let errors = self.validation_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(SolverError::InvalidProblem(errors.join("; ")))
        }
    }
}

impl Validate for LinearProgram {
    fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let num_vars = self.num_variables();
        let num_rows = self.num_constraints();

        if num_vars == 0 {
            errors.push("Objective must have at least one coefficient".to_string());
        }
        check_finite(&mut errors, "Objective", &self.objective);

        for (i, row) in self.constraints.iter().enumerate() {
            if row.len() != num_vars {
                errors.push(format!(
                    "Constraint {} has {} coefficients but problem has {} variables",
                    i,
                    row.len(),
                    num_vars
                ));
            }
            check_finite(&mut errors, &format!("Constraint {}", i), row);
        }

        if self.rhs.len() != num_rows {
            errors.push(format!(
                "Right-hand side has {} entries but problem has {} constraints",
                self.rhs.len(),
                num_rows
            ));
        }
        check_finite(&mut errors, "Right-hand side", &self.rhs);

        if self.signs.len() != num_rows {
            errors.push(format!(
                "Sign vector has {} entries but problem has {} constraints",
                self.signs.len(),
                num_rows
            ));
        }

        errors
    }
}

impl Validate for AssignmentProblem {
    fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let n = self.size();

        if n == 0 {
            errors.push("Cost matrix must have at least one row".to_string());
        }
        for (i, row) in self.costs.iter().enumerate() {
            if row.len() != n {
                errors.push(format!(
                    "Cost matrix must be square: row {} has {} columns but there are {} rows",
                    i,
                    row.len(),
                    n
                ));
            }
            check_finite(&mut errors, &format!("Cost row {}", i), row);
        }

        errors
    }
}

impl Validate for TransportationProblem {
    fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let m = self.num_sources();
        let n = self.num_destinations();

        if m == 0 {
            errors.push("At least one source is required".to_string());
        }
        if n == 0 {
            errors.push("At least one destination is required".to_string());
        }
        check_finite(&mut errors, "Supply", &self.supply);
        check_finite(&mut errors, "Demand", &self.demand);
        check_non_negative(&mut errors, "Supply", &self.supply);
        check_non_negative(&mut errors, "Demand", &self.demand);

        if self.costs.len() != m {
            errors.push(format!(
                "Cost matrix has {} rows but there are {} sources",
                self.costs.len(),
                m
            ));
        }
        for (i, row) in self.costs.iter().enumerate() {
            if row.len() != n {
                errors.push(format!(
                    "Cost row {} has {} columns but there are {} destinations",
                    i,
                    row.len(),
                    n
                ));
            }
            check_finite(&mut errors, &format!("Cost row {}", i), row);
        }

        errors
    }
}

fn check_finite(errors: &mut Vec<String>, what: &str, values: &[f64]) {
    if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
        errors.push(format!("{} contains a non-finite value at index {}", what, pos));
    }
}

fn check_non_negative(errors: &mut Vec<String>, what: &str, values: &[f64]) {
    if let Some(pos) = values.iter().position(|&v| v < 0.0) {
        errors.push(format!(
            "{} must be non-negative, found {} at index {}",
            what, values[pos], pos
        ));
    }
}
