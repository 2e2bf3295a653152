use microlp::{ComparisonOp, OptimizationDirection, Problem};
use ndarray::Array1;
use sprs::CsMat;

use crate::ebi_alignments::alignment_error::AlignmentError;

/// Tolerance under which a right-hand side is considered zero.
const ZERO_TOLERANCE: f64 = 1e-9;

#[derive(Clone, Debug, PartialEq)]
pub enum LinearProgrammingOutcome {
    Optimal { objective: f64, solution: Vec<f64> },
    Infeasible,
}

/**
 * Solves min c·x subject to A·x = b and x >= 0, with x continuous.
 *
 * Implementations are shared between the workers of a batch and must not keep state between calls.
 */
pub trait LinearProgrammingSolver: Sync {
    fn solve_min_cost(&self, costs: &Array1<f64>, matrix: &CsMat<i64>, rhs: &Array1<f64>) -> Result<LinearProgrammingOutcome, AlignmentError>;
}

/**
 * Builds a fresh microlp problem for every call.
 */
#[derive(Clone, Copy, Debug, Default)]
pub struct MicroLpSolver;

impl LinearProgrammingSolver for MicroLpSolver {
    fn solve_min_cost(&self, costs: &Array1<f64>, matrix: &CsMat<i64>, rhs: &Array1<f64>) -> Result<LinearProgrammingOutcome, AlignmentError> {
        if matrix.cols() != costs.len() || matrix.rows() != rhs.len() {
            return Err(AlignmentError::LinearProgramming(format!(
                "a {}x{} matrix does not fit {} costs and {} right-hand sides",
                matrix.rows(),
                matrix.cols(),
                costs.len(),
                rhs.len()
            )));
        }

        let mut problem = Problem::new(OptimizationDirection::Minimize);
        let variables = costs
            .iter()
            .map(|cost| problem.add_var(*cost, (0.0, f64::INFINITY)))
            .collect::<Vec<_>>();

        for (row, constraint) in matrix.outer_iterator().enumerate() {
            let expression = constraint
                .iter()
                .filter(|(_, coefficient)| **coefficient != 0)
                .map(|(column, coefficient)| (variables[column], *coefficient as f64))
                .collect::<Vec<_>>();

            if expression.is_empty() {
                //0 = rhs
                if rhs[row].abs() > ZERO_TOLERANCE {
                    return Ok(LinearProgrammingOutcome::Infeasible);
                }
                continue;
            }

            problem.add_constraint(expression, ComparisonOp::Eq, rhs[row]);
        }

        match problem.solve() {
            Ok(solution) => Ok(LinearProgrammingOutcome::Optimal {
                objective: solution.objective(),
                solution: variables.iter().map(|variable| solution[*variable]).collect(),
            }),
            Err(microlp::Error::Infeasible) => Ok(LinearProgrammingOutcome::Infeasible),
            Err(microlp::Error::Unbounded) => Err(AlignmentError::LinearProgramming(
                "the problem is unbounded, which requires a negative cost".to_string(),
            )),
            Err(error) => Err(AlignmentError::LinearProgramming(error.to_string())),
        }
    }
}
