use ndarray::Array1;

use crate::{
    ebi_alignments::{
        alignment_error::AlignmentError,
        incidence_matrix::IncidenceMatrix,
        linear_programming_solver::{LinearProgrammingOutcome, LinearProgrammingSolver},
        synchronous_product_net::SynchronousProductNet,
    },
    marking::Marking,
    net::TransitionIndex,
};

/// A solution vector is trusted as long as none of its entries drops below minus this value.
pub const TRUST_EPSILON: f64 = 1e-3;

/// Heuristic value of markings from which the marking equation has no solution.
pub const INFEASIBLE_HEURISTIC: u64 = u64::MAX / 4;

const OBJECTIVE_TOLERANCE: f64 = 1e-6;

/**
 * An estimate of the remaining cost to the final marking, with the firing vector it was derived from.
 */
#[derive(Clone, Debug, PartialEq)]
pub struct Heuristic {
    pub h: u64,
    pub solution: Option<Vec<f64>>,
    pub trusted: bool,
}

impl Heuristic {
    pub fn is_infeasible(&self) -> bool {
        self.h >= INFEASIBLE_HEURISTIC
    }
}

/**
 * Lower bounds on the remaining cost of a marking of a synchronous product, from the continuous
 * relaxation of the marking equation A·x = final - marking, x >= 0, minimising the cost of x.
 */
pub struct MarkingEquationHeuristic<'a> {
    matrix: IncidenceMatrix,
    costs: Array1<f64>,
    final_marking: Marking,
    solver: &'a dyn LinearProgrammingSolver,
    solved_linear_programs: usize,
}

impl<'a> MarkingEquationHeuristic<'a> {
    pub fn new(product: &SynchronousProductNet, costs: &[u64], solver: &'a dyn LinearProgrammingSolver) -> Self {
        Self {
            matrix: IncidenceMatrix::new(product.get_net()),
            costs: IncidenceMatrix::encode_costs(costs),
            final_marking: product.get_final_marking().clone(),
            solver,
            solved_linear_programs: 0,
        }
    }

    pub fn get_solved_linear_programs(&self) -> usize {
        self.solved_linear_programs
    }

    /**
     * Solves the linear program for `marking`. An infeasible program yields a trusted infinite
     * heuristic; a solution vector is trusted unless the solver returned entries below zero.
     */
    pub fn compute(&mut self, marking: &Marking) -> Result<Heuristic, AlignmentError> {
        let rhs = self.matrix.encode_difference(marking, &self.final_marking);
        self.solved_linear_programs += 1;

        match self.solver.solve_min_cost(&self.costs, self.matrix.get_matrix(), &rhs)? {
            LinearProgrammingOutcome::Optimal { objective, solution } => Ok(Heuristic {
                h: objective_to_heuristic(objective),
                trusted: is_trusted(&solution),
                solution: Some(solution),
            }),
            LinearProgrammingOutcome::Infeasible => Ok(Heuristic {
                h: INFEASIBLE_HEURISTIC,
                solution: None,
                trusted: true,
            }),
        }
    }

    /**
     * Derives the heuristic of the marking reached by firing `transition` from a marking with
     * heuristic (h, solution), without solving a linear program. The result is trusted only if the
     * solution vector still fires `transition` at least once.
     */
    pub fn derive(h: u64, solution: Option<&[f64]>, transition: TransitionIndex, cost: u64) -> Heuristic {
        match solution {
            Some(solution) => {
                let mut derived = solution.to_vec();
                derived[transition] -= 1.0;
                let trusted = derived[transition] >= -TRUST_EPSILON;
                Heuristic {
                    h: h.saturating_sub(cost),
                    solution: Some(derived),
                    trusted,
                }
            }
            None => Heuristic {
                h: h.saturating_sub(cost),
                solution: None,
                trusted: false,
            },
        }
    }
}

pub fn is_trusted(solution: &[f64]) -> bool {
    solution.iter().all(|value| *value >= -TRUST_EPSILON)
}

fn objective_to_heuristic(objective: f64) -> u64 {
    let h = (objective - OBJECTIVE_TOLERANCE).ceil();
    if h <= 0.0 {
        0
    } else if h >= INFEASIBLE_HEURISTIC as f64 {
        INFEASIBLE_HEURISTIC
    } else {
        h as u64
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array1;
    use sprs::CsMat;
    use std::fs;

    use crate::{
        ebi_alignments::{
            alignment_error::AlignmentError,
            cost_function::{CostFunction, STD_MODEL_LOG_MOVE_COST},
            linear_programming_solver::{LinearProgrammingOutcome, LinearProgrammingSolver, MicroLpSolver},
            synchronous_product_net::SynchronousProductNet,
            trace_net::TraceNet,
        },
        ebi_objects::accepting_petri_net::AcceptingPetriNet,
        marking::Marking,
    };

    use super::{MarkingEquationHeuristic, is_trusted, objective_to_heuristic};

    fn product(model_file: &str, trace: &[&str]) -> (SynchronousProductNet, Vec<u64>) {
        let fin = fs::read_to_string(model_file).unwrap();
        let model = fin.parse::<AcceptingPetriNet>().unwrap();
        let mut activity_key = model.get_net().get_activity_key().clone();
        let trace = activity_key.process_trace(trace);
        let trace_net = TraceNet::new(activity_key, &trace).unwrap();
        let product = SynchronousProductNet::new(&trace_net, &model).unwrap();
        let costs = CostFunction::standard(trace.len(), model.get_net()).project(&product);
        (product, costs)
    }

    #[test]
    fn heuristic_at_initial_marking() {
        let (product, costs) = product("testfiles/a.apn", &["x"]);
        let mut heuristic = MarkingEquationHeuristic::new(&product, &costs, &MicroLpSolver);

        let result = heuristic.compute(product.get_initial_marking()).unwrap();
        assert_eq!(result.h, 2 * STD_MODEL_LOG_MOVE_COST);
        assert!(result.trusted);
        assert!(is_trusted(result.solution.as_ref().unwrap()));
        assert_eq!(heuristic.get_solved_linear_programs(), 1);

        let result = heuristic.compute(product.get_final_marking()).unwrap();
        assert_eq!(result.h, 0);
    }

    struct NegativeSolver;

    impl LinearProgrammingSolver for NegativeSolver {
        fn solve_min_cost(
            &self,
            costs: &Array1<f64>,
            _matrix: &CsMat<i64>,
            _rhs: &Array1<f64>,
        ) -> Result<LinearProgrammingOutcome, AlignmentError> {
            Ok(LinearProgrammingOutcome::Optimal {
                objective: 1.0,
                solution: vec![-0.5; costs.len()],
            })
        }
    }

    #[test]
    fn heuristic_untrusted_solution() {
        let (product, costs) = product("testfiles/a.apn", &["a"]);
        let mut heuristic = MarkingEquationHeuristic::new(&product, &costs, &NegativeSolver);

        let result = heuristic.compute(product.get_initial_marking()).unwrap();
        assert_eq!(result.h, 1);
        assert!(!result.trusted);
    }

    #[test]
    fn heuristic_infeasible() {
        let (product, costs) = product("testfiles/a.apn", &[]);
        let mut heuristic = MarkingEquationHeuristic::new(&product, &costs, &MicroLpSolver);

        //a token in the sink of the model cannot be removed
        let marking = Marking::from(vec![1, 1, 1]);
        let result = heuristic.compute(&marking).unwrap();
        assert!(result.is_infeasible());
        assert!(result.solution.is_none());
    }

    #[test]
    fn heuristic_derivation() {
        let derived = MarkingEquationHeuristic::derive(10_001, Some(&[1.0, 0.0]), 0, 10_000);
        assert_eq!(derived.h, 1);
        assert!(derived.trusted);
        assert_eq!(derived.solution, Some(vec![0.0, 0.0]));

        let derived = MarkingEquationHeuristic::derive(10_001, Some(&[1.0, 0.0]), 1, 10_000);
        assert_eq!(derived.h, 1);
        assert!(!derived.trusted);

        let derived = MarkingEquationHeuristic::derive(5, None, 1, 10);
        assert_eq!(derived.h, 0);
        assert!(!derived.trusted);
    }

    #[test]
    fn heuristic_rounding() {
        assert_eq!(objective_to_heuristic(-0.000_000_1), 0);
        assert_eq!(objective_to_heuristic(2.000_000_1), 2);
        assert_eq!(objective_to_heuristic(2.5), 3);
        assert_eq!(objective_to_heuristic(f64::INFINITY), super::INFEASIBLE_HEURISTIC);
    }
}
