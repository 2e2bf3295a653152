// This file contains code derived from pathfinding,
// which is dual-licensed under Apache 2.0 and MIT licenses.
// The original code has been modified to search synchronous products with marking equation heuristics.
// For more information, see https://github.com/evenfurther/pathfinding?tab=readme-ov-file#license

use indexmap::{
    IndexMap,
    map::Entry::{Occupied, Vacant},
};
use rustc_hash::FxHasher;
use std::{
    cmp::Ordering,
    collections::BinaryHeap,
    hash::BuildHasherDefault,
    sync::atomic,
    time::Instant,
};

use crate::{
    ebi_alignments::{
        alignment_error::AlignmentError,
        linear_programming_solver::LinearProgrammingSolver,
        marking_equation_heuristic::{Heuristic, MarkingEquationHeuristic},
        synchronous_product_net::SynchronousProductNet,
    },
    marking::Marking,
    net::TransitionIndex,
    techniques::align::AlignmentParameters,
};

type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

const NO_PARENT: usize = usize::MAX;

/**
 * The outcome of a search over a synchronous product: the fired product transitions in order, their
 * total cost, and statistics.
 */
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResult {
    pub transitions: Vec<TransitionIndex>,
    pub cost: u64,
    pub visited_states: usize,
    pub queued_states: usize,
    pub traversed_arcs: usize,
    pub solved_linear_programs: usize,
}

struct NodeRecord {
    parent: usize,
    g: u64,
    transition: Option<TransitionIndex>,
    closed: bool,
}

/**
 * An entry of the open set. It refers to its marking by index in the node map; an entry whose g is
 * worse than the g recorded for that marking is stale.
 */
struct SmallestCostHolder {
    f: u64,
    trusted: bool,
    h: u64,
    g: u64,
    index: usize,
    solution: Option<Vec<f64>>,
}

impl SmallestCostHolder {
    fn new(g: u64, index: usize, heuristic: Heuristic) -> Self {
        Self {
            f: g.saturating_add(heuristic.h),
            trusted: heuristic.trusted,
            h: heuristic.h,
            g,
            index,
            solution: heuristic.solution,
        }
    }
}

impl PartialEq for SmallestCostHolder {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SmallestCostHolder {}

impl PartialOrd for SmallestCostHolder {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SmallestCostHolder {
    //BinaryHeap pops the greatest: smaller f, then trusted, then smaller h, then the newest marking
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| self.trusted.cmp(&other.trusted))
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| self.index.cmp(&other.index))
    }
}

fn reverse_path(parents: &FxIndexMap<Marking, NodeRecord>, start: usize) -> Vec<TransitionIndex> {
    let mut i = start;
    let mut path = std::iter::from_fn(|| {
        let (_, record) = parents.get_index(i)?;
        i = record.parent;
        record.transition
    })
    .collect::<Vec<_>>();
    path.reverse();
    path
}

fn check_guards(
    parameters: &AlignmentParameters,
    start_time: &Instant,
    queued_states: usize,
) -> Result<(), AlignmentError> {
    if let Some(deadline) = parameters.deadline {
        if start_time.elapsed() > deadline {
            return Err(AlignmentError::Timeout(deadline));
        }
    }
    if let Some(cancellation) = &parameters.cancellation {
        if cancellation.load(atomic::Ordering::Relaxed) {
            return Err(AlignmentError::Cancelled);
        }
    }
    if let Some(max_queued_states) = parameters.max_queued_states {
        if queued_states > max_queued_states {
            return Err(AlignmentError::ResourceExhaustion(max_queued_states));
        }
    }
    Ok(())
}

/**
 * Computes a cheapest firing sequence of `product` from its initial to its final marking with A*,
 * using the marking equation as heuristic. `costs` is indexed by product transition.
 *
 * Heuristics of successors are derived from the solution vector of their parent; a derived
 * heuristic that is not trusted is recomputed when its entry is popped. A marking is expanded at
 * most once. If the final marking is not reachable, the search exhausts the reachable markings and
 * reports an unreachable final marking.
 */
pub fn astar(
    product: &SynchronousProductNet,
    costs: &[u64],
    parameters: &AlignmentParameters,
    solver: &dyn LinearProgrammingSolver,
) -> Result<SearchResult, AlignmentError> {
    if costs.len() != product.get_number_of_transitions() {
        return Err(AlignmentError::InvalidCostFunction(format!(
            "{} costs given for {} transitions",
            costs.len(),
            product.get_number_of_transitions()
        )));
    }

    let start_time = Instant::now();
    let net = product.get_net();
    let final_marking = product.get_final_marking();
    let mut heuristic = MarkingEquationHeuristic::new(product, costs, solver);

    let mut parents: FxIndexMap<Marking, NodeRecord> = FxIndexMap::default();
    parents.insert(
        product.get_initial_marking().clone(),
        NodeRecord {
            parent: NO_PARENT,
            g: 0,
            transition: None,
            closed: false,
        },
    );

    let mut to_see = BinaryHeap::new();
    to_see.push(SmallestCostHolder::new(0, 0, heuristic.compute(product.get_initial_marking())?));

    let mut visited_states = 0;
    let mut queued_states = 1;
    let mut traversed_arcs = 0;

    loop {
        check_guards(parameters, &start_time, queued_states)?;

        let Some(holder) = to_see.pop() else {
            log::debug!(
                "final marking unreachable after visiting {} states and solving {} linear programs",
                visited_states,
                heuristic.get_solved_linear_programs()
            );
            return Err(AlignmentError::UnreachableFinalMarking);
        };

        let (marking, previous_transition) = {
            let Some((marking, record)) = parents.get_index_mut(holder.index) else {
                continue;
            };

            //a marking may be in the heap several times; only its cheapest entry counts
            if record.closed || holder.g > record.g {
                continue;
            }

            if !holder.trusted {
                //solving again cannot do better, so the refreshed entry is final
                let refreshed = heuristic.compute(marking)?;
                let refreshed = Heuristic {
                    trusted: true,
                    ..refreshed
                };
                to_see.push(SmallestCostHolder::new(holder.g, holder.index, refreshed));
                continue;
            }

            record.closed = true;
            (marking.clone(), record.transition)
        };
        visited_states += 1;

        if &marking == final_marking {
            let result = SearchResult {
                transitions: reverse_path(&parents, holder.index),
                cost: holder.g,
                visited_states,
                queued_states,
                traversed_arcs,
                solved_linear_programs: heuristic.get_solved_linear_programs(),
            };
            log::debug!(
                "alignment of cost {} found after visiting {} states, queueing {} states, traversing {} arcs and solving {} linear programs",
                result.cost,
                result.visited_states,
                result.queued_states,
                result.traversed_arcs,
                result.solved_linear_programs
            );
            return Ok(result);
        }

        let after_log_move = previous_transition.is_some_and(|transition| product.get_label(transition).is_log_move());

        for transition in net.get_enabled_transitions(&marking) {
            if parameters.prune_log_model_interleavings
                && after_log_move
                && product.get_label(transition).is_model_move()
            {
                continue;
            }

            traversed_arcs += 1;
            let Ok(successor) = net.fire(&marking, transition) else {
                continue;
            };
            let g = holder.g.saturating_add(costs[transition]);

            let index = match parents.entry(successor) {
                Vacant(e) => {
                    let index = e.index();
                    e.insert(NodeRecord {
                        parent: holder.index,
                        g,
                        transition: Some(transition),
                        closed: false,
                    });
                    index
                }
                Occupied(mut e) => {
                    if e.get().closed || e.get().g <= g {
                        continue;
                    }
                    let index = e.index();
                    e.insert(NodeRecord {
                        parent: holder.index,
                        g,
                        transition: Some(transition),
                        closed: false,
                    });
                    index
                }
            };

            let derived = MarkingEquationHeuristic::derive(holder.h, holder.solution.as_deref(), transition, costs[transition]);
            to_see.push(SmallestCostHolder::new(g, index, derived));
            queued_states += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        sync::{Arc, atomic::AtomicBool},
        time::Duration,
    };

    use crate::{
        ebi_alignments::{
            alignment_error::AlignmentError,
            cost_function::{CostFunction, STD_MODEL_LOG_MOVE_COST},
            linear_programming_solver::MicroLpSolver,
            synchronous_product_net::SynchronousProductNet,
            trace_net::TraceNet,
        },
        ebi_objects::accepting_petri_net::AcceptingPetriNet,
        techniques::align::AlignmentParameters,
    };

    use super::{SmallestCostHolder, astar};

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
    fn holder_order() {
        let holder = |f, trusted, h, index| SmallestCostHolder {
            f,
            trusted,
            h,
            g: f - h,
            index,
            solution: None,
        };
        assert!(holder(1, false, 0, 0) > holder(2, true, 0, 0));
        assert!(holder(2, true, 1, 0) > holder(2, false, 0, 0));
        assert!(holder(2, true, 0, 0) > holder(2, true, 1, 0));
    }

    #[test]
    fn astar_log_and_model_move() {
        let (product, costs) = product("testfiles/a.apn", &["x"]);
        let result = astar(&product, &costs, &AlignmentParameters::default(), &MicroLpSolver).unwrap();

        assert_eq!(result.cost, 2 * STD_MODEL_LOG_MOVE_COST);
        assert_eq!(result.transitions.len(), 2);
        //with pruning, the model move comes first
        assert!(product.get_label(result.transitions[0]).is_model_move());
        assert!(product.get_label(result.transitions[1]).is_log_move());
    }

    #[test]
    fn astar_without_pruning_same_cost() {
        let (product, costs) = product("testfiles/a-then-b.apn", &["b", "a"]);
        let parameters = AlignmentParameters {
            prune_log_model_interleavings: false,
            ..Default::default()
        };
        let unpruned = astar(&product, &costs, &parameters, &MicroLpSolver).unwrap();
        let pruned = astar(&product, &costs, &AlignmentParameters::default(), &MicroLpSolver).unwrap();

        assert_eq!(unpruned.cost, 2 * STD_MODEL_LOG_MOVE_COST);
        assert_eq!(pruned.cost, unpruned.cost);
        assert!(pruned.traversed_arcs <= unpruned.traversed_arcs);
    }

    #[test]
    fn astar_refreshes_untrusted_heuristics() {
        //a reads a place that is never marked, which the marking equation cannot see
        let (product, costs) = product("testfiles/read-arc.apn", &["a"]);
        let result = astar(&product, &costs, &AlignmentParameters::default(), &MicroLpSolver).unwrap();

        assert_eq!(result.cost, 2 * STD_MODEL_LOG_MOVE_COST);
        assert!(result.solved_linear_programs > 1);
        assert!(result.transitions.iter().all(|transition| !product.get_label(*transition).is_synchronous_move()));
    }

    #[test]
    fn astar_deviating_loop() {
        let (product, costs) = product("testfiles/a-loop-b.apn", &["a", "x", "b", "b"]);
        let result = astar(&product, &costs, &AlignmentParameters::default(), &MicroLpSolver).unwrap();

        assert_eq!(result.cost, 2 * STD_MODEL_LOG_MOVE_COST);
        assert!(result.solved_linear_programs >= 1);
        let synchronous = result
            .transitions
            .iter()
            .filter(|transition| product.get_label(**transition).is_synchronous_move())
            .count();
        assert_eq!(synchronous, 2);
    }

    #[test]
    #[ntest::timeout(10000)]
    fn astar_unreachable() {
        let (product, costs) = product("testfiles/unreachable.apn", &["a"]);
        let result = astar(&product, &costs, &AlignmentParameters::default(), &MicroLpSolver);
        assert_eq!(result, Err(AlignmentError::UnreachableFinalMarking));
    }

    #[test]
    fn astar_cancelled() {
        let (product, costs) = product("testfiles/a.apn", &["a"]);
        let parameters = AlignmentParameters {
            cancellation: Some(Arc::new(AtomicBool::new(true))),
            ..Default::default()
        };
        let result = astar(&product, &costs, &parameters, &MicroLpSolver);
        assert_eq!(result, Err(AlignmentError::Cancelled));
    }

    #[test]
    fn astar_timeout() {
        let (product, costs) = product("testfiles/a-loop-b.apn", &["a", "a", "b"]);
        let parameters = AlignmentParameters {
            deadline: Some(Duration::ZERO),
            ..Default::default()
        };
        let result = astar(&product, &costs, &parameters, &MicroLpSolver);
        assert!(matches!(result, Err(AlignmentError::Timeout(_))));
    }

    #[test]
    fn astar_resource_exhaustion() {
        let (product, costs) = product("testfiles/a-loop-b.apn", &["x", "y", "a", "b"]);
        let parameters = AlignmentParameters {
            max_queued_states: Some(1),
            ..Default::default()
        };
        let result = astar(&product, &costs, &parameters, &MicroLpSolver);
        assert_eq!(result, Err(AlignmentError::ResourceExhaustion(1)));
    }

    #[test]
    fn astar_wrong_number_of_costs() {
        let (product, _) = product("testfiles/a.apn", &["a"]);
        let result = astar(&product, &[0], &AlignmentParameters::default(), &MicroLpSolver);
        assert!(matches!(result, Err(AlignmentError::InvalidCostFunction(_))));
    }
}
