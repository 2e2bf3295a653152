use std::{
    sync::{Arc, atomic::AtomicBool},
    time::Duration,
};

use crate::{
    ebi_alignments::{
        alignment_error::AlignmentError,
        astar::astar,
        cost_function::CostFunction,
        linear_programming_solver::MicroLpSolver,
        synchronous_product_net::SynchronousProductNet,
        trace_net::TraceNet,
    },
    ebi_objects::{
        accepting_petri_net::AcceptingPetriNet,
        alignments::AlignmentResult,
        event_log::{DEFAULT_ACTIVITY_KEY, Trace},
    },
};

/**
 * Settings of an alignment computation. The cost vectors replace the corresponding part of the
 * standard cost function: the model and synchronous vectors are indexed by model transition, the
 * trace vector by position in the trace.
 */
#[derive(Clone, Debug)]
pub struct AlignmentParameters {
    pub activity_key: String,
    pub model_cost_function: Option<Vec<u64>>,
    pub trace_cost_function: Option<Vec<u64>>,
    pub sync_cost_function: Option<Vec<u64>>,
    /// Never fire a model move directly after a log move.
    pub prune_log_model_interleavings: bool,
    /// Maximum duration of a single alignment.
    pub deadline: Option<Duration>,
    pub max_queued_states: Option<usize>,
    /// Workers of a batch; by default one less than the available parallelism.
    pub number_of_threads: Option<usize>,
    pub cancellation: Option<Arc<AtomicBool>>,
    pub show_progress: bool,
}

impl Default for AlignmentParameters {
    fn default() -> Self {
        Self {
            activity_key: DEFAULT_ACTIVITY_KEY.to_string(),
            model_cost_function: None,
            trace_cost_function: None,
            sync_cost_function: None,
            prune_log_model_interleavings: true,
            deadline: None,
            max_queued_states: None,
            number_of_threads: None,
            cancellation: None,
            show_progress: false,
        }
    }
}

impl AlignmentParameters {
    pub fn get_number_of_threads(&self) -> usize {
        self.number_of_threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|parallelism| parallelism.get())
                .unwrap_or(1)
                .saturating_sub(1)
        }).max(1)
    }
}

pub trait Align {
    /**
     * Computes an optimal alignment of a trace of events, of which the activity is read from the
     * attribute named in the parameters.
     */
    fn align_trace(&self, trace: &Trace, parameters: &AlignmentParameters) -> Result<AlignmentResult, AlignmentError>;

    fn align_activities(&self, trace: &[impl AsRef<str>], parameters: &AlignmentParameters) -> Result<AlignmentResult, AlignmentError>;
}

impl Align for AcceptingPetriNet {
    fn align_trace(&self, trace: &Trace, parameters: &AlignmentParameters) -> Result<AlignmentResult, AlignmentError> {
        let labels = get_activity_labels(trace, &parameters.activity_key)?;
        self.align_activities(&labels, parameters)
    }

    fn align_activities(&self, trace: &[impl AsRef<str>], parameters: &AlignmentParameters) -> Result<AlignmentResult, AlignmentError> {
        let mut activity_key = self.get_net().get_activity_key().clone();
        let trace = activity_key.process_trace(trace);

        let cost_function = CostFunction::new(
            trace.len(),
            self.get_net(),
            parameters.model_cost_function.as_deref(),
            parameters.trace_cost_function.as_deref(),
            parameters.sync_cost_function.as_deref(),
        )?;

        let trace_net = TraceNet::new(activity_key, &trace)?;
        let product = SynchronousProductNet::new(&trace_net, self)?;
        let costs = cost_function.project(&product);

        align_synchronous_product(&product, &costs, parameters)
    }
}

pub fn get_activity_labels<'a>(trace: &'a Trace, activity_key: &str) -> Result<Vec<&'a str>, AlignmentError> {
    trace
        .iter()
        .enumerate()
        .map(|(event, attributes)| {
            attributes.get(activity_key).ok_or_else(|| AlignmentError::InvalidTrace {
                event,
                activity_key: activity_key.to_string(),
            })
        })
        .collect()
}

/**
 * Computes an optimal alignment of `trace` on `net`, starting in the initial marking of `net` and
 * ending in its final marking.
 */
pub fn align_trace(trace: &Trace, net: &AcceptingPetriNet, parameters: &AlignmentParameters) -> Result<AlignmentResult, AlignmentError> {
    net.align_trace(trace, parameters)
}

/**
 * Computes a cheapest firing sequence of a synchronous product from its initial to its final
 * marking and reads it as an alignment. `costs` is indexed by product transition.
 */
pub fn align_synchronous_product(
    product: &SynchronousProductNet,
    costs: &[u64],
    parameters: &AlignmentParameters,
) -> Result<AlignmentResult, AlignmentError> {
    let search = astar(product, costs, parameters, &MicroLpSolver)?;

    Ok(AlignmentResult {
        moves: search
            .transitions
            .iter()
            .map(|transition| product.get_label(*transition).to_move())
            .collect(),
        cost: search.cost,
        visited_states: search.visited_states,
        queued_states: search.queued_states,
        traversed_arcs: search.traversed_arcs,
        solved_linear_programs: search.solved_linear_programs,
        activity_key: product.get_activity_key().clone(),
    })
}
