use crate::{
    ebi_alignments::{alignment_error::AlignmentError, synchronous_product_net::{SynchronousProductLabel, SynchronousProductNet}},
    ebi_objects::labelled_petri_net::LabelledPetriNet,
};

pub const STD_MODEL_LOG_MOVE_COST: u64 = 10_000;
pub const STD_SILENT_MOVE_COST: u64 = 1;
pub const STD_SYNCHRONOUS_MOVE_COST: u64 = 0;

/**
 * Costs of the moves of an alignment: log moves per position in the trace, model moves and
 * synchronous moves per model transition.
 */
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CostFunction {
    pub(crate) trace2log_move_cost: Vec<u64>,
    pub(crate) transition2model_move_cost: Vec<u64>,
    pub(crate) transition2synchronous_move_cost: Vec<u64>,
}

impl CostFunction {
    /**
     * Log moves and visible model moves cost STD_MODEL_LOG_MOVE_COST, silent model moves cost 1 and
     * synchronous moves are free.
     */
    pub fn standard(trace_length: usize, model: &LabelledPetriNet) -> Self {
        Self {
            trace2log_move_cost: vec![STD_MODEL_LOG_MOVE_COST; trace_length],
            transition2model_move_cost: Self::standard_model_move_costs(model),
            transition2synchronous_move_cost: vec![STD_SYNCHRONOUS_MOVE_COST; model.get_number_of_transitions()],
        }
    }

    pub fn standard_model_move_costs(model: &LabelledPetriNet) -> Vec<u64> {
        (0..model.get_number_of_transitions())
            .map(|transition| {
                if model.is_transition_silent(transition) {
                    STD_SILENT_MOVE_COST
                } else {
                    STD_MODEL_LOG_MOVE_COST
                }
            })
            .collect()
    }

    /**
     * Starts from the standard cost function and replaces each part for which a vector is given.
     * The model and synchronous vectors are indexed by model transition and must cover exactly the
     * transitions of the model; the log vector is indexed by trace position and must cover the trace.
     */
    pub fn new(
        trace_length: usize,
        model: &LabelledPetriNet,
        model_cost_function: Option<&[u64]>,
        trace_cost_function: Option<&[u64]>,
        sync_cost_function: Option<&[u64]>,
    ) -> Result<Self, AlignmentError> {
        let mut result = Self::standard(trace_length, model);

        if let Some(costs) = model_cost_function {
            if costs.len() != model.get_number_of_transitions() {
                return Err(AlignmentError::InvalidCostFunction(format!(
                    "the model cost function has {} entries, while the model has {} transitions",
                    costs.len(),
                    model.get_number_of_transitions()
                )));
            }
            result.transition2model_move_cost = costs.to_vec();
        }

        if let Some(costs) = sync_cost_function {
            if costs.len() != model.get_number_of_transitions() {
                return Err(AlignmentError::InvalidCostFunction(format!(
                    "the synchronous cost function has {} entries, while the model has {} transitions",
                    costs.len(),
                    model.get_number_of_transitions()
                )));
            }
            result.transition2synchronous_move_cost = costs.to_vec();
        }

        if let Some(costs) = trace_cost_function {
            if costs.len() < trace_length {
                return Err(AlignmentError::InvalidCostFunction(format!(
                    "the trace cost function has {} entries, while the trace has {} events",
                    costs.len(),
                    trace_length
                )));
            }
            result.trace2log_move_cost = costs[..trace_length].to_vec();
        }

        Ok(result)
    }

    pub fn get_log_move_cost(&self, trace_position: usize) -> u64 {
        self.trace2log_move_cost[trace_position]
    }

    pub fn get_model_move_cost(&self, model_transition: usize) -> u64 {
        self.transition2model_move_cost[model_transition]
    }

    pub fn get_synchronous_move_cost(&self, model_transition: usize) -> u64 {
        self.transition2synchronous_move_cost[model_transition]
    }

    /**
     * The cost of each transition of the synchronous product, indexed by product transition. The
     * trace transitions of the product must correspond to trace positions.
     */
    pub fn project(&self, product: &SynchronousProductNet) -> Vec<u64> {
        (0..product.get_number_of_transitions())
            .map(|transition| match product.get_label(transition) {
                SynchronousProductLabel::LogMove(_, trace_position) => self.get_log_move_cost(trace_position),
                SynchronousProductLabel::ModelMove(_, model_transition) => self.get_model_move_cost(model_transition),
                SynchronousProductLabel::SynchronousMove(_, _, model_transition) => {
                    self.get_synchronous_move_cost(model_transition)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::{
        ebi_alignments::{
            alignment_error::AlignmentError, synchronous_product_net::SynchronousProductNet,
            trace_net::TraceNet,
        },
        ebi_objects::accepting_petri_net::AcceptingPetriNet,
    };

    use super::{CostFunction, STD_MODEL_LOG_MOVE_COST};

    #[test]
    fn standard_costs_on_product() {
        let fin = fs::read_to_string("testfiles/tau-or-a.apn").unwrap();
        let model = fin.parse::<AcceptingPetriNet>().unwrap();
        let mut activity_key = model.get_net().get_activity_key().clone();
        let trace = activity_key.process_trace(&["a"]);
        let trace_net = TraceNet::new(activity_key, &trace).unwrap();
        let product = SynchronousProductNet::new(&trace_net, &model).unwrap();

        let costs = CostFunction::standard(1, model.get_net()).project(&product);

        //log move, model move tau, model move a, synchronous move a
        assert_eq!(costs, vec![STD_MODEL_LOG_MOVE_COST, 1, STD_MODEL_LOG_MOVE_COST, 0]);
    }

    #[test]
    fn custom_costs() {
        let fin = fs::read_to_string("testfiles/a.apn").unwrap();
        let model = fin.parse::<AcceptingPetriNet>().unwrap();

        let costs = CostFunction::new(2, model.get_net(), Some(&[5]), Some(&[1, 2, 3]), Some(&[7])).unwrap();
        assert_eq!(costs.get_model_move_cost(0), 5);
        assert_eq!(costs.get_synchronous_move_cost(0), 7);
        assert_eq!(costs.get_log_move_cost(1), 2);

        assert!(matches!(
            CostFunction::new(2, model.get_net(), Some(&[5, 5]), None, None),
            Err(AlignmentError::InvalidCostFunction(_))
        ));
        assert!(matches!(
            CostFunction::new(2, model.get_net(), None, Some(&[1]), None),
            Err(AlignmentError::InvalidCostFunction(_))
        ));
        assert!(CostFunction::new(0, model.get_net(), None, Some(&[]), None).is_ok());
    }
}
