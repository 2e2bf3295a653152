use crate::{
    ebi_alignments::alignment_error::AlignmentError,
    ebi_framework::activity_key::{Activity, ActivityKey},
    ebi_objects::{accepting_petri_net::AcceptingPetriNet, labelled_petri_net::LabelledPetriNet},
    marking::Marking,
};

/**
 * A sequential net p0 -> t0 -> p1 -> ... -> t(n-1) -> pn for a trace of n activities. Transition i
 * carries the i-th activity; the initial marking has one token in p0, the final marking one in pn.
 */
#[derive(Clone, Debug)]
pub struct TraceNet {
    pub(crate) net: AcceptingPetriNet,
    pub(crate) transition2trace_position: Vec<usize>,
    pub(crate) trace: Vec<Activity>,
}

impl TraceNet {
    /**
     * The activities of the trace must have been issued by `activity_key`.
     */
    pub fn new(activity_key: ActivityKey, trace: &[Activity]) -> Result<Self, AlignmentError> {
        let mut net = LabelledPetriNet::new();
        net.activity_key = activity_key;

        let mut transition2trace_position = Vec::with_capacity(trace.len());
        let mut place = net.add_place("p0");
        for (position, activity) in trace.iter().enumerate() {
            let transition = net.add_transition_activity(format!("t{}", position), Some(*activity));
            let next_place = net.add_place(format!("p{}", position + 1));

            net.add_place_transition_arc(place, transition, 1)
                .map_err(|error| AlignmentError::InvalidNet(error.to_string()))?;
            net.add_transition_place_arc(transition, next_place, 1)
                .map_err(|error| AlignmentError::InvalidNet(error.to_string()))?;

            transition2trace_position.push(position);
            place = next_place;
        }

        let mut initial_marking = Marking::new(trace.len() + 1);
        initial_marking.place2token[0] = 1;
        let mut final_marking = Marking::new(trace.len() + 1);
        final_marking.place2token[trace.len()] = 1;

        Ok(Self {
            net: AcceptingPetriNet {
                net,
                initial_marking,
                final_marking,
            },
            transition2trace_position,
            trace: trace.to_vec(),
        })
    }

    pub fn get_net(&self) -> &AcceptingPetriNet {
        &self.net
    }

    pub fn get_trace_position(&self, transition: usize) -> usize {
        self.transition2trace_position[transition]
    }

    pub fn get_activity(&self, transition: usize) -> Activity {
        self.trace[self.transition2trace_position[transition]]
    }

    pub fn get_trace_length(&self) -> usize {
        self.transition2trace_position.len()
    }
}
