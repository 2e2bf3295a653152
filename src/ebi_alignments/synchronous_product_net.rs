use std::fmt;

use crate::{
    ebi_alignments::{alignment_error::AlignmentError, trace_net::TraceNet},
    ebi_framework::activity_key::{Activity, ActivityKey},
    ebi_objects::{accepting_petri_net::AcceptingPetriNet, alignments::Move},
    marking::Marking,
    net::{PetriNet, TransitionIndex},
};

pub const SKIP: &str = ">>";

/**
 * The label of a transition of the synchronous product, with the trace transition and the model
 * transition it stems from. The side that does not move is implicit: a log move skips the model
 * and a model move skips the log.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SynchronousProductLabel {
    LogMove(Activity, TransitionIndex),
    ModelMove(Option<Activity>, TransitionIndex),
    SynchronousMove(Activity, TransitionIndex, TransitionIndex),
}

impl SynchronousProductLabel {
    pub fn is_log_move(&self) -> bool {
        matches!(self, Self::LogMove(_, _))
    }

    pub fn is_model_move(&self) -> bool {
        matches!(self, Self::ModelMove(_, _))
    }

    pub fn is_synchronous_move(&self) -> bool {
        matches!(self, Self::SynchronousMove(_, _, _))
    }

    pub fn get_trace_transition(&self) -> Option<TransitionIndex> {
        match self {
            Self::LogMove(_, trace_transition) | Self::SynchronousMove(_, trace_transition, _) => Some(*trace_transition),
            Self::ModelMove(_, _) => None,
        }
    }

    pub fn get_model_transition(&self) -> Option<TransitionIndex> {
        match self {
            Self::ModelMove(_, model_transition) | Self::SynchronousMove(_, _, model_transition) => Some(*model_transition),
            Self::LogMove(_, _) => None,
        }
    }

    /**
     * The move of an alignment this transition stands for. Trace transitions are taken to be trace
     * positions, as they are in a trace net.
     */
    pub fn to_move(&self) -> Move {
        match *self {
            Self::LogMove(activity, trace_position) => Move::LogMove(activity, trace_position),
            Self::ModelMove(Some(activity), model_transition) => Move::ModelMove(activity, model_transition),
            Self::ModelMove(None, model_transition) => Move::SilentMove(model_transition),
            Self::SynchronousMove(activity, trace_position, model_transition) => {
                Move::SynchronousMove(activity, trace_position, model_transition)
            }
        }
    }

    /**
     * Renders the label as a pair (log side, model side). A skipped side is `>>`; a silent model
     * transition has no model label.
     */
    pub fn to_pair(&self, activity_key: &ActivityKey) -> (String, Option<String>) {
        match self {
            Self::LogMove(activity, _) => (
                activity_key.get_activity_label(activity).to_string(),
                Some(SKIP.to_string()),
            ),
            Self::ModelMove(activity, _) => (
                SKIP.to_string(),
                activity.map(|activity| activity_key.get_activity_label(&activity).to_string()),
            ),
            Self::SynchronousMove(activity, _, _) => {
                let label = activity_key.get_activity_label(activity).to_string();
                (label.clone(), Some(label))
            }
        }
    }
}

/**
 * The product of a trace net and a model net. Its places are the places of the trace net followed
 * by the places of the model net. Its transitions are, in this order: one log move per trace
 * transition, one model move per model transition, and one synchronous move per pair of a trace
 * transition and a model transition with the same label.
 */
#[derive(Clone, Debug)]
pub struct SynchronousProductNet {
    pub(crate) net: PetriNet,
    pub(crate) labels: Vec<SynchronousProductLabel>,
    pub(crate) initial_marking: Marking,
    pub(crate) final_marking: Marking,
    pub(crate) activity_key: ActivityKey,
}

impl SynchronousProductNet {
    /**
     * The trace net must be labelled with an extension of the model's activity key, such as a
     * clone of the model's key to which the trace's activities were added.
     */
    pub fn new(trace_net: &TraceNet, model: &AcceptingPetriNet) -> Result<Self, AlignmentError> {
        let trace = trace_net.get_net();
        check_markings(trace)?;
        check_markings(model)?;

        let model_net = model.get_net();
        let offset = trace.get_net().get_number_of_places();

        let mut net = PetriNet::new();
        for place in 0..offset {
            net.add_place(format!("trace {}", trace.get_net().get_net().get_place_name(place)));
        }
        for place in 0..model_net.get_number_of_places() {
            net.add_place(format!("model {}", model_net.get_net().get_place_name(place)));
        }

        let mut result = Self {
            net,
            labels: vec![],
            initial_marking: trace.initial_marking.disjoint_union(&model.initial_marking),
            final_marking: trace.final_marking.disjoint_union(&model.final_marking),
            activity_key: trace.get_net().get_activity_key().clone(),
        };

        //log moves
        for trace_transition in 0..trace_net.get_trace_length() {
            let activity = trace_net.get_activity(trace_transition);
            let transition = result.add_transition(
                format!("log move {}", trace.get_net().get_net().get_transition_name(trace_transition)),
                SynchronousProductLabel::LogMove(activity, trace_transition),
            );
            result.copy_arcs(trace.get_net().get_net(), trace_transition, transition, 0)?;
        }

        //model moves
        for model_transition in 0..model_net.get_number_of_transitions() {
            let transition = result.add_transition(
                format!("model move {}", model_net.get_net().get_transition_name(model_transition)),
                SynchronousProductLabel::ModelMove(model_net.get_transition_label(model_transition), model_transition),
            );
            result.copy_arcs(model_net.get_net(), model_transition, transition, offset)?;
        }

        //synchronous moves
        for trace_transition in 0..trace_net.get_trace_length() {
            let activity = trace_net.get_activity(trace_transition);
            for model_transition in 0..model_net.get_number_of_transitions() {
                if model_net.get_transition_label(model_transition) == Some(activity) {
                    let transition = result.add_transition(
                        format!(
                            "synchronous move {} {}",
                            trace.get_net().get_net().get_transition_name(trace_transition),
                            model_net.get_net().get_transition_name(model_transition)
                        ),
                        SynchronousProductLabel::SynchronousMove(activity, trace_transition, model_transition),
                    );
                    result.copy_arcs(trace.get_net().get_net(), trace_transition, transition, 0)?;
                    result.copy_arcs(model_net.get_net(), model_transition, transition, offset)?;
                }
            }
        }

        log::debug!(
            "synchronous product with {} places and {} transitions",
            result.get_number_of_places(),
            result.get_number_of_transitions()
        );

        Ok(result)
    }

    fn add_transition(&mut self, name: String, label: SynchronousProductLabel) -> TransitionIndex {
        self.labels.push(label);
        self.net.add_transition(name)
    }

    fn copy_arcs(
        &mut self,
        source: &PetriNet,
        source_transition: TransitionIndex,
        transition: TransitionIndex,
        offset: usize,
    ) -> Result<(), AlignmentError> {
        for (place, weight) in source.get_input_places(source_transition) {
            self.net
                .add_place_transition_arc(place + offset, transition, weight)
                .map_err(|error| AlignmentError::InvalidNet(error.to_string()))?;
        }
        for (place, weight) in source.get_output_places(source_transition) {
            self.net
                .add_transition_place_arc(transition, place + offset, weight)
                .map_err(|error| AlignmentError::InvalidNet(error.to_string()))?;
        }
        Ok(())
    }

    pub fn get_net(&self) -> &PetriNet {
        &self.net
    }

    pub fn get_number_of_places(&self) -> usize {
        self.net.get_number_of_places()
    }

    pub fn get_number_of_transitions(&self) -> usize {
        self.net.get_number_of_transitions()
    }

    pub fn get_label(&self, transition: TransitionIndex) -> SynchronousProductLabel {
        self.labels[transition]
    }

    pub fn get_trace_transition(&self, transition: TransitionIndex) -> Option<TransitionIndex> {
        self.labels[transition].get_trace_transition()
    }

    pub fn get_model_transition(&self, transition: TransitionIndex) -> Option<TransitionIndex> {
        self.labels[transition].get_model_transition()
    }

    pub fn get_initial_marking(&self) -> &Marking {
        &self.initial_marking
    }

    pub fn get_final_marking(&self) -> &Marking {
        &self.final_marking
    }

    pub fn get_activity_key(&self) -> &ActivityKey {
        &self.activity_key
    }
}

fn check_markings(net: &AcceptingPetriNet) -> Result<(), AlignmentError> {
    let expected = net.get_net().get_number_of_places();
    for (which, marking) in [("initial", net.get_initial_marking()), ("final", net.get_final_marking())] {
        if marking.get_number_of_places() != expected {
            return Err(AlignmentError::InvalidMarking {
                which,
                found: marking.get_number_of_places(),
                expected,
            });
        }
    }
    Ok(())
}

impl fmt::Display for SynchronousProductNet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "initial marking {}", self.initial_marking)?;
        writeln!(f, "final marking {}", self.final_marking)?;
        for transition in 0..self.get_number_of_transitions() {
            let (log, model) = self.labels[transition].to_pair(&self.activity_key);
            writeln!(
                f,
                "t{} ({}, {})",
                transition,
                log,
                model.as_deref().unwrap_or("silent")
            )?;
        }
        for arc in self.net.get_arcs() {
            writeln!(f, "arc {}", arc)?;
        }
        write!(f, "")
    }
}
