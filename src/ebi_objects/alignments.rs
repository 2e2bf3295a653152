use std::fmt::Display;

use crate::{
    ebi_alignments::synchronous_product_net::SKIP,
    ebi_framework::activity_key::{Activity, ActivityKey},
    net::TransitionIndex,
};

/// A move of an alignment. Trace positions index the trace; transitions index the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    LogMove(Activity, usize),
    ModelMove(Activity, TransitionIndex),
    SilentMove(TransitionIndex),
    SynchronousMove(Activity, usize, TransitionIndex),
}

impl Move {
    pub fn get_model_transition(&self) -> Option<TransitionIndex> {
        match self {
            Move::LogMove(_, _) => None,
            Move::ModelMove(_, transition) | Move::SilentMove(transition) | Move::SynchronousMove(_, _, transition) => Some(*transition),
        }
    }

    pub fn get_trace_position(&self) -> Option<usize> {
        match self {
            Move::LogMove(_, position) | Move::SynchronousMove(_, position, _) => Some(*position),
            Move::ModelMove(_, _) | Move::SilentMove(_) => None,
        }
    }

    /**
     * The pair (log label, model label). A skipped side is `>>`; the model side of a silent move is `None`.
     */
    pub fn label_pair(&self, activity_key: &ActivityKey) -> (String, Option<String>) {
        match self {
            Move::LogMove(activity, _) => (activity_key.get_activity_label(activity).to_string(), Some(SKIP.to_string())),
            Move::ModelMove(activity, _) => (SKIP.to_string(), Some(activity_key.get_activity_label(activity).to_string())),
            Move::SilentMove(_) => (SKIP.to_string(), None),
            Move::SynchronousMove(activity, _, _) => {
                let label = activity_key.get_activity_label(activity).to_string();
                (label.clone(), Some(label))
            }
        }
    }
}

/**
 * An optimal alignment together with its raw cost and the statistics of the search that found it.
 */
#[derive(Debug, Clone)]
pub struct AlignmentResult {
    pub moves: Vec<Move>,
    pub cost: u64,
    pub visited_states: usize,
    pub queued_states: usize,
    pub traversed_arcs: usize,
    pub solved_linear_programs: usize,
    pub activity_key: ActivityKey,
}

impl AlignmentResult {
    pub fn label_pairs(&self) -> Vec<(String, Option<String>)> {
        self.moves.iter().map(|movee| movee.label_pair(&self.activity_key)).collect()
    }

    /**
     * The model transitions fired by the alignment, in order.
     */
    pub fn get_model_transitions(&self) -> Vec<TransitionIndex> {
        self.moves.iter().filter_map(Move::get_model_transition).collect()
    }

    /**
     * The activities of the trace that the alignment explains, in order.
     */
    pub fn get_trace_activities(&self) -> Vec<Activity> {
        self.moves
            .iter()
            .filter_map(|movee| match movee {
                Move::LogMove(activity, _) | Move::SynchronousMove(activity, _, _) => Some(*activity),
                _ => None,
            })
            .collect()
    }

    pub fn is_synchronous(&self) -> bool {
        self.moves.iter().all(|movee| matches!(movee, Move::SynchronousMove(_, _, _)))
    }
}

impl Display for AlignmentResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "cost {}", self.cost)?;
        for (log, model) in self.label_pairs() {
            writeln!(f, "({}, {})", log, model.as_deref().unwrap_or("silent"))?;
        }
        write!(f, "")
    }
}
