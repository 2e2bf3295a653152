use std::time::Duration;
use thiserror::Error;

/// The ways in which computing a single alignment can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlignmentError {
    #[error("the final marking cannot be reached from the initial marking")]
    UnreachableFinalMarking,

    #[error("event {event} of the trace has no attribute `{activity_key}`")]
    InvalidTrace { event: usize, activity_key: String },

    #[error("invalid cost function: {0}")]
    InvalidCostFunction(String),

    #[error("the {which} marking has {found} places, while the net has {expected}")]
    InvalidMarking {
        which: &'static str,
        found: usize,
        expected: usize,
    },

    #[error("invalid net: {0}")]
    InvalidNet(String),

    #[error("the alignment was not found within {0:?}")]
    Timeout(Duration),

    #[error("the alignment was cancelled")]
    Cancelled,

    #[error("the search exceeded the maximum of {0} queued states")]
    ResourceExhaustion(usize),

    #[error("linear programming failed: {0}")]
    LinearProgramming(String),
}

#[cfg(test)]
mod tests {
    use super::AlignmentError;

    #[test]
    fn error_messages() {
        let error = AlignmentError::InvalidTrace {
            event: 2,
            activity_key: "concept:name".to_string(),
        };
        assert_eq!(error.to_string(), "event 2 of the trace has no attribute `concept:name`");
        assert_eq!(
            AlignmentError::ResourceExhaustion(10).to_string(),
            "the search exceeded the maximum of 10 queued states"
        );
    }
}
