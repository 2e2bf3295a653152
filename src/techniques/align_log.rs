use anyhow::{Context, Result};
use indicatif::ProgressBar;
use logging_timer::stimer;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use serde::Serialize;

use crate::{
    ebi_alignments::alignment_error::AlignmentError,
    ebi_framework::ebi_command::get_progress_bar,
    ebi_objects::{
        accepting_petri_net::AcceptingPetriNet,
        alignments::{AlignmentResult, Move},
        event_log::{EventLog, Trace},
    },
    techniques::{
        align::{Align, AlignmentParameters, get_activity_labels},
        fitness::{fitness, normalise_cost},
    },
};

/// The alignment of one trace of a log, with its normalised cost and its fitness, which is absent if
/// the empty trace could not be aligned.
#[derive(Debug, Clone, Serialize)]
pub struct PerTraceResult {
    pub trace: Vec<String>,
    pub alignment: Vec<(String, Option<String>)>,
    #[serde(skip)]
    pub moves: Vec<Move>,
    pub cost: u64,
    pub raw_cost: u64,
    pub fitness: Option<f64>,
    pub visited_states: usize,
    pub queued_states: usize,
    pub traversed_arcs: usize,
    pub solved_linear_programs: usize,
}

impl PerTraceResult {
    fn new(trace: Vec<String>, result: AlignmentResult, worst: Option<u64>) -> Self {
        let cost = normalise_cost(result.cost);
        Self {
            trace,
            alignment: result.label_pairs(),
            cost,
            raw_cost: result.cost,
            fitness: worst.map(|worst| fitness(cost, worst)),
            visited_states: result.visited_states,
            queued_states: result.queued_states,
            traversed_arcs: result.traversed_arcs,
            solved_linear_programs: result.solved_linear_programs,
            moves: result.moves,
        }
    }
}

/**
 * Aligns every trace of `log` on `net`, on a pool of worker threads. The result contains one entry
 * per trace, in the order of the log; a trace that cannot be aligned yields its error.
 *
 * Fitness is relative to the cost of aligning the empty trace; if that alignment fails, the traces
 * are still aligned but carry no fitness.
 */
pub fn align_log(
    log: &EventLog,
    net: &AcceptingPetriNet,
    parameters: &AlignmentParameters,
) -> Result<Vec<Result<PerTraceResult, AlignmentError>>> {
    log::info!("align {} traces", log.get_number_of_traces());
    let _timer = stimer!("align log");

    let worst = match net.align_activities(&[] as &[&str], parameters) {
        Ok(reference) => {
            log::debug!("the empty trace has cost {}", reference.cost);
            Some(normalise_cost(reference.cost))
        }
        Err(error) => {
            log::warn!("the empty trace could not be aligned, so no fitness will be computed: {}", error);
            None
        }
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(parameters.get_number_of_threads())
        .build()
        .context("failed to create thread pool")?;

    let progress_bar = if parameters.show_progress {
        get_progress_bar(log.get_number_of_traces())
    } else {
        ProgressBar::hidden()
    };

    let results = pool.install(|| {
        (0..log.get_number_of_traces())
            .into_par_iter()
            .map(|trace_index| {
                let result = align_trace_of_log(&log.traces[trace_index], net, parameters, worst);
                progress_bar.inc(1);
                result
            })
            .collect::<Vec<_>>()
    });
    progress_bar.finish_and_clear();

    for (trace_index, result) in results.iter().enumerate() {
        if let Err(error) = result {
            log::warn!("trace {} could not be aligned: {}", trace_index, error);
        }
    }

    Ok(results)
}

fn align_trace_of_log(
    trace: &Trace,
    net: &AcceptingPetriNet,
    parameters: &AlignmentParameters,
    worst: Option<u64>,
) -> Result<PerTraceResult, AlignmentError> {
    let labels = get_activity_labels(trace, &parameters.activity_key)?;
    let result = net.align_activities(&labels, parameters)?;
    Ok(PerTraceResult::new(
        labels.into_iter().map(|label| label.to_string()).collect(),
        result,
        worst,
    ))
}

/**
 * The mean fitness over the traces that have one, or None if there are none.
 */
pub fn average_fitness(results: &[Result<PerTraceResult, AlignmentError>]) -> Option<f64> {
    let fitnesses = results
        .iter()
        .filter_map(|result| result.as_ref().ok())
        .filter_map(|result| result.fitness)
        .collect::<Vec<_>>();
    if fitnesses.is_empty() {
        None
    } else {
        Some(fitnesses.iter().sum::<f64>() / fitnesses.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        sync::{Arc, atomic::AtomicBool},
    };

    use crate::{
        ebi_alignments::alignment_error::AlignmentError,
        ebi_objects::{
            accepting_petri_net::AcceptingPetriNet,
            event_log::{Event, EventLog},
        },
        techniques::align::{Align, AlignmentParameters},
    };

    use super::{PerTraceResult, align_log, average_fitness};

    fn model(file: &str) -> AcceptingPetriNet {
        let fin = fs::read_to_string(file).unwrap();
        fin.parse::<AcceptingPetriNet>().unwrap()
    }

    #[test]
    fn batch_fitness() {
        let model = model("testfiles/a.apn");
        let log = EventLog::from_activity_traces(&[vec!["a"], vec![], vec!["x"]]);

        let results = align_log(&log, &model, &AlignmentParameters::default()).unwrap();
        assert_eq!(results.len(), 3);

        let sync = results[0].as_ref().unwrap();
        assert_eq!(sync.trace, vec!["a"]);
        assert_eq!(sync.cost, 0);
        assert_eq!(sync.fitness, Some(1.0));

        let empty = results[1].as_ref().unwrap();
        assert_eq!(empty.cost, 1);
        assert_eq!(empty.raw_cost, 10_000);
        assert_eq!(empty.fitness, Some(0.0));

        let deviation = results[2].as_ref().unwrap();
        assert_eq!(deviation.cost, 2);
        assert_eq!(deviation.fitness, Some(-1.0));
        assert_eq!(deviation.alignment.len(), 2);

        assert_eq!(average_fitness(&results), Some(0.0));
    }

    #[test]
    fn batch_silent_reference() {
        let model = model("testfiles/tau-or-a.apn");
        let log = EventLog::from_activity_traces(&[vec![], vec!["a"], vec!["b"]]);

        let results = align_log(&log, &model, &AlignmentParameters::default()).unwrap();
        let empty = results[0].as_ref().unwrap();
        assert_eq!(empty.raw_cost, 1);
        assert_eq!(empty.cost, 0);
        assert_eq!(empty.fitness, Some(1.0));

        assert_eq!(results[1].as_ref().unwrap().fitness, Some(1.0));
        //the empty trace fits, so any deviation has fitness 0
        assert_eq!(results[2].as_ref().unwrap().fitness, Some(0.0));
    }

    #[test]
    fn batch_keeps_going_and_order() {
        let model = model("testfiles/a-loop-b.apn");
        let mut log = EventLog::from_activity_traces(&[vec!["a", "b"], vec!["b"], vec!["a", "a", "a", "b"]]);
        log.traces.insert(1, vec![Event::new()]);

        let parameters = AlignmentParameters {
            number_of_threads: Some(3),
            ..Default::default()
        };
        let results = align_log(&log, &model, &parameters).unwrap();

        assert_eq!(results.len(), 4);
        assert_eq!(results[0].as_ref().unwrap().trace, vec!["a", "b"]);
        assert!(matches!(results[1], Err(AlignmentError::InvalidTrace { event: 0, .. })));
        assert_eq!(results[2].as_ref().unwrap().trace, vec!["b"]);
        assert_eq!(results[3].as_ref().unwrap().trace, vec!["a", "a", "a", "b"]);

        //identical inputs, identical outputs
        let again = align_log(&log, &model, &parameters).unwrap();
        for (first, second) in results.iter().zip(again.iter()) {
            match (first, second) {
                (Ok(first), Ok(second)) => {
                    assert_eq!(first.alignment, second.alignment);
                    assert_eq!(first.raw_cost, second.raw_cost);
                    assert_eq!(first.visited_states, second.visited_states);
                    assert_eq!(first.queued_states, second.queued_states);
                    assert_eq!(first.traversed_arcs, second.traversed_arcs);
                }
                (Err(first), Err(second)) => assert_eq!(first, second),
                _ => panic!("results differ"),
            }
        }
    }

    #[test]
    #[ntest::timeout(10000)]
    fn batch_unreachable_reference() {
        let model = model("testfiles/unreachable.apn");
        let log = EventLog::from_activity_traces(&[vec!["a"], vec!["b"]]);
        let results = align_log(&log, &model, &AlignmentParameters::default()).unwrap();

        assert_eq!(results.len(), 2);
        for result in &results {
            assert_eq!(result.as_ref().unwrap_err(), &AlignmentError::UnreachableFinalMarking);
        }
        assert_eq!(average_fitness(&results), None);
    }

    #[test]
    fn result_without_reference_has_no_fitness() {
        let model = model("testfiles/a.apn");
        let result = model.align_activities(&["a"], &AlignmentParameters::default()).unwrap();
        let result = PerTraceResult::new(vec!["a".to_string()], result, None);

        assert_eq!(result.cost, 0);
        assert_eq!(result.fitness, None);
        assert_eq!(average_fitness(&[Ok(result.clone())]), None);
        assert!(serde_json::to_value(&result).unwrap()["fitness"].is_null());
    }

    #[test]
    fn batch_cancelled() {
        let model = model("testfiles/a.apn");
        let log = EventLog::from_activity_traces(&[vec!["a"]]);
        let parameters = AlignmentParameters {
            cancellation: Some(Arc::new(AtomicBool::new(true))),
            ..Default::default()
        };
        let results = align_log(&log, &model, &parameters).unwrap();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(AlignmentError::Cancelled)));
    }

    #[test]
    fn batch_serialisation() {
        let model = model("testfiles/a.apn");
        let log = EventLog::from_activity_traces(&[vec!["a"]]);
        let results = align_log(&log, &model, &AlignmentParameters::default()).unwrap();

        let json = serde_json::to_value(results[0].as_ref().unwrap()).unwrap();
        assert_eq!(json["cost"], 0);
        assert_eq!(json["fitness"], 1.0);
        assert_eq!(json["alignment"][0][0], "a");
        assert_eq!(json["alignment"][0][1], "a");
        assert!(json.get("moves").is_none());
    }
}
