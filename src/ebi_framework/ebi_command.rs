use anyhow::{Context, Result, anyhow};
use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Value, json};
use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write},
    path::PathBuf,
    time::Duration,
};

use crate::{
    ebi_alignments::alignment_error::AlignmentError,
    ebi_objects::{
        accepting_petri_net::AcceptingPetriNet,
        event_log::{DEFAULT_ACTIVITY_KEY, EventLog},
    },
    techniques::{
        align::AlignmentParameters,
        align_log::{PerTraceResult, align_log, average_fitness},
    },
};

/// Computes optimal alignments of the traces of an event log on an accepting Petri net.
#[derive(Parser, Debug)]
#[command(name = "ebi_alignments", version, about)]
pub struct EbiCommand {
    /// The accepting Petri net (.apn).
    #[arg(value_name = "MODEL")]
    pub model: PathBuf,

    /// The event log: a JSON array of traces, each an array of event objects.
    #[arg(value_name = "LOG")]
    pub log: PathBuf,

    /// Write the alignments to this file instead of to standard out.
    #[arg(short, long, value_name = "OUT")]
    pub output: Option<PathBuf>,

    /// The event attribute that holds the activity.
    #[arg(long, default_value = DEFAULT_ACTIVITY_KEY)]
    pub activity_key: String,

    /// Number of worker threads; defaults to one less than the available parallelism.
    #[arg(long)]
    pub threads: Option<usize>,

    /// Maximum time to align a single trace.
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<f64>,

    /// Maximum number of queued states when aligning a single trace.
    #[arg(long, value_name = "N")]
    pub max_states: Option<usize>,

    /// Allow model moves directly after log moves.
    #[arg(long)]
    pub no_pruning: bool,

    /// Show a progress bar.
    #[arg(long)]
    pub progress: bool,

    #[command(flatten)]
    pub verbose: Verbosity<WarnLevel>,
}

impl EbiCommand {
    pub fn get_parameters(&self) -> Result<AlignmentParameters> {
        let deadline = match self.timeout {
            Some(seconds) => Some(
                Duration::try_from_secs_f64(seconds)
                    .map_err(|_| anyhow!("`{}` is not a valid number of seconds", seconds))?,
            ),
            None => None,
        };

        Ok(AlignmentParameters {
            activity_key: self.activity_key.clone(),
            prune_log_model_interleavings: !self.no_pruning,
            deadline,
            max_queued_states: self.max_states,
            number_of_threads: self.threads,
            show_progress: self.progress,
            ..Default::default()
        })
    }

    pub fn execute(&self) -> Result<()> {
        let parameters = self.get_parameters()?;

        let model = fs::read_to_string(&self.model)
            .with_context(|| format!("could not read file {}", self.model.display()))?
            .parse::<AcceptingPetriNet>()
            .with_context(|| format!("could not parse accepting Petri net {}", self.model.display()))?;

        let file = File::open(&self.log).with_context(|| format!("could not read file {}", self.log.display()))?;
        let log = EventLog::import_json(&mut BufReader::new(file))
            .with_context(|| format!("could not parse event log {}", self.log.display()))?;

        let results = align_log(&log, &model, &parameters)?;
        if let Some(fitness) = average_fitness(&results) {
            log::info!("average fitness {}", fitness);
        }

        let json = results_to_json(&results)?;
        match &self.output {
            Some(path) => {
                let file = File::create(path).with_context(|| format!("could not create file {}", path.display()))?;
                let mut writer = BufWriter::new(file);
                serde_json::to_writer_pretty(&mut writer, &json)?;
                writer.flush()?;
            }
            None => {
                let mut writer = io::stdout().lock();
                serde_json::to_writer_pretty(&mut writer, &json)?;
                writeln!(writer)?;
            }
        }

        Ok(())
    }
}

/**
 * One object per trace: the alignment, or the index of the trace and its error.
 */
pub fn results_to_json(results: &[Result<PerTraceResult, AlignmentError>]) -> Result<Value> {
    Ok(Value::Array(
        results
            .iter()
            .enumerate()
            .map(|(trace_index, result)| match result {
                Ok(result) => serde_json::to_value(result),
                Err(error) => Ok(json!({
                    "trace_index": trace_index,
                    "error": error.to_string(),
                })),
            })
            .collect::<Result<Vec<_>, _>>()?,
    ))
}

pub fn get_progress_bar(total_ticks: usize) -> ProgressBar {
    let pb = ProgressBar::new(total_ticks as u64);
    if let Ok(style) = ProgressStyle::with_template("[{wide_bar:.cyan/blue}] {pos:>7}/{len:7}") {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_position(0);
    pb
}
