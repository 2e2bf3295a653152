use anyhow::{Context, Error, Result};
use itertools::Itertools;
use serde_json::Value;
use std::{
    collections::HashMap,
    fmt,
    io::{self, BufRead},
    str::FromStr,
};

use crate::json;

pub const DEFAULT_ACTIVITY_KEY: &str = "concept:name";

/// An event: a mapping from attribute keys to values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Event {
    pub attributes: HashMap<String, String>,
}

impl Event {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_activity(activity: &str) -> Self {
        let mut result = Self::new();
        result.attributes.insert(DEFAULT_ACTIVITY_KEY.to_string(), activity.to_string());
        result
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(|value| value.as_str())
    }
}

pub type Trace = Vec<Event>;

#[derive(Clone, Debug, Default)]
pub struct EventLog {
    pub traces: Vec<Trace>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_number_of_traces(&self) -> usize {
        self.traces.len()
    }

    pub fn get_number_of_events(&self) -> usize {
        self.traces.iter().map(|trace| trace.len()).sum()
    }

    /**
     * Builds a log from traces of activity labels, stored under the default activity key.
     */
    pub fn from_activity_traces(traces: &[Vec<&str>]) -> Self {
        Self {
            traces: traces
                .iter()
                .map(|trace| trace.iter().map(|activity| Event::with_activity(activity)).collect())
                .collect(),
        }
    }

    /**
     * Reads a JSON array of traces, in which each trace is an array of events and each event an
     * object of attributes. Non-literal attribute values are kept as their JSON text.
     */
    pub fn import_json(reader: &mut dyn BufRead) -> Result<Self> {
        let value: Value = serde_json::from_reader(reader).context("failed to parse JSON")?;

        let mut result = Self::new();
        for (trace_index, jtrace) in json::read_list(&value).context("failed to read list of traces")?.iter().enumerate() {
            let jevents = json::read_list(jtrace).with_context(|| format!("failed to read trace {}", trace_index))?;

            let mut trace = Trace::with_capacity(jevents.len());
            for (event_index, jevent) in jevents.iter().enumerate() {
                let jattributes = json::read_object(jevent).with_context(|| format!("failed to read event {} of trace {}", event_index, trace_index))?;

                let mut event = Event::new();
                for (key, jvalue) in jattributes {
                    event.attributes.insert(key.to_string(), json::read_as_string(jvalue));
                }
                trace.push(event);
            }
            result.traces.push(trace);
        }

        log::info!("imported event log with {} traces and {} events", result.get_number_of_traces(), result.get_number_of_events());
        Ok(result)
    }
}

impl FromStr for EventLog {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut reader = io::Cursor::new(s);
        Self::import_json(&mut reader)
    }
}

impl fmt::Display for EventLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = Value::Array(
            self.traces
                .iter()
                .map(|trace| {
                    Value::Array(
                        trace
                            .iter()
                            .map(|event| {
                                Value::Object(
                                    event
                                        .attributes
                                        .iter()
                                        .sorted()
                                        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
                                        .collect(),
                                )
                            })
                            .collect(),
                    )
                })
                .collect(),
        );
        write!(f, "{}", value)
    }
}
