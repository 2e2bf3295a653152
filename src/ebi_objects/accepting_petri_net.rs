use anyhow::{Context, Error, Result, anyhow};
use std::{
    fmt,
    io::{self, BufRead},
    str::FromStr,
};

use crate::{ebi_objects::labelled_petri_net::LabelledPetriNet, line_reader::LineReader, marking::Marking};

pub const HEADER: &str = "accepting Petri net";

/**
 * A labelled Petri net together with its initial and final marking.
 */
#[derive(Clone, Debug)]
pub struct AcceptingPetriNet {
    pub(crate) net: LabelledPetriNet,
    pub(crate) initial_marking: Marking,
    pub(crate) final_marking: Marking,
}

impl AcceptingPetriNet {
    pub fn new(net: LabelledPetriNet, initial_marking: Marking, final_marking: Marking) -> Result<Self> {
        if initial_marking.get_number_of_places() != net.get_number_of_places() {
            return Err(anyhow!("the initial marking has {} places, while the net has {}", initial_marking.get_number_of_places(), net.get_number_of_places()));
        }
        if final_marking.get_number_of_places() != net.get_number_of_places() {
            return Err(anyhow!("the final marking has {} places, while the net has {}", final_marking.get_number_of_places(), net.get_number_of_places()));
        }
        Ok(Self {
            net,
            initial_marking,
            final_marking,
        })
    }

    pub fn get_net(&self) -> &LabelledPetriNet {
        &self.net
    }

    pub fn get_initial_marking(&self) -> &Marking {
        &self.initial_marking
    }

    pub fn get_final_marking(&self) -> &Marking {
        &self.final_marking
    }

    pub fn import(reader: &mut dyn BufRead) -> Result<Self> {
        let mut lreader = LineReader::new(reader);

        let head = lreader.next_line_string().with_context(|| format!("failed to read header, which should be {}", HEADER))?;
        if head.trim() != HEADER {
            return Err(anyhow!("first line should be exactly `{}`, but found `{}` on line `{}`", HEADER, lreader.get_last_line(), lreader.get_last_line_number()));
        }

        let mut net = LabelledPetriNet::new();

        let number_of_places = lreader.next_line_index().context("failed to read number of places")?;
        for place in 0..number_of_places {
            net.add_place(format!("p{}", place));
        }

        let mut initial_marking = vec![0u64; number_of_places];
        for place in 0..number_of_places {
            initial_marking[place] = lreader.next_line_natural().with_context(|| format!("failed to read initial marking of place {}", place))?;
        }

        let mut final_marking = vec![0u64; number_of_places];
        for place in 0..number_of_places {
            final_marking[place] = lreader.next_line_natural().with_context(|| format!("failed to read final marking of place {}", place))?;
        }

        let number_of_transitions = lreader.next_line_index().context("failed to read number of transitions")?;
        for transition in 0..number_of_transitions {
            let label_line = lreader.next_line_string().with_context(|| format!("failed to read label of transition {}", transition))?;

            let label_line = label_line.trim_start();
            let t = if let Some(label) = label_line.strip_prefix("label ") {
                net.add_transition(format!("t{}", transition), Some(label))
            } else if label_line.trim_end() == "silent" {
                net.add_transition(format!("t{}", transition), None)
            } else {
                return Err(anyhow!("transition {} should be either `label <activity>` or `silent`, but found `{}` on line {}", transition, lreader.get_last_line(), lreader.get_last_line_number()));
            };

            //read input places
            let number_of_input_places = lreader.next_line_index().with_context(|| format!("failed to read number of input places of transition {}", transition))?;
            for p in 0..number_of_input_places {
                let place = lreader.next_line_index().with_context(|| format!("failed to read input place number {} of transition {}", p, transition))?;
                if place >= number_of_places {
                    return Err(anyhow!("non-existing place referenced for transition {}, input place number {}, at line {}; found `{}`", transition, p, lreader.get_last_line_number(), lreader.get_last_line()));
                }
                net.add_place_transition_arc(place, t, 1)?;
            }

            //read output places
            let number_of_output_places = lreader.next_line_index().with_context(|| format!("failed to read number of output places of transition {}", transition))?;
            for p in 0..number_of_output_places {
                let place = lreader.next_line_index().with_context(|| format!("failed to read output place number {} of transition {}", p, transition))?;
                if place >= number_of_places {
                    return Err(anyhow!("non-existing place referenced for transition {}, output place number {}, at line {}; found `{}`", transition, p, lreader.get_last_line_number(), lreader.get_last_line()));
                }
                net.add_transition_place_arc(t, place, 1)?;
            }
        }

        Self::new(net, Marking::from(initial_marking), Marking::from(final_marking))
    }
}

impl FromStr for AcceptingPetriNet {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut reader = io::Cursor::new(s);
        Self::import(&mut reader)
    }
}

impl fmt::Display for AcceptingPetriNet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let lpn = &self.net;
        writeln!(f, "{}", HEADER)?;
        writeln!(f, "# number of places\n{}", lpn.get_number_of_places())?;

        writeln!(f, "# initial marking")?;
        for tokens in self.initial_marking.get_place2token() {
            writeln!(f, "{}", tokens)?;
        }

        writeln!(f, "# final marking")?;
        for tokens in self.final_marking.get_place2token() {
            writeln!(f, "{}", tokens)?;
        }

        writeln!(f, "# number of transitions\n{}", lpn.get_number_of_transitions())?;
        for transition in 0..lpn.get_number_of_transitions() {
            writeln!(f, "# transition {}", transition)?;

            if let Some(activity) = lpn.get_transition_label(transition) {
                writeln!(f, "label {}", lpn.activity_key.get_activity_label(&activity))?;
            } else {
                writeln!(f, "silent")?;
            }

            let inputs = lpn.net.get_input_places(transition).collect::<Vec<_>>();
            writeln!(f, "# number of input places\n{}", inputs.iter().map(|(_, weight)| weight).sum::<u64>())?;
            for (place, weight) in inputs {
                for _ in 0..weight {
                    writeln!(f, "{}", place)?;
                }
            }

            let outputs = lpn.net.get_output_places(transition).collect::<Vec<_>>();
            writeln!(f, "# number of output places\n{}", outputs.iter().map(|(_, weight)| weight).sum::<u64>())?;
            for (place, weight) in outputs {
                for _ in 0..weight {
                    writeln!(f, "{}", place)?;
                }
            }
        }

        write!(f, "")
    }
}
