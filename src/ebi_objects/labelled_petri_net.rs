use anyhow::Result;
use std::fmt;

use crate::{
    ebi_framework::activity_key::{Activity, ActivityKey},
    marking::Marking,
    net::{Arc, PetriNet, PlaceIndex, TransitionIndex},
};

/**
 * A Petri net in which every transition either carries an activity label or is silent.
 * Several transitions may carry the same label.
 */
#[derive(Clone, Debug, Default)]
pub struct LabelledPetriNet {
    pub(crate) activity_key: ActivityKey,
    pub(crate) net: PetriNet,
    pub(crate) labels: Vec<Option<Activity>>,
}

impl LabelledPetriNet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_number_of_transitions(&self) -> usize {
        self.net.get_number_of_transitions()
    }

    pub fn get_number_of_places(&self) -> usize {
        self.net.get_number_of_places()
    }

    pub fn get_activity_key(&self) -> &ActivityKey {
        &self.activity_key
    }

    pub fn get_activity_key_mut(&mut self) -> &mut ActivityKey {
        &mut self.activity_key
    }

    pub fn get_net(&self) -> &PetriNet {
        &self.net
    }

    pub fn get_arcs(&self) -> &[Arc] {
        self.net.get_arcs()
    }

    pub fn is_transition_silent(&self, transition: TransitionIndex) -> bool {
        self.labels[transition].is_none()
    }

    pub fn get_transition_label(&self, transition: TransitionIndex) -> Option<Activity> {
        self.labels[transition]
    }

    pub fn add_place(&mut self, name: impl Into<String>) -> PlaceIndex {
        self.net.add_place(name)
    }

    /**
     * Adds a transition labelled with `label`, or a silent transition if `label` is `None`.
     */
    pub fn add_transition(&mut self, name: impl Into<String>, label: Option<&str>) -> TransitionIndex {
        let activity = label.map(|label| self.activity_key.process_activity(label));
        self.add_transition_activity(name, activity)
    }

    pub fn add_transition_activity(&mut self, name: impl Into<String>, activity: Option<Activity>) -> TransitionIndex {
        self.labels.push(activity);
        self.net.add_transition(name)
    }

    pub fn add_place_transition_arc(&mut self, from_place: PlaceIndex, to_transition: TransitionIndex, weight: u64) -> Result<()> {
        self.net.add_place_transition_arc(from_place, to_transition, weight)
    }

    pub fn add_transition_place_arc(&mut self, from_transition: TransitionIndex, to_place: PlaceIndex, weight: u64) -> Result<()> {
        self.net.add_transition_place_arc(from_transition, to_place, weight)
    }

    pub fn new_marking(&self) -> Marking {
        self.net.new_marking()
    }

    pub fn get_enabled_transitions(&self, marking: &Marking) -> Vec<TransitionIndex> {
        self.net.get_enabled_transitions(marking)
    }

    pub fn execute_transition(&self, marking: &mut Marking, transition: TransitionIndex) -> Result<()> {
        self.net.execute_transition(marking, transition)
    }

    pub fn get_transition_display(&self, transition: TransitionIndex) -> String {
        match self.labels[transition] {
            Some(activity) => format!(
                "{} ({})",
                self.net.get_transition_name(transition),
                self.activity_key.get_activity_label(&activity)
            ),
            None => format!("{} (silent)", self.net.get_transition_name(transition)),
        }
    }
}

impl fmt::Display for LabelledPetriNet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "places: {}", self.net.place_names.join(", "))?;
        for transition in 0..self.get_number_of_transitions() {
            writeln!(f, "transition {}", self.get_transition_display(transition))?;
        }
        for arc in self.net.get_arcs() {
            writeln!(f, "arc {}", arc)?;
        }
        write!(f, "")
    }
}

#[cfg(test)]
mod tests {
    use super::LabelledPetriNet;

    #[test]
    fn duplicate_labels_share_activity() {
        let mut lpn = LabelledPetriNet::new();
        let t1 = lpn.add_transition("t1", Some("a"));
        let t2 = lpn.add_transition("t2", Some("a"));
        let tau = lpn.add_transition("tau", None);

        assert_eq!(lpn.get_transition_label(t1), lpn.get_transition_label(t2));
        assert!(lpn.is_transition_silent(tau));
        assert!(!lpn.is_transition_silent(t1));
        assert_eq!(lpn.get_activity_key().get_number_of_activities(), 1);
        assert_eq!(lpn.get_transition_display(tau), "tau (silent)");
    }
}
