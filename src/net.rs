use anyhow::{Result, anyhow};
use std::fmt::{self, Display};

use crate::marking::Marking;

pub type PlaceIndex = usize;
pub type TransitionIndex = usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArcType {
    PlaceTransition(PlaceIndex, TransitionIndex),
    TransitionPlace(TransitionIndex, PlaceIndex),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Arc {
    pub from_to: ArcType,
    pub weight: u64,
}

impl Display for Arc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.from_to {
            ArcType::PlaceTransition(place, transition) => {
                write!(f, "p{} -{}-> t{}", place, self.weight, transition)
            }
            ArcType::TransitionPlace(transition, place) => {
                write!(f, "t{} -{}-> p{}", transition, self.weight, place)
            }
        }
    }
}

/**
 * Places, transitions and weighted arcs. Places and transitions are identified by their index;
 * names are kept for display only.
 */
#[derive(Clone, Debug, Default)]
pub struct PetriNet {
    pub(crate) place_names: Vec<String>,
    pub(crate) transition_names: Vec<String>,
    pub(crate) arcs: Vec<Arc>,
    pub(crate) transition2input_places: Vec<Vec<PlaceIndex>>,
    pub(crate) transition2output_places: Vec<Vec<PlaceIndex>>,
    pub(crate) transition2input_places_cardinality: Vec<Vec<u64>>,
    pub(crate) transition2output_places_cardinality: Vec<Vec<u64>>,
}

impl PetriNet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_number_of_places(&self) -> usize {
        self.place_names.len()
    }

    pub fn get_number_of_transitions(&self) -> usize {
        self.transition_names.len()
    }

    pub fn add_place(&mut self, name: impl Into<String>) -> PlaceIndex {
        self.place_names.push(name.into());
        self.place_names.len() - 1
    }

    pub fn add_transition(&mut self, name: impl Into<String>) -> TransitionIndex {
        self.transition_names.push(name.into());
        self.transition2input_places.push(vec![]);
        self.transition2input_places_cardinality.push(vec![]);
        self.transition2output_places.push(vec![]);
        self.transition2output_places_cardinality.push(vec![]);
        self.transition_names.len() - 1
    }

    pub fn get_place_name(&self, place: PlaceIndex) -> &str {
        &self.place_names[place]
    }

    pub fn get_transition_name(&self, transition: TransitionIndex) -> &str {
        &self.transition_names[transition]
    }

    pub fn get_arcs(&self) -> &[Arc] {
        &self.arcs
    }

    pub fn get_input_places(&self, transition: TransitionIndex) -> impl Iterator<Item = (PlaceIndex, u64)> + '_ {
        self.transition2input_places[transition]
            .iter()
            .copied()
            .zip(self.transition2input_places_cardinality[transition].iter().copied())
    }

    pub fn get_output_places(&self, transition: TransitionIndex) -> impl Iterator<Item = (PlaceIndex, u64)> + '_ {
        self.transition2output_places[transition]
            .iter()
            .copied()
            .zip(self.transition2output_places_cardinality[transition].iter().copied())
    }

    /**
     * Adds an arc. Adding an arc between a place and transition that are already connected in
     * the same direction increases the weight of the existing arc.
     */
    pub fn add_arc(&mut self, from_to: ArcType, weight: u64) -> Result<()> {
        if weight == 0 {
            return Err(anyhow!("arc {:?} has weight 0", from_to));
        }

        match from_to {
            ArcType::PlaceTransition(place, transition) => {
                self.check_nodes(place, transition)?;
                if let Some(pos) = self.transition2input_places[transition].iter().position(|p| *p == place) {
                    self.transition2input_places_cardinality[transition][pos] += weight;
                } else {
                    self.transition2input_places[transition].push(place);
                    self.transition2input_places_cardinality[transition].push(weight);
                }
            }
            ArcType::TransitionPlace(transition, place) => {
                self.check_nodes(place, transition)?;
                if let Some(pos) = self.transition2output_places[transition].iter().position(|p| *p == place) {
                    self.transition2output_places_cardinality[transition][pos] += weight;
                } else {
                    self.transition2output_places[transition].push(place);
                    self.transition2output_places_cardinality[transition].push(weight);
                }
            }
        }

        if let Some(arc) = self.arcs.iter_mut().find(|arc| arc.from_to == from_to) {
            arc.weight += weight;
        } else {
            self.arcs.push(Arc { from_to, weight });
        }
        Ok(())
    }

    pub fn add_place_transition_arc(&mut self, from_place: PlaceIndex, to_transition: TransitionIndex, weight: u64) -> Result<()> {
        self.add_arc(ArcType::PlaceTransition(from_place, to_transition), weight)
    }

    pub fn add_transition_place_arc(&mut self, from_transition: TransitionIndex, to_place: PlaceIndex, weight: u64) -> Result<()> {
        self.add_arc(ArcType::TransitionPlace(from_transition, to_place), weight)
    }

    fn check_nodes(&self, place: PlaceIndex, transition: TransitionIndex) -> Result<()> {
        if transition >= self.get_number_of_transitions() {
            return Err(anyhow!("non-existing transition {} referenced, while there are {}", transition, self.get_number_of_transitions()));
        } else if place >= self.get_number_of_places() {
            return Err(anyhow!("non-existing place {} referenced, while there are {}", place, self.get_number_of_places()));
        }
        Ok(())
    }

    pub fn new_marking(&self) -> Marking {
        Marking::new(self.get_number_of_places())
    }

    pub fn is_transition_enabled(&self, marking: &Marking, transition: TransitionIndex) -> bool {
        self.get_input_places(transition)
            .all(|(place, weight)| marking.get(place) >= weight)
    }

    pub fn get_enabled_transitions(&self, marking: &Marking) -> Vec<TransitionIndex> {
        (0..self.get_number_of_transitions())
            .filter(|transition| self.is_transition_enabled(marking, *transition))
            .collect()
    }

    /**
     * Fires `transition` in place. Returns an error if the transition is not enabled; the marking
     * is then left unchanged.
     */
    pub fn execute_transition(&self, marking: &mut Marking, transition: TransitionIndex) -> Result<()> {
        if !self.is_transition_enabled(marking, transition) {
            return Err(anyhow!("transition {} is not enabled in {}", transition, marking));
        }
        for (place, weight) in self.get_input_places(transition) {
            marking.decrease(place, weight)?;
        }
        for (place, weight) in self.get_output_places(transition) {
            marking.increase(place, weight)?;
        }
        Ok(())
    }

    /**
     * Returns the marking reached by firing `transition`, leaving `marking` untouched.
     */
    pub fn fire(&self, marking: &Marking, transition: TransitionIndex) -> Result<Marking> {
        let mut result = marking.clone();
        self.execute_transition(&mut result, transition)?;
        Ok(result)
    }
}
