use anyhow::{Result, anyhow};
use std::fmt::{Debug, Display, Formatter};

/// A multiset of tokens over the places of a net. Places without an entry hold zero tokens.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Marking {
    pub(crate) place2token: Vec<u64>, //for each place: number of tokens in that place
}

impl Marking {
    pub fn new(size: usize) -> Self {
        Marking {
            place2token: vec![0; size],
        }
    }

    pub fn get_place2token(&self) -> &Vec<u64> {
        &self.place2token
    }

    pub fn get_number_of_places(&self) -> usize {
        self.place2token.len()
    }

    pub fn get(&self, place: usize) -> u64 {
        self.place2token.get(place).copied().unwrap_or(0)
    }

    pub fn set(&mut self, place: usize, tokens: u64) -> Result<()> {
        match self.place2token.get_mut(place) {
            Some(count) => {
                *count = tokens;
                Ok(())
            }
            None => Err(anyhow!(
                "place {} does not exist in a marking of {} places",
                place,
                self.place2token.len()
            )),
        }
    }

    pub fn increase(&mut self, place: usize, amount: u64) -> Result<()> {
        let count = self
            .place2token
            .get_mut(place)
            .ok_or_else(|| anyhow!("place {} does not exist in the marking", place))?;
        *count = count.checked_add(amount).ok_or_else(|| {
            anyhow!(
                "tried to put too many tokens in a marking for place {}",
                place
            )
        })?;
        Ok(())
    }

    pub fn decrease(&mut self, place: usize, amount: u64) -> Result<()> {
        let count = self
            .place2token
            .get_mut(place)
            .ok_or_else(|| anyhow!("place {} does not exist in the marking", place))?;
        if *count < amount {
            return Err(anyhow!(
                "tried to obtain a negative number of tokens in a marking for place {}",
                place
            ));
        }
        *count -= amount;
        Ok(())
    }

    /**
     * Iterates over (place, tokens) for the places that hold at least one token, in place order.
     */
    pub fn iter_marked_places(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.place2token
            .iter()
            .enumerate()
            .filter(|(_, tokens)| **tokens > 0)
            .map(|(place, tokens)| (place, *tokens))
    }

    /**
     * Concatenates two markings; the places of `other` are numbered after the places of `self`.
     */
    pub fn disjoint_union(&self, other: &Self) -> Self {
        let mut place2token = Vec::with_capacity(self.place2token.len() + other.place2token.len());
        place2token.extend_from_slice(&self.place2token);
        place2token.extend_from_slice(&other.place2token);
        Marking { place2token }
    }
}

impl From<Vec<u64>> for Marking {
    fn from(value: Vec<u64>) -> Self {
        Self { place2token: value }
    }
}

impl Display for Marking {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for (place, multiplicity) in self.iter_marked_places() {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{}:{}", place, multiplicity)?;
        }
        write!(f, "}}")
    }
}

impl Debug for Marking {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
