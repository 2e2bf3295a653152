use ndarray::Array1;
use sprs::{CompressedStorage, CsMat, CsVec};

use crate::{marking::Marking, net::PetriNet};

/**
 * The incidence matrix of a net: one row per place and one column per transition, holding the
 * number of tokens the transition produces in the place minus the number it consumes. Rows and
 * columns use the indices of the places and transitions in the net.
 */
#[derive(Clone, Debug)]
pub struct IncidenceMatrix {
    matrix: CsMat<i64>,
}

impl IncidenceMatrix {
    pub fn new(net: &PetriNet) -> Self {
        let number_of_transitions = net.get_number_of_transitions();

        let mut place2row = vec![vec![0i64; number_of_transitions]; net.get_number_of_places()];
        for transition in 0..number_of_transitions {
            for (place, weight) in net.get_input_places(transition) {
                place2row[place][transition] -= weight as i64;
            }
            for (place, weight) in net.get_output_places(transition) {
                place2row[place][transition] += weight as i64;
            }
        }

        let mut matrix = CsMat::empty(CompressedStorage::CSR, number_of_transitions);
        for row in place2row {
            let (indices, data): (Vec<usize>, Vec<i64>) = row
                .into_iter()
                .enumerate()
                .filter(|(_, value)| *value != 0)
                .unzip();
            let row = CsVec::new(number_of_transitions, indices, data);
            matrix = matrix.append_outer_csvec(row.view());
        }

        Self { matrix }
    }

    pub fn get_number_of_places(&self) -> usize {
        self.matrix.rows()
    }

    pub fn get_number_of_transitions(&self) -> usize {
        self.matrix.cols()
    }

    pub fn get_matrix(&self) -> &CsMat<i64> {
        &self.matrix
    }

    pub fn get(&self, place: usize, transition: usize) -> i64 {
        self.matrix.get(place, transition).copied().unwrap_or(0)
    }

    pub fn encode_marking(&self, marking: &Marking) -> Array1<i64> {
        (0..self.get_number_of_places())
            .map(|place| marking.get(place) as i64)
            .collect()
    }

    /**
     * The right-hand side of the marking equation A·x = to - from.
     */
    pub fn encode_difference(&self, from: &Marking, to: &Marking) -> Array1<f64> {
        (self.encode_marking(to) - self.encode_marking(from)).mapv(|tokens| tokens as f64)
    }

    pub fn encode_costs(costs: &[u64]) -> Array1<f64> {
        costs.iter().map(|cost| *cost as f64).collect()
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use crate::{marking::Marking, net::PetriNet};

    use super::IncidenceMatrix;

    #[test]
    fn incidence_of_loop() {
        let mut net = PetriNet::new();
        let p0 = net.add_place("p0");
        let p1 = net.add_place("p1");
        let t0 = net.add_transition("t0");
        let t1 = net.add_transition("t1");
        net.add_place_transition_arc(p0, t0, 1).unwrap();
        net.add_transition_place_arc(t0, p1, 2).unwrap();
        //self loop
        net.add_place_transition_arc(p1, t1, 1).unwrap();
        net.add_transition_place_arc(t1, p1, 1).unwrap();

        let matrix = IncidenceMatrix::new(&net);
        assert_eq!(matrix.get_number_of_places(), 2);
        assert_eq!(matrix.get_number_of_transitions(), 2);
        assert_eq!(matrix.get(p0, t0), -1);
        assert_eq!(matrix.get(p1, t0), 2);
        assert_eq!(matrix.get(p0, t1), 0);
        assert_eq!(matrix.get(p1, t1), 0);

        let from = Marking::from(vec![1, 0]);
        let to = Marking::from(vec![0, 2]);
        assert_eq!(matrix.encode_marking(&from), array![1, 0]);
        assert_eq!(matrix.encode_difference(&from, &to), array![-1.0, 2.0]);
        assert_eq!(IncidenceMatrix::encode_costs(&[3, 0]), array![3.0, 0.0]);
    }
}
