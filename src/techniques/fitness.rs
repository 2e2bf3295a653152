use crate::ebi_alignments::cost_function::STD_MODEL_LOG_MOVE_COST;

/**
 * The cost of an alignment in units of log or model moves. Silent moves cost far less than one
 * unit and vanish.
 */
pub fn normalise_cost(cost: u64) -> u64 {
    cost / STD_MODEL_LOG_MOVE_COST
}

/**
 * Fitness of an alignment of normalised cost `normalised_cost`, relative to `worst`, the normalised
 * cost of aligning the empty trace. A free alignment has fitness 1, an alignment as expensive as the
 * empty trace has fitness 0, and more expensive alignments have negative fitness.
 * If the empty trace itself fits (worst is 0), any alignment that is not free has fitness 0.
 */
pub fn fitness(normalised_cost: u64, worst: u64) -> f64 {
    if normalised_cost == 0 {
        1.0
    } else if worst == 0 {
        0.0
    } else {
        1.0 - normalised_cost as f64 / worst as f64
    }
}
