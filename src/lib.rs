pub mod ebi_framework {
    pub mod activity_key;
    pub mod ebi_command;
}
pub mod ebi_objects {
    pub mod accepting_petri_net;
    pub mod alignments;
    pub mod event_log;
    pub mod labelled_petri_net;
}
pub mod ebi_alignments {
    pub mod alignment_error;
    pub mod astar;
    pub mod cost_function;
    pub mod incidence_matrix;
    pub mod linear_programming_solver;
    pub mod marking_equation_heuristic;
    pub mod synchronous_product_net;
    pub mod trace_net;
}
pub mod techniques {
    pub mod align;
    pub mod align_log;
    pub mod fitness;
}
pub mod json;
pub mod line_reader;
pub mod marking;
pub mod net;
