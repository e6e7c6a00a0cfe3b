pub mod engine;
pub mod filter;

pub use engine::{
    composite_score, evaluate, evaluate_raw, evaluate_snapshot, format_cutoff_range, is_eligible,
    round_score, simulate, sort_by_score, Evaluation, EvaluationReport, ScoredProgram,
    ViableResult,
};
pub use filter::{filter_matching, SearchFields};
