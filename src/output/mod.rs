pub mod formatter;

pub use formatter::{
    format_report, format_results_table, format_score, format_scores, format_simulation_table,
    format_tsv, should_use_colors,
};
