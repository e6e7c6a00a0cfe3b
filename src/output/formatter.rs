use std::io::IsTerminal;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::scores::{ScoreInput, Subject};
use crate::scoring::{EvaluationReport, ScoredProgram, ViableResult};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a composite score with two decimals ("70.50")
pub fn format_score(score: f64) -> String {
    format!("{:.2}", score)
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a program name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn fit_name(name: &str, fixed_width: usize, term_width: Option<usize>) -> String {
    match term_width {
        Some(width) if width > fixed_width + 10 => truncate_name(name, width - fixed_width),
        Some(_) => truncate_name(name, 20),
        None => name.to_string(),
    }
}

/// Format eligible programs as a table: index, score, cutoff range, name, campus/schedule
pub fn format_results_table(results: &[&ViableResult], use_colors: bool) -> String {
    if results.is_empty() {
        return "No eligible programs for these scores.".to_string();
    }

    let term_width = get_terminal_width();
    let separator = "  ";
    let score_width = 6;
    let range_width = results
        .iter()
        .map(|r| r.cutoff_range.chars().count())
        .max()
        .unwrap_or(0);

    results
        .iter()
        .enumerate()
        .map(|(idx, result)| {
            let index_str = format!("{:>3}.", idx + 1);
            let score_str = format!("{:>width$}", format_score(result.final_score), width = score_width);
            let range_str = format!("{:<width$}", result.cutoff_range, width = range_width);
            let place = format!("{} / {}", result.campus, result.schedule);

            let fixed_width = index_str.len()
                + 1
                + score_width
                + range_width
                + separator.len() * 3
                + place.chars().count();
            let name = fit_name(&result.name, fixed_width, term_width);

            if use_colors {
                format!(
                    "{} {}{}{}{}{}{}{}",
                    index_str.dimmed(),
                    score_str.bold(),
                    separator,
                    range_str.dimmed(),
                    separator,
                    name,
                    separator,
                    place.cyan()
                )
            } else {
                format!(
                    "{} {}{}{}{}{}{}{}",
                    index_str, score_str, separator, range_str, separator, name, separator, place
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format simulated scores for one campus and schedule: index, score, code, name
pub fn format_simulation_table(programs: &[&ScoredProgram], use_colors: bool) -> String {
    if programs.is_empty() {
        return "No programs offered for this campus and schedule.".to_string();
    }

    let term_width = get_terminal_width();
    let separator = "  ";
    let score_width = 6;
    let code_width = programs
        .iter()
        .map(|p| p.code.chars().count())
        .max()
        .unwrap_or(0);

    programs
        .iter()
        .enumerate()
        .map(|(idx, program)| {
            let index_str = format!("{:>3}.", idx + 1);
            let score_str = format!("{:>width$}", format_score(program.score), width = score_width);
            let code_str = format!("{:<width$}", program.code, width = code_width);
            let fixed_width = index_str.len() + 1 + score_width + code_width + separator.len() * 2;
            let name = fit_name(&program.name, fixed_width, term_width);

            if use_colors {
                format!(
                    "{} {}{}{}{}{}",
                    index_str.dimmed(),
                    score_str.bold(),
                    separator,
                    code_str.yellow(),
                    separator,
                    name
                )
            } else {
                format!("{} {}{}{}{}{}", index_str, score_str, separator, code_str, separator, name)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format eligible programs as tab-separated values for scripting
/// Columns: score, code, name, campus, schedule, cutoff_last, cutoff_first (no headers, no colors)
pub fn format_tsv(results: &[&ViableResult]) -> String {
    results
        .iter()
        .map(|result| {
            let first = result
                .cutoff_first
                .map(format_score)
                .unwrap_or_default();
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                format_score(result.final_score),
                result.code,
                result.name,
                result.campus,
                result.schedule,
                format_score(result.cutoff_last),
                first
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format the five subscores and their total on one line
pub fn format_scores(scores: &ScoreInput, use_colors: bool) -> String {
    let parts: Vec<String> = Subject::ALL
        .iter()
        .map(|subject| format!("{} {}", subject.label(), scores.get(*subject)))
        .collect();
    let total = format!("total {}", scores.total());
    if use_colors {
        format!("{} | {}", parts.join(", "), total.bold())
    } else {
        format!("{} | {}", parts.join(", "), total)
    }
}

/// Summarize an evaluation pass (for verbose mode)
pub fn format_report(report: &EvaluationReport) -> String {
    format!(
        "{} programs considered: {} scored, {} eligible, {} without weights, {} voided, {} unparseable cutoff",
        report.considered,
        report.scored,
        report.eligible,
        report.missing_weights,
        report.voided,
        report.unparseable_cutoff
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result(name: &str) -> ViableResult {
        ViableResult {
            code: "101".to_string(),
            name: name.to_string(),
            campus: "Sogamoso".to_string(),
            schedule: "Diurna".to_string(),
            final_score: 70.5,
            cutoff_last: 68.0,
            cutoff_first: Some(79.45),
            cutoff_range: "68.00 - 79.45".to_string(),
        }
    }

    #[test]
    fn test_format_score_two_decimals() {
        assert_eq!(format_score(70.5), "70.50");
        assert_eq!(format_score(0.0), "0.00");
        assert_eq!(format_score(72.349), "72.35");
    }

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("Medicina", 20), "Medicina");
        assert_eq!(truncate_name("Ingeniería Industrial", 10), "Ingenie...");
        assert_eq!(truncate_name("Medicina", 3), "Med");
    }

    #[test]
    fn test_results_table_empty() {
        assert_eq!(
            format_results_table(&[], false),
            "No eligible programs for these scores."
        );
    }

    #[test]
    fn test_results_table_row() {
        let result = sample_result("Ingeniería Industrial");
        let table = format_results_table(&[&result], false);
        assert!(table.starts_with("  1.  70.50  68.00 - 79.45"));
        assert!(table.contains("Sogamoso / Diurna"));
    }

    #[test]
    fn test_format_tsv() {
        let mut result = sample_result("Medicina");
        assert_eq!(
            format_tsv(&[&result]),
            "70.50\t101\tMedicina\tSogamoso\tDiurna\t68.00\t79.45"
        );
        result.cutoff_first = None;
        assert!(format_tsv(&[&result]).ends_with("\t68.00\t"));
        assert_eq!(format_tsv(&[]), "");
    }

    #[test]
    fn test_simulation_table_row() {
        let program = ScoredProgram {
            code: "MED".to_string(),
            name: "Medicina".to_string(),
            campus: "Tunja".to_string(),
            schedule: "Diurna".to_string(),
            score: 67.5,
        };
        let table = format_simulation_table(&[&program], false);
        assert!(table.starts_with("  1.  67.50  MED"));
        assert!(table.contains("Medicina"));
    }

    #[test]
    fn test_format_scores_shows_total() {
        let scores = ScoreInput::new(70, 80, 60, 65, 55).unwrap();
        let line = format_scores(&scores, false);
        assert!(line.ends_with("| total 330"));
    }

    #[test]
    fn test_format_report() {
        let report = EvaluationReport {
            considered: 4,
            scored: 2,
            eligible: 1,
            missing_weights: 1,
            voided: 1,
            unparseable_cutoff: 0,
        };
        assert_eq!(
            format_report(&report),
            "4 programs considered: 2 scored, 1 eligible, 1 without weights, 1 voided, 0 unparseable cutoff"
        );
    }
}
