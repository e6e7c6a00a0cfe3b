use crate::catalog::{CatalogHandle, Program, ProgramCatalog, WeightVector};
use crate::error::EngineError;
use crate::scores::{validate_scores, RawScore, ScoreInput, Subject};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Slack applied to the score scaled by 100 before rounding, so values such
/// as `1.005` (stored as `1.00499999...`) still round up.
const ROUNDING_TOLERANCE: f64 = 1e-9;

/// A program the student would be admitted to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViableResult {
    pub code: String,
    pub name: String,
    pub campus: String,
    pub schedule: String,
    /// Weighted composite rounded to 2 decimals
    pub final_score: f64,
    pub cutoff_last: f64,
    pub cutoff_first: Option<f64>,
    /// "last - first", e.g. "68.00 - 79.45"
    pub cutoff_range: String,
}

/// A program scored without regard to its cutoff.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredProgram {
    pub code: String,
    pub name: String,
    pub campus: String,
    pub schedule: String,
    pub score: f64,
}

/// What happened to each program during a pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EvaluationReport {
    pub considered: usize,
    /// No weight entry for the program's code
    pub missing_weights: usize,
    /// A weight was absent or unusable, voiding the composite
    pub voided: usize,
    /// Composite computed but the last-admitted cutoff could not be parsed
    pub unparseable_cutoff: usize,
    pub scored: usize,
    pub eligible: usize,
}

/// Output of one eligibility pass. Results keep catalog order.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub results: Vec<ViableResult>,
    pub report: EvaluationReport,
}

/// Weighted composite `Σ score × weight` over the five subjects.
///
/// Fails fast: the first subject whose weight is absent or not finite voids
/// the whole composite and is returned as the error. Nothing is defaulted
/// to zero.
pub fn composite_score(scores: &ScoreInput, weights: &WeightVector) -> Result<f64, Subject> {
    let mut total = 0.0;
    for subject in Subject::ALL {
        let weight = weights
            .get(subject)
            .filter(|w| w.is_finite())
            .ok_or(subject)?;
        total += scores.get(subject) as f64 * weight;
    }
    Ok(total)
}

/// Round half-up to 2 decimals: 72.345 -> 72.35, 72.344 -> 72.34
pub fn round_score(value: f64) -> f64 {
    (value * 100.0 + ROUNDING_TOLERANCE).round() / 100.0
}

/// Admission predicate. Meeting the cutoff exactly counts.
pub fn is_eligible(final_score: f64, cutoff_last: f64) -> bool {
    final_score >= cutoff_last
}

pub fn format_cutoff_range(cutoff_last: f64, cutoff_first: Option<f64>) -> String {
    match cutoff_first {
        Some(first) => format!("{:.2} - {:.2}", cutoff_last, first),
        None => format!("{:.2} - n/a", cutoff_last),
    }
}

/// Score every program in the catalog and keep those whose rounded
/// composite meets the last-admitted cutoff.
///
/// Bad programs are skipped, never raised: a code without weights, a voided
/// composite, or an unparseable cutoff just leaves the program out. Results
/// are not sorted; see [`sort_by_score`].
pub fn evaluate(scores: &ScoreInput, catalog: &ProgramCatalog) -> Result<Evaluation, EngineError> {
    if catalog.scorable_count() == 0 {
        return Err(EngineError::EmptyCatalog);
    }

    let mut report = EvaluationReport::default();
    let mut results = Vec::new();

    for program in catalog.all_programs() {
        report.considered += 1;

        let Some(weights) = catalog.lookup_weights(&program.code) else {
            debug!(code = %program.code, campus = %program.campus, "no weight entry; skipping");
            report.missing_weights += 1;
            continue;
        };

        let composite = match composite_score(scores, weights) {
            Ok(value) => value,
            Err(subject) => {
                debug!(code = %program.code, subject = %subject, "unusable weight; program voided");
                report.voided += 1;
                continue;
            }
        };
        let final_score = round_score(composite);

        let Some(cutoff_last) = program.cutoff_last.value() else {
            debug!(
                code = %program.code,
                raw = program.cutoff_last.raw(),
                "unparseable last-admitted cutoff; skipping"
            );
            report.unparseable_cutoff += 1;
            continue;
        };
        report.scored += 1;

        let cutoff_first = program.cutoff_first.value();
        if let Some(first) = cutoff_first.filter(|first| *first < cutoff_last) {
            warn!(
                code = %program.code,
                last = cutoff_last,
                first,
                "first-admitted cutoff below last-admitted cutoff"
            );
        }

        if is_eligible(final_score, cutoff_last) {
            report.eligible += 1;
            results.push(viable_result(program, final_score, cutoff_last, cutoff_first));
        }
    }

    debug!(
        considered = report.considered,
        eligible = report.eligible,
        missing_weights = report.missing_weights,
        voided = report.voided,
        "eligibility pass complete"
    );

    Ok(Evaluation { results, report })
}

/// Validate a raw score map, then evaluate.
pub fn evaluate_raw(
    raw: &BTreeMap<String, RawScore>,
    catalog: &ProgramCatalog,
) -> Result<Evaluation, EngineError> {
    let scores = validate_scores(raw)?;
    evaluate(&scores, catalog)
}

/// Evaluate against the snapshot current at call time.
pub fn evaluate_snapshot(
    scores: &ScoreInput,
    handle: &CatalogHandle,
) -> Result<Evaluation, EngineError> {
    let catalog = handle.snapshot()?;
    evaluate(scores, &catalog)
}

fn viable_result(
    program: &Program,
    final_score: f64,
    cutoff_last: f64,
    cutoff_first: Option<f64>,
) -> ViableResult {
    ViableResult {
        code: program.code.clone(),
        name: program.name.clone(),
        campus: program.campus.clone(),
        schedule: program.schedule.clone(),
        final_score,
        cutoff_last,
        cutoff_first,
        cutoff_range: format_cutoff_range(cutoff_last, cutoff_first),
    }
}

/// Sort descending by final score; ties by code, then catalog order.
pub fn sort_by_score(results: &mut [ViableResult]) {
    results.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.code.cmp(&b.code))
    });
}

/// Score every program offered at one campus and schedule, cutoffs ignored.
///
/// Sorted descending by score, ties by code. Voided programs are left out.
pub fn simulate(
    scores: &ScoreInput,
    catalog: &ProgramCatalog,
    campus: &str,
    schedule: &str,
) -> Vec<ScoredProgram> {
    let mut scored: Vec<ScoredProgram> = catalog
        .filter_by_campus_and_schedule(campus, schedule)
        .into_iter()
        .filter_map(|program| {
            let weights = catalog.lookup_weights(&program.code)?;
            let composite = composite_score(scores, weights).ok()?;
            Some(ScoredProgram {
                code: program.code.clone(),
                name: program.name.clone(),
                campus: program.campus.clone(),
                schedule: program.schedule.clone(),
                score: round_score(composite),
            })
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.code.cmp(&b.code))
    });
    scored
}
