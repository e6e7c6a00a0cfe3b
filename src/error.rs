use crate::scores::Subject;

/// A single problem found while validating a raw score set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoreIssue {
    #[error("{0}: missing")]
    Missing(Subject),
    #[error("{subject}: '{value}' is not a number")]
    NonNumeric { subject: Subject, value: String },
    #[error("{subject}: '{value}' is not a whole number")]
    Fractional { subject: Subject, value: String },
    #[error("{subject}: {value} is outside 0-100")]
    OutOfRange { subject: Subject, value: i64 },
}

impl ScoreIssue {
    pub fn subject(&self) -> Subject {
        match self {
            ScoreIssue::Missing(subject) => *subject,
            ScoreIssue::NonNumeric { subject, .. }
            | ScoreIssue::Fractional { subject, .. }
            | ScoreIssue::OutOfRange { subject, .. } => *subject,
        }
    }
}

/// Raised when a score set is incomplete or carries unusable values.
/// Every offending subject is reported, not just the first.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid scores: {}", join_issues(.issues))]
pub struct ScoreValidationError {
    pub issues: Vec<ScoreIssue>,
}

impl ScoreValidationError {
    pub fn new(issues: Vec<ScoreIssue>) -> Self {
        Self { issues }
    }

    pub fn subjects(&self) -> Vec<Subject> {
        self.issues.iter().map(ScoreIssue::subject).collect()
    }
}

fn join_issues(issues: &[ScoreIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Top-level failures of an eligibility pass. Per-program problems never surface here.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    InvalidScores(#[from] ScoreValidationError),
    #[error("program catalog is empty: no program has both cutoff and weight data")]
    EmptyCatalog,
    #[error("program catalog has not been loaded")]
    CatalogNotLoaded,
}

/// Failures while fetching or parsing the raw catalog tables.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read {origin}: {source}")]
    Io {
        origin: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid CSV in {origin}: {source}")]
    Csv {
        origin: String,
        #[source]
        source: csv::Error,
    },
    #[error("invalid program list in {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{table} table in {origin} has no '{column}' column")]
    MissingColumn {
        table: &'static str,
        origin: String,
        column: String,
    },
}
