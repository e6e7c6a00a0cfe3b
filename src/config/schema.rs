use crate::catalog::CatalogColumns;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration.
///
/// Example YAML:
/// ```yaml
/// environment: production
/// log_level: info
/// catalog:
///   weights: ~/admisiones/ponderados.csv
///   cutoffs: ~/admisiones/puntajes.csv
/// columns:
///   subjects:
///     social_sciences: "SOCIALES Y CIDADANAS"
/// scores:
///   path: ~/.config/admit-rank/scores.json
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub environment: Environment,

    /// Default log filter when RUST_LOG is unset (e.g. "info", "admit_rank=debug")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Source column names for both catalog tables
    #[serde(default)]
    pub columns: CatalogColumns,

    #[serde(default)]
    pub scores: ScoresConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            log_level: default_log_level(),
            catalog: CatalogConfig::default(),
            columns: CatalogColumns::default(),
            scores: ScoresConfig::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Which score store backs the session.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Scores live in memory for the run only
    Development,
    /// Scores persist to the JSON store on disk
    #[default]
    Production,
}

/// Where catalog tables are read from.
///
/// Either both `weights` and `cutoffs` are set, or `embedded` points at a
/// JSON program list carrying its own weights.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Percentage weight table (CSV)
    #[serde(default)]
    pub weights: Option<PathBuf>,

    /// Cutoff table (CSV)
    #[serde(default)]
    pub cutoffs: Option<PathBuf>,

    /// Program list with fractional weights (JSON)
    #[serde(default)]
    pub embedded: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoresConfig {
    /// Defaults to ~/.config/admit-rank/scores.json
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.log_level.trim().is_empty() {
        errors.push("log_level: must not be empty".to_string());
    }

    let catalog = &config.catalog;
    match (&catalog.weights, &catalog.cutoffs) {
        (Some(_), None) => errors.push("catalog.cutoffs: required when catalog.weights is set".to_string()),
        (None, Some(_)) => errors.push("catalog.weights: required when catalog.cutoffs is set".to_string()),
        _ => {}
    }
    if catalog.embedded.is_some() && (catalog.weights.is_some() || catalog.cutoffs.is_some()) {
        errors.push("catalog.embedded: cannot be combined with catalog.weights/cutoffs".to_string());
    }

    let columns = &config.columns;
    let table_columns = [
        ("code", &columns.code),
        ("program", &columns.program),
        ("campus", &columns.campus),
        ("schedule", &columns.schedule),
        ("last", &columns.last),
        ("first", &columns.first),
    ];
    for (field, value) in table_columns {
        if value.trim().is_empty() {
            errors.push(format!("columns.{}: must not be empty", field));
        }
    }

    let mut seen: Vec<&str> = Vec::new();
    for subject in crate::scores::Subject::ALL {
        let column = columns.subjects.column(subject);
        if column.trim().is_empty() {
            errors.push(format!("columns.subjects.{}: must not be empty", subject.stored_key()));
        } else if seen.contains(&column) {
            errors.push(format!(
                "columns.subjects.{}: '{}' is already used by another subject",
                subject.stored_key(),
                column
            ));
        } else {
            seen.push(column);
        }
        if column == columns.code {
            errors.push(format!(
                "columns.subjects.{}: '{}' collides with the code column",
                subject.stored_key(),
                column
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
