pub mod columns;
pub mod source;
pub mod types;
pub mod weights;

pub use columns::{CatalogColumns, SubjectColumns};
pub use source::{
    load_catalog, load_embedded_catalog, CatalogSource, CsvCatalogSource, StaticCatalogSource,
};
pub use types::{parse_decimal, Cutoff, CutoffRow, EmbeddedProgram, Program};
pub use weights::{
    parse_weight_cell, FractionalWeights, PercentWeightRow, WeightNormalizer, WeightShape,
    WeightVector,
};

use crate::error::EngineError;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// Read-only joined view of programs, their cutoffs, and the weight
/// vectors keyed by program code.
#[derive(Debug, Clone, Default)]
pub struct ProgramCatalog {
    programs: Vec<Program>,
    weights: HashMap<String, WeightVector>,
}

impl ProgramCatalog {
    pub fn new(programs: Vec<Program>, weights: HashMap<String, WeightVector>) -> Self {
        Self { programs, weights }
    }

    /// Join the percentage weight table with the cutoff table on `code`.
    ///
    /// Every cutoff row becomes a program, in table order. When a code has
    /// several weight rows the first one is used. Codes present on only one
    /// side are kept out of scoring, not rejected.
    pub fn join(
        weight_rows: Vec<PercentWeightRow>,
        cutoff_rows: Vec<CutoffRow>,
        normalizer: &WeightNormalizer,
    ) -> Self {
        let mut weights = HashMap::new();
        for row in weight_rows {
            let code = row.code.trim().to_string();
            if weights.contains_key(&code) {
                warn!(code = %code, "duplicate weight row; keeping the first");
                continue;
            }
            let vector = normalizer.normalize(&WeightShape::PercentTable(row));
            weights.insert(code, vector);
        }

        let programs: Vec<Program> = cutoff_rows
            .into_iter()
            .map(|mut row| {
                row.code = row.code.trim().to_string();
                Program::from(row)
            })
            .collect();

        let cutoff_codes: HashSet<&str> = programs.iter().map(|p| p.code.as_str()).collect();
        for code in weights.keys().filter(|c| !cutoff_codes.contains(c.as_str())) {
            debug!(code = %code, "weight entry has no cutoff row");
        }

        Self { programs, weights }
    }

    /// Build from program records that carry their own fractional weights.
    pub fn from_embedded(records: Vec<EmbeddedProgram>, normalizer: &WeightNormalizer) -> Self {
        let mut weights: HashMap<String, WeightVector> = HashMap::new();
        let mut programs = Vec::with_capacity(records.len());

        for record in records {
            let code = record.program_code();
            let vector = normalizer.normalize(&WeightShape::FractionalEmbedded(record.weights));
            match weights.get(&code) {
                Some(existing) if *existing != vector => {
                    warn!(code = %code, "conflicting weights for code; keeping the first");
                }
                Some(_) => {}
                None => {
                    weights.insert(code.clone(), vector);
                }
            }
            programs.push(Program {
                code,
                name: record.name,
                campus: record.campus,
                schedule: record.schedule,
                cutoff_last: record.cutoff_last,
                cutoff_first: record.cutoff_first,
            });
        }

        Self { programs, weights }
    }

    pub fn lookup_weights(&self, code: &str) -> Option<&WeightVector> {
        self.weights.get(code)
    }

    /// Programs in source load order
    pub fn all_programs(&self) -> &[Program] {
        &self.programs
    }

    /// Exact match on both fields
    pub fn filter_by_campus_and_schedule(&self, campus: &str, schedule: &str) -> Vec<&Program> {
        self.programs
            .iter()
            .filter(|p| p.campus == campus && p.schedule == schedule)
            .collect()
    }

    /// Distinct campuses in first-seen order
    pub fn campuses(&self) -> Vec<&str> {
        distinct(self.programs.iter().map(|p| p.campus.as_str()))
    }

    /// Distinct schedules in first-seen order
    pub fn schedules(&self) -> Vec<&str> {
        distinct(self.programs.iter().map(|p| p.schedule.as_str()))
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Number of programs that have a weight entry to score against
    pub fn scorable_count(&self) -> usize {
        self.programs
            .iter()
            .filter(|p| self.weights.contains_key(&p.code))
            .count()
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    values.filter(|v| seen.insert(*v)).collect()
}

/// Shared slot holding the current catalog snapshot.
///
/// Readers take an `Arc` at call start, so a refresh published mid-pass
/// never changes what that pass sees. An empty slot means the catalog was
/// never loaded, which is distinct from a loaded catalog with no programs.
#[derive(Debug, Default)]
pub struct CatalogHandle {
    current: RwLock<Option<Arc<ProgramCatalog>>>,
}

impl CatalogHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current catalog; returns the published snapshot
    pub fn publish(&self, catalog: ProgramCatalog) -> Arc<ProgramCatalog> {
        let snapshot = Arc::new(catalog);
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(Arc::clone(&snapshot));
        snapshot
    }

    pub fn snapshot(&self) -> Result<Arc<ProgramCatalog>, EngineError> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        guard.clone().ok_or(EngineError::CatalogNotLoaded)
    }

    pub fn is_loaded(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}
