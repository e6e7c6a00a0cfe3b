use super::columns::SubjectColumns;
use crate::scores::Subject;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Canonical per-program weights: fractions in `[0, 1]` keyed by subject.
///
/// A subject is `None` when the source lacked it or carried an unusable
/// value; scoring voids the whole program in that case. The sum is not
/// required to be exactly 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WeightVector {
    weights: [Option<f64>; 5],
}

impl WeightVector {
    pub fn new(
        critical_reading: f64,
        mathematics: f64,
        social_sciences: f64,
        natural_sciences: f64,
        english: f64,
    ) -> Self {
        Self {
            weights: [
                Some(critical_reading),
                Some(mathematics),
                Some(social_sciences),
                Some(natural_sciences),
                Some(english),
            ],
        }
    }

    pub fn from_fn(mut f: impl FnMut(Subject) -> Option<f64>) -> Self {
        let mut weights = [None; 5];
        for subject in Subject::ALL {
            weights[subject.index()] = f(subject);
        }
        Self { weights }
    }

    pub fn get(&self, subject: Subject) -> Option<f64> {
        self.weights[subject.index()]
    }

    pub fn is_complete(&self) -> bool {
        self.weights.iter().all(Option::is_some)
    }

    /// Sum of the present weights
    pub fn sum(&self) -> f64 {
        self.weights.iter().flatten().sum()
    }
}

/// Flat per-program weights with fractional values, as embedded in program listings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FractionalWeights {
    #[serde(default)]
    pub lectura_critica: Option<f64>,
    #[serde(default)]
    pub matematicas: Option<f64>,
    #[serde(default)]
    pub sociales: Option<f64>,
    #[serde(default)]
    pub ciencias_naturales: Option<f64>,
    #[serde(default)]
    pub ingles: Option<f64>,
}

impl FractionalWeights {
    fn get(&self, subject: Subject) -> Option<f64> {
        match subject {
            Subject::CriticalReading => self.lectura_critica,
            Subject::Mathematics => self.matematicas,
            Subject::SocialSciences => self.sociales,
            Subject::NaturalSciences => self.ciencias_naturales,
            Subject::English => self.ingles,
        }
    }
}

impl From<WeightVector> for FractionalWeights {
    fn from(vector: WeightVector) -> Self {
        Self {
            lectura_critica: vector.get(Subject::CriticalReading),
            matematicas: vector.get(Subject::Mathematics),
            sociales: vector.get(Subject::SocialSciences),
            ciencias_naturales: vector.get(Subject::NaturalSciences),
            ingles: vector.get(Subject::English),
        }
    }
}

/// One row of the cross-program percentage table: a program code plus raw
/// subject cells keyed by column name. Cells hold percentages in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PercentWeightRow {
    pub code: String,
    pub cells: HashMap<String, String>,
}

impl PercentWeightRow {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            cells: HashMap::new(),
        }
    }

    pub fn with_cell(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.cells.insert(column.into(), value.into());
        self
    }
}

/// The two weight representations found in catalog data.
#[derive(Debug, Clone, PartialEq)]
pub enum WeightShape {
    PercentTable(PercentWeightRow),
    FractionalEmbedded(FractionalWeights),
}

impl From<WeightVector> for WeightShape {
    fn from(vector: WeightVector) -> Self {
        WeightShape::FractionalEmbedded(vector.into())
    }
}

/// Turns either weight shape into a [`WeightVector`].
///
/// Percentage cells are looked up under the configured column names and
/// divided by 100. Values outside the shape's range, negative, or not
/// finite are dropped, which voids the program at scoring time.
#[derive(Debug, Clone, Default)]
pub struct WeightNormalizer {
    columns: SubjectColumns,
}

impl WeightNormalizer {
    pub fn new(columns: SubjectColumns) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &SubjectColumns {
        &self.columns
    }

    pub fn normalize(&self, shape: &WeightShape) -> WeightVector {
        match shape {
            WeightShape::PercentTable(row) => WeightVector::from_fn(|subject| {
                row.cells
                    .get(self.columns.column(subject))
                    .and_then(|cell| parse_weight_cell(cell))
                    .filter(|percent| *percent <= 100.0)
                    .map(|percent| percent / 100.0)
            }),
            WeightShape::FractionalEmbedded(weights) => WeightVector::from_fn(|subject| {
                weights
                    .get(subject)
                    .filter(|w| w.is_finite() && (0.0..=1.0).contains(w))
            }),
        }
    }
}

/// Parse a raw percentage cell: `"40"`, `"12.5"`, `"12,5"`, `"40%"`.
pub fn parse_weight_cell(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    if trimmed.is_empty() {
        return None;
    }

    trimmed
        .replacen(',', ".", 1)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}
