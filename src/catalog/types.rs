use super::weights::FractionalWeights;
use serde::{Deserialize, Serialize};

/// A historical cutoff score exactly as the source wrote it.
///
/// Source values may use a comma as decimal separator (`"68,45"`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cutoff(String);

impl Cutoff {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn raw(&self) -> &str {
        &self.0
    }

    pub fn value(&self) -> Option<f64> {
        parse_decimal(&self.0)
    }
}

impl From<f64> for Cutoff {
    fn from(value: f64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for Cutoff {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Parse a decimal that may use a comma separator. Only the first comma is
/// treated as the separator.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .replacen(',', ".", 1)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// One row of the cutoff table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CutoffRow {
    pub code: String,
    pub program: String,
    pub campus: String,
    pub schedule: String,
    pub last: Cutoff,
    pub first: Cutoff,
}

/// One admission offering. Identity is code + campus + schedule; weights
/// are shared by every offering with the same code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub code: String,
    pub name: String,
    pub campus: String,
    pub schedule: String,
    pub cutoff_last: Cutoff,
    pub cutoff_first: Cutoff,
}

impl Program {
    pub fn key(&self) -> (&str, &str, &str) {
        (&self.code, &self.campus, &self.schedule)
    }
}

impl From<CutoffRow> for Program {
    fn from(row: CutoffRow) -> Self {
        Self {
            code: row.code,
            name: row.program,
            campus: row.campus,
            schedule: row.schedule,
            cutoff_last: row.last,
            cutoff_first: row.first,
        }
    }
}

/// A program listing record carrying its own fractional weights.
///
/// Example JSON:
/// ```json
/// { "code": "ING-AGR", "name": "Ingeniería Agronómica", "campus": "Tunja",
///   "jornada": "Diurna", "cutoffLast": "61,20", "cutoffFirst": "74,05",
///   "weights": { "lecturaCritica": 0.2, "cienciasNaturales": 0.5,
///                "sociales": 0.05, "matematicas": 0.2, "ingles": 0.05 } }
/// ```
///
/// `code` may be omitted; see [`EmbeddedProgram::program_code`]. Other
/// fields such as `icon` are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedProgram {
    #[serde(default)]
    pub code: String,
    pub name: String,
    pub campus: String,
    #[serde(alias = "jornada")]
    pub schedule: String,
    pub weights: FractionalWeights,
    #[serde(default)]
    pub cutoff_last: Cutoff,
    #[serde(default)]
    pub cutoff_first: Cutoff,
}

impl EmbeddedProgram {
    /// The record's code, or `"name | campus | schedule"` when it has none.
    ///
    /// Code-less listings repeat a name across campuses with different
    /// weights, so the derived key covers the whole offering.
    pub fn program_code(&self) -> String {
        let code = self.code.trim();
        if code.is_empty() {
            format!("{} | {} | {}", self.name.trim(), self.campus.trim(), self.schedule.trim())
        } else {
            code.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_accepts_comma() {
        assert_eq!(parse_decimal("68,45"), Some(68.45));
        assert_eq!(parse_decimal(" 71.0 "), Some(71.0));
        assert_eq!(parse_decimal("1,234,5"), None);
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("--"), None);
    }

    #[test]
    fn test_cutoff_value() {
        assert_eq!(Cutoff::from("70,5").value(), Some(70.5));
        assert_eq!(Cutoff::from(68.0).value(), Some(68.0));
        assert_eq!(Cutoff::default().value(), None);
    }

    #[test]
    fn test_program_from_cutoff_row() {
        let program = Program::from(CutoffRow {
            code: "101".to_string(),
            program: "Ingeniería Industrial".to_string(),
            campus: "Sogamoso".to_string(),
            schedule: "Diurna".to_string(),
            last: "65,10".into(),
            first: "78,90".into(),
        });
        assert_eq!(program.name, "Ingeniería Industrial");
        assert_eq!(program.key(), ("101", "Sogamoso", "Diurna"));
        assert_eq!(program.cutoff_first.value(), Some(78.9));
    }

    #[test]
    fn test_embedded_program_accepts_jornada_alias() {
        let program: EmbeddedProgram = serde_json::from_str(
            r#"{"code": "MED", "name": "Medicina", "campus": "Tunja", "jornada": "Diurna",
                "weights": {"lecturaCritica": 0.3, "cienciasNaturales": 0.25, "sociales": 0.2,
                            "matematicas": 0.15, "ingles": 0.1}}"#,
        )
        .unwrap();
        assert_eq!(program.schedule, "Diurna");
        assert_eq!(program.cutoff_last.value(), None);
    }

    #[test]
    fn test_embedded_program_without_code_derives_one() {
        let program: EmbeddedProgram = serde_json::from_str(
            r#"{"name": "Ingeniería Agronómica", "campus": "Tunja", "jornada": "Diurna",
                "weights": {"lecturaCritica": 0.2, "cienciasNaturales": 0.5, "sociales": 0.05,
                            "matematicas": 0.2, "ingles": 0.05},
                "icon": "leaf-outline"}"#,
        )
        .unwrap();
        assert!(program.code.is_empty());
        assert_eq!(program.program_code(), "Ingeniería Agronómica | Tunja | Diurna");

        let coded = EmbeddedProgram {
            code: " MED ".to_string(),
            ..program
        };
        assert_eq!(coded.program_code(), "MED");
    }
}
