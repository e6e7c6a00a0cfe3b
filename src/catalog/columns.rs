use crate::scores::Subject;
use serde::{Deserialize, Serialize};

/// Column names of the percentage weight table, one per subject.
///
/// These are join keys against live data and are kept exactly as the data
/// spells them, including `SOCIALES Y CIDADANAS`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SubjectColumns {
    pub critical_reading: String,
    pub mathematics: String,
    pub social_sciences: String,
    pub natural_sciences: String,
    pub english: String,
}

impl Default for SubjectColumns {
    fn default() -> Self {
        Self {
            critical_reading: "LECTURA CRITICA".to_string(),
            mathematics: "MATEMATICAS".to_string(),
            social_sciences: "SOCIALES Y CIDADANAS".to_string(),
            natural_sciences: "CIENCIAS NATURALES".to_string(),
            english: "INGLES".to_string(),
        }
    }
}

impl SubjectColumns {
    pub fn column(&self, subject: Subject) -> &str {
        match subject {
            Subject::CriticalReading => &self.critical_reading,
            Subject::Mathematics => &self.mathematics,
            Subject::SocialSciences => &self.social_sciences,
            Subject::NaturalSciences => &self.natural_sciences,
            Subject::English => &self.english,
        }
    }
}

/// Column names of both catalog tables.
///
/// Example YAML:
/// ```yaml
/// columns:
///   code: CODIGO
///   last: ULTIMO
///   subjects:
///     social_sciences: "SOCIALES Y CIDADANAS"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogColumns {
    /// Join key present in both tables
    pub code: String,
    pub program: String,
    pub campus: String,
    pub schedule: String,
    /// Score of the last admitted student
    pub last: String,
    /// Score of the first admitted student
    pub first: String,
    pub subjects: SubjectColumns,
}

impl Default for CatalogColumns {
    fn default() -> Self {
        Self {
            code: "CODIGO".to_string(),
            program: "PROGRAMA".to_string(),
            campus: "SEDE".to_string(),
            schedule: "JORNADA".to_string(),
            last: "ULTIMO".to_string(),
            first: "PRIMERO".to_string(),
            subjects: SubjectColumns::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_social_sciences_column_keeps_source_spelling() {
        let columns = SubjectColumns::default();
        assert_eq!(columns.column(Subject::SocialSciences), "SOCIALES Y CIDADANAS");
    }

    #[test]
    fn test_partial_columns_parse() {
        let yaml = r#"
code: PROGRAM_ID
subjects:
  english: "ENGLISH"
"#;
        let columns: CatalogColumns = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(columns.code, "PROGRAM_ID");
        assert_eq!(columns.last, "ULTIMO");
        assert_eq!(columns.subjects.english, "ENGLISH");
        assert_eq!(columns.subjects.mathematics, "MATEMATICAS");
    }
}
