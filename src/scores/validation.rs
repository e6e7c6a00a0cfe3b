use super::types::{ScoreInput, Subject, MAX_SUBJECT_SCORE};
use crate::error::{ScoreIssue, ScoreValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A subscore as it arrives from a form, a command line, or a stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawScore {
    Integer(i64),
    /// Any JSON number with a decimal point. Always rejected, even when
    /// whole-valued (`80.0`).
    Decimal(f64),
    Text(String),
    Null,
}

impl From<&str> for RawScore {
    fn from(value: &str) -> Self {
        RawScore::Text(value.to_string())
    }
}

impl From<i64> for RawScore {
    fn from(value: i64) -> Self {
        RawScore::Integer(value)
    }
}

/// Validate a raw subject map into a [`ScoreInput`].
///
/// Keys may be canonical (`criticalReading`) or the stored form
/// (`lectura_critica`); the canonical key wins when both are present.
/// Unknown keys are ignored. Every subject is required and nothing is
/// defaulted to zero. Returns all issues at once, not just the first.
///
/// Subscores are whole numbers: `80.0` and `"55.0"` fail as fractional.
/// Anything that persists score columns must write them as integers.
pub fn validate_scores(raw: &BTreeMap<String, RawScore>) -> Result<ScoreInput, ScoreValidationError> {
    let mut values = [0u8; 5];
    let mut issues = Vec::new();

    for (slot, subject) in values.iter_mut().zip(Subject::ALL) {
        let value = raw
            .get(subject.key())
            .or_else(|| raw.get(subject.stored_key()));

        match value.map(|v| parse_subject_score(subject, v)) {
            Some(Ok(score)) => *slot = score,
            Some(Err(issue)) => issues.push(issue),
            None => issues.push(ScoreIssue::Missing(subject)),
        }
    }

    if !issues.is_empty() {
        return Err(ScoreValidationError::new(issues));
    }

    ScoreInput::new(values[0], values[1], values[2], values[3], values[4])
}

fn parse_subject_score(subject: Subject, raw: &RawScore) -> Result<u8, ScoreIssue> {
    let integer = match raw {
        RawScore::Null => return Err(ScoreIssue::Missing(subject)),
        RawScore::Integer(n) => *n,
        RawScore::Decimal(f) => {
            return Err(if f.is_finite() {
                ScoreIssue::Fractional {
                    subject,
                    value: format!("{f:?}"),
                }
            } else {
                ScoreIssue::NonNumeric {
                    subject,
                    value: f.to_string(),
                }
            });
        }
        RawScore::Text(text) => parse_text_score(subject, text)?,
    };

    if (0..=MAX_SUBJECT_SCORE as i64).contains(&integer) {
        Ok(integer as u8)
    } else {
        Err(ScoreIssue::OutOfRange {
            subject,
            value: integer,
        })
    }
}

fn parse_text_score(subject: Subject, text: &str) -> Result<i64, ScoreIssue> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ScoreIssue::Missing(subject));
    }

    if let Ok(n) = trimmed.parse::<i64>() {
        return Ok(n);
    }

    // "72.5" and "72,5" are numbers, just not whole ones
    match trimmed.replacen(',', ".", 1).parse::<f64>() {
        Ok(f) if f.is_finite() => Err(ScoreIssue::Fractional {
            subject,
            value: trimmed.to_string(),
        }),
        _ => Err(ScoreIssue::NonNumeric {
            subject,
            value: trimmed.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(entries: &[(&str, RawScore)]) -> BTreeMap<String, RawScore> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn complete() -> BTreeMap<String, RawScore> {
        raw(&[
            ("criticalReading", RawScore::Integer(70)),
            ("mathematics", RawScore::Integer(80)),
            ("socialSciences", RawScore::Integer(60)),
            ("naturalSciences", RawScore::Integer(65)),
            ("english", RawScore::Integer(55)),
        ])
    }

    #[test]
    fn test_valid_integer_scores() {
        let input = validate_scores(&complete()).unwrap();
        assert_eq!(input.get(Subject::Mathematics), 80);
        assert_eq!(input.get(Subject::English), 55);
    }

    #[test]
    fn test_text_scores_are_trimmed_and_parsed() {
        let mut map = complete();
        map.insert("mathematics".to_string(), " 100 ".into());
        map.insert("english".to_string(), "0".into());
        let input = validate_scores(&map).unwrap();
        assert_eq!(input.get(Subject::Mathematics), 100);
        assert_eq!(input.get(Subject::English), 0);
    }

    #[test]
    fn test_stored_keys_are_accepted() {
        let map = raw(&[
            ("lectura_critica", RawScore::Integer(70)),
            ("matematicas", RawScore::Integer(80)),
            ("sociales_ciudadanas", RawScore::Integer(60)),
            ("ciencias_naturales", RawScore::Integer(65)),
            ("ingles", RawScore::Integer(55)),
            ("user_id", "abc".into()),
        ]);
        let input = validate_scores(&map).unwrap();
        assert_eq!(input.total(), 330);
    }

    #[test]
    fn test_canonical_key_wins_over_stored_key() {
        let mut map = complete();
        map.insert("matematicas".to_string(), RawScore::Integer(10));
        let input = validate_scores(&map).unwrap();
        assert_eq!(input.get(Subject::Mathematics), 80);
    }

    #[test]
    fn test_missing_subject_is_not_defaulted() {
        let mut map = complete();
        map.remove("english");
        let err = validate_scores(&map).unwrap_err();
        assert_eq!(err.issues, vec![ScoreIssue::Missing(Subject::English)]);
    }

    #[test]
    fn test_blank_and_null_count_as_missing() {
        let mut map = complete();
        map.insert("english".to_string(), "  ".into());
        map.insert("mathematics".to_string(), RawScore::Null);
        let err = validate_scores(&map).unwrap_err();
        assert_eq!(err.subjects(), vec![Subject::Mathematics, Subject::English]);
    }

    #[test]
    fn test_fractional_input_rejected() {
        let mut map = complete();
        map.insert("mathematics".to_string(), RawScore::Decimal(72.5));
        map.insert("english".to_string(), "55.0".into());
        let err = validate_scores(&map).unwrap_err();
        assert!(matches!(
            err.issues[0],
            ScoreIssue::Fractional { subject: Subject::Mathematics, .. }
        ));
        assert!(matches!(
            err.issues[1],
            ScoreIssue::Fractional { subject: Subject::English, .. }
        ));
    }

    #[test]
    fn test_whole_valued_decimal_rejected() {
        let map: BTreeMap<String, RawScore> = serde_json::from_str(
            r#"{"criticalReading": 70, "mathematics": 80.0, "socialSciences": 60,
                "naturalSciences": 65, "english": 55}"#,
        )
        .unwrap();
        assert_eq!(map["mathematics"], RawScore::Decimal(80.0));

        let err = validate_scores(&map).unwrap_err();
        assert_eq!(
            err.issues,
            vec![ScoreIssue::Fractional {
                subject: Subject::Mathematics,
                value: "80.0".to_string()
            }]
        );
    }

    #[test]
    fn test_non_numeric_rejected() {
        let mut map = complete();
        map.insert("socialSciences".to_string(), "sixty".into());
        let err = validate_scores(&map).unwrap_err();
        assert_eq!(
            err.issues,
            vec![ScoreIssue::NonNumeric {
                subject: Subject::SocialSciences,
                value: "sixty".to_string()
            }]
        );
    }

    #[test]
    fn test_out_of_range_bounds() {
        let mut map = complete();
        map.insert("criticalReading".to_string(), RawScore::Integer(101));
        map.insert("english".to_string(), RawScore::Integer(-1));
        let err = validate_scores(&map).unwrap_err();
        assert_eq!(
            err.issues,
            vec![
                ScoreIssue::OutOfRange {
                    subject: Subject::CriticalReading,
                    value: 101
                },
                ScoreIssue::OutOfRange {
                    subject: Subject::English,
                    value: -1
                },
            ]
        );
    }

    #[test]
    fn test_collects_all_issues() {
        let map = raw(&[("mathematics", "abc".into())]);
        let err = validate_scores(&map).unwrap_err();
        assert_eq!(err.issues.len(), 5);
    }

    #[test]
    fn test_raw_score_deserializes_untagged() {
        let map: BTreeMap<String, RawScore> = serde_json::from_str(
            r#"{"criticalReading": 70, "mathematics": "80", "socialSciences": 60.5,
                "naturalSciences": null, "english": 55}"#,
        )
        .unwrap();
        assert_eq!(map["criticalReading"], RawScore::Integer(70));
        assert_eq!(map["mathematics"], RawScore::Text("80".to_string()));
        assert_eq!(map["socialSciences"], RawScore::Decimal(60.5));
        assert_eq!(map["naturalSciences"], RawScore::Null);
    }
}
