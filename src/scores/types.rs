use crate::error::{ScoreIssue, ScoreValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest attainable subscore on every subject.
pub const MAX_SUBJECT_SCORE: u8 = 100;

/// The five exam subjects every score set and weight vector covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Subject {
    CriticalReading,
    Mathematics,
    SocialSciences,
    NaturalSciences,
    English,
}

impl Subject {
    pub const ALL: [Subject; 5] = [
        Subject::CriticalReading,
        Subject::Mathematics,
        Subject::SocialSciences,
        Subject::NaturalSciences,
        Subject::English,
    ];

    /// Canonical identifier, e.g. `criticalReading`
    pub fn key(self) -> &'static str {
        match self {
            Subject::CriticalReading => "criticalReading",
            Subject::Mathematics => "mathematics",
            Subject::SocialSciences => "socialSciences",
            Subject::NaturalSciences => "naturalSciences",
            Subject::English => "english",
        }
    }

    /// Key used by persisted user score records
    pub fn stored_key(self) -> &'static str {
        match self {
            Subject::CriticalReading => "lectura_critica",
            Subject::Mathematics => "matematicas",
            Subject::SocialSciences => "sociales_ciudadanas",
            Subject::NaturalSciences => "ciencias_naturales",
            Subject::English => "ingles",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Subject::CriticalReading => "Critical Reading",
            Subject::Mathematics => "Mathematics",
            Subject::SocialSciences => "Social Sciences",
            Subject::NaturalSciences => "Natural Sciences",
            Subject::English => "English",
        }
    }

    /// Resolve either the canonical or the stored key.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Subject::ALL
            .into_iter()
            .find(|subject| subject.key() == key || subject.stored_key() == key)
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A complete, validated set of five subscores, each in `0..=100`.
///
/// Only constructible through validation, so holding one means it is safe to score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "ScoreFields", try_from = "ScoreFields")]
pub struct ScoreInput {
    scores: [u8; 5],
}

impl ScoreInput {
    pub fn new(
        critical_reading: u8,
        mathematics: u8,
        social_sciences: u8,
        natural_sciences: u8,
        english: u8,
    ) -> Result<Self, ScoreValidationError> {
        let scores = [
            critical_reading,
            mathematics,
            social_sciences,
            natural_sciences,
            english,
        ];
        let issues: Vec<ScoreIssue> = Subject::ALL
            .into_iter()
            .zip(scores)
            .filter(|(_, value)| *value > MAX_SUBJECT_SCORE)
            .map(|(subject, value)| ScoreIssue::OutOfRange {
                subject,
                value: value as i64,
            })
            .collect();

        if issues.is_empty() {
            Ok(Self { scores })
        } else {
            Err(ScoreValidationError::new(issues))
        }
    }

    pub fn get(&self, subject: Subject) -> u8 {
        self.scores[subject.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Subject, u8)> + '_ {
        Subject::ALL.into_iter().map(|subject| (subject, self.get(subject)))
    }

    /// Plain sum of the five subscores
    pub fn total(&self) -> u16 {
        self.scores.iter().map(|&v| v as u16).sum()
    }

    /// Copy with one subject replaced, validated like any other input.
    pub fn with_score(&self, subject: Subject, value: u8) -> Result<Self, ScoreValidationError> {
        let mut scores = self.scores;
        scores[subject.index()] = value;
        Self::new(scores[0], scores[1], scores[2], scores[3], scores[4])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ScoreFields {
    critical_reading: u8,
    mathematics: u8,
    social_sciences: u8,
    natural_sciences: u8,
    english: u8,
}

impl From<ScoreInput> for ScoreFields {
    fn from(input: ScoreInput) -> Self {
        Self {
            critical_reading: input.get(Subject::CriticalReading),
            mathematics: input.get(Subject::Mathematics),
            social_sciences: input.get(Subject::SocialSciences),
            natural_sciences: input.get(Subject::NaturalSciences),
            english: input.get(Subject::English),
        }
    }
}

impl TryFrom<ScoreFields> for ScoreInput {
    type Error = ScoreValidationError;

    fn try_from(fields: ScoreFields) -> Result<Self, Self::Error> {
        ScoreInput::new(
            fields.critical_reading,
            fields.mathematics,
            fields.social_sciences,
            fields.natural_sciences,
            fields.english,
        )
    }
}
