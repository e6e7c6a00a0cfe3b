pub mod storage;
pub mod types;
pub mod validation;

pub use storage::{
    get_scores_path, load_score_book, save_score_book, JsonFileScoreStore, MemoryScoreStore,
    ScoreBook, ScoreStore, StoredScores,
};
pub use types::{ScoreInput, Subject, MAX_SUBJECT_SCORE};
pub use validation::{validate_scores, RawScore};
