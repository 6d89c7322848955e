use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LandmarkError {
    #[error("expected {expected} hand landmarks, got {got}")]
    WrongCount { got: usize, expected: usize },
    #[error("landmark {index} has a non-finite coordinate")]
    NonFinite { index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown key name {0:?}")]
pub struct KeyNameError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("keyboard layout needs a non-zero frame width")]
    ZeroWidth,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("failed to lay out keyboard")]
    Layout(#[from] LayoutError),
}

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read landmark recording")]
    Io(#[from] std::io::Error),
    #[error("line {line}: malformed landmark frame")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("line {line}: hand {hand}: {source}")]
    Landmarks {
        line: usize,
        hand: usize,
        #[source]
        source: LandmarkError,
    },
}
