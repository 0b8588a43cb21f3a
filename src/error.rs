//! Faults raised by an Environment while being searched.
//!
//! A fault aborts the search it happened in. The engine never lets it escape,
//! it turns it into a failed `SearchResult` that still carries the fault so
//! the caller can report it.

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum EnvironmentError {
    #[error("Unknown cell {cell}")]
    UnknownCell { cell: String },
    #[error("No single step leads from {from} to {to}")]
    NotAdjacent { from: String, to: String },
    #[error("Invalid step cost {cost} from {from} to {to}")]
    InvalidStepCost {
        from: String,
        to: String,
        cost: String,
    },
    #[error("Invalid heuristic value {h} at {cell}")]
    InvalidHeuristic { cell: String, h: String },
    #[error("Environment panicked: {0}")]
    Panicked(String),
    #[error("{0}")]
    Other(String),
}

impl EnvironmentError {
    pub fn unknown_cell<St: std::fmt::Debug>(cell: &St) -> Self {
        Self::UnknownCell {
            cell: format!("{cell:?}"),
        }
    }

    pub fn not_adjacent<St: std::fmt::Debug>(from: &St, to: &St) -> Self {
        Self::NotAdjacent {
            from: format!("{from:?}"),
            to: format!("{to:?}"),
        }
    }

    /// Builds a fault out of a `catch_unwind` payload.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = match payload.downcast::<String>() {
            Ok(s) => *s,
            Err(payload) => match payload.downcast::<&'static str>() {
                Ok(s) => (*s).to_string(),
                Err(_) => "unknown panic payload".to_string(),
            },
        };
        Self::Panicked(message)
    }
}
