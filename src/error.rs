use thiserror::Error;

use crate::ir::PersonId;
use crate::layout::Ranking;

/// Input rejected before any layout work starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid family data: {message}")]
pub struct InputValidationError {
    pub message: String,
}

impl InputValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Generation ranking revisited a person that is still on the active chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "cyclic parent relationship: {}; check the parentIds of these people",
    format_chain(.chain)
)]
pub struct CyclicRelationshipError {
    /// Person ids from the first revisited person back to itself.
    pub chain: Vec<PersonId>,
}

fn format_chain(chain: &[PersonId]) -> String {
    chain
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[derive(Debug, Error)]
pub enum RenderBackendError {
    #[error("render backend cannot draw the {mode:?} layout: {reason}")]
    LayoutModeUnavailable { mode: Ranking, reason: String },
    #[error("failed to build SVG: {0}")]
    Svg(String),
    #[error("failed to rasterize PNG: {0}")]
    Png(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum FamilyTreeError {
    #[error(transparent)]
    InputValidation(#[from] InputValidationError),
    #[error(transparent)]
    CyclicRelationship(#[from] CyclicRelationshipError),
    #[error(transparent)]
    RenderBackend(#[from] RenderBackendError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cyclic_error_lists_chain() {
        let err = CyclicRelationshipError {
            chain: vec![3, 5, 3],
        };
        assert_eq!(
            err.to_string(),
            "cyclic parent relationship: 3 -> 5 -> 3; check the parentIds of these people"
        );
    }

    #[test]
    fn wraps_input_errors_transparently() {
        let err: FamilyTreeError = InputValidationError::new("not an array").into();
        assert_eq!(err.to_string(), "invalid family data: not an array");
    }
}
