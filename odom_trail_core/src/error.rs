//! Error types for the trail display core.

use thiserror::Error;

/// Which of the three render objects an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenterKind {
    Line,
    Marker,
    Label,
}

impl std::fmt::Display for PresenterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PresenterKind::Line => "line",
            PresenterKind::Marker => "marker",
            PresenterKind::Label => "label",
        };
        write!(f, "{}", name)
    }
}

/// Errors surfaced by the trail display.
///
/// Sample ingestion never fails; only host-side construction and
/// configuration loading can.
#[derive(Debug, Error)]
pub enum TrailError {
    /// The host could not create one of the render objects.
    /// Fatal to the display instance.
    #[error("Failed to create {kind} presenter: {reason}")]
    PresenterCreation { kind: PresenterKind, reason: String },

    /// Display parameters could not be parsed
    #[error("Invalid display parameters: {0}")]
    InvalidParameters(#[from] serde_json::Error),
}

impl TrailError {
    /// Creates a presenter creation error.
    pub fn presenter(kind: PresenterKind, reason: impl Into<String>) -> Self {
        Self::PresenterCreation {
            kind,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presenter_error_message() {
        let err = TrailError::presenter(PresenterKind::Label, "no font");
        assert_eq!(err.to_string(), "Failed to create label presenter: no font");
    }
}
