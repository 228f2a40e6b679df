// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the puzzle players (mostly children).
//
// Every technical error maps to a short, friendly sentence and a suggestion
// the player can act on. Severity drives how the UI presents it.

use crate::error::SpotDiffError;

/// Severity of an error from the player's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Nothing is broken; the picture is simply used as taken.
    Notice,
    /// The player should take or pick another photo.
    RetakePhoto,
    /// Cannot be fixed by the player: bad settings or an internal fault.
    Permanent,
}

/// A friendly error with a plain message and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Short summary (shown as a heading).
    pub message: String,
    /// What the player should try (shown as body text).
    pub suggestion: String,
    /// Whether trying again with the same input can help.
    pub retriable: bool,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

/// Convert a `SpotDiffError` into a `HumanError` a child can follow.
pub fn humanize_error(err: &SpotDiffError) -> HumanError {
    match err {
        SpotDiffError::DegenerateGeometry { .. } => HumanError {
            message: "The corners are squashed together.".into(),
            suggestion: "Drag the four dots onto the corners of the picture, or carry on without straightening.".into(),
            retriable: true,
            severity: Severity::Notice,
        },

        SpotDiffError::UnsupportedChannelLayout(_) | SpotDiffError::Decode(_) => HumanError {
            message: "We couldn't read that picture.".into(),
            suggestion: "Let's take the photo again, or pick a JPEG or PNG picture.".into(),
            retriable: false,
            severity: Severity::RetakePhoto,
        },

        SpotDiffError::BufferSizeMismatch { .. } => HumanError {
            message: "The picture came through broken.".into(),
            suggestion: "Let's take the photo again!".into(),
            retriable: true,
            severity: Severity::RetakePhoto,
        },

        SpotDiffError::Encode(_) => HumanError {
            message: "We couldn't show the two halves.".into(),
            suggestion: "Try again. If it keeps happening, try a smaller photo.".into(),
            retriable: true,
            severity: Severity::Permanent,
        },

        SpotDiffError::InvalidConfig(detail) => HumanError {
            message: "The app's picture settings are wrong.".into(),
            suggestion: format!("Ask a grown-up to reset the settings. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        SpotDiffError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "That picture couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing it again.".into(),
                    retriable: false,
                    severity: Severity::RetakePhoto,
                }
            } else {
                HumanError {
                    message: "There was a problem opening a file.".into(),
                    suggestion: "Try again in a moment.".into(),
                    retriable: true,
                    severity: Severity::Permanent,
                }
            }
        }

        SpotDiffError::Serialization(_) => HumanError {
            message: "The app's settings file is damaged.".into(),
            suggestion: "Ask a grown-up to reset the settings.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_corners_are_a_notice() {
        let human = humanize_error(&SpotDiffError::DegenerateGeometry {
            width: 0.0,
            height: 0.0,
        });
        assert_eq!(human.severity, Severity::Notice);
        assert!(human.retriable);
    }

    #[test]
    fn unreadable_photo_asks_for_retake() {
        let human = humanize_error(&SpotDiffError::Decode("bad header".into()));
        assert_eq!(human.severity, Severity::RetakePhoto);
        assert!(!human.retriable);
    }

    #[test]
    fn missing_file_asks_for_retake() {
        let err = SpotDiffError::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(humanize_error(&err).severity, Severity::RetakePhoto);
    }

    #[test]
    fn config_detail_is_kept_in_suggestion() {
        let human = humanize_error(&SpotDiffError::InvalidConfig("blur kernel size".into()));
        assert_eq!(human.severity, Severity::Permanent);
        assert!(human.suggestion.contains("blur kernel size"));
    }
}
