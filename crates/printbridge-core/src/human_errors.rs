// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the tablet/browser front end.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The severity drives how the front end presents it.

use serde::Serialize;

use crate::error::PrintBridgeError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Try again later; the condition may clear by itself.
    Transient,
    /// The user or an operator must do something first.
    ActionRequired,
    /// Retrying the same request will never work.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether the same request may succeed if repeated.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `PrintBridgeError` into a `HumanError`.
pub fn humanize_error(err: &PrintBridgeError) -> HumanError {
    match err {
        PrintBridgeError::PlatformUnsupported(_) => HumanError {
            message: "This print server can't print.".into(),
            suggestion: "The computer running the print bridge has no printing system. Ask your administrator to check the installation.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        PrintBridgeError::UnsupportedFileKind(detail) => HumanError {
            message: "This type of file can't be printed.".into(),
            suggestion: format!("Save it as a PDF, JPEG, PNG or BMP and upload it again. (File type: {detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        PrintBridgeError::LoadError(_) => HumanError {
            message: "The document couldn't be opened.".into(),
            suggestion: "The file may be damaged. Try opening it on a computer first, or upload a different copy.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        PrintBridgeError::RenderFailure { page, .. } => HumanError {
            message: format!("Page {} couldn't be prepared for printing.", page + 1),
            suggestion: "Try printing without rotation, or save the document again and re-upload it.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        PrintBridgeError::DeviceFailure(_) => HumanError {
            message: "The printer didn't accept the document.".into(),
            suggestion: "Check the printer is switched on, has paper and is not showing an error, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        PrintBridgeError::CommandFailure { .. } => HumanError {
            message: "The print queue couldn't be reset.".into(),
            suggestion: "The print service may now be stopped. Try again, or restart the print server.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        PrintBridgeError::NotFound(_) => HumanError {
            message: "That document couldn't be found.".into(),
            suggestion: "It may have been removed. Upload the file again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        PrintBridgeError::InvalidOperation(detail) => HumanError {
            message: "That can't be done with this document.".into(),
            suggestion: format!("Check the request and try again. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        PrintBridgeError::InvalidSettings(detail) => HumanError {
            message: "Those settings aren't valid.".into(),
            suggestion: format!("Correct the highlighted value and save again. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        PrintBridgeError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Upload the file again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "The print server isn't allowed to use that file.".into(),
                    suggestion: "Ask your administrator to check the print server's permissions.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, the server's disk may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        PrintBridgeError::Serialization(_) => HumanError {
            message: "The print server had an internal data problem.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_failure_is_transient() {
        let human = humanize_error(&PrintBridgeError::DeviceFailure("lp: printer offline".into()));
        assert_eq!(human.severity, Severity::Transient);
        assert!(human.retriable);
    }

    #[test]
    fn unsupported_kind_is_permanent() {
        let human = humanize_error(&PrintBridgeError::UnsupportedFileKind(".docx".into()));
        assert_eq!(human.severity, Severity::Permanent);
        assert!(human.suggestion.contains(".docx"));
    }

    #[test]
    fn render_failure_names_page_one_based() {
        let human = humanize_error(&PrintBridgeError::RenderFailure {
            page: 2,
            message: "bad stream".into(),
        });
        assert!(human.message.contains("Page 3"));
    }

    #[test]
    fn command_failure_warns_about_stopped_service() {
        let human = humanize_error(&PrintBridgeError::CommandFailure {
            command: "systemctl start cups".into(),
            exit_code: 1,
            stderr: String::new(),
        });
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.suggestion.contains("stopped"));
    }

    #[test]
    fn severity_serialises_in_snake_case() {
        let values: Vec<_> = [Severity::Transient, Severity::ActionRequired, Severity::Permanent]
            .into_iter()
            .map(|s| serde_json::to_value(s).unwrap())
            .collect();
        assert_eq!(values, ["transient", "action_required", "permanent"]);
    }
}
