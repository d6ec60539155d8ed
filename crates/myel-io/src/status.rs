//! User-facing outcome messages.

use std::fmt;

use crate::IoError;
use crate::workspace::OpenStatus;

/// A message for the host to show after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    /// Dialog title.
    pub title: &'static str,
    /// Body text.
    pub text: String,
    /// Whether the command failed.
    pub is_error: bool,
}

impl StatusMessage {
    fn ok(title: &'static str, text: &str) -> Self {
        Self {
            title,
            text: text.to_owned(),
            is_error: false,
        }
    }

    fn failed(title: &'static str, text: String) -> Self {
        Self {
            title,
            text,
            is_error: true,
        }
    }

    /// Outcome of a save.
    #[must_use]
    pub fn save<T>(result: &Result<T, IoError>) -> Self {
        match result {
            Ok(_) => Self::ok("Save Status", "Save Complete"),
            Err(e) => Self::failed(
                "Save Status",
                format!(
                    "Save failed. Please close the data file or check permissions \
                     before trying again.\n\n{e}"
                ),
            ),
        }
    }

    /// Outcome of an export.
    #[must_use]
    pub fn export<T>(result: &Result<T, IoError>) -> Self {
        match result {
            Ok(_) => Self::ok("Export Status", "Export Complete"),
            Err(e) => Self::failed(
                "Export Status",
                format!(
                    "Export failed. Please close the data files or check permissions \
                     before trying again.\n\n{e}"
                ),
            ),
        }
    }

    /// Outcome of opening a session.
    #[must_use]
    pub fn open(result: &Result<OpenStatus, IoError>) -> Self {
        const TITLE: &str = "Import Status";
        match result {
            Ok(_) => Self::ok(TITLE, "File successfully opened."),
            Err(IoError::IncompatibleVersion(_)) => Self::failed(
                TITLE,
                "Failed to open file. The data file you attempted to import is \
                 incompatible with this version of the software."
                    .to_owned(),
            ),
            Err(IoError::NoImage) => Self::failed(
                TITLE,
                "Image not found. The data file you imported is valid, but the image \
                 used cannot be found on your computer. To resolve, first use 'New' \
                 to open the image, then use 'Open' to import this file and try again."
                    .to_owned(),
            ),
            Err(_) => Self::failed(
                TITLE,
                "Failed to open file. Please check that you are opening the correct file."
                    .to_owned(),
            ),
        }
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.text)
    }
}
