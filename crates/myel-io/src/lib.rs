//! myel-io: filesystem boundary for myel.
//!
//! Owns the loaded [`Editor`](myel_core::Editor) together with its
//! session file, runs the autosave clock and turns command outcomes into
//! the messages a host shows the user.

pub mod status;
pub mod workspace;

use std::path::PathBuf;

use myel_core::{CoreError, SessionError};
use myel_export::ExportError;

pub use status::StatusMessage;
pub use workspace::{
    AUTOSAVE_INTERVAL, ExportPaths, OpenStatus, Workspace, backup_file_name, session_file_name,
};

/// Errors from workspace commands.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// The session file could not be read or parsed.
    #[error("failed to open session: {0}")]
    OpenFailed(String),

    /// The session file has no version or one this build cannot read.
    #[error("incompatible session version: {}", .0.as_deref().unwrap_or("none"))]
    IncompatibleVersion(Option<String>),

    /// The command needs an image and none is loaded.
    #[error("no image loaded")]
    NoImage,

    /// There is no session file to overwrite.
    #[error("no save path; save to a new file first")]
    NoSavePath,

    /// A filesystem operation failed.
    #[error("{}: {source}", path.display())]
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The session could not be serialized.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// An export artifact could not be produced.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// The image or its parameters were rejected.
    #[error(transparent)]
    Core(#[from] CoreError),
}
