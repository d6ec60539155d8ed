//! The host command surface: one loaded image, its session file and the
//! autosave clock.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use myel_core::{Editor, EditorConfig, Quality, SessionError, SessionFile};
use myel_export::{ExportSelection, export_artifacts, overlay_file_name, report_file_name};

use crate::IoError;

/// How often [`Workspace::autosave_tick`] writes a backup.
pub const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Stem used for artifacts when the image has no file name.
const UNTITLED: &str = "untitled";

/// Outcome of a successful [`Workspace::open`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenStatus {
    /// The session's image was found and loaded.
    Loaded {
        /// Path of the loaded image.
        image: PathBuf,
    },
    /// The session's image was not found; the session was applied to the
    /// image already open.
    Applied,
}

/// Where an export wrote its artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    /// The measurement report.
    pub report: PathBuf,
    /// The overlay PNG.
    pub overlay: PathBuf,
}

/// Default session file name for an image stem.
#[must_use]
pub fn session_file_name(stem: &str) -> String {
    format!("{stem}-data.json")
}

/// Autosave file name for an image stem.
#[must_use]
pub fn backup_file_name(stem: &str) -> String {
    format!("{stem}-data-backup.json")
}

fn write(path: &Path, contents: impl AsRef<[u8]>) -> Result<(), IoError> {
    fs::write(path, contents).map_err(|source| IoError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read(path: &Path) -> Result<Vec<u8>, IoError> {
    fs::read(path).map_err(|source| IoError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// One open image and everything needed to persist it.
#[derive(Debug)]
pub struct Workspace {
    editor: Option<Editor>,
    config: EditorConfig,
    save_path: Option<PathBuf>,
    backup_dir: PathBuf,
    last_autosave: Option<Instant>,
}

impl Workspace {
    /// An empty workspace that autosaves into `backup_dir`.
    #[must_use]
    pub fn new(backup_dir: impl Into<PathBuf>) -> Self {
        Self::with_config(backup_dir, EditorConfig::default())
    }

    /// An empty workspace whose images load with `config`.
    #[must_use]
    pub fn with_config(backup_dir: impl Into<PathBuf>, config: EditorConfig) -> Self {
        Self {
            editor: None,
            config,
            save_path: None,
            backup_dir: backup_dir.into(),
            last_autosave: None,
        }
    }

    /// The open editor, if an image is loaded.
    #[must_use]
    pub const fn editor(&self) -> Option<&Editor> {
        self.editor.as_ref()
    }

    /// Mutable access to the open editor.
    pub const fn editor_mut(&mut self) -> Option<&mut Editor> {
        self.editor.as_mut()
    }

    /// Where [`Workspace::save_current`] writes.
    #[must_use]
    pub fn save_path(&self) -> Option<&Path> {
        self.save_path.as_deref()
    }

    /// File stem of the open image.
    #[must_use]
    pub fn stem(&self) -> Option<String> {
        let name = self.editor.as_ref()?.filename()?;
        Path::new(name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
    }

    fn stem_or_untitled(&self) -> String {
        self.stem().unwrap_or_else(|| UNTITLED.to_owned())
    }

    fn require_editor(&self) -> Result<&Editor, IoError> {
        self.editor.as_ref().ok_or(IoError::NoImage)
    }

    /// Load an image, replacing whatever was open.
    ///
    /// Parameters carry over from the previous image; annotations and the
    /// save path do not.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Io`] if the file cannot be read and
    /// [`IoError::Core`] if it cannot be decoded.
    pub fn new_image(&mut self, path: &Path, quality: Quality) -> Result<(), IoError> {
        let editor = self.load(path, quality)?;
        self.editor = Some(editor);
        self.save_path = None;
        log::info!("opened image {}", path.display());
        Ok(())
    }

    fn load(&self, path: &Path, quality: Quality) -> Result<Editor, IoError> {
        let bytes = read(path)?;
        let config = EditorConfig {
            quality,
            ..self
                .editor
                .as_ref()
                .map_or_else(|| self.config.clone(), |e| e.config().clone())
        };
        Ok(Editor::from_bytes(
            &bytes,
            Some(path.to_string_lossy().into_owned()),
            config,
        )?)
    }

    /// Open a session file.
    ///
    /// If the session names an image that exists (as written, or relative
    /// to the session file) it is loaded at the session's quality;
    /// otherwise the session is applied to the image already open.
    ///
    /// # Errors
    ///
    /// [`IoError::OpenFailed`] for unreadable or malformed files,
    /// [`IoError::IncompatibleVersion`] for a missing or unknown version
    /// and [`IoError::NoImage`] when there is no image to apply it to.
    /// The workspace is unchanged on error.
    pub fn open(&mut self, path: &Path) -> Result<OpenStatus, IoError> {
        let text = fs::read_to_string(path).map_err(|e| IoError::OpenFailed(e.to_string()))?;
        let session = SessionFile::parse(&text).map_err(|e| match e {
            SessionError::IncompatibleVersion(v) => IoError::IncompatibleVersion(v),
            other => IoError::OpenFailed(other.to_string()),
        })?;

        let image = session
            .filename
            .as_deref()
            .zip(session.quality())
            .and_then(|(name, quality)| {
                resolve_image(name, path).map(|found| (found, quality))
            });

        let status = if let Some((image, quality)) = image {
            let mut editor = self.load(&image, quality)?;
            editor.apply_session(&session)?;
            self.editor = Some(editor);
            OpenStatus::Loaded { image }
        } else {
            let editor = self.editor.as_mut().ok_or(IoError::NoImage)?;
            editor.apply_session(&session)?;
            OpenStatus::Applied
        };

        self.save_path = Some(path.to_path_buf());
        log::info!("opened session {} ({status:?})", path.display());
        Ok(status)
    }

    /// Write the session to `path` and remember it for
    /// [`Workspace::save_current`].
    ///
    /// # Errors
    ///
    /// [`IoError::NoImage`] if nothing is open, [`IoError::Io`] if the
    /// file cannot be written.
    pub fn save(&mut self, path: &Path) -> Result<(), IoError> {
        self.write_session(path)?;
        self.save_path = Some(path.to_path_buf());
        log::info!("saved session {}", path.display());
        Ok(())
    }

    /// Overwrite the remembered session file.
    ///
    /// # Errors
    ///
    /// [`IoError::NoSavePath`] if there is no remembered file, or it no
    /// longer exists; otherwise as [`Workspace::save`].
    pub fn save_current(&mut self) -> Result<PathBuf, IoError> {
        let path = self
            .save_path
            .clone()
            .filter(|p| p.exists())
            .ok_or(IoError::NoSavePath)?;
        self.save(&path)?;
        Ok(path)
    }

    fn write_session(&self, path: &Path) -> Result<(), IoError> {
        let text = self.require_editor()?.to_session().to_json()?;
        write(path, text)
    }

    /// Write the report and overlay into `dir`.
    ///
    /// # Errors
    ///
    /// [`IoError::NoImage`] if nothing is open, [`IoError::Export`] if the
    /// overlay cannot be produced and [`IoError::Io`] if a file cannot be
    /// written.
    pub fn export(&self, dir: &Path, selection: &ExportSelection) -> Result<ExportPaths, IoError> {
        let artifacts = export_artifacts(self.require_editor()?, selection)?;
        let stem = self.stem_or_untitled();
        let paths = ExportPaths {
            report: dir.join(report_file_name(&stem)),
            overlay: dir.join(overlay_file_name(&stem)),
        };
        write(&paths.overlay, &artifacts.overlay_png)?;
        write(&paths.report, &artifacts.report)?;
        log::info!("exported to {}", dir.display());
        Ok(paths)
    }

    /// Advance the autosave clock.
    ///
    /// The first tick starts the clock. Once [`AUTOSAVE_INTERVAL`] has
    /// elapsed a backup is written to `<backup_dir>/<stem>-data-backup.json`
    /// and its path returned. Failures are logged and swallowed.
    pub fn autosave_tick(&mut self, now: Instant) -> Option<PathBuf> {
        let Some(last) = self.last_autosave else {
            self.last_autosave = Some(now);
            return None;
        };
        if now.saturating_duration_since(last) < AUTOSAVE_INTERVAL {
            return None;
        }
        self.last_autosave = Some(now);
        self.autosave()
    }

    fn autosave(&self) -> Option<PathBuf> {
        let stem = self.stem()?;
        let path = self.backup_dir.join(backup_file_name(&stem));
        let result = fs::create_dir_all(&self.backup_dir)
            .map_err(|source| IoError::Io {
                path: self.backup_dir.clone(),
                source,
            })
            .and_then(|()| self.write_session(&path));
        match result {
            Ok(()) => {
                log::info!("autosaved {}", path.display());
                Some(path)
            }
            Err(e) => {
                log::warn!("failed to autosave to {}: {e}", path.display());
                None
            }
        }
    }
}

/// Find the image a session names: the stored path, or its file name
/// next to the session file.
fn resolve_image(name: &str, session: &Path) -> Option<PathBuf> {
    let stored = PathBuf::from(name);
    if stored.is_file() {
        return Some(stored);
    }
    let sibling = session.parent()?.join(stored.file_name()?);
    sibling.is_file().then_some(sibling)
}
