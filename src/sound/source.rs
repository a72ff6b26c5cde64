//! Sound source selection.
//!
//! A notification is either an audio file or a generated beep. The file is
//! taken from the command line, else `sound.mp3` in the working directory;
//! the beep is the fallback when neither is usable.

use std::path::{Path, PathBuf};

use super::error::SoundError;

/// File looked up in the working directory when no sound is given.
pub const DEFAULT_SOUND_FILE: &str = "sound.mp3";

/// Pitch of the fallback beep.
pub const BEEP_FREQUENCY_HZ: u32 = 2500;

/// Length of the fallback beep.
pub const BEEP_DURATION_MS: u64 = 1000;

/// Supported audio file extensions.
const SUPPORTED_EXTENSIONS: &[&str] = &["wav", "mp3", "flac", "ogg"];

/// Represents the source of a sound to be played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundSource {
    /// An audio file on disk.
    File {
        /// Display name (the file stem).
        name: String,
        /// The full path to the sound file.
        path: PathBuf,
    },
    /// A generated sine tone.
    Beep {
        /// Tone frequency in hertz.
        frequency_hz: u32,
        /// Tone length in milliseconds.
        duration_ms: u64,
    },
}

impl SoundSource {
    /// Creates a file sound source without checking the path.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::File { name, path }
    }

    /// Creates a file sound source after checking the file exists and has
    /// a supported extension.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::FileNotFound` for a missing file and
    /// `SoundError::UnsupportedFormat` for an unknown extension.
    pub fn file_validated(path: impl Into<PathBuf>) -> Result<Self, SoundError> {
        let path = path.into();
        if !path.is_file() {
            return Err(SoundError::FileNotFound(path.display().to_string()));
        }
        if !has_supported_extension(&path) {
            return Err(SoundError::UnsupportedFormat(path.display().to_string()));
        }
        Ok(Self::file(path))
    }

    /// Creates a beep sound source.
    #[must_use]
    pub fn beep(frequency_hz: u32, duration_ms: u64) -> Self {
        Self::Beep {
            frequency_hz,
            duration_ms,
        }
    }

    /// The fallback notification beep.
    #[must_use]
    pub fn default_beep() -> Self {
        Self::beep(BEEP_FREQUENCY_HZ, BEEP_DURATION_MS)
    }

    /// Returns the display name of the sound source.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::File { name, .. } => name,
            Self::Beep { .. } => "beep",
        }
    }

    /// Returns true if this is an audio file.
    #[must_use]
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File { .. })
    }

    /// Returns true if this is a generated beep.
    #[must_use]
    pub fn is_beep(&self) -> bool {
        matches!(self, Self::Beep { .. })
    }

    /// Returns the file path if this is an audio file.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File { path, .. } => Some(path),
            Self::Beep { .. } => None,
        }
    }
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Picks the notification sound.
///
/// Order: `custom` if usable, then [`DEFAULT_SOUND_FILE`] in `search_dir`,
/// then the default beep. An unusable custom file is logged and skipped.
#[must_use]
pub fn resolve_notification_sound(custom: Option<&Path>, search_dir: &Path) -> SoundSource {
    if let Some(path) = custom {
        match SoundSource::file_validated(path) {
            Ok(source) => return source,
            Err(e) => tracing::warn!(error = %e, "custom sound unusable, using default"),
        }
    }

    let bundled = search_dir.join(DEFAULT_SOUND_FILE);
    if bundled.is_file() {
        return SoundSource::file(bundled);
    }

    SoundSource::default_beep()
}
