//! Sound playback system for the Pomodoro timer.
//!
//! This module plays the notification heard when a period ends:
//!
//! - An audio file (user supplied, or `sound.mp3` next to the binary's
//!   working directory)
//! - A generated beep when no file is usable
//! - Non-blocking playback
//! - Graceful degradation when audio is unavailable
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │   SoundPlayer    │ ← Main interface
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │   SoundSource    │────▶│   Audio file     │
//! │                  │     │  (--sound, mp3)  │
//! │                  │     ├──────────────────┤
//! │                  │────▶│  Generated beep  │
//! └──────────────────┘     │  (fallback)      │
//!                          └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use pomo::sound::{RodioSoundPlayer, SoundSource};
//!
//! let player = RodioSoundPlayer::new().expect("audio init");
//! player.play(&SoundSource::default_beep()).expect("playback failed");
//! ```

mod error;
mod player;
mod source;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub use error::SoundError;
pub use player::{try_create_player, RodioSoundPlayer};
pub use source::{
    resolve_notification_sound, SoundSource, BEEP_DURATION_MS, BEEP_FREQUENCY_HZ,
    DEFAULT_SOUND_FILE,
};

/// Trait for sound playback implementations.
///
/// This trait abstracts the sound playback functionality, allowing for
/// different implementations (e.g., rodio-based, mock for testing).
pub trait SoundPlayer {
    /// Plays a sound from the given source.
    ///
    /// This method should be non-blocking; the sound plays in the background.
    ///
    /// # Errors
    ///
    /// Returns an error if playback fails.
    fn play(&self, source: &SoundSource) -> Result<(), SoundError>;
}

impl SoundPlayer for RodioSoundPlayer {
    fn play(&self, source: &SoundSource) -> Result<(), SoundError> {
        RodioSoundPlayer::play(self, source)
    }
}

impl<T: SoundPlayer + ?Sized> SoundPlayer for Arc<T> {
    fn play(&self, source: &SoundSource) -> Result<(), SoundError> {
        (**self).play(source)
    }
}

/// Mock sound player for testing.
#[derive(Debug)]
pub struct MockSoundPlayer {
    play_calls: Mutex<Vec<SoundSource>>,
    should_fail: AtomicBool,
}

impl Default for MockSoundPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSoundPlayer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            play_calls: Mutex::new(Vec::new()),
            should_fail: AtomicBool::new(false),
        }
    }

    /// Makes every following `play` fail the way a lost output stream does.
    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn play_count(&self) -> usize {
        self.play_calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn get_play_calls(&self) -> Vec<SoundSource> {
        self.play_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl SoundPlayer for MockSoundPlayer {
    fn play(&self, source: &SoundSource) -> Result<(), SoundError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SoundError::StreamError("mock output stream closed".to_string()));
        }
        if let Ok(mut calls) = self.play_calls.lock() {
            calls.push(source.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_calls() {
        let mock = MockSoundPlayer::new();
        mock.play(&SoundSource::default_beep()).unwrap();
        mock.play(&SoundSource::file("/tmp/chime.wav")).unwrap();

        assert_eq!(mock.play_count(), 2);
        assert!(mock.get_play_calls()[0].is_beep());
    }

    #[test]
    fn test_mock_failure_is_a_stream_error() {
        let mock = MockSoundPlayer::new();
        mock.set_should_fail(true);

        let err = mock.play(&SoundSource::default_beep()).unwrap_err();
        assert!(matches!(err, SoundError::StreamError(_)));
        assert!(!err.should_fallback_to_beep());
        assert_eq!(mock.play_count(), 0);
    }

    #[test]
    fn test_arc_delegates() {
        let mock = Arc::new(MockSoundPlayer::new());
        let boxed: Box<dyn SoundPlayer> = Box::new(Arc::clone(&mock));

        boxed.play(&SoundSource::default_beep()).unwrap();
        mock.set_should_fail(true);

        assert_eq!(mock.play_count(), 1);
        assert!(boxed.play(&SoundSource::default_beep()).is_err());
    }
}
