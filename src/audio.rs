//! Background soundtrack collaborator.

use tracing::info;

/// Looped background audio.  Hosts plug in whatever backend they have.
pub trait Soundtrack {
    fn play_loop(&mut self);
    fn pause(&mut self);
    fn is_playing(&self) -> bool;
}

/// Tracks playback state for a looped track and logs transitions.  The
/// terminal host has no audio device, so this is the whole backend there.
#[derive(Clone, Debug, PartialEq)]
pub struct LoopedTrack {
    pub path: String,
    playing: bool,
    pauses: u32,
}

impl LoopedTrack {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            playing: false,
            pauses: 0,
        }
    }

    /// How many times playback went from playing to paused.
    pub fn pause_count(&self) -> u32 {
        self.pauses
    }
}

impl Soundtrack for LoopedTrack {
    fn play_loop(&mut self) {
        if !self.playing {
            info!(path = %self.path, "soundtrack started");
            self.playing = true;
        }
    }

    fn pause(&mut self) {
        if self.playing {
            info!(path = %self.path, "soundtrack paused");
            self.playing = false;
            self.pauses += 1;
        }
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pause_only_counts_real_transitions() {
        let mut track = LoopedTrack::new("theme.mp3");
        track.pause();
        assert_eq!(track.pause_count(), 0);
        track.play_loop();
        assert!(track.is_playing());
        track.pause();
        track.pause();
        assert_eq!(track.pause_count(), 1);
        assert!(!track.is_playing());
    }
}
