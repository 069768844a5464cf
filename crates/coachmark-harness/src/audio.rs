#![forbid(unsafe_code)]

//! Scriptable audio player.

use std::cell::RefCell;

use coachmark::audio::{AudioError, AudioPlayer};

/// Call made on the player.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCall {
    Play { source: String, volume: f32 },
    Stop,
}

/// Records calls; `fail_next_play` makes the next `play` return an error.
#[derive(Debug, Default)]
pub struct FakeAudioPlayer {
    calls: RefCell<Vec<PlayerCall>>,
    fail_next: RefCell<Option<AudioError>>,
}

impl FakeAudioPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_play(&self, error: AudioError) {
        *self.fail_next.borrow_mut() = Some(error);
    }

    pub fn calls(&self) -> Vec<PlayerCall> {
        self.calls.borrow().clone()
    }

    pub fn played_sources(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                PlayerCall::Play { source, .. } => Some(source.clone()),
                PlayerCall::Stop => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl AudioPlayer for FakeAudioPlayer {
    fn play(&self, source: &str, volume: f32) -> Result<(), AudioError> {
        self.calls.borrow_mut().push(PlayerCall::Play {
            source: source.to_string(),
            volume,
        });
        match self.fail_next.borrow_mut().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn stop(&self) {
        self.calls.borrow_mut().push(PlayerCall::Stop);
    }
}
