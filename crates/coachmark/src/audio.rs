#![forbid(unsafe_code)]

//! Audio narration plugin.
//!
//! Steps opt in by carrying an [`AudioAttachment`]. When such a step is
//! shown, [`AudioGuidePlugin`] plays the clip through the host's
//! [`AudioPlayer`] and keeps the step's companion informed through
//! [`AudioEventReceiver`], so the companion can show a speaking indicator.
//!
//! # Notifications
//!
//! | Situation | Companion receives |
//! |-----------|--------------------|
//! | playback started | `audio_did_start` |
//! | step or guide hidden while playing | `audio_did_stop(false)` |
//! | clip played to the end | `audio_did_stop(true)` |
//! | playback failed | `audio_did_fail` only |
//! | plugin dropped | nothing |

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::companion::CompanionView;
use crate::plugin::{GuideEvent, GuidePlugin, StepContext};

/// Audio clip to play while a step is shown.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioAttachment {
    /// Player-specific locator (URL, asset name, path).
    pub source: String,
    pub volume: f32,
}

impl AudioAttachment {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            volume: 1.0,
        }
    }

    #[must_use]
    pub fn volume(mut self, volume: f32) -> Self {
        self.volume = volume.clamp(0.0, 1.0);
        self
    }
}

/// Playback failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// The source could not be opened.
    SourceUnavailable(String),
    /// The data could not be decoded.
    Decode(String),
    /// Playback stopped before the end for a reason the player did not report.
    Unknown,
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceUnavailable(src) => write!(f, "audio source unavailable: {src}"),
            Self::Decode(msg) => write!(f, "audio decode error: {msg}"),
            Self::Unknown => f.write_str("audio playback failed with an unknown error"),
        }
    }
}

impl std::error::Error for AudioError {}

/// Host audio output.
pub trait AudioPlayer {
    /// Replace whatever is playing with `source` and start it.
    fn play(&self, source: &str, volume: f32) -> Result<(), AudioError>;

    /// Stop and clear the current item.
    fn stop(&self);
}

/// Asynchronous playback outcome reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    Finished,
    Failed(AudioError),
}

/// Companion-side audio notifications.
pub trait AudioEventReceiver {
    fn audio_did_start(&self);

    /// `played_to_end` is `false` when playback was cut short by a hide.
    fn audio_did_stop(&self, played_to_end: bool);

    fn audio_did_fail(&self, error: &AudioError);
}

struct Playback {
    companion: Option<Weak<dyn CompanionView>>,
    source: String,
}

impl Playback {
    fn companion(&self) -> Option<Rc<dyn CompanionView>> {
        self.companion.as_ref().and_then(Weak::upgrade)
    }
}

/// Plays each step's [`AudioAttachment`].
pub struct AudioGuidePlugin<P: AudioPlayer> {
    player: P,
    current: RefCell<Option<Playback>>,
}

impl<P: AudioPlayer> AudioGuidePlugin<P> {
    pub fn new(player: P) -> Self {
        Self {
            player,
            current: RefCell::new(None),
        }
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn is_playing(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Feed an asynchronous outcome from the player.
    pub fn handle_playback_event(&self, event: PlaybackEvent) {
        match event {
            PlaybackEvent::Finished => self.stop_playback(true, true),
            PlaybackEvent::Failed(error) => {
                tracing::warn!(target: "coachmark.audio", error = %error, "playback failed");
                let companion = self.current.borrow().as_ref().and_then(Playback::companion);
                if let Some(receiver) = companion.as_deref().and_then(|c| c.audio_receiver()) {
                    receiver.audio_did_fail(&error);
                }
                self.stop_playback(false, false);
            }
        }
    }

    fn start_playback(&self, ctx: &StepContext<'_>) {
        self.stop_playback(false, true);
        let Some(attachment) = ctx.step.attachments().first::<AudioAttachment>() else {
            return;
        };
        let companion = ctx.companion.map(Rc::downgrade);
        if let Err(error) = self.player.play(&attachment.source, attachment.volume) {
            tracing::warn!(
                target: "coachmark.audio",
                source = %attachment.source,
                error = %error,
                "playback could not start"
            );
            if let Some(receiver) = ctx.companion.and_then(|c| c.audio_receiver()) {
                receiver.audio_did_fail(&error);
            }
            self.player.stop();
            return;
        }
        tracing::debug!(
            target: "coachmark.audio",
            source = %attachment.source,
            volume = attachment.volume,
            step_index = ctx.step_index,
            "playback started"
        );
        *self.current.borrow_mut() = Some(Playback {
            companion,
            source: attachment.source.clone(),
        });
        if let Some(receiver) = ctx.companion.and_then(|c| c.audio_receiver()) {
            receiver.audio_did_start();
        }
    }

    fn stop_playback(&self, played_to_end: bool, notify: bool) {
        let Some(playback) = self.current.borrow_mut().take() else {
            return;
        };
        self.player.stop();
        tracing::debug!(
            target: "coachmark.audio",
            source = %playback.source,
            played_to_end,
            "playback stopped"
        );
        if !notify {
            return;
        }
        if let Some(companion) = playback.companion() {
            if let Some(receiver) = companion.audio_receiver() {
                receiver.audio_did_stop(played_to_end);
            }
        }
    }
}

impl<P: AudioPlayer> GuidePlugin for AudioGuidePlugin<P> {
    fn handle(&self, event: GuideEvent, ctx: &StepContext<'_>) {
        match event {
            GuideEvent::StepDidShow => self.start_playback(ctx),
            GuideEvent::StepWillHide | GuideEvent::GuideWillHide => self.stop_playback(false, true),
            _ => {}
        }
    }
}

impl<P: AudioPlayer> Drop for AudioGuidePlugin<P> {
    fn drop(&mut self) {
        self.stop_playback(false, false);
    }
}

impl<P: AudioPlayer> fmt::Debug for AudioGuidePlugin<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioGuidePlugin")
            .field("playing", &self.is_playing())
            .finish()
    }
}
