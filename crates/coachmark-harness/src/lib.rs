#![forbid(unsafe_code)]

//! Test harness for Coachmark guides.
//!
//! Provides a deterministic in-memory view tree and recording fakes for
//! every seam the guide engine talks to, so controller behavior can be
//! exercised end to end without a UI toolkit.
//!
//! | Fake | Stands in for |
//! |------|---------------|
//! | [`FakeTree`] / [`FakeNode`] | host view hierarchy and target elements |
//! | [`FakeHost`] | the overlay host surface and its gesture system |
//! | [`FakeCompanion`] | a callout with "next"/"skip" buttons |
//! | [`FakeControl`] | a button emitting control events |
//! | [`RecordingPlugin`] | a lifecycle observer |
//! | [`FakeAudioPlayer`] | the platform audio output |
//!
//! # Example
//!
//! ```
//! use coachmark::{GuideController, GuideStep};
//! use coachmark_core::geometry::Rect;
//! use coachmark_harness::{FakeCompanion, FakeHost};
//!
//! let host = FakeHost::window(400.0, 800.0);
//! let button = host.add_element("button", Rect::new(20.0, 100.0, 80.0, 40.0));
//! let companion = FakeCompanion::new(&host, 200.0, 60.0);
//! let mut guide = GuideController::new(
//!     &host.handle(),
//!     [GuideStep::new().target(&button.element()).companion(companion.view())],
//! );
//! assert!(guide.show(false));
//! assert_eq!(guide.current_index(), Some(0));
//! companion.tap_next();
//! guide.pump();
//! assert!(!guide.is_showing());
//! ```

pub mod audio;
pub mod companion;
pub mod control;
pub mod host;
pub mod plugin;
pub mod tree;

pub use audio::{FakeAudioPlayer, PlayerCall};
pub use companion::{AudioNote, FakeCompanion, LayoutRecord};
pub use control::FakeControl;
pub use host::{FakeHost, HostOp};
pub use plugin::{RecordedEvent, RecordingPlugin};
pub use tree::{FakeNode, FakeTree};
