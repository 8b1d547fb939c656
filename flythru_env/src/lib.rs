//! Flythru Environment Abstraction Layer
//!
//! This crate provides the "Sans-IO" boundary between the trajectory engine
//! and whatever actually draws the scene. The engine never talks to a
//! renderer directly; it produces values and the host applies them.
//!
//! # Core Concept: The Camera Boundary
//!
//! Playback touches the outside world in exactly two places:
//! - Time (`FrameClock::now()`, turned into per-frame deltas by `FrameTimer`)
//! - Camera (`CameraRig::set_position`, `set_look_target`, `set_field_of_view`)
//!
//! Swapping the clock for a virtual one makes a whole flythrough
//! reproducible frame by frame.
//!
//! # Example
//!
//! ```ignore
//! use flythru_env::{CameraRig, FrameTimer, SystemClock};
//!
//! fn render_loop<R: CameraRig>(rig: &mut R, autopilot: &mut Autopilot) {
//!     let mut timer = FrameTimer::new(SystemClock::new());
//!     loop {
//!         let update = autopilot.tick(timer.next_frame());
//!         update.apply(rig);
//!         draw_frame();
//!     }
//! }
//! ```

mod clock;
mod rig;
mod types;

pub use clock::{FrameClock, FrameTimer, SystemClock};
pub use rig::{clamp_fov, CameraRig, FOV_MAX_DEGREES, FOV_MIN_DEGREES};
pub use types::LookTarget;
