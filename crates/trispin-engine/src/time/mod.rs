//! Time subsystem.
//!
//! One [`ContextClock`] is started when a graphics context is created; the
//! model rotation is driven by its elapsed time.

mod clock;

pub use clock::{ContextClock, FrameTime};
