//! Level-driven animation state consumed by the renderer.

mod driver;

pub use driver::{shape_beat, AnimationDriver, AnimationSnapshot};
