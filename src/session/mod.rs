//! Live layout instance, stabilization events and the phase machine that
//! drives them.

pub mod layout;
pub mod lifecycle;
pub mod rendering;

pub use layout::{ForceLayout, LayoutEngine, LayoutProgress};
pub use lifecycle::{LifecycleController, Phase};
pub use rendering::{LayoutEvent, RenderingSession};
