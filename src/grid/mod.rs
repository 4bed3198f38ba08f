//! Multi-column grid: layout of a flat listing, cursor motion over it,
//! scrolling and remembered positions.

pub mod cursor;
pub mod layout;
pub mod positions;
pub mod scroll;

pub use cursor::Motion;
pub use layout::{GridLayout, LayoutLimits};
pub use positions::PositionMemory;
