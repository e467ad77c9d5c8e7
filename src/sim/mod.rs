//! Deterministic simulation module
//!
//! Pure game geometry with no threads or channels:
//! - Integer pixel coordinates, y pointing down
//! - Angles in degrees, counter-clockwise from +x with 90° pointing up
//! - Fixed brick scan order (column by column)

pub mod ball;
pub mod bricks;
pub mod collision;
pub mod paddle;
pub mod reflect;

pub use ball::Ball;
pub use bricks::{BrickGrid, BrickRect, BrickTags, Cell, LiveCells};
pub use collision::{Contact, Incidence, Target, classify};
pub use paddle::{Paddle, PaddleZone};
pub use reflect::reflect;
