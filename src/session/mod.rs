//! Session Layer
//!
//! Turns host callbacks and clock ticks into calls on the game logic.

pub mod driver;
pub mod menu;
pub mod router;

pub use driver::{GameLoop, HostEvent};
pub use menu::{MenuAction, MenuKind, MenuSelection};
pub use router::{EventRouter, SessionId};
