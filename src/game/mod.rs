//! Game Logic Module
//!
//! Session rules with no host I/O of their own; host effects go through the
//! [`GameHost`](crate::host::GameHost) passed in.
//!
//! ## Module Structure
//!
//! - `state`: Phase, owner and menu selections
//! - `roster`: Hunter/hider partitioning
//! - `disguise`: Hider records, cooldowns and disguise proxies
//! - `hearts`: Hearts extension point (feature `hearts`)

pub mod state;
pub mod roster;
pub mod disguise;
#[cfg(feature = "hearts")]
pub mod hearts;

// Re-export key types
pub use state::{ParticipantId, Phase, SessionState, SessionError};
pub use roster::{partition, RoleAssignment};
pub use disguise::{DisguiseError, DisguiseState, HiderRecord, HiderRegistry, TickReport};
