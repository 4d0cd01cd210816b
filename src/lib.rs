//! # Prop Hunt Session Core
//!
//! Role assignment, block disguises and cooldown tracking for the Prop Hunt
//! minigame. The game host (entities, positions, forms, the tick signal) is
//! consumed through the [`host::GameHost`] trait.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PROP HUNT SERVER                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Primitives                                │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  └── position.rs - World coordinates                         │
//! │                                                              │
//! │  game/           - Session rules                             │
//! │  ├── state.rs    - Phase, owner, menu selections             │
//! │  ├── roster.rs   - Hunter/hider partitioning                 │
//! │  ├── disguise.rs - Hider records, cooldowns, proxies         │
//! │  └── hearts.rs   - Hearts extension point (feature)          │
//! │                                                              │
//! │  host/           - Host boundary                             │
//! │  ├── mod.rs      - GameHost trait                            │
//! │  ├── form.rs     - Form request/response                     │
//! │  └── sim.rs      - In-memory host                            │
//! │                                                              │
//! │  session/        - Callback plumbing                         │
//! │  ├── router.rs   - Session context and handlers              │
//! │  ├── menu.rs     - Owner setup menu                          │
//! │  └── driver.rs   - Clocks + event channel loop               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Scheduling
//!
//! Single-threaded. The host's fast clock (every 2 ticks) runs cooldowns
//! and proxy follow, the slow clock (every 20 ticks) welcomes arrivals, and
//! event callbacks interleave between them. Each runs to completion.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod game;
pub mod host;
pub mod session;

// Re-export commonly used types
pub use crate::config::{GameConfig, MapSpec};
pub use crate::core::position::Position;
pub use crate::core::rng::{DeterministicRng, RandomSource};
pub use crate::game::state::{ParticipantId, Phase, SessionState};
pub use crate::game::disguise::{HiderRecord, HiderRegistry};
pub use crate::host::{GameHost, SimulatedHost};
pub use crate::session::{EventRouter, GameLoop, HostEvent};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Host tick rate (Hz)
pub const TICK_RATE: u32 = 20;
