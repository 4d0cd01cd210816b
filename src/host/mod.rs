//! Host Layer
//!
//! The game host is a black box that owns entities, positions and the tick
//! signal. Everything the session core needs from it goes through
//! [`GameHost`]. Handles returned by the host are only trusted for the
//! duration of one callback; across ticks the core keeps participant ids
//! and resolves them again.

pub mod form;
pub mod sim;

pub use form::{FormRequest, FormResponse};
pub use sim::SimulatedHost;

use crate::core::position::Position;
use crate::game::state::ParticipantId;

/// Opaque handle to a live host entity (player or spawned entity).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityHandle(pub u64);

/// Host game mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameMode {
    /// Hunters: can break and hit.
    Survival,
    /// Hiders: cannot break blocks.
    Adventure,
}

/// Timed status effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusEffect {
    /// Hides the entity model, particles suppressed.
    Invisibility {
        /// Duration in seconds
        seconds: u32,
        /// Effect amplifier
        amplifier: u8,
    },
}

impl StatusEffect {
    /// Invisibility that outlasts any round.
    pub const LASTING_INVISIBILITY: Self = Self::Invisibility { seconds: 99_999, amplifier: 1 };
}

/// Body slot an item can be equipped into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EquipmentSlot {
    /// Head slot; a block item here renders as a full block.
    Head,
}

/// On-screen banner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Title {
    /// Banner text
    pub text: String,
    /// Fade-in ticks
    pub fade_in: u32,
    /// Visible ticks
    pub stay: u32,
    /// Fade-out ticks
    pub fade_out: u32,
}

impl Title {
    /// Build a banner from text and timing.
    pub fn new(text: impl Into<String>, timing: crate::config::BannerTiming) -> Self {
        Self {
            text: text.into(),
            fade_in: timing.fade_in,
            stay: timing.stay,
            fade_out: timing.fade_out,
        }
    }
}

/// Host capability failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// Handle no longer refers to a live entity.
    #[error("Entity {0:?} is no longer valid")]
    InvalidHandle(EntityHandle),

    /// Host refused the operation.
    #[error("Host rejected {operation}: {reason}")]
    Rejected {
        /// Operation name
        operation: &'static str,
        /// Host-supplied reason
        reason: String,
    },
}

/// Capabilities consumed from the game host.
///
/// Implementations are driven from a single thread; every method runs to
/// completion before the next callback starts.
pub trait GameHost {
    /// Identities of all currently connected participants, in host order.
    fn participants(&self) -> Vec<ParticipantId>;

    /// Resolve an identity to a live handle. `None` means disconnected.
    fn resolve(&self, id: &ParticipantId) -> Option<EntityHandle>;

    /// Whether a previously obtained handle is still live.
    fn is_valid(&self, entity: EntityHandle) -> bool;

    /// Current coordinate of an entity.
    fn location(&self, entity: EntityHandle) -> Result<Position, HostError>;

    /// Move an entity.
    fn teleport(&mut self, entity: EntityHandle, to: Position) -> Result<(), HostError>;

    /// Spawn a new entity of `entity_type`.
    fn spawn_entity(&mut self, entity_type: &str, at: Position) -> Result<EntityHandle, HostError>;

    /// Destroy an entity.
    fn kill(&mut self, entity: EntityHandle) -> Result<(), HostError>;

    /// Attach an identification tag.
    fn add_tag(&mut self, entity: EntityHandle, tag: &str) -> Result<(), HostError>;

    /// Put an item into a body slot.
    fn equip(&mut self, entity: EntityHandle, slot: EquipmentSlot, item_type: &str) -> Result<(), HostError>;

    /// Apply a timed status effect.
    fn apply_effect(&mut self, entity: EntityHandle, effect: StatusEffect) -> Result<(), HostError>;

    /// Switch a player's game mode.
    fn set_game_mode(&mut self, entity: EntityHandle, mode: GameMode) -> Result<(), HostError>;

    /// Whether a player carries an item of this type and name tag.
    fn has_named_item(&self, entity: EntityHandle, item_type: &str, name: &str) -> bool;

    /// Give a named item to a player.
    fn give_named_item(&mut self, entity: EntityHandle, item_type: &str, name: &str) -> Result<(), HostError>;

    /// Message one participant.
    fn send_message(&mut self, entity: EntityHandle, text: &str);

    /// Message everyone.
    fn broadcast(&mut self, text: &str);

    /// Show a banner to one participant.
    fn show_title(&mut self, entity: EntityHandle, title: &Title);

    /// Present a form. The answer arrives later as a [`FormResponse`]
    /// carrying the same `form_id`.
    fn show_form(&mut self, entity: EntityHandle, form: &FormRequest) -> Result<(), HostError>;
}
