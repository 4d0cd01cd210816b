//! Session State
//!
//! Phase, owner and the owner's menu choices. One instance per session,
//! owned by the router; nothing here touches the host.

use std::fmt;
use serde::{Serialize, Deserialize};
use tracing::{debug, info};

use crate::config::{GameConfig, MapSpec, HUNTER_LIMIT};
use crate::core::rng::RandomSource;
use crate::game::roster::{partition, RoleAssignment};

// =============================================================================
// PARTICIPANT ID
// =============================================================================

/// Stable participant key (the player name on the host).
///
/// Live handles can go stale between ticks; this key cannot. Implements Ord
/// so maps keyed by it iterate deterministically.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Create from a host name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow the underlying name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for ParticipantId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for ParticipantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// PHASE
// =============================================================================

/// Session phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Default)]
pub enum Phase {
    /// Nobody has touched the setup menu yet
    #[default]
    Lobby,
    /// Owner has changed at least one setting
    Configuring,
    /// Roles are assigned and live
    Running,
}

// =============================================================================
// SESSION STATE
// =============================================================================

/// Authoritative session flags.
#[derive(Clone, Debug, Serialize)]
pub struct SessionState {
    phase: Phase,
    owner: Option<ParticipantId>,
    maps: Vec<MapSpec>,
    selected_map_index: usize,
    selected_hunter_count: u8,
    max_hunters: u8,
    assignment: Option<RoleAssignment>,
}

impl SessionState {
    /// Fresh session in the lobby with default selections.
    pub fn new(config: &GameConfig) -> Self {
        Self {
            phase: Phase::Lobby,
            owner: None,
            maps: config.maps.clone(),
            selected_map_index: 0,
            selected_hunter_count: 1,
            max_hunters: config.max_hunters.clamp(1, HUNTER_LIMIT),
            assignment: None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Owner, once anyone has arrived.
    pub fn owner(&self) -> Option<&ParticipantId> {
        self.owner.as_ref()
    }

    /// Whether `id` is the owner.
    pub fn is_owner(&self, id: &ParticipantId) -> bool {
        self.owner.as_ref() == Some(id)
    }

    /// All selectable maps, in menu order.
    pub fn maps(&self) -> &[MapSpec] {
        &self.maps
    }

    /// Index of the selected map.
    pub fn selected_map_index(&self) -> usize {
        self.selected_map_index
    }

    /// The selected map.
    pub fn selected_map(&self) -> Option<&MapSpec> {
        self.maps.get(self.selected_map_index)
    }

    /// Selected hunter quota, always in [1, max_hunters].
    pub fn selected_hunter_count(&self) -> u8 {
        self.selected_hunter_count
    }

    /// Upper bound of the hunter quota.
    pub fn max_hunters(&self) -> u8 {
        self.max_hunters
    }

    /// Role assignment of the running game.
    pub fn assignment(&self) -> Option<&RoleAssignment> {
        self.assignment.as_ref()
    }

    /// Record an arrival. The first arrival ever becomes the owner for the
    /// rest of the process. Returns true if `id` just became owner.
    pub fn register_arrival(&mut self, id: &ParticipantId) -> bool {
        if self.owner.is_some() {
            return false;
        }
        info!("{} is now the session owner", id);
        self.owner = Some(id.clone());
        true
    }

    /// Pick a map by menu index. Out-of-range indices select the last map.
    pub fn select_map(&mut self, index: usize) -> Result<&MapSpec, SessionError> {
        self.ensure_configurable()?;
        self.selected_map_index = index.min(self.maps.len().saturating_sub(1));
        debug!("Map index set to {}", self.selected_map_index);
        self.maps.get(self.selected_map_index).ok_or(SessionError::NoMaps)
    }

    /// Set the hunter quota, clamped to [1, max_hunters].
    pub fn select_hunter_count(&mut self, count: u8) -> Result<u8, SessionError> {
        self.ensure_configurable()?;
        self.selected_hunter_count = count.clamp(1, self.max_hunters);
        debug!("Hunter count set to {}", self.selected_hunter_count);
        Ok(self.selected_hunter_count)
    }

    /// Start the game: partition `roster` and enter `Running`.
    ///
    /// Starting a running game is refused, so live roles are never
    /// reshuffled.
    pub fn start<R: RandomSource + ?Sized>(
        &mut self,
        roster: &[ParticipantId],
        rng: &mut R,
    ) -> Result<RoleAssignment, SessionError> {
        if self.phase == Phase::Running {
            return Err(SessionError::AlreadyRunning);
        }

        let assignment = partition(
            roster,
            self.owner.as_ref(),
            self.selected_hunter_count as usize,
            rng,
        );

        info!(
            "Game started: {} hunters, {} hiders",
            assignment.hunters.len(),
            assignment.hiders.len(),
        );

        self.phase = Phase::Running;
        self.assignment = Some(assignment.clone());
        Ok(assignment)
    }

    fn ensure_configurable(&mut self) -> Result<(), SessionError> {
        match self.phase {
            Phase::Running => Err(SessionError::AlreadyRunning),
            Phase::Lobby => {
                self.phase = Phase::Configuring;
                Ok(())
            }
            Phase::Configuring => Ok(()),
        }
    }
}

/// Illegal session transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The game is already running.
    #[error("Game already running")]
    AlreadyRunning,

    /// No maps are configured.
    #[error("No maps configured")]
    NoMaps,
}
