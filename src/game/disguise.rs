//! Disguise Controller
//!
//! Per-hider cooldown and proxy lifecycle. A hider that strikes a block
//! while idle becomes invisible and gets a proxy entity wearing that block
//! on its head; the proxy then follows the hider every fast tick.
//!
//! ## States
//!
//! ```text
//!   Idle (cooldown 0) --strike--> Disguised (cooldown N, proxy)
//!   Disguised --fast tick x N--> Idle (proxy kept)
//!   Cooling (cooldown > 0, no proxy) --fast tick--> ... --> Idle
//! ```
//!
//! Cooldown expiry never destroys a proxy. Proxies go away only when the
//! next strike replaces them or the hider departs.

use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::core::position::Position;
use crate::game::state::ParticipantId;
use crate::host::{EntityHandle, EquipmentSlot, GameHost, HostError, StatusEffect};

// =============================================================================
// HIDER RECORD
// =============================================================================

/// A live disguise: the proxy entity and the block it impersonates.
///
/// Kept together so one can never exist without the other.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Disguise {
    /// Proxy entity owned by this hider
    pub proxy: EntityHandle,
    /// Block type id worn by the proxy
    pub block_id: String,
}

/// Observable state of a hider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisguiseState<'a> {
    /// May strike. A proxy from an earlier strike may still be standing.
    Idle,
    /// Cooling down without a proxy.
    Cooling {
        /// Ticks left
        remaining: u32,
    },
    /// Cooling down with a proxy.
    Disguised {
        /// Ticks left
        remaining: u32,
        /// Block worn by the proxy
        block_id: &'a str,
    },
}

/// Per-hider state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HiderRecord {
    hearts_remaining: u32,
    cooldown_ticks: u32,
    disguise: Option<Disguise>,
}

impl HiderRecord {
    /// Fresh record: no cooldown, no proxy.
    pub fn new(hearts: u32) -> Self {
        Self {
            hearts_remaining: hearts,
            cooldown_ticks: 0,
            disguise: None,
        }
    }

    /// Hearts left. Nothing consumes these yet.
    pub fn hearts_remaining(&self) -> u32 {
        self.hearts_remaining
    }

    #[cfg(feature = "hearts")]
    pub(crate) fn hearts_mut(&mut self) -> &mut u32 {
        &mut self.hearts_remaining
    }

    /// Ticks until the next strike is allowed.
    pub fn cooldown_ticks(&self) -> u32 {
        self.cooldown_ticks
    }

    /// Current disguise, if any.
    pub fn disguise(&self) -> Option<&Disguise> {
        self.disguise.as_ref()
    }

    /// Proxy entity, if any.
    pub fn proxy(&self) -> Option<EntityHandle> {
        self.disguise.as_ref().map(|d| d.proxy)
    }

    /// Block currently impersonated, if any.
    pub fn block_id(&self) -> Option<&str> {
        self.disguise.as_ref().map(|d| d.block_id.as_str())
    }

    /// Whether a strike would be accepted.
    pub fn can_strike(&self) -> bool {
        self.cooldown_ticks == 0
    }

    /// State-machine view of this record.
    pub fn state(&self) -> DisguiseState<'_> {
        match (&self.disguise, self.cooldown_ticks) {
            (_, 0) => DisguiseState::Idle,
            (Some(d), remaining) => DisguiseState::Disguised { remaining, block_id: &d.block_id },
            (None, remaining) => DisguiseState::Cooling { remaining },
        }
    }
}

// =============================================================================
// OUTCOMES
// =============================================================================

/// Successful strike.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StrikeOutcome {
    /// Newly spawned proxy
    pub proxy: EntityHandle,
    /// Proxy destroyed to make room, if there was one
    pub replaced: Option<EntityHandle>,
    /// Cooldown now in effect
    pub cooldown: u32,
}

/// Result of a fast tick over all hiders.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Records whose cooldown went down this tick
    pub cooled: usize,
    /// Proxies moved to their hider
    pub followed: usize,
    /// Proxies left in place (hider offline, proxy gone, or host failure)
    pub skipped: usize,
}

/// Rejected strikes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DisguiseError {
    /// Striker has no hider record.
    #[error("{0} is not a hider")]
    NotAHider(ParticipantId),

    /// Cooldown still running.
    #[error("Cooldown: {remaining}s")]
    CoolingDown {
        /// Ticks left
        remaining: u32,
    },

    /// Striker could not be resolved to a live handle.
    #[error("{0} is not connected")]
    NotConnected(ParticipantId),

    /// Host refused to spawn the proxy.
    #[error("Proxy spawn failed: {0}")]
    ProxySpawn(#[source] HostError),

    /// Host refused to destroy the previous proxy; the old disguise stands.
    #[error("Previous proxy could not be destroyed: {0}")]
    ProxyDestroy(#[source] HostError),
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Owner of every hider record.
#[derive(Debug, Default)]
pub struct HiderRegistry {
    records: BTreeMap<ParticipantId, HiderRecord>,
}

impl HiderRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hider with a fresh record. An existing record is kept.
    pub fn enroll(&mut self, id: ParticipantId, hearts: u32) {
        self.records.entry(id).or_insert_with(|| HiderRecord::new(hearts));
    }

    /// Look up a record.
    pub fn get(&self, id: &ParticipantId) -> Option<&HiderRecord> {
        self.records.get(id)
    }

    #[cfg(feature = "hearts")]
    pub(crate) fn get_mut(&mut self, id: &ParticipantId) -> Option<&mut HiderRecord> {
        self.records.get_mut(id)
    }

    /// Whether `id` is a registered hider.
    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.records.contains_key(id)
    }

    /// Number of hiders.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nobody is hiding.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate records in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&ParticipantId, &HiderRecord)> {
        self.records.iter()
    }

    /// Disguise `id` as `block_id`.
    ///
    /// Only legal while the cooldown is zero. All checks happen before any
    /// mutation; a rejected strike leaves the record untouched. If the old
    /// proxy cannot be destroyed the strike is refused and the old disguise
    /// is kept. Once the old proxy is destroyed a failed spawn leaves the
    /// hider undisguised and off cooldown.
    pub fn strike<H: GameHost + ?Sized>(
        &mut self,
        host: &mut H,
        id: &ParticipantId,
        block_id: &str,
        at: Position,
        config: &GameConfig,
    ) -> Result<StrikeOutcome, DisguiseError> {
        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| DisguiseError::NotAHider(id.clone()))?;

        if !record.can_strike() {
            return Err(DisguiseError::CoolingDown { remaining: record.cooldown_ticks });
        }

        let player = host
            .resolve(id)
            .ok_or_else(|| DisguiseError::NotConnected(id.clone()))?;

        let replaced = match record.disguise.take() {
            Some(old) => {
                if let Err(e) = destroy_proxy(host, id, old.proxy) {
                    record.disguise = Some(old);
                    return Err(DisguiseError::ProxyDestroy(e));
                }
                Some(old.proxy)
            }
            None => None,
        };

        if let Err(e) = host.apply_effect(player, StatusEffect::LASTING_INVISIBILITY) {
            warn!("Could not hide {}: {}", id, e);
        }

        let proxy = host
            .spawn_entity(&config.proxy_entity_type, at)
            .map_err(DisguiseError::ProxySpawn)?;

        if let Err(e) = dress_proxy(host, proxy, block_id, config) {
            warn!("Proxy {:?} for {} is incomplete: {}", proxy, id, e);
        }

        record.disguise = Some(Disguise {
            proxy,
            block_id: block_id.to_string(),
        });
        record.cooldown_ticks = config.disguise_cooldown;

        info!("{} disguised as {}", id, block_id);

        Ok(StrikeOutcome {
            proxy,
            replaced,
            cooldown: record.cooldown_ticks,
        })
    }

    /// Fast-clock maintenance: count cooldowns down and move every proxy to
    /// just below its hider.
    ///
    /// Each record is handled on its own; an offline hider or a failing
    /// host call only affects that record.
    pub fn tick<H: GameHost + ?Sized>(&mut self, host: &mut H, config: &GameConfig) -> TickReport {
        let mut report = TickReport::default();

        for (id, record) in self.records.iter_mut() {
            if record.cooldown_ticks > 0 {
                record.cooldown_ticks -= 1;
                report.cooled += 1;
            }

            let Some(proxy) = record.proxy() else {
                continue;
            };

            match follow(host, id, proxy, config.proxy_vertical_offset) {
                Ok(true) => report.followed += 1,
                Ok(false) => report.skipped += 1,
                Err(e) => {
                    warn!("Proxy of {} did not follow: {}", id, e);
                    report.skipped += 1;
                }
            }
        }

        report
    }

    /// Remove `id`, destroying its proxy first. Safe to call for unknown ids.
    pub fn depart<H: GameHost + ?Sized>(&mut self, host: &mut H, id: &ParticipantId) -> Option<HiderRecord> {
        if let Some(disguise) = self.records.get_mut(id).and_then(|r| r.disguise.take()) {
            if let Err(e) = destroy_proxy(host, id, disguise.proxy) {
                warn!("Could not destroy proxy {:?} of {}: {}", disguise.proxy, id, e);
            }
        }

        let removed = self.records.remove(id);
        if removed.is_some() {
            debug!("{} left; hider record dropped", id);
        }
        removed
    }
}

// =============================================================================
// HOST HELPERS
// =============================================================================

/// An already-invalid handle counts as destroyed.
fn destroy_proxy<H: GameHost + ?Sized>(
    host: &mut H,
    owner: &ParticipantId,
    proxy: EntityHandle,
) -> Result<(), HostError> {
    if !host.is_valid(proxy) {
        return Ok(());
    }
    host.kill(proxy)?;
    debug!("Destroyed proxy {:?} of {}", proxy, owner);
    Ok(())
}

fn dress_proxy<H: GameHost + ?Sized>(
    host: &mut H,
    proxy: EntityHandle,
    block_id: &str,
    config: &GameConfig,
) -> Result<(), HostError> {
    host.add_tag(proxy, &config.proxy_tag)?;
    host.apply_effect(proxy, StatusEffect::LASTING_INVISIBILITY)?;
    host.equip(proxy, EquipmentSlot::Head, block_id)
}

/// Returns Ok(false) when there is nothing to follow this tick.
fn follow<H: GameHost + ?Sized>(
    host: &mut H,
    owner: &ParticipantId,
    proxy: EntityHandle,
    offset: f64,
) -> Result<bool, HostError> {
    let Some(player) = host.resolve(owner) else {
        return Ok(false);
    };
    if !host.is_valid(proxy) {
        return Ok(false);
    }

    let at = host.location(player)?;
    host.teleport(proxy, at.lowered(offset))?;
    Ok(true)
}
