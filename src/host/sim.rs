//! In-memory host.
//!
//! Keeps a tiny world of entities and records every call made against it.
//! Used by the test suites and by the demo binary. Individual operations can
//! be made to fail so error paths can be driven on purpose.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::position::Position;
use crate::game::state::ParticipantId;
use crate::host::{
    EntityHandle, EquipmentSlot, FormRequest, GameHost, GameMode, HostError, StatusEffect, Title,
};

/// Entity type used for connected players.
pub const PLAYER_ENTITY_TYPE: &str = "minecraft:player";

/// One entity in the simulated world.
#[derive(Clone, Debug, Default)]
pub struct SimEntity {
    /// Entity type id
    pub entity_type: String,
    /// Current position
    pub position: Position,
    /// Identification tags
    pub tags: Vec<String>,
    /// Effects applied so far
    pub effects: Vec<StatusEffect>,
    /// Item in the head slot
    pub head: Option<String>,
    /// Game mode (players only)
    pub game_mode: Option<GameMode>,
    /// Named items held: (type, name)
    pub items: Vec<(String, String)>,
    /// Messages received
    pub messages: Vec<String>,
    /// Banners received
    pub titles: Vec<Title>,
    /// Forms shown
    pub forms: Vec<FormRequest>,
}

/// Recording host backed by plain maps.
#[derive(Debug, Default)]
pub struct SimulatedHost {
    next_handle: u64,
    players: BTreeMap<ParticipantId, EntityHandle>,
    /// Connection order, so `participants()` matches host enumeration.
    join_order: Vec<ParticipantId>,
    entities: BTreeMap<EntityHandle, SimEntity>,
    broadcasts: Vec<String>,
    killed: Vec<EntityHandle>,
    failing_teleports: BTreeSet<EntityHandle>,
    failing_kills: BTreeSet<EntityHandle>,
    failing_spawns: bool,
}

impl SimulatedHost {
    /// Empty world.
    pub fn new() -> Self {
        Self::default()
    }

    fn mint(&mut self, entity_type: &str, position: Position) -> EntityHandle {
        self.next_handle += 1;
        let handle = EntityHandle(self.next_handle);
        self.entities.insert(handle, SimEntity {
            entity_type: entity_type.to_string(),
            position,
            ..SimEntity::default()
        });
        handle
    }

    /// Connect a participant at `position`. Reconnecting yields a new handle.
    pub fn connect(&mut self, id: impl Into<ParticipantId>, position: Position) -> EntityHandle {
        let id = id.into();
        self.disconnect(&id);
        let handle = self.mint(PLAYER_ENTITY_TYPE, position);
        self.players.insert(id.clone(), handle);
        self.join_order.push(id);
        handle
    }

    /// Drop a participant's connection; their handle becomes invalid.
    pub fn disconnect(&mut self, id: &ParticipantId) {
        if let Some(handle) = self.players.remove(id) {
            self.entities.remove(&handle);
            self.join_order.retain(|p| p != id);
        }
    }

    /// Move a connected participant.
    pub fn move_player(&mut self, id: &ParticipantId, to: Position) {
        if let Some(entity) = self.players.get(id).and_then(|h| self.entities.get_mut(h)) {
            entity.position = to;
        }
    }

    /// Make every teleport of `entity` fail.
    pub fn fail_teleports(&mut self, entity: EntityHandle) {
        self.failing_teleports.insert(entity);
    }

    /// Make every kill of `entity` fail; the entity stays alive.
    pub fn fail_kills(&mut self, entity: EntityHandle) {
        self.failing_kills.insert(entity);
    }

    /// Let `entity` be killed again.
    pub fn allow_kills(&mut self, entity: EntityHandle) {
        self.failing_kills.remove(&entity);
    }

    /// Make every spawn fail (or succeed again).
    pub fn fail_spawns(&mut self, fail: bool) {
        self.failing_spawns = fail;
    }

    /// Remove an entity behind the core's back, as a host-side despawn would.
    pub fn despawn(&mut self, entity: EntityHandle) {
        self.entities.remove(&entity);
    }

    /// Look up an entity.
    pub fn entity(&self, handle: EntityHandle) -> Option<&SimEntity> {
        self.entities.get(&handle)
    }

    /// Look up a participant's player entity.
    pub fn player(&self, id: &ParticipantId) -> Option<&SimEntity> {
        self.players.get(id).and_then(|h| self.entities.get(h))
    }

    /// Live entities carrying `tag`.
    pub fn entities_with_tag(&self, tag: &str) -> Vec<EntityHandle> {
        self.entities
            .iter()
            .filter(|(_, e)| e.tags.iter().any(|t| t == tag))
            .map(|(h, _)| *h)
            .collect()
    }

    /// Messages a participant has received.
    pub fn messages(&self, id: &ParticipantId) -> Vec<String> {
        self.player(id).map(|p| p.messages.clone()).unwrap_or_default()
    }

    /// Most recent form shown to a participant.
    pub fn last_form(&self, id: &ParticipantId) -> Option<FormRequest> {
        self.player(id).and_then(|p| p.forms.last().cloned())
    }

    /// Everything broadcast so far.
    pub fn broadcasts(&self) -> &[String] {
        &self.broadcasts
    }

    /// Entities destroyed through [`GameHost::kill`], in order.
    pub fn killed(&self) -> &[EntityHandle] {
        &self.killed
    }

    fn entity_mut(&mut self, handle: EntityHandle) -> Result<&mut SimEntity, HostError> {
        self.entities.get_mut(&handle).ok_or(HostError::InvalidHandle(handle))
    }
}

impl GameHost for SimulatedHost {
    fn participants(&self) -> Vec<ParticipantId> {
        self.join_order.clone()
    }

    fn resolve(&self, id: &ParticipantId) -> Option<EntityHandle> {
        self.players.get(id).copied()
    }

    fn is_valid(&self, entity: EntityHandle) -> bool {
        self.entities.contains_key(&entity)
    }

    fn location(&self, entity: EntityHandle) -> Result<Position, HostError> {
        self.entities
            .get(&entity)
            .map(|e| e.position)
            .ok_or(HostError::InvalidHandle(entity))
    }

    fn teleport(&mut self, entity: EntityHandle, to: Position) -> Result<(), HostError> {
        if self.failing_teleports.contains(&entity) {
            return Err(HostError::Rejected {
                operation: "teleport",
                reason: "destination blocked".to_string(),
            });
        }
        self.entity_mut(entity)?.position = to;
        Ok(())
    }

    fn spawn_entity(&mut self, entity_type: &str, at: Position) -> Result<EntityHandle, HostError> {
        if self.failing_spawns {
            return Err(HostError::Rejected {
                operation: "spawn_entity",
                reason: "entity cap reached".to_string(),
            });
        }
        Ok(self.mint(entity_type, at))
    }

    fn kill(&mut self, entity: EntityHandle) -> Result<(), HostError> {
        if self.failing_kills.contains(&entity) {
            return Err(HostError::Rejected {
                operation: "kill",
                reason: "entity is protected".to_string(),
            });
        }
        self.entities.remove(&entity).ok_or(HostError::InvalidHandle(entity))?;
        self.killed.push(entity);
        Ok(())
    }

    fn add_tag(&mut self, entity: EntityHandle, tag: &str) -> Result<(), HostError> {
        self.entity_mut(entity)?.tags.push(tag.to_string());
        Ok(())
    }

    fn equip(&mut self, entity: EntityHandle, slot: EquipmentSlot, item_type: &str) -> Result<(), HostError> {
        let target = self.entity_mut(entity)?;
        match slot {
            EquipmentSlot::Head => target.head = Some(item_type.to_string()),
        }
        Ok(())
    }

    fn apply_effect(&mut self, entity: EntityHandle, effect: StatusEffect) -> Result<(), HostError> {
        self.entity_mut(entity)?.effects.push(effect);
        Ok(())
    }

    fn set_game_mode(&mut self, entity: EntityHandle, mode: GameMode) -> Result<(), HostError> {
        self.entity_mut(entity)?.game_mode = Some(mode);
        Ok(())
    }

    fn has_named_item(&self, entity: EntityHandle, item_type: &str, name: &str) -> bool {
        self.entities
            .get(&entity)
            .map(|e| e.items.iter().any(|(t, n)| t == item_type && n == name))
            .unwrap_or(false)
    }

    fn give_named_item(&mut self, entity: EntityHandle, item_type: &str, name: &str) -> Result<(), HostError> {
        self.entity_mut(entity)?
            .items
            .push((item_type.to_string(), name.to_string()));
        Ok(())
    }

    fn send_message(&mut self, entity: EntityHandle, text: &str) {
        if let Some(e) = self.entities.get_mut(&entity) {
            e.messages.push(text.to_string());
        }
    }

    fn broadcast(&mut self, text: &str) {
        self.broadcasts.push(text.to_string());
    }

    fn show_title(&mut self, entity: EntityHandle, title: &Title) {
        if let Some(e) = self.entities.get_mut(&entity) {
            e.titles.push(title.clone());
        }
    }

    fn show_form(&mut self, entity: EntityHandle, form: &FormRequest) -> Result<(), HostError> {
        self.entity_mut(entity)?.forms.push(form.clone());
        Ok(())
    }
}
