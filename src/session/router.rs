//! Event Router
//!
//! The session context. Owns the session state, the hider registry, the
//! welcomed set and the open forms, and turns host callbacks into calls on
//! them. Each handler runs to completion; nothing here blocks or spawns.
//!
//! ## Entry points
//!
//! | Host callback            | Method                |
//! |--------------------------|-----------------------|
//! | player connected         | [`EventRouter::on_arrival`] (via `tick_slow`) |
//! | item used                | [`EventRouter::on_item_use`] |
//! | form answered            | [`EventRouter::on_form_response`] |
//! | block hit                | [`EventRouter::on_strike`] |
//! | player left              | [`EventRouter::on_departure`] |
//! | fast interval            | [`EventRouter::tick_fast`] |
//! | slow interval            | [`EventRouter::tick_slow`] |

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument, warn};

use crate::config::GameConfig;
use crate::core::position::Position;
use crate::core::rng::{DeterministicRng, RandomSource};
use crate::game::disguise::{DisguiseError, HiderRegistry, TickReport};
use crate::game::roster::RoleAssignment;
use crate::game::state::{ParticipantId, Phase, SessionState};
use crate::host::{EntityHandle, FormResponse, GameHost, GameMode, HostError, StatusEffect, Title};
use crate::session::menu::{build_form, interpret, MenuAction, MenuKind, MenuSelection};

/// Unique session identifier.
pub type SessionId = uuid::Uuid;

/// A form waiting for its answer.
#[derive(Clone, Debug, PartialEq, Eq)]
struct PendingForm {
    participant: ParticipantId,
    kind: MenuKind,
}

/// Session context driven by host callbacks.
pub struct EventRouter<R: RandomSource = DeterministicRng> {
    id: SessionId,
    config: GameConfig,
    state: SessionState,
    hiders: HiderRegistry,
    welcomed: BTreeSet<ParticipantId>,
    pending_forms: BTreeMap<u32, PendingForm>,
    next_form_id: u32,
    rng: R,
}

impl<R: RandomSource> EventRouter<R> {
    /// New session in the lobby. `rng` drives role shuffles.
    pub fn new(config: GameConfig, rng: R) -> Self {
        let id = uuid::Uuid::new_v4();
        info!("Session {} created", id);
        Self {
            id,
            state: SessionState::new(&config),
            config,
            hiders: HiderRegistry::new(),
            welcomed: BTreeSet::new(),
            pending_forms: BTreeMap::new(),
            next_form_id: 1,
            rng,
        }
    }

    /// Session identifier.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Configuration in use.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Session flags.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Hider records.
    pub fn hiders(&self) -> &HiderRegistry {
        &self.hiders
    }

    /// Whether `id` has already been through lobby arrival.
    pub fn is_welcomed(&self, id: &ParticipantId) -> bool {
        self.welcomed.contains(id)
    }

    // =========================================================================
    // ARRIVAL
    // =========================================================================

    /// Welcome a participant: owner registration, lobby teleport, banner and
    /// the owner's admin item. Runs once per participant; a participant who
    /// cannot be resolved yet is retried on the next slow tick.
    #[instrument(skip(self, host))]
    pub fn on_arrival<H: GameHost + ?Sized>(&mut self, host: &mut H, id: &ParticipantId) {
        if self.welcomed.contains(id) {
            return;
        }
        let Some(player) = host.resolve(id) else {
            debug!("{} not resolvable yet", id);
            return;
        };
        self.welcomed.insert(id.clone());

        if self.state.register_arrival(id) {
            host.broadcast(&format!("[Server] {} is set as the world owner.", id));
        }

        note(host.teleport(player, self.config.lobby_position), "lobby teleport", id);
        host.show_title(player, &Title::new(self.config.lobby_title.clone(), self.config.lobby_title_timing));

        if self.state.is_owner(id) {
            self.give_admin_item(host, player, id);
        }
    }

    fn give_admin_item<H: GameHost + ?Sized>(&self, host: &mut H, player: EntityHandle, id: &ParticipantId) {
        let (item, name) = (&self.config.admin_item_type, &self.config.admin_item_name);
        if host.has_named_item(player, item, name) {
            return;
        }
        match host.give_named_item(player, item, name) {
            Ok(()) => host.send_message(player, "[Server] Admin compass given."),
            Err(e) => warn!("Could not give admin item to {}: {}", id, e),
        }
    }

    // =========================================================================
    // MENU
    // =========================================================================

    /// Owner used an item. Opens the setup form if it is the admin item.
    /// Returns true if a form was shown.
    #[instrument(skip(self, host))]
    pub fn on_item_use<H: GameHost + ?Sized>(
        &mut self,
        host: &mut H,
        id: &ParticipantId,
        item_type: &str,
        item_name: &str,
    ) -> bool {
        if item_type != self.config.admin_item_type || item_name != self.config.admin_item_name {
            return false;
        }
        if !self.state.is_owner(id) {
            debug!("{} used the admin item but is not the owner", id);
            return false;
        }
        self.open_menu(host, id, MenuKind::Setup)
    }

    fn open_menu<H: GameHost + ?Sized>(&mut self, host: &mut H, id: &ParticipantId, kind: MenuKind) -> bool {
        let Some(player) = host.resolve(id) else {
            return false;
        };

        let form_id = self.next_form_id;
        self.next_form_id = self.next_form_id.wrapping_add(1);
        let form = build_form(kind, form_id, &self.state);

        match host.show_form(player, &form) {
            Ok(()) => {
                // A newer form supersedes whatever this participant had open
                self.pending_forms.retain(|_, p| &p.participant != id);
                self.pending_forms.insert(form_id, PendingForm { participant: id.clone(), kind });
                true
            }
            Err(e) => {
                warn!("Could not show {:?} to {}: {}", kind, id, e);
                false
            }
        }
    }

    /// A form was answered or closed. Unknown forms and answers from anyone
    /// but the addressee are ignored; a cancellation changes nothing.
    #[instrument(skip(self, host))]
    pub fn on_form_response<H: GameHost + ?Sized>(
        &mut self,
        host: &mut H,
        id: &ParticipantId,
        response: FormResponse,
    ) {
        let form_id = response.form_id();
        match self.pending_forms.get(&form_id) {
            Some(pending) if &pending.participant == id => {}
            _ => {
                debug!("Ignoring answer to form {} from {}", form_id, id);
                return;
            }
        }
        let Some(pending) = self.pending_forms.remove(&form_id) else {
            return;
        };

        let Some(index) = response.selection() else {
            debug!("{} closed {:?}", id, pending.kind);
            return;
        };

        match interpret(pending.kind, index, &self.state) {
            Some(MenuAction::Open(kind)) => {
                self.open_menu(host, id, kind);
            }
            Some(MenuAction::Select(selection)) => {
                self.on_menu_select(host, id, selection);
            }
            None => debug!("Button {} is not on {:?}", index, pending.kind),
        }
    }

    /// Apply an owner's menu choice. Returns true if it took effect.
    #[instrument(skip(self, host))]
    pub fn on_menu_select<H: GameHost + ?Sized>(
        &mut self,
        host: &mut H,
        id: &ParticipantId,
        selection: MenuSelection,
    ) -> bool {
        if !self.state.is_owner(id) {
            warn!("{} is not the owner; menu selection dropped", id);
            return false;
        }

        let notice = match selection {
            MenuSelection::Map(index) => self
                .state
                .select_map(index)
                .map(|map| format!("[Server] Map selected: {}", map.name)),
            MenuSelection::HunterCount(count) => self
                .state
                .select_hunter_count(count)
                .map(|n| format!("[Server] Hunters selected: {}", n)),
            MenuSelection::StartGame => {
                let started = self.start_game(host);
                if started.is_none() {
                    notify(host, id, "[Server] The game is already running.");
                }
                return started.is_some();
            }
        };

        match notice {
            Ok(text) => {
                notify(host, id, &text);
                true
            }
            Err(e) => {
                notify(host, id, &format!("[Server] {}", e));
                false
            }
        }
    }

    // =========================================================================
    // GAME START
    // =========================================================================

    /// Assign roles to everyone connected and send them to the map.
    /// `None` if a game is already running.
    pub fn start_game<H: GameHost + ?Sized>(&mut self, host: &mut H) -> Option<RoleAssignment> {
        let roster = host.participants();
        let assignment = match self.state.start(&roster, &mut self.rng) {
            Ok(assignment) => assignment,
            Err(e) => {
                debug!("Start ignored: {}", e);
                return None;
            }
        };

        let spawn = self
            .state
            .selected_map()
            .map(|m| m.spawn)
            .unwrap_or(self.config.lobby_position);

        for hunter in &assignment.hunters {
            self.apply_hunter(host, hunter, spawn);
        }
        for hider in &assignment.hiders {
            self.hiders.enroll(hider.clone(), self.config.initial_hearts);
            self.apply_hider(host, hider, spawn);
        }

        host.broadcast("The game has started. Good luck!");
        Some(assignment)
    }

    fn apply_hunter<H: GameHost + ?Sized>(&self, host: &mut H, id: &ParticipantId, spawn: Position) {
        let Some(player) = host.resolve(id) else {
            warn!("Hunter {} left before the start", id);
            return;
        };
        note(host.teleport(player, spawn), "spawn teleport", id);
        note(host.set_game_mode(player, GameMode::Survival), "game mode", id);
        host.show_title(player, &Title::new("§l§cRole: HUNTER", self.config.role_title_timing));
    }

    fn apply_hider<H: GameHost + ?Sized>(&self, host: &mut H, id: &ParticipantId, spawn: Position) {
        let Some(player) = host.resolve(id) else {
            warn!("Hider {} left before the start", id);
            return;
        };
        note(host.teleport(player, spawn), "spawn teleport", id);
        note(host.set_game_mode(player, GameMode::Adventure), "game mode", id);
        note(host.apply_effect(player, StatusEffect::LASTING_INVISIBILITY), "invisibility", id);
        note(host.add_tag(player, &self.config.hider_tag), "hider tag", id);
        host.show_title(player, &Title::new("§l§aRole: HIDER", self.config.role_title_timing));
    }

    // =========================================================================
    // GAMEPLAY
    // =========================================================================

    /// A participant hit a block. Hiders in a running game try to disguise;
    /// everyone else is ignored.
    #[instrument(skip(self, host))]
    pub fn on_strike<H: GameHost + ?Sized>(
        &mut self,
        host: &mut H,
        id: &ParticipantId,
        block_id: &str,
        at: Position,
    ) {
        if self.state.phase() != Phase::Running || !self.hiders.contains(id) {
            return;
        }

        match self.hiders.strike(host, id, block_id, at, &self.config) {
            Ok(_) => notify(host, id, &format!("§aNow disguised as {}", block_id)),
            Err(DisguiseError::CoolingDown { remaining }) => {
                notify(host, id, &format!("§eCooldown: {}s", remaining));
            }
            Err(e) => warn!("Disguise for {} failed: {}", id, e),
        }
    }

    /// A participant left. Destroys their proxy and drops their hider
    /// record and open forms. Safe for unknown ids.
    #[instrument(skip(self, host))]
    pub fn on_departure<H: GameHost + ?Sized>(&mut self, host: &mut H, id: &ParticipantId) {
        self.hiders.depart(host, id);
        self.pending_forms.retain(|_, p| &p.participant != id);
    }

    /// Fast clock: cooldowns and proxy follow.
    pub fn tick_fast<H: GameHost + ?Sized>(&mut self, host: &mut H) -> TickReport {
        self.hiders.tick(host, &self.config)
    }

    /// Slow clock: welcome anyone connected who has not been welcomed.
    pub fn tick_slow<H: GameHost + ?Sized>(&mut self, host: &mut H) {
        for id in host.participants() {
            self.on_arrival(host, &id);
        }
    }
}

fn note(result: Result<(), HostError>, what: &str, id: &ParticipantId) {
    if let Err(e) = result {
        warn!("{} failed for {}: {}", what, id, e);
    }
}

fn notify<H: GameHost + ?Sized>(host: &mut H, id: &ParticipantId, text: &str) {
    if let Some(player) = host.resolve(id) {
        host.send_message(player, text);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::disguise::DisguiseState;
    use crate::host::SimulatedHost;

    const COMPASS: &str = "minecraft:compass";
    const COMPASS_NAME: &str = "Admin Compass";

    fn pid(name: &str) -> ParticipantId {
        ParticipantId::from(name)
    }

    /// Alice (owner), Bob and Carol connected and welcomed.
    fn lobby(seed: u64) -> (EventRouter, SimulatedHost) {
        let mut host = SimulatedHost::new();
        for name in ["Alice", "Bob", "Carol"] {
            host.connect(name, Position::new(0.0, 70.0, 0.0));
        }
        let mut router = EventRouter::new(GameConfig::default(), DeterministicRng::new(seed));
        router.tick_slow(&mut host);
        (router, host)
    }

    fn start(router: &mut EventRouter, host: &mut SimulatedHost) -> RoleAssignment {
        assert!(router.on_menu_select(host, &pid("Alice"), MenuSelection::StartGame));
        router.state().assignment().cloned().unwrap()
    }

    /// Start with Alice hiding and Bob and Carol hunting.
    fn running_with_alice_hiding() -> (EventRouter, SimulatedHost) {
        let (mut router, mut host) = lobby(3);
        router.on_menu_select(&mut host, &pid("Alice"), MenuSelection::HunterCount(3));
        start(&mut router, &mut host);
        (router, host)
    }

    #[test]
    fn test_arrival_welcomes_everyone_once() {
        let (mut router, mut host) = lobby(1);

        assert_eq!(router.state().owner(), Some(&pid("Alice")));
        assert_eq!(host.broadcasts(), &["[Server] Alice is set as the world owner.".to_string()]);

        for name in ["Alice", "Bob", "Carol"] {
            let player = host.player(&pid(name)).unwrap();
            assert_eq!(player.position, router.config().lobby_position);
            assert_eq!(player.titles.len(), 1);
        }

        let alice = host.player(&pid("Alice")).unwrap();
        assert_eq!(alice.items, vec![(COMPASS.to_string(), COMPASS_NAME.to_string())]);
        assert!(host.player(&pid("Bob")).unwrap().items.is_empty());

        // Second slow tick changes nothing
        host.move_player(&pid("Bob"), Position::ORIGIN);
        router.tick_slow(&mut host);
        assert_eq!(host.player(&pid("Bob")).unwrap().position, Position::ORIGIN);
        assert_eq!(host.player(&pid("Alice")).unwrap().items.len(), 1);
        assert_eq!(host.broadcasts().len(), 1);
    }

    #[test]
    fn test_late_arrival_is_welcomed_on_next_slow_tick() {
        let (mut router, mut host) = lobby(1);
        host.connect("Dave", Position::ORIGIN);
        assert!(!router.is_welcomed(&pid("Dave")));

        router.tick_slow(&mut host);
        assert!(router.is_welcomed(&pid("Dave")));
        assert_eq!(router.state().owner(), Some(&pid("Alice")));
    }

    #[test]
    fn test_owner_survives_owner_leaving() {
        let (mut router, mut host) = lobby(1);
        router.on_departure(&mut host, &pid("Alice"));
        host.disconnect(&pid("Alice"));
        router.tick_slow(&mut host);
        assert_eq!(router.state().owner(), Some(&pid("Alice")));
    }

    #[test]
    fn test_menu_flow_through_forms() {
        let (mut router, mut host) = lobby(1);
        let alice = pid("Alice");

        assert!(router.on_item_use(&mut host, &alice, COMPASS, COMPASS_NAME));
        let setup = host.last_form(&alice).unwrap();
        assert_eq!(setup.title, "Prop Hunt Setup");

        // Hunters -> 2
        router.on_form_response(&mut host, &alice, FormResponse::Selected { form_id: setup.form_id, index: 1 });
        let selector = host.last_form(&alice).unwrap();
        assert_eq!(selector.title, "Select Hunters");
        router.on_form_response(&mut host, &alice, FormResponse::Selected { form_id: selector.form_id, index: 1 });
        assert_eq!(router.state().selected_hunter_count(), 2);
        assert_eq!(router.state().phase(), Phase::Configuring);

        // Map -> Urban Market
        router.on_item_use(&mut host, &alice, COMPASS, COMPASS_NAME);
        let setup = host.last_form(&alice).unwrap();
        assert_eq!(setup.buttons[1], "Hunters: 2");
        router.on_form_response(&mut host, &alice, FormResponse::Selected { form_id: setup.form_id, index: 0 });
        let maps = host.last_form(&alice).unwrap();
        router.on_form_response(&mut host, &alice, FormResponse::Selected { form_id: maps.form_id, index: 1 });
        assert_eq!(router.state().selected_map_index(), 1);

        let messages = host.messages(&alice);
        assert!(messages.contains(&"[Server] Hunters selected: 2".to_string()));
        assert!(messages.contains(&"[Server] Map selected: Urban Market".to_string()));
    }

    #[test]
    fn test_canceled_and_stale_forms_change_nothing() {
        let (mut router, mut host) = lobby(1);
        let alice = pid("Alice");

        router.on_item_use(&mut host, &alice, COMPASS, COMPASS_NAME);
        let setup = host.last_form(&alice).unwrap();
        router.on_form_response(&mut host, &alice, FormResponse::Canceled { form_id: setup.form_id });
        assert_eq!(router.state().phase(), Phase::Lobby);

        // Already answered
        router.on_form_response(&mut host, &alice, FormResponse::Selected { form_id: setup.form_id, index: 2 });
        assert_eq!(router.state().phase(), Phase::Lobby);
    }

    #[test]
    fn test_reopened_menu_supersedes_older_form() {
        let (mut router, mut host) = lobby(1);
        let alice = pid("Alice");

        router.on_item_use(&mut host, &alice, COMPASS, COMPASS_NAME);
        let older = host.last_form(&alice).unwrap();
        router.on_item_use(&mut host, &alice, COMPASS, COMPASS_NAME);
        let newer = host.last_form(&alice).unwrap();
        assert_ne!(older.form_id, newer.form_id);

        router.on_form_response(&mut host, &alice, FormResponse::Selected { form_id: older.form_id, index: 2 });
        assert_eq!(router.state().phase(), Phase::Lobby);

        router.on_form_response(&mut host, &alice, FormResponse::Selected { form_id: newer.form_id, index: 2 });
        assert_eq!(router.state().phase(), Phase::Running);
    }

    #[test]
    fn test_non_owner_cannot_configure() {
        let (mut router, mut host) = lobby(1);
        let bob = pid("Bob");

        assert!(!router.on_item_use(&mut host, &bob, COMPASS, COMPASS_NAME));
        assert!(host.last_form(&bob).is_none());
        assert!(!router.on_menu_select(&mut host, &bob, MenuSelection::StartGame));
        assert_eq!(router.state().phase(), Phase::Lobby);

        // Bob cannot answer Alice's form either
        router.on_item_use(&mut host, &pid("Alice"), COMPASS, COMPASS_NAME);
        let setup = host.last_form(&pid("Alice")).unwrap();
        router.on_form_response(&mut host, &bob, FormResponse::Selected { form_id: setup.form_id, index: 2 });
        assert_eq!(router.state().phase(), Phase::Lobby);
    }

    #[test]
    fn test_other_items_ignored() {
        let (mut router, mut host) = lobby(1);
        assert!(!router.on_item_use(&mut host, &pid("Alice"), "minecraft:stick", COMPASS_NAME));
        assert!(!router.on_item_use(&mut host, &pid("Alice"), COMPASS, "Compass"));
    }

    #[test]
    fn test_scenario_a_one_hunter() {
        for seed in 0..50 {
            let (mut router, mut host) = lobby(seed);
            let roles = start(&mut router, &mut host);

            assert_eq!(roles.hunters.len(), 1);
            assert!(roles.is_hider(&pid("Alice")));
            assert_eq!(roles.hiders.len(), 2);
            assert_eq!(router.hiders().len(), 2);

            let hunter = roles.hunters.iter().next().unwrap();
            assert!(hunter == &pid("Bob") || hunter == &pid("Carol"));

            let spawn = router.state().selected_map().unwrap().spawn;
            let h = host.player(hunter).unwrap();
            assert_eq!(h.game_mode, Some(GameMode::Survival));
            assert_eq!(h.position, spawn);
            let a = host.player(&pid("Alice")).unwrap();
            assert_eq!(a.game_mode, Some(GameMode::Adventure));
            assert!(a.tags.contains(&"hider".to_string()));
            assert!(a.effects.contains(&StatusEffect::LASTING_INVISIBILITY));
        }
    }

    #[test]
    fn test_failed_lobby_teleport_does_not_skip_others() {
        let mut host = SimulatedHost::new();
        for name in ["Alice", "Bob", "Carol"] {
            host.connect(name, Position::new(0.0, 70.0, 0.0));
        }
        let bob = host.resolve(&pid("Bob")).unwrap();
        host.fail_teleports(bob);

        let mut router = EventRouter::new(GameConfig::default(), DeterministicRng::new(1));
        router.tick_slow(&mut host);

        let lobby_at = router.config().lobby_position;
        for name in ["Alice", "Bob", "Carol"] {
            assert!(router.is_welcomed(&pid(name)));
            assert_eq!(host.player(&pid(name)).unwrap().titles.len(), 1);
        }
        assert_eq!(host.player(&pid("Alice")).unwrap().position, lobby_at);
        assert_eq!(host.player(&pid("Carol")).unwrap().position, lobby_at);
        assert_eq!(host.player(&pid("Bob")).unwrap().position, Position::new(0.0, 70.0, 0.0));
    }

    #[test]
    fn test_failed_spawn_teleport_does_not_skip_others() {
        for seed in 0..20 {
            let (mut router, mut host) = lobby(seed);
            let carol = host.resolve(&pid("Carol")).unwrap();
            host.fail_teleports(carol);

            let roles = start(&mut router, &mut host);
            let spawn = router.state().selected_map().unwrap().spawn;

            for name in ["Alice", "Bob", "Carol"] {
                let id = pid(name);
                let player = host.player(&id).unwrap();
                let expected = if roles.is_hunter(&id) { GameMode::Survival } else { GameMode::Adventure };
                assert_eq!(player.game_mode, Some(expected));
                // Lobby banner plus role banner
                assert_eq!(player.titles.len(), 2);
                assert_eq!(router.hiders().contains(&id), roles.is_hider(&id));
            }
            assert_eq!(host.player(&pid("Alice")).unwrap().position, spawn);
            assert_eq!(host.player(&pid("Bob")).unwrap().position, spawn);
            assert_ne!(host.player(&pid("Carol")).unwrap().position, spawn);
        }
    }

    #[test]
    fn test_scenario_b_quota_above_roster() {
        let (mut router, mut host) = lobby(5);
        // Selector tops out at 3, which already exceeds the two non-owners
        router.on_menu_select(&mut host, &pid("Alice"), MenuSelection::HunterCount(5));
        let roles = start(&mut router, &mut host);

        assert_eq!(roles.hunters, [pid("Bob"), pid("Carol")].into_iter().collect::<BTreeSet<_>>());
        assert_eq!(roles.hiders, [pid("Alice")].into_iter().collect::<BTreeSet<_>>());
        assert_eq!(host.broadcasts().last().map(String::as_str), Some("The game has started. Good luck!"));
    }

    #[test]
    fn test_second_start_is_noop() {
        let (mut router, mut host) = lobby(11);
        let first = start(&mut router, &mut host);

        assert!(!router.on_menu_select(&mut host, &pid("Alice"), MenuSelection::StartGame));
        assert_eq!(router.state().assignment(), Some(&first));
        assert!(host.messages(&pid("Alice")).contains(&"[Server] The game is already running.".to_string()));
        assert!(!router.on_menu_select(&mut host, &pid("Alice"), MenuSelection::HunterCount(2)));
    }

    #[test]
    fn test_scenario_c_rejected_restrike() {
        let (mut router, mut host) = running_with_alice_hiding();
        let alice = pid("Alice");

        router.on_strike(&mut host, &alice, "stone", Position::new(100.0, -60.0, 100.0));
        let proxy = router.hiders().get(&alice).unwrap().proxy().unwrap();
        assert_eq!(router.hiders().get(&alice).unwrap().cooldown_ticks(), 30);

        router.on_strike(&mut host, &alice, "dirt", Position::new(100.0, -60.0, 100.0));
        router.tick_fast(&mut host);

        let record = router.hiders().get(&alice).unwrap();
        assert_eq!(record.state(), DisguiseState::Disguised { remaining: 29, block_id: "stone" });
        assert_eq!(record.proxy(), Some(proxy));
        assert!(host.is_valid(proxy));

        let messages = host.messages(&alice);
        assert!(messages.contains(&"§aNow disguised as stone".to_string()));
        assert!(messages.contains(&"§eCooldown: 30s".to_string()));
    }

    #[test]
    fn test_scenario_d_departure_with_proxy() {
        let (mut router, mut host) = running_with_alice_hiding();
        let alice = pid("Alice");

        router.on_strike(&mut host, &alice, "stone", Position::ORIGIN);
        let proxy = router.hiders().get(&alice).unwrap().proxy().unwrap();

        router.on_departure(&mut host, &alice);
        host.disconnect(&alice);

        assert!(router.hiders().get(&alice).is_none());
        assert!(!host.is_valid(proxy));
        assert!(host.entities_with_tag("block").is_empty());

        // Ticks keep running without the departed hider
        router.tick_fast(&mut host);
        router.on_departure(&mut host, &alice);
    }

    #[test]
    fn test_hunters_and_lobby_strikes_ignored() {
        let (mut router, mut host) = lobby(2);
        router.on_strike(&mut host, &pid("Alice"), "stone", Position::ORIGIN);
        assert!(host.entities_with_tag("block").is_empty());

        let roles = start(&mut router, &mut host);
        let hunter = roles.hunters.iter().next().unwrap().clone();
        router.on_strike(&mut host, &hunter, "stone", Position::ORIGIN);
        assert!(host.entities_with_tag("block").is_empty());
        assert!(host.messages(&hunter).is_empty());
    }

    #[test]
    fn test_offline_participant_does_not_block_tick() {
        let (mut router, mut host) = lobby(8);
        router.on_menu_select(&mut host, &pid("Alice"), MenuSelection::HunterCount(1));
        let roles = start(&mut router, &mut host);

        let hiders: Vec<_> = roles.hiders.iter().cloned().collect();
        for h in &hiders {
            router.on_strike(&mut host, h, "stone", Position::ORIGIN);
        }
        // One hider drops without a leave event
        host.disconnect(&hiders[0]);
        host.move_player(&hiders[1], Position::new(1.0, 2.0, 3.0));

        let report = router.tick_fast(&mut host);
        assert_eq!(report.followed, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(router.hiders().len(), 2);
    }
}
