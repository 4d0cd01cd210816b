//! Game-loop driver.
//!
//! Owns the router and the host and feeds them from two clocks plus a
//! channel of host callbacks. Everything runs on one task, so every
//! callback finishes before the next one starts.

use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::core::position::Position;
use crate::core::rng::RandomSource;
use crate::game::state::ParticipantId;
use crate::host::{FormResponse, GameHost};
use crate::session::router::EventRouter;

/// Host callbacks delivered to the driver.
#[derive(Clone, Debug, PartialEq)]
pub enum HostEvent {
    /// A participant connected.
    Arrived(ParticipantId),
    /// A participant is leaving.
    Departed(ParticipantId),
    /// A participant hit a block.
    BlockStruck {
        /// Who hit it
        participant: ParticipantId,
        /// Block type id
        block_id: String,
        /// Striker's position
        at: Position,
    },
    /// A participant used an item.
    ItemUsed {
        /// Who used it
        participant: ParticipantId,
        /// Item type id
        item_type: String,
        /// Item name tag
        item_name: String,
    },
    /// A form was answered or closed.
    FormAnswered {
        /// Who answered
        participant: ParticipantId,
        /// The answer
        response: FormResponse,
    },
}

/// Top-level loop owning one session.
pub struct GameLoop<H: GameHost, R: RandomSource> {
    router: EventRouter<R>,
    host: H,
}

impl<H: GameHost, R: RandomSource> GameLoop<H, R> {
    /// Pair a router with the host it drives.
    pub fn new(router: EventRouter<R>, host: H) -> Self {
        Self { router, host }
    }

    /// Route one host callback.
    pub fn dispatch(&mut self, event: HostEvent) {
        let host = &mut self.host;
        match event {
            HostEvent::Arrived(id) => self.router.on_arrival(host, &id),
            HostEvent::Departed(id) => self.router.on_departure(host, &id),
            HostEvent::BlockStruck { participant, block_id, at } => {
                self.router.on_strike(host, &participant, &block_id, at);
            }
            HostEvent::ItemUsed { participant, item_type, item_name } => {
                self.router.on_item_use(host, &participant, &item_type, &item_name);
            }
            HostEvent::FormAnswered { participant, response } => {
                self.router.on_form_response(host, &participant, response);
            }
        }
    }

    /// Run until the event channel closes, then hand back router and host.
    ///
    /// Clock ticks are polled before events, and both clocks fire once
    /// immediately, so arrivals are welcomed before the first callback is
    /// routed.
    pub async fn run(mut self, mut events: mpsc::Receiver<HostEvent>) -> (EventRouter<R>, H) {
        let config = self.router.config().clone();
        let mut fast = interval(config.fast_period());
        let mut slow = interval(config.slow_period());
        fast.set_missed_tick_behavior(MissedTickBehavior::Skip);
        slow.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            "Session {} running (fast {:?}, slow {:?})",
            self.router.id(),
            config.fast_period(),
            config.slow_period(),
        );

        loop {
            tokio::select! {
                biased;

                _ = fast.tick() => {
                    let report = self.router.tick_fast(&mut self.host);
                    if report.skipped > 0 {
                        debug!("Fast tick skipped {} proxies", report.skipped);
                    }
                }
                _ = slow.tick() => {
                    self.router.tick_slow(&mut self.host);
                }
                event = events.recv() => match event {
                    Some(event) => self.dispatch(event),
                    None => break,
                },
            }
        }

        info!("Session {} event channel closed", self.router.id());
        (self.router, self.host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::core::rng::DeterministicRng;
    use crate::game::state::Phase;
    use crate::host::SimulatedHost;

    fn pid(name: &str) -> ParticipantId {
        ParticipantId::from(name)
    }

    #[tokio::test]
    async fn test_loop_runs_a_round() {
        let mut host = SimulatedHost::new();
        for name in ["Alice", "Bob", "Carol"] {
            host.connect(name, Position::ORIGIN);
        }
        let router = EventRouter::new(GameConfig::default(), DeterministicRng::new(21));
        let (tx, rx) = mpsc::channel(16);

        tx.send(HostEvent::ItemUsed {
            participant: pid("Alice"),
            item_type: "minecraft:compass".to_string(),
            item_name: "Admin Compass".to_string(),
        })
        .await
        .unwrap();
        // First form shown by a fresh router has id 1; button 2 starts
        tx.send(HostEvent::FormAnswered {
            participant: pid("Alice"),
            response: FormResponse::Selected { form_id: 1, index: 2 },
        })
        .await
        .unwrap();
        tx.send(HostEvent::BlockStruck {
            participant: pid("Alice"),
            block_id: "minecraft:stone".to_string(),
            at: Position::ORIGIN,
        })
        .await
        .unwrap();
        tx.send(HostEvent::Departed(pid("Alice"))).await.unwrap();
        drop(tx);

        let (router, host) = GameLoop::new(router, host).run(rx).await;

        assert_eq!(router.state().phase(), Phase::Running);
        assert!(router.state().assignment().unwrap().is_hider(&pid("Alice")));
        assert!(!router.hiders().contains(&pid("Alice")));
        assert_eq!(host.killed().len(), 1);
    }

    #[test]
    fn test_dispatch_without_runtime() {
        let mut host = SimulatedHost::new();
        host.connect("Alice", Position::ORIGIN);
        let router = EventRouter::new(GameConfig::default(), DeterministicRng::new(1));
        let mut game = GameLoop::new(router, host);

        game.dispatch(HostEvent::Arrived(pid("Alice")));
        assert!(game.router.is_welcomed(&pid("Alice")));
        assert_eq!(game.router.state().owner(), Some(&pid("Alice")));
    }
}
