//! Prop Hunt Server
//!
//! Demo driver for the session core. Plays one scripted round against the
//! in-memory host: the owner opens the setup menu, picks two hunters and
//! starts, hiders disguise, one hider leaves.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::Context;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use prop_hunt::{
    VERSION, TICK_RATE,
    config::GameConfig,
    core::rng::{derive_round_seed, DeterministicRng},
    game::state::ParticipantId,
    host::{FormResponse, SimulatedHost},
    session::{EventRouter, GameLoop, HostEvent},
    Position,
};

const PLAYERS: [&str; 5] = ["Alice", "Bob", "Carol", "Dave", "Erin"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Prop Hunt Server v{}", VERSION);

    let config = load_config()?;
    info!(
        "Tick Rate: {} Hz, fast clock every {} ticks, slow clock every {} ticks",
        config.tick_rate_hz, config.fast_interval_ticks, config.slow_interval_ticks,
    );
    if config.tick_rate_hz != TICK_RATE {
        info!("Overriding default tick rate of {} Hz", TICK_RATE);
    }

    demo_round(config).await;
    Ok(())
}

/// Read `PROP_HUNT_CONFIG` if set, defaults otherwise.
fn load_config() -> anyhow::Result<GameConfig> {
    match std::env::var("PROP_HUNT_CONFIG") {
        Ok(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config {}", path))?;
            let config = GameConfig::from_json_str(&json)
                .with_context(|| format!("Invalid config {}", path))?;
            info!("Loaded config from {}", path);
            Ok(config)
        }
        Err(_) => Ok(GameConfig::default()),
    }
}

async fn demo_round(config: GameConfig) {
    info!("=== Starting Demo Round ===");

    let mut host = SimulatedHost::new();
    for (i, name) in PLAYERS.iter().enumerate() {
        host.connect(*name, Position::new(i as f64 * 3.0, 70.0, 0.0));
    }

    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    let seed = derive_round_seed(nonce, &PLAYERS);
    info!("Round nonce {} -> seed {:#018x}", nonce, seed);

    let router = EventRouter::new(config.clone(), DeterministicRng::new(seed));
    let (tx, rx) = mpsc::channel(64);

    let script = tokio::spawn(async move {
        let owner = ParticipantId::from(PLAYERS[0]);
        let step = Duration::from_millis(250);
        let open_menu = HostEvent::ItemUsed {
            participant: owner.clone(),
            item_type: config.admin_item_type.clone(),
            item_name: config.admin_item_name.clone(),
        };
        let answer = |form_id, index| HostEvent::FormAnswered {
            participant: owner.clone(),
            response: FormResponse::Selected { form_id, index },
        };

        // Forms are numbered from 1 in the order they are shown
        let events = vec![
            open_menu.clone(),
            answer(1, 1),
            answer(2, 1),
            open_menu,
            answer(3, 2),
        ];
        for event in events {
            sleep(step).await;
            if tx.send(event).await.is_err() {
                return;
            }
        }

        // Everyone hits a block; only hiders disguise, the second hit is on cooldown
        for block in ["minecraft:stone", "minecraft:oak_log"] {
            for name in PLAYERS {
                let strike = HostEvent::BlockStruck {
                    participant: ParticipantId::from(name),
                    block_id: block.to_string(),
                    at: Position::new(100.0, -60.0, 100.0),
                };
                if tx.send(strike).await.is_err() {
                    return;
                }
            }
            sleep(step * 2).await;
        }

        let _ = tx.send(HostEvent::Departed(owner)).await;
        sleep(step).await;
    });

    let (router, host) = GameLoop::new(router, host).run(rx).await;
    if let Err(e) = script.await {
        info!("Script task ended early: {}", e);
    }

    info!("=== Round Summary ===");
    if let Some(roles) = router.state().assignment() {
        info!("Hunters: {:?}", roles.hunters);
        info!("Hiders: {:?}", roles.hiders);
    }
    for (id, record) in router.hiders().iter() {
        info!(
            "{}: cooldown {}, disguise {:?}, hearts {}",
            id,
            record.cooldown_ticks(),
            record.block_id(),
            record.hearts_remaining(),
        );
    }
    info!("Proxies destroyed: {}", host.killed().len());
}
