mod error;
mod level;
mod net;
mod physics;
mod policy;
mod spawn;
mod state;
mod tire;
mod vehicle;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};
use tracing::info;

use crate::level::Level;
use crate::net::start_websocket_server;
use crate::physics::PhysicsWorld;
use crate::policy::{PathFollowerPolicy, SteeringPolicy};
use crate::spawn::SpawnManager;
use crate::state::SharedGameState;
use crate::vehicle::RALLY_CAR;

/// Top-down arcade rally physics server.
#[derive(Parser, Debug)]
#[command(version, about)]
struct CliArgs {
    /// Address the WebSocket server listens on.
    #[arg(long, default_value = "0.0.0.0:9001")]
    bind: String,

    /// JSON level file. The built-in oval is used when omitted.
    #[arg(long)]
    level: Option<PathBuf>,

    /// Number of AI path-follower cars spawned at startup.
    #[arg(long, default_value_t = 3)]
    ai_cars: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    let args = CliArgs::parse();
    info!(?args, "starting rally server");

    let level = match &args.level {
        Some(path) => Level::load(path)?,
        None => Level::default_track(),
    };

    let mut physics = PhysicsWorld::new(&level)?;
    let mut spawns = SpawnManager::new(level.spawn_points.clone());

    // AI drivers share one path; a level without one fails here.
    if args.ai_cars > 0 {
        let path = level.path()?;
        info!(waypoints = path.len(), ai_cars = args.ai_cars, "spawning AI drivers");
        for i in 0..args.ai_cars {
            let Some(slot) = spawns.allocate() else {
                break;
            };
            let policy = SteeringPolicy::PathFollower(PathFollowerPolicy::new(
                Arc::clone(&path),
                RALLY_CAR.limits(),
                level.slow_zone,
            ));
            physics.spawn_vehicle(&format!("ai-{i}"), RALLY_CAR, slot.point, policy)?;
        }
    }

    let state = Arc::new(Mutex::new(SharedGameState::new(spawns)));
    let physics = Arc::new(Mutex::new(physics));

    // Start WebSocket server
    let listener = TcpListener::bind(&args.bind).await?;
    tokio::spawn(start_websocket_server(
        listener,
        Arc::clone(&state),
        Arc::clone(&physics),
    ));

    // Fixed timestep: 60 Hz. PhysicsWorld clamps slow frames.
    let mut ticker = interval(Duration::from_secs_f64(1.0 / f64::from(RALLY_CAR.tick_rate_hz)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last = Instant::now();

    loop {
        ticker.tick().await;
        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f32();
        last = now;

        let mut phys = physics.lock().await;
        let mut game = state.lock().await;

        phys.step(dt);

        // Advance tick + broadcast snapshot
        game.tick += 1;
        let vehicles = phys.snapshot();
        game.broadcast_snapshot(vehicles);
    }
}
