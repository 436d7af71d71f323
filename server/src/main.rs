use anyhow::{Result, ensure};
use clap::Parser;
use tokio::{
    sync::mpsc::unbounded_channel,
    time::{self, Duration, Instant, MissedTickBehavior},
};
use tracing::{info, warn};

use server::{
    build_app,
    config::{ServerConfig, init_tracing},
    console::spawn_console,
    constants::{DEFAULT_LOG_FILTER, TICK_RATE_HZ},
    observers::observer_links_task,
    resources::{SchedulerState, ShutdownRequested},
};

// ============================================================================
// CLI Argument Parsing
// ============================================================================

#[derive(Parser)]
#[command(author, version, about = "Pyre fake entity projectile server", long_about = None)]
struct Args {
    // Player whose blaze rod and flint and steel drive the effects
    #[arg(long)]
    admin: Option<String>,

    // Ticks per second
    #[arg(long, default_value_t = TICK_RATE_HZ)]
    tick_rate: u32,

    // Height of a flat solid ground plane (no ground if unset)
    #[arg(long, allow_negative_numbers = true)]
    ground_level: Option<f32>,

    // Log filter, overridden by RUST_LOG
    #[arg(long, default_value = DEFAULT_LOG_FILTER)]
    log_filter: String,

    // Stop after this many loop iterations
    #[arg(long)]
    max_ticks: Option<u64>,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            admin: args.admin,
            tick_rate: args.tick_rate,
            ground_level: args.ground_level,
            log_filter: args.log_filter,
            max_ticks: args.max_ticks,
        }
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::from(Args::parse());
    init_tracing(&config.log_filter)?;
    ensure!(config.tick_rate > 0, "tick rate must be positive");

    if config.admin.is_none() {
        warn!("no --admin given, launch and breath are disabled");
    }

    // Channel for sending from the console thread to the server
    let (to_server, from_console) = unbounded_channel();
    // Channel for handing new observer streams to the observer tasks
    let (to_observers, from_server) = unbounded_channel();

    spawn_console(to_server)?;
    tokio::spawn(observer_links_task(from_server));

    let tick_rate = config.tick_rate;
    let max_ticks = config.max_ticks;
    let mut app = build_app(config, from_console, to_observers);

    info!("starting server loop at {} Hz...", tick_rate);

    // Run the app in a loop manually at the tick rate
    let tick_duration = Duration::from_nanos(1_000_000_000 / u64::from(tick_rate));
    let mut interval = time::interval(tick_duration);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut frame: u64 = 0;
    loop {
        interval.tick().await;

        let update_start = Instant::now();
        app.update();
        let update_elapsed = update_start.elapsed();

        if update_elapsed > tick_duration {
            warn!(
                "tick {} took {:.2}ms (exceeded {:.2}ms budget)",
                frame,
                update_elapsed.as_secs_f64() * 1000.0,
                tick_duration.as_secs_f64() * 1000.0
            );
        }

        frame += 1;
        if app.world().resource::<ShutdownRequested>().0 || max_ticks.is_some_and(|max| frame >= max) {
            break;
        }
    }

    let scheduled = app.world().resource::<SchedulerState>().ticks();
    info!("server stopped after {} frames ({} scheduled ticks)", frame, scheduled);
    Ok(())
}
