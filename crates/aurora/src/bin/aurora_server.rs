//! Headless AURORA server runner.
//!
//! Wires the registry, screen service, and outbound queue together and
//! drives the synchronization engine at the configured tick rate. Without a
//! transport attached, a drain thread logs outbound packets at trace level;
//! a real deployment replaces it with the send path.

use std::path::PathBuf;
use std::sync::Arc;

use aurora::{AllViewersReachable, ChannelSink, HudConfig, ScreenService, TickLoop};
use aurora_gui::WidgetRegistry;
use tracing::{info, trace, warn};
use tracing_subscriber::EnvFilter;

/// Ticks between periodic statistics reports (one minute at 20Hz).
const STATS_INTERVAL_TICKS: u64 = 1200;

fn load_config() -> HudConfig {
    match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => match HudConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "config unusable; running on defaults");
                HudConfig::default()
            }
        },
        None => HudConfig::default(),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = load_config();
    info!(
        tick_rate = config.tick_rate,
        outbound_capacity = config.outbound_capacity,
        protocol_revision = config.protocol_revision,
        "aurora server starting"
    );

    let registry = Arc::new(WidgetRegistry::new());
    let (sink, outbound) = ChannelSink::bounded(config.outbound_capacity);
    let service = Arc::new(ScreenService::new(
        registry,
        sink,
        config.protocol_revision,
    ));

    // Stand-in transport: drain the queue so the core never sees it full.
    std::thread::spawn(move || {
        for packet in outbound {
            trace!(viewer = packet.viewer.0, packet = ?packet.packet, "outbound");
        }
    });

    let mut ticker = TickLoop::new(config.tick_rate);
    let roster = AllViewersReachable;
    loop {
        while ticker.should_tick() {
            let start = ticker.begin_tick();
            let summary = service.run_tick(&roster);
            ticker.end_tick(start);

            if ticker.tick_count() % STATS_INTERVAL_TICKS == 0 {
                let stats = ticker.stats();
                info!(
                    ticked = summary.ticked,
                    skipped = summary.skipped,
                    avg_tick_us = stats.avg_tick_us,
                    max_tick_us = stats.max_tick_us,
                    late_ticks = stats.late_ticks,
                    "tick statistics"
                );
            }
        }
        ticker.wait_for_next_tick();
    }
}
