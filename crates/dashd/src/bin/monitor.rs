//! dash-monitor - headless display surface.
//!
//! Subscribes to the distribution server and renders the derived display
//! values as log lines. Typing `v` (then enter) toggles between the
//! dashboard view and the shutdown-circuit diagnostic view, mirroring
//! the single toggle keystroke of the real display.

use anyhow::Result;
use clap::Parser;
use dash_client::{Subscription, SubscriptionState};
use dash_core::derive;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

/// Headless telemetry monitor
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via DASHD_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
    /// Render interval in milliseconds
    #[arg(long, default_value_t = 500)]
    render_interval_ms: u64,
}

/// The active display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Dashboard,
    ShutdownCircuit,
}

impl View {
    fn toggle(self) -> Self {
        match self {
            View::Dashboard => View::ShutdownCircuit,
            View::ShutdownCircuit => View::Dashboard,
        }
    }
}

fn render(view: View, state: &SubscriptionState) {
    let snapshot = state.snapshot();
    let snapshot = snapshot.as_ref();
    match view {
        View::Dashboard => {
            info!(
                connected = state.is_connected(),
                speed = derive::speed(snapshot),
                soc = derive::pack_soc(snapshot),
                cell_temp = derive::cell_temp(snapshot),
                draw = derive::draw_gauge(snapshot),
                "dashboard"
            );
        }
        View::ShutdownCircuit => {
            let legs = derive::shutdown_legs(snapshot);
            let segments: Vec<bool> = derive::SEGMENTS
                .iter()
                .map(|&(a, b)| derive::segment_healthy(&legs, a, b))
                .collect();
            info!(
                connected = state.is_connected(),
                legs = ?legs.0,
                segments = ?segments,
                all_healthy = legs.all_healthy(),
                "shutdown circuit"
            );
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    dashd::init_logging();

    let config = dashd::AppConfig::load(args.config.as_deref())?;
    info!(url = %config.client.url, "Starting dash-monitor");

    let subscription = Arc::new(Subscription::new(config.client));
    let state = subscription.state();

    let runner = {
        let subscription = subscription.clone();
        tokio::spawn(async move { subscription.run().await })
    };

    let mut view = View::Dashboard;
    let mut render_tick = tokio::time::interval(Duration::from_millis(args.render_interval_ms));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupt received, closing subscription");
                break;
            }
            _ = render_tick.tick() => {
                render(view, &state);
            }
            line = lines.next_line() => {
                match line? {
                    Some(input) if input.trim() == "v" => {
                        view = view.toggle();
                        info!(?view, "View toggled");
                    }
                    Some(_) => {}
                    None => break, // stdin closed
                }
            }
        }
    }

    subscription.close();
    let _ = runner.await;
    Ok(())
}
