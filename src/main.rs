/*
 *  main.rs
 *
 *  LCDvu - worth the squeeze
 *	(c) 2020-26 Stuart Hunter
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

use clap::Parser;
use env_logger::Env;
use log::{info, warn};

#[cfg(unix)] // Only compile this block on Unix-like systems
use tokio::signal::unix::{signal, SignalKind}; // Import specific Unix signals

use lcdvu::config::{self, Cli};
use lcdvu::display::DisplayDriverFactory;
use lcdvu::meter::{Meter, MeterSettings};
use lcdvu::mixer::VolumeSampler;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Waits for SIGINT, SIGTERM or SIGHUP. The plugin host stops us with
/// SIGTERM, a console user with Ctrl-C.
#[cfg(unix)]
async fn signal_handler() {
    let handlers = (
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
        signal(SignalKind::hangup()),
    );
    let (mut sigint, mut sigterm, mut sighup) = match handlers {
        (Ok(int), Ok(term), Ok(hup)) => (int, term, hup),
        _ => {
            warn!("Unix signal handlers unavailable, falling back to Ctrl-C");
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Ctrl-C handler failed: {}", e);
                std::future::pending::<()>().await;
            }
            return;
        }
    };

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
}

#[cfg(not(unix))]
async fn signal_handler() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Ctrl-C handler failed: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Ctrl-C received. Initiating graceful shutdown.");
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = config::load(&cli)?;

    if cli.dump_config {
        println!("{}", config::dump(&cfg)?);
        return Ok(());
    }

    // Initialize the logger with the configured level, RUST_LOG still wins
    let level = cfg.log_level.clone().unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();

    info!("This {} worth the Squeeze", env!("CARGO_PKG_NAME"));
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);

    let display_config = cfg.display();
    let display = DisplayDriverFactory::create_from_config(&display_config)?;
    let sampler = VolumeSampler::from_config(&cfg.mixer());
    let settings = MeterSettings::from_config(&cfg.meter()).with_backlight(display_config.backlight());

    let mut meter = Meter::new(display, sampler, settings);
    meter.run(signal_handler()).await?;

    info!("Main application exiting.");
    Ok(())
}
