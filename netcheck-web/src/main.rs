//! netcheck HTTP server.
//!
//! Serves `GET {prefix}/portcheck`, `GET {prefix}/lookup` and `GET {prefix}/health`.

mod config;
mod error;
mod gateway;
mod handlers;
mod logging;
mod middleware;
mod routes;

use actix_web::{App, HttpServer};
use anyhow::Context;

use config::{AppConfig, ConfigError};
use middleware::RequestTrace;
use routes::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config_path = config::config_path();
    let (config, from_file) = match AppConfig::load_from_path(&config_path) {
        Ok(config) => (config, true),
        Err(ConfigError::FileNotFound(_)) => (AppConfig::default(), false),
        Err(e) => {
            return Err(e).with_context(|| format!("loading {}", config_path.display()));
        }
    };

    let _log_guard = logging::init(&config.log).context("initializing logging")?;

    if from_file {
        tracing::info!("Loaded configuration from {}", config_path.display());
    } else {
        tracing::warn!(
            "No configuration file at {}, using defaults",
            config_path.display()
        );
    }

    let state = AppState::from_config(&config);
    let prefix = config.server.route_prefix.clone();
    let address = (config.server.bind.clone(), config.server.port);

    tracing::info!(
        "Starting netcheck on {}:{} ({} workers, prefix {:?})",
        address.0,
        address.1,
        config.server.workers,
        prefix
    );

    HttpServer::new(move || {
        let state = state.clone();
        let prefix = prefix.clone();
        App::new()
            .wrap(RequestTrace)
            .configure(move |cfg| routes::configure(cfg, state, &prefix))
    })
    .workers(config.server.workers)
    .bind(&address)
    .with_context(|| format!("binding {}:{}", address.0, address.1))?
    .run()
    .await
    .context("server terminated with an error")?;

    tracing::info!("netcheck stopped");
    Ok(())
}

#[cfg(test)]
#[path = "test_mocks.rs"]
mod test_mocks;
