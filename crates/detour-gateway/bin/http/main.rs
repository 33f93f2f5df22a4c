mod cli;

use std::sync::Arc;

use crate::cli::{StorageBackendArg, CLI};
use anyhow::Context;
use clap::Parser;
use detour_admin::{Catalog, RedirectAdmin, ValidationOptions};
use detour_core::RedirectStorage;
use detour_gateway::{App, AppState, GatewaySettings};
use detour_storage::{InMemoryRedirectStorage, MySqlRedirectStorage};
use regex::Regex;
use tracing::info;

fn load_catalog(path: Option<&std::path::Path>) -> anyhow::Result<Catalog> {
    let mut catalog = Catalog::english();
    if let Some(path) = path {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog {}", path.display()))?;
        catalog
            .merge_json(&json)
            .with_context(|| format!("failed to parse catalog {}", path.display()))?;
        info!(catalog = %path.display(), labels = catalog.len(), "loaded message catalog");
    }
    Ok(catalog)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::try_parse()?;
    detour_telemetry::init(config.log_format)?;

    info!(
        listen_addr = %config.listen_addr,
        storage_backend = %config.storage,
        "starting detour gateway"
    );

    let storage: Arc<dyn RedirectStorage> = match config.storage {
        StorageBackendArg::InMemory => Arc::new(InMemoryRedirectStorage::new()),
        StorageBackendArg::Mysql => {
            let mysql_dsn = config
                .mysql_dsn
                .as_deref()
                .context("mysql dsn is required when storage backend is mysql")?;
            Arc::new(MySqlRedirectStorage::connect(mysql_dsn).await?)
        }
    };

    let options = ValidationOptions::builder()
        .source_uri_path(
            Regex::new(&config.source_uri_path_pattern)
                .context("invalid source uri path pattern")?,
        )
        .default_status_code(config.default_status_code)
        .build();
    let catalog = load_catalog(config.catalog.as_deref())?;
    let admin = RedirectAdmin::new(storage, catalog, options);

    let state = AppState::new(
        admin,
        GatewaySettings {
            account: config.account,
            csrf_token: config.csrf_token,
            show_hit_count: config.show_hit_count,
            hosts: config.hosts,
        },
    );

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "serving redirect administration");
    axum::serve(listener, App::router(state)).await?;

    Ok(())
}
