pub mod block;
pub mod config;
pub mod focus;
pub mod run;
pub mod stats;
pub mod timer;

use std::error::Error;
use std::sync::Arc;

use deepfocus_core::{
    Broadcaster, Config, Database, FocusService, ServiceOptions, Store, TracingNotifier,
};
use serde::Serialize;

pub type CliResult = Result<(), Box<dyn Error>>;

/// Service over the on-disk store.
pub fn open_service(config: &Config) -> Result<FocusService, Box<dyn Error>> {
    let store: Arc<dyn Store> = Arc::new(Database::open()?);
    let service = FocusService::new(
        store,
        Broadcaster::new(),
        Arc::new(TracingNotifier),
        ServiceOptions::from(config),
    )?;
    Ok(service)
}

pub fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One compact JSON document per line, for streaming output.
pub fn print_json_line<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

pub fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
}
