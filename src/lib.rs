pub mod app;
pub mod backend;
pub mod cli;
pub mod config;
pub mod conversations;
pub mod error;
pub mod exchange;
pub mod export;
pub mod fallback;
pub mod gap;
pub mod history;
pub mod models;
pub mod session;

use app::ChatApp;
use cli::Args;
use log::debug;
use std::error::Error;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    debug!("--- Client Configuration ---");
    debug!("Endpoint Override: {}", args.endpoint.as_deref().unwrap_or("(none)"));
    debug!(
        "Settings Path: {}",
        args.settings_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(default)".to_string())
    );
    debug!("Fallback Delay: {}ms", args.fallback_delay_ms);
    debug!("----------------------------");

    let mut app = ChatApp::new(&args);
    app.run(args.command.clone()).await
}
