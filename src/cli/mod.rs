use clap::{ Parser, Subcommand };
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Backend base URL for this run only (e.g., http://localhost:8000/api). Not saved.
    #[arg(long, env = "CHATBOT_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Path to the settings file. Defaults to <config dir>/chatbot-client/settings.json.
    #[arg(long, env = "CHATBOT_SETTINGS_PATH")]
    pub settings_path: Option<PathBuf>,

    /// Simulated delay in milliseconds before a test-mode reply.
    #[arg(long, env = "CHATBOT_FALLBACK_DELAY_MS", default_value = "500")]
    pub fallback_delay_ms: u64,

    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Interactive chat (the default).
    Chat,
    /// Send one message and print the reply.
    Send {
        message: String,
        /// Continue an existing conversation.
        #[arg(long)]
        conversation: Option<String>,
    },
    /// List recent conversations.
    List {
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Print a stored conversation.
    Show {
        conversation_id: String,
    },
    /// Delete a stored conversation.
    Delete {
        conversation_id: String,
    },
    /// Gap analysis report for one conversation.
    Gap {
        conversation_id: String,
    },
    /// Gap analysis across all stored conversations.
    GapAll,
    /// Export a stored conversation to a text file.
    Export {
        conversation_id: String,
        /// Output file. Defaults to chat-export-<timestamp>.txt in the current directory.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Check that the backend is reachable.
    Status,
    /// Show or change persisted settings.
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommand {
    Show,
    Set {
        #[arg(long)]
        endpoint: Option<String>,
        #[arg(long)]
        max_history: Option<usize>,
        #[arg(long)]
        test_mode: Option<bool>,
    },
}
