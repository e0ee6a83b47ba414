use chrono::Local;
use log::{ error, info, warn };
use std::error::Error;
use std::io::Write;
use std::path::{ Path, PathBuf };
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{ AsyncBufReadExt, BufReader };
use crate::backend::{ new_backend, ChatBackend };
use crate::cli::{ Args, Command, SettingsCommand };
use crate::config::settings::{ self, Settings };
use crate::config::store::{ default_settings_path, FileStore };
use crate::config::ConfigError;
use crate::conversations::{ self, validate_conversation_id, ConversationClient, DEFAULT_LIST_LIMIT };
use crate::exchange::ExchangeClient;
use crate::export;
use crate::gap::{ render_overview, GapAnalysisClient, GapPanel };
use crate::history::format_transcript;
use crate::models::chat::Role;
use crate::session::{ Effect, Notification, NotificationLevel, Session, View };

type AppResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

const COMMANDS: [&str; 15] = [
    "/new",
    "/list",
    "/open",
    "/delete",
    "/gap",
    "/gap-all",
    "/export",
    "/testmode",
    "/fallback",
    "/settings",
    "/history",
    "/endpoint",
    "/status",
    "/help",
    "/quit",
];

const HELP: &str = "\
Commands:
  /new                 start a new chat
  /list                list recent conversations
  /open <id>           open a stored conversation
  /delete [id]         delete a conversation (default: the current one)
  /gap                 gap analysis of the current conversation
  /gap-all             gap analysis across all conversations
  /export              export the current transcript to a text file
  /testmode on|off     answer locally without calling the backend (saved)
  /fallback on|off     answer locally when the AI quota is exhausted (this session)
  /settings            show settings
  /history <n>         number of messages sent as context (saved)
  /endpoint <url>      backend base URL (saved)
  /status              check the backend
  /quit                exit
Anything else is sent as a chat message.";

/// Terminal adapter: owns the session and applies effects.
pub struct ChatApp {
    store: FileStore,
    settings: Settings,
    endpoint_override: Option<String>,
    fallback_delay: Duration,
    backend: Arc<dyn ChatBackend>,
    session: Session,
    gap_panel: GapPanel,
    interactive: bool,
}

fn print_notification(notification: &Notification) {
    let tag = match notification.level {
        NotificationLevel::Info => "info",
        NotificationLevel::Success => "ok",
        NotificationLevel::Warning => "warning",
        NotificationLevel::Error => "error",
    };
    eprintln!("[{}] {}", tag, notification.text);
}

fn has_error(effects: &[Effect]) -> Option<String> {
    effects.iter().find_map(|effect| match effect {
        Effect::Notify(n) if n.level == NotificationLevel::Error => Some(n.text.clone()),
        _ => None,
    })
}

fn parse_switch(arg: &str) -> Option<bool> {
    match arg.to_lowercase().as_str() {
        "on" | "true" | "yes" => Some(true),
        "off" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn closest_command(input: &str) -> Option<&'static str> {
    COMMANDS.iter()
        .map(|cmd| (*cmd, strsim::jaro_winkler(input, cmd)))
        .filter(|(_, score)| *score > 0.8)
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(cmd, _)| cmd)
}

impl ChatApp {
    pub fn new(args: &Args) -> Self {
        let path = args.settings_path.clone().unwrap_or_else(default_settings_path);
        info!("Settings file: {}", path.display());
        let store = FileStore::open(path);
        Self::with_store(store, args.endpoint.clone(), Duration::from_millis(args.fallback_delay_ms))
    }

    pub fn with_store(store: FileStore, endpoint_override: Option<String>, fallback_delay: Duration) -> Self {
        let settings = settings::load(&store);
        let mut effective = settings.clone();
        if let Some(url) = &endpoint_override {
            effective.endpoint_base_url = url.clone();
        }
        Self {
            store,
            backend: new_backend(&effective),
            settings,
            endpoint_override,
            fallback_delay,
            session: Session::new(),
            gap_panel: GapPanel::default(),
            interactive: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn effective_settings(&self) -> Settings {
        let mut effective = self.settings.clone();
        if let Some(url) = &self.endpoint_override {
            effective.endpoint_base_url = url.clone();
        }
        effective
    }

    /// Persists `updated` and only then adopts it. On failure the current
    /// settings and backend are kept.
    fn save_settings(&mut self, updated: Settings) -> Result<(), ConfigError> {
        settings::save(&mut self.store, &updated)?;
        self.settings = updated;
        self.backend = new_backend(&self.effective_settings());
        Ok(())
    }

    /// REPL flavour of `save_settings`: a write failure is reported, not fatal.
    fn update_settings(&mut self, updated: Settings) -> bool {
        match self.save_settings(updated) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to save settings to {}: {}", self.store.path().display(), e);
                eprintln!("[error] Could not save settings: {}", e);
                false
            }
        }
    }

    fn exchange_client(&self) -> ExchangeClient {
        ExchangeClient::new(self.backend.clone()).with_fallback_delay(self.fallback_delay)
    }

    fn conversation_client(&self) -> ConversationClient {
        ConversationClient::new(self.backend.clone())
    }

    fn gap_client(&self) -> GapAnalysisClient {
        GapAnalysisClient::new(self.backend.clone())
    }

    pub async fn run(&mut self, command: Option<Command>) -> AppResult<()> {
        match command {
            None | Some(Command::Chat) => self.run_interactive().await,
            Some(command) => self.run_command(command).await,
        }
    }

    async fn apply(&mut self, effects: Vec<Effect>, download_to: Option<&Path>) {
        for effect in effects {
            match effect {
                Effect::Notify(notification) => print_notification(&notification),
                Effect::Navigate(View::NewChat) => {
                    if self.interactive {
                        println!("--- New chat ---");
                    }
                }
                Effect::Navigate(View::Conversation(id)) => {
                    println!("--- Conversation {} ---", id);
                    print!("{}", format_transcript(self.session.transcript()));
                }
                Effect::Download { file_name, contents } => {
                    let path = download_to.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(&file_name));
                    match std::fs::write(&path, contents) {
                        Ok(()) => println!("Saved {}", path.display()),
                        Err(e) => {
                            error!("Failed to write {}: {}", path.display(), e);
                            eprintln!("[error] Could not write {}: {}", path.display(), e);
                        }
                    }
                }
                Effect::RefreshConversations => {
                    if self.interactive {
                        self.print_conversations(DEFAULT_LIST_LIMIT).await;
                    }
                }
                Effect::SuggestTestMode => {
                    if self.interactive {
                        eprintln!("[hint] Type /fallback on to answer with simulated responses while the quota recovers.");
                    } else {
                        eprintln!("[hint] Run `settings set --test-mode true` to use simulated responses.");
                    }
                }
            }
        }
    }

    async fn print_conversations(&self, limit: usize) {
        let list = self.conversation_client().list_recent(limit).await;
        println!("Recent conversations:");
        print!("{}", list.render(self.session.active_conversation_id()));
    }

    /// Sends `text` and prints the assistant messages it produced.
    async fn send(&mut self, text: &str) -> Vec<Effect> {
        let before = self.session.transcript().len();
        let settings = self.effective_settings();
        let client = self.exchange_client();
        if settings.test_mode_enabled {
            eprintln!("(test mode)");
        }
        let effects = client.send(text, &mut self.session, &settings).await;
        for message in &self.session.transcript()[before..] {
            if message.role == Role::Assistant {
                println!("[{}] Assistant: {}", message.timestamp, message.content);
            }
        }
        effects
    }

    pub async fn run_interactive(&mut self) -> AppResult<()> {
        self.interactive = true;
        let effective = self.effective_settings();
        println!("Chatbot client - backend {}", effective.endpoint_base_url);
        if effective.test_mode_enabled {
            println!("Test mode is on: replies are simulated locally.");
        } else if !self.conversation_client().probe().await {
            warn!("Backend at {} is not reachable", effective.endpoint_base_url);
            eprintln!(
                "[warning] Backend at {} is not reachable. Messages will fail until it is, or use /testmode on.",
                effective.endpoint_base_url
            );
        } else {
            self.print_conversations(DEFAULT_LIST_LIMIT).await;
        }
        println!("Type /help for commands.");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("> ");
            std::io::stdout().flush()?;
            let line = match lines.next_line().await? {
                Some(line) => line,
                None => break,
            };
            let line = line.trim();
            if line.starts_with('/') {
                if !self.handle_slash(line).await? {
                    break;
                }
            } else {
                let effects = self.send(line).await;
                self.apply(effects, None).await;
            }
        }
        Ok(())
    }

    /// Returns false when the user asked to quit.
    async fn handle_slash(&mut self, line: &str) -> AppResult<bool> {
        let mut parts = line.splitn(2, char::is_whitespace);
        let command = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::trim).unwrap_or_default();

        match command {
            "/quit" | "/exit" => {
                return Ok(false);
            }
            "/help" => println!("{}", HELP),
            "/new" => {
                let effects = conversations::new_chat(&mut self.session);
                self.apply(effects, None).await;
            }
            "/list" => self.print_conversations(DEFAULT_LIST_LIMIT).await,
            "/open" => {
                if arg.is_empty() {
                    eprintln!("[warning] Usage: /open <conversation id>");
                } else {
                    let max_history = self.settings.max_history_length;
                    let effects = self
                        .conversation_client()
                        .open_conversation(&mut self.session, arg, max_history).await;
                    self.apply(effects, None).await;
                }
            }
            "/delete" => {
                let target = if arg.is_empty() {
                    self.session.active_conversation_id().map(str::to_string)
                } else {
                    Some(arg.to_string())
                };
                match target {
                    Some(id) => {
                        let effects = self
                            .conversation_client()
                            .delete_conversation(&mut self.session, &id).await;
                        self.apply(effects, None).await;
                    }
                    None => eprintln!("[warning] No conversation to delete"),
                }
            }
            "/gap" => {
                let active = self.session.active_conversation_id().map(str::to_string);
                let client = self.gap_client();
                if active.is_some() {
                    println!("{}", GapPanel::Loading.render().trim_end());
                }
                let effects = client.fetch(active.as_deref(), &mut self.gap_panel).await;
                print!("{}", self.gap_panel.render());
                self.apply(effects, None).await;
            }
            "/gap-all" => {
                match self.gap_client().fetch_overview().await {
                    Ok(overview) => print!("{}", render_overview(&overview)),
                    Err(e) => eprintln!("[error] Gap analysis failed: {}", e),
                }
            }
            "/export" => {
                let effects = export::export(&self.session, Local::now().naive_local());
                self.apply(effects, None).await;
            }
            "/testmode" =>
                match parse_switch(arg) {
                    Some(enabled) => {
                        let updated = Settings { test_mode_enabled: enabled, ..self.settings.clone() };
                        if self.update_settings(updated) {
                            println!("Test mode {}", if enabled { "enabled" } else { "disabled" });
                        }
                    }
                    None => eprintln!("[warning] Usage: /testmode on|off"),
                }
            "/fallback" =>
                match parse_switch(arg) {
                    Some(enabled) => {
                        self.session.set_test_mode_active(enabled);
                        println!("Fallback mode {}", if enabled { "on" } else { "off" });
                    }
                    None => eprintln!("[warning] Usage: /fallback on|off"),
                }
            "/settings" => self.print_settings(),
            "/history" =>
                match arg.parse::<usize>() {
                    Ok(n) if n > 0 => {
                        let updated = Settings { max_history_length: n, ..self.settings.clone() };
                        if self.update_settings(updated) {
                            println!("History length set to {}", n);
                        }
                    }
                    _ => eprintln!("[warning] Usage: /history <positive number>"),
                }
            "/endpoint" => {
                if arg.is_empty() {
                    eprintln!("[warning] Usage: /endpoint <url>");
                } else {
                    let updated = Settings { endpoint_base_url: arg.to_string(), ..self.settings.clone() };
                    if self.update_settings(updated) {
                        if self.endpoint_override.is_some() {
                            println!("Endpoint saved; the --endpoint override still applies to this run.");
                        } else {
                            println!("Endpoint set to {}", arg);
                        }
                    }
                }
            }
            "/status" => {
                self.print_status().await;
            }
            other =>
                match closest_command(other) {
                    Some(suggestion) =>
                        eprintln!("[warning] Unknown command {}. Did you mean {}?", other, suggestion),
                    None => eprintln!("[warning] Unknown command {}. Type /help for commands.", other),
                }
        }
        Ok(true)
    }

    fn print_settings(&self) {
        println!("Settings file: {}", self.store.path().display());
        println!("Endpoint: {}", self.settings.endpoint_base_url);
        if let Some(url) = &self.endpoint_override {
            println!("Endpoint override (this run): {}", url);
        }
        println!("Max history length: {}", self.settings.max_history_length);
        println!("Test mode: {}", self.settings.test_mode_enabled);
        println!("Fallback mode (session): {}", self.session.test_mode_active());
        println!("Quota exceeded: {}", self.session.quota_exceeded());
    }

    async fn print_status(&self) -> bool {
        let url = self.effective_settings().endpoint_base_url;
        let alive = self.conversation_client().probe().await;
        println!("Backend {}: {}", url, if alive { "reachable" } else { "unreachable" });
        alive
    }

    async fn run_command(&mut self, command: Command) -> AppResult<()> {
        match command {
            Command::Chat => self.run_interactive().await?,
            Command::Send { message, conversation } => {
                if let Some(id) = conversation.as_deref() {
                    validate_conversation_id(id)?;
                    self.session.adopt_conversation(id);
                }
                let effects = self.send(&message).await;
                let failed = has_error(&effects);
                self.apply(effects, None).await;
                if let Some(id) = self.session.active_conversation_id() {
                    eprintln!("conversation: {}", id);
                }
                if let Some(e) = failed {
                    return Err(e.into());
                }
            }
            Command::List { limit } => self.print_conversations(limit).await,
            Command::Show { conversation_id } => {
                self.open(&conversation_id).await?;
            }
            Command::Delete { conversation_id } => {
                validate_conversation_id(&conversation_id)?;
                let effects = self
                    .conversation_client()
                    .delete_conversation(&mut self.session, &conversation_id).await;
                self.apply(effects, None).await;
                println!("Delete requested for {}", conversation_id);
            }
            Command::Gap { conversation_id } => {
                validate_conversation_id(&conversation_id)?;
                let effects = self
                    .gap_client()
                    .fetch(Some(&conversation_id), &mut self.gap_panel).await;
                print!("{}", self.gap_panel.render());
                self.apply(effects, None).await;
                if let GapPanel::Error(e) = &self.gap_panel {
                    return Err(e.clone().into());
                }
            }
            Command::GapAll => {
                let overview = self.gap_client().fetch_overview().await?;
                print!("{}", render_overview(&overview));
            }
            Command::Export { conversation_id, output } => {
                self.open(&conversation_id).await?;
                let effects = export::export(&self.session, Local::now().naive_local());
                let failed = effects
                    .iter()
                    .all(|e| !matches!(e, Effect::Download { .. }));
                self.apply(effects, output.as_deref()).await;
                if failed {
                    return Err("nothing to export".into());
                }
            }
            Command::Status => {
                if !self.print_status().await {
                    return Err("backend unreachable".into());
                }
            }
            Command::Settings { action: SettingsCommand::Show } => self.print_settings(),
            Command::Settings { action: SettingsCommand::Set { endpoint, max_history, test_mode } } => {
                let mut updated = self.settings.clone();
                if let Some(url) = endpoint {
                    updated.endpoint_base_url = url;
                }
                if let Some(n) = max_history {
                    if n == 0 {
                        return Err("max history must be a positive number".into());
                    }
                    updated.max_history_length = n;
                }
                if let Some(enabled) = test_mode {
                    updated.test_mode_enabled = enabled;
                }
                self.save_settings(updated)?;
                self.print_settings();
            }
        }
        Ok(())
    }

    async fn open(&mut self, conversation_id: &str) -> AppResult<()> {
        let max_history = self.settings.max_history_length;
        let effects = self
            .conversation_client()
            .open_conversation(&mut self.session, conversation_id, max_history).await;
        let failed = effects.iter().find_map(|effect| match effect {
            Effect::Notify(n) if n.level != NotificationLevel::Success => Some(n.text.clone()),
            _ => None,
        });
        self.apply(effects, None).await;
        match failed {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}
