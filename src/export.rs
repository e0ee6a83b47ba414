use chrono::NaiveDateTime;
use crate::error::ClientError;
use crate::session::{ Effect, Session };

pub const EXPORT_TITLE: &str = "Chat Conversation Export";
const SEPARATOR_WIDTH: usize = 50;

/// Renders the transcript as a flat text document. Output depends only on
/// the session and `generated_at`.
pub fn serialize(session: &Session, generated_at: NaiveDateTime) -> Result<String, ClientError> {
    if session.transcript().is_empty() {
        return Err(ClientError::Validation("No messages to export".to_string()));
    }

    let mut out = String::new();
    out.push_str(EXPORT_TITLE);
    out.push('\n');
    out.push_str(&format!("Generated: {}\n", generated_at.format("%Y-%m-%d %H:%M:%S")));
    out.push_str(
        &format!(
            "Conversation ID: {}\n",
            session.active_conversation_id().unwrap_or("N/A")
        )
    );
    out.push_str(&format!("{}\n", "=".repeat(SEPARATOR_WIDTH)));
    out.push('\n');

    for message in session.transcript() {
        out.push_str(
            &format!(
                "[{}] {}:\n{}\n\n",
                message.timestamp,
                message.role.display_name(),
                message.content
            )
        );
    }
    Ok(out)
}

pub fn export_file_name(generated_at: NaiveDateTime) -> String {
    format!("chat-export-{}.txt", generated_at.format("%Y%m%d-%H%M%S"))
}

pub fn export(session: &Session, now: NaiveDateTime) -> Vec<Effect> {
    match serialize(session, now) {
        Ok(contents) =>
            vec![
                Effect::Download { file_name: export_file_name(now), contents },
                Effect::success("Conversation exported")
            ],
        Err(e) => vec![Effect::warning(e.to_string())],
    }
}
