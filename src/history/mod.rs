use crate::models::chat::{ ChatMessage, HistoryEntry };

/// The last `max_len` transcript entries as role/content pairs, oldest first.
pub fn assemble_context(transcript: &[ChatMessage], max_len: usize) -> Vec<HistoryEntry> {
    let start = transcript.len().saturating_sub(max_len);
    transcript[start..].iter().map(HistoryEntry::from).collect()
}

pub fn format_transcript(transcript: &[ChatMessage]) -> String {
    if transcript.is_empty() {
        return String::new();
    }
    let mut result = String::new();
    for msg in transcript {
        result.push_str(&format!("[{}] {}: {}\n", msg.timestamp, msg.role.display_name(), msg.content));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::Role;

    fn transcript(len: usize) -> Vec<ChatMessage> {
        (0..len)
            .map(|i| {
                let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
                ChatMessage::new(role, format!("message {}", i), "12:00:00")
            })
            .collect()
    }

    #[test]
    fn context_length_is_min_of_transcript_and_limit() {
        for (len, limit) in [(0, 5), (3, 5), (5, 5), (8, 5), (8, 0), (1, 1)] {
            let context = assemble_context(&transcript(len), limit);
            assert_eq!(context.len(), len.min(limit), "len={} limit={}", len, limit);
        }
    }

    #[test]
    fn context_keeps_the_most_recent_entries_in_order() {
        let context = assemble_context(&transcript(6), 3);
        let contents: Vec<&str> = context.iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["message 3", "message 4", "message 5"]);
        assert_eq!(context[0].role, Role::Assistant);
    }

    #[test]
    fn transcript_formatting_uses_display_names() {
        let text = format_transcript(&transcript(2));
        assert_eq!(text, "[12:00:00] User: message 0\n[12:00:00] Assistant: message 1\n");
        assert_eq!(format_transcript(&[]), "");
    }
}
