//! Canned replies used when the AI service is unavailable.

const GREETING_KEYWORDS: [&str; 3] = ["hello", "hi", "hey"];
const QUESTION_KEYWORDS: [&str; 3] = ["what", "how", "why"];
const HELP_KEYWORDS: [&str; 2] = ["help", "support"];

pub const GREETING_REPLY: &str =
    "Hello! I'm running in test mode right now, so my answers are simulated. How can I help you today?";
pub const QUESTION_REPLY: &str =
    "That's a great question! The AI service isn't available in test mode, so I can't give you a real answer yet. Try again once test mode is turned off.";
pub const HELP_REPLY: &str =
    "I'm here to help! Test mode is active, which means responses are generated locally. Disable test mode in settings to talk to the AI again.";

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}

/// Deterministic reply keyed on substrings of the lowercased input.
pub fn reply(message: &str) -> String {
    let lowered = message.to_lowercase();
    if contains_any(&lowered, &GREETING_KEYWORDS) {
        GREETING_REPLY.to_string()
    } else if contains_any(&lowered, &QUESTION_KEYWORDS) {
        QUESTION_REPLY.to_string()
    } else if contains_any(&lowered, &HELP_KEYWORDS) {
        HELP_REPLY.to_string()
    } else {
        format!(
            "You said: \"{}\". I'm running in test mode, so this is a simulated response. Turn test mode off to get a real answer.",
            message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_takes_priority() {
        assert!(reply("Hi there").starts_with(GREETING_REPLY));
        // "hey" matches before "what"
        assert_eq!(reply("hey, what's up"), GREETING_REPLY);
    }

    #[test]
    fn questions_get_the_question_template() {
        assert_eq!(reply("why is the sky blue"), QUESTION_REPLY);
        assert_eq!(reply("HOW does it work"), QUESTION_REPLY);
    }

    #[test]
    fn help_requests() {
        assert_eq!(reply("I need support"), HELP_REPLY);
    }

    #[test]
    fn default_reply_echoes_the_original_text() {
        let text = reply("random text");
        assert!(text.contains("\"random text\""));
        assert_eq!(text, reply("random text"));
    }
}
