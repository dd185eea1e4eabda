//! Message formatting utilities for client display.

use irori_server::infrastructure::dto::websocket::{ChatMessageDto, UserDto};
use irori_shared::time::{timestamp_to_local_clock, timestamp_to_rfc3339};

use crate::mirror::{ChatLine, RoomMirror};

const RULE: &str = "============================================================";
const THIN_RULE: &str = "------------------------------------------------------------";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the full room snapshot: users, language, history and document size
    pub fn format_snapshot(mirror: &RoomMirror, room_id: &str) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n\n{}\n", RULE));
        output.push_str(&format!("Room: {}\n", room_id));
        output.push_str(&format!("Language: {}\n", mirror.language()));
        output.push_str(&format!(
            "Document: {} line(s), {} byte(s)\n",
            mirror.content().lines().count(),
            mirror.content().len()
        ));
        output.push_str(&Self::format_users(mirror.users(), mirror.self_id()));

        let history: Vec<&ChatLine> = mirror.chat().iter().collect();
        if !history.is_empty() {
            output.push_str("History:\n");
            for line in history {
                output.push_str(&Self::format_history_line(line));
            }
        }
        output.push_str(&format!("{}\n", RULE));
        output
    }

    /// Format the user list, marking this connection with "(me)"
    pub fn format_users(users: &[UserDto], self_id: Option<&str>) -> String {
        let mut output = String::from("Users:\n");
        if users.is_empty() {
            output.push_str("(No users)\n");
        }
        for user in users {
            let me_suffix = if Some(user.id.as_str()) == self_id {
                " (me)"
            } else {
                ""
            };
            output.push_str(&format!("  {}{}\n", user.name, me_suffix));
        }
        output
    }

    fn format_history_line(line: &ChatLine) -> String {
        match line {
            ChatLine::Message(message) => format!(
                "  [{}] {}: {}\n",
                timestamp_to_local_clock(message.ts),
                message.name,
                message.message
            ),
            ChatLine::System(text) => format!("  * {}\n", text),
        }
    }

    /// Format a presence notice ("Bob joined", "A user left")
    pub fn format_system_line(text: &str) -> String {
        format!("\n* {}\n", text)
    }

    /// Format a chat message
    pub fn format_chat_message(message: &ChatMessageDto) -> String {
        let sent_at =
            timestamp_to_rfc3339(message.ts).unwrap_or_else(|| message.ts.to_string());
        format!(
            "\n\n{}\n@{}: {}\nsent at {}\n{}\n",
            THIN_RULE, message.name, message.message, sent_at, THIN_RULE
        )
    }

    /// Format a notice that a peer edited the document
    pub fn format_code_change(editor: &str, content: bool, language: Option<&str>) -> String {
        match (content, language) {
            (true, Some(language)) => {
                format!("\n~ {} edited the document ({})\n", editor, language)
            }
            (true, None) => format!("\n~ {} edited the document\n", editor),
            (false, Some(language)) => {
                format!("\n~ {} switched the language to {}\n", editor, language)
            }
            (false, None) => String::new(),
        }
    }

    /// Format the document with line numbers
    pub fn format_document(content: &str, language: &str) -> String {
        let mut output = format!("\n{} [{}]\n", THIN_RULE, language);
        if content.is_empty() {
            output.push_str("(empty document)\n");
        }
        for (index, line) in content.lines().enumerate() {
            output.push_str(&format!("{:>4} | {}\n", index + 1, line));
        }
        output.push_str(&format!("{}\n", THIN_RULE));
        output
    }

    /// Format a raw text frame that could not be parsed
    pub fn format_raw_message(text: &str) -> String {
        format!("\n← Received: {}\n", text)
    }
}
