//! Session assembly
//!
//! Builds the full prompt for a single request: persona system message,
//! optional new-session welcome, then the caller-supplied messages unchanged.
//! Pure function - no I/O, no side effects.

use crate::chat::models::{ChatMessage, MessageRole};
use crate::config::ChatConfig;

/// Assemble the ordered message list for one completion request
///
/// The result always starts with exactly one `system` message carrying the
/// persona. When `new_session` is true, an `assistant` welcome message
/// follows it before any caller messages. Caller messages are appended
/// as-is, preserving their relative order; no validation is performed on
/// their roles or content.
pub fn assemble_messages(
    chat: &ChatConfig,
    request_messages: &[ChatMessage],
    new_session: bool,
) -> Vec<ChatMessage> {
    let mut all_messages =
        Vec::with_capacity(request_messages.len() + if new_session { 2 } else { 1 });

    all_messages.push(ChatMessage::new(MessageRole::System, chat.persona.clone()));

    if new_session {
        all_messages.push(ChatMessage::new(MessageRole::Assistant, chat.welcome.clone()));
    }

    all_messages.extend_from_slice(request_messages);
    all_messages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_chat_config() -> ChatConfig {
        ChatConfig {
            persona: "Eres Amigo, un coach de salud.".to_string(),
            welcome: "¡Hola! Soy Amigo.".to_string(),
        }
    }

    #[test]
    fn first_message_is_always_the_persona() {
        let chat = test_chat_config();
        for new_session in [false, true] {
            let assembled = assemble_messages(
                &chat,
                &[ChatMessage::new(MessageRole::User, "Hola")],
                new_session,
            );
            assert_eq!(assembled[0].role, MessageRole::System);
            assert_eq!(assembled[0].content, chat.persona);
        }
    }

    #[test]
    fn new_session_inserts_exactly_one_welcome() {
        let chat = test_chat_config();
        let request = vec![ChatMessage::new(MessageRole::User, "Hola")];

        let assembled = assemble_messages(&chat, &request, true);
        assert_eq!(assembled.len(), 3);
        assert_eq!(assembled[1].role, MessageRole::Assistant);
        assert_eq!(assembled[1].content, chat.welcome);

        let assembled = assemble_messages(&chat, &request, false);
        assert_eq!(assembled.len(), 2);
        assert_eq!(assembled[1].role, MessageRole::User);
    }

    #[test]
    fn caller_messages_keep_their_order_as_a_contiguous_suffix() {
        let chat = test_chat_config();
        let request = vec![
            ChatMessage::new(MessageRole::User, "primero"),
            ChatMessage::new(MessageRole::Assistant, "segundo"),
            ChatMessage::new(MessageRole::User, "tercero"),
        ];

        let assembled = assemble_messages(&chat, &request, true);
        assert_eq!(&assembled[2..], &request[..]);
    }

    #[test]
    fn empty_request_still_gets_persona() {
        let chat = test_chat_config();
        let assembled = assemble_messages(&chat, &[], false);
        assert_eq!(assembled.len(), 1);
        assert_eq!(assembled[0].role, MessageRole::System);
    }

    #[test]
    fn malformed_roles_pass_through_unchanged() {
        // A caller-supplied system message is not rejected here; the
        // completion provider's contract governs rejection.
        let chat = test_chat_config();
        let request = vec![ChatMessage::new(MessageRole::System, "inyección")];
        let assembled = assemble_messages(&chat, &request, false);
        assert_eq!(assembled[1], request[0]);
    }
}
