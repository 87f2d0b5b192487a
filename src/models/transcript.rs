use super::message::Message;
use super::role::Role;

/// The ordered message history for one conversation.
///
/// Owned by the caller and passed into the agent each turn, so multiple
/// sessions can run side by side without shared state. The first entry is
/// always the system instructions; entries are only ever appended.
#[derive(Debug, Clone)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Start a transcript seeded with the system instructions
    pub fn new<S: Into<String>>(system_instructions: S) -> Self {
        Transcript {
            messages: vec![Message::system().with_text(system_instructions)],
        }
    }

    /// Append a message. System messages are rejected: the instructions set
    /// at construction are the only system entry.
    pub fn push(&mut self, message: Message) {
        debug_assert!(message.role != Role::System);
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The most recent message, which is never absent given the seeded entry
    pub fn last(&self) -> &Message {
        self.messages.last().expect("transcript is never empty")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_entry_is_system_instructions() {
        let transcript = Transcript::new("You are a Microsoft 365 agent.");
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.messages()[0].role, Role::System);
        assert_eq!(
            transcript.messages()[0].text(),
            "You are a Microsoft 365 agent."
        );
    }

    #[test]
    fn test_grows_monotonically() {
        let mut transcript = Transcript::new("instructions");
        for turn in 0..5 {
            let before = transcript.len();
            transcript.push(Message::user().with_text(format!("turn {}", turn)));
            transcript.push(Message::assistant().with_text("ok"));
            assert_eq!(transcript.len(), before + 2);
            assert_eq!(transcript.messages()[0].role, Role::System);
        }
    }
}
