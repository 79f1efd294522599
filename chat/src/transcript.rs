#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

/// Handle to a transcript entry, used to swap a placeholder for the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(usize);

/// In-memory chat history. Never persisted.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: Role, text: impl Into<String>) -> MessageId {
        self.messages.push(Message {
            role,
            text: text.into(),
        });
        MessageId(self.messages.len() - 1)
    }

    /// Returns the updated message, or `None` for an unknown id.
    pub fn replace(&mut self, id: MessageId, text: impl Into<String>) -> Option<&Message> {
        let message = self.messages.get_mut(id.0)?;
        message.text = text.into();
        Some(message)
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.get(id.0)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }
}
