use crate::strings::UiStrings;
use crate::transcript::{MessageId, Role, Transcript};
use crate::view::{ChatView, ReadOutcome};
use anyhow::Result;
use course_rag::{prompts, Assistant, Language};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use tokio::runtime::Handle;

/// Results posted back to the shell loop by background tasks.
#[derive(Debug)]
pub enum UiEvent {
    BackendReady(bool),
    Answer { placeholder: MessageId, text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Quit,
    SetupFailed,
}

pub struct ChatShell<V: ChatView> {
    assistant: Arc<dyn Assistant>,
    runtime: Handle,
    view: V,
    strings: UiStrings,
    fallback: &'static str,
    transcript: Transcript,
    input_enabled: bool,
    setup_failed: bool,
    events_tx: Sender<UiEvent>,
    events_rx: Receiver<UiEvent>,
}

impl<V: ChatView> ChatShell<V> {
    pub fn new(assistant: Arc<dyn Assistant>, runtime: Handle, view: V, language: Language) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            assistant,
            runtime,
            view,
            strings: UiStrings::for_language(language),
            fallback: prompts::fallback_answer(language),
            transcript: Transcript::new(),
            input_enabled: false,
            setup_failed: false,
            events_tx,
            events_rx,
        }
    }

    /// Drives the session: blocks on background results while input is
    /// disabled, reads a line while it is enabled.
    pub fn run(&mut self) -> Result<SessionEnd> {
        self.start_backend_setup();

        loop {
            if self.setup_failed {
                return Ok(SessionEnd::SetupFailed);
            }

            if !self.input_enabled {
                let event = self.events_rx.recv()?;
                self.handle_event(event);
                continue;
            }

            match self.view.read_line()? {
                ReadOutcome::Line(line) => {
                    self.on_send(&line);
                }
                ReadOutcome::Quit => return Ok(SessionEnd::Quit),
            }
        }
    }

    pub fn start_backend_setup(&mut self) {
        self.add_message(Role::System, self.strings.starting);
        self.set_input_state(false);

        let assistant = Arc::clone(&self.assistant);
        let events = self.events_tx.clone();
        self.runtime.spawn(async move {
            let worker = tokio::spawn(async move { assistant.setup_rag_chain().await });
            let success = match worker.await {
                Ok(success) => success,
                Err(e) => {
                    log::error!("Setup task failed: {}", e);
                    false
                }
            };
            let _ = events.send(UiEvent::BackendReady(success));
        });
    }

    /// Returns whether a question was dispatched. Blank input and input
    /// arriving while the shell is busy or the index is missing are dropped.
    pub fn on_send(&mut self, line: &str) -> bool {
        let question = line.trim();
        if question.is_empty() || !self.input_enabled || !self.assistant.is_ready() {
            return false;
        }

        self.add_message(Role::User, question);
        self.set_input_state(false);
        let placeholder = self.add_message(Role::Model, self.strings.thinking);

        let assistant = Arc::clone(&self.assistant);
        let events = self.events_tx.clone();
        let fallback = self.fallback;
        let question = question.to_string();
        self.runtime.spawn(async move {
            let worker = tokio::spawn(async move { assistant.ask_question(&question).await });
            let text = match worker.await {
                Ok(answer) => answer,
                Err(e) => {
                    log::error!("Answer task failed: {}", e);
                    fallback.to_string()
                }
            };
            let _ = events.send(UiEvent::Answer { placeholder, text });
        });

        true
    }

    pub fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::BackendReady(true) => {
                self.add_message(Role::System, self.strings.ready);
                self.set_input_state(true);
            }
            UiEvent::BackendReady(false) => {
                self.add_message(Role::System, self.strings.setup_failed);
                self.setup_failed = true;
            }
            UiEvent::Answer { placeholder, text } => {
                if let Some(message) = self.transcript.replace(placeholder, text) {
                    self.view.replace(message);
                }
                self.set_input_state(true);
            }
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn goodbye(&self) -> &'static str {
        self.strings.goodbye
    }

    fn add_message(&mut self, role: Role, text: &str) -> MessageId {
        let id = self.transcript.push(role, text);
        if let Some(message) = self.transcript.get(id) {
            self.view.show(message);
        }
        id
    }

    fn set_input_state(&mut self, enabled: bool) {
        self.input_enabled = enabled;
        self.view.set_input_enabled(enabled);
    }
}
