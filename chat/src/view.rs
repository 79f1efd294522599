use crate::bubble;
use crate::transcript::Message;
use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;

pub enum ReadOutcome {
    Line(String),
    Quit,
}

/// Where the shell draws messages and reads input from.
pub trait ChatView {
    fn show(&mut self, message: &Message);

    /// A previously shown message got new text.
    fn replace(&mut self, message: &Message);

    fn set_input_enabled(&mut self, enabled: bool);

    /// Only called while input is enabled.
    fn read_line(&mut self) -> Result<ReadOutcome>;
}

pub struct TerminalView {
    editor: Editor<(), DefaultHistory>,
    prompt: String,
}

impl TerminalView {
    pub fn new(title: &str, prompt: &str) -> Result<Self> {
        colored::control::set_override(true);

        let width = bubble::terminal_width();
        println!("{}", format!("{:^width$}", title, width = width).bold());
        println!("{}", "─".repeat(width).dimmed());

        Ok(Self {
            editor: Editor::<(), DefaultHistory>::new()?,
            prompt: prompt.to_string(),
        })
    }

    fn print_bubble(&self, message: &Message) {
        let layout = bubble::layout(message.role, &message.text, bubble::terminal_width());
        for line in &layout.lines {
            println!("{}{}", " ".repeat(layout.indent), bubble::paint(message.role, line));
        }
        println!();
    }
}

impl ChatView for TerminalView {
    fn show(&mut self, message: &Message) {
        self.print_bubble(message);
    }

    // Lines already printed cannot be edited, so the new text is appended.
    fn replace(&mut self, message: &Message) {
        self.print_bubble(message);
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        log::debug!("Input {}", if enabled { "enabled" } else { "disabled" });
    }

    fn read_line(&mut self) -> Result<ReadOutcome> {
        match self.editor.readline(&self.prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(ReadOutcome::Line(line))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(ReadOutcome::Quit),
            Err(err) => Err(err.into()),
        }
    }
}
