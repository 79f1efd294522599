mod bubble;
mod shell;
mod strings;
mod transcript;
mod view;

use course_rag::{GeminiService, RagBackend, RagConfig, RagError};
use shell::{ChatShell, SessionEnd};
use std::process::ExitCode;
use std::sync::Arc;
use strings::UiStrings;
use transcript::Role;
use view::TerminalView;

fn main() -> ExitCode {
    // Initialize environment variables and logging
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match RagConfig::from_env() {
        Ok(config) => config,
        Err(RagError::MissingApiKey) => {
            eprintln!("{}", "=".repeat(50));
            eprintln!("!!! ERROR: GEMINI_API_KEY environment variable not found!");
            eprintln!("Set it in your shell or in a .env file, e.g. GEMINI_API_KEY=...");
            eprintln!("{}", "=".repeat(50));
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(config) {
        Ok(SessionEnd::Quit) => ExitCode::SUCCESS,
        Ok(SessionEnd::SetupFailed) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Application error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: RagConfig) -> anyhow::Result<SessionEnd> {
    let runtime = tokio::runtime::Runtime::new()?;
    let language = config.language;
    let strings = UiStrings::for_language(language);

    let provider = Arc::new(GeminiService::new(&config.llm));
    let backend = Arc::new(RagBackend::new(config, provider));

    let view = TerminalView::new(strings.title, strings.prompt)?;
    let mut shell = ChatShell::new(backend, runtime.handle().clone(), view, language);

    let end = shell.run()?;
    let transcript = shell.transcript();
    let questions = transcript
        .messages()
        .iter()
        .filter(|m| m.role == Role::User)
        .count();
    log::info!(
        "Session ended ({:?}) after {} messages, {} questions",
        end,
        transcript.len(),
        questions
    );
    if end == SessionEnd::Quit {
        println!("{}", shell.goodbye());
    }

    Ok(end)
}
