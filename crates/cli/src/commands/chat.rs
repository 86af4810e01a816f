//! `palaver chat` — Interactive or single-message terminal chat.

use std::io::Write;

use chrono::Utc;
use palaver_chat::{Orchestrator, Session, SessionSettings};
use palaver_core::{ChatModel, Persona};
use tokio::io::{self, AsyncBufReadExt, BufReader};

use super::{ensure_credentials, load_config};

/// Command-line overrides for the session settings.
pub struct ChatArgs {
    pub persona: Option<Persona>,
    pub memory_turns: Option<usize>,
    pub model: Option<ChatModel>,
    pub message: Option<String>,
}

/// A line typed at the prompt that controls the session instead of
/// being sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ChatCommand {
    SetPersona(Persona),
    SetMemory(usize),
    SetModel(ChatModel),
    NewTopic,
    Clear,
    Stats,
    Help,
    Exit,
}

impl ChatCommand {
    /// `None` means the line is an ordinary message.
    fn parse(line: &str) -> Option<Result<Self, String>> {
        let line = line.trim();
        if matches!(line, "exit" | "quit" | "/exit" | "/quit" | ":q") {
            return Some(Ok(Self::Exit));
        }
        let rest = line.strip_prefix('/')?;
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        let parsed = match name {
            "persona" => arg
                .parse::<Persona>()
                .map(Self::SetPersona)
                .map_err(|e| e.to_string()),
            "memory" => arg
                .parse::<usize>()
                .map(Self::SetMemory)
                .map_err(|_| format!("'{arg}' is not a number; use /memory <1-10>")),
            "model" => arg
                .parse::<ChatModel>()
                .map(Self::SetModel)
                .map_err(|e| e.to_string()),
            "new" => Ok(Self::NewTopic),
            "clear" => Ok(Self::Clear),
            "stats" => Ok(Self::Stats),
            "help" => Ok(Self::Help),
            other => Err(format!("Unknown command '/{other}'. Type /help.")),
        };
        Some(parsed)
    }
}

const HELP: &str = "\
  /persona <name>   Switch style: Default, Expert, Creative
  /memory <n>       Remember the last n exchanges (1-10)
  /model <id>       Switch model
  /new              Start a new topic (forget memory, keep history)
  /clear            Clear history and statistics
  /stats            Show message count and duration
  exit              Quit";

/// Apply a control command and return the text to show.
fn apply(session: &mut Session, command: ChatCommand) -> String {
    let current = session.settings();
    let updated = match command {
        ChatCommand::SetPersona(persona) => SessionSettings {
            persona,
            ..current
        },
        ChatCommand::SetMemory(memory_turns) => SessionSettings {
            memory_turns,
            ..current
        },
        ChatCommand::SetModel(model) => SessionSettings { model, ..current },
        ChatCommand::NewTopic => {
            session.new_topic();
            return "🆕 Memory cleared. Ready for a new topic!".into();
        }
        ChatCommand::Clear => {
            session.clear_history();
            return "🗑️  Chat history cleared.".into();
        }
        ChatCommand::Stats => return format_stats(session),
        ChatCommand::Help => return HELP.into(),
        ChatCommand::Exit => return String::new(),
    };

    match session.update_settings(updated) {
        Ok(()) => format!("⚙️  {}", footer(session)),
        Err(e) => format!("❌ {}", e.user_message()),
    }
}

fn footer(session: &Session) -> String {
    let s = session.settings();
    format!(
        "Persona: {} | Memory: {} messages | Model: {}",
        s.persona, s.memory_turns, s.model
    )
}

fn format_stats(session: &Session) -> String {
    let stats = session.stats(Utc::now());
    format!(
        "📊 Messages: {} | Memory in use: {}/{} | Duration: {}",
        stats.message_count,
        stats.memory_in_use,
        session.settings().memory_turns,
        stats.elapsed.as_deref().unwrap_or("not started"),
    )
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

pub async fn run(args: ChatArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    ensure_credentials(&config)?;

    let provider = palaver_providers::build_from_config(&config)?;
    let orchestrator = Orchestrator::from_config(provider, &config);

    let defaults = SessionSettings::from_config(&config)?;
    let settings = SessionSettings::new(
        args.persona.unwrap_or(defaults.persona),
        args.memory_turns.unwrap_or(defaults.memory_turns),
        args.model.unwrap_or(defaults.model),
    )?;
    let mut session = Session::new(settings)?;

    if let Some(message) = args.message {
        eprint!("  Thinking...");
        let result = orchestrator.respond(&mut session, &message).await;
        eprint!("\r              \r");
        let turn = result.map_err(|e| e.user_message())?;
        println!("{}", turn.ai());
        return Ok(());
    }

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║        Palaver — Conversational Playground   ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  {}", footer(&session));
    println!();
    println!("  Type your message and press Enter. /help lists commands.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(io::stdin()).lines();
    prompt()?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            prompt()?;
            continue;
        }

        match ChatCommand::parse(line) {
            Some(Ok(ChatCommand::Exit)) => break,
            Some(Ok(command)) => println!("  {}", apply(&mut session, command)),
            Some(Err(message)) => println!("  ❌ {message}"),
            None => {
                eprint!("  🤔 Thinking...");
                let result = orchestrator.respond(&mut session, line).await;
                eprint!("\r                  \r");
                match result {
                    Ok(turn) => {
                        let label = session.settings().persona.assistant_label();
                        println!();
                        for reply_line in turn.ai().lines() {
                            println!("  {label} > {reply_line}");
                        }
                    }
                    Err(e) => eprintln!("  ❌ {}", e.user_message()),
                }
            }
        }
        println!();
        prompt()?;
    }

    println!();
    println!("  Goodbye! 👋");
    println!();

    Ok(())
}
