//! REPL – the terminal conversation.
//!
//! Every line goes to the engine except these slash-commands:
//!   /help    – show this list
//!   /memory  – print what the conversation has recorded so far
//!   /quit    – say goodbye through the engine and leave
//!
//! The loop ends when the engine answers with a farewell, so exit words are
//! detected in one place only.  Ctrl-C and Ctrl-D behave like `/quit`.

use colored::Colorize;
use eliza_engine::{Engine, Reply};
use eliza_memory::{Memory, Speaker, TranscriptLog};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::path::Path;
use tracing::warn;

const OPENING: &str = "Hello. I am Eliza. What is your name?";

/// What one input line turned into.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The engine answered.
    Say(Reply),
    Help,
    /// Rendered dump of the conversation memory.
    Memory(String),
    /// A slash-command that does not exist.
    Unknown(String),
}

/// Route one line: slash-commands are handled here, everything else
/// (empty lines included) goes to the engine.
pub fn dispatch(line: &str, engine: &Engine, memory: &mut Memory) -> Action {
    match line.trim() {
        "/help" => Action::Help,
        "/memory" => Action::Memory(describe_memory(memory)),
        "/quit" | "/exit" => Action::Say(engine.respond("quit", memory)),
        other if other.starts_with('/') => Action::Unknown(other.to_string()),
        _ => Action::Say(engine.respond(line, memory)),
    }
}

/// Entry point for the interactive loop.
///
/// `history` is where rustyline keeps line history between runs; failures to
/// read or write it are ignored.
pub fn run(engine: &Engine, transcript: Option<&TranscriptLog>, history: &Path) {
    let session = uuid::Uuid::new_v4().to_string();
    let mut memory = Memory::new();

    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("{}: {}", "Terminal error".red(), e);
            return;
        }
    };
    let _ = editor.load_history(history);

    print_eliza(OPENING);
    log(transcript, &session, Speaker::Eliza, OPENING);

    loop {
        let line = match editor.readline(&format!("{} ", "You:".bold().cyan())) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => "/quit".to_string(),
            Err(e) => {
                eprintln!("{}: {}", "Read error".red(), e);
                break;
            }
        };
        if !line.trim().is_empty() {
            let _ = editor.add_history_entry(line.as_str());
        }

        match dispatch(&line, engine, &mut memory) {
            Action::Say(reply) => {
                log(transcript, &session, Speaker::User, &line);
                log(transcript, &session, Speaker::Eliza, &reply.text);
                print_eliza(&reply.text);
                if reply.farewell {
                    break;
                }
            }
            Action::Help => cmd_help(),
            Action::Memory(dump) => println!("{dump}"),
            Action::Unknown(cmd) => println!(
                "{} '{}'. Type {} for available commands.",
                "Unknown command:".red(),
                cmd.yellow(),
                "/help".bold()
            ),
        }
    }

    if let Err(e) = editor.save_history(history) {
        warn!(error = %e, "could not save line history");
    }
}

fn log(transcript: Option<&TranscriptLog>, session: &str, speaker: Speaker, text: &str) {
    if let Some(t) = transcript {
        t.log(session, speaker, text);
    }
}

fn print_eliza(text: &str) {
    println!("{} {}", "Eliza:".bold().green(), text);
}

// ─────────────────────────────────────────────────────────────────────────────
// Command handlers
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_help() {
    println!();
    println!("{}", "Commands".bold().underline());
    println!("  {}    – show this list", "/help".bold().cyan());
    println!("  {}  – show what Eliza remembers", "/memory".bold().cyan());
    println!("  {}    – say goodbye and exit", "/quit".bold().cyan());
    println!();
    println!("  Eliza also understands: help, time, joke, remember <fact>, recall, reset, bye.");
    println!();
}

/// Human-readable summary of `memory`.
pub fn describe_memory(memory: &Memory) -> String {
    let none = || "-".to_string();
    let mentions = if memory.kinship_mentions.is_empty() {
        none()
    } else {
        memory
            .kinship_mentions
            .iter()
            .map(|(rel, n)| format!("{rel} ×{n}"))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let topics = if memory.topic_tags.is_empty() {
        none()
    } else {
        memory
            .topic_tags
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut out = String::new();
    out.push_str(&format!("{}\n", "Memory".bold().underline()));
    out.push_str(&format!("  name          : {}\n", memory.name.clone().unwrap_or_else(none)));
    out.push_str(&format!(
        "  last relation : {}\n",
        memory.last_relation.clone().unwrap_or_else(none)
    ));
    out.push_str(&format!("  mentions      : {mentions}\n"));
    out.push_str(&format!("  topics        : {topics}\n"));
    out.push_str(&format!(
        "  mood          : {}\n",
        memory.mood.map(|m| m.to_string()).unwrap_or_else(none)
    ));
    out.push_str(&format!("  facts         : {}\n", memory.facts.len()));
    for fact in &memory.facts {
        out.push_str(&format!("    • {fact}\n"));
    }
    out.push_str(&format!(
        "  recent replies: {}/{}",
        memory.recent.len(),
        memory.recent.capacity()
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slash_commands_are_local() {
        let engine = Engine::default();
        let mut mem = Memory::new();
        assert_eq!(dispatch("/help", &engine, &mut mem), Action::Help);
        assert!(matches!(dispatch("/memory", &engine, &mut mem), Action::Memory(_)));
        assert_eq!(
            dispatch("/bogus", &engine, &mut mem),
            Action::Unknown("/bogus".to_string())
        );
        assert!(mem.recent.is_empty(), "slash-commands must not reach the engine");
    }

    #[test]
    fn quit_goes_through_the_engine() {
        let engine = Engine::default();
        let mut mem = Memory::new();
        mem.acquire_name("Ana");
        match dispatch("/quit", &engine, &mut mem) {
            Action::Say(reply) => {
                assert!(reply.farewell);
                assert!(reply.text.contains("Ana"));
            }
            other => panic!("expected a farewell, got {other:?}"),
        }
    }

    #[test]
    fn exit_words_end_the_loop_via_farewell() {
        let engine = Engine::default();
        let mut mem = Memory::new();
        let Action::Say(reply) = dispatch("bye", &engine, &mut mem) else {
            panic!("bye must reach the engine");
        };
        assert!(reply.farewell);
    }

    #[test]
    fn plain_lines_and_empty_lines_reach_the_engine() {
        let engine = Engine::default();
        let mut mem = Memory::new();
        let Action::Say(reply) = dispatch("", &engine, &mut mem) else {
            panic!("empty line must reach the engine");
        };
        assert!(reply.text.starts_with("Please take your time."), "{}", reply.text);
        assert!(!mem.is_named());
        let Action::Say(_) = dispatch("my name is Io", &engine, &mut mem) else {
            panic!("text must reach the engine");
        };
        assert_eq!(mem.name.as_deref(), Some("Io"));
    }

    #[test]
    fn memory_dump_lists_fields() {
        let mut mem = Memory::new();
        mem.acquire_name("Ana");
        mem.note_relation("sister");
        mem.remember("I have a cat");
        let dump = describe_memory(&mem);
        assert!(dump.contains("Ana"));
        assert!(dump.contains("sister ×1"));
        assert!(dump.contains("I have a cat"));
        assert!(dump.contains("recent replies: 0/4"));
    }
}
