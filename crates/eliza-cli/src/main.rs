//! `eliza-cli` – the `eliza` binary.
//!
//! 1. Initialises logging (and OTLP export when configured).
//! 2. Loads `~/.eliza/config.toml`; `eliza setup` runs the **First-Run
//!    Wizard** that writes it.
//! 3. `eliza` / `eliza chat` starts the terminal conversation.
//! 4. `eliza serve [--port N]` starts the web chat server.  **Ctrl-C** stops
//!    it cleanly.

mod cli;
mod config;
mod repl;

use clap::Parser;
use colored::Colorize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, warn};

use eliza_engine::Engine;
use eliza_memory::TranscriptLog;
use eliza_web::{ChatServer, ChatService};

use crate::cli::{Cli, Command};
use crate::config::Config;

fn main() {
    // Logs go through tracing; conversation output stays on println!.
    let _guard = eliza_engine::init_tracing("eliza");
    let args = Cli::parse();

    print_banner();

    let cfg = match config::effective() {
        Ok(cfg) => cfg,
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            let mut cfg = Config::default();
            config::apply_env_overrides(&mut cfg);
            cfg
        }
    };

    match args.command() {
        Command::Chat => run_chat(&cfg),
        Command::Serve { port } => run_serve(&cfg, port.unwrap_or(cfg.web_port)),
        Command::Setup => run_first_run_wizard(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Subcommands
// ─────────────────────────────────────────────────────────────────────────────

fn run_chat(cfg: &Config) {
    println!("  Type {} for a list of commands.\n", "/help".bold().cyan());
    let transcript = open_transcript(cfg);
    let history = config::config_dir().join("history.txt");
    repl::run(&Engine::default(), transcript.as_ref(), &history);
}

fn run_serve(cfg: &Config, port: u16) {
    let mut service =
        ChatService::new(Engine::default()).with_default_user_name(cfg.default_user_name.clone());
    if let Some(log) = open_transcript(cfg) {
        service = service.with_transcript(log);
    }
    let server = ChatServer::new(service).with_port(port);

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_flag = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – shutting down …".yellow().bold());
        shutdown_flag.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; stop the server with a signal instead");
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            println!("{}: {}", "Runtime error".red(), e);
            return;
        }
    };

    println!(
        "  Chat page at {}",
        format!("http://localhost:{port}").bold()
    );
    let result = runtime.block_on(async {
        tokio::select! {
            res = server.run() => res,
            () = wait_for(shutdown) => Ok(()),
        }
    });
    match result {
        Ok(()) => println!("{}", "  ✓ Server stopped.".green()),
        Err(e) => println!("{}: {}", "Server error".red(), e),
    }
}

async fn wait_for(flag: Arc<AtomicBool>) {
    let mut tick = tokio::time::interval(Duration::from_millis(200));
    while !flag.load(Ordering::SeqCst) {
        tick.tick().await;
    }
}

/// Open the transcript database when enabled.  Failure only disables it.
fn open_transcript(cfg: &Config) -> Option<TranscriptLog> {
    if !cfg.transcript_enabled {
        return None;
    }
    if let Some(parent) = std::path::Path::new(&cfg.transcript_path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    match TranscriptLog::open(&cfg.transcript_path) {
        Ok(log) => {
            info!(path = %cfg.transcript_path, "transcript enabled");
            Some(log)
        }
        Err(e) => {
            warn!(error = %e, path = %cfg.transcript_path, "transcript disabled: could not open database");
            None
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// First-Run Wizard
// ─────────────────────────────────────────────────────────────────────────────

fn run_first_run_wizard() {
    println!();
    println!("{}", "  ╔══════════════════════════════════════╗".bold().cyan());
    println!("{}", "  ║        Eliza First-Run Wizard        ║".bold().cyan());
    println!("{}", "  ╚══════════════════════════════════════╝".bold().cyan());
    println!();

    let mut cfg = match config::load() {
        Ok(Some(existing)) => {
            println!("  Editing {}\n", config::config_path().display().to_string().bold());
            existing
        }
        Ok(None) => {
            println!("  No configuration found.  Let's set up Eliza.\n");
            Config::default()
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            Config::default()
        }
    };

    let port_str = prompt_line(
        &format!("  Web chat HTTP port [{}]: ", cfg.web_port),
        &cfg.web_port.to_string(),
    );
    if let Ok(p) = port_str.trim().parse::<u16>() {
        cfg.web_port = p;
    }

    cfg.default_user_name = prompt_line(
        &format!("  Name to use before the user gives theirs [{}]: ", cfg.default_user_name),
        &cfg.default_user_name,
    );

    let current = if cfg.transcript_enabled { "y" } else { "n" };
    let answer = prompt_line(&format!("  Keep a transcript of conversations? (y/n) [{current}]: "), current);
    cfg.transcript_enabled = matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes");

    if cfg.transcript_enabled {
        cfg.transcript_path = prompt_line(
            &format!("  Transcript database [{}]: ", cfg.transcript_path),
            &cfg.transcript_path,
        );
    }

    match config::save(&cfg) {
        Ok(()) => println!(
            "\n  {} Config saved to {}\n",
            "✓".green().bold(),
            config::config_path().display().to_string().bold()
        ),
        Err(e) => println!("{}: {}", "Error saving config".red(), e),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   ________    _______  ___ "#.bold().cyan());
    println!("{}", r#"  / __/ /  /  /_  /   |/ _ |"#.bold().cyan());
    println!("{}", r#" / _// /__/ /  / /_/ /| __ |"#.bold().cyan());
    println!("{}", r#"/___/____/_/  /___/_/ |_/ |_|"#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "Eliza".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  A patient, rule-based listener");
    println!();
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn prompt_line(msg: &str, default: &str) -> String {
    use std::io::{BufRead, Write};
    print!("{}", msg);
    std::io::stdout().flush().ok();
    let mut line = String::new();
    match std::io::stdin().lock().read_line(&mut line) {
        Ok(_) => {
            let t = line.trim().to_string();
            if t.is_empty() { default.to_string() } else { t }
        }
        Err(_) => default.to_string(),
    }
}
