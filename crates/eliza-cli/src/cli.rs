use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "eliza")]
#[command(bin_name = "eliza")]
#[command(version, about = "A rule-based conversational responder", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Chat in the terminal (the default).
    Chat,
    /// Serve the web chat page and JSON endpoint.
    Serve {
        /// Listening port; overrides `web_port` from the config file.
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run the first-run wizard and write `~/.eliza/config.toml`.
    Setup,
}

impl Cli {
    /// The subcommand to run, `chat` when none was given.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Chat)
    }
}
