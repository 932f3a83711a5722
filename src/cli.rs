use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Resolve the effective output format.
    /// If user specified a format, use it.
    /// Otherwise: TTY → Text, non-TTY (pipe) → Json
    pub fn resolve(user_choice: Option<OutputFormat>) -> OutputFormat {
        match user_choice {
            Some(fmt) => fmt,
            None => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Json
                }
            }
        }
    }
}

#[derive(Parser)]
#[command(
    name = "npctalk",
    about = "Talk to NPCs whose personalities come from a five-factor profile",
    version = env!("GIT_DESCRIBE"),
    after_help = "Logs are written to: ~/.local/share/npctalk/logs/npctalk.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to npctalk.yaml config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Log at debug level")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive conversation with an NPC
    Chat(ChatArgs),

    /// Generate a personality for a role through the backend
    Create {
        /// World description (defaults to config world.description)
        #[arg(long)]
        world: Option<String>,

        /// NPC role (defaults to config world.role)
        #[arg(long)]
        role: Option<String>,

        /// Fail instead of filling missing traits with defaults
        #[arg(long)]
        strict: bool,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Extract a personality from model output text (offline)
    Extract {
        /// File to read (stdin when omitted or "-")
        file: Option<PathBuf>,

        /// Fail instead of filling missing traits with defaults
        #[arg(long)]
        strict: bool,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Render prompts without calling the backend
    Prompt {
        #[command(subcommand)]
        action: PromptAction,
    },

    /// List predefined NPCs
    List {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Args)]
pub struct ChatArgs {
    /// Predefined NPC name
    #[arg(long, conflicts_with_all = ["custom", "generate"])]
    pub npc: Option<String>,

    /// Enter the five trait scores by hand
    #[arg(long, conflicts_with = "generate")]
    pub custom: bool,

    /// Generate the NPC's personality through the backend
    #[arg(long)]
    pub generate: bool,

    /// NPC role used with --generate (defaults to config world.role)
    #[arg(long)]
    pub role: Option<String>,

    /// World description (defaults to config world.description)
    #[arg(long)]
    pub world: Option<String>,

    /// Scene description (defaults to the world description)
    #[arg(long)]
    pub scene: Option<String>,
}

#[derive(Subcommand)]
pub enum PromptAction {
    /// Personality-generation prompt
    Profile {
        #[arg(long)]
        world: Option<String>,

        #[arg(long)]
        role: Option<String>,
    },

    /// Dialogue prompt for a predefined NPC
    Dialogue {
        /// Predefined NPC name
        #[arg(long)]
        npc: String,

        /// Scene description (defaults to config world.description)
        #[arg(long)]
        scene: Option<String>,

        /// File with prior conversation text
        #[arg(long)]
        history_file: Option<PathBuf>,

        /// What the player says
        #[arg(long)]
        input: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Get a configuration value
    Get {
        /// Configuration key (dot notation)
        key: String,
    },
}
