//! Clap derive structures for the `wallinfo` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// wallinfo -- render system facts and live data into wallpaper text
#[derive(Debug, Parser)]
#[command(
    name = "wallinfo",
    version,
    about = "Render system facts and live data into wallpaper text",
    long_about = "Renders a text template filled with built-in facts ({hostname}, {user},\n\
        {ip}, {os}, {cores}) and values pulled from configured connections\n\
        ({API:<name>}): local files, cmd:// shell commands, or HTTP endpoints.\n\n\
        Also maps the text block's preview position onto the full-resolution\n\
        wallpaper for compositing.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Settings file (TOML)
    #[arg(long, env = "WALLINFO_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Connections file (JSON)
    #[arg(long, env = "WALLINFO_CONNECTIONS_FILE", global = true)]
    pub connections: Option<PathBuf>,

    /// Per-source timeout in whole seconds (5 if unparsable)
    #[arg(long, global = true)]
    pub timeout: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "WALLINFO_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render the template once and print it
    #[command(alias = "r")]
    Render(RenderArgs),

    /// Manage data source connections
    #[command(alias = "conn", alias = "c")]
    Connections(ConnectionsArgs),

    /// Map the text position from preview to wallpaper coordinates
    Place(PlaceArgs),

    /// Re-render on an interval until interrupted
    Watch(WatchArgs),

    /// Manage settings
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Template source ──────────────────────────────────────────────────

/// Where the template comes from; the configured one if neither is given.
#[derive(Debug, Args)]
pub struct TemplateArgs {
    /// Template text
    #[arg(long, short = 't', conflicts_with = "template_file")]
    pub template: Option<String>,

    /// Read the template from a file
    #[arg(long, short = 'f')]
    pub template_file: Option<PathBuf>,

    /// Note appended as a final line (overrides the configured note)
    #[arg(long)]
    pub note: Option<String>,
}

// ── Render ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub template: TemplateArgs,

    /// Print how each referenced connection resolved (to stderr)
    #[arg(long)]
    pub explain: bool,
}

// ── Connections ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConnectionsArgs {
    #[command(subcommand)]
    pub command: ConnectionsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConnectionsCommand {
    /// List connections in order
    #[command(alias = "ls")]
    List,

    /// Show one connection
    Show {
        /// Connection name
        name: String,
    },

    /// Add a connection
    Add(ConnectionSpec),

    /// Change fields of an existing connection
    Update {
        /// Connection name
        name: String,

        #[command(flatten)]
        patch: ConnectionPatch,
    },

    /// Remove a connection
    #[command(alias = "rm")]
    Delete {
        /// Connection name
        name: String,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Fetch and extract one connection, showing the raw response
    Test {
        /// Connection name
        name: String,
    },

    /// Store a connection's password or token in the system keyring
    SetSecret {
        /// Connection name
        name: String,
    },
}

/// A new connection.
#[derive(Debug, Args)]
pub struct ConnectionSpec {
    /// Unique name, referenced in templates as {API:<name>}
    pub name: String,

    /// File path, cmd://<command>, or http(s) URL
    #[arg(long, short = 'u')]
    pub url: String,

    /// HTTP method
    #[arg(long, short = 'm', default_value = "get")]
    pub method: MethodArg,

    /// HTTP authentication
    #[arg(long, default_value = "none")]
    pub auth: AuthArg,

    /// Username for basic auth
    #[arg(long)]
    pub username: Option<String>,

    /// Password or token, saved in the connections file (prefer set-secret)
    #[arg(long)]
    pub secret: Option<String>,

    /// Dot-separated JSON key path
    #[arg(long, short = 'j', conflicts_with = "regex")]
    pub json_path: Option<String>,

    /// Regular expression; the first capture group wins
    #[arg(long, short = 'r')]
    pub regex: Option<String>,
}

/// Field changes for an existing connection. Omitted fields are kept.
#[derive(Debug, Args)]
pub struct ConnectionPatch {
    /// New name
    #[arg(long)]
    pub rename: Option<String>,

    /// File path, cmd://<command>, or http(s) URL
    #[arg(long, short = 'u')]
    pub url: Option<String>,

    /// HTTP method
    #[arg(long, short = 'm')]
    pub method: Option<MethodArg>,

    /// HTTP authentication
    #[arg(long)]
    pub auth: Option<AuthArg>,

    /// Username for basic auth
    #[arg(long)]
    pub username: Option<String>,

    /// Password or token, saved in the connections file
    #[arg(long)]
    pub secret: Option<String>,

    /// Switch to JSON extraction with this key path
    #[arg(long, short = 'j', conflicts_with = "regex")]
    pub json_path: Option<String>,

    /// Switch to regex extraction with this pattern
    #[arg(long, short = 'r')]
    pub regex: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MethodArg {
    Get,
    Post,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AuthArg {
    None,
    Basic,
    Bearer,
}

// ── Place ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PlaceArgs {
    /// Preview-space left edge
    #[arg(long)]
    pub left: Option<u32>,

    /// Preview-space top edge
    #[arg(long)]
    pub top: Option<u32>,

    /// Text block width
    #[arg(long)]
    pub width: Option<u32>,

    /// Text block height
    #[arg(long)]
    pub height: Option<u32>,

    /// Wallpaper width in pixels
    #[arg(long)]
    pub target_width: Option<u32>,

    /// Wallpaper height in pixels
    #[arg(long)]
    pub target_height: Option<u32>,

    /// Preview size as a fraction of the wallpaper
    #[arg(long)]
    pub scale: Option<f64>,
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    #[command(flatten)]
    pub template: TemplateArgs,

    /// Refresh period, e.g. "30m" or "90s" (default: configured minutes)
    #[arg(long, short = 'i')]
    pub interval: Option<humantime::Duration>,

    /// Write each render to this file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Stop after this many renders
    #[arg(long, short = 'n')]
    pub count: Option<u64>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective settings
    Show,

    /// Print the settings and connections file paths
    Path,

    /// Write a settings file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,

        /// Write defaults without prompting
        #[arg(long)]
        defaults: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
