pub mod config;
pub mod keygen;
pub mod session;

use clap::{Parser, Subcommand};

/// IdGate — client-held identity sessions.
#[derive(Debug, Parser)]
#[command(name = "idgate", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a new session encryption key (base64) and print it.
    Keygen,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Session token utilities.
    #[command(subcommand)]
    Session(SessionCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Mint a session for a subject and print it with its Set-Cookie header.
    Mint {
        /// Authenticated subject.
        #[arg(long)]
        subject: String,
        /// Identity manager name (defaults to `identity.manager_name`).
        #[arg(long)]
        provider: Option<String>,
    },
    /// Decrypt a session token and print its contents.
    Open {
        /// The cookie value.
        token: String,
    },
    /// Derive the session ref for a set of bearer claims.
    Ref {
        /// Token audience (`aud`).
        #[arg(long)]
        audience: String,
        /// Identified user ID claim.
        #[arg(long)]
        user_id: String,
        /// Identified user claim, when the backend sets one.
        #[arg(long)]
        user: Option<String>,
    },
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path specified by `IG_CONFIG` (or
/// `idgate.toml` by default).  A missing file means all defaults.  Returns
/// the parsed [`Config`](ig_domain::config::Config) and the path that was
/// used.
pub fn load_config() -> anyhow::Result<(ig_domain::config::Config, String)> {
    let config_path = std::env::var("IG_CONFIG").unwrap_or_else(|_| "idgate.toml".into());

    let config = if std::path::Path::new(&config_path).exists() {
        let raw = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
        toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))?
    } else {
        ig_domain::config::Config::default()
    };

    Ok((config, config_path))
}
