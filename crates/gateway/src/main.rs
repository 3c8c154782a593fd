use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use ig_domain::config::ObservabilityConfig;
use ig_gateway::bootstrap;
use ig_gateway::cli::{self, Cli, Command, ConfigCommand, SessionCommand};

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    match args.command {
        Command::Keygen => {
            cli::keygen::run();
            Ok(())
        }
        Command::Config(ConfigCommand::Validate) => {
            let (config, config_path) = cli::load_config()?;
            if !cli::config::validate(&config, &config_path) {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Config(ConfigCommand::Show) => {
            let (config, _) = cli::load_config()?;
            cli::config::show(&config)
        }
        Command::Session(cmd) => {
            let (config, _) = cli::load_config()?;
            init_tracing(&config.observability);
            run_session(&config, cmd)
        }
        Command::Version => {
            println!("idgate {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn run_session(config: &ig_domain::config::Config, cmd: SessionCommand) -> anyhow::Result<()> {
    match cmd {
        SessionCommand::Ref {
            audience,
            user_id,
            user,
        } => cli::session::session_ref(config, &audience, &user_id, user.as_deref()),
        SessionCommand::Mint { subject, provider } => {
            let services = bootstrap::build_session_services(config)?;
            cli::session::mint(&services, &subject, provider.as_deref())
        }
        SessionCommand::Open { token } => {
            let services = bootstrap::build_session_services(config)?;
            if !cli::session::open(&services, &token)? {
                std::process::exit(2);
            }
            Ok(())
        }
    }
}

/// Initialize stderr tracing so diagnostic output never mixes with the
/// tokens and JSON printed on stdout.
///
/// `RUST_LOG` wins over `observability.log_filter`.  With
/// `observability.json` every event, including `ig_event` trace events, is
/// one JSON object per line.
fn init_tracing(obs: &ObservabilityConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&obs.log_filter));

    let registry = tracing_subscriber::registry().with(env_filter);

    if obs.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
