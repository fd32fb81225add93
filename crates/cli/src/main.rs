mod auth_commands;
mod bot_commands;
mod preset_commands;
mod publish_commands;
mod queue_commands;

use {
    clap::{Parser, Subcommand},
    cpss_api::ApiClient,
    cpss_session::{SessionHandle, store::SessionStore},
    tracing::debug,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "cpss", about = "CPSS admin console — cross-platform social sync")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to the backend.
    Login {
        #[arg(long)]
        username: String,
        /// Password; prompted on stdin when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Log out and forget the stored session.
    Logout,
    /// Show the current session, if any.
    Whoami,
    /// Bot credentials and health.
    Bots {
        #[command(subcommand)]
        action: bot_commands::BotAction,
    },
    /// Publish preset management.
    Presets {
        #[command(subcommand)]
        action: preset_commands::PresetAction,
    },
    /// Upload media and queue a publication.
    Publish(publish_commands::PublishArgs),
    /// Publication queue.
    Queue {
        #[command(subcommand)]
        action: queue_commands::QueueAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Build the shared API client: resolve the backend origin, then restore
/// whatever session is on disk without revalidating it — the first
/// authenticated call confirms or invalidates it via the 401 policy.
fn build_client() -> ApiClient {
    let config = cpss_config::discover_and_load();
    let base_url = config.resolve_base_url();
    debug!(%base_url, "resolved backend origin");

    let session = SessionHandle::new(SessionStore::new());
    session.restore();
    ApiClient::new(base_url, session)
}

/// Gate for every command except `login`: no session, no request.
fn require_login(client: &ApiClient) -> anyhow::Result<()> {
    if !client.session().is_authenticated() {
        anyhow::bail!("not logged in — run `cpss login --username <name>` first");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    let client = build_client();

    match cli.command {
        Commands::Login { username, password } => {
            auth_commands::login(&client, &username, password).await
        },
        Commands::Logout => auth_commands::logout(&client),
        Commands::Whoami => auth_commands::whoami(&client),
        Commands::Bots { action } => {
            require_login(&client)?;
            bot_commands::handle(&client, action).await
        },
        Commands::Presets { action } => {
            require_login(&client)?;
            preset_commands::handle(&client, action).await
        },
        Commands::Publish(args) => {
            require_login(&client)?;
            publish_commands::handle(&client, args).await
        },
        Commands::Queue { action } => {
            require_login(&client)?;
            queue_commands::handle(&client, action).await
        },
    }
}

#[cfg(test)]
mod tests {
    use {super::*, clap::CommandFactory};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_bots_status_watch() {
        let cli = Cli::parse_from(["cpss", "bots", "status", "--watch", "--interval", "5"]);
        match cli.command {
            Commands::Bots {
                action: bot_commands::BotAction::Status { watch, interval },
            } => {
                assert!(watch);
                assert_eq!(interval, 5);
            },
            _ => panic!("unexpected parse"),
        }
    }

    #[test]
    fn publish_requires_preset_and_files() {
        assert!(Cli::try_parse_from(["cpss", "publish", "--preset", "3"]).is_err());
        assert!(Cli::try_parse_from(["cpss", "publish", "a.mp4"]).is_err());
        assert!(Cli::try_parse_from(["cpss", "publish", "--preset", "3", "a.mp4"]).is_ok());
    }
}
