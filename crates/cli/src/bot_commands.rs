use std::time::Duration;

use {
    anyhow::{Result, bail},
    clap::Subcommand,
    cpss_api::{ApiClient, ApiError, BotConfigRequest, BotStatus, Platform},
    serde_json::{Map, Value},
    tokio::time::MissedTickBehavior,
    tracing::warn,
};

#[derive(Subcommand)]
pub enum BotAction {
    /// Show bot health, once or on a fixed poll interval.
    Status {
        /// Keep polling until interrupted.
        #[arg(long)]
        watch: bool,
        /// Poll interval in seconds.
        #[arg(long, default_value_t = 30)]
        interval: u64,
    },
    /// Show the stored configuration for one platform.
    Show { platform: Platform },
    /// Replace the configuration for one platform wholesale.
    Configure {
        platform: Platform,
        /// Bot token for the platform.
        #[arg(long)]
        token: String,
        /// Platform-specific settings as `key=value` pairs; comma-separated
        /// values become lists (e.g. `allowed_roles=Admin,Moderator`).
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },
    /// Enable or disable a configured bot.
    Toggle { platform: Platform },
}

pub async fn handle(client: &ApiClient, action: BotAction) -> Result<()> {
    match action {
        BotAction::Status { watch, interval } => status(client, watch, interval).await,
        BotAction::Show { platform } => show(client, platform).await,
        BotAction::Configure {
            platform,
            token,
            set,
        } => configure(client, platform, token, &set).await,
        BotAction::Toggle { platform } => toggle(client, platform).await,
    }
}

async fn status(client: &ApiClient, watch: bool, interval: u64) -> Result<()> {
    if !watch {
        render_statuses(&client.bots_status().await?);
        return Ok(());
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(interval.max(1)));
    // Each poll is awaited before the next is issued; a slow backend delays
    // the cadence instead of stacking overlapping requests.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!();
                return Ok(());
            },
            _ = ticker.tick() => {
                match client.bots_status().await {
                    Ok(statuses) => render_statuses(&statuses),
                    // Session is gone; nothing further can succeed.
                    Err(e @ ApiError::Unauthorized) => return Err(e.into()),
                    Err(e) => warn!(error = %e, "status poll failed"),
                }
            },
        }
    }
}

fn render_statuses(statuses: &[BotStatus]) {
    if statuses.is_empty() {
        println!("No bots configured");
        return;
    }
    for bot in statuses {
        let active = if bot.is_active { "active" } else { "inactive" };
        let checked = bot
            .last_health_check
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "never".to_string());
        println!(
            "{:<10} {:<8} {:<9} last check: {}",
            bot.platform, bot.status, active, checked
        );
    }
}

async fn show(client: &ApiClient, platform: Platform) -> Result<()> {
    match client.bot_config(platform).await? {
        Some(config) => {
            let active = if config.is_active { "active" } else { "inactive" };
            println!("{platform} ({active})");
            if config.config.is_empty() {
                println!("  (no platform-specific settings)");
            } else {
                for (key, value) in &config.config {
                    println!("  {key} = {value}");
                }
            }
        },
        // 404 here means nothing stored yet, not a failure.
        None => println!("{platform}: no configuration yet"),
    }
    Ok(())
}

async fn configure(
    client: &ApiClient,
    platform: Platform,
    token: String,
    pairs: &[String],
) -> Result<()> {
    let config = parse_set_pairs(pairs)?;
    let saved = client
        .configure_bot(&BotConfigRequest {
            platform,
            token,
            config,
        })
        .await?;
    println!("Configuration saved for {}", saved.platform);
    Ok(())
}

async fn toggle(client: &ApiClient, platform: Platform) -> Result<()> {
    let result = client.toggle_bot(platform).await?;
    let state = if result.is_active { "enabled" } else { "disabled" };
    println!("{} is now {state}", result.platform);
    Ok(())
}

/// Build the platform-specific config map from repeated `--set key=value`
/// flags. A value containing commas becomes a list of trimmed strings.
fn parse_set_pairs(pairs: &[String]) -> Result<Map<String, Value>> {
    let mut map = Map::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("invalid --set '{pair}': expected key=value");
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("invalid --set '{pair}': empty key");
        }
        let parsed = if value.contains(',') {
            Value::Array(
                value
                    .split(',')
                    .map(|v| Value::String(v.trim().to_string()))
                    .collect(),
            )
        } else {
            Value::String(value.to_string())
        };
        map.insert(key.to_string(), parsed);
    }
    Ok(map)
}
