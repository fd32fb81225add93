use {
    anyhow::{Context, Result, bail},
    clap::Subcommand,
    cpss_api::{ApiClient, Platform, Preset, PresetRequest},
    serde_json::{Map, Value},
};

#[derive(Subcommand)]
pub enum PresetAction {
    /// List all presets.
    List,
    /// Create a preset.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        platform: Platform,
        /// Platform config as a JSON object.
        #[arg(long, default_value = "{}")]
        config: String,
    },
    /// Replace a preset by id.
    Update {
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        platform: Platform,
        #[arg(long, default_value = "{}")]
        config: String,
    },
    /// Delete a preset by id.
    Delete {
        id: i64,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

pub async fn handle(client: &ApiClient, action: PresetAction) -> Result<()> {
    match action {
        PresetAction::List => {
            render_presets(&client.presets().await?);
            Ok(())
        },
        PresetAction::Create {
            name,
            platform,
            config,
        } => {
            let request = PresetRequest {
                name,
                platform,
                config: parse_config_object(&config)?,
            };
            let created = client.create_preset(&request).await?;
            println!("Created preset {} ({})", created.id, created.name);
            refetch(client).await
        },
        PresetAction::Update {
            id,
            name,
            platform,
            config,
        } => {
            let request = PresetRequest {
                name,
                platform,
                config: parse_config_object(&config)?,
            };
            let updated = client.update_preset(id, &request).await?;
            println!("Updated preset {} ({})", updated.id, updated.name);
            refetch(client).await
        },
        PresetAction::Delete { id, yes } => {
            if !yes && !confirm(&format!("Delete preset {id}?"))? {
                println!("Aborted");
                return Ok(());
            }
            client.delete_preset(id).await?;
            println!("Deleted preset {id}");
            refetch(client).await
        },
    }
}

/// Mutations never update a local copy; the list is always refetched, so
/// what is printed is what the backend now holds.
async fn refetch(client: &ApiClient) -> Result<()> {
    render_presets(&client.presets().await?);
    Ok(())
}

fn render_presets(presets: &[Preset]) {
    if presets.is_empty() {
        println!("No presets yet");
        return;
    }
    for preset in presets {
        let active = if preset.is_active { "active" } else { "inactive" };
        println!(
            "{:<5} {:<24} {:<10} {:<9} created {}",
            preset.id,
            preset.name,
            preset.platform,
            active,
            preset.created_at.format("%Y-%m-%d")
        );
    }
}

fn parse_config_object(raw: &str) -> Result<Map<String, Value>> {
    let value: Value = serde_json::from_str(raw).context("--config is not valid JSON")?;
    match value {
        Value::Object(map) => Ok(map),
        _ => bail!("--config must be a JSON object"),
    }
}

fn confirm(question: &str) -> Result<bool> {
    use std::io::Write;

    print!("{question} [y/N] ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(is_affirmative(&line))
}

fn is_affirmative(input: &str) -> bool {
    matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
