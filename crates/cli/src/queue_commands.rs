use {
    anyhow::Result,
    clap::Subcommand,
    cpss_api::{ApiClient, Publication, PublicationStatus},
};

#[derive(Subcommand)]
pub enum QueueAction {
    /// List queued publications, newest first.
    List {
        /// Only show publications with this status.
        #[arg(long)]
        status: Option<PublicationStatus>,
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },
    /// Show one publication.
    Show { id: i64 },
    /// Remove a publication from the queue.
    Delete {
        id: i64,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

pub async fn handle(client: &ApiClient, action: QueueAction) -> Result<()> {
    match action {
        QueueAction::List { status, limit } => {
            let items = client.queue(status, Some(limit)).await?;
            if items.is_empty() {
                println!("Queue is empty");
            }
            for item in &items {
                render_line(item);
            }
            Ok(())
        },
        QueueAction::Show { id } => {
            let item = client.publication(id).await?;
            render_line(&item);
            if let Some(description) = &item.description {
                println!("  description: {description}");
            }
            if !item.result.is_null() && item.result != serde_json::json!({}) {
                println!("  result: {}", item.result);
            }
            Ok(())
        },
        QueueAction::Delete { id, yes } => {
            if !yes && !confirm_delete(id)? {
                println!("Aborted");
                return Ok(());
            }
            client.delete_publication(id).await?;
            println!("Deleted publication {id}");
            Ok(())
        },
    }
}

fn render_line(item: &Publication) {
    let title = item.title.as_deref().unwrap_or("(untitled)");
    let media = item
        .media_id
        .map(|id| format!("media {id}"))
        .unwrap_or_else(|| "no media".to_string());
    println!(
        "{:<5} {:<11} preset {:<4} {:<10} {} ({})",
        item.id,
        item.status,
        item.preset_id,
        media,
        title,
        item.created_at.format("%Y-%m-%d %H:%M")
    );
}

fn confirm_delete(id: i64) -> Result<bool> {
    use std::io::Write;

    print!("Delete publication {id}? [y/N] ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let answer = line.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}
