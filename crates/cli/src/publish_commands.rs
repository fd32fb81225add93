use std::path::{Path, PathBuf};

use {
    anyhow::{Context, Result},
    clap::Args,
    cpss_api::{ApiClient, PublishRequest, UploadedMedia},
    futures::future::try_join_all,
    tracing::warn,
};

#[derive(Args)]
pub struct PublishArgs {
    /// Files to upload. All are uploaded concurrently, but the publication
    /// references only the first one.
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Preset id to publish with.
    #[arg(long)]
    pub preset: i64,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,
}

pub async fn handle(client: &ApiClient, args: PublishArgs) -> Result<()> {
    // All selected files go up in parallel as independent multipart
    // requests. One failure fails the whole batch; files that already made
    // it to the backend are not rolled back.
    let uploads = args.files.iter().map(|path| upload_one(client, path));
    let uploaded: Vec<UploadedMedia> = try_join_all(uploads).await?;
    println!("Uploaded {} file(s)", uploaded.len());

    // The publish call takes a single media id; the first upload wins.
    // Make the discarded ones visible instead of dropping them silently.
    if uploaded.len() > 1 {
        let ignored: Vec<String> = uploaded[1..]
            .iter()
            .map(|m| {
                m.original_filename
                    .clone()
                    .or_else(|| m.filename.clone())
                    .unwrap_or_else(|| format!("media {}", m.id))
            })
            .collect();
        warn!(
            ignored = %ignored.join(", "),
            "publication references only the first upload; the rest are stored but unused"
        );
    }

    let publication = client
        .publish(&PublishRequest {
            preset_id: args.preset,
            media_id: uploaded.first().map(|m| m.id),
            title: args.title,
            description: args.description,
            scheduled_at: None,
        })
        .await?;

    println!(
        "Publication {} queued with status '{}'",
        publication.id, publication.status
    );
    Ok(())
}

async fn upload_one(client: &ApiClient, path: &Path) -> Result<UploadedMedia> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();
    let mime = mime_for_path(path);

    let media = client.upload_media(&filename, bytes, mime).await?;
    println!("  {} -> media {}", filename, media.id);
    Ok(media)
}

/// MIME type by extension, covering what the backend accepts. Unknown
/// extensions are sent without a type and the backend decides.
fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "pdf" => "application/pdf",
        "doc" | "docx" => "application/msword",
        _ => return None,
    };
    Some(mime)
}
