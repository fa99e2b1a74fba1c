//! Page image downloads.
//!
//! Sources download chapters through [`Source::download_chapter`](crate::source::Source::download_chapter);
//! the helpers here fetch single files and name them on disk.

use crate::error::Result;
use crate::net::HttpClient;
use crate::types::Page;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Downloads a single file from a URL to a local path.
///
/// The request goes through `client`, so it waits on the source's rate limit,
/// is retried like any other request and carries the source's headers
/// (scanlation CDNs often reject images without the site's `Referer`).
/// Parent directories are created as needed.
///
/// Returns the number of bytes written.
///
/// # Examples
///
/// ```rust,no_run
/// use multisrc::download::download_file;
/// use multisrc::net::{HttpClient, RateLimit};
/// use std::path::Path;
///
/// # async fn example() -> multisrc::Result<()> {
/// let client = HttpClient::new("momonohanascan")
///     .with_rate_limit(RateLimit::per_seconds(1, 2)?)
///     .with_header("Referer", "https://momonohanascan.com/");
///
/// let bytes = download_file(
///     &client,
///     "https://momonohanascan.com/wp-content/uploads/page.jpg",
///     Path::new("./page.jpg"),
/// ).await?;
/// println!("Downloaded {} bytes", bytes);
/// # Ok(())
/// # }
/// ```
pub async fn download_file(client: &HttpClient, url: &str, output_path: &Path) -> Result<u64> {
    let bytes = client.get(url).await?;
    write_file(output_path, &bytes).await?;

    log::debug!("[{}] downloaded {} ({} bytes)", client.source_id(), url, bytes.len());
    Ok(bytes.len() as u64)
}

async fn write_file(output_path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let mut file = fs::File::create(output_path).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    Ok(())
}

/// Sanitizes a filename by replacing characters most filesystems reject.
///
/// ```rust
/// use multisrc::download::sanitize_filename;
///
/// let clean = sanitize_filename("/manga/hana/capitulo-1/");
/// assert_eq!(clean, "_manga_hana_capitulo-1_");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    let invalid_chars = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];
    let mut sanitized: String = name
        .chars()
        .map(|c| if invalid_chars.contains(&c) { '_' } else { c })
        .collect();

    sanitized = sanitized.trim().to_string();
    if sanitized.len() > 200 {
        let mut cut = 200;
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized.truncate(cut);
    }

    if sanitized.is_empty() {
        sanitized = "untitled".to_string();
    }

    sanitized
}

/// File extension of a URL path, lowercased, ignoring query and fragment.
///
/// ```rust
/// use multisrc::download::extract_extension;
///
/// assert_eq!(extract_extension("https://cdn.site.com/01.webp?w=350"), Some("webp".to_string()));
/// assert_eq!(extract_extension("https://cdn.site.com/image"), None);
/// ```
pub fn extract_extension(url: &str) -> Option<String> {
    let clean_url = url.split(['?', '#']).next()?;
    let file = clean_url.rsplit('/').next()?;

    let (_, ext) = file.rsplit_once('.')?;
    (!ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .then(|| ext.to_lowercase())
}

/// On-disk name of a page: `page_001.jpg` for index 0.
pub fn page_filename(page: &Page) -> String {
    let ext = extract_extension(&page.image_url).unwrap_or_else(|| "jpg".to_string());
    format!("page_{:03}.{}", page.index + 1, ext)
}
