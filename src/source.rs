//! Source trait and registry for site adapters.
//!
//! [`Source`] is the seam every template (Madara, WPMangaStream, ReaderFront)
//! implements; [`Sources`] holds a set of them and runs global searches.
//!
//! # Examples
//!
//! ```rust
//! use multisrc::prelude::*;
//! use multisrc::error::Result;
//!
//! # async fn example() -> Result<()> {
//! let mut sources = Sources::new();
//! # #[cfg(feature = "source-momonohanascan")]
//! sources.add(multisrc::sources::MomoNoHanaScan::new()?);
//!
//! let results = sources.search("hana").limit(10).flatten().await?;
//!
//! if let Some(source) = sources.get("momonohanascan") {
//!     let chapters = source.get_chapters("/manga/hana/").await?;
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use futures::future;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::{
    download,
    error::Result,
    net::HttpClient,
    search::SearchBuilder,
    types::{Chapter, Manga, MangasPage, Page, SearchParams},
};

/// Trait that every manga source implements.
///
/// # Required Methods
///
/// * [`id()`](Source::id) - Unique identifier for the source
/// * [`name()`](Source::name) - Human-readable name
/// * [`base_url()`](Source::base_url) - Base URL of the site
/// * [`lang()`](Source::lang) - BCP-47 language tag of the content
/// * [`client()`](Source::client) - The source's rate-limited HTTP client
/// * [`popular()`](Source::popular) / [`latest()`](Source::latest) - Listings
/// * [`search()`](Source::search) - Search for manga
/// * [`get_details()`](Source::get_details) - Full metadata for one series
/// * [`get_chapters()`](Source::get_chapters) - Chapters of a series
/// * [`get_pages()`](Source::get_pages) - Page images of a chapter
///
/// # Implementation Guidelines
///
/// - Send every request through [`client()`](Source::client) so it counts
///   against the per-source rate limit
/// - Ensure all returned manga and chapters have `source_id` set
#[async_trait]
pub trait Source: Send + Sync {
    fn id(&self) -> &'static str;

    fn name(&self) -> &'static str;

    fn base_url(&self) -> &str;

    fn lang(&self) -> &str;

    /// The rate-limited client every request of this source goes through.
    fn client(&self) -> &HttpClient;

    /// Bumped when a site moves to another template and stored ids change.
    fn version_id(&self) -> u32 {
        1
    }

    fn supports_latest(&self) -> bool {
        true
    }

    /// Popular listing, 1-based `page`.
    async fn popular(&self, page: u32) -> Result<MangasPage>;

    /// Latest-updates listing, 1-based `page`.
    async fn latest(&self, page: u32) -> Result<MangasPage>;

    async fn search(&self, params: SearchParams) -> Result<MangasPage>;

    /// Fetches the full metadata of the series keyed by `manga_id`.
    async fn get_details(&self, manga_id: &str) -> Result<Manga>;

    async fn get_chapters(&self, manga_id: &str) -> Result<Vec<Chapter>>;

    async fn get_pages(&self, chapter_id: &str) -> Result<Vec<Page>>;

    /// Downloads every page of a chapter into `output_dir/<sanitized id>`.
    ///
    /// Pages are saved as `page_001.<ext>`, the extension coming from the image
    /// URL (`jpg` when it has none). Returns the chapter directory.
    async fn download_chapter(&self, chapter_id: &str, output_dir: &Path) -> Result<PathBuf> {
        let pages = self.get_pages(chapter_id).await?;
        if pages.is_empty() {
            return Err(crate::Error::source(
                self.id(),
                "No pages found for chapter",
            ));
        }

        let chapter_dir = output_dir.join(download::sanitize_filename(chapter_id));
        tokio::fs::create_dir_all(&chapter_dir).await?;

        for page in &pages {
            let path = chapter_dir.join(download::page_filename(page));
            download::download_file(self.client(), &page.image_url, &path).await?;
        }

        log::info!(
            "[{}] downloaded {} pages to {}",
            self.id(),
            pages.len(),
            chapter_dir.display()
        );
        Ok(chapter_dir)
    }
}

/// A collection of sources indexed by id.
///
/// Adding a source whose id is already registered replaces the lookup entry,
/// so [`get()`](Sources::get) returns the most recently added one.
pub struct Sources {
    sources: Vec<Box<dyn Source>>,
    by_id: HashMap<String, usize>,
}

impl Sources {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    /// Registry holding every source enabled through cargo features.
    ///
    /// A source that fails to build is logged and left out.
    pub fn with_enabled() -> Self {
        let mut sources = Self::new();
        #[cfg(feature = "source-momonohanascan")]
        sources.add_built("momonohanascan", crate::sources::MomoNoHanaScan::new());
        #[cfg(feature = "source-fenixscanlator")]
        sources.add_built("fenixscanlator", crate::sources::FenixScanlator::new());
        sources
    }

    #[allow(dead_code)]
    fn add_built(&mut self, id: &str, built: Result<impl Source + 'static>) {
        match built {
            Ok(source) => {
                self.add(source);
            }
            Err(e) => log::warn!("[{}] source disabled: {}", id, e),
        }
    }

    /// Starts a fluent search across the registered sources.
    pub fn search(&self, query: impl Into<String>) -> SearchBuilder<'_> {
        SearchBuilder::new(self, query)
    }

    pub fn add(&mut self, source: impl Source + 'static) -> &mut Self {
        let id = source.id().to_string();
        let index = self.sources.len();
        self.sources.push(Box::new(source));
        self.by_id.insert(id, index);
        self
    }

    pub fn get(&self, id: &str) -> Option<&dyn Source> {
        self.by_id
            .get(id)
            .and_then(|&index| self.sources.get(index))
            .map(|s| s.as_ref())
    }

    pub fn list_ids(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.id()).collect()
    }

    /// Searches every source concurrently, keeping each source's outcome.
    pub async fn search_all_grouped(
        &self,
        params: SearchParams,
    ) -> Vec<(String, Result<Vec<Manga>>)> {
        let futures = self.sources.iter().map(|source| {
            let params = params.clone();
            async move {
                let source_id = source.id().to_string();
                let result = source.search(params).await.map(|page| {
                    let mut manga = page.mangas;
                    for m in &mut manga {
                        m.source_id = source_id.clone();
                    }
                    manga
                });
                if let Err(e) = &result {
                    log::warn!("[{}] search failed: {}", source_id, e);
                }
                (source_id, result)
            }
        });

        future::join_all(futures).await
    }

    /// Searches every source and merges the results.
    ///
    /// Fails only when no source produced results and at least one failed.
    pub async fn search_all_flat(&self, params: SearchParams) -> Result<Vec<Manga>> {
        let grouped = self.search_all_grouped(params).await;

        let mut all_results = Vec::new();
        let mut errors = Vec::new();

        for (source_id, result) in grouped {
            match result {
                Ok(mut manga) => all_results.append(&mut manga),
                Err(e) => errors.push(format!("{}: {}", source_id, e)),
            }
        }

        if all_results.is_empty() && !errors.is_empty() {
            return Err(crate::Error::Other(format!(
                "All sources failed: {}",
                errors.join(", ")
            )));
        }

        Ok(all_results)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Default for Sources {
    fn default() -> Self {
        Self::new()
    }
}
