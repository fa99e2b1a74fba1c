//! Template for sites backed by a ReaderFront GraphQL API.
//!
//! The API lives on the `api.` subdomain of the site and is queried with
//! `GET {api}?query=...`. Manga ids are work stubs, chapter ids are the
//! numeric release ids.
//!
//! A site implements [`ReaderFrontImpl`], mainly to say where its images are
//! served from, and wraps itself in [`ReaderFront`]:
//!
//! ```rust
//! use multisrc::readerfront::{ReaderFront, ReaderFrontImpl};
//! use multisrc::Source;
//!
//! struct Example;
//!
//! impl ReaderFrontImpl for Example {
//!     fn id(&self) -> &'static str { "example" }
//!     fn name(&self) -> &'static str { "Example" }
//!     fn base_url(&self) -> &'static str { "https://example.com" }
//!     fn lang(&self) -> &'static str { "es" }
//!
//!     fn image_cdn(&self, path: &str, width: u32) -> String {
//!         format!("https://cdn.example.com/{}?w={}", path, width)
//!     }
//! }
//!
//! let source = ReaderFront::new(Example);
//! assert_eq!(source.api_url(), "https://api.example.com");
//! assert_eq!(source.lang(), "es");
//! ```

use async_trait::async_trait;

use crate::{
    error::{Error, Result},
    net::{ClientConfig, HttpClient},
    source::Source,
    types::{Chapter, Manga, MangaStatus, MangasPage, Page, SearchParams},
};

mod i18n;
pub mod models;
pub mod queries;

pub use i18n::I18n;
use models::{ChapterPages, Release, Work};

/// Width requested from the image CDN when the API gives none.
pub const DEFAULT_IMAGE_WIDTH: u32 = 350;

const LATEST_LIMIT: u32 = 12;
const POPULAR_LIMIT: u32 = 120;

/// What a ReaderFront site provides.
pub trait ReaderFrontImpl: Send + Sync {
    fn id(&self) -> &'static str;

    fn name(&self) -> &'static str;

    fn base_url(&self) -> &'static str;

    fn lang(&self) -> &'static str;

    /// GraphQL endpoint. Defaults to the base URL on the `api.` subdomain.
    fn api_url(&self) -> String {
        default_api_url(self.base_url())
    }

    /// Absolute image URL for a CDN `path` resized to `width`.
    fn image_cdn(&self, path: &str, width: u32) -> String;

    fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
    }
}

/// `https://site.com` becomes `https://api.site.com`.
///
/// ```rust
/// use multisrc::readerfront::default_api_url;
///
/// assert_eq!(default_api_url("https://reader.site.com/"), "https://api.reader.site.com");
/// ```
pub fn default_api_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').replacen("://", "://api.", 1)
}

/// A [`Source`] backed by a ReaderFront API.
pub struct ReaderFront<T: ReaderFrontImpl> {
    inner: T,
    client: HttpClient,
    i18n: I18n,
    api_url: String,
}

impl<T: ReaderFrontImpl> ReaderFront<T> {
    pub fn new(inner: T) -> Self {
        let client = HttpClient::from_config(inner.id(), &inner.client_config())
            .unwrap_or_else(|e| {
                log::warn!("[{}] invalid client config, using defaults: {}", inner.id(), e);
                HttpClient::new(inner.id())
            })
            .with_header("Referer", &format!("{}/", inner.base_url().trim_end_matches('/')));

        Self {
            i18n: I18n::new(inner.lang()),
            api_url: inner.api_url(),
            client,
            inner,
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn i18n(&self) -> I18n {
        self.i18n
    }

    /// Web page of a work, `{base}/work/{lang}/{stub}`.
    pub fn work_url(&self, stub: &str) -> String {
        format!(
            "{}/work/{}/{}",
            self.inner.base_url().trim_end_matches('/'),
            self.inner.lang(),
            stub
        )
    }

    /// Listing entry: stub, title and thumbnail only.
    pub fn work_to_manga(&self, work: &Work) -> Manga {
        Manga {
            id: work.stub.clone(),
            title: work.to_string(),
            url: Some(self.work_url(&work.stub)),
            cover_url: Some(self.inner.image_cdn(&work.thumbnail_path, DEFAULT_IMAGE_WIDTH)),
            source_id: self.inner.id().to_string(),
            ..Default::default()
        }
    }

    /// Full details of a work.
    pub fn work_to_details(&self, work: &Work) -> Manga {
        let mut tags = Vec::new();
        if work.adult.unwrap_or(false) {
            tags.push("18+".to_string());
        }
        if let Some(demographic) = work.demographic_name.as_deref().filter(|d| !d.is_empty()) {
            tags.push(demographic.to_string());
        }
        tags.extend(work.genres.iter().map(|g| self.i18n.genre(g.genre_id)));
        if let Some(kind) = work.kind.as_deref().filter(|k| !k.is_empty()) {
            tags.push(kind.to_string());
        }

        let status = if work.licensed.unwrap_or(false) {
            MangaStatus::Licensed
        } else {
            match work.status_name.as_deref() {
                Some("on_going") => MangaStatus::Ongoing,
                Some("completed") => MangaStatus::Completed,
                _ => MangaStatus::Unknown,
            }
        };

        Manga {
            authors: work.authors(),
            artists: work.artists(),
            description: work.description.clone().filter(|d| !d.trim().is_empty()),
            tags,
            status,
            ..self.work_to_manga(work)
        }
    }

    pub fn release_to_chapter(&self, release: &Release, stub: &str) -> Chapter {
        Chapter {
            id: release.id.to_string(),
            number: release.number(),
            title: release.to_string(),
            date_upload: release.timestamp(),
            scanlator: None,
            manga_id: stub.to_string(),
            source_id: self.inner.id().to_string(),
        }
    }

    pub fn chapter_to_pages(&self, chapter: &ChapterPages) -> Vec<Page> {
        chapter
            .into_iter()
            .enumerate()
            .map(|(index, page)| {
                Page::new(index, self.inner.image_cdn(&chapter.path(page), page.width))
            })
            .collect()
    }

    async fn works(&self, sort_by: &str, order_by: &str, page: u32, limit: u32) -> Result<MangasPage> {
        let query = queries::works(self.i18n.id(), sort_by, order_by, page.max(1), limit);
        let works: Vec<Work> = self.client.get_graphql(&self.api_url, &query, "works").await?;

        let mangas = works.iter().map(|w| self.work_to_manga(w)).collect();
        Ok(MangasPage::new(mangas, false))
    }
}

/// Keeps works whose title contains `query`, ignoring case.
pub fn filter_by_title(mut page: MangasPage, query: &str) -> MangasPage {
    let query = query.trim().to_lowercase();
    page.mangas.retain(|m| m.title.to_lowercase().contains(&query));
    page
}

#[async_trait]
impl<T: ReaderFrontImpl> Source for ReaderFront<T> {
    fn id(&self) -> &'static str {
        self.inner.id()
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn base_url(&self) -> &str {
        self.inner.base_url()
    }

    fn lang(&self) -> &str {
        self.inner.lang()
    }

    fn client(&self) -> &HttpClient {
        &self.client
    }

    async fn popular(&self, page: u32) -> Result<MangasPage> {
        self.works("stub", "ASC", page, POPULAR_LIMIT).await
    }

    async fn latest(&self, page: u32) -> Result<MangasPage> {
        self.works("updatedAt", "DESC", page, LATEST_LIMIT).await
    }

    /// The API has no search; the popular page is filtered by title.
    async fn search(&self, params: SearchParams) -> Result<MangasPage> {
        let page = self.popular(params.page).await?;
        let mut page = filter_by_title(page, &params.query);
        if let Some(limit) = params.limit {
            page.mangas.truncate(limit);
        }
        Ok(page)
    }

    async fn get_details(&self, manga_id: &str) -> Result<Manga> {
        let query = queries::work(self.i18n.id(), manga_id);
        let work: Option<Work> = self.client.get_graphql(&self.api_url, &query, "work").await?;
        let work = work.ok_or_else(|| Error::not_found(format!("Work: {}", manga_id)))?;
        Ok(self.work_to_details(&work))
    }

    async fn get_chapters(&self, manga_id: &str) -> Result<Vec<Chapter>> {
        let query = queries::chapters_by_work(self.i18n.id(), manga_id);
        let releases: Vec<Release> = self
            .client
            .get_graphql(&self.api_url, &query, "chaptersByWork")
            .await?;

        Ok(releases
            .iter()
            .map(|r| self.release_to_chapter(r, manga_id))
            .collect())
    }

    async fn get_pages(&self, chapter_id: &str) -> Result<Vec<Page>> {
        let id: u64 = chapter_id
            .trim()
            .parse()
            .map_err(|_| Error::parse(format!("Invalid chapter id: {}", chapter_id)))?;

        let query = queries::chapter_by_id(id);
        let chapter: Option<ChapterPages> = self
            .client
            .get_graphql(&self.api_url, &query, "chapterById")
            .await?;
        let chapter = chapter.ok_or_else(|| Error::not_found(format!("Chapter: {}", id)))?;

        Ok(self.chapter_to_pages(&chapter))
    }
}
