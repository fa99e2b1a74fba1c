//! Core data types shared by every source template.
//!
//! - [`Manga`] - A series with its metadata
//! - [`MangaStatus`] - Publication status of a series
//! - [`Chapter`] - A single chapter entry
//! - [`Page`] - One image of a chapter
//! - [`MangasPage`] - One page of a listing
//! - [`SearchParams`] - Parameters for searching manga
//! - [`SortOrder`] - Sorting options for search results
//!
//! # Examples
//!
//! ```rust
//! use multisrc::types::*;
//!
//! let manga = Manga {
//!     id: "/manga/hana-no-kage/".to_string(),
//!     title: "Hana no Kage".to_string(),
//!     source_id: "momonohanascan".to_string(),
//!     status: MangaStatus::Ongoing,
//!     ..Default::default()
//! };
//! assert!(manga.artists.is_empty());
//! ```

use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Represents a manga/comic series with its metadata.
///
/// # Fields
///
/// * `id` - Key within the source, used to fetch details and chapters. CMS
///   templates store the site-relative path, ReaderFront stores the work stub.
/// * `title` - The main title of the manga
/// * `url` - Absolute web URL of the series page, when known
/// * `cover_url` - Optional URL to the cover image
/// * `authors` / `artists` - Credited people
/// * `description` - Optional synopsis (may include alternative names)
/// * `tags` - Genre tags and categories
/// * `status` - Publication status
/// * `source_id` - Identifier of the source this manga came from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manga {
    pub id: String,

    pub title: String,

    #[serde(default)]
    pub url: Option<String>,

    pub cover_url: Option<String>,

    #[serde(default)]
    pub authors: Vec<String>,

    #[serde(default)]
    pub artists: Vec<String>,

    pub description: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub status: MangaStatus,

    pub source_id: String,
}

/// Publication status of a series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MangaStatus {
    #[default]
    Unknown,
    Ongoing,
    Completed,
    /// Licensed in the reader's market and no longer published by the group.
    Licensed,
    Hiatus,
    Cancelled,
}

/// A single chapter of a series.
///
/// `number` is `-1.0` when the chapter number could not be determined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,

    pub number: f64,

    pub title: String,

    #[serde(default)]
    pub date_upload: Option<DateTime<Utc>>,

    #[serde(default)]
    pub scanlator: Option<String>,

    pub manga_id: String,

    pub source_id: String,
}

impl Default for Chapter {
    fn default() -> Self {
        Self {
            id: String::new(),
            number: -1.0,
            title: String::new(),
            date_upload: None,
            scanlator: None,
            manga_id: String::new(),
            source_id: String::new(),
        }
    }
}

/// One page (image) of a chapter.
///
/// `url` is the page's own location when the site has per-page URLs and is
/// empty otherwise; `image_url` is always the address of the image itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub index: usize,
    pub url: String,
    pub image_url: String,
}

impl Page {
    pub fn new(index: usize, image_url: impl Into<String>) -> Self {
        Self {
            index,
            url: String::new(),
            image_url: image_url.into(),
        }
    }
}

/// One page of a popular/latest/search listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MangasPage {
    pub mangas: Vec<Manga>,
    pub has_next_page: bool,
}

impl MangasPage {
    pub fn new(mangas: Vec<Manga>, has_next_page: bool) -> Self {
        Self {
            mangas,
            has_next_page,
        }
    }
}

/// Search parameters for querying manga sources.
///
/// # Examples
///
/// ```rust
/// use multisrc::types::{SearchParams, SearchParamsBuilder, SortOrder};
///
/// let params = SearchParamsBuilder::default()
///     .query("hana")
///     .page(2u32)
///     .limit(Some(10))
///     .sort_by(Some(SortOrder::Popular))
///     .build()
///     .unwrap();
/// assert_eq!(params.page, 2);
///
/// let simple: SearchParams = "hana".into();
/// assert_eq!(simple.page, 1);
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct SearchParams {
    pub query: String,
    /// 1-based listing page.
    #[builder(default = "1")]
    pub page: u32,
    #[builder(default)]
    pub limit: Option<usize>,
    #[builder(default)]
    pub include_tags: Vec<String>,
    #[builder(default)]
    pub exclude_tags: Vec<String>,
    #[builder(default)]
    pub sort_by: Option<SortOrder>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            query: String::new(),
            page: 1,
            limit: None,
            include_tags: Vec::new(),
            exclude_tags: Vec::new(),
            sort_by: None,
        }
    }
}

/// Sorting options for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Relevance,
    Popular,
    UpdatedAt,
    Title,
}

impl From<String> for SearchParams {
    fn from(query: String) -> Self {
        SearchParams {
            query,
            ..Default::default()
        }
    }
}

impl From<&str> for SearchParams {
    fn from(query: &str) -> Self {
        SearchParams {
            query: query.to_string(),
            ..Default::default()
        }
    }
}
