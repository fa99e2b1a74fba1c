//! # multisrc - manga site adapters over shared CMS and API templates
//!
//! Many scanlation sites run the same software: the Madara or MangaStream
//! WordPress themes, or a ReaderFront GraphQL backend. This crate implements
//! each family once as a template and describes every site as a small
//! configuration on top of it: base URL, language, date format, a rate limit
//! and the odd selector override.
//!
//! ## Features
//!
//! - **Templates**: [`madara`], [`wpmangastream`] and [`readerfront`]
//! - **Site adapters**: feature-gated configurations in [`sources`]
//! - **Unified API**: one async [`Source`] trait and a [`Sources`] registry
//! - **Rate Limiting**: N requests per time window, per source
//! - **Dates**: locale-aware absolute and relative chapter dates
//! - **Parallel Parsing**: listing and chapter rows are mapped with rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use multisrc::prelude::*;
//! use multisrc::error::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let sources = Sources::with_enabled();
//!
//!     for id in sources.list_ids() {
//!         println!("enabled: {}", id);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Browsing a site
//!
//! ```rust,no_run
//! use multisrc::prelude::*;
//! use multisrc::error::Result;
//! use std::path::PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let sources = Sources::with_enabled();
//!     let Some(source) = sources.get("momonohanascan") else {
//!         return Ok(());
//!     };
//!
//!     let popular = source.popular(1).await?;
//!     let manga = &popular.mangas[0];
//!
//!     let details = source.get_details(&manga.id).await?;
//!     let chapters = source.get_chapters(&details.id).await?;
//!
//!     let dir = source
//!         .download_chapter(&chapters[0].id, &PathBuf::from("./downloads"))
//!         .await?;
//!     println!("Downloaded to: {}", dir.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`source`]: Core trait and collection for sources
//! - [`search`]: Fluent search builder and result processing
//! - [`multisrc`](mod@multisrc): The Madara, WPMangaStream and ReaderFront templates
//! - [`sources`]: Concrete site adapters
//! - [`types`]: Manga, chapters, pages and search parameters
//! - [`net`]: HTTP client, rate limiting, HTML and JSON helpers
//! - [`date`]: Chapter date parsing
//! - [`error`]: Error handling
//!
//! ## Search Strategies
//!
//! ```rust
//! # use multisrc::prelude::*;
//! # use multisrc::error::Result;
//!
//! # async fn example() -> Result<()> {
//! # let sources = Sources::new();
//! // Flatten results from all sources
//! let all_results = sources.search("hana").flatten().await?;
//!
//! // Group results by source
//! let grouped = sources.search("hana").group().await;
//!
//! // Search one source only
//! let specific = sources.search("hana").from_source("fenixscanlator").await;
//! # Ok(())
//! # }
//! ```

pub mod date;
pub mod download;
pub mod error;
pub mod multisrc;
pub mod net;
pub mod search;
pub mod source;
pub mod sources;
pub mod types;

pub use self::multisrc::{madara, readerfront, wpmangastream};

/// Prelude module for convenient imports.
///
/// ```rust
/// use multisrc::prelude::*;
///
/// let params: SearchParams = "hana".into();
/// assert_eq!(params.page, 1);
/// ```
pub mod prelude {
    pub use crate::{
        download::{download_file, extract_extension, sanitize_filename},
        search::{SearchBuilder, SearchResultExt},
        source::{Source, Sources},
        types::{Chapter, Manga, MangaStatus, MangasPage, Page, SearchParams, SortOrder},
    };
}

pub use download::{download_file, extract_extension, sanitize_filename};
pub use error::{Error, Result};
pub use search::{SearchBuilder, SearchResultExt};
pub use source::{Source, Sources};
pub use types::{Chapter, Manga, MangaStatus, MangasPage, Page, SearchParams, SortOrder};
