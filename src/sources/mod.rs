//! Site adapters, each behind its own feature flag.
//!
//! # Feature Flags
//!
//! - `source-momonohanascan` - Momo no Hana Scan (Madara)
//! - `source-fenixscanlator` - Fênix Scanlator (WPMangaStream)
//! - `all-sources` - Enables all sources (default)
//!
//! # Examples
//!
//! Build with only one site:
//! ```bash
//! cargo build --no-default-features --features source-momonohanascan
//! ```

/// Implements [`Source`](crate::source::Source) for an adapter by forwarding
/// every call to its `inner` template.
macro_rules! delegate_source {
    ($adapter:ty) => {
        #[async_trait::async_trait]
        impl $crate::source::Source for $adapter {
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

            fn client(&self) -> &$crate::net::HttpClient {
                self.inner.client()
            }

            fn version_id(&self) -> u32 {
                self.inner.version_id()
            }

            fn supports_latest(&self) -> bool {
                self.inner.supports_latest()
            }

            async fn popular(&self, page: u32) -> $crate::error::Result<$crate::types::MangasPage> {
                self.inner.popular(page).await
            }

            async fn latest(&self, page: u32) -> $crate::error::Result<$crate::types::MangasPage> {
                self.inner.latest(page).await
            }

            async fn search(
                &self,
                params: $crate::types::SearchParams,
            ) -> $crate::error::Result<$crate::types::MangasPage> {
                self.inner.search(params).await
            }

            async fn get_details(&self, manga_id: &str) -> $crate::error::Result<$crate::types::Manga> {
                self.inner.get_details(manga_id).await
            }

            async fn get_chapters(
                &self,
                manga_id: &str,
            ) -> $crate::error::Result<Vec<$crate::types::Chapter>> {
                self.inner.get_chapters(manga_id).await
            }

            async fn get_pages(&self, chapter_id: &str) -> $crate::error::Result<Vec<$crate::types::Page>> {
                self.inner.get_pages(chapter_id).await
            }
        }
    };
}

#[cfg(feature = "source-momonohanascan")]
pub mod momonohanascan;

#[cfg(feature = "source-fenixscanlator")]
pub mod fenixscanlator;

#[cfg(feature = "source-momonohanascan")]
pub use momonohanascan::MomoNoHanaScan;

#[cfg(feature = "source-fenixscanlator")]
pub use fenixscanlator::FenixScanlator;
