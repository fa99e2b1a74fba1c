//! Fluent global search over a [`Sources`] registry.
//!
//! # Examples
//!
//! ```rust
//! use multisrc::prelude::*;
//! # use multisrc::error::Result;
//!
//! # async fn example() -> Result<()> {
//! let sources = Sources::with_enabled();
//!
//! let results = sources
//!     .search("hana")
//!     .limit(20)
//!     .flatten()
//!     .await?
//!     .dedupe_by_title()
//!     .sort_by_query_relevance("hana");
//!
//! let grouped = sources.search("fenix").page(2).group().await;
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;

use crate::{
    error::Result,
    source::Sources,
    types::{Manga, SearchParams, SortOrder},
};

/// A fluent search builder bound to a [`Sources`] collection.
///
/// # Execution Strategies
///
/// - [`flatten()`](SearchBuilder::flatten) - All results in a single vector
/// - [`group()`](SearchBuilder::group) - Results grouped by source
/// - [`from_source()`](SearchBuilder::from_source) - One source only
/// - [`build()`](SearchBuilder::build) - Just the search parameters
pub struct SearchBuilder<'a> {
    sources: &'a Sources,
    params: SearchParams,
}

impl<'a> SearchBuilder<'a> {
    pub(crate) fn new(sources: &'a Sources, query: impl Into<String>) -> Self {
        Self {
            sources,
            params: SearchParams {
                query: query.into(),
                ..Default::default()
            },
        }
    }

    /// Listing page to request from each source (1-based).
    pub fn page(mut self, page: u32) -> Self {
        self.params.page = page.max(1);
        self
    }

    /// Caps the number of results taken from each source.
    pub fn limit(mut self, limit: usize) -> Self {
        self.params.limit = Some(limit);
        self
    }

    pub fn include_tags(mut self, tags: Vec<String>) -> Self {
        self.params.include_tags = tags;
        self
    }

    pub fn exclude_tags(mut self, tags: Vec<String>) -> Self {
        self.params.exclude_tags = tags;
        self
    }

    pub fn sort_by(mut self, sort: SortOrder) -> Self {
        self.params.sort_by = Some(sort);
        self
    }

    /// Runs the search on every source and merges the results.
    ///
    /// Individual source failures are logged and skipped; the call fails only
    /// when every source failed.
    pub async fn flatten(self) -> Result<Vec<Manga>> {
        let results = self.sources.search_all_flat(self.params.clone()).await?;
        Ok(finish(results, &self.params))
    }

    /// Runs the search and returns each source's outcome separately.
    pub async fn group(self) -> Vec<(String, Result<Vec<Manga>>)> {
        self.sources
            .search_all_grouped(self.params.clone())
            .await
            .into_iter()
            .map(|(id, result)| (id, result.map(|m| finish(m, &self.params))))
            .collect()
    }

    /// Runs the search on the source with id `source_id` only.
    ///
    /// # Errors
    ///
    /// * [`Error::NotFound`](crate::Error::NotFound) if the source isn't registered
    pub async fn from_source(self, source_id: &str) -> Result<Vec<Manga>> {
        let source = self
            .sources
            .get(source_id)
            .ok_or_else(|| crate::Error::not_found(format!("Source: {}", source_id)))?;

        let mut results = source.search(self.params.clone()).await?.mangas;
        for manga in &mut results {
            manga.source_id = source_id.to_string();
        }
        Ok(finish(results, &self.params))
    }

    pub fn build(self) -> SearchParams {
        self.params
    }
}

// Tag filters only see tags the listing carried; listings from CMS templates
// usually have none, so `include_tags` empties them.
fn finish(mut results: Vec<Manga>, params: &SearchParams) -> Vec<Manga> {
    if !params.include_tags.is_empty() || !params.exclude_tags.is_empty() {
        results = results.filter_tags(&params.include_tags, &params.exclude_tags);
    }
    let mut results = match params.sort_by {
        Some(SortOrder::Relevance) => results.sort_by_query_relevance(&params.query),
        Some(SortOrder::Title) => results.sort_by_title(),
        _ => results,
    };
    if let Some(limit) = params.limit {
        results.truncate(limit);
    }
    results
}

/// Post-processing helpers for search results.
pub trait SearchResultExt {
    /// Keeps the first manga of each title, compared case-insensitively.
    fn dedupe_by_title(self) -> Self;

    /// Keeps manga carrying every `include` tag and none of the `exclude` tags.
    ///
    /// Tags are compared case-insensitively.
    fn filter_tags(self, include: &[String], exclude: &[String]) -> Self;

    /// Sorts alphabetically by lowercased title.
    fn sort_by_title(self) -> Self;

    /// Sorts by how well each title matches `query`.
    ///
    /// Exact matches rank first, then titles containing the query, then titles
    /// sharing words with it. Ties go to the shorter title.
    fn sort_by_query_relevance(self, query: &str) -> Self;
}

impl SearchResultExt for Vec<Manga> {
    fn dedupe_by_title(mut self) -> Self {
        let mut seen = HashSet::new();
        self.retain(|manga| seen.insert(manga.title.to_lowercase()));
        self
    }

    fn filter_tags(self, include: &[String], exclude: &[String]) -> Self {
        let include: Vec<String> = include.iter().map(|t| t.to_lowercase()).collect();
        let exclude: Vec<String> = exclude.iter().map(|t| t.to_lowercase()).collect();
        self.into_iter()
            .filter(|manga| {
                let tags: HashSet<String> = manga.tags.iter().map(|t| t.to_lowercase()).collect();
                include.iter().all(|t| tags.contains(t)) && !exclude.iter().any(|t| tags.contains(t))
            })
            .collect()
    }

    fn sort_by_title(mut self) -> Self {
        self.sort_by_cached_key(|m| m.title.to_lowercase());
        self
    }

    fn sort_by_query_relevance(mut self, query: &str) -> Self {
        let query = query.trim().to_lowercase();
        self.sort_by(|a, b| {
            let score_a = query_score(&a.title, &query);
            let score_b = query_score(&b.title, &query);
            score_b
                .cmp(&score_a)
                .then_with(|| a.title.len().cmp(&b.title.len()))
        });
        self
    }
}

fn query_score(title: &str, query: &str) -> u32 {
    let title = title.to_lowercase();
    if query.is_empty() {
        return 0;
    }
    if title == query {
        return 100;
    }
    if title.contains(query) {
        return 50;
    }

    let query_words: Vec<&str> = query.split_whitespace().collect();
    let title_words: Vec<&str> = title.split_whitespace().collect();
    let matches = query_words
        .iter()
        .filter(|q| title_words.iter().any(|t| t.contains(*q) || q.contains(t)))
        .count() as u32;

    (matches * 25) / query_words.len().max(1) as u32
}
