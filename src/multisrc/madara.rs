//! Template for sites running the Madara WordPress theme.
//!
//! Series live under `{base_url}/{manga_sub_path}/{slug}/` and chapters under
//! the series path. Manga and chapter ids are site-relative paths
//! (`/manga/slug/`, `/manga/slug/capitulo-1/`).
//!
//! # Examples
//!
//! ```rust
//! use multisrc::madara::{Madara, MadaraConfig};
//! use multisrc::net::{ClientConfig, RateLimit};
//! use multisrc::Source;
//!
//! # fn main() -> multisrc::Result<()> {
//! let config = MadaraConfig {
//!     client: ClientConfig::default().with_rate_limit(RateLimit::per_seconds(1, 2)?),
//!     use_new_chapter_endpoint: true,
//!     ..MadaraConfig::new("example", "Example Scan", "https://example.com", "pt-BR", "dd/MM/yyyy")
//! };
//! let source = Madara::new(config);
//! assert_eq!(source.name(), "Example Scan");
//! assert_eq!(source.client().rate_limit().permits(), 1);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scraper::ElementRef;

use super::{InfoRow, chapter_number, info_value, is_placeholder, parse_status, with_alt_names};
use crate::{
    date::DateFormat,
    error::{Error, Result},
    net::{ClientConfig, HttpClient, html},
    source::Source,
    types::{Chapter, Manga, MangasPage, Page, SearchParams, SortOrder},
};

/// CSS selectors used by [`Madara`]. Every field has a default matching the
/// stock theme; adapters override only what their site changed.
#[derive(Debug, Clone)]
pub struct MadaraSelectors {
    pub popular_manga: String,
    pub search_manga: String,
    /// Link inside a listing item; its `href` is the series URL.
    pub manga_url: String,
    pub manga_cover: String,
    pub next_page: String,
    pub details_title: String,
    pub details_cover: String,
    pub details_author: String,
    pub details_artist: String,
    pub details_description: String,
    pub details_genre: String,
    /// Summary rows holding status, type and alternative names.
    pub info_rows: Vec<InfoRow>,
    pub chapter: String,
    pub chapter_url: String,
    pub chapter_date: String,
    /// Element whose `data-id` feeds the legacy `admin-ajax.php` chapter request.
    pub chapter_holder: String,
    pub page_images: String,
}

impl Default for MadaraSelectors {
    fn default() -> Self {
        Self {
            popular_manga: "div.page-item-detail".to_string(),
            search_manga: "div.c-tabs-item__content, .manga__item".to_string(),
            manga_url: "div.post-title a".to_string(),
            manga_cover: "img".to_string(),
            next_page: "div.nav-previous, nav.navigation-ajax, a.nextpostslink".to_string(),
            details_title: "div.post-title h3, div.post-title h1, #manga-title > h1".to_string(),
            details_cover: "div.summary_image img".to_string(),
            details_author: "div.author-content > a, div.manga-authors > a".to_string(),
            details_artist: "div.artist-content > a".to_string(),
            details_description: "div.description-summary div.summary__content, \
                                  div.summary_content div.post-content_item > h5 + div, \
                                  div.summary_content div.manga-excerpt"
                .to_string(),
            details_genre: "div.genres-content a".to_string(),
            info_rows: vec![InfoRow::new(
                "div.post-content_item, div.post-status div.post-content_item",
                "div.summary-heading",
                "div.summary-content",
            )],
            chapter: "li.wp-manga-chapter".to_string(),
            chapter_url: "a".to_string(),
            chapter_date: "span.chapter-release-date".to_string(),
            chapter_holder: "div[id^=manga-chapters-holder]".to_string(),
            page_images: "div.page-break, li.blocks-gallery-item, .reading-content .text-left img"
                .to_string(),
        }
    }
}

/// Everything a Madara site adapter provides.
#[derive(Debug, Clone)]
pub struct MadaraConfig {
    pub id: &'static str,
    pub name: &'static str,
    pub base_url: &'static str,
    pub lang: &'static str,
    /// Pattern of absolute chapter dates, in the site's locale.
    pub date_format: &'static str,
    pub client: ClientConfig,
    /// Path segment listing pages live under.
    pub manga_sub_path: &'static str,
    /// Load chapters from `{manga_url}/ajax/chapters` instead of `admin-ajax.php`.
    pub use_new_chapter_endpoint: bool,
    /// Prefix for alternative names appended to the description.
    pub alt_name: &'static str,
    pub selectors: MadaraSelectors,
}

impl MadaraConfig {
    pub fn new(
        id: &'static str,
        name: &'static str,
        base_url: &'static str,
        lang: &'static str,
        date_format: &'static str,
    ) -> Self {
        Self {
            id,
            name,
            base_url,
            lang,
            date_format,
            client: ClientConfig::default(),
            manga_sub_path: "manga",
            use_new_chapter_endpoint: false,
            alt_name: "Alternative Name: ",
            selectors: MadaraSelectors::default(),
        }
    }
}

const STATUS_LABELS: &[&str] = &["status", "estado"];
const TYPE_LABELS: &[&str] = &["type", "tipo"];
const ALT_LABELS: &[&str] = &["alt", "outros nomes", "otros nombres"];

/// A [`Source`] for one Madara site.
pub struct Madara {
    config: MadaraConfig,
    client: HttpClient,
    date_format: DateFormat,
}

impl Madara {
    pub fn new(config: MadaraConfig) -> Self {
        let client = HttpClient::from_config(config.id, &config.client)
            .unwrap_or_else(|e| {
                log::warn!("[{}] invalid client config, using defaults: {}", config.id, e);
                HttpClient::new(config.id)
            })
            .with_header("Referer", &format!("{}/", config.base_url.trim_end_matches('/')));
        let date_format = DateFormat::new(config.date_format, config.lang);

        Self {
            config,
            client,
            date_format,
        }
    }

    pub fn config(&self) -> &MadaraConfig {
        &self.config
    }

    fn base(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn page_path(page: u32) -> String {
        if page <= 1 {
            String::new()
        } else {
            format!("page/{}/", page)
        }
    }

    /// Popular (`views`) or latest (`latest`) listing URL.
    pub fn listing_url(&self, page: u32, order: &str) -> String {
        format!(
            "{}/{}/{}?m_orderby={}",
            self.base(),
            self.config.manga_sub_path.trim_matches('/'),
            Self::page_path(page),
            order
        )
    }

    pub fn search_url(&self, params: &SearchParams) -> String {
        let mut url = format!(
            "{}/{}?s={}&post_type=wp-manga",
            self.base(),
            Self::page_path(params.page),
            urlencoding::encode(params.query.trim())
        );
        let order = match params.sort_by {
            Some(SortOrder::Popular) => Some("views"),
            Some(SortOrder::UpdatedAt) => Some("latest"),
            Some(SortOrder::Title) => Some("alphabet"),
            _ => None,
        };
        if let Some(order) = order {
            url.push_str("&m_orderby=");
            url.push_str(order);
        }
        url
    }

    /// Parses a listing page using `item_selector` for the entries.
    pub fn parse_manga_list(&self, body: &str, item_selector: &str) -> MangasPage {
        let document = html::parse(body);
        let selectors = &self.config.selectors;

        let mangas = html::parse_items(&document, item_selector, |item| {
            let link = html::select_first_in(item, &selectors.manga_url)?;
            let href = link.value().attr("href")?;
            let title = match html::own_text(link) {
                t if t.is_empty() => html::text_of(link),
                t => t,
            };
            if title.is_empty() {
                return None;
            }

            Some(Manga {
                id: html::relative_key(self.base(), href),
                title,
                url: Some(html::absolute_url(self.base(), href)),
                cover_url: html::select_first_in(item, &selectors.manga_cover)
                    .and_then(html::img_attr)
                    .map(|src| html::absolute_url(self.base(), &src)),
                source_id: self.config.id.to_string(),
                ..Default::default()
            })
        });

        MangasPage::new(mangas, html::select_first(&document, &selectors.next_page).is_some())
    }

    /// Parses a series page into full metadata.
    pub fn parse_details(&self, manga_id: &str, body: &str) -> Result<Manga> {
        let document = html::parse(body);
        let root = document.root_element();
        let selectors = &self.config.selectors;

        let title = html::select_first(&document, &selectors.details_title)
            .map(|el| match html::own_text(el) {
                t if t.is_empty() => html::text_of(el),
                t => t,
            })
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::parse(format!("No title on {}", manga_id)))?;

        let mut tags = html::select_all_text(&document, &selectors.details_genre);
        if let Some(kind) = info_value(root, &selectors.info_rows, TYPE_LABELS)
            .map(html::text_of)
            .filter(|k| !is_placeholder(k))
        {
            tags.push(kind);
        }

        let description = html::select_first(&document, &selectors.details_description)
            .map(description_text)
            .filter(|d| !d.is_empty());
        let alt_names = info_value(root, &selectors.info_rows, ALT_LABELS).map(html::text_of);

        Ok(Manga {
            id: manga_id.to_string(),
            title,
            url: Some(html::absolute_url(self.base(), manga_id)),
            cover_url: html::select_first(&document, &selectors.details_cover)
                .and_then(html::img_attr)
                .map(|src| html::absolute_url(self.base(), &src)),
            authors: html::select_all_text(&document, &selectors.details_author),
            artists: html::select_all_text(&document, &selectors.details_artist),
            description: with_alt_names(description, self.config.alt_name, alt_names),
            tags,
            status: info_value(root, &selectors.info_rows, STATUS_LABELS)
                .map(|el| parse_status(&html::text_of(el)))
                .unwrap_or_default(),
            source_id: self.config.id.to_string(),
        })
    }

    /// Parses chapter rows, from a series page or an ajax response.
    pub fn parse_chapters(&self, manga_id: &str, body: &str, now: DateTime<Utc>) -> Vec<Chapter> {
        let document = html::parse(body);
        let selectors = &self.config.selectors;

        html::parse_items(&document, &selectors.chapter, |row| {
            let link = html::select_first_in(row, &selectors.chapter_url)?;
            let href = link.value().attr("href")?;
            let title = html::text_of(link);

            // New chapters show "2 days ago" in a link title instead of a date.
            let date_text = html::select_first_in(row, &selectors.chapter_date)
                .map(html::text_of)
                .filter(|t| !t.is_empty())
                .or_else(|| {
                    html::select_first_in(row, "span a[title]")
                        .and_then(|a| a.value().attr("title"))
                        .map(String::from)
                });

            Some(Chapter {
                id: html::relative_key(self.base(), href),
                number: chapter_number(&title).unwrap_or(-1.0),
                title,
                date_upload: date_text
                    .and_then(|text| self.date_format.parse_chapter_date(&text, now)),
                scanlator: None,
                manga_id: manga_id.to_string(),
                source_id: self.config.id.to_string(),
            })
        })
    }

    /// Id for the legacy chapter request, from the series page.
    pub fn chapter_holder_id(&self, body: &str) -> Option<String> {
        let document = html::parse(body);
        html::select_attr(&document, &self.config.selectors.chapter_holder, "data-id")
    }

    /// Parses reader page images in document order.
    pub fn parse_pages(&self, chapter_url: &str, body: &str) -> Vec<Page> {
        let document = html::parse(body);
        let Some(sel) = html::selector(&self.config.selectors.page_images) else {
            return Vec::new();
        };

        document
            .select(&sel)
            .filter_map(|el| {
                let img = if el.value().name() == "img" {
                    Some(el)
                } else {
                    html::select_first_in(el, "img")
                };
                img.and_then(html::img_attr)
            })
            .enumerate()
            .map(|(index, src)| Page {
                index,
                url: chapter_url.to_string(),
                image_url: html::absolute_url(self.base(), &src),
            })
            .collect()
    }

    /// Decides where the chapter rows of a series are loaded from when the
    /// series page has none inline.
    ///
    /// # Errors
    ///
    /// [`Error::Parse`] when the old endpoint is configured and the page has
    /// no chapter holder id.
    pub fn chapter_request(&self, manga_url: &str, series_page: &str) -> Result<ChapterRequest> {
        if self.config.use_new_chapter_endpoint {
            return Ok(ChapterRequest::Endpoint {
                url: format!("{}/ajax/chapters/", manga_url.trim_end_matches('/')),
            });
        }

        let holder = self
            .chapter_holder_id(series_page)
            .ok_or_else(|| Error::parse(format!("No chapter holder id on {}", manga_url)))?;
        Ok(ChapterRequest::AdminAjax {
            url: format!("{}/wp-admin/admin-ajax.php", self.base()),
            holder,
        })
    }

    async fn fetch_chapter_rows(&self, manga_url: &str, series_page: &str) -> Result<String> {
        let xhr = [("X-Requested-With", "XMLHttpRequest")];

        match self.chapter_request(manga_url, series_page)? {
            ChapterRequest::Endpoint { url } => self.client.post_text(&url, &xhr).await,
            ChapterRequest::AdminAjax { url, holder } => {
                self.client
                    .post_form(&url, &[("action", "manga_get_chapters"), ("manga", holder.as_str())], &xhr)
                    .await
            }
        }
    }
}

/// Where [`Madara`] loads chapter rows from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterRequest {
    /// Empty `POST {manga_url}/ajax/chapters/`.
    Endpoint { url: String },
    /// `POST {base}/wp-admin/admin-ajax.php` with
    /// `action=manga_get_chapters&manga={holder}`.
    AdminAjax { url: String, holder: String },
}

/// Paragraphs of a description block joined by newlines.
fn description_text(el: ElementRef<'_>) -> String {
    let paragraphs: Vec<String> = html::select_all_in(el, "p")
        .into_iter()
        .map(html::text_of)
        .filter(|p| !p.is_empty())
        .collect();

    if paragraphs.is_empty() {
        html::text_of(el)
    } else {
        paragraphs.join("\n")
    }
}

#[async_trait]
impl Source for Madara {
    fn id(&self) -> &'static str {
        self.config.id
    }

    fn name(&self) -> &'static str {
        self.config.name
    }

    fn base_url(&self) -> &str {
        self.config.base_url
    }

    fn lang(&self) -> &str {
        self.config.lang
    }

    fn client(&self) -> &HttpClient {
        &self.client
    }

    async fn popular(&self, page: u32) -> Result<MangasPage> {
        let body = self.client.get_text(&self.listing_url(page, "views")).await?;
        Ok(self.parse_manga_list(&body, &self.config.selectors.popular_manga))
    }

    async fn latest(&self, page: u32) -> Result<MangasPage> {
        let body = self.client.get_text(&self.listing_url(page, "latest")).await?;
        Ok(self.parse_manga_list(&body, &self.config.selectors.popular_manga))
    }

    async fn search(&self, params: SearchParams) -> Result<MangasPage> {
        let body = self.client.get_text(&self.search_url(&params)).await?;
        let mut page = self.parse_manga_list(&body, &self.config.selectors.search_manga);
        if let Some(limit) = params.limit {
            page.mangas.truncate(limit);
        }
        Ok(page)
    }

    async fn get_details(&self, manga_id: &str) -> Result<Manga> {
        let url = html::absolute_url(self.base(), manga_id);
        let body = self.client.get_text(&url).await?;
        self.parse_details(manga_id, &body)
    }

    async fn get_chapters(&self, manga_id: &str) -> Result<Vec<Chapter>> {
        let url = html::absolute_url(self.base(), manga_id);
        let body = self.client.get_text(&url).await?;

        let chapters = self.parse_chapters(manga_id, &body, Utc::now());
        if !chapters.is_empty() {
            return Ok(chapters);
        }

        log::debug!("[{}] no chapters inline on {}, using ajax", self.config.id, url);
        let rows = self.fetch_chapter_rows(&url, &body).await?;
        Ok(self.parse_chapters(manga_id, &rows, Utc::now()))
    }

    async fn get_pages(&self, chapter_id: &str) -> Result<Vec<Page>> {
        let url = html::absolute_url(self.base(), chapter_id);
        let body = self.client.get_text(&url).await?;

        let pages = self.parse_pages(&url, &body);
        if pages.is_empty() {
            return Err(Error::not_found(format!("No pages found on {}", url)));
        }
        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(new_endpoint: bool) -> Madara {
        Madara::new(MadaraConfig {
            use_new_chapter_endpoint: new_endpoint,
            ..MadaraConfig::new("test", "Test", "https://scan.example/", "pt-BR", "dd/MM/yyyy")
        })
    }

    #[test]
    fn listing_urls_skip_first_page_segment() {
        let madara = source(true);
        assert_eq!(
            madara.listing_url(1, "views"),
            "https://scan.example/manga/?m_orderby=views"
        );
        assert_eq!(
            madara.listing_url(3, "latest"),
            "https://scan.example/manga/page/3/?m_orderby=latest"
        );
    }

    #[test]
    fn search_url_encodes_query_and_sort() {
        let madara = source(true);
        let params = SearchParams {
            query: "momo no hana".to_string(),
            page: 2,
            sort_by: Some(SortOrder::Popular),
            ..Default::default()
        };
        assert_eq!(
            madara.search_url(&params),
            "https://scan.example/page/2/?s=momo%20no%20hana&post_type=wp-manga&m_orderby=views"
        );
    }

    #[test]
    fn chapter_holder_comes_from_data_id() {
        let madara = source(false);
        let body = r#"<div id="manga-chapters-holder" data-id="4821"></div>"#;
        assert_eq!(madara.chapter_holder_id(body).as_deref(), Some("4821"));
        assert!(madara.chapter_holder_id("<div></div>").is_none());
    }

    #[test]
    fn new_endpoint_posts_under_the_series_url() {
        let madara = source(true);
        let request = madara
            .chapter_request("https://scan.example/manga/hana/", "<div></div>")
            .unwrap();
        assert_eq!(
            request,
            ChapterRequest::Endpoint {
                url: "https://scan.example/manga/hana/ajax/chapters/".to_string()
            }
        );
    }

    #[test]
    fn old_endpoint_posts_the_holder_to_admin_ajax() {
        let madara = source(false);
        let page = r#"<div id="manga-chapters-holder" data-id="4821"></div>"#;
        let request = madara
            .chapter_request("https://scan.example/manga/hana/", page)
            .unwrap();
        assert_eq!(
            request,
            ChapterRequest::AdminAjax {
                url: "https://scan.example/wp-admin/admin-ajax.php".to_string(),
                holder: "4821".to_string(),
            }
        );
    }

    #[test]
    fn old_endpoint_without_holder_is_a_parse_error() {
        let madara = source(false);
        let result = madara.chapter_request("https://scan.example/manga/hana/", "<div></div>");
        assert!(matches!(result, Err(Error::Parse(msg)) if msg.contains("/manga/hana/")));
    }

    #[test]
    fn pages_accept_wrappers_and_bare_images() {
        let madara = source(true);
        let body = r#"<div class="reading-content">
            <div class="page-break"><img data-src=" https://scan.example/wp-content/1.jpg " src="data:image/gif;base64,x"></div>
            <div class="page-break"><img src="/wp-content/2.jpg"></div>
            <div class="page-break"></div>
        </div>"#;
        let pages = madara.parse_pages("https://scan.example/manga/a/cap-1/", body);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].image_url, "https://scan.example/wp-content/1.jpg");
        assert_eq!(pages[1].index, 1);
        assert_eq!(pages[1].image_url, "https://scan.example/wp-content/2.jpg");
    }

    #[test]
    fn chapter_numbers_skip_volume_prefix() {
        let madara = source(true);
        let body = r#"<ul>
            <li class="wp-manga-chapter"><a href="/manga/a/vol-2-ch-15/">Vol.2 Ch.15</a></li>
            <li class="wp-manga-chapter"><a href="/manga/a/capitulo-3/">Temporada 2 - Capítulo 3</a></li>
        </ul>"#;
        let chapters = madara.parse_chapters("/manga/a/", body, Utc::now());
        assert_eq!(chapters[0].number, 15.0);
        assert_eq!(chapters[1].number, 3.0);
    }
}
