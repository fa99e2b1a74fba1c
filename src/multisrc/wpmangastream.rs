//! Template for sites running the MangaStream (Themesia) WordPress theme.
//!
//! Series live under `{base_url}/manga/{slug}/`; chapters sit at the site
//! root (`/slug-capitulo-1/`). Ids are site-relative paths.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{
    InfoRow, chapter_number, extract_between, find_first_number, info_value, is_placeholder,
    parse_status, with_alt_names,
};
use crate::{
    date::DateFormat,
    error::{Error, Result},
    net::{ClientConfig, HttpClient, html},
    source::Source,
    types::{Chapter, Manga, MangasPage, Page, SearchParams, SortOrder},
};

/// CSS selectors used by [`WpMangaStream`].
#[derive(Debug, Clone)]
pub struct WpMangaStreamSelectors {
    pub manga_item: String,
    pub next_page: String,
    /// Wrapper of the details block; lookups below run inside it.
    pub details: String,
    pub details_title: String,
    pub details_cover: String,
    pub details_description: String,
    pub details_genre: String,
    pub details_alt_names: String,
    pub info_rows: Vec<InfoRow>,
    pub chapter: String,
    pub chapter_title: String,
    pub chapter_date: String,
    pub page_images: String,
}

impl Default for WpMangaStreamSelectors {
    fn default() -> Self {
        Self {
            manga_item: "div.bs".to_string(),
            next_page: "a.next.page-numbers, a.r, div.hpage a.r, div.pagination .next".to_string(),
            details: "div.bigcontent, div.animefull, div.main-info, div.postbody".to_string(),
            details_title: "h1.entry-title, .ts-breadcrumb li:last-child span".to_string(),
            details_cover: ".infomanga > div[itemprop=image] img, .thumb img".to_string(),
            details_description: ".desc, .entry-content[itemprop=description]".to_string(),
            details_genre: "div.gnr a, .mgen a, .seriestugenre a".to_string(),
            details_alt_names: ".alternative, .seriestualt, .wd-full .alter".to_string(),
            info_rows: vec![
                InfoRow::new(".infotable tr", "td:first-child", "td:last-child"),
                InfoRow::new(".tsinfo .imptdt", "", "i, a"),
                InfoRow::new(".fmed", "b", "span"),
                InfoRow::new(".spe span", "b", "a"),
            ],
            chapter: "#chapterlist li, div.bxcl li, div.cl li".to_string(),
            chapter_title: ".lch a, .chapternum".to_string(),
            chapter_date: ".chapterdate".to_string(),
            page_images: "div#readerarea img".to_string(),
        }
    }
}

/// Everything a WPMangaStream site adapter provides.
#[derive(Debug, Clone)]
pub struct WpMangaStreamConfig {
    pub id: &'static str,
    pub name: &'static str,
    pub base_url: &'static str,
    pub lang: &'static str,
    pub date_format: &'static str,
    pub client: ClientConfig,
    /// Bumped when a site switched to this template from another one.
    pub version_id: u32,
    pub alt_name: &'static str,
    pub selectors: WpMangaStreamSelectors,
}

impl WpMangaStreamConfig {
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
            version_id: 1,
            alt_name: "Alternative Name: ",
            selectors: WpMangaStreamSelectors::default(),
        }
    }
}

const AUTHOR_LABELS: &[&str] = &["author", "autor"];
const ARTIST_LABELS: &[&str] = &["artist", "artista"];
const STATUS_LABELS: &[&str] = &["status", "estado"];
const TYPE_LABELS: &[&str] = &["type", "tipo"];
const ALT_LABELS: &[&str] = &["alternative", "alternativo"];

/// A [`Source`] for one WPMangaStream site.
pub struct WpMangaStream {
    config: WpMangaStreamConfig,
    client: HttpClient,
    date_format: DateFormat,
}

impl WpMangaStream {
    pub fn new(config: WpMangaStreamConfig) -> Self {
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

    pub fn config(&self) -> &WpMangaStreamConfig {
        &self.config
    }

    fn base(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// Directory listing ordered by `order` (`popular`, `update`).
    pub fn listing_url(&self, page: u32, order: &str) -> String {
        format!("{}/manga/?page={}&order={}", self.base(), page.max(1), order)
    }

    pub fn search_url(&self, params: &SearchParams) -> String {
        let mut url = format!(
            "{}/page/{}/?s={}",
            self.base(),
            params.page.max(1),
            urlencoding::encode(params.query.trim())
        );
        let order = match params.sort_by {
            Some(SortOrder::Popular) => Some("popular"),
            Some(SortOrder::UpdatedAt) => Some("update"),
            Some(SortOrder::Title) => Some("title"),
            _ => None,
        };
        if let Some(order) = order {
            url.push_str("&order=");
            url.push_str(order);
        }
        url
    }

    pub fn parse_manga_list(&self, body: &str) -> MangasPage {
        let document = html::parse(body);
        let selectors = &self.config.selectors;

        let mangas = html::parse_items(&document, &selectors.manga_item, |item| {
            let link = html::select_first_in(item, "a")?;
            let href = link.value().attr("href")?;
            let title = link
                .value()
                .attr("title")
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .or_else(|| html::select_first_in(item, ".tt, .bigor .tt").map(html::text_of))
                .filter(|t| !t.is_empty())?;

            Some(Manga {
                id: html::relative_key(self.base(), href),
                title,
                url: Some(html::absolute_url(self.base(), href)),
                cover_url: html::select_first_in(item, "img")
                    .and_then(html::img_attr)
                    .map(|src| html::absolute_url(self.base(), &src)),
                source_id: self.config.id.to_string(),
                ..Default::default()
            })
        });

        MangasPage::new(mangas, html::select_first(&document, &selectors.next_page).is_some())
    }

    pub fn parse_details(&self, manga_id: &str, body: &str) -> Result<Manga> {
        let document = html::parse(body);
        let selectors = &self.config.selectors;

        let info = html::select_first(&document, &selectors.details)
            .ok_or_else(|| Error::parse(format!("No details block on {}", manga_id)))?;

        let title = html::select_first_in(info, &selectors.details_title)
            .map(html::text_of)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::parse(format!("No title on {}", manga_id)))?;

        let people = |labels: &[&str]| -> Vec<String> {
            info_value(info, &selectors.info_rows, labels)
                .map(html::text_of)
                .filter(|name| !is_placeholder(name))
                .map(|names| {
                    names
                        .split(',')
                        .map(|n| n.trim().to_string())
                        .filter(|n| !n.is_empty())
                        .collect()
                })
                .unwrap_or_default()
        };

        let mut tags: Vec<String> = html::select_all_in(info, &selectors.details_genre)
            .into_iter()
            .map(html::text_of)
            .filter(|t| !t.is_empty())
            .collect();
        if let Some(kind) = info_value(info, &selectors.info_rows, TYPE_LABELS)
            .map(html::text_of)
            .filter(|k| !is_placeholder(k))
        {
            tags.push(kind);
        }

        let description = html::select_first_in(info, &selectors.details_description)
            .map(|el| {
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
            })
            .filter(|d| !d.is_empty());
        let alt_names = html::select_first_in(info, &selectors.details_alt_names)
            .map(html::text_of)
            .or_else(|| {
                info_value(info, &selectors.info_rows, ALT_LABELS).map(html::text_of)
            });

        Ok(Manga {
            id: manga_id.to_string(),
            title,
            url: Some(html::absolute_url(self.base(), manga_id)),
            cover_url: html::select_first_in(info, &selectors.details_cover)
                .and_then(html::img_attr)
                .map(|src| html::absolute_url(self.base(), &src)),
            authors: people(AUTHOR_LABELS),
            artists: people(ARTIST_LABELS),
            description: with_alt_names(description, self.config.alt_name, alt_names),
            tags,
            status: info_value(info, &selectors.info_rows, STATUS_LABELS)
                .map(|el| parse_status(&html::text_of(el)))
                .unwrap_or_default(),
            source_id: self.config.id.to_string(),
        })
    }

    pub fn parse_chapters(&self, manga_id: &str, body: &str, now: DateTime<Utc>) -> Vec<Chapter> {
        let document = html::parse(body);
        let selectors = &self.config.selectors;

        html::parse_items(&document, &selectors.chapter, |row| {
            let link = html::select_first_in(row, "a")?;
            let href = link.value().attr("href")?;
            let title = html::select_first_in(link, &selectors.chapter_title)
                .map(html::text_of)
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| html::text_of(link));

            let number = row
                .value()
                .attr("data-num")
                .and_then(find_first_number)
                .or_else(|| chapter_number(&title))
                .unwrap_or(-1.0);

            Some(Chapter {
                id: html::relative_key(self.base(), href),
                number,
                title,
                date_upload: html::select_first_in(row, &selectors.chapter_date)
                    .map(html::text_of)
                    .and_then(|text| self.date_format.parse_chapter_date(&text, now)),
                scanlator: None,
                manga_id: manga_id.to_string(),
                source_id: self.config.id.to_string(),
            })
        })
    }

    /// Reader images, falling back to the `"images":[...]` array of the
    /// reader script when the page builds them client-side.
    pub fn parse_pages(&self, chapter_url: &str, body: &str) -> Vec<Page> {
        let document = html::parse(body);

        let mut urls: Vec<String> = html::selector(&self.config.selectors.page_images)
            .map(|sel| document.select(&sel).filter_map(html::img_attr).collect())
            .unwrap_or_default();

        if urls.is_empty() {
            urls = extract_between(body, "\"images\":[", "]")
                .and_then(|list| serde_json::from_str::<Vec<String>>(&format!("[{}]", list)).ok())
                .unwrap_or_default();
        }

        urls.into_iter()
            .enumerate()
            .map(|(index, src)| Page {
                index,
                url: chapter_url.to_string(),
                image_url: html::absolute_url(self.base(), &src),
            })
            .collect()
    }
}

#[async_trait]
impl Source for WpMangaStream {
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

    fn version_id(&self) -> u32 {
        self.config.version_id
    }

    async fn popular(&self, page: u32) -> Result<MangasPage> {
        let body = self.client.get_text(&self.listing_url(page, "popular")).await?;
        Ok(self.parse_manga_list(&body))
    }

    async fn latest(&self, page: u32) -> Result<MangasPage> {
        let body = self.client.get_text(&self.listing_url(page, "update")).await?;
        Ok(self.parse_manga_list(&body))
    }

    async fn search(&self, params: SearchParams) -> Result<MangasPage> {
        let body = self.client.get_text(&self.search_url(&params)).await?;
        let mut page = self.parse_manga_list(&body);
        if let Some(limit) = params.limit {
            page.mangas.truncate(limit);
        }
        Ok(page)
    }

    async fn get_details(&self, manga_id: &str) -> Result<Manga> {
        let body = self.client.get_text(&html::absolute_url(self.base(), manga_id)).await?;
        self.parse_details(manga_id, &body)
    }

    async fn get_chapters(&self, manga_id: &str) -> Result<Vec<Chapter>> {
        let body = self.client.get_text(&html::absolute_url(self.base(), manga_id)).await?;
        Ok(self.parse_chapters(manga_id, &body, Utc::now()))
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
