//! HTML parsing utilities built on `scraper` selectors.
//!
//! Helpers here never fail on an invalid selector; they return `None` or an
//! empty vector, so template defaults can be overridden freely by adapters.
//!
//! # Examples
//!
//! ```rust
//! use multisrc::net::html;
//!
//! let document = html::parse(r#"
//!     <div class="post-title"><h3><a href="/manga/hana/">Hana</a></h3></div>
//!     <img data-src="https://cdn.example.com/hana.jpg" src="data:image/gif;base64,R0l">
//! "#);
//! assert_eq!(html::select_text(&document, ".post-title a").as_deref(), Some("Hana"));
//!
//! let img = html::select_first(&document, "img").unwrap();
//! assert_eq!(html::img_attr(img).as_deref(), Some("https://cdn.example.com/hana.jpg"));
//! ```

use rayon::prelude::*;
use scraper::{ElementRef, Html, Selector};

/// Parses an HTML document from a string.
pub fn parse(html: &str) -> Html {
    Html::parse_document(html)
}

/// Parses a selector, `None` if it is invalid or empty.
pub fn selector(selector: &str) -> Option<Selector> {
    if selector.trim().is_empty() {
        return None;
    }
    match Selector::parse(selector) {
        Ok(sel) => Some(sel),
        Err(_) => {
            log::warn!("invalid CSS selector: {}", selector);
            None
        }
    }
}

/// Whitespace-normalized text of an element.
pub fn text_of(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of the element's direct text children only, whitespace-normalized.
pub fn own_text(el: ElementRef<'_>) -> String {
    el.children()
        .filter_map(|node| node.value().as_text().map(|t| t.to_string()))
        .flat_map(|t| t.split_whitespace().map(String::from).collect::<Vec<_>>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// First element of the document matching `selector`.
pub fn select_first<'a>(html: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    self::selector(selector).and_then(|sel| html.select(&sel).next())
}

/// First descendant of `el` matching `selector`.
pub fn select_first_in<'a>(el: ElementRef<'a>, selector: &str) -> Option<ElementRef<'a>> {
    self::selector(selector).and_then(|sel| el.select(&sel).next())
}

/// All descendants of `el` matching `selector`.
pub fn select_all_in<'a>(el: ElementRef<'a>, selector: &str) -> Vec<ElementRef<'a>> {
    self::selector(selector)
        .map(|sel| el.select(&sel).collect())
        .unwrap_or_default()
}

/// Text of the first element matching `selector`, `None` if nothing matches.
///
/// ```rust
/// use multisrc::net::html;
///
/// let document = html::parse(r#"<h1 class="entry-title">  Fênix   Scan </h1>"#);
/// assert_eq!(html::select_text(&document, ".entry-title"), Some("Fênix Scan".to_string()));
/// ```
pub fn select_text(html: &Html, selector: &str) -> Option<String> {
    select_first(html, selector).map(text_of)
}

/// Attribute `attr` of the first element matching `selector`.
pub fn select_attr(html: &Html, selector: &str, attr: &str) -> Option<String> {
    select_first(html, selector).and_then(|el| el.value().attr(attr).map(String::from))
}

/// Text of every element matching `selector`, skipping empty ones.
pub fn select_all_text(html: &Html, selector: &str) -> Vec<String> {
    self::selector(selector)
        .map(|sel| {
            html.select(&sel)
                .map(text_of)
                .filter(|t| !t.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Attribute `attr` of every element matching `selector` that has it.
pub fn select_all_attr(html: &Html, selector: &str, attr: &str) -> Vec<String> {
    self::selector(selector)
        .map(|sel| {
            html.select(&sel)
                .filter_map(|el| el.value().attr(attr).map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

/// Image URL of an `<img>`, preferring lazy-load attributes over `src`.
///
/// Order: `data-src`, `data-lazy-src`, the widest `srcset` candidate,
/// `data-cfsrc`, then `src`. Inline `data:` placeholders are skipped.
pub fn img_attr(el: ElementRef<'_>) -> Option<String> {
    let value = el.value();
    let usable = |v: &str| {
        let v = v.trim();
        (!v.is_empty() && !v.starts_with("data:")).then(|| v.to_string())
    };

    value
        .attr("data-src")
        .and_then(usable)
        .or_else(|| value.attr("data-lazy-src").and_then(usable))
        .or_else(|| {
            value.attr("srcset").and_then(|srcset| {
                srcset
                    .split(',')
                    .filter_map(|candidate| candidate.split_whitespace().next())
                    .filter(|url| url.starts_with("http"))
                    .max_by_key(|url| url.len())
                    .map(String::from)
            })
        })
        .or_else(|| value.attr("data-cfsrc").and_then(usable))
        .or_else(|| value.attr("src").and_then(usable))
}

/// Resolves `href` against `base_url`.
///
/// Absolute URLs are returned unchanged, protocol-relative ones get `https:`.
///
/// ```rust
/// use multisrc::net::html::absolute_url;
///
/// assert_eq!(absolute_url("https://site.com", "/manga/a/"), "https://site.com/manga/a/");
/// assert_eq!(absolute_url("https://site.com/", "//cdn.site.com/x.jpg"), "https://cdn.site.com/x.jpg");
/// assert_eq!(absolute_url("https://site.com", "https://other.com/y"), "https://other.com/y");
/// ```
pub fn absolute_url(base_url: &str, href: &str) -> String {
    let href = href.trim();
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    if let Some(rest) = href.strip_prefix("//") {
        return format!("https://{}", rest);
    }
    match url::Url::parse(base_url).and_then(|base| base.join(href)) {
        Ok(url) => url.to_string(),
        Err(_) => format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            href.trim_start_matches('/')
        ),
    }
}

/// Strips `base_url` from an absolute link, giving the site-relative key.
///
/// ```rust
/// use multisrc::net::html::relative_key;
///
/// assert_eq!(relative_key("https://site.com", "https://site.com/manga/a/"), "/manga/a/");
/// assert_eq!(relative_key("https://site.com", "/manga/b/"), "/manga/b/");
/// ```
pub fn relative_key(base_url: &str, href: &str) -> String {
    let base = base_url.trim_end_matches('/');
    match href.strip_prefix(base) {
        Some(rest) if rest.starts_with('/') => rest.to_string(),
        Some(rest) => format!("/{}", rest),
        None => match url::Url::parse(href) {
            Ok(url) => {
                let mut key = url.path().to_string();
                if let Some(query) = url.query() {
                    key.push('?');
                    key.push_str(query);
                }
                key
            }
            Err(_) => href.to_string(),
        },
    }
}

/// Maps every element matching `selector` with `parser`, in parallel.
///
/// Elements are serialized to HTML fragments first so rayon workers can
/// parse them independently; `parser` receives each fragment's root element.
/// Items for which `parser` returns `None` are dropped; order is preserved.
pub fn parse_items<T, F>(html: &Html, selector: &str, parser: F) -> Vec<T>
where
    T: Send,
    F: Fn(ElementRef<'_>) -> Option<T> + Sync,
{
    self::selector(selector)
        .map(|sel| {
            let fragments: Vec<String> = html.select(&sel).map(|el| el.html()).collect();

            fragments
                .into_par_iter()
                .filter_map(|fragment| {
                    let doc = Html::parse_fragment(&fragment);
                    let root = doc.root_element();
                    let element = root
                        .children()
                        .find_map(ElementRef::wrap)
                        .unwrap_or(root);
                    parser(element)
                })
                .collect()
        })
        .unwrap_or_default()
}
