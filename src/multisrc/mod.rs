//! Shared parents for families of sites.
//!
//! - [`madara`] - WordPress sites running the Madara manga theme
//! - [`wpmangastream`] - WordPress sites running the MangaStream/Themesia theme
//! - [`readerfront`] - Sites backed by a ReaderFront GraphQL API
//!
//! A site adapter picks one template, fills in its config and gets a full
//! [`Source`](crate::source::Source) implementation.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;

use crate::net::html;
use crate::types::MangaStatus;

pub mod madara;
pub mod readerfront;
pub mod wpmangastream;

static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("number pattern is valid"));

static CHAPTER_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:cap[ií]tulo|chapter|chap|cap|ch|ep)\.?\s*(\d+(?:\.\d+)?)")
        .expect("chapter number pattern is valid")
});

/// A labelled row on a details page, such as Madara's
/// `<div class="post-content_item">` with a heading and a value.
///
/// An empty `label` selector means the row's own text is the label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoRow {
    pub row: String,
    pub label: String,
    pub value: String,
}

impl InfoRow {
    pub fn new(row: &str, label: &str, value: &str) -> Self {
        Self {
            row: row.to_string(),
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

/// Value element of the first row under `scope` whose label contains one of
/// `labels`.
///
/// Labels are compared case-insensitively. Pass `document.root_element()` to
/// search the whole page.
///
/// ```rust
/// use multisrc::multisrc::{InfoRow, info_value};
/// use multisrc::net::html;
///
/// let document = html::parse(r#"
///     <div class="post-content_item">
///         <div class="summary-heading"><h5>Status</h5></div>
///         <div class="summary-content">Em andamento</div>
///     </div>
/// "#);
/// let rows = [InfoRow::new("div.post-content_item", "div.summary-heading", "div.summary-content")];
/// let value = info_value(document.root_element(), &rows, &["status"]).map(html::text_of);
/// assert_eq!(value.as_deref(), Some("Em andamento"));
/// ```
pub fn info_value<'a>(
    scope: ElementRef<'a>,
    rows: &[InfoRow],
    labels: &[&str],
) -> Option<ElementRef<'a>> {
    let labels: Vec<String> = labels.iter().map(|l| l.to_lowercase()).collect();

    rows.iter().find_map(|info| {
        let row_sel = html::selector(&info.row)?;
        scope.select(&row_sel).find_map(|row| {
            let label = match info.label.as_str() {
                "" => html::own_text(row),
                label => html::text_of(html::select_first_in(row, label)?),
            };
            let label = label.to_lowercase();

            if labels.iter().any(|l| label.contains(l.as_str())) {
                html::select_first_in(row, &info.value)
            } else {
                None
            }
        })
    })
}

/// First decimal number in `text` ("Capítulo 10.5 - Fim" gives 10.5).
///
/// ```rust
/// use multisrc::multisrc::find_first_number;
///
/// assert_eq!(find_first_number("Cap. 12.5"), Some(12.5));
/// assert_eq!(find_first_number("Oneshot"), None);
/// ```
pub fn find_first_number(text: &str) -> Option<f64> {
    NUMBER
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
}

/// Chapter number of a chapter title.
///
/// A number right after a chapter keyword ("Capítulo", "Chapter", "Cap.",
/// "Ch.", "Ep") wins over earlier numbers; otherwise this is
/// [`find_first_number`].
///
/// ```rust
/// use multisrc::multisrc::chapter_number;
///
/// assert_eq!(chapter_number("Vol.2 Ch.15"), Some(15.0));
/// assert_eq!(chapter_number("Temporada 2 - Capítulo 10.5"), Some(10.5));
/// assert_eq!(chapter_number("12 - Fim"), Some(12.0));
/// assert_eq!(chapter_number("Prólogo"), None);
/// ```
pub fn chapter_number(title: &str) -> Option<f64> {
    CHAPTER_NUMBER
        .captures(title)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .or_else(|| find_first_number(title))
}

/// Slice of `s` between the first `start` and the following `end`.
pub fn extract_between<'a>(s: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let after_start = &s[s.find(start)? + start.len()..];
    after_start.find(end).map(|end_idx| &after_start[..end_idx])
}

/// Maps a status label in English, Portuguese, Spanish or French.
///
/// ```rust
/// use multisrc::multisrc::parse_status;
/// use multisrc::types::MangaStatus;
///
/// assert_eq!(parse_status(" Em Andamento "), MangaStatus::Ongoing);
/// assert_eq!(parse_status("Concluído"), MangaStatus::Completed);
/// assert_eq!(parse_status("???"), MangaStatus::Unknown);
/// ```
pub fn parse_status(text: &str) -> MangaStatus {
    match text.trim().to_lowercase().as_str() {
        "ongoing" | "on going" | "updating" | "publishing" | "em lançamento"
        | "em andamento" | "em postagem" | "em progresso" | "em curso" | "ativo" | "lançando"
        | "atualizações semanais" | "en curso" | "emision" | "en emision" | "curso"
        | "en marcha" | "publicandose" | "publicándose" | "publicando" | "en cours"
        | "en cours de publication" => MangaStatus::Ongoing,
        "completed" | "complete" | "finished" | "completo" | "completado" | "concluído"
        | "concluido" | "finalizado" | "terminé" | "achevé" | "complété" | "one-shot" => {
            MangaStatus::Completed
        }
        "on hold" | "hiatus" | "pausado" | "hiato" | "en espera" | "en pause" | "en attente" => {
            MangaStatus::Hiatus
        }
        "canceled" | "cancelled" | "cancelado" | "dropped" | "discontinued" | "abandonado"
        | "abandonné" | "annulé" => MangaStatus::Cancelled,
        "licensed" | "licenciado" => MangaStatus::Licensed,
        _ => MangaStatus::Unknown,
    }
}

/// Appends alternative names to a description as `"\n\n{label}{names}"`.
///
/// Empty names and placeholder values ("Updating", "N/A", "-") are ignored.
pub(crate) fn with_alt_names(
    description: Option<String>,
    label: &str,
    names: Option<String>,
) -> Option<String> {
    let names = names
        .map(|n| n.trim().to_string())
        .filter(|n| !is_placeholder(n));

    match (description, names) {
        (Some(desc), Some(names)) => Some(format!("{}\n\n{}{}", desc, label, names)),
        (None, Some(names)) => Some(format!("{}{}", label, names)),
        (desc, None) => desc,
    }
}

pub(crate) fn is_placeholder(text: &str) -> bool {
    matches!(
        text.trim().to_lowercase().as_str(),
        "" | "-" | "n/a" | "updating" | "atualizando"
    )
}
