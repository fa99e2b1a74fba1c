//! Records returned by the ReaderFront GraphQL API.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;

/// `rol` of a person credited as author.
const ROLE_AUTHOR: u32 = 1;
/// `rol` of a person credited as artist.
const ROLE_ARTIST: u32 = 2;

/// A series. Listing queries only fill `stub`, `name` and `thumbnail_path`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Work {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    pub stub: String,
    #[serde(default)]
    pub thumbnail_path: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub licensed: Option<bool>,
    #[serde(default)]
    pub status_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub adult: Option<bool>,
    #[serde(default)]
    pub demographic_name: Option<String>,
    #[serde(default)]
    pub genres: Vec<WorkGenre>,
    #[serde(default)]
    pub people_works: Vec<PeopleWork>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkGenre {
    #[serde(rename = "genreId")]
    pub genre_id: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PeopleWork {
    pub rol: u32,
    pub people: Person,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Person {
    pub name: String,
}

impl Work {
    fn people(&self, role: u32) -> Vec<String> {
        self.people_works
            .iter()
            .filter(|pw| pw.rol == role)
            .map(|pw| pw.people.name.clone())
            .collect()
    }

    pub fn authors(&self) -> Vec<String> {
        self.people(ROLE_AUTHOR)
    }

    pub fn artists(&self) -> Vec<String> {
        self.people(ROLE_ARTIST)
    }
}

impl fmt::Display for Work {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// One chapter release of a work.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub id: u64,
    #[serde(default)]
    pub volume: u32,
    pub chapter: u32,
    #[serde(default)]
    pub subchapter: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

impl Release {
    /// `chapter.subchapter` as a number (`12.5` for chapter 12, subchapter 5).
    pub fn number(&self) -> f64 {
        format!("{}.{}", self.chapter, self.subchapter)
            .parse()
            .unwrap_or(self.chapter as f64)
    }

    /// Release date; `None` when missing or not RFC 3339.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.release_date
            .as_deref()
            .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
            .map(|d| d.with_timezone(&Utc))
    }
}

impl fmt::Display for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.volume > 0 {
            write!(f, "Vol.{} ", self.volume)?;
        }
        write!(f, "Ch.{}", self.chapter)?;
        if self.subchapter > 0 {
            write!(f, ".{}", self.subchapter)?;
        }
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => write!(f, ": {}", name),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkRef {
    pub uniqid: String,
}

/// Page list of one chapter.
#[derive(Debug, Clone, Deserialize)]
pub struct ChapterPages {
    pub uniqid: String,
    pub work: WorkRef,
    #[serde(default)]
    pub pages: Vec<PageFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageFile {
    pub filename: String,
    #[serde(default = "default_width")]
    pub width: u32,
}

fn default_width() -> u32 {
    super::DEFAULT_IMAGE_WIDTH
}

impl ChapterPages {
    /// CDN path of `page`: `works/{work}/{chapter}/{file}`.
    pub fn path(&self, page: &PageFile) -> String {
        format!("works/{}/{}/{}", self.work.uniqid, self.uniqid, page.filename)
    }
}

impl<'a> IntoIterator for &'a ChapterPages {
    type Item = &'a PageFile;
    type IntoIter = std::slice::Iter<'a, PageFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn release(volume: u32, chapter: u32, subchapter: u32, name: &str) -> Release {
        Release {
            id: 1,
            volume,
            chapter,
            subchapter,
            name: Some(name.to_string()),
            release_date: Some("2020-05-01T18:30:00.000Z".to_string()),
        }
    }

    #[test]
    fn release_titles() {
        assert_eq!(release(2, 15, 0, "El final").to_string(), "Vol.2 Ch.15: El final");
        assert_eq!(release(0, 3, 5, "").to_string(), "Ch.3.5");
    }

    #[test]
    fn release_number_joins_subchapter() {
        assert_eq!(release(0, 12, 5, "").number(), 12.5);
        assert_eq!(release(0, 12, 0, "").number(), 12.0);
        assert_eq!(release(0, 1, 10, "").number(), 1.10);
    }

    #[test]
    fn release_timestamp_parses_iso_dates() {
        let date = release(0, 1, 0, "").timestamp().unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2020, 5, 1));

        let mut bad = release(0, 1, 0, "");
        bad.release_date = Some("yesterday".to_string());
        assert!(bad.timestamp().is_none());
    }

    #[test]
    fn people_are_split_by_role() {
        let work: Work = serde_json::from_value(serde_json::json!({
            "name": "Hana",
            "stub": "hana",
            "people_works": [
                { "rol": 1, "people": { "name": "Autora" } },
                { "rol": 2, "people": { "name": "Artista" } },
                { "rol": 2, "people": { "name": "Asistente" } }
            ]
        }))
        .unwrap();

        assert_eq!(work.authors(), vec!["Autora"]);
        assert_eq!(work.artists(), vec!["Artista", "Asistente"]);
        assert_eq!(work.to_string(), "Hana");
    }
}
