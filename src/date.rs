//! Locale-aware chapter date parsing.
//!
//! Sites print upload dates with a `SimpleDateFormat`-style pattern in their
//! own language (`"dd/MM/yyyy"`, `"MMMMM dd, yyyy"` with Portuguese month
//! names), or as relative text ("2 days ago", "há 3 horas").
//!
//! # Examples
//!
//! ```rust
//! use chrono::{Datelike, TimeZone, Utc};
//! use multisrc::date::DateFormat;
//!
//! let format = DateFormat::new("MMMMM dd, yyyy", "pt-BR");
//! let date = format.parse("março 05, 2021").unwrap();
//! assert_eq!((date.year(), date.month(), date.day()), (2021, 3, 5));
//!
//! let now = Utc.with_ymd_and_hms(2021, 3, 10, 12, 0, 0).unwrap();
//! let relative = format.parse_chapter_date("há 2 dias", now).unwrap();
//! assert_eq!(relative.day(), 8);
//! ```

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};

const PT_MONTHS: [&str; 12] = [
    "janeiro", "fevereiro", "março", "abril", "maio", "junho", "julho", "agosto", "setembro",
    "outubro", "novembro", "dezembro",
];
const ES_MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];
const EN_MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Day,
    Month { text: bool },
    Year,
    Hour,
    Minute,
    Literal(String),
}

/// A date pattern plus the locale its month names are written in.
#[derive(Debug, Clone)]
pub struct DateFormat {
    pattern: String,
    locale: String,
    tokens: Vec<Token>,
}

impl DateFormat {
    /// `pattern` uses `d`, `M`, `y`, `H`, `m` letters; runs of three or more
    /// `M` mean a month name. Text in single quotes and any other character
    /// is matched literally.
    pub fn new(pattern: impl Into<String>, locale: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let tokens = tokenize(&pattern);
        Self {
            pattern,
            locale: locale.into(),
            tokens,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Parses `text` with the pattern. Date-only patterns give midnight UTC.
    pub fn parse(&self, text: &str) -> Option<DateTime<Utc>> {
        let mut rest = text.trim();
        let (mut day, mut month, mut year) = (None, None, None);
        let (mut hour, mut minute) = (0u32, 0u32);

        for token in &self.tokens {
            match token {
                Token::Literal(lit) => {
                    if lit.trim().is_empty() {
                        rest = rest.trim_start();
                    } else {
                        rest = rest.trim_start().strip_prefix(lit.trim())?.trim_start();
                    }
                }
                Token::Day => day = Some(take_number(&mut rest)?),
                Token::Year => {
                    let digits = rest.chars().take_while(char::is_ascii_digit).count();
                    let value: i32 = rest.get(..digits)?.parse().ok()?;
                    rest = &rest[digits..];
                    year = Some(if digits <= 2 { 2000 + value } else { value });
                }
                Token::Hour => hour = take_number(&mut rest)?,
                Token::Minute => minute = take_number(&mut rest)?,
                Token::Month { text: false } => month = Some(take_number(&mut rest)?),
                Token::Month { text: true } => {
                    let len: usize = rest
                        .char_indices()
                        .find(|(_, c)| !c.is_alphabetic() && *c != '.')
                        .map(|(i, _)| i)
                        .unwrap_or(rest.len());
                    month = Some(month_from_name(&rest[..len], &self.locale)?);
                    rest = &rest[len..];
                }
            }
        }

        let date = NaiveDate::from_ymd_opt(year?, month?, day.unwrap_or(1))?;
        let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
        Some(NaiveDateTime::new(date, time).and_utc())
    }

    /// Parses a chapter date: the pattern first, then "today"/"yesterday"
    /// words, then relative expressions measured back from `now`.
    pub fn parse_chapter_date(&self, text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        self.parse(text).or_else(|| parse_relative(text, now))
    }
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '\'' {
            let end = chars[i + 1..]
                .iter()
                .position(|&ch| ch == '\'')
                .map(|p| i + 1 + p)
                .unwrap_or(chars.len());
            tokens.push(Token::Literal(chars[i + 1..end].iter().collect()));
            i = end + 1;
            continue;
        }

        let run = chars[i..].iter().take_while(|&&ch| ch == c).count();
        let token = match c {
            'd' => Token::Day,
            'M' => Token::Month { text: run >= 3 },
            'y' => Token::Year,
            'H' | 'h' => Token::Hour,
            'm' => Token::Minute,
            _ => Token::Literal(chars[i..i + run].iter().collect()),
        };
        tokens.push(token);
        i += run;
    }

    tokens
}

fn take_number(rest: &mut &str) -> Option<u32> {
    let digits = rest.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let value = rest[..digits].parse().ok()?;
    *rest = &rest[digits..];
    Some(value)
}

fn fold_accents(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'ê' | 'è' => 'e',
            'í' | 'î' => 'i',
            'ó' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

fn months_for(locale: &str) -> &'static [&'static str; 12] {
    let lang = locale
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    match lang.as_str() {
        "pt" => &PT_MONTHS,
        "es" => &ES_MONTHS,
        _ => &EN_MONTHS,
    }
}

/// Month number for a full or abbreviated (3+ letters) month name.
fn month_from_name(name: &str, locale: &str) -> Option<u32> {
    let wanted = fold_accents(&name.trim_end_matches('.').to_lowercase());
    if wanted.chars().count() < 3 {
        return None;
    }
    months_for(locale)
        .iter()
        .position(|month| {
            let month = fold_accents(month);
            month == wanted || month.starts_with(&wanted)
        })
        .map(|i| i as u32 + 1)
}

fn any_word_in(haystack: &str, words: &[&str]) -> bool {
    words.iter().any(|w| haystack.contains(w))
}

/// Relative date text ("3 hours ago", "há 2 semanas", "ontem").
pub fn parse_relative(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let lower = format!(" {} ", fold_accents(&text.to_lowercase()));

    if any_word_in(&lower, &["today", "hoje", "hoy"]) {
        return Some(now);
    }
    if any_word_in(&lower, &["yesterday", "ontem", "ayer"]) {
        return now.checked_sub_signed(Duration::days(1));
    }

    let number = lower
        .split(|c: char| !c.is_ascii_digit())
        .find(|part| !part.is_empty())
        .and_then(|n| n.parse::<i64>().ok())
        .or_else(|| {
            any_word_in(&lower, &[" an ", " a ", " um ", " uma ", " un ", " una "]).then_some(1)
        })?;

    // Counts come from scraped text; anything that overflows is not a date.
    let offset = if any_word_in(&lower, &["second", "segundo"]) {
        Duration::try_seconds(number)
    } else if any_word_in(&lower, &["min"]) {
        Duration::try_minutes(number)
    } else if any_word_in(&lower, &["hour", "hora", "hr"]) {
        Duration::try_hours(number)
    } else if any_word_in(&lower, &["day", "dia"]) {
        Duration::try_days(number)
    } else if any_word_in(&lower, &["week", "semana"]) {
        Duration::try_weeks(number)
    } else if any_word_in(&lower, &["month", "mes"]) {
        number.checked_mul(30).and_then(Duration::try_days)
    } else if any_word_in(&lower, &["year", "ano", "año"]) {
        number.checked_mul(365).and_then(Duration::try_days)
    } else {
        return None;
    }?;

    now.checked_sub_signed(offset)
}
