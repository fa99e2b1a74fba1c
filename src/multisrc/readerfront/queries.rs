//! GraphQL query text for the ReaderFront API.
//!
//! Each function returns the raw query; [`graphql_url`](crate::net::json::graphql_url)
//! compacts and urlencodes it.

/// Escapes a value for use inside a GraphQL string literal.
fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

/// Paged work listing. `page` is 1-based.
pub fn works(language: u32, sort_by: &str, order_by: &str, page: u32, limit: u32) -> String {
    format!(
        r#"{{
  works(
    orderBy: {order_by}
    sortBy: {sort_by}
    first: {limit}
    offset: {offset}
    languages: [{language}]
    showHidden: false
  ) {{
    id
    name
    stub
    thumbnail_path
  }}
}}"#,
        order_by = quote(order_by),
        sort_by = quote(sort_by),
        limit = limit,
        offset = u64::from(page.saturating_sub(1)) * u64::from(limit),
        language = language,
    )
}

pub fn work(language: u32, stub: &str) -> String {
    format!(
        r#"{{
  work(language: {language}, stub: {stub}, showHidden: true) {{
    id
    name
    stub
    type
    licensed
    status_name
    description
    adult
    thumbnail_path
    demographic_name
    genres {{
      genreId
    }}
    people_works {{
      rol
      people {{
        name
      }}
    }}
  }}
}}"#,
        language = language,
        stub = quote(stub),
    )
}

pub fn chapters_by_work(language: u32, stub: &str) -> String {
    format!(
        r#"{{
  chaptersByWork(language: {language}, workStub: {stub}, showHidden: false) {{
    id
    volume
    chapter
    subchapter
    name
    releaseDate
  }}
}}"#,
        language = language,
        stub = quote(stub),
    )
}

pub fn chapter_by_id(id: u64) -> String {
    format!(
        r#"{{
  chapterById(id: {id}, showHidden: false) {{
    uniqid
    work {{
      uniqid
    }}
    pages {{
      filename
      width
    }}
  }}
}}"#,
        id = id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn works_offset_is_zero_based() {
        let query = works(1, "updatedAt", "DESC", 3, 12);
        assert!(query.contains("offset: 24"));
        assert!(query.contains(r#"orderBy: "DESC""#));
        assert!(query.contains(r#"sortBy: "updatedAt""#));
        assert!(query.contains("languages: [1]"));
    }

    #[test]
    fn stubs_are_escaped() {
        let query = work(2, r#"evil" showHidden: true"#);
        assert!(query.contains(r#"stub: "evil\" showHidden: true""#));
    }

    #[test]
    fn chapter_query_carries_id() {
        assert!(chapter_by_id(4521).contains("chapterById(id: 4521"));
        assert!(chapters_by_work(1, "hana").contains(r#"workStub: "hana""#));
    }
}
