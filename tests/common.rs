//! Common test utilities and fixtures
//!
//! Saved site responses and an in-memory source, so no test touches the network.

use async_trait::async_trait;
use multisrc::error::{Error, Result};
use multisrc::net::HttpClient;
use multisrc::readerfront::ReaderFrontImpl;
use multisrc::{Chapter, Manga, MangasPage, Page, SearchParams, Source};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Madara popular listing: two manga and one novel entry.
#[allow(dead_code)]
pub const MADARA_LISTING: &str = r#"
<div class="page-listing-item">
  <div class="page-item-detail manga">
    <div class="item-thumb">
      <a href="https://momonohanascan.com/manga/hana-no-kage/">
        <img data-src="https://momonohanascan.com/wp-content/uploads/hana-175x238.jpg" src="data:image/svg+xml,%3Csvg%3E">
      </a>
    </div>
    <div class="item-summary">
      <div class="post-title font-title"><h3 class="h5"><a href="https://momonohanascan.com/manga/hana-no-kage/">Hana no Kage</a></h3></div>
    </div>
  </div>
  <div class="page-item-detail manga">
    <div class="item-thumb"><a href="https://momonohanascan.com/manga/momo-iro/"><img src="/wp-content/uploads/momo.jpg"></a></div>
    <div class="item-summary">
      <div class="post-title font-title"><h3 class="h5"><a href="https://momonohanascan.com/manga/momo-iro/">Momo Iro</a></h3></div>
    </div>
  </div>
  <div class="page-item-detail text">
    <div class="item-summary">
      <div class="post-title font-title"><h3 class="h5"><a href="https://momonohanascan.com/manga/uma-novel/">Uma Novel</a></h3></div>
    </div>
  </div>
</div>
<div class="nav-previous float-left"><a href="https://momonohanascan.com/manga/page/2/?m_orderby=views">Mais</a></div>
"#;

/// Madara series page with no inline chapters.
#[allow(dead_code)]
pub const MADARA_DETAILS: &str = r##"
<div class="post-title"><h1>Hana no Kage <span class="manga-title-badges hot">HOT</span></h1></div>
<div class="summary_image"><a href="#"><img data-src="https://momonohanascan.com/wp-content/uploads/hana-193x278.jpg"></a></div>
<div class="summary_content">
  <div class="post-content">
    <div class="post-content_item"><div class="summary-heading"><h5>Alternativo</h5></div><div class="summary-content"> 花の影, Flower Shadow </div></div>
    <div class="post-content_item"><div class="summary-heading"><h5>Autor(es)</h5></div><div class="summary-content"><div class="author-content"><a href="/manga-author/aki/">Aki</a></div></div></div>
    <div class="post-content_item"><div class="summary-heading"><h5>Artista(s)</h5></div><div class="summary-content"><div class="artist-content"><a href="#">Mei</a>, <a href="#">Rin</a></div></div></div>
    <div class="post-content_item"><div class="summary-heading"><h5>Gênero(s)</h5></div><div class="summary-content"><div class="genres-content"><a href="#">Drama</a>, <a href="#">Romance</a></div></div></div>
    <div class="post-content_item"><div class="summary-heading"><h5>Tipo</h5></div><div class="summary-content">Manhwa</div></div>
  </div>
  <div class="post-status">
    <div class="post-content_item"><div class="summary-heading"><h5>Status</h5></div><div class="summary-content">Em andamento</div></div>
  </div>
</div>
<div class="description-summary"><div class="summary__content"><p>Uma história sobre flores.</p><p>Segundo parágrafo.</p></div></div>
<div id="manga-chapters-holder" data-id="1234"></div>
"##;

/// Body of the Madara `ajax/chapters` endpoint.
#[allow(dead_code)]
pub const MADARA_CHAPTERS: &str = r##"
<div class="listing-chapters_wrap"><ul class="main version-chap">
  <li class="wp-manga-chapter">
    <a href="https://momonohanascan.com/manga/hana-no-kage/capitulo-12-5/">Capítulo 12.5</a>
    <span class="chapter-release-date"><i>15/03/2021</i></span>
  </li>
  <li class="wp-manga-chapter">
    <a href="https://momonohanascan.com/manga/hana-no-kage/capitulo-12/">Capítulo 12</a>
    <span class="chapter-release-date"><a href="#" title="2 dias atrás" class="c-new-tag"><img src="/new.png"></a></span>
  </li>
  <li class="wp-manga-chapter">
    <a href="https://momonohanascan.com/manga/hana-no-kage/prologo/">Prólogo</a>
    <span class="chapter-release-date"><i>01/01/2020</i></span>
  </li>
</ul></div>
"##;

#[allow(dead_code)]
pub const WPMS_LISTING: &str = r#"
<div class="listupd">
  <div class="bs"><div class="bsx">
    <a href="https://fenixscanlator.xyz/manga/fenix-rising/" title="Fênix Rising">
      <div class="limit"><img src="https://fenixscanlator.xyz/wp-content/uploads/fenix.jpg" class="ts-post-image"></div>
      <div class="bigor"><div class="tt">Fênix Rising</div></div>
    </a>
  </div></div>
  <div class="bs"><div class="bsx">
    <a href="https://fenixscanlator.xyz/manga/cinzas/">
      <div class="limit"><img data-lazy-src="https://fenixscanlator.xyz/wp-content/uploads/cinzas.webp"></div>
      <div class="bigor"><div class="tt"> Cinzas </div></div>
    </a>
  </div></div>
</div>
<div class="hpage"><a class="l" href="?page=1">Anterior</a></div>
"#;

#[allow(dead_code)]
pub const WPMS_DETAILS: &str = r##"
<div class="postbody"><article>
  <div class="seriestucontent">
    <div class="thumb"><img src="https://fenixscanlator.xyz/wp-content/uploads/fenix.jpg"></div>
    <h1 class="entry-title">Fênix Rising</h1>
    <span class="alternative">Phoenix Rising, 不死鳥</span>
    <div class="tsinfo">
      <div class="imptdt">Status <i>Em Andamento</i></div>
      <div class="imptdt">Tipo <a href="/tipo/manhwa/">Manhwa</a></div>
    </div>
    <div class="fmed"><b>Autor</b><span>Kim Seo</span></div>
    <div class="fmed"><b>Artista</b><span>Lee Han, Park Jun</span></div>
    <div class="wd-full"><span class="mgen"><a href="#">Ação</a><a href="#">Fantasia</a></span></div>
    <div class="entry-content entry-content-single" itemprop="description"><p>Uma fênix renasce.</p></div>
  </div>
  <div class="eplister" id="chapterlist"><ul>
    <li data-num="2"><div class="chbox"><div class="eph-num">
      <a href="https://fenixscanlator.xyz/fenix-rising-capitulo-2/"><span class="chapternum">Capítulo 2</span><span class="chapterdate">março 05, 2022</span></a>
    </div></div></li>
    <li data-num="1"><div class="chbox"><div class="eph-num">
      <a href="https://fenixscanlator.xyz/fenix-rising-capitulo-1/"><span class="chapternum">Capítulo 1</span><span class="chapterdate">fevereiro 20, 2022</span></a>
    </div></div></li>
  </ul></div>
</article></div>
"##;

#[allow(dead_code)]
pub const READERFRONT_WORKS: &str = r#"{"data":{"works":[
  {"id":1,"name":"Hana no Kage","stub":"hana-no-kage","thumbnail_path":"hana.jpg"},
  {"id":2,"name":"Kuroi Hana","stub":"kuroi-hana","thumbnail_path":"kuroi.jpg"},
  {"id":3,"name":"Ashita","stub":"ashita","thumbnail_path":"ashita.png"}
]}}"#;

#[allow(dead_code)]
pub const READERFRONT_WORK: &str = r#"{"data":{"work":{
  "id":1,"name":"Hana no Kage","stub":"hana-no-kage","type":"Manga","licensed":false,
  "status_name":"on_going","description":"Una historia.","adult":true,
  "thumbnail_path":"hana.jpg","demographic_name":"Seinen",
  "genres":[{"genreId":3},{"genreId":18}],
  "people_works":[{"rol":1,"people":{"name":"Aki"}},{"rol":2,"people":{"name":"Mei"}}]
}}}"#;

#[allow(dead_code)]
pub const READERFRONT_CHAPTERS: &str = r#"{"data":{"chaptersByWork":[
  {"id":451,"volume":1,"chapter":2,"subchapter":5,"name":"Lluvia","releaseDate":"2020-06-01T10:00:00.000Z"},
  {"id":450,"volume":1,"chapter":2,"subchapter":0,"name":"","releaseDate":"2020-05-20T10:00:00.000Z"}
]}}"#;

#[allow(dead_code)]
pub const READERFRONT_CHAPTER: &str = r#"{"data":{"chapterById":{
  "uniqid":"c-uniq","work":{"uniqid":"w-uniq"},
  "pages":[{"filename":"01.jpg","width":800},{"filename":"02.png","width":1200},{"filename":"03.jpg"}]
}}}"#;

#[allow(dead_code)]
pub const READERFRONT_ERROR: &str = r#"{"errors":[{"message":"Work not found","locations":[{"line":2,"column":3}]}],"data":{"work":null}}"#;

/// Fresh temporary directory, removed when dropped.
#[allow(dead_code)]
pub fn setup_test_dir() -> tempfile::TempDir {
    let _ = env_logger::builder().is_test(true).try_init();
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// ReaderFront site used by the tests.
#[allow(dead_code)]
pub struct TestReader;

impl ReaderFrontImpl for TestReader {
    fn id(&self) -> &'static str {
        "testreader"
    }

    fn name(&self) -> &'static str {
        "Test Reader"
    }

    fn base_url(&self) -> &'static str {
        "https://lector.example.com"
    }

    fn lang(&self) -> &'static str {
        "es"
    }

    fn image_cdn(&self, path: &str, width: u32) -> String {
        format!("https://images.example.com/?url={}&w={}", path, width)
    }
}

/// In-memory source returning canned titles, or failing every call.
#[allow(dead_code)]
pub struct MockSource {
    pub id: &'static str,
    pub titles: Vec<&'static str>,
    pub fail: bool,
    pub pages: Vec<Page>,
    pub client: HttpClient,
}

#[allow(dead_code)]
impl MockSource {
    pub fn new(id: &'static str, titles: &[&'static str]) -> Self {
        Self {
            id,
            titles: titles.to_vec(),
            fail: false,
            pages: Vec::new(),
            client: HttpClient::new(id),
        }
    }

    pub fn failing(id: &'static str) -> Self {
        Self {
            fail: true,
            ..Self::new(id, &[])
        }
    }

    /// Pages returned for every chapter.
    pub fn with_pages(mut self, pages: Vec<Page>) -> Self {
        self.pages = pages;
        self
    }

    pub fn with_client(mut self, client: HttpClient) -> Self {
        self.client = client;
        self
    }

    fn check(&self) -> Result<()> {
        if self.fail {
            Err(Error::source(self.id, "HTTP 503 Service Unavailable"))
        } else {
            Ok(())
        }
    }

    fn listing(&self) -> Vec<Manga> {
        self.titles
            .iter()
            .map(|title| Manga {
                id: format!("/manga/{}/", title.to_lowercase().replace(' ', "-")),
                title: title.to_string(),
                tags: vec!["Drama".to_string()],
                ..Default::default()
            })
            .collect()
    }
}

#[async_trait]
impl Source for MockSource {
    fn id(&self) -> &'static str {
        self.id
    }

    fn name(&self) -> &'static str {
        "Mock"
    }

    fn base_url(&self) -> &str {
        "https://mock.example"
    }

    fn lang(&self) -> &str {
        "pt-BR"
    }

    fn client(&self) -> &HttpClient {
        &self.client
    }

    async fn popular(&self, _page: u32) -> Result<MangasPage> {
        self.check()?;
        Ok(MangasPage::new(self.listing(), false))
    }

    async fn latest(&self, page: u32) -> Result<MangasPage> {
        self.popular(page).await
    }

    async fn search(&self, params: SearchParams) -> Result<MangasPage> {
        self.check()?;
        let query = params.query.to_lowercase();
        let mangas = self
            .listing()
            .into_iter()
            .filter(|m| m.title.to_lowercase().contains(&query))
            .collect();
        Ok(MangasPage::new(mangas, false))
    }

    async fn get_details(&self, manga_id: &str) -> Result<Manga> {
        self.check()?;
        self.listing()
            .into_iter()
            .find(|m| m.id == manga_id)
            .ok_or_else(|| Error::not_found(manga_id.to_string()))
    }

    async fn get_chapters(&self, manga_id: &str) -> Result<Vec<Chapter>> {
        self.check()?;
        Ok(vec![Chapter {
            id: format!("{}capitulo-1/", manga_id),
            number: 1.0,
            title: "Capítulo 1".to_string(),
            manga_id: manga_id.to_string(),
            source_id: self.id.to_string(),
            ..Default::default()
        }])
    }

    async fn get_pages(&self, _chapter_id: &str) -> Result<Vec<Page>> {
        self.check()?;
        Ok(self.pages.clone())
    }
}

/// A request as seen by [`TestServer`].
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub at: Instant,
    pub method: String,
    pub path: String,
    /// Lowercased names.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

#[allow(dead_code)]
impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// What [`TestServer`] sends back.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
}

#[allow(dead_code)]
impl Reply {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }
}

#[allow(dead_code)]
type Handler = dyn Fn(&RecordedRequest, usize) -> Reply + Send + Sync;

/// Loopback HTTP/1.1 server answering each request through a handler that
/// also gets the request's zero-based sequence number.
///
/// Every reply closes its connection, so nothing stays pooled in the global
/// client once the test runtime is gone.
#[allow(dead_code)]
pub struct TestServer {
    pub url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

#[allow(dead_code)]
impl TestServer {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&RecordedRequest, usize) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test server");
        let url = format!("http://{}", listener.local_addr().expect("No local address"));
        let requests: Arc<Mutex<Vec<RecordedRequest>>> = Arc::new(Mutex::new(Vec::new()));
        let handler: Arc<Handler> = Arc::new(handler);

        let recorded = requests.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let recorded = recorded.clone();
                let handler = handler.clone();
                tokio::spawn(async move {
                    serve(stream, recorded, handler).await;
                });
            }
        });

        Self { url, requests }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }
}

#[allow(dead_code)]
async fn serve(mut stream: TcpStream, recorded: Arc<Mutex<Vec<RecordedRequest>>>, handler: Arc<Handler>) {
    let Some(request) = read_request(&mut stream).await else {
        return;
    };

    let reply = {
        let mut requests = recorded.lock();
        let reply = handler(&request, requests.len());
        requests.push(request);
        reply
    };

    let mut head = format!(
        "HTTP/1.1 {} Test\r\nContent-Length: {}\r\nConnection: close\r\n",
        reply.status,
        reply.body.len()
    );
    for (name, value) in &reply.headers {
        head.push_str(&format!("{}: {}\r\n", name, value));
    }
    head.push_str("\r\n");

    let _ = stream.write_all(head.as_bytes()).await;
    let _ = stream.write_all(&reply.body).await;
    let _ = stream.shutdown().await;
}

#[allow(dead_code)]
async fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 4096];

    let header_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };
    let at = Instant::now();

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let length = headers
        .iter()
        .find(|(k, _)| k == "content-length")
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let end = buf.len().min(header_end + length);
    let body = String::from_utf8_lossy(&buf[header_end..end]).to_string();

    Some(RecordedRequest {
        at,
        method,
        path,
        headers,
        body,
    })
}
