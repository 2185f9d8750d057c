//! PostgREST content store client.
//!
//! Talks to a hosted table over the `/rest/v1/<table>` REST endpoint
//! (Supabase and other PostgREST deployments).

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::BlogsyncError;
use crate::store::{ArticleUpdate, ContentStore, NewArticle, RecordId, RemoteRecord};

/// Request timeout for the health check (seconds).
const PING_TIMEOUT_SECS: u64 = 5;

/// Error body returned by PostgREST.
#[derive(Deserialize)]
struct ApiError {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

/// Content store backed by a PostgREST table.
pub struct RestStore {
    client: Client,
    table_url: String,
}

impl RestStore {
    /// Build a client that authenticates every request with the store key.
    pub fn new(config: &StoreConfig) -> Result<Self, BlogsyncError> {
        let key = config.key.expose_secret();

        let mut headers = HeaderMap::new();
        let mut api_key = HeaderValue::from_str(key)
            .map_err(|e| BlogsyncError::Config(format!("Invalid store key: {e}")))?;
        api_key.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {key}"))
            .map_err(|e| BlogsyncError::Config(format!("Invalid store key: {e}")))?;
        bearer.set_sensitive(true);
        headers.insert("apikey", api_key);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            table_url: table_url(&config.url, &config.table),
        })
    }

    /// Check that the table endpoint answers with the configured key.
    pub async fn ping(&self) -> Result<bool, BlogsyncError> {
        let request = self
            .client
            .get(&self.table_url)
            .query(&[("select", "id"), ("limit", "1")])
            .timeout(std::time::Duration::from_secs(PING_TIMEOUT_SECS));

        match request.send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Send a request and decode the returned rows.
    async fn rows(
        &self,
        request: RequestBuilder,
        slug: Option<&str>,
    ) -> Result<Vec<RemoteRecord>, BlogsyncError> {
        let response = request
            .send()
            .await
            .map_err(|e| BlogsyncError::StoreUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_response(status, &body, slug));
        }

        response.json::<Vec<RemoteRecord>>().await.map_err(|e| {
            BlogsyncError::StoreRequestFailed {
                status: status.as_u16(),
                message: format!("Unexpected response body: {e}"),
            }
        })
    }
}

#[async_trait]
impl ContentStore for RestStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<RemoteRecord>, BlogsyncError> {
        debug!("GET {} slug={slug}", self.table_url);
        let request = self.client.get(&self.table_url).query(&[
            ("select", "*".to_string()),
            ("slug", format!("eq.{slug}")),
            ("order", "id.asc".to_string()),
        ]);

        let mut rows = self.rows(request, None).await?;
        if rows.len() > 1 {
            warn!(
                "{} records share slug {slug}; using id {}",
                rows.len(),
                rows[0].id
            );
        }
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    async fn insert(&self, record: &NewArticle<'_>) -> Result<RemoteRecord, BlogsyncError> {
        let slug = record.article.slug.as_str();
        debug!("POST {} slug={slug}", self.table_url);
        let request = self
            .client
            .post(&self.table_url)
            .header("Prefer", "return=representation")
            .json(record);

        first_row(self.rows(request, Some(slug)).await?, slug)
    }

    async fn update(
        &self,
        id: &RecordId,
        fields: &ArticleUpdate,
    ) -> Result<RemoteRecord, BlogsyncError> {
        debug!("PATCH {} id={id}", self.table_url);
        let request = self
            .client
            .patch(&self.table_url)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(fields);

        first_row(self.rows(request, None).await?, &format!("id {id}"))
    }
}

/// REST endpoint for `table` under the project `base_url`.
fn table_url(base_url: &str, table: &str) -> String {
    format!("{}/rest/v1/{table}", base_url.trim_end_matches('/'))
}

/// The store echoes written rows; an empty echo means nothing matched.
fn first_row(mut rows: Vec<RemoteRecord>, what: &str) -> Result<RemoteRecord, BlogsyncError> {
    if rows.is_empty() {
        return Err(BlogsyncError::RecordNotFound(what.to_string()));
    }
    Ok(rows.swap_remove(0))
}

/// Map a non-success response to an error.
///
/// A conflict while writing `slug` means the slug is already taken.
fn error_from_response(status: StatusCode, body: &str, slug: Option<&str>) -> BlogsyncError {
    let parsed = serde_json::from_str::<ApiError>(body).ok();
    let unique_violation = parsed
        .as_ref()
        .and_then(|e| e.code.as_deref())
        .is_some_and(|code| code == "23505");

    if let Some(slug) = slug {
        if status == StatusCode::CONFLICT || unique_violation {
            return BlogsyncError::AmbiguousSlug(slug.to_string());
        }
    }

    let message = match parsed {
        Some(err) => err.message,
        None if body.is_empty() => status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_string(),
        None => body.to_string(),
    };
    BlogsyncError::StoreRequestFailed {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    use super::*;
    use crate::article::Article;

    /// Local HTTP stub. Answers one connection per canned `(status, body)`
    /// and returns the raw requests it received.
    async fn serve(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let mut requests = Vec::new();
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                requests.push(read_request(&mut socket).await);
                let reply = format!(
                    "HTTP/1.1 {status} Stub\r\ncontent-type: application/json\r\n\
                     content-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket.write_all(reply.as_bytes()).await.unwrap();
                socket.shutdown().await.ok();
            }
            requests
        });

        (url, handle)
    }

    /// Read one request: headers, then `content-length` bytes of body.
    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let length = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn store_at(url: &str) -> RestStore {
        RestStore::new(&StoreConfig {
            url: url.into(),
            key: SecretString::from("test-key".to_string()),
            table: "blog_posts".into(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn article() -> Article {
        Article {
            title: "Solar Basics".into(),
            excerpt: "Short".into(),
            content: "Body".into(),
            author: "Sam".into(),
            read_time: "3 min read".into(),
            category: "Guides".into(),
            image: String::new(),
            slug: "solar-basics".into(),
            published: true,
        }
    }

    #[test]
    fn test_table_url() {
        assert_eq!(
            table_url("https://abc.supabase.co/", "blog_posts"),
            "https://abc.supabase.co/rest/v1/blog_posts"
        );
    }

    #[test]
    fn test_conflict_on_insert_is_ambiguous_slug() {
        let body = r#"{"code":"23505","message":"duplicate key value violates unique constraint"}"#;
        let err = error_from_response(StatusCode::CONFLICT, body, Some("solar-basics"));
        assert!(matches!(err, BlogsyncError::AmbiguousSlug(ref s) if s == "solar-basics"));
    }

    #[test]
    fn test_conflict_without_slug_is_request_failure() {
        let err = error_from_response(StatusCode::CONFLICT, "", None);
        assert!(matches!(
            err,
            BlogsyncError::StoreRequestFailed { status: 409, .. }
        ));
    }

    #[test]
    fn test_api_error_message_extracted() {
        let body = r#"{"code":"42501","message":"new row violates row-level security policy"}"#;
        match error_from_response(StatusCode::UNAUTHORIZED, body, Some("x")) {
            BlogsyncError::StoreRequestFailed { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "new row violates row-level security policy");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_plain_and_empty_bodies() {
        match error_from_response(StatusCode::BAD_GATEWAY, "upstream down", None) {
            BlogsyncError::StoreRequestFailed { message, .. } => assert_eq!(message, "upstream down"),
            other => panic!("unexpected error: {other}"),
        }
        match error_from_response(StatusCode::NOT_FOUND, "", None) {
            BlogsyncError::StoreRequestFailed { message, .. } => assert_eq!(message, "Not Found"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_first_row_empty_is_not_found() {
        let err = first_row(vec![], "id 7").unwrap_err();
        assert!(matches!(err, BlogsyncError::RecordNotFound(ref s) if s == "id 7"));
    }

    #[test]
    fn test_new_rejects_unprintable_key() {
        let config = StoreConfig {
            url: "https://abc.supabase.co".into(),
            key: SecretString::from("bad\nkey".to_string()),
            table: "blog_posts".into(),
            timeout_secs: 5,
        };
        assert!(matches!(
            RestStore::new(&config),
            Err(BlogsyncError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_store_is_unavailable() {
        let config = StoreConfig {
            // Discard port on loopback, nothing listens there
            url: "http://127.0.0.1:9".into(),
            key: SecretString::from("k".to_string()),
            table: "blog_posts".into(),
            timeout_secs: 2,
        };
        let store = RestStore::new(&config).unwrap();
        let err = store.find_by_slug("anything").await.unwrap_err();
        assert!(matches!(err, BlogsyncError::StoreUnavailable(_)));
        assert!(!store.ping().await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_slug_request_and_lowest_id() {
        let (url, server) = serve(vec![(
            200,
            r#"[{"id":3,"slug":"solar-basics","title":"Old"},{"id":9,"slug":"solar-basics"}]"#,
        )])
        .await;

        let found = store_at(&url).find_by_slug("solar-basics").await.unwrap();
        assert_eq!(found.unwrap().id, RecordId::Int(3));

        let requests = server.await.unwrap();
        let request = requests[0].to_lowercase();
        assert!(request.starts_with("get /rest/v1/blog_posts?"));
        assert!(request.contains("slug=eq.solar-basics"));
        assert!(request.contains("order=id.asc"));
        assert!(request.contains("apikey: test-key"));
        assert!(request.contains("authorization: bearer test-key"));
    }

    #[tokio::test]
    async fn test_find_by_slug_empty_is_none() {
        let (url, server) = serve(vec![(200, "[]")]).await;
        assert_eq!(store_at(&url).find_by_slug("missing").await.unwrap(), None);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_insert_posts_article_with_representation() {
        let (url, server) = serve(vec![(201, r#"[{"id":5,"slug":"solar-basics"}]"#)]).await;

        let article = article();
        let record = store_at(&url)
            .insert(&NewArticle::new(&article, chrono::Utc::now()))
            .await
            .unwrap();
        assert_eq!(record.id, RecordId::Int(5));

        let requests = server.await.unwrap();
        let request = requests[0].to_lowercase();
        assert!(request.starts_with("post /rest/v1/blog_posts "));
        assert!(request.contains("prefer: return=representation"));
        assert!(request.contains("apikey: test-key"));
        assert!(request.contains(r#""slug":"solar-basics""#));
        assert!(request.contains(r#""published":true"#));
    }

    #[tokio::test]
    async fn test_insert_conflict_response_is_ambiguous_slug() {
        let (url, server) = serve(vec![(
            409,
            r#"{"code":"23505","message":"duplicate key value violates unique constraint"}"#,
        )])
        .await;

        let article = article();
        let err = store_at(&url)
            .insert(&NewArticle::new(&article, chrono::Utc::now()))
            .await
            .unwrap_err();
        assert!(matches!(err, BlogsyncError::AmbiguousSlug(ref s) if s == "solar-basics"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_update_patches_by_id() {
        let (url, server) = serve(vec![(200, r#"[{"id":7,"slug":"solar-basics"}]"#)]).await;

        let fields = ArticleUpdate::from_article(&article(), false, chrono::Utc::now());
        let record = store_at(&url)
            .update(&RecordId::Int(7), &fields)
            .await
            .unwrap();
        assert_eq!(record.id, RecordId::Int(7));

        let requests = server.await.unwrap();
        let request = requests[0].to_lowercase();
        assert!(request.starts_with("patch /rest/v1/blog_posts?id=eq.7 "));
        assert!(request.contains("prefer: return=representation"));
        assert!(request.contains(r#""content":"body""#));
        assert!(!request.contains(r#""title""#));
    }

    #[tokio::test]
    async fn test_update_matching_nothing_is_not_found() {
        let (url, server) = serve(vec![(200, "[]")]).await;

        let fields = ArticleUpdate::from_article(&article(), false, chrono::Utc::now());
        let err = store_at(&url)
            .update(&RecordId::Int(7), &fields)
            .await
            .unwrap_err();
        assert!(matches!(err, BlogsyncError::RecordNotFound(ref s) if s == "id 7"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_batch_skips_on_conflict_response() {
        use crate::pipeline::{run_batch, IngestOptions, Mode};
        use crate::sources::markdown::MarkdownFolderSource;

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("a.md"),
            "---\ntitle: Solar Basics\n---\nBody\n",
        )
        .unwrap();

        let (url, server) = serve(vec![
            (200, "[]"),
            (409, r#"{"code":"23505","message":"duplicate key"}"#),
        ])
        .await;

        let source = MarkdownFolderSource::new(dir.path(), vec![".md".into()]);
        let options = IngestOptions {
            mode: Mode::Insert,
            published: true,
        };
        let report = run_batch(&source, &store_at(&url), &options).await.unwrap();

        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 0);
        assert_eq!(server.await.unwrap().len(), 2);
    }
}
