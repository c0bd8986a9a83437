//! `reqwest` implementation of [`DataService`].
//!
//! Each call is a single request with no retry. Non-success statuses are
//! reported as [`ClientError::Status`]; a `200` body of the form
//! `{"error": "..."}` from `/school/{id}` means the id is unknown.

use geojson::FeatureCollection;
use lone_star_ledger_models::{
    EntityDetail, EntityId, EntityRef, HealthStatus, NewsletterSignup, SchoolSearchParams,
    SummaryStats,
};

use crate::{ClientError, DataService, ServiceConfig};

/// Data service client speaking HTTP.
pub struct HttpDataService {
    client: reqwest::Client,
    config: ServiceConfig,
    base: reqwest::Url,
}

impl HttpDataService {
    /// Creates a client for the service described by `config`.
    ///
    /// # Errors
    ///
    /// * [`ClientError::InvalidUrl`] if the configured base URL cannot
    ///   carry path segments
    /// * [`ClientError::Http`] if the underlying HTTP client cannot be
    ///   built
    pub fn new(config: ServiceConfig) -> Result<Self, ClientError> {
        let base = reqwest::Url::parse(config.base_url())
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ClientError::InvalidUrl {
                url: config.base_url().to_string(),
            })?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            config,
            base,
        })
    }

    /// The configuration this client was built with.
    #[must_use]
    pub const fn config(&self) -> &ServiceConfig {
        &self.config
    }

    async fn get_json(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<serde_json::Value, ClientError> {
        let resp = request.send().await?;
        if !resp.status().is_success() {
            return Err(ClientError::Status {
                status: resp.status().as_u16(),
                url: url.to_string(),
            });
        }
        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// `/school/{id}` with the id percent-encoded as a single path
    /// segment.
    fn detail_url(&self, id: &EntityId) -> Result<reqwest::Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl {
                url: self.base.to_string(),
            })?
            .pop_if_empty()
            .push("school")
            .push(id.as_str());
        Ok(url)
    }

    async fn get(&self, path: &str) -> Result<serde_json::Value, ClientError> {
        let url = self.config.url(path);
        log::debug!("GET {url}");
        self.get_json(self.client.get(&url), &url).await
    }
}

#[async_trait::async_trait]
impl DataService for HttpDataService {
    async fn health(&self) -> Result<HealthStatus, ClientError> {
        Ok(serde_json::from_value(self.get("health").await?)?)
    }

    async fn summary(&self) -> Result<SummaryStats, ClientError> {
        Ok(serde_json::from_value(self.get("summary").await?)?)
    }

    async fn district_boundaries(&self) -> Result<FeatureCollection, ClientError> {
        Ok(serde_json::from_value(self.get("geojson_districts").await?)?)
    }

    async fn campus_points(&self) -> Result<FeatureCollection, ClientError> {
        Ok(serde_json::from_value(self.get("geojson_campuses").await?)?)
    }

    async fn search_schools(
        &self,
        params: &SchoolSearchParams,
    ) -> Result<Vec<EntityRef>, ClientError> {
        let url = self.config.url("schools");
        log::debug!("GET {url} {params:?}");
        let body = self
            .get_json(self.client.get(&url).query(params), &url)
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn school_detail(&self, id: &EntityId) -> Result<EntityDetail, ClientError> {
        let url = self.detail_url(id)?;
        log::debug!("GET {url}");
        let body = self
            .get_json(self.client.get(url.clone()), url.as_str())
            .await?;
        parse_detail(id, body)
    }

    async fn subscribe_newsletter(&self, signup: &NewsletterSignup) -> Result<(), ClientError> {
        let url = self.config.url("newsletter");
        log::debug!("POST {url}");
        let resp = self.client.post(&url).json(signup).send().await?;
        if !resp.status().is_success() {
            return Err(ClientError::Status {
                status: resp.status().as_u16(),
                url,
            });
        }
        Ok(())
    }
}

/// Parses a `/school/{id}` body, mapping the service's error object to
/// [`ClientError::NotFound`].
fn parse_detail(id: &EntityId, body: serde_json::Value) -> Result<EntityDetail, ClientError> {
    if let Some(message) = body.get("error") {
        log::debug!("Service reported error for {id}: {message}");
        return Err(ClientError::NotFound { id: id.clone() });
    }
    Ok(serde_json::from_value(body)?)
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread::JoinHandle;

    use super::*;

    /// Serves one request with `body` and hands back its request line.
    fn serve_once(body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let handle = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut header = String::new();
            while reader.read_line(&mut header).unwrap() > 0 && header != "\r\n" {
                header.clear();
            }
            let mut stream = reader.into_inner();
            write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
            stream.flush().unwrap();
            request_line
        });
        (base, handle)
    }

    #[tokio::test]
    async fn detail_id_is_sent_as_one_encoded_segment() {
        let (base, server) = serve_once(r#"{"id": "A#1/2?x", "name": "Hash ISD"}"#);
        let service =
            HttpDataService::new(ServiceConfig::default().with_base_url(&base)).unwrap();

        let detail = service
            .school_detail(&EntityId::new("A#1/2?x"))
            .await
            .unwrap();
        assert_eq!(detail.id.as_str(), "A#1/2?x");
        assert_eq!(detail.name, "Hash ISD");

        let request_line = server.join().unwrap();
        assert!(
            request_line.starts_with("GET /school/A%231%2F2%3Fx HTTP/1.1"),
            "unexpected request line {request_line:?}"
        );
    }

    #[test]
    fn detail_url_keeps_base_path() {
        let service = HttpDataService::new(
            ServiceConfig::default().with_base_url("http://ledger.example/api/"),
        )
        .unwrap();
        let url = service.detail_url(&EntityId::new("048 001")).unwrap();
        assert_eq!(url.as_str(), "http://ledger.example/api/school/048%20001");
    }

    #[test]
    fn rejects_unusable_base_url() {
        let err = HttpDataService::new(ServiceConfig::default().with_base_url("not a url"))
            .err()
            .unwrap();
        assert!(matches!(err, ClientError::InvalidUrl { .. }));
    }

    #[test]
    fn parses_district_detail() {
        let body = serde_json::json!({
            "id": "048",
            "name": "Austin ISD",
            "per_pupil_spending": 12_500.0,
            "total_debt": 1_000_000.0,
            "avg_teacher_salary": 58_000.0,
            "spending": {
                "instruction": 400.0,
                "administration": 100.0,
                "operations": 200.0,
                "other": 50.0
            },
            "campuses": [
                {"id": "048-1", "name": "Travis HS", "reading_on_grade": 61.0, "math_on_grade": 55.5}
            ]
        });
        let detail = parse_detail(&EntityId::new("048"), body).unwrap();
        assert_eq!(detail.id.as_str(), "048");
        assert_eq!(detail.campuses.len(), 1);
        assert!((detail.spending.total() - 750.0).abs() < 1e-9);
    }

    #[test]
    fn error_body_is_not_found() {
        let body = serde_json::json!({"error": "School not found"});
        let err = parse_detail(&EntityId::new("999"), body).unwrap_err();
        assert!(matches!(err, ClientError::NotFound { id } if id.as_str() == "999"));
    }

    #[test]
    fn malformed_body_is_json_error() {
        let body = serde_json::json!({"name": "No id"});
        let err = parse_detail(&EntityId::new("1"), body).unwrap_err();
        assert!(matches!(err, ClientError::Json(_)));
    }

    #[test]
    fn builds_with_default_config() {
        let service = HttpDataService::new(ServiceConfig::default()).unwrap();
        assert_eq!(service.config().base_url(), "http://localhost:8000");
    }
}
