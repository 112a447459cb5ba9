use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::dashboard::DashboardPage;
use crate::error::ScanError;
use crate::types::ScanReport;

/// The long-running analysis call. One implementation speaks HTTP; tests
/// substitute their own.
pub trait ScanBackend {
    /// Submit `url` for analysis, tagged with the push-channel session id
    /// when one is available, and resolve to the settled report.
    fn submit(
        &self,
        url: &Url,
        session_id: Option<&str>,
    ) -> impl Future<Output = Result<ScanReport, ScanError>> + Send;
}

#[derive(Serialize)]
struct ScanRequestBody<'a> {
    url: &'a str,
}

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP implementation of [`ScanBackend`] against the analysis service.
pub struct HttpBackend {
    client: reqwest::Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(base: Url) -> Result<Self, ScanError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, base })
    }

    /// Fetch one page of the dashboard summary view. The coordinator never
    /// calls this; it exists for the summary view that re-fetches after a
    /// successful scan.
    pub async fn dashboard_page(&self, page: u32) -> Result<DashboardPage, ScanError> {
        let mut endpoint = join(&self.base, "dashboard/data")?;
        endpoint
            .query_pairs_mut()
            .append_pair("page", &page.to_string());
        let resp = self.client.get(endpoint).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(ScanError::Status {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(ScanError::Decode)
    }
}

impl ScanBackend for HttpBackend {
    async fn submit(&self, url: &Url, session_id: Option<&str>) -> Result<ScanReport, ScanError> {
        let endpoint = scan_endpoint(&self.base, session_id)?;
        debug!(%endpoint, target = %url, "submitting scan");

        let resp = self
            .client
            .post(endpoint)
            .json(&ScanRequestBody { url: url.as_str() })
            .send()
            .await?;

        let status = resp.status();
        // Read the body as text either way: diagnostics on failure, JSON on
        // success.
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(ScanError::Status {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(ScanError::Decode)
    }
}

fn join(base: &Url, path: &str) -> Result<Url, ScanError> {
    base.join(path)
        .map_err(|e| ScanError::InvalidUrl(format!("bad endpoint {path}: {e}")))
}

/// Build `POST /scan-url`, carrying the session id as the `sid` query
/// parameter when live progress is available.
fn scan_endpoint(base: &Url, session_id: Option<&str>) -> Result<Url, ScanError> {
    let mut endpoint = join(base, "scan-url")?;
    if let Some(sid) = session_id {
        endpoint.query_pairs_mut().append_pair("sid", sid);
    }
    Ok(endpoint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_endpoint_carries_session_id() {
        let base = Url::parse("http://127.0.0.1:5000/").unwrap();
        let ep = scan_endpoint(&base, Some("abc-123")).unwrap();
        assert_eq!(ep.as_str(), "http://127.0.0.1:5000/scan-url?sid=abc-123");
    }

    #[test]
    fn scan_endpoint_without_session_has_no_query() {
        let base = Url::parse("http://127.0.0.1:5000/").unwrap();
        let ep = scan_endpoint(&base, None).unwrap();
        assert_eq!(ep.as_str(), "http://127.0.0.1:5000/scan-url");
    }

    #[test]
    fn request_body_serializes_url_field() {
        let body = ScanRequestBody {
            url: "http://example.com/",
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"url":"http://example.com/"}"#);
    }
}
