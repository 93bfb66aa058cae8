//! HTTP transport for license requests

use licenser_core::{
    LicenseError, LicenseResult, LicenserConfig, RawResponse, RemoteClient, RequestPayload,
};
use reqwest::Url;
use std::time::Duration;

/// Blocking HTTP client posting license requests to the configured server
pub struct HttpClient {
    base: Url,
    http: reqwest::blocking::Client,
}

impl HttpClient {
    pub fn new(config: &LicenserConfig) -> LicenseResult<Self> {
        let base = base_url(&config.remote.api_url)?;
        let user_agent = format!(
            "Licenser/{} ({}/{}; {})",
            licenser_core::VERSION,
            config.product.slug,
            config.product.version,
            config.site.url,
        );
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.remote.timeout_secs))
            .user_agent(user_agent)
            .build()
            .map_err(|e| LicenseError::Transport(e.to_string()))?;
        Ok(Self { base, http })
    }

    /// Full URL for a route like `license/{hash}/check`.
    pub fn endpoint(&self, route: &str) -> LicenseResult<Url> {
        self.base
            .join(route.trim_start_matches('/'))
            .map_err(|e| LicenseError::Config(format!("invalid route {route:?}: {e}")))
    }
}

/// Parses the API base, forcing a trailing slash so routes join under it.
pub fn base_url(raw: &str) -> LicenseResult<Url> {
    let raw = raw.trim();
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&with_slash)
        .map_err(|e| LicenseError::Config(format!("remote.api_url {raw:?}: {e}")))
}

impl RemoteClient for HttpClient {
    fn send(&self, payload: &RequestPayload, route: &str) -> LicenseResult<RawResponse> {
        let url = self.endpoint(route)?;
        tracing::debug!(%url, "POST license request");

        // The body decides the verdict, so non-2xx responses are still read.
        let resp = self
            .http
            .post(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(payload)
            .send()
            .map_err(|e| LicenseError::Transport(e.to_string()))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .map_err(|e| LicenseError::Transport(e.to_string()))?;
        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_trailing_slash() {
        let url = base_url("https://licensing.example.com/api/v1").unwrap();
        assert_eq!(url.as_str(), "https://licensing.example.com/api/v1/");
        assert_eq!(
            url.join("license/abc/check").unwrap().as_str(),
            "https://licensing.example.com/api/v1/license/abc/check"
        );
    }

    #[test]
    fn base_url_rejects_garbage() {
        assert!(matches!(
            base_url("not a url"),
            Err(LicenseError::Config(_))
        ));
    }
}
