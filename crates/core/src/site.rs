//! The installation calling the licensing server

use url::{Host, Url};

const LOCAL_SUFFIXES: &[&str] = &[".localhost", ".local", ".test"];

/// Calling URL plus whether it is a local development environment.
///
/// Both travel with every remote request so the server can skip counting
/// local installs against the activation limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteContext {
    pub url: String,
    pub is_local: bool,
}

impl SiteContext {
    /// Builds the context, detecting `is_local` from the URL unless overridden.
    pub fn new(url: impl Into<String>, is_local: Option<bool>) -> Self {
        let url = url.into();
        let is_local = is_local.unwrap_or_else(|| is_local_url(&url));
        Self { url, is_local }
    }
}

/// True for loopback addresses, `localhost`, and `.localhost`/`.local`/`.test`
/// hosts. Unparseable URLs are not local.
pub fn is_local_url(raw: &str) -> bool {
    let Ok(url) = Url::parse(raw.trim()) else {
        return false;
    };
    match url.host() {
        Some(Host::Ipv4(ip)) => ip.is_loopback() || ip.is_unspecified(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        Some(Host::Domain(domain)) => {
            let domain = domain.to_ascii_lowercase();
            domain == "localhost" || LOCAL_SUFFIXES.iter().any(|s| domain.ends_with(s))
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_local_hosts() {
        assert!(is_local_url("http://localhost:8080/wp"));
        assert!(is_local_url("http://127.0.0.1"));
        assert!(is_local_url("http://[::1]/"));
        assert!(is_local_url("https://shop.test"));
        assert!(is_local_url("https://dev.acme.local"));
    }

    #[test]
    fn public_and_garbage_urls_are_not_local() {
        assert!(!is_local_url("https://shop.example.com"));
        assert!(!is_local_url("https://localtest.com"));
        assert!(!is_local_url("not a url"));
        assert!(!is_local_url(""));
    }

    #[test]
    fn override_wins_over_detection() {
        let site = SiteContext::new("http://localhost", Some(false));
        assert!(!site.is_local);
        let site = SiteContext::new("https://shop.example.com", None);
        assert!(!site.is_local);
    }
}
