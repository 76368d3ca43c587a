use std::fmt;

use url::{Host, Url};

use crate::error::GatewayError;

const HTTPS_PREFIX: &str = "https://";
const HTTP_PREFIX: &str = "http://";

/// Normalize a user-supplied server URL.
///
/// Surrounding whitespace is trimmed, `https://` is prepended when no
/// `http://` / `https://` scheme is present and the trailing slash is
/// removed. The scheme separator itself is never stripped, so
/// `normalize_server_url(&normalize_server_url(x)) == normalize_server_url(x)`
/// for every input.
#[must_use]
pub fn normalize_server_url(url: &str) -> String {
    let trimmed = url.trim();
    let (mut normalized, floor) = match scheme_prefix_len(trimmed) {
        Some(len) => (trimmed.to_owned(), len),
        None => (format!("{HTTPS_PREFIX}{trimmed}"), HTTPS_PREFIX.len()),
    };

    let keep = normalized[floor..]
        .trim_end_matches(|c: char| c == '/' || c.is_whitespace())
        .len();
    normalized.truncate(floor + keep);
    normalized
}

/// Offline pre-check used before the slow connection probe.
///
/// The normalized URL must parse as an absolute `http`/`https` URL whose host
/// is `localhost`, an IP literal or a dotted domain name.
#[must_use]
pub fn is_valid_url(url: &str) -> bool {
    let Ok(parsed) = parse_http_url(&normalize_server_url(url)) else {
        return false;
    };
    match parsed.host() {
        Some(Host::Ipv4(_) | Host::Ipv6(_)) => true,
        Some(Host::Domain(domain)) => is_qualified_domain(domain),
        None => false,
    }
}

fn scheme_prefix_len(url: &str) -> Option<usize> {
    [HTTPS_PREFIX, HTTP_PREFIX].into_iter().find_map(|prefix| {
        url.get(..prefix.len())
            .filter(|head| head.eq_ignore_ascii_case(prefix))
            .map(|_| prefix.len())
    })
}

fn is_qualified_domain(domain: &str) -> bool {
    if domain.eq_ignore_ascii_case("localhost") {
        return true;
    }
    let labels: Vec<&str> = domain.trim_end_matches('.').split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}

fn parse_http_url(normalized: &str) -> Result<Url, String> {
    let url = Url::parse(normalized).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme `{}`", url.scheme()));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err("missing host".to_owned());
    }
    if url.cannot_be_a_base() {
        return Err("not a base URL".to_owned());
    }
    Ok(url)
}

/// A normalized, absolute backend base URL (scheme + host, optional path
/// prefix, no trailing slash).
///
/// Only constructible through [`BaseUrl::parse`], so every request the
/// gateway builds starts from a well-formed URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl {
    raw: String,
    url: Url,
}

impl BaseUrl {
    /// # Errors
    /// `GatewayError::InvalidBaseUrl` when the normalized value is not an
    /// absolute `http`/`https` URL with a host.
    pub fn parse(input: &str) -> Result<Self, GatewayError> {
        let raw = normalize_server_url(input);
        let url = parse_http_url(&raw).map_err(|reason| GatewayError::InvalidBaseUrl {
            url: input.to_owned(),
            reason,
        })?;
        if url.query().is_some() || url.fragment().is_some() {
            return Err(GatewayError::InvalidBaseUrl {
                url: input.to_owned(),
                reason: "base URL must not carry a query or fragment".to_owned(),
            });
        }
        Ok(Self { raw, url })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Resolve an endpoint below this base.
    ///
    /// Each segment is percent-encoded as a single path segment; query pairs
    /// are appended in order and omitted entirely when empty.
    ///
    /// # Errors
    /// `GatewayError::Build` if the base cannot accept path segments.
    pub fn endpoint<S>(&self, segments: &[S], query: &[(&str, String)]) -> Result<Url, GatewayError>
    where
        S: AsRef<str>,
    {
        let mut url = self.url.clone();
        url.path_segments_mut()
            .map_err(|()| GatewayError::Build(format!("`{}` cannot be a base", self.raw)))?
            .pop_if_empty()
            .extend(segments.iter().map(|s| s.as_ref()));
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepends_https_when_scheme_missing() {
        assert_eq!(normalize_server_url("example.com"), "https://example.com");
        assert_eq!(
            normalize_server_url("  example.com/api/ "),
            "https://example.com/api"
        );
    }

    #[test]
    fn keeps_existing_scheme() {
        assert_eq!(
            normalize_server_url("http://localhost:3000/"),
            "http://localhost:3000"
        );
        assert_eq!(normalize_server_url("HTTPS://Example.com"), "HTTPS://Example.com");
    }

    #[test]
    fn normalization_is_idempotent() {
        let inputs = [
            "",
            "/",
            "example.com",
            "example.com/",
            "example.com//",
            "https://",
            "https:///",
            "http://localhost:8000/ /",
            "javascript:alert(1)",
            "  https://example.com/api/  ",
        ];
        for input in inputs {
            let once = normalize_server_url(input);
            assert_eq!(normalize_server_url(&once), once, "input {input:?}");
        }
    }

    #[test]
    fn accepts_reasonable_urls() {
        assert!(is_valid_url("https://example.com"));
        assert!(is_valid_url("http://localhost:3000"));
        assert!(is_valid_url("example.com"));
        assert!(is_valid_url("192.168.1.10:8000"));
        assert!(is_valid_url("http://[::1]:8000/"));
    }

    #[test]
    fn rejects_malformed_urls() {
        assert!(!is_valid_url("not-a-url"));
        assert!(!is_valid_url(""));
        assert!(!is_valid_url("javascript:alert(1)"));
        assert!(!is_valid_url("https://exa mple.com"));
        assert!(!is_valid_url(".com"));
    }

    #[test]
    fn base_url_strips_trailing_slash() {
        let base = BaseUrl::parse("http://localhost:8000/").unwrap();
        assert_eq!(base.as_str(), "http://localhost:8000");
        assert_eq!(base.to_string(), "http://localhost:8000");
    }

    #[test]
    fn base_url_rejects_garbage() {
        let err = BaseUrl::parse("http://").unwrap_err();
        assert!(matches!(err, GatewayError::InvalidBaseUrl { .. }));
        assert!(BaseUrl::parse("https://example.com/?a=b").is_err());
    }

    #[test]
    fn endpoint_appends_segments_under_prefix() {
        let base = BaseUrl::parse("https://example.com/backend/").unwrap();
        let url = base.endpoint(&["api", "agents", "a/b c"], &[]).unwrap();
        assert_eq!(url.as_str(), "https://example.com/backend/api/agents/a%2Fb%20c");
    }

    #[test]
    fn endpoint_without_query_has_no_question_mark() {
        let base = BaseUrl::parse("http://localhost:8000").unwrap();
        let url = base.endpoint(&["api", "threads", "t1", "messages"], &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/threads/t1/messages");
        assert_eq!(url.query(), None);

        let url = base
            .endpoint(
                &["api", "threads", "t1", "messages"],
                &[("limit", "5".to_owned()), ("order", "asc".to_owned())],
            )
            .unwrap();
        assert_eq!(url.query(), Some("limit=5&order=asc"));
    }
}
