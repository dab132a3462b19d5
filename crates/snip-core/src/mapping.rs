use crate::shortcode::ShortCode;
use serde::{Deserialize, Serialize};
use url::Url;

/// A stored mapping from a short code to its target URL.
///
/// This is the record the store owns and the materialized cache copies.
/// Timestamps are whole Unix seconds. The public short URL is deliberately
/// absent: it is derived from the live host configuration on every read
/// (see [`ShortUrl`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlMapping {
    pub code: ShortCode,
    pub target_url: String,
    pub created_at: u64,
    pub expires_at: u64,
}

impl UrlMapping {
    /// Reports whether the mapping is usable at `now`.
    ///
    /// Total and side-effect free: anything malformed yields `false`.
    /// Checks run in a fixed order and stop at the first failure.
    pub fn is_valid(&self, now: u64) -> bool {
        if self.expires_at == 0 || now > self.expires_at || self.expires_at < self.created_at {
            return false;
        }
        if self.created_at == 0 {
            return false;
        }
        if self.code.is_empty() {
            return false;
        }
        is_absolute_url(&self.target_url)
    }
}

/// An absolute URI needs a scheme and a host; nothing is normalized or fetched.
///
/// The target is stored and later redirected to verbatim, so control
/// characters that `Url::parse` would silently strip or escape are refused.
fn is_absolute_url(target: &str) -> bool {
    if target.is_empty() || target.chars().any(|c| c.is_ascii_control()) {
        return false;
    }
    Url::parse(target).is_ok_and(|url| url.has_host())
}

/// A mapping as handed to callers, with its public short URL attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortUrl {
    pub code: ShortCode,
    pub target_url: String,
    pub short_url: String,
    pub created_at: u64,
    pub expires_at: u64,
}

impl ShortUrl {
    /// Attaches `<host>/<code>` to a stored mapping.
    pub fn from_mapping(mapping: UrlMapping, host: &str) -> Self {
        let short_url = mapping.code.to_url(host);
        Self {
            code: mapping.code,
            target_url: mapping.target_url,
            short_url,
            created_at: mapping.created_at,
            expires_at: mapping.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000;

    fn mapping() -> UrlMapping {
        UrlMapping {
            code: ShortCode::new_unchecked("3-2"),
            target_url: "https://example.com".to_string(),
            created_at: NOW,
            expires_at: NOW + 3600,
        }
    }

    #[test]
    fn well_formed_mapping_is_valid() {
        let m = mapping();
        assert!(m.is_valid(NOW));
        assert!(m.is_valid(NOW + 1800));
        // the expiry instant itself is still usable
        assert!(m.is_valid(NOW + 3600));
    }

    #[test]
    fn zero_expiry_is_invalid() {
        let m = UrlMapping {
            expires_at: 0,
            ..mapping()
        };
        assert!(!m.is_valid(NOW));
    }

    #[test]
    fn expired_mapping_is_invalid() {
        assert!(!mapping().is_valid(NOW + 3601));
    }

    #[test]
    fn inverted_timestamps_are_invalid() {
        let m = UrlMapping {
            created_at: NOW + 10,
            expires_at: NOW + 5,
            ..mapping()
        };
        assert!(!m.is_valid(NOW));
    }

    #[test]
    fn zero_creation_time_is_invalid() {
        let m = UrlMapping {
            created_at: 0,
            ..mapping()
        };
        assert!(!m.is_valid(NOW));
    }

    #[test]
    fn empty_code_is_invalid() {
        let m = UrlMapping {
            code: ShortCode::new_unchecked(""),
            ..mapping()
        };
        assert!(!m.is_valid(NOW));
    }

    #[test]
    fn non_absolute_target_is_invalid() {
        for target in [
            "",
            "example.com",
            "/relative/path",
            "https://",
            "mailto:someone@example.com",
            "https://example.com/a\nb",
            "https://example.com/\ttab",
            "https://example.com/\u{7f}",
        ] {
            let m = UrlMapping {
                target_url: target.to_string(),
                ..mapping()
            };
            assert!(!m.is_valid(NOW), "{target:?} should be rejected");
        }
    }

    #[test]
    fn absolute_targets_are_accepted_without_normalization() {
        for target in [
            "http://example.com",
            "https://example.com/a/b?c=d#e",
            "ftp://files.example.com/pub",
            "http://127.0.0.1:8080",
        ] {
            let m = UrlMapping {
                target_url: target.to_string(),
                ..mapping()
            };
            assert!(m.is_valid(NOW), "{target:?} should be accepted");
        }
    }

    #[test]
    fn short_url_is_derived_from_host() {
        let short = ShortUrl::from_mapping(mapping(), "http://localhost:8080/");
        assert_eq!(short.short_url, "http://localhost:8080/3-2");
        assert_eq!(short.target_url, "https://example.com");
    }

    #[test]
    fn stored_record_does_not_carry_short_url() {
        let json = serde_json::to_value(mapping()).unwrap();
        assert!(json.get("short_url").is_none());
        let back: UrlMapping = serde_json::from_value(json).unwrap();
        assert_eq!(back, mapping());
    }
}
