//! Typed per-route forwarding policy.
//!
//! # Responsibilities
//! - Define the RouteConfig the engine consumes
//! - Convert raw persisted records into RouteConfig, rejecting bad rows
//! - Generate route ids and normalize origin URLs at creation time
//!
//! # Design Decisions
//! - Route ids are UUIDv4 with the dashes stripped: 32 hex characters
//! - Origin URLs are normalized on the way in (IDN host to ASCII via URL
//!   parsing, trailing slash stripped), so the engine never re-normalizes

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::content::ContentGroup;
use crate::routes::store::StoreError;

/// Forwarding policy for one route, immutable per request.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteConfig {
    /// Opaque public identifier, 32 lowercase hex characters, unique.
    pub route_id: String,
    /// Absolute upstream base URL, normalized, no trailing slash.
    pub origin_base_url: Url,
    /// Set X-Forwarded-For from the caller's address.
    pub forward_client_ip: bool,
    /// Relay the caller's User-Agent.
    pub forward_user_agent: bool,
    /// Relay the caller's Referer; when false the header is omitted.
    pub forward_referrer: bool,
    /// Allowed content groups; empty means no filtering.
    pub allowed_content_groups: Vec<ContentGroup>,
}

impl RouteConfig {
    /// Create a new route with a freshly generated id.
    ///
    /// The origin URL is validated and normalized here; creation fails on
    /// anything that does not parse as an absolute http(s) URL.
    pub fn create(
        origin_url: &str,
        forward_client_ip: bool,
        forward_user_agent: bool,
        forward_referrer: bool,
        allowed_content_groups: Vec<ContentGroup>,
    ) -> Result<Self, StoreError> {
        let route_id = Uuid::new_v4().simple().to_string();
        let origin_base_url = normalize_origin(origin_url).map_err(|reason| {
            StoreError::InvalidRecord {
                route_id: route_id.clone(),
                reason,
            }
        })?;
        Ok(Self {
            route_id,
            origin_base_url,
            forward_client_ip,
            forward_user_agent,
            forward_referrer,
            allowed_content_groups,
        })
    }

    /// The base URL as a string with the trailing slash stripped.
    pub fn origin_base(&self) -> &str {
        self.origin_base_url.as_str().trim_end_matches('/')
    }
}

/// Raw persisted route row, as stored by the owning admin surface.
///
/// Mirrors the persisted shape one to one; conversion into [`RouteConfig`]
/// is where typing and validation happen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRecord {
    pub route_id: String,
    pub url: String,
    #[serde(default)]
    pub client_ip: bool,
    #[serde(default)]
    pub user_agent: bool,
    #[serde(default = "default_referrer")]
    pub referrer: bool,
    /// Allowed group names; `None` or empty means no filtering.
    #[serde(default)]
    pub mimetypes: Option<Vec<String>>,
}

fn default_referrer() -> bool {
    true
}

impl RouteRecord {
    /// Build a record from a validated config, for persistence.
    pub fn from_config(config: &RouteConfig) -> Self {
        Self {
            route_id: config.route_id.clone(),
            url: config.origin_base().to_string(),
            client_ip: config.forward_client_ip,
            user_agent: config.forward_user_agent,
            referrer: config.forward_referrer,
            mimetypes: if config.allowed_content_groups.is_empty() {
                None
            } else {
                Some(
                    config
                        .allowed_content_groups
                        .iter()
                        .map(|g| g.as_str().to_string())
                        .collect(),
                )
            },
        }
    }
}

impl TryFrom<RouteRecord> for RouteConfig {
    type Error = StoreError;

    fn try_from(record: RouteRecord) -> Result<Self, Self::Error> {
        let origin_base_url =
            normalize_origin(&record.url).map_err(|reason| StoreError::InvalidRecord {
                route_id: record.route_id.clone(),
                reason,
            })?;

        let mut allowed_content_groups = Vec::new();
        for name in record.mimetypes.unwrap_or_default() {
            match ContentGroup::from_name(&name) {
                Some(group) => allowed_content_groups.push(group),
                None => {
                    return Err(StoreError::InvalidRecord {
                        route_id: record.route_id,
                        reason: format!("unknown content group '{name}'"),
                    })
                }
            }
        }

        Ok(Self {
            route_id: record.route_id,
            origin_base_url,
            forward_client_ip: record.client_ip,
            forward_user_agent: record.user_agent,
            forward_referrer: record.referrer,
            allowed_content_groups,
        })
    }
}

/// Parse and normalize an origin URL.
///
/// `Url::parse` converts IDN hosts to their ASCII (punycode) form; the
/// trailing slash is stripped so path joining stays uniform.
fn normalize_origin(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| format!("invalid origin URL: {e}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported origin scheme '{}'", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("origin URL has no host".to_string());
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_generates_32_hex_id() {
        let route = RouteConfig::create("http://origin.example/api/", false, false, true, vec![])
            .unwrap();
        assert_eq!(route.route_id.len(), 32);
        assert!(route.route_id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_create_rejects_invalid_url() {
        assert!(RouteConfig::create("not a url", false, false, true, vec![]).is_err());
        assert!(RouteConfig::create("ftp://origin.example/", false, false, true, vec![]).is_err());
    }

    #[test]
    fn test_origin_base_strips_trailing_slash() {
        let route =
            RouteConfig::create("http://origin.example/api/", false, false, true, vec![]).unwrap();
        assert_eq!(route.origin_base(), "http://origin.example/api");
    }

    #[test]
    fn test_idn_host_normalized_to_ascii() {
        let route =
            RouteConfig::create("http://bücher.example/", false, false, true, vec![]).unwrap();
        assert_eq!(
            route.origin_base_url.host_str(),
            Some("xn--bcher-kva.example")
        );
    }

    #[test]
    fn test_record_round_trip() {
        let record = RouteRecord {
            route_id: "0123456789abcdef0123456789abcdef".into(),
            url: "http://origin.example/api".into(),
            client_ip: true,
            user_agent: true,
            referrer: false,
            mimetypes: Some(vec!["json".into(), "xml".into()]),
        };
        let config = RouteConfig::try_from(record.clone()).unwrap();
        assert_eq!(
            config.allowed_content_groups,
            vec![ContentGroup::Json, ContentGroup::Xml]
        );
        assert!(!config.forward_referrer);

        let back = RouteRecord::from_config(&config);
        assert_eq!(back.route_id, record.route_id);
        assert_eq!(back.mimetypes, record.mimetypes);
    }

    #[test]
    fn test_unknown_group_rejected_at_boundary() {
        let record = RouteRecord {
            route_id: "0123456789abcdef0123456789abcdef".into(),
            url: "http://origin.example".into(),
            client_ip: false,
            user_agent: false,
            referrer: true,
            mimetypes: Some(vec!["binary".into()]),
        };
        assert!(RouteConfig::try_from(record).is_err());
    }
}
