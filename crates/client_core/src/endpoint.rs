//! Derives the validation service base URL once, up front.

use std::{fmt, sync::Arc};

use url::Url;

use crate::{config::ClientSettings, error::ConfigError};

pub const LOCAL_HOST: &str = "localhost";
const VALIDATE_PATH: &str = "validate";

/// `scheme://host:port` of the validation service. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    base: Arc<str>,
    validate_url: Url,
}

impl ServiceEndpoint {
    /// Builds an endpoint from an already assembled base URL such as
    /// `http://127.0.0.1:8000`. Paths, queries and fragments are rejected.
    pub fn from_base_url(base: &str) -> Result<Self, ConfigError> {
        let base = base.trim().trim_end_matches('/');
        let parsed = Url::parse(base).map_err(|source| ConfigError::InvalidUrl {
            url: base.to_string(),
            source,
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(parsed.scheme().to_string()));
        }
        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(ConfigError::MissingHost);
        }
        if parsed.path() != "/" || parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(ConfigError::UnexpectedPath(base.to_string()));
        }

        let validate_url = parsed
            .join(VALIDATE_PATH)
            .map_err(|source| ConfigError::InvalidUrl {
                url: base.to_string(),
                source,
            })?;

        Ok(Self {
            base: Arc::from(base),
            validate_url,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.base
    }

    pub fn validate_url(&self) -> &Url {
        &self.validate_url
    }
}

impl fmt::Display for ServiceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)
    }
}

#[derive(Debug, Clone)]
pub struct EndpointResolver {
    scheme: String,
    host: Option<String>,
    port: u16,
}

impl EndpointResolver {
    pub fn new(scheme: impl Into<String>, host: Option<String>, port: u16) -> Self {
        Self {
            scheme: scheme.into(),
            host,
            port,
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self::new(settings.scheme.clone(), settings.host.clone(), settings.port)
    }

    pub fn resolve(&self) -> Result<ServiceEndpoint, ConfigError> {
        let scheme = self.scheme.trim().to_ascii_lowercase();
        if !matches!(scheme.as_str(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(self.scheme.clone()));
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        let host = match self.host.as_deref().map(str::trim) {
            Some("") => return Err(ConfigError::MissingHost),
            Some(host) => host,
            None => LOCAL_HOST,
        };
        // Bare IPv6 literals need brackets before a port can follow.
        let host = if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]")
        } else {
            host.to_string()
        };

        ServiceEndpoint::from_base_url(&format!("{scheme}://{host}:{}", self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_configured_host_and_port() {
        let endpoint = EndpointResolver::new("http", Some("validator.local".into()), 8000)
            .resolve()
            .expect("resolve");
        assert_eq!(endpoint.as_str(), "http://validator.local:8000");
        assert_eq!(
            endpoint.validate_url().as_str(),
            "http://validator.local:8000/validate"
        );
    }

    #[test]
    fn falls_back_to_local_host() {
        let endpoint = EndpointResolver::from_settings(&ClientSettings::default())
            .resolve()
            .expect("resolve");
        assert_eq!(endpoint.to_string(), "http://localhost:8000");
    }

    #[test]
    fn brackets_ipv6_hosts() {
        let endpoint = EndpointResolver::new("http", Some("::1".into()), 8000)
            .resolve()
            .expect("resolve");
        assert_eq!(endpoint.validate_url().as_str(), "http://[::1]:8000/validate");
    }

    #[test]
    fn resolving_twice_yields_equal_endpoints() {
        let resolver = EndpointResolver::new("https", Some("example.org".into()), 9443);
        assert_eq!(resolver.resolve().unwrap(), resolver.resolve().unwrap());
    }

    #[test]
    fn rejects_bad_configuration() {
        assert!(matches!(
            EndpointResolver::new("http", Some("  ".into()), 8000).resolve(),
            Err(ConfigError::MissingHost)
        ));
        assert!(matches!(
            EndpointResolver::new("ftp", None, 8000).resolve(),
            Err(ConfigError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            EndpointResolver::new("http", None, 0).resolve(),
            Err(ConfigError::InvalidPort)
        ));
        assert!(matches!(
            EndpointResolver::new("http", Some("bad host".into()), 8000).resolve(),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn base_url_must_not_carry_a_path() {
        assert!(matches!(
            ServiceEndpoint::from_base_url("http://127.0.0.1:8000/api"),
            Err(ConfigError::UnexpectedPath(_))
        ));
        let endpoint = ServiceEndpoint::from_base_url("http://127.0.0.1:8000/").expect("trailing slash");
        assert_eq!(endpoint.as_str(), "http://127.0.0.1:8000");
    }
}
