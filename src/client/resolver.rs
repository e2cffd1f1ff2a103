//! Client routing configuration.
//!
//! Decides once, at front-end start-up, whether API calls go straight to the
//! backend or through the forwarding shim, and hands back an immutable
//! [`ResolvedConfig`] that every caller shares.
//!
//! The decision is a pure function of three inputs: the page protocol, the
//! scheme of the backend base URL, and whether a proxy URL is configured.
//! A secure page talking to an insecure backend is the mixed-content case; it
//! is routed through the proxy when one exists and only diagnosed otherwise.
//! Schemes are never upgraded, and WebSocket URLs are never proxied.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Compile-time default for the backend HTTP base URL.
pub const DEFAULT_API_BASE_URL: &str = match option_env!("API_BASE_URL") {
    Some(url) => url,
    None => "http://localhost:8000/",
};

/// Compile-time default for the backend WebSocket base URL.
pub const DEFAULT_WS_BASE_URL: &str = match option_env!("WS_BASE_URL") {
    Some(url) => url,
    None => "ws://localhost:8000/",
};

/// Backend base URLs the front-end starts from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientDefaults {
    pub api_base_url: String,
    pub ws_base_url: String,
}

impl Default for ClientDefaults {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            ws_base_url: DEFAULT_WS_BASE_URL.to_string(),
        }
    }
}

impl ClientDefaults {
    /// Compile-time defaults overridden by `API_BASE_URL` / `WS_BASE_URL`
    /// (or their `VERCEL_ENV_` prefixed forms) when set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |keys: [&str; 2]| {
            keys.into_iter()
                .find_map(|key| lookup(key).filter(|v| !v.trim().is_empty()))
        };
        let defaults = Self::default();

        Self {
            api_base_url: pick(["API_BASE_URL", "VERCEL_ENV_API_BASE_URL"])
                .unwrap_or(defaults.api_base_url),
            ws_base_url: pick(["WS_BASE_URL", "VERCEL_ENV_WS_BASE_URL"])
                .unwrap_or(defaults.ws_base_url),
        }
    }
}

/// Protocol of the page hosting the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageProtocol {
    Http,
    Https,
}

impl PageProtocol {
    pub fn is_secure(self) -> bool {
        self == PageProtocol::Https
    }
}

impl FromStr for PageProtocol {
    type Err = String;

    /// Accepts `https`, `https:` or a whole page URL such as `https://site/app`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let scheme = s.split(':').next().unwrap_or_default().trim();
        match scheme.to_ascii_lowercase().as_str() {
            "http" => Ok(PageProtocol::Http),
            "https" => Ok(PageProtocol::Https),
            _ => Err(format!("unsupported page protocol '{}'", s)),
        }
    }
}

impl fmt::Display for PageProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageProtocol::Http => write!(f, "http:"),
            PageProtocol::Https => write!(f, "https:"),
        }
    }
}

/// Where API calls are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingMode {
    Direct,
    Proxied,
}

/// Non-fatal findings reported while resolving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Secure page, insecure API, no proxy: the browser will block API calls.
    MixedContent { api_base_url: String },
    /// Secure page with a `ws://` WebSocket base: the browser may block it.
    InsecureWebSocket { ws_base_url: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MixedContent { api_base_url } => write!(
                f,
                "HTTPS page cannot reach HTTP API {}; configure a proxy URL",
                api_base_url
            ),
            Diagnostic::InsecureWebSocket { ws_base_url } => write!(
                f,
                "HTTPS page connecting to {} may be blocked; prefer wss://",
                ws_base_url
            ),
        }
    }
}

/// Outcome of [`resolve`]; immutable for the lifetime of the front-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    /// Base used for API calls: the proxy URL without trailing `/` when proxied.
    pub api_base_url: String,
    pub ws_base_url: String,
    pub proxy_url: Option<String>,
    pub mode: RoutingMode,
    pub protocol: PageProtocol,
    pub diagnostics: Vec<Diagnostic>,
}

/// The routing decision on its own.
pub fn routing_mode(protocol: PageProtocol, api_base_url: &str, has_proxy: bool) -> RoutingMode {
    if mixed_content_risk(protocol, api_base_url) && has_proxy {
        RoutingMode::Proxied
    } else {
        RoutingMode::Direct
    }
}

fn mixed_content_risk(protocol: PageProtocol, api_base_url: &str) -> bool {
    protocol.is_secure() && has_scheme(api_base_url, "http://")
}

fn has_scheme(url: &str, scheme: &str) -> bool {
    url.get(..scheme.len())
        .map(|prefix| prefix.eq_ignore_ascii_case(scheme))
        .unwrap_or(false)
}

/// Decide the routing mode and build the shared configuration.
///
/// An empty `proxy_url` counts as absent. Diagnostics are logged as warnings
/// and kept on the result.
pub fn resolve(
    defaults: &ClientDefaults,
    protocol: PageProtocol,
    proxy_url: Option<&str>,
) -> ResolvedConfig {
    let proxy_url = proxy_url
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string);

    let mode = routing_mode(protocol, &defaults.api_base_url, proxy_url.is_some());
    let mut diagnostics = Vec::new();

    let api_base_url = match (mode, proxy_url.as_deref()) {
        (RoutingMode::Proxied, Some(proxy)) => {
            proxy.strip_suffix('/').unwrap_or(proxy).to_string()
        }
        _ => {
            if mixed_content_risk(protocol, &defaults.api_base_url) {
                diagnostics.push(Diagnostic::MixedContent {
                    api_base_url: defaults.api_base_url.clone(),
                });
            }
            defaults.api_base_url.clone()
        }
    };

    if protocol.is_secure() && has_scheme(&defaults.ws_base_url, "ws://") {
        diagnostics.push(Diagnostic::InsecureWebSocket {
            ws_base_url: defaults.ws_base_url.clone(),
        });
    }

    for diagnostic in &diagnostics {
        tracing::warn!(%diagnostic, "Client configuration warning");
    }

    tracing::info!(
        api_base = %api_base_url,
        ws_base = %defaults.ws_base_url,
        protocol = %protocol,
        mode = ?mode,
        "Client configuration resolved"
    );

    ResolvedConfig {
        api_base_url,
        ws_base_url: defaults.ws_base_url.clone(),
        proxy_url,
        mode,
        protocol,
        diagnostics,
    }
}

impl ResolvedConfig {
    /// URL for a backend-relative API path under the resolved routing mode.
    pub fn build_api_url(&self, path: &str) -> String {
        let path = path.strip_prefix('/').unwrap_or(path);
        match self.mode {
            RoutingMode::Proxied => {
                let sep = if self.api_base_url.contains('?') { '&' } else { '?' };
                format!("{}{}path={}", self.api_base_url, sep, encode_component(path))
            }
            RoutingMode::Direct => join(&self.api_base_url, path),
        }
    }

    /// WebSocket URL for a backend-relative path. Always direct.
    pub fn ws_url(&self, path: &str) -> String {
        join(&self.ws_base_url, path.strip_prefix('/').unwrap_or(path))
    }

    pub fn is_proxied(&self) -> bool {
        self.mode == RoutingMode::Proxied
    }
}

/// Percent-encode a query value the way browsers' `encodeURIComponent` does:
/// `!'()*` stay literal, everything else outside the unreserved set is escaped.
fn encode_component(value: &str) -> String {
    urlencoding::encode(value)
        .replace("%21", "!")
        .replace("%27", "'")
        .replace("%28", "(")
        .replace("%29", ")")
        .replace("%2A", "*")
}

fn join(base: &str, path: &str) -> String {
    if base.ends_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}
