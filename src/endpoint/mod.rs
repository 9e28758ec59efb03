// src/endpoint/mod.rs
// =============================================================================
// This module holds everything about the server endpoint itself:
//
// - normalize: clean up a raw URL the user typed (add scheme, trim slash)
// - is_valid: decide whether input is usable as a server URL at all
// - compose_links: build the per-service URLs from a base + ports
// - ServerEndpoint: the validated, normalized endpoint the rest of the
//   application works with
//
// These are all pure functions - no I/O, no state - which makes them the
// easiest part of the codebase to test.
//
// Rust concepts:
// - &str vs String: borrow for inputs, own for outputs
// - Url: the url crate does the heavy lifting for validation
// =============================================================================

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Default port of the media server (the "primary" service)
pub const DEFAULT_PRIMARY_PORT: u16 = 32400;

/// Default port of the request manager (the "secondary" service)
pub const DEFAULT_SECONDARY_PORT: u16 = 5055;

// A validated and normalized server endpoint
//
// `host` is the normalized base URL (scheme + host, no trailing slash),
// e.g. "http://myserver.duckdns.org". Once constructed it never changes;
// updating the server URL replaces the whole value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEndpoint {
    /// Normalized base URL, e.g. "http://myserver.duckdns.org"
    pub host: String,
    /// Port the media server listens on
    pub primary_port: u16,
    /// Port the request manager listens on
    pub secondary_port: u16,
}

impl ServerEndpoint {
    // Builds an endpoint from raw user input
    //
    // The raw string is validated first; only valid input produces an
    // endpoint. The stored host is the *normalized* form - callers that
    // want to remember what the user actually typed must keep the raw
    // string themselves (the config store does exactly that).
    pub fn from_raw(raw: &str, primary_port: u16, secondary_port: u16) -> Result<Self> {
        if !is_valid(raw) {
            return Err(anyhow!("Invalid server URL: '{}'", raw));
        }

        Ok(Self {
            host: normalize(raw),
            primary_port,
            secondary_port,
        })
    }

    /// The outbound links for both services on this endpoint
    pub fn links(&self) -> ServiceLinks {
        compose_links(&self.host, self.primary_port, self.secondary_port)
    }
}

// The two outbound service links composed from one endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceLinks {
    /// Media server URL, e.g. "http://myserver.duckdns.org:32400"
    #[serde(rename = "primaryUrl")]
    pub primary_url: String,
    /// Request manager URL, e.g. "http://myserver.duckdns.org:5055"
    #[serde(rename = "secondaryUrl")]
    pub secondary_url: String,
}

// Normalizes a raw server URL
//
// Two fixups, applied in order:
// 1. Prefix "http://" when the input has no scheme
// 2. Strip exactly one trailing slash if present
//
// Nothing else is touched - no lowercasing, no whitespace trimming. The
// input is the user's string; we only make it composable with ":port".
pub fn normalize(raw: &str) -> String {
    let with_scheme = ensure_scheme(raw);

    // strip_suffix removes at most one occurrence, which is exactly
    // the behavior we want ("http://host//" keeps one slash)
    match with_scheme.strip_suffix('/') {
        Some(stripped) => stripped.to_string(),
        None => with_scheme,
    }
}

// Checks whether raw input can be used as a server URL
//
// Same scheme-prefixing rule as normalize(), then we let the url crate
// decide. Anything it can parse is acceptable - http and https only,
// since the prefix check rejects everything else up front.
pub fn is_valid(raw: &str) -> bool {
    Url::parse(&ensure_scheme(raw)).is_ok()
}

// Prefixes "http://" unless the input already carries an http(s) scheme
//
// A plain starts_with check, not URL parsing: "host.example:9999" would
// parse as scheme "host.example" otherwise, which is never what a user
// typing a hostname means.
fn ensure_scheme(raw: &str) -> String {
    if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    }
}

// Composes the two service URLs from a normalized base
//
// Plain concatenation: "base:port". No path, query, or fragment - the
// services live at their port roots.
pub fn compose_links(base: &str, primary_port: u16, secondary_port: u16) -> ServiceLinks {
    ServiceLinks {
        primary_url: format!("{}:{}", base, primary_port),
        secondary_url: format!("{}:{}", base, secondary_port),
    }
}
