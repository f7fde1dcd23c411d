//! Identity resolution.
//!
//! The pipeline only needs an opaque per-user key to namespace storage.
//! Verification of the upstream session token is the gateway's job; here a
//! bearer token (or an explicit `X-User-Id` header) is taken as the opaque
//! uid, and everything else falls back to the shared anonymous scope.

use axum::http::HeaderMap;

/// Scope shared by all unauthenticated/demo traffic.
pub const ANONYMOUS: &str = "anonymous";

/// Opaque key under which an identity's tips and folders are stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        if id.trim().is_empty() {
            Identity::anonymous()
        } else {
            Identity(id)
        }
    }

    pub fn anonymous() -> Self {
        Identity(ANONYMOUS.to_string())
    }

    pub fn is_anonymous(&self) -> bool {
        self.0 == ANONYMOUS
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Resolves the request identity: `X-User-Id` header first, then a bearer
/// token taken as an opaque uid, else the anonymous scope.
pub fn resolve(headers: &HeaderMap) -> Identity {
    if let Some(uid) = headers.get("x-user-id").and_then(|v| v.to_str().ok()) {
        if !uid.trim().is_empty() {
            return Identity::new(uid.trim());
        }
    }

    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        if let Some(token) = auth.strip_prefix("Bearer ") {
            if !token.trim().is_empty() {
                return Identity::new(token.trim());
            }
        }
    }

    Identity::anonymous()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_resolve_prefers_user_id_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("user-42"));
        headers.insert("authorization", HeaderValue::from_static("Bearer tok"));
        assert_eq!(resolve(&headers).as_str(), "user-42");
    }

    #[test]
    fn test_resolve_bearer_token_as_opaque_uid() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc123"));
        assert_eq!(resolve(&headers).as_str(), "abc123");
    }

    #[test]
    fn test_resolve_falls_back_to_anonymous() {
        let headers = HeaderMap::new();
        let identity = resolve(&headers);
        assert!(identity.is_anonymous());
        assert_eq!(identity.as_str(), ANONYMOUS);
    }

    #[test]
    fn test_blank_header_is_anonymous() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("   "));
        assert!(resolve(&headers).is_anonymous());
    }
}
