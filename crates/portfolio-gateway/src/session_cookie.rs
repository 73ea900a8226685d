//! Signed session cookie: `portfolio_session=<uuid>.<hex hmac-sha256(secret, uuid)>`.
//!
//! The cookie only carries the session id; the conversation itself stays server-side.
//! Missing, malformed, or tampered cookies resolve to a fresh session.

use axum::http::{header, HeaderMap, HeaderValue};
use hmac::{Hmac, Mac};
use portfolio_core::SessionId;
use sha2::Sha256;
use std::time::Duration;

type HmacSha256 = Hmac<Sha256>;

pub const COOKIE_NAME: &str = "portfolio_session";

#[derive(Clone)]
pub struct CookieSigner {
    mac: HmacSha256,
    max_age: Duration,
}

impl CookieSigner {
    pub fn new(secret: &str, max_age: Duration) -> Result<Self, hmac::digest::InvalidLength> {
        let mac = HmacSha256::new_from_slice(secret.as_bytes())?;
        Ok(Self { mac, max_age })
    }

    fn signature(&self, id: &SessionId) -> String {
        let mut mac = self.mac.clone();
        mac.update(id.as_str().as_bytes());
        to_hex(&mac.finalize().into_bytes())
    }

    pub fn encode(&self, id: &SessionId) -> String {
        format!("{}.{}", id, self.signature(id))
    }

    pub fn decode(&self, value: &str) -> Option<SessionId> {
        let (raw_id, sig) = value.split_once('.')?;
        let id = SessionId::parse(raw_id)?;
        let expected = self.signature(&id);
        constant_time_eq(expected.as_bytes(), sig.as_bytes()).then_some(id)
    }

    /// Verified session id from the request's `Cookie` headers, if any.
    pub fn from_headers(&self, headers: &HeaderMap) -> Option<SessionId> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .filter(|(name, _)| *name == COOKIE_NAME)
            .find_map(|(_, value)| self.decode(value))
    }

    /// Existing session from headers, or a new one. `true` when freshly issued.
    pub fn resolve(&self, headers: &HeaderMap) -> (SessionId, bool) {
        match self.from_headers(headers) {
            Some(id) => (id, false),
            None => (SessionId::generate(), true),
        }
    }

    pub fn set_cookie(&self, id: &SessionId) -> HeaderValue {
        let cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            COOKIE_NAME,
            self.encode(id),
            self.max_age.as_secs()
        );
        // uuid + hex digits + fixed ASCII attributes only.
        HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
    }
}

fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer(secret: &str) -> CookieSigner {
        CookieSigner::new(secret, Duration::from_secs(7200)).unwrap()
    }

    fn headers_with(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn encoded_cookie_decodes_to_same_id() {
        let s = signer("secret");
        let id = SessionId::generate();
        assert_eq!(s.decode(&s.encode(&id)), Some(id));
    }

    #[test]
    fn tampered_or_foreign_cookie_is_rejected() {
        let s = signer("secret");
        let id = SessionId::generate();
        let encoded = s.encode(&id);

        let other_id = SessionId::generate();
        let (_, sig) = encoded.split_once('.').unwrap();
        assert_eq!(s.decode(&format!("{}.{}", other_id, sig)), None);
        assert_eq!(signer("other-secret").decode(&encoded), None);
        assert_eq!(s.decode(id.as_str()), None);
        assert_eq!(s.decode("garbage.deadbeef"), None);
    }

    #[test]
    fn finds_session_among_other_cookies() {
        let s = signer("secret");
        let id = SessionId::generate();
        let cookie = format!("theme=dark; {}={}; lang=en", COOKIE_NAME, s.encode(&id));
        let headers = headers_with(&cookie);
        assert_eq!(s.from_headers(&headers), Some(id));
    }

    #[test]
    fn resolve_issues_fresh_session_when_missing() {
        let s = signer("secret");
        let (first, fresh) = s.resolve(&HeaderMap::new());
        assert!(fresh);
        let headers = headers_with(&format!("{}={}", COOKIE_NAME, s.encode(&first)));
        let (again, fresh) = s.resolve(&headers);
        assert!(!fresh);
        assert_eq!(again, first);
    }

    #[test]
    fn set_cookie_has_session_attributes() {
        let s = signer("secret");
        let value = s.set_cookie(&SessionId::generate());
        let text = value.to_str().unwrap();
        assert!(text.starts_with("portfolio_session="));
        assert!(text.contains("HttpOnly"));
        assert!(text.contains("SameSite=Lax"));
        assert!(text.contains("Max-Age=7200"));
    }
}
