//! Request signing
//!
//! Every request is authenticated with `x-message: <host>:<yyyyMMddHHmmss>`
//! and `x-signature: hex(HMAC-SHA512(password, message))`. The timestamp is
//! UTC with one-second resolution; freshness is checked by the server.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use std::sync::Arc;

use crate::credential::CredentialStore;
use crate::error::{CoreError, CoreResult};
use crate::time::{utc_timestamp, Clock, SystemClock};

type HmacSha512 = Hmac<Sha512>;

pub const MESSAGE_HEADER: &str = "x-message";
pub const SIGNATURE_HEADER: &str = "x-signature";

/// Authentication material for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedRequest {
    pub target_url: String,
    /// UTC, 14 digits
    pub timestamp_utc: String,
    /// `<domain>:<timestamp_utc>`
    pub message: String,
    /// Lowercase hex, 128 characters
    pub signature: String,
}

impl SignedRequest {
    /// Header pairs to attach to the request
    pub fn headers(&self) -> [(&'static str, &str); 2] {
        [
            (MESSAGE_HEADER, self.message.as_str()),
            (SIGNATURE_HEADER, self.signature.as_str()),
        ]
    }

    /// Short signature prefix safe to log
    pub fn signature_preview(&self) -> &str {
        &self.signature[..self.signature.len().min(10)]
    }
}

/// Host component of a URL, or the raw input when it does not parse
pub fn extract_domain(target_url: &str) -> String {
    match url::Url::parse(target_url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => host.to_string(),
            None => target_url.to_string(),
        },
        Err(e) => {
            log::warn!(target: "ledgerlink::signer", "Invalid URL {:?} ({}), signing raw string", target_url, e);
            target_url.to_string()
        }
    }
}

/// `<domain>:<timestamp>`
pub fn signing_message(target_url: &str, timestamp_utc: &str) -> String {
    format!("{}:{}", extract_domain(target_url), timestamp_utc)
}

/// Lowercase hex HMAC-SHA512 of `message` keyed with `secret`
pub fn hmac_signature(message: &str, secret: &str) -> CoreResult<String> {
    let mut mac = HmacSha512::new_from_slice(secret.as_bytes())
        .map_err(|e| CoreError::InternalError { message: format!("HMAC key rejected: {}", e) })?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Signs requests with the session password
#[derive(Clone)]
pub struct RequestSigner {
    store: Arc<CredentialStore>,
    clock: Arc<dyn Clock>,
}

impl RequestSigner {
    pub fn new(store: Arc<CredentialStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<CredentialStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Produce the signed message for `target_url`
    ///
    /// The password is read once; the signature is computed from that
    /// snapshot even if the session changes concurrently.
    pub fn sign(&self, target_url: &str) -> CoreResult<SignedRequest> {
        let password = self.store.password().ok_or(CoreError::AuthRequired)?;

        let timestamp_utc = utc_timestamp(self.clock.now());
        let message = signing_message(target_url, &timestamp_utc);
        let signature = hmac_signature(&message, &password)?;

        let signed = SignedRequest {
            target_url: target_url.to_string(),
            timestamp_utc,
            message,
            signature,
        };
        log::debug!(
            target: "ledgerlink::signer",
            "Signed {} as {} ({}...)",
            signed.target_url,
            signed.message,
            signed.signature_preview()
        );
        Ok(signed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FixedClock;

    fn signer(password: Option<&str>, clock: FixedClock) -> RequestSigner {
        let store = Arc::new(CredentialStore::in_memory());
        if let Some(password) = password {
            store.set_session(password).unwrap();
        }
        RequestSigner::with_clock(store, Arc::new(clock))
    }

    #[test]
    fn test_extract_domain() {
        assert_eq!(extract_domain("https://api.example.com/v1/filter?x=1"), "api.example.com");
        assert_eq!(extract_domain("http://localhost:8080/upload"), "localhost");
        assert_eq!(extract_domain("not a url"), "not a url");
        assert_eq!(extract_domain("/relative/path"), "/relative/path");
    }

    #[test]
    fn test_hmac_known_vector() {
        // RFC 4231 test case 2
        let signature = hmac_signature("what do ya want for nothing?", "Jefe").unwrap();
        assert_eq!(
            signature,
            "164b7a7bfcf819e2e395fbe73b56e0a387bd64222e831fd610270cd7ea2505549758bf75c05a994a6d034f65f8f0e6fdcaeab1a34d4a6b4b636e070a38bce737"
        );
    }

    #[test]
    fn test_sign_requires_password() {
        let signer = signer(None, FixedClock::at(2024, 1, 5, 12, 0, 0).unwrap());
        assert!(matches!(signer.sign("https://api.example.com/x"), Err(CoreError::AuthRequired)));
    }

    #[test]
    fn test_sign_message_and_signature_shape() {
        let signer = signer(Some("pw"), FixedClock::at(2024, 1, 5, 12, 3, 4).unwrap());
        let signed = signer.sign("https://api.example.com/entries").unwrap();
        assert_eq!(signed.timestamp_utc, "20240105120304");
        assert_eq!(signed.message, "api.example.com:20240105120304");
        assert_eq!(signed.signature.len(), 128);
        assert!(signed.signature.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(signed.signature, hmac_signature(&signed.message, "pw").unwrap());
    }

    #[test]
    fn test_sign_is_deterministic_within_one_second() {
        let signer = signer(Some("pw"), FixedClock::at(2024, 1, 5, 12, 0, 0).unwrap());
        let a = signer.sign("https://api.example.com/a").unwrap();
        let b = signer.sign("https://api.example.com/a").unwrap();
        assert_eq!(a.message, b.message);
        assert_eq!(a.signature, b.signature);
    }

    #[test]
    fn test_password_changes_signature() {
        let clock = FixedClock::at(2024, 1, 5, 12, 0, 0).unwrap();
        let a = signer(Some("pw-one"), clock).sign("https://api.example.com/a").unwrap();
        let b = signer(Some("pw-two"), clock).sign("https://api.example.com/a").unwrap();
        assert_eq!(a.message, b.message);
        assert_ne!(a.signature, b.signature);
    }

    #[test]
    fn test_same_host_different_paths_share_message() {
        let signer = signer(Some("pw"), FixedClock::at(2024, 1, 5, 12, 0, 0).unwrap());
        let a = signer.sign("https://api.example.com/filter").unwrap();
        let b = signer.sign("https://api.example.com/upload").unwrap();
        assert_eq!(a.message, b.message);
    }

    #[test]
    fn test_headers_and_preview() {
        let signer = signer(Some("pw"), FixedClock::at(2024, 1, 5, 12, 0, 0).unwrap());
        let signed = signer.sign("https://api.example.com/a").unwrap();
        let headers = signed.headers();
        assert_eq!(headers[0], ("x-message", signed.message.as_str()));
        assert_eq!(headers[1].0, "x-signature");
        assert_eq!(signed.signature_preview().len(), 10);
    }

    #[test]
    fn test_logout_disables_signing() {
        let signer = signer(Some("pw"), FixedClock::at(2024, 1, 5, 12, 0, 0).unwrap());
        signer.store().clear_session().unwrap();
        assert!(matches!(signer.sign("https://api.example.com/a"), Err(CoreError::AuthRequired)));
    }
}
