//! Authenticated transport
//!
//! Signs each outgoing request for its target URL. When there is no session
//! the request still goes out, unsigned, and the server decides.

use ledgerlink_config::ApiConfig;
use ledgerlink_core::{CoreError, RequestSigner, SignedRequest, MESSAGE_HEADER, SIGNATURE_HEADER};
use ledgerlink_utils::cache_buster;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::Form;
use reqwest::Response;
use serde::Serialize;
use std::time::Duration;

use crate::error::{ApiError, ApiResult};

/// Query parameter carrying the cache-busting nonce on signed links
pub const NOCACHE_PARAM: &str = "_nocache";

/// HTTP client that attaches request signatures
#[derive(Clone)]
pub struct Transport {
    client: reqwest::Client,
    signer: RequestSigner,
}

impl Transport {
    pub fn new(config: &ApiConfig, signer: RequestSigner) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, signer })
    }

    pub fn signer(&self) -> &RequestSigner {
        &self.signer
    }

    /// Signature for `url`, or `None` when the request must go out unsigned
    fn try_sign(&self, url: &str) -> Option<SignedRequest> {
        match self.signer.sign(url) {
            Ok(signed) => Some(signed),
            Err(CoreError::AuthRequired) => {
                log::warn!(target: "ledgerlink::transport", "No session, sending {} without authentication", url);
                None
            }
            Err(e) => {
                log::error!(target: "ledgerlink::transport", "Signing {} failed: {}", url, e);
                None
            }
        }
    }

    /// `x-message`/`x-signature` headers for `url`; empty when unsigned
    pub fn auth_headers(&self, url: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let Some(signed) = self.try_sign(url) else {
            return headers;
        };

        for (name, value) in signed.headers() {
            match HeaderValue::from_str(value) {
                Ok(value) => {
                    headers.insert(HeaderName::from_static(name), value);
                }
                Err(e) => {
                    log::error!(target: "ledgerlink::transport", "Unusable {} header value: {}", name, e);
                    return HeaderMap::new();
                }
            }
        }
        headers
    }

    /// POST a JSON body; non-2xx responses are errors
    pub async fn post_json<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> ApiResult<Response> {
        log::debug!(target: "ledgerlink::transport", "POST {}", url);
        let response = self
            .client
            .post(url)
            .headers(self.auth_headers(url))
            .json(body)
            .send()
            .await?;
        check_status(url, response)
    }

    /// POST a multipart form; the caller inspects the status
    pub async fn post_multipart(&self, url: &str, form: Form) -> ApiResult<Response> {
        log::debug!(target: "ledgerlink::transport", "POST multipart {}", url);
        let response = self
            .client
            .post(url)
            .headers(self.auth_headers(url))
            .multipart(form)
            .send()
            .await?;
        Ok(response)
    }

    /// `url` with the signature and a cache-busting nonce as query parameters
    ///
    /// Returned unchanged when there is no session to sign with.
    pub fn sign_for_link(&self, url: &str) -> String {
        match self.try_sign(url) {
            Some(signed) => signed_link(url, &signed, &cache_buster()),
            None => url.to_string(),
        }
    }
}

fn check_status(url: &str, response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        log::warn!(target: "ledgerlink::transport", "{} answered {}", url, status);
        Err(ApiError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}

fn signed_link(url: &str, signed: &SignedRequest, nonce: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!(
        "{}{}{}={}&{}={}&{}={}",
        url,
        separator,
        MESSAGE_HEADER,
        urlencoding::encode(&signed.message),
        SIGNATURE_HEADER,
        urlencoding::encode(&signed.signature),
        NOCACHE_PARAM,
        nonce
    )
}
