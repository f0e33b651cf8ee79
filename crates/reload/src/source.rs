// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Where nonce readings come from.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

use crate::error::FetchError;
use crate::nonce::Nonce;

/// Default endpoint path, relative to the watched base URL.
pub const DEFAULT_NONCE_PATH: &str = "/api/nonce";

/// Produces one nonce reading per call.
///
/// Implementations must be cheap to share: the watcher clones an `Arc` of
/// the source into every in-flight fetch.
pub trait NonceSource: Send + Sync + 'static {
    fn fetch(&self) -> Pin<Box<dyn Future<Output = Result<Nonce, FetchError>> + Send + '_>>;
}

/// Optional request settings for [`HttpNonceSource`].
#[derive(Debug, Clone, Default)]
pub struct HttpOptions {
    /// Per-request timeout. `None` leaves requests unbounded.
    pub timeout: Option<Duration>,
    /// HTTP basic auth credentials.
    pub basic_auth: Option<(String, Option<String>)>,
}

/// Reads the nonce with a plain `GET` against an HTTP endpoint.
pub struct HttpNonceSource {
    url: String,
    basic_auth: Option<(String, Option<String>)>,
    client: Client,
}

impl HttpNonceSource {
    pub fn new(base_url: &str, path: &str, options: HttpOptions) -> anyhow::Result<Self> {
        check_base_url(base_url)?;

        // reqwest is built without a bundled crypto provider; https needs one.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let mut builder = Client::builder();
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        let url = format!("{}{}", base_url.trim_end_matches('/'), path);
        Ok(Self { url, basic_auth: options.basic_auth, client })
    }

    /// Fully resolved endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn get(&self) -> Result<Nonce, FetchError> {
        let mut req = self.client.get(&self.url);
        if let Some((username, password)) = &self.basic_auth {
            req = req.basic_auth(username, password.as_ref());
        }

        let resp = req.send().await.map_err(FetchError::from_reqwest)?;
        let status = resp.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        let bytes = resp.bytes().await.map_err(FetchError::from_reqwest)?;
        let text = String::from_utf8(bytes.to_vec())
            .map_err(|e| FetchError::Body(format!("nonce is not utf-8: {e}")))?;
        Ok(Nonce::from(text))
    }
}

/// Reject base URLs that could never produce a reading.
pub fn check_base_url(base_url: &str) -> anyhow::Result<()> {
    let parsed =
        Url::parse(base_url).map_err(|e| anyhow::anyhow!("invalid url {base_url:?}: {e}"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("url must use http or https: {base_url}");
    }
    match parsed.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => anyhow::bail!("url has no host: {base_url}"),
    }
    Ok(())
}

impl NonceSource for HttpNonceSource {
    fn fetch(&self) -> Pin<Box<dyn Future<Output = Result<Nonce, FetchError>> + Send + '_>> {
        Box::pin(self.get())
    }
}
