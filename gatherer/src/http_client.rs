//! # HTTP Client
//!
//! Outbound requests go through the [`HttpClient`] trait so the gatherer can be
//! exercised without a network. [`ReqwestHttpClient`] is the production
//! adapter: it builds its `reqwest::Client` (TLS material, timeouts, pooling)
//! on first use and shares it between all concurrent gather tasks afterwards.

use crate::GatherError;
use reqwest::{
    Certificate,
    Identity,
    Request,
    StatusCode,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    future::Future,
    path::{
        Path,
        PathBuf,
    },
    pin::Pin,
    time::Duration,
};
use tokio::sync::{
    OnceCell,
    SetError,
};

/// Status and fully read body of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Executes HTTP requests on behalf of a collector.
pub trait HttpClient: Send + Sync {
    fn execute(&self, request: Request) -> Pin<Box<dyn Future<Output = Result<HttpResponse, GatherError>> + Send + '_>>;

    /// Set up whatever the client needs before the first request of a cycle.
    fn prepare(&self) -> Pin<Box<dyn Future<Output = Result<(), GatherError>> + Send + '_>> {
        Box::pin(async { Ok(()) })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsOptions {
    /// PEM file with an additional trusted CA.
    #[serde(default)]
    pub ssl_ca: Option<PathBuf>,
    /// PEM client certificate, only used together with `ssl_key`.
    #[serde(default)]
    pub ssl_cert: Option<PathBuf>,
    /// PEM (PKCS#8) private key of `ssl_cert`.
    #[serde(default)]
    pub ssl_key: Option<PathBuf>,
    /// Use TLS but skip chain and host verification.
    #[serde(default)]
    pub insecure_skip_verify: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    /// Upper bound for establishing the connection before the response starts.
    pub response_header: Duration,
    /// Upper bound for the whole request including reading the body.
    pub request: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            response_header: Duration::from_secs(3),
            request: Duration::from_secs(4),
        }
    }
}

pub struct ReqwestHttpClient {
    tls: TlsOptions,
    timeouts: HttpTimeouts,
    transport: OnceCell<reqwest::Client>,
}

impl ReqwestHttpClient {
    pub fn new(tls: TlsOptions, timeouts: HttpTimeouts) -> Self {
        Self {
            tls,
            timeouts,
            transport: OnceCell::new(),
        }
    }

    /// Use an already configured transport instead of building one from TLS options.
    pub fn with_transport(client: reqwest::Client) -> Self {
        Self {
            tls: TlsOptions::default(),
            timeouts: HttpTimeouts::default(),
            transport: OnceCell::new_with(Some(client)),
        }
    }

    /// The configured transport, built on the first call.
    pub async fn transport(&self) -> Result<&reqwest::Client, GatherError> {
        self.transport
            .get_or_try_init(|| async { build_transport(&self.tls, self.timeouts) })
            .await
    }

    /// Install `client` as the transport. Hands it back if a transport is already in place.
    pub fn set_transport(&self, client: reqwest::Client) -> Result<(), reqwest::Client> {
        self.transport.set(client).map_err(|err| match err {
            SetError::AlreadyInitializedError(client) | SetError::InitializingError(client) => client,
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.transport.initialized()
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute(&self, request: Request) -> Pin<Box<dyn Future<Output = Result<HttpResponse, GatherError>> + Send + '_>> {
        Box::pin(async move {
            let client = self.transport().await?;
            let response = client.execute(request).await?;
            let status = response.status();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }

    fn prepare(&self) -> Pin<Box<dyn Future<Output = Result<(), GatherError>> + Send + '_>> {
        Box::pin(async move { self.transport().await.map(|_| ()) })
    }
}

fn build_transport(tls: &TlsOptions, timeouts: HttpTimeouts) -> Result<reqwest::Client, GatherError> {
    debug!(
        ?tls,
        connect_timeout = ?timeouts.response_header,
        timeout = ?timeouts.request,
        "http: building transport"
    );
    let mut builder = reqwest::Client::builder()
        .connect_timeout(timeouts.response_header)
        .timeout(timeouts.request);

    if let Some(ca) = &tls.ssl_ca {
        let pem = read_pem(ca)?;
        let certificate = Certificate::from_pem(&pem)
            .map_err(|err| GatherError::TransportSetup(format!("invalid CA file {}: {err}", ca.display())))?;
        builder = builder.add_root_certificate(certificate);
    }

    if let (Some(cert), Some(key)) = (&tls.ssl_cert, &tls.ssl_key) {
        let identity = Identity::from_pkcs8_pem(&read_pem(cert)?, &read_pem(key)?).map_err(|err| {
            GatherError::TransportSetup(format!(
                "invalid client certificate {} / key {}: {err}",
                cert.display(),
                key.display()
            ))
        })?;
        builder = builder.identity(identity);
    }

    if tls.insecure_skip_verify {
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder
        .build()
        .map_err(|err| GatherError::TransportSetup(err.to_string()))
}

fn read_pem(path: &Path) -> Result<Vec<u8>, GatherError> {
    std::fs::read(path).map_err(|err| GatherError::TransportSetup(format!("failed to read {}: {err}", path.display())))
}
