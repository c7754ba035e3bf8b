//! TLS connections that use the fallback evaluator
//!
//! Installs a [`FallbackTrustEvaluator`] as the rustls server certificate
//! verifier and opens client connections over tokio with it.

use std::sync::Arc;
use std::time::Duration;

use rustls::pki_types::ServerName;
use rustls::ClientConfig;
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;

use crate::error::ConnectError;
use crate::trust::FallbackTrustEvaluator;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client configuration with `evaluator` deciding server trust.
///
/// # Errors
///
/// Returns an error if the evaluator's crypto provider supports none of the
/// default protocol versions.
pub fn client_config(evaluator: Arc<FallbackTrustEvaluator>) -> Result<ClientConfig, rustls::Error> {
    let provider = Arc::clone(evaluator.provider());
    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .dangerous()
        .with_custom_certificate_verifier(evaluator)
        .with_no_client_auth();
    Ok(config)
}

/// Opens TLS client connections trusted through a [`FallbackTrustEvaluator`].
#[derive(Clone)]
pub struct TrustedConnector {
    connector: TlsConnector,
    connect_timeout: Duration,
}

impl TrustedConnector {
    /// # Errors
    ///
    /// See [`client_config`].
    pub fn new(evaluator: Arc<FallbackTrustEvaluator>) -> Result<Self, ConnectError> {
        let config = client_config(evaluator)?;
        Ok(Self {
            connector: TlsConnector::from(Arc::new(config)),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        })
    }

    /// Bound the TCP connect; the handshake itself is not bounded here.
    #[must_use]
    pub fn with_connect_timeout(self, connect_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            ..self
        }
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Connect to `host:port` and complete a TLS handshake for `host`.
    ///
    /// # Errors
    ///
    /// `InvalidServerName` for a host that is neither a DNS name nor an IP
    /// address, `Timeout`/`Io` for TCP failures and `Handshake` when the
    /// handshake fails, including when the server chain is not trusted.
    pub async fn connect(&self, host: &str, port: u16) -> Result<TlsStream<TcpStream>, ConnectError> {
        let server_name = ServerName::try_from(host.to_string())
            .map_err(|_| ConnectError::InvalidServerName(host.to_string()))?;

        tracing::debug!("Opening TLS connection to {}:{}", host, port);
        let tcp_stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| ConnectError::Timeout {
                host: host.to_string(),
                port,
            })??;

        let tls_stream = self
            .connector
            .connect(server_name, tcp_stream)
            .await
            .map_err(|source| ConnectError::Handshake {
                host: host.to_string(),
                source,
            })?;

        tracing::info!("TLS connection established to {}:{}", host, port);
        Ok(tls_stream)
    }
}

impl std::fmt::Debug for TrustedConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustedConnector")
            .field("connect_timeout", &self.connect_timeout)
            .finish_non_exhaustive()
    }
}
