//! Telnet client for connecting to the Reverse Beacon Network.
//!
//! This module handles the TCP connection to the RBN telnet server: the
//! login exchange and the line-by-line read of the spot stream. There is no
//! reconnect; a closed stream ends the feed.

use anyhow::{Context, Result, bail};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info};

/// Default RBN telnet server for CW/RTTY spots.
pub const RBN_HOST: &str = "telnet.reversebeacon.net";

/// Default port for CW/RTTY spots.
pub const RBN_PORT_CW: u16 = 7000;

/// Default connection timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 5;

/// Prompt the server sends before expecting the callsign.
pub const LOGIN_PROMPT: &str = "Please enter your call:";

/// Configuration for the RBN client.
#[derive(Debug, Clone)]
pub struct RbnClientConfig {
    /// Hostname of the RBN server.
    pub host: String,

    /// Port number.
    pub port: u16,

    /// Callsign to use for login.
    pub callsign: String,

    /// Connection timeout.
    pub connect_timeout: Duration,
}

impl Default for RbnClientConfig {
    fn default() -> Self {
        Self {
            host: RBN_HOST.to_string(),
            port: RBN_PORT_CW,
            callsign: "N0CALL".to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT),
        }
    }
}

impl RbnClientConfig {
    /// Create a new configuration with the given callsign.
    pub fn with_callsign(callsign: impl Into<String>) -> Self {
        Self {
            callsign: callsign.into(),
            ..Default::default()
        }
    }

    /// Set the host and port.
    pub fn with_server(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }
}

/// RBN telnet client.
pub struct RbnClient {
    config: RbnClientConfig,
}

impl RbnClient {
    /// Create a new RBN client with the given configuration.
    pub fn new(config: RbnClientConfig) -> Self {
        Self { config }
    }

    /// Connect to the server and log in.
    pub async fn connect(&self) -> Result<SpotFeed<TcpStream>> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        info!("Connecting to {}...", addr);

        let stream = timeout(self.config.connect_timeout, TcpStream::connect(&addr))
            .await
            .context("Connection timeout")?
            .with_context(|| format!("Failed to connect to {}", addr))?;

        info!("Connected to {}", addr);

        login(stream, &self.config.callsign).await
    }
}

/// Wait for the login prompt on `stream`, then send the callsign.
pub async fn login<S>(stream: S, callsign: &str) -> Result<SpotFeed<S>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut stream = BufReader::new(stream);
    let mut pending = Vec::with_capacity(256);

    // The prompt has no trailing newline; it always ends in ':'.
    loop {
        let n = stream
            .read_until(b':', &mut pending)
            .await
            .context("Read error while waiting for login prompt")?;
        if n == 0 {
            bail!("Connection closed before login prompt");
        }
        if pending.ends_with(LOGIN_PROMPT.as_bytes()) {
            break;
        }
        if let Some(pos) = pending.iter().rposition(|&b| b == b'\n') {
            debug!(
                "Banner: {}",
                String::from_utf8_lossy(&pending[..pos]).trim_end()
            );
            pending.drain(..=pos);
        }
    }

    info!("Sending callsign: {}", callsign);
    stream
        .write_all(format!("{}\n", callsign).as_bytes())
        .await
        .context("Failed to send callsign")?;
    stream.flush().await?;

    Ok(SpotFeed {
        stream,
        buf: Vec::with_capacity(256),
    })
}

/// The line stream after login.
pub struct SpotFeed<S> {
    stream: BufReader<S>,
    buf: Vec<u8>,
}

impl<S: AsyncRead + Unpin> SpotFeed<S> {
    /// Read the next line, trimmed. `None` once the peer closes the stream.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        self.buf.clear();
        let n = self
            .stream
            .read_until(b'\n', &mut self.buf)
            .await
            .context("Read error")?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&self.buf).trim().to_string()))
    }
}
