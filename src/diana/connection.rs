//! A single authenticated connection to a DianaDB server.

use std::time::Duration;

use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::trace;

use super::config::DianaConfig;
use super::error::{Error, Result};
use super::protocol::{read_message, write_message, Request, Response};

pub struct Connection {
    stream: TcpStream,
    address: String,
    /// Set when a frame failed mid-read or mid-write; the stream can no
    /// longer be trusted to sit on a message boundary.
    broken: bool,
}

impl Connection {
    /// Connect and authenticate, both bounded by `timeout`.
    pub async fn open(config: &DianaConfig, timeout: Duration) -> Result<Self> {
        tokio::time::timeout(timeout, Self::establish(config))
            .await
            .map_err(|_| Error::Timeout(timeout))?
    }

    async fn establish(config: &DianaConfig) -> Result<Self> {
        let address = config.address();
        let stream = TcpStream::connect(&address)
            .await
            .map_err(|e| Error::Connection(format!("{address}: {e}")))?;
        stream.set_nodelay(true)?;

        let mut connection = Self {
            stream,
            address,
            broken: false,
        };
        connection
            .request(&Request::Auth {
                user: config.user.clone(),
                password: config.password.clone(),
            })
            .await?;
        trace!(address = %connection.address, "connection authenticated");
        Ok(connection)
    }

    /// Send one request and wait for its response.
    pub async fn request(&mut self, request: &Request) -> Result<Value> {
        let result = self.exchange(request).await;
        if let Err(Error::Io(_) | Error::Protocol(_)) = &result {
            self.broken = true;
        }
        result?.into_result()
    }

    async fn exchange(&mut self, request: &Request) -> Result<Response> {
        write_message(&mut self.stream, request).await?;
        read_message(&mut self.stream).await
    }

    pub fn is_broken(&self) -> bool {
        self.broken
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub async fn close(mut self) -> Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }
}
