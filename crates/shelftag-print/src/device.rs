//! Thermal printer transport.
//!
//! A job talks to the printer through two steps: [`ThermalPrinter::acquire`]
//! hands out a [`PrinterSession`], and the session is released when the job
//! ends, whatever the outcome. The dispatcher calls `release` itself on every
//! path; dropping a session without releasing it still closes the connection.
//!
//! Supports:
//! - Network printers (raw TCP, usually port 9100)

use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info, instrument};

use crate::error::{PrintError, PrintResult};
use crate::escpos::{encode_ops, PrinterOp};

/// Default connect/write timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// A printer that can be claimed for one job.
#[allow(async_fn_in_trait)]
pub trait ThermalPrinter {
    type Session: PrinterSession;

    /// Claims the printer. Fails with a hardware error when it is absent
    /// or unreachable.
    async fn acquire(&self) -> PrintResult<Self::Session>;
}

/// An acquired printer.
#[allow(async_fn_in_trait)]
pub trait PrinterSession {
    /// Sends a run of operations.
    async fn send(&mut self, ops: &[PrinterOp]) -> PrintResult<()>;

    /// Gives the printer back.
    async fn release(self) -> PrintResult<()>;
}

/// Network printer (raw TCP)
///
/// With no address configured every acquisition fails, which sends every
/// job to the fallback path.
#[derive(Debug, Clone)]
pub struct NetworkPrinter {
    addr: Option<SocketAddr>,
    timeout: Duration,
}

impl NetworkPrinter {
    /// Create from a socket address string (e.g., "192.168.1.100:9100")
    pub fn from_addr(addr: &str) -> PrintResult<Self> {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|_| PrintError::InvalidConfig(format!("Invalid printer address: {}", addr)))?;

        Ok(Self {
            addr: Some(addr),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// A printer that is never there.
    pub fn unconfigured() -> Self {
        Self {
            addr: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set connection and write timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn addr(&self) -> Option<SocketAddr> {
        self.addr
    }
}

impl ThermalPrinter for NetworkPrinter {
    type Session = NetworkSession;

    #[instrument(skip(self), fields(addr = ?self.addr))]
    async fn acquire(&self) -> PrintResult<NetworkSession> {
        let addr = self
            .addr
            .ok_or_else(|| PrintError::Hardware("no thermal printer configured".to_string()))?;

        let stream = tokio::time::timeout(self.timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| PrintError::Timeout(format!("Connection timeout: {}", addr)))?
            .map_err(|e| PrintError::Connection(format!("{}: {}", addr, e)))?;

        info!("Connected to printer");
        Ok(NetworkSession {
            stream,
            addr,
            timeout: self.timeout,
        })
    }
}

/// An open connection to a network printer.
#[derive(Debug)]
pub struct NetworkSession {
    stream: TcpStream,
    addr: SocketAddr,
    timeout: Duration,
}

impl PrinterSession for NetworkSession {
    #[instrument(skip(self, ops), fields(addr = %self.addr, ops = ops.len()))]
    async fn send(&mut self, ops: &[PrinterOp]) -> PrintResult<()> {
        let data = encode_ops(ops)?;
        debug!(bytes = data.len(), "Sending to printer");

        let (addr, timeout) = (self.addr, self.timeout);
        let stream = &mut self.stream;
        let write = async move {
            stream.write_all(&data).await?;
            stream.flush().await
        };
        tokio::time::timeout(timeout, write)
            .await
            .map_err(|_| PrintError::Timeout(format!("Write timeout: {}", addr)))?
            .map_err(|e| PrintError::Hardware(format!("Write failed on {}: {}", addr, e)))?;

        Ok(())
    }

    async fn release(mut self) -> PrintResult<()> {
        self.stream.shutdown().await?;
        debug!(addr = %self.addr, "Printer released");
        Ok(())
    }
}
