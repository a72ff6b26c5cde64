//! Single-instance guard for the Pomodoro timer.
//!
//! Exclusively binds a fixed loopback TCP port for the lifetime of the
//! process. A second process fails to bind and must abort startup. No data
//! is ever exchanged on the socket.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, TcpListener};

// ============================================================================
// Constants
// ============================================================================

/// Default lock port
pub const DEFAULT_LOCK_PORT: u16 = 12345;

// ============================================================================
// InstanceError
// ============================================================================

/// Instance guard error types.
#[derive(Debug, thiserror::Error)]
pub enum InstanceError {
    /// The lock address is already bound by another process
    #[error("Another instance is already running (lock {addr} is held)")]
    AlreadyRunning {
        /// Address that could not be bound
        addr: SocketAddr,
        /// Underlying bind failure
        #[source]
        source: io::Error,
    },
}

// ============================================================================
// InstanceGuard
// ============================================================================

/// Holds the instance lock while acquired and releases it on drop.
#[derive(Debug)]
pub struct InstanceGuard {
    /// Address to bind
    addr: SocketAddr,
    /// Bound listener while the lock is held
    listener: Option<TcpListener>,
}

impl InstanceGuard {
    /// Creates an unacquired guard for the given address.
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            listener: None,
        }
    }

    /// Creates an unacquired guard for a loopback port.
    pub fn localhost(port: u16) -> Self {
        Self::new(SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, port)))
    }

    /// Binds the lock address.
    ///
    /// Calling this on a guard that already holds the lock is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceError::AlreadyRunning`] if the address is bound
    /// elsewhere. There is no retry.
    pub fn acquire(&mut self) -> Result<(), InstanceError> {
        if self.listener.is_some() {
            return Ok(());
        }

        let listener = TcpListener::bind(self.addr).map_err(|source| {
            tracing::debug!(addr = %self.addr, error = %source, "instance lock bind failed");
            InstanceError::AlreadyRunning {
                addr: self.addr,
                source,
            }
        })?;

        tracing::debug!(addr = ?listener.local_addr().ok(), "instance lock acquired");
        self.listener = Some(listener);
        Ok(())
    }

    /// Releases the lock. Releasing an unheld guard does nothing.
    pub fn release(&mut self) {
        if let Some(listener) = self.listener.take() {
            tracing::debug!(addr = ?listener.local_addr().ok(), "instance lock released");
            drop(listener);
        }
    }

    /// Returns true while the lock is held.
    pub fn is_held(&self) -> bool {
        self.listener.is_some()
    }

    /// Returns the bound address while held.
    ///
    /// Differs from the configured address when port 0 was requested.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener
            .as_ref()
            .and_then(|listener| listener.local_addr().ok())
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        self.release();
    }
}

// ============================================================================
// Tests
// ============================================================================
