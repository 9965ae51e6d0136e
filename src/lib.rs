//! # Voltage Meter - Modbus Energy Meter Read Engine
//!
//! **Version:** 0.3.0
//! **License:** MIT
//!
//! Register-oriented read access to industrial energy meters over Modbus
//! RTU and TCP, for data loggers, energy management and smart grid systems.
//!
//! ## Features
//!
//! - **Register Catalogs**: per-model register tables with validation,
//!   subsetting and scale rewriting
//! - **Batched Reads**: minimal window plans per transport class
//!   (gap-tolerant for serial, contiguity-strict for TCP)
//! - **Value Codec**: decimal scaling, two's-complement integers, IEEE-754
//!   floats and null-sentinel detection
//! - **Async and Blocking**: tokio transports plus a blocking TCP mirror
//! - **Vendor Support**: ABB A/B series, MEM001, SMA, Multicube, Saia
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use voltage_meter::{models, MeterClient, MeterProfile, MeterResult, TcpTransport};
//!
//! #[tokio::main]
//! async fn main() -> MeterResult<()> {
//!     let transport = TcpTransport::new("192.168.1.50", 502, 126, MeterProfile::sma());
//!     let mut client = MeterClient::new(transport, models::sma()?, MeterProfile::sma());
//!
//!     // Read the whole register map in as few exchanges as possible
//!     let readings = client.read_all().await?;
//!     println!("active power: {:?}", readings["active_power_total"]);
//!
//!     // Or just one register
//!     let frequency = client.read_one("frequency").await?;
//!     println!("frequency: {frequency:?}");
//!     Ok(())
//! }
//! ```

// ============================================================================
// Core modules
// ============================================================================

/// Core error types and result handling
pub mod error;

/// Register descriptors and per-device catalogs
pub mod register;

/// Read-window planning (batching policies)
pub mod batcher;

/// Raw word to engineering value conversion
pub mod codec;

/// Modbus/TCP request framing
pub mod frame;

/// Vendor wire and decode profiles
pub mod profile;

/// Transport layer for TCP and RTU communication
pub mod transport;

/// High-level meter read clients
pub mod client;

/// Register tables for the supported meter families
pub mod models;

// ============================================================================
// Re-exports for convenience
// ============================================================================

// === Async runtime (users can use voltage_meter::tokio) ===
pub use tokio;

// === Core client API ===
pub use client::{MeterClient, SyncMeterClient};

// === Error handling ===
pub use error::{MeterError, MeterResult};

// === Core types ===
pub use codec::ReadResult;
pub use profile::MeterProfile;
pub use register::{Register, RegisterCatalog};

// === Transports ===
pub use transport::{
    DirectRead, MeterTransport, RtuInstrument, RtuTransport, SyncMeterTransport,
    SyncTcpTransport, TcpTransport, TimeoutPolicy,
};

// === Batching (advanced usage) ===
pub use batcher::{plan_windows, AddressWindow, BatchPolicy, WindowPlan};
pub use batcher::{DEFAULT_MAX_SPAN, LOW_RES_MAX_SPAN};

/// Modbus TCP default port
pub const DEFAULT_TCP_PORT: u16 = 502;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
