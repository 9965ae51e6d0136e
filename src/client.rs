//! # Meter Client
//!
//! High-level read facade tying catalog, batcher, transport and codec
//! together. One client owns one transport (one device connection) and one
//! catalog; reads are strictly sequential on that connection.
//!
//! Three entry points, all returning name → value maps:
//!
//! - [`MeterClient::read_all`] — every register in the catalog
//! - [`MeterClient::read_many`] — a named subset (unknown names are logged
//!   and skipped, not errors)
//! - [`MeterClient::read_one`] — a single register (unknown name *is* an
//!   error here; a `None` value still means a null-sentinel reading)
//!
//! [`SyncMeterClient`] is the blocking mirror for contexts without a tokio
//! runtime.

use tracing::{debug, warn};

use crate::batcher::{plan_windows, AddressWindow};
use crate::codec::{decode_registers, decode_window, ReadResult};
use crate::error::{MeterError, MeterResult};
use crate::profile::MeterProfile;
use crate::register::{Register, RegisterCatalog};
use crate::transport::{DirectRead, MeterTransport, SyncMeterTransport};

/// Async meter read client.
pub struct MeterClient<T: MeterTransport> {
    transport: T,
    catalog: RegisterCatalog,
    profile: MeterProfile,
}

impl<T: MeterTransport> MeterClient<T> {
    /// Assemble a client from its three parts.
    pub fn new(transport: T, catalog: RegisterCatalog, profile: MeterProfile) -> Self {
        Self {
            transport,
            catalog,
            profile,
        }
    }

    /// The device's register catalog.
    pub fn catalog(&self) -> &RegisterCatalog {
        &self.catalog
    }

    /// Mutable catalog access (scale rewriting, see
    /// [`multicube_autoscale`](crate::models::multicube_autoscale)).
    pub fn catalog_mut(&mut self) -> &mut RegisterCatalog {
        &mut self.catalog
    }

    /// The vendor profile in effect.
    pub fn profile(&self) -> &MeterProfile {
        &self.profile
    }

    /// Mutable transport access.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Read every register in the catalog.
    pub async fn read_all(&mut self) -> MeterResult<ReadResult> {
        let registers = self.catalog.sorted_by_start();
        self.read_planned(registers).await
    }

    /// Read the named registers.
    ///
    /// Names not present in the catalog are reported via `warn!` and omitted
    /// from the result. An empty resolved set performs no device I/O.
    pub async fn read_many(&mut self, names: &[&str]) -> MeterResult<ReadResult> {
        let (registers, missing) = self.catalog.select(names);
        for name in &missing {
            warn!(register = %name, "register not in catalog, skipping");
        }
        if registers.is_empty() {
            return Ok(ReadResult::new());
        }
        self.read_planned(registers).await
    }

    /// Read one register by name.
    ///
    /// Prefers the transport's single-register fast path; falls back to a
    /// one-register window read. Returns `Ok(None)` for a null-sentinel
    /// reading and [`MeterError::RegisterNotFound`] for an unknown name.
    pub async fn read_one(&mut self, name: &str) -> MeterResult<Option<f64>> {
        let register = *self
            .catalog
            .find(name)
            .ok_or_else(|| MeterError::register_not_found(name))?;

        let value = match self
            .transport
            .direct_read(&register, self.profile.nulls)
            .await?
        {
            DirectRead::Value(value) => value,
            DirectRead::Unsupported => {
                let window = AddressWindow::for_register(&register);
                let words = self.transport.read_window(&window).await?;
                decode_registers(&words, &register, self.profile.nulls)?
            }
        };

        Ok(apply_correction(&register, value))
    }

    async fn read_planned(&mut self, registers: Vec<Register>) -> MeterResult<ReadResult> {
        let plans = plan_windows(&registers, self.transport.batch_policy());
        debug!(
            registers = registers.len(),
            windows = plans.len(),
            "executing read plan"
        );

        let mut results = ReadResult::with_capacity(registers.len());
        for plan in &plans {
            let words = self.transport.read_window(&plan.window).await?;
            results.extend(decode_window(
                &words,
                &plan.registers,
                plan.window.first,
                self.profile.nulls,
            )?);
        }
        Ok(results)
    }
}

/// Blocking meter read client.
pub struct SyncMeterClient<T: SyncMeterTransport> {
    transport: T,
    catalog: RegisterCatalog,
    profile: MeterProfile,
}

impl<T: SyncMeterTransport> SyncMeterClient<T> {
    /// Assemble a client from its three parts.
    pub fn new(transport: T, catalog: RegisterCatalog, profile: MeterProfile) -> Self {
        Self {
            transport,
            catalog,
            profile,
        }
    }

    /// The device's register catalog.
    pub fn catalog(&self) -> &RegisterCatalog {
        &self.catalog
    }

    /// Mutable catalog access.
    pub fn catalog_mut(&mut self) -> &mut RegisterCatalog {
        &mut self.catalog
    }

    /// Read every register in the catalog.
    pub fn read_all(&mut self) -> MeterResult<ReadResult> {
        let registers = self.catalog.sorted_by_start();
        self.read_planned(registers)
    }

    /// Read the named registers (unknown names logged and skipped).
    pub fn read_many(&mut self, names: &[&str]) -> MeterResult<ReadResult> {
        let (registers, missing) = self.catalog.select(names);
        for name in &missing {
            warn!(register = %name, "register not in catalog, skipping");
        }
        if registers.is_empty() {
            return Ok(ReadResult::new());
        }
        self.read_planned(registers)
    }

    /// Read one register by name via a one-register window.
    pub fn read_one(&mut self, name: &str) -> MeterResult<Option<f64>> {
        let register = *self
            .catalog
            .find(name)
            .ok_or_else(|| MeterError::register_not_found(name))?;

        let window = AddressWindow::for_register(&register);
        let words = self.transport.read_window(&window)?;
        let value = decode_registers(&words, &register, self.profile.nulls)?;
        Ok(apply_correction(&register, value))
    }

    fn read_planned(&mut self, registers: Vec<Register>) -> MeterResult<ReadResult> {
        let plans = plan_windows(&registers, self.transport.batch_policy());
        debug!(
            registers = registers.len(),
            windows = plans.len(),
            "executing read plan (blocking)"
        );

        let mut results = ReadResult::with_capacity(registers.len());
        for plan in &plans {
            let words = self.transport.read_window(&plan.window)?;
            results.extend(decode_window(
                &words,
                &plan.registers,
                plan.window.first,
                self.profile.nulls,
            )?);
        }
        Ok(results)
    }
}

/// Run a register's correction, sentinel readings excepted.
fn apply_correction(register: &Register, value: Option<f64>) -> Option<f64> {
    match (value, register.correction) {
        (Some(v), Some(fix)) => Some(fix(v)),
        _ => value,
    }
}

// ============================================================================
// Tests
// ============================================================================
