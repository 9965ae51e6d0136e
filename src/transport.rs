//! # Transport Layer
//!
//! One physical request/response exchange per address window, behind two
//! traits:
//!
//! - [`MeterTransport`] — async (tokio) transports: [`TcpTransport`] and the
//!   serial [`RtuTransport`] delegate adapter. Suspension happens only at the
//!   socket write and read-exact boundaries; there is no pipelining, and a
//!   connection is owned exclusively by its client.
//! - [`SyncMeterTransport`] — blocking transports: [`SyncTcpTransport`],
//!   which polls the socket in a bounded sleep loop.
//!
//! Each transport also declares the [`BatchPolicy`] its device class needs:
//! serial links batch gap-tolerantly, TCP meters split on non-contiguous
//! addresses.
//!
//! Connections are established lazily on first use and reused for the life
//! of the transport. There is no reconnect-on-broken-socket logic; a failed
//! exchange surfaces to the caller, who decides whether to rebuild the
//! client.

use std::future::Future;
use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, warn};

use crate::batcher::{AddressWindow, BatchPolicy, DEFAULT_MAX_SPAN};
use crate::codec::decode_registers;
use crate::error::{MeterError, MeterResult};
use crate::frame::{response_words, ReadRequest};
use crate::profile::MeterProfile;
use crate::register::Register;

/// Poll interval of the blocking TCP receive loop.
pub const SYNC_POLL_INTERVAL_MS: u64 = 50;

/// Maximum polls before the blocking TCP receive loop gives up.
pub const SYNC_MAX_ATTEMPTS: u32 = 10;

/// Outcome of a transport's single-register fast path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DirectRead {
    /// No fast path; the caller should issue a one-register window read.
    Unsupported,
    /// Reading obtained directly from the delegate (`None` = null sentinel).
    Value(Option<f64>),
}

/// What to do when the blocking receive loop exhausts its attempt cap.
///
/// `Degrade` preserves the historical behavior of these meters' tooling: the
/// exchange silently yields a zero-filled buffer, so callers cannot tell
/// "meter reports zero" from "link never answered". `FailFast` surfaces
/// [`MeterError::Timeout`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeoutPolicy {
    /// Synthesize a zero-filled window on timeout (historical default).
    #[default]
    Degrade,
    /// Return [`MeterError::Timeout`] on timeout.
    FailFast,
}

/// Async transport: one window exchange per call.
pub trait MeterTransport: Send {
    /// Window-forming policy for this device class.
    fn batch_policy(&self) -> BatchPolicy;

    /// Execute one read exchange and return the raw register words.
    fn read_window(
        &mut self,
        window: &AddressWindow,
    ) -> impl Future<Output = MeterResult<Vec<u16>>> + Send;

    /// Optional single-register fast path (used by RTU typed helpers).
    fn direct_read(
        &mut self,
        register: &Register,
        nulls: &'static [i128],
    ) -> impl Future<Output = MeterResult<DirectRead>> + Send {
        let _ = (register, nulls);
        async { Ok(DirectRead::Unsupported) }
    }
}

/// Blocking transport: one window exchange per call.
pub trait SyncMeterTransport {
    /// Window-forming policy for this device class.
    fn batch_policy(&self) -> BatchPolicy;

    /// Execute one read exchange and return the raw register words.
    fn read_window(&mut self, window: &AddressWindow) -> MeterResult<Vec<u16>>;
}

// ============================================================================
// Async TCP transport
// ============================================================================

/// Async Modbus/TCP transport (tokio).
///
/// Connects lazily on the first exchange and keeps the connection for
/// subsequent windows. Reads suspend until exactly the expected byte count
/// has arrived; cancelling the future aborts the whole read and leaves the
/// connection state undefined.
pub struct TcpTransport {
    host: String,
    port: u16,
    unit_id: u8,
    profile: MeterProfile,
    stream: Option<tokio::net::TcpStream>,
}

impl TcpTransport {
    /// Create a transport for `host:port` addressing device `unit_id`.
    pub fn new<S: Into<String>>(host: S, port: u16, unit_id: u8, profile: MeterProfile) -> Self {
        Self {
            host: host.into(),
            port,
            unit_id,
            profile,
            stream: None,
        }
    }

    /// True once the lazy connection has been established.
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn ensure_connected(&mut self) -> MeterResult<&mut tokio::net::TcpStream> {
        if self.stream.is_none() {
            let stream = tokio::net::TcpStream::connect((self.host.as_str(), self.port))
                .await
                .map_err(|e| {
                    MeterError::connection(format!(
                        "connect to {}:{} failed: {}",
                        self.host, self.port, e
                    ))
                })?;
            debug!(host = %self.host, port = self.port, "tcp connected");
            self.stream = Some(stream);
        }
        match self.stream.as_mut() {
            Some(stream) => Ok(stream),
            None => Err(MeterError::connection("connection unavailable")),
        }
    }
}

impl MeterTransport for TcpTransport {
    fn batch_policy(&self) -> BatchPolicy {
        BatchPolicy::Contiguous
    }

    async fn read_window(&mut self, window: &AddressWindow) -> MeterResult<Vec<u16>> {
        let request = ReadRequest::for_window(window, &self.profile, self.unit_id)?;
        let expected = request.expected_response_len();
        let frame = request.to_bytes();

        let stream = self.ensure_connected().await?;
        stream.write_all(&frame).await?;

        let mut raw = vec![0u8; expected];
        stream.read_exact(&mut raw).await?;

        debug!(
            first = window.first,
            count = window.count,
            transaction_id = request.transaction_id,
            "tcp window read"
        );
        response_words(&raw, window.count)
    }
}

// ============================================================================
// Blocking TCP transport
// ============================================================================

/// Blocking Modbus/TCP transport (std::net).
///
/// The receive side polls in a bounded loop: sleep
/// [`SYNC_POLL_INTERVAL_MS`], append whatever bytes are available, stop once
/// the full response is in or [`SYNC_MAX_ATTEMPTS`] polls have elapsed
/// (≈500 ms worst case). The attempt-cap behavior is set by
/// [`TimeoutPolicy`].
pub struct SyncTcpTransport {
    host: String,
    port: u16,
    unit_id: u8,
    profile: MeterProfile,
    timeout_policy: TimeoutPolicy,
    stream: Option<std::net::TcpStream>,
}

impl SyncTcpTransport {
    /// Create a transport for `host:port` addressing device `unit_id`.
    pub fn new<S: Into<String>>(host: S, port: u16, unit_id: u8, profile: MeterProfile) -> Self {
        Self {
            host: host.into(),
            port,
            unit_id,
            profile,
            timeout_policy: TimeoutPolicy::default(),
            stream: None,
        }
    }

    /// Choose how attempt-cap exhaustion is reported.
    pub fn with_timeout_policy(mut self, policy: TimeoutPolicy) -> Self {
        self.timeout_policy = policy;
        self
    }

    /// True once the lazy connection has been established.
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn ensure_connected(&mut self) -> MeterResult<&mut std::net::TcpStream> {
        if self.stream.is_none() {
            let stream = std::net::TcpStream::connect((self.host.as_str(), self.port))
                .map_err(|e| {
                    MeterError::connection(format!(
                        "connect to {}:{} failed: {}",
                        self.host, self.port, e
                    ))
                })?;
            // Non-blocking so the poll loop can drain partial responses.
            stream.set_nonblocking(true)?;
            debug!(host = %self.host, port = self.port, "tcp connected (blocking client)");
            self.stream = Some(stream);
        }
        match self.stream.as_mut() {
            Some(stream) => Ok(stream),
            None => Err(MeterError::connection("connection unavailable")),
        }
    }
}

impl SyncMeterTransport for SyncTcpTransport {
    fn batch_policy(&self) -> BatchPolicy {
        BatchPolicy::Contiguous
    }

    fn read_window(&mut self, window: &AddressWindow) -> MeterResult<Vec<u16>> {
        let request = ReadRequest::for_window(window, &self.profile, self.unit_id)?;
        let expected = request.expected_response_len();
        let frame = request.to_bytes();
        let timeout_policy = self.timeout_policy;

        let stream = self.ensure_connected()?;
        stream.write_all(&frame)?;

        let mut data: Vec<u8> = Vec::with_capacity(expected);
        let mut buf = [0u8; 2048];

        for _ in 0..SYNC_MAX_ATTEMPTS {
            std::thread::sleep(Duration::from_millis(SYNC_POLL_INTERVAL_MS));
            match stream.read(&mut buf) {
                Ok(0) => {}
                Ok(n) => data.extend_from_slice(&buf[..n]),
                Err(e) if e.kind() == ErrorKind::WouldBlock => {}
                Err(e) => return Err(e.into()),
            }
            if data.len() >= expected {
                debug!(
                    first = window.first,
                    count = window.count,
                    "tcp window read (blocking)"
                );
                return response_words(&data, window.count);
            }
        }

        match timeout_policy {
            TimeoutPolicy::Degrade => {
                warn!(
                    first = window.first,
                    count = window.count,
                    received = data.len(),
                    expected,
                    "response incomplete after attempt cap, degrading to zero-filled window"
                );
                Ok(vec![0u16; usize::from(window.count)])
            }
            TimeoutPolicy::FailFast => Err(MeterError::Timeout {
                attempts: SYNC_MAX_ATTEMPTS,
                expected,
                received: data.len(),
            }),
        }
    }
}

// ============================================================================
// RTU delegate adapter
// ============================================================================

/// Contract of the external serial-Modbus instrument driver.
///
/// The driver owns the physical serial parameters (port, baud rate, parity,
/// timeout) and the RTU CRC/framing; none of that is visible here. Typed
/// helpers cover the 1- and 2-word cases with decimal scaling applied by the
/// driver; wider values go through the raw `read_registers` path and this
/// crate's codec.
pub trait RtuInstrument: Send {
    /// Read one register as a scaled value.
    fn read_register(
        &mut self,
        address: u16,
        decimals: i32,
        signed: bool,
    ) -> impl Future<Output = MeterResult<f64>> + Send;

    /// Read two registers as a 32-bit integer (unscaled).
    fn read_long(
        &mut self,
        address: u16,
        signed: bool,
    ) -> impl Future<Output = MeterResult<i64>> + Send;

    /// Read `quantity` registers as an IEEE-754 float.
    fn read_float(
        &mut self,
        address: u16,
        quantity: u16,
    ) -> impl Future<Output = MeterResult<f64>> + Send;

    /// Read `quantity` raw registers.
    fn read_registers(
        &mut self,
        address: u16,
        quantity: u16,
    ) -> impl Future<Output = MeterResult<Vec<u16>>> + Send;
}

/// Adapter exposing an [`RtuInstrument`] as a [`MeterTransport`].
///
/// Window reads use the raw register path; single-register reads prefer the
/// driver's typed helpers where they apply. Serial links batch
/// gap-tolerantly, capped at `max_span` registers per exchange.
pub struct RtuTransport<I> {
    instrument: I,
    max_span: u16,
}

impl<I: RtuInstrument> RtuTransport<I> {
    /// Wrap a driver instance with the standard 125-register window cap.
    pub fn new(instrument: I) -> Self {
        Self {
            instrument,
            max_span: DEFAULT_MAX_SPAN,
        }
    }

    /// Override the window cap (10 for low-resolution device maps).
    pub fn with_max_span(mut self, max_span: u16) -> Self {
        self.max_span = max_span;
        self
    }

    /// Access the wrapped driver.
    pub fn instrument(&self) -> &I {
        &self.instrument
    }
}

impl<I: RtuInstrument> MeterTransport for RtuTransport<I> {
    fn batch_policy(&self) -> BatchPolicy {
        BatchPolicy::GapTolerant {
            max_span: self.max_span,
        }
    }

    async fn read_window(&mut self, window: &AddressWindow) -> MeterResult<Vec<u16>> {
        debug!(first = window.first, count = window.count, "rtu window read");
        self.instrument
            .read_registers(window.first, window.count)
            .await
    }

    async fn direct_read(
        &mut self,
        register: &Register,
        nulls: &'static [i128],
    ) -> MeterResult<DirectRead> {
        match (register.word_length, register.is_float) {
            (1, _) => {
                let value = self
                    .instrument
                    .read_register(register.start, register.decimals, register.signed)
                    .await?;
                Ok(DirectRead::Value(Some(value)))
            }
            (2, true) => {
                let value = self.instrument.read_float(register.start, 2).await?;
                Ok(DirectRead::Value(Some(value)))
            }
            (2, false) => {
                let raw = self
                    .instrument
                    .read_long(register.start, register.signed)
                    .await?;
                Ok(DirectRead::Value(Some(
                    raw as f64 / 10f64.powi(register.decimals),
                )))
            }
            _ => {
                // The driver's typed helpers stop at 2 words; run the
                // generic decode over a raw read.
                let words = self
                    .instrument
                    .read_registers(register.start, u16::from(register.word_length))
                    .await?;
                decode_registers(&words, register, nulls).map(DirectRead::Value)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{encode_raw, SERIAL_NULLS};
    use crate::register::reg;
    use std::net::TcpListener;

    /// Serve one request on a std listener: read the 12-byte frame, then
    /// reply with a 9-byte header and the given register words.
    fn serve_once(listener: TcpListener, words: Vec<u16>) -> std::thread::JoinHandle<()> {
        std::thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut frame = [0u8; 12];
            socket.read_exact(&mut frame).unwrap();

            let mut response = Vec::new();
            response.extend_from_slice(&frame[..4]); // echo transaction + protocol
            response.extend_from_slice(&(1 + 1 + 1 + words.len() as u16 * 2).to_be_bytes());
            response.push(frame[6]); // unit id
            response.push(frame[7]); // function code
            response.push((words.len() * 2) as u8);
            for w in &words {
                response.extend_from_slice(&w.to_be_bytes());
            }
            socket.write_all(&response).unwrap();
        })
    }

    #[test]
    fn test_sync_tcp_exchange() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = serve_once(listener, vec![0x1234, 0x5678, 9]);

        let mut transport = SyncTcpTransport::new("127.0.0.1", port, 1, MeterProfile::tcp());
        let window = AddressWindow { first: 100, count: 3 };
        let words = transport.read_window(&window).unwrap();
        assert_eq!(words, [0x1234, 0x5678, 9]);
        assert!(transport.is_connected());
        server.join().unwrap();
    }

    #[test]
    fn test_sync_tcp_degrades_to_zero_fill() {
        // Server accepts but never answers; the poll loop must give up and
        // synthesize zeros.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = std::thread::spawn(move || {
            let (socket, _) = listener.accept().unwrap();
            std::thread::sleep(Duration::from_millis(700));
            drop(socket);
        });

        let mut transport = SyncTcpTransport::new("127.0.0.1", port, 1, MeterProfile::tcp());
        let window = AddressWindow { first: 0, count: 4 };
        let words = transport.read_window(&window).unwrap();
        assert_eq!(words, [0, 0, 0, 0]);
        server.join().unwrap();
    }

    #[test]
    fn test_sync_tcp_fail_fast() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = std::thread::spawn(move || {
            let (socket, _) = listener.accept().unwrap();
            std::thread::sleep(Duration::from_millis(700));
            drop(socket);
        });

        let mut transport = SyncTcpTransport::new("127.0.0.1", port, 1, MeterProfile::tcp())
            .with_timeout_policy(TimeoutPolicy::FailFast);
        let window = AddressWindow { first: 0, count: 2 };
        let err = transport.read_window(&window).unwrap_err();
        assert!(matches!(err, MeterError::Timeout { .. }));
        server.join().unwrap();
    }

    #[tokio::test]
    async fn test_async_tcp_exchange() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut frame = [0u8; 12];
            socket.read_exact(&mut frame).await.unwrap();
            assert_eq!(frame[7], 3); // function code
            assert_eq!(u16::from_be_bytes([frame[10], frame[11]]), 2);

            let mut response = vec![0u8; 9];
            response.extend_from_slice(&[0x00, 0x64, 0x00, 0xC8]);
            socket.write_all(&response).await.unwrap();
        });

        let mut transport = TcpTransport::new("127.0.0.1", port, 126, MeterProfile::tcp());
        let window = AddressWindow { first: 10, count: 2 };
        let words = transport.read_window(&window).await.unwrap();
        assert_eq!(words, [100, 200]);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_async_tcp_connection_reused() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            // One accept: both exchanges must arrive on the same socket.
            let (mut socket, _) = listener.accept().await.unwrap();
            for _ in 0..2 {
                let mut frame = [0u8; 12];
                socket.read_exact(&mut frame).await.unwrap();
                let mut response = vec![0u8; 9];
                response.extend_from_slice(&[0x00, 0x2A]);
                socket.write_all(&response).await.unwrap();
            }
        });

        let mut transport = TcpTransport::new("127.0.0.1", port, 1, MeterProfile::tcp());
        let window = AddressWindow { first: 0, count: 1 };
        assert_eq!(transport.read_window(&window).await.unwrap(), [42]);
        assert_eq!(transport.read_window(&window).await.unwrap(), [42]);
        server.await.unwrap();
    }

    // ------------------------------------------------------------------
    // RTU adapter
    // ------------------------------------------------------------------

    #[derive(Default)]
    struct FakeInstrument {
        raw_calls: Vec<(u16, u16)>,
        typed_calls: Vec<&'static str>,
    }

    impl RtuInstrument for FakeInstrument {
        async fn read_register(
            &mut self,
            _address: u16,
            decimals: i32,
            _signed: bool,
        ) -> MeterResult<f64> {
            self.typed_calls.push("register");
            Ok(5001.0 / 10f64.powi(decimals))
        }

        async fn read_long(&mut self, _address: u16, _signed: bool) -> MeterResult<i64> {
            self.typed_calls.push("long");
            Ok(-12345)
        }

        async fn read_float(&mut self, _address: u16, _quantity: u16) -> MeterResult<f64> {
            self.typed_calls.push("float");
            Ok(230.5)
        }

        async fn read_registers(&mut self, address: u16, quantity: u16) -> MeterResult<Vec<u16>> {
            self.raw_calls.push((address, quantity));
            Ok(encode_raw(987654321, 4))
        }
    }

    #[tokio::test]
    async fn test_rtu_window_uses_raw_read() {
        let mut transport = RtuTransport::new(FakeInstrument::default());
        let window = AddressWindow { first: 20480, count: 4 };
        transport.read_window(&window).await.unwrap();
        assert_eq!(transport.instrument().raw_calls, [(20480, 4)]);
    }

    #[tokio::test]
    async fn test_rtu_direct_read_one_word() {
        let mut transport = RtuTransport::new(FakeInstrument::default());
        let register = reg("frequency", 23340, 1, false, 2);
        let value = transport.direct_read(&register, SERIAL_NULLS).await.unwrap();
        assert_eq!(value, DirectRead::Value(Some(50.01)));
        assert_eq!(transport.instrument().typed_calls, ["register"]);
    }

    #[tokio::test]
    async fn test_rtu_direct_read_two_word_long_scaled() {
        let mut transport = RtuTransport::new(FakeInstrument::default());
        let register = reg("current_l1", 23308, 2, true, 2);
        let value = transport.direct_read(&register, SERIAL_NULLS).await.unwrap();
        assert_eq!(value, DirectRead::Value(Some(-123.45)));
        assert_eq!(transport.instrument().typed_calls, ["long"]);
    }

    #[tokio::test]
    async fn test_rtu_direct_read_float_pair() {
        let mut transport = RtuTransport::new(FakeInstrument::default());
        let register = crate::register::freg("voltage_l1_n", 0xD006, 2, false);
        let value = transport.direct_read(&register, SERIAL_NULLS).await.unwrap();
        assert_eq!(value, DirectRead::Value(Some(230.5)));
        assert_eq!(transport.instrument().typed_calls, ["float"]);
    }

    #[tokio::test]
    async fn test_rtu_direct_read_four_word_raw_decode() {
        let mut transport = RtuTransport::new(FakeInstrument::default());
        let register = reg("active_import", 20480, 4, true, 2);
        let value = transport.direct_read(&register, SERIAL_NULLS).await.unwrap();
        assert_eq!(value, DirectRead::Value(Some(9876543.21)));
        assert_eq!(transport.instrument().raw_calls, [(20480, 4)]);
    }

    #[tokio::test]
    async fn test_rtu_batch_policy_span() {
        let transport = RtuTransport::new(FakeInstrument::default()).with_max_span(10);
        assert_eq!(
            transport.batch_policy(),
            BatchPolicy::GapTolerant { max_span: 10 }
        );
    }
}
