//! # Read-Window Planning
//!
//! Groups a sorted set of registers into the minimal sequence of address
//! windows to request from a device, honoring the transport's batching
//! policy.
//!
//! ## Policies
//!
//! - [`BatchPolicy::GapTolerant`] (serial RTU): a window grows while the span
//!   from its first address to a register's end stays within `max_span`
//!   (125 registers for meter maps, 10 for low-resolution devices). Address
//!   gaps inside the window are read from the device and discarded — one
//!   exchange beats several on a slow serial link.
//! - [`BatchPolicy::Contiguous`] (TCP): a new window starts whenever the next
//!   register is not adjacent to the previous one. A single-address gap is
//!   tolerated; anything wider is split so unused ranges are never requested.
//!
//! Both policies require input pre-sorted by start address, which
//! [`RegisterCatalog::select`](crate::register::RegisterCatalog::select)
//! guarantees.

use crate::register::Register;

/// Maximum window span for standard meter register maps.
pub const DEFAULT_MAX_SPAN: u16 = 125;

/// Maximum window span for low-resolution device maps (e.g. S-Bus meters).
pub const LOW_RES_MAX_SPAN: u16 = 10;

/// A contiguous address span requested in one protocol exchange.
///
/// Transient: exists only for the duration of one transport call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressWindow {
    /// First register address of the span.
    pub first: u16,
    /// Number of 16-bit registers to request.
    pub count: u16,
}

impl AddressWindow {
    /// Window spanning exactly one register.
    pub fn for_register(register: &Register) -> Self {
        Self {
            first: register.start,
            count: u16::from(register.word_length),
        }
    }

    /// Expected response payload size in bytes (two per register).
    #[inline]
    pub fn byte_count(&self) -> usize {
        usize::from(self.count) * 2
    }
}

/// One planned exchange: the window plus the registers decoded from it.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowPlan {
    /// Address span to request.
    pub window: AddressWindow,
    /// Registers whose values lie inside the window, in address order.
    pub registers: Vec<Register>,
}

/// Window-forming policy, chosen by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPolicy {
    /// Accumulate registers while the total span fits `max_span`; internal
    /// address gaps are queried along with the data.
    GapTolerant {
        /// Maximum registers per window.
        max_span: u16,
    },
    /// Split on any gap wider than one address, regardless of span.
    Contiguous,
}

/// Plan the windows needed to read `registers` (pre-sorted by start).
pub fn plan_windows(registers: &[Register], policy: BatchPolicy) -> Vec<WindowPlan> {
    debug_assert!(
        registers.windows(2).all(|w| w[0].start <= w[1].start),
        "plan_windows requires registers sorted by start address"
    );

    if registers.is_empty() {
        return Vec::new();
    }

    match policy {
        BatchPolicy::GapTolerant { max_span } => plan_gap_tolerant(registers, max_span),
        BatchPolicy::Contiguous => plan_contiguous(registers),
    }
}

fn plan_gap_tolerant(registers: &[Register], max_span: u16) -> Vec<WindowPlan> {
    let mut plans = Vec::new();
    let mut batch: Vec<Register> = Vec::new();
    let mut window_first = u32::from(registers[0].start);

    for register in registers {
        if register.end() - window_first <= u32::from(max_span) {
            batch.push(*register);
        } else {
            plans.push(seal(std::mem::take(&mut batch)));
            window_first = u32::from(register.start);
            batch.push(*register);
        }
    }
    plans.push(seal(batch));
    plans
}

fn plan_contiguous(registers: &[Register]) -> Vec<WindowPlan> {
    let mut plans = Vec::new();
    let mut batch: Vec<Register> = Vec::new();
    let mut prev_end = i32::from(registers[0].start) - 1;

    for register in registers {
        if i32::from(register.start) - prev_end > 1 && !batch.is_empty() {
            plans.push(seal(std::mem::take(&mut batch)));
        }
        batch.push(*register);
        prev_end = register.end() as i32;
    }
    plans.push(seal(batch));
    plans
}

/// Close a batch into a plan: the window covers min start to max end.
fn seal(batch: Vec<Register>) -> WindowPlan {
    let first = batch.iter().map(|r| r.start).min().unwrap_or(0);
    let end = batch
        .iter()
        .map(|r| r.end())
        .max()
        .unwrap_or(u32::from(first));
    WindowPlan {
        window: AddressWindow {
            first,
            count: (end - u32::from(first)) as u16,
        },
        registers: batch,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::reg;

    fn r(start: u16, len: u8) -> Register {
        // Names only matter for decode, not planning.
        reg("r", start, len, false, 0)
    }

    #[test]
    fn test_empty_input_yields_no_windows() {
        assert!(plan_windows(&[], BatchPolicy::Contiguous).is_empty());
        assert!(plan_windows(&[], BatchPolicy::GapTolerant { max_span: 125 }).is_empty());
    }

    #[test]
    fn test_gap_tolerant_spans_internal_gap() {
        // Registers at 10..12 and 14..16 fit one window of 6 despite the
        // hole at 12..14.
        let regs = [r(10, 2), r(14, 2)];
        let plans = plan_windows(&regs, BatchPolicy::GapTolerant { max_span: 125 });
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].window, AddressWindow { first: 10, count: 6 });
        assert_eq!(plans[0].registers.len(), 2);
    }

    #[test]
    fn test_gap_tolerant_splits_at_cap() {
        let regs = [r(0, 2), r(100, 2), r(130, 2)];
        let plans = plan_windows(&regs, BatchPolicy::GapTolerant { max_span: 125 });
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].window, AddressWindow { first: 0, count: 102 });
        assert_eq!(plans[1].window, AddressWindow { first: 130, count: 2 });
    }

    #[test]
    fn test_gap_tolerant_low_res_cap() {
        // Saia-class maps batch at most 10 registers per exchange.
        let regs = [r(0, 1), r(5, 1), r(11, 1)];
        let plans = plan_windows(&regs, BatchPolicy::GapTolerant { max_span: 10 });
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].window, AddressWindow { first: 0, count: 6 });
        assert_eq!(plans[1].window, AddressWindow { first: 11, count: 1 });
    }

    #[test]
    fn test_gap_tolerant_exact_cap_boundary() {
        // end - first == max_span is still one window.
        let regs = [r(0, 1), r(123, 2)];
        let plans = plan_windows(&regs, BatchPolicy::GapTolerant { max_span: 125 });
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].window.count, 125);
    }

    #[test]
    fn test_contiguous_splits_on_gap() {
        let regs = [r(10, 1), r(11, 1), r(50, 1)];
        let plans = plan_windows(&regs, BatchPolicy::Contiguous);
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].window, AddressWindow { first: 10, count: 2 });
        assert_eq!(plans[1].window, AddressWindow { first: 50, count: 1 });
    }

    #[test]
    fn test_contiguous_tolerates_single_address_gap() {
        // 40191 ends at 40192, next starts at 40193: one unused address,
        // still one window (matches the SMA register map).
        let regs = [r(40191, 1), r(40193, 1)];
        let plans = plan_windows(&regs, BatchPolicy::Contiguous);
        assert_eq!(plans.len(), 1);
        assert_eq!(
            plans[0].window,
            AddressWindow {
                first: 40191,
                count: 3
            }
        );
    }

    #[test]
    fn test_contiguous_ignores_total_span() {
        // Contiguity-strict never splits on size alone.
        let regs: Vec<Register> = (0..200).map(|i| r(i, 1)).collect();
        let plans = plan_windows(&regs, BatchPolicy::Contiguous);
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].window.count, 200);
    }

    #[test]
    fn test_window_at_top_of_address_space() {
        // A register ending exactly at 0x10000 plans without wrapping.
        let regs = [r(65534, 2)];
        let plans = plan_windows(&regs, BatchPolicy::Contiguous);
        assert_eq!(
            plans[0].window,
            AddressWindow {
                first: 65534,
                count: 2
            }
        );
    }

    #[test]
    fn test_single_register_window() {
        let register = r(23340, 1);
        let window = AddressWindow::for_register(&register);
        assert_eq!(window, AddressWindow { first: 23340, count: 1 });
        assert_eq!(window.byte_count(), 2);
    }

    #[test]
    fn test_registers_preserved_in_decode_order() {
        let regs = [r(10, 2), r(14, 2), r(200, 1)];
        let plans = plan_windows(&regs, BatchPolicy::GapTolerant { max_span: 125 });
        assert_eq!(plans.len(), 2);
        let starts: Vec<u16> = plans[0].registers.iter().map(|x| x.start).collect();
        assert_eq!(starts, [10, 14]);
    }
}
