//! # Register Descriptors and Catalogs
//!
//! A [`Register`] names one fixed-width slot in a meter's Modbus map; a
//! [`RegisterCatalog`] is the ordered set of registers one device model
//! exposes. Catalogs are plain data: vendor differences live in the tables
//! (see [`crate::models`]), not in code.
//!
//! ## Width Mapping
//!
//! | `word_length` | Raw width | Typical use |
//! |---------------|-----------|-------------|
//! | 1 | 16 bits | instantaneous values |
//! | 2 | 32 bits | power, f32 floats |
//! | 4 | 64 bits | energy counters, f64 floats |

use crate::error::{MeterError, MeterResult};

/// Descriptor for one named register in a device's Modbus map.
///
/// `decimals` is a base-10 scale exponent: the decoded integer is divided by
/// `10^decimals`, so a negative value multiplies (used by meters that report
/// tens of watts). `correction` is an optional post-scaling fixup for vendor
/// encoding quirks; it is applied last and never sees sentinel readings.
#[derive(Debug, Clone, Copy)]
pub struct Register {
    /// Name, unique within a catalog.
    pub name: &'static str,
    /// Starting register address.
    pub start: u16,
    /// Number of 16-bit registers occupied (1, 2 or 4).
    pub word_length: u8,
    /// Two's-complement interpretation when true.
    pub signed: bool,
    /// Decimal scale exponent (value = raw / 10^decimals).
    pub decimals: i32,
    /// IEEE-754 interpretation (2 words = f32, 4 words = f64); no scaling.
    pub is_float: bool,
    /// Post-decode correction for vendor quirks.
    pub correction: Option<fn(f64) -> f64>,
}

impl Register {
    /// Address one past the last register occupied.
    ///
    /// Widened to `u32`: a register may legally end exactly at the top of
    /// the 16-bit address space.
    #[inline]
    pub fn end(&self) -> u32 {
        u32::from(self.start) + u32::from(self.word_length)
    }
}

impl PartialEq for Register {
    fn eq(&self, other: &Self) -> bool {
        // Correction functions compare by pointer identity.
        self.name == other.name
            && self.start == other.start
            && self.word_length == other.word_length
            && self.signed == other.signed
            && self.decimals == other.decimals
            && self.is_float == other.is_float
            && self.correction.map(|f| f as usize) == other.correction.map(|f| f as usize)
    }
}

/// Shorthand constructor used by the model tables.
pub(crate) const fn reg(
    name: &'static str,
    start: u16,
    word_length: u8,
    signed: bool,
    decimals: i32,
) -> Register {
    Register {
        name,
        start,
        word_length,
        signed,
        decimals,
        is_float: false,
        correction: None,
    }
}

/// Shorthand constructor for IEEE-754 float registers.
pub(crate) const fn freg(
    name: &'static str,
    start: u16,
    word_length: u8,
    signed: bool,
) -> Register {
    Register {
        name,
        start,
        word_length,
        signed,
        decimals: 0,
        is_float: true,
        correction: None,
    }
}

/// Ordered register set for one device model.
///
/// Construction validates the table: names must be unique and no two
/// registers may share a start address. Declaration order is preserved by
/// [`all`](Self::all); read planning sorts by address separately.
#[derive(Debug, Clone)]
pub struct RegisterCatalog {
    registers: Vec<Register>,
}

impl RegisterCatalog {
    /// Build a catalog from a register table.
    pub fn new<I: IntoIterator<Item = Register>>(registers: I) -> MeterResult<Self> {
        let registers: Vec<Register> = registers.into_iter().collect();

        for (i, a) in registers.iter().enumerate() {
            if a.word_length != 1 && a.word_length != 2 && a.word_length != 4 {
                return Err(MeterError::invalid_catalog(format!(
                    "register '{}' has unsupported word length {}",
                    a.name, a.word_length
                )));
            }
            if a.end() > 0x1_0000 {
                return Err(MeterError::invalid_catalog(format!(
                    "register '{}' at {} runs past the end of the address space",
                    a.name, a.start
                )));
            }
            for b in &registers[i + 1..] {
                if a.name == b.name {
                    return Err(MeterError::invalid_catalog(format!(
                        "duplicate register name '{}'",
                        a.name
                    )));
                }
                if a.start == b.start {
                    return Err(MeterError::invalid_catalog(format!(
                        "registers '{}' and '{}' share start address {}",
                        a.name, b.name, a.start
                    )));
                }
            }
        }

        Ok(Self { registers })
    }

    /// Build a catalog keeping only the named subset (model variants).
    ///
    /// Names absent from the table are ignored, matching the permissive
    /// variant lists shipped by vendors.
    pub fn with_subset(self, names: &[&str]) -> Self {
        let registers = self
            .registers
            .into_iter()
            .filter(|r| names.contains(&r.name))
            .collect();
        Self { registers }
    }

    /// All registers in declaration order.
    pub fn all(&self) -> &[Register] {
        &self.registers
    }

    /// Number of registers in the catalog.
    pub fn len(&self) -> usize {
        self.registers.len()
    }

    /// True when the catalog holds no registers.
    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    /// Find a register by name.
    pub fn find(&self, name: &str) -> Option<&Register> {
        self.registers.iter().find(|r| r.name == name)
    }

    /// Resolve a name list to the subset present in this catalog.
    ///
    /// Returns the found registers sorted ascending by start address, plus
    /// the names that were not found (non-fatal; the caller decides how to
    /// report them).
    pub fn select(&self, names: &[&str]) -> (Vec<Register>, Vec<String>) {
        let mut found: Vec<Register> = self
            .registers
            .iter()
            .filter(|r| names.contains(&r.name))
            .copied()
            .collect();
        found.sort_by_key(|r| r.start);

        let missing = names
            .iter()
            .filter(|n| !self.registers.iter().any(|r| r.name == **n))
            .map(|n| (*n).to_string())
            .collect();

        (found, missing)
    }

    /// All registers sorted ascending by start address.
    pub fn sorted_by_start(&self) -> Vec<Register> {
        let mut regs = self.registers.clone();
        regs.sort_by_key(|r| r.start);
        regs
    }

    /// Rewrite the decimal scale of one register.
    ///
    /// Used by meters whose scaling is itself read from the device (see
    /// [`crate::models::multicube_autoscale`]). Returns false when the name
    /// is unknown.
    pub fn set_decimals(&mut self, name: &str, decimals: i32) -> bool {
        match self.registers.iter_mut().find(|r| r.name == name) {
            Some(r) => {
                r.decimals = decimals;
                true
            }
            None => false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
