//! # Device Register Tables
//!
//! Register catalogs for the supported meter families. Tables are data,
//! checked at catalog construction; wire behavior for each family lives in
//! its [`MeterProfile`](crate::profile::MeterProfile) preset.
//!
//! | Catalog | Link | Profile | Notes |
//! |---------|------|---------|-------|
//! | [`abb`] | RTU / TCP | `serial()` | A/B series, model-specific subsets |
//! | [`mem001`] | RTU | `no_nulls()` | IEEE-754 float map |
//! | [`sma`] | TCP | `sma()` | one-based addresses, power factor fixup |
//! | [`multicube`] | TCP | `tcp()` | scaling read from the device |
//! | [`saia`] | S-Bus | `no_nulls()` | low-resolution map, 10-register windows |

use tracing::debug;

use crate::client::MeterClient;
use crate::codec::power_factor_unity_when_zero;
use crate::error::{MeterError, MeterResult};
use crate::register::{freg, reg, Register, RegisterCatalog};
use crate::transport::MeterTransport;

// ============================================================================
// ABB A/B series
// ============================================================================

/// Full register map of the ABB A and B series meters.
const ABB_REGS: &[Register] = &[
    reg("active_import", 20480, 4, true, 2),
    reg("active_export", 20484, 4, true, 2),
    reg("active_net", 20488, 4, true, 2),
    reg("reactive_import", 20492, 4, true, 2),
    reg("reactive_export", 20496, 4, true, 2),
    reg("reactive_net", 20500, 4, true, 2),
    reg("apparent_import", 20504, 4, true, 2),
    reg("apparent_export", 20508, 4, true, 2),
    reg("apparent_net", 20512, 4, true, 2),
    reg("active_import_co2", 20516, 4, true, 2),
    reg("active_import_currency", 20532, 4, true, 2),
    reg("active_import_tariff_1", 20848, 4, false, 2),
    reg("active_import_tariff_2", 20852, 4, false, 2),
    reg("active_import_tariff_3", 20856, 4, false, 2),
    reg("active_import_tariff_4", 20860, 4, false, 2),
    reg("active_export_tariff_1", 20880, 4, false, 2),
    reg("active_export_tariff_2", 20884, 4, false, 2),
    reg("active_export_tariff_3", 20888, 4, false, 2),
    reg("active_export_tariff_4", 20892, 4, false, 2),
    reg("reactive_import_tariff_1", 20912, 4, false, 2),
    reg("reactive_import_tariff_2", 20916, 4, false, 2),
    reg("reactive_import_tariff_3", 20920, 4, false, 2),
    reg("reactive_import_tariff_4", 20924, 4, false, 2),
    reg("reactive_export_tariff_1", 20944, 4, false, 2),
    reg("reactive_export_tariff_2", 20948, 4, false, 2),
    reg("reactive_export_tariff_3", 20952, 4, false, 2),
    reg("reactive_export_tariff_4", 20956, 4, false, 2),
    reg("active_import_l1", 21600, 4, false, 2),
    reg("active_import_l2", 21604, 4, false, 2),
    reg("active_import_l3", 21608, 4, false, 2),
    reg("active_export_l1", 21612, 4, false, 2),
    reg("active_export_l2", 21616, 4, false, 2),
    reg("active_export_l3", 21620, 4, false, 2),
    reg("active_net_l1", 21624, 4, true, 2),
    reg("active_net_l2", 21628, 4, true, 2),
    reg("active_net_l3", 21632, 4, true, 2),
    reg("reactive_import_l1", 21636, 4, false, 2),
    reg("reactive_import_l2", 21640, 4, false, 2),
    reg("reactive_import_l3", 21644, 4, false, 2),
    reg("reactive_export_l1", 21648, 4, false, 2),
    reg("reactive_export_l2", 21652, 4, false, 2),
    reg("reactive_export_l3", 21656, 4, false, 2),
    reg("reactive_net_l1", 21660, 4, true, 2),
    reg("reactive_net_l2", 21664, 4, true, 2),
    reg("reactive_net_l3", 21668, 4, true, 2),
    reg("apparent_import_l1", 21672, 4, false, 2),
    reg("apparent_import_l2", 21676, 4, false, 2),
    reg("apparent_import_l3", 21680, 4, false, 2),
    reg("apparent_export_l1", 21684, 4, false, 2),
    reg("apparent_export_l2", 21688, 4, false, 2),
    reg("apparent_export_l3", 21692, 4, false, 2),
    reg("apparent_net_l1", 21696, 4, true, 2),
    reg("apparent_net_l2", 21700, 4, true, 2),
    reg("apparent_net_l3", 21704, 4, true, 2),
    reg("resettable_active_import", 21804, 4, false, 2),
    reg("resettable_active_export", 21808, 4, false, 2),
    reg("resettable_reactive_import", 21812, 4, false, 2),
    reg("resettable_reactive_export", 21816, 4, false, 2),
    reg("voltage_l1_n", 23296, 2, false, 1),
    reg("voltage_l2_n", 23298, 2, false, 1),
    reg("voltage_l3_n", 23300, 2, false, 1),
    reg("voltage_l1_l2", 23302, 2, false, 1),
    reg("voltage_l3_l2", 23304, 2, false, 1),
    reg("voltage_l1_l3", 23306, 2, false, 1),
    reg("current_l1", 23308, 2, false, 2),
    reg("current_l2", 23310, 2, false, 2),
    reg("current_l3", 23312, 2, false, 2),
    reg("current_n", 23314, 2, false, 2),
    reg("active_power_total", 23316, 2, true, 2),
    reg("active_power_l1", 23318, 2, true, 2),
    reg("active_power_l2", 23320, 2, true, 2),
    reg("active_power_l3", 23322, 2, true, 2),
    reg("reactive_power_total", 23324, 2, true, 2),
    reg("reactive_power_l1", 23326, 2, true, 2),
    reg("reactive_power_l2", 23328, 2, true, 2),
    reg("reactive_power_l3", 23330, 2, true, 2),
    reg("apparent_power_total", 23332, 2, true, 2),
    reg("apparent_power_l1", 23334, 2, true, 2),
    reg("apparent_power_l2", 23336, 2, true, 2),
    reg("apparent_power_l3", 23338, 2, true, 2),
    reg("frequency", 23340, 1, false, 2),
    reg("phase_angle_power_total", 23341, 1, true, 1),
    reg("phase_angle_power_l1", 23342, 1, true, 1),
    reg("phase_angle_power_l2", 23343, 1, true, 1),
    reg("phase_angle_power_l3", 23344, 1, true, 1),
    reg("phase_angle_voltage_l1", 23345, 1, true, 1),
    reg("phase_angle_voltage_l2", 23346, 1, true, 1),
    reg("phase_angle_voltage_l3", 23347, 1, true, 1),
    reg("phase_angle_current_l1", 23351, 1, true, 1),
    reg("phase_angle_current_l2", 23352, 1, true, 1),
    reg("phase_angle_current_l3", 23353, 1, true, 1),
    reg("power_factor_total", 23354, 1, true, 3),
    reg("power_factor_l1", 23355, 1, true, 3),
    reg("power_factor_l2", 23356, 1, true, 3),
    reg("power_factor_l3", 23357, 1, true, 3),
    reg("current_quadrant_total", 23358, 1, false, 0),
    reg("current_quadrant_l1", 23359, 1, false, 0),
    reg("current_quadrant_l2", 23360, 1, false, 0),
    reg("current_quadrant_l3", 23361, 1, false, 0),
    reg("voltage_harmonics_l1_n_thd", 23808, 2, false, 1),
    reg("voltage_harmonics_l1_n_2nd", 23810, 2, false, 1),
    reg("voltage_harmonics_l1_n_3rd", 23812, 2, false, 1),
    reg("voltage_harmonics_l1_n_4th", 23814, 2, false, 1),
    reg("voltage_harmonics_l1_n_5th", 23816, 2, false, 1),
    reg("voltage_harmonics_l1_n_6th", 23818, 2, false, 1),
    reg("voltage_harmonics_l1_n_7th", 23820, 2, false, 1),
    reg("voltage_harmonics_l1_n_8th", 23822, 2, false, 1),
    reg("voltage_harmonics_l1_n_9th", 23824, 2, false, 1),
    reg("voltage_harmonics_l1_n_10th", 23826, 2, false, 1),
    reg("voltage_harmonics_l1_n_11th", 23828, 2, false, 1),
    reg("voltage_harmonics_l1_n_12th", 23830, 2, false, 1),
    reg("voltage_harmonics_l1_n_13th", 23832, 2, false, 1),
    reg("voltage_harmonics_l1_n_14th", 23834, 2, false, 1),
    reg("voltage_harmonics_l1_n_15th", 23836, 2, false, 1),
    reg("voltage_harmonics_l1_n_16th", 23838, 2, false, 1),
    reg("voltage_harmonics_l2_n_thd", 23936, 2, false, 1),
    reg("voltage_harmonics_l2_n_2nd", 23938, 2, false, 1),
    reg("voltage_harmonics_l2_n_3rd", 23940, 2, false, 1),
    reg("voltage_harmonics_l2_n_4th", 23942, 2, false, 1),
    reg("voltage_harmonics_l2_n_5th", 23944, 2, false, 1),
    reg("voltage_harmonics_l2_n_6th", 23946, 2, false, 1),
    reg("voltage_harmonics_l2_n_7th", 23948, 2, false, 1),
    reg("voltage_harmonics_l2_n_8th", 23950, 2, false, 1),
    reg("voltage_harmonics_l2_n_9th", 23952, 2, false, 1),
    reg("voltage_harmonics_l2_n_10th", 23954, 2, false, 1),
    reg("voltage_harmonics_l2_n_11th", 23956, 2, false, 1),
    reg("voltage_harmonics_l2_n_12th", 23958, 2, false, 1),
    reg("voltage_harmonics_l2_n_13th", 23960, 2, false, 1),
    reg("voltage_harmonics_l2_n_14th", 23962, 2, false, 1),
    reg("voltage_harmonics_l2_n_15th", 23964, 2, false, 1),
    reg("voltage_harmonics_l2_n_16th", 23966, 2, false, 1),
    reg("voltage_harmonics_l3_n_thd", 24064, 2, false, 1),
    reg("voltage_harmonics_l3_n_2nd", 24066, 2, false, 1),
    reg("voltage_harmonics_l3_n_3rd", 24068, 2, false, 1),
    reg("voltage_harmonics_l3_n_4th", 24070, 2, false, 1),
    reg("voltage_harmonics_l3_n_5th", 24072, 2, false, 1),
    reg("voltage_harmonics_l3_n_6th", 24074, 2, false, 1),
    reg("voltage_harmonics_l3_n_7th", 24076, 2, false, 1),
    reg("voltage_harmonics_l3_n_8th", 24078, 2, false, 1),
    reg("voltage_harmonics_l3_n_9th", 24080, 2, false, 1),
    reg("voltage_harmonics_l3_n_10th", 24082, 2, false, 1),
    reg("voltage_harmonics_l3_n_11th", 24084, 2, false, 1),
    reg("voltage_harmonics_l3_n_12th", 24086, 2, false, 1),
    reg("voltage_harmonics_l3_n_13th", 24088, 2, false, 1),
    reg("voltage_harmonics_l3_n_14th", 24090, 2, false, 1),
    reg("voltage_harmonics_l3_n_15th", 24092, 2, false, 1),
    reg("voltage_harmonics_l3_n_16th", 24094, 2, false, 1),
    reg("voltage_harmonics_l1_l2_thd", 24192, 2, false, 1),
    reg("voltage_harmonics_l1_l2_2nd", 24194, 2, false, 1),
    reg("voltage_harmonics_l1_l2_3rd", 24196, 2, false, 1),
    reg("voltage_harmonics_l1_l2_4th", 24198, 2, false, 1),
    reg("voltage_harmonics_l1_l2_5th", 24200, 2, false, 1),
    reg("voltage_harmonics_l1_l2_6th", 24202, 2, false, 1),
    reg("voltage_harmonics_l1_l2_7th", 24204, 2, false, 1),
    reg("voltage_harmonics_l1_l2_8th", 24206, 2, false, 1),
    reg("voltage_harmonics_l1_l2_9th", 24208, 2, false, 1),
    reg("voltage_harmonics_l1_l2_10th", 24210, 2, false, 1),
    reg("voltage_harmonics_l1_l2_11th", 24212, 2, false, 1),
    reg("voltage_harmonics_l1_l2_12th", 24214, 2, false, 1),
    reg("voltage_harmonics_l1_l2_13th", 24216, 2, false, 1),
    reg("voltage_harmonics_l1_l2_14th", 24218, 2, false, 1),
    reg("voltage_harmonics_l1_l2_15th", 24220, 2, false, 1),
    reg("voltage_harmonics_l1_l2_16th", 24222, 2, false, 1),
    reg("voltage_harmonics_l3_l2_thd", 24320, 2, false, 1),
    reg("voltage_harmonics_l3_l2_2nd", 24322, 2, false, 1),
    reg("voltage_harmonics_l3_l2_3rd", 24324, 2, false, 1),
    reg("voltage_harmonics_l3_l2_4th", 24326, 2, false, 1),
    reg("voltage_harmonics_l3_l2_5th", 24328, 2, false, 1),
    reg("voltage_harmonics_l3_l2_6th", 24330, 2, false, 1),
    reg("voltage_harmonics_l3_l2_7th", 24332, 2, false, 1),
    reg("voltage_harmonics_l3_l2_8th", 24334, 2, false, 1),
    reg("voltage_harmonics_l3_l2_9th", 24336, 2, false, 1),
    reg("voltage_harmonics_l3_l2_10th", 24338, 2, false, 1),
    reg("voltage_harmonics_l3_l2_11th", 24340, 2, false, 1),
    reg("voltage_harmonics_l3_l2_12th", 24342, 2, false, 1),
    reg("voltage_harmonics_l3_l2_13th", 24344, 2, false, 1),
    reg("voltage_harmonics_l3_l2_14th", 24346, 2, false, 1),
    reg("voltage_harmonics_l3_l2_15th", 24348, 2, false, 1),
    reg("voltage_harmonics_l3_l2_16th", 24350, 2, false, 1),
    reg("voltage_harmonics_l1_l3_thd", 24448, 2, false, 1),
    reg("voltage_harmonics_l1_l3_2nd", 24450, 2, false, 1),
    reg("voltage_harmonics_l1_l3_3rd", 24452, 2, false, 1),
    reg("voltage_harmonics_l1_l3_4th", 24454, 2, false, 1),
    reg("voltage_harmonics_l1_l3_5th", 24456, 2, false, 1),
    reg("voltage_harmonics_l1_l3_6th", 24458, 2, false, 1),
    reg("voltage_harmonics_l1_l3_7th", 24460, 2, false, 1),
    reg("voltage_harmonics_l1_l3_8th", 24462, 2, false, 1),
    reg("voltage_harmonics_l1_l3_9th", 24464, 2, false, 1),
    reg("voltage_harmonics_l1_l3_10th", 24466, 2, false, 1),
    reg("voltage_harmonics_l1_l3_11th", 24468, 2, false, 1),
    reg("voltage_harmonics_l1_l3_12th", 24470, 2, false, 1),
    reg("voltage_harmonics_l1_l3_13th", 24472, 2, false, 1),
    reg("voltage_harmonics_l1_l3_14th", 24474, 2, false, 1),
    reg("voltage_harmonics_l1_l3_15th", 24476, 2, false, 1),
    reg("voltage_harmonics_l1_l3_16th", 24478, 2, false, 1),
    reg("current_harmonics_l1_thd", 24576, 2, false, 1),
    reg("current_harmonics_l1_2nd", 24578, 2, false, 1),
    reg("current_harmonics_l1_3rd", 24580, 2, false, 1),
    reg("current_harmonics_l1_4th", 24582, 2, false, 1),
    reg("current_harmonics_l1_5th", 24584, 2, false, 1),
    reg("current_harmonics_l1_6th", 24586, 2, false, 1),
    reg("current_harmonics_l1_7th", 24588, 2, false, 1),
    reg("current_harmonics_l1_8th", 24590, 2, false, 1),
    reg("current_harmonics_l1_9th", 24592, 2, false, 1),
    reg("current_harmonics_l1_10th", 24594, 2, false, 1),
    reg("current_harmonics_l1_11th", 24596, 2, false, 1),
    reg("current_harmonics_l1_12th", 24598, 2, false, 1),
    reg("current_harmonics_l1_13th", 24600, 2, false, 1),
    reg("current_harmonics_l1_14th", 24602, 2, false, 1),
    reg("current_harmonics_l1_15th", 24604, 2, false, 1),
    reg("current_harmonics_l1_16th", 24606, 2, false, 1),
    reg("current_harmonics_l2_thd", 24704, 2, false, 1),
    reg("current_harmonics_l2_2nd", 24706, 2, false, 1),
    reg("current_harmonics_l2_3rd", 24708, 2, false, 1),
    reg("current_harmonics_l2_4th", 24710, 2, false, 1),
    reg("current_harmonics_l2_5th", 24712, 2, false, 1),
    reg("current_harmonics_l2_6th", 24714, 2, false, 1),
    reg("current_harmonics_l2_7th", 24716, 2, false, 1),
    reg("current_harmonics_l2_8th", 24718, 2, false, 1),
    reg("current_harmonics_l2_9th", 24720, 2, false, 1),
    reg("current_harmonics_l2_10th", 24722, 2, false, 1),
    reg("current_harmonics_l2_11th", 24724, 2, false, 1),
    reg("current_harmonics_l2_12th", 24726, 2, false, 1),
    reg("current_harmonics_l2_13th", 24728, 2, false, 1),
    reg("current_harmonics_l2_14th", 24730, 2, false, 1),
    reg("current_harmonics_l2_15th", 24732, 2, false, 1),
    reg("current_harmonics_l2_16th", 24734, 2, false, 1),
    reg("current_harmonics_l3_thd", 24832, 2, false, 1),
    reg("current_harmonics_l3_2nd", 24834, 2, false, 1),
    reg("current_harmonics_l3_3rd", 24836, 2, false, 1),
    reg("current_harmonics_l3_4th", 24838, 2, false, 1),
    reg("current_harmonics_l3_5th", 24840, 2, false, 1),
    reg("current_harmonics_l3_6th", 24842, 2, false, 1),
    reg("current_harmonics_l3_7th", 24844, 2, false, 1),
    reg("current_harmonics_l3_8th", 24846, 2, false, 1),
    reg("current_harmonics_l3_9th", 24848, 2, false, 1),
    reg("current_harmonics_l3_10th", 24850, 2, false, 1),
    reg("current_harmonics_l3_11th", 24852, 2, false, 1),
    reg("current_harmonics_l3_12th", 24854, 2, false, 1),
    reg("current_harmonics_l3_13th", 24856, 2, false, 1),
    reg("current_harmonics_l3_14th", 24858, 2, false, 1),
    reg("current_harmonics_l3_15th", 24860, 2, false, 1),
    reg("current_harmonics_l3_16th", 24862, 2, false, 1),
    reg("current_harmonics_n_thd", 24960, 2, false, 1),
    reg("current_harmonics_n_2nd", 24962, 2, false, 1),
    reg("current_harmonics_n_3rd", 24964, 2, false, 1),
    reg("current_harmonics_n_4th", 24966, 2, false, 1),
    reg("current_harmonics_n_5th", 24968, 2, false, 1),
    reg("current_harmonics_n_6th", 24970, 2, false, 1),
    reg("current_harmonics_n_7th", 24972, 2, false, 1),
    reg("current_harmonics_n_8th", 24974, 2, false, 1),
    reg("current_harmonics_n_9th", 24976, 2, false, 1),
    reg("current_harmonics_n_10th", 24978, 2, false, 1),
    reg("current_harmonics_n_11th", 24980, 2, false, 1),
    reg("current_harmonics_n_12th", 24982, 2, false, 1),
    reg("current_harmonics_n_13th", 24984, 2, false, 1),
    reg("current_harmonics_n_14th", 24986, 2, false, 1),
    reg("current_harmonics_n_15th", 24988, 2, false, 1),
    reg("current_harmonics_n_16th", 24990, 2, false, 1),
];

/// Registers present on the A43 and B23 models (identical sets).
const ABB_A43_B23: &[&str] = &[
    "active_import", "active_export", "active_net",
    "reactive_import", "reactive_export", "reactive_net",
    "apparent_import", "apparent_export", "apparent_net",
    "active_import_co2", "active_import_currency",
    "active_import_l1", "active_import_l2", "active_import_l3",
    "active_export_l1", "active_export_l2", "active_export_l3",
    "active_net_l1", "active_net_l2", "active_net_l3",
    "reactive_import_l1", "reactive_import_l2", "reactive_import_l3",
    "reactive_export_l1", "reactive_export_l2", "reactive_export_l3",
    "reactive_net_l1", "reactive_net_l2", "reactive_net_l3",
    "apparent_import_l1", "apparent_import_l2", "apparent_import_l3",
    "apparent_export_l1", "apparent_export_l2", "apparent_export_l3",
    "apparent_net_l1", "apparent_net_l2", "apparent_net_l3",
    "voltage_l1_n", "voltage_l2_n", "voltage_l3_n",
    "voltage_l1_l2", "voltage_l3_l2", "voltage_l1_l3",
    "current_l1", "current_l2", "current_l3",
    "active_power_total", "active_power_l1", "active_power_l2", "active_power_l3",
    "reactive_power_total", "reactive_power_l1", "reactive_power_l2", "reactive_power_l3",
    "apparent_power_total", "apparent_power_l1", "apparent_power_l2", "apparent_power_l3",
    "frequency", "phase_angle_power_total",
    "power_factor_total", "power_factor_l1", "power_factor_l2", "power_factor_l3",
    "current_quadrant_total", "current_quadrant_l1", "current_quadrant_l2", "current_quadrant_l3",
];

/// Registers present on the single-phase B21 model.
const ABB_B21: &[&str] = &[
    "active_import", "active_export", "active_net",
    "reactive_import", "reactive_export", "reactive_net",
    "apparent_import", "apparent_export", "apparent_net",
    "active_import_co2", "active_import_currency",
    "voltage_l1_n", "current_l1", "active_power_total",
    "reactive_power_total", "apparent_power_total", "frequency",
    "phase_angle_power_total", "power_factor_total", "current_quadrant_total",
];

/// Catalog for ABB A/B series meters.
///
/// `model` narrows the table to the registers a specific model actually
/// implements (`"A43"`, `"B23"`, `"B21"`); `None` yields the full map. An
/// unrecognized model name is an error rather than silently reading the
/// full map.
pub fn abb(model: Option<&str>) -> MeterResult<RegisterCatalog> {
    let catalog = RegisterCatalog::new(ABB_REGS.iter().copied())?;
    match model {
        None => Ok(catalog),
        Some("A43") | Some("B23") => Ok(catalog.with_subset(ABB_A43_B23)),
        Some("B21") => Ok(catalog.with_subset(ABB_B21)),
        Some(other) => Err(MeterError::invalid_catalog(format!(
            "unknown ABB model '{other}' (expected A43, B23 or B21)"
        ))),
    }
}

// ============================================================================
// MEM001
// ============================================================================

/// MEM001 multi-feeder meter: integer feeder ids plus f32 measurements.
const MEM001_REGS: &[Register] = &[
    reg("feeder_1_id", 0x2005, 1, false, 0),
    reg("feeder_2_id", 0x2006, 1, false, 0),
    reg("feeder_3_id", 0x2007, 1, false, 0),
    reg("feeder_4_id", 0x2008, 1, false, 0),
    reg("feeder_5_id", 0x2009, 1, false, 0),
    reg("feeder_6_id", 0x200A, 1, false, 0),
    reg("feeder_7_id", 0x200B, 1, false, 0),
    reg("feeder_8_id", 0x200C, 1, false, 0),
    freg("voltage_l1_n", 0xD006, 2, false),
    freg("voltage_l2_n", 0xD008, 2, false),
    freg("voltage_l3_n", 0xD00A, 2, false),
    freg("current_l1", 0xD012, 2, false),
    freg("current_l2", 0xD014, 2, false),
    freg("current_l3", 0xD016, 2, false),
    freg("active_power_total", 0xD01A, 2, true),
    freg("reactive_power_total", 0xD01C, 2, true),
    freg("active_power_l1", 0xD023, 2, true),
    freg("active_power_l2", 0xD025, 2, true),
    freg("active_power_l3", 0xD027, 2, true),
    freg("reactive_power_l1", 0xD029, 2, true),
    freg("reactive_power_l2", 0xD02B, 2, true),
    freg("reactive_power_l3", 0xD02D, 2, true),
    freg("power_factor_l1", 0xD035, 2, true),
    freg("power_factor_l2", 0xD037, 2, true),
    freg("power_factor_l3", 0xD039, 2, true),
    freg("current_harmonics_l1", 0xD044, 2, true),
    freg("current_harmonics_l2", 0xD046, 2, true),
    freg("current_harmonics_l3", 0xD048, 2, true),
    freg("current_harmonics_l1_3rd", 0xD052, 2, true),
    freg("current_harmonics_l2_3rd", 0xD054, 2, true),
    freg("current_harmonics_l3_3rd", 0xD056, 2, true),
    freg("current_harmonics_l1_5th", 0xD058, 2, true),
    freg("current_harmonics_l2_5th", 0xD05A, 2, true),
    freg("current_harmonics_l3_5th", 0xD05C, 2, true),
    freg("current_harmonics_l1_7th", 0xD05E, 2, true),
    freg("current_harmonics_l2_7th", 0xD060, 2, true),
    freg("current_harmonics_l3_7th", 0xD062, 2, true),
];

/// Catalog for the MEM001 meter. Pair with
/// [`MeterProfile::no_nulls`](crate::profile::MeterProfile::no_nulls).
pub fn mem001() -> MeterResult<RegisterCatalog> {
    RegisterCatalog::new(MEM001_REGS.iter().copied())
}

// ============================================================================
// SMA
// ============================================================================

const SMA_REGS: &[Register] = &[
    reg("current_ac", 40188, 1, false, 1),
    reg("current_l1", 40189, 1, false, 1),
    reg("current_l2", 40190, 1, false, 1),
    reg("current_l3", 40191, 1, false, 1),
    reg("voltage_l1_l2", 40193, 1, false, 1),
    reg("voltage_l2_l3", 40194, 1, false, 1),
    reg("voltage_l3_l1", 40195, 1, false, 1),
    reg("voltage_l1_n", 40196, 1, false, 1),
    reg("voltage_l2_n", 40197, 1, false, 1),
    reg("voltage_l3_n", 40198, 1, false, 1),
    reg("active_power_total", 40200, 1, true, -1),
    reg("frequency", 40202, 1, false, 2),
    reg("apparent_power_total", 40204, 1, true, -1),
    reg("reactive_power_total", 40206, 1, true, -1),
    reg("power_factor_total", 40208, 1, true, 3),
    reg("active_export", 40210, 2, false, 3),
    reg("dc_power", 40217, 1, false, -1),
    reg("temperature_internal", 40219, 1, false, 0),
    reg("temperature_other", 40222, 1, false, 0),
    reg("operating_status", 40224, 1, false, 0),
];

/// Catalog for SMA inverters speaking SunSpec-style Modbus/TCP.
///
/// Addresses are one-based as the vendor documents them; pair with
/// [`MeterProfile::sma`](crate::profile::MeterProfile::sma), which applies
/// the wire offset. These devices report a power factor of 0 at unity, so
/// `power_factor_total` carries a correction.
pub fn sma() -> MeterResult<RegisterCatalog> {
    let mut regs: Vec<Register> = SMA_REGS.to_vec();
    for r in &mut regs {
        if r.name == "power_factor_total" {
            r.correction = Some(power_factor_unity_when_zero);
        }
    }
    RegisterCatalog::new(regs)
}

// ============================================================================
// Multicube
// ============================================================================

const MULTICUBE_REGS: &[Register] = &[
    reg("energy_scale", 512, 2, true, 0),
    reg("active_net", 514, 2, true, 0),
    reg("apparent_net", 516, 2, true, 0),
    reg("reactive_net", 518, 2, true, 0),
    reg("active_power_total", 2816, 1, true, 0),
    reg("apparent_power_total", 2817, 1, true, 0),
    reg("reactive_power_total", 2818, 1, true, 0),
    reg("power_factor_total", 2819, 1, true, 3),
    reg("frequency", 2820, 1, true, 1),
    reg("voltage_l1_n", 2821, 1, true, 0),
    reg("current_l1", 2822, 1, true, 0),
    reg("active_power_l1", 2823, 1, true, 0),
    reg("voltage_l2_n", 2824, 1, true, 0),
    reg("current_l2", 2825, 1, true, 0),
    reg("active_power_l2", 2826, 1, true, 0),
    reg("voltage_l3_n", 2827, 1, true, 0),
    reg("current_l3", 2828, 1, true, 0),
    reg("active_power_l3", 2829, 1, true, 0),
    reg("power_factor_l1", 2830, 1, true, 0),
    reg("power_factor_l2", 2831, 1, true, 0),
    reg("power_factor_l3", 2832, 1, true, 0),
    reg("voltage_l1_l2", 2833, 1, true, 0),
    reg("voltage_l2_l3", 2834, 1, true, 0),
    reg("voltage_l3_l1", 2835, 1, true, 0),
    reg("current_n", 2836, 1, true, 0),
    reg("amps_scale", 2837, 1, true, 0),
    reg("phase_volts_scale", 2838, 1, true, 0),
    reg("line_volts_scale", 2839, 1, true, 0),
    reg("power_scale", 2840, 1, true, 0),
    reg("apparent_power_l1", 3072, 1, true, 0),
    reg("apparent_power_l2", 3073, 1, true, 0),
    reg("apparent_power_l3", 3074, 1, true, 0),
    reg("reactive_power_l1", 3075, 1, true, 0),
    reg("reactive_power_l2", 3076, 1, true, 0),
    reg("reactive_power_l3", 3077, 1, true, 0),
    reg("peak_current_l1", 3078, 1, true, 0),
    reg("peak_current_l2", 3079, 1, true, 0),
    reg("peak_current_l3", 3080, 1, true, 0),
    reg("current_l1_thd", 3081, 1, true, 3),
    reg("current_l2_thd", 3082, 1, true, 3),
    reg("current_l3_thd", 3083, 1, true, 3),
];

/// Catalog for Northern Design Multicube meters over Modbus/TCP.
///
/// Measurement scaling is configured per installation and exposed through
/// the meter's own scale registers; run [`multicube_autoscale`] once after
/// connecting, before trusting any decoded value.
pub fn multicube() -> MeterResult<RegisterCatalog> {
    RegisterCatalog::new(MULTICUBE_REGS.iter().copied())
}

const MULTICUBE_AMP_REGS: &[&str] = &["current_l1", "current_l2", "current_l3", "current_n"];
const MULTICUBE_PHASE_VOLT_REGS: &[&str] = &["voltage_l1_n", "voltage_l2_n", "voltage_l3_n"];
const MULTICUBE_LINE_VOLT_REGS: &[&str] = &["voltage_l1_l2", "voltage_l2_l3", "voltage_l3_l1"];
const MULTICUBE_POWER_REGS: &[&str] = &[
    "active_power_total", "reactive_power_total", "apparent_power_total",
    "active_power_l1", "active_power_l2", "active_power_l3",
    "apparent_power_l1", "apparent_power_l2", "apparent_power_l3",
    "reactive_power_l1", "reactive_power_l2", "reactive_power_l3",
];
const MULTICUBE_ENERGY_REGS: &[&str] = &["active_net", "apparent_net", "reactive_net"];

/// Scale code → decimal exponent for instantaneous measurements.
fn multicube_measurement_decimals(scale: i64) -> Option<i32> {
    match scale {
        1 => Some(2),
        2 => Some(1),
        3 => Some(0),
        4 => Some(-1),
        5 => Some(-2),
        6 => Some(-3),
        7 => Some(-4),
        _ => None,
    }
}

/// Scale code → decimal exponent for energy counters.
fn multicube_energy_decimals(scale: i64) -> Option<i32> {
    match scale {
        3 => Some(3),
        4 => Some(2),
        5 => Some(1),
        6 => Some(0),
        7 => Some(-1),
        _ => None,
    }
}

/// Read the Multicube's scale registers and rewrite the catalog's decimal
/// exponents to match the installation.
pub async fn multicube_autoscale<T: MeterTransport>(
    client: &mut MeterClient<T>,
) -> MeterResult<()> {
    let groups: [(&str, &[&str]); 4] = [
        ("amps_scale", MULTICUBE_AMP_REGS),
        ("phase_volts_scale", MULTICUBE_PHASE_VOLT_REGS),
        ("line_volts_scale", MULTICUBE_LINE_VOLT_REGS),
        ("power_scale", MULTICUBE_POWER_REGS),
    ];

    for (scale_name, targets) in groups {
        let scale = read_scale(client, scale_name).await?;
        let decimals = multicube_measurement_decimals(scale).ok_or_else(|| {
            MeterError::invalid_data(format!(
                "scale register '{scale_name}' holds out-of-range code {scale}"
            ))
        })?;
        debug!(scale_register = scale_name, code = scale, decimals, "applying device scaling");
        for name in targets {
            client.catalog_mut().set_decimals(name, decimals);
        }
    }

    let scale = read_scale(client, "energy_scale").await?;
    let decimals = multicube_energy_decimals(scale).ok_or_else(|| {
        MeterError::invalid_data(format!(
            "scale register 'energy_scale' holds out-of-range code {scale}"
        ))
    })?;
    debug!(scale_register = "energy_scale", code = scale, decimals, "applying device scaling");
    for name in MULTICUBE_ENERGY_REGS {
        client.catalog_mut().set_decimals(name, decimals);
    }

    Ok(())
}

async fn read_scale<T: MeterTransport>(
    client: &mut MeterClient<T>,
    name: &'static str,
) -> MeterResult<i64> {
    match client.read_one(name).await? {
        Some(value) => Ok(value as i64),
        None => Err(MeterError::invalid_data(format!(
            "scale register '{name}' returned no data"
        ))),
    }
}

// ============================================================================
// Saia S-Bus
// ============================================================================

const SAIA_REGS: &[Register] = &[
    reg("firmware_version", 0, 1, true, 0),
    reg("num_registers", 1, 1, false, 0),
    reg("num_flags", 2, 1, false, 0),
    reg("baudrate", 3, 1, false, 0),
    reg("serial_number", 11, 2, false, 0),
    reg("status_protect", 14, 1, false, 0),
    reg("sbus_timeout", 15, 1, false, 0),
    reg("sbus_address", 16, 1, false, 0),
    reg("error_flags", 17, 1, false, 0),
    reg("tariff", 19, 1, false, 0),
    reg("active_import_tariff_1", 20, 1, false, 2),
    reg("resettable_active_import_t1", 21, 1, false, 2),
    reg("active_import_tariff_2", 22, 1, false, 2),
    reg("resettable_active_import_t2", 23, 1, false, 2),
    reg("voltage_l1_n", 24, 1, false, 0),
    reg("current_l1", 25, 1, false, 1),
    reg("active_power_l1", 26, 1, true, 2),
    reg("reactive_power_l1", 27, 1, true, 2),
    reg("power_factor_l1", 28, 1, true, 2),
    reg("voltage_l2_n", 29, 1, false, 0),
    reg("current_l2", 30, 1, false, 1),
    reg("active_power_l2", 31, 1, true, 2),
    reg("reactive_power_l2", 32, 1, true, 2),
    reg("power_factor_l2", 33, 1, true, 2),
    reg("voltage_l3_n", 34, 1, false, 0),
    reg("current_l3", 35, 1, false, 1),
    reg("active_power_l3", 36, 1, true, 2),
    reg("reactive_power_l3", 37, 1, true, 2),
    reg("power_factor_l3", 38, 1, true, 2),
    reg("active_power_total", 39, 1, true, 2),
    reg("reactive_power_total", 40, 1, true, 2),
];

/// Catalog for Saia-Burgess S-Bus energy meters.
///
/// These devices have no null sentinels and batch at most
/// [`LOW_RES_MAX_SPAN`](crate::batcher::LOW_RES_MAX_SPAN) registers per
/// exchange; pair with an [`RtuTransport`](crate::transport::RtuTransport)
/// capped accordingly and
/// [`MeterProfile::no_nulls`](crate::profile::MeterProfile::no_nulls).
pub fn saia() -> MeterResult<RegisterCatalog> {
    RegisterCatalog::new(SAIA_REGS.iter().copied())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batcher::{AddressWindow, BatchPolicy};
    use crate::profile::MeterProfile;
    use std::collections::HashMap;

    #[test]
    fn test_all_catalogs_construct() {
        assert_eq!(abb(None).unwrap().len(), 259);
        assert_eq!(mem001().unwrap().len(), 37);
        assert_eq!(sma().unwrap().len(), 20);
        assert_eq!(multicube().unwrap().len(), 41);
        assert_eq!(saia().unwrap().len(), 31);
    }

    #[test]
    fn test_abb_model_subsets() {
        assert_eq!(abb(Some("A43")).unwrap().len(), 69);
        assert_eq!(abb(Some("B23")).unwrap().len(), 69);
        assert_eq!(abb(Some("B21")).unwrap().len(), 20);

        let b21 = abb(Some("B21")).unwrap();
        assert!(b21.find("voltage_l1_n").is_some());
        assert!(b21.find("voltage_l2_n").is_none()); // single phase
    }

    #[test]
    fn test_abb_unknown_model_is_error() {
        let err = abb(Some("C11")).unwrap_err();
        assert!(matches!(err, MeterError::InvalidCatalog { .. }));
    }

    #[test]
    fn test_mem001_measurements_are_floats() {
        let cat = mem001().unwrap();
        assert!(cat.find("voltage_l1_n").unwrap().is_float);
        assert!(!cat.find("feeder_1_id").unwrap().is_float);
    }

    #[test]
    fn test_sma_power_factor_carries_correction() {
        let cat = sma().unwrap();
        assert!(cat.find("power_factor_total").unwrap().correction.is_some());
        assert!(cat.find("frequency").unwrap().correction.is_none());
    }

    #[test]
    fn test_sma_power_reported_in_tens_of_watts() {
        let cat = sma().unwrap();
        assert_eq!(cat.find("active_power_total").unwrap().decimals, -1);
    }

    /// Answers each address from a fixed map (missing addresses read as 0).
    struct MapTransport(HashMap<u16, u16>);

    impl MeterTransport for MapTransport {
        fn batch_policy(&self) -> BatchPolicy {
            BatchPolicy::Contiguous
        }

        async fn read_window(&mut self, window: &AddressWindow) -> MeterResult<Vec<u16>> {
            Ok((window.first..window.first + window.count)
                .map(|addr| self.0.get(&addr).copied().unwrap_or(0))
                .collect())
        }
    }

    #[tokio::test]
    async fn test_multicube_autoscale_rewrites_decimals() {
        let transport = MapTransport(HashMap::from([
            (2837, 3), // amps: code 3 -> 0 decimals
            (2838, 2), // phase volts: code 2 -> 1 decimal
            (2839, 5), // line volts: code 5 -> -2 decimals
            (2840, 6), // power: code 6 -> -3 decimals
            (513, 4),  // energy (2-word register at 512): code 4 -> 2 decimals
        ]));
        let mut client =
            MeterClient::new(transport, multicube().unwrap(), MeterProfile::tcp());

        multicube_autoscale(&mut client).await.unwrap();

        let catalog = client.catalog();
        assert_eq!(catalog.find("current_l1").unwrap().decimals, 0);
        assert_eq!(catalog.find("voltage_l1_n").unwrap().decimals, 1);
        assert_eq!(catalog.find("voltage_l1_l2").unwrap().decimals, -2);
        assert_eq!(catalog.find("active_power_total").unwrap().decimals, -3);
        assert_eq!(catalog.find("active_net").unwrap().decimals, 2);
        // Non-scaled registers stay put.
        assert_eq!(catalog.find("power_factor_total").unwrap().decimals, 3);
    }

    #[tokio::test]
    async fn test_multicube_autoscale_rejects_bad_code() {
        // amps_scale reads 0, which maps to nothing.
        let transport = MapTransport(HashMap::new());
        let mut client =
            MeterClient::new(transport, multicube().unwrap(), MeterProfile::tcp());

        let err = multicube_autoscale(&mut client).await.unwrap_err();
        assert!(matches!(err, MeterError::InvalidData { .. }));
    }

    #[test]
    fn test_saia_map_fits_low_res_windows() {
        // The densest run of the Saia map must batch within the 10-register
        // cap without truncation.
        let cat = saia().unwrap();
        let regs = cat.sorted_by_start();
        let plans = crate::batcher::plan_windows(
            &regs,
            BatchPolicy::GapTolerant {
                max_span: crate::batcher::LOW_RES_MAX_SPAN,
            },
        );
        for plan in &plans {
            assert!(plan.window.count <= crate::batcher::LOW_RES_MAX_SPAN);
        }
        let covered: usize = plans.iter().map(|p| p.registers.len()).sum();
        assert_eq!(covered, cat.len());
    }
}
