//! Voltage Meter Demo
//!
//! Demonstrates the voltage_meter library features including:
//! - Register catalogs and model subsets
//! - Read-window planning under both batching policies
//! - Value decoding with null sentinels and decimal scaling
//! - A live SMA meter read when a device is reachable
//!
//! Usage: cargo run --bin demo [meter_address]
//! Example: cargo run --bin demo 192.168.1.50:502

use voltage_meter::{
    models, plan_windows, BatchPolicy, MeterClient, MeterProfile, TcpTransport,
    DEFAULT_MAX_SPAN, DEFAULT_TCP_PORT,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("🔌 Voltage Meter v{} Demo", voltage_meter::VERSION);
    println!("==========================\n");

    // =========================================================================
    // Part 1: Register catalogs (no connection required)
    // =========================================================================
    println!("📋 Part 1: Register Catalogs");
    println!("----------------------------");

    let full = models::abb(None)?;
    let b21 = models::abb(Some("B21"))?;
    println!("  ABB full map: {} registers", full.len());
    println!("  ABB B21 (single phase): {} registers", b21.len());
    println!(
        "  SMA: {} registers, Multicube: {}, Saia: {}",
        models::sma()?.len(),
        models::multicube()?.len(),
        models::saia()?.len()
    );

    // =========================================================================
    // Part 2: Window planning
    // =========================================================================
    println!("\n🪟 Part 2: Read-Window Planning");
    println!("-------------------------------");

    let registers = full.sorted_by_start();
    let serial_plan = plan_windows(
        &registers,
        BatchPolicy::GapTolerant {
            max_span: DEFAULT_MAX_SPAN,
        },
    );
    let tcp_plan = plan_windows(&registers, BatchPolicy::Contiguous);
    println!(
        "  ABB full map ({} registers): {} serial windows, {} TCP windows",
        registers.len(),
        serial_plan.len(),
        tcp_plan.len()
    );
    for plan in serial_plan.iter().take(3) {
        println!(
            "    window @{} x{} covers {} registers",
            plan.window.first,
            plan.window.count,
            plan.registers.len()
        );
    }

    // =========================================================================
    // Part 3: Live SMA read (requires a reachable meter)
    // =========================================================================
    println!("\n📡 Part 3: Live Meter Read");
    println!("--------------------------");

    let address = std::env::args()
        .nth(1)
        .unwrap_or_else(|| format!("127.0.0.1:{DEFAULT_TCP_PORT}"));
    let (host, port) = match address.rsplit_once(':') {
        Some((host, port)) => (host.to_string(), port.parse::<u16>()?),
        None => (address, DEFAULT_TCP_PORT),
    };

    println!("  Connecting to {host}:{port}...");
    let transport = TcpTransport::new(host, port, 126, MeterProfile::sma());
    let mut client = MeterClient::new(transport, models::sma()?, MeterProfile::sma());

    match client
        .read_many(&["voltage_l1_n", "frequency", "active_power_total"])
        .await
    {
        Ok(readings) => {
            for (name, value) in &readings {
                match value {
                    Some(v) => println!("    {name}: {v:.2}"),
                    None => println!("    {name}: no data"),
                }
            }
        }
        Err(e) => {
            println!("  ⚠️  Read failed: {e}");
            println!("  (This is expected if no meter is reachable)");
        }
    }

    println!("\n🎉 Demo completed!");
    Ok(())
}
