//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `daycycle_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("daycycle_core ping={}", daycycle_core::ping());
    println!("daycycle_core version={}", daycycle_core::core_version());
}
