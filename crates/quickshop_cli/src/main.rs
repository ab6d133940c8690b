//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `quickshop_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("quickshop_core ping={}", quickshop_core::ping());
    println!("quickshop_core version={}", quickshop_core::core_version());
}
