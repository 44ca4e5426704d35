//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `coosenote_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    // Why: keep a tiny CLI probe to validate core crate wiring independently
    // from the host UI and FFI runtime setup.
    println!("coosenote_core ping={}", coosenote_core::ping());
    println!("coosenote_core version={}", coosenote_core::core_version());
}
