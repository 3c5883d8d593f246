//! Integration tests for Layer 3: Runtime
//!
//! Tests for network parsing, model snapshots, classification, dice, and rendering.

mod classifier;
mod dice;
mod networks;
mod snapshots;

/// Sprinkler-style network with deterministic `D`.
pub const NETWORK: &str = "// test network
network unknown {
}
variable A {
  type discrete [ 2 ] { yes, no };
}
variable B {
  type discrete [ 2 ] { yes, no };
}
variable C {
  type discrete [ 2 ] { yes, no };
}
variable D {
  type discrete [ 2 ] { yes, no };
}
probability ( A ) {
  table 0.01, 0.99;
}
probability ( C | B ) {
  (yes) 0.05, 0.95;
  (no) 0.01, 0.99;
}
probability ( B ) {
  table 0.5, 0.5;
}
probability ( D | B, A ) {
  (yes, yes) 1.0, 0.0;
  (no, yes) 1.0, 0.0;
  (yes, no) 1.0, 0.0;
  (no, no) 0.0, 1.0;
}
";
