//! Process exit codes. Part of the public contract of the `bagprofile` binary.

pub const COMPLIANT: i32 = 0;
pub const NON_COMPLIANT: i32 = 1; // At least one rule violation
pub const INTERNAL_ERROR: i32 = 2; // Invalid configuration, catalog or engine failure
pub const REJECTED: i32 = 3; // Bag missing/unreadable or context unavailable
