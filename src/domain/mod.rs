// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types that describe the dataset, the frozen
// split and the sanity report, plus the traits the other
// layers implement.
//
// Rules for this layer:
//   - NO Burn framework types
//   - NO file I/O
//   - NO tokenizer-specific code
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// The in-memory record table and its text-augmented form
pub mod record;

// The persisted train/validation partition
pub mod split;

// The sanity-check report
pub mod report;

// Core abstractions (traits) that other layers implement
pub mod traits;
