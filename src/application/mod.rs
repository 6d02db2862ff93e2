// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers into the three workflows the
// CLI exposes: freeze a split, check it, build loaders.
//
// Rules for this layer:
//   - No sampling or tokenizing logic here (Layers 4 and 6)
//   - No printing here (that's Layer 1)
//   - Only workflow coordination and error context
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Every tunable of a preparation run
pub mod prep_config;

// Load the raw table and freeze the stratified split
pub mod freeze_use_case;

// Sanity check a table against its frozen split
pub mod check_use_case;

// Resolve the tokenizer and build train/val loaders
pub mod loader_use_case;
