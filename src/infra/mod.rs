// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by more than one workflow:
//
//   tokenizer_store.rs — finds a tokenizer by path or hub name,
//                        or builds a word-level one from the
//                        training texts, and wraps it as a
//                        TextEncoder with fixed truncation and
//                        padding.
//
//   config_store.rs    — saves and loads PrepConfig as JSON so
//                        a later run rebuilds the same loaders.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// Tokenizer resolution, building and encoding
pub mod tokenizer_store;

/// PrepConfig persistence
pub mod config_store;
