// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs and traits that describe the core concepts
// of the system: a pair of code blocks, its encoded form, and
// the capabilities the pipeline needs from the outside world.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// A pair of code blocks (one row of a dataset) and its encoded form
pub mod block_pair;

// Core abstractions (traits) that other layers implement
pub mod traits;
