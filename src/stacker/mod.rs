//! Stack Assembly Engine
//!
//! - [`key`]: grouping key and role derivation from filename patterns
//! - [`candidate`]: a prospective stack under one key
//! - [`assembler`]: candidate accumulation, classification and apply
//! - [`stats`]: per-run outcome counters
//! - [`runner`]: a complete run from version check to report

pub mod assembler;
pub mod candidate;
pub mod key;
pub mod runner;
pub mod stats;

pub use assembler::{CandidateSet, StackAssembler, StackMode};
pub use candidate::CandidateStack;
pub use key::{derive_key, MatchRules, Placement, Role};
pub use runner::{RunError, RunReport, Stacker};
pub use stats::RunStats;
