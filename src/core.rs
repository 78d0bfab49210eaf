//! Core functionality used across the crate.

pub mod nucleotide;
pub mod strand;

pub use strand::Strand;
