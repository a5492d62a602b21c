//! Evolution over variable-length bit chromosomes whose cistrons are located
//! by start and stop codons and decoded through a per-allele schema.

pub mod config;
pub mod decoders;
pub mod encoding;
pub mod engines;
pub mod error;
pub mod types;

pub use error::{CistronError, Result};
pub use types::{Allele, Value};
