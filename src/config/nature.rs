use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use crate::error::CistronError;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NatureConfig {
    pub start_codon_bit_count: u32,
    pub stop_codon_bit_count: u32,
    pub stop_codon: u64,
    pub minimum_mutations_per_offspring: usize,
    pub minimum_insertions_per_offspring: usize,
    pub minimum_removals_per_offspring: usize,
    /// Upper bound on the random payload drawn for a freshly seeded cistron.
    pub max_random_cistron_bits: u64,
}

impl Default for NatureConfig {
    fn default() -> Self {
        Self {
            start_codon_bit_count: 16,
            stop_codon_bit_count: 16,
            stop_codon: 1,
            minimum_mutations_per_offspring: 1,
            minimum_insertions_per_offspring: 1,
            minimum_removals_per_offspring: 1,
            max_random_cistron_bits: 10_000,
        }
    }
}

impl NatureConfig {
    /// All rate floors at zero; used when the caller wants mutation to be
    /// driven purely by the decoded rates.
    pub fn without_minimums() -> Self {
        Self {
            minimum_mutations_per_offspring: 0,
            minimum_insertions_per_offspring: 0,
            minimum_removals_per_offspring: 0,
            ..Self::default()
        }
    }
}

impl ConfigSection for NatureConfig {
    fn section_name() -> &'static str {
        "nature"
    }

    fn validate(&self) -> Result<(), CistronError> {
        for (name, width) in [
            ("start_codon_bit_count", self.start_codon_bit_count),
            ("stop_codon_bit_count", self.stop_codon_bit_count),
        ] {
            if !(2..=64).contains(&width) {
                return Err(CistronError::Configuration(format!(
                    "{} must be between 2 and 64, got {}",
                    name, width
                )));
            }
        }
        if self.stop_codon == 0 {
            return Err(CistronError::Configuration(
                "Stop codon must be non-zero".to_string(),
            ));
        }
        if self.stop_codon_bit_count < 64 && self.stop_codon >> self.stop_codon_bit_count != 0 {
            return Err(CistronError::Configuration(format!(
                "Stop codon {} does not fit in {} bits",
                self.stop_codon, self.stop_codon_bit_count
            )));
        }
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Nature".to_string(),
            fields: vec![
                FieldManifest::new(
                    "start_codon_bit_count",
                    "integer",
                    json!(16),
                    (Some(2.0), Some(64.0)),
                    "Bit width of start codons",
                ),
                FieldManifest::new(
                    "stop_codon_bit_count",
                    "integer",
                    json!(16),
                    (Some(2.0), Some(64.0)),
                    "Bit width of the stop codon",
                ),
                FieldManifest::new(
                    "stop_codon",
                    "integer",
                    json!(1),
                    (Some(1.0), None),
                    "Reserved stop codon value",
                ),
                FieldManifest::new(
                    "minimum_mutations_per_offspring",
                    "integer",
                    json!(1),
                    (Some(0.0), None),
                    "Floor on bit flips per reproduction",
                ),
                FieldManifest::new(
                    "minimum_insertions_per_offspring",
                    "integer",
                    json!(1),
                    (Some(0.0), None),
                    "Floor on bit insertions per reproduction",
                ),
                FieldManifest::new(
                    "minimum_removals_per_offspring",
                    "integer",
                    json!(1),
                    (Some(0.0), None),
                    "Floor on bit removals per reproduction",
                ),
                FieldManifest::new(
                    "max_random_cistron_bits",
                    "integer",
                    json!(10_000),
                    (Some(0.0), None),
                    "Cap on random payload length when seeding",
                ),
            ],
        }
    }
}
