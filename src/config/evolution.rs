use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use crate::error::CistronError;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub max_generations: usize,
    /// Wall-clock bound checked at generation boundaries.
    pub time_limit_secs: Option<u64>,
    pub max_draw_attempts: usize,
    pub max_reproduction_attempts: usize,
    pub reproduction_fraction: f64,
    pub random_injection_ratio: f64,
    /// Generations the injected individuals may sit at the bottom before
    /// injection is switched off.
    pub fade_out_patience: usize,
    pub hall_of_fame_size: usize,
    pub parallel_scoring: bool,
    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 100,
            time_limit_secs: None,
            max_draw_attempts: 100,
            max_reproduction_attempts: 20,
            reproduction_fraction: 0.6,
            random_injection_ratio: 0.05,
            fade_out_patience: 5,
            hall_of_fame_size: 10,
            parallel_scoring: false,
            seed: None,
        }
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), CistronError> {
        if self.population_size < 3 {
            return Err(CistronError::Configuration(
                "Population size must be at least 3".to_string()
            ));
        }
        if self.reproduction_fraction <= 0.0 || self.reproduction_fraction >= 1.0 {
            return Err(CistronError::Configuration(
                "Reproduction fraction must be between 0 and 1 (exclusive)".to_string()
            ));
        }
        if self.random_injection_ratio < 0.0 || self.random_injection_ratio >= 1.0 {
            return Err(CistronError::Configuration(
                "Random injection ratio must be in [0, 1)".to_string()
            ));
        }
        if self.reproduction_fraction + self.random_injection_ratio >= 1.0 {
            return Err(CistronError::Configuration(
                "Reproduction fraction plus injection ratio must leave survivors".to_string()
            ));
        }
        if self.max_draw_attempts == 0 || self.max_reproduction_attempts == 0 {
            return Err(CistronError::Configuration(
                "Attempt budgets must be at least 1".to_string()
            ));
        }
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Evolution".to_string(),
            fields: vec![
                FieldManifest::new(
                    "population_size",
                    "integer",
                    json!(100),
                    (Some(3.0), Some(100_000.0)),
                    "Number of genomes in the population",
                ),
                FieldManifest::new(
                    "max_generations",
                    "integer",
                    json!(100),
                    (Some(1.0), None),
                    "Generation bound of a run",
                ),
                FieldManifest::new(
                    "time_limit_secs",
                    "integer",
                    json!(null),
                    (Some(0.0), None),
                    "Optional wall-clock bound in seconds",
                ),
                FieldManifest::new(
                    "max_draw_attempts",
                    "integer",
                    json!(100),
                    (Some(1.0), None),
                    "Attempts to draw one viable random genome",
                ),
                FieldManifest::new(
                    "max_reproduction_attempts",
                    "integer",
                    json!(20),
                    (Some(1.0), None),
                    "Attempts per mating pair before it is dropped",
                ),
                FieldManifest::new(
                    "reproduction_fraction",
                    "float",
                    json!(0.6),
                    (Some(0.0), Some(1.0)),
                    "Fraction of the population replaced by offspring",
                ),
                FieldManifest::new(
                    "random_injection_ratio",
                    "float",
                    json!(0.05),
                    (Some(0.0), Some(1.0)),
                    "Fraction of the population replaced by random genomes",
                ),
                FieldManifest::new(
                    "fade_out_patience",
                    "integer",
                    json!(5),
                    (Some(0.0), None),
                    "Generations random genomes may rank last before injection stops",
                ),
                FieldManifest::new(
                    "hall_of_fame_size",
                    "integer",
                    json!(10),
                    (Some(0.0), None),
                    "Number of best genomes retained",
                ),
                FieldManifest::new(
                    "parallel_scoring",
                    "boolean",
                    json!(false),
                    (None, None),
                    "Score the population on the rayon thread pool",
                ),
                FieldManifest::new(
                    "seed",
                    "integer",
                    json!(null),
                    (Some(0.0), None),
                    "Seed for reproducible runs",
                ),
            ],
        }
    }
}
