use cistron::config::{ConfigManager, ConfigSection, EvolutionConfig, NatureConfig};
use std::io::Write;
use tempfile::{Builder, NamedTempFile};

fn toml_file(contents: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_save_then_load_round_trips() {
    println!("\n=== Config file round trip ===");

    let manager = ConfigManager::new();
    manager
        .update(|config| {
            config.evolution.population_size = 64;
            config.evolution.seed = Some(1234);
            config.nature.start_codon_bit_count = 20;
        })
        .unwrap();

    let file = Builder::new().suffix(".toml").tempfile().unwrap();
    manager.save_to_file(file.path()).unwrap();

    let loaded = ConfigManager::new();
    loaded.load_from_file(file.path()).unwrap();
    let config = loaded.get();

    assert_eq!(config.evolution.population_size, 64);
    assert_eq!(config.evolution.seed, Some(1234));
    assert_eq!(config.evolution.time_limit_secs, None);
    assert_eq!(config.nature.start_codon_bit_count, 20);
    println!("✓ Saved and reloaded {}", file.path().display());
}

#[test]
fn test_partial_file_keeps_defaults() {
    let file = toml_file(
        r#"
[evolution]
max_generations = 12
reproduction_fraction = 0.5
"#,
    );

    let manager = ConfigManager::new();
    manager.load_from_file(file.path()).unwrap();
    let config = manager.get();

    assert_eq!(config.evolution.max_generations, 12);
    assert_eq!(config.evolution.reproduction_fraction, 0.5);
    assert_eq!(config.evolution.population_size, EvolutionConfig::default().population_size);
    assert_eq!(config.nature.stop_codon, NatureConfig::default().stop_codon);
}

#[test]
fn test_invalid_file_is_rejected_and_config_kept() {
    let file = toml_file(
        r#"
[nature]
start_codon_bit_count = 1
"#,
    );

    let manager = ConfigManager::new();
    assert!(manager.load_from_file(file.path()).is_err());
    assert_eq!(manager.get().nature.start_codon_bit_count, 16);
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let manager = ConfigManager::new();
    assert!(manager.load_from_file(dir.path().join("absent.toml")).is_err());
}

#[test]
fn test_update_rolls_back_on_validation_failure() {
    let manager = ConfigManager::new();
    let result = manager.update(|config| {
        config.evolution.reproduction_fraction = 0.9;
        config.evolution.random_injection_ratio = 0.2;
    });

    assert!(result.is_err());
    assert_eq!(manager.get().evolution.reproduction_fraction, 0.6);
}

#[test]
fn test_stop_codon_must_fit_its_width() {
    let config = NatureConfig {
        stop_codon_bit_count: 4,
        stop_codon: 16,
        ..NatureConfig::default()
    };
    assert!(config.validate().is_err());

    let config = NatureConfig {
        stop_codon: 0,
        ..NatureConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_manifests_list_every_field() {
    let nature = NatureConfig::default().to_manifest();
    let evolution = EvolutionConfig::default().to_manifest();

    assert_eq!(NatureConfig::section_name(), "nature");
    assert_eq!(EvolutionConfig::section_name(), "evolution");
    assert_eq!(nature.fields.len(), 7);
    assert_eq!(evolution.fields.len(), 11);

    let ratio = evolution.field("random_injection_ratio").unwrap();
    assert_eq!(ratio.field_type, "float");
    assert_eq!(ratio.default, serde_json::json!(0.05));
    assert!(nature.field("population_size").is_none());
}
