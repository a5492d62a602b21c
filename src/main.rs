use anyhow::{Context, Result};
use cistron::config::ConfigManager;
use cistron::decoders::UniformFloatDecoder;
use cistron::engines::generation::{
    Chromosome, CistronSpec, EvolutionEngine, HaploidGenome, LogProgressCallback, Nature,
};
use cistron::types::{Allele, Value};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const TARGET: Allele = Allele::Custom(1);

/// Evolves a single byte-coded float in [0, 10] towards zero.
fn main() -> Result<()> {
    env_logger::init();

    let manager = ConfigManager::new();
    if let Some(path) = std::env::args().nth(1) {
        manager
            .load_from_file(&path)
            .with_context(|| format!("failed to load configuration from {}", path))?;
    }
    let config = manager.get();

    let mut rng = match config.evolution.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    let specs = vec![CistronSpec::new(TARGET, UniformFloatDecoder::new(0.0, 10.0))];
    let nature = Nature::with_defaults(specs, config.nature.clone(), &mut rng)?;

    let fitness = |values: &[Option<Value>]| {
        10.0 - values[0].as_ref().and_then(Value::as_f64).unwrap_or(10.0)
    };
    let mut engine = EvolutionEngine::<Chromosome, _>::new(nature, config.evolution, fitness)?;
    let report = engine.run(LogProgressCallback, None)?;

    let best: Option<&HaploidGenome> = engine.best().map(|ind| &ind.genome);
    let value = match best {
        Some(genome) => genome.value_of(TARGET)?.and_then(Value::as_f64),
        None => None,
    };

    println!(
        "Completed {} generations in {:.2?}",
        report.generations_completed, report.elapsed
    );
    match (report.best_score(), value) {
        (Some(score), Some(value)) => println!("Best score {:.4} at value {:.4}", score, value),
        _ => println!("No individual was scored"),
    }
    println!(
        "Offspring: {} succeeded, {} failed",
        report.stats.succeeded, report.stats.failed
    );
    Ok(())
}
