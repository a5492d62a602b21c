use crate::config::{ConfigSection, EvolutionConfig};
use crate::engines::generation::{
    chromosome::Ploidy,
    fade_out::FadeOutTracker,
    genome::Genome,
    hall_of_fame::{EliteGenome, HallOfFame},
    nature::Nature,
    operators::draw_mating_pair,
    progress::ProgressCallback,
};
use crate::error::{CistronError, Result};
use crate::types::Value;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Scores the decoded values of one genome; higher is better.
pub trait FitnessFunction: Send + Sync {
    fn score(&self, values: &[Option<Value>]) -> f64;
}

impl<F> FitnessFunction for F
where
    F: Fn(&[Option<Value>]) -> f64 + Send + Sync,
{
    fn score(&self, values: &[Option<Value>]) -> f64 {
        self(values)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Drawn for the initial population.
    Seeded,
    Bred,
    /// Drawn at random to replace the bottom of a later generation.
    Injected,
}

#[derive(Debug, Clone)]
pub struct Individual<P: Ploidy> {
    pub genome: Genome<P>,
    score: Option<f64>,
    pub origin: Origin,
    /// Generation in which the individual is first scored.
    pub introduced_at: usize,
}

impl<P: Ploidy> Individual<P> {
    fn new(genome: Genome<P>, origin: Origin, introduced_at: usize) -> Self {
        Self {
            genome,
            score: None,
            origin,
            introduced_at,
        }
    }

    /// Score of the individual; unscored and NaN scores rank last.
    pub fn score(&self) -> f64 {
        match self.score {
            Some(score) if !score.is_nan() => score,
            _ => f64::NEG_INFINITY,
        }
    }

    pub fn is_scored(&self) -> bool {
        self.score.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReproductionStats {
    pub succeeded: usize,
    /// Mating pairs dropped after exhausting their attempts.
    pub failed: usize,
    pub generations_with_failures: usize,
}

#[derive(Debug, Clone)]
pub struct EvolutionReport {
    /// Running maximum of the best score, one entry per scored generation.
    pub best_scores: Vec<f64>,
    pub generations_completed: usize,
    pub cancelled: bool,
    pub elapsed: Duration,
    pub stats: ReproductionStats,
}

impl EvolutionReport {
    pub fn best_score(&self) -> Option<f64> {
        self.best_scores.last().copied()
    }
}

pub struct EvolutionEngine<P: Ploidy, F: FitnessFunction> {
    config: EvolutionConfig,
    nature: Arc<Nature>,
    fitness: F,
    rng: ChaCha8Rng,
    population: Vec<Individual<P>>,
    hall_of_fame: HallOfFame<P>,
    fade_out: FadeOutTracker,
    stats: ReproductionStats,
    best_scores: Vec<f64>,
    generation: usize,
    last_offspring: usize,
    last_injected: usize,
}

impl<P: Ploidy, F: FitnessFunction> EvolutionEngine<P, F> {
    pub fn new(nature: Arc<Nature>, config: EvolutionConfig, fitness: F) -> Result<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Ok(Self {
            hall_of_fame: HallOfFame::new(config.hall_of_fame_size),
            fade_out: FadeOutTracker::new(config.random_injection_ratio, config.fade_out_patience),
            config,
            nature,
            fitness,
            rng,
            population: Vec::new(),
            stats: ReproductionStats::default(),
            best_scores: Vec::new(),
            generation: 0,
            last_offspring: 0,
            last_injected: 0,
        })
    }

    /// Runs until `max_generations` more generations are scored, the time
    /// limit passes, or `cancel` is raised. Partial results are kept in every
    /// case; calling `run` again continues from the current population.
    pub fn run<C: ProgressCallback>(
        &mut self,
        mut callback: C,
        cancel: Option<&AtomicBool>,
    ) -> Result<EvolutionReport> {
        let started = Instant::now();
        let time_limit = self.config.time_limit_secs.map(Duration::from_secs);
        let mut cancelled = false;
        let mut completed = 0;

        if self.population.is_empty() {
            self.populate()?;
        }

        while completed < self.config.max_generations {
            if cancel.map_or(false, |flag| flag.load(Ordering::Relaxed)) {
                log::warn!("Evolution cancelled before generation {}", self.generation + 1);
                cancelled = true;
                break;
            }
            if time_limit.map_or(false, |limit| started.elapsed() >= limit) {
                log::info!("Time limit reached after {} generations", completed);
                break;
            }

            callback.on_generation_start(self.generation);
            self.score_population(&mut callback)?;
            self.observe_injectees();
            let best = self.record_generation();
            callback.on_generation_complete(self.generation, best, self.hall_of_fame.len());

            completed += 1;
            self.generation += 1;
            if completed < self.config.max_generations {
                self.breed()?;
            }
        }

        let report = EvolutionReport {
            best_scores: self.best_scores.clone(),
            generations_completed: completed,
            cancelled,
            elapsed: started.elapsed(),
            stats: self.stats,
        };
        if let Some(best) = report.best_score() {
            callback.on_save(self.generation.saturating_sub(1), best);
        }
        Ok(report)
    }

    /// A random genome that interprets without inviability.
    fn draw_viable(&mut self) -> Result<Genome<P>> {
        let attempts = self.config.max_draw_attempts;
        for attempt in 1..=attempts {
            let genome = Genome::<P>::random(&self.nature, &mut self.rng);
            let outcome = genome.interpret().map(|_| ());
            match outcome {
                Ok(()) => return Ok(genome),
                Err(e) if e.is_inviable() => {
                    log::debug!("Random draw {}/{} inviable: {}", attempt, attempts, e);
                }
                Err(e) => return Err(e),
            }
        }
        Err(CistronError::PopulationDrawExhausted { attempts })
    }

    fn populate(&mut self) -> Result<()> {
        let size = self.config.population_size;
        let mut population = Vec::with_capacity(size);
        for _ in 0..size {
            let genome = self.draw_viable()?;
            population.push(Individual::new(genome, Origin::Seeded, self.generation));
        }
        self.population = population;
        log::debug!("Drew initial population of {}", size);
        Ok(())
    }

    fn score_population<C: ProgressCallback>(&mut self, callback: &mut C) -> Result<()> {
        let fitness = &self.fitness;
        let score = |individual: &Individual<P>| -> Result<Option<f64>> {
            if individual.is_scored() {
                return Ok(None);
            }
            let values = individual.genome.interpret()?;
            Ok(Some(fitness.score(values)))
        };

        let scores: Vec<Result<Option<f64>>> = if self.config.parallel_scoring {
            self.population.par_iter().map(score).collect()
        } else {
            self.population.iter().map(score).collect()
        };

        let total = self.population.len();
        for (index, (individual, score)) in self.population.iter_mut().zip(scores).enumerate() {
            if let Some(score) = score? {
                individual.score = Some(score);
            }
            callback.on_individual_scored(index + 1, total);
        }

        self.population
            .sort_by(|a, b| b.score().total_cmp(&a.score()));
        Ok(())
    }

    fn observe_injectees(&mut self) {
        let ranks: Vec<usize> = self
            .population
            .iter()
            .enumerate()
            .filter(|(_, ind)| ind.origin == Origin::Injected && ind.introduced_at == self.generation)
            .map(|(rank, _)| rank)
            .collect();
        let was_faded = self.fade_out.has_faded();
        self.fade_out.observe(&ranks, self.population.len());
        if !was_faded && self.fade_out.has_faded() {
            log::info!("Random injection switched off at generation {}", self.generation + 1);
        }
    }

    /// Updates the score history and hall of fame; returns the running best.
    fn record_generation(&mut self) -> f64 {
        let scores: Vec<f64> = self.population.iter().map(Individual::score).collect();
        let top = scores.first().copied().unwrap_or(f64::NEG_INFINITY);
        let finite: Vec<f64> = scores.iter().copied().filter(|s| s.is_finite()).collect();
        let mean = finite.iter().sum::<f64>() / finite.len().max(1) as f64;
        let variance = finite.iter().map(|s| (s - mean).powi(2)).sum::<f64>()
            / finite.len().max(1) as f64;
        let max_length = self
            .population
            .iter()
            .map(|ind| ind.genome.max_length())
            .max()
            .unwrap_or(0);

        log::info!(
            "Generation {}: best {:.4}, mean {:.4}, std {:.4}, max length {}, offspring {}, injected {}",
            self.generation + 1,
            top,
            mean,
            variance.sqrt(),
            max_length,
            self.last_offspring,
            self.last_injected
        );

        for individual in self.population.iter().take(self.config.hall_of_fame_size) {
            self.hall_of_fame.try_add(EliteGenome::new(
                individual.genome.clone(),
                individual.score(),
                individual.introduced_at,
            ));
        }

        let best = match self.best_scores.last() {
            Some(&previous) if previous >= top => previous,
            _ => top,
        };
        self.best_scores.push(best);
        best
    }

    /// Replaces the bottom of the sorted population with offspring and then
    /// with fresh random individuals.
    fn breed(&mut self) -> Result<()> {
        let size = self.population.len();
        let injected = self.fade_out.injection_count(size);
        let requested = (self.config.reproduction_fraction * size as f64) as usize;
        let requested = requested.min(size - injected);

        let mut offspring = Vec::with_capacity(requested);
        let mut failed = 0;
        for _ in 0..requested {
            match self.mate()? {
                Some(genome) => offspring.push(genome),
                None => failed += 1,
            }
        }

        self.stats.succeeded += offspring.len();
        self.stats.failed += failed;
        if failed > 0 {
            self.stats.generations_with_failures += 1;
        }
        if requested > 0 && failed * 2 > requested {
            log::warn!(
                "{} of {} reproductions failed in generation {}",
                failed,
                requested,
                self.generation
            );
        }

        let offspring_start = size - injected - offspring.len();
        self.last_offspring = offspring.len();
        for (slot, genome) in (offspring_start..).zip(offspring) {
            self.population[slot] = Individual::new(genome, Origin::Bred, self.generation);
        }

        for slot in size - injected..size {
            let genome = self.draw_viable()?;
            self.population[slot] = Individual::new(genome, Origin::Injected, self.generation);
        }
        self.last_injected = injected;
        Ok(())
    }

    /// One viable offspring of a biased mating pair, or `None` once the
    /// attempt budget is spent.
    fn mate(&mut self) -> Result<Option<Genome<P>>> {
        let (first, second) = draw_mating_pair(self.population.len(), &mut self.rng);
        let attempts = self.config.max_reproduction_attempts;
        for attempt in 1..=attempts {
            let parent = &self.population[first].genome;
            let mate = &self.population[second].genome;
            let child = parent.reproduce_with(mate, &mut self.rng)?;
            let outcome = child.interpret().map(|_| ());
            match outcome {
                Ok(()) => return Ok(Some(child)),
                Err(e) if e.is_inviable() => {
                    log::debug!(
                        "Offspring of ranks {} and {} inviable (attempt {}/{}): {}",
                        first,
                        second,
                        attempt,
                        attempts,
                        e
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    pub fn nature(&self) -> &Arc<Nature> {
        &self.nature
    }

    /// Sorted best-first as of the last scoring.
    pub fn population(&self) -> &[Individual<P>] {
        &self.population
    }

    pub fn best(&self) -> Option<&Individual<P>> {
        self.population.iter().filter(|ind| ind.is_scored()).max_by(|a, b| a.score().total_cmp(&b.score()))
    }

    pub fn get_hall_of_fame(&self) -> &HallOfFame<P> {
        &self.hall_of_fame
    }

    pub fn stats(&self) -> ReproductionStats {
        self.stats
    }

    pub fn best_scores(&self) -> &[f64] {
        &self.best_scores
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn fade_out(&self) -> &FadeOutTracker {
        &self.fade_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NatureConfig;
    use crate::decoders::UniformFloatDecoder;
    use crate::engines::generation::{Chromosome, CistronSpec, SilentProgressCallback};
    use crate::types::Allele;

    fn create_engine(seed: u64) -> EvolutionEngine<Chromosome, impl FitnessFunction> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let specs = vec![CistronSpec::new(Allele::Custom(1), UniformFloatDecoder::new(0.0, 10.0))];
        let nature = Nature::new(specs, NatureConfig::default(), &mut rng).unwrap();
        let config = EvolutionConfig {
            population_size: 20,
            max_reproduction_attempts: 1,
            random_injection_ratio: 0.0,
            seed: Some(seed),
            ..EvolutionConfig::default()
        };
        let fitness = |values: &[Option<Value>]| {
            10.0 - values[0].as_ref().and_then(Value::as_f64).unwrap_or(10.0)
        };
        EvolutionEngine::new(nature, config, fitness).unwrap()
    }

    #[test]
    fn test_offspring_fill_the_bottom_when_matings_fail() {
        let mut partial_failures = 0;

        for seed in 0..20 {
            let mut engine = create_engine(seed);
            engine.populate().unwrap();
            engine.score_population(&mut SilentProgressCallback).unwrap();
            engine.breed().unwrap();

            let size = engine.population.len();
            let bred = engine.stats.succeeded;
            assert_eq!(engine.last_offspring, bred);
            for (slot, individual) in engine.population.iter().enumerate() {
                let expected = if slot >= size - bred { Origin::Bred } else { Origin::Seeded };
                assert_eq!(individual.origin, expected, "seed {} slot {}", seed, slot);
            }

            if engine.stats.failed > 0 && bred > 0 {
                partial_failures += 1;
            }
        }

        assert!(partial_failures > 0, "no seed produced a partial failure");
    }
}
