pub mod cistron_spec;
pub mod nature;
pub mod operators;
pub mod chromosome;
pub mod diploid;
pub mod genome;
pub mod seeding;
pub mod fade_out;
pub mod hall_of_fame;
pub mod evolution_engine;
pub mod progress;

pub use cistron_spec::CistronSpec;
pub use nature::{CistronMatch, CodonMatch, Nature};
pub use operators::MutationParameters;
pub use chromosome::{Chromosome, FoundCistron, Ploidy};
pub use diploid::DiploidChromosome;
pub use genome::{DiploidGenome, Genome, HaploidGenome};
pub use seeding::{create_random_diploid, create_random_haploid};
pub use fade_out::FadeOutTracker;
pub use hall_of_fame::{EliteGenome, HallOfFame};
pub use evolution_engine::{
    EvolutionEngine, EvolutionReport, FitnessFunction, Individual, Origin, ReproductionStats,
};
pub use progress::{IpcProgressCallback, LogProgressCallback, ProgressCallback, ProgressMessage, SilentProgressCallback};
