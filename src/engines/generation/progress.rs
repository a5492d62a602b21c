pub trait ProgressCallback: Send {
    fn on_generation_start(&mut self, generation: usize);
    fn on_generation_complete(&mut self, generation: usize, best_score: f64, hall_of_fame_size: usize);
    fn on_individual_scored(&mut self, individual: usize, total: usize);

    /// Persistence hook invoked once a run ends; the engine itself stores nothing.
    fn on_save(&mut self, _generation: usize, _best_score: f64) {}
}

impl<C: ProgressCallback + ?Sized> ProgressCallback for &mut C {
    fn on_generation_start(&mut self, generation: usize) {
        (**self).on_generation_start(generation);
    }

    fn on_generation_complete(&mut self, generation: usize, best_score: f64, hof_size: usize) {
        (**self).on_generation_complete(generation, best_score, hof_size);
    }

    fn on_individual_scored(&mut self, individual: usize, total: usize) {
        (**self).on_individual_scored(individual, total);
    }

    fn on_save(&mut self, generation: usize, best_score: f64) {
        (**self).on_save(generation, best_score);
    }
}

pub struct LogProgressCallback;

impl ProgressCallback for LogProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        log::debug!("Generation {} starting...", generation + 1);
    }

    fn on_generation_complete(&mut self, generation: usize, best_score: f64, hof_size: usize) {
        log::info!(
            "Generation {} complete. Best score: {:.4}, Hall of Fame size: {}",
            generation + 1, best_score, hof_size
        );
    }

    fn on_individual_scored(&mut self, individual: usize, total: usize) {
        if individual % 50 == 0 || individual == total {
            log::trace!("  Scored {}/{} individuals", individual, total);
        }
    }

    fn on_save(&mut self, generation: usize, best_score: f64) {
        log::debug!("Nothing to save after generation {} (best {:.4})", generation + 1, best_score);
    }
}

/// Callback that ignores every event.
pub struct SilentProgressCallback;

impl ProgressCallback for SilentProgressCallback {
    fn on_generation_start(&mut self, _generation: usize) {}
    fn on_generation_complete(&mut self, _generation: usize, _best_score: f64, _hof_size: usize) {}
    fn on_individual_scored(&mut self, _individual: usize, _total: usize) {}
}

// For forwarding progress to another thread
pub struct IpcProgressCallback {
    sender: std::sync::mpsc::Sender<ProgressMessage>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressMessage {
    GenerationStart(usize),
    GenerationComplete { generation: usize, best_score: f64, hof_size: usize },
    IndividualScored { current: usize, total: usize },
    Saved { generation: usize, best_score: f64 },
}

impl IpcProgressCallback {
    pub fn new(sender: std::sync::mpsc::Sender<ProgressMessage>) -> Self {
        Self { sender }
    }
}

impl ProgressCallback for IpcProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        let _ = self.sender.send(ProgressMessage::GenerationStart(generation));
    }

    fn on_generation_complete(&mut self, generation: usize, best_score: f64, hof_size: usize) {
        let _ = self.sender.send(ProgressMessage::GenerationComplete {
            generation,
            best_score,
            hof_size,
        });
    }

    fn on_individual_scored(&mut self, individual: usize, total: usize) {
        let _ = self.sender.send(ProgressMessage::IndividualScored {
            current: individual,
            total,
        });
    }

    fn on_save(&mut self, generation: usize, best_score: f64) {
        let _ = self.sender.send(ProgressMessage::Saved { generation, best_score });
    }
}
