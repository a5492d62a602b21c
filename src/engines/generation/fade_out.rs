/// Decides how many fresh random individuals are injected each generation.
///
/// After scoring, the tracker is shown the ranks of the individuals that were
/// injected in the previous generation. When all of them land in the bottom
/// `injected` ranks the streak grows, otherwise it resets. Once the streak
/// exceeds the patience, injection stops for the rest of the run.
#[derive(Debug, Clone)]
pub struct FadeOutTracker {
    initial_ratio: f64,
    patience: usize,
    consecutive_bottom: usize,
    faded: bool,
}

impl FadeOutTracker {
    pub fn new(initial_ratio: f64, patience: usize) -> Self {
        Self {
            initial_ratio,
            patience,
            consecutive_bottom: 0,
            faded: initial_ratio <= 0.0,
        }
    }

    pub fn ratio(&self) -> f64 {
        if self.faded {
            0.0
        } else {
            self.initial_ratio
        }
    }

    pub fn has_faded(&self) -> bool {
        self.faded
    }

    pub fn consecutive_bottom(&self) -> usize {
        self.consecutive_bottom
    }

    /// Number of slots to refill with random individuals.
    pub fn injection_count(&self, population_size: usize) -> usize {
        (self.ratio() * population_size as f64) as usize
    }

    /// `ranks` are the post-sort positions of last generation's injectees.
    pub fn observe(&mut self, ranks: &[usize], population_size: usize) {
        if self.faded || ranks.is_empty() {
            return;
        }

        let bottom = population_size.saturating_sub(ranks.len());
        if ranks.iter().all(|&rank| rank >= bottom) {
            self.consecutive_bottom += 1;
        } else {
            self.consecutive_bottom = 0;
        }

        if self.consecutive_bottom > self.patience {
            self.faded = true;
            log::debug!(
                "Random injection faded out after {} generations at the bottom",
                self.consecutive_bottom
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fades_after_patience_exceeded() {
        let mut tracker = FadeOutTracker::new(0.1, 2);
        assert_eq!(tracker.injection_count(100), 10);
        for _ in 0..3 {
            tracker.observe(&[95, 99], 100);
        }
        assert!(tracker.has_faded());
        assert_eq!(tracker.injection_count(100), 0);
    }

    #[test]
    fn test_streak_resets_when_injectee_climbs() {
        let mut tracker = FadeOutTracker::new(0.1, 2);
        tracker.observe(&[98, 99], 100);
        tracker.observe(&[98, 99], 100);
        tracker.observe(&[3, 99], 100);
        assert_eq!(tracker.consecutive_bottom(), 0);
        tracker.observe(&[98, 99], 100);
        assert!(!tracker.has_faded());
    }

    #[test]
    fn test_zero_ratio_never_injects() {
        let tracker = FadeOutTracker::new(0.0, 5);
        assert!(tracker.has_faded());
        assert_eq!(tracker.injection_count(1000), 0);
    }
}
