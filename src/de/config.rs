//! Engine and restart-runner configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Construction options for a single
/// [`DifferentialEvolver`](super::DifferentialEvolver).
///
/// # Examples
///
/// ```
/// use u_diffevo::de::EvolverConfig;
///
/// let config = EvolverConfig::default().with_untouchable(2).with_seed(7);
/// assert_eq!(config.untouchable, 2);
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EvolverConfig {
    /// Number of trailing individuals that steps never overwrite.
    ///
    /// They still serve as mutation donors.
    pub untouchable: usize,

    /// Random seed for reproducibility. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl EvolverConfig {
    pub fn with_untouchable(mut self, n: usize) -> Self {
        self.untouchable = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Configuration for the restart runner.
///
/// A run is a sequence of *meta-epochs*. Each meta-epoch builds a fresh
/// engine around the best candidate found so far and steps it for a
/// number of epochs that grows geometrically from one meta-epoch to the
/// next. Crossover probability and force are redrawn for every step.
///
/// # Examples
///
/// ```
/// use u_diffevo::de::DeConfig;
///
/// let config = DeConfig::default()
///     .with_meta_epochs(5)
///     .with_initial_epochs(2_000)
///     .with_population_range(20, 60)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeConfig {
    /// Number of meta-epochs (independent engines run in sequence).
    pub meta_epochs: usize,

    /// Steps in the first meta-epoch.
    pub initial_epochs: usize,

    /// Factor applied to the epoch count after each meta-epoch.
    pub epoch_growth: f64,

    /// Upper bound on the epoch count of any meta-epoch.
    pub max_epochs: usize,

    /// Half-open range `[min, max)` the population size is drawn from.
    pub population_range: (usize, usize),

    /// Half-open range the per-step crossover probability is drawn from.
    pub crossover_range: (f64, f64),

    /// Half-open range the per-step mutation force is drawn from.
    pub force_range: (f64, f64),

    /// Steps between checkpoints. At a checkpoint the engine's best is
    /// compared with the overall best, and on a miss a fresh candidate may
    /// be injected.
    pub checkpoint_interval: usize,

    /// Probability of injecting a random candidate at a checkpoint that
    /// brought no improvement.
    pub injection_prob: f64,

    /// Trailing individuals of every population that steps never touch.
    pub untouchable: usize,

    /// Random seed for reproducibility. `None` uses a random seed.
    pub seed: Option<u64>,

    /// Optional wall-clock limit in milliseconds, checked at checkpoints.
    pub time_limit_ms: Option<u64>,
}

impl Default for DeConfig {
    fn default() -> Self {
        Self {
            meta_epochs: 30,
            initial_epochs: 10_000,
            epoch_growth: 1.3,
            max_epochs: 1_000_000,
            population_range: (20, 100),
            crossover_range: (0.1, 0.9),
            force_range: (0.1, 0.9),
            checkpoint_interval: 2048,
            injection_prob: 0.05,
            untouchable: 0,
            seed: None,
            time_limit_ms: None,
        }
    }
}

impl DeConfig {
    pub fn with_meta_epochs(mut self, n: usize) -> Self {
        self.meta_epochs = n;
        self
    }

    pub fn with_initial_epochs(mut self, n: usize) -> Self {
        self.initial_epochs = n;
        self
    }

    pub fn with_epoch_growth(mut self, growth: f64) -> Self {
        self.epoch_growth = growth;
        self
    }

    pub fn with_max_epochs(mut self, n: usize) -> Self {
        self.max_epochs = n;
        self
    }

    pub fn with_population_range(mut self, min: usize, max: usize) -> Self {
        self.population_range = (min, max);
        self
    }

    pub fn with_crossover_range(mut self, min: f64, max: f64) -> Self {
        self.crossover_range = (min, max);
        self
    }

    pub fn with_force_range(mut self, min: f64, max: f64) -> Self {
        self.force_range = (min, max);
        self
    }

    pub fn with_checkpoint_interval(mut self, n: usize) -> Self {
        self.checkpoint_interval = n;
        self
    }

    pub fn with_injection_prob(mut self, p: f64) -> Self {
        self.injection_prob = p.clamp(0.0, 1.0);
        self
    }

    pub fn with_untouchable(mut self, n: usize) -> Self {
        self.untouchable = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the wall-clock time limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.meta_epochs == 0 {
            return Err("meta_epochs must be at least 1".into());
        }
        if self.initial_epochs == 0 {
            return Err("initial_epochs must be at least 1".into());
        }
        if self.epoch_growth.is_nan() || self.epoch_growth < 1.0 {
            return Err(format!("epoch_growth must be >= 1, got {}", self.epoch_growth));
        }
        if self.max_epochs < self.initial_epochs {
            return Err("max_epochs must be >= initial_epochs".into());
        }
        let (pop_min, pop_max) = self.population_range;
        if pop_min < 4 {
            return Err(format!("population_range minimum must be >= 4, got {pop_min}"));
        }
        if pop_max <= pop_min {
            return Err("population_range must be a non-empty range".into());
        }
        if self.untouchable >= pop_min {
            return Err(format!(
                "untouchable ({}) must be < population_range minimum ({pop_min})",
                self.untouchable
            ));
        }
        let (cr_min, cr_max) = self.crossover_range;
        if !(0.0..=1.0).contains(&cr_min) || !(0.0..=1.0).contains(&cr_max) || cr_max <= cr_min {
            return Err(format!(
                "crossover_range must be a non-empty range within [0, 1], got [{cr_min}, {cr_max})"
            ));
        }
        let (f_min, f_max) = self.force_range;
        if !f_min.is_finite() || !f_max.is_finite() || f_max <= f_min {
            return Err(format!(
                "force_range must be a non-empty finite range, got [{f_min}, {f_max})"
            ));
        }
        if self.checkpoint_interval == 0 {
            return Err("checkpoint_interval must be at least 1".into());
        }
        if !(0.0..=1.0).contains(&self.injection_prob) {
            return Err(format!(
                "injection_prob must be in [0, 1], got {}",
                self.injection_prob
            ));
        }
        Ok(())
    }
}
