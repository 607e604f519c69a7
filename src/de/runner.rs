//! Restart loop around the engine.
//!
//! [`DeRunner`] runs a sequence of meta-epochs. Every meta-epoch builds a
//! fresh random population seeded with the overall best, steps it with
//! randomly drawn crossover probability and force, harvests improvements
//! at checkpoints and occasionally injects a random newcomer when a
//! checkpoint brings nothing new.

use super::config::DeConfig;
use super::evolver::DifferentialEvolver;
use super::types::DeProblem;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Result of a restart run.
#[derive(Debug, Clone)]
pub struct DeResult<V> {
    /// The best candidate found.
    pub best: V,

    /// Cost of the best candidate.
    pub best_cost: f64,

    /// Number of meta-epochs started.
    pub meta_epochs: usize,

    /// Total number of engine steps executed.
    pub total_steps: usize,

    /// Number of random candidates injected at checkpoints.
    pub injections: usize,

    /// Whether cancelled externally.
    pub cancelled: bool,

    /// Whether stopped by the time limit.
    pub timed_out: bool,

    /// Overall best cost, recorded initially and at every improvement.
    pub cost_history: Vec<f64>,
}

/// Executes the restart loop.
pub struct DeRunner;

impl DeRunner {
    /// Runs the optimization.
    ///
    /// # Panics
    /// Panics if the configuration is invalid (call [`DeConfig::validate`]
    /// first to get a descriptive error), or if the problem's candidates
    /// have no coordinates (see [`DeError::EmptyCandidate`](super::DeError::EmptyCandidate)).
    pub fn run<P: DeProblem>(problem: &P, config: &DeConfig) -> DeResult<P::Vector> {
        Self::run_with_cancel(problem, config, None)
    }

    /// Runs with an optional cancellation token, checked before every step.
    pub fn run_with_cancel<P: DeProblem>(
        problem: &P,
        config: &DeConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> DeResult<P::Vector> {
        config.validate().expect("invalid DeConfig");

        let mut rng = StdRng::seed_from_u64(config.seed.unwrap_or_else(rand::random));
        let start = Instant::now();

        let mut best = problem.random_candidate(&mut rng);
        let mut best_cost = problem.cost(&best);
        let mut cost_history = vec![best_cost];

        let mut epochs = config.initial_epochs;
        let mut meta_epochs = 0usize;
        let mut total_steps = 0usize;
        let mut injections = 0usize;
        let mut cancelled = false;
        let mut timed_out = false;

        'meta: for meta_epoch in 0..config.meta_epochs {
            meta_epochs += 1;

            let (pop_min, pop_max) = config.population_range;
            let pop_size = rng.random_range(pop_min..pop_max);
            let mut population: Vec<P::Vector> = (0..pop_size)
                .map(|_| problem.random_candidate(&mut rng))
                .collect();
            let slot = rng.random_range(0..pop_size);
            population[slot] = best.clone();

            debug!(meta_epoch, pop_size, epochs, "starting meta-epoch");

            let engine_rng = StdRng::seed_from_u64(rng.random());
            let mut engine = DifferentialEvolver::with_rng(
                population,
                |x: &P::Vector| problem.cost(x),
                config.untouchable,
                engine_rng,
            )
            .expect("problem produced an invalid population");

            for epoch in 0..epochs {
                if let Some(ref flag) = cancel {
                    if flag.load(Ordering::Relaxed) {
                        cancelled = true;
                        harvest(
                            problem,
                            meta_epoch,
                            &engine,
                            &mut best,
                            &mut best_cost,
                            &mut cost_history,
                        );
                        break 'meta;
                    }
                }

                let (cr_min, cr_max) = config.crossover_range;
                let (f_min, f_max) = config.force_range;
                let crossover_prob = rng.random_range(cr_min..cr_max);
                let force = rng.random_range(f_min..f_max);
                engine.step_projected(crossover_prob, force, |y: &mut P::Vector| {
                    problem.project(y, &mut rng)
                });
                total_steps += 1;

                if epoch % config.checkpoint_interval == 0 {
                    let improved = harvest(
                        problem,
                        meta_epoch,
                        &engine,
                        &mut best,
                        &mut best_cost,
                        &mut cost_history,
                    );
                    if !improved && rng.random::<f64>() < config.injection_prob {
                        engine.insert(problem.random_candidate(&mut rng));
                        injections += 1;
                    }

                    if let Some(limit) = config.time_limit_ms {
                        if start.elapsed().as_millis() >= limit as u128 {
                            timed_out = true;
                            harvest(
                                problem,
                                meta_epoch,
                                &engine,
                                &mut best,
                                &mut best_cost,
                                &mut cost_history,
                            );
                            break 'meta;
                        }
                    }
                }
            }

            harvest(
                problem,
                meta_epoch,
                &engine,
                &mut best,
                &mut best_cost,
                &mut cost_history,
            );

            epochs = ((epochs as f64 * config.epoch_growth) as usize).min(config.max_epochs);
        }

        DeResult {
            best,
            best_cost,
            meta_epochs,
            total_steps,
            injections,
            cancelled,
            timed_out,
            cost_history,
        }
    }
}

/// Adopts the engine's best if it beats the overall best.
fn harvest<P, F, R>(
    problem: &P,
    meta_epoch: usize,
    engine: &DifferentialEvolver<P::Vector, F, R>,
    best: &mut P::Vector,
    best_cost: &mut f64,
    cost_history: &mut Vec<f64>,
) -> bool
where
    P: DeProblem,
    F: Fn(&P::Vector) -> f64,
    R: Rng,
{
    if engine.best_cost() < *best_cost {
        *best = engine.best().clone();
        *best_cost = engine.best_cost();
        cost_history.push(*best_cost);
        info!(meta_epoch, best_cost = *best_cost, "best improved");
        problem.on_improvement(meta_epoch, *best_cost);
        true
    } else {
        false
    }
}
