//! The differential-evolution engine.
//!
//! [`DifferentialEvolver`] owns a population, its cost cache and the best
//! candidate seen so far. Each [`step`](DifferentialEvolver::step) sweeps
//! the mutable part of the population once (rand/1/bin scheme):
//!
//! 1. pick three pairwise-distinct donors `a, b, c` from the whole population,
//! 2. pick a forced coordinate `R`,
//! 3. build a trial from the parent, replacing coordinate `j` by
//!    `X[a][j] + F * (X[b][j] - X[c][j])` when `j == R` or a Bernoulli(`CR`)
//!    draw succeeds,
//! 4. project the trial, evaluate it and keep it iff it is strictly better
//!    than its parent.

use super::config::EvolverConfig;
use super::error::{DeError, Result};
use super::types::{Candidate, Identity, Projector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Smallest population from which three donors distinct from each other
/// can be drawn while one slot still holds the target.
pub const MIN_POPULATION: usize = 4;

/// Summary of one [`step`](DifferentialEvolver::step).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Number of trials that replaced their parent.
    pub accepted: usize,

    /// Whether the best solution improved during the step.
    pub best_improved: bool,
}

/// Population-based minimizer driven one generation at a time.
///
/// The last `untouchable` individuals are never overwritten by a step but
/// remain eligible as donors. The best solution is a snapshot: once copied
/// out it is kept even if the individual it came from is later replaced.
///
/// # Examples
///
/// ```
/// use u_diffevo::de::{DifferentialEvolver, EvolverConfig};
///
/// let population = vec![
///     vec![3.0, -2.0],
///     vec![1.5, 4.0],
///     vec![-2.5, 0.5],
///     vec![0.5, -3.5],
///     vec![4.0, 4.0],
/// ];
/// let sphere = |x: &Vec<f64>| x.iter().map(|v| v * v).sum::<f64>();
/// let config = EvolverConfig::default().with_seed(42);
/// let mut de = DifferentialEvolver::with_config(population, sphere, &config).unwrap();
///
/// let start = de.best_cost();
/// for _ in 0..200 {
///     de.step(0.9, 0.5);
/// }
/// assert!(de.best_cost() <= start);
/// ```
pub struct DifferentialEvolver<V, F, R = StdRng> {
    cost_fn: F,
    population: Vec<V>,
    costs: Vec<f64>,
    untouchable: usize,
    best: V,
    best_cost: f64,
    rng: R,
}

impl<V, F> DifferentialEvolver<V, F, StdRng>
where
    V: Candidate,
    F: Fn(&V) -> f64,
{
    /// Builds an engine with no untouchable individuals and an
    /// entropy-seeded random source.
    pub fn new(population: Vec<V>, cost_fn: F) -> Result<Self> {
        Self::with_config(population, cost_fn, &EvolverConfig::default())
    }

    /// Builds an engine from an [`EvolverConfig`].
    pub fn with_config(population: Vec<V>, cost_fn: F, config: &EvolverConfig) -> Result<Self> {
        let rng = StdRng::seed_from_u64(config.seed.unwrap_or_else(rand::random));
        Self::with_rng(population, cost_fn, config.untouchable, rng)
    }
}

impl<V, F, R> DifferentialEvolver<V, F, R>
where
    V: Candidate,
    F: Fn(&V) -> f64,
    R: Rng,
{
    /// Builds an engine around a caller-supplied random source.
    ///
    /// Evaluates every initial individual exactly once.
    ///
    /// # Errors
    ///
    /// - [`DeError::PopulationTooSmall`] if fewer than [`MIN_POPULATION`]
    ///   individuals are given.
    /// - [`DeError::TooManyUntouchable`] if `untouchable` leaves no mutable slot.
    /// - [`DeError::EmptyCandidate`] if candidates have no coordinates.
    pub fn with_rng(population: Vec<V>, cost_fn: F, untouchable: usize, rng: R) -> Result<Self> {
        let size = population.len();
        if size < MIN_POPULATION {
            return Err(DeError::PopulationTooSmall { size });
        }
        if untouchable >= size {
            return Err(DeError::TooManyUntouchable { untouchable, size });
        }
        if population[0].dim() == 0 {
            return Err(DeError::EmptyCandidate);
        }

        let costs: Vec<f64> = population.iter().map(&cost_fn).collect();

        // INFINITY is only an upper bound; any real cost replaces it.
        let mut best_idx = 0;
        let mut best_cost = f64::INFINITY;
        for (i, &c) in costs.iter().enumerate() {
            if c < best_cost {
                best_idx = i;
                best_cost = c;
            }
        }

        Ok(Self {
            best: population[best_idx].clone(),
            best_cost,
            cost_fn,
            population,
            costs,
            untouchable,
            rng,
        })
    }

    /// Runs one unconstrained generation.
    ///
    /// Equivalent to [`step_projected`](Self::step_projected) with [`Identity`].
    pub fn step(&mut self, crossover_prob: f64, force: f64) -> StepStats {
        self.step_projected(crossover_prob, force, Identity)
    }

    /// Runs one generation, repairing each trial with `projector` before
    /// it is evaluated.
    ///
    /// Visits the mutable region in index order. A trial replaces its
    /// parent only if its cost is strictly lower; it becomes the new best
    /// only if its cost is strictly lower than the best cost. NaN costs
    /// therefore never win either comparison.
    pub fn step_projected<P>(&mut self, crossover_prob: f64, force: f64, mut projector: P) -> StepStats
    where
        P: Projector<V>,
    {
        let mut stats = StepStats::default();

        for i in 0..self.mutable_len() {
            let mut trial = self.morphed(i, crossover_prob, force);
            projector.project(&mut trial);
            let trial_cost = (self.cost_fn)(&trial);

            // Best is checked independently of the parent comparison.
            if trial_cost < self.best_cost {
                self.best = trial.clone();
                self.best_cost = trial_cost;
                stats.best_improved = true;
            }

            if trial_cost < self.costs[i] {
                self.population[i] = trial;
                self.costs[i] = trial_cost;
                stats.accepted += 1;
            }
        }

        stats
    }

    /// Adds a new mutable individual and returns its cost.
    ///
    /// The individual is placed just before the untouchable tail, so the
    /// frozen individuals stay at the end of the population.
    pub fn insert(&mut self, candidate: V) -> f64 {
        let cost = (self.cost_fn)(&candidate);
        if cost < self.best_cost {
            self.best = candidate.clone();
            self.best_cost = cost;
        }

        let at = self.mutable_len();
        self.population.insert(at, candidate);
        self.costs.insert(at, cost);

        debug!(
            cost,
            population = self.population.len(),
            best_cost = self.best_cost,
            "inserted individual"
        );
        cost
    }

    /// Current candidates, untouchable tail last.
    pub fn population(&self) -> &[V] {
        &self.population
    }

    /// Cached cost of every individual, parallel to [`population`](Self::population).
    pub fn costs(&self) -> &[f64] {
        &self.costs
    }

    pub fn population_size(&self) -> usize {
        self.population.len()
    }

    /// Number of individuals a step may overwrite.
    pub fn mutable_len(&self) -> usize {
        self.population.len() - self.untouchable
    }

    pub fn untouchable(&self) -> usize {
        self.untouchable
    }

    /// Dimension of the candidates.
    pub fn dim(&self) -> usize {
        self.population[0].dim()
    }

    /// Lowest-cost candidate observed over the whole run.
    pub fn best(&self) -> &V {
        &self.best
    }

    pub fn best_cost(&self) -> f64 {
        self.best_cost
    }

    /// Consumes the engine and returns the best candidate with its cost.
    pub fn into_best(self) -> (V, f64) {
        (self.best, self.best_cost)
    }

    /// Draws three pairwise-distinct indices from the whole population,
    /// resampling each one until it differs from those already drawn.
    fn pick_three(&mut self) -> [usize; 3] {
        let n = self.population.len();

        let a = self.rng.random_range(0..n);
        let mut b = self.rng.random_range(0..n);
        while b == a {
            b = self.rng.random_range(0..n);
        }
        let mut c = self.rng.random_range(0..n);
        while c == a || c == b {
            c = self.rng.random_range(0..n);
        }

        [a, b, c]
    }

    /// Builds the (unprojected) trial vector for individual `i`.
    fn morphed(&mut self, i: usize, crossover_prob: f64, force: f64) -> V {
        let donors = self.pick_three();
        let forced = self.rng.random_range(0..self.population[i].dim());
        self.crossover(i, donors, forced, crossover_prob, force)
    }

    /// Binomial crossover of parent `i` with the donor combination
    /// `A + force * (B - C)`. One Bernoulli draw is made per coordinate,
    /// including the forced one.
    fn crossover(
        &mut self,
        i: usize,
        [a, b, c]: [usize; 3],
        forced: usize,
        crossover_prob: f64,
        force: f64,
    ) -> V {
        let (da, db, dc) = (&self.population[a], &self.population[b], &self.population[c]);
        let mut trial = self.population[i].clone();

        for j in 0..trial.dim() {
            let crossed = self.rng.random::<f64>() < crossover_prob;
            if crossed || j == forced {
                trial.set_gene(j, da.gene(j) + (db.gene(j) - dc.gene(j)) * force);
            }
        }

        trial
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere(x: &Vec<f64>) -> f64 {
        x.iter().map(|v| v * v).sum()
    }

    fn corners() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 1.0],
        ]
    }

    fn spread(n: usize, dim: usize) -> Vec<Vec<f64>> {
        let mut rng = StdRng::seed_from_u64(n as u64 * 31 + dim as u64);
        (0..n)
            .map(|_| (0..dim).map(|_| rng.random_range(-5.0..5.0)).collect())
            .collect()
    }

    fn seeded(
        population: Vec<Vec<f64>>,
        untouchable: usize,
    ) -> DifferentialEvolver<Vec<f64>, fn(&Vec<f64>) -> f64> {
        let config = EvolverConfig::default()
            .with_untouchable(untouchable)
            .with_seed(42);
        DifferentialEvolver::with_config(population, sphere as fn(&Vec<f64>) -> f64, &config)
            .expect("valid engine")
    }

    #[test]
    fn test_rejects_small_population() {
        let population = vec![vec![0.0], vec![1.0], vec![2.0]];
        let err = DifferentialEvolver::new(population, sphere).err();
        assert_eq!(err, Some(DeError::PopulationTooSmall { size: 3 }));
    }

    #[test]
    fn test_rejects_all_untouchable() {
        let config = EvolverConfig::default().with_untouchable(4);
        let err = DifferentialEvolver::with_config(corners(), sphere, &config).err();
        assert_eq!(
            err,
            Some(DeError::TooManyUntouchable {
                untouchable: 4,
                size: 4
            })
        );
    }

    #[test]
    fn test_rejects_empty_candidates() {
        let population: Vec<Vec<f64>> = vec![vec![]; 5];
        let err = DifferentialEvolver::new(population, sphere).err();
        assert_eq!(err, Some(DeError::EmptyCandidate));
    }

    #[test]
    fn test_construction_evaluates_and_finds_best() {
        let de = seeded(corners(), 0);
        assert_eq!(de.costs(), &[0.0, 1.0, 1.0, 2.0]);
        assert_eq!(de.best(), &vec![0.0, 0.0]);
        assert_eq!(de.best_cost(), 0.0);
        assert_eq!(de.population_size(), 4);
        assert_eq!(de.dim(), 2);
    }

    #[test]
    fn test_construction_evaluates_each_individual_once() {
        let calls = std::cell::Cell::new(0usize);
        let counting = |x: &Vec<f64>| {
            calls.set(calls.get() + 1);
            sphere(x)
        };
        let de = DifferentialEvolver::new(spread(9, 3), counting).expect("valid engine");
        assert_eq!(calls.get(), 9);
        assert_eq!(de.population_size(), 9);
    }

    #[test]
    fn test_optimum_is_kept_with_zero_force() {
        let mut de = seeded(corners(), 0);
        for _ in 0..100 {
            de.step(1.0, 0.0);
        }
        assert_eq!(de.best_cost(), 0.0);
        assert_eq!(de.best(), &vec![0.0, 0.0]);
    }

    #[test]
    fn test_step_evaluates_once_per_mutable_individual() {
        let calls = std::cell::Cell::new(0usize);
        let counting = |x: &Vec<f64>| {
            calls.set(calls.get() + 1);
            sphere(x)
        };
        let config = EvolverConfig::default().with_untouchable(2).with_seed(1);
        let mut de =
            DifferentialEvolver::with_config(spread(8, 2), counting, &config).expect("valid engine");
        calls.set(0);
        de.step(0.5, 0.5);
        assert_eq!(calls.get(), 6);
    }

    #[test]
    fn test_untouchable_tail_is_preserved() {
        let mut de = seeded(spread(10, 3), 3);
        let frozen: Vec<Vec<f64>> = de.population()[7..].to_vec();
        let frozen_costs: Vec<f64> = de.costs()[7..].to_vec();

        for _ in 0..200 {
            de.step(0.9, 0.8);
        }

        assert_eq!(&de.population()[7..], frozen.as_slice());
        assert_eq!(&de.costs()[7..], frozen_costs.as_slice());
    }

    #[test]
    fn test_acceptance_is_all_or_nothing() {
        let mut de = seeded(spread(12, 4), 0);
        for _ in 0..20 {
            let before_pop = de.population().to_vec();
            let before_costs = de.costs().to_vec();
            de.step(0.7, 0.6);

            for i in 0..de.population_size() {
                let unchanged =
                    de.population()[i] == before_pop[i] && de.costs()[i] == before_costs[i];
                let improved = de.costs()[i] < before_costs[i];
                assert!(unchanged || improved, "slot {i} partially updated");
                assert_eq!(de.costs()[i], sphere(&de.population()[i]));
            }
        }
    }

    #[test]
    fn test_best_is_monotone_and_bounds_population() {
        let mut de = seeded(spread(15, 3), 0);
        let mut last = de.best_cost();
        for _ in 0..100 {
            let stats = de.step(0.5, 0.7);
            assert!(de.best_cost() <= last);
            if stats.best_improved {
                assert!(de.best_cost() < last);
            }
            last = de.best_cost();
            for &c in de.costs() {
                assert!(last <= c);
            }
        }
        assert_eq!(de.best_cost(), sphere(de.best()));
    }

    #[test]
    fn test_converges_on_sphere() {
        let mut de = seeded(spread(20, 3), 0);
        for _ in 0..500 {
            de.step(0.9, 0.5);
        }
        assert!(
            de.best_cost() < 1e-3,
            "expected near-zero cost, got {}",
            de.best_cost()
        );
    }

    #[test]
    fn test_insert_improves_best() {
        let mut de = seeded(spread(6, 2), 0);
        let before = de.population_size();
        let cost = de.insert(vec![0.0, 0.0]);
        assert_eq!(cost, 0.0);
        assert_eq!(de.best_cost(), 0.0);
        assert_eq!(de.best(), &vec![0.0, 0.0]);
        assert_eq!(de.population_size(), before + 1);
    }

    #[test]
    fn test_insert_worse_keeps_best() {
        let mut de = seeded(corners(), 0);
        de.insert(vec![10.0, 10.0]);
        assert_eq!(de.best_cost(), 0.0);
        assert_eq!(de.population_size(), 5);
        assert_eq!(de.population()[4], vec![10.0, 10.0]);
        assert_eq!(de.costs()[4], 200.0);
    }

    #[test]
    fn test_insert_lands_before_untouchable_tail() {
        let mut de = seeded(spread(6, 2), 2);
        let frozen = de.population()[4..].to_vec();
        de.insert(vec![9.0, 9.0]);

        assert_eq!(de.population_size(), 7);
        assert_eq!(de.mutable_len(), 5);
        assert_eq!(de.population()[4], vec![9.0, 9.0]);
        assert_eq!(&de.population()[5..], frozen.as_slice());
    }

    #[test]
    fn test_nan_trials_never_win() {
        let mut de = seeded(spread(8, 2), 0);
        let before = de.population().to_vec();
        let best = de.best_cost();

        let poison = |y: &mut Vec<f64>| y[0] = f64::NAN;
        for _ in 0..20 {
            let stats = de.step_projected(1.0, 0.5, poison);
            assert_eq!(stats.accepted, 0);
            assert!(!stats.best_improved);
        }

        assert_eq!(de.population(), before.as_slice());
        assert_eq!(de.best_cost(), best);
    }

    #[test]
    fn test_best_improves_without_replacing_parent() {
        // A NaN parent can never be replaced, but its trials still count
        // towards the best.
        let population = vec![
            vec![f64::NAN, 0.0],
            vec![5.0, 5.0],
            vec![6.0, 6.0],
            vec![7.0, 7.0],
            vec![8.0, 8.0],
        ];
        let config = EvolverConfig::default().with_untouchable(4).with_seed(1);
        let mut de = DifferentialEvolver::with_config(population, sphere, &config).unwrap();
        let start = de.best_cost();
        assert_eq!(start, 50.0);

        let mut improved_without_accept = false;
        for _ in 0..200 {
            let stats = de.step(1.0, 1.0);
            assert_eq!(stats.accepted, 0);
            if stats.best_improved {
                improved_without_accept = true;
            }
        }

        assert!(improved_without_accept);
        assert!(de.best_cost() < start);
        assert_eq!(de.best_cost(), sphere(de.best()));
        assert!(de.population()[0][0].is_nan());
        assert_eq!(de.population()[0][1], 0.0);
        assert!(de.costs()[0].is_nan());
    }

    #[test]
    fn test_nan_insert_never_becomes_best() {
        let mut de = seeded(corners(), 0);
        let cost = de.insert(vec![f64::NAN, 0.0]);
        assert!(cost.is_nan());
        assert_eq!(de.best_cost(), 0.0);
        assert_eq!(de.population_size(), 5);
    }

    #[test]
    fn test_identity_projector_matches_plain_step() {
        let mut plain = seeded(spread(10, 3), 1);
        let mut projected = seeded(spread(10, 3), 1);

        for _ in 0..50 {
            let a = plain.step(0.6, 0.7);
            let b = projected.step_projected(0.6, 0.7, |_: &mut Vec<f64>| {});
            assert_eq!(a, b);
        }

        assert_eq!(plain.population(), projected.population());
        assert_eq!(plain.best_cost(), projected.best_cost());
    }

    #[test]
    fn test_projector_keeps_population_feasible() {
        let mut de = seeded(spread(10, 2), 0);
        let initial = de.population().to_vec();
        let clamp = |y: &mut Vec<f64>| {
            for v in y.iter_mut() {
                *v = v.clamp(1.0, 5.0);
            }
        };
        for _ in 0..50 {
            de.step_projected(0.9, 0.9, clamp);
        }
        for (x, x0) in de.population().iter().zip(&initial) {
            if x != x0 {
                assert!(x.iter().all(|v| (1.0..=5.0).contains(v)), "{x:?} escaped");
            }
        }
    }

    #[test]
    fn test_pick_three_is_pairwise_distinct() {
        let mut de = seeded(corners(), 0);
        let mut seen = [false; 4];
        for _ in 0..1000 {
            let [a, b, c] = de.pick_three();
            assert!(a != b && a != c && b != c);
            for idx in [a, b, c] {
                assert!(idx < 4);
                seen[idx] = true;
            }
        }
        assert!(seen.iter().all(|&s| s), "every index should be drawn");
    }

    #[test]
    fn test_crossover_with_zero_rate_changes_only_forced_coordinate() {
        let population = vec![
            vec![0.0, 0.0, 0.0],
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
            vec![7.0, 8.0, 11.0],
        ];
        let mut de = seeded(population, 0);

        for forced in 0..3 {
            let trial = de.crossover(0, [1, 2, 3], forced, 0.0, 0.5);
            for j in 0..3 {
                let parent = 0.0;
                let donor = de.population()[1][j]
                    + 0.5 * (de.population()[2][j] - de.population()[3][j]);
                if j == forced {
                    assert_eq!(trial[j], donor);
                    assert_ne!(trial[j], parent);
                } else {
                    assert_eq!(trial[j], parent);
                }
            }
        }
    }

    #[test]
    fn test_crossover_with_full_rate_changes_every_coordinate() {
        let population = vec![
            vec![0.0, 0.0],
            vec![1.0, 2.0],
            vec![3.0, 5.0],
            vec![1.0, 1.0],
        ];
        let mut de = seeded(population, 0);
        let trial = de.crossover(0, [1, 2, 3], 0, 1.0, 1.0);
        assert_eq!(trial, vec![3.0, 6.0]);
    }

    #[test]
    fn test_morphed_trial_differs_in_forced_coordinate() {
        // Every donor combination differs from the parent in every
        // coordinate when the parent is never a donor.
        let population = vec![
            vec![-100.0, -100.0, -100.0],
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
            vec![7.0, 9.0, 11.0],
            vec![2.0, 8.0, 4.0],
        ];
        let config = EvolverConfig::default().with_untouchable(0).with_seed(3);
        let mut de =
            DifferentialEvolver::with_config(population, sphere, &config).expect("valid engine");
        let parent = de.population()[0].clone();
        for _ in 0..200 {
            let donors = de.pick_three();
            if donors.contains(&0) {
                continue;
            }
            let forced = de.rng.random_range(0..3);
            let trial = de.crossover(0, donors, forced, 0.0, 0.1);
            assert_ne!(trial[forced], parent[forced]);
        }
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = seeded(spread(10, 3), 0);
        let mut b = seeded(spread(10, 3), 0);
        for _ in 0..30 {
            a.step(0.5, 0.5);
            b.step(0.5, 0.5);
        }
        assert_eq!(a.population(), b.population());
        assert_eq!(a.into_best(), b.into_best());
    }

    #[test]
    fn test_array_candidates() {
        let population = vec![
            [1.0, 1.0],
            [2.0, -1.0],
            [-3.0, 0.5],
            [0.5, 2.5],
            [4.0, -4.0],
            [-2.0, -3.0],
            [3.5, 1.5],
            [-1.0, 4.0],
        ];
        let cost = |x: &[f64; 2]| (x[0] - 1.0).powi(2) + (x[1] + 1.0).powi(2);
        let config = EvolverConfig::default().with_seed(9);
        let mut de = DifferentialEvolver::with_config(population, cost, &config).expect("valid");
        for _ in 0..300 {
            de.step(0.9, 0.6);
        }
        assert!(de.best_cost() < 1e-2, "got {}", de.best_cost());
    }
}
