//! Monte Carlo simulation of adaptive sessions.
//!
//! Purpose
//! -------
//! Run complete sessions through a real [`AssessmentEngine`] against
//! simulated test takers of known ability, to check a bank and configuration
//! for bias, precision and test length before going live.
//!
//! Key behaviors
//! -------------
//! - The simulated responder answers correctly with probability
//!   `P(θ_true)` under the item's own 3PL parameters; a wrong answer picks
//!   the option after the key.
//! - [`simulate_batch`] runs `replications` sessions per true θ in parallel
//!   (`rayon`); each task owns a `Pcg64` seeded from `(seed, θ index,
//!   replication)`, so responses are reproducible for a fixed seed.
//!
//! Caveats
//! -------
//! - Simulated sessions are real sessions: they are stored, and they move
//!   the bank's exposure counters. Use a dedicated bank for simulation.
//! - Under randomesque selection, item choices depend on the interleaving of
//!   parallel tasks; only the responder's draws are seed-stable.
use ndarray::{Array1, ArrayView1};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    bank::Item,
    irt::probability,
    session::{AssessmentEngine, SessionResult, SessionStatus, SessionStore},
};

/// Result of one simulated session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    pub session_id: Uuid,
    pub true_theta: f64,
    pub theta: f64,
    pub se: f64,
    pub question_count: u32,
    pub status: SessionStatus,
}

impl SimulationOutcome {
    pub fn error(&self) -> f64 {
        self.theta - self.true_theta
    }
}

/// Aggregate recovery statistics over a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSummary {
    pub outcomes: Vec<SimulationOutcome>,
    pub mean_bias: f64,
    pub rmse: f64,
    pub mean_questions: f64,
    /// Share of sessions that stopped on the SE rule.
    pub converged_share: f64,
}

impl SimulationSummary {
    fn from_outcomes(outcomes: Vec<SimulationOutcome>) -> Self {
        if outcomes.is_empty() {
            return Self {
                outcomes,
                mean_bias: 0.0,
                rmse: 0.0,
                mean_questions: 0.0,
                converged_share: 0.0,
            };
        }
        let errors: Array1<f64> = outcomes.iter().map(SimulationOutcome::error).collect();
        let lengths: Array1<f64> = outcomes.iter().map(|o| o.question_count as f64).collect();
        let n = outcomes.len() as f64;
        let converged =
            outcomes.iter().filter(|o| o.status == SessionStatus::Converged).count() as f64;
        Self {
            mean_bias: errors.sum() / n,
            rmse: (errors.mapv(|e| e * e).sum() / n).sqrt(),
            mean_questions: lengths.sum() / n,
            converged_share: converged / n,
            outcomes,
        }
    }
}

/// Option a responder of ability `true_theta` picks for `item`.
pub fn simulated_response(item: &Item, true_theta: f64, rng: &mut Pcg64) -> usize {
    let p = probability(true_theta, &item.params);
    if rng.random::<f64>() < p {
        item.correct_option
    } else {
        (item.correct_option + 1) % item.n_options()
    }
}

/// Run one session for a simulated responder until the engine stops
/// offering items.
pub fn simulate_session<S: SessionStore>(
    engine: &AssessmentEngine<S>, skill_ref: &str, true_theta: f64, rng: &mut Pcg64,
) -> SessionResult<SimulationOutcome> {
    let session = engine.start_session("simulated", skill_ref)?;
    while let Some(item) = engine.get_next_item(session.id)? {
        let selected = simulated_response(&item, true_theta, rng);
        engine.submit_answer(session.id, item.id, selected)?;
    }
    let finished = engine.session(session.id)?;
    Ok(SimulationOutcome {
        session_id: finished.id,
        true_theta,
        theta: finished.current_theta,
        se: finished.current_se,
        question_count: finished.question_count,
        status: finished.status,
    })
}

/// Simulate `replications` sessions for every θ in `true_thetas`.
///
/// Outcomes are ordered by θ index, then replication.
pub fn simulate_batch<S: SessionStore>(
    engine: &AssessmentEngine<S>, skill_ref: &str, true_thetas: ArrayView1<f64>,
    replications: usize, seed: u64,
) -> SessionResult<SimulationSummary> {
    let tasks: Vec<(usize, usize)> = (0..true_thetas.len())
        .flat_map(|t| (0..replications).map(move |r| (t, r)))
        .collect();

    let outcomes = tasks
        .par_iter()
        .map(|&(theta_idx, rep)| {
            let task_seed = seed.wrapping_add(theta_idx as u64 * 1000).wrapping_add(rep as u64);
            let mut rng = Pcg64::seed_from_u64(task_seed);
            simulate_session(engine, skill_ref, true_thetas[theta_idx], &mut rng)
        })
        .collect::<SessionResult<Vec<_>>>()?;

    Ok(SimulationSummary::from_outcomes(outcomes))
}
