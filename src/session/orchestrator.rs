//! Top-level owner of every algorithm's session.
//!
//! Wires the user actions (select, advance, reset, adjust beta, request a new
//! example) to the active [`Session`]. A fetched example is only applied once
//! the provider has succeeded; a failure leaves every session untouched.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::algorithm::{
    Algorithm, AlgorithmKind, AnyExample, AnyMetrics, Cispo, Dpo, Gfpo, Grpo, Gspo, Ppo,
    SimulationParameters,
};
use crate::config::{AppConfig, SimulationConfig};
use crate::provider::{ExampleProvider, ProviderError, ProviderResult};

use super::session::{Session, Snapshot};

// ---------------------------------------------------------------------------
// Beta control
// ---------------------------------------------------------------------------

/// Range and granularity of the beta control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BetaBounds {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for BetaBounds {
    fn default() -> Self {
        Self {
            min: 0.05,
            max: 1.0,
            step: 0.05,
        }
    }
}

impl BetaBounds {
    /// Clamp into `[min, max]` and snap to the nearest step. The result is
    /// rounded to nine decimals so grid values come out exact (0.15, not
    /// 0.15000000000000002).
    pub fn snap(&self, beta: f64) -> f64 {
        const SCALE: f64 = 1e9;
        let clamped = beta.clamp(self.min, self.max);
        let steps = ((clamped - self.min) / self.step).round();
        let snapped = ((self.min + steps * self.step) * SCALE).round() / SCALE;
        snapped.clamp(self.min, self.max)
    }
}

impl From<&SimulationConfig> for BetaBounds {
    fn from(cfg: &SimulationConfig) -> Self {
        Self {
            min: cfg.beta_min,
            max: cfg.beta_max,
            step: cfg.beta_step,
        }
    }
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Sessions {
    ppo: Session<Ppo>,
    dpo: Session<Dpo>,
    grpo: Session<Grpo>,
    gspo: Session<Gspo>,
    gfpo: Session<Gfpo>,
    cispo: Session<Cispo>,
}

/// Run `$body` with `$s` bound to the session of `$kind`.
macro_rules! on_session {
    (&mut $sessions:expr, $kind:expr, |$s:ident| $body:expr) => {
        match $kind {
            AlgorithmKind::Ppo => {
                let $s = &mut $sessions.ppo;
                $body
            }
            AlgorithmKind::Dpo => {
                let $s = &mut $sessions.dpo;
                $body
            }
            AlgorithmKind::Grpo => {
                let $s = &mut $sessions.grpo;
                $body
            }
            AlgorithmKind::Gspo => {
                let $s = &mut $sessions.gspo;
                $body
            }
            AlgorithmKind::Gfpo => {
                let $s = &mut $sessions.gfpo;
                $body
            }
            AlgorithmKind::Cispo => {
                let $s = &mut $sessions.cispo;
                $body
            }
        }
    };
    (&$sessions:expr, $kind:expr, |$s:ident| $body:expr) => {
        match $kind {
            AlgorithmKind::Ppo => {
                let $s = &$sessions.ppo;
                $body
            }
            AlgorithmKind::Dpo => {
                let $s = &$sessions.dpo;
                $body
            }
            AlgorithmKind::Grpo => {
                let $s = &$sessions.grpo;
                $body
            }
            AlgorithmKind::Gspo => {
                let $s = &$sessions.gspo;
                $body
            }
            AlgorithmKind::Gfpo => {
                let $s = &$sessions.gfpo;
                $body
            }
            AlgorithmKind::Cispo => {
                let $s = &$sessions.cispo;
                $body
            }
        }
    };
}

/// Replace `session`'s example with `example`, drawing fresh auxiliary state.
fn install<A: Algorithm, R: Rng>(
    session: &mut Session<A>,
    rng: &mut R,
    example: AnyExample,
) -> Result<(), AnyExample> {
    let example = A::from_any(example)?;
    session.replace(example, A::fresh_aux(rng));
    Ok(())
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// What happened to a new-example request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The example replaced the session's previous one.
    Applied { kind: AlgorithmKind, id: String },
    /// Another request was still outstanding.
    Ignored,
}

/// Clears the loading flag however the request ends, including when the
/// request future is dropped mid-flight.
struct LoadingGuard<'a>(&'a mut bool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

pub struct Orchestrator<P, R = StdRng> {
    provider: P,
    rng: R,
    sessions: Sessions,
    active: AlgorithmKind,
    params: SimulationParameters,
    beta_bounds: BetaBounds,
    loading: bool,
}

impl<P: ExampleProvider> Orchestrator<P, StdRng> {
    /// Build from configuration. The log-prob generator is seeded from
    /// `simulation.seed` when set.
    pub fn from_config(provider: P, config: &AppConfig) -> Self {
        let sim = &config.simulation;
        let rng = match sim.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let bounds = BetaBounds::from(sim);
        let params = SimulationParameters {
            beta: bounds.snap(sim.default_beta),
            learning_rate: sim.learning_rate,
        };
        Self::with_rng(provider, rng, params, bounds)
    }
}

impl<P: ExampleProvider, R: Rng> Orchestrator<P, R> {
    /// Every session on its built-in scenario, PPO active.
    pub fn with_rng(
        provider: P,
        rng: R,
        params: SimulationParameters,
        beta_bounds: BetaBounds,
    ) -> Self {
        Self {
            provider,
            rng,
            sessions: Sessions::default(),
            active: AlgorithmKind::Ppo,
            params,
            beta_bounds,
            loading: false,
        }
    }

    pub fn active(&self) -> AlgorithmKind {
        self.active
    }

    pub fn params(&self) -> SimulationParameters {
        self.params
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Switch the active algorithm. Each session keeps its own cursor.
    pub fn select(&mut self, kind: AlgorithmKind) {
        if self.active != kind {
            debug!(from = %self.active, to = %kind, "algorithm selected");
            self.active = kind;
        }
    }

    /// Advance the active session. `false` at the terminal stage.
    pub fn advance(&mut self) -> bool {
        on_session!(&mut self.sessions, self.active, |s| s.advance())
    }

    pub fn reset(&mut self) {
        on_session!(&mut self.sessions, self.active, |s| s.reset())
    }

    /// Set beta, clamped and snapped to the control's grid. Non-finite input
    /// is ignored. Returns the beta now in effect.
    pub fn set_beta(&mut self, beta: f64) -> f64 {
        if !beta.is_finite() {
            warn!(beta, "ignoring non-finite beta");
            return self.params.beta;
        }
        let snapped = self.beta_bounds.snap(beta);
        if snapped != beta {
            debug!(requested = beta, applied = snapped, "beta snapped to control grid");
        }
        self.params.beta = snapped;
        snapped
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot_of(self.active)
    }

    pub fn snapshot_of(&self, kind: AlgorithmKind) -> Snapshot {
        on_session!(&self.sessions, kind, |s| s.snapshot(&self.params))
    }

    pub fn metrics(&self) -> AnyMetrics {
        self.snapshot().metrics
    }

    // ------------------------------------------------------------------
    // New example requests
    // ------------------------------------------------------------------

    /// Mark a request for the active algorithm as outstanding. `None` while
    /// another request is still loading.
    pub fn begin_request(&mut self) -> Option<AlgorithmKind> {
        if self.loading {
            debug!(algorithm = %self.active, "request ignored while loading");
            return None;
        }
        self.loading = true;
        Some(self.active)
    }

    /// Finish the request begun for `kind`. Always clears the loading flag.
    /// On success the example replaces `kind`'s session and rewinds it to the
    /// first stage. On failure, or when the example belongs to another
    /// algorithm, nothing else changes.
    pub fn complete_request(
        &mut self,
        kind: AlgorithmKind,
        result: ProviderResult<AnyExample>,
    ) -> ProviderResult<FetchOutcome> {
        self.loading = false;

        let example = match result {
            Ok(example) => example,
            Err(e) => {
                warn!(algorithm = %kind, error = %e, "could not generate new scenario; keeping current one");
                return Err(e);
            }
        };

        if example.kind() != kind {
            let err = ProviderError::invalid(format!(
                "requested a {kind} scenario, received {}",
                example.kind()
            ));
            warn!(algorithm = %kind, error = %err, "could not generate new scenario; keeping current one");
            return Err(err);
        }

        let id = example.id().to_string();
        let topic = example.topic().to_string();
        let installed = on_session!(&mut self.sessions, kind, |s| install(s, &mut self.rng, example));
        if installed.is_err() {
            return Err(ProviderError::invalid(format!(
                "example does not match algorithm {kind}"
            )));
        }

        info!(algorithm = %kind, id = %id, topic = %topic, "new scenario applied");
        Ok(FetchOutcome::Applied { kind, id })
    }

    /// Ask the provider for a new example for the active algorithm and apply
    /// it. Ignored while another request is loading.
    pub async fn request_new_example(&mut self) -> ProviderResult<FetchOutcome> {
        let Some(kind) = self.begin_request() else {
            return Ok(FetchOutcome::Ignored);
        };

        let result = {
            let _guard = LoadingGuard(&mut self.loading);
            self.provider.generate(kind).await
        };

        self.complete_request(kind, result)
    }
}
