//! rlexplain: walk through RL fine-tuning algorithms one stage at a time.
//!
//! - `stages`    -- List every algorithm's stages
//! - `walk`      -- Print the metrics at each stage of the built-in scenario
//! - `generate`  -- Request a new scenario and walk it

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rlexplain::algorithm::{AlgorithmKind, AnyMetrics};
use rlexplain::config::AppConfig;
use rlexplain::provider::{AnyProvider, GeminiProvider, StaticProvider};
use rlexplain::session::{FetchOutcome, Orchestrator, Snapshot};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Step-by-step explainer for DPO, GRPO, GSPO, GFPO, PPO and CISPO.
#[derive(Parser)]
#[command(name = "rlexplain", version, about)]
struct Cli {
    /// Path to a JSON configuration file (uses defaults if not provided).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum AlgorithmChoice {
    Ppo,
    Dpo,
    Grpo,
    Gspo,
    Gfpo,
    Cispo,
}

impl From<AlgorithmChoice> for AlgorithmKind {
    fn from(choice: AlgorithmChoice) -> Self {
        match choice {
            AlgorithmChoice::Ppo => AlgorithmKind::Ppo,
            AlgorithmChoice::Dpo => AlgorithmKind::Dpo,
            AlgorithmChoice::Grpo => AlgorithmKind::Grpo,
            AlgorithmChoice::Gspo => AlgorithmKind::Gspo,
            AlgorithmChoice::Gfpo => AlgorithmKind::Gfpo,
            AlgorithmChoice::Cispo => AlgorithmKind::Cispo,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the stages of every algorithm.
    Stages,

    /// Walk the built-in scenario from the first stage to the last.
    Walk {
        #[arg(long, default_value = "ppo")]
        algorithm: AlgorithmChoice,

        /// DPO beta (clamped to the configured range).
        #[arg(long)]
        beta: Option<f64>,

        /// Print one JSON snapshot per stage instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Request a freshly generated scenario and walk it.
    Generate {
        #[arg(long, default_value = "ppo")]
        algorithm: AlgorithmChoice,

        /// Serve a built-in scenario instead of calling the provider.
        #[arg(long)]
        offline: bool,

        #[arg(long)]
        beta: Option<f64>,

        #[arg(long)]
        json: bool,
    },
}

// ---------------------------------------------------------------------------
// Entrypoint
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing (reads RUST_LOG env var, defaults to info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Stages => {
            cmd_stages();
            Ok(())
        }
        Commands::Walk {
            algorithm,
            beta,
            json,
        } => {
            let mut orch = Orchestrator::from_config(AnyProvider::Static(StaticProvider), &config);
            prepare(&mut orch, algorithm.into(), beta);
            walk(&mut orch, json)
        }
        Commands::Generate {
            algorithm,
            offline,
            beta,
            json,
        } => cmd_generate(&config, algorithm.into(), offline, beta, json).await,
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_stages() {
    for kind in AlgorithmKind::ALL {
        println!("{kind}:");
        for (i, label) in kind.stage_labels().iter().enumerate() {
            println!("  {}. {label}", i + 1);
        }
    }
}

async fn cmd_generate(
    config: &AppConfig,
    kind: AlgorithmKind,
    offline: bool,
    beta: Option<f64>,
    json: bool,
) -> Result<()> {
    let provider = if offline {
        AnyProvider::Static(StaticProvider)
    } else {
        if config.provider.api_key.is_empty() {
            anyhow::bail!("no API key: set GEMINI_API_KEY or API_KEY, or pass --offline");
        }
        AnyProvider::Gemini(GeminiProvider::new(&config.provider))
    };

    let mut orch = Orchestrator::from_config(provider, config);
    prepare(&mut orch, kind, beta);

    match orch.request_new_example().await {
        Ok(FetchOutcome::Applied { kind, id }) => {
            tracing::info!(algorithm = %kind, id = %id, "walking new scenario");
        }
        Ok(FetchOutcome::Ignored) => {}
        Err(e) => {
            eprintln!("Could not generate new scenario ({e}). Showing the built-in one.");
        }
    }

    walk(&mut orch, json)
}

fn prepare<P, R>(orch: &mut Orchestrator<P, R>, kind: AlgorithmKind, beta: Option<f64>)
where
    P: rlexplain::provider::ExampleProvider,
    R: rand::Rng,
{
    orch.select(kind);
    if let Some(beta) = beta {
        orch.set_beta(beta);
    }
}

/// Print the active session at every stage, first to terminal.
fn walk<P, R>(orch: &mut Orchestrator<P, R>, json: bool) -> Result<()>
where
    P: rlexplain::provider::ExampleProvider,
    R: rand::Rng,
{
    orch.reset();
    let first = orch.snapshot();
    if !json {
        println!("{} | {}", first.algorithm(), first.topic);
        println!("Prompt: {}", first.prompt);
        println!();
    }

    loop {
        let snap = orch.snapshot();
        if json {
            println!("{}", serde_json::to_string(&snap)?);
        } else {
            print_snapshot(&snap);
        }
        if !orch.advance() {
            break;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

fn print_snapshot(snap: &Snapshot) {
    println!(
        "[{}/{}] {}",
        snap.stage_index + 1,
        snap.stage_count,
        snap.stage
    );
    for line in describe(&snap.metrics) {
        println!("    {line}");
    }
}

fn describe(metrics: &AnyMetrics) -> Vec<String> {
    let mut lines = Vec::new();
    match metrics {
        AnyMetrics::Dpo(m) => {
            let lp = &m.log_probs;
            if m.panels.reference_active {
                lines.push(format!(
                    "ref log-probs: chosen {:.2}, rejected {:.2}",
                    lp.ref_chosen, lp.ref_rejected
                ));
            }
            if m.panels.policy_active {
                lines.push(format!(
                    "policy log-probs: chosen {:.2}, rejected {:.2}",
                    lp.policy_chosen, lp.policy_rejected
                ));
            }
            if m.panels.show_rewards {
                lines.push(format!(
                    "implicit rewards: chosen {:.3}, rejected {:.3}, margin {:.3} (beta {:.2})",
                    m.implicit_reward_chosen, m.implicit_reward_rejected, m.margin, m.beta
                ));
            }
            if m.panels.show_loss {
                lines.push(format!("sigmoid {:.4}, loss {:.4}", m.sigmoid, m.loss));
            }
        }
        AnyMetrics::Grpo(m) => {
            if m.panels.show_stats {
                lines.push(format!(
                    "mean {:.2}, variance {:.2}, std {:.2}",
                    m.mean, m.variance, m.std
                ));
            }
            if m.panels.show_group {
                for row in &m.rows {
                    let mut line = format!("{}: {}", row.id, row.text);
                    if m.panels.show_scores {
                        line.push_str(&format!(" | score {}", row.score));
                    }
                    if m.panels.show_advantage {
                        line.push_str(&format!(" | A {:+.2}", row.advantage));
                    }
                    if let Some(direction) = row.direction {
                        line.push_str(&format!(" | {direction:?}"));
                    }
                    lines.push(line);
                }
            }
        }
        AnyMetrics::Gspo(m) => {
            if m.panels.show_group {
                for row in &m.rows {
                    let mut line = format!("{}: {}", row.id, row.text);
                    if m.panels.show_scores {
                        line.push_str(&format!(" | score {}", row.score));
                    }
                    if m.panels.show_weighting {
                        line.push_str(&format!(" | weight {:.1}%", row.percent));
                    }
                    lines.push(line);
                }
            }
        }
        AnyMetrics::Gfpo(m) => {
            if m.panels.show_group {
                for row in &m.visible {
                    let mut line = format!(
                        "{}: {} ({} tokens, {})",
                        row.id,
                        row.text,
                        row.length,
                        if row.is_correct { "correct" } else { "incorrect" }
                    );
                    if row.dimmed {
                        line.push_str(" [filtered]");
                    }
                    if row.winner {
                        line.push_str(" [reinforced]");
                    }
                    lines.push(line);
                }
            }
        }
        AnyMetrics::Ppo(m) => {
            if m.panels.evaluation {
                lines.push(format!("reward R {:.2}, value V {:.2}", m.reward, m.value));
            }
            if m.panels.advantage {
                lines.push(format!(
                    "advantage A = R - V = {:+.2}: {}",
                    m.advantage,
                    m.outlook.narrative()
                ));
            }
            if let Some(cue) = m.clip_bar {
                lines.push(format!(
                    "clip bar {:.0}% -> {:.0}%",
                    cue.from_width * 100.0,
                    cue.to_width * 100.0
                ));
            }
        }
        AnyMetrics::Cispo(m) => {
            if m.panels.show_sampling {
                lines.push(format!("behaviour log-prob {:.3}", m.behavior_log_prob));
            }
            if m.panels.show_ratio {
                lines.push(format!(
                    "current log-prob {:.3}, rho {:.4}",
                    m.current_log_prob, m.prob_ratio
                ));
            }
            if m.panels.show_clipping {
                lines.push(m.clip_bounds.to_string());
            }
        }
    }
    lines
}
