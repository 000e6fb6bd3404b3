//! lawflow - inspect execution preconditions and law dependency tracks
//!
//! Reads an organisation snapshot file and prints results as JSON.

mod snapshot;

use std::path::{Path, PathBuf};

use anyhow::bail;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lawbook::{Address, Calldata, Law, Role, RoleDisplay, RolePalette};
use lawflow::{
    DependencyGraphBuilder, EngineConfig, EvaluationInput, EvaluationSession, EvaluationStatus,
    Flow, PreconditionChecker,
};

use crate::snapshot::SnapshotFile;

#[derive(Debug, Parser)]
#[command(name = "lawflow", version, about = "Governance precondition checks and dependency tracks")]
struct Args {
    /// Log level when RUST_LOG is not set
    #[arg(long, env = "LAWFLOW_LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    /// Engine configuration (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Evaluate whether an action may execute at a block
    Check {
        #[arg(long)]
        snapshot: PathBuf,
        /// Target law address
        #[arg(long)]
        law: Address,
        /// 0x-prefixed calldata
        #[arg(long, default_value = "0x")]
        calldata: Calldata,
        #[arg(long)]
        description: String,
        #[arg(long)]
        caller: Address,
        /// Block number in the protocol's block domain
        #[arg(long)]
        block: u64,
    },
    /// Print execution tracks and orphan laws
    Tracks {
        #[arg(long)]
        snapshot: PathBuf,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => Ok(EngineConfig::from_file(path)?),
        None => Ok(EngineConfig::default()),
    }
}

/// A law as printed by `tracks`, with its role resolved through the palette.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TrackStep<'a> {
    law: &'a Address,
    name: &'a str,
    allowed_role: Role,
    role: RoleDisplay,
}

#[derive(Debug, Serialize)]
struct TracksOutput<'a> {
    tracks: Vec<Vec<TrackStep<'a>>>,
    orphans: Vec<TrackStep<'a>>,
}

impl<'a> TracksOutput<'a> {
    fn new(flow: &'a Flow, palette: &RolePalette) -> Self {
        let step = |law: &'a Law| TrackStep {
            law: &law.law,
            name: &law.name,
            allowed_role: law.allowed_role,
            role: palette.display(law.allowed_role),
        };
        Self {
            tracks: flow.tracks.iter().map(|t| t.iter().map(step).collect()).collect(),
            orphans: flow.orphans.iter().map(step).collect(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("lawflow={0},lawbook={0},warn", args.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_config(args.config.as_deref())?;
    info!(block_domain = ?config.block_domain, "Loaded engine configuration");

    match args.command {
        Command::Check {
            snapshot,
            law,
            calldata,
            description,
            caller,
            block,
        } => {
            let snapshot = SnapshotFile::load(&snapshot)?;
            let org = &snapshot.organisation;
            let Some(target) = org.active_law(&law) else {
                match org.law(&law) {
                    Some(known) => bail!("law {} ({}) is no longer active in {}", law, known.name, org.address),
                    None => bail!("law {} is not part of {}", law, org.address),
                }
            };

            let chain = snapshot.chain().await;
            let executions = snapshot.execution_index();
            let input = EvaluationInput {
                law: target,
                calldata: &calldata,
                description: &description,
                caller: &caller,
                proposals: &snapshot.organisation.proposals,
                current_block: block,
            };

            let checker = PreconditionChecker::with_config(config.checker.clone());
            let session = EvaluationSession::new();
            session.run(&checker, &chain, &input, &executions).await;

            let status = session.status().await;
            println!("{}", serde_json::to_string_pretty(&status)?);
            if let EvaluationStatus::Failed { error, .. } = status {
                bail!("evaluation failed: {}", error);
            }
        }
        Command::Tracks { snapshot } => {
            let snapshot = SnapshotFile::load(&snapshot)?;
            let palette = config.role_palette()?;
            let flow = DependencyGraphBuilder::with_config(config.graph.clone())
                .build(&snapshot.organisation.active_laws)?;
            let output = TracksOutput::new(&flow, &palette);
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lawbook::{Dependency, LawConfig};

    fn law(n: u8, role: Role, config: LawConfig) -> Law {
        Law {
            law: Address::new([n; 20]),
            name: format!("Law {}", n),
            description: String::new(),
            allowed_role: role,
            config,
        }
    }

    #[test]
    fn test_tracks_output_resolves_roles() {
        let start = law(1, Role::Public, LawConfig::default());
        let end = law(
            2,
            Role::Numbered(1),
            LawConfig {
                need_completed: Dependency::On(start.law),
                ..Default::default()
            },
        );
        let flow = DependencyGraphBuilder::new().build(&[start, end]).unwrap();

        let palette =
            RolePalette::new(vec![(Role::Numbered(1), RoleDisplay::new("Members", "#2563eb"))]).unwrap();
        let json = serde_json::to_value(TracksOutput::new(&flow, &palette)).unwrap();

        let track = &json["tracks"][0];
        assert_eq!(track[0]["role"]["label"], "Public");
        assert_eq!(track[1]["role"]["label"], "Members");
        assert_eq!(track[1]["allowedRole"], 1);
        assert_eq!(json["orphans"].as_array().unwrap().len(), 0);
    }
}
