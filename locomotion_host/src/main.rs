//! Standalone host binary.
//!
//! Usage:
//!   cargo run -p locomotion_host -- [--config host.json] [--profile profile.json]
//!       [--tick-hz 50] [--frame-hz 60] [--ticks 600] [--scenario direct|point_and_click|wander]
//!
//! Runs one character through the chosen scenario and prints a JSON report.

use std::{env, fs, path::PathBuf, sync::Arc};

use anyhow::Context;
use locomotion_host::{Host, HostFile, Scenario};
use locomotion_shared::profile::InputProfile;
use tracing::info;

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    profile: Option<PathBuf>,
    tick_hz: Option<u32>,
    frame_hz: Option<u32>,
    ticks: Option<u32>,
    scenario: Option<String>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args::default();
    let argv: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < argv.len() {
        let value = argv.get(i + 1).cloned();
        match (argv[i].as_str(), value) {
            ("--config", Some(v)) => args.config = Some(PathBuf::from(v)),
            ("--profile", Some(v)) => args.profile = Some(PathBuf::from(v)),
            ("--tick-hz", Some(v)) => {
                args.tick_hz = Some(v.parse().with_context(|| format!("parse --tick-hz {v}"))?)
            }
            ("--frame-hz", Some(v)) => {
                args.frame_hz = Some(v.parse().with_context(|| format!("parse --frame-hz {v}"))?)
            }
            ("--ticks", Some(v)) => {
                args.ticks = Some(v.parse().with_context(|| format!("parse --ticks {v}"))?)
            }
            ("--scenario", Some(v)) => args.scenario = Some(v),
            _ => {
                i += 1;
                continue;
            }
        }
        i += 2;
    }
    Ok(args)
}

fn load_file(args: &Args) -> anyhow::Result<HostFile> {
    let Some(path) = &args.config else {
        return Ok(HostFile::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    HostFile::from_json_str(&text).with_context(|| format!("parse {}", path.display()))
}

fn load_profile(args: &Args) -> anyhow::Result<Option<Arc<InputProfile>>> {
    let Some(path) = &args.profile else {
        return Ok(None);
    };
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let profile =
        InputProfile::from_json_str(&text).with_context(|| format!("parse {}", path.display()))?;
    Ok(Some(Arc::new(profile)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = parse_args()?;
    let mut file = load_file(&args)?;
    let profile = load_profile(&args)?;

    if let Some(hz) = args.tick_hz {
        file.host.tick_hz = hz;
    }
    if let Some(hz) = args.frame_hz {
        file.host.frame_hz = hz;
    }
    if let Some(frames) = args.ticks {
        file.host.frames = frames;
    }
    if let Some(name) = &args.scenario {
        file.host.scenario = serde_json::from_value::<Scenario>(serde_json::Value::String(name.clone()))
            .with_context(|| format!("unknown scenario {name}"))?;
    }

    info!(
        tick_hz = file.host.tick_hz,
        frame_hz = file.host.frame_hz,
        frames = file.host.frames,
        scenario = ?file.host.scenario,
        profile = profile.as_ref().map(|p| p.name.as_str()),
        "Starting host"
    );

    let mut host = Host::new(file.host, file.controller, profile).context("create host")?;
    let report = host.run().await?;

    info!(frames = report.frames, position = ?report.position, "Run complete");
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
