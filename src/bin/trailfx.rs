use std::{fs::File, io::BufReader, path::PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use trailfx::scenario::{self, Scenario};

#[derive(Parser, Debug)]
#[command(name = "trailfx", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a scenario headlessly and write the reveal report as JSON.
    Simulate(SimulateArgs),
    /// Parse and validate a scenario without running it.
    Validate(ValidateArgs),
}

#[derive(Parser, Debug)]
struct SimulateArgs {
    /// Input scenario JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output report JSON path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input scenario JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn load_scenario(path: &PathBuf) -> anyhow::Result<Scenario> {
    let file =
        File::open(path).with_context(|| format!("opening scenario {}", path.display()))?;
    let scenario: Scenario = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing scenario {}", path.display()))?;
    Ok(scenario)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Simulate(args) => {
            let scenario = load_scenario(&args.in_path)?;
            let report = scenario::run(&scenario).context("running scenario")?;
            let out = File::create(&args.out)
                .with_context(|| format!("creating report {}", args.out.display()))?;
            serde_json::to_writer_pretty(out, &report).context("writing report")?;
            println!(
                "simulated {} frames, {} reveals, final z {}",
                report.frames,
                report.reveals.len(),
                report.final_z_index
            );
        }
        Command::Validate(args) => {
            let scenario = load_scenario(&args.in_path)?;
            scenario.validate().context("validating scenario")?;
            println!(
                "ok: {} images, {} pointer samples, {} scroll samples",
                scenario.images.len(),
                scenario.pointer.len(),
                scenario.scroll.len()
            );
        }
    }
    Ok(())
}
