use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use simplelog as sl;

use gateway_hil::runner::{BinaryRunner, BsimArgs, BsimRunner, RunnerCommand, RunnerConfig};

/// Launches BabbleSim-simulated multi-domain firmware builds.
#[derive(Debug, Parser)]
#[command(name = "bsim-runner")]
struct Cli {
    /// Runner command to carry out ("flash" or "debug")
    command: String,

    /// Build directory containing the domain description
    #[arg(long, default_value = ".")]
    build_dir: PathBuf,

    /// Firmware executable, relative to a domain's build directory
    #[arg(long)]
    exe_file: Option<PathBuf>,

    /// GDB executable used for debug sessions
    #[arg(long)]
    gdb: Option<String>,

    #[command(flatten)]
    bsim: BsimArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _ = sl::TermLogger::init(
        sl::LevelFilter::Info,
        sl::Config::default(),
        sl::TerminalMode::Mixed,
        sl::ColorChoice::Auto,
    );

    let command = RunnerCommand::from_str(&cli.command)
        .map_err(|_| anyhow::anyhow!("Unknown command {:?}", cli.command))?;

    let cfg = RunnerConfig { build_dir: cli.build_dir, exe_file: cli.exe_file, gdb: cli.gdb };
    let mut runner = BsimRunner::new(cfg, cli.bsim)?;

    if !runner.capabilities().commands.contains(&command) {
        anyhow::bail!("Command {command} is not supported by this runner");
    }

    runner.do_run(command)?;
    Ok(())
}
