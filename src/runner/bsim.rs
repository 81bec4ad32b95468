use std::path::PathBuf;

use anyhow::anyhow;
use rand::Rng;

use crate::domains::{Domains, DOMAINS_FILE_NAME};

use super::{
    group::{BackgroundGroup, ExecSpec},
    BinaryRunner, RunnerCaps, RunnerCommand, RunnerConfig, RunnerError, RunnerResult,
};

const SIM_ID_LENGTH: usize = 16;

/// Command line arguments understood by the BabbleSim runner.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct BsimArgs {
    /// String which uniquely identifies the simulation
    #[arg(long)]
    pub bsim_id: Option<String>,

    /// Device number of the first launched domain
    #[arg(long)]
    pub bsim_dev: Option<u32>,

    /// Additional argument passed to every domain executable
    #[arg(long = "bsim-arg")]
    pub bsim_args: Vec<String>,

    /// Domain to run; may be given multiple times, defaults to all domains
    #[arg(long = "domain")]
    pub domains: Vec<String>,

    /// Domain name of the program to run/debug in the foreground
    #[arg(long)]
    pub foreground_domain: Option<String>,

    /// Use GDB's TUI mode for debug sessions
    #[arg(long)]
    pub tui: bool,
}

/// Runs a BabbleSim firmware build: all selected domains are launched as
/// cooperating OS processes, with one of them in the foreground.
#[derive(Debug)]
pub struct BsimRunner {
    cfg: RunnerConfig,
    exe_file: PathBuf,
    domains: Option<Domains>,
    selected: Vec<String>,
    foreground: Option<String>,
    sim_id: String,
    dev_base: u32,
    extra_args: Vec<String>,
    tui: bool,
}

impl BsimRunner {
    pub fn new(cfg: RunnerConfig, args: BsimArgs) -> Result<Self, RunnerError> {
        let exe_file = cfg.exe_file.clone().ok_or_else(|| {
            RunnerError::Configuration(anyhow!(
                "The provided runner configuration is missing the required field 'exe_file'"
            ))
        })?;

        let domains_file = cfg.build_dir.join(DOMAINS_FILE_NAME);
        let domains =
            if domains_file.exists() { Some(Domains::from_file(&domains_file)?) } else { None };

        let selected = match &domains {
            Some(domains) if args.domains.is_empty() => {
                domains.in_flash_order().iter().map(|d| d.name.clone()).collect()
            }
            Some(domains) => {
                for (i, name) in args.domains.iter().enumerate() {
                    if domains.get(name).is_none() {
                        return Err(RunnerError::Domain(anyhow!("Unknown domain {name:?}")));
                    }
                    if args.domains[..i].contains(name) {
                        return Err(RunnerError::Domain(anyhow!(
                            "Domain {name:?} is selected more than once"
                        )));
                    }
                }
                args.domains.clone()
            }
            None => {
                if !args.domains.is_empty() {
                    return Err(RunnerError::Domain(anyhow!(
                        "Domains were selected but this build has no domain description"
                    )));
                }
                Vec::new()
            }
        };

        let foreground = args.foreground_domain.clone().or_else(|| selected.last().cloned());
        let sim_id = args.bsim_id.clone().unwrap_or_else(random_sim_id);

        Ok(BsimRunner {
            cfg,
            exe_file,
            domains,
            selected,
            foreground,
            sim_id,
            dev_base: args.bsim_dev.unwrap_or(0),
            extra_args: args.bsim_args,
            tui: args.tui,
        })
    }

    pub fn sim_id(&self) -> &str {
        &self.sim_id
    }

    pub fn foreground_domain(&self) -> Option<&str> {
        self.foreground.as_deref()
    }

    /// Launch command of every selected domain, in flash order. Device
    /// numbers are assigned sequentially from the configured base.
    pub fn exec_specs(&self) -> Result<Vec<(String, ExecSpec)>, RunnerError> {
        let domains = self
            .domains
            .as_ref()
            .ok_or_else(|| RunnerError::Domain(anyhow!("This build has no domain description")))?;

        let mut specs = Vec::new();
        for (index, name) in self.selected.iter().enumerate() {
            let domain = domains
                .get(name)
                .ok_or_else(|| RunnerError::Domain(anyhow!("Unknown domain {name:?}")))?;

            let exe = domain.build_dir.join(&self.exe_file);
            let mut argv = vec![
                exe.to_string_lossy().into_owned(),
                format!("-s={}", self.sim_id),
                format!("-d={}", self.dev_base + index as u32),
            ];
            argv.extend(self.extra_args.iter().cloned());

            specs.push((name.clone(), ExecSpec { argv, cwd: domain.build_dir.clone() }));
        }

        Ok(specs)
    }

    fn single_exec_spec(&self) -> ExecSpec {
        ExecSpec {
            argv: vec![self.cfg.build_dir.join(&self.exe_file).to_string_lossy().into_owned()],
            cwd: self.cfg.build_dir.clone(),
        }
    }

    fn gdb_cmd(&self) -> Result<Vec<String>, RunnerError> {
        let gdb = self.cfg.gdb.clone().ok_or_else(|| {
            RunnerError::Configuration(anyhow!("Debugging requested but no GDB is configured"))
        })?;

        let mut cmd = vec![gdb];
        if self.tui {
            cmd.push("-tui".into());
        }
        cmd.push("--quiet".into());
        Ok(cmd)
    }

    /// Resolves the foreground domain's launch command, failing when the
    /// domain is not part of the computed mapping.
    fn foreground_spec<'a>(
        &self,
        specs: &'a [(String, ExecSpec)],
    ) -> Result<(&'a str, &'a ExecSpec), RunnerError> {
        let name = self
            .foreground
            .as_deref()
            .ok_or_else(|| RunnerError::Domain(anyhow!("No foreground domain selected")))?;

        specs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(n, spec)| (n.as_str(), spec))
            .ok_or_else(|| {
                RunnerError::Domain(anyhow!("Foreground domain {name:?} is not part of the build"))
            })
    }

    fn do_flash(&self) -> RunnerResult {
        if self.domains.is_none() {
            // Single image build, nothing to coordinate
            return self.single_exec_spec().check_call();
        }

        let specs = self.exec_specs()?;
        let (name, fg_spec) = self.foreground_spec(&specs)?;

        let group = BackgroundGroup::launch(&specs, name)?;
        log::info!("Running foreground domain {name} (simulation {})", self.sim_id);
        let result = fg_spec.check_call();
        drop(group);
        result
    }

    fn do_debug(&self) -> RunnerResult {
        let gdb_cmd = self.gdb_cmd()?;

        if self.domains.is_none() {
            let single = self.single_exec_spec();
            let mut argv = gdb_cmd;
            argv.extend(single.argv);
            return ExecSpec { argv, cwd: single.cwd }.check_call();
        }

        let specs = self.exec_specs()?;
        let (name, fg_spec) = self.foreground_spec(&specs)?;

        let mut argv = gdb_cmd;
        argv.push("--args".into());
        argv.extend(fg_spec.argv.iter().cloned());
        let debug_spec = ExecSpec { argv, cwd: fg_spec.cwd.clone() };

        let group = BackgroundGroup::launch(&specs, name)?;
        log::info!("Debugging foreground domain {name} (simulation {})", self.sim_id);
        let result = debug_spec.check_call();
        drop(group);
        result
    }
}

impl BinaryRunner for BsimRunner {
    fn capabilities(&self) -> RunnerCaps {
        RunnerCaps { commands: vec![RunnerCommand::Flash, RunnerCommand::Debug] }
    }

    fn do_run(&mut self, command: RunnerCommand) -> RunnerResult {
        match command {
            RunnerCommand::Flash => self.do_flash(),
            RunnerCommand::Debug => self.do_debug(),
        }
    }
}

fn random_sim_id() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    (0..SIM_ID_LENGTH).map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char).collect()
}
