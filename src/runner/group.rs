use std::path::PathBuf;

use anyhow::anyhow;
use subprocess::{Popen, PopenConfig};

use super::{RunnerError, RunnerResult};

/// Fully resolved invocation of one domain executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecSpec {
    pub argv: Vec<String>,
    pub cwd: PathBuf,
}

impl ExecSpec {
    fn popen_config(&self, setpgid: bool) -> PopenConfig {
        PopenConfig {
            cwd: Some(self.cwd.clone().into_os_string()),
            setpgid,
            ..Default::default()
        }
    }

    /// Spawns the command in its own process group, so an interrupt aimed at
    /// the foreground session does not reach it before cleanup.
    fn spawn_background(&self) -> Result<Popen, RunnerError> {
        log::debug!("Launching {:?} in {}", self.argv, self.cwd.display());
        Ok(Popen::create(&self.argv, self.popen_config(true))?)
    }

    /// Runs the command to completion, failing on non-zero exit.
    pub(crate) fn check_call(&self) -> RunnerResult {
        log::info!("Running {:?} in {}", self.argv, self.cwd.display());
        let mut proc = Popen::create(&self.argv, self.popen_config(false))?;
        let status = proc.wait()?;
        if status.success() {
            Ok(())
        } else {
            Err(RunnerError::Foreground(anyhow!("{:?} exited with {:?}", self.argv, status)))
        }
    }
}

/// Background half of a multi-domain run: every domain except the designated
/// foreground one, launched as child processes. Dropping the group terminates
/// and then waits on every child, on success, error and panic paths alike.
#[derive(Debug)]
pub struct BackgroundGroup {
    procs: Vec<Popen>,
}

impl BackgroundGroup {
    /// Starts all background children before returning, in the order the
    /// specs are given. A failure to launch any of them is fatal to the whole
    /// group; children already started are cleaned up through the drop path.
    pub fn launch(specs: &[(String, ExecSpec)], foreground: &str) -> Result<Self, RunnerError> {
        if !specs.iter().any(|(name, _)| name == foreground) {
            return Err(RunnerError::Domain(anyhow!(
                "Foreground domain {foreground:?} is not part of the build"
            )));
        }

        let mut group = BackgroundGroup { procs: Vec::new() };
        for (name, spec) in specs {
            if name == foreground {
                continue;
            }
            log::info!("Starting background domain {name}");
            group.procs.push(spec.spawn_background()?);
        }

        Ok(group)
    }

    pub fn pids(&self) -> Vec<u32> {
        self.procs.iter().filter_map(Popen::pid).collect()
    }

    pub fn len(&self) -> usize {
        self.procs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procs.is_empty()
    }
}

impl Drop for BackgroundGroup {
    fn drop(&mut self) {
        // Terminate everything first, then reap. Best effort: one failing
        // child must not leave the others running.
        for proc in &mut self.procs {
            if let Err(e) = proc.terminate() {
                log::warn!("Failed to terminate background domain process: {e}");
            }
        }
        for proc in &mut self.procs {
            if let Err(e) = proc.wait() {
                log::warn!("Failed to reap background domain process: {e}");
            }
        }
    }
}
