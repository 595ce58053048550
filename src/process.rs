// src/process.rs

//! External command execution
//!
//! Every repository tool (reprepro, rpm, createrepo, restorecon) is invoked
//! through a [`CommandRunner`]. Failure of the tool is reported purely via
//! the exit code in [`CommandOutput`]; only a program that cannot be
//! started at all is an `Err`, and that error is fatal to the batch.

use crate::error::{Error, Result};
use std::process::Command;
use tracing::{debug, error};

/// Exit status and captured output of one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Output reported for a command that was not executed (dry-run)
    pub fn skipped() -> Self {
        Self {
            code: 0,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// Report a failed invocation with everything it printed
    pub fn log_failure(&self, context: &str) {
        error!("{}", context);
        error!("   ... RETURN CODE: {}", self.code);
        error!("   ... STDOUT: {}", self.stdout.trim_end());
        error!("   ... STDERR: {}", self.stderr.trim_end());
    }
}

/// Render a command line for echo and log output
pub fn cmdline(argv: &[String]) -> String {
    argv.join(" ")
}

/// Runs external programs
pub trait CommandRunner {
    /// Run `argv[0]` with the remaining arguments and wait for it to exit
    fn run(&self, argv: &[String]) -> Result<CommandOutput>;

    /// Best-effort invocation whose outcome is deliberately ignored
    ///
    /// A non-zero exit is expected (e.g. removing something that is not
    /// there) and only logged at debug level. A program that cannot be
    /// started is still reported, since every later call would fail too.
    fn fire_and_forget(&self, argv: &[String]) -> Result<()> {
        match self.run(argv) {
            Ok(output) if !output.success() => {
                debug!(
                    "ignoring exit code {} from: {}",
                    output.code,
                    cmdline(argv)
                );
                Ok(())
            }
            Ok(_) => Ok(()),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                debug!("ignoring failure of {}: {}", cmdline(argv), e);
                Ok(())
            }
        }
    }
}

/// Runs commands on the host, honouring dry-run and verbose echo
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner {
    pub dry_run: bool,
    pub verbose: bool,
}

impl SystemRunner {
    pub fn new(dry_run: bool, verbose: bool) -> Self {
        Self { dry_run, verbose }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, argv: &[String]) -> Result<CommandOutput> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| Error::InitError("Cannot run an empty command line".to_string()))?;

        if self.verbose {
            println!("{}", cmdline(argv));
        }
        if self.dry_run {
            return Ok(CommandOutput::skipped());
        }

        debug!("Executing: {}", cmdline(argv));
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| Error::ToolMissing {
                program: program.clone(),
                source: e,
            })?;

        Ok(CommandOutput {
            // Killed by a signal: no exit code, treat as failure
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
