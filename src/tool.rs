// Argument-vector subprocess invocation with captured output.
//
// Every external collaborator (ar, xz, tar, xdelta3, dpkg-deb, dpkg-name,
// md5sum) goes through here. Arguments are passed as an explicit vector,
// never interpolated into a shell string; exit codes are checked and a
// non-zero exit surfaces as `ExternalTool` carrying the captured output.

use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Output};

use log::debug;

use crate::error::{DeltaError, Result};

/// Run `program` with `args`, capturing stdout.
pub fn run<I, S>(program: &str, args: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_command(Command::new(program), program, args)
}

/// Same as [`run`], but with an explicit working directory for the child.
///
/// The working directory applies to the child process only; the invoking
/// process never changes its own directory.
pub fn run_in<I, S>(program: &str, args: I, cwd: &Path) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(program);
    cmd.current_dir(cwd);
    run_command(cmd, program, args)
}

/// Same as [`run`], but with the C locale forced. For tools whose textual
/// output gets parsed afterwards.
pub fn run_plain_locale<I, S>(program: &str, args: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(program);
    cmd.env("LC_ALL", "C").env("LANG", "C").env_remove("LANGUAGE");
    run_command(cmd, program, args)
}

fn run_command<I, S>(mut cmd: Command, program: &str, args: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    cmd.args(args);
    debug!("exec: {cmd:?}");

    let output = cmd.output().map_err(|e| DeltaError::ExternalTool {
        tool: program.to_string(),
        reason: format!("spawn failed: {e}"),
        stdout: String::new(),
        stderr: String::new(),
    })?;
    check_exit(program, output)
}

fn check_exit(program: &str, output: Output) -> Result<Vec<u8>> {
    if output.status.success() {
        Ok(output.stdout)
    } else {
        Err(DeltaError::ExternalTool {
            tool: program.to_string(),
            reason: output.status.to_string(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
