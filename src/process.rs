use std::fmt;
use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::Command;

/// Captured result of a finished subprocess.
#[derive(Debug)]
pub struct CmdOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CmdOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Stdout followed by stderr, both trimmed, joined with a newline.
    pub fn combined(&self) -> String {
        let stdout = self.stdout.trim();
        let stderr = self.stderr.trim();
        match (stdout.is_empty(), stderr.is_empty()) {
            (true, true) => String::new(),
            (false, true) => stdout.to_string(),
            (true, false) => stderr.to_string(),
            (false, false) => format!("{stdout}\n{stderr}"),
        }
    }
}

#[derive(Debug)]
pub enum ExecError {
    /// The deadline elapsed; the child has been killed.
    Timeout { program: String, after: Duration },
    /// The command could not be spawned or waited on.
    Spawn { program: String, source: io::Error },
}

impl ExecError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ExecError::Timeout { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ExecError::Spawn { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecError::Timeout { program, after } => {
                write!(f, "{program} timed out after {}s", after.as_secs())
            }
            ExecError::Spawn { program, source } if source.kind() == io::ErrorKind::NotFound => {
                write!(f, "command not found: {program}")
            }
            ExecError::Spawn { program, source } => {
                write!(f, "failed to run {program}: {source}")
            }
        }
    }
}

impl std::error::Error for ExecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecError::Timeout { .. } => None,
            ExecError::Spawn { source, .. } => Some(source),
        }
    }
}

/// Run `argv` to completion with a deadline, capturing stdout and stderr.
///
/// The child is spawned with `kill_on_drop`, so hitting the deadline drops the
/// wait future and force-kills the process rather than orphaning it.
pub async fn run(
    argv: &[String],
    cwd: Option<&Path>,
    timeout: Duration,
) -> Result<CmdOutput, ExecError> {
    let Some((program, args)) = argv.split_first() else {
        return Err(ExecError::Spawn {
            program: String::new(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "empty command line"),
        });
    };

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let child = command.spawn().map_err(|source| ExecError::Spawn {
        program: program.clone(),
        source,
    })?;

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => Ok(CmdOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }),
        Ok(Err(source)) => Err(ExecError::Spawn {
            program: program.clone(),
            source,
        }),
        Err(_) => Err(ExecError::Timeout {
            program: program.clone(),
            after: timeout,
        }),
    }
}
