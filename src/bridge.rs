//! External bridge commands.
//!
//! The registration engine and the catalog generator live in a third-party toolkit. A bridge
//! is a command (typically a small script importing that toolkit) that reads one JSON request
//! on stdin and writes its result on stdout. A non-zero exit status is reported as
//! [`WcsAlignError::EngineFailed`] with the captured stderr.
use std::{
    io::{self, Write},
    process::{Child, Command, Stdio},
};

use itertools::Itertools;
use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::wcsalign_errors::WcsAlignError;

/// Program and leading arguments of a bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl BridgeCommand {
    pub fn new(program: impl Into<String>) -> Self {
        BridgeCommand {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Command line as typed in a shell, for logs and error messages.
    pub fn display(&self) -> String {
        std::iter::once(&self.program).chain(&self.args).join(" ")
    }

    /// Run the bridge with `payload` serialized as JSON on stdin.
    ///
    /// Arguments
    /// -----------------
    /// * `role`: what the bridge is used for (`"registration"`, `"catalog"`), for errors.
    /// * `payload`: the request.
    ///
    /// Return
    /// ----------
    /// * The bridge stdout, or an error if it cannot be spawned or exits with a failure.
    pub fn run_json<T: Serialize>(
        &self,
        role: &'static str,
        payload: &T,
    ) -> Result<String, WcsAlignError> {
        if self.program.trim().is_empty() {
            return Err(WcsAlignError::EmptyBridgeCommand(role));
        }
        let body = serde_json::to_vec(payload)?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        debug!("Running {role} bridge: {:?}", cmd);

        let mut child = cmd.spawn()?;
        if let Some(stdin) = child.stdin.take() {
            send_request(&mut child, stdin, &body)?;
        }
        let output = child.wait_with_output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!("{role} bridge failed ({}): {stderr}", output.status);
            return Err(WcsAlignError::EngineFailed {
                command: self.display(),
                status: output.status.to_string(),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Write the request to the bridge stdin and close it.
///
/// A bridge may exit before reading its request; its exit status tells why, so a broken pipe
/// is not an error here. On any other write error the child is killed and reaped.
fn send_request<W: Write>(child: &mut Child, mut stdin: W, body: &[u8]) -> io::Result<()> {
    match stdin.write_all(body) {
        Err(e) if e.kind() != io::ErrorKind::BrokenPipe => {
            drop(stdin);
            if let Err(kill_err) = child.kill() {
                debug!("Could not kill bridge {}: {kill_err}", child.id());
            }
            child.wait()?;
            Err(e)
        }
        _ => Ok(()),
    }
}
