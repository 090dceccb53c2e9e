use log::info;

use super::{RegistrationEngine, RegistrationReport, RegistrationRequest};
use crate::{bridge::BridgeCommand, wcsalign_errors::WcsAlignError};

/// [`RegistrationEngine`] running a tweakreg bridge command.
///
/// The bridge receives the [`RegistrationRequest`] as JSON and prints its fit diagnostics
/// on stdout; every non-empty line becomes one entry of the report.
#[derive(Debug, Clone)]
pub struct ExternalEngine {
    command: BridgeCommand,
}

impl ExternalEngine {
    pub fn new(command: BridgeCommand) -> Self {
        ExternalEngine { command }
    }

    pub fn command(&self) -> &BridgeCommand {
        &self.command
    }
}

impl RegistrationEngine for ExternalEngine {
    fn register(
        &mut self,
        request: &RegistrationRequest,
    ) -> Result<RegistrationReport, WcsAlignError> {
        info!(
            "tweakreg on {} file(s), updatehdr={}, wcsname={}",
            request.files.len(),
            request.updatehdr,
            request.wcsname
        );
        let stdout = self.command.run_json("registration", request)?;
        Ok(RegistrationReport {
            diagnostics: stdout
                .lines()
                .map(str::trim_end)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect(),
        })
    }
}
