use camino::Utf8Path;
use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming};

use crate::wcsalign_errors::WcsAlignError;

/// Start the global logger.
///
/// Without `log_dir` the log goes to stderr only, so it never mixes with the operator prompts
/// on stdout. With `log_dir` every record is written to rotating files in that directory and
/// warnings are duplicated to stderr.
///
/// The returned handle must be kept alive for the duration of the program.
pub fn setup_logging(
    base_level: &str,
    log_dir: Option<&Utf8Path>,
) -> Result<LoggerHandle, WcsAlignError> {
    let logger = Logger::try_with_str(base_level)?;
    let handle = match log_dir {
        Some(dir) => logger
            .log_to_file(
                FileSpec::default()
                    .directory(dir.as_std_path())
                    .basename("wcsalign"),
            )
            .duplicate_to_stderr(Duplicate::Warn)
            .rotate(
                Criterion::Size(1024 * 1024), //1MB
                Naming::Timestamps,
                Cleanup::KeepLogFiles(5),
            )
            .start()?,
        None => logger.log_to_stderr().start()?,
    };
    Ok(handle)
}
