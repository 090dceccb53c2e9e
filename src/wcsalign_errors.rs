use thiserror::Error;

#[derive(Error, Debug)]
pub enum WcsAlignError {
    #[error("Missing header keyword {keyword} in {file}")]
    MissingHeaderKeyword { file: String, keyword: String },

    #[error("No file matches the input list: {0}")]
    EmptyFileList(String),

    #[error("Invalid file pattern: {0}")]
    InvalidPattern(#[from] glob::PatternError),

    #[error("Unable to read a globbed path: {0}")]
    GlobError(#[from] glob::GlobError),

    #[error("UTF-8 Path error: {0}")]
    Utf8PathError(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Header file not found: {0}")]
    HeaderNotFound(String),

    #[cfg(feature = "fits")]
    #[error("FITS error: {0}")]
    FitsError(#[from] fitsio::errors::Error),

    #[error("Bridge command is empty for {0}")]
    EmptyBridgeCommand(&'static str),

    #[error("External command `{command}` failed ({status}): {stderr}")]
    EngineFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML configuration error: {0}")]
    YamlError(#[from] serde_yml::Error),

    #[error("Catalog table error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Console input closed before the session was confirmed")]
    ConsoleClosed,

    #[error("Logger initialization failed: {0}")]
    LoggerError(#[from] flexi_logger::FlexiLoggerError),
}

impl PartialEq for WcsAlignError {
    fn eq(&self, other: &Self) -> bool {
        use WcsAlignError::*;
        match (self, other) {
            (
                MissingHeaderKeyword {
                    file: fa,
                    keyword: ka,
                },
                MissingHeaderKeyword {
                    file: fb,
                    keyword: kb,
                },
            ) => fa == fb && ka == kb,
            (EmptyFileList(a), EmptyFileList(b)) => a == b,
            (Utf8PathError(a), Utf8PathError(b)) => a == b,
            (HeaderNotFound(a), HeaderNotFound(b)) => a == b,
            (EmptyBridgeCommand(a), EmptyBridgeCommand(b)) => a == b,
            (
                EngineFailed {
                    command: ca,
                    status: sa,
                    ..
                },
                EngineFailed {
                    command: cb,
                    status: sb,
                    ..
                },
            ) => ca == cb && sa == sb,

            // payloads are not comparable: same variant is enough
            (InvalidPattern(_), InvalidPattern(_)) => true,
            (GlobError(_), GlobError(_)) => true,
            (IoError(_), IoError(_)) => true,
            #[cfg(feature = "fits")]
            (FitsError(_), FitsError(_)) => true,
            (JsonError(_), JsonError(_)) => true,
            (YamlError(_), YamlError(_)) => true,
            (CsvError(_), CsvError(_)) => true,
            (LoggerError(_), LoggerError(_)) => true,

            (ConsoleClosed, ConsoleClosed) => true,

            _ => false,
        }
    }
}
