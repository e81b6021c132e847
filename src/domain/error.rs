//! Domain error types.

/// Top-level error type for dcasim.
#[derive(Debug, thiserror::Error)]
pub enum DcaError {
    #[error("price data unavailable for {ticker}: {reason}")]
    DataUnavailable { ticker: String, reason: String },

    #[error("invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error(
        "insufficient history: {rows} months loaded, {valid_rows} with both indicators defined, need at least {required}"
    )]
    InsufficientHistory {
        rows: usize,
        valid_rows: usize,
        required: usize,
    },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DcaError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        DcaError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn unavailable(ticker: &str, reason: impl Into<String>) -> Self {
        DcaError::DataUnavailable {
            ticker: ticker.to_string(),
            reason: reason.into(),
        }
    }

    /// Process exit status reported by the CLI for this error.
    pub fn exit_status(&self) -> u8 {
        match self {
            DcaError::Io(_) => 1,
            DcaError::ConfigParse { .. } | DcaError::ConfigInvalid { .. } => 2,
            DcaError::InvalidInput { .. } => 3,
            DcaError::DataUnavailable { .. } | DcaError::InsufficientHistory { .. } => 5,
        }
    }
}

impl From<&DcaError> for std::process::ExitCode {
    fn from(err: &DcaError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_message() {
        let err = DcaError::invalid("monthly_invest", "must be positive");
        assert_eq!(err.to_string(), "invalid monthly_invest: must be positive");
    }

    #[test]
    fn data_unavailable_message() {
        let err = DcaError::unavailable("0050.TW", "empty series");
        assert_eq!(
            err.to_string(),
            "price data unavailable for 0050.TW: empty series"
        );
    }

    #[test]
    fn exit_status_by_category() {
        let io = DcaError::Io(std::io::Error::other("boom"));
        assert_eq!(io.exit_status(), 1);

        let cfg = DcaError::ConfigParse {
            file: "a.ini".into(),
            reason: "bad".into(),
        };
        assert_eq!(cfg.exit_status(), 2);

        let input = DcaError::invalid("cash_rate", "out of range");
        assert_eq!(input.exit_status(), 3);

        let data = DcaError::unavailable("X", "gone");
        assert_eq!(data.exit_status(), 5);

        let history = DcaError::InsufficientHistory {
            rows: 3,
            valid_rows: 0,
            required: 24,
        };
        assert_eq!(history.exit_status(), 5);
    }
}
