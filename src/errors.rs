use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompositeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed line in an input file (ss_dis, fasta, interval table).
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("invalid interval {interval} for chain {chain}: {reason}")]
    InvalidInterval {
        chain: String,
        interval: String,
        reason: String,
    },

    #[error("invalid annotation for chain {chain}: {reason}")]
    InvalidAnnotation { chain: String, reason: String },

    #[error("length mismatch in {context}: expected {expected}, found {found}")]
    LengthMismatch {
        context: String,
        expected: usize,
        found: usize,
    },

    #[error("protein {protein} has {found} usable chains, at least {required} required")]
    TooFewChains {
        protein: String,
        found: usize,
        required: usize,
    },

    #[error("no sequence found for protein {protein}")]
    MissingProtein { protein: String },

    #[error("empty input: {0}")]
    EmptyInput(String),
}

pub type Result<T> = std::result::Result<T, CompositeError>;

impl CompositeError {
    pub fn length_mismatch(context: impl Into<String>, expected: usize, found: usize) -> Self {
        Self::LengthMismatch {
            context: context.into(),
            expected,
            found,
        }
    }

    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}
