//! Domain error types.

/// Top-level error type for longshot.
#[derive(Debug, thiserror::Error)]
pub enum LongshotError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("shares must be a whole number between 1 and 100, got {shares}")]
    InvalidShares { shares: i64 },

    #[error("expected YES or NO, got {value:?}")]
    InvalidSide { value: String },

    #[error("username {username:?} already exists")]
    UsernameTaken { username: String },

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("password hashing failed: {reason}")]
    PasswordHash { reason: String },

    #[error("market {id} not found")]
    MarketNotFound { id: i64 },

    #[error("user {id} not found")]
    UserNotFound { id: i64 },

    #[error("no user named {username:?}")]
    UnknownUser { username: String },

    #[error("market {id} is not open for trading")]
    MarketClosed { id: i64 },

    #[error("market {id} is already resolved")]
    AlreadyResolved { id: i64 },

    #[error("only the market creator or an admin can resolve a market")]
    Forbidden,

    #[error("insufficient balance: trade costs {cost:.2}, balance is {balance:.2}")]
    InsufficientBalance { cost: f64, balance: f64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&LongshotError> for std::process::ExitCode {
    fn from(err: &LongshotError) -> Self {
        let code: u8 = match err {
            LongshotError::Io(_) | LongshotError::PasswordHash { .. } => 1,
            LongshotError::ConfigParse { .. }
            | LongshotError::ConfigMissing { .. }
            | LongshotError::ConfigInvalid { .. } => 2,
            LongshotError::Database { .. } | LongshotError::DatabaseQuery { .. } => 3,
            LongshotError::InvalidShares { .. }
            | LongshotError::InvalidSide { .. }
            | LongshotError::UsernameTaken { .. }
            | LongshotError::InvalidCredentials
            | LongshotError::InsufficientBalance { .. } => 4,
            LongshotError::MarketNotFound { .. }
            | LongshotError::UserNotFound { .. }
            | LongshotError::UnknownUser { .. } => 5,
            LongshotError::MarketClosed { .. }
            | LongshotError::AlreadyResolved { .. }
            | LongshotError::Forbidden => 6,
        };
        std::process::ExitCode::from(code)
    }
}
