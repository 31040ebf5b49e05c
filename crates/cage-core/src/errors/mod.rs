use std::error::Error;

/// Base trait for all application errors
pub trait CageError: Error + Send + Sync + 'static {
    /// Error code for programmatic handling
    fn error_code(&self) -> &'static str;

    /// Whether this error was caused by user input (a config file, a flag)
    /// rather than by the environment
    fn is_user_error(&self) -> bool {
        false
    }
}

/// Common result type for the application
pub type CageResult<T> = Result<T, Box<dyn CageError>>;
