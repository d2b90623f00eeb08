use tracing::{error, warn};

/// Extension trait for silent error logging with caller location.
///
/// For recoverable failures where the binding system keeps going: a save
/// that could not write, a listing export the host fired without checking
/// the target directory. The caller location makes the log line point at
/// the call site rather than this module.
///
/// # Examples
///
/// ```ignore
/// use shortcut_kit::error::ResultExt;
///
/// shortcut_kit::shortcuts::save(system.table(), &path).log_err();
/// ```
pub trait ResultExt<T> {
    /// Log the error and return None. Use for recoverable failures.
    fn log_err(self) -> Option<T>;
    /// Log as a warning and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = ?err,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = ?err,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}
