use nudge_core::error::Error;

/// Create a validation error for a construct the interpreter refuses to run
pub fn interpretation_error(message: impl Into<String>) -> Error {
    Error::Validation(message.into())
}

/// Create a type error naming the construct that received the bad operand
pub fn type_mismatch(context: impl Into<String>, message: impl Into<String>) -> Error {
    Error::type_mismatch(context, message)
}

// Convenience macros for generating interpretation errors

/// Macro to return early with an interpretation error
#[macro_export]
macro_rules! interp_bail {
    ($($arg:tt)*) => {
        return Err($crate::error::interpretation_error(format!($($arg)*)))
    };
}

/// Macro to ensure a condition is true, or return an interpretation error
#[macro_export]
macro_rules! interp_ensure {
    ($cond:expr, $($arg:tt)*) => {
        if !($cond) {
            $crate::interp_bail!($($arg)*);
        }
    };
}
