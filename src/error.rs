//! Application error type.
//!
//! Exit codes:
//! - `1`: input path missing or not a file
//! - `2`: input unreadable / unparseable
//! - `3`: no usable rows after loading
//! - `4`: an output file could not be written

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn input_missing(message: impl Into<String>) -> Self {
        Self::new(1, message)
    }

    pub fn unreadable(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }

    pub fn no_data(message: impl Into<String>) -> Self {
        Self::new(3, message)
    }

    pub fn output(message: impl Into<String>) -> Self {
        Self::new(4, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error: {}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_carry_distinct_exit_codes() {
        assert_eq!(AppError::input_missing("x").exit_code(), 1);
        assert_eq!(AppError::unreadable("x").exit_code(), 2);
        assert_eq!(AppError::no_data("x").exit_code(), 3);
        assert_eq!(AppError::output("x").exit_code(), 4);
    }

    #[test]
    fn display_prefixes_message() {
        let err = AppError::input_missing("File not found: data.csv");
        assert_eq!(err.to_string(), "Error: File not found: data.csv");
        assert_eq!(err.message(), "File not found: data.csv");
    }
}
