//! Result type alias for Lectern

use super::errors::LecternError;

/// Result type alias for Lectern operations
///
/// # Examples
///
/// ```
/// use lectern::domain::result::Result;
/// use lectern::domain::errors::LecternError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(LecternError::Other("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, LecternError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(LecternError::Other("test error".to_string()));
        assert!(result.is_err());
    }
}
