// Error reporting utilities
// Views catch a failed operation, report it here and keep their previous state.

use crate::context::ErrorContext;
use crate::types::SkribeError;

/// Log a failed operation with its context
pub fn report_error(context: &ErrorContext, error: &SkribeError) {
    let session_id = context.session_id.as_deref().unwrap_or("-");
    if error.is_transient() {
        tracing::warn!(
            operation = %context.operation,
            session_id = %session_id,
            correlation_id = %context.correlation_id,
            error_code = error.code(),
            error_type = error.error_type(),
            "Operation failed: {}",
            error
        );
    } else {
        tracing::error!(
            operation = %context.operation,
            session_id = %session_id,
            correlation_id = %context.correlation_id,
            error_code = error.code(),
            error_type = error.error_type(),
            "Operation failed: {}",
            error
        );
    }
}

/// Run `result` through [`report_error`] and turn it into an `Option`
pub fn log_and_continue<T>(context: &ErrorContext, result: Result<T, SkribeError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            report_error(context, &error);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_and_continue_swallows_errors() {
        let ctx = ErrorContext::new("generate_qr_code");
        let failed: Result<u8, SkribeError> = Err(SkribeError::NetworkError("refused".into()));

        assert_eq!(log_and_continue(&ctx, Ok(7)), Some(7));
        assert_eq!(log_and_continue(&ctx, failed), None);
    }
}
