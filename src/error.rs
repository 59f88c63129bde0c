use crate::executor::CallError;
use aws_sdk_ssm::error::{DisplayErrorContext, ErrorMetadata, ProvideErrorMetadata, SdkError};
use aws_sdk_ssm::operation::RequestId;
use std::error::Error;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum SsmError {
    Io(io::Error),
    SerdeJson(serde_json::Error),
    Config(String),
    InvalidArgument(String),
    /// The call could not be attempted or did not complete (dispatch,
    /// timeout, connectivity, client already shut down).
    Client(String),
    /// The service received the request and rejected it.
    Service {
        code: String,
        message: String,
        request_id: Option<String>,
    },
}

impl SsmError {
    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        SsmError::Service {
            code: code.into(),
            message: message.into(),
            request_id: None,
        }
    }

    pub fn from_metadata(meta: &ErrorMetadata) -> Self {
        SsmError::Service {
            code: meta.code().unwrap_or("Unknown").to_string(),
            message: meta.message().unwrap_or_default().to_string(),
            request_id: meta.request_id().map(str::to_string),
        }
    }

    /// Service error code, if the service rejected the request.
    pub fn code(&self) -> Option<&str> {
        match self {
            SsmError::Service { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn is_service_error(&self) -> bool {
        matches!(self, SsmError::Service { .. })
    }
}

impl fmt::Display for SsmError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SsmError::Io(e) => write!(f, "IO error: {}", e),
            SsmError::SerdeJson(e) => write!(f, "JSON serialization error: {}", e),
            SsmError::Config(msg) => write!(f, "Configuration error: {}", msg),
            SsmError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            SsmError::Client(msg) => write!(f, "Client error: {}", msg),
            SsmError::Service {
                code,
                message,
                request_id,
            } => {
                write!(f, "Service error {}: {}", code, message)?;
                if let Some(id) = request_id {
                    write!(f, " (request id {})", id)?;
                }
                Ok(())
            }
        }
    }
}

impl Error for SsmError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SsmError::Io(e) => Some(e),
            SsmError::SerdeJson(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for SsmError {
    fn from(error: io::Error) -> Self {
        SsmError::Io(error)
    }
}

impl From<serde_json::Error> for SsmError {
    fn from(error: serde_json::Error) -> Self {
        SsmError::SerdeJson(error)
    }
}

impl<E, R> From<SdkError<E, R>> for SsmError
where
    E: ProvideErrorMetadata + Error + Send + Sync + 'static,
    R: fmt::Debug + Send + Sync + 'static,
{
    fn from(error: SdkError<E, R>) -> Self {
        match &error {
            SdkError::ServiceError(context) => SsmError::from_metadata(context.err().meta()),
            _ => SsmError::Client(DisplayErrorContext(&error).to_string()),
        }
    }
}

/// Collapses pool-level outcomes into the crate error; delegate errors
/// come back out unchanged.
impl From<CallError<SsmError>> for SsmError {
    fn from(error: CallError<SsmError>) -> Self {
        match error {
            CallError::Delegate(e) => e,
            other => SsmError::Client(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_from_metadata() {
        let meta = ErrorMetadata::builder()
            .code("ThrottlingException")
            .message("Rate exceeded")
            .build();

        let error = SsmError::from_metadata(&meta);
        assert_eq!(error.code(), Some("ThrottlingException"));
        assert!(error.is_service_error());
        assert_eq!(
            error.to_string(),
            "Service error ThrottlingException: Rate exceeded"
        );
    }

    #[test]
    fn test_metadata_without_code() {
        let meta = ErrorMetadata::builder().build();
        let error = SsmError::from_metadata(&meta);
        assert_eq!(error.code(), Some("Unknown"));
    }

    #[test]
    fn test_call_error_unwraps_delegate_error() {
        let error: SsmError = CallError::Delegate(SsmError::service("ParameterNotFound", "gone")).into();
        assert_eq!(error.code(), Some("ParameterNotFound"));

        let error: SsmError = CallError::<SsmError>::Rejected.into();
        assert!(matches!(error, SsmError::Client(_)));
    }
}
