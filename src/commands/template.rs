use crate::OutputFormat;
use crate::display::format_json_output;
use serde::Serialize;
use ssm_async::{CallFuture, SsmAsyncClient, SsmError};

/// Template method trait for ssm-async commands
pub trait CommandTemplate {
    /// Input arguments type for this command
    type Args;
    /// Response produced by the call this command submits
    type Response: Serialize + Send + 'static;

    fn validate_args(&self, _args: &Self::Args) -> Result<(), SsmError> {
        Ok(())
    }

    /// Submit the call to the client's worker pool.
    fn submit(
        &self,
        client: &SsmAsyncClient,
        args: Self::Args,
    ) -> CallFuture<Self::Response, SsmError>;

    fn format_table(&self, response: &Self::Response);

    fn format_output(&self, response: Self::Response, format: &OutputFormat) -> Result<(), SsmError> {
        match format {
            OutputFormat::Json => println!("{}", format_json_output(&response)?),
            OutputFormat::Table => self.format_table(&response),
        }
        Ok(())
    }

    async fn execute(
        &self,
        client: &SsmAsyncClient,
        format: &OutputFormat,
        args: Self::Args,
    ) -> Result<(), SsmError> {
        self.validate_args(&args)?;
        let response = self.submit(client, args).await?;
        self.format_output(response, format)
    }
}

/// Response for calls whose only output is a confirmation message.
#[derive(Debug, Serialize)]
pub struct MessageOutput {
    pub message: String,
}

impl MessageOutput {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub fn require_non_empty(field: &str, value: &str) -> Result<(), SsmError> {
    if value.trim().is_empty() {
        return Err(SsmError::InvalidArgument(format!(
            "{} cannot be empty",
            field
        )));
    }
    Ok(())
}
