use crate::commands::command::parse_document_parameters;
use crate::commands::template::{CommandTemplate, MessageOutput, require_non_empty};
use crate::display::{or_dash, print_success, print_table, print_warning};
use ssm_async::model::{
    GetAutomationExecutionRequest, GetAutomationExecutionResponse,
    StartAutomationExecutionRequest, StartAutomationExecutionResponse,
    StopAutomationExecutionRequest,
};
use ssm_async::{CallFuture, SdkSsmClient, SimpleSystemsManagement, SsmAsyncClient, SsmError, TracingHandler};

pub struct StartAutomationCommand;

impl CommandTemplate for StartAutomationCommand {
    type Args = StartAutomationExecutionRequest;
    type Response = StartAutomationExecutionResponse;

    fn validate_args(&self, args: &Self::Args) -> Result<(), SsmError> {
        require_non_empty("Document name", &args.document_name)?;
        if let Some(token) = &args.client_token
            && uuid::Uuid::parse_str(token).is_err()
        {
            return Err(SsmError::InvalidArgument(format!(
                "Client token '{}' is not a UUID",
                token
            )));
        }
        Ok(())
    }

    fn submit(
        &self,
        client: &SsmAsyncClient,
        args: Self::Args,
    ) -> CallFuture<Self::Response, SsmError> {
        client.start_automation_execution_async_with_handler(
            args,
            TracingHandler::new("StartAutomationExecution"),
        )
    }

    fn format_table(&self, response: &Self::Response) {
        print_success(&format!(
            "Automation execution {} started",
            response.automation_execution_id
        ));
    }
}

pub struct AutomationStatusCommand;

impl CommandTemplate for AutomationStatusCommand {
    type Args = GetAutomationExecutionRequest;
    type Response = GetAutomationExecutionResponse;

    fn validate_args(&self, args: &Self::Args) -> Result<(), SsmError> {
        require_non_empty("Execution id", &args.automation_execution_id)
    }

    fn submit(
        &self,
        client: &SsmAsyncClient,
        args: Self::Args,
    ) -> CallFuture<Self::Response, SsmError> {
        client.get_automation_execution_async_with_handler(
            args,
            TracingHandler::new("GetAutomationExecution"),
        )
    }

    fn format_table(&self, response: &Self::Response) {
        let execution = &response.execution;
        let when = |t: Option<chrono::DateTime<chrono::Utc>>| {
            t.map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "-".to_string())
        };

        print_table(
            &["Execution", "Document", "Status", "Started", "Ended"],
            &[vec![
                execution.automation_execution_id.clone(),
                or_dash(execution.document_name.as_deref()),
                or_dash(execution.status.as_deref()),
                when(execution.started_at),
                when(execution.ended_at),
            ]],
        );

        if let Some(message) = execution.failure_message.as_deref().filter(|m| !m.is_empty()) {
            print_warning(message);
        }
    }
}

pub struct StopAutomationCommand;

impl CommandTemplate for StopAutomationCommand {
    type Args = StopAutomationExecutionRequest;
    type Response = MessageOutput;

    fn validate_args(&self, args: &Self::Args) -> Result<(), SsmError> {
        require_non_empty("Execution id", &args.automation_execution_id)
    }

    fn submit(
        &self,
        client: &SsmAsyncClient,
        args: Self::Args,
    ) -> CallFuture<Self::Response, SsmError> {
        client.invoke_with_handler(
            |ssm: &SdkSsmClient, request: &StopAutomationExecutionRequest| {
                ssm.stop_automation_execution(request).map(|_| {
                    MessageOutput::new(format!(
                        "Stop requested for automation execution {}",
                        request.automation_execution_id
                    ))
                })
            },
            args,
            TracingHandler::new("StopAutomationExecution"),
        )
    }

    fn format_table(&self, response: &Self::Response) {
        print_success(&response.message);
    }
}

pub async fn start(
    client: &SsmAsyncClient,
    format: &crate::OutputFormat,
    document_name: &str,
    parameters: &[String],
    client_token: Option<String>,
) -> Result<(), SsmError> {
    let args = StartAutomationExecutionRequest {
        document_name: document_name.to_string(),
        parameters: parse_document_parameters(parameters)?,
        // A fresh token per invocation keeps retries of this call idempotent
        client_token: Some(client_token.unwrap_or_else(|| uuid::Uuid::new_v4().to_string())),
    };
    StartAutomationCommand.execute(client, format, args).await
}

pub async fn status(
    client: &SsmAsyncClient,
    format: &crate::OutputFormat,
    execution_id: &str,
) -> Result<(), SsmError> {
    let args = GetAutomationExecutionRequest {
        automation_execution_id: execution_id.to_string(),
    };
    AutomationStatusCommand.execute(client, format, args).await
}

pub async fn stop(
    client: &SsmAsyncClient,
    format: &crate::OutputFormat,
    execution_id: &str,
) -> Result<(), SsmError> {
    let args = StopAutomationExecutionRequest {
        automation_execution_id: execution_id.to_string(),
    };
    StopAutomationCommand.execute(client, format, args).await
}
