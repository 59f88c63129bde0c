use crate::commands::template::{CommandTemplate, MessageOutput, require_non_empty};
use crate::display::{or_dash, print_block, print_success, print_table};
use ssm_async::model::{
    CancelCommandRequest, GetCommandInvocationRequest, GetCommandInvocationResponse,
    SendCommandRequest, SendCommandResponse,
};
use ssm_async::{CallFuture, SdkSsmClient, SimpleSystemsManagement, SsmAsyncClient, SsmError, TracingHandler};
use std::collections::BTreeMap;

/// Parse repeated `KEY=VALUE` arguments into document parameters.
///
/// Repeating a key appends to its value list, which is how list-valued
/// parameters such as `commands` are passed.
pub fn parse_document_parameters(
    pairs: &[String],
) -> Result<BTreeMap<String, Vec<String>>, SsmError> {
    let mut parameters: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .filter(|(key, _)| !key.trim().is_empty())
            .ok_or_else(|| {
                SsmError::InvalidArgument(format!(
                    "parameter '{}' must be in KEY=VALUE form",
                    pair
                ))
            })?;
        parameters
            .entry(key.trim().to_string())
            .or_default()
            .push(value.to_string());
    }

    Ok(parameters)
}

pub struct SendCommand;

impl CommandTemplate for SendCommand {
    type Args = SendCommandRequest;
    type Response = SendCommandResponse;

    fn validate_args(&self, args: &Self::Args) -> Result<(), SsmError> {
        require_non_empty("Document name", &args.document_name)?;
        if args.instance_ids.is_empty() {
            return Err(SsmError::InvalidArgument(
                "At least one --instance is required".to_string(),
            ));
        }
        Ok(())
    }

    fn submit(
        &self,
        client: &SsmAsyncClient,
        args: Self::Args,
    ) -> CallFuture<Self::Response, SsmError> {
        client.send_command_async_with_handler(args, TracingHandler::new("SendCommand"))
    }

    fn format_table(&self, response: &Self::Response) {
        let command = &response.command;
        print_success(&format!("Command {} submitted", command.command_id));
        print_table(
            &["Command", "Document", "Status", "Requested"],
            &[vec![
                command.command_id.clone(),
                or_dash(command.document_name.as_deref()),
                or_dash(command.status.as_deref()),
                command
                    .requested_at
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ]],
        );
    }
}

pub struct CommandStatus;

impl CommandTemplate for CommandStatus {
    type Args = GetCommandInvocationRequest;
    type Response = GetCommandInvocationResponse;

    fn validate_args(&self, args: &Self::Args) -> Result<(), SsmError> {
        require_non_empty("Command id", &args.command_id)?;
        require_non_empty("Instance id", &args.instance_id)
    }

    fn submit(
        &self,
        client: &SsmAsyncClient,
        args: Self::Args,
    ) -> CallFuture<Self::Response, SsmError> {
        client.get_command_invocation_async_with_handler(
            args,
            TracingHandler::new("GetCommandInvocation"),
        )
    }

    fn format_table(&self, response: &Self::Response) {
        println!(
            "{} on {}: {} ({})",
            response.command_id,
            response.instance_id,
            or_dash(response.status.as_deref()),
            or_dash(response.status_details.as_deref())
        );
        if let Some(stdout) = response.standard_output.as_deref().filter(|s| !s.is_empty()) {
            print_block("stdout", stdout);
        }
        if let Some(stderr) = response.standard_error.as_deref().filter(|s| !s.is_empty()) {
            print_block("stderr", stderr);
        }
    }
}

pub struct CancelCommand;

impl CommandTemplate for CancelCommand {
    type Args = CancelCommandRequest;
    type Response = MessageOutput;

    fn validate_args(&self, args: &Self::Args) -> Result<(), SsmError> {
        require_non_empty("Command id", &args.command_id)
    }

    fn submit(
        &self,
        client: &SsmAsyncClient,
        args: Self::Args,
    ) -> CallFuture<Self::Response, SsmError> {
        client.invoke_with_handler(
            |ssm: &SdkSsmClient, request: &CancelCommandRequest| {
                ssm.cancel_command(request).map(|_| {
                    MessageOutput::new(format!(
                        "Cancellation requested for command {}",
                        request.command_id
                    ))
                })
            },
            args,
            TracingHandler::new("CancelCommand"),
        )
    }

    fn format_table(&self, response: &Self::Response) {
        print_success(&response.message);
    }
}

pub async fn send(
    client: &SsmAsyncClient,
    format: &crate::OutputFormat,
    document_name: &str,
    instance_ids: Vec<String>,
    parameters: &[String],
    comment: Option<String>,
    timeout_seconds: Option<i32>,
) -> Result<(), SsmError> {
    let args = SendCommandRequest {
        document_name: document_name.to_string(),
        instance_ids,
        parameters: parse_document_parameters(parameters)?,
        comment,
        timeout_seconds,
    };
    SendCommand.execute(client, format, args).await
}

pub async fn status(
    client: &SsmAsyncClient,
    format: &crate::OutputFormat,
    command_id: &str,
    instance_id: &str,
) -> Result<(), SsmError> {
    let args = GetCommandInvocationRequest {
        command_id: command_id.to_string(),
        instance_id: instance_id.to_string(),
    };
    CommandStatus.execute(client, format, args).await
}

pub async fn cancel(
    client: &SsmAsyncClient,
    format: &crate::OutputFormat,
    command_id: &str,
    instance_ids: Vec<String>,
) -> Result<(), SsmError> {
    let args = CancelCommandRequest {
        command_id: command_id.to_string(),
        instance_ids,
    };
    CancelCommand.execute(client, format, args).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_document_parameters_groups_repeated_keys() {
        let parsed = parse_document_parameters(&strings(&[
            "commands=uptime",
            "commands=df -h",
            "executionTimeout=600",
        ]))
        .unwrap();

        assert_eq!(parsed["commands"], vec!["uptime", "df -h"]);
        assert_eq!(parsed["executionTimeout"], vec!["600"]);
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_parse_document_parameters_keeps_equals_in_value() {
        let parsed = parse_document_parameters(&strings(&["commands=echo a=b"])).unwrap();
        assert_eq!(parsed["commands"], vec!["echo a=b"]);
    }

    #[test]
    fn test_parse_document_parameters_rejects_malformed() {
        assert!(parse_document_parameters(&strings(&["novalue"])).is_err());
        assert!(parse_document_parameters(&strings(&["=value"])).is_err());
        assert!(parse_document_parameters(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_send_requires_instances() {
        let args = SendCommandRequest {
            document_name: "AWS-RunShellScript".to_string(),
            ..SendCommandRequest::default()
        };
        assert!(SendCommand.validate_args(&args).is_err());

        let args = SendCommandRequest {
            instance_ids: vec!["i-0123456789abcdef0".to_string()],
            ..args
        };
        assert!(SendCommand.validate_args(&args).is_ok());
    }
}
