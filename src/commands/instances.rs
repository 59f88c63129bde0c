use crate::commands::template::CommandTemplate;
use crate::display::{or_dash, print_table};
use ssm_async::model::{DescribeInstanceInformationRequest, DescribeInstanceInformationResponse};
use ssm_async::{CallFuture, SsmAsyncClient, SsmError, TracingHandler};

/// Template-based implementation of the instances command
pub struct InstancesCommand;

impl CommandTemplate for InstancesCommand {
    type Args = DescribeInstanceInformationRequest;
    type Response = DescribeInstanceInformationResponse;

    fn validate_args(&self, args: &Self::Args) -> Result<(), SsmError> {
        // Service bounds for DescribeInstanceInformation
        if let Some(max) = args.max_results
            && !(5..=50).contains(&max)
        {
            return Err(SsmError::InvalidArgument(
                "--max-results must be between 5 and 50".to_string(),
            ));
        }
        Ok(())
    }

    fn submit(
        &self,
        client: &SsmAsyncClient,
        args: Self::Args,
    ) -> CallFuture<Self::Response, SsmError> {
        client.describe_instance_information_async_with_handler(
            args,
            TracingHandler::new("DescribeInstanceInformation"),
        )
    }

    fn format_table(&self, response: &Self::Response) {
        if response.instances.is_empty() {
            println!("No managed instances found");
            return;
        }

        let rows: Vec<Vec<String>> = response
            .instances
            .iter()
            .map(|i| {
                vec![
                    i.instance_id.clone(),
                    or_dash(i.ping_status.as_deref()),
                    or_dash(i.platform_name.as_deref()),
                    or_dash(i.agent_version.as_deref()),
                    or_dash(i.ip_address.as_deref()),
                    or_dash(i.computer_name.as_deref()),
                ]
            })
            .collect();
        print_table(
            &["Instance", "Ping", "Platform", "Agent", "IP", "Computer"],
            &rows,
        );

        if let Some(token) = &response.next_token {
            println!("More results available; next token: {}", token);
        }
    }
}

pub async fn instances(
    client: &SsmAsyncClient,
    format: &crate::OutputFormat,
    max_results: Option<i32>,
    next_token: Option<String>,
) -> Result<(), SsmError> {
    let args = DescribeInstanceInformationRequest {
        max_results,
        next_token,
    };
    InstancesCommand.execute(client, format, args).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_results_bounds() {
        let command = InstancesCommand;
        let args = |max| DescribeInstanceInformationRequest {
            max_results: max,
            next_token: None,
        };

        assert!(command.validate_args(&args(None)).is_ok());
        assert!(command.validate_args(&args(Some(5))).is_ok());
        assert!(command.validate_args(&args(Some(50))).is_ok());
        assert!(command.validate_args(&args(Some(4))).is_err());
        assert!(command.validate_args(&args(Some(51))).is_err());
    }
}
