use crate::commands::template::CommandTemplate;
use crate::display::{or_dash, print_table};
use ssm_async::model::{DescribeMaintenanceWindowsRequest, DescribeMaintenanceWindowsResponse};
use ssm_async::{CallFuture, SsmAsyncClient, SsmError, TracingHandler};

pub struct WindowsCommand;

impl CommandTemplate for WindowsCommand {
    type Args = DescribeMaintenanceWindowsRequest;
    type Response = DescribeMaintenanceWindowsResponse;

    fn submit(
        &self,
        client: &SsmAsyncClient,
        args: Self::Args,
    ) -> CallFuture<Self::Response, SsmError> {
        client.describe_maintenance_windows_async_with_handler(
            args,
            TracingHandler::new("DescribeMaintenanceWindows"),
        )
    }

    fn format_table(&self, response: &Self::Response) {
        if response.windows.is_empty() {
            println!("No maintenance windows found");
            return;
        }

        let rows: Vec<Vec<String>> = response
            .windows
            .iter()
            .map(|w| {
                vec![
                    w.window_id.clone(),
                    or_dash(w.name.as_deref()),
                    if w.enabled { "yes" } else { "no" }.to_string(),
                    or_dash(w.schedule.as_deref()),
                    or_dash(w.next_execution_time.as_deref()),
                ]
            })
            .collect();
        print_table(&["Window", "Name", "Enabled", "Schedule", "Next run"], &rows);

        if let Some(token) = &response.next_token {
            println!("More results available; next token: {}", token);
        }
    }
}

pub async fn windows(
    client: &SsmAsyncClient,
    format: &crate::OutputFormat,
    max_results: Option<i32>,
    next_token: Option<String>,
) -> Result<(), SsmError> {
    let args = DescribeMaintenanceWindowsRequest {
        max_results,
        next_token,
    };
    WindowsCommand.execute(client, format, args).await
}
