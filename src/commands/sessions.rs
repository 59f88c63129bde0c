use crate::commands::template::{CommandTemplate, require_non_empty};
use crate::display::{or_dash, print_success, print_table};
use ssm_async::model::{
    DescribeSessionsRequest, DescribeSessionsResponse, SessionState, TerminateSessionRequest,
    TerminateSessionResponse,
};
use ssm_async::{CallFuture, SsmAsyncClient, SsmError, TracingHandler};

pub struct ListSessionsCommand;

impl CommandTemplate for ListSessionsCommand {
    type Args = DescribeSessionsRequest;
    type Response = DescribeSessionsResponse;

    fn submit(
        &self,
        client: &SsmAsyncClient,
        args: Self::Args,
    ) -> CallFuture<Self::Response, SsmError> {
        client.describe_sessions_async_with_handler(args, TracingHandler::new("DescribeSessions"))
    }

    fn format_table(&self, response: &Self::Response) {
        if response.sessions.is_empty() {
            println!("No sessions found");
            return;
        }

        let rows: Vec<Vec<String>> = response
            .sessions
            .iter()
            .map(|s| {
                vec![
                    s.session_id.clone(),
                    or_dash(s.target.as_deref()),
                    or_dash(s.status.as_deref()),
                    or_dash(s.owner.as_deref()),
                    s.started_at
                        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                        .unwrap_or_else(|| "-".to_string()),
                ]
            })
            .collect();
        print_table(&["Session", "Target", "Status", "Owner", "Started"], &rows);

        if let Some(token) = &response.next_token {
            println!("More results available; next token: {}", token);
        }
    }
}

pub struct TerminateSessionCommand;

impl CommandTemplate for TerminateSessionCommand {
    type Args = TerminateSessionRequest;
    type Response = TerminateSessionResponse;

    fn validate_args(&self, args: &Self::Args) -> Result<(), SsmError> {
        require_non_empty("Session id", &args.session_id)
    }

    fn submit(
        &self,
        client: &SsmAsyncClient,
        args: Self::Args,
    ) -> CallFuture<Self::Response, SsmError> {
        client.terminate_session_async_with_handler(args, TracingHandler::new("TerminateSession"))
    }

    fn format_table(&self, response: &Self::Response) {
        print_success(&format!(
            "Session {} terminated",
            or_dash(response.session_id.as_deref())
        ));
    }
}

pub async fn list(
    client: &SsmAsyncClient,
    format: &crate::OutputFormat,
    state: SessionState,
    max_results: Option<i32>,
    next_token: Option<String>,
) -> Result<(), SsmError> {
    let args = DescribeSessionsRequest {
        state,
        max_results,
        next_token,
    };
    ListSessionsCommand.execute(client, format, args).await
}

pub async fn terminate(
    client: &SsmAsyncClient,
    format: &crate::OutputFormat,
    session_id: &str,
) -> Result<(), SsmError> {
    let args = TerminateSessionRequest {
        session_id: session_id.to_string(),
    };
    TerminateSessionCommand.execute(client, format, args).await
}
