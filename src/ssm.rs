//! The synchronous Systems Manager client contract.
//!
//! Every operation is listed once in [`for_each_operation`]; the blocking
//! trait below and the asynchronous methods on
//! [`SsmAsyncClient`](crate::SsmAsyncClient) are both generated from it.

use crate::error::SsmError;
use crate::model::*;

/// Invokes `$callback!` with the operation table. Each row is
/// `sync_name, async_name, async_with_handler_name: Request => Response;`
/// preceded by its doc comment.
macro_rules! for_each_operation {
    ($callback:ident) => {
        $callback! {
            /// Adds or overwrites tags on a resource.
            add_tags_to_resource, add_tags_to_resource_async, add_tags_to_resource_async_with_handler:
                AddTagsToResourceRequest => AddTagsToResourceResponse;
            /// Attempts to cancel a Run Command invocation.
            cancel_command, cancel_command_async, cancel_command_async_with_handler:
                CancelCommandRequest => CancelCommandResponse;
            /// Deletes one parameter.
            delete_parameter, delete_parameter_async, delete_parameter_async_with_handler:
                DeleteParameterRequest => DeleteParameterResponse;
            /// Lists managed instances and their agent status.
            describe_instance_information, describe_instance_information_async, describe_instance_information_async_with_handler:
                DescribeInstanceInformationRequest => DescribeInstanceInformationResponse;
            /// Lists maintenance windows.
            describe_maintenance_windows, describe_maintenance_windows_async, describe_maintenance_windows_async_with_handler:
                DescribeMaintenanceWindowsRequest => DescribeMaintenanceWindowsResponse;
            /// Lists parameter metadata without values.
            describe_parameters, describe_parameters_async, describe_parameters_async_with_handler:
                DescribeParametersRequest => DescribeParametersResponse;
            /// Lists active or historical sessions.
            describe_sessions, describe_sessions_async, describe_sessions_async_with_handler:
                DescribeSessionsRequest => DescribeSessionsResponse;
            /// Fetches the state of one automation execution.
            get_automation_execution, get_automation_execution_async, get_automation_execution_async_with_handler:
                GetAutomationExecutionRequest => GetAutomationExecutionResponse;
            /// Fetches the result of a command on one instance.
            get_command_invocation, get_command_invocation_async, get_command_invocation_async_with_handler:
                GetCommandInvocationRequest => GetCommandInvocationResponse;
            /// Fetches one parameter, optionally decrypted.
            get_parameter, get_parameter_async, get_parameter_async_with_handler:
                GetParameterRequest => GetParameterResponse;
            /// Fetches one page of parameters under a path.
            get_parameters_by_path, get_parameters_by_path_async, get_parameters_by_path_async_with_handler:
                GetParametersByPathRequest => GetParametersByPathResponse;
            /// Lists the tags on a resource.
            list_tags_for_resource, list_tags_for_resource_async, list_tags_for_resource_async_with_handler:
                ListTagsForResourceRequest => ListTagsForResourceResponse;
            /// Creates or updates a parameter.
            put_parameter, put_parameter_async, put_parameter_async_with_handler:
                PutParameterRequest => PutParameterResponse;
            /// Removes tags from a resource.
            remove_tags_from_resource, remove_tags_from_resource_async, remove_tags_from_resource_async_with_handler:
                RemoveTagsFromResourceRequest => RemoveTagsFromResourceResponse;
            /// Runs a command document on a set of instances.
            send_command, send_command_async, send_command_async_with_handler:
                SendCommandRequest => SendCommandResponse;
            /// Starts an automation runbook.
            start_automation_execution, start_automation_execution_async, start_automation_execution_async_with_handler:
                StartAutomationExecutionRequest => StartAutomationExecutionResponse;
            /// Stops a running automation execution.
            stop_automation_execution, stop_automation_execution_async, stop_automation_execution_async_with_handler:
                StopAutomationExecutionRequest => StopAutomationExecutionResponse;
            /// Ends a Session Manager session.
            terminate_session, terminate_session_async, terminate_session_async_with_handler:
                TerminateSessionRequest => TerminateSessionResponse;
        }
    };
}

pub(crate) use for_each_operation;

macro_rules! define_blocking_client {
    ($(
        $(#[$doc:meta])*
        $op:ident, $async_op:ident, $handler_op:ident: $req:ident => $resp:ident;
    )*) => {
        /// Blocking Systems Manager client.
        ///
        /// Implementations must be safe to call from several worker threads
        /// at once.
        pub trait SimpleSystemsManagement: Send + Sync {
            $(
                $(#[$doc])*
                fn $op(&self, request: &$req) -> Result<$resp, SsmError>;
            )*

            /// Releases the client's resources. Calls made afterwards fail
            /// with [`SsmError::Client`].
            fn shutdown(&self) {}
        }

        /// Names of every operation in the table, in table order.
        pub const OPERATION_NAMES: &[&str] = &[$(stringify!($op)),*];
    };
}

for_each_operation!(define_blocking_client);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_table_is_sorted_and_unique() {
        let mut sorted = OPERATION_NAMES.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted, OPERATION_NAMES);
        assert_eq!(OPERATION_NAMES.len(), 18);
    }
}
