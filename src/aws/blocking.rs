use super::{client, convert};
use crate::config::ClientConfig;
use crate::error::SsmError;
use crate::model::*;
use crate::ssm::SimpleSystemsManagement;
use aws_sdk_ssm::Client;
use aws_sdk_ssm::types::{self, ResourceTypeForTagging};
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::runtime::{Builder, Runtime};

/// Blocking Systems Manager client over `aws-sdk-ssm`.
///
/// Each call runs as a task on a private runtime that owns the SDK's
/// connections and timers, and blocks the calling thread until it
/// finishes. Safe to call from many threads at once.
pub struct SdkSsmClient {
    client: Client,
    runtime: Mutex<Option<Runtime>>,
}

impl SdkSsmClient {
    /// Resolve credentials and region for `config` and build the client.
    pub async fn load(config: &ClientConfig) -> Result<Self, SsmError> {
        let client = client::create_ssm_client(config).await;
        Self::from_client(client)
    }

    /// Wrap an already configured SDK client.
    pub fn from_client(client: Client) -> Result<Self, SsmError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("ssm-sdk-io")
            .enable_all()
            .build()?;

        Ok(Self {
            client,
            runtime: Mutex::new(Some(runtime)),
        })
    }

    pub fn sdk_client(&self) -> &Client {
        &self.client
    }

    pub fn is_shut_down(&self) -> bool {
        self.runtime().is_none()
    }

    fn runtime(&self) -> MutexGuard<'_, Option<Runtime>> {
        self.runtime.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Spawns `future` on the private runtime and waits for it. A call cut
    /// short by [`shutdown`](SimpleSystemsManagement::shutdown) fails with
    /// [`SsmError::Client`].
    fn run<T, F>(&self, future: F) -> Result<T, SsmError>
    where
        T: Send + 'static,
        F: Future<Output = Result<T, SsmError>> + Send + 'static,
    {
        let handle = match self.runtime().as_ref() {
            Some(runtime) => runtime.spawn(future),
            None => return Err(SsmError::Client("client has been shut down".to_string())),
        };

        match futures::executor::block_on(handle) {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(SsmError::Client(
                "client was shut down while the call was in flight".to_string(),
            )),
            Err(e) => Err(SsmError::Client(format!("SDK task failed: {}", e))),
        }
    }
}

impl Drop for SdkSsmClient {
    fn drop(&mut self) {
        let runtime = self
            .runtime
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(runtime) = runtime {
            runtime.shutdown_background();
        }
    }
}

fn tag_resource_type(resource_type: &str) -> ResourceTypeForTagging {
    ResourceTypeForTagging::from(resource_type)
}

impl SimpleSystemsManagement for SdkSsmClient {
    fn add_tags_to_resource(
        &self,
        request: &AddTagsToResourceRequest,
    ) -> Result<AddTagsToResourceResponse, SsmError> {
        let tags = request
            .tags
            .iter()
            .map(|tag| {
                types::Tag::builder()
                    .key(&tag.key)
                    .value(&tag.value)
                    .build()
                    .map_err(|e| SsmError::InvalidArgument(format!("invalid tag: {}", e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (client, request) = (self.client.clone(), request.clone());
        self.run(async move {
            client
                .add_tags_to_resource()
                .resource_type(tag_resource_type(&request.resource_type))
                .resource_id(&request.resource_id)
                .set_tags(Some(tags))
                .send()
                .await?;
            Ok::<_, SsmError>(AddTagsToResourceResponse {})
        })
    }

    fn cancel_command(
        &self,
        request: &CancelCommandRequest,
    ) -> Result<CancelCommandResponse, SsmError> {
        let (client, request) = (self.client.clone(), request.clone());
        self.run(async move {
            client
                .cancel_command()
                .command_id(&request.command_id)
                .set_instance_ids(
                    (!request.instance_ids.is_empty()).then(|| request.instance_ids.clone()),
                )
                .send()
                .await?;
            Ok::<_, SsmError>(CancelCommandResponse {})
        })
    }

    fn delete_parameter(
        &self,
        request: &DeleteParameterRequest,
    ) -> Result<DeleteParameterResponse, SsmError> {
        let (client, request) = (self.client.clone(), request.clone());
        self.run(async move {
            client
                .delete_parameter()
                .name(&request.name)
                .send()
                .await?;
            Ok::<_, SsmError>(DeleteParameterResponse {})
        })
    }

    fn describe_instance_information(
        &self,
        request: &DescribeInstanceInformationRequest,
    ) -> Result<DescribeInstanceInformationResponse, SsmError> {
        let (client, request) = (self.client.clone(), request.clone());
        self.run(async move {
            let output = client
                .describe_instance_information()
                .set_max_results(request.max_results)
                .set_next_token(request.next_token.clone())
                .send()
                .await?;

            Ok::<_, SsmError>(DescribeInstanceInformationResponse {
                instances: output
                    .instance_information_list
                    .unwrap_or_default()
                    .into_iter()
                    .map(convert::instance)
                    .collect(),
                next_token: output.next_token,
            })
        })
    }

    fn describe_maintenance_windows(
        &self,
        request: &DescribeMaintenanceWindowsRequest,
    ) -> Result<DescribeMaintenanceWindowsResponse, SsmError> {
        let (client, request) = (self.client.clone(), request.clone());
        self.run(async move {
            let output = client
                .describe_maintenance_windows()
                .set_max_results(request.max_results)
                .set_next_token(request.next_token.clone())
                .send()
                .await?;

            Ok::<_, SsmError>(DescribeMaintenanceWindowsResponse {
                windows: output
                    .window_identities
                    .unwrap_or_default()
                    .into_iter()
                    .map(convert::maintenance_window)
                    .collect(),
                next_token: output.next_token,
            })
        })
    }

    fn describe_parameters(
        &self,
        request: &DescribeParametersRequest,
    ) -> Result<DescribeParametersResponse, SsmError> {
        let (client, request) = (self.client.clone(), request.clone());
        self.run(async move {
            let output = client
                .describe_parameters()
                .set_max_results(request.max_results)
                .set_next_token(request.next_token.clone())
                .send()
                .await?;

            Ok::<_, SsmError>(DescribeParametersResponse {
                parameters: output
                    .parameters
                    .unwrap_or_default()
                    .into_iter()
                    .map(convert::parameter_metadata)
                    .collect(),
                next_token: output.next_token,
            })
        })
    }

    fn describe_sessions(
        &self,
        request: &DescribeSessionsRequest,
    ) -> Result<DescribeSessionsResponse, SsmError> {
        let (client, request) = (self.client.clone(), request.clone());
        self.run(async move {
            let output = client
                .describe_sessions()
                .state(convert::session_state(request.state))
                .set_max_results(request.max_results)
                .set_next_token(request.next_token.clone())
                .send()
                .await?;

            Ok::<_, SsmError>(DescribeSessionsResponse {
                sessions: output
                    .sessions
                    .unwrap_or_default()
                    .into_iter()
                    .map(convert::session)
                    .collect(),
                next_token: output.next_token,
            })
        })
    }

    fn get_automation_execution(
        &self,
        request: &GetAutomationExecutionRequest,
    ) -> Result<GetAutomationExecutionResponse, SsmError> {
        let (client, request) = (self.client.clone(), request.clone());
        self.run(async move {
            let output = client
                .get_automation_execution()
                .automation_execution_id(&request.automation_execution_id)
                .send()
                .await?;

            let execution = output.automation_execution.ok_or_else(|| {
                SsmError::Client("response did not include the automation execution".to_string())
            })?;
            Ok::<_, SsmError>(GetAutomationExecutionResponse {
                execution: convert::automation_execution(execution),
            })
        })
    }

    fn get_command_invocation(
        &self,
        request: &GetCommandInvocationRequest,
    ) -> Result<GetCommandInvocationResponse, SsmError> {
        let (client, request) = (self.client.clone(), request.clone());
        self.run(async move {
            let output = client
                .get_command_invocation()
                .command_id(&request.command_id)
                .instance_id(&request.instance_id)
                .send()
                .await?;

            Ok::<_, SsmError>(GetCommandInvocationResponse {
                command_id: output
                    .command_id
                    .unwrap_or_else(|| request.command_id.clone()),
                instance_id: output
                    .instance_id
                    .unwrap_or_else(|| request.instance_id.clone()),
                status: output.status.map(|s| s.as_str().to_string()),
                status_details: output.status_details,
                standard_output: output.standard_output_content,
                standard_error: output.standard_error_content,
            })
        })
    }

    fn get_parameter(
        &self,
        request: &GetParameterRequest,
    ) -> Result<GetParameterResponse, SsmError> {
        let (client, request) = (self.client.clone(), request.clone());
        self.run(async move {
            let output = client
                .get_parameter()
                .name(&request.name)
                .with_decryption(request.with_decryption)
                .send()
                .await?;

            let parameter = output.parameter.ok_or_else(|| {
                SsmError::Client("response did not include the parameter".to_string())
            })?;
            Ok::<_, SsmError>(GetParameterResponse {
                parameter: convert::parameter(parameter),
            })
        })
    }

    fn get_parameters_by_path(
        &self,
        request: &GetParametersByPathRequest,
    ) -> Result<GetParametersByPathResponse, SsmError> {
        let (client, request) = (self.client.clone(), request.clone());
        self.run(async move {
            let output = client
                .get_parameters_by_path()
                .path(&request.path)
                .recursive(request.recursive)
                .with_decryption(request.with_decryption)
                .set_max_results(request.max_results)
                .set_next_token(request.next_token.clone())
                .send()
                .await?;

            Ok::<_, SsmError>(GetParametersByPathResponse {
                parameters: output
                    .parameters
                    .unwrap_or_default()
                    .into_iter()
                    .map(convert::parameter)
                    .collect(),
                next_token: output.next_token,
            })
        })
    }

    fn list_tags_for_resource(
        &self,
        request: &ListTagsForResourceRequest,
    ) -> Result<ListTagsForResourceResponse, SsmError> {
        let (client, request) = (self.client.clone(), request.clone());
        self.run(async move {
            let output = client
                .list_tags_for_resource()
                .resource_type(tag_resource_type(&request.resource_type))
                .resource_id(&request.resource_id)
                .send()
                .await?;

            Ok::<_, SsmError>(ListTagsForResourceResponse {
                tags: output
                    .tag_list
                    .unwrap_or_default()
                    .into_iter()
                    .map(convert::tag)
                    .collect(),
            })
        })
    }

    fn put_parameter(
        &self,
        request: &PutParameterRequest,
    ) -> Result<PutParameterResponse, SsmError> {
        let (client, request) = (self.client.clone(), request.clone());
        self.run(async move {
            let output = client
                .put_parameter()
                .name(&request.name)
                .value(&request.value)
                .r#type(convert::parameter_type(request.parameter_type))
                .set_description(request.description.clone())
                .overwrite(request.overwrite)
                .send()
                .await?;

            Ok::<_, SsmError>(PutParameterResponse {
                version: output.version,
                tier: output.tier.map(|t| t.as_str().to_string()),
            })
        })
    }

    fn remove_tags_from_resource(
        &self,
        request: &RemoveTagsFromResourceRequest,
    ) -> Result<RemoveTagsFromResourceResponse, SsmError> {
        let (client, request) = (self.client.clone(), request.clone());
        self.run(async move {
            client
                .remove_tags_from_resource()
                .resource_type(tag_resource_type(&request.resource_type))
                .resource_id(&request.resource_id)
                .set_tag_keys(Some(request.tag_keys.clone()))
                .send()
                .await?;
            Ok::<_, SsmError>(RemoveTagsFromResourceResponse {})
        })
    }

    fn send_command(&self, request: &SendCommandRequest) -> Result<SendCommandResponse, SsmError> {
        let (client, request) = (self.client.clone(), request.clone());
        self.run(async move {
            let mut builder = client
                .send_command()
                .document_name(&request.document_name)
                .set_instance_ids(Some(request.instance_ids.clone()))
                .set_comment(request.comment.clone())
                .set_timeout_seconds(request.timeout_seconds);
            for (name, values) in &request.parameters {
                builder = builder.parameters(name, values.clone());
            }

            let output = builder.send().await?;
            let command = output.command.ok_or_else(|| {
                SsmError::Client("response did not include the command".to_string())
            })?;
            Ok::<_, SsmError>(SendCommandResponse {
                command: convert::command(command),
            })
        })
    }

    fn start_automation_execution(
        &self,
        request: &StartAutomationExecutionRequest,
    ) -> Result<StartAutomationExecutionResponse, SsmError> {
        let (client, request) = (self.client.clone(), request.clone());
        self.run(async move {
            let mut builder = client
                .start_automation_execution()
                .document_name(&request.document_name)
                .set_client_token(request.client_token.clone());
            for (name, values) in &request.parameters {
                builder = builder.parameters(name, values.clone());
            }

            let output = builder.send().await?;
            let automation_execution_id = output.automation_execution_id.ok_or_else(|| {
                SsmError::Client("response did not include the execution id".to_string())
            })?;
            Ok::<_, SsmError>(StartAutomationExecutionResponse {
                automation_execution_id,
            })
        })
    }

    fn stop_automation_execution(
        &self,
        request: &StopAutomationExecutionRequest,
    ) -> Result<StopAutomationExecutionResponse, SsmError> {
        let (client, request) = (self.client.clone(), request.clone());
        self.run(async move {
            client
                .stop_automation_execution()
                .automation_execution_id(&request.automation_execution_id)
                .send()
                .await?;
            Ok::<_, SsmError>(StopAutomationExecutionResponse {})
        })
    }

    fn terminate_session(
        &self,
        request: &TerminateSessionRequest,
    ) -> Result<TerminateSessionResponse, SsmError> {
        let (client, request) = (self.client.clone(), request.clone());
        self.run(async move {
            let output = client
                .terminate_session()
                .session_id(&request.session_id)
                .send()
                .await?;
            Ok::<_, SsmError>(TerminateSessionResponse {
                session_id: output.session_id,
            })
        })
    }

    fn shutdown(&self) {
        // Stops the IO threads and drops the SDK's connections; tasks still
        // running are cancelled.
        if let Some(runtime) = self.runtime().take() {
            runtime.shutdown_background();
            tracing::debug!("SSM client shut down");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_ssm::config::{BehaviorVersion, Credentials, Region};
    use std::net::TcpListener;
    use std::sync::{Arc, mpsc};
    use std::thread;
    use std::time::Duration;

    fn client_for(endpoint: &str) -> SdkSsmClient {
        let config = aws_sdk_ssm::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new("AKID", "SECRET", None, None, "test"))
            .endpoint_url(endpoint)
            .build();
        SdkSsmClient::from_client(Client::from_conf(config)).unwrap()
    }

    fn offline_client() -> SdkSsmClient {
        client_for("http://127.0.0.1:9")
    }

    #[test]
    fn test_calls_after_shutdown_fail_without_dispatch() {
        let client = offline_client();
        client.shutdown();

        let error = client
            .get_parameter(&GetParameterRequest::new("/app/key"))
            .unwrap_err();
        match error {
            SsmError::Client(msg) => assert!(msg.contains("shut down")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_tagging_after_shutdown_fails() {
        let client = offline_client();
        client.shutdown();

        let error = client
            .add_tags_to_resource(&AddTagsToResourceRequest {
                resource_type: "Parameter".to_string(),
                resource_id: "/app/key".to_string(),
                tags: vec![Tag {
                    key: "env".to_string(),
                    value: "prod".to_string(),
                }],
            })
            .unwrap_err();
        assert!(matches!(error, SsmError::Client(_)));
    }

    #[test]
    fn test_shutdown_releases_runtime_and_fails_in_flight_call() {
        // Accepts connections but never answers, so the request hangs.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        let client = Arc::new(client_for(&endpoint));
        assert!(!client.is_shut_down());

        let (tx, rx) = mpsc::channel();
        let caller = Arc::clone(&client);
        thread::spawn(move || {
            let _ = tx.send(caller.get_parameter(&GetParameterRequest::new("/app/key")));
        });

        thread::sleep(Duration::from_millis(100));
        client.shutdown();
        assert!(client.is_shut_down());

        let result = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("call still blocked after shutdown");
        assert!(matches!(result, Err(SsmError::Client(_))));

        // A second shutdown is a no-op.
        client.shutdown();
        drop(listener);
    }

    #[tokio::test]
    async fn test_shutdown_in_async_context() {
        let client = offline_client();
        client.shutdown();
        assert!(client.is_shut_down());
    }

    #[tokio::test]
    async fn test_client_can_be_dropped_in_async_context() {
        let client = offline_client();
        drop(client);
    }
}
