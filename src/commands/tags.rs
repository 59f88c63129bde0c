use crate::commands::template::{CommandTemplate, MessageOutput, require_non_empty};
use crate::display::{print_success, print_table};
use ssm_async::model::{
    AddTagsToResourceRequest, ListTagsForResourceRequest, ListTagsForResourceResponse,
    RemoveTagsFromResourceRequest, Tag,
};
use ssm_async::{CallFuture, SdkSsmClient, SimpleSystemsManagement, SsmAsyncClient, SsmError, TracingHandler};

/// Identifies the resource a tag command targets
#[derive(Debug, Clone)]
pub struct ResourceRef {
    pub resource_type: String,
    pub resource_id: String,
}

pub struct AddTagsCommand;

impl CommandTemplate for AddTagsCommand {
    type Args = AddTagsToResourceRequest;
    type Response = MessageOutput;

    fn validate_args(&self, args: &Self::Args) -> Result<(), SsmError> {
        require_non_empty("Resource type", &args.resource_type)?;
        require_non_empty("Resource id", &args.resource_id)?;
        if args.tags.is_empty() {
            return Err(SsmError::InvalidArgument(
                "At least one tag is required".to_string(),
            ));
        }
        Ok(())
    }

    fn submit(
        &self,
        client: &SsmAsyncClient,
        args: Self::Args,
    ) -> CallFuture<Self::Response, SsmError> {
        client.invoke_with_handler(
            |ssm: &SdkSsmClient, request: &AddTagsToResourceRequest| {
                ssm.add_tags_to_resource(request).map(|_| {
                    MessageOutput::new(format!(
                        "Added {} tag(s) to {}",
                        request.tags.len(),
                        request.resource_id
                    ))
                })
            },
            args,
            TracingHandler::new("AddTagsToResource"),
        )
    }

    fn format_table(&self, response: &Self::Response) {
        print_success(&response.message);
    }
}

pub struct ListTagsCommand;

impl CommandTemplate for ListTagsCommand {
    type Args = ListTagsForResourceRequest;
    type Response = ListTagsForResourceResponse;

    fn validate_args(&self, args: &Self::Args) -> Result<(), SsmError> {
        require_non_empty("Resource type", &args.resource_type)?;
        require_non_empty("Resource id", &args.resource_id)
    }

    fn submit(
        &self,
        client: &SsmAsyncClient,
        args: Self::Args,
    ) -> CallFuture<Self::Response, SsmError> {
        client.list_tags_for_resource_async_with_handler(
            args,
            TracingHandler::new("ListTagsForResource"),
        )
    }

    fn format_table(&self, response: &Self::Response) {
        if response.tags.is_empty() {
            println!("No tags found");
            return;
        }

        let rows: Vec<Vec<String>> = response
            .tags
            .iter()
            .map(|t| vec![t.key.clone(), t.value.clone()])
            .collect();
        print_table(&["Key", "Value"], &rows);
    }
}

pub struct RemoveTagsCommand;

impl CommandTemplate for RemoveTagsCommand {
    type Args = RemoveTagsFromResourceRequest;
    type Response = MessageOutput;

    fn validate_args(&self, args: &Self::Args) -> Result<(), SsmError> {
        require_non_empty("Resource type", &args.resource_type)?;
        require_non_empty("Resource id", &args.resource_id)?;
        if args.tag_keys.iter().all(|k| k.trim().is_empty()) {
            return Err(SsmError::InvalidArgument(
                "At least one tag key is required".to_string(),
            ));
        }
        Ok(())
    }

    fn submit(
        &self,
        client: &SsmAsyncClient,
        args: Self::Args,
    ) -> CallFuture<Self::Response, SsmError> {
        client.invoke_with_handler(
            |ssm: &SdkSsmClient, request: &RemoveTagsFromResourceRequest| {
                ssm.remove_tags_from_resource(request).map(|_| {
                    MessageOutput::new(format!(
                        "Removed {} tag(s) from {}",
                        request.tag_keys.len(),
                        request.resource_id
                    ))
                })
            },
            args,
            TracingHandler::new("RemoveTagsFromResource"),
        )
    }

    fn format_table(&self, response: &Self::Response) {
        print_success(&response.message);
    }
}

pub async fn add(
    client: &SsmAsyncClient,
    format: &crate::OutputFormat,
    resource: ResourceRef,
    tags: Vec<Tag>,
) -> Result<(), SsmError> {
    let args = AddTagsToResourceRequest {
        resource_type: resource.resource_type,
        resource_id: resource.resource_id,
        tags,
    };
    AddTagsCommand.execute(client, format, args).await
}

pub async fn list(
    client: &SsmAsyncClient,
    format: &crate::OutputFormat,
    resource: ResourceRef,
) -> Result<(), SsmError> {
    let args = ListTagsForResourceRequest {
        resource_type: resource.resource_type,
        resource_id: resource.resource_id,
    };
    ListTagsCommand.execute(client, format, args).await
}

pub async fn remove(
    client: &SsmAsyncClient,
    format: &crate::OutputFormat,
    resource: ResourceRef,
    tag_keys: Vec<String>,
) -> Result<(), SsmError> {
    let args = RemoveTagsFromResourceRequest {
        resource_type: resource.resource_type,
        resource_id: resource.resource_id,
        tag_keys,
    };
    RemoveTagsCommand.execute(client, format, args).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_requires_tags() {
        let mut args = AddTagsToResourceRequest {
            resource_type: "Parameter".to_string(),
            resource_id: "/app/db/host".to_string(),
            tags: Vec::new(),
        };
        assert!(AddTagsCommand.validate_args(&args).is_err());

        args.tags.push("env=prod".parse().unwrap());
        assert!(AddTagsCommand.validate_args(&args).is_ok());
    }

    #[test]
    fn test_remove_rejects_blank_keys() {
        let args = RemoveTagsFromResourceRequest {
            resource_type: "Parameter".to_string(),
            resource_id: "/app/db/host".to_string(),
            tag_keys: vec![" ".to_string()],
        };
        assert!(RemoveTagsCommand.validate_args(&args).is_err());
    }

    #[test]
    fn test_list_requires_resource() {
        let args = ListTagsForResourceRequest {
            resource_type: String::new(),
            resource_id: "i-0123".to_string(),
        };
        assert!(ListTagsCommand.validate_args(&args).is_err());

        let args = ListTagsForResourceRequest {
            resource_type: "ManagedInstance".to_string(),
            ..args
        };
        assert!(ListTagsCommand.validate_args(&args).is_ok());
    }
}
