use crate::commands::template::{CommandTemplate, MessageOutput, require_non_empty};
use crate::display::{or_dash, print_success, print_table};
use ssm_async::model::{
    DeleteParameterRequest, DescribeParametersRequest, DescribeParametersResponse,
    GetParameterRequest, GetParameterResponse, GetParametersByPathRequest, Parameter,
    ParameterType, PutParameterRequest, PutParameterResponse,
};
use ssm_async::{CallFuture, SdkSsmClient, SimpleSystemsManagement, SsmAsyncClient, SsmError, TracingHandler};

pub struct GetParameterCommand;

impl CommandTemplate for GetParameterCommand {
    type Args = GetParameterRequest;
    type Response = GetParameterResponse;

    fn validate_args(&self, args: &Self::Args) -> Result<(), SsmError> {
        require_non_empty("Parameter name", &args.name)
    }

    fn submit(&self, client: &SsmAsyncClient, args: Self::Args) -> CallFuture<Self::Response, SsmError> {
        client.get_parameter_async_with_handler(args, TracingHandler::new("GetParameter"))
    }

    fn format_table(&self, response: &Self::Response) {
        // Bare value so the output can be captured by scripts
        println!("{}", response.parameter.value);
    }
}

pub struct PutParameterCommand;

impl CommandTemplate for PutParameterCommand {
    type Args = PutParameterRequest;
    type Response = PutParameterResponse;

    fn validate_args(&self, args: &Self::Args) -> Result<(), SsmError> {
        require_non_empty("Parameter name", &args.name)?;
        if args.value.is_empty() {
            return Err(SsmError::InvalidArgument(
                "Parameter value cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn submit(&self, client: &SsmAsyncClient, args: Self::Args) -> CallFuture<Self::Response, SsmError> {
        client.put_parameter_async_with_handler(args, TracingHandler::new("PutParameter"))
    }

    fn format_table(&self, response: &Self::Response) {
        print_success(&format!(
            "Parameter stored (version {}, tier {})",
            response.version,
            or_dash(response.tier.as_deref())
        ));
    }
}

pub struct DeleteParameterCommand;

impl CommandTemplate for DeleteParameterCommand {
    type Args = DeleteParameterRequest;
    type Response = MessageOutput;

    fn validate_args(&self, args: &Self::Args) -> Result<(), SsmError> {
        require_non_empty("Parameter name", &args.name)
    }

    fn submit(&self, client: &SsmAsyncClient, args: Self::Args) -> CallFuture<Self::Response, SsmError> {
        client.invoke_with_handler(
            |ssm: &SdkSsmClient, request: &DeleteParameterRequest| {
                ssm.delete_parameter(request)
                    .map(|_| MessageOutput::new(format!("Deleted parameter '{}'", request.name)))
            },
            args,
            TracingHandler::new("DeleteParameter"),
        )
    }

    fn format_table(&self, response: &Self::Response) {
        print_success(&response.message);
    }
}

/// Arguments for listing every parameter under a path
#[derive(Debug, Clone)]
pub struct ListParametersArgs {
    pub path: String,
    pub recursive: bool,
    pub strip_prefix: bool,
    pub with_decryption: bool,
}

/// Lists all pages under a path as a single pooled call.
pub struct ListParametersCommand;

impl CommandTemplate for ListParametersCommand {
    type Args = ListParametersArgs;
    type Response = Vec<Parameter>;

    fn validate_args(&self, args: &Self::Args) -> Result<(), SsmError> {
        require_non_empty("Parameter path", &args.path)
    }

    fn submit(&self, client: &SsmAsyncClient, args: Self::Args) -> CallFuture<Self::Response, SsmError> {
        client.invoke_with_handler(
            |ssm: &SdkSsmClient, args: &ListParametersArgs| fetch_parameters(ssm, args),
            args,
            TracingHandler::new("GetParametersByPath"),
        )
    }

    fn format_table(&self, response: &Self::Response) {
        if response.is_empty() {
            println!("No parameters found");
            return;
        }

        let rows: Vec<Vec<String>> = response
            .iter()
            .map(|p| {
                vec![
                    p.name.clone(),
                    or_dash(p.parameter_type.as_deref()),
                    p.version.to_string(),
                    p.value.clone(),
                ]
            })
            .collect();
        print_table(&["Name", "Type", "Version", "Value"], &rows);
    }
}

/// Fetch every parameter under `args.path`, following pagination tokens.
///
/// The path is normalized to start with `/`. With `strip_prefix`, names are
/// reported relative to the path and entries equal to the path are dropped.
pub fn fetch_parameters<D: SimpleSystemsManagement>(
    ssm: &D,
    args: &ListParametersArgs,
) -> Result<Vec<Parameter>, SsmError> {
    let normalized_path = normalize_path(&args.path);

    let mut request = GetParametersByPathRequest {
        path: normalized_path.clone(),
        recursive: args.recursive,
        with_decryption: args.with_decryption,
        ..GetParametersByPathRequest::default()
    };

    let parameters = collect_pages(|next_token| {
        request.next_token = next_token;
        let page = ssm.get_parameters_by_path(&request)?;
        Ok((page.parameters, page.next_token))
    })?;

    if !args.strip_prefix {
        return Ok(parameters);
    }

    Ok(parameters
        .into_iter()
        .filter_map(|mut p| {
            let key = strip_prefix(&p.name, &normalized_path);
            if key.is_empty() {
                return None;
            }
            p.name = key;
            Some(p)
        })
        .collect())
}

fn collect_pages<T, F>(mut fetch: F) -> Result<Vec<T>, SsmError>
where
    F: FnMut(Option<String>) -> Result<(Vec<T>, Option<String>), SsmError>,
{
    let mut items = Vec::new();
    let mut next_token: Option<String> = None;

    loop {
        let (page, token) = fetch(next_token)?;
        items.extend(page);

        match token.filter(|t| !t.is_empty()) {
            Some(token) => next_token = Some(token),
            None => break,
        }
    }

    Ok(items)
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

fn strip_prefix(name: &str, prefix: &str) -> String {
    match name.strip_prefix(prefix) {
        Some(rest) => rest.trim_start_matches('/').to_string(),
        None => name.to_string(),
    }
}

pub struct DescribeParametersCommand;

impl CommandTemplate for DescribeParametersCommand {
    type Args = DescribeParametersRequest;
    type Response = DescribeParametersResponse;

    fn submit(&self, client: &SsmAsyncClient, args: Self::Args) -> CallFuture<Self::Response, SsmError> {
        client.describe_parameters_async_with_handler(args, TracingHandler::new("DescribeParameters"))
    }

    fn format_table(&self, response: &Self::Response) {
        let rows: Vec<Vec<String>> = response
            .parameters
            .iter()
            .map(|p| {
                vec![
                    p.name.clone(),
                    or_dash(p.parameter_type.as_deref()),
                    p.version.to_string(),
                    p.last_modified
                        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    or_dash(p.description.as_deref()),
                ]
            })
            .collect();
        print_table(&["Name", "Type", "Version", "Modified", "Description"], &rows);

        if let Some(token) = &response.next_token {
            println!("More results available; next token: {}", token);
        }
    }
}

pub async fn get(
    client: &SsmAsyncClient,
    format: &crate::OutputFormat,
    name: &str,
    decrypt: bool,
) -> Result<(), SsmError> {
    let args = GetParameterRequest {
        name: name.to_string(),
        with_decryption: decrypt,
    };
    GetParameterCommand.execute(client, format, args).await
}

pub async fn put(
    client: &SsmAsyncClient,
    format: &crate::OutputFormat,
    name: &str,
    value: &str,
    parameter_type: ParameterType,
    description: Option<&str>,
    overwrite: bool,
) -> Result<(), SsmError> {
    let args = PutParameterRequest {
        name: name.to_string(),
        value: value.to_string(),
        parameter_type,
        description: description.map(str::to_string),
        overwrite,
    };
    PutParameterCommand.execute(client, format, args).await
}

pub async fn delete(
    client: &SsmAsyncClient,
    format: &crate::OutputFormat,
    name: &str,
) -> Result<(), SsmError> {
    let args = DeleteParameterRequest {
        name: name.to_string(),
    };
    DeleteParameterCommand.execute(client, format, args).await
}

pub async fn list(
    client: &SsmAsyncClient,
    format: &crate::OutputFormat,
    args: ListParametersArgs,
) -> Result<(), SsmError> {
    ListParametersCommand.execute(client, format, args).await
}

pub async fn describe(
    client: &SsmAsyncClient,
    format: &crate::OutputFormat,
    max_results: Option<i32>,
    next_token: Option<String>,
) -> Result<(), SsmError> {
    let args = DescribeParametersRequest {
        max_results,
        next_token,
    };
    DescribeParametersCommand.execute(client, format, args).await
}
