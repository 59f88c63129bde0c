use clap::{Parser, Subcommand, ValueEnum};
use ssm_async::model::{ParameterType, SessionState, Tag};
use ssm_async::{ClientConfig, SsmAsyncClient, SsmError};
use std::path::PathBuf;
use std::process;

mod commands;
mod display;

use commands::parameter::ListParametersArgs;
use commands::tags::ResourceRef;

#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Parser)]
#[command(name = "ssm-async")]
#[command(about = "Asynchronous AWS Systems Manager client")]
#[command(
    long_about = "ssm-async issues AWS Systems Manager calls through a fixed-size worker pool.\n\nUsage: ssm-async [GLOBAL_OPTIONS] <COMMAND> [COMMAND_OPTIONS]\nExample: ssm-async --region eu-west-1 parameter list /myapp/dev --strip-prefix"
)]
#[command(version = env!("SSM_ASYNC_VERSION"))]
struct Cli {
    #[arg(long, global = true, help = "AWS region (default: from AWS config)")]
    region: Option<String>,

    #[arg(long, global = true, help = "Named AWS profile")]
    profile: Option<String>,

    #[arg(
        long = "endpoint-url",
        global = true,
        help = "Override the service endpoint (e.g. a local emulator)"
    )]
    endpoint_url: Option<String>,

    #[arg(
        short = 'c',
        long,
        global = true,
        help = "Path to a JSON config file (default: <config dir>/ssm-async/config.json)"
    )]
    config: Option<PathBuf>,

    #[arg(
        long = "pool-size",
        global = true,
        help = "Number of worker threads (default: max_connections from config, 10)"
    )]
    pool_size: Option<usize>,

    #[arg(
        short = 'o',
        long = "format",
        value_enum,
        global = true,
        default_value = "table",
        help = "Output format: table or json (default: table)"
    )]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Parameter Store operations")]
    Parameter {
        #[command(subcommand)]
        action: ParameterAction,
    },

    #[command(about = "List managed instances")]
    Instances {
        #[arg(long, help = "Page size (5-50)")]
        max_results: Option<i32>,
        #[arg(long, help = "Token from a previous page")]
        next_token: Option<String>,
    },

    #[command(about = "Run Command operations")]
    Command {
        #[command(subcommand)]
        action: CommandAction,
    },

    #[command(about = "List maintenance windows")]
    Windows {
        #[arg(long, help = "Page size")]
        max_results: Option<i32>,
        #[arg(long, help = "Token from a previous page")]
        next_token: Option<String>,
    },

    #[command(about = "Automation execution operations")]
    Automation {
        #[command(subcommand)]
        action: AutomationAction,
    },

    #[command(about = "Session Manager operations")]
    Sessions {
        #[command(subcommand)]
        action: SessionsAction,
    },

    #[command(about = "Resource tagging operations")]
    Tags {
        #[command(subcommand)]
        action: TagsAction,
    },
}

#[derive(Subcommand)]
enum ParameterAction {
    #[command(about = "Print a parameter value")]
    Get {
        #[arg(help = "Parameter name")]
        name: String,
        #[arg(long, help = "Return SecureString values encrypted")]
        no_decrypt: bool,
    },

    #[command(about = "Create or update a parameter")]
    Put {
        #[arg(help = "Parameter name")]
        name: String,
        #[arg(help = "Parameter value")]
        value: String,
        #[arg(
            short = 't',
            long = "type",
            default_value = "String",
            help = "String, StringList or SecureString"
        )]
        parameter_type: ParameterType,
        #[arg(short = 'd', long, help = "Parameter description")]
        description: Option<String>,
        #[arg(long, help = "Replace an existing parameter")]
        overwrite: bool,
    },

    #[command(about = "Delete a parameter")]
    Delete {
        #[arg(help = "Parameter name")]
        name: String,
    },

    #[command(about = "List every parameter under a path")]
    List {
        #[arg(help = "Path prefix, e.g. /myapp/dev")]
        path: String,
        #[arg(short = 'r', long, help = "Include nested paths")]
        recursive: bool,
        #[arg(long, help = "Show names relative to the path")]
        strip_prefix: bool,
        #[arg(long, help = "Return SecureString values encrypted")]
        no_decrypt: bool,
    },

    #[command(about = "Describe parameter metadata")]
    Describe {
        #[arg(long, help = "Page size")]
        max_results: Option<i32>,
        #[arg(long, help = "Token from a previous page")]
        next_token: Option<String>,
    },
}

#[derive(Subcommand)]
enum CommandAction {
    #[command(about = "Run an SSM document on instances")]
    Send {
        #[arg(help = "Document name, e.g. AWS-RunShellScript")]
        document: String,
        #[arg(short = 'i', long = "instance", required = true, help = "Target instance id (repeatable)")]
        instances: Vec<String>,
        #[arg(short = 'p', long = "parameter", help = "Document parameter as KEY=VALUE (repeatable)")]
        parameters: Vec<String>,
        #[arg(long, help = "Comment recorded with the command")]
        comment: Option<String>,
        #[arg(long, help = "Delivery timeout in seconds")]
        timeout_seconds: Option<i32>,
    },

    #[command(about = "Show a command's result on one instance")]
    Status {
        #[arg(help = "Command id")]
        command_id: String,
        #[arg(help = "Instance id")]
        instance_id: String,
    },

    #[command(about = "Cancel a running command")]
    Cancel {
        #[arg(help = "Command id")]
        command_id: String,
        #[arg(short = 'i', long = "instance", help = "Limit to these instances (repeatable)")]
        instances: Vec<String>,
    },
}

#[derive(Subcommand)]
enum AutomationAction {
    #[command(about = "Start an automation execution")]
    Start {
        #[arg(help = "Automation document name")]
        document: String,
        #[arg(short = 'p', long = "parameter", help = "Document parameter as KEY=VALUE (repeatable)")]
        parameters: Vec<String>,
        #[arg(long, help = "Idempotency token (UUID; generated when omitted)")]
        client_token: Option<String>,
    },

    #[command(about = "Show an automation execution")]
    Status {
        #[arg(help = "Execution id")]
        execution_id: String,
    },

    #[command(about = "Stop an automation execution")]
    Stop {
        #[arg(help = "Execution id")]
        execution_id: String,
    },
}

#[derive(Subcommand)]
enum SessionsAction {
    #[command(about = "List sessions")]
    List {
        #[arg(long, default_value = "Active", help = "Active or History")]
        state: SessionState,
        #[arg(long, help = "Page size")]
        max_results: Option<i32>,
        #[arg(long, help = "Token from a previous page")]
        next_token: Option<String>,
    },

    #[command(about = "Terminate a session")]
    Terminate {
        #[arg(help = "Session id")]
        session_id: String,
    },
}

#[derive(Subcommand)]
enum TagsAction {
    #[command(about = "Add tags to a resource")]
    Add {
        #[arg(help = "Resource type, e.g. Parameter, Document, ManagedInstance")]
        resource_type: String,
        #[arg(help = "Resource id")]
        resource_id: String,
        #[arg(required = true, help = "Tags as KEY=VALUE")]
        tags: Vec<Tag>,
    },

    #[command(about = "List a resource's tags")]
    List {
        #[arg(help = "Resource type")]
        resource_type: String,
        #[arg(help = "Resource id")]
        resource_id: String,
    },

    #[command(about = "Remove tags from a resource")]
    Remove {
        #[arg(help = "Resource type")]
        resource_type: String,
        #[arg(help = "Resource id")]
        resource_id: String,
        #[arg(required = true, help = "Tag keys to remove")]
        keys: Vec<String>,
    },
}

/// Layers CLI flags over the loaded configuration.
fn resolve_config(cli: &Cli) -> Result<ClientConfig, SsmError> {
    let mut config = ClientConfig::load(cli.config.as_deref())?;

    if let Some(region) = &cli.region {
        config.region = Some(region.clone());
    }
    if let Some(profile) = &cli.profile {
        config.profile = Some(profile.clone());
    }
    if let Some(endpoint_url) = &cli.endpoint_url {
        config.endpoint_url = Some(endpoint_url.clone());
    }
    if let Some(pool_size) = cli.pool_size {
        config.max_connections = pool_size;
    }

    config.validate()?;
    Ok(config)
}

async fn dispatch(
    client: &SsmAsyncClient,
    format: &OutputFormat,
    command: Commands,
) -> Result<(), SsmError> {
    match command {
        Commands::Parameter { action } => match action {
            ParameterAction::Get { name, no_decrypt } => {
                commands::parameter::get(client, format, &name, !no_decrypt).await
            }
            ParameterAction::Put {
                name,
                value,
                parameter_type,
                description,
                overwrite,
            } => {
                commands::parameter::put(
                    client,
                    format,
                    &name,
                    &value,
                    parameter_type,
                    description.as_deref(),
                    overwrite,
                )
                .await
            }
            ParameterAction::Delete { name } => {
                commands::parameter::delete(client, format, &name).await
            }
            ParameterAction::List {
                path,
                recursive,
                strip_prefix,
                no_decrypt,
            } => {
                let args = ListParametersArgs {
                    path,
                    recursive,
                    strip_prefix,
                    with_decryption: !no_decrypt,
                };
                commands::parameter::list(client, format, args).await
            }
            ParameterAction::Describe {
                max_results,
                next_token,
            } => commands::parameter::describe(client, format, max_results, next_token).await,
        },
        Commands::Instances {
            max_results,
            next_token,
        } => commands::instances(client, format, max_results, next_token).await,
        Commands::Command { action } => match action {
            CommandAction::Send {
                document,
                instances,
                parameters,
                comment,
                timeout_seconds,
            } => {
                commands::command::send(
                    client,
                    format,
                    &document,
                    instances,
                    &parameters,
                    comment,
                    timeout_seconds,
                )
                .await
            }
            CommandAction::Status {
                command_id,
                instance_id,
            } => commands::command::status(client, format, &command_id, &instance_id).await,
            CommandAction::Cancel {
                command_id,
                instances,
            } => commands::command::cancel(client, format, &command_id, instances).await,
        },
        Commands::Windows {
            max_results,
            next_token,
        } => commands::windows(client, format, max_results, next_token).await,
        Commands::Automation { action } => match action {
            AutomationAction::Start {
                document,
                parameters,
                client_token,
            } => {
                commands::automation::start(client, format, &document, &parameters, client_token)
                    .await
            }
            AutomationAction::Status { execution_id } => {
                commands::automation::status(client, format, &execution_id).await
            }
            AutomationAction::Stop { execution_id } => {
                commands::automation::stop(client, format, &execution_id).await
            }
        },
        Commands::Sessions { action } => match action {
            SessionsAction::List {
                state,
                max_results,
                next_token,
            } => commands::sessions::list(client, format, state, max_results, next_token).await,
            SessionsAction::Terminate { session_id } => {
                commands::sessions::terminate(client, format, &session_id).await
            }
        },
        Commands::Tags { action } => match action {
            TagsAction::Add {
                resource_type,
                resource_id,
                tags,
            } => {
                let resource = ResourceRef {
                    resource_type,
                    resource_id,
                };
                commands::tags::add(client, format, resource, tags).await
            }
            TagsAction::List {
                resource_type,
                resource_id,
            } => {
                let resource = ResourceRef {
                    resource_type,
                    resource_id,
                };
                commands::tags::list(client, format, resource).await
            }
            TagsAction::Remove {
                resource_type,
                resource_id,
                keys,
            } => {
                let resource = ResourceRef {
                    resource_type,
                    resource_id,
                };
                commands::tags::remove(client, format, resource, keys).await
            }
        },
    }
}

async fn run(cli: Cli) -> Result<(), SsmError> {
    let config = resolve_config(&cli)?;
    tracing::debug!(
        region = ?config.region,
        pool_size = config.max_connections,
        "resolved client configuration"
    );

    let client = SsmAsyncClient::connect(&config).await?;
    let result = dispatch(&client, &cli.format, cli.command).await;
    client.shutdown();
    result
}

#[tokio::main]
async fn main() {
    ssm_async::logging::init_logging();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_nested_subcommand_with_global_flags() {
        let cli = Cli::try_parse_from([
            "ssm-async",
            "parameter",
            "put",
            "/app/db/password",
            "hunter2",
            "--type",
            "SecureString",
            "--pool-size",
            "4",
            "-o",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.pool_size, Some(4));
        assert!(matches!(cli.format, OutputFormat::Json));
        match cli.command {
            Commands::Parameter {
                action:
                    ParameterAction::Put {
                        name,
                        parameter_type,
                        overwrite,
                        ..
                    },
            } => {
                assert_eq!(name, "/app/db/password");
                assert_eq!(parameter_type, ParameterType::SecureString);
                assert!(!overwrite);
            }
            _ => panic!("expected parameter put"),
        }
    }

    #[test]
    fn test_send_requires_an_instance() {
        let result = Cli::try_parse_from(["ssm-async", "command", "send", "AWS-RunShellScript"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_tags_parse_as_key_value() {
        let cli = Cli::try_parse_from([
            "ssm-async",
            "tags",
            "add",
            "Parameter",
            "/app/db/host",
            "env=prod",
            "team=core",
        ])
        .unwrap();

        match cli.command {
            Commands::Tags {
                action: TagsAction::Add { tags, .. },
            } => {
                assert_eq!(tags.len(), 2);
                assert_eq!(tags[1].key, "team");
                assert_eq!(tags[1].value, "core");
            }
            _ => panic!("expected tags add"),
        }
    }
}
