//! Request and response values for the operations in [`crate::ssm`].
//!
//! These carry the fields the CLI and callers actually use; they are not a
//! full mirror of the service's shapes.

use crate::error::SsmError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParameterType {
    String,
    StringList,
    SecureString,
}

impl ParameterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterType::String => "String",
            ParameterType::StringList => "StringList",
            ParameterType::SecureString => "SecureString",
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParameterType {
    type Err = SsmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "string" => Ok(ParameterType::String),
            "stringlist" => Ok(ParameterType::StringList),
            "securestring" => Ok(ParameterType::SecureString),
            _ => Err(SsmError::InvalidArgument(format!(
                "unknown parameter type '{}' (expected String, StringList or SecureString)",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Active,
    History,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Active => "Active",
            SessionState::History => "History",
        }
    }
}

impl FromStr for SessionState {
    type Err = SsmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(SessionState::Active),
            "history" => Ok(SessionState::History),
            _ => Err(SsmError::InvalidArgument(format!(
                "unknown session state '{}' (expected Active or History)",
                s
            ))),
        }
    }
}

// Parameters

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub parameter_type: Option<String>,
    pub value: String,
    pub version: i64,
    pub last_modified: Option<DateTime<Utc>>,
    pub arn: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterMetadata {
    pub name: String,
    #[serde(rename = "type")]
    pub parameter_type: Option<String>,
    pub description: Option<String>,
    pub version: i64,
    pub last_modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetParameterRequest {
    pub name: String,
    pub with_decryption: bool,
}

impl GetParameterRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            with_decryption: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GetParameterResponse {
    pub parameter: Parameter,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GetParametersByPathRequest {
    pub path: String,
    pub recursive: bool,
    pub with_decryption: bool,
    pub max_results: Option<i32>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GetParametersByPathResponse {
    pub parameters: Vec<Parameter>,
    pub next_token: Option<String>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct PutParameterRequest {
    pub name: String,
    pub value: String,
    pub parameter_type: ParameterType,
    pub description: Option<String>,
    pub overwrite: bool,
}

// The value may be a SecureString plaintext; keep it out of logs.
impl fmt::Debug for PutParameterRequest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PutParameterRequest")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .field("parameter_type", &self.parameter_type)
            .field("description", &self.description)
            .field("overwrite", &self.overwrite)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PutParameterResponse {
    pub version: i64,
    pub tier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteParameterRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DeleteParameterResponse {}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DescribeParametersRequest {
    pub max_results: Option<i32>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescribeParametersResponse {
    pub parameters: Vec<ParameterMetadata>,
    pub next_token: Option<String>,
}

// Fleet

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceInformation {
    pub instance_id: String,
    pub ping_status: Option<String>,
    pub platform_name: Option<String>,
    pub agent_version: Option<String>,
    pub ip_address: Option<String>,
    pub computer_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DescribeInstanceInformationRequest {
    pub max_results: Option<i32>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescribeInstanceInformationResponse {
    pub instances: Vec<InstanceInformation>,
    pub next_token: Option<String>,
}

// Run Command

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Command {
    pub command_id: String,
    pub document_name: Option<String>,
    pub status: Option<String>,
    pub requested_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SendCommandRequest {
    pub document_name: String,
    pub instance_ids: Vec<String>,
    pub parameters: BTreeMap<String, Vec<String>>,
    pub comment: Option<String>,
    pub timeout_seconds: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendCommandResponse {
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetCommandInvocationRequest {
    pub command_id: String,
    pub instance_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetCommandInvocationResponse {
    pub command_id: String,
    pub instance_id: String,
    pub status: Option<String>,
    pub status_details: Option<String>,
    pub standard_output: Option<String>,
    pub standard_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelCommandRequest {
    pub command_id: String,
    pub instance_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CancelCommandResponse {}

// Maintenance windows

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaintenanceWindow {
    pub window_id: String,
    pub name: Option<String>,
    pub enabled: bool,
    pub schedule: Option<String>,
    pub next_execution_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DescribeMaintenanceWindowsRequest {
    pub max_results: Option<i32>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescribeMaintenanceWindowsResponse {
    pub windows: Vec<MaintenanceWindow>,
    pub next_token: Option<String>,
}

// Automation

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StartAutomationExecutionRequest {
    pub document_name: String,
    pub parameters: BTreeMap<String, Vec<String>>,
    /// Idempotency token; must be a UUID.
    pub client_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartAutomationExecutionResponse {
    pub automation_execution_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetAutomationExecutionRequest {
    pub automation_execution_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutomationExecution {
    pub automation_execution_id: String,
    pub document_name: Option<String>,
    pub status: Option<String>,
    pub failure_message: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GetAutomationExecutionResponse {
    pub execution: AutomationExecution,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopAutomationExecutionRequest {
    pub automation_execution_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct StopAutomationExecutionResponse {}

// Sessions

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub session_id: String,
    pub target: Option<String>,
    pub status: Option<String>,
    pub owner: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeSessionsRequest {
    pub state: SessionState,
    pub max_results: Option<i32>,
    pub next_token: Option<String>,
}

impl Default for DescribeSessionsRequest {
    fn default() -> Self {
        Self {
            state: SessionState::Active,
            max_results: None,
            next_token: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescribeSessionsResponse {
    pub sessions: Vec<Session>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminateSessionRequest {
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerminateSessionResponse {
    pub session_id: Option<String>,
}

// Tagging

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl FromStr for Tag {
    type Err = SsmError;

    /// Parses `KEY=VALUE`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => Ok(Tag {
                key: key.trim().to_string(),
                value: value.to_string(),
            }),
            _ => Err(SsmError::InvalidArgument(format!(
                "tag '{}' must be in KEY=VALUE form",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddTagsToResourceRequest {
    /// Service resource type, e.g. `Parameter`, `Document`, `ManagedInstance`.
    pub resource_type: String,
    pub resource_id: String,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AddTagsToResourceResponse {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTagsForResourceRequest {
    pub resource_type: String,
    pub resource_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListTagsForResourceResponse {
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveTagsFromResourceRequest {
    pub resource_type: String,
    pub resource_id: String,
    pub tag_keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RemoveTagsFromResourceResponse {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_type_parsing() {
        assert_eq!(
            "SecureString".parse::<ParameterType>().unwrap(),
            ParameterType::SecureString
        );
        assert_eq!(
            "secure-string".parse::<ParameterType>().unwrap(),
            ParameterType::SecureString
        );
        assert_eq!(
            "string_list".parse::<ParameterType>().unwrap(),
            ParameterType::StringList
        );
        assert!("blob".parse::<ParameterType>().is_err());
    }

    #[test]
    fn test_tag_parsing() {
        let tag: Tag = "env=prod=blue".parse().unwrap();
        assert_eq!(tag.key, "env");
        assert_eq!(tag.value, "prod=blue");

        let empty_value: Tag = "owner=".parse().unwrap();
        assert_eq!(empty_value.value, "");

        assert!("novalue".parse::<Tag>().is_err());
        assert!("=orphan".parse::<Tag>().is_err());
    }

    #[test]
    fn test_parameter_serializes_type_field() {
        let parameter = Parameter {
            name: "/app/db/host".to_string(),
            parameter_type: Some("String".to_string()),
            value: "db.internal".to_string(),
            version: 3,
            last_modified: None,
            arn: None,
        };

        let json = serde_json::to_value(&parameter).unwrap();
        assert_eq!(json["type"], "String");
        assert_eq!(json["version"], 3);
    }

    #[test]
    fn test_put_request_debug_hides_value() {
        let request = PutParameterRequest {
            name: "/app/db/password".to_string(),
            value: "hunter2".to_string(),
            parameter_type: ParameterType::SecureString,
            description: None,
            overwrite: true,
        };

        let debug = format!("{:?}", request);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("/app/db/password"));
        assert!(debug.contains("<redacted>"));
    }
}
