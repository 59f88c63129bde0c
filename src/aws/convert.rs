//! Conversions from SDK shapes to [`crate::model`] values.

use crate::model;
use aws_sdk_ssm::primitives::DateTime;
use aws_sdk_ssm::types;
use chrono::Utc;

pub(crate) fn timestamp(value: Option<DateTime>) -> Option<chrono::DateTime<Utc>> {
    value.and_then(|dt| chrono::DateTime::from_timestamp(dt.secs(), dt.subsec_nanos()))
}

pub(crate) fn parameter(param: types::Parameter) -> model::Parameter {
    model::Parameter {
        name: param.name.unwrap_or_default(),
        parameter_type: param.r#type.map(|t| t.as_str().to_string()),
        value: param.value.unwrap_or_default(),
        version: param.version,
        last_modified: timestamp(param.last_modified_date),
        arn: param.arn,
    }
}

pub(crate) fn parameter_metadata(meta: types::ParameterMetadata) -> model::ParameterMetadata {
    model::ParameterMetadata {
        name: meta.name.unwrap_or_default(),
        parameter_type: meta.r#type.map(|t| t.as_str().to_string()),
        description: meta.description,
        version: meta.version,
        last_modified: timestamp(meta.last_modified_date),
    }
}

pub(crate) fn parameter_type(value: model::ParameterType) -> types::ParameterType {
    match value {
        model::ParameterType::String => types::ParameterType::String,
        model::ParameterType::StringList => types::ParameterType::StringList,
        model::ParameterType::SecureString => types::ParameterType::SecureString,
    }
}

pub(crate) fn session_state(value: model::SessionState) -> types::SessionState {
    match value {
        model::SessionState::Active => types::SessionState::Active,
        model::SessionState::History => types::SessionState::History,
    }
}

pub(crate) fn instance(info: types::InstanceInformation) -> model::InstanceInformation {
    model::InstanceInformation {
        instance_id: info.instance_id.unwrap_or_default(),
        ping_status: info.ping_status.map(|s| s.as_str().to_string()),
        platform_name: info.platform_name,
        agent_version: info.agent_version,
        ip_address: info.ip_address,
        computer_name: info.computer_name,
    }
}

pub(crate) fn command(command: types::Command) -> model::Command {
    model::Command {
        command_id: command.command_id.unwrap_or_default(),
        document_name: command.document_name,
        status: command.status.map(|s| s.as_str().to_string()),
        requested_at: timestamp(command.requested_date_time),
    }
}

pub(crate) fn maintenance_window(
    window: types::MaintenanceWindowIdentity,
) -> model::MaintenanceWindow {
    model::MaintenanceWindow {
        window_id: window.window_id.unwrap_or_default(),
        name: window.name,
        enabled: window.enabled,
        schedule: window.schedule,
        next_execution_time: window.next_execution_time,
    }
}

pub(crate) fn automation_execution(
    execution: types::AutomationExecution,
) -> model::AutomationExecution {
    model::AutomationExecution {
        automation_execution_id: execution.automation_execution_id.unwrap_or_default(),
        document_name: execution.document_name,
        status: execution
            .automation_execution_status
            .map(|s| s.as_str().to_string()),
        failure_message: execution.failure_message,
        started_at: timestamp(execution.execution_start_time),
        ended_at: timestamp(execution.execution_end_time),
    }
}

pub(crate) fn session(session: types::Session) -> model::Session {
    model::Session {
        session_id: session.session_id.unwrap_or_default(),
        target: session.target,
        status: session.status.map(|s| s.as_str().to_string()),
        owner: session.owner,
        started_at: timestamp(session.start_date),
    }
}

pub(crate) fn tag(tag: types::Tag) -> model::Tag {
    model::Tag {
        key: tag.key,
        value: tag.value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_conversion() {
        let converted = timestamp(Some(DateTime::from_secs(1_700_000_000))).unwrap();
        assert_eq!(converted.to_rfc3339(), "2023-11-14T22:13:20+00:00");
        assert!(timestamp(None).is_none());
    }

    #[test]
    fn test_parameter_conversion() {
        let sdk = types::Parameter::builder()
            .name("/app/dev/API_KEY")
            .r#type(types::ParameterType::SecureString)
            .value("s3cr3t")
            .version(4)
            .build();

        let converted = parameter(sdk);
        assert_eq!(converted.name, "/app/dev/API_KEY");
        assert_eq!(converted.parameter_type.as_deref(), Some("SecureString"));
        assert_eq!(converted.value, "s3cr3t");
        assert_eq!(converted.version, 4);
        assert!(converted.last_modified.is_none());
    }

    #[test]
    fn test_instance_conversion_defaults_missing_id() {
        let sdk = types::InstanceInformation::builder()
            .ping_status(types::PingStatus::Online)
            .platform_name("Amazon Linux")
            .build();

        let converted = instance(sdk);
        assert_eq!(converted.instance_id, "");
        assert_eq!(converted.ping_status.as_deref(), Some("Online"));
    }

    #[test]
    fn test_model_enums_map_to_sdk() {
        assert_eq!(
            parameter_type(model::ParameterType::StringList),
            types::ParameterType::StringList
        );
        assert_eq!(
            session_state(model::SessionState::History),
            types::SessionState::History
        );
    }
}
