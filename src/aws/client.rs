use crate::config::ClientConfig;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_ssm::Client;
use aws_sdk_ssm::config::Region;

/// Resolve the shared AWS configuration for `config`.
///
/// Credentials come from the default provider chain:
/// 1. Environment variables (AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY)
/// 2. ~/.aws/credentials, using `config.profile` when set
/// 3. IAM role (when running on EC2, ECS, Lambda, etc.)
pub async fn load_sdk_config(config: &ClientConfig) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = &config.region {
        loader = loader.region(Region::new(region.clone()));
    }
    if let Some(profile) = &config.profile {
        loader = loader.profile_name(profile);
    }
    if let Some(endpoint) = &config.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }

    loader.load().await
}

/// Initialize an AWS SSM client for `config`.
pub async fn create_ssm_client(config: &ClientConfig) -> Client {
    let sdk_config = load_sdk_config(config).await;
    tracing::debug!(
        region = ?sdk_config.region(),
        "loaded AWS configuration"
    );
    Client::new(&sdk_config)
}
