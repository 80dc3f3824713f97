// Client creation with custom user-agent support for kube 2.x
use crate::error::Result as DpResult;
use hyper::http::{HeaderName, HeaderValue};
use kube::{Client, Config};
use tracing::warn;

/// Push a `user-agent` header onto the config when the value is a valid header
pub fn add_user_agent_header(config: &mut Config, custom_user_agent: Option<&str>) {
    if let Some(user_agent) = custom_user_agent {
        match HeaderValue::from_str(user_agent) {
            Ok(header_value) => {
                config
                    .headers
                    .push((HeaderName::from_static("user-agent"), header_value));
            }
            // keep the kube default user-agent
            Err(e) => warn!("ignoring invalid user-agent {:?}: {}", user_agent, e),
        }
    }
}

/// Create a new k8s client to interact with k8s cluster api
///
/// # Errors
///
/// Will return `Err` if no kubeconfig or in-cluster config can be inferred
pub async fn new(custom_user_agent: Option<&str>) -> DpResult<Client> {
    let mut config = Config::infer().await?;

    add_user_agent_header(&mut config, custom_user_agent);

    let client = Client::try_from(config)?;

    Ok(client)
}
