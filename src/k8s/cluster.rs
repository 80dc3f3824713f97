//! Read-only view of the cluster used by the proxy and metadata resolvers.
//!
//! Resolvers only talk to [`ClusterApi`], so they can be driven by an
//! in-memory fake in tests. [`KubeCluster`] is the production implementation
//! backed by a shared `kube::Client`.

use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::http::{Request, Response};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::networking::v1::Ingress;
use kube::api::{Api, ApiResource, DynamicObject, ListParams};
use kube::client::Body;
use kube::core::GroupVersionKind;
use kube::error::ErrorResponse;
use kube::Client;
use tracing::debug;

/// An OpenShift `Route`, reduced to the fields the resolvers read
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Route {
    pub name: String,
    pub host: String,
}

impl From<DynamicObject> for Route {
    fn from(obj: DynamicObject) -> Self {
        let host = obj
            .data
            .get("spec")
            .and_then(|spec| spec.get("host"))
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string();
        Self {
            name: obj.metadata.name.unwrap_or_default(),
            host,
        }
    }
}

/// Cluster lookups needed by the service. Implementations must be safe for
/// concurrent read use; nothing here mutates cluster state.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Fetch a named Ingress. An absent object is `Ok(None)`.
    async fn get_ingress(&self, namespace: &str, name: &str) -> Result<Option<Ingress>>;

    /// Fetch a named Route. An absent object (or a cluster without the
    /// Route API) is `Ok(None)`.
    async fn get_route(&self, namespace: &str, name: &str) -> Result<Option<Route>>;

    /// List deployments matching a `key=value,...` label selector. An empty
    /// namespace means every namespace.
    async fn list_deployments(&self, namespace: &str, label_selector: &str)
    -> Result<Vec<Deployment>>;

    /// Send a raw request to the API server and return the body of a
    /// successful response
    async fn send_raw(&self, request: Request<Vec<u8>>) -> Result<Bytes>;
}

fn route_resource() -> ApiResource {
    ApiResource::from_gvk(&GroupVersionKind {
        group: "route.openshift.io".to_string(),
        version: "v1".to_string(),
        kind: "Route".to_string(),
    })
}

/// [`ClusterApi`] backed by the Kubernetes API server
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    async fn error_from_response(response: Response<Body>) -> Error {
        let code = response.status().as_u16();
        let reason = response
            .status()
            .canonical_reason()
            .unwrap_or("Unknown")
            .to_string();
        let body = response
            .into_body()
            .collect()
            .await
            .map(http_body_util::Collected::to_bytes)
            .unwrap_or_default();

        let error_response = serde_json::from_slice::<ErrorResponse>(&body).unwrap_or_else(|_| {
            ErrorResponse {
                status: "Failure".to_string(),
                message: String::from_utf8_lossy(&body).into_owned(),
                reason,
                code,
            }
        });
        Error::Kube(kube::Error::Api(error_response))
    }
}

#[async_trait]
impl ClusterApi for KubeCluster {
    async fn get_ingress(&self, namespace: &str, name: &str) -> Result<Option<Ingress>> {
        let ingresses: Api<Ingress> = Api::namespaced(self.client.clone(), namespace);
        Ok(ingresses.get_opt(name).await?)
    }

    async fn get_route(&self, namespace: &str, name: &str) -> Result<Option<Route>> {
        let routes: Api<DynamicObject> =
            Api::namespaced_with(self.client.clone(), namespace, &route_resource());
        let route = routes.get_opt(name).await?;
        Ok(route.map(Route::from))
    }

    async fn list_deployments(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<Deployment>> {
        // an empty namespace lists across the whole cluster
        let deployments: Api<Deployment> = if namespace.is_empty() {
            Api::all(self.client.clone())
        } else {
            Api::namespaced(self.client.clone(), namespace)
        };
        let lp = ListParams::default().labels(label_selector);
        let list = deployments.list(&lp).await?;
        debug!(
            "listed {} deployments in {} matching {}",
            list.items.len(),
            namespace,
            label_selector
        );
        Ok(list.items)
    }

    async fn send_raw(&self, request: Request<Vec<u8>>) -> Result<Bytes> {
        let response = self.client.send(request.map(Body::from)).await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| Error::Custom(format!("failed to read api server response: {e}")))?;
        Ok(body.to_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_route_from_dynamic_object() {
        let obj: DynamicObject = serde_json::from_value(json!({
            "apiVersion": "route.openshift.io/v1",
            "kind": "Route",
            "metadata": { "name": "tekton-dashboard", "namespace": "tekton-pipelines" },
            "spec": { "host": "dashboard.apps.example.com", "to": { "kind": "Service", "name": "tekton-dashboard" } }
        }))
        .unwrap();

        let route = Route::from(obj);
        assert_eq!(route.name, "tekton-dashboard");
        assert_eq!(route.host, "dashboard.apps.example.com");
    }

    #[test]
    fn test_route_without_host() {
        let obj: DynamicObject = serde_json::from_value(json!({
            "apiVersion": "route.openshift.io/v1",
            "kind": "Route",
            "metadata": { "name": "tekton-dashboard" },
            "spec": { "to": { "kind": "Service", "name": "tekton-dashboard" } }
        }))
        .unwrap();

        assert_eq!(Route::from(obj).host, "");
    }

    #[test]
    fn test_route_resource_plural() {
        let ar = route_resource();
        assert_eq!(ar.plural, "routes");
        assert_eq!(ar.api_version, "route.openshift.io/v1");
    }
}
