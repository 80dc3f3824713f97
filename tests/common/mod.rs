#![allow(dead_code)]
/**
 * Shared fixtures: an in-memory cluster and a log capture subscriber
 */
use async_trait::async_trait;
use bytes::Bytes;
use dashproxy::error::{Error, Result};
use dashproxy::k8s::cluster::{ClusterApi, Route};
use hyper::http::Request;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::networking::v1::Ingress;
use kube::error::ErrorResponse;
use serde_json::json;
use std::sync::{Arc, Mutex};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

/// Build an `Api` error the way the API server reports one
#[must_use]
pub fn api_error(code: u16, reason: &str, message: &str) -> Error {
    Error::Kube(kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: message.to_string(),
        reason: reason.to_string(),
        code,
    }))
}

/// What a fake lookup answers
#[derive(Debug, Clone, Default)]
pub enum Lookup<T> {
    Found(T),
    #[default]
    Absent,
    Fails,
}

impl<T: Clone> Lookup<T> {
    fn answer(&self, what: &str) -> Result<Option<T>> {
        match self {
            Self::Found(value) => Ok(Some(value.clone())),
            Self::Absent => Ok(None),
            Self::Fails => Err(api_error(
                403,
                "Forbidden",
                &format!("{what} is forbidden: cannot get resource"),
            )),
        }
    }
}

#[derive(Default)]
pub struct FakeCluster {
    pub ingress: Lookup<Ingress>,
    pub route: Lookup<Route>,
    pub deployments: Option<Vec<Deployment>>,
    /// Body returned by the API server; `None` makes the call fail
    pub raw_body: Option<Bytes>,
    pub lookups: Mutex<Vec<(String, String)>>,
    pub sent: Mutex<Vec<Request<Vec<u8>>>>,
}

impl FakeCluster {
    #[must_use]
    pub fn new() -> Self {
        Self {
            deployments: Some(Vec::new()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_ingress(mut self, ingress: Lookup<Ingress>) -> Self {
        self.ingress = ingress;
        self
    }

    #[must_use]
    pub fn with_route(mut self, route: Lookup<Route>) -> Self {
        self.route = route;
        self
    }

    #[must_use]
    pub fn with_deployments(mut self, deployments: Vec<Deployment>) -> Self {
        self.deployments = Some(deployments);
        self
    }

    #[must_use]
    pub fn failing_deployments(mut self) -> Self {
        self.deployments = None;
        self
    }

    #[must_use]
    pub fn with_raw_body(mut self, body: &'static [u8]) -> Self {
        self.raw_body = Some(Bytes::from_static(body));
        self
    }

    pub fn lookups(&self) -> Vec<(String, String)> {
        self.lookups.lock().unwrap().clone()
    }

    fn record(&self, namespace: &str, what: &str) {
        self.lookups
            .lock()
            .unwrap()
            .push((namespace.to_string(), what.to_string()));
    }
}

#[async_trait]
impl ClusterApi for FakeCluster {
    async fn get_ingress(&self, namespace: &str, name: &str) -> Result<Option<Ingress>> {
        self.record(namespace, &format!("ingress/{name}"));
        self.ingress.answer("ingresses.networking.k8s.io")
    }

    async fn get_route(&self, namespace: &str, name: &str) -> Result<Option<Route>> {
        self.record(namespace, &format!("route/{name}"));
        self.route.answer("routes.route.openshift.io")
    }

    async fn list_deployments(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<Deployment>> {
        self.record(namespace, &format!("deployments?{label_selector}"));
        self.deployments.clone().ok_or_else(|| {
            api_error(500, "InternalError", "deployments.apps is unavailable")
        })
    }

    async fn send_raw(&self, request: Request<Vec<u8>>) -> Result<Bytes> {
        self.sent.lock().unwrap().push(request);
        self.raw_body
            .clone()
            .ok_or_else(|| api_error(404, "NotFound", "the server could not find the requested resource"))
    }
}

/// Ingress with one rule per host entry
#[must_use]
pub fn ingress(hosts: &[Option<&str>]) -> Ingress {
    let rules: Vec<_> = hosts
        .iter()
        .map(|host| match host {
            Some(h) => json!({ "host": h }),
            None => json!({}),
        })
        .collect();
    serde_json::from_value(json!({
        "apiVersion": "networking.k8s.io/v1",
        "kind": "Ingress",
        "metadata": { "name": "tekton-dashboard" },
        "spec": { "rules": rules }
    }))
    .unwrap()
}

#[must_use]
pub fn route(host: &str) -> Route {
    Route {
        name: "tekton-dashboard".to_string(),
        host: host.to_string(),
    }
}

/// Deployment with optional metadata labels, template annotations and a
/// single container image
#[must_use]
pub fn deployment(
    labels: &[(&str, &str)],
    annotations: &[(&str, &str)],
    image: Option<&str>,
) -> Deployment {
    let labels: serde_json::Map<String, serde_json::Value> = labels
        .iter()
        .map(|(k, v)| ((*k).to_string(), json!(v)))
        .collect();
    let annotations: serde_json::Map<String, serde_json::Value> = annotations
        .iter()
        .map(|(k, v)| ((*k).to_string(), json!(v)))
        .collect();
    let containers: Vec<_> = image
        .map(|i| json!({ "name": "controller", "image": i }))
        .into_iter()
        .collect();
    serde_json::from_value(json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": { "name": "controller", "labels": labels },
        "spec": {
            "selector": {},
            "template": {
                "metadata": { "annotations": annotations },
                "spec": { "containers": containers }
            }
        }
    }))
    .unwrap()
}

#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// True if some line at `level` contains `needle`
    pub fn has(&self, level: &str, needle: &str) -> bool {
        self.contents()
            .lines()
            .any(|line| line.contains(level) && line.contains(needle))
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Capture every event emitted on this thread until the guard drops
pub fn capture_logs() -> (LogBuffer, DefaultGuard) {
    let logs = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}

pub fn shared(cluster: FakeCluster) -> Arc<FakeCluster> {
    Arc::new(cluster)
}
