//! Externally reachable dashboard endpoints.
//!
//! Two operations with deliberately different failure semantics:
//! [`ingress_host`] requires the Ingress and fails on any gap, while
//! [`endpoints`] collects whatever the Route and the Ingress offer and only
//! fails when neither yields a host.

use crate::error::{Error, Result};
use crate::k8s::cluster::ClusterApi;
use k8s_openapi::api::networking::v1::Ingress;
use serde::Serialize;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EndpointKind {
    Route,
    Ingress,
}

/// A host through which the dashboard is exposed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    #[serde(rename = "type")]
    pub kind: EndpointKind,
    pub url: String,
}

/// Why an Ingress did not yield a host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IngressGap {
    NoRules,
    EmptyHost,
}

// Only the first rule is considered.
fn first_rule_host(ingress: &Ingress) -> std::result::Result<&str, IngressGap> {
    let rule = ingress
        .spec
        .as_ref()
        .and_then(|spec| spec.rules.as_ref())
        .and_then(|rules| rules.first())
        .ok_or(IngressGap::NoRules)?;

    match rule.host.as_deref() {
        Some(host) if !host.is_empty() => Ok(host),
        _ => Err(IngressGap::EmptyHost),
    }
}

/// Host of the first rule of the named Ingress
///
/// # Errors
///
/// Will return `Err` if the Ingress cannot be fetched, does not exist, has no
/// rules, or its first rule has no host
pub async fn ingress_host(cluster: &dyn ClusterApi, namespace: &str, name: &str) -> Result<String> {
    let ingress = match cluster.get_ingress(namespace, name).await {
        Ok(Some(ingress)) => ingress,
        Ok(None) => {
            error!("Unable to retrieve any ingresses: {} not found in {}", name, namespace);
            return Err(Error::NotFoundOrEmpty(format!("ingress {namespace}/{name} not found")));
        }
        Err(e) => {
            error!("Unable to retrieve any ingresses: {}", e);
            return Err(e);
        }
    };

    match first_rule_host(&ingress) {
        Ok(host) => Ok(host.to_string()),
        Err(gap) => {
            match gap {
                IngressGap::NoRules => error!("no Ingress rules found labelled {}", name),
                IngressGap::EmptyHost => error!("found an empty Ingress rule labelled {}", name),
            }
            error!("Unable to retrieve any Ingresses");
            Err(Error::NotFoundOrEmpty(format!("ingress {namespace}/{name} has no host")))
        }
    }
}

async fn route_endpoint(cluster: &dyn ClusterApi, namespace: &str, name: &str) -> Option<Endpoint> {
    match cluster.get_route(namespace, name).await {
        Ok(Some(route)) if !route.host.is_empty() => Some(Endpoint {
            kind: EndpointKind::Route,
            url: route.host,
        }),
        Ok(Some(_)) => {
            error!("no Route found labelled {}", name);
            None
        }
        Ok(None) => {
            info!("Unable to retrieve any routes: {} not found in {}", name, namespace);
            None
        }
        Err(e) => {
            info!("Unable to retrieve any routes: {}", e);
            None
        }
    }
}

async fn ingress_endpoint(cluster: &dyn ClusterApi, namespace: &str, name: &str) -> Option<Endpoint> {
    let ingress = match cluster.get_ingress(namespace, name).await {
        Ok(Some(ingress)) => ingress,
        Ok(None) => {
            info!("Unable to retrieve any ingresses: {} not found in {}", name, namespace);
            return None;
        }
        Err(e) => {
            info!("Unable to retrieve any ingresses: {}", e);
            return None;
        }
    };

    match first_rule_host(&ingress) {
        Ok(host) => Some(Endpoint {
            kind: EndpointKind::Ingress,
            url: host.to_string(),
        }),
        Err(IngressGap::NoRules) => {
            error!("no Ingress rules found labelled {}", name);
            None
        }
        Err(IngressGap::EmptyHost) => {
            error!("found an empty Ingress rule labelled {}", name);
            None
        }
    }
}

/// Every usable Route and Ingress host for the dashboard, Route first
///
/// # Errors
///
/// Will return `Err` only when neither the Route nor the Ingress yields a host
pub async fn endpoints(
    cluster: &dyn ClusterApi,
    namespace: &str,
    route_name: &str,
    ingress_name: &str,
) -> Result<Vec<Endpoint>> {
    let (route, ingress) = tokio::join!(
        route_endpoint(cluster, namespace, route_name),
        ingress_endpoint(cluster, namespace, ingress_name),
    );

    let found: Vec<Endpoint> = route.into_iter().chain(ingress).collect();
    if found.is_empty() {
        error!("Unable to retrieve any Ingresses or Routes");
        return Err(Error::NotFoundOrEmpty(format!(
            "no route or ingress host in {namespace}"
        )));
    }
    Ok(found)
}
