//! Component version detection from deployment metadata.
//!
//! A [`VersionProbe`] names where to look: a label on the deployment, an
//! annotation on its pod template, or the tag of the first container image.
//! Sources are tried in that order and the first non-empty value wins.

use crate::error::Result;
use crate::k8s::cluster::ClusterApi;
use crate::k8s::utils::format_label_selector;
use k8s_openapi::api::apps::v1::Deployment;
use std::collections::BTreeMap;
use tracing::{debug, error, warn};

/// Reported when no source yields a version
pub const UNKNOWN_VERSION: &str = "Unknown";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionProbe {
    pub namespace: String,
    pub selector: BTreeMap<String, String>,
    /// Label on the deployment itself carrying the version
    pub version_label: Option<String>,
    /// Annotation on the pod template carrying the version
    pub annotation: Option<String>,
    /// Substring the first container image must contain before its tag is used
    pub image_marker: Option<String>,
}

/// Tag of an image reference, ignoring any `@digest` suffix
///
/// `gcr.io/x/controller:v0.9.0@sha256:abcd` gives `v0.9.0`. A reference with
/// no tag gives `None`, including one whose only `:` belongs to a registry port.
#[must_use]
pub fn image_tag(image: &str) -> Option<&str> {
    let name = image.split_once('@').map_or(image, |(name, _digest)| name);
    let (_, tag) = name.rsplit_once(':')?;
    if tag.is_empty() || tag.contains('/') {
        return None;
    }
    Some(tag)
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

impl VersionProbe {
    fn from_label(&self, deployment: &Deployment) -> Option<String> {
        let key = self.version_label.as_ref()?;
        non_empty(deployment.metadata.labels.as_ref()?.get(key))
    }

    fn from_annotation(&self, deployment: &Deployment) -> Option<String> {
        let key = self.annotation.as_ref()?;
        let template = &deployment.spec.as_ref()?.template;
        non_empty(template.metadata.as_ref()?.annotations.as_ref()?.get(key))
    }

    fn from_image(&self, deployment: &Deployment) -> Option<String> {
        let marker = self.image_marker.as_deref()?;
        let pod_spec = deployment.spec.as_ref()?.template.spec.as_ref()?;
        let image = pod_spec.containers.first()?.image.as_deref()?;
        if !image.contains(marker) {
            debug!("image {} does not contain {}", image, marker);
            return None;
        }
        image_tag(image).map(str::to_string)
    }

    /// Version carried by a single deployment, if any source has one
    #[must_use]
    pub fn extract(&self, deployment: &Deployment) -> Option<String> {
        self.from_label(deployment)
            .or_else(|| self.from_annotation(deployment))
            .or_else(|| self.from_image(deployment))
    }

    /// Pick the deployment to read. The newest by creation timestamp wins;
    /// on a tie (or with no timestamps) the later one in list order wins.
    #[must_use]
    pub fn select<'a>(&self, deployments: &'a [Deployment]) -> Option<&'a Deployment> {
        if deployments.len() > 1 {
            warn!(
                "{} deployments match {} in {}, using the newest",
                deployments.len(),
                format_label_selector(&self.selector),
                self.namespace
            );
        }
        deployments
            .iter()
            .max_by_key(|d| d.metadata.creation_timestamp.as_ref().map(|t| t.0))
    }

    /// Resolve the version, normalised to [`UNKNOWN_VERSION`] when no
    /// matching deployment carries one
    ///
    /// # Errors
    ///
    /// Will return `Err` if the deployments cannot be listed
    pub async fn resolve(&self, cluster: &dyn ClusterApi) -> Result<String> {
        let selector = format_label_selector(&self.selector);
        let deployments = cluster
            .list_deployments(&self.namespace, &selector)
            .await
            .map_err(|e| {
                error!(
                    "failed to list deployments in {} matching {}: {}",
                    self.namespace, selector, e
                );
                e
            })?;

        let version = self
            .select(&deployments)
            .and_then(|deployment| self.extract(deployment))
            .unwrap_or_else(|| UNKNOWN_VERSION.to_string());
        debug!("resolved version {} for {}", version, selector);
        Ok(version)
    }
}
