/**
 * Runtime settings for the dashboard backend
 */
use crate::k8s::utils::labels;
use crate::k8s::versions::VersionProbe;
use serde::Serialize;
use std::collections::BTreeMap;

/// Name shared by the dashboard Ingress and Route
pub const DASHBOARD_OBJECT_NAME: &str = "tekton-dashboard";

/// Namespace the pipelines controller is installed into
pub const DEFAULT_PIPELINES_NAMESPACE: &str = "tekton-pipelines";

/// Pod template annotation carrying the pipelines release
pub const RELEASE_ANNOTATION: &str = "tekton.dev/release";

/// Image path fragment identifying the pipelines controller
pub const CONTROLLER_IMAGE_MARKER: &str = "pipeline/cmd/controller";

/// Deployment label carrying the dashboard version
pub const DASHBOARD_VERSION_LABEL: &str = "version";

/// Installation details reported to the UI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Properties {
    #[serde(rename = "InstallNamespace")]
    pub install_namespace: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    /// Namespace the dashboard runs in; empty when not provided
    pub install_namespace: String,
    pub pipelines_namespace: String,
    pub ingress_name: String,
    pub route_name: String,
    pub dashboard_selector: BTreeMap<String, String>,
    pub pipelines_selector: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            install_namespace: String::new(),
            pipelines_namespace: DEFAULT_PIPELINES_NAMESPACE.to_string(),
            ingress_name: DASHBOARD_OBJECT_NAME.to_string(),
            route_name: DASHBOARD_OBJECT_NAME.to_string(),
            dashboard_selector: labels(&[("app", DASHBOARD_OBJECT_NAME)]),
            pipelines_selector: labels(&[
                ("app.kubernetes.io/component", "controller"),
                ("app.kubernetes.io/name", "tekton-pipelines"),
            ]),
        }
    }
}

impl Settings {
    #[must_use]
    pub fn with_install_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.install_namespace = namespace.into();
        self
    }

    #[must_use]
    pub fn with_pipelines_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.pipelines_namespace = namespace.into();
        self
    }

    #[must_use]
    pub fn properties(&self) -> Properties {
        Properties {
            install_namespace: self.install_namespace.clone(),
        }
    }

    /// The dashboard's own deployment, versioned by label
    #[must_use]
    pub fn dashboard_version_probe(&self) -> VersionProbe {
        VersionProbe {
            namespace: self.install_namespace.clone(),
            selector: self.dashboard_selector.clone(),
            version_label: Some(DASHBOARD_VERSION_LABEL.to_string()),
            annotation: None,
            image_marker: None,
        }
    }

    /// The pipelines controller, versioned by release annotation or image tag
    #[must_use]
    pub fn pipeline_version_probe(&self) -> VersionProbe {
        VersionProbe {
            namespace: self.pipelines_namespace.clone(),
            selector: self.pipelines_selector.clone(),
            version_label: None,
            annotation: Some(RELEASE_ANNOTATION.to_string()),
            image_marker: Some(CONTROLLER_IMAGE_MARKER.to_string()),
        }
    }
}
