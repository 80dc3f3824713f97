//! Kubernetes API proxy and cluster metadata service backing the pipelines
//! dashboard UI.

pub mod api;
pub mod config;
pub mod error;
pub mod k8s;
