use clap::Parser;
use dashproxy::api::{ApiState, build_router};
use dashproxy::config::{DEFAULT_PIPELINES_NAMESPACE, Settings};
use dashproxy::k8s::{USER_AGENT, client, cluster::KubeCluster};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to serve the REST API on
    #[arg(long, env = "DASHPROXY_BIND", default_value = "0.0.0.0:9097")]
    bind: SocketAddr,

    /// Namespace the dashboard is installed into
    #[arg(long, env = "INSTALLED_NAMESPACE", default_value = "")]
    install_namespace: String,

    /// Namespace the pipelines controller is installed into
    #[arg(long, env = "PIPELINES_NAMESPACE", default_value = DEFAULT_PIPELINES_NAMESPACE)]
    pipelines_namespace: String,

    /// User-agent sent to the Kubernetes API server
    #[arg(long, env = "DASHPROXY_USER_AGENT", default_value = USER_AGENT)]
    user_agent: String,
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,dashproxy=debug")),
        )
        .init();

    let args = Args::parse();

    // kube and rustls may both enable a crypto backend; pin one explicitly
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let kube_client = client::new(Some(args.user_agent.as_str())).await?;
    let cluster = Arc::new(KubeCluster::new(kube_client));

    let settings = Settings::default()
        .with_install_namespace(args.install_namespace)
        .with_pipelines_namespace(args.pipelines_namespace);
    info!(
        install_namespace = %settings.install_namespace,
        pipelines_namespace = %settings.pipelines_namespace,
        "dashproxy starting"
    );

    let router = build_router(ApiState::new(cluster, settings));
    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    info!(addr = %args.bind, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
