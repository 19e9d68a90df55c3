use credential_gate::api;
use credential_gate::logger::*;
use credential_gate::server::*;
use credential_gate::settings::*;
use std::fs;
use std::sync::Arc;
use tokio::signal;

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!("could not listen for SIGINT: {}", e);
    }
}

fn require_file(path: &str, what: &str) -> anyhow::Result<()> {
    if !fs::metadata(path)?.is_file() {
        return Err(anyhow::anyhow!("{} is not a regular file: {:?}", what, path));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    info!(?project_settings);
    logger.reload_from_config(&LogConfig::from(&project_settings))?;

    let address: std::net::SocketAddr = project_settings.http.address.parse()?;

    let server = Arc::new(Server::try_new(&project_settings).await?);
    let app = api::app(
        server.credential_service.clone(),
        project_settings.http.clone(),
    );

    match (&project_settings.http.cert_path, &project_settings.http.key_path) {
        (Some(cert_path), Some(key_path)) => {
            require_file(cert_path, "TLS cert")?;
            require_file(key_path, "TLS key")?;
            let (bound, serving) = warp::serve(app)
                .tls()
                .cert_path(cert_path)
                .key_path(key_path)
                .bind_with_graceful_shutdown(address, shutdown_signal());
            info!("listening on https://{}", bound);
            serving.await;
        }
        (None, None) => {
            let (bound, serving) =
                warp::serve(app).bind_with_graceful_shutdown(address, shutdown_signal());
            info!("listening on http://{}", bound);
            serving.await;
        }
        _ => {
            return Err(anyhow::anyhow!(
                "http.cert_path and http.key_path must be set together"
            ));
        }
    }

    let shutdown_timeout = std::time::Duration::from_secs(30);
    match tokio::time::timeout(shutdown_timeout, server.shutdown()).await {
        Ok(_) => info!("server shutdown successfully"),
        Err(_) => error!("server shutdown timed out"),
    }

    Ok(())
}
