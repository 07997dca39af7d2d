use std::{collections::HashSet, env, net::SocketAddr, path::PathBuf};

use anyhow::Context;
use axum_server::tls_rustls::RustlsConfig;
use breeze_server::{build_router, config::Config, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let loaded_env_files = load_env_files()?;
    init_tracing();
    if loaded_env_files.is_empty() {
        tracing::warn!("No .env or .env.local file found. Using process environment only.");
    } else {
        let files = loaded_env_files
            .iter()
            .map(|path| path.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        tracing::info!(files = %files, "Loaded environment files");
    }

    let config = Config::from_env()?;

    if config.pollen_api_key.is_none() {
        tracing::warn!(
            "POLLEN_API_KEY is not set. Pollen lookups will answer 500 until it is provided."
        );
    }
    tracing::info!(
        window_ms = config.rate_limit.window.as_millis() as u64,
        max_requests = config.rate_limit.max_requests,
        sweep_threshold = config.rate_limit.sweep_threshold,
        origins = %config.allowed_origins.join(", "),
        "pollen proxy limits"
    );

    let state = AppState::new(config.clone())?;
    let app = build_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    if let Some((cert_path, key_path)) = tls_paths(&config) {
        let tls_config = RustlsConfig::from_pem_file(&cert_path, &key_path)
            .await
            .context("failed to load TLS certificate/key")?;

        tracing::info!(port = config.port, "Running in HTTPS mode.");
        axum_server::bind_rustls(addr, tls_config)
            .serve(app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .context("HTTPS server failed")?;
    } else {
        tracing::info!(port = config.port, "Running in HTTP mode.");
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .context("failed to bind TCP listener")?;

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .context("HTTP server failed")?;
    }

    Ok(())
}

/// TLS is used only when both files are configured and present; anything
/// else falls back to plain HTTP with an error logged.
fn tls_paths(config: &Config) -> Option<(PathBuf, PathBuf)> {
    let (cert_path, key_path) = match (&config.tls_cert_path, &config.tls_key_path) {
        (Some(cert), Some(key)) => (cert.clone(), key.clone()),
        (None, None) => return None,
        (cert, key) => {
            tracing::error!(
                cert = ?cert,
                key = ?key,
                "TLS_CERT_PATH and TLS_KEY_PATH must be set together. Proceeding without TLS."
            );
            return None;
        }
    };

    let missing: Vec<_> = [&cert_path, &key_path]
        .into_iter()
        .filter(|path| !path.is_file())
        .collect();
    if !missing.is_empty() {
        for path in missing {
            tracing::error!(path = %path.display(), "TLS file not found");
        }
        tracing::error!("Proceeding without TLS.");
        return None;
    }

    Some((cert_path, key_path))
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn load_env_files() -> anyhow::Result<Vec<PathBuf>> {
    let mut roots = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        roots.push(cwd);
    }
    if let Some(executable_dir) = env::current_exe()
        .ok()
        .and_then(|path| path.parent().map(PathBuf::from))
    {
        roots.push(executable_dir);
    }
    roots.push(PathBuf::from(env!("CARGO_MANIFEST_DIR")));

    let mut seen_roots = HashSet::new();
    let mut loaded = Vec::new();

    for root in roots.into_iter().filter(|root| seen_roots.insert(root.clone())) {
        for filename in [".env", ".env.local"] {
            let path = root.join(filename);
            if path.is_file() {
                dotenvy::from_path(&path)
                    .with_context(|| format!("failed to load {}", path.display()))?;
                loaded.push(path);
            }
        }
    }

    Ok(loaded)
}
