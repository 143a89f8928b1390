//! Static server for the site directory

use anyhow::Result;
use axum::Router;
use std::net::SocketAddr;
use std::path::Path;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::Site;

/// Router serving every file under `site_dir`, `index.html` for directories
pub fn router(site_dir: &Path) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(site_dir).append_index_html_on_directories(true))
        .layer(TraceLayer::new_for_http())
}

/// Start the server
pub async fn start(site: &Site, ip: &str, port: u16, open: bool) -> Result<()> {
    if !site.index_path().exists() {
        tracing::warn!("No host page at {:?}", site.index_path());
    }

    let app = router(&site.site_dir);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}/", ip, port);
    println!("Serving {} at {}", site.site_dir.display(), url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
