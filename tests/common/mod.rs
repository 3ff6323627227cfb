use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use promptedge::auth::{
    IdentityProvider, SessionToken, StaticTokenProvider, TokenAttachmentClient,
};
use promptedge::config::Config;
use promptedge::history::{BackendClient, HistoryState};

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Static root with an index document and one asset.
#[allow(dead_code)]
pub fn temp_static_site() -> TempDir {
    let dir = TempDir::new().expect("failed to create tempdir");
    fs::write(dir.path().join("index.html"), "<html>index</html>").expect("failed to write index");
    fs::write(dir.path().join("static-asset.js"), "console.log('asset');")
        .expect("failed to write asset");
    dir
}

/// Config pointing the proxy at `static_root` and `dynamic_origin`.
#[allow(dead_code)]
pub fn proxy_config(static_root: &TempDir, dynamic_origin: &str) -> Config {
    let mut config = Config::default();
    config.edge.static_root = static_root.path().to_path_buf();
    config.edge.dynamic_origin = Some(dynamic_origin.parse().expect("invalid origin url"));
    config
}

/// Run the edge proxy on an ephemeral port, returning its address.
#[allow(dead_code)]
pub async fn spawn_proxy(config: &Config) -> SocketAddr {
    let app = promptedge::edge::proxy::app(config).expect("failed to build proxy app");
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind proxy listener");
    let addr = listener.local_addr().expect("failed to read local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("proxy exited");
    });
    addr
}

/// History state over a fixed-token provider, aimed at `base_url`.
#[allow(dead_code)]
pub fn history_state(base_url: &str, token: &str) -> HistoryState {
    history_state_with_provider(
        base_url,
        Arc::new(StaticTokenProvider::new(SessionToken::new(token))),
    )
}

#[allow(dead_code)]
pub fn history_state_with_provider(
    base_url: &str,
    provider: Arc<dyn IdentityProvider>,
) -> HistoryState {
    let auth = TokenAttachmentClient::new(provider);
    let client = BackendClient::new(
        base_url.parse().expect("invalid base url"),
        auth,
        Duration::from_secs(5),
    )
    .expect("failed to build backend client");
    HistoryState::new(client)
}
