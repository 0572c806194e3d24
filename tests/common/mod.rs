//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use docroute::config::parse_config;
use docroute::http::HttpServer;
use docroute::lifecycle::Shutdown;
use docroute::resource::ResourceRegistry;
use docroute::store::{DocumentStore, MemoryStore};
use tokio::net::TcpListener;

/// Widget at the root, gadget nested under it.
pub const CATALOG: &str = r#"
[[resources]]
title = "Widget"
methods = ["get", "post", "put", "delete"]
fields = ["name", "size"]
excludes = ["secret"]
schema = [
    { name = "name", kind = "string", required = true },
    { name = "size", kind = "number" },
    { name = "secret", kind = "string" },
]

[[resources]]
title = "Gadget"
parent = "Widget"
methods = ["get", "post"]
fields = ["label"]
schema = [
    { name = "label", kind = "string" },
    { name = "widget_key", kind = "object_id" },
]

[[resources]]
title = "Note"
methods = ["get"]
"#;

/// A running server on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a server for `toml` on 127.0.0.1 with an OS-assigned port.
pub async fn start_server(toml: &str) -> TestServer {
    let config = parse_config(toml).unwrap();
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let registry = ResourceRegistry::from_config(store, &config.resources).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, &registry);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    let client = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    TestServer {
        addr,
        shutdown,
        client,
    }
}
