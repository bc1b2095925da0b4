//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use webfront::http::middleware::{AccessLogSink, AccessRecord};
use webfront::{RequestContext, ServerConfig, ServerHandle, WebRoute, WebServer, WebService};

/// Access log sink that keeps every record in memory.
#[derive(Clone, Default)]
pub struct MemorySink(Arc<Mutex<Vec<AccessRecord>>>);

impl AccessLogSink for MemorySink {
    fn record(&self, record: &AccessRecord) {
        self.0.lock().unwrap().push(record.clone());
    }
}

impl MemorySink {
    pub fn records(&self) -> Vec<AccessRecord> {
        self.0.lock().unwrap().clone()
    }
}

async fn boom() -> &'static str {
    panic!("handler fault")
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(3)).await;
    "done"
}

/// Test application exercising every pipeline stage.
pub struct Blog;

impl WebService for Blog {
    fn routes(&self) -> Vec<WebRoute> {
        vec![
            WebRoute::get("/", || async { "HELLO" }),
            WebRoute::get("/ctx", |ctx: RequestContext| async move {
                format!("{}:{}", ctx.sequence(), ctx.is_robot())
            }),
            WebRoute::get("/quiet", |ctx: RequestContext| async move {
                ctx.suppress_access_log();
                "shh"
            }),
            WebRoute::get("/boom", boom),
            WebRoute::get("/slow", slow),
        ]
    }

    fn alt_routes(&self) -> Vec<WebRoute> {
        vec![
            WebRoute::get("/posts/.*", || async { "any post" }),
            WebRoute::get("/posts/[0-9]+", || async { "numbered post" }),
        ]
    }
}

pub fn test_config(addr: SocketAddr) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.bind_address = addr.to_string();
    config.lifecycle.init_timeout_ms = 50;
    config
}

/// Start the `Blog` application on `addr` in the background.
pub async fn start_blog(addr: SocketAddr, sink: &MemorySink) -> ServerHandle {
    let mut server = WebServer::new(test_config(addr))
        .unwrap()
        .with_access_sink(sink.clone());
    server.register("", Blog).unwrap();
    server.start().await.expect("server failed to start")
}

/// Client without connection pooling or proxies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}
