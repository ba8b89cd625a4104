//! Serving a small site through an offbox scope, then losing the network.
//!
//! The scope is configured from YAML, prewarms its static store on install
//! and keeps answering from cache once the origin becomes unreachable.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use offbox::{FetchOutcome, ResponseSource};
use offbox_configuration::ConfigScope;
use offbox_core::{Origin, OriginError, OriginResult, RequestDescriptor, ResourceKind};
use offbox_moka::MokaRegistry;
use offbox_reqwest::ReqwestOrigin;
use url::Url;

/// Wraps a real origin with a switch that simulates losing connectivity.
struct Flaky {
    inner: ReqwestOrigin,
    online: Arc<AtomicBool>,
}

#[async_trait]
impl Origin for Flaky {
    async fn fetch(&self, request: &RequestDescriptor) -> OriginResult {
        if !self.online.load(Ordering::Relaxed) {
            return Err(OriginError::Unreachable("network switched off".into()));
        }
        self.inner.fetch(request).await
    }
}

async fn show(scope: &offbox::Scope, url: &Url, kind: ResourceKind) {
    let request = RequestDescriptor::get(url.clone(), kind);
    match scope.handle_fetch(&request).await {
        FetchOutcome::Served(served) => {
            let source = match &served.source {
                ResponseSource::Network => "network".to_owned(),
                ResponseSource::Cache(store) => format!("cache ({store})"),
                ResponseSource::Fallback => "fallback".to_owned(),
            };
            println!(
                "{url} -> {} via {} [{}], {} bytes",
                served.response.status(),
                served.strategy,
                source,
                served.response.body().len()
            );
        }
        FetchOutcome::Passthrough(reason) => println!("{url} -> passthrough ({reason:?})"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("offbox=debug")
        .init();

    let config_yaml = r#"
    scope: https://example.com/
    version: v1
    stores:
      prefix: demo
    assets:
      required:
        - ./
      optional:
        - ./favicon.ico
    offload:
      timeout: 5s
    "#;
    let config = ConfigScope::from_yaml(config_yaml)?;

    let online = Arc::new(AtomicBool::new(true));
    let origin = Flaky {
        inner: ReqwestOrigin::default().timeout(Duration::from_secs(10)),
        online: online.clone(),
    };
    let scope = config
        .scope_builder()
        .registry(MokaRegistry::default())
        .origin(origin)
        .build();

    let report = scope.install(config.into_version()?).await?;
    println!(
        "installed: {} required, {} optional failed",
        report.required.len(),
        report.failed_optional().count()
    );

    let home = scope.base_url().clone();
    let api = home.join("./forecast.php?city=lima")?;

    println!("\n=== Online ===");
    show(&scope, &home, ResourceKind::Document).await;
    show(&scope, &api, ResourceKind::Other).await;
    scope.offload().wait_all().await;

    println!("\n=== Offline ===");
    online.store(false, Ordering::Relaxed);
    show(&scope, &home, ResourceKind::Document).await;
    show(&scope, &api, ResourceKind::Other).await;
    show(&scope, &home.join("./never-seen.png")?, ResourceKind::Image).await;

    println!("\n=== Clearing caches ===");
    let purged = scope.clear_cache().await?;
    println!("{purged:?}");
    show(&scope, &home, ResourceKind::Document).await;

    Ok(())
}
