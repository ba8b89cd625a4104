use std::time::Duration;

use async_trait::async_trait;
use offbox::{
    AssetManifest, ClassifierRules, Generations, LifecycleError, LifecyclePolicy, OffloadConfig,
    VersionConfig,
};
use offbox_configuration::{ConfigError, ConfigScope, OnTimeout};
use offbox_core::{Origin, OriginError, OriginResult, RequestDescriptor};
use offbox_moka::MokaRegistry;
use pretty_assertions::assert_eq;

const FULL: &str = r#"
scope: https://climadillo.example/app/
version: v1.0.1
stores:
  prefix: climadillo
  static: v1
  dynamic: v1-b
assets:
  required:
    - ./
    - ./index.html
  optional:
    - ./images/soleado.png
    - https://cdn.jsdelivr.net/npm/echarts/dist/echarts.min.js
classifier:
  api_markers: [".php"]
  document_suffixes: [".html", ".htm"]
lifecycle:
  skip_waiting_on_install: false
sync_tag: sync-forecast
offload:
  timeout: 1m 30s
  on_timeout: warn
  deduplicate: false
"#;

const MINIMAL: &str = r#"
scope: https://climadillo.example/
version: v2
stores:
  prefix: climadillo
"#;

#[test]
fn test_full_document_into_version() {
    let config = ConfigScope::from_yaml(FULL).expect("failed to parse");

    let version = config.into_version().unwrap();

    let expected = VersionConfig::new("v1.0.1", Generations::split("climadillo", "v1", "v1-b"))
        .assets(AssetManifest {
            required: vec!["./".to_owned(), "./index.html".to_owned()],
            optional: vec![
                "./images/soleado.png".to_owned(),
                "https://cdn.jsdelivr.net/npm/echarts/dist/echarts.min.js".to_owned(),
            ],
        })
        .rules(ClassifierRules {
            api_markers: vec![".php".to_owned()],
            document_suffixes: vec![".html".to_owned(), ".htm".to_owned()],
        })
        .policy(LifecyclePolicy {
            skip_waiting_on_install: false,
        });
    assert_eq!(version, expected);
}

#[test]
fn test_full_document_offload() {
    let config = ConfigScope::from_yaml(FULL).unwrap();

    assert_eq!(config.offload.on_timeout, OnTimeout::Warn);
    assert_eq!(
        config.offload_config(),
        OffloadConfig {
            timeout: Some(Duration::from_secs(90)),
            on_timeout: OnTimeout::Warn,
            deduplicate_revalidations: false,
        }
    );
}

#[test]
fn test_minimal_document_defaults() {
    let config = ConfigScope::from_yaml(MINIMAL).unwrap();

    assert_eq!(config.sync_tag, "sync-weather-data");
    assert_eq!(config.offload_config(), OffloadConfig::default());

    let version = config.into_version().unwrap();
    assert_eq!(version.generations, Generations::new("climadillo", "v2"));
    assert_eq!(version.assets, AssetManifest::default());
    assert_eq!(version.rules, ClassifierRules::default());
    assert!(version.policy.skip_waiting_on_install);
}

#[test]
fn test_timeout_defaults_to_cancel() {
    let yaml = format!("{MINIMAL}offload:\n  timeout: 500ms\n");
    let config = ConfigScope::from_yaml(&yaml).unwrap();

    let offload = config.offload_config();
    assert_eq!(offload.timeout, Some(Duration::from_millis(500)));
    assert_eq!(offload.on_timeout, OnTimeout::Cancel);
}

#[test]
fn test_missing_prefix_is_a_parse_error() {
    let yaml = "scope: https://climadillo.example/\nversion: v1\n";
    let error = ConfigScope::from_yaml(yaml).unwrap_err();
    assert!(matches!(error, ConfigError::Parse(_)), "{error}");
}

#[test]
fn test_non_http_scope_is_rejected() {
    let yaml = MINIMAL.replace("https://climadillo.example/", "file:///srv/app/");
    let error = ConfigScope::from_yaml(&yaml).unwrap_err();
    assert!(matches!(error, ConfigError::UnsupportedScope(_)), "{error}");
}

#[test]
fn test_empty_prefix_is_rejected() {
    let yaml = r#"
scope: https://climadillo.example/
version: v1
stores:
  prefix: climadillo
"#
    .replace("prefix: climadillo", "prefix: \"\"");
    let error = ConfigScope::from_yaml(&yaml).unwrap_err();
    assert!(matches!(error, ConfigError::Empty("stores.prefix")), "{error}");
}

#[test]
fn test_unresolvable_asset_is_rejected() {
    let yaml = format!("{MINIMAL}assets:\n  optional:\n    - \"http://[broken/icon.png\"\n");
    let error = ConfigScope::from_yaml(&yaml).unwrap_err();
    match error {
        ConfigError::InvalidAsset { asset, .. } => assert_eq!(asset, "http://[broken/icon.png"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_empty_marker_is_rejected() {
    let yaml = format!("{MINIMAL}classifier:\n  api_markers: [\"\"]\n");
    let error = ConfigScope::from_yaml(&yaml).unwrap_err();
    assert!(matches!(error, ConfigError::EmptyMarker), "{error}");
}

struct Offline;

#[async_trait]
impl Origin for Offline {
    async fn fetch(&self, _request: &RequestDescriptor) -> OriginResult {
        Err(OriginError::Timeout)
    }
}

#[tokio::test]
async fn test_scope_builder_applies_settings() {
    let config = ConfigScope::from_yaml(FULL).unwrap();
    let scope = config
        .scope_builder()
        .registry(MokaRegistry::default())
        .origin(Offline)
        .build();

    assert_eq!(scope.base_url().as_str(), "https://climadillo.example/app/");
    assert!(scope.sync("sync-forecast").await);
    assert!(!scope.sync("sync-weather-data").await);

    let error = scope.install(config.into_version().unwrap()).await.unwrap_err();
    assert!(matches!(error, LifecycleError::RequiredAsset { .. }), "{error}");
    assert!(scope.active_version().await.is_none());
}
