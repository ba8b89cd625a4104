use std::sync::Arc;

use offbox_backend::{PurgeReport, StoreRegistry};
use offbox_core::{Origin, RequestDescriptor};
use smol_str::SmolStr;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

use super::install::prewarm;
use super::{InstallReport, LifecycleState, Version, VersionConfig};
use crate::control::{ControlHandle, ControlMessage};
use crate::error::LifecycleError;
use crate::offload::{OffloadConfig, OffloadManager};
use crate::strategy::{Served, StrategyEngine};
use crate::sync::{DEFAULT_SYNC_TAG, SyncHook};

/// Result of handing a request to the scope.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The active version produced a response.
    Served(Served),
    /// The request is left to default network handling.
    Passthrough(PassthroughReason),
}

impl FetchOutcome {
    /// The served response, if the request was intercepted.
    pub fn served(self) -> Option<Served> {
        match self {
            Self::Served(served) => Some(served),
            Self::Passthrough(_) => None,
        }
    }
}

/// Why a request was not intercepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassthroughReason {
    /// No version has activated yet.
    NoActiveVersion,
    /// The URL scheme is not `http` or `https`.
    UnsupportedScheme,
}

#[derive(Debug, Default)]
struct Registration {
    active: Option<Arc<Version>>,
    waiting: Option<Arc<Version>>,
    installing: Option<Arc<Version>>,
    clients: usize,
    skip_waiting: bool,
}

impl Registration {
    fn is_installing(&self, version: &Arc<Version>) -> bool {
        self.installing
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, version))
    }
}

struct ScopeInner {
    registry: Arc<dyn StoreRegistry>,
    origin: Arc<dyn Origin>,
    base: Url,
    offload: OffloadManager,
    sync: SyncHook,
    registration: RwLock<Registration>,
}

/// Host of the cache versions for one application scope.
///
/// Cloning is cheap; clones share the same versions and stores.
///
/// # Example
///
/// ```ignore
/// use offbox::{Generations, Scope, VersionConfig};
///
/// let scope = Scope::builder(Url::parse("https://app.example/")?)
///     .registry(MokaRegistry::default())
///     .origin(ReqwestOrigin::default())
///     .build();
///
/// scope
///     .install(VersionConfig::new("v1", Generations::new("app", "v1")).required(["./index.html"]))
///     .await?;
///
/// match scope.handle_fetch(&request).await {
///     FetchOutcome::Served(served) => respond(served.response),
///     FetchOutcome::Passthrough(_) => forward(request),
/// }
/// ```
#[derive(Clone)]
pub struct Scope {
    inner: Arc<ScopeInner>,
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("base", &self.inner.base)
            .field("sync", &self.inner.sync)
            .finish_non_exhaustive()
    }
}

impl Scope {
    /// Creates a new [`ScopeBuilder`] for the scope rooted at `base`.
    pub fn builder(base: Url) -> ScopeBuilder<NotSet, NotSet> {
        ScopeBuilder::new(base)
    }

    /// Scope URL relative asset entries resolve against.
    pub fn base_url(&self) -> &Url {
        &self.inner.base
    }

    /// Background task manager shared by every version of this scope.
    pub fn offload(&self) -> &OffloadManager {
        &self.inner.offload
    }

    /// The store registry.
    pub fn registry(&self) -> &Arc<dyn StoreRegistry> {
        &self.inner.registry
    }

    /// The version currently serving requests.
    pub async fn active_version(&self) -> Option<Arc<Version>> {
        self.inner.registration.read().await.active.clone()
    }

    /// The installed version waiting to activate.
    pub async fn waiting_version(&self) -> Option<Arc<Version>> {
        self.inner.registration.read().await.waiting.clone()
    }

    /// Number of open clients.
    pub async fn clients(&self) -> usize {
        self.inner.registration.read().await.clients
    }

    /// Installs a version, activating it right away when nothing holds it
    /// in `Waiting`.
    ///
    /// On failure the version becomes [`Redundant`](LifecycleState::Redundant)
    /// and the previously active version keeps serving.
    pub async fn install(&self, config: VersionConfig) -> Result<InstallReport, LifecycleError> {
        let engine = StrategyEngine::new(
            self.inner.registry.clone(),
            self.inner.origin.clone(),
            config.generations.clone(),
            self.inner.offload.clone(),
        );
        let assets = config.assets.clone();
        let version = Arc::new(Version::new(config, engine));
        info!(version = %version.id(), "Installing");

        if let Some(previous) = self
            .inner
            .registration
            .write()
            .await
            .installing
            .replace(version.clone())
        {
            previous.set_state(LifecycleState::Redundant);
        }

        let result = prewarm(
            self.inner.registry.as_ref(),
            self.inner.origin.as_ref(),
            version.generations().static_store(),
            &self.inner.base,
            &assets,
        )
        .await;

        let activate_now = {
            let mut registration = self.inner.registration.write().await;
            if !registration.is_installing(&version) {
                version.set_state(LifecycleState::Redundant);
                return Err(LifecycleError::InvalidState {
                    operation: "finish install",
                    state: LifecycleState::Redundant,
                });
            }
            registration.installing = None;

            if let Err(error) = &result {
                warn!(version = %version.id(), %error, "Install failed");
                version.set_state(LifecycleState::Redundant);
                registration.skip_waiting = false;
                return result;
            }

            version.set_state(LifecycleState::Waiting);
            if let Some(previous) = registration.waiting.replace(version.clone()) {
                previous.set_state(LifecycleState::Redundant);
            }
            version.policy().skip_waiting_on_install
                || registration.skip_waiting
                || registration.active.is_none()
                || registration.clients == 0
        };

        if activate_now {
            self.activate_waiting().await?;
        } else {
            info!(version = %version.id(), "Installed, waiting for clients of the previous version");
        }
        result
    }

    /// Activates the waiting version now, or as soon as the one being
    /// installed finishes.
    ///
    /// Returns `true` if a version was activated by this call.
    pub async fn skip_waiting(&self) -> Result<bool, LifecycleError> {
        {
            let mut registration = self.inner.registration.write().await;
            if registration.waiting.is_none() {
                if registration.installing.is_some() {
                    registration.skip_waiting = true;
                }
                debug!("Nothing waiting to activate");
                return Ok(false);
            }
        }
        self.activate_waiting().await
    }

    /// Registers a newly opened client.
    pub async fn client_opened(&self) {
        self.inner.registration.write().await.clients += 1;
    }

    /// Unregisters a client; the waiting version activates when the last
    /// one goes away.
    pub async fn client_closed(&self) -> Result<(), LifecycleError> {
        let idle = {
            let mut registration = self.inner.registration.write().await;
            registration.clients = registration.clients.saturating_sub(1);
            registration.clients == 0 && registration.waiting.is_some()
        };
        if idle {
            self.activate_waiting().await?;
        }
        Ok(())
    }

    async fn activate_waiting(&self) -> Result<bool, LifecycleError> {
        let mut registration = self.inner.registration.write().await;
        let Some(version) = registration.waiting.take() else {
            return Ok(false);
        };
        registration.skip_waiting = false;
        version.set_state(LifecycleState::Activating);

        let current = version.generations().current();
        let report = match self.inner.registry.purge_stale(&current).await {
            Ok(report) => report,
            Err(error) => {
                warn!(version = %version.id(), %error, "Could not enumerate stores during activation");
                version.set_state(LifecycleState::Waiting);
                registration.waiting = Some(version);
                return Err(error.into());
            }
        };

        if let Some(previous) = registration.active.replace(version.clone()) {
            previous.set_state(LifecycleState::Redundant);
        }
        version.set_state(LifecycleState::Active);
        info!(
            version = %version.id(),
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            clients = registration.clients,
            "Activated and claimed clients"
        );
        Ok(true)
    }

    /// Classifies the request and runs it through the active version.
    pub async fn handle_fetch(&self, request: &RequestDescriptor) -> FetchOutcome {
        let Some(version) = self.active_version().await else {
            return FetchOutcome::Passthrough(PassthroughReason::NoActiveVersion);
        };
        let class = version.rules().classify(request);
        match version.engine().handle(request, class).await {
            Some(served) => FetchOutcome::Served(served),
            None => FetchOutcome::Passthrough(PassthroughReason::UnsupportedScheme),
        }
    }

    /// Deletes every store regardless of generation.
    pub async fn clear_cache(&self) -> Result<PurgeReport, LifecycleError> {
        let report = self.inner.registry.clear().await?;
        info!(deleted = report.deleted.len(), failed = report.failed.len(), "Cleared all caches");
        Ok(report)
    }

    /// Applies one control message.
    pub async fn handle_message(&self, message: ControlMessage) -> Result<(), LifecycleError> {
        match message {
            ControlMessage::SkipWaiting => {
                info!("Skip waiting requested");
                self.skip_waiting().await?;
            }
            ControlMessage::ClearCache => {
                self.clear_cache().await?;
            }
        }
        Ok(())
    }

    /// Spawns the control channel consumer for this scope.
    pub fn control(&self) -> ControlHandle {
        ControlHandle::spawn(self.clone())
    }

    /// Runs the sync hook if `tag` matches. Returns whether it ran.
    pub async fn sync(&self, tag: &str) -> bool {
        self.inner.sync.trigger(tag).await
    }
}

/// Marker type for unset builder fields.
///
/// When you see `NotSet` in a compiler error, it means you haven't called
/// the corresponding builder method yet.
#[derive(Debug)]
pub struct NotSet;

/// Builder for [`Scope`].
///
/// Use [`Scope::builder()`] to create a new builder. Registry and origin are
/// required; the sync tag and offload settings have defaults.
pub struct ScopeBuilder<R, O> {
    registry: R,
    origin: O,
    base: Url,
    sync_tag: SmolStr,
    offload: OffloadConfig,
}

impl ScopeBuilder<NotSet, NotSet> {
    fn new(base: Url) -> Self {
        Self {
            registry: NotSet,
            origin: NotSet,
            base,
            sync_tag: SmolStr::new_static(DEFAULT_SYNC_TAG),
            offload: OffloadConfig::default(),
        }
    }
}

impl<R, O> ScopeBuilder<R, O> {
    /// Sets the store registry.
    pub fn registry<T>(self, registry: T) -> ScopeBuilder<Arc<dyn StoreRegistry>, O>
    where
        T: StoreRegistry + 'static,
    {
        ScopeBuilder {
            registry: Arc::new(registry),
            origin: self.origin,
            base: self.base,
            sync_tag: self.sync_tag,
            offload: self.offload,
        }
    }

    /// Sets the origin.
    pub fn origin<T>(self, origin: T) -> ScopeBuilder<R, Arc<dyn Origin>>
    where
        T: Origin + 'static,
    {
        ScopeBuilder {
            registry: self.registry,
            origin: Arc::new(origin),
            base: self.base,
            sync_tag: self.sync_tag,
            offload: self.offload,
        }
    }

    /// Sets the tag the sync hook answers to.
    pub fn sync_tag(self, tag: impl Into<SmolStr>) -> Self {
        Self {
            sync_tag: tag.into(),
            ..self
        }
    }

    /// Sets the background task configuration.
    pub fn offload(self, offload: OffloadConfig) -> Self {
        Self { offload, ..self }
    }
}

impl ScopeBuilder<Arc<dyn StoreRegistry>, Arc<dyn Origin>> {
    /// Builds the scope. No version is installed yet.
    pub fn build(self) -> Scope {
        Scope {
            inner: Arc::new(ScopeInner {
                registry: self.registry,
                origin: self.origin,
                base: self.base,
                offload: OffloadManager::new(self.offload),
                sync: SyncHook::new(self.sync_tag),
                registration: RwLock::new(Registration::default()),
            }),
        }
    }
}
