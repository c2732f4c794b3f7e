//! Runtime lifecycle: start the conversion runtime once, share it, release it.
//!
//! The runtime hosting the conversion export is expensive to boot, so a
//! [`RuntimeManager`] starts it lazily and keeps it for reuse:
//!
//! ```text
//!            ensure_ready()                 load ok
//! Unloaded ───────────────▶ Loading ───────────────▶ Ready
//!    ▲                         │                       │
//!    └──────── load failed ────┘                       │
//!    └──────────────────── teardown() ─────────────────┘
//! ```
//!
//! The in-flight bootstrap is stored in the state as a [`Shared`] future, so
//! every caller arriving while it runs awaits the same attempt and receives
//! the same context or the same error. A failed attempt leaves the manager
//! `Unloaded` and the next call starts over.
//!
//! Hosts plug in through three traits: [`RuntimeHost`] creates an
//! environment from a [`RuntimeLocation`], the [`RuntimeEnvironment`]
//! resolves exports and may release resources on [`dispose`], and the
//! resolved [`ConvertExport`] does the actual conversion.
//!
//! [`dispose`]: RuntimeEnvironment::dispose

use crate::config::BridgeConfig;
use crate::error::{HostError, Pdf2SvgError};
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use svg_runtime_locate::RuntimeLocation;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

// ── Host boundary ────────────────────────────────────────────────────────

/// The conversion capability exported by a running environment.
///
/// Receives the PDF bytes and an optional JSON options payload (see
/// [`crate::pipeline::options::WireOptions`]) and returns one SVG string per
/// converted page, in request order. Called synchronously on a blocking
/// thread. The bridge never runs two calls on the same environment at once,
/// so single-threaded environments need no locking of their own.
pub trait ConvertExport: Send + Sync {
    fn convert(&self, pdf: &[u8], options_json: Option<&str>) -> Result<Vec<String>, HostError>;
}

impl<F> ConvertExport for F
where
    F: Fn(&[u8], Option<&str>) -> Result<Vec<String>, HostError> + Send + Sync,
{
    fn convert(&self, pdf: &[u8], options_json: Option<&str>) -> Result<Vec<String>, HostError> {
        self(pdf, options_json)
    }
}

/// A started runtime environment.
#[async_trait]
pub trait RuntimeEnvironment: Send + Sync {
    /// Look up a named export. `None` when the environment does not expose
    /// it (or exposes something that is not callable as a conversion).
    async fn resolve_export(&self, name: &str) -> Option<Arc<dyn ConvertExport>>;

    /// Release the environment. Environments without a release hook keep
    /// the default no-op.
    fn dispose(&self) {}
}

/// Creates runtime environments.
#[async_trait]
pub trait RuntimeHost: Send + Sync {
    /// Boot an environment from the bundle at `location`. May be slow.
    async fn create(
        &self,
        location: &RuntimeLocation,
    ) -> Result<Box<dyn RuntimeEnvironment>, HostError>;
}

// ── Context & state ──────────────────────────────────────────────────────

/// Observable lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeState {
    Unloaded,
    Loading,
    Ready,
}

/// A ready environment plus its bound conversion export.
pub(crate) struct RuntimeContext {
    environment: Box<dyn RuntimeEnvironment>,
    export: Arc<dyn ConvertExport>,
    location: RuntimeLocation,
    turn: Arc<Mutex<()>>,
}

/// Exclusive right to call the export. Held until the call returns, even
/// when the caller that queued it has gone away.
pub(crate) struct ExportTurn {
    export: Arc<dyn ConvertExport>,
    _guard: OwnedMutexGuard<()>,
}

impl ExportTurn {
    pub(crate) fn convert(
        &self,
        pdf: &[u8],
        options_json: Option<&str>,
    ) -> Result<Vec<String>, HostError> {
        self.export.convert(pdf, options_json)
    }
}

impl RuntimeContext {
    /// Wait until no other conversion is using the export. Callers are
    /// served in arrival order.
    pub(crate) async fn export_turn(&self) -> ExportTurn {
        let guard = Arc::clone(&self.turn).lock_owned().await;
        ExportTurn {
            export: Arc::clone(&self.export),
            _guard: guard,
        }
    }
}

impl fmt::Debug for RuntimeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeContext")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

/// Why a bootstrap attempt failed. Cloned to every waiter.
#[derive(Debug, Clone)]
enum LoadError {
    Bootstrap(HostError),
    Unavailable { export: String },
}

impl From<LoadError> for Pdf2SvgError {
    fn from(e: LoadError) -> Self {
        match e {
            LoadError::Bootstrap(host) => Pdf2SvgError::Bootstrap(host),
            LoadError::Unavailable { export } => Pdf2SvgError::RuntimeUnavailable { export },
        }
    }
}

type LoadResult = Result<Arc<RuntimeContext>, LoadError>;
type PendingLoad = Shared<BoxFuture<'static, LoadResult>>;

enum LifecycleState {
    Unloaded,
    Loading { attempt: u64, pending: PendingLoad },
    Ready(Arc<RuntimeContext>),
}

// ── Manager ──────────────────────────────────────────────────────────────

/// Owns the single runtime context of a bridge.
pub(crate) struct RuntimeManager {
    host: Arc<dyn RuntimeHost>,
    runtime_dir: Option<PathBuf>,
    export_name: String,
    state: Mutex<LifecycleState>,
    attempts: AtomicU64,
}

impl RuntimeManager {
    pub(crate) fn new(host: Arc<dyn RuntimeHost>, config: &BridgeConfig) -> Self {
        Self {
            host,
            runtime_dir: config.runtime_dir.clone(),
            export_name: config.export_name.clone(),
            state: Mutex::new(LifecycleState::Unloaded),
            attempts: AtomicU64::new(0),
        }
    }

    /// Number of bootstrap attempts started so far.
    pub(crate) fn bootstrap_count(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub(crate) async fn state(&self) -> RuntimeState {
        match &*self.state.lock().await {
            LifecycleState::Unloaded => RuntimeState::Unloaded,
            LifecycleState::Loading { .. } => RuntimeState::Loading,
            LifecycleState::Ready(_) => RuntimeState::Ready,
        }
    }

    /// Return the ready context, starting or joining a bootstrap if needed.
    pub(crate) async fn ensure_ready(&self) -> Result<Arc<RuntimeContext>, Pdf2SvgError> {
        loop {
            let (attempt, pending) = {
                let mut state = self.state.lock().await;
                match &*state {
                    LifecycleState::Ready(context) => return Ok(Arc::clone(context)),
                    LifecycleState::Loading { attempt, pending } => {
                        debug!("Joining in-flight runtime bootstrap #{attempt}");
                        (*attempt, pending.clone())
                    }
                    LifecycleState::Unloaded => {
                        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
                        let pending = self.bootstrap(attempt).shared();
                        *state = LifecycleState::Loading {
                            attempt,
                            pending: pending.clone(),
                        };
                        (attempt, pending)
                    }
                }
            };

            let outcome = pending.await;

            let mut state = self.state.lock().await;
            let settles_here = matches!(
                &*state,
                LifecycleState::Loading { attempt: current, .. } if *current == attempt
            );
            if settles_here {
                *state = match &outcome {
                    Ok(context) => LifecycleState::Ready(Arc::clone(context)),
                    Err(_) => LifecycleState::Unloaded,
                };
                return outcome.map_err(Pdf2SvgError::from);
            }

            let context = outcome.map_err(Pdf2SvgError::from)?;
            match &*state {
                LifecycleState::Ready(current) if Arc::ptr_eq(current, &context) => {
                    return Ok(context);
                }
                LifecycleState::Unloaded => {
                    // teardown() ran while this attempt was loading and has
                    // already disposed the context.
                    return Err(Pdf2SvgError::Bootstrap(HostError::new(
                        "conversion runtime was shut down while starting",
                    )));
                }
                // Superseded by a later bootstrap; wait for that one instead.
                LifecycleState::Loading { .. } | LifecycleState::Ready(_) => {
                    debug!("Bootstrap #{attempt} was superseded; retrying");
                }
            }
        }
    }

    /// Release the runtime. No-op when nothing is loaded.
    pub(crate) async fn teardown(&self) {
        let previous = std::mem::replace(&mut *self.state.lock().await, LifecycleState::Unloaded);
        match previous {
            LifecycleState::Unloaded => debug!("Runtime teardown requested but nothing is loaded"),
            LifecycleState::Ready(context) => {
                context.environment.dispose();
                info!("Conversion runtime released");
            }
            LifecycleState::Loading { attempt, pending } => {
                debug!("Waiting for bootstrap #{attempt} before teardown");
                if let Ok(context) = pending.await {
                    context.environment.dispose();
                    warn!("Conversion runtime released as soon as bootstrap #{attempt} finished");
                }
            }
        }
    }

    fn bootstrap(&self, attempt: u64) -> BoxFuture<'static, LoadResult> {
        load(
            Arc::clone(&self.host),
            self.runtime_dir.clone(),
            self.export_name.clone(),
            attempt,
        )
        .inspect(|outcome| {
            if let Err(e) = outcome {
                warn!("Conversion runtime failed to start: {}", Pdf2SvgError::from(e.clone()));
            }
        })
        .boxed()
    }
}

/// One bootstrap attempt: locate the bundle, boot it, bind the export.
async fn load(
    host: Arc<dyn RuntimeHost>,
    runtime_dir: Option<PathBuf>,
    export_name: String,
    attempt: u64,
) -> LoadResult {
    let start = Instant::now();
    let location = svg_runtime_locate::locate_runtime(runtime_dir.as_deref())
        .map_err(|e| LoadError::Bootstrap(HostError::with_source(e.to_string(), e)))?;
    info!(
        "Starting conversion runtime #{attempt} from {}",
        location.root.display()
    );

    let environment = host.create(&location).await.map_err(LoadError::Bootstrap)?;

    let Some(export) = environment.resolve_export(&export_name).await else {
        environment.dispose();
        return Err(LoadError::Unavailable {
            export: export_name,
        });
    };

    info!(
        "Conversion runtime #{attempt} ready in {}ms",
        start.elapsed().as_millis()
    );
    Ok(Arc::new(RuntimeContext {
        environment,
        export,
        location,
        turn: Arc::new(Mutex::new(())),
    }))
}
