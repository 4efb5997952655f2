// ── Periodic refresh ──
//
// Re-renders a template on a fixed cadence and publishes the latest text
// on a watch channel. The renderer has no background behaviour of its own;
// this loop is the only scheduler. An optional reload hook re-reads the
// connections before every render, so edits made while the loop runs show
// up on the next tick.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use wallinfo_source::SourceFetcher;

use crate::builtins::Builtins;
use crate::registry::{ConnectionRegistry, SharedRegistry};
use crate::template::TemplateRenderer;

/// Shortest accepted refresh period.
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// One completed render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderOutcome {
    pub text: String,
    pub rendered_at: DateTime<Utc>,
}

type Reload = Box<dyn Fn() -> Result<ConnectionRegistry, String> + Send + Sync>;

/// Renders immediately, then once per interval, until cancelled.
pub struct RefreshLoop<F> {
    renderer: Arc<TemplateRenderer<F>>,
    registry: SharedRegistry,
    template: String,
    interval: Duration,
    builtins: fn() -> Builtins,
    reload: Option<Reload>,
}

impl<F> RefreshLoop<F>
where
    F: SourceFetcher + Send + Sync + 'static,
{
    /// `interval` is raised to [`MIN_INTERVAL`] if shorter.
    pub fn new(
        renderer: Arc<TemplateRenderer<F>>,
        registry: SharedRegistry,
        template: impl Into<String>,
        interval: Duration,
    ) -> Self {
        Self {
            renderer,
            registry,
            template: template.into(),
            interval: interval.max(MIN_INTERVAL),
            builtins: Builtins::gather,
            reload: None,
        }
    }

    /// Re-read the connections before each render and publish them to the
    /// shared registry. A failed reload keeps the previous connections.
    pub fn with_reload<R, E>(mut self, reload: R) -> Self
    where
        R: Fn() -> Result<ConnectionRegistry, E> + Send + Sync + 'static,
        E: std::fmt::Display,
    {
        self.reload = Some(Box::new(move || reload().map_err(|e| e.to_string())));
        self
    }

    #[cfg(test)]
    fn with_builtins(mut self, builtins: fn() -> Builtins) -> Self {
        self.builtins = builtins;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Render against the current registry snapshot.
    pub async fn render_once(&self) -> RenderOutcome {
        if let Some(reload) = &self.reload {
            match reload() {
                Ok(fresh) => self.registry.replace(fresh),
                Err(e) => warn!(error = %e, "connections reload failed, keeping previous set"),
            }
        }

        let registry = self.registry.snapshot();
        let builtins = (self.builtins)();
        let text = self
            .renderer
            .render(&self.template, &builtins, &registry)
            .await;

        RenderOutcome {
            text,
            rendered_at: Utc::now(),
        }
    }

    /// Start the loop on the current runtime.
    ///
    /// The receiver holds `None` until the first render completes. The
    /// task ends when `cancel` fires or every receiver is dropped.
    pub fn spawn(
        self,
        cancel: CancellationToken,
    ) -> (watch::Receiver<Option<RenderOutcome>>, JoinHandle<()>) {
        let (tx, rx) = watch::channel(None);
        let handle = tokio::spawn(self.run(tx, cancel));
        (rx, handle)
    }

    async fn run(self, tx: watch::Sender<Option<RenderOutcome>>, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = interval.tick() => {
                    let outcome = self.render_once().await;
                    info!(at = %outcome.rendered_at, bytes = outcome.text.len(), "refreshed");
                    if tx.send(Some(outcome)).is_err() {
                        debug!("no refresh subscribers left");
                        break;
                    }
                }
            }
        }

        debug!("refresh loop stopped");
    }
}
