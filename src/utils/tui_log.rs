//! Stderr logging that steps aside for the terminal browser
//!
//! `vidgrid browse` draws the grid and player on the alternate screen, while
//! fetches and history moves keep logging underneath. `ConditionalStderrLayer`
//! wraps the fmt layer installed in `main` and drops its events for as long as
//! `set_tui_mode(true)` is in effect; `list`, `show` and `config` log normally.

use std::sync::atomic::{AtomicBool, Ordering};
use tracing::span;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Global flag to indicate whether TUI mode is active
static TUI_MODE: AtomicBool = AtomicBool::new(false);

/// Set TUI mode on or off
pub fn set_tui_mode(enabled: bool) {
    TUI_MODE.store(enabled, Ordering::SeqCst);
}

/// Check if TUI mode is active
pub fn is_tui_mode() -> bool {
    TUI_MODE.load(Ordering::SeqCst)
}

/// Wraps an output layer and mutes it while TUI mode is active.
///
/// Span bookkeeping is always forwarded so the inner layer keeps its span
/// context intact across the muted period.
pub struct ConditionalStderrLayer<L> {
    inner: L,
}

impl<L> ConditionalStderrLayer<L> {
    pub fn new(inner: L) -> Self {
        Self { inner }
    }
}

impl<S, L> Layer<S> for ConditionalStderrLayer<L>
where
    S: tracing::Subscriber,
    L: Layer<S>,
{
    fn on_new_span(&self, attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        self.inner.on_new_span(attrs, id, ctx);
    }

    fn on_record(&self, id: &span::Id, values: &span::Record<'_>, ctx: Context<'_, S>) {
        self.inner.on_record(id, values, ctx);
    }

    fn on_close(&self, id: span::Id, ctx: Context<'_, S>) {
        self.inner.on_close(id, ctx);
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: Context<'_, S>) {
        if !is_tui_mode() {
            self.inner.on_event(event, ctx);
        }
    }

    fn on_enter(&self, id: &span::Id, ctx: Context<'_, S>) {
        if !is_tui_mode() {
            self.inner.on_enter(id, ctx);
        }
    }

    fn on_exit(&self, id: &span::Id, ctx: Context<'_, S>) {
        if !is_tui_mode() {
            self.inner.on_exit(id, ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::layer::SubscriberExt;

    struct Recorder(Arc<Mutex<usize>>);

    impl<S: tracing::Subscriber> Layer<S> for Recorder {
        fn on_event(&self, _event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            *self.0.lock().unwrap() += 1;
        }
    }

    #[test]
    fn test_events_are_muted_in_tui_mode() {
        let seen = Arc::new(Mutex::new(0));
        let subscriber = tracing_subscriber::registry()
            .with(ConditionalStderrLayer::new(Recorder(seen.clone())));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("visible");
            set_tui_mode(true);
            tracing::info!("hidden");
            set_tui_mode(false);
            tracing::info!("visible again");
        });

        assert_eq!(*seen.lock().unwrap(), 2);
    }
}
