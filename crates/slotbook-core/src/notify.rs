// ── Notification capability ──
//
// Fire-and-forget: the workflow hands every committed event to the
// configured notifier and never waits on or fails because of it.

use tracing::info;

use crate::model::BookingEvent;

pub trait Notifier: Send + Sync {
    fn emit(&self, event: &BookingEvent);
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn emit(&self, _event: &BookingEvent) {}
}

/// Logs every event at `info` with its join links.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn emit(&self, event: &BookingEvent) {
        match event.join_urls() {
            Some((host, guest)) => {
                info!(event = event.name(), host_url = host, guest_url = guest, "booking notification");
            }
            None => info!(event = event.name(), "booking notification"),
        }
    }
}
