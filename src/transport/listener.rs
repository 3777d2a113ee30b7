use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::models::InboundEvent;

/// Ordered stream of inbound events from one or more sources
///
/// Dropping or closing the listener stops the pump feeding it, which stops
/// listening on every source at once.
pub struct Listener {
    events: mpsc::UnboundedReceiver<InboundEvent>,
    pump: Option<JoinHandle<()>>,
}

impl Listener {
    /// Listener fed by a background pump task owned by the listener
    pub fn with_pump(events: mpsc::UnboundedReceiver<InboundEvent>, pump: JoinHandle<()>) -> Self {
        Self {
            events,
            pump: Some(pump),
        }
    }

    /// Listener fed directly by the transport
    pub fn from_receiver(events: mpsc::UnboundedReceiver<InboundEvent>) -> Self {
        Self { events, pump: None }
    }

    /// Next event arriving before `deadline`, or None once the deadline passed.
    ///
    /// A closed stream still waits for the deadline so the window length does not
    /// depend on the transport.
    pub async fn next_before(&mut self, deadline: Instant) -> Option<InboundEvent> {
        match tokio::time::timeout_at(deadline, self.events.recv()).await {
            Ok(Some(event)) => Some(event),
            Ok(None) => {
                tokio::time::sleep_until(deadline).await;
                None
            }
            Err(_) => None,
        }
    }

    pub fn close(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
        self.events.close();
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ButtonAction;
    use chrono::Utc;
    use std::time::Duration;

    fn button(author: &str) -> InboundEvent {
        InboundEvent::Button {
            channel_id: "c".to_string(),
            author: author.to_string(),
            action: ButtonAction::Rerun,
            received_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn yields_events_before_deadline() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut listener = Listener::from_receiver(rx);
        tx.send(button("alice")).unwrap();

        let event = listener
            .next_before(Instant::now() + Duration::from_millis(100))
            .await;

        assert_eq!(event.unwrap().author(), "alice");
    }

    #[tokio::test]
    async fn returns_none_after_deadline() {
        let (_tx, rx) = mpsc::unbounded_channel();
        let mut listener = Listener::from_receiver(rx);

        let start = Instant::now();
        let event = listener
            .next_before(start + Duration::from_millis(30))
            .await;

        assert!(event.is_none());
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn closed_stream_still_waits_for_deadline() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(tx);
        let mut listener = Listener::from_receiver(rx);

        let start = Instant::now();
        assert!(listener
            .next_before(start + Duration::from_millis(30))
            .await
            .is_none());
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn close_aborts_the_pump() {
        let (_tx, rx) = mpsc::unbounded_channel();
        let pump = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        });
        let mut listener = Listener::with_pump(rx, pump);

        listener.close();

        assert!(listener.pump.is_none());
    }
}
