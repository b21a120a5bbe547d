use crossterm::event::{Event, EventStream, MouseEventKind};
use futures_util::StreamExt;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;
use tracing::trace;

use crate::event::DomainEvent;

/// Owns the background task that forwards terminal input to the loop.
/// Timers share the same channel through [`EventBus::sender`].
pub(crate) struct EventBus {
    tx: UnboundedSender<DomainEvent>,
    input_task: Option<JoinHandle<()>>,
}

impl EventBus {
    pub(crate) fn spawn() -> (Self, UnboundedReceiver<DomainEvent>) {
        let (tx, rx) = unbounded_channel();
        let input_task = Some(spawn_input_task(tx.clone()));
        (Self { tx, input_task }, rx)
    }

    pub(crate) fn sender(&self) -> UnboundedSender<DomainEvent> {
        self.tx.clone()
    }

    pub(crate) fn shutdown(&mut self) {
        if let Some(task) = self.input_task.take() {
            task.abort();
        }
    }
}

impl Drop for EventBus {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn spawn_input_task(tx: UnboundedSender<DomainEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut input_stream = EventStream::new();
        while let Some(event) = input_stream.next().await {
            let domain_event = match event {
                // Mouse motion without a button held carries nothing the viewer uses.
                Ok(Event::Mouse(mouse)) if mouse.kind == MouseEventKind::Moved => {
                    trace!("ignoring bare mouse motion");
                    continue;
                }
                Ok(event) => DomainEvent::Input(event),
                Err(err) => DomainEvent::InputError(err.to_string()),
            };
            if tx.send(domain_event).is_err() {
                return;
            }
        }
    })
}
