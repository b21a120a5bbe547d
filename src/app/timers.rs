use std::collections::HashMap;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::event::DomainEvent;
use crate::viewer::{TimerCommand, TimerKind};

/// One cancellable timer per kind. Scheduling a kind aborts its pending timer;
/// expiry is delivered to the event loop as [`DomainEvent::Timer`].
pub(crate) struct TimerSlots {
    tx: UnboundedSender<DomainEvent>,
    slots: HashMap<TimerKind, JoinHandle<()>>,
}

impl TimerSlots {
    pub(crate) fn new(tx: UnboundedSender<DomainEvent>) -> Self {
        Self {
            tx,
            slots: HashMap::new(),
        }
    }

    pub(crate) fn apply(&mut self, command: TimerCommand) {
        match command {
            TimerCommand::Schedule { kind, token, at } => {
                self.cancel(kind);
                let tx = self.tx.clone();
                let deadline = tokio::time::Instant::from_std(at);
                let task = tokio::spawn(async move {
                    tokio::time::sleep_until(deadline).await;
                    let _ = tx.send(DomainEvent::Timer { kind, token });
                });
                self.slots.insert(kind, task);
            }
            TimerCommand::Cancel(kind) => self.cancel(kind),
        }
    }

    #[cfg(test)]
    pub(crate) fn is_pending(&self, kind: TimerKind) -> bool {
        self.slots.get(&kind).is_some_and(|task| !task.is_finished())
    }

    pub(crate) fn clear(&mut self) {
        for (_, task) in self.slots.drain() {
            task.abort();
        }
    }

    fn cancel(&mut self, kind: TimerKind) {
        if let Some(task) = self.slots.remove(&kind) {
            task.abort();
        }
    }
}

impl Drop for TimerSlots {
    fn drop(&mut self) {
        self.clear();
    }
}
