/// Cancellable one-shot and repeating timers.
///
/// A timer is a spawned task that posts `Event::Timer(id)` back onto the
/// event channel. State is only ever touched by whoever receives that event,
/// so components compare the id against the handle they still hold and treat
/// anything else as stale. Dropping a `TimerHandle` cancels its task.
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::tui::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
pub struct TimerHandle {
  id: TimerId,
  token: CancellationToken,
}

impl TimerHandle {
  pub fn is(&self, id: TimerId) -> bool {
    self.id == id
  }

  pub fn cancel(&self) {
    self.token.cancel();
  }
}

impl Drop for TimerHandle {
  fn drop(&mut self) {
    self.token.cancel();
  }
}

/// True when `slot` holds the timer `id`.
pub fn holds(slot: &Option<TimerHandle>, id: TimerId) -> bool {
  slot.as_ref().is_some_and(|handle| handle.is(id))
}

#[derive(Debug)]
pub struct Scheduler {
  event_tx: UnboundedSender<Event>,
  next_id: u64,
}

impl Scheduler {
  pub fn new(event_tx: UnboundedSender<Event>) -> Self {
    Self { event_tx, next_id: 0 }
  }

  fn next_id(&mut self) -> TimerId {
    self.next_id += 1;
    TimerId(self.next_id)
  }

  /// Fires once after `delay`.
  pub fn once(&mut self, delay: Duration) -> TimerHandle {
    let id = self.next_id();
    let token = CancellationToken::new();
    let _token = token.clone();
    let _event_tx = self.event_tx.clone();
    tokio::spawn(async move {
      tokio::select! {
        biased;
        _ = _token.cancelled() => {}
        _ = tokio::time::sleep(delay) => {
          if let Err(e) = _event_tx.send(Event::Timer(id)) {
            debug!("Timer {:?} fired after event loop closed: {}", id, e);
          }
        }
      }
    });
    TimerHandle { id, token }
  }

  /// Fires every `period`, first one `period` from now.
  pub fn every(&mut self, period: Duration) -> TimerHandle {
    let id = self.next_id();
    let token = CancellationToken::new();
    let _token = token.clone();
    let _event_tx = self.event_tx.clone();
    tokio::spawn(async move {
      let start = tokio::time::Instant::now() + period;
      let mut interval = tokio::time::interval_at(start, period);
      loop {
        tokio::select! {
          biased;
          _ = _token.cancelled() => break,
          _ = interval.tick() => {
            if _event_tx.send(Event::Timer(id)).is_err() {
              break;
            }
          }
        }
      }
    });
    TimerHandle { id, token }
  }
}

#[cfg(test)]
pub(crate) mod test_support {
  use tokio::sync::mpsc::{self, UnboundedReceiver};

  use super::*;

  pub fn scheduler() -> (Scheduler, UnboundedReceiver<Event>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Scheduler::new(tx), rx)
  }

  /// Timer ids delivered so far, in arrival order.
  pub fn fired(rx: &mut UnboundedReceiver<Event>) -> Vec<TimerId> {
    let mut ids = Vec::new();
    while let Ok(event) = rx.try_recv() {
      if let Event::Timer(id) = event {
        ids.push(id);
      }
    }
    ids
  }
}

#[cfg(test)]
mod tests {
  use super::test_support::*;
  use super::*;

  #[tokio::test(start_paused = true)]
  async fn test_once_fires_after_delay() {
    let (mut sched, mut rx) = scheduler();
    let handle = sched.once(Duration::from_millis(100));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(fired(&mut rx).is_empty());
    tokio::time::sleep(Duration::from_millis(100)).await;
    let ids = fired(&mut rx);
    assert_eq!(ids.len(), 1);
    assert!(handle.is(ids[0]));
  }

  #[tokio::test(start_paused = true)]
  async fn test_cancelled_once_never_fires() {
    let (mut sched, mut rx) = scheduler();
    let handle = sched.once(Duration::from_millis(100));
    handle.cancel();
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(fired(&mut rx).is_empty());
  }

  #[tokio::test(start_paused = true)]
  async fn test_dropping_handle_cancels() {
    let (mut sched, mut rx) = scheduler();
    drop(sched.once(Duration::from_millis(100)));
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(fired(&mut rx).is_empty());
  }

  #[tokio::test(start_paused = true)]
  async fn test_every_repeats_until_cancelled() {
    let (mut sched, mut rx) = scheduler();
    let handle = sched.every(Duration::from_secs(1));
    tokio::time::sleep(Duration::from_millis(3500)).await;
    assert_eq!(fired(&mut rx).len(), 3);
    drop(handle);
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(fired(&mut rx).is_empty());
  }

  #[test]
  fn test_ids_are_unique() {
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    let mut sched = Scheduler::new(tx);
    let a = sched.next_id();
    let b = sched.next_id();
    assert_ne!(a, b);
  }
}
