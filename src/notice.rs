/// Short-lived announcements shown on the status line.
///
/// Each notice owns its own expiry timer. Removal happens exactly once, by
/// whichever of expiry or `dismiss` gets there first.
use std::time::Duration;

use tokio::time::Instant;

use crate::timer::{Scheduler, TimerHandle, TimerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoticeId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
  pub id: NoticeId,
  pub message: String,
  pub created_at: Instant,
}

#[derive(Debug)]
struct LiveNotice {
  notice: Notice,
  expiry: TimerHandle,
}

#[derive(Debug)]
pub struct NoticeManager {
  lifetime: Duration,
  live: Vec<LiveNotice>,
  next_id: u64,
}

impl NoticeManager {
  pub fn new(lifetime: Duration) -> Self {
    Self { lifetime, live: Vec::new(), next_id: 0 }
  }

  pub fn announce(&mut self, message: impl Into<String>, scheduler: &mut Scheduler) -> NoticeId {
    self.next_id += 1;
    let id = NoticeId(self.next_id);
    let notice = Notice { id, message: message.into(), created_at: Instant::now() };
    info!("Announce: {}", notice.message);
    let expiry = scheduler.once(self.lifetime);
    self.live.push(LiveNotice { notice, expiry });
    id
  }

  /// Removes the notice early. Unknown or already removed ids are a no-op.
  pub fn dismiss(&mut self, id: NoticeId) -> bool {
    match self.live.iter().position(|n| n.notice.id == id) {
      Some(index) => {
        // dropping the entry cancels its expiry
        self.live.remove(index);
        true
      }
      None => false,
    }
  }

  pub fn handle_timer(&mut self, id: TimerId) -> bool {
    match self.live.iter().position(|n| n.expiry.is(id)) {
      Some(index) => {
        let expired = self.live.remove(index);
        debug!("Notice {:?} expired after {:?}", expired.notice.id, expired.notice.created_at.elapsed());
        true
      }
      None => false,
    }
  }

  pub fn live(&self) -> impl Iterator<Item = &Notice> {
    self.live.iter().map(|n| &n.notice)
  }

  pub fn len(&self) -> usize {
    self.live.len()
  }

  pub fn is_empty(&self) -> bool {
    self.live.is_empty()
  }
}
