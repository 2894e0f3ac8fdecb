/// Product modal: `Closed -> Opening -> Open -> Closing -> Closed`.
///
/// Auto-dismiss races manual dismiss; the first one to move the modal into
/// `Closing` wins and the other timer is cancelled. A second `open` while a
/// modal is live is rejected.
use std::time::Duration;

use strum::EnumIs;
use tokio::time::Instant;

use crate::timer::{holds, Scheduler, TimerHandle, TimerId};

pub const ADDED_TO_CART: &str = "¡Producto agregado a tu carrito!";
pub const CONTINUE_LABEL: &str = "Continuar Comprando";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, EnumIs)]
pub enum ModalPhase {
  #[default]
  Closed,
  Opening,
  Open,
  Closing,
}

/// Where a click landed relative to the modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
  Overlay,
  Panel,
  Button,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modal {
  pub product_name: String,
  pub product_price: String,
  pub opened_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalTimings {
  pub settle: Duration,
  pub auto_close: Duration,
  pub fade: Duration,
}

#[derive(Debug)]
pub struct ModalLifecycle {
  timings: ModalTimings,
  phase: ModalPhase,
  modal: Option<Modal>,
  settle: Option<TimerHandle>,
  auto_close: Option<TimerHandle>,
  release: Option<TimerHandle>,
}

impl ModalLifecycle {
  pub fn new(timings: ModalTimings) -> Self {
    Self { timings, phase: ModalPhase::Closed, modal: None, settle: None, auto_close: None, release: None }
  }

  pub fn phase(&self) -> ModalPhase {
    self.phase
  }

  pub fn modal(&self) -> Option<&Modal> {
    self.modal.as_ref()
  }

  pub fn open(&mut self, name: &str, price: &str, scheduler: &mut Scheduler) -> bool {
    if !self.phase.is_closed() {
      warn!("Modal for {} rejected, modal already {:?}", name, self.phase);
      return false;
    }
    info!("Opening modal for {} ({})", name, price);
    self.modal = Some(Modal {
      product_name: name.to_string(),
      product_price: price.to_string(),
      opened_at: Instant::now(),
    });
    if self.timings.settle.is_zero() {
      self.phase = ModalPhase::Open;
    } else {
      self.phase = ModalPhase::Opening;
      self.settle = Some(scheduler.once(self.timings.settle));
    }
    self.auto_close = Some(scheduler.once(self.timings.auto_close));
    true
  }

  /// Manual close. Only `Opening` and `Open` react; everything else is a no-op.
  pub fn dismiss(&mut self, scheduler: &mut Scheduler) -> bool {
    if !(self.phase.is_opening() || self.phase.is_open()) {
      return false;
    }
    self.settle = None;
    self.auto_close = None;
    if self.timings.fade.is_zero() {
      self.release();
    } else {
      self.phase = ModalPhase::Closing;
      self.release = Some(scheduler.once(self.timings.fade));
    }
    true
  }

  pub fn click(&mut self, target: ClickTarget, scheduler: &mut Scheduler) -> bool {
    match target {
      ClickTarget::Overlay | ClickTarget::Button => self.dismiss(scheduler),
      ClickTarget::Panel => false,
    }
  }

  /// Returns the phase entered when `id` drove a transition.
  pub fn handle_timer(&mut self, id: TimerId, scheduler: &mut Scheduler) -> Option<ModalPhase> {
    if holds(&self.settle, id) {
      self.settle = None;
      if self.phase.is_opening() {
        self.phase = ModalPhase::Open;
        return Some(ModalPhase::Open);
      }
      return None;
    }
    if holds(&self.auto_close, id) {
      self.auto_close = None;
      debug!("Modal auto-dismiss elapsed");
      if self.dismiss(scheduler) {
        return Some(self.phase);
      }
      return None;
    }
    if holds(&self.release, id) {
      self.release = None;
      self.release();
      return Some(ModalPhase::Closed);
    }
    None
  }

  fn release(&mut self) {
    if let Some(modal) = self.modal.take() {
      info!("Modal for {} closed after {:?}", modal.product_name, modal.opened_at.elapsed());
    }
    self.phase = ModalPhase::Closed;
  }
}
