use std::time::Duration;

use color_eyre::eyre::{eyre, Result};
use crossterm::event::{KeyCode, MouseButton, MouseEventKind};
use ratatui::{prelude::*, widgets::*};
use strum::EnumIs;

use crate::config::Settings;
use crate::countdown::Countdown;
use crate::modal::{ClickTarget, ModalLifecycle, ModalPhase, ADDED_TO_CART, CONTINUE_LABEL};
use crate::notice::NoticeManager;
use crate::storefront::{Category, NavItem, Storefront};
use crate::timer::{holds, Scheduler, TimerHandle, TimerId};
use crate::tui::{Event, Tui};

pub const APP_NAME: &str = "TiendaOnline";
const START_LABEL: &str = "Empezar a comprar";
const LOADING_LABEL: &str = "Cargando...";

// Page transition: button loading, then landing fade-out
const TRANSITION_LOADING_MS: u64 = 500;
const TRANSITION_FADE_MS: u64 = 300;
const FILTER_DIM_MS: u64 = 300;
const HEART_BEAT_MS: u64 = 600;
const RESIZE_DEBOUNCE_MS: u64 = 250;
const MOBILE_MAX_COLS: u16 = 80;              // Narrower terminals get the compact layout

// Modal panel size
const MODAL_WIDTH: u16 = 40;
const MODAL_HEIGHT: u16 = 8;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, EnumIs)]
enum AppState {
  #[default]
  Running,
  Quitting,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, EnumIs)]
pub enum Page {
  #[default]
  Landing,
  Loading,
  Leaving,
  Shopping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Message {
  Activate,
  Favorite,
  NextProduct,
  PrevProduct,
  NextCategory,
  PrevCategory,
  Nav(usize),
  CloseModal,
  DismissNotice,
  Click(u16, u16),
  Resized(u16, u16),
  Timer(TimerId),
  Tick,
  Quit,
}

pub struct App {
  state: AppState,
  page: Page,
  scheduler: Scheduler,
  countdown: Option<Countdown>,
  notices: NoticeManager,
  modal: ModalLifecycle,
  store: Storefront,
  section_title: &'static str,
  grid_dimmed: bool,
  nav: usize,
  mobile_layout: bool,
  pending_size: Option<(u16, u16)>,
  page_timer: Option<TimerHandle>,
  filter_timer: Option<TimerHandle>,
  heart_timer: Option<TimerHandle>,
  beating: Option<&'static str>,
  resize_timer: Option<TimerHandle>,
  modal_area: Option<Rect>,
  button_area: Option<Rect>,
}

impl App {
  pub fn new(settings: Settings, scheduler: Scheduler) -> Self {
    let countdown = settings.countdown.map(|clock| Countdown::new(clock, settings.tick, settings.low_time_minutes));
    Self {
      state: AppState::default(),
      page: Page::default(),
      scheduler,
      countdown,
      notices: NoticeManager::new(settings.announce),
      modal: ModalLifecycle::new(settings.modal),
      store: Storefront::new(),
      section_title: Category::default().section_title(),
      grid_dimmed: false,
      nav: 0,
      mobile_layout: false,
      pending_size: None,
      page_timer: None,
      filter_timer: None,
      heart_timer: None,
      beating: None,
      resize_timer: None,
      modal_area: None,
      button_area: None,
    }
  }

  /// Starts the optional pieces. A missing piece only disables itself.
  fn init(&mut self, size: Rect) {
    match self.countdown.as_mut() {
      Some(countdown) => { countdown.start(&mut self.scheduler); }
      None => info!("Countdown banner disabled, skipping countdown setup"),
    }
    self.apply_size(size.width, size.height);
    info!("{} initialized successfully", APP_NAME);
  }

  pub async fn run(&mut self, tui: &mut Tui) -> Result<()> {
    tui.enter()?;
    let size = tui.size()?;
    self.init(size);
    while !self.state.is_quitting() {
      tui.draw(|f| self.ui(f).expect("Unexpected error during drawing"))?;
      let event = tui.next().await.ok_or(eyre!("Unable to get event"))?; // blocks until next event
      let message = self.handle_event(event)?;
      self.update(message)?;
    }
    if let Some(countdown) = self.countdown.as_mut() {
      countdown.stop();
      info!("Countdown ran {} ticks this session", countdown.ticks());
    }
    tui.exit()?;
    Ok(())
  }

  // Event handler (keyboard, mouse, resize, timers)
  fn handle_event(&self, event: Event) -> Result<Message> {
    let msg = match event {
      Event::Key(key) => {
        match key.code {
          KeyCode::Char('q') | KeyCode::Char('Q') => Message::Quit,
          KeyCode::Esc if self.modal.modal().is_some() => Message::CloseModal,
          KeyCode::Esc => Message::Quit,
          KeyCode::Char(' ') | KeyCode::Enter => Message::Activate,
          KeyCode::Char('f') | KeyCode::Char('F') => Message::Favorite,
          KeyCode::Down | KeyCode::Char('j') => Message::NextProduct,
          KeyCode::Up | KeyCode::Char('k') => Message::PrevProduct,
          KeyCode::Right | KeyCode::Tab | KeyCode::Char('l') => Message::NextCategory,
          KeyCode::Left | KeyCode::BackTab | KeyCode::Char('h') => Message::PrevCategory,
          KeyCode::Char(c @ '1'..='4') => Message::Nav(c as usize - '1' as usize),
          KeyCode::Backspace | KeyCode::Char('x') => Message::DismissNotice,
          _ => Message::Tick,
        }
      },
      Event::Mouse(mouse) => match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Message::Click(mouse.column, mouse.row),
        _ => Message::Tick,
      },
      Event::Resize(w, h) => Message::Resized(w, h),
      Event::Timer(id) => Message::Timer(id),
      Event::Tick | Event::Error => Message::Tick,
    };
    Ok(msg)
  }

  fn update(&mut self, message: Message) -> Result<()> {
    match message {
      Message::Activate => self.activate(),
      Message::Favorite => self.toggle_favorite(),
      Message::NextProduct => self.move_focus(true),
      Message::PrevProduct => self.move_focus(false),
      Message::NextCategory => self.shift_category(true),
      Message::PrevCategory => self.shift_category(false),
      Message::Nav(index) => self.navigate(index),
      Message::CloseModal => { self.modal.click(ClickTarget::Overlay, &mut self.scheduler); }
      Message::DismissNotice => self.dismiss_notice(),
      Message::Click(col, row) => self.click(col, row),
      Message::Resized(w, h) => self.resized(w, h),
      Message::Timer(id) => self.on_timer(id),
      Message::Tick => {}
      Message::Quit => self.quit(),
    }
    Ok(())
  }

  fn activate(&mut self) {
    match self.page {
      Page::Landing => self.start_shopping(),
      Page::Loading | Page::Leaving => debug!("Transition in progress, ignoring activation"),
      Page::Shopping => {
        if self.modal.modal().is_some() {
          self.modal.click(ClickTarget::Button, &mut self.scheduler);
        } else if let Some(product) = self.store.focused() {
          self.modal.open(product.name, product.price, &mut self.scheduler);
        }
      }
    }
  }

  fn start_shopping(&mut self) {
    info!("Starting shopping transition");
    self.page = Page::Loading;
    self.page_timer = Some(self.scheduler.once(Duration::from_millis(TRANSITION_LOADING_MS)));
  }

  fn shopping_only(&self) -> bool {
    self.page.is_shopping()
  }

  fn toggle_favorite(&mut self) {
    if !self.shopping_only() { return };
    match self.store.toggle_favorite() {
      Some(true) => {
        self.beating = self.store.focused().map(|p| p.name);
        self.heart_timer = Some(self.scheduler.once(Duration::from_millis(HEART_BEAT_MS)));
        self.notices.announce("Producto agregado a favoritos", &mut self.scheduler);
      }
      Some(false) => { self.notices.announce("Producto removido de favoritos", &mut self.scheduler); }
      None => {}
    }
  }

  fn move_focus(&mut self, forward: bool) {
    if !self.shopping_only() { return };
    self.store.move_focus(forward);
  }

  fn shift_category(&mut self, forward: bool) {
    if !self.shopping_only() { return };
    let category = self.store.shift_category(forward);
    self.grid_dimmed = true;
    self.filter_timer = Some(self.scheduler.once(Duration::from_millis(FILTER_DIM_MS)));
    self.notices.announce(format!("Categoría {} seleccionada", category.label()), &mut self.scheduler);
  }

  fn navigate(&mut self, index: usize) {
    if !self.shopping_only() { return };
    if let Some(item) = NavItem::from_index(index) {
      self.nav = index;
      self.notices.announce(format!("Navegando a {}", item.label()), &mut self.scheduler);
    }
  }

  /// Drops the newest notice before its expiry.
  fn dismiss_notice(&mut self) {
    if let Some(id) = self.notices.live().last().map(|n| n.id) {
      self.notices.dismiss(id);
    }
  }

  fn click(&mut self, col: u16, row: u16) {
    if self.modal.modal().is_none() { return };
    let target = if self.button_area.is_some_and(|r| contains(r, col, row)) {
      ClickTarget::Button
    } else if self.modal_area.is_some_and(|r| contains(r, col, row)) {
      ClickTarget::Panel
    } else {
      ClickTarget::Overlay
    };
    self.modal.click(target, &mut self.scheduler);
  }

  /// Debounced: each resize replaces (and so cancels) the pending one.
  fn resized(&mut self, width: u16, height: u16) {
    self.pending_size = Some((width, height));
    self.resize_timer = Some(self.scheduler.once(Duration::from_millis(RESIZE_DEBOUNCE_MS)));
  }

  fn apply_size(&mut self, width: u16, _height: u16) {
    let mobile = width < MOBILE_MAX_COLS;
    if mobile != self.mobile_layout {
      info!("Switching to {} layout ({} cols)", if mobile { "compact" } else { "full" }, width);
    }
    self.mobile_layout = mobile;
  }

  fn on_timer(&mut self, id: TimerId) {
    if let Some(countdown) = self.countdown.as_mut() {
      if countdown.handle_timer(id) { return };
    }
    if self.notices.handle_timer(id) { return };
    if let Some(phase) = self.modal.handle_timer(id, &mut self.scheduler) {
      debug!("Modal entered {:?}", phase);
      return;
    }
    if holds(&self.page_timer, id) {
      self.page_timer = None;
      self.advance_page();
    } else if holds(&self.filter_timer, id) {
      self.filter_timer = None;
      self.grid_dimmed = false;
      self.section_title = self.store.category().section_title();
    } else if holds(&self.heart_timer, id) {
      self.heart_timer = None;
      self.beating = None;
    } else if holds(&self.resize_timer, id) {
      self.resize_timer = None;
      if let Some((w, h)) = self.pending_size.take() {
        self.apply_size(w, h);
      }
    }
  }

  fn advance_page(&mut self) {
    match self.page {
      Page::Loading => {
        self.page = Page::Leaving;
        self.page_timer = Some(self.scheduler.once(Duration::from_millis(TRANSITION_FADE_MS)));
      }
      Page::Leaving => {
        info!("Shopping page shown");
        self.page = Page::Shopping;
      }
      Page::Landing | Page::Shopping => {}
    }
  }

  fn quit(&mut self) {
    self.state = AppState::Quitting;
  }

  fn ui(&mut self, f: &mut Frame) -> Result<()> {
    let area = f.size();
    if self.page.is_shopping() {
      self.shopping_ui(f, area);
    } else {
      self.landing_ui(f, area);
    }
    f.render_widget(self.status_paragraph(), Rect { y: area.bottom().saturating_sub(1), height: area.height.min(1), ..area });
    if self.modal.modal().is_some() {
      self.modal_ui(f, area);
    } else {
      self.modal_area = None;
      self.button_area = None;
    }
    Ok(())
  }

  fn landing_ui(&self, f: &mut Frame, area: Rect) {
    let layout = Layout::default()
      .direction(Direction::Vertical)
      .constraints(vec![
        Constraint::Min(0),
        Constraint::Length(8), // title
        Constraint::Length(3), // button
        Constraint::Min(0),
      ])
      .split(area);

    let mut style = Style::new().light_green();
    if self.page.is_leaving() {
      style = Style::new().dark_gray();
    }
    let title = tui_big_text::BigTextBuilder::default()
      .lines(vec![APP_NAME.into()])
      .style(style)
      .build()
      .unwrap();
    f.render_widget(title, layout[1]);

    let label = if self.page.is_landing() { START_LABEL } else { LOADING_LABEL };
    let mut button_style = Style::new().black().on_light_green().bold();
    if !self.page.is_landing() {
      button_style = Style::new().dark_gray();
    }
    let button = Paragraph::new(Line::from(Span::styled(format!(" {} ", label), button_style)))
      .alignment(Alignment::Center)
      .block(Block::default().borders(Borders::NONE));
    f.render_widget(button, layout[2]);
  }

  fn shopping_ui(&self, f: &mut Frame, area: Rect) {
    let countdown_height = match (&self.countdown, self.mobile_layout) {
      (None, _) => 0,
      (Some(_), true) => 1,
      (Some(_), false) => 8,
    };
    let layout = Layout::default()
      .direction(Direction::Vertical)
      .constraints(vec![
        Constraint::Length(1), // header
        Constraint::Length(countdown_height),
        Constraint::Length(1), // categories
        Constraint::Length(2), // section title
        Constraint::Min(1),    // products
        Constraint::Length(1), // bottom nav
        Constraint::Length(1), // help
        Constraint::Length(1), // status
      ])
      .split(area);

    f.render_widget(self.header_paragraph(), layout[0]);
    if let Some(countdown) = &self.countdown {
      let style = self.countdown_style(countdown);
      if self.mobile_layout {
        f.render_widget(Paragraph::new(countdown.current_display()).style(style), layout[1]);
      } else {
        let big = tui_big_text::BigTextBuilder::default()
          .lines(vec![countdown.current_display().into()])
          .style(style)
          .build()
          .unwrap();
        f.render_widget(big, layout[1]);
      }
    }
    f.render_widget(self.category_paragraph(), layout[2]);
    f.render_widget(Paragraph::new(self.section_title.bold()), layout[3]);
    f.render_widget(self.products_paragraph(), layout[4]);
    f.render_widget(self.nav_paragraph(), layout[5]);
    f.render_widget(self.help_paragraph(), layout[6]);
  }

  fn countdown_style(&self, countdown: &Countdown) -> Style {
    if countdown.is_low_time() {
      Style::new().red().add_modifier(Modifier::SLOW_BLINK)
    } else if countdown.is_running() {
      Style::new().light_green()
    } else {
      Style::new().gray()
    }
  }

  fn header_paragraph(&self) -> Paragraph<'_> {
    let header = Line::from(vec![
      APP_NAME.bold(),
      "  ".into(),
      Span::styled(format!("♥ {}", self.store.badge_count()), Style::new().red()),
    ]);
    Paragraph::new(header)
  }

  fn category_paragraph(&self) -> Paragraph<'_> {
    let active = self.store.category();
    let mut spans = Vec::new();
    for category in Category::all() {
      let label = format!(" {} ", category.label());
      if category == active {
        spans.push(Span::styled(label, Style::new().white().on_black().bold()));
      } else {
        spans.push(Span::styled(label, Style::new().dark_gray().on_gray()));
      }
      spans.push(" ".into());
    }
    Paragraph::new(Line::from(spans))
  }

  fn products_paragraph(&self) -> Paragraph<'_> {
    let focused = self.store.focused_index();
    let lines: Vec<Line> = self.store.visible()
      .iter()
      .enumerate()
      .map(|(i, p)| {
        let heart = match (p.favorite, self.beating == Some(p.name)) {
          (true, true) => "♥".light_red().bold().reversed(),
          (true, false) => "♥".red(),
          (false, _) => "♡".gray(),
        };
        let marker = if i == focused { "> " } else { "  " };
        let mut name = Span::raw(format!("{:<24}", p.name));
        if i == focused {
          name = name.bold();
        }
        Line::from(vec![marker.into(), heart, " ".into(), name, p.price.white().on_black()])
      })
      .collect();
    let mut paragraph = Paragraph::new(lines);
    if self.grid_dimmed {
      paragraph = paragraph.dim();
    }
    paragraph
  }

  fn nav_paragraph(&self) -> Paragraph<'_> {
    let mut spans = Vec::new();
    for index in 0..4 {
      let Some(item) = NavItem::from_index(index) else { break };
      let label = format!(" {} {} ", index + 1, item.label());
      if index == self.nav {
        spans.push(Span::styled(label, Style::new().black().on_light_green()));
      } else {
        spans.push(Span::styled(label, Style::new().white()));
      }
    }
    Paragraph::new(Line::from(spans))
  }

  fn help_paragraph(&self) -> Paragraph<'_> {
    let help_text = Line::from(vec![
      "enter ".into(), "ver".dim(), " : ←→ ".into(), "categoría".dim(), " : ↑↓ ".into(),
      "producto".dim(), " : f ".into(), "favorito".dim(), " : 1-4 ".into(), "menú".dim(),
      " : x ".into(), "ocultar aviso".dim(), " : q ".into(), "salir".dim(),
    ]);
    Paragraph::new(help_text).gray()
  }

  fn status_paragraph(&self) -> Paragraph<'_> {
    if self.notices.is_empty() {
      return Paragraph::new("");
    }
    let mut text = self.notices.live().map(|n| n.message.as_str()).collect::<Vec<_>>().join("  ·  ");
    if self.notices.len() > 1 {
      text = format!("({}) {}", self.notices.len(), text);
    }
    Paragraph::new(Span::styled(text, Style::new().italic())).gray()
  }

  fn modal_ui(&mut self, f: &mut Frame, area: Rect) {
    let Some(modal) = self.modal.modal() else { return };
    let phase = self.modal.phase();
    // Narrower while opening or closing, like the 95% scale in transition
    let (width, height) = match phase {
      ModalPhase::Opening | ModalPhase::Closing => (MODAL_WIDTH - 2, MODAL_HEIGHT),
      ModalPhase::Open | ModalPhase::Closed => (MODAL_WIDTH, MODAL_HEIGHT),
    };
    let panel = centered_rect(width, height, area);
    let mut panel_style = Style::new().black().on_white();
    if phase.is_closing() {
      panel_style = Style::new().dark_gray().on_black();
    }
    let lines = vec![
      Line::from(modal.product_name.as_str().bold()),
      Line::from(modal.product_price.as_str().light_green().bold()),
      Line::from(""),
      Line::from(ADDED_TO_CART),
      Line::from(""),
      Line::from(Span::styled(format!("[ {} ]", CONTINUE_LABEL), Style::new().black().on_light_green().bold())),
    ];
    let paragraph = Paragraph::new(lines)
      .alignment(Alignment::Center)
      .style(panel_style)
      .block(Block::default().borders(Borders::ALL));
    f.render_widget(Clear, panel);
    f.render_widget(paragraph, panel);

    self.modal_area = Some(panel);
    self.button_area = Some(Rect {
      x: panel.x + 1,
      y: panel.y + 6,
      width: panel.width.saturating_sub(2),
      height: 1,
    });
  }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  Rect {
    x: area.x + (area.width - width) / 2,
    y: area.y + (area.height - height) / 2,
    width,
    height,
  }
}

fn contains(rect: Rect, col: u16, row: u16) -> bool {
  col >= rect.x && col < rect.x + rect.width && row >= rect.y && row < rect.y + rect.height
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::clock::Clock;
  use crate::timer::test_support::*;
  use crossterm::event::{KeyEvent, KeyModifiers, MouseEvent};
  use tokio::sync::mpsc::UnboundedReceiver;

  fn app() -> (App, UnboundedReceiver<Event>) {
    let (sched, rx) = scheduler();
    (App::new(Settings::default(), sched), rx)
  }

  fn key(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
  }

  fn latest(app: &App) -> Option<&str> {
    app.notices.live().last().map(|n| n.message.as_str())
  }

  fn drain(app: &mut App, rx: &mut UnboundedReceiver<Event>) {
    for id in fired(rx) {
      app.update(Message::Timer(id)).unwrap();
    }
  }

  async fn shopping() -> (App, UnboundedReceiver<Event>) {
    let (mut app, mut rx) = app();
    app.update(Message::Activate).unwrap();
    tokio::time::sleep(Duration::from_millis(550)).await;
    drain(&mut app, &mut rx);
    tokio::time::sleep(Duration::from_millis(350)).await;
    drain(&mut app, &mut rx);
    assert!(app.page.is_shopping());
    (app, rx)
  }

  #[test]
  fn test_default_app_creation() {
    let (app, _rx) = app();
    assert_eq!(app.state, AppState::Running);
    assert_eq!(app.page, Page::Landing);
    assert_eq!(app.section_title, "Producto Popular");
    assert!(app.countdown.as_ref().is_some_and(|c| c.current_display() == "10h 4m 0s"));
    assert!(app.notices.is_empty());
  }

  #[test]
  fn test_handle_key_events() {
    let (app, _rx) = app();
    assert_eq!(app.handle_event(key(KeyCode::Char('q'))).unwrap(), Message::Quit);
    assert_eq!(app.handle_event(key(KeyCode::Esc)).unwrap(), Message::Quit);
    assert_eq!(app.handle_event(key(KeyCode::Enter)).unwrap(), Message::Activate);
    assert_eq!(app.handle_event(key(KeyCode::Char(' '))).unwrap(), Message::Activate);
    assert_eq!(app.handle_event(key(KeyCode::Char('3'))).unwrap(), Message::Nav(2));
    assert_eq!(app.handle_event(key(KeyCode::Right)).unwrap(), Message::NextCategory);
    assert_eq!(app.handle_event(key(KeyCode::Char('x'))).unwrap(), Message::DismissNotice);
    assert_eq!(app.handle_event(key(KeyCode::Backspace)).unwrap(), Message::DismissNotice);
    assert_eq!(app.handle_event(key(KeyCode::Char('z'))).unwrap(), Message::Tick);
    assert_eq!(app.handle_event(Event::Resize(100, 40)).unwrap(), Message::Resized(100, 40));
  }

  #[test]
  fn test_handle_mouse_click() {
    let (app, _rx) = app();
    let click = MouseEvent {
      kind: MouseEventKind::Down(MouseButton::Left),
      column: 3,
      row: 7,
      modifiers: KeyModifiers::NONE,
    };
    assert_eq!(app.handle_event(Event::Mouse(click)).unwrap(), Message::Click(3, 7));
  }

  #[test]
  fn test_quit() {
    let (mut app, _rx) = app();
    app.update(Message::Quit).unwrap();
    assert!(app.state.is_quitting());
  }

  #[tokio::test(start_paused = true)]
  async fn test_page_transition() {
    let (mut app, mut rx) = app();
    app.update(Message::Activate).unwrap();
    assert_eq!(app.page, Page::Loading);
    // re-activation mid transition is ignored
    app.update(Message::Activate).unwrap();

    tokio::time::sleep(Duration::from_millis(450)).await;
    drain(&mut app, &mut rx);
    assert_eq!(app.page, Page::Loading);

    tokio::time::sleep(Duration::from_millis(100)).await;
    drain(&mut app, &mut rx);
    assert_eq!(app.page, Page::Leaving);

    tokio::time::sleep(Duration::from_millis(350)).await;
    drain(&mut app, &mut rx);
    assert_eq!(app.page, Page::Shopping);
  }

  #[tokio::test(start_paused = true)]
  async fn test_landing_ignores_store_keys() {
    let (mut app, _rx) = app();
    app.update(Message::Favorite).unwrap();
    app.update(Message::NextCategory).unwrap();
    assert_eq!(app.store.favorites_count(), 0);
    assert_eq!(app.store.category(), Category::Popular);
    assert!(app.notices.is_empty());
  }

  #[tokio::test(start_paused = true)]
  async fn test_category_filter_announces_and_retitles() {
    let (mut app, mut rx) = shopping().await;
    app.update(Message::NextCategory).unwrap();
    assert!(app.grid_dimmed);
    assert_eq!(app.section_title, "Producto Popular");
    assert_eq!(latest(&app), Some("Categoría Chaquetas seleccionada"));

    tokio::time::sleep(Duration::from_millis(350)).await;
    drain(&mut app, &mut rx);
    assert!(!app.grid_dimmed);
    assert_eq!(app.section_title, "Chaquetas");
    assert_eq!(app.notices.len(), 1);

    tokio::time::sleep(Duration::from_millis(700)).await;
    drain(&mut app, &mut rx);
    assert!(app.notices.is_empty());
  }

  #[tokio::test(start_paused = true)]
  async fn test_favorite_toggle() {
    let (mut app, _rx) = shopping().await;
    app.update(Message::Favorite).unwrap();
    assert_eq!(app.store.badge_count(), 3);
    assert_eq!(latest(&app), Some("Producto agregado a favoritos"));
    app.update(Message::Favorite).unwrap();
    assert_eq!(app.store.badge_count(), 2);
    assert_eq!(latest(&app), Some("Producto removido de favoritos"));
    assert_eq!(app.notices.len(), 2);
  }

  #[tokio::test(start_paused = true)]
  async fn test_dismiss_notice_then_expiry() {
    let (mut app, mut rx) = shopping().await;
    app.update(Message::Nav(2)).unwrap();
    app.update(Message::Nav(3)).unwrap();
    app.update(Message::DismissNotice).unwrap();
    assert_eq!(latest(&app), Some("Navegando a Carrito"));
    tokio::time::sleep(Duration::from_millis(1100)).await;
    drain(&mut app, &mut rx);
    assert!(app.notices.is_empty());
    app.update(Message::DismissNotice).unwrap();
    assert!(app.notices.is_empty());
  }

  #[tokio::test(start_paused = true)]
  async fn test_favorite_heart_beats_briefly() {
    let (mut app, mut rx) = shopping().await;
    app.update(Message::Favorite).unwrap();
    assert_eq!(app.beating, Some("Chaqueta Denim"));

    tokio::time::sleep(Duration::from_millis(550)).await;
    drain(&mut app, &mut rx);
    assert_eq!(app.beating, Some("Chaqueta Denim"));

    tokio::time::sleep(Duration::from_millis(100)).await;
    drain(&mut app, &mut rx);
    assert_eq!(app.beating, None);

    // removing a favorite does not beat
    app.update(Message::Favorite).unwrap();
    assert_eq!(app.beating, None);
    assert!(app.heart_timer.is_none());
  }

  #[tokio::test(start_paused = true)]
  async fn test_navigation_announces() {
    let (mut app, _rx) = shopping().await;
    app.update(Message::Nav(1)).unwrap();
    assert_eq!(app.nav, 1);
    assert_eq!(latest(&app), Some("Navegando a Favoritos"));
  }

  #[tokio::test(start_paused = true)]
  async fn test_activate_opens_and_closes_modal() {
    let (mut app, mut rx) = shopping().await;
    app.update(Message::Activate).unwrap();
    assert_eq!(app.modal.modal().map(|m| m.product_name.as_str()), Some("Chaqueta Denim"));

    app.update(Message::Activate).unwrap();
    assert!(app.modal.phase().is_closing());
    tokio::time::sleep(Duration::from_millis(350)).await;
    drain(&mut app, &mut rx);
    assert!(app.modal.phase().is_closed());
    assert!(app.modal.modal().is_none());
  }

  #[tokio::test(start_paused = true)]
  async fn test_modal_auto_closes() {
    let (mut app, mut rx) = shopping().await;
    app.update(Message::Activate).unwrap();
    tokio::time::sleep(Duration::from_millis(3100)).await;
    drain(&mut app, &mut rx);
    assert!(app.modal.phase().is_closing());
    tokio::time::sleep(Duration::from_millis(350)).await;
    drain(&mut app, &mut rx);
    assert!(app.modal.phase().is_closed());
  }

  #[tokio::test(start_paused = true)]
  async fn test_click_panel_keeps_modal_open() {
    let (mut app, _rx) = shopping().await;
    app.update(Message::Activate).unwrap();
    let panel = Rect { x: 10, y: 5, width: 40, height: 8 };
    app.modal_area = Some(panel);
    app.button_area = Some(Rect { x: 11, y: 11, width: 38, height: 1 });

    app.update(Message::Click(20, 7)).unwrap();
    assert!(!app.modal.phase().is_closing());

    app.update(Message::Click(2, 2)).unwrap();
    assert!(app.modal.phase().is_closing());
  }

  #[tokio::test(start_paused = true)]
  async fn test_click_button_closes_modal() {
    let (mut app, _rx) = shopping().await;
    app.update(Message::Activate).unwrap();
    app.modal_area = Some(Rect { x: 10, y: 5, width: 40, height: 8 });
    app.button_area = Some(Rect { x: 11, y: 11, width: 38, height: 1 });
    app.update(Message::Click(20, 11)).unwrap();
    assert!(app.modal.phase().is_closing());
  }

  #[tokio::test(start_paused = true)]
  async fn test_resize_is_debounced() {
    let (mut app, mut rx) = app();
    app.update(Message::Resized(60, 20)).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    app.update(Message::Resized(120, 40)).unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    drain(&mut app, &mut rx);
    assert!(!app.mobile_layout);
    assert_eq!(app.pending_size, Some((120, 40)));

    tokio::time::sleep(Duration::from_millis(100)).await;
    drain(&mut app, &mut rx);
    assert_eq!(app.pending_size, None);
    assert!(!app.mobile_layout);

    app.update(Message::Resized(70, 20)).unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    drain(&mut app, &mut rx);
    assert!(app.mobile_layout);
  }

  #[tokio::test(start_paused = true)]
  async fn test_init_starts_countdown() {
    let (mut app, mut rx) = app();
    app.init(Rect::new(0, 0, 100, 40));
    assert!(app.countdown.as_ref().is_some_and(|c| c.is_running()));
    tokio::time::sleep(Duration::from_millis(2500)).await;
    drain(&mut app, &mut rx);
    assert_eq!(app.countdown.as_ref().map(|c| c.current_display()), Some("10h 3m 58s".to_string()));
  }

  #[tokio::test(start_paused = true)]
  async fn test_init_without_countdown() {
    let (sched, _rx) = scheduler();
    let settings = Settings { countdown: None, ..Settings::default() };
    let mut app = App::new(settings, sched);
    app.init(Rect::new(0, 0, 60, 20));
    assert!(app.countdown.is_none());
    assert!(app.mobile_layout);
  }

  #[tokio::test(start_paused = true)]
  async fn test_low_time_countdown_from_settings() {
    let (sched, _rx) = scheduler();
    let settings = Settings { countdown: Clock::new(0, 2, 0), ..Settings::default() };
    let app = App::new(settings, sched);
    assert!(app.countdown.as_ref().is_some_and(|c| c.is_low_time()));
  }

  #[test]
  fn test_centered_rect() {
    let r = centered_rect(40, 8, Rect::new(0, 0, 100, 20));
    assert_eq!(r, Rect::new(30, 6, 40, 8));
    let r = centered_rect(40, 8, Rect::new(0, 0, 20, 4));
    assert_eq!(r, Rect::new(0, 0, 20, 4));
  }

  #[test]
  fn test_contains() {
    let r = Rect::new(10, 5, 4, 2);
    assert!(contains(r, 10, 5));
    assert!(contains(r, 13, 6));
    assert!(!contains(r, 14, 6));
    assert!(!contains(r, 9, 5));
  }
}
