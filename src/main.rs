/////////////////////
/// TIENDA - terminal storefront demo
///
/// Landing page, category filters, favorites and a product modal, with a
/// promo countdown ticking in the banner.
/// - 'enter'/'space' starts shopping, then opens the focused product
/// - arrows (or hjkl) move between categories and products
/// - 'f' toggles the favorite on the focused product
/// - '1'-'4' bottom navigation
/// - 'esc' or a click outside closes the modal
/// - 'q' quits
///
pub const APP_VERSION: &str = "TIENDA V0.1.0";
const LOG_FILE_NAME: &str = "tienda.log";

use std::fs::File;
#[macro_use] extern crate log;
extern crate simplelog;
use simplelog::*;
#[macro_use]
extern crate ini;

use color_eyre::eyre::Result;
use build_time::build_time_local;

mod app;
mod clock;
mod config;
mod countdown;
mod modal;
mod notice;
mod storefront;
mod timer;
mod tui;

use app::App;
use config::Settings;
use timer::Scheduler;
use tui::Tui;

fn init_logging() {
  let mut loggers: Vec<Box<dyn SharedLogger>> = vec![
    TermLogger::new(LevelFilter::Warn, Config::default(), TerminalMode::Mixed, ColorChoice::Auto),
  ];
  match File::create(LOG_FILE_NAME) {
    Ok(log_file) => loggers.push(WriteLogger::new(LevelFilter::Info, Config::default(), log_file)),
    Err(e) => {
      eprintln!("Warning: Could not create log file: {}", e);
      eprintln!("Continuing with terminal logging only.");
    }
  }
  CombinedLogger::init(loggers).unwrap_or_else(|e| {
    eprintln!("Warning: Could not initialize logger: {}", e);
  });
  info!("Logging for {} initialized", APP_VERSION);
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;
  init_logging();

  let settings = Settings::load();

  let mut tui = Tui::new()?;
  let mut app = App::new(settings, Scheduler::new(tui.event_tx.clone()));
  app.run(&mut tui).await?;
  drop(tui);
  println!("Gracias por visitar {} (built: {})\n", APP_VERSION, build_time_local!("%Y-%b-%d at %H:%M:%S"));
  Ok(())
}
