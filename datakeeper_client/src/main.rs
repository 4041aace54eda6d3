mod app;
mod grpc;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
  EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

const SERVER_ADDRESS_ENV: &str = "SERVER_ADDRESS";

/// `-a`/`--addr` is the fallback; `SERVER_ADDRESS` unconditionally overrides
/// it when set, mirroring the teacher client's `parseEnv()` precedence.
#[derive(Parser, Debug)]
struct ClientArgs {
  #[arg(short, long, default_value = ":14444")]
  addr: String,
}

fn server_address(args: ClientArgs) -> String {
  std::env::var(SERVER_ADDRESS_ENV).unwrap_or(args.addr)
}

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .init();

  let args = ClientArgs::parse();
  let addr = server_address(args);

  let grpc = grpc::GrpcClient::connect(&addr).await?;
  let mut app = app::App::new(grpc);

  enable_raw_mode()?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen)?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend)?;

  let result = run_event_loop(&mut terminal, &mut app).await;

  disable_raw_mode()?;
  execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
  terminal.show_cursor()?;

  result
}

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut app::App,
) -> Result<()> {
  loop {
    app.poll_snapshot();
    terminal.draw(|frame| ui::render(frame, app))?;

    if event::poll(Duration::from_millis(100))? {
      if let Event::Key(key) = event::read()? {
        if key.kind == crossterm::event::KeyEventKind::Press {
          app.handle_key(key.code).await;
        }
      }
    }

    if app.should_quit {
      return Ok(());
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn env_override_wins_over_flag() {
    // SAFETY: single-threaded test, no concurrent env access.
    unsafe {
      std::env::set_var(SERVER_ADDRESS_ENV, "example.com:9000");
    }
    let addr = server_address(ClientArgs {
      addr: ":14444".to_string(),
    });
    unsafe {
      std::env::remove_var(SERVER_ADDRESS_ENV);
    }
    assert_eq!(addr, "example.com:9000");
  }

  #[test]
  fn flag_used_when_env_absent() {
    // SAFETY: single-threaded test, no concurrent env access.
    unsafe {
      std::env::remove_var(SERVER_ADDRESS_ENV);
    }
    let addr = server_address(ClientArgs {
      addr: ":14444".to_string(),
    });
    assert_eq!(addr, ":14444");
  }
}
