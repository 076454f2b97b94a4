use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::*;

mod app;
mod config;
mod events;
mod link;
mod message_store;
mod questionnaire;
mod roadmap;
mod theme;
mod transport;
mod ui;

use app::{App, ComposeAction, Stage};
use config::AppConfig;
use events::AppEvent;
use questionnaire::SubmitStep;
use theme::Theme;
use transport::{ApiAdapter, ApiClient, TransportError, TransportEvent};

const MAX_ADAPTER_EVENTS_PER_LOOP: usize = 128;

#[derive(Debug, Parser)]
#[command(
    name = "visiontrack",
    about = "Terminal client for the Vision Track AI career counselor"
)]
struct LaunchOptions {
    /// Path to the client configuration file.
    #[arg(long, default_value = "visiontrack.toml")]
    config: PathBuf,
    /// Override the backend base URL from the config file.
    #[arg(long)]
    base_url: Option<String>,
    /// Path to the color theme file.
    #[arg(long, default_value = "theme.toml")]
    theme: PathBuf,
    /// Append structured logs to this file (stdout belongs to the UI).
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(log_file: Option<&Path>) -> io::Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> io::Result<()> {
    let options = LaunchOptions::parse();
    init_logging(options.log_file.as_deref())?;

    let mut config = AppConfig::load_or_default(&options.config);
    if let Some(base_url) = options.base_url {
        config.api.base_url = base_url;
    }
    let theme = Theme::load_or_default(&options.theme);
    let client =
        ApiClient::new(&config.api.base_url, config.request_timeout()).map_err(io::Error::other)?;
    let adapter = ApiAdapter::new(client);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    let result = run_app(&mut terminal, App::default(), &theme, &config, &adapter);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    theme: &Theme,
    config: &AppConfig,
    adapter: &ApiAdapter,
) -> io::Result<()> {
    while app.running {
        let mut chat_updated = false;

        for event in adapter.drain_events_limited(MAX_ADAPTER_EVENTS_PER_LOOP) {
            match event {
                TransportEvent::IntakeFinished(result) => match result {
                    Ok(success) => {
                        app.complete_intake(
                            success.session_id,
                            config.loading_delay(),
                            Instant::now(),
                        );
                    }
                    Err(TransportError::Validation(errors)) => {
                        app.intake_mut().apply_server_errors(&errors);
                    }
                    Err(_) => app.intake_mut().apply_transport_error(),
                },
                TransportEvent::HistoryLoaded { generation, result } => {
                    app.apply_history_result(generation, result);
                    chat_updated = true;
                }
                TransportEvent::ReplyReceived { generation, result } => {
                    app.apply_send_result(generation, result);
                    chat_updated = true;
                }
                TransportEvent::UploadFinished {
                    file_name,
                    generation,
                    result,
                } => {
                    app.apply_upload_result(&file_name, generation, result);
                    chat_updated = true;
                }
                TransportEvent::RoadmapLoaded(result) => {
                    app.apply_roadmap_result(result);
                }
            }
        }

        if let Some(request) = app.advance_loading_if_elapsed(Instant::now()) {
            adapter.fetch_history(request.session_id, request.generation);
            chat_updated = true;
        }

        if chat_updated {
            let size = terminal.size()?;
            let screen = Rect::new(0, 0, size.width, size.height);
            app.set_chat_scroll(ui::chat_max_scroll(screen, &app, theme));
        }

        terminal.draw(|frame| ui::render(frame, &app, theme))?;

        let screen = {
            let size = terminal.size()?;
            Rect::new(0, 0, size.width, size.height)
        };
        match events::next_event()? {
            AppEvent::Tick => app.on_tick(),
            AppEvent::Quit => app.quit(),
            event => match app.stage() {
                Stage::Questionnaire => handle_questionnaire_event(&mut app, adapter, event),
                Stage::Loading => {}
                Stage::Chat => handle_chat_event(&mut app, adapter, theme, screen, event),
                Stage::Roadmap => handle_roadmap_event(&mut app, theme, screen, event),
            },
        }
    }
    Ok(())
}

fn handle_questionnaire_event(app: &mut App, adapter: &ApiAdapter, event: AppEvent) {
    let form = app.intake_mut();
    match event {
        AppEvent::InputChar(c) => form.input_char(c),
        AppEvent::Backspace => form.backspace(),
        AppEvent::MoveUp => form.move_up(),
        AppEvent::MoveDown => form.move_down(),
        AppEvent::Back => form.back(),
        AppEvent::Submit => {
            if let SubmitStep::Submit(payload) = form.next() {
                adapter.submit_intake(payload);
            }
        }
        _ => {}
    }
}

fn handle_chat_event(
    app: &mut App,
    adapter: &ApiAdapter,
    theme: &Theme,
    screen: Rect,
    event: AppEvent,
) {
    match event {
        AppEvent::InputChar(c) => app.input_char(c),
        AppEvent::Backspace => app.backspace_input(),
        AppEvent::CursorLeft => app.move_cursor_left(),
        AppEvent::CursorRight => app.move_cursor_right(),
        AppEvent::ScrollUp | AppEvent::MoveUp => app.scroll_chat_up(),
        AppEvent::ScrollDown | AppEvent::MoveDown => {
            let max_scroll = ui::chat_max_scroll(screen, app, theme);
            app.scroll_chat_down(max_scroll);
        }
        AppEvent::Submit => {
            let trimmed = app.compose().trim();
            if let Some(path) = trimmed.strip_prefix("/attach ") {
                app.select_attachment(PathBuf::from(path.trim()));
                return;
            }
            match app.submit_compose() {
                Some(ComposeAction::Text(text)) => {
                    if let Some(session_id) = app.session_id() {
                        adapter.send_message(text, session_id.to_string(), app.turn_generation());
                    }
                    stick_chat_to_bottom(app, theme, screen);
                }
                Some(ComposeAction::Attachment(attachment)) => {
                    if let Some(session_id) = app.session_id() {
                        adapter.upload_file(
                            attachment.path,
                            attachment.name,
                            session_id.to_string(),
                            app.turn_generation(),
                        );
                    }
                }
                // An empty submit on a log carrying the roadmap affordance
                // activates it.
                None => {
                    if app.compose().trim().is_empty()
                        && app.has_roadmap_link()
                        && let Some(session_id) = app.open_roadmap()
                    {
                        adapter.fetch_roadmap(session_id);
                    }
                }
            }
        }
        _ => {}
    }
}

fn handle_roadmap_event(app: &mut App, theme: &Theme, screen: Rect, event: AppEvent) {
    match event {
        AppEvent::InputChar('n') => app.start_new_session(),
        AppEvent::ScrollUp | AppEvent::MoveUp => app.scroll_roadmap_up(),
        AppEvent::ScrollDown | AppEvent::MoveDown => {
            let max_scroll = ui::roadmap_max_scroll(screen, app, theme);
            app.scroll_roadmap_down(max_scroll);
        }
        _ => {}
    }
}

fn stick_chat_to_bottom(app: &mut App, theme: &Theme, screen: Rect) {
    app.set_chat_scroll(ui::chat_max_scroll(screen, app, theme));
}
