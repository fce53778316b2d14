pub mod app;
pub mod event;
pub mod layout;

use std::io::{self, Stdout};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::api::{ApiClient, ApiError};
use crate::app::{AppContext, Result};
use crate::domain::{Comment, Post, TagSuggestion};
use crate::feed::FetchRequest;
use crate::settings::{Settings, SettingsPatch};

use self::app::{ActivePane, InputMode, TuiApp};
use self::event::{Action, AppEvent, EventHandler};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Results of background work, delivered to the event loop.
pub enum Message {
    Posts {
        request: FetchRequest,
        result: std::result::Result<Vec<Post>, ApiError>,
    },
    Suggestions {
        ticket: u64,
        tags: Vec<TagSuggestion>,
    },
    Comments {
        post_id: u64,
        comments: Vec<Comment>,
    },
}

pub async fn run(ctx: AppContext) -> Result<()> {
    init_file_logging()?;

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, ctx).await;
    restore_terminal(&mut terminal)?;
    result
}

/// Log to `<data_dir>/tagboard/tagboard.log`; stdout belongs to the UI.
fn init_file_logging() -> Result<()> {
    let path = AppContext::data_dir()?.join("tagboard.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(EnvFilter::from_default_env())
        .try_init();
    Ok(())
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(terminal: &mut Tui, mut ctx: AppContext) -> Result<()> {
    let api = &ctx.config.api;
    let mut tui_app = TuiApp::new(
        ctx.settings.current().clone(),
        api.page_limit,
        api.autocomplete_debounce(),
    );
    let event_handler = EventHandler::new(Duration::from_millis(100));
    let (tx, mut rx) = mpsc::unbounded_channel();

    start_reset(&mut tui_app, &ctx.client, &tx);

    loop {
        let colors = ctx.config.colors.adjusted_for(tui_app.settings.dark_theme);
        terminal.draw(|frame| layout::render(frame, &mut tui_app, &colors))?;

        match event_handler.next()? {
            AppEvent::Key(key) => {
                if tui_app.input_mode == InputMode::Search {
                    handle_search_key(&mut tui_app, key, &ctx.client, &tx);
                } else {
                    let action = ctx.config.keybindings.get_action(&key);
                    handle_action(&mut tui_app, action, &mut ctx, &tx)?;
                }
            }
            AppEvent::Tick => {
                if tui_app.autocomplete.due(Instant::now()) {
                    spawn_suggestions(&mut tui_app, &ctx.client, &tx);
                }
            }
        }

        drain_messages(&mut tui_app, &mut rx);

        if tui_app.input_mode == InputMode::Normal && tui_app.wants_more() {
            if let Some(request) = tui_app.feed.begin_append(&tui_app.settings) {
                spawn_fetch(&ctx.client, tui_app.settings.clone(), request, &tx);
            }
        }

        if tui_app.should_quit {
            tui_app.close_comments();
            break;
        }
    }

    Ok(())
}

fn handle_action(
    tui_app: &mut TuiApp,
    action: Action,
    ctx: &mut AppContext,
    tx: &UnboundedSender<Message>,
) -> Result<()> {
    match action {
        Action::Quit => {
            tui_app.should_quit = true;
        }
        Action::MoveUp => {
            tui_app.move_up();
        }
        Action::MoveDown => {
            tui_app.move_down();
        }
        Action::NextPage => {
            tui_app.next_page();
        }
        Action::PrevPage => {
            tui_app.prev_page();
        }
        Action::ToggleMaximize => {
            tui_app.toggle_maximize();
        }
        Action::NextPane => {
            tui_app.active_pane = tui_app.active_pane.next();
        }
        Action::PrevPane => {
            tui_app.active_pane = tui_app.active_pane.prev();
        }
        Action::Select => {
            let post_id = tui_app.selected_post().map(|p| p.id);
            if let Some(post_id) = post_id {
                if let Some(cancelled) = tui_app.open_comments(post_id) {
                    spawn_comments(&ctx.client, tui_app.settings.clone(), post_id, cancelled, tx);
                }
                tui_app.active_pane = ActivePane::Preview;
            }
        }
        Action::Search => {
            tui_app.start_search();
        }
        Action::SwitchTab => {
            let tab = tui_app.feed.state().tab.next();
            tui_app.feed.set_tab(tab);
            start_reset(tui_app, &ctx.client, tx);
        }
        Action::Refresh => {
            start_reset(tui_app, &ctx.client, tx);
        }
        Action::OpenInBrowser => {
            if let Some(post) = tui_app.selected_post() {
                let url = post.page_url(&tui_app.settings.host());
                match open::that(&url) {
                    Ok(()) => tui_app.set_status(format!("Opened {}", url)),
                    Err(e) => tui_app.set_status(format!("Failed to open browser: {}", e)),
                }
            }
        }
        Action::ToggleNsfw => {
            let nsfw = !tui_app.settings.nsfw_enabled;
            let settings = ctx.settings.update(SettingsPatch {
                nsfw_enabled: Some(nsfw),
                ..Default::default()
            })?;
            tui_app.apply_settings(settings.clone());
            start_reset(tui_app, &ctx.client, tx);
            tui_app.set_status(format!("NSFW {}", if nsfw { "on" } else { "off" }));
        }
        Action::None => {}
    }
    Ok(())
}

fn handle_search_key(
    tui_app: &mut TuiApp,
    key: KeyEvent,
    client: &ApiClient,
    tx: &UnboundedSender<Message>,
) {
    match key.code {
        KeyCode::Esc => tui_app.cancel_search(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            tui_app.cancel_search()
        }
        KeyCode::Tab | KeyCode::Down => tui_app.cycle_suggestion(),
        KeyCode::Enter => {
            if !tui_app.accept_suggestion() {
                let query = tui_app.submit_search();
                tui_app.feed.set_query(&query);
                start_reset(tui_app, client, tx);
            }
        }
        KeyCode::Backspace => {
            tui_app.search_input.pop();
            tui_app.search_edited(Instant::now());
        }
        KeyCode::Char(c) => {
            tui_app.search_input.push(c);
            tui_app.search_edited(Instant::now());
        }
        _ => {}
    }
}

/// Reset the feed and fetch page 1 in the background.
fn start_reset(tui_app: &mut TuiApp, client: &ApiClient, tx: &UnboundedSender<Message>) {
    tui_app.clear_status();
    tui_app.reset_selection();
    match tui_app.feed.begin_reset(&tui_app.settings) {
        Ok(request) => spawn_fetch(client, tui_app.settings.clone(), request, tx),
        Err(e) => tracing::info!("Not fetching: {}", e),
    }
}

fn spawn_fetch(
    client: &ApiClient,
    settings: Settings,
    request: FetchRequest,
    tx: &UnboundedSender<Message>,
) {
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = client
            .get_posts(&settings, &request.tags, request.page, request.limit)
            .await;
        let _ = tx.send(Message::Posts { request, result });
    });
}

fn spawn_suggestions(tui_app: &mut TuiApp, client: &ApiClient, tx: &UnboundedSender<Message>) {
    let Some((ticket, token)) = tui_app.autocomplete.issue() else {
        return;
    };
    let client = client.clone();
    let settings = tui_app.settings.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let tags = client.search_tags(&settings, &token).await;
        let _ = tx.send(Message::Suggestions { ticket, tags });
    });
}

fn spawn_comments(
    client: &ApiClient,
    settings: Settings,
    post_id: u64,
    cancelled: std::sync::Arc<std::sync::atomic::AtomicBool>,
    tx: &UnboundedSender<Message>,
) {
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        if let Some(comments) = client
            .load_comments_with_authors(&settings, post_id, &cancelled)
            .await
        {
            let _ = tx.send(Message::Comments { post_id, comments });
        }
    });
}

fn drain_messages(tui_app: &mut TuiApp, rx: &mut UnboundedReceiver<Message>) {
    while let Ok(message) = rx.try_recv() {
        apply_message(tui_app, message);
    }
}

fn apply_message(tui_app: &mut TuiApp, message: Message) {
    match message {
        Message::Posts { request, result } => {
            let added = tui_app.feed.complete(&request, result);
            tracing::debug!("Page {} added {} posts", request.page, added);
            tui_app.clamp_selection();
        }
        Message::Suggestions { ticket, tags } => {
            if tui_app.autocomplete.accept(ticket, tags) {
                tui_app.suggestion_index = None;
            }
        }
        Message::Comments { post_id, comments } => {
            tui_app.comments_loaded(post_id, comments);
        }
    }
}
