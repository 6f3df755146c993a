use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};

use greenwatch::app::{App, View};
use greenwatch::events;
use greenwatch::source::{FileSource, StreamSource, TelemetrySource};
use greenwatch::store::{
    ControlSink, DirBlobStore, EnvIdentity, FileControlSink, IdentityProvider, JsonRecordStore,
    NoopControlSink, StaticIdentity,
};
use greenwatch::ui;

#[derive(Parser, Debug)]
#[command(name = "greenwatch")]
#[command(about = "Terminal dashboard for greenhouse telemetry with harvest logging")]
struct Args {
    /// Path to telemetry.json file
    #[cfg_attr(
        feature = "subscribe",
        arg(short, long, default_value = "telemetry.json", conflicts_with_all = ["connect", "subscribe"])
    )]
    #[cfg_attr(
        not(feature = "subscribe"),
        arg(short, long, default_value = "telemetry.json", conflicts_with_all = ["connect"])
    )]
    file: PathBuf,

    /// Connect to a TCP endpoint for live snapshots (host:port)
    #[cfg_attr(
        feature = "subscribe",
        arg(short, long, conflicts_with_all = ["file", "subscribe"])
    )]
    #[cfg_attr(
        not(feature = "subscribe"),
        arg(short, long, conflicts_with_all = ["file"])
    )]
    connect: Option<String>,

    /// Subscribe to telemetry via MQTT.
    /// Requires a config file path (for broker connection settings).
    /// Use with --topic to specify the subscription topic.
    #[cfg(feature = "subscribe")]
    #[arg(short, long, conflicts_with_all = ["file", "connect"])]
    subscribe: Option<PathBuf>,

    /// Topic to subscribe to (used with --subscribe)
    #[cfg(feature = "subscribe")]
    #[arg(long, default_value = "greenhouse/telemetry", requires = "subscribe")]
    topic: String,

    /// Refresh interval in seconds (only used with --file)
    #[arg(short, long, default_value = "1")]
    refresh: u64,

    /// Path to the harvest record log
    #[arg(long, default_value = "harvest.json")]
    records: PathBuf,

    /// Directory for harvest photos
    #[arg(long, default_value = "photos")]
    photos: PathBuf,

    /// Path the actuator mode toggle is written to
    #[arg(long)]
    control: Option<PathBuf>,

    /// Identity to log harvests under (default: GREENWATCH_USER or anonymous)
    #[arg(short, long)]
    user: Option<String>,

    /// Export current state to JSON file and exit
    #[cfg_attr(
        feature = "subscribe",
        arg(short, long, conflicts_with_all = ["connect", "subscribe"])
    )]
    #[cfg_attr(
        not(feature = "subscribe"),
        arg(short, long, conflicts_with_all = ["connect"])
    )]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Handle export mode (non-interactive)
    if let Some(ref export_path) = args.export {
        let export_path = export_path.clone();
        return export_to_file(&args, &export_path);
    }

    // Handle TCP connection mode
    if let Some(ref addr) = args.connect {
        let addr = addr.clone();
        return run_with_tcp(&addr, &args);
    }

    // Handle subscribe mode (MQTT)
    #[cfg(feature = "subscribe")]
    if let Some(config_path) = args.subscribe.clone() {
        return run_with_subscribe(&config_path, &args);
    }

    // Default: file-based mode
    run_with_file(&args)
}

/// Build the app around a telemetry source, wiring the collaborators
/// from the CLI arguments.
fn build_app(source: Box<dyn TelemetrySource>, args: &Args) -> Result<App> {
    let records = JsonRecordStore::open(&args.records)?;

    let identity: Box<dyn IdentityProvider> = match &args.user {
        Some(user) => Box::new(StaticIdentity::new(user.clone())),
        None => Box::new(EnvIdentity::resolve()),
    };

    let photos = DirBlobStore::new(&args.photos);

    let control: Box<dyn ControlSink> = match &args.control {
        Some(path) => Box::new(FileControlSink::new(path)),
        None => Box::new(NoopControlSink),
    };

    Ok(App::new(
        source,
        Box::new(records),
        identity,
        Box::new(photos),
        control,
    ))
}

/// Run with a file-based telemetry source
fn run_with_file(args: &Args) -> Result<()> {
    let source = Box::new(FileSource::new(&args.file));
    run_tui(source, args, Duration::from_secs(args.refresh))
}

/// Run with an MQTT subscription
#[cfg(feature = "subscribe")]
fn run_with_subscribe(config_path: &std::path::Path, args: &Args) -> Result<()> {
    use greenwatch::subscribe::create_subscriber;

    // Logging goes to stderr so the TUI keeps stdout; silent unless RUST_LOG is set
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Build a tokio runtime
    let rt = tokio::runtime::Runtime::new()?;

    // Create the subscriber and get the channel source
    let (source, handle) = rt.block_on(create_subscriber(config_path, &args.topic))?;

    // Run the TUI in the main thread while the async runtime runs in the background
    let result = run_tui(Box::new(source), args, Duration::from_millis(100));

    // Signal shutdown
    handle.abort();

    result
}

/// Run with a TCP stream telemetry source
fn run_with_tcp(addr: &str, args: &Args) -> Result<()> {
    // Build a tokio runtime for the TCP connection
    let rt = tokio::runtime::Runtime::new()?;

    let source = rt.block_on(async {
        use tokio::net::TcpStream;

        println!("Connecting to {}...", addr);
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                println!("Connected!");
                Ok(Box::new(StreamSource::spawn(stream, addr)) as Box<dyn TelemetrySource>)
            }
            Err(e) => Err(anyhow::anyhow!("Failed to connect to {}: {}", addr, e)),
        }
    })?;

    // For TCP, we poll continuously (no refresh interval needed)
    run_tui(source, args, Duration::from_millis(100))
}

/// Run the TUI with the given telemetry source
fn run_tui(
    source: Box<dyn TelemetrySource>,
    args: &Args,
    refresh_interval: Duration,
) -> Result<()> {
    // Create app and load initial data before touching the terminal
    let mut app = build_app(source, args)?;
    let _ = app.reload_data();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    // Run the main loop
    let result = run_app(&mut terminal, &mut app, refresh_interval);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    refresh_interval: Duration,
) -> Result<()> {
    let mut last_refresh = Instant::now();

    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 12;

    while app.running {
        // Draw UI
        terminal.draw(|frame| {
            let area = frame.area();

            // Check for minimum terminal size
            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered = ratatui::layout::Rect::new(0, area.height / 2 - 2, area.width, 5);
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(8),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            // Render header with greenhouse health
            ui::common::render_header(frame, app, chunks[0]);

            // Render tabs
            ui::common::render_tabs(frame, app, chunks[1]);

            // Render current view
            match app.current_view {
                View::Dashboard => ui::dashboard::render(frame, app, chunks[2]),
                View::Care => ui::care::render(frame, app, chunks[2]),
                View::Harvest => ui::harvest::render(frame, app, chunks[2]),
            }

            // Render status bar
            ui::common::render_status_bar(frame, app, chunks[3]);

            // Render detail overlay if active
            if app.show_detail_overlay {
                ui::detail::render_overlay(frame, app, area);
            }

            // Render help overlay if active
            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }

        // Auto-refresh data periodically
        if last_refresh.elapsed() >= refresh_interval {
            let _ = app.reload_data();
            last_refresh = Instant::now();
        }
    }

    Ok(())
}

/// Export current telemetry state to a JSON file
fn export_to_file(args: &Args, export_path: &std::path::Path) -> Result<()> {
    let source = Box::new(FileSource::new(&args.file));
    let mut app = build_app(source, args)?;

    if !app.reload_data()? {
        if let Some(err) = app.load_error.clone() {
            anyhow::bail!("Failed to read telemetry: {}", err);
        }
        anyhow::bail!("No telemetry data available");
    }

    app.export_state(export_path)?;
    println!("Exported greenhouse state to: {}", export_path.display());
    Ok(())
}
