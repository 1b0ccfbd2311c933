use decompiler_menu::clipboard::{MemoryClipboard, default_clipboard};
use decompiler_menu::config::{SystemConfig, parse_level};
use decompiler_menu::context_menu::items::outline;
use decompiler_menu::events;
use decompiler_menu::state::AppState;
use decompiler_menu::theme::Theme;
use decompiler_menu::ui::view_decompiler;
use decompiler_menu::ui_state::UIState;
use decompiler_menu::utils::parse_address;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::path::PathBuf;

/// Decompiler pane with a context-sensitive action menu
#[derive(Parser)]
#[command(name = "decompiler-menu")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Session snapshot (JSON) to open; the bundled sample is used otherwise
    #[arg(value_name = "SESSION")]
    session: Option<PathBuf>,

    /// Color theme ("Solarized Dark" or "Solarized Light")
    #[arg(long, value_name = "NAME")]
    theme: Option<String>,

    /// Write the log to this file instead of the default location
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Print the context menu for a cursor position and exit
    #[arg(long)]
    headless: bool,

    /// Function name or address to place the cursor in
    #[arg(long, value_name = "FUNCTION")]
    function: Option<String>,

    /// Cursor line inside the function (0-based)
    #[arg(long, default_value_t = 0)]
    line: usize,

    /// Cursor column inside the line (0-based)
    #[arg(long, default_value_t = 0)]
    column: usize,
}

fn init_logging(cli: &Cli, config: &SystemConfig) -> Result<()> {
    let level = match &cli.log_level {
        Some(name) => parse_level(name).ok_or_else(|| anyhow!("unknown log level '{}'", name))?,
        None => config.level_filter(),
    };
    let Some(path) = cli.log_file.clone().or_else(SystemConfig::default_log_path) else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(&path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    simplelog::WriteLogger::init(level, simplelog::Config::default(), file)?;
    Ok(())
}

/// Places the cursor from `--function/--line/--column`.
fn place_cursor(cli: &Cli, app_state: &AppState, ui_state: &mut UIState) -> Result<()> {
    let functions = app_state.core.functions();
    let function = match &cli.function {
        Some(wanted) => functions
            .iter()
            .find(|f| f.name == *wanted || parse_address(wanted) == Some(f.offset))
            .ok_or_else(|| anyhow!("no function '{}'", wanted))?,
        None => functions
            .first()
            .ok_or_else(|| anyhow!("session has no functions"))?,
    };
    view_decompiler::select_function(app_state, ui_state, function.offset);
    ui_state.decompiler.cursor_line = cli.line;
    ui_state.decompiler.cursor_col = cli.column;
    view_decompiler::sync_context_menu(app_state, ui_state);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut system_config = SystemConfig::load();
    if let Some(theme) = &cli.theme {
        system_config.theme = theme.clone();
    }

    if let Err(e) = init_logging(&cli, &system_config) {
        eprintln!("Warning: logging disabled: {:#}", e);
    }
    log::info!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let (core, session_path) =
        AppState::resolve_initial_load(&system_config, cli.session.as_deref())?;
    let theme = Theme::from_name(&system_config.theme);

    if cli.headless {
        let mut app_state =
            AppState::new(Box::new(core), Box::new(MemoryClipboard::default()), system_config);
        app_state.session_path = session_path;
        let mut ui_state = UIState::new(theme);
        place_cursor(&cli, &app_state, &mut ui_state)?;

        let UIState {
            context_menu,
            window,
            ..
        } = &mut ui_state;
        context_menu.about_to_show(app_state.core.as_ref(), &*window);
        for line in outline(&context_menu.items) {
            println!("{}", line);
        }
        return Ok(());
    }

    let mut app_state = AppState::new(Box::new(core), default_clipboard(), system_config);
    app_state.remember_session(session_path);
    let mut ui_state = UIState::new(theme);
    if let Err(e) = place_cursor(&cli, &app_state, &mut ui_state) {
        ui_state.set_status_message(format!("{:#}", e));
    } else {
        ui_state.set_status_message(format!("Loaded {}", app_state.session_name()));
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();

    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    // Might fail on legacy Windows consoles
    let keyboard_enhancement_result = execute!(
        stdout,
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
    );

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    if let Err(ref e) = keyboard_enhancement_result {
        log::warn!("keyboard enhancement failed: {}", e);
        ui_state.set_status_message(format!("Warning: Keyboard enhancement failed: {}", e));
    }

    let res = events::run_app(&mut terminal, app_state, ui_state);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
    )?;

    // Try to pop enhancement flags, ignore error
    let _ = execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags);

    terminal.show_cursor()?;

    if let Err(err) = res {
        log::error!("{:#}", err);
        println!("{:?}", err);
    }

    Ok(())
}
