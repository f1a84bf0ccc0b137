//! tabular-view - browse a CSV, JSON or YAML file as an interactive table
//!
//! Rows can be sorted, filtered by column value, selected and expanded.

use anyhow::{anyhow, Result};
use clap::Parser;
use crossterm::event::Event;
use simplelog::{Config as LogConfig, LevelFilter, WriteLogger};
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;
use tabular_view::action::Action;
use tabular_view::app::App;
use tabular_view::component::Component;
use tabular_view::config::{Config, ViewOverrides};
use tabular_view::tui::Tui;

#[derive(Parser)]
#[command(name = "tabular-view")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Browse tabular data in the terminal", long_about = None)]
struct Cli {
    /// CSV, JSON or YAML file with one record per row. Defaults to the
    /// file opened last.
    data: Option<PathBuf>,

    /// YAML file with column descriptors
    #[arg(short, long)]
    columns: Option<PathBuf>,

    /// Stripe alternate rows
    #[arg(long)]
    stripe: bool,

    /// Highlight the row last activated with Enter
    #[arg(long)]
    highlight_current_row: bool,

    /// Expand every row on load
    #[arg(long)]
    expand_all: bool,

    /// Write logs to this file instead of the config directory
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> ViewOverrides {
        ViewOverrides {
            stripe: self.stripe,
            highlight_current_row: self.highlight_current_row,
            expand_all: self.expand_all,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let mut config = Config::load();
    let options = cli.overrides().apply(&config.view);

    let (data, columns) = match cli.data {
        Some(data) => (data, cli.columns),
        None => {
            let data = config
                .last_data_file
                .clone()
                .ok_or_else(|| anyhow!("No data file given and none opened before"))?;
            let columns = cli
                .columns
                .or_else(|| config.last_columns_file.clone().map(PathBuf::from));
            (PathBuf::from(data), columns)
        }
    };

    let mut app = App::new(options);
    app.open(data.clone(), columns.clone())?;

    config.remember_files(&data, columns.as_deref());
    if let Err(e) = config.save() {
        log::warn!("Could not save config: {:#}", e);
    }

    let mut tui = Tui::new()?.with_tick_rate(Duration::from_millis(250));
    tui.enter()?;

    let result = run_app(&mut tui, &mut app);

    tui.exit()?;

    if let Err(err) = result {
        log::error!("{:#}", err);
        eprintln!("Error: {:?}", err);
        std::process::exit(1);
    }

    Ok(())
}

/// Log to a file so the terminal stays clean
fn init_logging(cli: &Cli) {
    let path = cli
        .log_file
        .clone()
        .or_else(|| Config::config_dir().map(|dir| dir.join("tabular-view.log")));
    let Some(path) = path else {
        return;
    };
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    match File::create(&path) {
        Ok(file) => {
            let _ = WriteLogger::init(level, LogConfig::default(), file);
        }
        Err(e) => eprintln!("Logging disabled, cannot open {}: {}", path.display(), e),
    }
}

/// Run the main application loop
fn run_app(tui: &mut Tui, app: &mut App) -> Result<()> {
    while !app.should_quit {
        tui.draw(|frame| {
            if let Err(e) = app.draw(frame, frame.area()) {
                log::error!("Draw error: {:#}", e);
            }
        })?;

        let action = match tui.next_event()? {
            Some(Event::Key(key)) => app.handle_key_event(key)?,
            Some(Event::Resize(w, h)) => Some(Action::Resize(w, h)),
            Some(_) => None,
            None => Some(Action::Tick),
        };

        // An action may produce a follow-up action
        let mut current = action;
        while let Some(action) = current {
            current = app.update(action)?;
        }
    }

    Ok(())
}
