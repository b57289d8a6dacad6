use std::fs::{OpenOptions, create_dir_all};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use lumen_tui::{BubbleStyle, DefinedWalkthrough, DemoApp, DemoOptions, PresentationMode, WalkthroughSettings};
use lumen_util::{CompletionStore, JsonCompletionStore, WallClock, config_file_path};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the log file location.
const LOG_PATH_ENV: &str = "LUMEN_LOG_PATH";

#[derive(Debug, Parser)]
#[command(name = "lumen", version, about = "Onboarding walkthroughs for terminal apps")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the built-in walkthrough on the showcase screen
    Demo(DemoArgs),
    /// Run a walkthrough definition file on the showcase screen
    Play {
        file: PathBuf,
        /// Run even if the walkthrough was completed before
        #[arg(long)]
        force: bool,
    },
    /// Validate a walkthrough definition file
    Check { file: PathBuf },
    /// Forget which walkthroughs were completed
    Reset,
}

#[derive(Debug, Default, clap::Args)]
struct DemoArgs {
    #[arg(long, value_enum, default_value_t = StyleArg::Default)]
    style: StyleArg,
    #[arg(long, value_enum, default_value_t = ModeArg::DimAndHighlight)]
    mode: ModeArg,
    /// Advance automatically after this many seconds
    #[arg(long, value_name = "SECS")]
    delay: Option<f64>,
    /// Run even if the walkthrough was completed before
    #[arg(long)]
    force: bool,
    /// Also play the floating bubble showcase
    #[arg(long)]
    bubbles: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StyleArg {
    #[default]
    Default,
    White,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    #[default]
    DimAndHighlight,
    Dim,
    None,
}

impl DemoArgs {
    fn options(&self) -> Result<DemoOptions> {
        let delay = match self.delay {
            Some(seconds) => Some(Duration::try_from_secs_f64(seconds).with_context(|| format!("invalid delay: {seconds}"))?),
            None => None,
        };
        let mode = match self.mode {
            ModeArg::DimAndHighlight => PresentationMode::dim_and_highlight(),
            ModeArg::Dim => PresentationMode::dim(),
            ModeArg::None => PresentationMode::None,
        };
        let style = match self.style {
            StyleArg::Default => BubbleStyle::default(),
            StyleArg::White => BubbleStyle::white(),
        };
        Ok(DemoOptions {
            settings: WalkthroughSettings::default()
                .with_automatic_delay(delay)
                .with_presentation_mode(mode),
            style,
            force: self.force,
            bubbles: self.bubbles,
        })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command.unwrap_or(Command::Demo(DemoArgs::default())) {
        Command::Demo(args) => {
            let options = args.options()?;
            let app = DemoApp::new(Rc::new(WallClock), open_store()?, options);
            lumen_tui::run(app).await
        }
        Command::Play { file, force } => {
            let walkthrough = load_definition(&file)?;
            let options = DemoOptions {
                settings: walkthrough.settings().clone(),
                style: walkthrough.style().clone(),
                force,
                bubbles: false,
            };
            info!(id = walkthrough.id(), path = %file.display(), "playing walkthrough definition");
            let app = DemoApp::with_tour(Rc::new(walkthrough), Rc::new(WallClock), open_store()?, options);
            lumen_tui::run(app).await
        }
        Command::Check { file } => {
            let walkthrough = load_definition(&file)?;
            println!("{}", describe(&walkthrough));
            Ok(())
        }
        Command::Reset => {
            let store = open_store()?;
            let cleared = store.forget_all().context("could not reset completion flags")?;
            println!("Cleared {cleared} walkthrough completion flag(s).");
            Ok(())
        }
    }
}

fn open_store() -> Result<Arc<dyn CompletionStore>> {
    let store = JsonCompletionStore::with_defaults().context("could not open the walkthrough completion store")?;
    Ok(Arc::new(store))
}

fn load_definition(path: &Path) -> Result<DefinedWalkthrough> {
    DefinedWalkthrough::from_path(path).with_context(|| format!("invalid walkthrough definition {}", path.display()))
}

fn describe(walkthrough: &DefinedWalkthrough) -> String {
    let mut out = format!("{}: {} step(s)", walkthrough.id(), walkthrough.step_count());
    if let Some(title) = walkthrough.title() {
        out.push_str(&format!(" ({title})"));
    }
    let views = walkthrough.anchor_views();
    if !views.is_empty() {
        out.push_str(&format!("\nanchors: {}", views.join(", ")));
    }
    out
}

fn log_path() -> PathBuf {
    config_file_path(LOG_PATH_ENV, "lumen.log")
}

/// Log to a file so output does not disturb the alternate screen. Logging is
/// disabled when the file cannot be opened.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let path = log_path();
    if let Some(parent) = path.parent() {
        let _ = create_dir_all(parent);
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
}
