//! datafx-wizard - run the sample wizard flow in the terminal
//!
//! This is the binary entry point. All logic lives in the library.

use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use datafx::core::prelude::*;
use datafx::featuretoggle::FeatureHandler;
use datafx::flow::{
    load_view_configuration, AnimatedContainer, FsResourceLoader, TabContainer, TransitionKind,
    DEFAULT_TRANSITION_DURATION,
};
use datafx::wizard::{self, HELP_FEATURE};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Transition {
    Fade,
    ZoomIn,
    ZoomOut,
    SwipeLeft,
    SwipeRight,
    SwipeUp,
    SwipeDown,
}

impl From<Transition> for TransitionKind {
    fn from(transition: Transition) -> Self {
        match transition {
            Transition::Fade => TransitionKind::Fade,
            Transition::ZoomIn => TransitionKind::ZoomIn,
            Transition::ZoomOut => TransitionKind::ZoomOut,
            Transition::SwipeLeft => TransitionKind::SwipeLeft,
            Transition::SwipeRight => TransitionKind::SwipeRight,
            Transition::SwipeUp => TransitionKind::SwipeUp,
            Transition::SwipeDown => TransitionKind::SwipeDown,
        }
    }
}

/// Run the DataFX sample wizard in the terminal
#[derive(Parser, Debug)]
#[command(name = "datafx-wizard")]
#[command(about = "Run the DataFX sample wizard in the terminal", long_about = None)]
struct Args {
    /// Directory with datafx.toml and layout resources (defaults to the embedded ones)
    #[arg(long, value_name = "DIR")]
    project: Option<PathBuf>,

    /// Feature file with a [features] table
    #[arg(long, value_name = "FILE")]
    features: Option<PathBuf>,

    /// Transition played between steps
    #[arg(long, value_enum, default_value = "fade")]
    transition: Transition,

    /// Transition duration in milliseconds
    #[arg(long, default_value_t = DEFAULT_TRANSITION_DURATION.as_millis() as u64)]
    duration_ms: u64,

    /// Hide the help buttons
    #[arg(long)]
    no_help: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize error handling
    datafx::install_error_reporting()?;

    if let Err(e) = datafx::core::logging::init() {
        eprintln!("Logging disabled: {e}");
    }

    let features = match &args.features {
        Some(path) => FeatureHandler::load(path)?,
        None => FeatureHandler::new(),
    };
    if args.no_help {
        features.disable(HELP_FEATURE);
    }

    let mut flow = wizard::wizard_flow(Rc::new(features), Duration::from_millis(600));
    flow = match &args.project {
        Some(dir) => {
            let configuration = load_view_configuration(dir)?;
            let resources = FsResourceLoader::new(dir.join(&configuration.resource_dir));
            flow.with_configuration(configuration).with_resources(resources)
        }
        None => flow
            .with_configuration(wizard::embedded_configuration()?)
            .with_resources(wizard::embedded_resources()),
    };

    let container = TabContainer::new(AnimatedContainer::new(
        Duration::from_millis(args.duration_ms),
        args.transition.into(),
    ));
    let (handler, root) = flow.start(container)?;
    info!("Wizard started");

    // The terminal loop blocks; background tasks keep running on the runtime
    tokio::task::block_in_place(|| datafx::tui::run(handler, root, "DataFX Wizard"))
}
