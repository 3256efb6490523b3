//! Live Layout CLI
//!
//! Usage:
//!   live-layout [OPTIONS] [FILE]
//!
//! Options:
//!   -f, --format <FORMAT>    Document dialect (json, xml); sniffed when omitted
//!       --width <W>          Root width [default: 320]
//!       --height <H>         Root height [default: 480]
//!   -i, --inject <KEY=VAL>   Substitute #{KEY} before parsing (repeatable)
//!   -c, --config <FILE>      Engine configuration (TOML)
//!   -w, --watch              Rebuild whenever FILE changes
//!   -h, --help               Print help

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime};

use clap::{Parser, ValueEnum};

use live_layout::{
    render_with_config, DocumentFormat, EngineConfig, LayoutError, LayoutUpdate, RenderConfig,
    RenderError, Rendered, UpdateBus, UpdateChannel,
};

const WATCH_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Xml,
}

impl From<FormatArg> for DocumentFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => DocumentFormat::Json,
            FormatArg::Xml => DocumentFormat::Xml,
        }
    }
}

#[derive(Parser)]
#[command(name = "live-layout")]
#[command(about = "Build a layout document on a headless view tree and print the solved frames")]
struct Cli {
    /// Input file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Document dialect; guessed from the extension or the text when omitted
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// Width of the root view
    #[arg(long, default_value_t = 320.0)]
    width: f64,

    /// Height of the root view
    #[arg(long, default_value_t = 480.0)]
    height: f64,

    /// Variable injection, KEY=VALUE
    #[arg(short, long = "inject", value_parser = parse_key_value)]
    inject: Vec<(String, String)>,

    /// Engine configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Rebuild and print again whenever the input file changes
    #[arg(short, long, requires = "input")]
    watch: bool,
}

fn parse_key_value(arg: &str) -> Result<(String, String), String> {
    arg.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", arg))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let mut engine = match &cli.config {
        Some(path) => match EngineConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };
    let extension_format = cli
        .input
        .as_deref()
        .and_then(Path::extension)
        .and_then(|ext| DocumentFormat::from_extension(&ext.to_string_lossy()));
    if let Some(format) = cli.format.map(DocumentFormat::from).or(extension_format) {
        engine = engine.with_format(format);
    }

    let source = match read_source(cli.input.as_deref()) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading input: {}", e);
            std::process::exit(1);
        }
    };
    let filename = cli
        .input
        .as_deref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<stdin>".to_string());

    let mut config = RenderConfig::new()
        .with_size(cli.width, cli.height)
        .with_engine(engine);
    for (key, value) in &cli.inject {
        config = config.with_injection(key, value);
    }

    let mut rendered = match render_with_config(&source, config) {
        Ok(rendered) => rendered,
        Err(e) => {
            print_render_error(&e, &source, &filename);
            std::process::exit(1);
        }
    };
    print_rendered(&rendered);

    if let (true, Some(path)) = (cli.watch, cli.input.as_deref()) {
        watch(&mut rendered, path, cli.width, cli.height);
    }
}

fn read_source(path: Option<&Path>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn print_render_error(error: &RenderError, source: &str, filename: &str) {
    match error {
        RenderError::Layout(LayoutError::Document(e)) => eprint!("{}", e.format(source, filename)),
        other => eprintln!("Error: {}", other),
    }
}

fn print_rendered(rendered: &Rendered) {
    print!("{}", rendered.tree());
    for conflict in &rendered.solution.conflicts {
        eprintln!("solver: {}", conflict);
    }
    eprintln!("{}", rendered.summary());
}

/// Publish the file on the layout's channel whenever it changes, and rebuild on this thread
fn watch(rendered: &mut Rendered, path: &Path, width: f64, height: f64) {
    let Some(name) = rendered.layout.name().map(str::to_string) else {
        eprintln!("Cannot watch: the document has no name");
        std::process::exit(1);
    };
    let bus = Arc::new(UpdateBus::new());
    if let Err(e) = rendered.layout.connect(bus.clone()) {
        eprintln!("Cannot watch: {}", e);
        std::process::exit(1);
    }

    let publisher: Arc<dyn UpdateChannel> = bus;
    let watched = path.to_path_buf();
    thread::spawn(move || {
        let mut last = modified(&watched);
        loop {
            thread::sleep(WATCH_INTERVAL);
            let current = modified(&watched);
            if current == last {
                continue;
            }
            last = current;
            match fs::read_to_string(&watched) {
                Ok(text) => {
                    let update = LayoutUpdate::new(name.clone(), text);
                    publisher.publish(&update.channel(), update);
                }
                Err(e) => log::warn!("could not read {}: {}", watched.display(), e),
            }
        }
    });

    eprintln!("Watching {} (Ctrl-C to stop)", path.display());
    loop {
        thread::sleep(WATCH_INTERVAL);
        rendered.reports.clear();
        if rendered.layout.poll_updates(&mut rendered.host) > 0 {
            rendered.relayout(width, height);
            println!();
            print_rendered(rendered);
        } else {
            for report in rendered.reports.errors() {
                eprintln!("Reload failed: {}", report.message);
            }
        }
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}
