use clap::{Parser, Subcommand};
use pixelmill::imaging::{AdjustmentParameters, PreviewConstraint, RustBackend};
use pixelmill::pipeline::Pipeline;
use pixelmill::storage::{PreviewStore, StorageError};
use pixelmill::{config, output, server};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pixelmill")]
#[command(about = "Image preview service: upload, adjust, preview")]
#[command(long_about = "\
Image preview service: upload, adjust, preview

Uploaded images are decoded, scaled down to a bounded width and stored as
PNG previews. Adjustments run in a fixed order on a stored preview and
produce a new preview; the source is never modified.

Order of adjustments:
  1. brightness / saturation   (one combined modulation pass)
  2. contrast                  (linear stretch around 128; values < 1 become value + 1)
  3. rotation                  (degrees clockwise, canvas grows, black fill)
  4. resize                    (width <= preview.max_width, aspect kept)

Previews live in the storage directory:

  uploads/
  ├── temp-1760000000000-3fa2c1d9.png        # from upload / ingest
  └── processed-1760000000123-b07e55aa.png   # from process / adjust

Run 'pixelmill gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    /// Preview directory (overrides storage.dir)
    #[arg(long, global = true)]
    storage: Option<PathBuf>,

    /// Debug-level logging for pixelmill
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Adjustment flags for the `adjust` command.
#[derive(clap::Args, Clone)]
struct AdjustArgs {
    /// Brightness factor (1 = unchanged)
    #[arg(long, allow_negative_numbers = true)]
    brightness: Option<f32>,
    /// Saturation factor (1 = unchanged, 0 = grayscale)
    #[arg(long, allow_negative_numbers = true)]
    saturation: Option<f32>,
    /// Contrast factor (1 = unchanged)
    #[arg(long, allow_negative_numbers = true)]
    contrast: Option<f32>,
    /// Rotation in degrees, clockwise
    #[arg(long, allow_negative_numbers = true)]
    rotation: Option<f32>,
}

impl From<AdjustArgs> for AdjustmentParameters {
    fn from(args: AdjustArgs) -> Self {
        Self {
            brightness: args.brightness,
            contrast: args.contrast,
            saturation: args.saturation,
            rotation: args.rotation,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service
    Serve {
        /// Interface to bind (overrides server.host)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides server.port)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Store a preview of a local image file
    Ingest {
        /// Image file to ingest
        file: PathBuf,
    },
    /// Adjust a stored preview and store the result
    Adjust {
        /// Locator of a stored preview (URL, /uploads/<name> or bare name)
        locator: String,
        #[command(flatten)]
        args: AdjustArgs,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Serve { host, port } => {
            let mut app_config = load_app_config(&cli.config, cli.storage.as_deref())?;
            if let Some(host) = host {
                app_config.server.host = host;
            }
            if let Some(port) = port {
                app_config.server.port = port;
            }
            app_config.validate()?;
            let pipeline = build_pipeline(&app_config)?;
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(server::serve(&app_config, pipeline))?;
        }
        Command::Ingest { file } => {
            let app_config = load_app_config(&cli.config, cli.storage.as_deref())?;
            let pipeline = build_pipeline(&app_config)?;
            let bytes = std::fs::read(&file)?;
            let stored = pipeline.ingest(Some(&bytes))?;
            output::print_ingest_output(&file, &stored);
        }
        Command::Adjust { locator, args } => {
            let app_config = load_app_config(&cli.config, cli.storage.as_deref())?;
            let pipeline = build_pipeline(&app_config)?;
            let params = AdjustmentParameters::from(args);
            let (stored, steps) = pipeline.adjust_with_plan(&locator, &params)?;
            output::print_adjust_output(&locator, &steps, &stored);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load `config.toml` and apply the global `--storage` override.
fn load_app_config(
    config_dir: &Path,
    storage: Option<&Path>,
) -> Result<config::AppConfig, config::ConfigError> {
    let mut app_config = config::load_config(config_dir)?;
    if let Some(dir) = storage {
        app_config.storage.dir = dir.display().to_string();
    }
    Ok(app_config)
}

/// Initialize tracing.
///
/// `RUST_LOG` wins when set; otherwise the verbose flag picks the default.
fn init_logging(verbose: bool) {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if verbose {
            "pixelmill=debug,tower_http=info".to_string()
        } else {
            "pixelmill=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. User can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// Open the preview store, creating its directory, and wire the pipeline.
fn build_pipeline(app_config: &config::AppConfig) -> Result<Pipeline, StorageError> {
    let store = PreviewStore::new(
        &app_config.storage.dir,
        &app_config.server.public_base_url,
    );
    store.ensure_dir()?;
    init_thread_pool(&app_config.processing);
    Ok(Pipeline::new(
        RustBackend::new(),
        store,
        PreviewConstraint::new(app_config.preview.max_width),
    ))
}
