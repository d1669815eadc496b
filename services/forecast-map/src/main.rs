//! Forecast map command line.
//!
//! Renders forecast frames to PNG files from the field data service and the
//! boundary geometry.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args as ClapArgs, Parser, Subcommand};
use forecast_common::{CacheKey, Domain, Parameter, TimeStep};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::{env, fs};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use forecast_map::{
    geometry_source, run_sweep, HttpFieldSource, MapConfig, MapStore, RenderOrchestrator,
    RenderOutcome, RenderSettings, SweepPlan, Viewport,
};
use renderer::{encode_png, legend};
use storage::ForecastCache;

#[derive(Parser, Debug)]
#[command(name = "forecast-map")]
#[command(about = "Forecast heat-field map renderer")]
struct Args {
    /// YAML configuration file
    #[arg(long, env = "FORECAST_CONFIG")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Number of tokio worker threads (default: number of CPU cores)
    #[arg(long)]
    worker_threads: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one frame to a PNG file
    Render {
        #[command(flatten)]
        selection: Selection,

        /// Time step (0-24, 3 hours each)
        #[arg(long, default_value_t = 0)]
        step: u8,

        /// Output PNG path
        #[arg(short, long, default_value = "forecast.png")]
        output: PathBuf,
    },
    /// Step through a range of time steps, writing one PNG per step
    Sweep {
        #[command(flatten)]
        selection: Selection,

        /// First time step
        #[arg(long, default_value_t = 0)]
        from: u8,

        /// Last time step
        #[arg(long, default_value_t = TimeStep::MAX)]
        to: u8,

        /// Directory for the PNG files
        #[arg(short, long, default_value = "frames")]
        output_dir: PathBuf,
    },
    /// Print the legend of a parameter as JSON
    Legend {
        #[arg(long, default_value = "rainfall")]
        parameter: Parameter,
    },
}

#[derive(ClapArgs, Debug)]
struct Selection {
    #[arg(long, default_value = "kenya")]
    domain: Domain,

    #[arg(long, default_value = "rainfall")]
    parameter: Parameter,

    /// Viewport width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Viewport height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Analysis time (RFC 3339), used to report valid times
    #[arg(long)]
    base_time: Option<DateTime<Utc>>,
}

impl Selection {
    fn viewport(&self, config: &MapConfig) -> Viewport {
        Viewport::new(
            self.width.unwrap_or(config.viewport.width),
            self.height.unwrap_or(config.viewport.height),
        )
    }

    fn key(&self, step: u8) -> Result<CacheKey> {
        let step = TimeStep::new(step)?;
        Ok(CacheKey::new(self.domain, self.parameter, step))
    }
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    } else if let Ok(threads_str) = env::var("TOKIO_WORKER_THREADS") {
        if let Ok(threads) = threads_str.parse::<usize>() {
            runtime_builder.worker_threads(threads);
        }
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<()> {
    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = MapConfig::load(args.config.as_deref())?;

    match args.command {
        Command::Render {
            selection,
            step,
            output,
        } => render(&config, &selection, step, &output).await,
        Command::Sweep {
            selection,
            from,
            to,
            output_dir,
        } => sweep(&config, &selection, from, to, &output_dir).await,
        Command::Legend { parameter } => {
            println!("{}", serde_json::to_string_pretty(&legend(parameter))?);
            Ok(())
        }
    }
}

fn build_orchestrator(config: &MapConfig) -> Result<Arc<RenderOrchestrator>> {
    let fields = HttpFieldSource::new(&config.api_base_url, config.request_timeout())
        .context("Failed to create field client")?;
    let geometry = geometry_source(&config.geo_base, config.request_timeout())
        .context("Failed to create geometry source")?;
    let store = Arc::new(MapStore::new(ForecastCache::new(config.cache_capacity)));

    info!(
        api = %config.api_base_url,
        geo_base = %config.geo_base,
        cache_capacity = config.cache_capacity,
        "Forecast map configured"
    );

    Ok(Arc::new(RenderOrchestrator::new(
        store,
        Arc::new(fields),
        geometry,
        RenderSettings::from(config),
    )))
}

async fn render(config: &MapConfig, selection: &Selection, step: u8, output: &Path) -> Result<()> {
    let orchestrator = build_orchestrator(config)?;
    let key = selection.key(step)?;
    let request = forecast_map::RenderRequest {
        key,
        viewport: selection.viewport(config),
    };

    let report = orchestrator.render(request, CancellationToken::new()).await;
    if let Some(prefetch) = report.prefetch {
        prefetch.abort();
    }

    match report.outcome {
        RenderOutcome::Done { frame, field_error } => {
            if let Some(e) = field_error {
                warn!(error = %e, "Frame rendered without forecast data");
            }
            write_frame(&frame.canvas, output)?;
            log_valid_time(selection, key.time_step, output);
            Ok(())
        }
        RenderOutcome::Failed(e) => Err(e).context("Render failed"),
        RenderOutcome::Cancelled => bail!("Render was cancelled"),
    }
}

async fn sweep(
    config: &MapConfig,
    selection: &Selection,
    from: u8,
    to: u8,
    output_dir: &Path,
) -> Result<()> {
    let plan = SweepPlan {
        first: selection.key(from)?,
        last: TimeStep::new(to)?,
        viewport: selection.viewport(config),
        debounce: config.resize_debounce(),
    };
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let orchestrator = build_orchestrator(config)?;
    run_sweep(orchestrator, plan, |step, frame| {
        let path = output_dir.join(format!(
            "{}_{}_{:02}.png",
            selection.domain,
            selection.parameter,
            step.index()
        ));
        write_frame(&frame.canvas, &path)?;
        log_valid_time(selection, step, &path);
        Ok(())
    })
    .await?;
    Ok(())
}

fn write_frame(canvas: &renderer::Canvas, path: &Path) -> Result<()> {
    let png = encode_png(canvas)?;
    fs::write(path, &png).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn log_valid_time(selection: &Selection, step: TimeStep, path: &Path) {
    match selection.base_time {
        Some(base) => info!(
            path = %path.display(),
            step = step.index(),
            lead_hours = step.hours(),
            valid_time = %step.valid_time(base).to_rfc3339(),
            "Frame written"
        ),
        None => info!(
            path = %path.display(),
            step = step.index(),
            lead_hours = step.hours(),
            "Frame written"
        ),
    }
}
