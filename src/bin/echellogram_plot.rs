//! Render a labelled echellogram of a spectrograph's spectral format
//!
//! Queries the optical-model bridge (or the built-in synthetic model) for
//! order traces, overlays reference stellar lines, and writes the plot to
//! an image file.
//!
//! Usage:
//! ```
//! cargo run --bin echellogram_plot -- --synthetic
//! cargo run --bin echellogram_plot -- --endpoint tcp://127.0.0.1:5555
//! ```
//!
//! See --help for detailed options.

use anyhow::{bail, Context, Result};
use clap::Parser;
use echellogram::instrument::{models, Spectrograph};
use echellogram::layout::EchelleLayout;
use echellogram::model::{DdeLink, OpticalModel, SyntheticModel};
use echellogram::render::{render_to_file, RenderConfig};
use echellogram::STELLAR_LINES;
use std::path::PathBuf;

/// Command line arguments for echellogram plotting
#[derive(Parser, Debug)]
#[command(
    name = "Echellogram Plotter",
    about = "Plots an echelle spectrograph's order layout with labelled reference lines",
    long_about = None
)]
struct Args {
    /// Endpoint of the optical-model bridge
    #[arg(long, default_value = "tcp://127.0.0.1:5555")]
    endpoint: String,

    /// Use the built-in synthetic optical model instead of the bridge
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Instrument model name (tenk, demo4k)
    #[arg(short, long, default_value = "tenk")]
    instrument: String,

    /// Output file path
    #[arg(short, long, default_value = "plots/echellogram.png")]
    output: PathBuf,

    /// Attribute reference lines across each order's full covered span
    /// instead of only its free spectral range
    #[arg(long, default_value_t = false)]
    full_range: bool,

    /// Trace samples per order for the synthetic model
    #[arg(long, default_value_t = 11)]
    samples_per_order: usize,

    /// Output image width in pixels
    #[arg(long, default_value_t = 1024)]
    width: u32,

    /// Output image height in pixels
    #[arg(long, default_value_t = 1024)]
    height: u32,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let Some(config) = models::by_name(&args.instrument) else {
        bail!("unknown instrument '{}'", args.instrument);
    };
    let spectrograph = Spectrograph::new(config.clone());

    println!(
        "Building spectral format for {} ({} orders)...",
        config.name,
        spectrograph.orders().len()
    );

    // The bridge link is scoped to layout construction; the socket is
    // released when `model` drops, on success and on failure alike.
    let mut model: Box<dyn OpticalModel> = if args.synthetic {
        Box::new(SyntheticModel::new(&spectrograph, args.samples_per_order))
    } else {
        Box::new(
            DdeLink::connect(&args.endpoint)
                .with_context(|| format!("cannot reach optical-model bridge at {}", args.endpoint))?,
        )
    };

    println!("Tracing spectral lines...");
    let layout = EchelleLayout::build(
        model.as_mut(),
        &spectrograph,
        &STELLAR_LINES,
        !args.full_range,
    )
    .context("layout construction failed")?;
    drop(model);

    println!(
        "Laid out {} orders with {} reference lines",
        layout.orders.len(),
        layout.markers.len()
    );

    if let Some(parent) = args.output.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }

    let render_config = RenderConfig {
        width_px: args.width,
        height_px: args.height,
        title: Some(config.name.clone()),
        ..Default::default()
    };
    render_to_file(
        &layout,
        config.detector.half_extent_mm(),
        &render_config,
        &args.output,
    )
    .context("rendering failed")?;

    println!("Plot saved to: {}", args.output.display());
    Ok(())
}
