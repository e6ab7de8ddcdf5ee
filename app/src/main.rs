use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use fractal_terrain::{
    Accumulation, DEFAULT_FILENAME, DepthRamp, FaultParams, SlopeFit, SourceKind, TILE_SIZE,
    Terrain, box_count, preview,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fractal-terrain")]
#[command(about = "Fault-line fractal terrain: generate, smooth, measure and export a height tile")]
struct Args {
    /// Side length of the square tile
    #[arg(long, default_value_t = TILE_SIZE)]
    side: usize,

    /// Fill the tile with this value before anything else (not clamped)
    #[arg(long, allow_negative_numbers = true)]
    clear: Option<i32>,

    /// Lower height bound
    #[arg(long, allow_negative_numbers = true)]
    min_height: Option<i32>,

    /// Upper height bound
    #[arg(long, allow_negative_numbers = true)]
    max_height: Option<i32>,

    /// Skip fault formation (useful with --clear, --blur or --dimension)
    #[arg(long)]
    no_generate: bool,

    /// Load fault parameters from a JSON file instead of the flags below
    #[arg(long)]
    params: Option<PathBuf>,

    /// Number of fault lines
    #[arg(short, long, default_value = "512")]
    iterations: usize,

    /// Fault depth of the first iteration
    #[arg(long, default_value = "10", allow_negative_numbers = true)]
    depth_start: i32,

    /// Fault depth of the last iteration
    #[arg(long, default_value = "1", allow_negative_numbers = true)]
    depth_end: i32,

    /// Use this depth for every fault (0 = ramp from start to end)
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    fixed_depth: i32,

    /// Ramp the depth linearly instead of the stepped legacy ramp
    #[arg(long)]
    linear_ramp: bool,

    /// Pick fault end points from the logistic map
    #[arg(long)]
    chaotic: bool,

    /// Logistic map seed in [0, 1] (random if not given)
    #[arg(long)]
    chaos_seed: Option<f32>,

    /// Seed the logistic map from the tile's average height
    #[arg(long, conflicts_with = "chaos_seed")]
    seed_from_height: bool,

    /// Logistic map growth rate
    #[arg(long, default_value = "4.0")]
    growth_rate: f32,

    /// Accumulate every displacement and rescale once at the end
    #[arg(long)]
    retain: bool,

    /// Smoothing passes applied after generation
    #[arg(long, default_value = "0")]
    blur: usize,

    /// Report the box-counting fractal dimension
    #[arg(long)]
    dimension: bool,

    /// Fit the dimension with least squares instead of the running average
    #[arg(long)]
    least_squares: bool,

    /// Print the box count table
    #[arg(long)]
    box_counts: bool,

    /// TGA output file
    #[arg(short, long, default_value = DEFAULT_FILENAME)]
    output: String,

    /// Also write a PNG preview here
    #[arg(long)]
    png: Option<PathBuf>,

    /// Colour the PNG preview by height
    #[arg(long)]
    colour: bool,
}

impl Args {
    fn fault_params(&self) -> Result<FaultParams> {
        if let Some(path) = &self.params {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading parameters from {}", path.display()))?;
            return serde_json::from_str(&text)
                .with_context(|| format!("parsing parameters in {}", path.display()));
        }
        Ok(FaultParams {
            iterations: self.iterations,
            depth_start: self.depth_start,
            depth_end: self.depth_end,
            fixed_depth: self.fixed_depth,
            source: if self.chaotic {
                SourceKind::Chaotic
            } else {
                SourceKind::Uniform
            },
            accumulation: if self.retain {
                Accumulation::Retained
            } else {
                Accumulation::Bounded
            },
            ramp: if self.linear_ramp {
                DepthRamp::Linear
            } else {
                DepthRamp::Stepped
            },
        })
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut terrain = Terrain::try_new(args.side).context("invalid --side")?;
    terrain.set_filename(args.output.clone());
    terrain.chaos_mut().set_growth_rate(args.growth_rate);

    if let Some(v) = args.min_height {
        terrain.grid_mut().set_min_height(v);
    }
    if let Some(v) = args.max_height {
        terrain.grid_mut().set_max_height(v);
    }
    if let Some(v) = args.clear {
        terrain.clear(v);
    }

    if !args.no_generate {
        let params = args.fault_params()?;
        if params.source == SourceKind::Chaotic {
            match args.chaos_seed {
                Some(seed) => {
                    terrain.chaos_mut().set_seed(seed);
                    terrain.chaos_mut().reset();
                }
                None if args.seed_from_height => terrain.seed_chaos_from_height(),
                None => terrain.seed_chaos_randomly(),
            }
        }

        let start = Instant::now();
        let mut last_logged = 0;
        terrain
            .generate(params, |percent| {
                if percent >= last_logged + 10 {
                    last_logged = percent - percent % 10;
                    info!(percent, "generating");
                }
            })
            .context("fault formation failed")?;
        info!(
            elapsed_ms = start.elapsed().as_secs_f32() * 1000.0,
            "generation complete"
        );
    }

    if args.blur > 0 {
        terrain.smooth(args.blur);
    }

    if args.box_counts {
        for level in box_count(terrain.grid()) {
            println!("{:>6} {:>10}", level.box_size, level.block_count);
        }
    }

    if args.dimension {
        let fit = if args.least_squares {
            SlopeFit::LeastSquares
        } else {
            SlopeFit::RunningAverage
        };
        let dimension = terrain
            .fractal_dimension_with(fit)
            .context("fractal dimension unavailable")?;
        println!("Fractal Dimension: {dimension:.3}");
    }

    terrain
        .save()
        .with_context(|| format!("saving {}", terrain.filename()))?;

    if let Some(path) = &args.png {
        preview::save_png(terrain.grid(), path, args.colour)
            .with_context(|| format!("saving preview {}", path.display()))?;
    }

    Ok(())
}
