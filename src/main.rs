//! triangle-pack: equal-circle packing in the unit equilateral triangle.
//!
//! Runs the restart DE loop on `k` circle centers and reports the best
//! radius found, optionally as a SageMath plotting script.

use std::time::Instant;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing::Level;
use u_diffevo::de::{DeConfig, DeRunner};
use u_diffevo::packing::{sage_script, TrianglePacking};

#[derive(Parser)]
#[command(name = "triangle-pack")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of circles to pack
    #[arg(short = 'k', long, default_value_t = 13)]
    circles: usize,

    /// Number of meta-epochs (restarts)
    #[arg(short, long, default_value_t = 30)]
    meta_epochs: usize,

    /// Steps in the first meta-epoch; grows by 30% per meta-epoch
    #[arg(short, long, default_value_t = 10_000)]
    epochs: usize,

    /// Random seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Wall-clock limit in milliseconds
    #[arg(short, long)]
    time_limit_ms: Option<u64>,

    /// Print a SageMath script drawing the packing
    #[arg(long)]
    sage: bool,

    /// Log every meta-epoch and injection
    #[arg(short, long)]
    verbose: bool,
}

/// Turns the command line into a validated run configuration.
fn build_config(args: &Args) -> Result<DeConfig, String> {
    if args.circles == 0 {
        return Err("at least one circle is required".into());
    }
    let mut config = DeConfig::default()
        .with_meta_epochs(args.meta_epochs)
        .with_initial_epochs(args.epochs);
    config.max_epochs = config.max_epochs.max(args.epochs);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(ms) = args.time_limit_ms {
        config = config.with_time_limit_ms(ms);
    }
    config.validate()?;
    Ok(config)
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(msg) => Args::command().error(ErrorKind::ValueValidation, msg).exit(),
    };

    println!("k, num_epochs, meta_epochs");
    println!("{} {} {}", args.circles, args.epochs, args.meta_epochs);

    let problem = TrianglePacking::equilateral(args.circles);
    let start = Instant::now();
    let result = DeRunner::run(&problem, &config);
    let radius = -result.best_cost;

    println!("Best achieved: {radius:.10}");
    if args.sage {
        println!();
        print!("{}", sage_script(&problem.triangle, &result.best, radius));
        println!();
    }
    println!(
        "Total time taken: {:.3}s ({} steps, {} injections)",
        start.elapsed().as_secs_f64(),
        result.total_steps,
        result.injections
    );
}
