use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "storyboard", version)]
struct Cli {
    /// Log debug output to stderr.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check scene order, phases, and references.
    Validate(ValidateArgs),
    /// Sweep the page with a headless driver and print debug snapshots.
    Simulate(SimulateArgs),
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input storyboard JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct SimulateArgs {
    /// Input storyboard JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Number of scroll steps across the whole page.
    #[arg(long, default_value_t = 20)]
    steps: u32,

    /// Viewport height in pixels.
    #[arg(long, default_value_t = 1000.0)]
    viewport_px: f64,

    /// Frame time advanced after every step, in milliseconds.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Print only the final snapshot.
    #[arg(long, default_value_t = false)]
    final_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Simulate(args) => cmd_simulate(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let config = storyboard::StoryboardConfig::from_path(&args.in_path)?;
    let report = config
        .validate()
        .with_context(|| format!("validate '{}'", args.in_path.display()))?;

    for (scene, phases) in &report.phases {
        for err in &phases.errors {
            println!("error   {scene}: {err}");
        }
        for warning in &phases.warnings {
            println!("warning {scene}: {warning}");
        }
    }
    for warning in &report.warnings {
        println!("warning {warning}");
    }

    if !report.is_valid() {
        anyhow::bail!("'{}' has invalid phases", args.in_path.display());
    }
    println!(
        "ok: {} scenes, {} elements",
        config.scenes.len(),
        config.elements.len()
    );
    Ok(())
}

fn cmd_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let config = storyboard::StoryboardConfig::from_path(&args.in_path)?;
    let driver = Rc::new(storyboard::HeadlessDriver::new(args.viewport_px));
    let mut manager = storyboard::StoryboardManager::new(
        config,
        Rc::clone(&driver) as Rc<dyn storyboard::ScrollDriver>,
        storyboard::StoryboardOpts::default(),
    )
    .with_context(|| format!("build storyboard from '{}'", args.in_path.display()))?;
    storyboard::register_presets(manager.effects());
    manager.initialize();

    let steps = args.steps.max(1);
    let total = driver.total_px();
    let dt = Duration::from_millis(args.frame_ms);

    for step in 0..=steps {
        let position_px = total * f64::from(step) / f64::from(steps);
        manager.dispatch_all(driver.scroll_to_position(position_px));
        manager.frame(dt);

        if args.final_only && step != steps {
            continue;
        }
        let line = serde_json::json!({
            "step": step,
            "position_px": position_px,
            "debug": manager.get_debug_info(),
        });
        println!("{}", serde_json::to_string(&line).context("serialize debug info")?);
    }

    manager.cleanup();
    Ok(())
}
