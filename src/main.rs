use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use treepress::{config, output, pipeline};

#[derive(Parser)]
#[command(name = "treepress")]
#[command(about = "Static site builder for a directory tree of markdown and images")]
#[command(long_about = "\
Static site builder for a directory tree of markdown and images

The source tree is mirrored into the build tree:

  src/
  ├── index.md              # → build/index.html (rendered, breadcrumb: Home)
  ├── style.css             # → copied as-is on every build
  └── travel/
      ├── index.md          # → build/travel/index.html (Home › travel)
      └── dusk.jpg          # → build/travel/dusk.jpg + build/travel/t/dusk.jpg

Images already present in the build tree are skipped together with their
thumbnail. Delete the build directory to regenerate everything.

Markdown extensions:
  <-->                      A line on its own clears floats
  ![Dusk](dusk.jpg =300l)   Image with class img-300, floated left (r = right)

Run 'treepress gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Source directory
    #[arg(long, default_value = "src", global = true)]
    source: PathBuf,

    /// Build directory
    #[arg(long, default_value = "build", global = true)]
    output: PathBuf,

    /// Config file (TOML, or JSON by extension); missing means defaults
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Log progress at info level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the site from the source tree
    Build {
        /// Record failing files and finish the build instead of stopping
        #[arg(long)]
        keep_going: bool,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Build { keep_going } => {
            let mut site_config = config::load_config(&cli.config)?;
            if keep_going {
                site_config.on_error = config::ErrorPolicy::KeepGoing;
            }
            init_thread_pool(&site_config.processing);

            let report = pipeline::build(&cli.source, &cli.output, &site_config)?;
            output::print_build_report(&report, &cli.source, &cli.output);
            if !report.is_success() {
                std::process::exit(1);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
