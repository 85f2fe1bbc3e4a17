use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use vibe_site::catalogue::Catalogue;
use vibe_site::{config, diagrams, generate, output};

#[derive(Parser)]
#[command(name = "vibe-site")]
#[command(about = "Catalogue renderer and diagram preprocessor for the Vibe AI Infra site")]
#[command(long_about = "\
Catalogue renderer and diagram preprocessor for the Vibe AI Infra site

Content structure:

  content/
  ├── config.toml          # Site config (optional, merged over defaults)
  ├── catalogue.toml       # Ordered categories and project records
  └── til/                 # Notes; ```mermaid blocks become images
      └── 2025/kvm-exits.md

Typical flow:

  vibe-site diagrams       # render diagrams, rewrite notes in place
  vibe-site build          # write index.html + projects/*.html to dist/

Run 'vibe-site gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Content directory holding config.toml and the catalogue
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory for the generated site
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Log progress at info level (otherwise RUST_LOG, default warn)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the catalogue site into the output directory
    Build,
    /// Load and validate the catalogue without writing anything
    Check,
    /// Render fenced diagram blocks to images and rewrite the documents
    Diagrams {
        /// Document root (defaults to diagrams.source_dir)
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Image directory (defaults to diagrams.output_dir)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build => {
            let config = config::load_config(&cli.source)?;
            let catalogue = load_catalogue(&cli.source, &config)?;
            warn_unmatched(&catalogue);

            println!("==> Generating HTML \u{2192} {}", cli.output.display());
            let report = generate::generate(&catalogue, &config, &cli.output)?;
            output::print_generate_output(&report);
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            let config = config::load_config(&cli.source)?;
            println!("==> Checking {}", cli.source.display());
            let catalogue = load_catalogue(&cli.source, &config)?;
            output::print_catalogue_output(&catalogue);
            println!("==> Catalogue is valid");
        }
        Command::Diagrams { dir, out } => {
            let config = config::load_config(&cli.source)?;
            let root = dir.unwrap_or_else(|| PathBuf::from(&config.diagrams.source_dir));
            let out = out.unwrap_or_else(|| PathBuf::from(&config.diagrams.output_dir));

            println!(
                "==> Rendering diagrams in {} \u{2192} {}",
                root.display(),
                out.display()
            );
            let (tx, rx) = std::sync::mpsc::channel();
            let printer_root = root.clone();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_diagram_event(&event, &printer_root) {
                        println!("{}", line);
                    }
                }
            });
            let result = diagrams::preprocess(&root, &out, &config.diagrams, Some(tx));
            printer
                .join()
                .map_err(|_| "diagram output thread panicked")?;
            output::print_preprocess_summary(&result?);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// `--verbose` forces `info`; otherwise honour `RUST_LOG`, falling back to `warn`.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_catalogue(
    source: &Path,
    config: &config::SiteConfig,
) -> Result<Catalogue, Box<dyn std::error::Error>> {
    let path = source.join(&config.site.catalogue);
    let catalogue = Catalogue::load(&path)?;
    tracing::info!(
        path = %path.display(),
        projects = catalogue.projects.len(),
        categories = catalogue.categories.len(),
        "Loaded catalogue"
    );
    Ok(catalogue)
}

fn warn_unmatched(catalogue: &Catalogue) {
    for project in catalogue.unmatched() {
        tracing::warn!(
            id = %project.id,
            category = %project.category,
            "Project category is not listed; it will not appear on the site"
        );
    }
}
