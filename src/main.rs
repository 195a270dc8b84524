use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use svg_spritemap::generate::{self, Hooks};
use svg_spritemap::output::{self, WrittenFile};
use svg_spritemap::{config, scan};

#[derive(Parser)]
#[command(name = "svg-spritemap")]
#[command(about = "Assemble SVG icons into one spritemap")]
#[command(long_about = "\
Assemble SVG icons into one spritemap

Every icon becomes a <symbol> (and optionally a stacked <use> and a <view>)
in a single SVG file. A companion CSS, SCSS or LESS stylesheet can address
each icon as a data URI or as a spritemap.svg#fragment URL.

Project structure:

  project/
  ├── spritemap.toml               # Config (optional, defaults shown by gen-config)
  └── icons/                       # Sources, walked recursively
      ├── arrow.svg                # → #sprite-arrow
      └── nav/
          └── home.svg             # → #sprite-home

Variables: an attribute written as var:color.fill=\"#000\" becomes a Sass
variable the generated mixin can override; other outputs use the default.

Run 'svg-spritemap gen-config' to generate a documented spritemap.toml.")]
#[command(version)]
struct Cli {
    /// Directory holding spritemap.toml; input paths are relative to it
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    /// Directory the spritemap is written to
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan sources, assemble the spritemap and write it (plus stylesheet)
    Build {
        /// Also write a JSON summary of sprites and warnings
        #[arg(long)]
        manifest: Option<PathBuf>,
    },
    /// Scan and assemble without writing anything; report warnings
    Check,
    /// Print a stock spritemap.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Build { manifest } => {
            let site = config::load_config(&cli.config)?;
            init_thread_pool(&site.processing);

            println!("==> Scanning {}", cli.config.display());
            let sources = scan::scan(&cli.config, &site.input)?;

            let Some(generated) = generate::generate(&sources, &site, &Hooks::default())? else {
                println!("==> No sources found, nothing to build");
                return Ok(());
            };

            let spritemap_path = cli.output.join(&generated.filename);
            let spritemap = WrittenFile {
                path: spritemap_path.display().to_string(),
                changed: output::write_if_changed(&spritemap_path, &generated.svg)?,
            };
            let styles = match &generated.styles {
                Some(styles) => {
                    let path = cli.config.join(&styles.filename);
                    Some(WrittenFile {
                        path: path.display().to_string(),
                        changed: output::write_if_changed(&path, &styles.text)?,
                    })
                }
                None => None,
            };
            output::print_build_output(&generated, &spritemap, styles.as_ref());

            if let Some(manifest_path) = manifest {
                write_manifest(&manifest_path, &generated)?;
            }
            println!("==> Build complete: {}", spritemap.path);
        }
        Command::Check => {
            let site = config::load_config(&cli.config)?;
            init_thread_pool(&site.processing);
            println!("==> Checking {}", cli.config.display());
            let sources = scan::scan(&cli.config, &site.input)?;
            output::print_scan_output(&sources);

            let warnings = generate::generate(&sources, &site, &Hooks::default())?
                .map(|generated| generated.warnings)
                .unwrap_or_default();
            if !warnings.is_empty() {
                println!();
                for line in output::format_warnings(&warnings) {
                    println!("{}", line);
                }
            }
            println!("==> Sources are valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// Write sprite placements and warnings as pretty JSON.
fn write_manifest(path: &Path, generated: &generate::Generated) -> std::io::Result<()> {
    let summary = serde_json::json!({
        "filename": generated.filename,
        "styles": generated.styles.as_ref().map(|s| &s.filename),
        "sprites": generated.sprites,
        "warnings": generated.warnings,
    });
    let json = serde_json::to_string_pretty(&summary)?;
    output::write_if_changed(path, &json)?;
    Ok(())
}
