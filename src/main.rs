use clap::{Parser, Subcommand, ValueEnum};
use slugpress::collection::Collection;
use slugpress::pipeline::Project;
use slugpress::router::RouteShape;
use slugpress::{config, output};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "slugpress")]
#[command(about = "Markdown content core for static sites")]
#[command(long_about = "\
Markdown content core for static sites

Each category is a directory of markdown files with YAML front matter. A
file's path relative to its category, minus the extension, is its slug.

Project structure:

  slugpress.toml                   # Optional config (see gen-config)
  content/
  ├── blogs/                       # Category
  │   ├── hello.md                 # slug \"hello\"
  │   ├── draft-idea.md            # draft: true → never published
  │   └── 2024/
  │       └── launch.md            # slug \"2024/launch\"
  ├── notes/                       # Another category
  │   └── first.md
  └── search/
      └── index.json               # Written by build / index

Front matter:
  title, description, date (normalized with [dates].format), draft.
  Any other key is passed through untouched.

Run 'slugpress gen-config' to generate a documented slugpress.toml.")]
#[command(version)]
struct Cli {
    /// Project root (the directory holding slugpress.toml)
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Log debug diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum ShapeArg {
    Flat,
    Nested,
    All,
}

impl ShapeArg {
    fn shapes(self) -> &'static [RouteShape] {
        match self {
            ShapeArg::Flat => &[RouteShape::Flat],
            ShapeArg::Nested => &[RouteShape::Nested],
            ShapeArg::All => &[RouteShape::Flat, RouteShape::Nested],
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Write every published page and the search index
    Build,
    /// Load every category and verify each static path resolves
    Check,
    /// List a category's published items, newest first
    List {
        category: String,
        /// Only the newest N items
        #[arg(long)]
        latest: Option<usize>,
    },
    /// Print static path parameters for a category
    Paths {
        category: String,
        #[arg(long, value_enum, default_value = "all")]
        shape: ShapeArg,
        /// Print JSON route parameters instead of a listing
        #[arg(long)]
        json: bool,
    },
    /// Resolve one item by its slug segments and print it rendered
    Show {
        category: String,
        #[arg(required = true)]
        segments: Vec<String>,
    },
    /// Rebuild only the search index
    Index,
    /// Print a stock slugpress.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let project = Project::open(&cli.root)?;
    init_thread_pool(&project.config().processing);

    match cli.command {
        Command::Build => {
            println!("==> Building {}", cli.root.display());
            let report = project.build()?;
            output::print_build_output(&report, project.root());
            println!("==> Build complete: {}", project.config().output_dir);
        }
        Command::Check => {
            println!("==> Checking {}", cli.root.display());
            let report = project.check()?;
            output::print_check_output(&report);
            println!("==> Content is valid");
        }
        Command::List { category, latest } => {
            let collection = project.collection(&category)?;
            let description_length = project.config().search.description_length;
            match latest {
                Some(n) => {
                    let newest = Collection::from_items(
                        collection.category(),
                        collection.latest(n).to_vec(),
                    );
                    output::print_collection_output(&newest, description_length);
                }
                None => output::print_collection_output(&collection, description_length),
            }
        }
        Command::Paths {
            category,
            shape,
            json,
        } => {
            let router = project.router(&category)?;
            for &shape in shape.shapes() {
                let params = router.static_paths(shape)?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&params)?);
                } else {
                    output::print_paths_output(shape, &params);
                }
            }
        }
        Command::Show { category, segments } => {
            let item = project.show(&category, segments)?;
            output::print_item_output(&item);
        }
        Command::Index => {
            let entries = project.build_index()?;
            output::print_index_output(
                &entries,
                &project.config().index_path(project.root()),
                project.root(),
                project.config().search.description_length,
            );
        }
        Command::GenConfig => {}
    }

    Ok(())
}

/// Install the stderr diagnostics subscriber.
///
/// `RUST_LOG` wins when set; otherwise `warn`, or `debug` with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "slugpress=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores: the config can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
