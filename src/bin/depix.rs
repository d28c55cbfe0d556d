use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use depix::{
    default_output_path, is_supported_image, process_file, Color, DepixOptions, FilterOptions,
    Point, ProcessResult, PropagationOptions, PropagationRounds, Rectangle, SearchImageRegistry,
};

#[derive(Parser)]
#[command(
    name = "depix",
    about = "Recover pixelated text by matching blocks against a reference rendering",
    version,
    after_help = "Simple usage: depix <pixelated.png> -s <search.png>\n\n\
                  NOTE: Only linear block averaging can be reversed. Blurred or\n\
                  noise-based redactions are not supported."
)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Pixelated image file
    #[arg(required_unless_present = "list_search_images")]
    input: Option<PathBuf>,

    /// Search image rendering the same kind of content
    #[arg(short, long, conflicts_with = "search_index")]
    search: Option<PathBuf>,

    /// Directory of PNG search images
    #[arg(long, env = "DEPIX_SEARCH_IMAGES_PATH")]
    search_dir: Option<PathBuf>,

    /// Select a search image from --search-dir by index
    #[arg(long)]
    search_index: Option<usize>,

    /// List the search images in --search-dir and exit
    #[arg(long)]
    list_search_images: bool,

    /// Output file (default: {name}_depixelated.{ext})
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pixelated region as x1,y1,x2,y2 with inclusive corners (default: whole image)
    #[arg(long, value_parser = parse_rect)]
    rect: Option<Rectangle>,

    /// Editor background color as r,g,b; blocks of this color are ignored
    #[arg(long, value_parser = parse_color)]
    background_color: Option<Color>,

    /// Ignore blocks with fewer pixels than this
    #[arg(long, default_value_t = 1)]
    min_area: u64,

    /// Ignore blocks spanning the full width or height of the region
    #[arg(long)]
    exclude_full_span: bool,

    /// Geometric propagation rounds
    #[arg(long, default_value_t = 2)]
    rounds: u32,

    /// Repeat geometric propagation until nothing changes
    #[arg(long)]
    until_stable: bool,

    /// How many blocks away an anchor may be (0 = any distance)
    #[arg(long, default_value_t = 1)]
    neighbor_reach: u32,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,
}

fn parse_numbers<const N: usize, T: std::str::FromStr>(s: &str) -> Result<[T; N], String> {
    let parts: Vec<T> = s
        .split(',')
        .map(|p| p.trim().parse::<T>().map_err(|_| format!("invalid number in '{s}'")))
        .collect::<Result<_, _>>()?;
    parts
        .try_into()
        .map_err(|_| format!("expected {N} comma-separated values, got '{s}'"))
}

fn parse_rect(s: &str) -> Result<Rectangle, String> {
    let [x1, y1, x2, y2] = parse_numbers::<4, u32>(s)?;
    Ok(Rectangle::new(Point::new(x1, y1), Point::new(x2, y2)))
}

fn parse_color(s: &str) -> Result<Color, String> {
    let [r, g, b] = parse_numbers::<3, u8>(s)?;
    Ok(Color::rgb(r, g, b))
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        "warn"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn open_registry(cli: &Cli) -> SearchImageRegistry {
    let Some(dir) = &cli.search_dir else {
        eprintln!("Error: --search-dir (or DEPIX_SEARCH_IMAGES_PATH) is required");
        process::exit(1);
    };
    match SearchImageRegistry::from_dir(dir) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: Cannot read search images in {}: {e}", dir.display());
            process::exit(1);
        }
    }
}

fn search_image(cli: &Cli) -> PathBuf {
    if let Some(path) = &cli.search {
        return path.clone();
    }
    let Some(index) = cli.search_index else {
        eprintln!("Error: Specify a search image with --search or --search-index");
        process::exit(1);
    };
    let registry = open_registry(cli);
    match registry.path(index) {
        Ok(p) => p.to_path_buf(),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    if cli.list_search_images {
        let registry = open_registry(&cli);
        println!("Search images in {}:", registry.root().display());
        for (index, name) in registry.names() {
            println!("/{index} – {name}");
        }
        return;
    }

    let Some(input_path) = cli.input.as_deref() else {
        eprintln!("Error: Missing pixelated image");
        process::exit(1);
    };
    if !input_path.exists() {
        eprintln!("Error: Input path does not exist: {}", input_path.display());
        process::exit(1);
    }

    if !is_supported_image(input_path) {
        eprintln!("Error: Unsupported image format: {}", input_path.display());
        process::exit(1);
    }

    let search_path = search_image(&cli);

    let mut filter = FilterOptions {
        min_area: cli.min_area,
        exclude_full_span: cli.exclude_full_span,
        ..FilterOptions::default()
    };
    if let Some(bg) = cli.background_color {
        filter = filter.with_background(bg);
    }

    let opts = DepixOptions {
        bounds: cli.rect,
        filter,
        propagation: PropagationOptions {
            rounds: if cli.until_stable {
                PropagationRounds::UntilStable
            } else {
                PropagationRounds::Fixed(cli.rounds)
            },
            neighbor_reach: (cli.neighbor_reach > 0).then_some(cli.neighbor_reach),
        },
    };

    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(input_path));

    let result = process_file(input_path, &search_path, &output_path, &opts);
    print_result(&result, &cli);

    if !result.success {
        process::exit(1);
    }
}

fn print_result(result: &ProcessResult, cli: &Cli) {
    let filename = display_name(&result.path);

    if result.success {
        if !cli.quiet {
            let stats = result.stats;
            eprintln!(
                "[OK] {filename}: {} resolved, {} averaged, {} dropped",
                stats.resolved, stats.ambiguous, stats.dropped
            );
            if let Some(out) = &result.output {
                eprintln!("  -> {}", out.display());
            }
        }
    } else {
        eprintln!("[FAIL] {filename}: {}", result.message);
    }

    if cli.verbose && !result.message.is_empty() {
        eprintln!("  -> {}", result.message);
    }
}

fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    )
}
