use anyhow::Result;
use clap::Parser;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use exif_bridge::{config, exiftool, pipeline};

#[derive(Parser, Debug)]
#[command(
    name = "exif-bridge",
    version,
    about = "Batch EXIF/IPTC/XMP metadata reader and writer — drives the exiftool CLI"
)]
struct Cli {
    /// Image files or directories to process
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Path to the exiftool executable (overrides config)
    #[arg(long, value_name = "FILE")]
    exiftool: Option<PathBuf>,

    /// Tags to read, comma separated (default: the config's tag list)
    #[arg(short, long, value_name = "TAGS", value_delimiter = ',')]
    tags: Vec<String>,

    /// Write a tag value, as TAG=VALUE (repeatable)
    #[arg(long, value_name = "TAG=VALUE")]
    set: Vec<String>,

    /// Write a tag value read from a file, as TAG=FILE (repeatable)
    #[arg(long, value_name = "TAG=FILE")]
    set_from: Vec<String>,

    /// Extract embedded thumbnails into this directory
    #[arg(long, value_name = "DIR")]
    thumbnails: Option<PathBuf>,

    /// Write scaled previews into this directory
    #[arg(long, value_name = "DIR")]
    previews: Option<PathBuf>,

    /// Output tag reads as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = config::Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => config::Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    // Load config
    let config = config::Config::load(cli.config.as_deref())?;

    // Validate inputs
    if cli.paths.is_empty() {
        anyhow::bail!("No input files or directories specified. Use --help for usage.");
    }

    // Collect images
    let images = pipeline::collect_images(&cli.paths);
    if images.is_empty() {
        anyhow::bail!("No supported image files found in the specified paths.");
    }
    log::info!("Found {} image(s)", images.len());

    // Handle --previews (codec only, no exiftool needed)
    if let Some(ref dest_dir) = cli.previews {
        std::fs::create_dir_all(dest_dir)?;
        let options = pipeline::PreviewOptions::from(&config.preview);

        for src in &images {
            let stem = src
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "preview".to_string());
            let dest = dest_dir.join(format!("{stem}_preview.{}", options.format));

            match pipeline::write_preview(src, &dest, &options) {
                Ok(()) => log::info!("Preview: {}", dest.display()),
                Err(e) => log::error!("Failed preview for {}: {e:#}", src.display()),
            }
        }
        return Ok(());
    }

    // Everything else drives exiftool
    let tool_path = cli
        .exiftool
        .unwrap_or_else(|| PathBuf::from(&config.tool.path));
    let tool = exiftool::ExifTool::new(&tool_path)?;

    // Handle --thumbnails
    if let Some(ref dest_dir) = cli.thumbnails {
        let written = pipeline::extract_thumbnails(&tool, &images, dest_dir)?;
        log::info!(
            "Extracted {} thumbnail(s) from {} image(s)",
            written.len(),
            images.len()
        );
        return Ok(());
    }

    // Handle --set / --set-from (writes)
    if !cli.set.is_empty() || !cli.set_from.is_empty() {
        if !cli.set.is_empty() {
            let assignments = parse_assignments(&cli.set)?;
            let diagnostics = tool.write_tags(&images, &assignments);
            print!("{diagnostics}");
        }
        if !cli.set_from.is_empty() {
            let sources: BTreeMap<String, PathBuf> = parse_assignments(&cli.set_from)?
                .into_iter()
                .map(|(tag, file)| (tag, PathBuf::from(file)))
                .collect();
            let diagnostics = tool.write_tags_from_datafiles(&images, &sources);
            print!("{diagnostics}");
        }
        return Ok(());
    }

    // Default: batch tag read
    let tags: BTreeSet<String> = if cli.tags.is_empty() {
        config.read.tags.iter().cloned().collect()
    } else {
        cli.tags.iter().cloned().collect()
    };

    let result = tool.read_tags(&images, &tags);

    if cli.json {
        let json: serde_json::Map<String, serde_json::Value> = images
            .iter()
            .filter_map(|file| {
                result.get(file).map(|values| {
                    (
                        file.display().to_string(),
                        serde_json::to_value(values).unwrap_or_default(),
                    )
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        for file in &images {
            let Some(values) = result.get(file) else {
                log::warn!("No metadata block for {}", file.display());
                continue;
            };
            println!("{}:", file.display());
            // BTreeMap for stable display order
            let ordered: BTreeMap<_, _> = values.iter().collect();
            for (tag, value) in ordered {
                println!("  {tag}: {value}");
            }
        }
    }

    Ok(())
}

/// Split repeatable `TAG=VALUE` arguments into a map.
fn parse_assignments(args: &[String]) -> Result<BTreeMap<String, String>> {
    let mut assignments = BTreeMap::new();
    for arg in args {
        let Some((tag, value)) = arg.split_once('=') else {
            anyhow::bail!("malformed assignment {arg:?}, expected TAG=VALUE");
        };
        assignments.insert(tag.to_string(), value.to_string());
    }
    Ok(assignments)
}
