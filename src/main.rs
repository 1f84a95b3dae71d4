//! Revault CLI - Command-line tool for RE Engine package extraction.
//!
//! This is the main entry point for the Revault command-line application.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glob::{MatchOptions, Pattern};
use indicatif::{ProgressBar, ProgressStyle};

use revault::prelude::*;

/// Revault - RE Engine package extraction tool
#[derive(Parser)]
#[command(name = "revault")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the entries of a package
    List {
        /// Path to the package file
        #[arg(short, long, env = "REVAULT_PAK")]
        pak: PathBuf,

        /// Directory of name cache files
        #[arg(short, long, env = "REVAULT_CACHE_DIR")]
        cache_dir: Option<PathBuf>,

        /// Filter pattern (glob-style, case-insensitive)
        #[arg(short, long)]
        filter: Option<String>,

        /// Include entries the name cache does not know
        #[arg(short, long)]
        all: bool,

        /// Show kind, hash and sizes
        #[arg(short, long)]
        detailed: bool,
    },

    /// Extract entries from a package
    Extract {
        /// Path to the package file
        #[arg(short, long, env = "REVAULT_PAK")]
        pak: PathBuf,

        /// Directory of name cache files
        #[arg(short, long, env = "REVAULT_CACHE_DIR")]
        cache_dir: Option<PathBuf>,

        /// Output directory
        #[arg(short, long, env = "REVAULT_OUTPUT")]
        output: PathBuf,

        /// Filter pattern (glob-style, case-insensitive)
        #[arg(short, long)]
        filter: Option<String>,

        /// Also write decoded meshes, motions and materials as JSON
        #[arg(long)]
        decode: bool,

        /// Scale applied to decoded meshes and motions
        #[arg(long, default_value_t = 1.0)]
        scale: f32,

        /// Worker threads (defaults to available parallelism)
        #[arg(short, long)]
        threads: Option<usize>,
    },

    /// Decode one asset and print a summary
    Inspect {
        /// Path to the package file
        #[arg(short, long, env = "REVAULT_PAK")]
        pak: PathBuf,

        /// Directory of name cache files
        #[arg(short, long, env = "REVAULT_CACHE_DIR")]
        cache_dir: Option<PathBuf>,

        /// Asset path, or `asset_<hash>` for an unnamed entry
        name: String,

        /// Print the decoded asset as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List {
            pak,
            cache_dir,
            filter,
            all,
            detailed,
        } => {
            cmd_list(&pak, cache_dir.as_deref(), filter.as_deref(), all, detailed)?;
        }
        Commands::Extract {
            pak,
            cache_dir,
            output,
            filter,
            decode,
            scale,
            threads,
        } => {
            let mut options = ExportOptions {
                scale,
                decode,
                ..Default::default()
            };
            if let Some(threads) = threads {
                options.threads = threads;
            }
            cmd_extract(&pak, cache_dir.as_deref(), &output, filter.as_deref(), &options)?;
        }
        Commands::Inspect {
            pak,
            cache_dir,
            name,
            json,
        } => {
            cmd_inspect(&pak, cache_dir.as_deref(), &name, json)?;
        }
    }

    Ok(())
}

fn open(pak: &Path, cache_dir: Option<&Path>) -> Result<(PakArchive, NameCache)> {
    let start = Instant::now();
    let archive = PakArchive::open(pak)
        .with_context(|| format!("Failed to open package {}", pak.display()))?;

    let cache = cache_dir.map(NameCache::load_directory).unwrap_or_default();
    tracing::info!(
        "loaded {} entries and {} names in {:?}",
        archive.entry_count(),
        cache.len(),
        start.elapsed()
    );

    Ok((archive, cache))
}

/// Named records matching `filter`.
fn select(records: Vec<AssetRecord>, filter: Option<&str>, all: bool) -> Result<Vec<AssetRecord>> {
    let pattern = filter
        .map(Pattern::new)
        .transpose()
        .context("Invalid filter pattern")?;
    let options = MatchOptions {
        case_sensitive: false,
        ..Default::default()
    };

    Ok(records
        .into_iter()
        .filter(|r| all || r.is_named())
        .filter(|r| {
            pattern
                .as_ref()
                .map_or(true, |p| p.matches_with(&r.name, options))
        })
        .collect())
}

fn cmd_list(
    pak: &Path,
    cache_dir: Option<&Path>,
    filter: Option<&str>,
    all: bool,
    detailed: bool,
) -> Result<()> {
    let (archive, cache) = open(pak, cache_dir)?;
    let records = select(catalog(&archive, &cache), filter, all)?;

    for record in &records {
        if detailed {
            let stored = record.entry.compressed_size;
            let size = record.entry.decompressed_size;
            println!(
                "{:<10} {:08x} {:>12} {:>12} {}",
                format!("{:?}", record.kind),
                record.hash,
                stored,
                size,
                record.name
            );
        } else {
            println!("{}", record.name);
        }
    }

    println!("\nTotal: {} entries", records.len());

    Ok(())
}

/// Writes raw payloads, and decoded assets as JSON, under a directory.
struct DirectorySink {
    output: PathBuf,
    progress: ProgressBar,
}

impl DirectorySink {
    /// Entry names are archive-relative; anything that would climb out of
    /// the output directory is dropped.
    fn path_for(&self, name: &str) -> PathBuf {
        let name = name.replace('\\', "/");
        let mut path = self.output.clone();
        for component in Path::new(&name).components() {
            if let Component::Normal(part) = component {
                path.push(part);
            }
        }
        path
    }
}

impl AssetSink for DirectorySink {
    fn write(&self, record: &AssetRecord, data: &[u8], asset: Option<&Asset>) -> revault::Result<()> {
        let path = self.path_for(&record.name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, data)?;

        if let Some(asset) = asset {
            let json = serde_json::to_vec_pretty(asset).map_err(std::io::Error::from)?;
            let mut json_path = path.into_os_string();
            json_path.push(".json");
            fs::write(json_path, json)?;
        }

        Ok(())
    }

    fn progress(&self, done: usize, _total: usize) {
        self.progress.set_position(done as u64);
    }
}

fn cmd_extract(
    pak: &Path,
    cache_dir: Option<&Path>,
    output: &Path,
    filter: Option<&str>,
    options: &ExportOptions,
) -> Result<()> {
    let (archive, cache) = open(pak, cache_dir)?;
    let records = select(catalog(&archive, &cache), filter, true)?;

    println!("Extracting {} entries...", records.len());

    let pb = ProgressBar::new(records.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;

    let sink = DirectorySink {
        output: output.to_path_buf(),
        progress: pb.clone(),
    };

    let start = Instant::now();
    let stats = export_assets(&archive, &records, &sink, options, &AtomicBool::new(false))
        .context("Failed to start export")?;

    pb.finish_with_message("Done");
    println!(
        "Extracted {} entries in {:?} ({} errors)",
        stats.exported,
        start.elapsed(),
        stats.failed
    );

    Ok(())
}

fn find_record(archive: &PakArchive, cache: &NameCache, name: &str) -> Option<AssetRecord> {
    let entry = match name.strip_prefix("asset_") {
        Some(hex) => u32::from_str_radix(hex, 16).ok().and_then(|h| archive.get(h)),
        None => archive.find(name),
    }?;
    Some(AssetRecord::new(*entry, cache))
}

fn cmd_inspect(pak: &Path, cache_dir: Option<&Path>, name: &str, json: bool) -> Result<()> {
    let (archive, cache) = open(pak, cache_dir)?;

    let record = find_record(&archive, &cache, name)
        .with_context(|| format!("No entry named {name}"))?;
    // A path given on the command line classifies the entry even without a cache.
    let kind = match record.kind {
        AssetKind::Unknown => AssetKind::classify(name),
        kind => kind,
    };

    let data = archive.read(&record.entry).context("Failed to read entry")?;
    let mut asset = decode(kind, &data, &mut BoneRegistry::new())
        .with_context(|| format!("Failed to decode {name}"))?;

    if let Asset::Mesh(file) = &mut asset {
        revault::attach_materials(&archive, name, file);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&asset)?);
        return Ok(());
    }

    match &asset {
        Asset::Mesh(file) => print_mesh(&archive, file),
        Asset::Motion(animation) => print_animation(animation),
        Asset::MotionList(list) => {
            println!("Motion list {:?}: {} motions", list.name, list.motions.len());
            for animation in &list.motions {
                print_animation(animation);
            }
        }
        Asset::Material(defs) => {
            for material in defs.iter() {
                print_material(&archive, material);
            }
        }
    }

    Ok(())
}

fn print_mesh(archive: &PakArchive, file: &MeshFile) {
    println!(
        "Mesh ({:?}): {} bones, {} LODs",
        file.version,
        file.skeleton.len(),
        file.lod_count()
    );

    for (lod, model) in file.models.iter().flatten().enumerate() {
        println!(
            "  LOD {}: {} meshes, {} vertices, {} faces",
            lod,
            model.meshes.len(),
            model.vertex_count(),
            model.face_count()
        );
    }

    if let Some(model) = file.primary() {
        for material in &model.materials {
            print_material(archive, material);
        }
    }
}

fn print_animation(animation: &Animation) {
    println!(
        "Motion {:?}: {} frames, {} bones, {} keys",
        animation.name,
        animation.frame_count,
        animation.bones.len(),
        animation.key_count()
    );
}

fn print_material(archive: &PakArchive, material: &Material) {
    println!("Material {:?}", material.name);
    for (slot, path) in &material.textures {
        match resolve_texture(archive, path) {
            Some((resolved, _)) => println!("  {slot}: {resolved}"),
            None => println!("  {slot}: {path} (not in package)"),
        }
    }
    for (name, values) in &material.settings {
        println!("  {name}: {values:?}");
    }
}
