//! Parallel bulk export.
//!
//! Reads serialize on the package lock; decoding and writing run
//! concurrently on a dedicated rayon pool. A failed asset is logged and
//! counted without stopping the others.

use std::io::{Read, Seek};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rayon::prelude::*;
use revault_motion::BoneRegistry;
use revault_pak::PakArchive;

use crate::{attach_materials, decode, Asset, AssetRecord, Result};

/// Settings for [`export_assets`].
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Worker count.
    pub threads: usize,
    /// Applied to decoded meshes and animations.
    pub scale: f32,
    /// Decode assets of known kinds before handing them to the sink.
    pub decode: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            threads: std::thread::available_parallelism().map_or(1, |n| n.get()),
            scale: 1.0,
            decode: false,
        }
    }
}

/// Receives each exported asset. Called from worker threads.
pub trait AssetSink: Sync {
    /// Store one asset. `asset` is set only when decoding was requested and
    /// the kind has a decoder.
    fn write(&self, record: &AssetRecord, data: &[u8], asset: Option<&Asset>) -> Result<()>;

    /// Called after every attempted asset, whether it succeeded or not.
    fn progress(&self, _done: usize, _total: usize) {}
}

/// Outcome counts of an export run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportStats {
    pub exported: usize,
    pub failed: usize,
    /// Assets never attempted because the run was cancelled.
    pub skipped: usize,
}

/// Export `jobs` through `sink` on a pool of `options.threads` workers.
///
/// `cancel` is checked before each asset; setting it lets in-flight assets
/// finish and skips the rest. Only creating the pool can fail.
pub fn export_assets<R, S>(
    archive: &PakArchive<R>,
    jobs: &[AssetRecord],
    sink: &S,
    options: &ExportOptions,
    cancel: &AtomicBool,
) -> Result<ExportStats>
where
    R: Read + Seek + Send,
    S: AssetSink,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.threads.max(1))
        .build()?;

    let exported = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    let done = AtomicUsize::new(0);

    pool.install(|| {
        jobs.par_iter().for_each(|record| {
            if cancel.load(Ordering::Relaxed) {
                return;
            }

            match export_one(archive, record, sink, options) {
                Ok(()) => {
                    exported.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    tracing::error!("failed to export {}: {}", record.name, e);
                    failed.fetch_add(1, Ordering::Relaxed);
                }
            }

            let done = done.fetch_add(1, Ordering::Relaxed) + 1;
            sink.progress(done, jobs.len());
        });
    });

    let exported = exported.into_inner();
    let failed = failed.into_inner();
    let stats = ExportStats {
        exported,
        failed,
        skipped: jobs.len() - exported - failed,
    };

    tracing::info!(
        "exported {} assets ({} failed, {} skipped)",
        stats.exported,
        stats.failed,
        stats.skipped
    );
    Ok(stats)
}

fn export_one<R, S>(
    archive: &PakArchive<R>,
    record: &AssetRecord,
    sink: &S,
    options: &ExportOptions,
) -> Result<()>
where
    R: Read + Seek,
    S: AssetSink,
{
    let data = archive.read(&record.entry)?;

    let asset = if options.decode && record.kind.is_decodable() {
        let mut asset = decode(record.kind, &data, &mut BoneRegistry::new())?;
        if let Asset::Mesh(file) = &mut asset {
            attach_materials(archive, &record.name, file);
        }
        if options.scale != 1.0 {
            asset.scale(options.scale);
        }
        Some(asset)
    } else {
        None
    };

    sink.write(record, &data, asset.as_ref())
}
