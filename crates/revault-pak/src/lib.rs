//! Package reader for RE Engine game archives.
//!
//! A package is a flat hashed entry table: there are no names on disk, only
//! MurmurHash3 hashes of each asset's path. Payloads are stored raw, as a raw
//! DEFLATE stream, or as a Zstandard frame, selected per entry.
//!
//! # Example
//!
//! ```no_run
//! use revault_pak::PakArchive;
//!
//! let archive = PakArchive::open("re_chunk_000.pak")?;
//!
//! for entry in archive.iter() {
//!     println!("{:08x}: {} bytes", { entry.lower_hash }, { entry.decompressed_size });
//! }
//!
//! // Read a specific file by path
//! if let Some(entry) = archive.find("natives/x64/sectionroot/ui/gui.msg.22") {
//!     let data = archive.read(entry)?;
//! }
//! # Ok::<(), revault_pak::Error>(())
//! ```

mod archive;
mod entry;
mod error;

pub mod decompress;

pub use archive::PakArchive;
pub use entry::{Compression, PakEntry, PakHeader};
pub use error::{Error, Result};
