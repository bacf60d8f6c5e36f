#![allow(clippy::let_and_return)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]

//! Filesystem-backed implementations of `mediadup_core`'s provider traits:
//! recursive directory discovery ([`discover`]), EXIF metadata extraction
//! ([`metadata`]), adaptive video-frame sampling and perceptual hashing
//! ([`frames`], built on `mediadup_ffmpeg` and `mediadup_imgops`), and
//! chunked content hashing ([`filestats`]). `mediadup_app` wires these
//! behind `mediadup_cache`'s [`mediadup_core::provider::FileInfoCache`] and
//! drives them concurrently; nothing in this crate blocks on more than one
//! file's I/O at a time.

pub mod discover;
pub mod filestats;
pub mod frames;
pub mod metadata;

pub use discover::FsDiscoverer;
pub use filestats::Blake3FileStats;
pub use frames::FfmpegFrameExtractor;
pub use metadata::ExifMetadataExtractor;
