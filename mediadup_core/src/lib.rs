#![allow(clippy::let_and_return)]
#![allow(clippy::len_without_is_empty)]
#![warn(clippy::cast_lossless)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::todo)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::unimplemented)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::panic)]
#![allow(clippy::doc_markdown)]

//! # Overview
//! `mediadup_core` is a library for finding near-duplicate images and
//! videos within a set of media files. A near-duplicate is a file that
//! closely resembles another perceptually, even though the underlying bytes
//! differ (re-encoding, resizing, transcoding).
//!
//! # High level pipeline
//! 1. Build a [`model::FileInfo`] per discovered file: a perceptual hash
//!    sequence ([`model::MediaInfo`]) plus EXIF [`model::Metadata`] and
//!    [`model::FileStats`]. Producing this is I/O-bound and is therefore the
//!    job of the `mediadup_providers`/`mediadup_cache` crates behind the
//!    [`provider`] traits, not this crate.
//! 2. Feed the resulting [`model::FileInfo`] set into [`pipeline::run_clustering`],
//!    which builds a [`vptree::VpTree`] keyed by [`similarity::media_similarity`],
//!    clusters it with [`dbscan::cluster`], and picks representatives with
//!    [`selector::select_representatives`].
//!
//! # How similarity works
//! Each frame is hashed with [`dct_hasher::DctHasher`]: a separable 2D DCT
//! over a downsized grayscale luminance block, thresholded against the
//! median AC coefficient (via [`quickselect::quickselect`]) rather than a
//! fixed midpoint, so the hash adapts to each frame's own contrast. Still
//! images hash to a single frame; videos hash to a sequence of frames
//! sampled at scene-change points, and are compared with
//! [`similarity::sequence_similarity_dtw`] rather than a single Hamming
//! distance, so that two videos showing the same content at different
//! framerates or cut points still match.
//!
//! # Limitations
//! This is aimed at near-duplicates (re-encodes, resizes, minor edits). It
//! is not a content-recognition system: heavily cropped, rotated, flipped,
//! or watermark-altered media will generally not match.

pub mod dbscan;
pub mod dct_hasher;
pub mod disjoint_set;
pub mod error;
pub mod hash_ops;
pub mod hex;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod quickselect;
pub mod selector;
pub mod similarity;
pub mod vptree;

pub use error::{Error, ErrorContext, Result};
pub use model::{Cluster, DeduplicationResult, FileInfo, FileStats, FrameInfo, MediaInfo, Metadata};
pub use pipeline::{run_clustering, ClusterConfig};
pub use similarity::ThresholdConfig;
