#![allow(clippy::let_and_return)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]

//! Image-buffer plumbing shared by the providers that feed `mediadup_core`:
//! a resolution-agnostic [`Crop`] rectangle, a fast square resize built on
//! it, and the final flattening into the `f64` luminance buffer the DCT
//! hasher consumes.

mod crop;
pub mod luma_input;
pub mod resize_gray;

pub use crop::Crop;
pub use luma_input::frame_to_hash_input;
pub use resize_gray::{crop_resize_buf, resize_frame};
