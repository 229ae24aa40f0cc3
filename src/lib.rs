//! Guess the layout of raw voxel data files and describe them with NRRD
//! detached headers.
//!
//! A raw file is just bytes: nothing says what type its voxels have, how
//! many there are along each axis, or where they start. This crate checks
//! a guess ([`LayoutRequest`]) against the size of the file, clamping the
//! number of slices and volumes to what the file can actually hold
//! ([`resolve`]), and writes a `.nhdr` file next to it ([`generate_sidecar`])
//! so that any NRRD reader can load the data as is.
//!
//! # Example
//!
//! ```no_run
//! use rawguess::{generate_sidecar, resolve_file, Endianness, LayoutRequest, PixelFormat};
//!
//! let request = LayoutRequest::builder("scan.raw")
//!     .pixel_format(PixelFormat::Int16)
//!     .endianness(Endianness::Big)
//!     .size(512, 512, 120)
//!     .header_size(2048)
//!     .spacing(0.7, 0.7, 1.25)
//!     .build()?;
//! let layout = resolve_file(&request)?;
//! if layout.is_clamped() {
//!     println!("only {} slices available", layout.effective_size_z);
//! }
//! let header_path = generate_sidecar(&layout)?;
//! # Ok::<(), rawguess::RawGuessError>(())
//! ```
//!
//! [`LayoutRequest`]: ./layout/struct.LayoutRequest.html
//! [`resolve`]: ./layout/fn.resolve.html
//! [`generate_sidecar`]: ./writer/fn.generate_sidecar.html
#![deny(missing_debug_implementations)]
#![warn(missing_docs, unused_extern_crates, trivial_casts, unused_results)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate num_derive;
#[macro_use]
extern crate quick_error;

#[cfg(feature = "nalgebra_affine")]
pub mod affine;
pub mod error;
pub mod header;
pub mod layout;
pub mod settings;
pub mod typedef;
mod util;
pub mod volume;
pub mod writer;

pub use byteordered::Endianness;
pub use error::{RawGuessError, Result};
pub use header::{Kind, NrrdHeader};
pub use layout::{file_len, resolve, resolve_file, LayoutRequest, LayoutRequestBuilder, ResolvedLayout};
pub use settings::{load_request, save_request, SettingsStore};
pub use typedef::{PixelFormat, ScalarType, PIXEL_FORMATS};
pub use util::{
    endianness_from_label, endianness_label, hex_dump, peek_bytes, sidecar_path, BIG_ENDIAN_LABEL,
    LITTLE_ENDIAN_LABEL,
};
pub use volume::{DecoderConfig, LivePreview, RawVolume, RawVolumeReader, RowOrder, VolumeDecoder};
pub use writer::{generate_sidecar, write_layout, WriterOptions};
