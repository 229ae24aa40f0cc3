//! Layout requests and their resolution against the size of a raw file.
//!
//! A [`LayoutRequest`] is a hypothesis about how the voxels of a raw file
//! are laid out. [`resolve`] confronts it with the number of bytes the file
//! actually has and produces a [`ResolvedLayout`], in which the number of
//! slices and volumes is clamped to what the file can supply. Asking for
//! more data than exists is never an error: a wrong guess yields a
//! truncated (possibly empty) layout instead.
//!
//! # Example
//!
//! ```
//! use rawguess::{resolve, LayoutRequest, PixelFormat};
//!
//! let request = LayoutRequest::builder("ct.raw")
//!     .pixel_format(PixelFormat::UInt8)
//!     .size(256, 256, 10)
//!     .build()?;
//! // one byte short of ten full slices
//! let layout = resolve(&request, 256 * 256 * 10 - 1);
//! assert_eq!(layout.effective_size_z, 9);
//! assert_eq!(layout.effective_number_of_volumes, 1);
//! # Ok::<(), rawguess::RawGuessError>(())
//! ```
//!
//! [`LayoutRequest`]: ./struct.LayoutRequest.html
//! [`ResolvedLayout`]: ./struct.ResolvedLayout.html
//! [`resolve`]: ./fn.resolve.html

use crate::error::{RawGuessError, Result};
use crate::typedef::PixelFormat;
use byteordered::Endianness;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The user's hypothesis about the layout of a raw data file.
///
/// Values of this type are always valid: all sizes and spacings are
/// strictly positive. Use [`LayoutRequest::builder`] to make one.
///
/// [`LayoutRequest::builder`]: #method.builder
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutRequest {
    path: PathBuf,
    pixel_format: PixelFormat,
    endianness: Endianness,
    size: [u32; 3],
    header_size: u64,
    skip_slices: u64,
    spacing: [f64; 3],
    number_of_volumes: u32,
}

impl LayoutRequest {
    /// Start building a request for the given raw data file.
    pub fn builder<P: Into<PathBuf>>(path: P) -> LayoutRequestBuilder {
        LayoutRequestBuilder::new(path)
    }

    /// Path to the raw data file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Voxel type hypothesis.
    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    /// Byte order of multi-byte components.
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Requested voxel counts per volume, as `[x, y, z]`.
    pub fn size(&self) -> [u32; 3] {
        self.size
    }

    /// Bytes to skip at the start of the file.
    pub fn header_size(&self) -> u64 {
        self.header_size
    }

    /// Whole slices to discard after the header.
    pub fn skip_slices(&self) -> u64 {
        self.skip_slices
    }

    /// Physical size of a voxel along each axis, as `[x, y, z]`.
    pub fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    /// Requested number of volumes (time points).
    pub fn number_of_volumes(&self) -> u32 {
        self.number_of_volumes
    }

    /// Size of one slice in bytes.
    pub fn slice_size_bytes(&self) -> u64 {
        u64::from(self.size[0])
            .saturating_mul(u64::from(self.size[1]))
            .saturating_mul(self.pixel_format.bytes_per_voxel())
    }

    /// Bytes preceding the first voxel: the header plus skipped slices.
    pub fn total_header_bytes(&self) -> u64 {
        self.header_size
            .saturating_add(self.skip_slices.saturating_mul(self.slice_size_bytes()))
    }
}

/// Builder for a [`LayoutRequest`]. Fields left untouched keep the
/// defaults of a fresh session: 200×200×1 unsigned 8-bit voxels in little
/// endian, unit spacing, no header and a single volume.
///
/// [`LayoutRequest`]: ./struct.LayoutRequest.html
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutRequestBuilder {
    path: PathBuf,
    pixel_format: PixelFormat,
    endianness: Endianness,
    size: [u32; 3],
    header_size: u64,
    skip_slices: u64,
    spacing: [f64; 3],
    number_of_volumes: u32,
}

impl LayoutRequestBuilder {
    /// Create a builder with the default layout for the given file.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        LayoutRequestBuilder {
            path: path.into(),
            pixel_format: PixelFormat::UInt8,
            endianness: Endianness::Little,
            size: [200, 200, 1],
            header_size: 0,
            skip_slices: 0,
            spacing: [1.0; 3],
            number_of_volumes: 1,
        }
    }

    /// Set the voxel type.
    pub fn pixel_format(mut self, pixel_format: PixelFormat) -> Self {
        self.pixel_format = pixel_format;
        self
    }

    /// Set the byte order of multi-byte components.
    pub fn endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    /// Set the number of voxels along each axis of a volume.
    pub fn size(mut self, x: u32, y: u32, z: u32) -> Self {
        self.size = [x, y, z];
        self
    }

    /// Set the number of bytes before the first voxel.
    pub fn header_size(mut self, header_size: u64) -> Self {
        self.header_size = header_size;
        self
    }

    /// Set the number of whole slices to discard after the header.
    pub fn skip_slices(mut self, skip_slices: u64) -> Self {
        self.skip_slices = skip_slices;
        self
    }

    /// Set the physical voxel size along each axis.
    pub fn spacing(mut self, x: f64, y: f64, z: f64) -> Self {
        self.spacing = [x, y, z];
        self
    }

    /// Set the number of volumes stored one after the other.
    pub fn number_of_volumes(mut self, number_of_volumes: u32) -> Self {
        self.number_of_volumes = number_of_volumes;
        self
    }

    /// Validate the parameters and make the request.
    ///
    /// # Errors
    ///
    /// - `RawGuessError::InvalidParameter` if a size or the number of
    ///   volumes is zero, or if a spacing is not a positive finite number.
    pub fn build(self) -> Result<LayoutRequest> {
        const SIZE_NAMES: [&str; 3] = ["size x", "size y", "size z"];
        const SPACING_NAMES: [&str; 3] = ["spacing x", "spacing y", "spacing z"];

        for (name, &s) in SIZE_NAMES.iter().zip(&self.size) {
            if s == 0 {
                return Err(RawGuessError::InvalidParameter(*name, s.to_string()));
            }
        }
        for (name, &s) in SPACING_NAMES.iter().zip(&self.spacing) {
            if !(s.is_finite() && s > 0.) {
                return Err(RawGuessError::InvalidParameter(*name, s.to_string()));
            }
        }
        if self.number_of_volumes == 0 {
            return Err(RawGuessError::InvalidParameter(
                "number of volumes",
                self.number_of_volumes.to_string(),
            ));
        }

        Ok(LayoutRequest {
            path: self.path,
            pixel_format: self.pixel_format,
            endianness: self.endianness,
            size: self.size,
            header_size: self.header_size,
            skip_slices: self.skip_slices,
            spacing: self.spacing,
            number_of_volumes: self.number_of_volumes,
        })
    }
}

/// A layout request confronted with the actual length of the file.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLayout {
    request: LayoutRequest,
    /// Bytes per slice (`x * y * bytes per voxel`).
    pub slice_size_bytes: u64,
    /// Bytes before the first voxel, skipped slices included.
    pub total_header_bytes: u64,
    /// Bytes available for voxel data after the header.
    pub voxel_data_bytes: u64,
    /// Number of slices per volume the file can supply, at most the
    /// requested size in z.
    pub effective_size_z: u32,
    /// Number of complete volumes the file can supply, at most the
    /// requested number of volumes.
    pub effective_number_of_volumes: u32,
}

/// Resolve a layout request against a file of `file_len` bytes.
///
/// This never fails: when the file is too short the number of slices and
/// volumes is reduced, down to zero if not even one slice fits after the
/// header.
pub fn resolve(request: &LayoutRequest, file_len: u64) -> ResolvedLayout {
    let slice_size_bytes = request.slice_size_bytes();
    let total_header_bytes = request.total_header_bytes();
    let voxel_data_bytes = file_len.saturating_sub(total_header_bytes);

    // slice size is never zero for a valid request
    let max_slices = voxel_data_bytes / slice_size_bytes;
    let effective_size_z = clamp_to(request.size[2], max_slices);
    let max_volumes = if effective_size_z > 0 {
        voxel_data_bytes / slice_size_bytes / u64::from(effective_size_z)
    } else {
        0
    };
    let effective_number_of_volumes = clamp_to(request.number_of_volumes, max_volumes);

    debug!(
        "{}: {} bytes, slice {} bytes, header {} bytes, {}/{} slices, {}/{} volumes",
        request.path.display(),
        file_len,
        slice_size_bytes,
        total_header_bytes,
        effective_size_z,
        request.size[2],
        effective_number_of_volumes,
        request.number_of_volumes,
    );

    ResolvedLayout {
        request: request.clone(),
        slice_size_bytes,
        total_header_bytes,
        voxel_data_bytes,
        effective_size_z,
        effective_number_of_volumes,
    }
}

/// Resolve a layout request against the file it refers to.
///
/// # Errors
///
/// - `RawGuessError::FileAccess` if the file cannot be inspected or is
///   not a regular file.
pub fn resolve_file(request: &LayoutRequest) -> Result<ResolvedLayout> {
    let file_len = file_len(request.path())?;
    Ok(resolve(request, file_len))
}

/// Obtain the length of a regular file.
pub fn file_len<P: AsRef<Path>>(path: P) -> Result<u64> {
    let path = path.as_ref();
    let meta = fs::metadata(path).map_err(RawGuessError::file_access(path))?;
    if !meta.is_file() {
        return Err(RawGuessError::FileAccess(
            path.to_path_buf(),
            io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
        ));
    }
    Ok(meta.len())
}

fn clamp_to(requested: u32, available: u64) -> u32 {
    if u64::from(requested) <= available {
        requested
    } else {
        // available < requested, so it fits
        available as u32
    }
}

impl ResolvedLayout {
    /// The request this layout was resolved from.
    pub fn request(&self) -> &LayoutRequest {
        &self.request
    }

    /// Whether the file cannot supply a single slice.
    pub fn is_empty(&self) -> bool {
        self.effective_size_z == 0
    }

    /// Whether the layout spans more than one volume.
    pub fn is_sequence(&self) -> bool {
        self.effective_number_of_volumes > 1
    }

    /// Whether anything was cut from the request.
    pub fn is_clamped(&self) -> bool {
        self.effective_size_z < self.request.size[2]
            || self.effective_number_of_volumes < self.request.number_of_volumes
    }

    /// Voxel counts of one volume as they will be read: `[x, y, effective z]`.
    pub fn extent(&self) -> [u32; 3] {
        [self.request.size[0], self.request.size[1], self.effective_size_z]
    }

    /// Bytes of the file covered by voxel data of all effective volumes.
    pub fn used_bytes(&self) -> u64 {
        self.slice_size_bytes
            * u64::from(self.effective_size_z)
            * u64::from(self.effective_number_of_volumes.max(1))
    }

    /// Voxel index to RAS transform, assuming the file is stored in LPS
    /// orientation: the first two axes are flipped.
    pub fn ijk_to_ras(&self) -> [[f64; 4]; 4] {
        let [sx, sy, sz] = self.request.spacing;
        [
            [-sx, 0., 0., 0.],
            [0., -sy, 0., 0.],
            [0., 0., sz, 0.],
            [0., 0., 0., 1.],
        ]
    }
}
