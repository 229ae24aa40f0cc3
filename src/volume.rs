//! This module defines the interface to volume decoding back ends, as
//! well as a raw reference implementation.
//!
//! A back end is handed a [`DecoderConfig`] derived from a resolved layout
//! and asked to [`materialize`] the voxels. The crate itself never
//! interprets voxel values: [`RawVolumeReader`] only loads the bytes the
//! layout covers.
//!
//! Decoders may keep state between calls to make repeated updates cheap
//! while the user tweaks parameters. [`LivePreview`] owns one decoder
//! handle and replaces it with a fresh one whenever a new file is
//! selected, so that previously materialized volumes are never
//! overwritten.
//!
//! [`DecoderConfig`]: ./struct.DecoderConfig.html
//! [`materialize`]: ./trait.VolumeDecoder.html#tymethod.materialize
//! [`RawVolumeReader`]: ./struct.RawVolumeReader.html
//! [`LivePreview`]: ./struct.LivePreview.html

use crate::error::{RawGuessError, Result};
use crate::layout::{resolve_file, LayoutRequest, ResolvedLayout};
use crate::typedef::ScalarType;
use byteordered::Endianness;
use std::convert::TryFrom;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Order in which the rows of a slice are stored in the file.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum RowOrder {
    /// The first row in the file is the bottom row of the image. This is
    /// how NRRD readers lay out the data.
    BottomUp,
    /// The first row in the file is the top row of the image.
    TopDown,
}

impl Default for RowOrder {
    fn default() -> Self {
        RowOrder::BottomUp
    }
}

/// Everything a decoding back end needs to read the voxels of a layout.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoderConfig {
    /// Raw data file
    pub path: PathBuf,
    /// Voxel counts `[x, y, z]`, with z clamped to the available slices
    pub extent: [u32; 3],
    /// Byte order of multi-byte components
    pub byte_order: Endianness,
    /// Type of each component
    pub scalar_type: ScalarType,
    /// Components per voxel
    pub component_count: u64,
    /// Bytes to skip before the first voxel
    pub header_offset_bytes: u64,
    /// Row order of the slices in the file
    pub row_order: RowOrder,
}

impl DecoderConfig {
    /// Derive the decoder configuration of a resolved layout. Rows are
    /// taken as bottom-up, which matches what NRRD readers produce.
    pub fn from_layout(layout: &ResolvedLayout) -> DecoderConfig {
        let request = layout.request();
        let format = request.pixel_format();
        DecoderConfig {
            path: request.path().to_path_buf(),
            extent: layout.extent(),
            byte_order: request.endianness(),
            scalar_type: format.component_type(),
            component_count: format.component_count(),
            header_offset_bytes: layout.total_header_bytes,
            row_order: RowOrder::BottomUp,
        }
    }

    /// Set the row order.
    pub fn with_row_order(mut self, row_order: RowOrder) -> Self {
        self.row_order = row_order;
        self
    }

    /// Bytes of a single row of voxels, saturating at `u64::MAX`.
    pub fn row_bytes(&self) -> u64 {
        u64::from(self.extent[0])
            .saturating_mul(self.component_count)
            .saturating_mul(self.scalar_type.size_of())
    }

    /// Bytes of the whole extent, saturating at `u64::MAX`.
    pub fn data_bytes(&self) -> u64 {
        self.row_bytes()
            .saturating_mul(u64::from(self.extent[1]))
            .saturating_mul(u64::from(self.extent[2]))
    }

    /// Row and total byte counts as buffer lengths.
    fn buffer_lens(&self) -> Result<(usize, usize)> {
        let too_large = || RawGuessError::InvalidParameter("extent", format!("{:?}", self.extent));
        let row = u64::from(self.extent[0])
            .checked_mul(self.component_count)
            .and_then(|n| n.checked_mul(self.scalar_type.size_of()))
            .ok_or_else(too_large)?;
        let total = row
            .checked_mul(u64::from(self.extent[1]))
            .and_then(|n| n.checked_mul(u64::from(self.extent[2])))
            .ok_or_else(too_large)?;
        let row = usize::try_from(row).map_err(|_| too_large())?;
        let total = usize::try_from(total).map_err(|_| too_large())?;
        Ok((row, total))
    }
}

/// Capability interface of a volume decoding back end.
pub trait VolumeDecoder {
    /// Handle to the materialized voxels.
    type Buffer;

    /// Prepare the decoder for reading with the given configuration.
    fn configure(&mut self, config: &DecoderConfig) -> Result<()>;

    /// Read the voxels described by the last configuration.
    ///
    /// # Errors
    ///
    /// - `RawGuessError::NotConfigured` if `configure` was never called.
    fn materialize(&mut self) -> Result<Self::Buffer>;
}

/// Raw voxel bytes of a volume, rows bottom-up, without any value
/// conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct RawVolume {
    config: DecoderConfig,
    data: Vec<u8>,
}

impl RawVolume {
    /// The configuration the volume was read with.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Volume extent `[x, y, z]`.
    pub fn extent(&self) -> [u32; 3] {
        self.config.extent
    }

    /// The raw voxel bytes.
    pub fn raw_data(&self) -> &[u8] {
        &self.data
    }

    /// Move the raw voxel bytes out of the volume.
    pub fn into_raw_data(self) -> Vec<u8> {
        self.data
    }
}

/// Reference decoder which loads the bytes of the first volume of a
/// layout into memory.
#[derive(Debug, Default)]
pub struct RawVolumeReader {
    config: Option<DecoderConfig>,
}

impl RawVolumeReader {
    /// Create a new, unconfigured reader.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current configuration, if any.
    pub fn config(&self) -> Option<&DecoderConfig> {
        self.config.as_ref()
    }
}

impl VolumeDecoder for RawVolumeReader {
    type Buffer = RawVolume;

    fn configure(&mut self, config: &DecoderConfig) -> Result<()> {
        self.config = Some(config.clone());
        Ok(())
    }

    fn materialize(&mut self) -> Result<RawVolume> {
        let config = self.config.clone().ok_or(RawGuessError::NotConfigured)?;
        let path = config.path.as_path();
        let (row_bytes, nbytes) = config.buffer_lens()?;

        let mut data = vec![0u8; nbytes];
        if nbytes > 0 {
            let mut file = BufReader::new(File::open(path).map_err(RawGuessError::file_access(path))?);
            let _ = file
                .seek(SeekFrom::Start(config.header_offset_bytes))
                .map_err(RawGuessError::file_access(path))?;
            file.read_exact(&mut data)
                .map_err(RawGuessError::file_access(path))?;
        }
        if config.row_order == RowOrder::TopDown {
            flip_rows(&mut data, row_bytes, config.extent[1] as usize);
        }

        debug!("Read {} voxel bytes from {}", nbytes, path.display());
        Ok(RawVolume { config, data })
    }
}

/// Reverse the order of the rows of every slice.
fn flip_rows(data: &mut [u8], row_bytes: usize, rows: usize) {
    let slice_bytes = row_bytes * rows;
    if slice_bytes == 0 {
        return;
    }
    for slice in data.chunks_exact_mut(slice_bytes) {
        for r in 0..rows / 2 {
            let (top, bottom) = slice.split_at_mut((rows - 1 - r) * row_bytes);
            top[r * row_bytes..(r + 1) * row_bytes].swap_with_slice(&mut bottom[..row_bytes]);
        }
    }
}

/// A live preview session: re-reads the selected file each time the
/// layout changes, keeping one decoder handle per selected file.
#[derive(Debug, Default)]
pub struct LivePreview<D> {
    path: Option<PathBuf>,
    decoder: D,
    row_order: RowOrder,
}

impl<D> LivePreview<D>
where
    D: VolumeDecoder + Default,
{
    /// Start a session without a selected file.
    pub fn new() -> Self {
        LivePreview {
            path: None,
            decoder: D::default(),
            row_order: RowOrder::default(),
        }
    }

    /// Set the row order of the files read in this session.
    pub fn with_row_order(mut self, row_order: RowOrder) -> Self {
        self.row_order = row_order;
        self
    }

    /// Select a new file. The previous decoder handle is dropped and a
    /// fresh one is created.
    pub fn select_file<P: Into<PathBuf>>(&mut self, path: P) {
        self.path = Some(path.into());
        self.decoder = D::default();
    }

    /// The currently selected file.
    pub fn selected_file(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The current decoder handle.
    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Resolve the request against its file and materialize it. A request
    /// for another file than the selected one selects that file first.
    pub fn update(&mut self, request: &LayoutRequest) -> Result<(ResolvedLayout, D::Buffer)> {
        if self.path.as_deref() != Some(request.path()) {
            self.select_file(request.path());
        }
        let layout = resolve_file(request)?;
        let config = DecoderConfig::from_layout(&layout).with_row_order(self.row_order);
        self.decoder.configure(&config)?;
        let buffer = self.decoder.materialize()?;
        Ok((layout, buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_two_slices() {
        // 2 slices of 3 rows of 2 bytes
        let mut data: Vec<u8> = (0..12).collect();
        flip_rows(&mut data, 2, 3);
        assert_eq!(data, vec![4, 5, 2, 3, 0, 1, 10, 11, 8, 9, 6, 7]);

        let mut data: Vec<u8> = (0..4).collect();
        flip_rows(&mut data, 2, 2);
        assert_eq!(data, vec![2, 3, 0, 1]);

        let mut empty: Vec<u8> = vec![];
        flip_rows(&mut empty, 0, 3);
        assert!(empty.is_empty());
    }

    #[test]
    fn oversized_extent_is_rejected() {
        let config = DecoderConfig {
            path: PathBuf::from("does-not-exist.raw"),
            extent: [u32::MAX; 3],
            byte_order: Endianness::Little,
            scalar_type: ScalarType::Float64,
            component_count: 1,
            header_offset_bytes: 0,
            row_order: RowOrder::TopDown,
        };
        assert_eq!(config.data_bytes(), u64::MAX);

        let mut reader = RawVolumeReader::new();
        reader.configure(&config).unwrap();
        assert!(matches!(
            reader.materialize(),
            Err(RawGuessError::InvalidParameter("extent", _))
        ));
    }

    #[test]
    fn unconfigured_reader() {
        let mut reader = RawVolumeReader::new();
        assert!(reader.config().is_none());
        assert!(matches!(
            reader.materialize(),
            Err(RawGuessError::NotConfigured)
        ));
    }
}
