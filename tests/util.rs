use std::fs;
use std::path::{Path, PathBuf};

use rawguess::{LayoutRequest, LayoutRequestBuilder, PixelFormat};

/// Write a raw file of `len` bytes, each byte holding its offset modulo 251.
pub fn write_raw_file(dir: &Path, name: &str, len: usize) -> PathBuf {
    let path = dir.join(name);
    let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
    fs::write(&path, data).unwrap();
    path
}

/// 256x256x10 unsigned bytes, no header, one volume.
#[allow(dead_code)]
pub fn ct_request(path: &Path) -> LayoutRequestBuilder {
    LayoutRequest::builder(path)
        .pixel_format(PixelFormat::UInt8)
        .size(256, 256, 10)
        .header_size(0)
        .skip_slices(0)
        .number_of_volumes(1)
}

/// A small request used by the property tests.
#[allow(dead_code)]
pub fn small_request(
    format: PixelFormat,
    size: [u32; 3],
    header: u64,
    skip: u64,
    volumes: u32,
) -> LayoutRequest {
    LayoutRequest::builder("prop.raw")
        .pixel_format(format)
        .size(size[0], size[1], size[2])
        .header_size(header)
        .skip_slices(skip)
        .number_of_volumes(volumes)
        .build()
        .unwrap()
}
