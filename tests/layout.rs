mod util;

use pretty_assertions::assert_eq;
use rawguess::{resolve, resolve_file, PixelFormat, RawGuessError, PIXEL_FORMATS};
use tempfile::tempdir;

use util::{ct_request, small_request, write_raw_file};

const CT_LEN: usize = 256 * 256 * 10;

#[test]
fn exact_file_is_not_clamped() {
    let dir = tempdir().unwrap();
    let path = write_raw_file(dir.path(), "ct.raw", CT_LEN);
    let layout = resolve_file(&ct_request(&path).build().unwrap()).unwrap();

    assert_eq!(layout.slice_size_bytes, 65536);
    assert_eq!(layout.total_header_bytes, 0);
    assert_eq!(layout.voxel_data_bytes, CT_LEN as u64);
    assert_eq!(layout.effective_size_z, 10);
    assert_eq!(layout.effective_number_of_volumes, 1);
    assert!(!layout.is_clamped());
    assert!(!layout.is_sequence());
}

#[test]
fn one_byte_short_loses_a_slice() {
    let dir = tempdir().unwrap();
    let path = write_raw_file(dir.path(), "ct.raw", CT_LEN - 1);
    let layout = resolve_file(&ct_request(&path).build().unwrap()).unwrap();

    assert_eq!(layout.effective_size_z, 9);
    assert_eq!(layout.effective_number_of_volumes, 1);
    assert!(layout.is_clamped());
}

#[test]
fn volumes_are_clamped_to_complete_ones() {
    // 5 volumes of 4 slices requested, 2 volumes and a half present
    let request = small_request(PixelFormat::Int16, [8, 8, 4], 0, 0, 5);
    let layout = resolve(&request, 128 * 4 * 2 + 128 * 2);
    assert_eq!(layout.effective_size_z, 4);
    assert_eq!(layout.effective_number_of_volumes, 2);
    assert!(layout.is_sequence());
}

#[test]
fn too_short_for_one_slice() {
    let request = small_request(PixelFormat::Float32, [16, 16, 3], 100, 1, 2);
    let header = request.total_header_bytes();
    assert_eq!(header, 100 + 1024);

    for len in &[0, 50, header - 1, header, header + 1023] {
        let layout = resolve(&request, *len);
        assert_eq!(layout.effective_size_z, 0, "file length {}", len);
        assert_eq!(layout.effective_number_of_volumes, 0, "file length {}", len);
        assert!(layout.is_empty());
    }
    assert_eq!(resolve(&request, header + 1024).effective_size_z, 1);
}

#[test]
fn boundaries() {
    for format in PIXEL_FORMATS.iter() {
        let request = small_request(*format, [5, 3, 4], 7, 2, 3);
        let header = request.total_header_bytes();
        let slice = request.slice_size_bytes();

        let at_header = resolve(&request, header);
        assert_eq!(at_header.effective_size_z, 0);

        let exact = resolve(&request, header + slice * 4 * 3);
        assert_eq!(exact.effective_size_z, 4);
        assert_eq!(exact.effective_number_of_volumes, 3);
        assert!(!exact.is_clamped());
        assert_eq!(exact.used_bytes(), exact.voxel_data_bytes);
    }
}

#[test]
fn resolution_is_bounded_monotonic_and_pure() {
    let requests = [
        small_request(PixelFormat::UInt8, [3, 2, 5], 0, 0, 1),
        small_request(PixelFormat::Rgb24, [3, 2, 5], 10, 0, 4),
        small_request(PixelFormat::Float64, [2, 2, 3], 3, 2, 2),
        small_request(PixelFormat::UInt16, [1, 1, 7], 1, 5, 3),
    ];
    for request in requests.iter() {
        let mut previous = resolve(request, 0);
        for len in 0..1200u64 {
            let layout = resolve(request, len);
            assert!(layout.effective_size_z <= request.size()[2]);
            assert!(layout.effective_number_of_volumes <= request.number_of_volumes());
            assert!(layout.effective_size_z >= previous.effective_size_z);
            assert!(layout.effective_number_of_volumes >= previous.effective_number_of_volumes);
            assert_eq!(layout, resolve(request, len));
            previous = layout;
        }
    }
}

#[test]
fn single_slice_never_counts_volumes_past_request() {
    let request = small_request(PixelFormat::UInt8, [2, 2, 1], 0, 0, 1);
    let layout = resolve(&request, 4 * 50);
    assert_eq!(layout.effective_size_z, 1);
    assert_eq!(layout.effective_number_of_volumes, 1);
    assert!(!layout.is_sequence());
}

#[test]
fn missing_file_is_an_access_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nothing.raw");
    match resolve_file(&ct_request(&path).build().unwrap()) {
        Err(RawGuessError::FileAccess(p, _)) => assert_eq!(p, path),
        other => panic!("unexpected result {:?}", other),
    }
    // a directory is not a data file either
    assert!(matches!(
        resolve_file(&ct_request(dir.path()).build().unwrap()),
        Err(RawGuessError::FileAccess(..))
    ));
}
