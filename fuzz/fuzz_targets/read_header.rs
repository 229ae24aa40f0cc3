#![no_main]
use libfuzzer_sys::fuzz_target;
use rawguess::NrrdHeader;

fuzz_target!(|data: &[u8]| {
    if let Ok(header) = NrrdHeader::from_reader(data) {
        let _ = header.dimension();
        let _ = header.data_len();
        let _ = header.data_file_path("fuzz.nhdr");
        if let Ok(text) = header.to_text() {
            let again = NrrdHeader::from_reader(text.as_bytes()).unwrap();
            assert_eq!(again.sizes, header.sizes);
            assert_eq!(again.kinds, header.kinds);
            assert_eq!(again.byte_skip, header.byte_skip);
        }
    }
});
