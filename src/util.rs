//! Private utility module
use crate::error::{RawGuessError, Result};
use byteordered::Endianness;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Label shown for little endian data.
pub const LITTLE_ENDIAN_LABEL: &str = "Little endian";
/// Label shown for big endian data.
pub const BIG_ENDIAN_LABEL: &str = "Big endian";

/// Interpret a user-facing byte order label.
///
/// # Errors
///
/// - `RawGuessError::InvalidParameter` if the label is neither
///   [`LITTLE_ENDIAN_LABEL`] nor [`BIG_ENDIAN_LABEL`].
pub fn endianness_from_label(label: &str) -> Result<Endianness> {
    match label {
        LITTLE_ENDIAN_LABEL => Ok(Endianness::Little),
        BIG_ENDIAN_LABEL => Ok(Endianness::Big),
        _ => Err(RawGuessError::InvalidParameter("endianness", label.to_string())),
    }
}

/// The user-facing label of a byte order.
pub fn endianness_label(e: Endianness) -> &'static str {
    match e {
        Endianness::Little => LITTLE_ENDIAN_LABEL,
        Endianness::Big => BIG_ENDIAN_LABEL,
    }
}

/// The value of the NRRD `endian` field.
pub fn endianness_nrrd_name(e: Endianness) -> &'static str {
    match e {
        Endianness::Little => "little",
        Endianness::Big => "big",
    }
}

/// Derive the path of the detached header for the given raw data file:
/// the extension is replaced with `nhdr`, or with `seq.nhdr` for
/// multi-volume sequences.
///
/// # Example
///
/// ```
/// use rawguess::sidecar_path;
/// use std::path::Path;
///
/// assert_eq!(sidecar_path("scan/ct.raw", false), Path::new("scan/ct.nhdr"));
/// assert_eq!(sidecar_path("scan/ct.raw", true), Path::new("scan/ct.seq.nhdr"));
/// ```
pub fn sidecar_path<P: AsRef<Path>>(data_path: P, sequence: bool) -> PathBuf {
    let ext = if sequence { "seq.nhdr" } else { "nhdr" };
    data_path.as_ref().with_extension(ext)
}

/// Read up to `n` bytes from the start of a file.
pub fn peek_bytes<P: AsRef<Path>>(path: P, n: usize) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(RawGuessError::file_access(path))?;
    let mut buf = Vec::with_capacity(n);
    let _ = file
        .take(n as u64)
        .read_to_end(&mut buf)
        .map_err(RawGuessError::file_access(path))?;
    Ok(buf)
}

/// Format bytes as a classic hex dump, 16 bytes per line, with the
/// offset in front and printable ASCII at the end.
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::new();
    for (i, chunk) in bytes.chunks(16).enumerate() {
        out.push_str(&format!("{:08x} ", i * 16));
        for j in 0..16 {
            match chunk.get(j) {
                Some(b) => out.push_str(&format!(" {:02x}", b)),
                None => out.push_str("   "),
            }
        }
        out.push_str("  |");
        out.extend(chunk.iter().map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '.'
            }
        }));
        out.push_str("|\n");
    }
    out
}

/// Format a floating point value so that it always carries a decimal
/// part, as NRRD readers expect for vectors (`1.0`, not `1`).
pub fn fmt_float(v: f64) -> String {
    format!("{:?}", v)
}

/// Format a 3D vector the way NRRD writes it: `(x, y, z)`.
pub fn fmt_vector(v: &[f64; 3]) -> String {
    format!("({}, {}, {})", fmt_float(v[0]), fmt_float(v[1]), fmt_float(v[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endianness_labels() {
        assert_eq!(endianness_from_label("Little endian").unwrap(), Endianness::Little);
        assert_eq!(endianness_from_label("Big endian").unwrap(), Endianness::Big);
        assert!(matches!(
            endianness_from_label("little"),
            Err(RawGuessError::InvalidParameter("endianness", _))
        ));
        assert_eq!(endianness_label(Endianness::Big), BIG_ENDIAN_LABEL);
        assert_eq!(endianness_nrrd_name(Endianness::Little), "little");
        assert_eq!(endianness_nrrd_name(Endianness::Big), "big");
    }

    #[test]
    fn sidecar_names() {
        assert_eq!(sidecar_path("a/b.img", false), Path::new("a/b.nhdr"));
        assert_eq!(sidecar_path("a/b.img", true), Path::new("a/b.seq.nhdr"));
        assert_eq!(sidecar_path("a/b.tar.gz", false), Path::new("a/b.tar.nhdr"));
        assert_eq!(sidecar_path("a/noext", false), Path::new("a/noext.nhdr"));
    }

    #[test]
    fn floats() {
        assert_eq!(fmt_float(1.), "1.0");
        assert_eq!(fmt_float(0.5), "0.5");
        assert_eq!(fmt_vector(&[2., 0., 0.]), "(2.0, 0.0, 0.0)");
    }

    #[test]
    fn dump() {
        let dump = hex_dump(b"NRRD0004\nABCDEFGHIJ");
        let lines: Vec<_> = dump.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("00000000  4e 52 52 44"));
        assert!(lines[0].ends_with("|NRRD0004.ABCDEFG|"));
        assert!(lines[1].starts_with("00000010  48 49 4a"));
        assert!(lines[1].ends_with("|HIJ|"));
        assert_eq!(hex_dump(&[]), "");
    }
}
