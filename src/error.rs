//! Types for error handling go here.
use crate::typedef::ScalarType;
use std::io::Error as IOError;
use std::path::PathBuf;

quick_error! {
    /// Error type for all error kinds in this crate.
    #[derive(Debug)]
    pub enum RawGuessError {
        /// The given pixel format label is not one of the known labels.
        InvalidFormat(label: String) {
            display("Unrecognized pixel format `{}`", label)
        }
        /// The scalar type has no representation in the NRRD format.
        UnsupportedFormat(t: ScalarType) {
            display("Scalar type {:?} cannot be described in a NRRD header", t)
        }
        /// A layout parameter is out of its valid range.
        InvalidParameter(name: &'static str, value: String) {
            display("Invalid value for {}: {}", name, value)
        }
        /// A file could not be inspected, read or written.
        FileAccess(path: PathBuf, err: IOError) {
            display("Could not access `{}`: {}", path.display(), err)
            source(err)
        }
        /// The data file has no name that a NRRD header can refer to.
        InvalidDataFile(path: PathBuf) {
            display("Data file `{}` has no UTF-8 file name to write in a NRRD header", path.display())
        }
        /// A NRRD header line could not be understood.
        MalformedHeader(line: usize, reason: String) {
            display("Malformed NRRD header at line {}: {}", line, reason)
        }
        /// A NRRD header lacks a required field.
        MissingField(name: &'static str) {
            display("NRRD header is missing the `{}` field", name)
        }
        /// The volume decoder was used before being configured.
        NotConfigured {
            display("Volume decoder has not been configured")
        }
        /// I/O Error
        Io(err: IOError) {
            from()
            source(err)
            display("I/O error: {}", err)
        }
    }
}

impl RawGuessError {
    /// Wrap an I/O error with the path of the file it happened on.
    pub(crate) fn file_access<P: Into<PathBuf>>(path: P) -> impl FnOnce(IOError) -> Self {
        let path = path.into();
        move |err| RawGuessError::FileAccess(path, err)
    }
}

/// Alias type for results originated from this crate.
pub type Result<T> = ::std::result::Result<T, RawGuessError>;
