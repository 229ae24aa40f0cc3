//! Utility functions to write NRRD detached headers.
//!
//! Headers are first written to a temporary file next to the destination,
//! which is then renamed over it. A failed write never leaves a partial
//! header behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{RawGuessError, Result};
use crate::header::NrrdHeader;
use crate::layout::ResolvedLayout;
use crate::util::sidecar_path;

/// Options and flags which can be used to configure how a NRRD header is
/// written.
#[derive(Debug, Clone, PartialEq)]
pub struct WriterOptions {
    /// Where to write the header.
    path: PathBuf,
    /// Whether an existing file at `path` may be replaced.
    overwrite: bool,
}

impl WriterOptions {
    /// Write a header to the given path, replacing any existing file.
    pub fn new<P>(path: P) -> WriterOptions
    where
        P: AsRef<Path>,
    {
        WriterOptions {
            path: path.as_ref().to_owned(),
            overwrite: true,
        }
    }

    /// Write the header of a layout next to its data file, as
    /// `<name>.nhdr`, or `<name>.seq.nhdr` when the layout spans several
    /// volumes.
    pub fn sidecar_of(layout: &ResolvedLayout) -> WriterOptions {
        WriterOptions::new(sidecar_path(layout.request().path(), layout.is_sequence()))
    }

    /// Whether an existing file may be replaced. When `false`, writing to
    /// an existing path fails with `RawGuessError::FileAccess`.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Destination of the header.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the header.
    ///
    /// # Errors
    ///
    /// - `RawGuessError::UnsupportedFormat` if the header cannot be rendered
    /// - `RawGuessError::FileAccess` if the destination cannot be written;
    ///   the destination is then left as it was
    pub fn write_header(&self, header: &NrrdHeader) -> Result<()> {
        let text = header.to_text()?;
        let path = &self.path;
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let mut file = NamedTempFile::new_in(dir).map_err(RawGuessError::file_access(path))?;
        write_text(&mut file, &text).map_err(RawGuessError::file_access(path))?;
        file.as_file()
            .sync_all()
            .map_err(RawGuessError::file_access(path))?;

        let persisted = if self.overwrite {
            file.persist(path)
        } else {
            file.persist_noclobber(path)
        };
        // the temporary file is deleted when the error is dropped
        let _ = persisted.map_err(|e| RawGuessError::FileAccess(path.clone(), e.error))?;
        Ok(())
    }
}

fn write_text<W: Write>(mut writer: W, text: &str) -> ::std::io::Result<()> {
    writer.write_all(text.as_bytes())?;
    writer.flush()
}

/// Write the NRRD header describing `layout` next to its data file and
/// return the path of the new header.
///
/// # Example
///
/// ```no_run
/// use rawguess::{generate_sidecar, resolve_file, LayoutRequest, PixelFormat};
///
/// let request = LayoutRequest::builder("ct.raw")
///     .pixel_format(PixelFormat::Float32)
///     .size(256, 256, 51)
///     .header_size(361)
///     .build()?;
/// let layout = resolve_file(&request)?;
/// let path = generate_sidecar(&layout)?;
/// assert_eq!(path, std::path::Path::new("ct.nhdr"));
/// # Ok::<(), rawguess::RawGuessError>(())
/// ```
pub fn generate_sidecar(layout: &ResolvedLayout) -> Result<PathBuf> {
    let options = WriterOptions::sidecar_of(layout);
    write_layout(layout, &options)?;
    Ok(options.path)
}

/// Write the NRRD header describing `layout` with the given options.
pub fn write_layout(layout: &ResolvedLayout, options: &WriterOptions) -> Result<()> {
    if layout.is_clamped() {
        let [_, _, z] = layout.request().size();
        warn!(
            "{} only holds {} of {} slices and {} of {} volumes",
            layout.request().path().display(),
            layout.effective_size_z,
            z,
            layout.effective_number_of_volumes,
            layout.request().number_of_volumes(),
        );
    }
    let header = NrrdHeader::from_layout(layout)?;
    options.write_header(&header)?;
    info!("Image header file created at {}", options.path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{resolve, LayoutRequest};
    use std::fs;
    use tempfile::tempdir;

    fn layout_in(dir: &Path, volumes: u32, file_len: u64) -> ResolvedLayout {
        let request = LayoutRequest::builder(dir.join("scan.img"))
            .size(4, 4, 2)
            .number_of_volumes(volumes)
            .build()
            .unwrap();
        resolve(&request, file_len)
    }

    #[test]
    fn sidecar_name_follows_volume_count() {
        let dir = tempdir().unwrap();
        let single = layout_in(dir.path(), 3, 32);
        assert_eq!(
            WriterOptions::sidecar_of(&single).path(),
            dir.path().join("scan.nhdr")
        );
        let sequence = layout_in(dir.path(), 3, 96);
        assert_eq!(
            WriterOptions::sidecar_of(&sequence).path(),
            dir.path().join("scan.seq.nhdr")
        );
    }

    #[test]
    fn replaces_existing_header() {
        let dir = tempdir().unwrap();
        let layout = layout_in(dir.path(), 1, 32);
        let path = dir.path().join("scan.nhdr");
        fs::write(&path, "stale").unwrap();

        assert_eq!(generate_sidecar(&layout).unwrap(), path);
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("NRRD0004\n"));
        assert!(text.ends_with("data file: scan.img\n"));
        // only the header is left in the directory
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn no_clobber_keeps_existing_file() {
        let dir = tempdir().unwrap();
        let layout = layout_in(dir.path(), 1, 32);
        let path = dir.path().join("scan.nhdr");
        fs::write(&path, "keep me").unwrap();

        let options = WriterOptions::new(&path).overwrite(false);
        match write_layout(&layout, &options) {
            Err(RawGuessError::FileAccess(p, _)) => assert_eq!(p, path),
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), "keep me");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn missing_directory_is_reported() {
        let dir = tempdir().unwrap();
        let layout = layout_in(dir.path(), 1, 32);
        let path = dir.path().join("missing").join("scan.nhdr");
        let options = WriterOptions::new(&path);
        assert!(matches!(
            write_layout(&layout, &options),
            Err(RawGuessError::FileAccess(..))
        ));
        assert!(!path.exists());
    }
}
