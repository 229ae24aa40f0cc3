//! This module defines the `NrrdHeader` struct, the detached NRRD header
//! which describes how to read a raw data file.
//!
//! A header is always derived from a [`ResolvedLayout`], so the sizes it
//! declares never exceed what the data file holds. It can be rendered
//! with `Display`, written with the [`writer`] module, and read back with
//! [`NrrdHeader::from_reader`].
//!
//! [`ResolvedLayout`]: ../layout/struct.ResolvedLayout.html
//! [`writer`]: ../writer/index.html
//! [`NrrdHeader::from_reader`]: ./struct.NrrdHeader.html#method.from_reader

use crate::error::{RawGuessError, Result};
use crate::layout::ResolvedLayout;
use crate::typedef::ScalarType;
use crate::util::{endianness_nrrd_name, fmt_vector};
use byteordered::Endianness;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Magic line of the NRRD format version written by this crate.
pub const MAGIC_NRRD4: &str = "NRRD0004";

/// Space written in every header. Raw data is assumed to be in LPS.
pub const SPACE_LPS: &str = "left-posterior-superior";

/// Kind of an axis of a NRRD array.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Kind {
    /// A spatial axis.
    Domain,
    /// Interleaved components of a voxel.
    Vector,
    /// Independent samples, such as the volumes of a sequence.
    List,
}

impl Kind {
    /// Name of the kind in a NRRD header.
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Domain => "domain",
            Kind::Vector => "vector",
            Kind::List => "list",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = String;

    fn from_str(s: &str) -> ::std::result::Result<Self, String> {
        match s {
            "domain" => Ok(Kind::Domain),
            "vector" => Ok(Kind::Vector),
            "list" => Ok(Kind::List),
            k => Err(format!("unsupported kind `{}`", k)),
        }
    }
}

/// The NRRD detached header data type.
/// All fields are public and named after the NRRD field they hold.
#[derive(Debug, Clone, PartialEq)]
pub struct NrrdHeader {
    /// `type`: scalar type of each value
    pub scalar_type: ScalarType,
    /// `sizes`: number of samples along each axis, fastest first
    pub sizes: Vec<u64>,
    /// `space`: world space of the directions
    pub space: Option<String>,
    /// `space directions`: one vector per axis, `None` for non spatial axes
    pub space_directions: Vec<Option<[f64; 3]>>,
    /// `kinds`: kind of each axis
    pub kinds: Vec<Kind>,
    /// `endian`: byte order of the data file
    pub endianness: Endianness,
    /// `space origin`: world position of the first voxel
    pub space_origin: Option<[f64; 3]>,
    /// `byte skip`: bytes of the data file to skip before the first value
    pub byte_skip: u64,
    /// `data file`: data file name, relative to the header
    pub data_file: String,
}

impl NrrdHeader {
    /// Describe a resolved layout. The header refers to the data file by
    /// name only, so the two files can be moved together.
    ///
    /// The component axis of multi-component formats comes first, and a
    /// list axis is appended when the layout spans more than one volume.
    ///
    /// # Errors
    ///
    /// - `RawGuessError::UnsupportedFormat` if the component type cannot be
    ///   written in a NRRD header.
    /// - `RawGuessError::InvalidDataFile` if the data file name is missing
    ///   or is not valid UTF-8.
    pub fn from_layout(layout: &ResolvedLayout) -> Result<NrrdHeader> {
        let request = layout.request();
        let format = request.pixel_format();
        let scalar_type = format.component_type();
        // fail early, before anything is built
        let _ = scalar_type.nrrd_name()?;

        let [x, y, _] = request.size();
        let [sx, sy, sz] = request.spacing();
        let mut sizes = vec![u64::from(x), u64::from(y), u64::from(layout.effective_size_z)];
        let mut space_directions = vec![
            Some([sx, 0., 0.]),
            Some([0., sy, 0.]),
            Some([0., 0., sz]),
        ];
        let mut kinds = vec![Kind::Domain; 3];

        if format.component_count() > 1 {
            sizes.insert(0, format.component_count());
            space_directions.insert(0, None);
            kinds.insert(0, Kind::Vector);
        }
        if layout.is_sequence() {
            sizes.push(u64::from(layout.effective_number_of_volumes));
            space_directions.push(None);
            kinds.push(Kind::List);
        }

        let data_file = request
            .path()
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| RawGuessError::InvalidDataFile(request.path().to_path_buf()))?
            .to_string();

        Ok(NrrdHeader {
            scalar_type,
            sizes,
            space: Some(SPACE_LPS.to_string()),
            space_directions,
            kinds,
            endianness: request.endianness(),
            space_origin: Some([0.; 3]),
            byte_skip: layout.total_header_bytes,
            data_file,
        })
    }

    /// Number of axes.
    pub fn dimension(&self) -> usize {
        self.sizes.len()
    }

    /// Size of one value in bytes.
    pub fn value_size(&self) -> u64 {
        self.scalar_type.size_of()
    }

    /// Number of data bytes described, header skip excluded, or `None` if
    /// it does not fit in a `u64`.
    pub fn data_len(&self) -> Option<u64> {
        self.sizes
            .iter()
            .try_fold(self.value_size(), |len, &size| len.checked_mul(size))
    }

    /// Path of the data file, resolved against the directory of the
    /// header at `header_path`.
    pub fn data_file_path<P: AsRef<Path>>(&self, header_path: P) -> PathBuf {
        match header_path.as_ref().parent() {
            Some(dir) => dir.join(&self.data_file),
            None => PathBuf::from(&self.data_file),
        }
    }

    /// Render the header text, one field per line.
    ///
    /// # Errors
    ///
    /// - `RawGuessError::UnsupportedFormat` if the scalar type has no NRRD
    ///   name.
    pub fn to_text(&self) -> Result<String> {
        let type_name = self.scalar_type.nrrd_name()?;
        let mut out = String::new();
        out.push_str(MAGIC_NRRD4);
        out.push('\n');
        out.push_str("# Complete NRRD file format specification at:\n");
        out.push_str("# http://teem.sourceforge.net/nrrd/format.html\n");
        push_field(&mut out, "type", type_name);
        push_field(&mut out, "dimension", &self.dimension().to_string());
        if let Some(space) = &self.space {
            push_field(&mut out, "space", space);
        }
        push_field(&mut out, "sizes", &join(self.sizes.iter()));
        if self.space_directions.iter().any(Option::is_some) {
            let directions = self.space_directions.iter().map(fmt_direction);
            push_field(&mut out, "space directions", &join(directions));
        }
        push_field(&mut out, "kinds", &join(self.kinds.iter()));
        push_field(&mut out, "endian", endianness_nrrd_name(self.endianness));
        push_field(&mut out, "encoding", "raw");
        if let Some(origin) = &self.space_origin {
            push_field(&mut out, "space origin", &fmt_vector(origin));
        }
        // absence of the field means no skip
        if self.byte_skip > 0 {
            push_field(&mut out, "byte skip", &self.byte_skip.to_string());
        }
        push_field(&mut out, "data file", &self.data_file);
        Ok(out)
    }

    /// Read a detached NRRD header from a file in the file system.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<NrrdHeader> {
        let path = path.as_ref();
        let file = File::open(path).map_err(RawGuessError::file_access(path))?;
        NrrdHeader::from_reader(BufReader::new(file))
    }

    /// Read a detached NRRD header from a byte source. Comments and
    /// key/value pairs are skipped, as are fields this crate does not
    /// use.
    ///
    /// # Errors
    ///
    /// - `RawGuessError::MalformedHeader` on a bad magic line, an invalid
    ///   value, or axis fields that disagree with `dimension`
    /// - `RawGuessError::MissingField` when `type`, `dimension`, `sizes`
    ///   or `data file` is absent
    /// - `RawGuessError::UnsupportedFormat` if the encoding is not raw
    pub fn from_reader<R: BufRead>(source: R) -> Result<NrrdHeader> {
        let mut lines = source.lines().enumerate();
        match lines.next() {
            Some((_, line)) => {
                let line = line?;
                if !line.starts_with("NRRD000") {
                    return Err(RawGuessError::MalformedHeader(1, "not a NRRD header".into()));
                }
            }
            None => return Err(RawGuessError::MalformedHeader(1, "empty header".into())),
        }

        let mut fields = RawFields::default();
        for (i, line) in lines {
            let line = line?;
            let number = i + 1;
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                // a blank line ends an attached header
                break;
            }
            if line.starts_with('#') || line.contains(":=") {
                continue;
            }
            let (key, value) = match line.find(": ") {
                Some(pos) => (&line[..pos], line[pos + 2..].trim()),
                None => {
                    return Err(RawGuessError::MalformedHeader(
                        number,
                        format!("expected `field: value`, found `{}`", line),
                    ))
                }
            };
            fields.set(number, key, value)?;
        }
        fields.finish()
    }
}

impl fmt::Display for NrrdHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = self.to_text().map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

fn push_field(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push_str(": ");
    out.push_str(value);
    out.push('\n');
}

fn join<I, T>(items: I) -> String
where
    I: Iterator<Item = T>,
    T: ToString,
{
    items.map(|t| t.to_string()).collect::<Vec<_>>().join(" ")
}

/// Fields as found in the header, before cross-validation.
#[derive(Debug, Default)]
struct RawFields {
    scalar_type: Option<(usize, ScalarType)>,
    dimension: Option<(usize, usize)>,
    space: Option<String>,
    sizes: Option<(usize, Vec<u64>)>,
    space_directions: Option<(usize, Vec<Option<[f64; 3]>>)>,
    kinds: Option<(usize, Vec<Kind>)>,
    endianness: Option<Endianness>,
    space_origin: Option<[f64; 3]>,
    byte_skip: u64,
    data_file: Option<String>,
}

impl RawFields {
    fn set(&mut self, line: usize, key: &str, value: &str) -> Result<()> {
        let malformed = |reason: String| RawGuessError::MalformedHeader(line, reason);
        match key {
            "type" => {
                let t = ScalarType::from_nrrd_name(value)
                    .ok_or_else(|| malformed(format!("unknown type `{}`", value)))?;
                self.scalar_type = Some((line, t));
            }
            "dimension" => {
                let d = value
                    .parse()
                    .map_err(|_| malformed(format!("invalid dimension `{}`", value)))?;
                self.dimension = Some((line, d));
            }
            "space" => self.space = Some(value.to_string()),
            "sizes" => {
                let sizes = value
                    .split_whitespace()
                    .map(|s| s.parse::<u64>())
                    .collect::<::std::result::Result<Vec<_>, _>>()
                    .map_err(|e| malformed(format!("invalid sizes: {}", e)))?;
                self.sizes = Some((line, sizes));
            }
            "space directions" => {
                let directions = parse_directions(value).map_err(malformed)?;
                self.space_directions = Some((line, directions));
            }
            "kinds" => {
                let kinds = value
                    .split_whitespace()
                    .map(Kind::from_str)
                    .collect::<::std::result::Result<Vec<_>, _>>()
                    .map_err(malformed)?;
                self.kinds = Some((line, kinds));
            }
            "endian" => {
                self.endianness = Some(match value {
                    "little" => Endianness::Little,
                    "big" => Endianness::Big,
                    e => return Err(malformed(format!("unknown endianness `{}`", e))),
                });
            }
            "encoding" => {
                if value != "raw" {
                    return Err(malformed(format!("unsupported encoding `{}`", value)));
                }
            }
            "space origin" => {
                let origin = parse_vector(value).map_err(malformed)?;
                self.space_origin = Some(origin);
            }
            "byte skip" => {
                self.byte_skip = value
                    .parse()
                    .map_err(|_| malformed(format!("invalid byte skip `{}`", value)))?;
            }
            "data file" | "datafile" => self.data_file = Some(value.to_string()),
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> Result<NrrdHeader> {
        let (_, scalar_type) = self.scalar_type.ok_or(RawGuessError::MissingField("type"))?;
        let (dim_line, dimension) = self.dimension.ok_or(RawGuessError::MissingField("dimension"))?;
        let (sizes_line, sizes) = self.sizes.ok_or(RawGuessError::MissingField("sizes"))?;
        let data_file = self.data_file.ok_or(RawGuessError::MissingField("data file"))?;

        if dimension == 0 {
            return Err(RawGuessError::MalformedHeader(dim_line, "dimension must be positive".into()));
        }
        check_axes(sizes_line, "sizes", sizes.len(), dimension)?;
        let space_directions = match self.space_directions {
            Some((line, d)) => {
                check_axes(line, "space directions", d.len(), dimension)?;
                d
            }
            None => vec![None; dimension],
        };
        let kinds = match self.kinds {
            Some((line, k)) => {
                check_axes(line, "kinds", k.len(), dimension)?;
                k
            }
            None => vec![Kind::Domain; dimension],
        };
        let endianness = match self.endianness {
            Some(e) => e,
            // only single byte types may leave it out
            None if scalar_type.size_of() == 1 => Endianness::native(),
            None => return Err(RawGuessError::MissingField("endian")),
        };

        Ok(NrrdHeader {
            scalar_type,
            sizes,
            space: self.space,
            space_directions,
            kinds,
            endianness,
            space_origin: self.space_origin,
            byte_skip: self.byte_skip,
            data_file,
        })
    }
}

fn check_axes(line: usize, field: &str, found: usize, dimension: usize) -> Result<()> {
    if found == dimension {
        Ok(())
    } else {
        Err(RawGuessError::MalformedHeader(
            line,
            format!("{} has {} entries but dimension is {}", field, found, dimension),
        ))
    }
}

fn parse_directions(value: &str) -> ::std::result::Result<Vec<Option<[f64; 3]>>, String> {
    let mut directions = Vec::new();
    let mut rest = value.trim();
    while !rest.is_empty() {
        if rest.starts_with("none") {
            directions.push(None);
            rest = rest["none".len()..].trim_start();
        } else if rest.starts_with('(') {
            let end = rest
                .find(')')
                .ok_or_else(|| format!("unterminated vector in `{}`", value))?;
            directions.push(Some(parse_vector(&rest[..=end])?));
            rest = rest[end + 1..].trim_start();
        } else {
            return Err(format!("invalid space directions `{}`", value));
        }
    }
    Ok(directions)
}

fn parse_vector(value: &str) -> ::std::result::Result<[f64; 3], String> {
    let inner = value
        .trim()
        .strip_prefix('(')
        .and_then(|v| v.strip_suffix(')'))
        .ok_or_else(|| format!("invalid vector `{}`", value))?;
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected 3 components in `{}`", value));
    }
    let mut v = [0.; 3];
    for (o, p) in v.iter_mut().zip(&parts) {
        *o = p
            .parse()
            .map_err(|_| format!("invalid number `{}` in `{}`", p, value))?;
    }
    Ok(v)
}

fn fmt_direction(d: &Option<[f64; 3]>) -> String {
    match d {
        Some(v) => fmt_vector(v),
        None => "none".to_string(),
    }
}
