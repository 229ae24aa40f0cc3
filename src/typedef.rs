//! This module contains the pixel and scalar types a raw file can be
//! interpreted with. `PixelFormat` is what a user picks; `ScalarType` is
//! what a decoding back end or a NRRD header understands.

use crate::error::{RawGuessError, Result};
use std::fmt;
use std::str::FromStr;

/// Voxel type hypothesis for a raw data file.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum PixelFormat {
    /// unsigned char.
    UInt8,
    /// signed char.
    Int8,
    /// unsigned short.
    UInt16,
    /// signed short.
    Int16,
    /// 32 bit float.
    Float32,
    /// 64 bit float = double.
    Float64,
    /// 3 8 bit bytes, interleaved.
    Rgb24,
}

/// All pixel formats, in the order they are usually presented.
pub const PIXEL_FORMATS: [PixelFormat; 7] = [
    PixelFormat::UInt8,
    PixelFormat::Int8,
    PixelFormat::UInt16,
    PixelFormat::Int16,
    PixelFormat::Float32,
    PixelFormat::Float64,
    PixelFormat::Rgb24,
];

impl PixelFormat {
    /// Look up a pixel format by its user-facing label
    /// (e.g. `"16 bit signed"` or `"24 bit RGB"`).
    ///
    /// # Example
    ///
    /// ```
    /// use rawguess::PixelFormat;
    /// assert_eq!(PixelFormat::from_label("float")?, PixelFormat::Float32);
    /// assert!(PixelFormat::from_label("12 bit packed").is_err());
    /// # Ok::<(), rawguess::RawGuessError>(())
    /// ```
    pub fn from_label(label: &str) -> Result<PixelFormat> {
        PIXEL_FORMATS
            .iter()
            .copied()
            .find(|f| f.label() == label)
            .ok_or_else(|| RawGuessError::InvalidFormat(label.to_string()))
    }

    /// The user-facing label of this format.
    pub fn label(self) -> &'static str {
        match self {
            PixelFormat::UInt8 => "8 bit unsigned",
            PixelFormat::Int8 => "8 bit signed",
            PixelFormat::UInt16 => "16 bit unsigned",
            PixelFormat::Int16 => "16 bit signed",
            PixelFormat::Float32 => "float",
            PixelFormat::Float64 => "double",
            PixelFormat::Rgb24 => "24 bit RGB",
        }
    }

    /// Retrieve the size of a single component of this format, in bytes.
    pub fn bytes_per_component(self) -> u64 {
        self.component_type().size_of()
    }

    /// Number of interleaved components per voxel.
    pub fn component_count(self) -> u64 {
        match self {
            PixelFormat::Rgb24 => 3,
            _ => 1,
        }
    }

    /// Size of a whole voxel, in bytes.
    pub fn bytes_per_voxel(self) -> u64 {
        self.bytes_per_component() * self.component_count()
    }

    /// The scalar type of each component.
    pub fn component_type(self) -> ScalarType {
        match self {
            PixelFormat::UInt8 | PixelFormat::Rgb24 => ScalarType::UInt8,
            PixelFormat::Int8 => ScalarType::Int8,
            PixelFormat::UInt16 => ScalarType::UInt16,
            PixelFormat::Int16 => ScalarType::Int16,
            PixelFormat::Float32 => ScalarType::Float32,
            PixelFormat::Float64 => ScalarType::Float64,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PixelFormat {
    type Err = RawGuessError;

    fn from_str(s: &str) -> Result<Self> {
        PixelFormat::from_label(s)
    }
}

/// Scalar data type of a voxel component, as understood by decoding
/// back ends. The codes match the VTK scalar type constants.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, FromPrimitive)]
pub enum ScalarType {
    /// unsigned char.
    // VTK_UNSIGNED_CHAR   3
    UInt8 = 3,
    /// signed short.
    // VTK_SHORT           4
    Int16 = 4,
    /// unsigned short.
    // VTK_UNSIGNED_SHORT  5
    UInt16 = 5,
    /// signed int.
    // VTK_INT             6
    Int32 = 6,
    /// unsigned int.
    // VTK_UNSIGNED_INT    7
    UInt32 = 7,
    /// 32 bit float.
    // VTK_FLOAT          10
    Float32 = 10,
    /// 64 bit float = double.
    // VTK_DOUBLE         11
    Float64 = 11,
    /// signed char.
    // VTK_SIGNED_CHAR    15
    Int8 = 15,
}

impl ScalarType {
    /// Retrieve the size of a value of this type, in bytes.
    pub fn size_of(self) -> u64 {
        use ScalarType::*;
        match self {
            UInt8 | Int8 => 1,
            UInt16 | Int16 => 2,
            Int32 | UInt32 | Float32 => 4,
            Float64 => 8,
        }
    }

    /// Obtain the scalar type from a back end's numeric code.
    pub fn from_code(code: i32) -> Option<ScalarType> {
        num_traits::FromPrimitive::from_i32(code)
    }

    /// The type name written to the `type` field of a NRRD header.
    ///
    /// # Errors
    ///
    /// - `RawGuessError::UnsupportedFormat` if the type has no NRRD name
    ///   in this crate.
    pub fn nrrd_name(self) -> Result<&'static str> {
        match self {
            ScalarType::UInt8 => Ok("uchar"),
            ScalarType::Int8 => Ok("signed char"),
            ScalarType::UInt16 => Ok("ushort"),
            ScalarType::Int16 => Ok("short"),
            ScalarType::Float32 => Ok("float"),
            ScalarType::Float64 => Ok("double"),
            t => Err(RawGuessError::UnsupportedFormat(t)),
        }
    }

    /// Interpret a NRRD `type` field value, including its synonyms.
    pub fn from_nrrd_name(name: &str) -> Option<ScalarType> {
        match name {
            "uchar" | "unsigned char" | "uint8" | "uint8_t" => Some(ScalarType::UInt8),
            "signed char" | "int8" | "int8_t" => Some(ScalarType::Int8),
            "ushort" | "unsigned short" | "unsigned short int" | "uint16" | "uint16_t" => {
                Some(ScalarType::UInt16)
            }
            "short" | "short int" | "signed short" | "signed short int" | "int16" | "int16_t" => {
                Some(ScalarType::Int16)
            }
            "int" | "signed int" | "int32" | "int32_t" => Some(ScalarType::Int32),
            "uint" | "unsigned int" | "uint32" | "uint32_t" => Some(ScalarType::UInt32),
            "float" => Some(ScalarType::Float32),
            "double" => Some(ScalarType::Float64),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_total_and_unique() {
        for f in PIXEL_FORMATS.iter() {
            assert_eq!(PixelFormat::from_label(f.label()).unwrap(), *f);
            assert_eq!(f.to_string().parse::<PixelFormat>().unwrap(), *f);
        }
    }

    #[test]
    fn unknown_label_is_not_defaulted() {
        match PixelFormat::from_label("32 bit signed") {
            Err(RawGuessError::InvalidFormat(label)) => assert_eq!(label, "32 bit signed"),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn component_sizes() {
        let expected = [(1, 1), (1, 1), (2, 1), (2, 1), (4, 1), (8, 1), (1, 3)];
        for (f, (bytes, count)) in PIXEL_FORMATS.iter().zip(expected.iter()) {
            assert_eq!(f.bytes_per_component(), *bytes, "{:?}", f);
            assert_eq!(f.component_count(), *count, "{:?}", f);
        }
        assert_eq!(PixelFormat::Rgb24.bytes_per_voxel(), 3);
    }

    #[test]
    fn scalar_codes() {
        assert_eq!(ScalarType::from_code(3), Some(ScalarType::UInt8));
        assert_eq!(ScalarType::from_code(15), Some(ScalarType::Int8));
        assert_eq!(ScalarType::from_code(11), Some(ScalarType::Float64));
        assert_eq!(ScalarType::from_code(2), None);
    }

    #[test]
    fn nrrd_names() {
        assert_eq!(ScalarType::UInt8.nrrd_name().unwrap(), "uchar");
        assert_eq!(ScalarType::Int8.nrrd_name().unwrap(), "signed char");
        assert_eq!(ScalarType::UInt16.nrrd_name().unwrap(), "ushort");
        assert_eq!(ScalarType::Int16.nrrd_name().unwrap(), "short");
        assert_eq!(ScalarType::Float32.nrrd_name().unwrap(), "float");
        assert_eq!(ScalarType::Float64.nrrd_name().unwrap(), "double");
        assert!(matches!(
            ScalarType::Int32.nrrd_name(),
            Err(RawGuessError::UnsupportedFormat(ScalarType::Int32))
        ));
        assert_eq!(ScalarType::from_nrrd_name("uint16"), Some(ScalarType::UInt16));
        assert_eq!(ScalarType::from_nrrd_name("complex"), None);
    }
}
