//! Round-trip of layout requests through a key/value settings store, so
//! a front end can restore the last guess in a new session.

use crate::error::{RawGuessError, Result};
use crate::layout::{LayoutRequest, LayoutRequestBuilder};
use crate::typedef::PixelFormat;
use crate::util::{endianness_from_label, endianness_label};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

/// Prefix of every key written by this crate.
pub const KEY_PREFIX: &str = "RawGuess/";

/// A string key/value store for user settings.
pub trait SettingsStore {
    /// Fetch the value of `key`, or `default` if it is not set.
    fn get(&self, key: &str, default: &str) -> String;

    /// Set the value of `key`.
    fn set(&mut self, key: &str, value: &str);
}

impl SettingsStore for HashMap<String, String> {
    fn get(&self, key: &str, default: &str) -> String {
        HashMap::get(self, key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    fn set(&mut self, key: &str, value: &str) {
        let _ = self.insert(key.to_string(), value.to_string());
    }
}

fn key(name: &str) -> String {
    format!("{}{}", KEY_PREFIX, name)
}

/// Store every field of the request, except its path.
pub fn save_request<S: SettingsStore + ?Sized>(store: &mut S, request: &LayoutRequest) {
    let [x, y, z] = request.size();
    let [sx, sy, sz] = request.spacing();
    store.set(&key("pixelType"), request.pixel_format().label());
    store.set(&key("endianness"), endianness_label(request.endianness()));
    store.set(&key("headerSize"), &request.header_size().to_string());
    store.set(&key("sizeX"), &x.to_string());
    store.set(&key("sizeY"), &y.to_string());
    store.set(&key("sizeZ"), &z.to_string());
    store.set(&key("skipSlices"), &request.skip_slices().to_string());
    store.set(&key("spacingX"), &sx.to_string());
    store.set(&key("spacingY"), &sy.to_string());
    store.set(&key("spacingZ"), &sz.to_string());
    store.set(&key("numberOfVolumes"), &request.number_of_volumes().to_string());
}

/// Restore a request for the given file from the store. Missing keys
/// take the defaults of [`LayoutRequestBuilder`].
///
/// # Errors
///
/// - `RawGuessError::InvalidFormat` if the stored pixel format is unknown
/// - `RawGuessError::InvalidParameter` if a stored number cannot be
///   parsed or is out of range, or the stored byte order is unknown
///
/// [`LayoutRequestBuilder`]: ../layout/struct.LayoutRequestBuilder.html
pub fn load_request<S, P>(store: &S, path: P) -> Result<LayoutRequest>
where
    S: SettingsStore + ?Sized,
    P: Into<PathBuf>,
{
    let defaults = LayoutRequestBuilder::new(path).build()?;
    let [x, y, z] = defaults.size();
    let [sx, sy, sz] = defaults.spacing();

    let pixel_format =
        PixelFormat::from_label(&store.get(&key("pixelType"), defaults.pixel_format().label()))?;
    let endianness =
        endianness_from_label(&store.get(&key("endianness"), endianness_label(defaults.endianness())))?;

    LayoutRequest::builder(defaults.path())
        .pixel_format(pixel_format)
        .endianness(endianness)
        .header_size(number(store, "headerSize", defaults.header_size())?)
        .size(
            number(store, "sizeX", x)?,
            number(store, "sizeY", y)?,
            number(store, "sizeZ", z)?,
        )
        .skip_slices(number(store, "skipSlices", defaults.skip_slices())?)
        .spacing(
            number(store, "spacingX", sx)?,
            number(store, "spacingY", sy)?,
            number(store, "spacingZ", sz)?,
        )
        .number_of_volumes(number(store, "numberOfVolumes", defaults.number_of_volumes())?)
        .build()
}

fn number<S, T>(store: &S, name: &'static str, default: T) -> Result<T>
where
    S: SettingsStore + ?Sized,
    T: FromStr + ToString,
{
    let value = store.get(&key(name), &default.to_string());
    value
        .trim()
        .parse()
        .map_err(|_| RawGuessError::InvalidParameter(name, value))
}
