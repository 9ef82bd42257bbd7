//! Conversion option allow-listing.
//!
//! Callers may send any set of fields; only the keys the provider understands
//! are forwarded, and only when they carry a value.

use std::collections::BTreeMap;

/// Option keys forwarded to the conversion provider.
pub const ALLOWED_OPTIONS: &[&str] = &[
    "document_name",
    "page_size",
    "orientation",
    "inline",
    "margin_top",
    "margin_right",
    "margin_bottom",
    "margin_left",
    "header_text",
    "header_align",
    "header_spacing",
    "footer_text",
    "footer_align",
    "footer_spacing",
    "watermark_url",
    "watermark_opacity",
    "watermark_in_background",
    "watermark_offset_x",
    "watermark_offset_y",
    "delay",
    "dpi",
];

/// Returns true if `key` is forwarded to the provider.
pub fn is_allowed_option(key: &str) -> bool {
    ALLOWED_OPTIONS.contains(&key)
}

/// Filtered, non-empty conversion options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionOptions(BTreeMap<String, String>);

impl ConversionOptions {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate options in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Keep only allow-listed keys with non-empty values.
///
/// Never fails: anything unrecognised is dropped. When a key repeats, the
/// last value wins.
pub fn normalize_options<I, K, V>(raw: I) -> ConversionOptions
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let mut options = BTreeMap::new();
    for (key, value) in raw {
        let key = key.as_ref();
        if !is_allowed_option(key) {
            continue;
        }
        let value = value.into();
        if value.is_empty() {
            options.remove(key);
            continue;
        }
        options.insert(key.to_string(), value);
    }
    ConversionOptions(options)
}
