//! Ordered option bag marshaled into command-line flags.
//!
//! Keys are not checked against what a program accepts; the external program
//! owns its flag set.

use std::ffi::OsString;
use std::fmt;

/// Value of a single option.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// `true` becomes a bare flag, `false` is left off the command line
    Flag(bool),
    /// Rendered as the flag followed by this text
    Value(String),
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Flag(b)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Value(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Value(s)
    }
}

impl From<&std::path::Path> for OptionValue {
    fn from(p: &std::path::Path) -> Self {
        OptionValue::Value(p.to_string_lossy().into_owned())
    }
}

macro_rules! option_value_from_display {
    ($($t:ty),*) => {
        $(impl From<$t> for OptionValue {
            fn from(v: $t) -> Self {
                OptionValue::Value(v.to_string())
            }
        })*
    };
}

option_value_from_display!(i32, i64, u32, u64, usize, f32, f64);

/// Insertion-ordered mapping from option name to value.
///
/// # Example
/// ```
/// use bedtools_rs::Options;
///
/// let opts = Options::new().flag("s").set("f", 0.13);
/// assert_eq!(opts.to_args(), vec!["-s", "-f", "0.13"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options {
    entries: Vec<(String, OptionValue)>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bare flag.
    pub fn flag(self, key: impl Into<String>) -> Self {
        self.set(key, true)
    }

    /// Add or replace an option, keeping the position of an existing key.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Render as command-line arguments, in insertion order.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.entries.len() * 2);
        for (key, value) in &self.entries {
            match value {
                OptionValue::Flag(true) => args.push(flag_name(key)),
                OptionValue::Flag(false) => {}
                OptionValue::Value(v) => {
                    args.push(flag_name(key));
                    args.push(v.clone());
                }
            }
        }
        args
    }

    pub(crate) fn to_os_args(&self) -> Vec<OsString> {
        self.to_args().into_iter().map(OsString::from).collect()
    }
}

fn flag_name(key: &str) -> String {
    if key.starts_with('-') {
        key.to_string()
    } else {
        format!("-{key}")
    }
}

impl fmt::Display for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_args().join(" "))
    }
}

impl<K: Into<String>, V: Into<OptionValue>> FromIterator<(K, V)> for Options {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = Options::new();
        for (k, v) in iter {
            options.insert(k, v);
        }
        options
    }
}
