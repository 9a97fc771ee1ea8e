//! Parsing of C `printf` format specifiers.
//!
//! The `@printf` builtin is specialized per format string: every specifier in
//! the string becomes one typed wrapper parameter. This module splits a format
//! string into its specifiers; deciding which conversions are supported is the
//! lowerer's business.

use once_cell::sync::Lazy;
use regex::Regex;

/// One parsed `%...` specifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrintfSpec {
    /// The specifier exactly as written, e.g. `%-08.3ld`.
    pub original: String,
    /// Flag characters: `-`, `+`, ` `, `#`, `0`.
    pub flags: String,
    /// Field width: digits or `*`.
    pub width: String,
    /// Precision without the dot: digits or `*`.
    pub precision: String,
    /// Length modifier: `h`, `hh`, `l`, `ll`, `L`, `j`, `z`, `t`.
    pub length: String,
    /// Conversion character: one of `diuoxXfFeEgGaAcspn%`.
    pub conversion: char,
}

static SPEC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"%([-+#0 ]*)(\d+|\*)?(?:\.(\d+|\*))?([hlLjzt]*)([diuoxXfFeEgGaAcspn%])")
        .expect("printf specifier regex is valid")
});

/// Returns every format specifier in `fmt`, in order of appearance.
///
/// A format string with no specifiers yields an empty vector; that is a valid
/// specialization (a `printf` call with only literal text).
pub fn parse_printf_format(fmt: &str) -> Vec<PrintfSpec> {
    SPEC_RE
        .captures_iter(fmt)
        .map(|caps| PrintfSpec {
            original: caps[0].to_string(),
            flags: caps[1].to_string(),
            width: caps.get(2).map_or(String::new(), |m| m.as_str().to_string()),
            precision: caps.get(3).map_or(String::new(), |m| m.as_str().to_string()),
            length: caps[4].to_string(),
            conversion: caps[5].chars().next().expect("conversion group is one char"),
        })
        .collect()
}
