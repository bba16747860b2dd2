//! ODBC connection string construction.

use crate::db2i::Db2iCredentials;
use odbc_api::escape_attribute_value;
use std::fmt;

const REDACTED_PASSWORD: &str = "PWD=****";

/// A connection string together with a copy that is safe to log.
///
/// `Debug` and `Display` both render the redacted form.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionString {
    full: String,
    redacted: String,
}

impl ConnectionString {
    /// Build the wire connection string for `credentials`.
    ///
    /// Segments are `DRIVER={..};SYSTEM=..;DATABASE=..;NAM=..;UID=..;PWD=..`.
    /// Missing optional values are rendered as `None`, matching what the
    /// IBM i Access driver has always been handed for unset fields. Values
    /// containing `;` or `+` are braced so they cannot add attributes.
    pub fn build(credentials: &Db2iCredentials) -> Self {
        let segments = vec![
            format!("DRIVER={{{}}}", credentials.driver()),
            format!("SYSTEM={}", escape_attribute_value(credentials.system())),
            format!("DATABASE={}", escape_attribute_value(credentials.database())),
            format!("NAM={}", credentials.nam()),
            format!(
                "UID={}",
                escape_attribute_value(credentials.uid().unwrap_or("None"))
            ),
            format!(
                "PWD={}",
                escape_attribute_value(credentials.expose_password().unwrap_or("None"))
            ),
        ];

        Self {
            full: segments.join(";"),
            redacted: redact_segments(segments).join(";"),
        }
    }

    /// The string handed to the driver. Never log this.
    pub fn full(&self) -> &str {
        &self.full
    }

    pub fn redacted(&self) -> &str {
        &self.redacted
    }
}

/// Replace the first segment keyed `PWD` (case-insensitive) with a mask.
fn redact_segments(mut segments: Vec<String>) -> Vec<String> {
    if let Some(segment) = segments.iter_mut().find(|segment| {
        segment
            .split_once('=')
            .is_some_and(|(key, _)| key.trim().eq_ignore_ascii_case("PWD"))
    }) {
        *segment = REDACTED_PASSWORD.to_string();
    }
    segments
}

/// Redact an arbitrary `;`-separated connection string.
pub fn redact(connection_string: &str) -> String {
    redact_segments(split_segments(connection_string)).join(";")
}

/// Split on `;`, keeping a `{..}` braced value whole. Inside braces `}}`
/// is a literal `}`.
fn split_segments(connection_string: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut braced = false;
    let mut chars = connection_string.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if !braced && current.ends_with('=') => braced = true,
            '}' if braced && chars.peek() == Some(&'}') => {
                current.push_str("}}");
                chars.next();
                continue;
            }
            '}' if braced => braced = false,
            ';' if !braced => {
                segments.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    segments.push(current);
    segments
}

impl fmt::Display for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted)
    }
}

impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConnectionString").field(&self.redacted).finish()
    }
}
