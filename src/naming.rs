//! Preview file naming.
//!
//! Every stored preview is named `<role>-<unix-ms>-<token>.png`:
//!
//! - `temp-1760000000000-3fa2c1d9.png`: produced by an upload
//! - `processed-1760000000123-b07e55aa.png`: produced by an adjustment run
//!
//! The role prefix and timestamp keep the directory readable. The token is the
//! first eight hex digits of a random UUID v4, so two previews written in the
//! same millisecond still get distinct names.
//!
//! [`PreviewName::parse`] is the inverse and doubles as the gatekeeper for
//! caller-supplied locators: only names that parse are ever resolved against
//! the storage root.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Extension of every stored preview.
pub const PREVIEW_EXTENSION: &str = "png";

const TOKEN_LEN: usize = 8;

/// Which pipeline operation produced a preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Ingest preview of an uploaded image.
    Temp,
    /// Output of an adjustment run.
    Processed,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Temp => "temp",
            Self::Processed => "processed",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "temp" => Some(Self::Temp),
            "processed" => Some(Self::Processed),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed or freshly generated preview file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewName {
    pub role: Role,
    /// Milliseconds since the Unix epoch at generation time.
    pub timestamp_ms: u64,
    /// Lowercase hex disambiguator.
    pub token: String,
}

impl PreviewName {
    /// Generate a new name for `role` stamped with the current time.
    pub fn generate(role: Role) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let token = uuid::Uuid::new_v4().simple().to_string()[..TOKEN_LEN].to_string();
        Self {
            role,
            timestamp_ms,
            token,
        }
    }

    /// Parse a file name following the `<role>-<ms>-<token>.png` convention.
    ///
    /// Returns `None` for anything else, including names carrying path
    /// separators or traversal components.
    pub fn parse(name: &str) -> Option<Self> {
        let stem = name.strip_suffix(PREVIEW_EXTENSION)?.strip_suffix('.')?;
        let mut parts = stem.splitn(3, '-');
        let role = Role::from_prefix(parts.next()?)?;

        let timestamp = parts.next()?;
        if timestamp.is_empty() || !timestamp.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let timestamp_ms = timestamp.parse().ok()?;

        let token = parts.next()?;
        if token.len() != TOKEN_LEN
            || !token
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            return None;
        }

        Some(Self {
            role,
            timestamp_ms,
            token: token.to_string(),
        })
    }

    pub fn file_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PreviewName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}.{}",
            self.role, self.timestamp_ms, self.token, PREVIEW_EXTENSION
        )
    }
}
