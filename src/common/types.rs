use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Font file format requested from the detail endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFormat {
    #[default]
    Ttf,
    Woff2,
}

impl FontFormat {
    /// Key of the per-variant URL in the detail document
    pub fn key(&self) -> &'static str {
        match self {
            FontFormat::Ttf => "ttf",
            FontFormat::Woff2 => "woff2",
        }
    }
}

impl fmt::Display for FontFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FontFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ttf" | "truetype" => Ok(FontFormat::Ttf),
            "woff2" => Ok(FontFormat::Woff2),
            other => Err(format!("unsupported font format '{}' (expected ttf or woff2)", other)),
        }
    }
}

/// Where retrieved variant files end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Folder(PathBuf),
    CurrentDir,
    /// Per-user system font directory, registered with the OS where required
    System,
}

/// One variant retrieved and placed successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetrievalResult {
    pub family: String,
    pub variant: String,
    pub path: PathBuf,
}

/// One variant that had a URL but could not be retrieved or placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantFailure {
    pub variant: String,
    pub reason: String,
}

/// Result of a catalog load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOutcome {
    pub from_cache: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_format_parses_case_insensitively() {
        assert_eq!("TTF".parse::<FontFormat>().unwrap(), FontFormat::Ttf);
        assert_eq!(" woff2 ".parse::<FontFormat>().unwrap(), FontFormat::Woff2);
        assert!("otf".parse::<FontFormat>().is_err());
        assert_eq!(FontFormat::default(), FontFormat::Ttf);
    }
}
