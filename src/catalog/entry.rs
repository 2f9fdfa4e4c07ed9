use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::app::ports::HttpClientPort;
use crate::common::constants::{DETAIL_BASE_URL, STYLESHEET_BASE_URL};
use crate::common::error::{FontError, Result};
use crate::common::types::FontFormat;

/// One family record from the catalog. Immutable once built; every URL and
/// file name is derived from `family`.
#[derive(Debug, Clone, PartialEq)]
pub struct FontEntry {
    family: String,
    category: Option<String>,
    variants: Vec<String>,
    id: Option<String>,
    subsets: Vec<String>,
    last_modified: Option<String>,
    popularity: Option<u64>,
    detail_base: String,
}

impl FontEntry {
    pub fn from_raw(raw: &Value) -> Self {
        Self::from_raw_with_base(raw, DETAIL_BASE_URL)
    }

    /// Builds an entry whose detail document lives under `detail_base`.
    pub fn from_raw_with_base(raw: &Value, detail_base: &str) -> Self {
        let family = raw
            .get("familyName")
            .and_then(Value::as_str)
            .or_else(|| raw.get("family").and_then(Value::as_str))
            .unwrap_or_default()
            .to_string();

        // Variants come either as a list of ids or as an object keyed by id
        let variants = match raw.get("variants") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            Some(Value::Object(map)) => map.keys().cloned().collect(),
            _ => Vec::new(),
        };

        let subsets = raw
            .get("subsets")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default();

        Self {
            family,
            category: raw.get("category").and_then(Value::as_str).map(str::to_string),
            variants,
            id: raw.get("id").and_then(Value::as_str).map(str::to_string),
            subsets,
            last_modified: raw
                .get("lastModified")
                .and_then(Value::as_str)
                .map(str::to_string),
            popularity: raw.get("popularity").and_then(Value::as_u64),
            detail_base: detail_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Raw variant ids, in catalog order
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn subsets(&self) -> &[String] {
        &self.subsets
    }

    pub fn last_modified(&self) -> Option<&str> {
        self.last_modified.as_deref()
    }

    pub fn popularity(&self) -> Option<u64> {
        self.popularity
    }

    /// `https://fonts.googleapis.com/css?family=<family>` with spaces as `+`.
    pub fn stylesheet_url(&self) -> String {
        format!("{}{}", STYLESHEET_BASE_URL, self.family.replace(' ', "+"))
    }

    /// Stylesheet URL restricted to `variants`; identical to
    /// [`stylesheet_url`](Self::stylesheet_url) when none are given.
    pub fn stylesheet_url_with(&self, variants: &[String]) -> String {
        let base = self.stylesheet_url();
        if variants.is_empty() {
            return base;
        }
        let ids: Vec<String> = variants.iter().map(|v| normalize_variant_id(v)).collect();
        format!("{}:{}", base, ids.join(","))
    }

    /// Lowercase, hyphen-joined family, e.g. `source-sans-pro`
    pub fn slug(&self) -> String {
        self.family
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("-")
    }

    pub fn detail_url(&self) -> String {
        format!("{}/{}", self.detail_base, self.slug())
    }

    /// Pascal-cased family used to name downloaded files, e.g. `SourceSansPro`
    pub fn canonical_file_stem(&self) -> String {
        self.family
            .split_whitespace()
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect()
    }

    /// Fetches the detail document and maps each variant that has a file in
    /// `format` to its URL. Never cached; every call is a round trip.
    #[instrument(skip(self, http), fields(family = %self.family))]
    pub async fn resolve_file_map(
        &self,
        http: &dyn HttpClientPort,
        format: FontFormat,
    ) -> Result<FontFileMap> {
        let detail_err = |reason: String| FontError::Detail {
            family: self.family.clone(),
            reason,
        };

        let resp = http
            .get(&self.detail_url())
            .await
            .map_err(|e| detail_err(e.to_string()))?;
        let detail: FontDetail =
            serde_json::from_str(&resp.text).map_err(|e| detail_err(format!("unexpected detail document: {}", e)))?;

        let mut files = FontFileMap::default();
        for variant in detail.variants {
            let url = match format {
                FontFormat::Ttf => variant.ttf,
                FontFormat::Woff2 => variant.woff2,
            };
            match url {
                Some(url) if !url.is_empty() => files.insert(normalize_variant_id(&variant.id), url),
                _ => debug!("Variant {} has no {} file", variant.id, format),
            }
        }
        debug!("Resolved {} {} files", files.len(), format);
        Ok(files)
    }
}

#[derive(Debug, Deserialize)]
struct FontDetail {
    variants: Vec<DetailVariant>,
}

#[derive(Debug, Deserialize)]
struct DetailVariant {
    id: String,
    #[serde(default)]
    ttf: Option<String>,
    #[serde(default)]
    woff2: Option<String>,
}

/// Normalized variant id to remote file URL, for one format, in detail order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontFileMap {
    files: Vec<(String, String)>,
}

impl FontFileMap {
    /// Inserts or replaces the URL for `variant`, keeping first-seen order.
    pub fn insert(&mut self, variant: String, url: String) {
        match self.files.iter_mut().find(|(id, _)| *id == variant) {
            Some(existing) => existing.1 = url,
            None => self.files.push((variant, url)),
        }
    }

    pub fn get(&self, variant: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|(id, _)| id == variant)
            .map(|(_, url)| url.as_str())
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|(id, _)| id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(id, url)| (id.as_str(), url.as_str()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Maps the weight-400 spellings onto the ids the upstream API uses.
pub fn normalize_variant_id(raw: &str) -> String {
    let id = raw.trim().to_lowercase();
    match id.as_str() {
        "400" | "normal" => "regular".to_string(),
        "400italic" | "normalitalic" => "italic".to_string(),
        _ => id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_variant_ids() {
        assert_eq!(normalize_variant_id("400"), "regular");
        assert_eq!(normalize_variant_id("normal"), "regular");
        assert_eq!(normalize_variant_id("400italic"), "italic");
        assert_eq!(normalize_variant_id("NormalItalic"), "italic");
        assert_eq!(normalize_variant_id("700"), "700");
        assert_eq!(normalize_variant_id("  Regular  "), "regular");
        assert_eq!(normalize_variant_id("500italic"), "500italic");
    }

    #[test]
    fn derives_identity_from_family() {
        let entry = FontEntry::from_raw(&json!({
            "family": "Source Sans Pro",
            "category": "sans-serif",
            "variants": ["regular", "700", "italic"]
        }));
        assert_eq!(entry.family(), "Source Sans Pro");
        assert_eq!(entry.category(), Some("sans-serif"));
        assert_eq!(entry.variants(), ["regular", "700", "italic"]);
        assert_eq!(
            entry.stylesheet_url(),
            "https://fonts.googleapis.com/css?family=Source+Sans+Pro"
        );
        assert_eq!(
            entry.detail_url(),
            "https://gwfh.mranftl.com/api/fonts/source-sans-pro"
        );
        assert_eq!(entry.canonical_file_stem(), "SourceSansPro");
    }

    #[test]
    fn family_name_takes_precedence_and_variant_map_keeps_key_order() {
        let entry = FontEntry::from_raw(&json!({
            "familyName": "Open Sans",
            "family": "ignored",
            "variants": {"700": {}, "regular": {}, "300italic": {}}
        }));
        assert_eq!(entry.family(), "Open Sans");
        assert_eq!(entry.variants(), ["700", "regular", "300italic"]);
        assert_eq!(entry.category(), None);
    }

    #[test]
    fn missing_family_is_empty_string() {
        let entry = FontEntry::from_raw(&json!({"category": "serif"}));
        assert_eq!(entry.family(), "");
        assert_eq!(entry.slug(), "");
        assert!(entry.variants().is_empty());
        assert_eq!(entry.stylesheet_url(), STYLESHEET_BASE_URL);
    }

    #[test]
    fn stylesheet_url_with_variants() {
        let entry = FontEntry::from_raw(&json!({"family": "Lora"}));
        assert_eq!(
            entry.stylesheet_url_with(&["400".to_string(), "700italic".to_string()]),
            "https://fonts.googleapis.com/css?family=Lora:regular,700italic"
        );
        assert_eq!(entry.stylesheet_url_with(&[]), entry.stylesheet_url());
    }

    #[test]
    fn canonical_stem_capitalizes_each_word() {
        let entry = FontEntry::from_raw(&json!({"family": "roboto  mono"}));
        assert_eq!(entry.canonical_file_stem(), "RobotoMono");
        assert_eq!(entry.slug(), "roboto-mono");
    }

    #[test]
    fn custom_detail_base_is_trimmed() {
        let entry = FontEntry::from_raw_with_base(&json!({"family": "Lora"}), "http://localhost:9000/api/fonts/");
        assert_eq!(entry.detail_url(), "http://localhost:9000/api/fonts/lora");
    }

    #[test]
    fn file_map_keeps_first_seen_order() {
        let mut files = FontFileMap::default();
        files.insert("regular".into(), "a".into());
        files.insert("700".into(), "b".into());
        files.insert("regular".into(), "c".into());
        assert_eq!(files.ids().collect::<Vec<_>>(), ["regular", "700"]);
        assert_eq!(files.get("regular"), Some("c"));
        assert_eq!(files.get("300"), None);
    }
}
