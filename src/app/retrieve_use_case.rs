use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::app::ports::{FontRegistrarPort, HttpClientPort};
use crate::catalog::entry::{normalize_variant_id, FontEntry};
use crate::common::constants::{ACCEPTED_FONT_EXTENSIONS, ACCEPTED_FONT_MIMES, CORRUPTED_FILE_MESSAGE};
use crate::common::error::{FontError, PartialFailure, Result};
use crate::common::types::{Destination, FontFormat, RetrievalResult, VariantFailure};
use crate::observability::metrics;

/// Downloads the requested variants of one font and places them.
pub struct RetrieveUseCase {
    http: Arc<dyn HttpClientPort>,
    registrar: Arc<dyn FontRegistrarPort>,
}

impl RetrieveUseCase {
    pub fn new(http: Arc<dyn HttpClientPort>, registrar: Arc<dyn FontRegistrarPort>) -> Self {
        Self { http, registrar }
    }

    /// Download into `folder` (the current directory when `None`).
    pub async fn download(
        &self,
        entry: &FontEntry,
        variants: &[String],
        folder: Option<PathBuf>,
        format: FontFormat,
    ) -> Result<Vec<RetrievalResult>> {
        let destination = match folder {
            Some(folder) => Destination::Folder(folder),
            None => Destination::CurrentDir,
        };
        self.retrieve_variants(entry, variants, &destination, format).await
    }

    /// Install TTF files into the system font directory.
    pub async fn install(&self, entry: &FontEntry, variants: &[String]) -> Result<Vec<RetrievalResult>> {
        self.retrieve_variants(entry, variants, &Destination::System, FontFormat::Ttf)
            .await
    }

    /// Retrieves each variant in `requested` (every available one when empty).
    ///
    /// Variants without a file in `format` are skipped silently. Failures of
    /// individual variants do not stop the batch; if any occurred the result
    /// is `FontError::PartialFailure` carrying the successes.
    #[instrument(skip(self, entry, requested), fields(family = %entry.family()))]
    pub async fn retrieve_variants(
        &self,
        entry: &FontEntry,
        requested: &[String],
        destination: &Destination,
        format: FontFormat,
    ) -> Result<Vec<RetrievalResult>> {
        let files = entry.resolve_file_map(self.http.as_ref(), format).await?;
        let target_dir = self.target_dir(destination)?;

        let working: Vec<String> = if requested.is_empty() {
            files.ids().map(str::to_string).collect()
        } else {
            requested.iter().map(|v| normalize_variant_id(v)).collect()
        };

        let staging = tempfile::Builder::new().prefix("webfont-dl-").tempdir()?;

        let mut succeeded = Vec::new();
        let mut failures = Vec::new();
        for variant in working {
            let Some(url) = files.get(&variant) else {
                debug!("No {} file for variant {}, skipping", format, variant);
                continue;
            };

            match self
                .retrieve_one(entry, &variant, url, staging.path(), &target_dir, destination)
                .await
            {
                Ok(path) => {
                    info!("Placed {} {} at {}", entry.family(), variant, path.display());
                    metrics::retrieval::variant_success(entry.family());
                    succeeded.push(RetrievalResult {
                        family: entry.family().to_string(),
                        variant,
                        path,
                    });
                }
                Err(e) => {
                    warn!("Variant {} of {} failed: {}", variant, entry.family(), e);
                    metrics::retrieval::variant_failed(entry.family());
                    failures.push(VariantFailure {
                        variant,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if failures.is_empty() {
            Ok(succeeded)
        } else {
            metrics::retrieval::partial_batch();
            Err(FontError::PartialFailure(PartialFailure {
                family: entry.family().to_string(),
                succeeded,
                failures,
            }))
        }
    }

    async fn retrieve_one(
        &self,
        entry: &FontEntry,
        variant: &str,
        url: &str,
        staging_dir: &Path,
        target_dir: &Path,
        destination: &Destination,
    ) -> Result<PathBuf> {
        let file_name = variant_file_name(entry, variant, url);
        let staged = staging_dir.join(&file_name);

        let mut file = tokio::fs::File::create(&staged).await?;
        let fetched = self.http.download(url, &mut file).await;
        drop(file);
        let resp = match fetched {
            Ok(resp) => resp,
            Err(e) => {
                discard(&staged).await;
                return Err(e.into());
            }
        };

        if !is_acceptable_font(resp.content_type.as_deref(), &staged) {
            discard(&staged).await;
            return Err(FontError::Corrupted(CORRUPTED_FILE_MESSAGE.to_string()));
        }

        tokio::fs::create_dir_all(target_dir).await?;
        let placed = target_dir.join(&file_name);
        move_file(&staged, &placed).await?;

        if *destination == Destination::System {
            if let Err(e) = self.registrar.register(&placed).await {
                // An unregistered file must not stay behind in the font directory
                discard(&placed).await;
                return Err(e);
            }
        }
        Ok(placed)
    }

    fn target_dir(&self, destination: &Destination) -> Result<PathBuf> {
        match destination {
            Destination::Folder(folder) => Ok(folder.clone()),
            Destination::CurrentDir => Ok(std::env::current_dir()?),
            Destination::System => self.registrar.fonts_dir().ok_or(FontError::NoSystemFontDir),
        }
    }
}

/// `<CanonicalStem>-<variant><remote extension>`
pub fn variant_file_name(entry: &FontEntry, variant: &str, url: &str) -> String {
    format!("{}-{}{}", entry.canonical_file_stem(), variant, remote_extension(url))
}

/// Extension of the last path segment of `url`, dot included, or empty.
fn remote_extension(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let segment = path.rsplit('/').next().unwrap_or_default();
    match segment.rfind('.') {
        Some(idx) if idx > 0 => segment[idx..].to_string(),
        _ => String::new(),
    }
}

/// Accepted when the sniffed type is a font MIME, or the file has a font extension.
pub fn is_acceptable_font(content_type: Option<&str>, path: &Path) -> bool {
    let mime_ok = content_type.map_or(false, |ct| ACCEPTED_FONT_MIMES.contains(&ct));
    let ext_ok = path
        .extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| ACCEPTED_FONT_EXTENSIONS.contains(&e.to_lowercase().as_str()));
    mime_ok || ext_ok
}

async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        debug!("Could not remove staged file {}: {}", path.display(), e);
    }
}

/// Rename, falling back to copy + remove when crossing filesystems.
async fn move_file(from: &Path, to: &Path) -> Result<()> {
    match tokio::fs::rename(from, to).await {
        Ok(()) => Ok(()),
        Err(e) => {
            debug!("Rename {} failed ({}), copying instead", from.display(), e);
            tokio::fs::copy(from, to).await?;
            discard(from).await;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn file_name_uses_stem_variant_and_remote_extension() {
        let entry = FontEntry::from_raw(&json!({"family": "Open Sans"}));
        assert_eq!(
            variant_file_name(&entry, "700italic", "https://fonts.gstatic.com/s/opensans/v1/abc.ttf"),
            "OpenSans-700italic.ttf"
        );
        assert_eq!(
            variant_file_name(&entry, "regular", "https://cdn.example.com/f/abc.woff2?v=3"),
            "OpenSans-regular.woff2"
        );
        assert_eq!(
            variant_file_name(&entry, "regular", "https://cdn.example.com/download"),
            "OpenSans-regular"
        );
    }

    #[test]
    fn acceptance_by_mime_or_extension() {
        assert!(is_acceptable_font(Some("application/font-sfnt"), Path::new("a.bin")));
        assert!(is_acceptable_font(Some("font/woff2"), Path::new("a")));
        assert!(is_acceptable_font(None, Path::new("a.TTF")));
        assert!(is_acceptable_font(None, Path::new("a.woff2")));
        assert!(!is_acceptable_font(None, Path::new("a.html")));
        assert!(!is_acceptable_font(Some("font/woff"), Path::new("a.woff")));
    }
}
