use crate::app::ports::FontRegistrarPort;
use crate::common::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Places fonts in the per-user font directory of the running OS and
/// registers them where the OS needs more than a file copy.
///
/// Constructed once by the binary and handed to whatever installs fonts.
#[derive(Debug, Default)]
pub struct PlatformRegistrar;

impl PlatformRegistrar {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FontRegistrarPort for PlatformRegistrar {
    fn fonts_dir(&self) -> Option<PathBuf> {
        platform_fonts_dir()
    }

    async fn register(&self, path: &Path) -> Result<()> {
        register_font(path).await
    }
}

#[cfg(target_os = "windows")]
fn platform_fonts_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("Microsoft").join("Windows").join("Fonts"))
}

#[cfg(not(target_os = "windows"))]
fn platform_fonts_dir() -> Option<PathBuf> {
    dirs::font_dir()
}

// Per-user fonts on Windows are only picked up once listed under HKCU.
#[cfg(target_os = "windows")]
async fn register_font(path: &Path) -> Result<()> {
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let output = tokio::process::Command::new("reg")
        .args([
            "add",
            r"HKCU\Software\Microsoft\Windows NT\CurrentVersion\Fonts",
            "/v",
            &format!("{} (TrueType)", name),
            "/t",
            "REG_SZ",
            "/d",
        ])
        .arg(path)
        .arg("/f")
        .output()
        .await?;
    if !output.status.success() {
        return Err(crate::common::error::FontError::Registration {
            path: path.display().to_string(),
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    debug!("Registered {} with the font registry", path.display());
    Ok(())
}

#[cfg(target_os = "macos")]
async fn register_font(path: &Path) -> Result<()> {
    debug!("{} placed in ~/Library/Fonts, no registration needed", path.display());
    Ok(())
}

// Refreshing fontconfig is best-effort: the file is already in place.
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
async fn register_font(path: &Path) -> Result<()> {
    let Some(dir) = path.parent() else {
        return Err(crate::common::error::FontError::Registration {
            path: path.display().to_string(),
            reason: "font file has no parent directory".to_string(),
        });
    };
    match tokio::process::Command::new("fc-cache").arg("-f").arg(dir).output().await {
        Ok(output) if output.status.success() => debug!("Refreshed fontconfig cache for {}", dir.display()),
        Ok(output) => debug!("fc-cache exited with {}", output.status),
        Err(e) => debug!("fc-cache unavailable: {}", e),
    }
    Ok(())
}
