//! Template installation with staleness detection
//!
//! A template is (re)installed when the cache has no record of it, the
//! destination is missing, or the destination is older than the template.
//! Edited templates therefore propagate into already scaffolded targets.

use crate::cache::StepCache;
use crate::error::{ScaffoldError, ScaffoldResult};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tracing::{debug, info};

/// Copies templates for one target into its directory
#[derive(Debug, Clone)]
pub struct TemplateInstaller<'a> {
    templates_root: &'a Path,
    target: &'a str,
    target_dir: &'a Path,
}

impl<'a> TemplateInstaller<'a> {
    pub fn new(templates_root: &'a Path, target: &'a str, target_dir: &'a Path) -> Self {
        Self {
            templates_root,
            target,
            target_dir,
        }
    }

    /// Template source for a destination: `root/target/subdir/name`
    pub fn template_path(&self, subdir: &Path, destination: &str, template: Option<&str>) -> PathBuf {
        self.templates_root
            .join(self.target)
            .join(subdir)
            .join(template.unwrap_or(destination))
    }

    /// Destination relative to the target root (the cache key)
    pub fn relative_destination(subdir: &Path, destination: &str) -> PathBuf {
        subdir.join(destination)
    }

    /// Absolute destination path
    pub fn destination_path(&self, subdir: &Path, destination: &str) -> PathBuf {
        self.target_dir
            .join(Self::relative_destination(subdir, destination))
    }

    /// Whether the destination is recorded, present and not older than its template
    pub async fn is_current(
        &self,
        cache: &StepCache,
        subdir: &Path,
        destination: &str,
        template: Option<&str>,
    ) -> ScaffoldResult<bool> {
        let source = self.template_path(subdir, destination, template);
        let source_mtime = template_mtime(&source).await?;
        let relative = Self::relative_destination(subdir, destination);

        if !cache.is_file_done(&relative) {
            return Ok(false);
        }
        Ok(is_fresh(&self.destination_path(subdir, destination), source_mtime).await)
    }

    /// Install a template if needed. Returns `true` if it was copied now.
    pub async fn install(
        &self,
        cache: &mut StepCache,
        subdir: &Path,
        destination: &str,
        template: Option<&str>,
    ) -> ScaffoldResult<bool> {
        if self.is_current(cache, subdir, destination, template).await? {
            debug!(
                "{} is current",
                Self::relative_destination(subdir, destination).display()
            );
            return Ok(false);
        }

        let source = self.template_path(subdir, destination, template);
        let dest = self.destination_path(subdir, destination);

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ScaffoldError::io(format!("creating {}", parent.display()), e))?;
        }
        fs::copy(&source, &dest).await.map_err(|e| {
            ScaffoldError::io(
                format!("copying {} to {}", source.display(), dest.display()),
                e,
            )
        })?;

        info!("Installed {} from {}", dest.display(), source.display());
        cache.mark_file_done(Self::relative_destination(subdir, destination));
        Ok(true)
    }
}

/// Modification time of a template, failing if the template is absent
async fn template_mtime(source: &Path) -> ScaffoldResult<Option<SystemTime>> {
    match fs::metadata(source).await {
        Ok(meta) if meta.is_file() => Ok(meta.modified().ok()),
        Ok(_) => Err(ScaffoldError::MissingTemplate(source.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ScaffoldError::MissingTemplate(source.to_path_buf()))
        }
        Err(e) => Err(ScaffoldError::io(
            format!("reading template {}", source.display()),
            e,
        )),
    }
}

/// A destination is fresh when it exists and is not strictly older than the
/// template. Unknown timestamps count as stale.
async fn is_fresh(dest: &Path, source_mtime: Option<SystemTime>) -> bool {
    let Ok(meta) = fs::metadata(dest).await else {
        return false;
    };
    match (meta.modified().ok(), source_mtime) {
        (Some(dest_mtime), Some(source_mtime)) => dest_mtime >= source_mtime,
        _ => false,
    }
}
