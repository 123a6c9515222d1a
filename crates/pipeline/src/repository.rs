use anyhow::{bail, Context};
use async_trait::async_trait;
use ignore::WalkBuilder;
use repochat_extractor::{Dialect, SourceFile};
use std::path::{Path, PathBuf};

/// Source of repository files
#[async_trait]
pub trait RepositoryClient: Send + Sync {
    /// Allow-listed files of a repository, size cap already applied
    async fn fetch_files(&self, repository_id: &str) -> anyhow::Result<Vec<SourceFile>>;
}

/// Extensions fetched besides the extractor's own dialects
const DOCUMENT_EXTENSIONS: &[&str] = &["kt", "xml", "yml", "yaml", "json", "md", "txt"];

/// Path segments that exclude a file
const SKIPPED_SEGMENTS: &[&str] = &["/test/", "/tests/", "/generated/"];

/// Serves repositories checked out under a local directory, one subdirectory per id
#[derive(Debug, Clone)]
pub struct FileSystemRepository {
    root: PathBuf,
    max_file_bytes: u64,
}

impl FileSystemRepository {
    pub fn new(root: impl AsRef<Path>, max_file_bytes: u64) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            max_file_bytes,
        }
    }

    fn repository_dir(&self, repository_id: &str) -> anyhow::Result<PathBuf> {
        let relative = Path::new(repository_id);
        let escapes = relative.components().any(|component| {
            !matches!(component, std::path::Component::Normal(_))
        });
        if repository_id.is_empty() || escapes {
            bail!("invalid repository id: {repository_id:?}");
        }

        let dir = self.root.join(relative);
        if !dir.is_dir() {
            bail!("repository not found: {}", dir.display());
        }
        Ok(dir)
    }

    /// Scan a checkout (.gitignore aware)
    fn scan(dir: &Path, max_file_bytes: u64) -> anyhow::Result<Vec<SourceFile>> {
        let mut files = Vec::new();

        let mut builder = WalkBuilder::new(dir);
        builder
            .hidden(true)
            .git_ignore(true)
            .git_global(false)
            .git_exclude(true)
            .require_git(false)
            .sort_by_file_path(|a, b| a.cmp(b));

        for result in builder.build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Failed to read entry: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();
            let Some(relative) = relative_path(dir, path) else {
                continue;
            };
            if !is_fetched(&relative) {
                continue;
            }

            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            if size > max_file_bytes {
                log::debug!("Skipping large file {relative} ({size} bytes > {max_file_bytes})");
                continue;
            }

            match std::fs::read_to_string(path) {
                Ok(content) => files.push(SourceFile::new(relative, content)),
                Err(e) => log::warn!("Skipping unreadable file {relative}: {e}"),
            }
        }

        Ok(files)
    }
}

#[async_trait]
impl RepositoryClient for FileSystemRepository {
    async fn fetch_files(&self, repository_id: &str) -> anyhow::Result<Vec<SourceFile>> {
        let dir = self.repository_dir(repository_id)?;
        let max_file_bytes = self.max_file_bytes;

        let files = tokio::task::spawn_blocking(move || Self::scan(&dir, max_file_bytes))
            .await
            .context("repository scan task failed")??;

        log::info!("Fetched {} files for repository {repository_id}", files.len());
        Ok(files)
    }
}

/// Repository-relative, `/`-separated path
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|component| component.as_os_str().to_str())
        .collect::<Option<_>>()?;
    Some(parts.join("/"))
}

/// Extension allow-list plus the test/generated exclusions
fn is_fetched(relative: &str) -> bool {
    let lowered = format!("/{}", relative.to_lowercase());
    if SKIPPED_SEGMENTS.iter().any(|segment| lowered.contains(segment)) {
        return false;
    }

    Dialect::is_supported_path(relative)
        || Path::new(&lowered)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| DOCUMENT_EXTENSIONS.contains(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_is_fetched() {
        assert!(is_fetched("src/App.java"));
        assert!(is_fetched("web/app.tsx"));
        assert!(is_fetched("README.md"));
        assert!(!is_fetched("build.gradle.kts"));
        assert!(!is_fetched("src/test/AppTest.java"));
        assert!(!is_fetched("tests/test_app.py"));
        assert!(!is_fetched("out/Generated/Api.java"));
        assert!(!is_fetched("logo.png"));
    }

    #[tokio::test]
    async fn test_fetch_files() {
        let tmp = TempDir::new().unwrap();
        let repo = tmp.path().join("demo");
        write(&repo, "src/main/App.java", "class App {}");
        write(&repo, "src/test/AppTest.java", "class AppTest {}");
        write(&repo, "web/index.ts", "export const x = 1;");
        write(&repo, "docs/notes.md", "# notes");
        write(&repo, "assets/logo.png", "not really a png");
        write(&repo, "big.py", &"x = 1\n".repeat(100));

        let client = FileSystemRepository::new(tmp.path(), 100);
        let files = client.fetch_files("demo").await.unwrap();

        let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["docs/notes.md", "src/main/App.java", "web/index.ts"]);
        assert_eq!(files[1].content, "class App {}");
    }

    #[tokio::test]
    async fn test_missing_repository_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let client = FileSystemRepository::new(tmp.path(), 100_000);

        let err = client.fetch_files("nope").await.unwrap_err();
        assert!(err.to_string().contains("repository not found"));
    }

    #[tokio::test]
    async fn test_rejects_escaping_ids() {
        let tmp = TempDir::new().unwrap();
        let client = FileSystemRepository::new(tmp.path(), 100_000);

        for id in ["../etc", "/abs", ""] {
            assert!(client.fetch_files(id).await.is_err(), "{id}");
        }
    }
}
