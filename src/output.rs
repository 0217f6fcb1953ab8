//! Files the shell writes: synthesized audio and downloaded books.

use anyhow::{Context, Result};
use folio_core::Download;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Where the audio for one page reading lives. The name is a hash of
/// everything that changes the synthesized result.
pub fn audio_path(
    audio_dir: &Path,
    book_id: &str,
    page: u32,
    language: &str,
    slow: bool,
    text: &str,
) -> PathBuf {
    let mut hasher = Sha256::new();
    // Length-prefix the strings so field boundaries stay unambiguous.
    let mut update_str = |value: &str| {
        hasher.update((value.len() as u64).to_le_bytes());
        hasher.update(value.as_bytes());
    };
    update_str(book_id);
    update_str(language);
    update_str(text);
    hasher.update(page.to_le_bytes());
    hasher.update([u8::from(slow)]);
    let hash = format!("{:x}", hasher.finalize());
    audio_dir.join(format!("tts-{hash}.mp3"))
}

pub fn save_audio(path: &Path, bytes: &[u8]) -> Result<()> {
    write_file(path, bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "Saved audio");
    Ok(())
}

/// Write a download to `target`, or to `download_dir/<file name>` when no
/// target is given. Returns the path written.
pub fn save_download(
    download: &Download,
    download_dir: &Path,
    target: Option<&Path>,
) -> Result<PathBuf> {
    let path = match target {
        Some(path) => path.to_path_buf(),
        None => download_dir.join(safe_file_name(&download.file_name)),
    };
    write_file(&path, &download.bytes)?;
    info!(
        path = %path.display(),
        mime = download.mime,
        bytes = download.bytes.len(),
        "Saved download"
    );
    Ok(path)
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Creating directory {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("Writing {}", path.display()))
}

/// Keep only the last path component of a book id so a download never
/// escapes the download directory.
fn safe_file_name(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .find(|part| !part.is_empty() && *part != "..")
        .unwrap_or("book.pdf");
    base.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn download(name: &str) -> Download {
        Download {
            file_name: name.to_string(),
            mime: "application/pdf",
            bytes: Arc::from(&b"%PDF-1.4 test"[..]),
        }
    }

    #[test]
    fn audio_path_changes_with_inputs() {
        let dir = Path::new("audio");
        let base = audio_path(dir, "a.pdf", 1, "en", false, "hello");
        assert_eq!(base, audio_path(dir, "a.pdf", 1, "en", false, "hello"));
        assert_ne!(base, audio_path(dir, "a.pdf", 2, "en", false, "hello"));
        assert_ne!(base, audio_path(dir, "a.pdf", 1, "en", true, "hello"));
        assert_ne!(base, audio_path(dir, "a.pdf", 1, "fr", false, "hello"));
        assert!(base.starts_with(dir));
        assert_eq!(base.extension().and_then(|e| e.to_str()), Some("mp3"));
    }

    #[test]
    fn audio_path_keeps_fields_apart() {
        let dir = Path::new("audio");
        assert_ne!(
            audio_path(dir, "a.pdf", 1, "en", false, "\u{1}hi"),
            audio_path(dir, "a.pdf", 1, "en\0", true, "hi")
        );
        assert_ne!(
            audio_path(dir, "ab", 1, "en", false, "x"),
            audio_path(dir, "a", 1, "ben", false, "x")
        );
    }

    #[test]
    fn download_lands_in_download_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_download(&download("novel.pdf"), &dir.path().join("out"), None).unwrap();
        assert_eq!(path, dir.path().join("out").join("novel.pdf"));
        assert_eq!(fs::read(&path).unwrap(), b"%PDF-1.4 test");
    }

    #[test]
    fn download_honors_explicit_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("copy.pdf");
        let path = save_download(&download("novel.pdf"), dir.path(), Some(&target)).unwrap();
        assert_eq!(path, target);
        assert!(target.exists());
    }

    #[test]
    fn file_names_cannot_escape() {
        assert_eq!(safe_file_name("../../etc/passwd"), "passwd");
        assert_eq!(safe_file_name("books/a.pdf"), "a.pdf");
        assert_eq!(safe_file_name(".."), "book.pdf");
        assert_eq!(safe_file_name("plain.pdf"), "plain.pdf");
    }

    #[test]
    fn save_audio_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/tts-x.mp3");
        save_audio(&path, b"ID3").unwrap();
        assert_eq!(fs::read(path).unwrap(), b"ID3");
    }
}
