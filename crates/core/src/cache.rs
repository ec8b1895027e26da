//! File-based caching for linking results.
//!
//! Results are keyed by a SHA-256 of the linker name, its configuration,
//! the lyrics and the recognized phrases, so any change to an input misses.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use crate::config::AlignConfig;
use crate::types::Phrase;

/// Get the cache directory.
///
/// Uses `LYRICSYNC_CACHE_DIR` env var if set, otherwise `~/.cache/lyricsync`.
pub fn cache_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("LYRICSYNC_CACHE_DIR") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".cache").join("lyricsync")
}

/// SHA-256 over length-prefixed parts, so `["ab", "c"]` and `["a", "bc"]`
/// hash differently.
pub fn content_hash(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part);
    }
    format!("{:x}", hasher.finalize())
}

/// Cache key for one linking run.
pub fn linking_key(
    linker_name: &str,
    config: &AlignConfig,
    lyrics: &str,
    recognized: &[Phrase],
) -> Result<String> {
    let config_json = serde_json::to_vec(config)?;
    let recognized_json = serde_json::to_vec(recognized)?;
    Ok(content_hash(&[
        linker_name.as_bytes(),
        &config_json,
        lyrics.as_bytes(),
        &recognized_json,
    ]))
}

/// Atomically write data to a file via a temp file in the same directory.
fn atomic_write(target: &Path, data: &[u8]) -> Result<()> {
    let parent = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(data)?;
    tmp.persist(target)
        .with_context(|| format!("Failed to persist {}", target.display()))?;
    Ok(())
}

fn short(hash: &str) -> &str {
    &hash[..12.min(hash.len())]
}

fn linking_path(dir: &Path, linker_name: &str, hash: &str) -> PathBuf {
    dir.join("link").join(format!("{}_{}.json", linker_name, hash))
}

/// Return cached linked phrases, or None if not cached or unreadable.
pub fn get_cached_linking(linker_name: &str, hash: &str) -> Option<Vec<Phrase>> {
    read_linking(&cache_dir(), linker_name, hash)
}

/// Store linked phrases in the cache.
pub fn store_linking_cache(linker_name: &str, hash: &str, phrases: &[Phrase]) -> Result<()> {
    write_linking(&cache_dir(), linker_name, hash, phrases)
}

fn read_linking(dir: &Path, linker_name: &str, hash: &str) -> Option<Vec<Phrase>> {
    let path = linking_path(dir, linker_name, hash);
    if !path.exists() {
        return None;
    }
    let data = std::fs::read_to_string(&path).ok()?;
    let phrases: Vec<Phrase> = serde_json::from_str(&data).ok()?;
    log::info!("Cache hit: {} linking ({}...)", linker_name, short(hash));
    Some(phrases)
}

fn write_linking(dir: &Path, linker_name: &str, hash: &str, phrases: &[Phrase]) -> Result<()> {
    let path = linking_path(dir, linker_name, hash);
    let json = serde_json::to_string(phrases)?;
    atomic_write(&path, json.as_bytes())?;
    log::info!("Cached {} linking ({}...)", linker_name, short(hash));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Word;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("lyricsync_{}_{}", name, std::process::id()))
    }

    #[test]
    fn test_content_hash_separates_parts() {
        let a = content_hash(&[b"ab", b"c"]);
        let b = content_hash(&[b"a", b"bc"]);
        assert_ne!(a, b);
        assert_eq!(a, content_hash(&[b"ab", b"c"]));
    }

    #[test]
    fn test_linking_key_tracks_inputs() {
        let config = AlignConfig::default();
        let recognized = vec![Phrase::new("hi", vec![Word::new("hi", 0.0, 1.0)])];
        let base = linking_key("line", &config, "hi", &recognized).unwrap();

        assert_ne!(base, linking_key("word", &config, "hi", &recognized).unwrap());
        assert_ne!(base, linking_key("line", &config, "ho", &recognized).unwrap());

        let stricter = AlignConfig {
            min_line_ratio: 0.9,
            ..AlignConfig::default()
        };
        assert_ne!(base, linking_key("line", &stricter, "hi", &recognized).unwrap());
    }

    #[test]
    fn test_atomic_write() {
        let dir = temp_dir("atomic");
        let path = dir.join("nested").join("test.json");

        atomic_write(&path, b"{\"key\": \"value\"}").unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "{\"key\": \"value\"}");

        atomic_write(&path, b"[]").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_linking_store_and_retrieve() {
        let dir = temp_dir("link_cache");
        let phrases = vec![Phrase::new(
            "hello world",
            vec![Word::new("hello", 0.0, 0.5), Word::new("world", 0.5, 1.0)],
        )];

        assert!(read_linking(&dir, "line", "abc123").is_none());
        write_linking(&dir, "line", "abc123", &phrases).unwrap();
        assert_eq!(read_linking(&dir, "line", "abc123"), Some(phrases));
        assert!(read_linking(&dir, "word", "abc123").is_none());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_corrupt_entry_is_a_miss() {
        let dir = temp_dir("link_corrupt");
        let path = linking_path(&dir, "line", "bad");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"not json").unwrap();

        assert!(read_linking(&dir, "line", "bad").is_none());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_cache_dir_default() {
        let dir = cache_dir();
        assert!(!dir.to_string_lossy().is_empty());
    }
}
