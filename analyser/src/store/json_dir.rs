use super::ResultStore;
use anyhow::Context;
use glidecore::interface::GlideRecord;
use std::fs;
use std::path::{Path, PathBuf};

const RECORD_EXTENSION: &str = "json";

/// One `<flight_id>.json` document per flight under a root directory.
///
/// Writes go through a temporary file and a rename, so a reader never sees
/// a half-written record.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    pub fn new(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("creating result directory {}", root.display()))?;
        Ok(Self { root })
    }

    /// Store rooted at `<output_dir>/flights`.
    pub fn in_output_dir(output_dir: &Path) -> anyhow::Result<Self> {
        Self::new(output_dir.join("flights"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, flight_id: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", file_stem(flight_id), RECORD_EXTENSION))
    }
}

/// Flight ids come from an external listing; keep them inside the root.
/// Bytes outside `[A-Za-z0-9_-]` become `%XX`, so distinct ids never share
/// a file and the id can be read back from the name.
fn file_stem(flight_id: &str) -> String {
    let mut stem = String::with_capacity(flight_id.len());
    for byte in flight_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            stem.push(byte as char);
        } else {
            stem.push_str(&format!("%{:02X}", byte));
        }
    }
    stem
}

/// Inverse of [`file_stem`]; `None` for names this store did not write.
fn flight_id_from_stem(stem: &str) -> Option<String> {
    let mut bytes = Vec::with_capacity(stem.len());
    let mut rest = stem.as_bytes();
    while let Some((&byte, tail)) = rest.split_first() {
        if byte == b'%' {
            let hex = tail
                .get(..2)
                .filter(|hex| hex.iter().all(u8::is_ascii_hexdigit))?;
            let hex = std::str::from_utf8(hex).ok()?;
            bytes.push(u8::from_str_radix(hex, 16).ok()?);
            rest = &tail[2..];
        } else {
            bytes.push(byte);
            rest = tail;
        }
    }
    String::from_utf8(bytes).ok()
}

impl ResultStore for JsonDirStore {
    fn put(&self, flight_id: &str, record: &GlideRecord) -> anyhow::Result<()> {
        let path = self.path_for(flight_id);
        let staging = path.with_extension("json.tmp");
        let body = serde_json::to_vec(record).context("serializing glide record")?;
        fs::write(&staging, body).with_context(|| format!("writing {}", staging.display()))?;
        fs::rename(&staging, &path).with_context(|| format!("publishing {}", path.display()))?;
        Ok(())
    }

    fn get(&self, flight_id: &str) -> anyhow::Result<Option<GlideRecord>> {
        let path = self.path_for(flight_id);
        if !path.exists() {
            return Ok(None);
        }
        let contents =
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        let record = serde_json::from_str(&contents)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(Some(record))
    }

    fn flight_ids(&self) -> anyhow::Result<Vec<String>> {
        let entries = fs::read_dir(&self.root)
            .with_context(|| format!("listing {}", self.root.display()))?;
        let mut ids = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            if let Some(id) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(flight_id_from_stem)
            {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }
}
