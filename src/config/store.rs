use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use serde_json::{Map, Value};
use tempfile::NamedTempFile;

use crate::config::settings::{self, Settings, RECOGNIZED_KEYS};
use crate::error::ConfigError;

/// The settings file plus its parsed, typed view.
///
/// Rewrites go through a temp file in the same directory and a rename, so a
/// crash mid-write leaves either the old or the new file, never half a line.
pub struct ConfigStore {
    path: PathBuf,
    current: RwLock<Settings>,
}

impl ConfigStore {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = read(&path)?;

        let map: Map<String, Value> = content
            .lines()
            .filter_map(settings::parse_line)
            .map(|(key, value)| (key.to_string(), value))
            .collect();

        let current = Settings::from_map(map).map_err(|source| ConfigError::Invalid {
            path: path.clone(),
            source,
        })?;

        tracing::debug!("Loaded settings from {}", path.display());
        Ok(Self {
            path,
            current: RwLock::new(current),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the current settings.
    pub fn settings(&self) -> Settings {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Persist the recognized keys of `next` and make it current.
    ///
    /// Only lines that already assign a recognized key are replaced; every
    /// other line is written back verbatim and missing keys are not appended.
    pub fn apply(&self, next: Settings) -> Result<(), ConfigError> {
        let updates = next.to_map().map_err(|source| ConfigError::Invalid {
            path: self.path.clone(),
            source,
        })?;

        let content = read(&self.path)?;
        let rewritten = rewrite_lines(&content, &updates);
        self.write_atomically(&rewritten)?;

        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = next;
        Ok(())
    }

    fn write_atomically(&self, content: &str) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(content.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Replace the value of each line whose key is a recognized key present in
/// `updates`. Line endings are kept as they were.
pub fn rewrite_lines(content: &str, updates: &Map<String, Value>) -> String {
    let mut out = String::with_capacity(content.len());

    for line in content.split_inclusive('\n') {
        let body = line.trim_end_matches(['\n', '\r']);
        let ending = &line[body.len()..];

        let replacement = settings::parse_line(body)
            .map(|(key, _)| key)
            .filter(|key| RECOGNIZED_KEYS.contains(key))
            .and_then(|key| updates.get(key).map(|value| (key, value)));

        match replacement {
            Some((key, value)) => {
                out.push_str(&format!("{} = {}", key, settings::render_value(value)));
                out.push_str(ending);
            }
            None => out.push_str(line),
        }
    }

    out
}
