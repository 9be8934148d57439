//! Named pattern files listed in a TOML index.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use agelife_system_pattern::PatternDescription;
use anyhow::{bail, Context, Result};
use serde::Deserialize;

const SUPPORTED_INDEX_VERSION: u32 = 1;

/// Collection of pattern files addressed by name.
#[derive(Debug)]
pub(crate) struct PatternLibrary {
    entries: BTreeMap<String, PathBuf>,
}

impl PatternLibrary {
    /// Loads the index located at the provided path.
    pub(crate) fn from_index_path(path: impl AsRef<Path>) -> Result<Self> {
        let index_path = path.as_ref();
        let contents = fs::read_to_string(index_path).with_context(|| {
            format!("failed to read pattern index at {}", index_path.display())
        })?;
        let base = index_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let entries = parse_index(&contents, &base)?;
        Ok(Self { entries })
    }

    /// Pattern names in alphabetical order.
    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub(crate) fn load(&self, name: &str) -> Result<PatternDescription> {
        let path = self
            .entries
            .get(name)
            .with_context(|| format!("pattern `{name}` missing from library"))?;
        load_pattern_file(path)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Index {
    version: u32,
    #[serde(default)]
    pattern: Vec<IndexEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IndexEntry {
    name: String,
    file: PathBuf,
}

fn parse_index(contents: &str, base_path: &Path) -> Result<BTreeMap<String, PathBuf>> {
    let index: Index =
        toml::from_str(contents).context("failed to parse pattern index toml contents")?;
    if index.version != SUPPORTED_INDEX_VERSION {
        bail!(
            "unsupported pattern index version {}; expected {}",
            index.version,
            SUPPORTED_INDEX_VERSION
        );
    }

    let mut entries = BTreeMap::new();
    for entry in index.pattern {
        let path = base_path.join(&entry.file);
        if entries.insert(entry.name.clone(), path).is_some() {
            bail!("pattern index contains duplicate entry `{}`", entry.name);
        }
    }
    Ok(entries)
}

/// Reads a single pattern description from a TOML file.
pub(crate) fn load_pattern_file(path: &Path) -> Result<PatternDescription> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read pattern at {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse pattern toml at {}", path.display()))
}

pub(crate) fn save_pattern_file(path: &Path, description: &PatternDescription) -> Result<()> {
    let contents =
        toml::to_string(description).context("failed to serialise pattern description")?;
    fs::write(path, contents)
        .with_context(|| format!("failed to write pattern at {}", path.display()))
}
