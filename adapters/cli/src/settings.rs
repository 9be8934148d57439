use std::{fs, path::Path, time::Duration};

use agelife_core::{AgePalette, CellColor, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, DEFAULT_DELAY};
use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Presentation settings read from a TOML file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub(crate) struct Settings {
    canvas_width: u32,
    canvas_height: u32,
    delay_ms: u64,
    palette: Option<Vec<String>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            delay_ms: DEFAULT_DELAY.as_millis() as u64,
            palette: None,
        }
    }
}

impl Settings {
    /// Reads settings from the file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid settings file {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse settings toml contents")
    }

    /// Canvas size in pixels as `(width, height)`.
    pub(crate) const fn canvas(&self) -> (u32, u32) {
        (self.canvas_width, self.canvas_height)
    }

    pub(crate) fn delay(&self) -> Result<Duration> {
        if self.delay_ms == 0 {
            bail!("delay-ms must be at least 1");
        }
        Ok(Duration::from_millis(self.delay_ms))
    }

    /// Age palette; the default palette when none is configured.
    pub(crate) fn palette(&self) -> Result<AgePalette> {
        let Some(entries) = &self.palette else {
            return Ok(AgePalette::default());
        };
        let colors = entries
            .iter()
            .map(|entry| parse_color(entry))
            .collect::<Result<Vec<_>>>()?;
        AgePalette::new(colors).context("invalid palette")
    }
}

fn parse_color(entry: &str) -> Result<CellColor> {
    let Some(hex) = entry.strip_prefix('#') else {
        bail!("palette colour `{entry}` must start with `#`");
    };
    if hex.len() != 6 || !hex.is_ascii() {
        bail!("palette colour `{entry}` must have the form #RRGGBB");
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .with_context(|| format!("palette colour `{entry}` is not hexadecimal"))
    };
    Ok(CellColor::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
