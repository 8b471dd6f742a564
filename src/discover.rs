//! Layer discovery and loading.
//!
//! Resolution order, lowest precedence first:
//! 1. User config (`$LAYERCFG_USER_CONFIG`, or `<config dir>/layercfg/<file>`)
//! 2. Project file (nearest `<file>` in the start directory or its ancestors)

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::Document;
use crate::error::ParseError;
use crate::merge::merge_all;

/// Environment variable overriding the user-level config path.
pub const ENV_USER_CONFIG: &str = "LAYERCFG_USER_CONFIG";

/// Application name for the user config directory.
const APP_NAME: &str = "layercfg";

/// Where a layer came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerSource {
    /// Found in the user config directory.
    UserConfig,

    /// Found by walking up from the working directory.
    ProjectFile,

    /// Given explicitly by the caller.
    Explicit,

    /// Parsed from in-memory text.
    Inline,
}

impl fmt::Display for LayerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerSource::UserConfig => write!(f, "user config"),
            LayerSource::ProjectFile => write!(f, "project file"),
            LayerSource::Explicit => write!(f, "explicit path"),
            LayerSource::Inline => write!(f, "inline text"),
        }
    }
}

/// A loaded document and its origin.
#[derive(Debug, Clone)]
pub struct Layer {
    pub document: Document,
    pub path: Option<PathBuf>,
    pub source: LayerSource,
}

impl Layer {
    pub fn from_path(path: impl Into<PathBuf>, source: LayerSource) -> Result<Self, ParseError> {
        let path = path.into();
        let document = Document::from_path(&path)?;
        debug!(path = %path.display(), %source, "loaded layer");

        Ok(Self {
            document,
            path: Some(path),
            source,
        })
    }

    pub fn inline(text: &str) -> Result<Self, ParseError> {
        Ok(Self {
            document: Document::parse(text)?,
            path: None,
            source: LayerSource::Inline,
        })
    }

    #[must_use]
    pub fn into_document(self) -> Document {
        self.document
    }
}

/// Path of the user-level config file, whether or not it exists.
#[must_use]
pub fn user_config_path(file_name: &str) -> Option<PathBuf> {
    if let Ok(path) = std::env::var(ENV_USER_CONFIG) {
        return Some(PathBuf::from(path));
    }

    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(file_name))
}

/// Nearest `file_name` in `start` or one of its ancestors.
#[must_use]
pub fn find_project_file(start: &Path, file_name: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(file_name))
        .find(|candidate| candidate.is_file())
}

/// Existing layer files in precedence order (lowest first).
#[must_use]
pub fn discover_layers(start: &Path, file_name: &str) -> Vec<(PathBuf, LayerSource)> {
    let mut layers = Vec::with_capacity(2);

    if let Some(path) = user_config_path(file_name).filter(|p| p.is_file()) {
        layers.push((path, LayerSource::UserConfig));
    }

    if let Some(path) = find_project_file(start, file_name) {
        // The user file may itself be the nearest project file.
        if layers.iter().all(|(existing, _)| *existing != path) {
            layers.push((path, LayerSource::ProjectFile));
        }
    }

    debug!(count = layers.len(), file_name, "discovered layers");
    layers
}

/// Load every path in order. Fails on the first unreadable or malformed file.
pub fn load_layers<I, P>(paths: I) -> Result<Vec<Layer>, ParseError>
where
    I: IntoIterator<Item = (P, LayerSource)>,
    P: Into<PathBuf>,
{
    paths
        .into_iter()
        .map(|(path, source)| Layer::from_path(path, source))
        .collect()
}

/// Merge loaded layers into a single document.
#[must_use]
pub fn merge_layers(layers: &[Layer]) -> Document {
    merge_all(layers.iter().map(|layer| &layer.document))
}
