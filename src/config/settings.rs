use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use crate::ext::BestEffortPathExt;

const SETTINGS_FILE_NAME: &str = "gittier.yaml";

pub const DEFAULT_TREE_FILE: &str = "filetree.yaml";
pub const DEFAULT_METADATA_BRANCH: &str = "gittier/filetree";
pub const DEFAULT_MAIN_BRANCH: &str = "main";

fn get_settings_file_path(root: &Path) -> PathBuf {
    root.join(SETTINGS_FILE_NAME)
}

/// Values from `gittier.yaml`. Unset keys fall through to the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub tree_file: Option<String>,
    pub metadata_branch: Option<String>,
    pub main_branch: Option<String>,
}

impl Settings {
    /// Reads the settings file under `root`; a missing file means no overrides.
    pub async fn read(root: &Path) -> Result<Self, SettingsError> {
        let path = get_settings_file_path(root);
        if !path.is_file() {
            debug!(
                "No settings file at {}, using defaults",
                path.best_effort_path_display()
            );
            return Ok(Self::default());
        }
        Self::from_path(path).await
    }

    pub async fn from_path(path: PathBuf) -> Result<Self, SettingsError> {
        debug!("Reading settings file: {}", path.best_effort_path_display());
        let bytes = compio::fs::read(&path).await.context(ReadSnafu {
            file_path: path.best_effort_path_display(),
        })?;
        let contents = String::from_utf8(bytes).context(EncodingSnafu {
            file_path: path.best_effort_path_display(),
        })?;
        contents.as_str().try_into()
    }

    pub fn tree_file(&self) -> &str {
        self.tree_file.as_deref().unwrap_or(DEFAULT_TREE_FILE)
    }

    pub fn metadata_branch(&self) -> &str {
        self.metadata_branch
            .as_deref()
            .unwrap_or(DEFAULT_METADATA_BRANCH)
    }

    pub fn main_branch(&self) -> &str {
        self.main_branch.as_deref().unwrap_or(DEFAULT_MAIN_BRANCH)
    }

    fn string_setting(
        top_level: &LinkedHashMap<Yaml, Yaml>,
        key: &'static str,
    ) -> Result<Option<String>, SettingsError> {
        match top_level.get(&Yaml::Value(Scalar::String(Cow::Borrowed(key)))) {
            None | Some(Yaml::Value(Scalar::Null)) => Ok(None),
            Some(value) => {
                let value = value.as_str().context(NotAStringSnafu { key })?.trim();
                ensure!(!value.is_empty(), EmptyValueSnafu { key });
                Ok(Some(value.to_string()))
            }
        }
    }
}

impl TryFrom<&str> for Settings {
    type Error = SettingsError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let contents_vec =
            Yaml::load_from_str(contents).map_err(|e| SettingsError::ParseError { source: e })?;
        // An empty file sets nothing.
        let Some(contents) = contents_vec.first() else {
            return Ok(Self::default());
        };

        let top_level = contents.as_mapping().ok_or(SettingsError::TopLevelNotMap)?;

        for key in top_level.keys() {
            match key.as_str() {
                Some("tree_file" | "metadata_branch" | "main_branch") => {}
                _ => warn!("Ignoring unknown settings key: {:?}", key),
            }
        }

        Ok(Settings {
            tree_file: Self::string_setting(top_level, "tree_file")?,
            metadata_branch: Self::string_setting(top_level, "metadata_branch")?,
            main_branch: Self::string_setting(top_level, "main_branch")?,
        })
    }
}

#[derive(Debug, Snafu)]
pub enum SettingsError {
    #[snafu(display("Failed to read the settings file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("The settings file {} is not valid UTF-8", file_path))]
    EncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the settings file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Top level of the settings file should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Setting '{}' should be a string", key))]
    NotAString { key: &'static str },
    #[snafu(display("Setting '{}' must not be empty", key))]
    EmptyValue { key: &'static str },
}
