use crate::{
    opts::{DuplicateRefs, SaveMode},
    util::cli::{Report, Reportable},
};
use serde::Deserialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

pub static DEFAULT_PROJECT_PATH: &str =
    "/Users/apisoni/dev/podcash/PodPeace.xcodeproj/project.pbxproj";
pub static DEFAULT_FILE_PATH: &str = "PodPeace/Views/Episode/EpisodeDetailView.swift";
pub static DEFAULT_GROUP_PATH: &[&str] = &["PodPeace", "Views", "Episode"];
pub static DEFAULT_TARGET_NAME: &str = "PodPeace";
pub static DEFAULT_SOURCE_TREE: &str = "SOURCE_ROOT";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to canonicalize path while searching for config file: {0}")]
    DiscoverFailed(io::Error),
    #[error("Failed to read config file at {path:?}: {cause}")]
    ReadFailed { path: PathBuf, cause: io::Error },
    #[error("Failed to parse config file at {path:?}: {cause}")]
    ParseFailed {
        path: PathBuf,
        cause: toml::de::Error,
    },
}

impl Reportable for LoadError {
    fn report(&self) -> Report {
        Report::error("Failed to load config", self)
    }
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum ValidationError {
    #[error("The file to add can't be empty.")]
    FileEmpty,
    #[error("Group {index} of the group path is empty.")]
    GroupNameEmpty { index: usize },
    #[error("The target name can't be empty.")]
    TargetEmpty,
}

impl Reportable for ValidationError {
    fn report(&self) -> Report {
        Report::error("Config is invalid", self)
    }
}

/// Settings as they're written in the config file or given on the command
/// line; anything left out falls back to the next layer down.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Raw {
    pub project: Option<PathBuf>,
    pub file: Option<String>,
    pub group: Option<Vec<String>>,
    pub target: Option<String>,
    pub source_tree: Option<String>,
    pub force: Option<bool>,
    pub dry_run: Option<bool>,
}

impl Raw {
    pub fn file_name() -> String {
        format!("{}.toml", crate::NAME)
    }

    pub fn discover_root(cwd: impl AsRef<Path>) -> io::Result<Option<PathBuf>> {
        let file_name = Self::file_name();
        let mut path = cwd.as_ref().canonicalize()?.join(&file_name);
        log::info!("looking for config file at {:?}", path);
        while !path.exists() {
            if let Some(parent) = path.parent().and_then(Path::parent) {
                path = parent.join(&file_name);
                log::info!("looking for config file at {:?}", path);
            } else {
                log::info!("no config file was ever found");
                return Ok(None);
            }
        }
        log::info!("found config file at {:?}", path);
        path.pop();
        Ok(Some(path))
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|cause| LoadError::ReadFailed {
            path: path.to_owned(),
            cause,
        })?;
        toml::from_str(&contents).map_err(|cause| LoadError::ParseFailed {
            path: path.to_owned(),
            cause,
        })
    }

    /// Loads the nearest config file at or above `cwd`, if there is one.
    pub fn load(cwd: impl AsRef<Path>) -> Result<Option<Self>, LoadError> {
        Self::discover_root(cwd)
            .map_err(LoadError::DiscoverFailed)?
            .map(|root_dir| Self::load_from(root_dir.join(Self::file_name())))
            .transpose()
    }

    /// Fields set in `overrides` win.
    pub fn merge(self, overrides: Self) -> Self {
        Self {
            project: overrides.project.or(self.project),
            file: overrides.file.or(self.file),
            group: overrides.group.or(self.group),
            target: overrides.target.or(self.target),
            source_tree: overrides.source_tree.or(self.source_tree),
            force: overrides.force.or(self.force),
            dry_run: overrides.dry_run.or(self.dry_run),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub project_path: PathBuf,
    pub file_path: String,
    pub group_path: Vec<String>,
    pub target_name: String,
    pub source_tree: String,
    pub duplicate_refs: DuplicateRefs,
    pub save_mode: SaveMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_path: PathBuf::from(DEFAULT_PROJECT_PATH),
            file_path: DEFAULT_FILE_PATH.to_owned(),
            group_path: DEFAULT_GROUP_PATH.iter().map(|&name| name.to_owned()).collect(),
            target_name: DEFAULT_TARGET_NAME.to_owned(),
            source_tree: DEFAULT_SOURCE_TREE.to_owned(),
            duplicate_refs: DuplicateRefs::default(),
            save_mode: SaveMode::default(),
        }
    }
}

impl Config {
    pub fn from_raw(raw: Raw) -> Result<Self, ValidationError> {
        let defaults = Self::default();
        let config = Self {
            project_path: raw.project.unwrap_or(defaults.project_path),
            file_path: raw.file.unwrap_or(defaults.file_path),
            group_path: raw.group.unwrap_or(defaults.group_path),
            target_name: raw.target.unwrap_or(defaults.target_name),
            source_tree: raw.source_tree.unwrap_or(defaults.source_tree),
            duplicate_refs: raw
                .force
                .map_or(defaults.duplicate_refs, DuplicateRefs::from_flag),
            save_mode: raw.dry_run.map_or(defaults.save_mode, SaveMode::from_flag),
        };
        if config.file_path.is_empty() {
            return Err(ValidationError::FileEmpty);
        }
        if let Some(index) = config.group_path.iter().position(|name| name.is_empty()) {
            return Err(ValidationError::GroupNameEmpty { index });
        }
        if config.target_name.is_empty() {
            return Err(ValidationError::TargetEmpty);
        }
        log::debug!("resolved config: {:#?}", config);
        Ok(config)
    }
}

/// Splits a slash-separated group path like `PodPeace/Views/Episode`.
pub fn parse_group_path(path: &str) -> Vec<String> {
    let path = path.trim_matches('/');
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('/').map(str::to_owned).collect()
    }
}
