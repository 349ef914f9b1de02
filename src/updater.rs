//! Adds one file to one target of an Xcode project, reporting progress as
//! plain status lines.

use crate::{
    config::Config,
    pbxproj::{self, AddFileOptions, Project, Target},
    util::cli::{Report, Reportable},
};
use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    LoadFailed(#[from] pbxproj::LoadError),
    #[error("Failed to list targets: {0}")]
    TargetsUnreadable(pbxproj::StructureError),
    #[error("Failed to resolve group {group:?}: {source}")]
    GroupFailed {
        group: String,
        source: pbxproj::StructureError,
    },
    #[error(transparent)]
    AddFailed(#[from] pbxproj::AddFileError),
    #[error(transparent)]
    SaveFailed(#[from] pbxproj::SaveError),
    #[error("Failed to write status: {0}")]
    StatusFailed(#[from] io::Error),
}

impl Reportable for Error {
    fn report(&self) -> Report {
        match self {
            Self::LoadFailed(err) => err.report(),
            Self::TargetsUnreadable(err) => Report::error("Xcode project is malformed", err),
            Self::GroupFailed { .. } => Report::error("Xcode project is malformed", self),
            Self::AddFailed(err) => err.report(),
            Self::SaveFailed(err) => err.report(),
            Self::StatusFailed(err) => Report::error("Failed to write to stdout", err),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TargetSelection {
    /// A target had the preferred name.
    Named(Target),
    /// No target had the preferred name, so the first one stands in.
    Fallback(Target),
    Missing,
}

pub fn select_target(targets: Vec<Target>, preferred: &str) -> TargetSelection {
    let mut targets = targets.into_iter().peekable();
    let first = match targets.peek() {
        Some(first) => first.clone(),
        None => return TargetSelection::Missing,
    };
    targets
        .find(|target| target.name == preferred)
        .map(TargetSelection::Named)
        .unwrap_or(TargetSelection::Fallback(first))
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    Added,
    DryRun,
    AlreadyPresent,
    NoTarget,
}

pub fn run(config: &Config, out: &mut impl Write) -> Result<Outcome, Error> {
    let mut project = Project::load(&config.project_path)?;

    let targets = project.targets().map_err(Error::TargetsUnreadable)?;
    let target = match select_target(targets, &config.target_name) {
        TargetSelection::Named(target) => {
            log::info!("found target {:?} ({})", target.name, target.id);
            target
        }
        TargetSelection::Fallback(target) => {
            log::warn!(
                "no target named {:?}; falling back to {:?}",
                config.target_name,
                target.name
            );
            writeln!(out, "Using target: {}", target.name)?;
            target
        }
        TargetSelection::Missing => {
            writeln!(out, "No target found in the project")?;
            return Ok(Outcome::NoTarget);
        }
    };

    let group = project
        .get_or_create_group_path(&config.group_path)
        .map_err(|source| Error::GroupFailed {
            group: config.group_path.join("/"),
            source,
        })?;
    let options = AddFileOptions {
        source_tree: config.source_tree.clone(),
        force: config.duplicate_refs.force(),
    };
    let added = project
        .add_file(&config.file_path, Some(&group), Some(&target.name), &options)?
        .added();

    if !added {
        writeln!(
            out,
            "Failed to add file - it may already exist in the project"
        )?;
        return Ok(Outcome::AlreadyPresent);
    }
    writeln!(out, "Successfully added {} to project", config.file_path)?;
    if config.save_mode.dry_run() {
        writeln!(out, "Dry run; project not saved")?;
        return Ok(Outcome::DryRun);
    }
    project.save()?;
    writeln!(out, "Project saved successfully")?;
    Ok(Outcome::Added)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::opts::{DuplicateRefs, SaveMode};
    use rstest::rstest;
    use std::{fs, path::PathBuf};
    use tempfile::TempDir;

    static PODPEACE: &str = include_str!("pbxproj/fixtures/PodPeace.pbxproj");
    static EMPTY: &str = include_str!("pbxproj/fixtures/Empty.pbxproj");

    fn target(name: &str) -> Target {
        Target {
            id: format!("ID-{}", name),
            isa: "PBXNativeTarget".to_owned(),
            name: name.to_owned(),
        }
    }

    fn project_dir(contents: &str) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("PodPeace.xcodeproj");
        fs::create_dir(&bundle).unwrap();
        let path = bundle.join("project.pbxproj");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    fn config(project_path: PathBuf) -> Config {
        Config {
            project_path,
            ..Default::default()
        }
    }

    fn run_to_string(config: &Config) -> (Outcome, String) {
        let mut out = Vec::new();
        let outcome = run(config, &mut out).unwrap();
        (outcome, String::from_utf8(out).unwrap())
    }

    #[rstest(names, expected,
        case(vec!["PodPeace"], TargetSelection::Named(target("PodPeace"))),
        case(vec!["PodPeaceTests", "Widget", "PodPeace"], TargetSelection::Named(target("PodPeace"))),
        case(vec!["PodPeaceTests", "Widget"], TargetSelection::Fallback(target("PodPeaceTests"))),
        case(vec!["podpeace"], TargetSelection::Fallback(target("podpeace"))),
        case(vec![], TargetSelection::Missing)
    )]
    fn test_select_target(names: Vec<&str>, expected: TargetSelection) {
        let targets = names.into_iter().map(target).collect();
        assert_eq!(select_target(targets, "PodPeace"), expected);
    }

    #[test]
    fn adds_new_file_and_saves() {
        let (_dir, path) = project_dir(PODPEACE);
        let (outcome, out) = run_to_string(&config(path.clone()));
        assert_eq!(outcome, Outcome::Added);
        assert_eq!(
            out,
            "Successfully added PodPeace/Views/Episode/EpisodeDetailView.swift to project\n\
             Project saved successfully\n"
        );
        let saved = fs::read_to_string(&path).unwrap();
        assert_ne!(saved, PODPEACE);
        assert!(saved.contains("EpisodeDetailView.swift in Sources"));
        assert!(saved.contains("name = Episode;"));
    }

    #[test]
    fn second_run_reports_existing_file_and_does_not_save() {
        let (_dir, path) = project_dir(PODPEACE);
        let config = config(path.clone());
        run_to_string(&config);
        let after_first = fs::read_to_string(&path).unwrap();

        let (outcome, out) = run_to_string(&config);
        assert_eq!(outcome, Outcome::AlreadyPresent);
        assert_eq!(
            out,
            "Failed to add file - it may already exist in the project\n"
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), after_first);
        // The `Episode` group made by the first run is reused.
        assert_eq!(after_first.matches("name = Episode;").count(), 1);
    }

    #[test]
    fn falls_back_to_first_target() {
        let (_dir, path) = project_dir(PODPEACE);
        let config = Config {
            target_name: "Podcast".to_owned(),
            ..config(path)
        };
        let (outcome, out) = run_to_string(&config);
        assert_eq!(outcome, Outcome::Added);
        assert!(out.starts_with("Using target: PodPeace\n"));
        assert!(out.ends_with("Project saved successfully\n"));
    }

    #[test]
    fn no_targets_touches_nothing() {
        let (_dir, path) = project_dir(EMPTY);
        let (outcome, out) = run_to_string(&config(path.clone()));
        assert_eq!(outcome, Outcome::NoTarget);
        assert_eq!(out, "No target found in the project\n");
        assert_eq!(fs::read_to_string(&path).unwrap(), EMPTY);
    }

    #[test]
    fn dry_run_leaves_file_alone() {
        let (_dir, path) = project_dir(PODPEACE);
        let config = Config {
            save_mode: SaveMode::DryRun,
            ..config(path.clone())
        };
        let (outcome, out) = run_to_string(&config);
        assert_eq!(outcome, Outcome::DryRun);
        assert!(out.ends_with("Dry run; project not saved\n"));
        assert_eq!(fs::read_to_string(&path).unwrap(), PODPEACE);
    }

    #[test]
    fn forcing_adds_again() {
        let (_dir, path) = project_dir(PODPEACE);
        let config = Config {
            duplicate_refs: DuplicateRefs::Force,
            ..config(path)
        };
        assert_eq!(run_to_string(&config).0, Outcome::Added);
        assert_eq!(run_to_string(&config).0, Outcome::Added);
    }

    #[test]
    fn accepts_bundle_directory() {
        let (_dir, path) = project_dir(PODPEACE);
        let bundle = path.parent().unwrap().to_owned();
        assert_eq!(run_to_string(&config(bundle)).0, Outcome::Added);
    }

    #[test]
    fn missing_project_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        let err = run(&config(dir.path().join("Nope.pbxproj")), &mut out).unwrap_err();
        assert!(matches!(
            err,
            Error::LoadFailed(pbxproj::LoadError::ReadFailed { .. })
        ));
        assert!(out.is_empty());
    }
}
