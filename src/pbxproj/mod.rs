//! An in-memory, editable `project.pbxproj`.
//!
//! Objects are kept exactly as parsed (an ordered dictionary keyed by object
//! id) and only the entries touched by an edit change, so saving an unedited
//! project writes back what was read.

mod file_type;
pub mod plist;
mod write;

pub use self::file_type::{BuildPhaseKind, FileType};

use self::plist::{Dict, Value};
use crate::util::{self, cli::Report, cli::Reportable};
use sha2::{Digest as _, Sha256};
use std::{
    fmt::{self, Display},
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

pub static PBXPROJ_FILE_NAME: &str = "project.pbxproj";

static TARGET_ISAS: &[&str] = &["PBXNativeTarget", "PBXAggregateTarget", "PBXLegacyTarget"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    NoHomeDir(#[from] util::NoHomeDir),
    #[error("Failed to read project file at {path:?}: {source}")]
    ReadFailed { path: PathBuf, source: io::Error },
    #[error("Failed to parse project file at {path:?}: {source}")]
    ParseFailed {
        path: PathBuf,
        source: plist::ParseError,
    },
    #[error("Project file at {path:?} doesn't contain a top-level dictionary")]
    NotADict { path: PathBuf },
}

impl Reportable for LoadError {
    fn report(&self) -> Report {
        Report::error("Failed to load Xcode project", self)
    }
}

#[derive(Debug, Error)]
#[error("Failed to write project file to {path:?}: {source}")]
pub struct SaveError {
    pub path: PathBuf,
    pub source: io::Error,
}

impl Reportable for SaveError {
    fn report(&self) -> Report {
        Report::error("Failed to save Xcode project", self)
    }
}

/// The project doesn't have the shape every Xcode project has.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum StructureError {
    #[error("project has no `objects` dictionary")]
    ObjectsMissing,
    #[error("project has no `rootObject`")]
    RootObjectMissing,
    #[error("object {id} is referenced but doesn't exist")]
    ObjectMissing { id: String },
    #[error("object {id} has no `{field}` field")]
    FieldMissing { id: String, field: &'static str },
    #[error("`{field}` of object {id} has the wrong type")]
    FieldInvalid { id: String, field: &'static str },
    #[error("object {id} is a {isa}, not a group")]
    NotAGroup { id: String, isa: String },
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum AddFileError {
    #[error("No target named {name:?} in the project")]
    TargetNotFound { name: String },
    #[error("File path is empty")]
    PathEmpty,
    #[error(transparent)]
    Structure(#[from] StructureError),
}

impl Reportable for AddFileError {
    fn report(&self) -> Report {
        Report::error("Failed to add file to Xcode project", self)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Target {
    pub id: String,
    pub isa: String,
    pub name: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AddFileOptions {
    /// What the file reference's path is relative to.
    pub source_tree: String,
    /// Create a new file reference even if one with the same path exists.
    pub force: bool,
}

impl Default for AddFileOptions {
    fn default() -> Self {
        Self {
            source_tree: "SOURCE_ROOT".to_owned(),
            force: false,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AddFileOutcome {
    pub file_ref: String,
    pub created_ref: bool,
    pub build_files: Vec<String>,
}

impl AddFileOutcome {
    /// Whether the project changed at all.
    pub fn added(&self) -> bool {
        self.created_ref || !self.build_files.is_empty()
    }
}

fn isa(object: &Dict) -> Option<&str> {
    object.get("isa").and_then(Value::as_str)
}

fn str_field<'a>(object: &'a Dict, key: &str) -> Option<&'a str> {
    object.get(key).and_then(Value::as_str)
}

fn id_list(object: &Dict, key: &str) -> Vec<String> {
    object
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

fn new_object(isa: &str, fields: Vec<(&str, Value)>) -> Dict {
    let mut object = Dict::new();
    object.insert("isa".to_owned(), isa.into());
    for (key, value) in fields {
        object.insert(key.to_owned(), value);
    }
    object
}

#[derive(Clone, Debug)]
pub struct Project {
    path: PathBuf,
    root: Dict,
}

impl Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", write::write_project(&self.root, &self.name()))
    }
}

impl Project {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = util::manifest_path(path)?;
        log::info!("loading Xcode project from {:?}", path);
        let contents = fs::read_to_string(&path).map_err(|source| LoadError::ReadFailed {
            path: path.clone(),
            source,
        })?;
        Self::parse(&contents, path)
    }

    /// Parses `contents` as if it had been read from `path`.
    pub fn parse(contents: &str, path: impl Into<PathBuf>) -> Result<Self, LoadError> {
        let path = path.into();
        match plist::parse(contents) {
            Ok(Value::Dict(root)) => Ok(Self { path, root }),
            Ok(_) => Err(LoadError::NotADict { path }),
            Err(source) => Err(LoadError::ParseFailed { path, source }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The project's name, as Xcode shows it: the `.xcodeproj` bundle's stem.
    pub fn name(&self) -> String {
        util::project_name(&self.path)
    }

    pub fn save(&self) -> Result<(), SaveError> {
        self.save_to(&self.path)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), SaveError> {
        let path = path.as_ref();
        log::info!("writing Xcode project to {:?}", path);
        fs::write(path, self.to_string()).map_err(|source| SaveError {
            path: path.to_owned(),
            source,
        })
    }

    pub fn objects(&self) -> Result<&Dict, StructureError> {
        self.root
            .get("objects")
            .and_then(Value::as_dict)
            .ok_or(StructureError::ObjectsMissing)
    }

    fn objects_mut(&mut self) -> Result<&mut Dict, StructureError> {
        self.root
            .get_mut("objects")
            .and_then(Value::as_dict_mut)
            .ok_or(StructureError::ObjectsMissing)
    }

    pub fn object(&self, id: &str) -> Option<&Dict> {
        self.objects().ok()?.get(id).and_then(Value::as_dict)
    }

    fn existing_object(&self, id: &str) -> Result<&Dict, StructureError> {
        self.objects()?
            .get(id)
            .and_then(Value::as_dict)
            .ok_or_else(|| StructureError::ObjectMissing { id: id.to_owned() })
    }

    fn existing_object_mut(&mut self, id: &str) -> Result<&mut Dict, StructureError> {
        self.objects_mut()?
            .get_mut(id)
            .and_then(Value::as_dict_mut)
            .ok_or_else(|| StructureError::ObjectMissing { id: id.to_owned() })
    }

    fn str_field_of(&self, id: &str, field: &'static str) -> Result<String, StructureError> {
        let object = self.existing_object(id)?;
        match object.get(field) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(StructureError::FieldInvalid {
                id: id.to_owned(),
                field,
            }),
            None => Err(StructureError::FieldMissing {
                id: id.to_owned(),
                field,
            }),
        }
    }

    /// Appends `item` to the array `field` of object `id`, creating the array
    /// if the object doesn't have one yet.
    fn push_to(&mut self, id: &str, field: &'static str, item: &str) -> Result<(), StructureError> {
        let object = self.existing_object_mut(id)?;
        object
            .entry(field.to_owned())
            .or_insert_with(|| Value::Array(Vec::new()))
            .as_array_mut()
            .ok_or_else(|| StructureError::FieldInvalid {
                id: id.to_owned(),
                field,
            })?
            .push(item.into());
        Ok(())
    }

    /// Generates an object id that's stable for a given `seed` and unused in
    /// this project.
    fn generate_id(&self, seed: &str) -> Result<String, StructureError> {
        let objects = self.objects()?;
        let mut counter = 0u64;
        loop {
            let digest = Sha256::new()
                .chain_update(seed.as_bytes())
                .chain_update(counter.to_le_bytes())
                .finalize();
            let id = hex::encode_upper(&digest[..12]);
            if !objects.contains_key(&id) {
                return Ok(id);
            }
            counter += 1;
        }
    }

    fn insert_object(&mut self, seed: &str, object: Dict) -> Result<String, StructureError> {
        let id = self.generate_id(seed)?;
        log::debug!("inserting {} {}", isa(&object).unwrap_or("object"), id);
        self.objects_mut()?.insert(id.clone(), Value::Dict(object));
        Ok(id)
    }

    pub fn root_object(&self) -> Result<String, StructureError> {
        self.root
            .get("rootObject")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or(StructureError::RootObjectMissing)
    }

    pub fn main_group(&self) -> Result<String, StructureError> {
        let root = self.root_object()?;
        self.str_field_of(&root, "mainGroup")
    }

    /// Targets in the order the project lists them.
    pub fn targets(&self) -> Result<Vec<Target>, StructureError> {
        let root_id = self.root_object()?;
        let root = self.existing_object(&root_id)?;
        let to_target = |id: &str, object: &Dict| Target {
            id: id.to_owned(),
            isa: isa(object).unwrap_or_default().to_owned(),
            name: str_field(object, "name").unwrap_or_default().to_owned(),
        };
        if root.contains_key("targets") {
            Ok(id_list(root, "targets")
                .iter()
                .filter_map(|id| match self.object(id) {
                    Some(object) => Some(to_target(id, object)),
                    None => {
                        log::warn!("project lists target {} which doesn't exist", id);
                        None
                    }
                })
                .collect())
        } else {
            log::debug!("root object has no `targets`; scanning objects instead");
            Ok(self
                .objects()?
                .iter()
                .filter_map(|(id, object)| {
                    object
                        .as_dict()
                        .filter(|object| isa(object).map_or(false, |isa| TARGET_ISAS.contains(&isa)))
                        .map(|object| to_target(id, object))
                })
                .collect())
        }
    }

    pub fn target_by_name(&self, name: &str) -> Result<Option<Target>, StructureError> {
        Ok(self.targets()?.into_iter().find(|target| target.name == name))
    }

    fn group(&self, id: &str) -> Result<&Dict, StructureError> {
        let object = self.existing_object(id)?;
        match isa(object) {
            Some("PBXGroup") | Some("PBXVariantGroup") => Ok(object),
            other => Err(StructureError::NotAGroup {
                id: id.to_owned(),
                isa: other.unwrap_or_default().to_owned(),
            }),
        }
    }

    /// Returns the child group of `parent` (the main group if `None`) called
    /// `name`, creating it if there isn't one.
    pub fn get_or_create_group(
        &mut self,
        name: &str,
        parent: Option<&str>,
    ) -> Result<String, StructureError> {
        let parent = match parent {
            Some(parent) => parent.to_owned(),
            None => self.main_group()?,
        };
        let existing = id_list(self.group(&parent)?, "children")
            .into_iter()
            .find(|child| {
                self.object(child).map_or(false, |child| {
                    isa(child) == Some("PBXGroup")
                        && str_field(child, "name")
                            .or_else(|| str_field(child, "path"))
                            .map_or(false, |child_name| child_name == name)
                })
            });
        if let Some(existing) = existing {
            log::debug!("reusing group {:?} ({}) under {}", name, existing, parent);
            return Ok(existing);
        }
        let group = self.insert_object(
            &format!("PBXGroup:{}:{}", parent, name),
            new_object(
                "PBXGroup",
                vec![
                    ("children", Value::Array(Vec::new())),
                    ("name", name.into()),
                    ("sourceTree", "<group>".into()),
                ],
            ),
        )?;
        self.push_to(&parent, "children", &group)?;
        log::info!("created group {:?} ({}) under {}", name, group, parent);
        Ok(group)
    }

    /// Resolves a chain of nested groups below the main group, creating
    /// whatever part of it is missing. An empty chain is the main group.
    pub fn get_or_create_group_path<S: AsRef<str>>(
        &mut self,
        names: &[S],
    ) -> Result<String, StructureError> {
        let mut group = self.main_group()?;
        for name in names {
            group = self.get_or_create_group(name.as_ref(), Some(&group))?;
        }
        Ok(group)
    }

    fn find_file_ref(&self, path: &str, source_tree: &str) -> Result<Option<String>, StructureError> {
        Ok(self.objects()?.iter().find_map(|(id, object)| {
            object
                .as_dict()
                .filter(|object| {
                    isa(object) == Some("PBXFileReference")
                        && str_field(object, "path") == Some(path)
                        && str_field(object, "sourceTree") == Some(source_tree)
                })
                .map(|_| id.clone())
        }))
    }

    fn phases_of(&self, target: &str, kind: BuildPhaseKind) -> Result<Vec<String>, StructureError> {
        Ok(id_list(self.existing_object(target)?, "buildPhases")
            .into_iter()
            .filter(|phase| {
                self.object(phase)
                    .and_then(isa)
                    .map_or(false, |isa| isa == kind.isa())
            })
            .collect())
    }

    fn target_builds(
        &self,
        target: &str,
        kind: BuildPhaseKind,
        file_ref: &str,
    ) -> Result<bool, StructureError> {
        Ok(self.phases_of(target, kind)?.iter().any(|phase| {
            self.object(phase)
                .map(|phase| id_list(phase, "files"))
                .unwrap_or_default()
                .iter()
                .filter_map(|build_file| self.object(build_file))
                .any(|build_file| str_field(build_file, "fileRef") == Some(file_ref))
        }))
    }

    fn get_or_create_phase(
        &mut self,
        target: &str,
        kind: BuildPhaseKind,
    ) -> Result<String, StructureError> {
        if let Some(phase) = self.phases_of(target, kind)?.into_iter().next() {
            return Ok(phase);
        }
        let phase = self.insert_object(
            &format!("{}:{}", kind.isa(), target),
            new_object(
                kind.isa(),
                vec![
                    ("buildActionMask", "2147483647".into()),
                    ("files", Value::Array(Vec::new())),
                    ("runOnlyForDeploymentPostprocessing", "0".into()),
                ],
            ),
        )?;
        self.push_to(target, "buildPhases", &phase)?;
        log::info!("created {} {} for target {}", kind.isa(), phase, target);
        Ok(phase)
    }

    /// Adds `path` to the project under `parent` (the main group if `None`)
    /// and builds it in `target_name`, or in every target if `None`.
    ///
    /// A file that's already referenced is reused rather than referenced
    /// twice, and targets that already build it are left alone; if nothing
    /// needed doing the outcome reports so through [`AddFileOutcome::added`].
    pub fn add_file(
        &mut self,
        path: &str,
        parent: Option<&str>,
        target_name: Option<&str>,
        options: &AddFileOptions,
    ) -> Result<AddFileOutcome, AddFileError> {
        let path = path.trim_end_matches('/');
        if path.is_empty() {
            return Err(AddFileError::PathEmpty);
        }
        let targets = match target_name {
            Some(name) => vec![self
                .target_by_name(name)?
                .ok_or_else(|| AddFileError::TargetNotFound {
                    name: name.to_owned(),
                })?],
            None => self.targets()?,
        };
        let parent = match parent {
            Some(parent) => parent.to_owned(),
            None => self.main_group()?,
        };
        self.group(&parent)?;

        let file_type = FileType::from_path(path);
        let existing = if options.force {
            None
        } else {
            self.find_file_ref(path, &options.source_tree)?
        };
        let (file_ref, created_ref) = match existing {
            Some(file_ref) => {
                log::info!("reusing file reference {} for {:?}", file_ref, path);
                (file_ref, false)
            }
            None => {
                let mut fields: Vec<(&str, Value)> =
                    vec![("lastKnownFileType", file_type.last_known_file_type.into())];
                let file_name = path.rsplit('/').next().unwrap_or(path);
                if file_name != path {
                    fields.push(("name", file_name.into()));
                }
                fields.push(("path", path.into()));
                fields.push(("sourceTree", options.source_tree.as_str().into()));
                let file_ref = self.insert_object(
                    &format!("PBXFileReference:{}:{}", options.source_tree, path),
                    new_object("PBXFileReference", fields),
                )?;
                self.push_to(&parent, "children", &file_ref)?;
                log::info!("created file reference {} for {:?}", file_ref, path);
                (file_ref, true)
            }
        };

        let mut build_files = Vec::new();
        if let Some(kind) = file_type.phase {
            for target in &targets {
                if self.target_builds(&target.id, kind, &file_ref)? {
                    log::info!("target {:?} already builds {:?}", target.name, path);
                    continue;
                }
                let phase = self.get_or_create_phase(&target.id, kind)?;
                let build_file = self.insert_object(
                    &format!("PBXBuildFile:{}:{}", file_ref, phase),
                    new_object("PBXBuildFile", vec![("fileRef", file_ref.as_str().into())]),
                )?;
                self.push_to(&phase, "files", &build_file)?;
                log::info!(
                    "added {:?} to {} of target {:?}",
                    path,
                    kind.isa(),
                    target.name
                );
                build_files.push(build_file);
            }
        } else {
            log::info!("{:?} isn't built by any phase; only referencing it", path);
        }

        Ok(AddFileOutcome {
            file_ref,
            created_ref,
            build_files,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    static PODPEACE: &str = include_str!("fixtures/PodPeace.pbxproj");
    static EMPTY: &str = include_str!("fixtures/Empty.pbxproj");
    static SYNCHRONIZED: &str = include_str!("fixtures/Synchronized.pbxproj");

    const FILE: &str = "PodPeace/Views/Episode/EpisodeDetailView.swift";

    fn podpeace() -> Project {
        Project::parse(PODPEACE, "PodPeace.xcodeproj/project.pbxproj").unwrap()
    }

    fn children(project: &Project, group: &str) -> Vec<String> {
        id_list(project.object(group).unwrap(), "children")
    }

    fn group_named(project: &Project, parent: &str, name: &str) -> Vec<String> {
        children(project, parent)
            .into_iter()
            .filter(|child| {
                let child = project.object(child).unwrap();
                isa(child) == Some("PBXGroup")
                    && str_field(child, "name").or_else(|| str_field(child, "path")) == Some(name)
            })
            .collect()
    }

    #[test]
    fn saving_untouched_project_is_lossless() {
        assert_eq!(podpeace().to_string(), PODPEACE);
        let empty = Project::parse(EMPTY, "Empty.xcodeproj/project.pbxproj").unwrap();
        assert_eq!(empty.to_string(), EMPTY);
        let synchronized =
            Project::parse(SYNCHRONIZED, "PodPeace.xcodeproj/project.pbxproj").unwrap();
        assert_eq!(synchronized.to_string(), SYNCHRONIZED);
    }

    #[test]
    fn exception_sets_are_annotated_with_folder_and_target() {
        let project = Project::parse(SYNCHRONIZED, "PodPeace.xcodeproj/project.pbxproj").unwrap();
        let saved = project.to_string();
        let annotated =
            "C10000000000000000000005 /* Exceptions for \"PodPeace\" folder in \"PodPeace\" target */";
        assert_eq!(saved.matches(annotated).count(), 2);
    }

    #[test]
    fn name_comes_from_bundle() {
        assert_eq!(podpeace().name(), "PodPeace");
    }

    #[test]
    fn targets_in_listed_order() {
        let names: Vec<_> = podpeace()
            .targets()
            .unwrap()
            .into_iter()
            .map(|target| (target.name, target.isa))
            .collect();
        assert_eq!(
            names,
            [
                ("PodPeace".to_owned(), "PBXNativeTarget".to_owned()),
                ("PodPeaceTests".to_owned(), "PBXNativeTarget".to_owned()),
            ]
        );
    }

    #[test]
    fn no_targets() {
        let empty = Project::parse(EMPTY, "Empty.xcodeproj/project.pbxproj").unwrap();
        assert!(empty.targets().unwrap().is_empty());
    }

    #[test]
    fn group_chain_is_reused() {
        let mut project = podpeace();
        let main = project.main_group().unwrap();
        let podpeace_group = group_named(&project, &main, "PodPeace").remove(0);
        let views = group_named(&project, &podpeace_group, "Views").remove(0);

        let first = project
            .get_or_create_group_path(&["PodPeace", "Views", "Episode"])
            .unwrap();
        assert_eq!(group_named(&project, &views, "Episode"), [first.clone()]);
        let objects_after_first = project.objects().unwrap().len();

        let second = project
            .get_or_create_group_path(&["PodPeace", "Views", "Episode"])
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(project.objects().unwrap().len(), objects_after_first);
        assert_eq!(group_named(&project, &main, "PodPeace").len(), 1);
        assert_eq!(group_named(&project, &podpeace_group, "Views").len(), 1);
    }

    #[test]
    fn group_parent_must_be_a_group() {
        let mut project = podpeace();
        let target = project.targets().unwrap().remove(0);
        assert_eq!(
            project.get_or_create_group("Episode", Some(&target.id)),
            Err(StructureError::NotAGroup {
                id: target.id,
                isa: "PBXNativeTarget".to_owned()
            })
        );
    }

    #[test]
    fn add_file_wires_reference_and_build_file() {
        let mut project = podpeace();
        let group = project
            .get_or_create_group_path(&["PodPeace", "Views", "Episode"])
            .unwrap();
        let outcome = project
            .add_file(FILE, Some(&group), Some("PodPeace"), &AddFileOptions::default())
            .unwrap();
        assert!(outcome.added());
        assert!(outcome.created_ref);
        assert_eq!(outcome.build_files.len(), 1);

        assert_eq!(children(&project, &group), [outcome.file_ref.clone()]);
        let file_ref = project.object(&outcome.file_ref).unwrap();
        assert_eq!(str_field(file_ref, "isa"), Some("PBXFileReference"));
        assert_eq!(str_field(file_ref, "path"), Some(FILE));
        assert_eq!(str_field(file_ref, "name"), Some("EpisodeDetailView.swift"));
        assert_eq!(str_field(file_ref, "sourceTree"), Some("SOURCE_ROOT"));
        assert_eq!(
            str_field(file_ref, "lastKnownFileType"),
            Some("sourcecode.swift")
        );

        let app = project.target_by_name("PodPeace").unwrap().unwrap();
        let tests = project.target_by_name("PodPeaceTests").unwrap().unwrap();
        assert!(project
            .target_builds(&app.id, BuildPhaseKind::Sources, &outcome.file_ref)
            .unwrap());
        assert!(!project
            .target_builds(&tests.id, BuildPhaseKind::Sources, &outcome.file_ref)
            .unwrap());

        let saved = project.to_string();
        assert!(saved.contains(&format!(
            "{} /* EpisodeDetailView.swift in Sources */ = {{isa = PBXBuildFile; fileRef = {} /* EpisodeDetailView.swift */; }};",
            outcome.build_files[0], outcome.file_ref
        )));
        let reparsed = Project::parse(&saved, project.path()).unwrap();
        assert_eq!(reparsed.to_string(), saved);
    }

    #[test]
    fn add_file_twice_changes_nothing() {
        let mut project = podpeace();
        let group = project
            .get_or_create_group_path(&["PodPeace", "Views", "Episode"])
            .unwrap();
        let options = AddFileOptions::default();
        let first = project
            .add_file(FILE, Some(&group), Some("PodPeace"), &options)
            .unwrap();
        let before = project.to_string();
        let second = project
            .add_file(FILE, Some(&group), Some("PodPeace"), &options)
            .unwrap();
        assert!(!second.added());
        assert_eq!(second.file_ref, first.file_ref);
        assert_eq!(project.to_string(), before);
    }

    #[test]
    fn existing_reference_is_wired_into_another_target() {
        let mut project = podpeace();
        let options = AddFileOptions::default();
        let first = project
            .add_file(FILE, None, Some("PodPeace"), &options)
            .unwrap();
        let second = project
            .add_file(FILE, None, Some("PodPeaceTests"), &options)
            .unwrap();
        assert!(second.added());
        assert!(!second.created_ref);
        assert_eq!(second.file_ref, first.file_ref);
        assert_eq!(second.build_files.len(), 1);
    }

    #[test]
    fn forcing_creates_a_second_reference() {
        let mut project = podpeace();
        let options = AddFileOptions {
            force: true,
            ..Default::default()
        };
        let first = project.add_file(FILE, None, Some("PodPeace"), &options).unwrap();
        let second = project.add_file(FILE, None, Some("PodPeace"), &options).unwrap();
        assert!(second.created_ref);
        assert_ne!(first.file_ref, second.file_ref);
    }

    #[test]
    fn add_file_to_every_target() {
        let mut project = podpeace();
        let outcome = project
            .add_file("Shared/Strings.swift", None, None, &AddFileOptions::default())
            .unwrap();
        assert_eq!(outcome.build_files.len(), 2);
    }

    #[test]
    fn missing_phase_is_created() {
        let mut project = podpeace();
        let tests = project.target_by_name("PodPeaceTests").unwrap().unwrap();
        assert!(project
            .phases_of(&tests.id, BuildPhaseKind::Resources)
            .unwrap()
            .is_empty());
        let outcome = project
            .add_file("Fixtures/episode.json", None, Some("PodPeaceTests"), &AddFileOptions::default())
            .unwrap();
        let phases = project.phases_of(&tests.id, BuildPhaseKind::Resources).unwrap();
        assert_eq!(phases.len(), 1);
        assert_eq!(
            id_list(project.object(&phases[0]).unwrap(), "files"),
            outcome.build_files
        );
    }

    #[test]
    fn unbuilt_file_is_only_referenced() {
        let mut project = podpeace();
        let outcome = project
            .add_file("Config/Debug.xcconfig", None, Some("PodPeace"), &AddFileOptions::default())
            .unwrap();
        assert!(outcome.added());
        assert!(outcome.build_files.is_empty());
        let main = project.main_group().unwrap();
        assert!(children(&project, &main).contains(&outcome.file_ref));
    }

    #[test]
    fn directory_path_is_named_by_its_last_component() {
        let mut project = podpeace();
        let outcome = project
            .add_file("PodPeace/Assets/", None, Some("PodPeace"), &AddFileOptions::default())
            .unwrap();
        let file_ref = project.object(&outcome.file_ref).unwrap();
        assert_eq!(str_field(file_ref, "name"), Some("Assets"));
        assert_eq!(str_field(file_ref, "path"), Some("PodPeace/Assets"));
    }

    #[test]
    fn path_of_only_slashes_is_empty() {
        let mut project = podpeace();
        assert_eq!(
            project.add_file("/", None, Some("PodPeace"), &AddFileOptions::default()),
            Err(AddFileError::PathEmpty)
        );
    }

    #[test]
    fn unknown_target() {
        let mut project = podpeace();
        assert_eq!(
            project.add_file(FILE, None, Some("Widget"), &AddFileOptions::default()),
            Err(AddFileError::TargetNotFound {
                name: "Widget".to_owned()
            })
        );
    }

    #[test]
    fn generated_ids_are_well_formed_and_unique() {
        let mut project = podpeace();
        let a = project.get_or_create_group("A", None).unwrap();
        let b = project.get_or_create_group("B", None).unwrap();
        assert_ne!(a, b);
        for id in &[a, b] {
            assert_eq!(id.len(), 24);
            assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
        }
    }

    #[test]
    fn parse_errors_name_the_file() {
        let err = Project::parse("{ objects = ", "Broken.xcodeproj/project.pbxproj").unwrap_err();
        assert!(matches!(err, LoadError::ParseFailed { .. }));
        assert!(err.to_string().contains("Broken.xcodeproj"));
        assert!(matches!(
            Project::parse("(a, b)", "List.pbxproj").unwrap_err(),
            LoadError::NotADict { .. }
        ));
    }
}
