use crate::pbxproj::PBXPROJ_FILE_NAME;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Failed to get user's home directory!")]
pub struct NoHomeDir;

pub fn home_dir() -> Result<PathBuf, NoHomeDir> {
    home::home_dir().ok_or(NoHomeDir)
}

pub fn expand_home(path: impl AsRef<Path>) -> Result<PathBuf, NoHomeDir> {
    let path = path.as_ref();
    if let Ok(path) = path.strip_prefix("~") {
        Ok(home_dir()?.join(path))
    } else {
        Ok(path.to_owned())
    }
}

/// Accepts either a `project.pbxproj` or the `.xcodeproj` bundle containing
/// it, and returns the path of the former.
pub fn manifest_path(path: impl AsRef<Path>) -> Result<PathBuf, NoHomeDir> {
    let path = expand_home(path)?;
    let is_bundle = path.is_dir()
        || path
            .extension()
            .map_or(false, |ext| ext == "xcodeproj");
    if is_bundle {
        Ok(path.join(PBXPROJ_FILE_NAME))
    } else {
        Ok(path)
    }
}

/// `Foo.xcodeproj/project.pbxproj` is the project `Foo`.
pub fn project_name(manifest_path: &Path) -> String {
    manifest_path
        .parent()
        .filter(|bundle| bundle.extension().map_or(false, |ext| ext == "xcodeproj"))
        .and_then(Path::file_stem)
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest(path, result,
        case("PodPeace.xcodeproj", "PodPeace.xcodeproj/project.pbxproj"),
        case("PodPeace.xcodeproj/project.pbxproj", "PodPeace.xcodeproj/project.pbxproj"),
        case("/tmp/odd/location.pbxproj", "/tmp/odd/location.pbxproj")
    )]
    fn test_manifest_path(path: &str, result: &str) {
        assert_eq!(manifest_path(path).unwrap(), PathBuf::from(result));
    }

    #[test]
    fn manifest_path_of_bundle_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            manifest_path(dir.path()).unwrap(),
            dir.path().join("project.pbxproj")
        );
    }

    #[test]
    fn expands_home() {
        let home = home_dir().unwrap();
        assert_eq!(
            expand_home("~/dev/podcash").unwrap(),
            home.join("dev").join("podcash")
        );
        assert_eq!(expand_home("/dev/null").unwrap(), PathBuf::from("/dev/null"));
    }

    #[rstest(path, name,
        case("/Users/apisoni/dev/podcash/PodPeace.xcodeproj/project.pbxproj", "PodPeace"),
        case("My App.xcodeproj/project.pbxproj", "My App"),
        case("loose/project.pbxproj", ""),
        case("project.pbxproj", "")
    )]
    fn test_project_name(path: &str, name: &str) {
        assert_eq!(project_name(Path::new(path)), name);
    }
}
