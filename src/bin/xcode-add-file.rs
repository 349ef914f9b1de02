#![forbid(unsafe_code)]

use std::path::PathBuf;
use structopt::StructOpt;
use xcode_add_file::{
    config::{self, Config, Raw},
    updater,
    util::cli::{self, Exec, GlobalFlags, Report, Reportable, TextWrapper},
};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "xcode-add-file",
    about = "Adds a source file to an Xcode project's group and target",
    settings = cli::SETTINGS
)]
pub struct Input {
    #[structopt(flatten)]
    flags: GlobalFlags,
    #[structopt(
        long = "config",
        about = "Config file to use instead of searching for `xcode-add-file.toml`",
        parse(from_os_str)
    )]
    config: Option<PathBuf>,
    #[structopt(
        long = "project",
        about = "The `.xcodeproj` bundle or its `project.pbxproj`",
        parse(from_os_str)
    )]
    project: Option<PathBuf>,
    #[structopt(long = "file", about = "Path of the file to add, as the project should record it")]
    file: Option<String>,
    #[structopt(long = "group", about = "Slash-separated group path, e.g. `PodPeace/Views/Episode`")]
    group: Option<String>,
    #[structopt(long = "target", about = "Build target to add the file to")]
    target: Option<String>,
    #[structopt(
        long = "source-tree",
        about = "What the file's path is relative to, e.g. `SOURCE_ROOT` or `<group>`"
    )]
    source_tree: Option<String>,
    #[structopt(long = "force", about = "Add a new file reference even if one already exists")]
    force: bool,
    #[structopt(long = "dry-run", about = "Make the changes without saving them")]
    dry_run: bool,
}

impl Input {
    fn overrides(&self) -> Raw {
        Raw {
            project: self.project.clone(),
            file: self.file.clone(),
            group: self.group.as_deref().map(config::parse_group_path),
            target: self.target.clone(),
            source_tree: self.source_tree.clone(),
            force: if self.force { Some(true) } else { None },
            dry_run: if self.dry_run { Some(true) } else { None },
        }
    }
}

#[derive(Debug)]
pub enum Error {
    ConfigLoadFailed(config::LoadError),
    ConfigInvalid(config::ValidationError),
    UpdateFailed(updater::Error),
}

impl Reportable for Error {
    fn report(&self) -> Report {
        match self {
            Self::ConfigLoadFailed(err) => err.report(),
            Self::ConfigInvalid(err) => err.report(),
            Self::UpdateFailed(err) => err.report(),
        }
    }
}

impl Exec for Input {
    type Report = Error;

    fn global_flags(&self) -> GlobalFlags {
        self.flags
    }

    fn exec(self, _wrapper: &TextWrapper) -> Result<(), Self::Report> {
        let file_config = match &self.config {
            Some(path) => Raw::load_from(path).map_err(Error::ConfigLoadFailed)?,
            None => Raw::load(".")
                .map_err(Error::ConfigLoadFailed)?
                .unwrap_or_default(),
        };
        let config =
            Config::from_raw(file_config.merge(self.overrides())).map_err(Error::ConfigInvalid)?;
        let stdout = std::io::stdout();
        updater::run(&config, &mut stdout.lock())
            .map(|outcome| log::info!("finished with {:?}", outcome))
            .map_err(Error::UpdateFailed)
    }
}

fn main() {
    cli::exec::<Input>()
}
