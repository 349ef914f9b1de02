use colored::Colorize as _;
use std::fmt::{Debug, Display};

#[cfg(feature = "cli")]
use crate::opts;
#[cfg(feature = "cli")]
use structopt::{
    clap::{self, AppSettings},
    StructOpt,
};

#[cfg(feature = "cli")]
pub static SETTINGS: &[AppSettings] = &[
    AppSettings::ColoredHelp,
    AppSettings::DeriveDisplayOrder,
];

#[cfg(feature = "cli")]
#[derive(Clone, Copy, Debug, StructOpt)]
pub struct GlobalFlags {
    #[structopt(
        short = "v",
        long = "verbose",
        about = "Make life louder",
        global = true,
        multiple = true,
        parse(from_occurrences = opts::NoiseLevel::from_occurrences),
    )]
    pub noise_level: opts::NoiseLevel,
}

pub type TextWrapper = textwrap::Wrapper<'static, textwrap::NoHyphenation>;

/// A failure the way it's shown to the user: a headline and the details
/// underneath it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Report {
    msg: String,
    details: String,
}

impl Report {
    pub fn error(msg: impl Display, details: impl Display) -> Self {
        Self {
            msg: msg.to_string(),
            details: details.to_string(),
        }
    }

    pub fn exit_code(&self) -> i8 {
        1
    }

    pub fn format(&self, wrapper: &TextWrapper) -> String {
        format!(
            "{}\n{}\n",
            format!("error: {}", self.msg).bright_red().bold(),
            wrapper.fill(&self.details)
        )
    }

    pub fn print(&self, wrapper: &TextWrapper) {
        eprint!("{}", self.format(wrapper));
    }
}

pub trait Reportable: Debug {
    fn report(&self) -> Report;
}

#[cfg(feature = "cli")]
pub trait Exec: Debug + StructOpt {
    type Report: Reportable;

    fn global_flags(&self) -> GlobalFlags;

    fn exec(self, wrapper: &TextWrapper) -> Result<(), Self::Report>;
}

#[cfg(feature = "cli")]
fn init_logging(noise_level: opts::NoiseLevel) {
    use env_logger::{Builder, Env};
    let default_level = match noise_level {
        opts::NoiseLevel::Polite => "warn",
        opts::NoiseLevel::LoudAndProud => "xcode_add_file=info",
        opts::NoiseLevel::FranklyQuitePedantic => "debug",
    };
    let env = Env::default().default_filter_or(default_level);
    Builder::from_env(env).init();
}

#[cfg(feature = "cli")]
#[derive(Debug)]
enum Exit {
    Report(Report),
    Clap(clap::Error),
}

#[cfg(feature = "cli")]
impl Exit {
    fn report(reportable: impl Reportable) -> Self {
        log::info!("exiting with {:#?}", reportable);
        Self::Report(reportable.report())
    }

    fn do_the_thing(self, wrapper: TextWrapper) -> ! {
        match self {
            Self::Report(report) => {
                report.print(&wrapper);
                // We only expose access to the 8 lsb of the exit code, since:
                // https://doc.rust-lang.org/std/process/fn.exit.html#platform-specific-behavior
                std::process::exit(report.exit_code() as i32)
            }
            Self::Clap(err) => err.exit(),
        }
    }

    fn main(inner: impl FnOnce(&TextWrapper) -> Result<(), Self>) {
        let wrapper = TextWrapper::with_splitter(textwrap::termwidth(), textwrap::NoHyphenation);
        if let Err(exit) = inner(&wrapper) {
            exit.do_the_thing(wrapper)
        }
    }
}

#[cfg(feature = "cli")]
pub fn exec<E: Exec>() {
    Exit::main(|wrapper| {
        let input = E::from_iter_safe(std::env::args()).map_err(Exit::Clap)?;
        init_logging(input.global_flags().noise_level);
        input.exec(wrapper).map_err(Exit::report)
    })
}
