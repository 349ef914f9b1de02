#![deny(unsafe_code)]

pub mod config;
pub mod opts;
pub mod pbxproj;
pub mod updater;
pub mod util;

pub static NAME: &str = "xcode-add-file";
