use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub enum NoiseLevel {
    Polite,
    LoudAndProud,
    FranklyQuitePedantic,
}

impl Default for NoiseLevel {
    fn default() -> Self {
        Self::Polite
    }
}

impl NoiseLevel {
    pub fn from_occurrences(occurrences: u64) -> Self {
        match occurrences {
            0 => Self::Polite,
            1 => Self::LoudAndProud,
            _ => Self::FranklyQuitePedantic,
        }
    }
}

/// Whether an already-referenced file gets a second file reference.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DuplicateRefs {
    Reuse,
    Force,
}

impl Default for DuplicateRefs {
    fn default() -> Self {
        Self::Reuse
    }
}

impl DuplicateRefs {
    pub fn from_flag(flag: bool) -> Self {
        if flag {
            Self::Force
        } else {
            Self::Reuse
        }
    }

    pub fn force(self) -> bool {
        matches!(self, Self::Force)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SaveMode {
    Write,
    DryRun,
}

impl Default for SaveMode {
    fn default() -> Self {
        Self::Write
    }
}

impl SaveMode {
    pub fn from_flag(dry_run: bool) -> Self {
        if dry_run {
            Self::DryRun
        } else {
            Self::Write
        }
    }

    pub fn dry_run(self) -> bool {
        matches!(self, Self::DryRun)
    }
}
