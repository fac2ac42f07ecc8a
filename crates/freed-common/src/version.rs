//! ---
//! freed_section: "01-core-functionality"
//! freed_subsection: "module"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "Build version metadata."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
use serde::Serialize;

/// Version details reported by `--version`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VersionInfo {
    pub name: &'static str,
    pub semver: &'static str,
    pub target_os: &'static str,
    pub target_arch: &'static str,
    pub debug: bool,
}

impl VersionInfo {
    pub fn current() -> Self {
        Self {
            name: "freed",
            semver: env!("CARGO_PKG_VERSION"),
            target_os: std::env::consts::OS,
            target_arch: std::env::consts::ARCH,
            debug: cfg!(debug_assertions),
        }
    }

    pub fn short(&self) -> String {
        format!("{} {}", self.name, self.semver)
    }

    pub fn extended(&self) -> String {
        format!(
            "{} {} ({}-{}{})",
            self.name,
            self.semver,
            self.target_arch,
            self.target_os,
            if self.debug { ", debug" } else { "" }
        )
    }
}
