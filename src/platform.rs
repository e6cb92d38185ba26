//! Live environment facts consulted by the condition predicates.
use std::fs;
use std::path::Path;

/// Release files probed for the Linux distribution, in order.
///
/// Each entry names the file and, for files that only signal a family,
/// the identifier to report when the file exists.
const DISTRO_PROBES: &[(&str, DistroProbe)] = &[
    ("etc/os-release", DistroProbe::Key("ID")),
    ("etc/lsb-release", DistroProbe::KeyOr("DISTRIB_ID", "ubuntu")),
    ("etc/debian_version", DistroProbe::Fixed("debian")),
    ("etc/fedora-release", DistroProbe::Fixed("fedora")),
    ("etc/redhat-release", DistroProbe::Fixed("rhel")),
    ("etc/arch-release", DistroProbe::Fixed("arch")),
];

#[derive(Debug, Clone, Copy)]
enum DistroProbe {
    /// Read `KEY=value` from the file.
    Key(&'static str),
    /// Read `KEY=value`, falling back to a fixed id when the key is absent.
    KeyOr(&'static str, &'static str),
    /// The file's existence identifies the distribution.
    Fixed(&'static str),
}

/// Platform information for the current system.
///
/// Detected once at startup and passed to the condition matcher so that
/// no predicate reaches for process-wide state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// Operating system identifier (`linux`, `darwin`, `windows`, ...).
    pub os: String,
    /// Lower-cased Linux distribution id, when detectable.
    pub distro: Option<String>,
    /// Current user name, when known.
    pub user: Option<String>,
}

impl Platform {
    /// Detect the current platform.
    #[must_use]
    pub fn detect() -> Self {
        let os = normalize_os(std::env::consts::OS);
        let distro = if os == "linux" {
            detect_distro_in(Path::new("/"))
        } else {
            None
        };
        Self {
            os,
            distro,
            user: detect_user(),
        }
    }

    /// Create a platform with explicit values.
    #[must_use]
    pub fn new(os: &str, distro: Option<&str>, user: Option<&str>) -> Self {
        Self {
            os: os.to_string(),
            distro: distro.map(str::to_lowercase),
            user: user.map(String::from),
        }
    }

    /// Whether this is a Linux system.
    #[must_use]
    pub fn is_linux(&self) -> bool {
        self.os == "linux"
    }
}

/// Map Rust's OS constant to the identifier users write in conditions.
fn normalize_os(os: &str) -> String {
    match os {
        "macos" => "darwin".to_string(),
        other => other.to_string(),
    }
}

/// Name of the account owning this process, looked up by uid. The
/// environment is only consulted when the uid has no database entry.
#[cfg(unix)]
fn detect_user() -> Option<String> {
    use nix::unistd::{User, getuid};

    User::from_uid(getuid())
        .ok()
        .flatten()
        .map(|user| user.name)
        .or_else(user_from_env)
}

#[cfg(not(unix))]
fn detect_user() -> Option<String> {
    user_from_env()
}

fn user_from_env() -> Option<String> {
    ["USERNAME", "USER", "LOGNAME"]
        .iter()
        .find_map(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
}

/// Probe release files under `root` and return the first distro id found.
pub(crate) fn detect_distro_in(root: &Path) -> Option<String> {
    for (file, probe) in DISTRO_PROBES {
        let path = root.join(file);
        if !path.exists() {
            continue;
        }
        let id = match probe {
            DistroProbe::Key(key) => read_key(&path, key),
            DistroProbe::KeyOr(key, fallback) => {
                Some(read_key(&path, key).unwrap_or_else(|| (*fallback).to_string()))
            }
            DistroProbe::Fixed(id) => Some((*id).to_string()),
        };
        if let Some(id) = id {
            return Some(id.to_lowercase());
        }
    }
    None
}

/// Read `key=value` from a shell-style release file, stripping quotes.
fn read_key(path: &Path, key: &str) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    content.lines().find_map(|line| {
        let (k, v) = line.trim().split_once('=')?;
        if k.trim() != key {
            return None;
        }
        let v = v.trim().trim_matches(|c| c == '"' || c == '\'');
        (!v.is_empty()).then(|| v.to_string())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn platform_detect_reports_an_os() {
        let p = Platform::detect();
        assert!(!p.os.is_empty());
        assert_ne!(p.os, "macos");
    }

    #[cfg(unix)]
    #[test]
    fn user_matches_the_account_database() {
        let Ok(output) = std::process::Command::new("id").arg("-un").output() else {
            return;
        };
        if !output.status.success() {
            return;
        }
        let expected = String::from_utf8_lossy(&output.stdout).trim().to_string();
        assert_eq!(detect_user().as_deref(), Some(expected.as_str()));
    }

    #[test]
    fn platform_new_lowercases_distro() {
        let p = Platform::new("linux", Some("Ubuntu"), Some("alice"));
        assert!(p.is_linux());
        assert_eq!(p.distro.as_deref(), Some("ubuntu"));
        assert_eq!(p.user.as_deref(), Some("alice"));
    }

    #[test]
    fn normalize_os_maps_macos_to_darwin() {
        assert_eq!(normalize_os("macos"), "darwin");
        assert_eq!(normalize_os("linux"), "linux");
        assert_eq!(normalize_os("windows"), "windows");
    }

    #[test]
    fn distro_from_os_release_id() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "etc/os-release",
            "NAME=\"Arch Linux\"\nID=arch\nPRETTY_NAME=\"Arch\"\n",
        );
        assert_eq!(detect_distro_in(tmp.path()).as_deref(), Some("arch"));
    }

    #[test]
    fn distro_os_release_quoted_value() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "etc/os-release", "ID=\"Fedora\"\n");
        assert_eq!(detect_distro_in(tmp.path()).as_deref(), Some("fedora"));
    }

    #[test]
    fn distro_os_release_without_id_falls_through() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "etc/os-release", "NAME=Something\n");
        write(tmp.path(), "etc/debian_version", "12.5\n");
        assert_eq!(detect_distro_in(tmp.path()).as_deref(), Some("debian"));
    }

    #[test]
    fn distro_lsb_release_defaults_to_ubuntu() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "etc/lsb-release", "DISTRIB_RELEASE=22.04\n");
        assert_eq!(detect_distro_in(tmp.path()).as_deref(), Some("ubuntu"));
    }

    #[test]
    fn distro_lsb_release_reads_id() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "etc/lsb-release", "DISTRIB_ID=LinuxMint\n");
        assert_eq!(detect_distro_in(tmp.path()).as_deref(), Some("linuxmint"));
    }

    #[test]
    fn distro_marker_files() {
        for (file, expected) in [
            ("etc/fedora-release", "fedora"),
            ("etc/redhat-release", "rhel"),
            ("etc/arch-release", "arch"),
        ] {
            let tmp = tempfile::tempdir().unwrap();
            write(tmp.path(), file, "");
            assert_eq!(detect_distro_in(tmp.path()).as_deref(), Some(expected));
        }
    }

    #[test]
    fn distro_undetectable() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(detect_distro_in(tmp.path()), None);
    }
}
