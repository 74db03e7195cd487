//! In-memory record store.
//!
//! Holds the read-only base collections the tables query: build projects,
//! the recipes available to each project and the packages produced by them.
//! Project-scoped tables take their base collection from the accessors here,
//! so the parent-project boundary is enforced in one place.

use chrono::{NaiveDate, NaiveDateTime};

#[derive(Debug, Clone)]
pub struct Project {
    pub id: u32,
    pub name: String,
    pub created: NaiveDateTime,
    pub updated: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct Recipe {
    pub id: u32,
    pub project_id: u32,
    pub name: String,
    pub version: String,
    pub description: String,
    pub section: String,
    pub license: String,
    pub layer: String,
    pub added: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct Package {
    pub id: u32,
    pub project_id: u32,
    pub name: String,
    pub version: String,
    pub license: String,
    pub size: i64,
}

pub struct DataStore {
    pub projects: Vec<Project>,
    pub recipes: Vec<Recipe>,
    pub packages: Vec<Package>,
}

impl DataStore {
    /// Deterministic sample data, stands in for the build system's own
    /// metadata import.
    pub fn seed() -> Self {
        let projects = vec![
            Project {
                id: 1,
                name: "core-image".into(),
                created: ts(2026, 1, 12, 9, 30),
                updated: ts(2026, 3, 2, 16, 45),
            },
            Project {
                id: 2,
                name: "router-firmware".into(),
                created: ts(2026, 2, 1, 11, 0),
                updated: ts(2026, 2, 20, 8, 15),
            },
        ];

        let recipes = vec![
            recipe(1, 1, "avahi", "1.0", "Service discovery daemon", "network", "LGPLv2.1", "meta-core", ts(2026, 1, 12, 10, 0)),
            recipe(2, 1, "busybox", "2.0", "Tiny versions of common UNIX utilities", "base", "GPLv2", "meta-core", ts(2026, 1, 13, 14, 20)),
            recipe(3, 1, "curl", "8.5", "Command line tool for transferring data", "console/network", "MIT", "meta-core", ts(2026, 1, 14, 9, 5)),
            recipe(4, 1, "dropbear", "2024.84", "Lightweight SSH server and client", "console/network", "MIT", "meta-extras", ts(2026, 2, 2, 12, 40)),
            recipe(5, 1, "e2fsprogs", "1.47", "Ext2/3/4 filesystem utilities", "base", "GPLv2", "meta-core", ts(2026, 2, 10, 17, 55)),
            recipe(6, 2, "iptables", "1.8", "Administration tools for packet filtering", "network", "GPLv2", "meta-networking", ts(2026, 2, 3, 13, 10)),
            recipe(7, 2, "hostapd", "2.10", "User space daemon for access points", "network", "BSD", "meta-networking", ts(2026, 2, 5, 10, 25)),
        ];

        let packages = vec![
            package(1, 1, "avahi-daemon", "1.0", "LGPLv2.1", 180_224),
            package(2, 1, "busybox", "2.0", "GPLv2", 524_288),
            package(3, 1, "curl", "8.5", "MIT", 262_144),
            package(4, 1, "libcurl", "8.5", "MIT", 393_216),
            package(5, 2, "iptables", "1.8", "GPLv2", 221_184),
            package(6, 2, "hostapd", "2.10", "BSD", 450_560),
        ];

        Self {
            projects,
            recipes,
            packages,
        }
    }

    pub fn project(&self, pid: u32) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == pid)
    }

    /// Base collection for the recipes table of one project.
    pub fn project_recipes(&self, pid: u32) -> Vec<Recipe> {
        self.recipes
            .iter()
            .filter(|r| r.project_id == pid)
            .cloned()
            .collect()
    }

    /// Base collection for the packages table of one project.
    pub fn project_packages(&self, pid: u32) -> Vec<Package> {
        self.packages
            .iter()
            .filter(|p| p.project_id == pid)
            .cloned()
            .collect()
    }
}

fn ts(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .expect("valid seed date")
        .and_hms_opt(hour, minute, 0)
        .expect("valid seed time")
}

#[allow(clippy::too_many_arguments)]
fn recipe(
    id: u32,
    project_id: u32,
    name: &str,
    version: &str,
    description: &str,
    section: &str,
    license: &str,
    layer: &str,
    added: NaiveDateTime,
) -> Recipe {
    Recipe {
        id,
        project_id,
        name: name.into(),
        version: version.into(),
        description: description.into(),
        section: section.into(),
        license: license.into(),
        layer: layer.into(),
        added,
    }
}

fn package(id: u32, project_id: u32, name: &str, version: &str, license: &str, size: i64) -> Package {
    Package {
        id,
        project_id,
        name: name.into(),
        version: version.into(),
        license: license.into(),
        size,
    }
}
