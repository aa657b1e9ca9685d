//! The fixed set of native libraries and how each one is built.

use anyhow::{bail, Result};

/// Upstream archive fetched and verified before building.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveSpec {
    pub base_url: &'static str,
    pub filename: &'static str,
    /// SHA-256 of `filename`, lowercase hex.
    pub sha256: &'static str,
    /// Top-level directory the archive unpacks to.
    pub extracted_dir: &'static str,
    /// Vendored wrapper script, relative to the recipe's source dir.
    pub build_script: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeKind {
    /// CMake project checked out under the source root.
    CMake {
        defines: &'static [(&'static str, &'static str)],
        /// Paths under the install prefix deleted after `install`.
        remove_after_install: &'static [&'static str],
    },
    /// Verified tarball built by a wrapper script.
    Archive(ArchiveSpec),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recipe {
    pub name: &'static str,
    /// What the library is for; shown by `prebuilt list`.
    pub role: &'static str,
    /// Directory under the source root.
    pub source_dir: &'static str,
    pub kind: RecipeKind,
}

pub const RECIPES: &[Recipe] = &[
    Recipe {
        name: "glog",
        role: "logging",
        source_dir: "glog",
        kind: RecipeKind::CMake {
            defines: &[
                ("WITH_GFLAGS", "OFF"),
                ("WITH_GTEST", "OFF"),
                ("WITH_UNWIND", "OFF"),
                ("BUILD_TESTING", "OFF"),
            ],
            remove_after_install: &["lib/pkgconfig"],
        },
    },
    Recipe {
        name: "leveldb",
        role: "key-value storage",
        source_dir: "leveldb",
        kind: RecipeKind::CMake {
            defines: &[
                ("LEVELDB_BUILD_TESTS", "OFF"),
                ("LEVELDB_BUILD_BENCHMARKS", "OFF"),
            ],
            remove_after_install: &[],
        },
    },
    Recipe {
        name: "lua",
        role: "scripting",
        source_dir: "lua",
        kind: RecipeKind::CMake {
            defines: &[("LUA_BUILD_BINARY", "OFF"), ("LUA_BUILD_COMPILER", "OFF")],
            remove_after_install: &[],
        },
    },
    Recipe {
        name: "marisa",
        role: "trie",
        source_dir: "marisa-trie",
        kind: RecipeKind::CMake {
            defines: &[("BUILD_TESTING", "OFF")],
            remove_after_install: &["lib/pkgconfig"],
        },
    },
    Recipe {
        name: "yaml-cpp",
        role: "YAML",
        source_dir: "yaml-cpp",
        kind: RecipeKind::CMake {
            defines: &[
                ("YAML_CPP_BUILD_TESTS", "OFF"),
                ("YAML_CPP_BUILD_TOOLS", "OFF"),
                ("YAML_CPP_BUILD_CONTRIB", "OFF"),
            ],
            remove_after_install: &["lib/pkgconfig", "share"],
        },
    },
    Recipe {
        name: "boost",
        role: "boilerplate",
        source_dir: "boost",
        kind: RecipeKind::Archive(ArchiveSpec {
            base_url: "https://archives.boost.io/release/1.84.0/source",
            filename: "boost_1_84_0.tar.bz2",
            sha256: "cc4b893acf645c9d4b698e9a0f08ca8846aa5d6c68275c14c3e7949c24109454",
            extracted_dir: "boost_1_84_0",
            build_script: "build-boost.sh",
        }),
    },
];

pub fn find(name: &str) -> Result<&'static Recipe> {
    match RECIPES.iter().find(|r| r.name == name) {
        Some(r) => Ok(r),
        None => {
            let known: Vec<&str> = RECIPES.iter().map(|r| r.name).collect();
            bail!("unknown library {:?} (expected one of {})", name, known.join(", "))
        }
    }
}

/// Recipes named in `names`, in table order. An empty selection means all of them.
pub fn select<S: AsRef<str>>(names: &[S]) -> Result<Vec<&'static Recipe>> {
    if names.is_empty() {
        return Ok(RECIPES.iter().collect());
    }
    for name in names {
        find(name.as_ref())?;
    }
    Ok(RECIPES
        .iter()
        .filter(|r| names.iter().any(|n| n.as_ref() == r.name))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::normalize_sha256;

    #[test]
    fn names_are_unique() {
        for (i, a) in RECIPES.iter().enumerate() {
            assert!(RECIPES[i + 1..].iter().all(|b| b.name != a.name), "{}", a.name);
        }
    }

    #[test]
    fn archive_digests_are_well_formed() {
        for r in RECIPES {
            if let RecipeKind::Archive(a) = r.kind {
                assert_eq!(normalize_sha256(a.sha256).as_deref(), Some(a.sha256));
            }
        }
    }

    #[test]
    fn select_keeps_table_order() {
        let picked = select(&["yaml-cpp", "glog"]).unwrap();
        let names: Vec<_> = picked.iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["glog", "yaml-cpp"]);
    }

    #[test]
    fn empty_selection_is_everything() {
        let none: [&str; 0] = [];
        assert_eq!(select(&none).unwrap().len(), RECIPES.len());
    }

    #[test]
    fn unknown_library_is_error() {
        let err = select(&["glog", "openssl"]).unwrap_err();
        assert!(err.to_string().contains("\"openssl\""));
    }

    #[test]
    fn glog_drops_pkgconfig() {
        match find("glog").unwrap().kind {
            RecipeKind::CMake {
                remove_after_install,
                ..
            } => assert_eq!(remove_after_install, &["lib/pkgconfig"]),
            RecipeKind::Archive(_) => panic!("glog is a CMake project"),
        }
    }
}
