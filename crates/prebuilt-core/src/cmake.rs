//! CMake configure/build command lines for one library and one ABI.

use crate::abi::Abi;
use crate::exec::CommandSpec;
use crate::toolchain::Toolchain;
use std::path::{Path, PathBuf};

/// Settings shared by every CMake build in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CMakeSettings {
    /// `ANDROID_STL`, e.g. `c++_shared`.
    pub stl: String,
    /// `CMAKE_BUILD_TYPE`, e.g. `Release`.
    pub build_type: String,
}

impl Default for CMakeSettings {
    fn default() -> Self {
        Self {
            stl: "c++_shared".to_string(),
            build_type: "Release".to_string(),
        }
    }
}

/// One CMake project build: source dir, build dir, install prefix and extra `-D` defines.
#[derive(Debug, Clone)]
pub struct CMakeBuild<'a> {
    pub toolchain: &'a Toolchain,
    pub settings: &'a CMakeSettings,
    pub abi: Abi,
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub install_dir: PathBuf,
    pub defines: &'a [(&'static str, &'static str)],
}

fn define(name: &str, value: impl AsRef<str>) -> String {
    format!("-D{}={}", name, value.as_ref())
}

fn path_str(p: &Path) -> String {
    p.display().to_string()
}

impl CMakeBuild<'_> {
    /// `cmake -B<build> -G Ninja -D...`, run from the source directory.
    pub fn configure(&self) -> CommandSpec {
        let tc = self.toolchain;
        let mut args = vec![
            format!("-B{}", path_str(&self.build_dir)),
            "-G".to_string(),
            "Ninja".to_string(),
            define("CMAKE_TOOLCHAIN_FILE", path_str(&tc.toolchain_file())),
            define("CMAKE_MAKE_PROGRAM", path_str(&tc.ninja)),
            define("ANDROID_ABI", self.abi.as_str()),
            define("ANDROID_PLATFORM", &tc.platform),
            define("ANDROID_STL", &self.settings.stl),
            define("CMAKE_INSTALL_PREFIX", path_str(&self.install_dir)),
            define("CMAKE_BUILD_TYPE", &self.settings.build_type),
            define("BUILD_SHARED_LIBS", "OFF"),
        ];
        args.extend(self.defines.iter().map(|(k, v)| define(k, v)));
        CommandSpec::new(&tc.cmake)
            .args(args)
            .current_dir(&self.source_dir)
    }

    /// `cmake --build <build> --target install`.
    pub fn build_install(&self) -> CommandSpec {
        CommandSpec::new(&self.toolchain.cmake)
            .arg("--build")
            .arg(&self.build_dir)
            .args(["--target", "install"])
            .current_dir(&self.source_dir)
    }
}
