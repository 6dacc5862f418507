// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use std::path::Path;
use std::path::PathBuf;

use tempfile::tempdir;
use walkdir::WalkDir;

use crate::error::ErrorReport;
use crate::error::Fallible;

/// Create a temporary directory that outlives the test, and return its
/// canonical path.
pub fn create_tmp_directory() -> Fallible<PathBuf> {
    let dir: PathBuf = tempdir()?.keep();
    Ok(dir.canonicalize()?)
}

/// Copy the fixture bank under `test/` into a fresh temporary directory and
/// return the path to the copy.
pub fn create_tmp_copy_of_test_directory() -> Fallible<String> {
    let source: PathBuf = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test");
    let target: PathBuf = create_tmp_directory()?;
    copy_tree(&source, &target)?;
    Ok(target.display().to_string())
}

fn copy_tree(source: &Path, target: &Path) -> Fallible<()> {
    for entry in WalkDir::new(source) {
        let entry = entry?;
        let relative: &Path = entry
            .path()
            .strip_prefix(source)
            .map_err(|_| ErrorReport::new("Fixture path is outside the fixture directory."))?;
        let destination: PathBuf = target.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&destination)?;
        } else {
            std::fs::copy(entry.path(), &destination)?;
        }
    }
    Ok(())
}
