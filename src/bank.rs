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

use quizdrill_core::Question;
use quizdrill_core::parse_bank;
use walkdir::WalkDir;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;

const DEFAULT_NAME: &str = "quizdrill";

/// A question bank loaded from disk.
pub struct Bank {
    /// Display name: from the frontmatter, or else the file or directory name.
    pub name: String,
    /// Absolute path to the directory media paths are served from.
    pub directory: PathBuf,
    /// The bank files, relative to `directory`, in load order.
    pub files: Vec<PathBuf>,
    /// The questions, numbered `1..=n` in load order.
    pub questions: Vec<Question>,
}

impl Bank {
    /// Load a bank from a `.md` file or from a directory of them. Directories
    /// are walked recursively in file name order.
    ///
    /// By default, the current working directory is used.
    pub fn load(path: Option<String>) -> Fallible<Self> {
        let path: PathBuf = match path {
            Some(path) => PathBuf::from(path),
            None => std::env::current_dir()?,
        };
        if !path.exists() {
            return fail("bank path does not exist.");
        }
        let path: PathBuf = path.canonicalize()?;
        let (directory, files) = if path.is_file() {
            if !is_bank_file(&path) {
                return fail("bank file must have the .md extension.");
            }
            let directory: PathBuf = path
                .parent()
                .ok_or_else(|| ErrorReport::new("bank file has no parent directory."))?
                .to_path_buf();
            let file_name: PathBuf = path
                .file_name()
                .map(PathBuf::from)
                .ok_or_else(|| ErrorReport::new("bank file has no name."))?;
            (directory, vec![file_name])
        } else {
            (path.clone(), find_bank_files(&path)?)
        };

        let mut contents: Vec<(String, String)> = Vec::with_capacity(files.len());
        for file in files.iter() {
            let text: String = std::fs::read_to_string(directory.join(file))?;
            contents.push((file.display().to_string(), text));
        }
        let parsed = parse_bank(
            contents
                .iter()
                .map(|(path, text)| (path.as_str(), text.as_str())),
        )?;
        log::debug!(
            "Loaded {} questions from {} files in {}",
            parsed.questions.len(),
            files.len(),
            directory.display()
        );

        let name: String = parsed.name.unwrap_or_else(|| default_name(&path));
        Ok(Self {
            name,
            directory,
            files,
            questions: parsed.questions,
        })
    }
}

fn is_bank_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md")
}

/// Bank files under `root`, relative to it, in file name order.
fn find_bank_files(root: &Path) -> Fallible<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        let path: &Path = entry.path();
        if entry.file_type().is_file() && is_bank_file(path) {
            let relative: &Path = path
                .strip_prefix(root)
                .map_err(|_| ErrorReport::new("bank file is outside the bank directory."))?;
            files.push(relative.to_path_buf());
        }
    }
    Ok(files)
}

fn default_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| DEFAULT_NAME.to_string())
}
