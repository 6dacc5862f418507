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

use std::fmt::Display;
use std::fmt::Formatter;
use std::path::Path;
use std::path::PathBuf;

use percent_encoding::percent_decode_str;

use crate::error::Fallible;
use crate::error::fail;

/// The media referenced by the questions of one bank file.
///
/// `IMG:` and `AUDIO:` fields, and images embedded in Markdown, are written
/// relative to the bank file. A reference is only usable if it names an
/// existing file inside the bank directory.
pub struct BankMedia {
    /// Canonical bank directory.
    root: PathBuf,
    /// Directory containing the bank file.
    base: PathBuf,
    /// The bank file, relative to `root`.
    file: PathBuf,
}

#[derive(Debug, PartialEq)]
pub enum MediaError {
    Empty,
    /// An `http://` or similar URL. These are not ours to check.
    External,
    Missing,
    OutsideBank,
}

impl Display for MediaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaError::Empty => write!(f, "reference is empty."),
            MediaError::External => write!(f, "reference is an external URL."),
            MediaError::Missing => write!(f, "file not found."),
            MediaError::OutsideBank => write!(f, "file is outside the bank directory."),
        }
    }
}

impl BankMedia {
    /// `root` is the bank directory, `file` a bank file relative to it.
    pub fn new(root: &Path, file: &Path) -> Fallible<Self> {
        if file.is_absolute() {
            return fail("bank file path must be relative to the bank directory.");
        }
        let root: PathBuf = root.canonicalize()?;
        if !root.is_dir() {
            return fail("bank directory is not a directory.");
        }
        let base: PathBuf = match root.join(file).parent() {
            Some(parent) => parent.to_path_buf(),
            None => root.clone(),
        };
        Ok(Self {
            root,
            base,
            file: file.to_path_buf(),
        })
    }

    /// Find the file a reference names, as a path relative to the bank
    /// directory. A reference that doesn't exist as written is retried
    /// percent-decoded, so `my%20cat.jpg` finds `my cat.jpg`.
    pub fn locate(&self, reference: &str) -> Result<PathBuf, MediaError> {
        let reference: &str = reference.trim();
        if reference.is_empty() {
            return Err(MediaError::Empty);
        }
        if reference.contains("://") {
            return Err(MediaError::External);
        }
        let decoded: Option<String> = percent_decode_str(reference)
            .decode_utf8()
            .ok()
            .map(|s| s.into_owned())
            .filter(|s| s != reference);
        let mut candidates: Vec<&str> = vec![reference];
        candidates.extend(decoded.as_deref());
        for candidate in candidates {
            // Canonicalizing follows `..` and symlinks, so the prefix check
            // below sees where the file really is. Absolute references simply
            // end up outside the root.
            if let Ok(found) = self.base.join(candidate).canonicalize() {
                return match found.strip_prefix(&self.root) {
                    Ok(relative) => Ok(relative.to_path_buf()),
                    Err(_) => Err(MediaError::OutsideBank),
                };
            }
        }
        Err(MediaError::Missing)
    }

    /// The URL the browser should load for a reference, or `None` if there
    /// is nothing to show.
    pub fn url(&self, reference: &str) -> Option<String> {
        match self.locate(reference) {
            Ok(path) => Some(format!("/file/{}", path.display())),
            Err(MediaError::External) => Some(reference.trim().to_string()),
            Err(e) => {
                log::warn!(
                    "{}: dropping media reference {reference:?}: {e}",
                    self.file.display()
                );
                None
            }
        }
    }
}
