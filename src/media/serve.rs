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

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

#[derive(Debug, PartialEq)]
pub enum ServeError {
    /// Not a plain relative path.
    Rejected,
    NotFound,
    /// Directories and symbolic links.
    NotRegularFile,
}

/// Map the path of a `/file/` request to a file in the bank directory.
///
/// The request comes from the client: only plain relative paths are
/// accepted, and only regular files are served.
pub fn served_file(root: &Path, request: &str) -> Result<PathBuf, ServeError> {
    let request: &Path = Path::new(request);
    let plain: bool = request
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !plain || request.as_os_str().is_empty() {
        return Err(ServeError::Rejected);
    }
    let path: PathBuf = root.join(request);
    let metadata = std::fs::symlink_metadata(&path).map_err(|_| ServeError::NotFound)?;
    if !metadata.file_type().is_file() {
        return Err(ServeError::NotRegularFile);
    }
    // A symlinked directory along the way can still point elsewhere.
    match path.canonicalize() {
        Ok(real) if real.starts_with(root) => Ok(path),
        Ok(_) => Err(ServeError::Rejected),
        Err(_) => Err(ServeError::NotFound),
    }
}

/// The `Content-Type` to serve a media file with, by extension.
pub fn content_type(path: &Path) -> &'static str {
    let extension: String = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use std::fs::create_dir_all;
    use std::fs::write;

    use super::*;
    use crate::error::Fallible;
    use crate::helper::create_tmp_directory;

    #[test]
    fn test_serves_files_inside_bank() -> Fallible<()> {
        let root = create_tmp_directory()?;
        create_dir_all(root.join("unit1/media"))?;
        write(root.join("unit1/media/bus.png"), "")?;
        assert_eq!(
            served_file(&root, "unit1/media/bus.png"),
            Ok(root.join("unit1/media/bus.png"))
        );
        assert_eq!(served_file(&root, "unit1/media/train.png"), Err(ServeError::NotFound));
        assert_eq!(served_file(&root, "unit1/media"), Err(ServeError::NotRegularFile));
        Ok(())
    }

    #[test]
    fn test_rejects_paths_that_escape() -> Fallible<()> {
        let root = create_tmp_directory()?;
        for request in ["", "../secret.txt", "media/../../secret.txt", "/etc/passwd"] {
            assert_eq!(served_file(&root, request), Err(ServeError::Rejected), "{request:?}");
        }
        Ok(())
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn test_rejects_symlinks() -> Fallible<()> {
        use std::os::unix::fs::symlink;

        let root = create_tmp_directory()?;
        let outside = create_tmp_directory()?;
        write(outside.join("secret.mp3"), "")?;
        write(root.join("real.mp3"), "")?;
        symlink(root.join("real.mp3"), root.join("link.mp3"))?;
        symlink(&outside, root.join("elsewhere"))?;
        assert_eq!(served_file(&root, "link.mp3"), Err(ServeError::NotRegularFile));
        assert_eq!(served_file(&root, "elsewhere/secret.mp3"), Err(ServeError::Rejected));
        Ok(())
    }

    #[test]
    fn test_content_type() {
        assert_eq!(content_type(Path::new("a/cat.JPG")), "image/jpeg");
        assert_eq!(content_type(Path::new("happy.mp3")), "audio/mpeg");
        assert_eq!(content_type(Path::new("notes")), "application/octet-stream");
    }
}
