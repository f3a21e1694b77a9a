use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Write `data` to `path` through a sibling temp file and a rename.
///
/// Refuses to replace an existing artifact.
pub fn write_new(path: PathBuf, data: &[u8]) -> io::Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    if path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", path.display()),
        ));
    }
    let tmp = tmp_path(&path);
    let mut file = OpenOptions::new().create_new(true).write(true).open(&tmp)?;
    let written = file
        .write_all(data)
        .and_then(|_| file.sync_all())
        .and_then(|_| fs::rename(&tmp, &path));
    if let Err(err) = written {
        remove_file(&tmp);
        return Err(err);
    }
    Ok(path)
}

pub fn remove_file(path: &Path) {
    let _ = fs::remove_file(path);
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_overwrites_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/page.html");
        write_new(path.clone(), b"<html></html>").unwrap();
        let err = write_new(path.clone(), b"other").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read(&path).unwrap(), b"<html></html>");
        let names: Vec<_> = fs::read_dir(dir.path().join("nested"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);
    }
}
