//! Newline-delimited word/id lists used as ad-hoc configuration.

use std::{fs, io, path::Path};

use crate::Result;

/// Read a line file: lines are trimmed and blank lines dropped.
///
/// Returns `Ok(None)` when the file does not exist, so callers can tell
/// "absent" apart from "present but empty".
pub fn read_lines(path: &Path) -> Result<Option<Vec<String>>> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    Ok(Some(
        contents
            .split('\n')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect(),
    ))
}

/// Like `read_lines`, but absence and read errors both yield an empty list.
pub fn read_lines_or_empty(path: &Path) -> Vec<String> {
    match read_lines(path) {
        Ok(Some(lines)) => lines,
        Ok(None) => Vec::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read line file");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        let root = PathBuf::from(format!("/tmp/tk-lines-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root).unwrap();
        root
    }

    #[test]
    fn trims_and_drops_blank_lines() {
        let root = scratch("trim");
        let p = root.join("Sticker.txt");
        fs::write(&p, "  a \r\n\n\t\nb\n   \nc").unwrap();

        assert_eq!(
            read_lines(&p).unwrap(),
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn missing_file_is_none_not_error() {
        let root = scratch("missing");
        assert_eq!(read_lines(&root.join("nope.txt")).unwrap(), None);
        assert!(read_lines_or_empty(&root.join("nope.txt")).is_empty());
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn empty_file_is_some_empty() {
        let root = scratch("empty");
        let p = root.join("empty.txt");
        fs::write(&p, "\n \n").unwrap();
        assert_eq!(read_lines(&p).unwrap(), Some(vec![]));
        let _ = fs::remove_dir_all(&root);
    }
}
