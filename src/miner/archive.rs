//! Reading descriptor entries out of jar and zip archives.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::miner::MinerError;

/// Read the text of every file entry whose name satisfies `wanted`, in
/// archive order. Nothing is extracted to disk.
pub fn read_entries(
    path: &Path,
    wanted: impl Fn(&str) -> bool,
) -> Result<Vec<(String, String)>, MinerError> {
    let archive_error = |source| MinerError::Archive {
        path: path.to_path_buf(),
        source,
    };
    let io_error = |source| MinerError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_error)?;
    let mut archive = ZipArchive::new(file).map_err(archive_error)?;

    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(archive_error)?;
        if entry.is_dir() || !wanted(entry.name()) {
            continue;
        }
        let name = entry.name().to_string();
        let mut contents = String::new();
        entry.read_to_string(&mut contents).map_err(io_error)?;
        entries.push((name, contents));
    }
    Ok(entries)
}

/// Jars distributed next to `jar` that belong to the same modules:
/// `<stem>-src.jar`, `<stem>-generator.jar` and `<stem>-N-generator.jar`.
pub fn sibling_jars(jar: &Path) -> Vec<PathBuf> {
    let (Some(stem), Some(parent)) = (jar.file_stem(), jar.parent()) else {
        return Vec::new();
    };
    let stem = stem.to_string_lossy();
    let extension = jar
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "jar".to_string());

    let mut names = vec![
        format!("{}-src.{}", stem, extension),
        format!("{}-generator.{}", stem, extension),
    ];
    names.extend((0..=10).map(|i| format!("{}-{}-generator.{}", stem, i, extension)));

    names
        .into_iter()
        .map(|name| parent.join(name))
        .filter(|p| p.metadata().map(|m| m.is_file() && m.len() > 0).unwrap_or(false))
        .collect()
}

/// Whether a jar is a companion of some base jar and never scanned alone.
pub fn is_companion_jar(jar: &Path) -> bool {
    jar.file_stem()
        .map(|s| {
            let s = s.to_string_lossy();
            s.ends_with("-src") || s.ends_with("-generator")
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::FileOptions;

    fn write_jar(path: &Path, entries: &[(&str, &str)]) {
        let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
        for (name, contents) in entries {
            zip.start_file(*name, FileOptions::default()).unwrap();
            zip.write_all(contents.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_read_entries_filters() {
        let tmp = TempDir::new().unwrap();
        let jar = tmp.path().join("a.jar");
        write_jar(
            &jar,
            &[
                ("META-INF/module.xml", "<module/>"),
                ("a/B.class", "xx"),
                ("module/a.msd", "<solution/>"),
            ],
        );

        let entries = read_entries(&jar, |name| name.ends_with(".xml") || name.ends_with(".msd")).unwrap();
        let names: Vec<_> = entries.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["META-INF/module.xml", "module/a.msd"]);
        assert_eq!(entries[1].1, "<solution/>");
    }

    #[test]
    fn test_read_entries_rejects_non_archive() {
        let tmp = TempDir::new().unwrap();
        let jar = tmp.path().join("broken.jar");
        std::fs::write(&jar, "not a zip").unwrap();
        assert!(matches!(
            read_entries(&jar, |_| true),
            Err(MinerError::Archive { .. })
        ));
    }

    #[test]
    fn test_sibling_jars() {
        let tmp = TempDir::new().unwrap();
        let jar = tmp.path().join("lang.jar");
        for name in ["lang.jar", "lang-src.jar", "lang-2-generator.jar", "other-src.jar"] {
            std::fs::write(tmp.path().join(name), "x").unwrap();
        }
        std::fs::write(tmp.path().join("lang-generator.jar"), "").unwrap();

        let siblings = sibling_jars(&jar);
        assert_eq!(
            siblings,
            vec![tmp.path().join("lang-src.jar"), tmp.path().join("lang-2-generator.jar")]
        );
        assert!(is_companion_jar(&tmp.path().join("lang-src.jar")));
        assert!(is_companion_jar(&tmp.path().join("lang-2-generator.jar")));
        assert!(!is_companion_jar(&jar));
    }
}
