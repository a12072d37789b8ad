use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Check that a tag name is safe to splice into an exiftool argument.
///
/// Tag names become `-<name>` (or `-<name>=...`) argv elements, so anything
/// exiftool's own argument parser treats as structure is rejected: a leading
/// `-`, whitespace or control characters, and the assignment markers `=`,
/// `<`, `>`. Group prefixes like `EXIF:Model` remain valid.
pub(crate) fn valid_tag_name(tag: &str) -> bool {
    !tag.is_empty()
        && !tag.starts_with('-')
        && tag
            .chars()
            .all(|c| !c.is_whitespace() && !c.is_control() && c != '=' && c != '<' && c != '>')
}

fn tag_flag(tag: &str) -> OsString {
    OsString::from(format!("-{tag}"))
}

/// Argv for a batch textual read: `-S` selects short tag-name output,
/// `-n` raw numeric values. Tag flags precede the file paths.
pub(crate) fn batch_read(tool: &Path, tags: &BTreeSet<String>, files: &[PathBuf]) -> Vec<OsString> {
    let mut argv: Vec<OsString> = vec![tool.into(), "-S".into(), "-n".into()];
    argv.extend(tags.iter().map(|t| tag_flag(t)));
    argv.extend(files.iter().map(|f| f.clone().into_os_string()));
    argv
}

/// Argv for a raw binary read of exactly one tag across a batch of files.
/// Payloads arrive concatenated on stdout with no delimiters.
pub(crate) fn binary_read(tool: &Path, tag: &str, files: &[PathBuf]) -> Vec<OsString> {
    let mut argv: Vec<OsString> = vec![tool.into(), "-b".into(), tag_flag(tag)];
    argv.extend(files.iter().map(|f| f.clone().into_os_string()));
    argv
}

/// Argv for a direct write: one `-Tag=Value` element per assignment, value
/// spliced verbatim into its own argv element.
pub(crate) fn batch_write(
    tool: &Path,
    assignments: &BTreeMap<String, String>,
    files: &[PathBuf],
) -> Vec<OsString> {
    let mut argv: Vec<OsString> = vec![tool.into(), "-overwrite_original_in_place".into(), "-n".into()];
    argv.extend(
        assignments
            .iter()
            .map(|(tag, value)| OsString::from(format!("-{tag}={value}"))),
    );
    argv.extend(files.iter().map(|f| f.clone().into_os_string()));
    argv
}

/// Argv for a datafile write: `-Tag<=path` tells exiftool to read the new
/// value from a file on disk instead of the command line.
pub(crate) fn datafile_write(
    tool: &Path,
    sources: &BTreeMap<String, PathBuf>,
    files: &[PathBuf],
) -> Vec<OsString> {
    let mut argv: Vec<OsString> = vec![tool.into(), "-overwrite_original_in_place".into(), "-n".into()];
    for (tag, source) in sources {
        let mut arg = OsString::from(format!("-{tag}<="));
        arg.push(source);
        argv.push(arg);
    }
    argv.extend(files.iter().map(|f| f.clone().into_os_string()));
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool() -> PathBuf {
        PathBuf::from("/usr/bin/exiftool")
    }

    // ── valid_tag_name ───────────────────────────────────────────────

    #[test]
    fn tag_names_accepted() {
        assert!(valid_tag_name("Model"));
        assert!(valid_tag_name("ThumbnailImage"));
        assert!(valid_tag_name("EXIF:Make"));
        assert!(valid_tag_name("GPSLatitude#"));
    }

    #[test]
    fn tag_names_rejected() {
        assert!(!valid_tag_name(""));
        assert!(!valid_tag_name("-Model"));
        assert!(!valid_tag_name("Model=X"));
        assert!(!valid_tag_name("Tag<=file"));
        assert!(!valid_tag_name("Tag>out"));
        assert!(!valid_tag_name("Tag Name"));
        assert!(!valid_tag_name("Tag\nName"));
    }

    // ── argv shapes ──────────────────────────────────────────────────

    #[test]
    fn batch_read_shape() {
        let tags = BTreeSet::from(["Make".to_string(), "Model".to_string()]);
        let files = vec![PathBuf::from("/a.jpg"), PathBuf::from("/b.jpg")];

        let argv = batch_read(&tool(), &tags, &files);
        assert_eq!(
            argv,
            ["/usr/bin/exiftool", "-S", "-n", "-Make", "-Model", "/a.jpg", "/b.jpg"]
                .map(OsString::from)
        );
    }

    #[test]
    fn batch_read_empty_query_has_no_tag_flags() {
        let argv = batch_read(&tool(), &BTreeSet::new(), &[PathBuf::from("/a.jpg")]);
        assert_eq!(argv, ["/usr/bin/exiftool", "-S", "-n", "/a.jpg"].map(OsString::from));
    }

    #[test]
    fn binary_read_shape() {
        let files = vec![PathBuf::from("/a.jpg"), PathBuf::from("/b.jpg")];
        let argv = binary_read(&tool(), "ThumbnailImage", &files);
        assert_eq!(
            argv,
            ["/usr/bin/exiftool", "-b", "-ThumbnailImage", "/a.jpg", "/b.jpg"].map(OsString::from)
        );
    }

    #[test]
    fn batch_write_shape() {
        let assignments = BTreeMap::from([
            ("Artist".to_string(), "Wyatt".to_string()),
            ("Rating".to_string(), "5".to_string()),
        ]);
        let argv = batch_write(&tool(), &assignments, &[PathBuf::from("/a.jpg")]);
        assert_eq!(
            argv,
            [
                "/usr/bin/exiftool",
                "-overwrite_original_in_place",
                "-n",
                "-Artist=Wyatt",
                "-Rating=5",
                "/a.jpg",
            ]
            .map(OsString::from)
        );
    }

    #[test]
    fn datafile_write_shape() {
        let sources = BTreeMap::from([(
            "ThumbnailImage".to_string(),
            PathBuf::from("/tmp/thumb.jpg"),
        )]);
        let argv = datafile_write(&tool(), &sources, &[PathBuf::from("/a.jpg")]);
        assert_eq!(
            argv,
            [
                "/usr/bin/exiftool",
                "-overwrite_original_in_place",
                "-n",
                "-ThumbnailImage<=/tmp/thumb.jpg",
                "/a.jpg",
            ]
            .map(OsString::from)
        );
    }

    #[test]
    fn flags_precede_paths() {
        let tags = BTreeSet::from(["Model".to_string()]);
        let files = vec![PathBuf::from("/a.jpg")];
        let argv = batch_read(&tool(), &tags, &files);

        let flag_pos = argv.iter().position(|a| a == "-Model").unwrap();
        let path_pos = argv.iter().position(|a| a == "/a.jpg").unwrap();
        assert!(flag_pos < path_pos);
    }
}
