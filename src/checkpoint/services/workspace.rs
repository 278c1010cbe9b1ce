//! Lexical path resolution inside a workspace root.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

/// Resolves `path` against `root` and returns it relative to `root`.
///
/// Absolute paths must lie under `root`. `.` segments are dropped and `..`
/// segments pop the previous segment; climbing above `root` yields `None`.
/// Symbolic links are not followed.
pub(super) fn relative_to_root(root: &Utf8Path, path: &Utf8Path) -> Option<Utf8PathBuf> {
    let candidate = if path.is_absolute() {
        path.strip_prefix(root).ok()?
    } else {
        path
    };

    let mut normalized = Utf8PathBuf::new();
    for component in candidate.components() {
        match component {
            Utf8Component::Normal(segment) => normalized.push(segment),
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                if !normalized.pop() {
                    return None;
                }
            }
            Utf8Component::RootDir | Utf8Component::Prefix(_) => return None,
        }
    }

    if normalized.as_str().is_empty() {
        None
    } else {
        Some(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::relative_to_root;
    use camino::Utf8Path;
    use rstest::rstest;

    #[rstest]
    #[case("src/main.rs", Some("src/main.rs"))]
    #[case("./src/../lib.rs", Some("lib.rs"))]
    #[case("/work/repo/docs/a.md", Some("docs/a.md"))]
    #[case("/elsewhere/a.md", None)]
    #[case("../outside.txt", None)]
    #[case("src/../../outside.txt", None)]
    #[case(".", None)]
    fn resolves_inside_root(#[case] input: &str, #[case] expected: Option<&str>) {
        let resolved = relative_to_root(Utf8Path::new("/work/repo"), Utf8Path::new(input));

        assert_eq!(resolved.as_deref().map(Utf8Path::as_str), expected);
    }
}
