//! Grouping of declared sources by candidate source root.
//!
//! A file's candidate root is its parent directory with the trailing
//! segments of its detected package removed. A glob's root is the glob's
//! directory. Each root holds either a list of files or exactly one glob.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::diagnostics::Diagnostics;
use crate::entry::{normalize, FileEntry, GlobEntry, SourceEntry};
use crate::package::PackagePathCache;

/// What a source root was built from.
#[derive(Debug, Clone, PartialEq)]
pub enum RootContents {
    /// Explicitly declared files, in declaration order (never empty)
    Files(Vec<FileEntry>),
    /// A single glob over the root directory
    Glob(GlobEntry),
}

impl RootContents {
    pub fn files(&self) -> Option<&[FileEntry]> {
        match self {
            RootContents::Files(files) => Some(files),
            RootContents::Glob(_) => None,
        }
    }

    pub fn glob(&self) -> Option<&GlobEntry> {
        match self {
            RootContents::Files(_) => None,
            RootContents::Glob(glob) => Some(glob),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            RootContents::Files(_) => "declared files",
            RootContents::Glob(_) => "another glob pattern",
        }
    }
}

/// Declared files sharing one parent directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentGroup {
    /// Candidate root of the files in this directory
    pub root: PathBuf,
    /// Number of declared files directly in this directory
    pub declared: usize,
}

/// Output of [`group_by_source_root`].
#[derive(Debug, Clone, Default)]
pub struct GroupedSources {
    /// Candidate roots in encounter order
    pub roots: IndexMap<PathBuf, RootContents>,
    /// Parent directory index of every file accepted into a root
    pub by_parent: IndexMap<PathBuf, ParentGroup>,
    /// Files that could not be placed under any root
    pub non_conforming: Vec<FileEntry>,
}

impl GroupedSources {
    /// Number of file entries accepted into roots.
    pub fn grouped_file_count(&self) -> usize {
        self.roots
            .values()
            .filter_map(RootContents::files)
            .map(<[FileEntry]>::len)
            .sum()
    }
}

/// Bucket declared entries by candidate source root.
///
/// Detects the package of every file entry whose slot is still empty.
/// Conflicts and non-conforming files are reported to `diagnostics` and
/// never abort the pass.
pub fn group_by_source_root(
    srcs: &[SourceEntry],
    base: &Path,
    packages: &mut PackagePathCache,
    diagnostics: &mut Diagnostics,
) -> GroupedSources {
    let mut grouped = GroupedSources::default();

    for entry in srcs {
        match entry {
            SourceEntry::File(file) => add_file(&mut grouped, file, base, packages, diagnostics),
            SourceEntry::Glob(glob) => add_glob(&mut grouped, glob, diagnostics),
            SourceEntry::Label(label) => diagnostics.warning(format!(
                "Found source label reference '{label}'. The target may not be fully supported in the IDE."
            )),
        }
    }

    grouped
}

fn add_file(
    grouped: &mut GroupedSources,
    file: &FileEntry,
    base: &Path,
    packages: &mut PackagePathCache,
    diagnostics: &mut Diagnostics,
) {
    if file.detected_package().is_none() {
        file.record_package(packages.detect(file, base));
    }

    let Some(root) = file.potential_source_root().map(|root| normalize(&root)) else {
        diagnostics.warning(format!(
            "File '{}' (with detected package '{}') does not meet IDE standards. Please move it into a folder hierarchy which follows its package structure.",
            file.path().display(),
            file.detected_package().map(ToString::to_string).unwrap_or_default()
        ));
        grouped.non_conforming.push(file.clone());
        return;
    };

    match grouped.roots.get_mut(&root) {
        None => {
            grouped
                .roots
                .insert(root.clone(), RootContents::Files(vec![file.clone()]));
        }
        Some(RootContents::Files(files)) => files.push(file.clone()),
        Some(RootContents::Glob(_)) => {
            diagnostics.error(format!(
                "Source root '{}' is already mapped to a glob pattern, '{}' cannot be added to it. Please split into separate targets.",
                root.display(),
                file.path().display()
            ));
            grouped.non_conforming.push(file.clone());
            return;
        }
    }

    grouped
        .by_parent
        .entry(normalize(file.parent()))
        .or_insert_with(|| ParentGroup {
            root,
            declared: 0,
        })
        .declared += 1;
}

fn add_glob(grouped: &mut GroupedSources, glob: &GlobEntry, diagnostics: &mut Diagnostics) {
    let root = normalize(glob.directory());

    if let Some(existing) = grouped.roots.get(&root) {
        diagnostics.error(format!(
            "Source root '{}' is already mapped to {}, the glob pattern is ignored. Please split into separate targets.",
            root.display(),
            existing.describe()
        ));
        return;
    }

    grouped.roots.insert(root, RootContents::Glob(glob.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn write_java(base: &Path, path: &str, package: &str) {
        let path = base.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, format!("package {package};\n\nclass X {{}}\n")).unwrap();
    }

    fn group(temp: &TempDir, srcs: &[SourceEntry]) -> (GroupedSources, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let grouped = group_by_source_root(
            srcs,
            temp.path(),
            &mut PackagePathCache::new(),
            &mut diagnostics,
        );
        (grouped, diagnostics)
    }

    #[test]
    fn test_files_share_root() {
        let temp = tempdir().unwrap();
        write_java(temp.path(), "src/main/java/com/acme/Foo.java", "com.acme");
        write_java(temp.path(), "src/main/java/com/acme/util/Bar.java", "com.acme.util");

        let (grouped, diagnostics) = group(
            &temp,
            &[
                SourceEntry::file("src/main/java/com/acme/Foo.java"),
                SourceEntry::file("src/main/java/com/acme/util/Bar.java"),
            ],
        );

        assert!(diagnostics.is_empty());
        assert_eq!(grouped.roots.len(), 1);
        let files = grouped.roots[&PathBuf::from("src/main/java")].files().unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(grouped.by_parent.len(), 2);
        assert_eq!(grouped.grouped_file_count(), 2);
        assert!(grouped.non_conforming.is_empty());
    }

    #[test]
    fn test_roots_keep_encounter_order() {
        let temp = tempdir().unwrap();
        write_java(temp.path(), "b/x/B.java", "x");
        write_java(temp.path(), "a/y/A.java", "y");

        let (grouped, _) = group(
            &temp,
            &[SourceEntry::file("b/x/B.java"), SourceEntry::file("a/y/A.java")],
        );

        let roots: Vec<&PathBuf> = grouped.roots.keys().collect();
        assert_eq!(roots, vec![&PathBuf::from("b"), &PathBuf::from("a")]);
    }

    #[test]
    fn test_non_conforming_file() {
        let temp = tempdir().unwrap();
        write_java(temp.path(), "src/Foo.java", "com.acme");

        let (grouped, diagnostics) = group(&temp, &[SourceEntry::file("src/Foo.java")]);

        assert!(grouped.roots.is_empty());
        assert!(grouped.by_parent.is_empty());
        assert_eq!(grouped.non_conforming.len(), 1);
        assert_eq!(diagnostics.warnings().count(), 1);
        assert!(diagnostics.iter().next().unwrap().message.contains("com.acme"));
    }

    #[test]
    fn test_glob_conflicts_with_files() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("src/test/resources")).unwrap();
        fs::write(temp.path().join("src/test/resources/app.properties"), "a=b").unwrap();

        let glob = GlobEntry::new("src/test/resources")
            .include(&["*.properties"])
            .unwrap()
            .exclude(&["**/*.bak"])
            .unwrap();
        let (grouped, diagnostics) = group(
            &temp,
            &[
                SourceEntry::file("src/test/resources/app.properties"),
                SourceEntry::Glob(glob),
            ],
        );

        assert_eq!(diagnostics.errors().count(), 1);
        let contents = &grouped.roots[&PathBuf::from("src/test/resources")];
        assert_eq!(contents.files().unwrap().len(), 1);
        assert!(contents.glob().is_none());
    }

    #[test]
    fn test_file_after_glob_goes_to_non_conforming() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("res")).unwrap();
        fs::write(temp.path().join("res/app.properties"), "a=b").unwrap();

        let (grouped, diagnostics) = group(
            &temp,
            &[
                SourceEntry::Glob(GlobEntry::new("res/")),
                SourceEntry::file("res/app.properties"),
            ],
        );

        assert_eq!(diagnostics.errors().count(), 1);
        assert!(grouped.roots[&PathBuf::from("res")].glob().is_some());
        assert_eq!(grouped.non_conforming.len(), 1);
        assert!(grouped.by_parent.is_empty());
    }

    #[test]
    fn test_second_glob_on_same_root() {
        let temp = tempdir().unwrap();
        let first = GlobEntry::new("src").include(&["**/*.java"]).unwrap();
        let second = GlobEntry::new("src").include(&["**/*.kt"]).unwrap();

        let (grouped, diagnostics) = group(
            &temp,
            &[SourceEntry::Glob(first.clone()), SourceEntry::Glob(second)],
        );

        assert_eq!(diagnostics.errors().count(), 1);
        assert_eq!(grouped.roots[&PathBuf::from("src")].glob(), Some(&first));
    }

    #[test]
    fn test_label_is_reported_and_ignored() {
        let temp = tempdir().unwrap();
        let (grouped, diagnostics) = group(&temp, &[SourceEntry::label("//gen:srcs")]);

        assert!(grouped.roots.is_empty());
        let diagnostic = diagnostics.iter().next().unwrap();
        assert_eq!(diagnostic.severity, Severity::Warning);
        assert!(diagnostic.message.contains("//gen:srcs"));
    }

    #[test]
    fn test_default_package_file_roots_at_parent() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("scripts")).unwrap();
        fs::write(temp.path().join("scripts/Main.java"), "class Main {}").unwrap();

        let (grouped, diagnostics) = group(&temp, &[SourceEntry::file("scripts/Main.java")]);

        assert!(diagnostics.is_empty());
        assert!(grouped.roots.contains_key(&PathBuf::from("scripts")));
    }

    #[test]
    fn test_package_detected_once_per_directory() {
        let temp = tempdir().unwrap();
        write_java(temp.path(), "src/com/acme/A.java", "com.acme");
        // A file disagreeing with its neighbour is never read
        write_java(temp.path(), "src/com/acme/B.java", "org.other");

        let srcs = [
            SourceEntry::file("src/com/acme/A.java"),
            SourceEntry::file("src/com/acme/B.java"),
        ];
        let (grouped, diagnostics) = group(&temp, &srcs);

        assert!(diagnostics.is_empty());
        assert_eq!(grouped.roots[&PathBuf::from("src")].files().unwrap().len(), 2);
        assert_eq!(
            srcs[1].as_file().unwrap().detected_package().unwrap().to_string(),
            "com.acme"
        );
    }

    #[test]
    fn test_dot_prefixed_file_conflicts_with_glob() {
        let temp = tempdir().unwrap();
        write_java(temp.path(), "res/Main.java", "");

        let (grouped, diagnostics) = group(
            &temp,
            &[
                SourceEntry::Glob(GlobEntry::new("res")),
                SourceEntry::file("./res/Main.java"),
            ],
        );

        assert_eq!(diagnostics.errors().count(), 1);
        let roots: Vec<&PathBuf> = grouped.roots.keys().collect();
        assert_eq!(roots, vec![&PathBuf::from("res")]);
        assert_eq!(grouped.non_conforming.len(), 1);
    }

    #[test]
    fn test_dot_prefixed_files_share_root_and_parent() {
        let temp = tempdir().unwrap();
        write_java(temp.path(), "src/com/acme/A.java", "com.acme");
        write_java(temp.path(), "src/com/acme/B.java", "com.acme");

        let mut packages = PackagePathCache::new();
        let grouped = group_by_source_root(
            &[
                SourceEntry::file("./src/com/acme/A.java"),
                SourceEntry::file("src/com/acme/B.java"),
            ],
            temp.path(),
            &mut packages,
            &mut Diagnostics::new(),
        );

        assert_eq!(grouped.roots.len(), 1);
        assert_eq!(grouped.roots[&PathBuf::from("src")].files().unwrap().len(), 2);
        assert_eq!(grouped.by_parent[&PathBuf::from("src/com/acme")].declared, 2);
        assert_eq!(packages.len(), 1);
    }
}
