//! Package detection for declared source files.
//!
//! This module provides a minimal lexical scanner that extracts the
//! `package a.b.c;` declaration from a source file, plus a per-directory
//! memo so that only one file per directory is ever read.
//!
//! The scanner only recognizes the `package` and `import` keywords,
//! identifiers and `.`. Comments and string/character literals are skipped
//! so their contents never count as keywords. Anything the scanner cannot
//! make sense of degrades to the empty (default) package instead of an error.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::mem;
use std::path::{Component, Path, PathBuf};

use utf8_chars::BufReadCharsExt;

use crate::entry::FileEntry;

/// A package name as a sequence of segments (`com.acme` -> `["com", "acme"]`).
///
/// The empty path is the unnamed/default package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackagePath(Vec<String>);

impl PackagePath {
    /// Parse a dotted package name. Empty segments are dropped.
    pub fn parse(dotted: &str) -> Self {
        Self(
            dotted
                .split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The package as a relative directory path (`com/acme`).
    pub fn to_path(&self) -> PathBuf {
        self.0.iter().collect()
    }

    /// Remove the package's segments from the end of `dir`.
    ///
    /// Returns `None` when the trailing components of `dir` do not spell out
    /// this package, i.e. the directory does not mirror the package.
    pub fn strip_from(&self, dir: &Path) -> Option<PathBuf> {
        let components: Vec<Component<'_>> = dir.components().collect();
        if self.0.len() > components.len() {
            return None;
        }

        let split = components.len() - self.0.len();
        let matches = components[split..]
            .iter()
            .zip(&self.0)
            .all(|(component, segment)| match component {
                Component::Normal(name) => name.to_str() == Some(segment.as_str()),
                _ => false,
            });

        if matches {
            Some(components[..split].iter().collect())
        } else {
            None
        }
    }
}

impl fmt::Display for PackagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// Tokens recognized by the scanner.
#[derive(Debug, PartialEq, Eq)]
enum Token {
    Package,
    Import,
    Identifier(String),
    Dot,
    Other,
}

/// Streaming scanner reading characters with one-character lookahead.
struct PackageScanner<T: Read> {
    reader: BufReader<T>,
    lookahead: Option<char>,
    failed: bool,
}

impl PackageScanner<File> {
    fn open(path: &Path) -> std::io::Result<Self> {
        Ok(Self::from_reader(File::open(path)?))
    }
}

impl<T: Read> PackageScanner<T> {
    fn from_reader(reader: T) -> Self {
        let mut scanner = Self {
            reader: BufReader::new(reader),
            lookahead: None,
            failed: false,
        };
        scanner.lookahead = scanner.read_char();
        scanner
    }

    /// Scan up to the package declaration, the first import or end of input.
    fn scan(mut self) -> PackagePath {
        let mut segments = Vec::new();

        while let Some(token) = self.next_token() {
            match token {
                Token::Package => {
                    self.collect_package(&mut segments);
                    break;
                }
                Token::Import => break,
                _ => {}
            }
        }

        if self.failed {
            return PackagePath::default();
        }
        PackagePath(segments)
    }

    fn collect_package(&mut self, segments: &mut Vec<String>) {
        while let Some(Token::Identifier(name)) = self.next_token() {
            segments.push(name);
            if self.next_token() != Some(Token::Dot) {
                break;
            }
        }
    }

    fn next_token(&mut self) -> Option<Token> {
        loop {
            let next_char = self.next_char()?;
            let token = match next_char {
                v if v.is_whitespace() => continue,
                '/' if self.lookahead == Some('/') => {
                    self.skip_line();
                    continue;
                }
                '/' if self.lookahead == Some('*') => {
                    let _ = self.next_char();
                    self.skip_comment_block();
                    continue;
                }
                '"' | '\'' => {
                    self.skip_literal(next_char);
                    Token::Other
                }
                '.' => Token::Dot,
                v if is_identifier_start(v) => {
                    let mut word = v.to_string();
                    self.collect_while(&mut word, is_identifier_part);
                    match word.as_str() {
                        "package" => Token::Package,
                        "import" => Token::Import,
                        _ => Token::Identifier(word),
                    }
                }
                _ => Token::Other,
            };
            return Some(token);
        }
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.next_char() {
            if c == '\n' {
                break;
            }
        }
    }

    fn skip_comment_block(&mut self) {
        while let Some(c) = self.next_char() {
            if c == '*' && self.lookahead == Some('/') {
                let _ = self.next_char();
                return;
            }
        }
    }

    fn skip_literal(&mut self, quote: char) {
        while let Some(c) = self.next_char() {
            match c {
                '\\' => {
                    let _ = self.next_char();
                }
                '\n' => return,
                v if v == quote => return,
                _ => {}
            }
        }
    }

    fn collect_while(&mut self, string: &mut String, mut predicate: impl FnMut(char) -> bool) {
        while let Some(next_char) = self.lookahead {
            if predicate(next_char) {
                let _ = self.next_char();
                string.push(next_char);
            } else {
                break;
            }
        }
    }

    fn next_char(&mut self) -> Option<char> {
        let next = self.read_char();
        mem::replace(&mut self.lookahead, next)
    }

    fn read_char(&mut self) -> Option<char> {
        if self.failed {
            return None;
        }
        match self.reader.chars().next() {
            Some(Ok(c)) => Some(c),
            Some(Err(_)) => {
                self.failed = true;
                None
            }
            None => None,
        }
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Extract the declared package from source text.
///
/// # Example
///
/// ```rust
/// use srclayoutlib::package::scan_package_path;
///
/// let source = "/* header */\npackage com.acme.util;\n\nimport java.util.List;\n";
/// assert_eq!(scan_package_path(source).to_string(), "com.acme.util");
/// ```
pub fn scan_package_path(source: &str) -> PackagePath {
    PackageScanner::from_reader(source.as_bytes()).scan()
}

/// Read a file and extract its declared package.
///
/// Unreadable files and undecodable content yield the empty package.
pub fn read_package_path(path: impl AsRef<Path>) -> PackagePath {
    let path = path.as_ref();
    match PackageScanner::open(path) {
        Ok(scanner) => scanner.scan(),
        Err(e) => {
            tracing::debug!("cannot read '{}' for package detection: {e}", path.display());
            PackagePath::default()
        }
    }
}

/// Per-directory memo of detected packages.
///
/// All files in one directory are assumed to share a package, so only the
/// first file seen for a directory is read.
#[derive(Debug, Default)]
pub struct PackagePathCache {
    by_parent: HashMap<PathBuf, PackagePath>,
}

impl PackagePathCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Package of `entry`, reading the file only if its directory is unknown.
    pub fn detect(&mut self, entry: &FileEntry, base: &Path) -> PackagePath {
        if let Some(package) = self.by_parent.get(entry.parent()) {
            tracing::trace!("package of '{}' from cache", entry.path().display());
            return package.clone();
        }

        let package = read_package_path(entry.location(base));
        tracing::debug!(
            "detected package '{}' for directory '{}'",
            package,
            entry.parent().display()
        );
        self.by_parent
            .insert(entry.parent().to_path_buf(), package.clone());
        package
    }

    pub fn len(&self) -> usize {
        self.by_parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_parent.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn package(source: &str) -> String {
        scan_package_path(source).to_string()
    }

    #[test]
    fn simple_package() {
        assert_eq!(package("package com.acme;\n\nclass Foo {}\n"), "com.acme");
    }

    #[test]
    fn default_package() {
        assert_eq!(package("class Foo {}\n"), "");
        assert!(scan_package_path("").is_empty());
    }

    #[test]
    fn whitespace_and_comments_inside_declaration() {
        assert_eq!(package("package  com . /* x */ acme\n  .util ;"), "com.acme.util");
    }

    #[test]
    fn license_header_mentioning_package() {
        let source = "/*\n * This package is licensed...\n */\n// package fake.one;\npackage real.one;\n";
        assert_eq!(package(source), "real.one");
    }

    #[test]
    fn javadoc_before_package() {
        let source = "/** Docs with package words. */\n@Deprecated\npackage com.acme;\n";
        assert_eq!(package(source), "com.acme");
    }

    #[test]
    fn stops_at_import() {
        let source = "import java.util.List;\npackage late.decl;\n";
        assert_eq!(package(source), "");
    }

    #[test]
    fn keyword_inside_string_is_ignored() {
        let source = "class A { String s = \"package nope;\"; char c = '\\''; }\n";
        assert_eq!(package(source), "");
    }

    #[test]
    fn unicode_identifiers() {
        assert_eq!(package("package com.åcme$x;"), "com.åcme$x");
    }

    #[test]
    fn unterminated_comment_yields_default_package() {
        assert_eq!(package("/* never closed\npackage com.acme;"), "");
    }

    #[test]
    fn invalid_utf8_yields_default_package() {
        let bytes: &[u8] = b"package com.\xff\xfe;";
        let scanner = PackageScanner::from_reader(bytes);
        assert!(scanner.scan().is_empty());
    }

    #[test]
    fn unreadable_file_yields_default_package() {
        assert!(read_package_path("/nonexistent/Foo.java").is_empty());
    }

    #[test]
    fn test_parse_and_path() {
        let package = PackagePath::parse("com.acme.util");
        assert_eq!(package.segments(), ["com", "acme", "util"]);
        assert_eq!(package.to_path(), PathBuf::from("com/acme/util"));
        assert!(PackagePath::parse("").is_empty());
    }

    #[test]
    fn test_strip_from() {
        let package = PackagePath::parse("com.acme");
        assert_eq!(
            package.strip_from(Path::new("src/main/java/com/acme")),
            Some(PathBuf::from("src/main/java"))
        );
        assert_eq!(
            package.strip_from(Path::new("com/acme")),
            Some(PathBuf::new())
        );
        assert_eq!(package.strip_from(Path::new("src/main/java/org/acme")), None);
        assert_eq!(package.strip_from(Path::new("acme")), None);
    }

    #[test]
    fn test_strip_empty_package_keeps_directory() {
        let package = PackagePath::default();
        assert_eq!(
            package.strip_from(Path::new("src/main/resources")),
            Some(PathBuf::from("src/main/resources"))
        );
    }

    #[test]
    fn test_cache_reads_one_file_per_directory() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("src/com/acme");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("A.java"), "package com.acme;").unwrap();
        fs::write(dir.join("B.java"), "package org.other;").unwrap();

        let mut cache = PackagePathCache::new();
        let a = cache.detect(&FileEntry::new("src/com/acme/A.java"), temp.path());
        let b = cache.detect(&FileEntry::new("src/com/acme/B.java"), temp.path());

        assert_eq!(a.to_string(), "com.acme");
        assert_eq!(b.to_string(), "com.acme");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_keys_by_directory() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("a/x")).unwrap();
        fs::create_dir_all(temp.path().join("b/y")).unwrap();
        fs::write(temp.path().join("a/x/A.java"), "package x;").unwrap();
        fs::write(temp.path().join("b/y/B.java"), "package y;").unwrap();

        let mut cache = PackagePathCache::new();
        let a = cache.detect(&FileEntry::new("a/x/A.java"), temp.path());
        let b = cache.detect(&FileEntry::new("b/y/B.java"), temp.path());

        assert_eq!(a.to_string(), "x");
        assert_eq!(b.to_string(), "y");
        assert_eq!(cache.len(), 2);
    }
}
