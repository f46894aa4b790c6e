//! File-based corpus adapters: wiki pages, documentation files, and
//! source-code comments pulled from a checked-out repository tree.
//!
//! Unreadable and non-UTF-8 files are skipped with a logged warning; one bad
//! file never aborts the walk.

use std::path::Path;
use tracing::warn;
use walkdir::WalkDir;

use crate::types::CorpusUnit;

/// Extensions treated as prose documentation.
const DOC_EXTENSIONS: [&str; 3] = ["md", "rst", "txt"];

/// Comment delimiters for one source language.
struct CommentSyntax {
    line: Option<&'static str>,
    block: Option<(&'static str, &'static str)>,
}

fn comment_syntax(extension: &str) -> Option<CommentSyntax> {
    match extension {
        "py" | "sh" | "rb" | "yml" | "yaml" | "toml" => Some(CommentSyntax {
            line: Some("#"),
            block: None,
        }),
        "rs" | "js" | "jsx" | "ts" | "tsx" | "java" | "c" | "h" | "cpp" | "go" => {
            Some(CommentSyntax {
                line: Some("//"),
                block: Some(("/*", "*/")),
            })
        }
        "html" | "vue" | "xml" => Some(CommentSyntax {
            line: None,
            block: Some(("<!--", "-->")),
        }),
        "css" | "scss" => Some(CommentSyntax {
            line: None,
            block: Some(("/*", "*/")),
        }),
        _ => None,
    }
}

fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

fn read_text(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "skipping unreadable file");
            None
        }
    }
}

fn walk_files(root: &Path) -> impl Iterator<Item = walkdir::DirEntry> {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "skipping unreadable directory entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

/// One unit per page of a cloned wiki directory.
pub fn wiki_units(wiki_dir: &Path) -> Vec<CorpusUnit> {
    prose_units(wiki_dir)
}

/// One unit per documentation file under a source tree.
pub fn doc_units(source_root: &Path) -> Vec<CorpusUnit> {
    prose_units(source_root)
}

fn prose_units(root: &Path) -> Vec<CorpusUnit> {
    walk_files(root)
        .filter(|entry| has_extension(entry.path(), &DOC_EXTENSIONS))
        .filter_map(|entry| {
            read_text(entry.path()).map(|text| CorpusUnit::new(text, file_url(entry.path())))
        })
        .collect()
}

/// One unit per source file containing comments: all of the file's comments
/// joined with newlines, so repeated hits within one file dedup to one record.
pub fn code_comment_units(source_root: &Path) -> Vec<CorpusUnit> {
    walk_files(source_root)
        .filter_map(|entry| {
            let extension = entry.path().extension().and_then(|e| e.to_str())?;
            let syntax = comment_syntax(&extension.to_ascii_lowercase())?;
            let content = read_text(entry.path())?;
            let comments = extract_comments(&content, &syntax);
            if comments.is_empty() {
                None
            } else {
                Some(CorpusUnit::new(
                    comments.join("\n"),
                    file_url(entry.path()),
                ))
            }
        })
        .collect()
}

/// Line-oriented comment extraction. Delimiters inside string literals are
/// not recognized; for keyword mining over comments that imprecision is
/// acceptable.
fn extract_comments(content: &str, syntax: &CommentSyntax) -> Vec<String> {
    let mut comments = Vec::new();
    let mut in_block: Option<&'static str> = None;

    for line in content.lines() {
        let mut rest = line;

        if let Some(close) = in_block {
            if let Some(end) = rest.find(close) {
                comments.push(rest[..end].trim().to_string());
                rest = &rest[end + close.len()..];
                in_block = None;
            } else {
                comments.push(rest.trim().to_string());
                continue;
            }
        }

        if let Some((open, close)) = syntax.block {
            while let Some(start) = rest.find(open) {
                let after = &rest[start + open.len()..];
                if let Some(end) = after.find(close) {
                    comments.push(after[..end].trim().to_string());
                    rest = &after[end + close.len()..];
                } else {
                    comments.push(after.trim().to_string());
                    in_block = Some(close);
                    rest = "";
                    break;
                }
            }
        }

        if let Some(marker) = syntax.line {
            if let Some(start) = rest.find(marker) {
                comments.push(rest[start + marker.len()..].trim().to_string());
            }
        }
    }

    comments.retain(|c| !c.is_empty());
    comments
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_wiki_units_pick_up_markdown() {
        let dir = TempDir::new().unwrap();
        write(&dir, "Home.md", "We reduced network calls by batching.");
        write(&dir, "nested/Performance.md", "gzip everywhere");
        write(&dir, "image.png", "binary-ish");

        let mut units = wiki_units(dir.path());
        units.sort_by(|a, b| a.source_url.cmp(&b.source_url));
        assert_eq!(units.len(), 2);
        assert!(units.iter().all(|u| u.source_url.starts_with("file://")));
    }

    #[test]
    fn test_line_comments_extracted() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "app.py",
            "import time\n# memoize the lookup to avoid recompute\nx = 1  # temporary variable\n",
        );

        let units = code_comment_units(dir.path());
        assert_eq!(units.len(), 1);
        assert_eq!(
            units[0].text,
            "memoize the lookup to avoid recompute\ntemporary variable"
        );
    }

    #[test]
    fn test_block_comments_extracted_across_lines() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "main.rs",
            "fn main() {}\n/* hoist invariant\n   out of the loop */\n// break early\n",
        );

        let units = code_comment_units(dir.path());
        assert_eq!(units.len(), 1);
        let text = &units[0].text;
        assert!(text.contains("hoist invariant"));
        assert!(text.contains("out of the loop"));
        assert!(text.contains("break early"));
    }

    #[test]
    fn test_html_comments_extracted() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "index.html",
            "<div></div>\n<!-- lazy load image below the fold -->\n",
        );

        let units = code_comment_units(dir.path());
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].text, "lazy load image below the fold");
    }

    #[test]
    fn test_files_without_comments_yield_no_units() {
        let dir = TempDir::new().unwrap();
        write(&dir, "plain.py", "x = 1\ny = 2\n");
        write(&dir, "unknown.bin", "no syntax known");

        assert!(code_comment_units(dir.path()).is_empty());
    }

    #[test]
    fn test_non_utf8_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        write(&dir, "ok.py", "# reduce loop overhead\n");
        fs::write(dir.path().join("bad.py"), [0xff, 0xfe, 0x23, 0x20]).unwrap();

        let units = code_comment_units(dir.path());
        assert_eq!(units.len(), 1);
        assert!(units[0].source_url.ends_with("ok.py"));
    }

    #[test]
    fn test_empty_directory_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(wiki_units(dir.path()).is_empty());
        assert!(doc_units(dir.path()).is_empty());
        assert!(code_comment_units(dir.path()).is_empty());
    }
}
