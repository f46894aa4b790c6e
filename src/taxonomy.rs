//! Built-in quality-attribute taxonomy and file-based taxonomy loading.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::patterns::Taxonomy;
use crate::types::PatternError;

#[derive(Error, Debug)]
pub enum TaxonomyError {
    #[error("failed to read taxonomy file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse taxonomy file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<toml::de::Error>,
    },

    #[error(transparent)]
    Pattern(#[from] PatternError),
}

#[derive(Debug, Deserialize)]
struct TaxonomyFile {
    #[serde(default)]
    attributes: Vec<AttributeDef>,
}

#[derive(Debug, Deserialize)]
struct AttributeDef {
    name: String,
    keywords: Vec<String>,
}

/// Load and normalize a taxonomy from a TOML file of the form:
///
/// ```toml
/// [[attributes]]
/// name = "datatransfer"
/// keywords = ["gzip", "reduc network call"]
/// ```
///
/// Attribute order in the file is preserved.
pub fn load_taxonomy(path: &Path) -> Result<Taxonomy, TaxonomyError> {
    let content = std::fs::read_to_string(path).map_err(|e| TaxonomyError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let file: TaxonomyFile = toml::from_str(&content).map_err(|e| TaxonomyError::Parse {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    let raw = file
        .attributes
        .into_iter()
        .map(|attr| (attr.name, attr.keywords));
    Ok(Taxonomy::normalize(raw)?)
}

/// The built-in taxonomy: keyword phrases for the three quality attributes
/// mined so far (data-transfer efficiency, UI responsiveness, and code-level
/// optimization).
pub fn builtin_taxonomy() -> Taxonomy {
    Taxonomy::normalize(builtin_raw()).expect("built-in taxonomy compiles")
}

fn builtin_raw() -> Vec<(&'static str, Vec<&'static str>)> {
    vec![
        (
            "datatransfer",
            vec![
                // Reduce request frequency / push over poll
                "reduc network call",
                "reduc network calls",
                "reduc api call",
                "reduc api calls",
                "fewer requests",
                "minimiz requests",
                "cut request rate",
                "reduc refresh rate",
                "lower refresh rate",
                "increas refresh interval",
                "increas request interval",
                "refresh less often",
                "slow refresh",
                "slow update",
                "refresh on change",
                "periodic refresh",
                "every\\ \\*\\ minutes",
                "replac poll",
                "avoid poll",
                "stop poll",
                "long poll",
                "push over poll",
                "push updates",
                "server push",
                "socket\\.io",
                "server-sent events",
                // Rate limiting / retry
                "rate limit request",
                "rate limiting",
                "throttl request",
                "throttling",
                "debounc fetch",
                "debounc request",
                "deduplicat request",
                "coalesc duplicate requests",
                "exponential backoff",
                "retry with backoff",
                "backoff with jitter",
                "dynamic retry delay",
                "increas retry delay",
                "retry after",
                "rate limit",
                // Reduce size / compression
                "compress payload",
                "gzip",
                "deflate",
                "minify json",
                "compact json",
                "shrink payload",
                "reduc payload",
                "binary json",
                "messagepack",
                "cbor",
                "delta update",
                "diff sync",
                "patch update",
                "partial response",
                "sparse fields",
                "only necessary fields",
                "optimiz data transfer",
                "reduce bandwidth",
                "reduce data rate",
                "lower bitrate",
                // Offload
                "offload compute",
                "offload processing",
                "edge offload",
                "cloud offload",
                "cdn compute",
                "server-side render",
                "ssr",
                "pre-render",
            ],
        ),
        (
            "UI",
            vec![
                // Images / resolution
                "lazy load image",
                "lazy load media",
                "defer offscreen images",
                "below the fold",
                "defer render",
                "defer loading",
                "convert to webp",
                "convert to avif",
                "serve responsive images",
                "responsive images",
                "use smaller resolution",
                "lower resolution",
                "downscale images",
                "optimize images",
                "compress images",
                // Animations / graphics
                "disable animation",
                "reduc animation",
                "remov animation",
                "limit animation",
                "reduce motion",
                "limit fps",
                "lower frame rate",
                "heavy paint",
                "heavy reflow",
                "expensive render",
                "render bottleneck",
                "gpu heavy",
                "canvas heavy",
                "webgl heavy",
                "background video",
                "disable autoplay",
                "no autoplay",
                "stop autoplay",
            ],
        ),
        (
            "code_optimization",
            vec![
                // Common subexpression elimination
                "avoid recompute",
                "do not recompute",
                "store result",
                "memoize",
                "reuse computed value",
                "common subexpression",
                "assign to variable",
                "temporary variable",
                // Sorting
                "avoid resort",
                "already sorted",
                "presorted",
                "skip sort",
                "nearly sorted",
                "partial sort",
                // Loop optimizations
                "loop unrolling",
                "loop unswitching",
                "early termination",
                "break early",
                "guard clause",
                "short circuit in loop",
                "hoist invariant",
                "loop invariant",
                "move call outside loop",
                "avoid expensive call in loop",
                "store loop end condition",
                "reduce loop overhead",
                // Short-circuit logic
                "short circuit",
                "short-circuit operator",
                "return early",
                // Approximation / lower precision
                "use approximation",
                "reduce precision",
                "lower precision",
                "float32",
                "float16",
                "bfloat16",
                "int8",
                "quantize",
                "tolerance",
                "epsilon",
                "rounding",
                // Remove unnecessary state
                "remove debug variable",
                "remove temp variable",
                "avoid storing computed data",
                "reduce intermediate state",
                "avoid duplicate state",
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_taxonomy_compiles() {
        let taxonomy = builtin_taxonomy();
        let names: Vec<&str> = taxonomy.attributes().iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["datatransfer", "UI", "code_optimization"]);
        assert!(taxonomy.pattern_count() > 100);
    }

    #[test]
    fn test_builtin_ranking_is_deterministic() {
        let first = builtin_taxonomy();
        let second = builtin_taxonomy();

        for (a, b) in first.attributes().iter().zip(second.attributes()) {
            let a_order: Vec<&str> = a.patterns().iter().map(|p| p.raw()).collect();
            let b_order: Vec<&str> = b.patterns().iter().map(|p| p.raw()).collect();
            assert_eq!(a_order, b_order);
        }
    }

    #[test]
    fn test_builtin_multi_word_patterns_rank_before_single_words() {
        let taxonomy = builtin_taxonomy();
        let datatransfer = &taxonomy.attributes()[0];

        let position = |raw: &str| {
            datatransfer
                .patterns()
                .iter()
                .position(|p| p.raw() == raw)
                .unwrap()
        };
        assert!(position("coalesc duplicate requests") < position("rate limit"));
        assert!(position("rate limit") < position("gzip"));
    }

    #[test]
    fn test_load_taxonomy_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[[attributes]]
name = "datatransfer"
keywords = ["reduc network call", "gzip"]

[[attributes]]
name = "UI"
keywords = ["lazy load image"]
"#
        )
        .unwrap();

        let taxonomy = load_taxonomy(file.path()).unwrap();
        assert_eq!(taxonomy.len(), 2);
        assert_eq!(taxonomy.attributes()[0].name(), "datatransfer");
        assert_eq!(
            taxonomy.attributes()[0].patterns()[0].raw(),
            "reduc network call"
        );
        assert_eq!(taxonomy.attributes()[1].name(), "UI");
    }

    #[test]
    fn test_load_taxonomy_missing_file() {
        let err = load_taxonomy(Path::new("/nonexistent/taxonomy.toml")).unwrap_err();
        assert!(matches!(err, TaxonomyError::Io { .. }));
    }

    #[test]
    fn test_load_taxonomy_bad_pattern_fails_fast() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[[attributes]]
name = "bad"
keywords = ["\\b"]
"#
        )
        .unwrap();

        let err = load_taxonomy(file.path()).unwrap_err();
        assert!(matches!(err, TaxonomyError::Pattern(_)));
    }
}
