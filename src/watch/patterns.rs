// src/watch/patterns.rs

//! Ignore-pattern matching.
//!
//! Patterns are shell-style globs (`*`, `?`, `[...]`) where wildcards never
//! cross a `/`, extended with a recursive `**` segment ("globstar") that
//! matches zero or more whole path segments.
//!
//! ```text
//! *.pb.go        api.pb.go          (matches)
//! abc/**         abc, abc/x, abc/x/y
//! abc/**         abcdef/x           (no match: prefix is segment-exact)
//! a**b           axxb               (glued `**` is just two `*`)
//! a**b           a/b                (no match)
//! ```

use std::collections::HashMap;
use std::fmt;

use globset::{GlobBuilder, GlobMatcher};

use crate::errors::{HotbuildError, Result};

const GLOBSTAR: &[u8] = b"**";
const WILDCARDS: &[char] = &['*', '?', '[', '{'];

/// Returns whether `path` matches `pattern`.
///
/// Malformed patterns (e.g. an unterminated `[` class) are reported as
/// [`HotbuildError::Pattern`], never as a silent non-match.
pub fn glob_match(pattern: &str, path: &str) -> Result<bool> {
    if pattern.is_empty() {
        return Ok(path.is_empty());
    }
    let mut matcher = Matcher::default();
    if !pattern.contains("**") {
        return matcher.segment_match(pattern, path);
    }
    let pattern = normalize_separators(pattern);
    let path = normalize_separators(path);
    matcher.globstar_match(&pattern, &path)
}

/// Per-call state: memoized `(pattern, path)` results plus compiled
/// single-segment matchers.
#[derive(Default)]
struct Matcher {
    memo: HashMap<(String, String), bool>,
    compiled: HashMap<String, GlobMatcher>,
}

impl Matcher {
    fn globstar_match(&mut self, pattern: &str, path: &str) -> Result<bool> {
        let key = (pattern.to_string(), path.to_string());
        if let Some(&hit) = self.memo.get(&key) {
            return Ok(hit);
        }
        let result = self.globstar_match_uncached(pattern, path)?;
        self.memo.insert(key, result);
        Ok(result)
    }

    fn globstar_match_uncached(&mut self, pattern: &str, path: &str) -> Result<bool> {
        let Some(idx) = find_globstar(pattern) else {
            return self.segment_match(pattern, path);
        };

        let prefix = &pattern[..idx];
        let prefix = prefix.strip_suffix('/').unwrap_or(prefix);
        let suffix = &pattern[idx + GLOBSTAR.len()..];
        let suffix = suffix.strip_prefix('/').unwrap_or(suffix);

        let Some(rest) = self.consume_prefix(prefix, path)? else {
            return Ok(false);
        };

        if suffix.is_empty() {
            return Ok(true);
        }

        let segments = split_segments(&rest);
        for skip in 0..=segments.len() {
            let tail = segments[skip..].join("/");
            if self.globstar_match(suffix, &tail)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Strip `prefix` from the front of `path` on a segment boundary.
    ///
    /// Returns `None` when the path does not start with the prefix.
    fn consume_prefix(&mut self, prefix: &str, path: &str) -> Result<Option<String>> {
        if prefix.is_empty() {
            return Ok(Some(path.to_string()));
        }

        if !prefix.contains(WILDCARDS) {
            if path == prefix {
                return Ok(Some(String::new()));
            }
            let rest = path
                .strip_prefix(prefix)
                .and_then(|r| r.strip_prefix('/'));
            return Ok(rest.map(str::to_string));
        }

        let pattern_segments: Vec<&str> = prefix.split('/').collect();
        let path_segments = split_segments(path);
        if path_segments.len() < pattern_segments.len() {
            return Ok(None);
        }
        for (pat, seg) in pattern_segments.iter().zip(path_segments.iter()) {
            if !self.segment_match(pat, seg)? {
                return Ok(None);
            }
        }
        Ok(Some(path_segments[pattern_segments.len()..].join("/")))
    }

    /// Plain glob semantics where `*` and `?` stop at `/`.
    fn segment_match(&mut self, pattern: &str, text: &str) -> Result<bool> {
        if let Some(m) = self.compiled.get(pattern) {
            return Ok(m.is_match(text));
        }
        let m = compile_segment_glob(pattern)?;
        let hit = m.is_match(text);
        self.compiled.insert(pattern.to_string(), m);
        Ok(hit)
    }
}

fn compile_segment_glob(pattern: &str) -> Result<GlobMatcher> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|g| g.compile_matcher())
        .map_err(|source| HotbuildError::Pattern {
            pattern: pattern.to_string(),
            source,
        })
}

/// Byte offset of the first `**` that forms a whole path segment.
fn find_globstar(pattern: &str) -> Option<usize> {
    let bytes = pattern.as_bytes();
    (0..bytes.len().saturating_sub(1)).find(|&i| {
        bytes[i..].starts_with(GLOBSTAR)
            && (i == 0 || bytes[i - 1] == b'/')
            && (i + 2 == bytes.len() || bytes[i + 2] == b'/')
    })
}

fn split_segments(path: &str) -> Vec<&str> {
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('/').collect()
    }
}

fn normalize_separators(s: &str) -> String {
    s.replace('\\', "/")
}

/// Strip `./` prefixes and a trailing `/`, with `/` as the only separator.
fn normalize_rel(s: &str) -> String {
    let mut s = normalize_separators(s);
    while let Some(rest) = s.strip_prefix("./") {
        s = rest.to_string();
    }
    if s.len() > 1 && s.ends_with('/') {
        s.pop();
    }
    s
}

/// Ordered set of ignore patterns.
///
/// A relative path is ignored when any pattern matches the whole path, any
/// leading directory of it, or any single component of it. So `vendor`
/// ignores `vendor/a/b.go`, `node_modules` ignores `web/node_modules/x.js`
/// and `*.pb.go` ignores `api/user.pb.go`.
#[derive(Clone, Default)]
pub struct IgnoreRules {
    patterns: Vec<String>,
}

impl fmt::Debug for IgnoreRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.patterns).finish()
    }
}

impl IgnoreRules {
    /// Build the set, rejecting malformed patterns up front.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized = Vec::new();
        for raw in patterns {
            let raw = raw.as_ref().trim();
            if raw.is_empty() {
                continue;
            }
            let pattern = normalize_rel(raw);
            compile_segment_glob(&pattern)?;
            normalized.push(pattern);
        }
        Ok(Self {
            patterns: normalized,
        })
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether `rel_path` (relative to the watch root) is ignored.
    ///
    /// The root itself (`""` or `"."`) is never ignored.
    pub fn is_ignored(&self, rel_path: &str) -> Result<bool> {
        if self.patterns.is_empty() {
            return Ok(false);
        }
        let rel = normalize_rel(rel_path);
        if rel.is_empty() || rel == "." {
            return Ok(false);
        }

        for pattern in &self.patterns {
            if glob_match(pattern, &rel)? {
                return Ok(true);
            }
            if !rel.contains('/') {
                continue;
            }
            for (i, _) in rel.match_indices('/') {
                if glob_match(pattern, &rel[..i])? {
                    return Ok(true);
                }
            }
            for component in rel.split('/') {
                if glob_match(pattern, component)? {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}
