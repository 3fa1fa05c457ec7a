//! Bucket directory walker.
//!
//! Reproduces S3 `ListObjects`/`ListObjectsV2` paging over a sorted
//! depth-first traversal of a bucket directory: keys come out in byte
//! order, a delimiter rolls keys up into common prefixes (without
//! descending beneath them), the marker is exclusive, and pages cut off at
//! `max_keys` entries counting objects and common prefixes alike.
//!
//! A per-entry callback decides what an entry is: files become objects,
//! directories become directory-objects or plain structure to descend
//! into. Internal state directories are pruned at the bucket root and the
//! walk streams — nothing beyond the current page is materialized.

use std::fs::Metadata;
use std::ops::ControlFlow;
use std::path::Path;

use fsgate_s3_model::types::Object;

use crate::error::BackendError;

/// Result of one walk page.
#[derive(Debug, Default)]
pub struct WalkResults {
    /// Rolled-up key groups, in emission order.
    pub common_prefixes: Vec<String>,
    /// Matching objects, in key order.
    pub objects: Vec<Object>,
    /// Whether the walk stopped at `max_keys` with entries remaining.
    pub truncated: bool,
    /// Last emitted entry (key or common prefix) when truncated.
    pub next_marker: String,
}

/// Per-entry decision callback.
///
/// Receives the entry's key-relative path (no trailing slash), its
/// filesystem metadata, and whether it is a directory. `Ok(None)` skips
/// the entry as an object (directories are still descended into).
pub trait GetObjFn: FnMut(&str, &Metadata, bool) -> Result<Option<Object>, BackendError> {}

impl<F: FnMut(&str, &Metadata, bool) -> Result<Option<Object>, BackendError>> GetObjFn for F {}

/// Walk `bucket_dir` and assemble one listing page.
///
/// `skip_dirs` names top-level directories to prune entirely (the internal
/// state directory). `max_keys <= 0` yields an empty, non-truncated page.
///
/// # Errors
///
/// Propagates callback errors and unexpected filesystem failures.
pub fn walk(
    bucket_dir: &Path,
    prefix: &str,
    delimiter: &str,
    marker: &str,
    max_keys: i32,
    mut get_obj: impl GetObjFn,
    skip_dirs: &[&str],
) -> Result<WalkResults, BackendError> {
    let mut state = WalkState {
        prefix,
        delimiter,
        marker,
        max_keys: usize::try_from(max_keys).unwrap_or(0),
        results: WalkResults::default(),
        last_key: String::new(),
    };

    if state.max_keys > 0 {
        let flow = walk_dir(bucket_dir, String::new(), &mut state, &mut get_obj, skip_dirs)
            .map_err(|e| BackendError::Internal(anyhow::Error::new(e).context("walk bucket")))?;
        if let ControlFlow::Continue(Err(err)) = flow {
            return Err(err);
        }
    }

    if state.results.truncated {
        state.results.next_marker = state.last_key.clone();
    }
    Ok(state.results)
}

struct WalkState<'a> {
    prefix: &'a str,
    delimiter: &'a str,
    marker: &'a str,
    max_keys: usize,
    results: WalkResults,
    last_key: String,
}

impl WalkState<'_> {
    fn entry_count(&self) -> usize {
        self.results.objects.len() + self.results.common_prefixes.len()
    }

    /// Whether the page is already full; flags truncation when it is.
    fn page_full(&mut self) -> bool {
        if self.entry_count() == self.max_keys {
            self.results.truncated = true;
            return true;
        }
        false
    }

    fn emit_object(&mut self, obj: Object) -> ControlFlow<()> {
        if self.page_full() {
            return ControlFlow::Break(());
        }
        self.last_key.clone_from(&obj.key);
        self.results.objects.push(obj);
        ControlFlow::Continue(())
    }

    fn emit_common_prefix(&mut self, cp: String) -> ControlFlow<()> {
        // Keys sharing a common prefix are contiguous in sorted order, so
        // a duplicate can only be the most recent emission.
        if self.results.common_prefixes.last() == Some(&cp) || cp.as_str() <= self.marker {
            return ControlFlow::Continue(());
        }
        if self.page_full() {
            return ControlFlow::Break(());
        }
        self.last_key.clone_from(&cp);
        self.results.common_prefixes.push(cp);
        ControlFlow::Continue(())
    }
}

/// Recursive sorted traversal. `rel` is the key prefix of `dir` ("" or
/// ends with `/`).
fn walk_dir(
    dir: &Path,
    rel: String,
    state: &mut WalkState<'_>,
    get_obj: &mut impl GetObjFn,
    skip_dirs: &[&str],
) -> std::io::Result<ControlFlow<(), Result<(), BackendError>>> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        // Keys are UTF-8; anything else is invisible to the gateway.
        if let Some(name) = entry.file_name().to_str() {
            entries.push((name.to_owned(), entry));
        }
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    for (name, entry) in entries {
        if rel.is_empty() && skip_dirs.contains(&name.as_str()) {
            continue;
        }

        let meta = match entry.metadata() {
            Ok(meta) => meta,
            // Raced with a concurrent delete; the entry is simply gone.
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
            Err(err) => return Err(err),
        };
        let path = format!("{rel}{name}");

        if meta.is_dir() {
            let key = format!("{path}/");

            // Prune subtrees that cannot contain keys past the marker.
            if !state.marker.is_empty()
                && key.as_str() <= state.marker
                && !state.marker.starts_with(&key)
            {
                continue;
            }

            if key.starts_with(state.prefix) {
                let rest = &key[state.prefix.len()..];
                if !state.delimiter.is_empty() {
                    if let Some(idx) = rest.find(state.delimiter) {
                        // The whole subtree rolls up into one common
                        // prefix; no descent needed.
                        let cp = format!(
                            "{}{}",
                            state.prefix,
                            &rest[..idx + state.delimiter.len()]
                        );
                        if state.emit_common_prefix(cp).is_break() {
                            return Ok(ControlFlow::Break(()));
                        }
                        continue;
                    }
                }

                // Directory-objects carry an etag attribute; plain
                // structure does not and is only descended into.
                if key.as_str() > state.marker {
                    match get_obj(&path, &meta, true) {
                        Ok(Some(obj)) => {
                            if state.emit_object(obj).is_break() {
                                return Ok(ControlFlow::Break(()));
                            }
                        }
                        Ok(None) => {}
                        Err(err) => return Ok(ControlFlow::Continue(Err(err))),
                    }
                }
            } else if !state.prefix.starts_with(&key) {
                // Disjoint from the prefix; nothing below can match.
                continue;
            }

            match walk_dir(&entry.path(), key, state, &mut *get_obj, skip_dirs)? {
                ControlFlow::Break(()) => return Ok(ControlFlow::Break(())),
                ControlFlow::Continue(Err(err)) => return Ok(ControlFlow::Continue(Err(err))),
                ControlFlow::Continue(Ok(())) => {}
            }
            continue;
        }

        // Regular file.
        if !path.starts_with(state.prefix) {
            continue;
        }
        let rest = &path[state.prefix.len()..];
        if !state.delimiter.is_empty() {
            if let Some(idx) = rest.find(state.delimiter) {
                let cp = format!("{}{}", state.prefix, &rest[..idx + state.delimiter.len()]);
                if state.emit_common_prefix(cp).is_break() {
                    return Ok(ControlFlow::Break(()));
                }
                continue;
            }
        }
        if path.as_str() <= state.marker {
            continue;
        }

        match get_obj(&path, &meta, false) {
            Ok(Some(obj)) => {
                if state.emit_object(obj).is_break() {
                    return Ok(ControlFlow::Break(()));
                }
            }
            Ok(None) => {}
            Err(err) => return Ok(ControlFlow::Continue(Err(err))),
        }
    }

    Ok(ControlFlow::Continue(Ok(())))
}
