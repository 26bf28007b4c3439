use std::path::PathBuf;

use marquee_api::StoreError;

// ════════════════════════════════════════════════════════════════
//  Configuration
// ════════════════════════════════════════════════════════════════

/// Parsed `file://` URI.
///
/// `file:///var/lib/marquee/primary.jsonl?sync=true`
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FileTargetConfig {
    pub path: PathBuf,
    /// fsync the data file after every rewrite.
    pub sync: bool,
}

impl FileTargetConfig {
    pub(crate) fn from_uri(uri: &str) -> Result<Self, StoreError> {
        let rest = uri
            .strip_prefix("file://")
            .ok_or_else(|| StoreError::config("expected a file:// URI"))?;

        let (path, params) = match rest.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (rest, None),
        };
        if path.is_empty() {
            return Err(StoreError::config("file:// URI has an empty path"));
        }

        let mut sync = false;
        for pair in params.into_iter().flat_map(|q| q.split('&')) {
            match pair.split_once('=') {
                Some(("sync", v)) => {
                    sync = v
                        .parse()
                        .map_err(|_| StoreError::config(format!("invalid sync value '{v}'")))?;
                }
                _ => return Err(StoreError::config(format!("unknown file:// parameter '{pair}'"))),
            }
        }

        Ok(Self {
            path: PathBuf::from(path),
            sync,
        })
    }
}
