use serde::{Deserialize, Serialize};

/// A gallery entry as stored by a target.
///
/// `id` is assigned by the owning target and is only unique within it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRecord {
    pub id: String,
    pub title: String,
    pub thumbnail_url: String,
    pub link: String,
    /// Insertion timestamp (Unix ms). Global ordering and eviction key.
    #[serde(rename = "createdAt")]
    pub created_at_ms: i64,
}

impl MovieRecord {
    pub fn from_document(id: impl Into<String>, doc: MovieDocument) -> Self {
        Self {
            id: id.into(),
            title: doc.title,
            thumbnail_url: doc.thumbnail_url,
            link: doc.link,
            created_at_ms: doc.created_at_ms,
        }
    }

    /// Overwrite content in place, keeping the identifier.
    pub fn overwrite(&mut self, doc: MovieDocument) {
        self.title = doc.title;
        self.thumbnail_url = doc.thumbnail_url;
        self.link = doc.link;
        self.created_at_ms = doc.created_at_ms;
    }
}

/// Record content without identity: what insert and replace write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDocument {
    pub title: String,
    pub thumbnail_url: String,
    pub link: String,
    #[serde(rename = "createdAt")]
    pub created_at_ms: i64,
}

/// Client-supplied payload for a new entry.
///
/// Missing fields deserialize as empty strings so that [`NewMovie::validate`]
/// can name the offending field instead of failing inside serde.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewMovie {
    pub title: String,
    #[serde(alias = "thumbnail")]
    pub thumbnail_url: String,
    pub link: String,
}

impl NewMovie {
    pub fn new(
        title: impl Into<String>,
        thumbnail_url: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            thumbnail_url: thumbnail_url.into(),
            link: link.into(),
        }
    }

    /// Trim every field and reject the payload if a required one is empty.
    pub fn validate(self) -> Result<Self, String> {
        let movie = Self {
            title: self.title.trim().to_string(),
            thumbnail_url: self.thumbnail_url.trim().to_string(),
            link: self.link.trim().to_string(),
        };
        if movie.title.is_empty() {
            return Err("missing required field 'title'".into());
        }
        if movie.thumbnail_url.is_empty() {
            return Err("missing required field 'thumbnailUrl'".into());
        }
        if movie.link.is_empty() {
            return Err("missing required field 'link'".into());
        }
        Ok(movie)
    }

    pub fn into_document(self, created_at_ms: i64) -> MovieDocument {
        MovieDocument {
            title: self.title,
            thumbnail_url: self.thumbnail_url,
            link: self.link,
            created_at_ms,
        }
    }
}
