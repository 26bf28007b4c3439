/// Parameters for [`TargetStore::find_all`](crate::TargetStore::find_all).
///
/// Targets return matches newest first (`created_at_ms` descending);
/// records with equal timestamps keep their insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindQuery {
    /// Case-insensitive substring filter on `title`.
    pub title_contains: Option<String>,
    pub skip: usize,
    pub limit: Option<usize>,
}

impl FindQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_title(needle: impl Into<String>) -> Self {
        Self {
            title_contains: Some(needle.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, title: &str) -> bool {
        match &self.title_contains {
            Some(needle) => crate::title_matches(title, needle),
            None => true,
        }
    }

    /// Apply skip/limit to an already sorted result.
    pub fn paginate<T>(&self, mut items: Vec<T>) -> Vec<T> {
        if self.skip >= items.len() {
            return Vec::new();
        }
        if self.skip > 0 {
            items.drain(..self.skip);
        }
        if let Some(limit) = self.limit {
            items.truncate(limit);
        }
        items
    }
}
