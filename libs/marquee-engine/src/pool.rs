use marquee_api::TargetDescriptor;

/// Ordered, immutable list of storage targets.
///
/// Index 0 is the most preferred target for writes and the eviction
/// target once everything is full.
#[derive(Debug, Clone)]
pub struct TargetPool {
    targets: Vec<TargetDescriptor>,
}

impl TargetPool {
    /// Build a pool; targets are ordered by `priority`, ties keep input order.
    pub fn new(mut targets: Vec<TargetDescriptor>) -> Self {
        targets.sort_by_key(|t| t.priority);
        Self { targets }
    }

    pub fn iter(&self) -> impl Iterator<Item = &TargetDescriptor> {
        self.targets.iter()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Sum of all target capacities.
    pub fn total_capacity(&self) -> usize {
        self.targets.iter().map(|t| t.capacity).sum()
    }
}
