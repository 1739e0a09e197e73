//! Range store interface and tag application
//!
//! A `RangeStore` holds category tags over buffer regions. Highlight passes
//! clear the syntax categories of the region they reprocess and then apply
//! freshly classified ranges in order. Overlay categories are left alone.

use super::tokens::{Category, Position, Region};

/// A category to be applied over a region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyledRange {
    pub category: Category,
    pub region: Region,
}

impl StyledRange {
    pub fn new(category: Category, region: Region) -> Self {
        Self { category, region }
    }

    /// Shift the range down by `lines` lines
    pub fn offset_lines(self, lines: usize) -> Self {
        Self {
            category: self.category,
            region: self.region.offset_lines(lines),
        }
    }
}

/// Presentation metadata of a host buffer
pub trait RangeStore {
    /// Remove the given categories from every position inside `region`
    fn clear(&mut self, categories: &[Category], region: Region);

    /// Tag `region` with `category`; reapplying an existing tag changes nothing
    fn apply(&mut self, category: Category, region: Region);

    /// Disjoint regions currently tagged with `category`, in order
    fn ranges(&self, category: Category) -> Vec<Region>;

    /// Categories with at least one tagged region
    fn categories(&self) -> Vec<Category>;

    /// Remove `category` everywhere
    fn clear_category(&mut self, category: Category) {
        for region in self.ranges(category) {
            self.clear(&[category], region);
        }
    }
}

/// Replace the pass categories in `region` with `ranges`
///
/// `error` and the overlay categories survive; `default` is never applied.
pub fn apply_pass<S: RangeStore + ?Sized>(store: &mut S, region: Region, ranges: &[StyledRange]) {
    store.clear(&Category::PASS, region);
    for range in ranges {
        if Category::PASS.contains(&range.category) && !range.region.is_empty() {
            store.apply(range.category, range.region);
        }
    }
}

/// Sorted set of disjoint, non-adjacent regions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionSet {
    regions: Vec<Region>,
}

impl RegionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Add a region, merging it with any region it overlaps or touches
    pub fn insert(&mut self, region: Region) {
        if region.is_empty() {
            return;
        }
        let mut merged = region;
        self.regions.retain(|r| {
            if r.start <= merged.end && merged.start <= r.end {
                merged.start = merged.start.min(r.start);
                merged.end = merged.end.max(r.end);
                false
            } else {
                true
            }
        });
        let idx = self.regions.partition_point(|r| r.start < merged.start);
        self.regions.insert(idx, merged);
    }

    /// Subtract a region, splitting regions that straddle it
    pub fn remove(&mut self, region: Region) {
        if region.is_empty() {
            return;
        }
        let mut kept = Vec::with_capacity(self.regions.len() + 1);
        for r in std::mem::take(&mut self.regions) {
            if !r.overlaps(&region) {
                kept.push(r);
                continue;
            }
            if r.start < region.start {
                kept.push(Region::new(r.start, region.start));
            }
            if region.end < r.end {
                kept.push(Region::new(region.end, r.end));
            }
        }
        self.regions = kept;
    }

    /// Check if any region contains the position
    pub fn contains(&self, pos: Position) -> bool {
        let idx = self.regions.partition_point(|r| r.end <= pos);
        self.regions.get(idx).is_some_and(|r| r.contains(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(sl: usize, sc: usize, el: usize, ec: usize) -> Region {
        Region::new(Position::new(sl, sc), Position::new(el, ec))
    }

    #[test]
    fn test_insert_merges_touching() {
        let mut set = RegionSet::new();
        set.insert(region(1, 0, 1, 2));
        set.insert(region(1, 3, 1, 5));
        assert_eq!(set.regions().len(), 2);
        set.insert(region(1, 2, 1, 3));
        assert_eq!(set.regions(), &[region(1, 0, 1, 5)]);
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut set = RegionSet::new();
        set.insert(region(2, 4, 3, 1));
        let once = set.clone();
        set.insert(region(2, 4, 3, 1));
        assert_eq!(set, once);
    }

    #[test]
    fn test_insert_keeps_order() {
        let mut set = RegionSet::new();
        set.insert(region(5, 0, 5, 1));
        set.insert(region(1, 0, 1, 1));
        set.insert(region(3, 0, 3, 1));
        let starts: Vec<_> = set.regions().iter().map(|r| r.start.line).collect();
        assert_eq!(starts, vec![1, 3, 5]);
    }

    #[test]
    fn test_remove_splits() {
        let mut set = RegionSet::new();
        set.insert(region(1, 0, 1, 10));
        set.remove(region(1, 3, 1, 6));
        assert_eq!(set.regions(), &[region(1, 0, 1, 3), region(1, 6, 1, 10)]);
        assert!(set.contains(Position::new(1, 2)));
        assert!(!set.contains(Position::new(1, 3)));
        assert!(set.contains(Position::new(1, 6)));
    }

    #[test]
    fn test_remove_across_lines() {
        let mut set = RegionSet::new();
        set.insert(region(1, 0, 1, 4));
        set.insert(region(2, 0, 2, 4));
        set.insert(region(4, 0, 4, 4));
        set.remove(region(1, 2, 3, 0));
        assert_eq!(set.regions(), &[region(1, 0, 1, 2), region(4, 0, 4, 4)]);
    }

    #[test]
    fn test_empty_regions_ignored() {
        let mut set = RegionSet::new();
        set.insert(region(1, 4, 1, 4));
        assert!(set.is_empty());
    }
}
