//! Radio group partitioning
//!
//! A radio group is the maximal run of siblings around an item that contains
//! no separator. Groups are half-open index ranges into the sibling list.

use std::ops::Range;

/// Half-open `[start, end)` range of a radio group within its siblings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RadioGroup {
    pub start: usize,
    pub end: usize,
}

impl RadioGroup {
    /// Resolve the group containing `siblings[index]`
    ///
    /// `start` is one past the nearest separator before `index` (or 0), `end` is
    /// the nearest separator after `index` (or `siblings.len()`).
    pub fn resolve<T>(siblings: &[T], index: usize, is_separator: impl Fn(&T) -> bool) -> Self {
        let index = index.min(siblings.len());
        let start = siblings[..index]
            .iter()
            .rposition(&is_separator)
            .map_or(0, |i| i + 1);
        let end = siblings
            .get(index + 1..)
            .and_then(|rest| rest.iter().position(&is_separator))
            .map_or(siblings.len(), |i| index + 1 + i);
        Self { start, end }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 'S' marks a separator
    fn groups(layout: &str) -> Vec<RadioGroup> {
        let items: Vec<char> = layout.chars().collect();
        (0..items.len())
            .map(|i| RadioGroup::resolve(&items, i, |c| *c == 'S'))
            .collect()
    }

    #[test]
    fn no_separators_spans_everything() {
        for group in groups("rrr") {
            assert_eq!(group, RadioGroup { start: 0, end: 3 });
        }
    }

    #[test]
    fn separators_delimit_runs() {
        let g = groups("rrSrrrSr");
        assert_eq!(g[0], RadioGroup { start: 0, end: 2 });
        assert_eq!(g[1], RadioGroup { start: 0, end: 2 });
        assert_eq!(g[3], RadioGroup { start: 3, end: 6 });
        assert_eq!(g[5], RadioGroup { start: 3, end: 6 });
        assert_eq!(g[7], RadioGroup { start: 7, end: 8 });
    }

    #[test]
    fn members_agree_on_their_group() {
        let layout = "nrrSSrnrS";
        let items: Vec<char> = layout.chars().collect();
        let g = groups(layout);
        for (i, group) in g.iter().enumerate() {
            if items[i] == 'S' {
                continue;
            }
            for member in group.range() {
                assert_eq!(g[member], *group, "member {member} of group at {i}");
            }
        }
    }

    #[test]
    fn adjacent_separators_leave_empty_neighbourhood() {
        let g = groups("SrS");
        assert_eq!(g[1], RadioGroup { start: 1, end: 2 });
        assert_eq!(g[1].range().collect::<Vec<_>>(), vec![1]);
    }
}
