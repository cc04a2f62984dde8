use noisy_float::prelude::*;

/// Anything that sits at a point on the timeline.
pub trait Quantify {
    fn quantify(&self) -> R64;
}

/// Time-keyed lookups over slices sorted by [`Quantify`].
///
/// All lookups are binary searches, so the slice must already be sorted
/// ascending. Equal keys are allowed; "latest" means the last of them.
pub trait Seek<T: Quantify> {
    /// Index of the first item strictly after `offset`.
    fn upper_bound(&self, offset: R64) -> usize;

    /// Index of the first item at or after `offset`.
    fn lower_bound(&self, offset: R64) -> usize;

    /// Index of the item in effect at `offset`: the latest item at or
    /// before it, falling back to the first item when `offset` precedes
    /// them all.
    fn index_at(&self, offset: R64) -> Option<usize>;

    fn at_or_before(&self, offset: R64) -> Option<&T>;
}

impl<T: Quantify> Seek<T> for [T] {
    fn upper_bound(&self, offset: R64) -> usize {
        self.partition_point(|item| item.quantify() <= offset)
    }

    fn lower_bound(&self, offset: R64) -> usize {
        self.partition_point(|item| item.quantify() < offset)
    }

    fn index_at(&self, offset: R64) -> Option<usize> {
        (!self.is_empty()).then(|| self.upper_bound(offset).saturating_sub(1))
    }

    fn at_or_before(&self, offset: R64) -> Option<&T> {
        self.index_at(offset).map(|index| &self[index])
    }
}

pub trait QuantifiedInsert<T> {
    /// Inserts after every item with an equal or smaller key and returns
    /// the index the item landed at.
    fn quantified_insert(&mut self, item: T) -> usize;
}

impl<T: Quantify> QuantifiedInsert<T> for Vec<T> {
    fn quantified_insert(&mut self, item: T) -> usize {
        let index = self.upper_bound(item.quantify());
        self.insert(index, item);
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    struct Stamp(R64, char);

    impl Quantify for Stamp {
        fn quantify(&self) -> R64 {
            self.0
        }
    }

    fn stamps() -> Vec<Stamp> {
        [(0., 'a'), (10., 'b'), (10., 'c'), (20., 'd')]
            .into_iter()
            .map(|(time, tag)| Stamp(r64(time), tag))
            .collect()
    }

    #[test_case(-5., Some('a'); "before first falls back to first")]
    #[test_case(0., Some('a'); "exact first")]
    #[test_case(9.99, Some('a'); "between")]
    #[test_case(10., Some('c'); "duplicates resolve to latest")]
    #[test_case(25., Some('d'); "after last")]
    fn at_or_before(offset: f64, expected: Option<char>) {
        assert_eq!(stamps().at_or_before(r64(offset)).map(|stamp| stamp.1), expected);
    }

    #[test]
    fn empty_slice_has_nothing_in_effect() {
        assert!(Vec::<Stamp>::new().at_or_before(r64(0.)).is_none());
    }

    #[test]
    fn insert_lands_after_equal_keys() {
        let mut stamps = stamps();
        assert_eq!(stamps.quantified_insert(Stamp(r64(10.), 'x')), 3);
        assert_eq!(stamps.quantified_insert(Stamp(r64(-1.), 'y')), 0);
        assert_eq!(
            stamps.iter().map(|stamp| stamp.1).collect::<String>(),
            "yabcxd"
        );
    }
}
