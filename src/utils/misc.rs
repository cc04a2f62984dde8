use std::cell::OnceCell;

/// A lazily computed value tagged with the generation it was computed for.
///
/// Reads go through [`Cached::get_or_compute`] on a shared reference and
/// compute at most once; [`Cached::invalidate`] needs exclusive access, so
/// a value can never be reset while something still borrows it.
#[derive(Debug, Clone, Default)]
pub struct Cached<T> {
    generation: u64,
    cell: OnceCell<T>,
}

impl<T> Cached<T> {
    pub fn get_or_compute(&self, compute: impl FnOnce() -> T) -> &T {
        self.cell.get_or_init(compute)
    }

    pub fn invalidate(&mut self) {
        self.cell.take();
        self.generation = self.generation.wrapping_add(1);
    }

    /// Bumped on every invalidation. Consumers holding derived data can
    /// compare generations instead of subscribing to changes.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    #[test]
    fn computes_once_per_generation() {
        let calls = Cell::new(0);
        let mut cached = Cached::<u32>::default();

        let compute = || {
            calls.set(calls.get() + 1);
            7
        };

        assert_eq!(*cached.get_or_compute(compute), 7);
        assert_eq!(*cached.get_or_compute(compute), 7);
        assert_eq!(calls.get(), 1);

        cached.invalidate();
        assert_eq!(cached.generation(), 1);

        assert_eq!(*cached.get_or_compute(compute), 7);
        assert_eq!(calls.get(), 2);
    }
}
