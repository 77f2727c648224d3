/// Navigation through a sequence of difficulty objects.
///
/// Objects know their own index so neighbours can be looked up in the
/// slice they were created into. Lookups past either end return `None`.
pub trait IDifficultyObject: Sized {
    fn idx(&self) -> usize;

    /// The object `backwards_idx + 1` positions before this one.
    fn previous<'a>(&self, backwards_idx: usize, diff_objects: &'a [Self]) -> Option<&'a Self> {
        self.idx()
            .checked_sub(backwards_idx)
            .and_then(|idx| idx.checked_sub(1))
            .and_then(|idx| diff_objects.get(idx))
    }

    /// The object `forwards_idx + 1` positions after this one.
    fn next<'a>(&self, forwards_idx: usize, diff_objects: &'a [Self]) -> Option<&'a Self> {
        self.idx()
            .checked_add(forwards_idx)
            .and_then(|idx| idx.checked_add(1))
            .and_then(|idx| diff_objects.get(idx))
    }
}

pub trait HasStartTime {
    fn start_time(&self) -> f64;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Obj(usize);

    impl IDifficultyObject for Obj {
        fn idx(&self) -> usize {
            self.0
        }
    }

    #[test]
    fn two_object_boundaries() {
        let objects = [Obj(0), Obj(1)];

        assert!(objects[0].previous(0, &objects).is_none());
        assert!(objects[1].next(0, &objects).is_none());
        assert_eq!(objects[0].next(0, &objects).map(Obj::idx), Some(1));
        assert_eq!(objects[1].previous(0, &objects).map(Obj::idx), Some(0));
    }

    #[test]
    fn interior_neighbours() {
        let objects: Vec<_> = (0..5).map(Obj).collect();

        assert_eq!(objects[2].previous(0, &objects).map(Obj::idx), Some(1));
        assert_eq!(objects[2].previous(1, &objects).map(Obj::idx), Some(0));
        assert!(objects[2].previous(2, &objects).is_none());
        assert_eq!(objects[2].next(1, &objects).map(Obj::idx), Some(4));
        assert!(objects[2].next(usize::MAX, &objects).is_none());
    }
}
