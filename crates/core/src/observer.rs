/// Receives events from a running coupling scheduler.
///
/// Observers watch a run without changing it: they can log progress, record
/// history, or sample engine-side reports at the end of each major step. They
/// cannot steer the scheduler. Its only termination condition is reaching the
/// configured end time.
///
/// Closures taking `&E` implement `Observer`, and `()` is a no-op observer.
pub trait Observer<E> {
    /// Observes one scheduler event.
    fn observe(&mut self, event: &E);
}

impl<E, F> Observer<E> for F
where
    F: FnMut(&E),
{
    fn observe(&mut self, event: &E) {
        self(event);
    }
}

impl<E> Observer<E> for () {
    fn observe(&mut self, _event: &E) {}
}

/// Forwards each event to both observers, left first.
impl<E, A, B> Observer<E> for (A, B)
where
    A: Observer<E>,
    B: Observer<E>,
{
    fn observe(&mut self, event: &E) {
        self.0.observe(event);
        self.1.observe(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed<O: Observer<u32>>(observer: &mut O, events: &[u32]) {
        for event in events {
            observer.observe(event);
        }
    }

    #[test]
    fn closure_sees_every_event() {
        let mut seen = Vec::new();
        feed(&mut |event: &u32| seen.push(*event), &[1, 2, 3]);

        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn pair_forwards_in_order() {
        let mut left = Vec::new();
        let mut right = Vec::new();
        {
            let mut pair = (
                |event: &u32| left.push(*event),
                |event: &u32| right.push(*event * 10),
            );
            feed(&mut pair, &[7, 8]);
        }

        assert_eq!(left, vec![7, 8]);
        assert_eq!(right, vec![70, 80]);
    }
}
