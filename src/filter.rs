use crate::Q;

/// A smoothing filter fed one sample per control cycle.
///
/// [`Throttle`](crate::Throttle) drives this interface to smooth the raw
/// sensor signal before mapping it, and is agnostic to the algorithm behind
/// it (moving average, IIR, ...). The consuming firmware supplies the
/// implementation; this crate only ships the [`Passthrough`] null filter.
pub trait Filter {
    /// Feeds one raw sample and returns the new filtered value.
    fn update(&mut self, input: Q) -> Q;

    /// Returns the most recent filtered value without feeding a sample.
    fn value(&self) -> Q;
}

/// The null filter: every sample passes through unchanged.
///
/// Useful when the raw signal is already clean enough, and as the stand-in
/// filter in examples and tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct Passthrough {
    value: Q,
}

impl Filter for Passthrough {
    fn update(&mut self, input: Q) -> Q {
        self.value = input;
        input
    }

    fn value(&self) -> Q {
        self.value
    }
}
