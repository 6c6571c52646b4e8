use crate::complex::Complex;

pub const DEFAULT_MAX_ITER: u32 = 1000;

const BOUND: f64 = 2.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EscapeTime {
    max_iter: u32,
}

impl EscapeTime {
    pub fn new(max_iter: u32) -> Self {
        Self { max_iter }
    }

    /// Index of the first iteration at which the orbit is seen outside the
    /// `[-2, 2] x [-2, 2]` square, or `max_iter` if it never leaves.
    ///
    /// Each iteration tests the current value before advancing it, so the
    /// test at index 0 always sees `z = 0` and a point that escapes on its
    /// first step reports 1.
    pub fn steps_before_diverge(&self, point: Complex) -> u32 {
        let mut current = Complex::ZERO;
        for iter in 0..self.max_iter {
            if current.outside_square(BOUND) {
                return iter;
            }
            current = current * current + point;
        }
        self.max_iter
    }
}

impl Default for EscapeTime {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITER)
    }
}
