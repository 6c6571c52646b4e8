use crate::complex::*;

/// The rectangle of the complex plane that is rasterized.
///
/// `top_left` is expected to lie left of and above `bottom_right`. Other
/// orientations are accepted and simply produce a mirrored or empty image.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    pub top_left: Complex,
    pub bottom_right: Complex,
}

impl Viewport {
    pub const fn new(top_left: Complex, bottom_right: Complex) -> Self {
        Self {
            top_left,
            bottom_right,
        }
    }

    pub fn from_center(center: Complex, half_width: f64) -> Self {
        Self::new(
            center + c(-half_width, half_width),
            center + c(half_width, -half_width),
        )
    }

    pub fn width(&self) -> f64 {
        self.bottom_right.re - self.top_left.re
    }

    pub fn height(&self) -> f64 {
        self.top_left.im - self.bottom_right.im
    }

    pub fn center(&self) -> Complex {
        c(
            self.top_left.re + self.width() / 2.0,
            self.top_left.im - self.height() / 2.0,
        )
    }

    /// Maps pixel `(column, row)` of a `size`x`size` raster onto the plane.
    /// Rows grow downward while the imaginary part decreases.
    pub fn point_at(&self, column: u32, row: u32, size: u32) -> Complex {
        let x_delta = column as f64 / size as f64 * self.width();
        let y_delta = row as f64 / size as f64 * self.height();
        c(self.top_left.re + x_delta, self.top_left.im - y_delta)
    }

    /// Square viewport around `center` whose width is this one's scaled by `factor`.
    pub fn zoomed(&self, center: Complex, factor: f64) -> Self {
        Self::from_center(center, self.width() / 2.0 * factor)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(c(-2.0, 2.0), c(2.0, -2.0))
    }
}
