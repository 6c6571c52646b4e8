use std::fmt;
use std::str::FromStr;

use image::Rgba;

pub const IN_SET: Rgba<u8> = Rgba([0, 0, 0, 255]);

pub trait Painter {
    fn color(&self, iter: u32) -> Rgba<u8>;
}

/// White for points that escape immediately, fading to black at `max_iter`.
pub struct Greyscale {
    max_iter: u32,
}

impl Greyscale {
    pub fn new(max_iter: u32) -> Self {
        Self { max_iter }
    }
}

impl Painter for Greyscale {
    fn color(&self, iter: u32) -> Rgba<u8> {
        let shade = (255 * iter as u64 / self.max_iter as u64).min(255) as u8;
        let v = 255 - shade;
        Rgba([v, v, v, 255])
    }
}

/// Three triangular ramps, one per channel, offset by a third of `max_iter`.
pub struct TriPhase {
    max_iter: u32,
}

impl TriPhase {
    pub fn new(max_iter: u32) -> Self {
        Self { max_iter }
    }

    fn channel(&self, iter: i64, offset: i64) -> u8 {
        let max_iter = self.max_iter as i64;
        let x = iter + offset;
        let slope = 6 * 255 / max_iter;
        let (slope, y_intercept) = if x > max_iter / 2 {
            (-slope, 5 * 255)
        } else {
            (slope, -255)
        };
        (slope * x + y_intercept).clamp(0, 255) as u8
    }
}

impl Painter for TriPhase {
    fn color(&self, iter: u32) -> Rgba<u8> {
        if iter == self.max_iter {
            return IN_SET;
        }
        let iter = iter as i64;
        let max_iter = self.max_iter as i64;
        Rgba([
            self.channel(iter, 0),
            self.channel(iter, max_iter / 3),
            self.channel(iter, 2 * max_iter / 3),
            255,
        ])
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColorScheme {
    Grayscale,
    Full,
}

impl ColorScheme {
    pub fn painter(self, max_iter: u32) -> Box<dyn Painter + Send + Sync> {
        match self {
            Self::Grayscale => Box::new(Greyscale::new(max_iter)),
            Self::Full => Box::new(TriPhase::new(max_iter)),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::Grayscale
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown color scheme {0:?}, expected \"grayscale\" or \"full\"")]
pub struct UnknownScheme(String);

impl FromStr for ColorScheme {
    type Err = UnknownScheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grayscale" | "greyscale" | "gray" => Ok(Self::Grayscale),
            "full" | "color" => Ok(Self::Full),
            _ => Err(UnknownScheme(s.to_string())),
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grayscale => write!(f, "grayscale"),
            Self::Full => write!(f, "full"),
        }
    }
}
