use std::fmt;
use std::str::FromStr;

use image::{Rgba, RgbaImage};

use crate::complex::Complex;
use crate::coord::Viewport;

pub const LABEL_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);

pub const GLYPH_SIZE: u32 = 8;

/// Distance of the text baseline from the top or bottom edge.
const BASELINE_MARGIN: i64 = 10;
const SIDE_MARGIN: i64 = 1;

const SIGNIFICANT_DIGITS: usize = 4;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LabelStyle {
    None,
    Corners,
    /// Top-left corner and viewport width.
    Width,
}

impl LabelStyle {
    pub fn texts(&self, viewport: &Viewport) -> Option<(String, String)> {
        match self {
            Self::None => None,
            Self::Corners => Some((
                format_complex(viewport.top_left),
                format_complex(viewport.bottom_right),
            )),
            Self::Width => Some((
                format_complex(viewport.top_left),
                format!("w={}", format_g(viewport.width(), SIGNIFICANT_DIGITS)),
            )),
        }
    }

    pub fn overlay(&self, img: &mut RgbaImage, viewport: &Viewport) {
        if let Some((upper, lower)) = self.texts(viewport) {
            let width = img.width() as i64;
            let height = img.height() as i64;
            draw_text(img, &upper, SIDE_MARGIN, BASELINE_MARGIN, LABEL_COLOR);
            let x = width - SIDE_MARGIN - text_width(&lower);
            draw_text(img, &lower, x, height - BASELINE_MARGIN, LABEL_COLOR);
        }
    }
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self::Corners
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown label style {0:?}, expected \"none\", \"corners\" or \"width\"")]
pub struct UnknownStyle(String);

impl FromStr for LabelStyle {
    type Err = UnknownStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "corners" => Ok(Self::Corners),
            "width" => Ok(Self::Width),
            _ => Err(UnknownStyle(s.to_string())),
        }
    }
}

impl fmt::Display for LabelStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Corners => write!(f, "corners"),
            Self::Width => write!(f, "width"),
        }
    }
}

pub fn text_width(text: &str) -> i64 {
    text.chars().count() as i64 * GLYPH_SIZE as i64
}

/// Draws `text` with its left edge at `x` and the bottom of the glyph cells
/// at `baseline`. Pixels falling outside the image are skipped.
pub fn draw_text(img: &mut RgbaImage, text: &str, x: i64, baseline: i64, color: Rgba<u8>) {
    let (width, height) = (img.width() as i64, img.height() as i64);
    let top = baseline - GLYPH_SIZE as i64;
    for (n, ch) in text.chars().enumerate() {
        let left = x + n as i64 * GLYPH_SIZE as i64;
        for (row, bits) in glyph(ch).into_iter().enumerate() {
            for col in 0..GLYPH_SIZE as i64 {
                if bits & (0x80u8 >> col) == 0 {
                    continue;
                }
                let px = left + col;
                let py = top + row as i64;
                if (0..width).contains(&px) && (0..height).contains(&py) {
                    img.put_pixel(px as u32, py as u32, color);
                }
            }
        }
    }
}

pub fn format_complex(z: Complex) -> String {
    let re = format_g(z.re, SIGNIFICANT_DIGITS);
    let im = format_g(z.im, SIGNIFICANT_DIGITS);
    if im.starts_with('-') || im.starts_with('+') {
        format!("({}{}i)", re, im)
    } else {
        format!("({}+{}i)", re, im)
    }
}

/// Formats `x` with `precision` significant digits, switching to
/// exponent notation for exponents below -4 or at least `precision`.
/// Trailing zeros are removed.
pub fn format_g(x: f64, precision: usize) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }
    if x == 0.0 {
        return if x.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    let precision = precision.max(1);
    let sci = format!("{:.*e}", precision - 1, x);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or_default()),
        None => (sci.as_str(), 0),
    };
    if exp < -4 || exp >= precision as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_zeros(mantissa), sign, exp.abs())
    } else {
        let decimals = (precision as i32 - 1 - exp) as usize;
        trim_zeros(&format!("{:.*}", decimals, x)).to_string()
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

fn glyph(ch: char) -> [u8; 8] {
    match ch {
        '(' => [0x0C, 0x18, 0x30, 0x30, 0x30, 0x18, 0x0C, 0x00],
        ')' => [0x30, 0x18, 0x0C, 0x0C, 0x0C, 0x18, 0x30, 0x00],
        '+' => [0x00, 0x18, 0x18, 0x7E, 0x18, 0x18, 0x00, 0x00],
        '-' => [0x00, 0x00, 0x00, 0x7E, 0x00, 0x00, 0x00, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x18, 0x18, 0x00],
        '0' => [0x3C, 0x66, 0x6E, 0x7E, 0x76, 0x66, 0x3C, 0x00],
        '1' => [0x18, 0x38, 0x18, 0x18, 0x18, 0x18, 0x7E, 0x00],
        '2' => [0x3C, 0x66, 0x06, 0x0C, 0x18, 0x30, 0x7E, 0x00],
        '3' => [0x3C, 0x66, 0x06, 0x1C, 0x06, 0x66, 0x3C, 0x00],
        '4' => [0x0C, 0x1C, 0x3C, 0x6C, 0x7E, 0x0C, 0x0C, 0x00],
        '5' => [0x7E, 0x60, 0x7C, 0x06, 0x06, 0x66, 0x3C, 0x00],
        '6' => [0x1C, 0x30, 0x60, 0x7C, 0x66, 0x66, 0x3C, 0x00],
        '7' => [0x7E, 0x06, 0x0C, 0x18, 0x30, 0x30, 0x30, 0x00],
        '8' => [0x3C, 0x66, 0x66, 0x3C, 0x66, 0x66, 0x3C, 0x00],
        '9' => [0x3C, 0x66, 0x66, 0x3E, 0x06, 0x0C, 0x38, 0x00],
        '=' => [0x00, 0x00, 0x7E, 0x00, 0x7E, 0x00, 0x00, 0x00],
        'I' => [0x3C, 0x18, 0x18, 0x18, 0x18, 0x18, 0x3C, 0x00],
        'N' => [0x66, 0x76, 0x7E, 0x7E, 0x6E, 0x66, 0x66, 0x00],
        'a' => [0x00, 0x00, 0x3C, 0x06, 0x3E, 0x66, 0x3E, 0x00],
        'e' => [0x00, 0x00, 0x3C, 0x66, 0x7E, 0x60, 0x3C, 0x00],
        'f' => [0x1C, 0x30, 0x30, 0x7C, 0x30, 0x30, 0x30, 0x00],
        'i' => [0x18, 0x00, 0x38, 0x18, 0x18, 0x18, 0x3C, 0x00],
        'n' => [0x00, 0x00, 0x7C, 0x66, 0x66, 0x66, 0x66, 0x00],
        'w' => [0x00, 0x00, 0x63, 0x6B, 0x6B, 0x7F, 0x36, 0x00],
        // unknown characters render as a hollow box
        ' ' => [0x00; 8],
        _ => [0x7E, 0x42, 0x42, 0x42, 0x42, 0x42, 0x7E, 0x00],
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::complex::c;

    #[test]
    fn test_format_g() {
        assert_eq!(format_g(-2.0, 4), "-2");
        assert_eq!(format_g(0.5, 4), "0.5");
        assert_eq!(format_g(1.5, 4), "1.5");
        assert_eq!(format_g(0.0, 4), "0");
        assert_eq!(format_g(0.123456, 4), "0.1235");
        assert_eq!(format_g(1234.0, 4), "1234");
        assert_eq!(format_g(12346.0, 4), "1.235e+04");
        assert_eq!(format_g(0.00001, 4), "1e-05");
        assert_eq!(format_g(0.0001, 4), "0.0001");
        assert_eq!(format_g(f64::INFINITY, 4), "+Inf");
    }

    #[test]
    fn test_format_complex() {
        assert_eq!(format_complex(c(-2.0, 2.0)), "(-2+2i)");
        assert_eq!(format_complex(c(2.0, -2.0)), "(2-2i)");
        assert_eq!(format_complex(c(0.5, 1.5)), "(0.5+1.5i)");
        // labels parse back as complex literals
        let parsed: Complex = format_complex(c(-0.75, 0.125)).parse().unwrap();
        assert_eq!(parsed, c(-0.75, 0.125));
    }

    #[test]
    fn test_texts() {
        let vp = Viewport::default();
        assert_eq!(LabelStyle::None.texts(&vp), None);
        assert_eq!(
            LabelStyle::Corners.texts(&vp),
            Some(("(-2+2i)".to_string(), "(2-2i)".to_string()))
        );
        assert_eq!(
            LabelStyle::Width.texts(&vp),
            Some(("(-2+2i)".to_string(), "w=4".to_string()))
        );
    }

    #[test]
    fn test_overlay_stays_in_label_boxes() {
        let size = 200u32;
        let background = Rgba([10, 20, 30, 255]);
        let mut img = RgbaImage::from_pixel(size, size, background);
        let vp = Viewport::default();
        LabelStyle::Corners.overlay(&mut img, &vp);

        let upper_right = 1 + text_width("(-2+2i)") as u32;
        let lower_left = size - 1 - text_width("(2-2i)") as u32;
        let mut drawn = 0;
        for (x, y, px) in img.enumerate_pixels() {
            if *px == background {
                continue;
            }
            assert_eq!(*px, LABEL_COLOR);
            let in_upper = x < upper_right && (2..10).contains(&y);
            let in_lower = x >= lower_left && (size - 18..size - 10).contains(&y);
            assert!(in_upper || in_lower, "stray pixel at ({}, {})", x, y);
            drawn += 1;
        }
        assert!(drawn > 0);
    }

    #[test]
    fn test_overlay_none_is_noop() {
        let mut img = RgbaImage::from_pixel(50, 50, Rgba([1, 2, 3, 255]));
        LabelStyle::None.overlay(&mut img, &Viewport::default());
        assert!(img.pixels().all(|p| *p == Rgba([1, 2, 3, 255])));
    }

    #[test]
    fn test_draw_text_clips() {
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        draw_text(&mut img, "(8.8e+88+8i)", -3, 6, LABEL_COLOR);
        assert_eq!(img.dimensions(), (4, 4));
    }

    #[test]
    fn test_style_from_str() {
        assert_eq!("width".parse::<LabelStyle>().unwrap(), LabelStyle::Width);
        assert_eq!("none".parse::<LabelStyle>().unwrap(), LabelStyle::None);
        assert!("left".parse::<LabelStyle>().is_err());
    }
}
