use std::io::Cursor;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use image::{ImageError, ImageFormat, ImageOutputFormat, RgbaImage};

use crate::config::{ConfigError, RenderConfig};
use crate::coord::Viewport;
use crate::escape::EscapeTime;
use crate::label::LabelStyle;
use crate::painter::Painter;
use crate::threads::scatter;

const CHANNELS: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("invalid render configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to encode PNG: {0}")]
    Encode(#[from] ImageError),
    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: ImageError },
}

pub struct Renderer {
    size: u32,
    escape: EscapeTime,
    painter: Box<dyn Painter + Send + Sync>,
    label: LabelStyle,
    threads: usize,
}

impl Renderer {
    pub fn new(config: &RenderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            size: config.image_size,
            escape: EscapeTime::new(config.max_iter),
            painter: config.color.painter(config.max_iter),
            label: config.label,
            threads: config.threads,
        })
    }

    pub fn render(&self, viewport: &Viewport) -> RgbaImage {
        let mut img = self.raster(viewport);
        self.label.overlay(&mut img, viewport);
        img
    }

    /// Same as `render`, but returns `None` once `cancel` has been set.
    /// Workers check the flag at the start of every row.
    pub fn render_cancellable(
        &self,
        viewport: &Viewport,
        cancel: &AtomicBool,
    ) -> Option<RgbaImage> {
        let pixels: Vec<u8> = scatter(0..self.size, self.threads, |rows| {
            self.render_rows(viewport, rows, Some(cancel))
        });
        if cancel.load(Ordering::Relaxed) {
            return None;
        }
        let mut img = self.image_from(&pixels);
        self.label.overlay(&mut img, viewport);
        Some(img)
    }

    /// Fractal raster only. Rows are split into bands across worker threads;
    /// the output does not depend on the thread count.
    pub fn raster(&self, viewport: &Viewport) -> RgbaImage {
        let pixels: Vec<u8> = scatter(0..self.size, self.threads, |rows| {
            self.render_rows(viewport, rows, None)
        });
        self.image_from(&pixels)
    }

    fn image_from(&self, pixels: &[u8]) -> RgbaImage {
        let mut img = RgbaImage::new(self.size, self.size);
        img.copy_from_slice(pixels);
        img
    }

    fn render_rows(
        &self,
        viewport: &Viewport,
        rows: Range<u32>,
        cancel: Option<&AtomicBool>,
    ) -> Vec<u8> {
        let mut buf = Vec::with_capacity(rows.len() * self.size as usize * CHANNELS);
        for row in rows {
            if cancel.map_or(false, |flag| flag.load(Ordering::Relaxed)) {
                break;
            }
            for column in 0..self.size {
                let point = viewport.point_at(column, row, self.size);
                let iter = self.escape.steps_before_diverge(point);
                buf.extend_from_slice(&self.painter.color(iter).0);
            }
        }
        buf
    }
}

pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, RenderError> {
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageOutputFormat::Png)?;
    Ok(bytes.into_inner())
}

pub fn save_png(img: &RgbaImage, path: &Path) -> Result<(), RenderError> {
    img.save_with_format(path, ImageFormat::Png)
        .map_err(|source| RenderError::Write {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod test {
    use image::Rgba;

    use super::*;
    use crate::complex::c;
    use crate::painter::{ColorScheme, IN_SET};

    fn config(size: u32, max_iter: u32, color: ColorScheme, threads: usize) -> RenderConfig {
        RenderConfig {
            image_size: size,
            max_iter,
            color,
            label: LabelStyle::None,
            threads,
        }
    }

    #[test]
    fn test_default_viewport_center_in_set() {
        let vp = Viewport::default();
        for color in [ColorScheme::Grayscale, ColorScheme::Full] {
            let renderer = Renderer::new(&RenderConfig {
                color,
                ..RenderConfig::default()
            })
            .unwrap();
            let img = renderer.render(&vp);
            assert_eq!(img.dimensions(), (1000, 1000));
            assert_eq!(*img.get_pixel(500, 500), IN_SET);
        }
    }

    #[test]
    fn test_pixels_match_escape_and_painter() {
        let vp = Viewport::new(c(-2.0, 1.25), c(0.5, -1.25));
        let cfg = config(40, 60, ColorScheme::Full, 1);
        let img = Renderer::new(&cfg).unwrap().raster(&vp);
        let escape = EscapeTime::new(60);
        let painter = ColorScheme::Full.painter(60);
        for (x, y, px) in img.enumerate_pixels() {
            let iter = escape.steps_before_diverge(vp.point_at(x, y, 40));
            assert_eq!(*px, painter.color(iter));
        }
    }

    #[test]
    fn test_thread_count_does_not_change_output() {
        let vp = Viewport::from_center(c(-0.75, 0.1), 0.4);
        let raster = |threads| {
            Renderer::new(&config(64, 100, ColorScheme::Grayscale, threads))
                .unwrap()
                .raster(&vp)
        };
        let single = raster(1);
        for threads in [2, 3, 7, 64, 100] {
            let multi = raster(threads);
            assert_eq!(single, multi);
        }
    }

    #[test]
    fn test_far_away_viewport_is_uniform() {
        let vp = Viewport::from_center(c(10.0, 10.0), 1.0);
        let renderer = Renderer::new(&config(16, 100, ColorScheme::Grayscale, 2)).unwrap();
        let img = renderer.raster(&vp);
        // every point escapes after one step: 255 - 255 * 1 / 100 == 253
        assert!(img.pixels().all(|px| *px == Rgba([253, 253, 253, 255])));
    }

    #[test]
    fn test_labels_only_touch_corners() {
        let vp = Viewport::default();
        let mut cfg = config(120, 50, ColorScheme::Full, 2);
        let plain = Renderer::new(&cfg).unwrap().render(&vp);
        cfg.label = LabelStyle::Corners;
        let labelled = Renderer::new(&cfg).unwrap().render(&vp);
        for (x, y, px) in labelled.enumerate_pixels() {
            if px != plain.get_pixel(x, y) {
                assert!(y < 10 || y >= 120 - 18, "pixel ({}, {}) changed", x, y);
            }
        }
        assert_ne!(plain, labelled);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        for cfg in [
            config(4, 0, ColorScheme::Grayscale, 1),
            config(4, 0, ColorScheme::Full, 1),
            config(0, 10, ColorScheme::Grayscale, 1),
            config(4, 10, ColorScheme::Grayscale, 0),
        ] {
            assert!(Renderer::new(&cfg).is_err(), "{:?}", cfg);
        }
        assert!(matches!(
            Renderer::new(&config(4, 0, ColorScheme::Grayscale, 1)),
            Err(ConfigError::ZeroMaxIter)
        ));
    }

    #[test]
    fn test_cancelled_render() {
        let vp = Viewport::default();
        let mut cfg = config(32, 50, ColorScheme::Full, 3);
        cfg.label = LabelStyle::Corners;
        let renderer = Renderer::new(&cfg).unwrap();

        let cancel = AtomicBool::new(false);
        assert_eq!(renderer.render_cancellable(&vp, &cancel), Some(renderer.render(&vp)));

        cancel.store(true, Ordering::Relaxed);
        assert_eq!(renderer.render_cancellable(&vp, &cancel), None);
    }

    #[test]
    fn test_encode_png() {
        let vp = Viewport::default();
        let renderer = Renderer::new(&config(20, 20, ColorScheme::Grayscale, 1)).unwrap();
        let img = renderer.render(&vp);
        let bytes = encode_png(&img).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded, img);
    }

    #[test]
    fn test_save_png_reports_path() {
        let img = RgbaImage::new(2, 2);
        let path = Path::new("/nonexistent-dir/mandelbrot.png");
        match save_png(&img, path) {
            Err(RenderError::Write { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
