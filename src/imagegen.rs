use std::path::Path;
use std::time::Instant;

use log::info;

use crate::config::RenderConfig;
use crate::query::parse_cli;
use crate::render::{save_png, RenderError, Renderer};

/// Renders the viewport described by `query` (defaults on any parse error)
/// and writes it to `output` as PNG.
pub fn generate(query: &str, config: &RenderConfig, output: &Path) -> Result<(), RenderError> {
    let renderer = Renderer::new(config)?;
    let viewport = parse_cli(query);

    let start = Instant::now();
    let img = renderer.render(&viewport);
    info!("Calculated in {:?}", start.elapsed());

    save_png(&img, output)?;
    info!("Wrote {}", output.display());
    Ok(())
}
