use std::collections::BTreeSet;

use mandelweb::bench::{Benchmark, BenchmarkReport};
use mandelweb::coord::Viewport;
use mandelweb::label::LabelStyle;
use mandelweb::painter::ColorScheme;
use mandelweb::render::encode_png;
use mandelweb::{RenderConfig, Renderer};

const REPEATS: usize = 3;

fn thread_counts() -> Vec<usize> {
    let counts: BTreeSet<usize> = [1, 2, 4, num_cpus::get_physical(), num_cpus::get()]
        .into_iter()
        .collect();
    counts.into_iter().collect()
}

fn bench_render(threads: usize, size: u32, color: ColorScheme, encode: bool) -> Benchmark {
    let renderer = Renderer::new(&RenderConfig {
        image_size: size,
        max_iter: 1000,
        color,
        label: LabelStyle::Corners,
        threads,
    })
    .expect("invalid render configuration");
    let viewport = Viewport::default();
    let name = format!("render t={} r={}x{} c={} png={}", threads, size, size, color, encode);
    let f = move || {
        let img = renderer.render(&viewport);
        if encode {
            encode_png(&img).expect("PNG encoding failed");
        }
    };
    Benchmark::new(&name, f).repeat(REPEATS).with_items(size as u64 * size as u64)
}

fn main() -> std::io::Result<()> {
    let mut report = BenchmarkReport::new();
    for threads in thread_counts() {
        report.add_bench(bench_render(threads, 500, ColorScheme::Grayscale, false));
        report.add_bench(bench_render(threads, 1000, ColorScheme::Grayscale, false));
    }
    report.add_bench(bench_render(num_cpus::get_physical(), 1000, ColorScheme::Full, false));
    report.add_bench(bench_render(num_cpus::get_physical(), 1000, ColorScheme::Full, true));
    report.report("render")
}
