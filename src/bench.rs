use std::fs;
use std::io::{self, stdout, Write};
use std::rc::Rc;
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct Benchmark {
    f: Rc<dyn Fn()>,
    name: String,
    iterations: usize,
    items: Option<u64>,
}

const UNITS: [(&str, u128); 4] = [
    ("ns", 1),
    ("us", 1_000),
    ("ms", 1_000_000),
    ("s", 1_000_000_000),
];

/// Right-aligned duration in the finest unit that keeps the value under 100000.
pub fn format_duration(d: Duration, width: usize) -> String {
    let nanos = d.as_nanos();
    let (symbol, scale) = UNITS
        .iter()
        .copied()
        .find(|(_, scale)| nanos / scale < 100_000)
        .unwrap_or(UNITS[UNITS.len() - 1]);
    format!("{:>width$}{:<2}", nanos / scale, symbol)
}

impl Benchmark {
    pub fn new<F: Fn() + 'static>(name: &str, f: F) -> Self {
        Self {
            f: Rc::new(f),
            name: name.to_string(),
            iterations: 1,
            items: None,
        }
    }

    pub fn repeat(mut self, iterations: usize) -> Self {
        self.iterations = iterations.max(1);
        self
    }

    pub fn with_items(mut self, items: u64) -> Self {
        self.items = Some(items);
        self
    }

    fn run(&self) -> Measurement {
        let start = Instant::now();
        for _ in 0..self.iterations {
            (self.f)();
        }
        Measurement {
            name: self.name.clone(),
            iterations: self.iterations,
            items: self.items,
            total: start.elapsed(),
        }
    }
}

pub struct Measurement {
    pub name: String,
    pub iterations: usize,
    pub items: Option<u64>,
    pub total: Duration,
}

impl Measurement {
    pub fn per_call(&self) -> Duration {
        self.total.div_f64(self.iterations as f64)
    }

    pub fn mega_items_per_sec(&self) -> Option<f64> {
        let secs = self.per_call().as_secs_f64();
        match self.items {
            Some(items) if secs > 0.0 => Some(items as f64 / secs / 1e6),
            _ => None,
        }
    }
}

#[derive(Default)]
pub struct BenchmarkReport {
    benches: Vec<Benchmark>,
    results: Vec<Measurement>,
}

impl BenchmarkReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_bench(&mut self, bench: Benchmark) {
        self.benches.push(bench);
    }

    pub fn with_benches(benches: &[Benchmark]) -> Self {
        let mut this = Self::new();
        for bench in benches {
            this.add_bench(bench.clone());
        }
        this
    }

    pub fn results(&self) -> &[Measurement] {
        &self.results
    }

    pub fn run(&mut self) -> io::Result<()> {
        let mut out = stdout();
        for bench in &self.benches {
            self.results.push(bench.run());
            write!(out, ".")?;
            out.flush()?;
        }
        writeln!(out)
    }

    pub fn show(&self) -> io::Result<()> {
        let mut out = stdout();
        writeln!(
            out,
            "  {: <32} {: >8}   {: >8}   {: >8}",
            "benchmark", "total", "per_call", "Mpx/s"
        )?;
        for m in &self.results {
            let per_call = m.per_call();
            let throughput = m
                .mega_items_per_sec()
                .map(|v| format!("{:.2}", v))
                .unwrap_or_else(|| "-".to_string());
            writeln!(
                out,
                "  {: <32} {}   {}   {: >8}",
                m.name,
                format_duration(m.total, 6),
                format_duration(per_call, 6),
                throughput,
            )?;
        }
        out.flush()
    }

    pub fn csv(&self) -> String {
        let mut lines = vec!["benchmark,total_us,iterations,per_call_us,mpx_per_sec".to_string()];
        for m in &self.results {
            lines.push(format!(
                "{},{},{},{},{}",
                m.name,
                m.total.as_micros(),
                m.iterations,
                m.per_call().as_micros(),
                m.mega_items_per_sec().map(|v| v.to_string()).unwrap_or_default(),
            ));
        }
        lines.push("".to_string());
        lines.join("\n")
    }

    pub fn report(&mut self, name: &str) -> io::Result<()> {
        print!("Benchmark: {}", name);
        self.run()?;
        self.show()?;
        fs::write(format!("benchmark_{}.csv", name), self.csv())
    }
}
