use std::path::PathBuf;
use std::process;
use std::time::Duration;

use log::error;
use structopt::StructOpt;

use mandelweb::config::{ConfigError, RenderConfig, ServerConfig};
use mandelweb::imagegen::generate;
use mandelweb::label::LabelStyle;
use mandelweb::painter::ColorScheme;

const SERVE: &str = "serve";

/// Renders the Mandelbrot set to a PNG file, or serves renders over HTTP.
#[derive(StructOpt, Debug)]
#[structopt(name = "mandelweb")]
struct Opt {
    /// Query string such as `center=-0.5%2B0i&width=1.5`, or `serve` to
    /// start the HTTP server
    query: Option<String>,

    /// Width and height of the image in pixels
    #[structopt(long, default_value = "1000")]
    size: u32,

    /// Iterations before a point is assumed to be in the set
    #[structopt(long, default_value = "1000")]
    max_iter: u32,

    /// Color scheme: grayscale or full
    #[structopt(long, default_value = "grayscale")]
    color: ColorScheme,

    /// Coordinate labels: none, corners or width
    #[structopt(long, default_value = "corners")]
    label: LabelStyle,

    /// Render threads [default: number of physical cores]
    #[structopt(long)]
    threads: Option<usize>,

    /// Output file for one-shot renders
    #[structopt(long, default_value = "mandelbrot.png", parse(from_os_str))]
    output: PathBuf,

    /// Port to listen on in server mode
    #[structopt(long, default_value = "9000")]
    port: u16,

    /// Per-request render timeout in seconds
    #[structopt(long, default_value = "60")]
    timeout_secs: u64,
}

impl Opt {
    fn render_config(&self) -> RenderConfig {
        let defaults = RenderConfig::default();
        RenderConfig {
            image_size: self.size,
            max_iter: self.max_iter,
            color: self.color,
            label: self.label,
            threads: self.threads.unwrap_or(defaults.threads),
        }
    }

    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            port: self.port,
            render: self.render_config(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

fn exit_on_config_error(result: Result<(), ConfigError>) {
    if let Err(err) = result {
        error!("Invalid configuration: {}", err);
        process::exit(1);
    }
}

#[cfg(feature = "server")]
fn run_server(config: ServerConfig) {
    if let Err(err) = mandelweb::server::serve(config) {
        error!("{}", err);
        process::exit(1);
    }
}

#[cfg(not(feature = "server"))]
fn run_server(_config: ServerConfig) {
    error!("This build does not include the HTTP server (enable the `server` feature)");
    process::exit(1);
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opt = Opt::from_args();

    let query = opt.query.clone().unwrap_or_default();
    if query == SERVE {
        let config = opt.server_config();
        exit_on_config_error(config.validate());
        run_server(config);
    } else {
        let config = opt.render_config();
        exit_on_config_error(config.validate());
        // a failed write is reported but does not change the exit status
        if let Err(err) = generate(&query, &config, &opt.output) {
            error!("{}", err);
        }
    }
}
