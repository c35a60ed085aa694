extern crate clap;
extern crate env_logger;
extern crate failure;
extern crate fractile;
extern crate image;
#[macro_use]
extern crate log;
extern crate num;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use failure::Error;
use fractile::color;
use fractile::params::{self, Algorithm, RenderConfig, RenderParams, Scheduling};
use fractile::{Canvas, Control, Frontend, Orchestrator, Outcome};
use num::Complex;
use std::path::PathBuf;
use std::str::FromStr;

fn validate_number<T: FromStr>(s: &str, err: &str) -> Result<(), String> {
    match T::from_str(s) {
        Ok(_) => Ok(()),
        Err(_) => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + Ord>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const WIDTH: &str = "width";
const HEIGHT: &str = "height";
const THREADS: &str = "threads";
const STARTSIZE: &str = "startsize";
const BATCH: &str = "batch";
const XCOORD: &str = "x";
const YCOORD: &str = "y";
const ZOOM: &str = "zoom";
const ITERATIONS: &str = "iterations";
const SEGMENT: &str = "seg";
const INFINITY: &str = "inf";
const POWER: &str = "pow";
const TRICORN: &str = "tricorn";
const JULIA: &str = "julia";
const JULIA_R: &str = "jr";
const JULIA_I: &str = "ji";
const MONO: &str = "mono";
const PHASE: &str = "phase";
const OUTPUT: &str = "output";
const EXIT: &str = "exit";

fn args<'a>(default_threads: &'a str) -> ArgMatches<'a> {
    App::new("fractile")
        .version("0.1.0")
        .about("Progressive tiled escape-time fractal renderer")
        .arg(
            Arg::with_name(WIDTH)
                .long(WIDTH)
                .takes_value(true)
                .default_value("1280")
                .validator(|s| {
                    validate_range(&s, 1usize, 65536, "Could not parse width", "Width must be between 1 and 65536")
                })
                .help("Canvas width in pixels"),
        )
        .arg(
            Arg::with_name(HEIGHT)
                .long(HEIGHT)
                .takes_value(true)
                .default_value("1080")
                .validator(|s| {
                    validate_range(&s, 1usize, 65536, "Could not parse height", "Height must be between 1 and 65536")
                })
                .help("Canvas height in pixels"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .default_value(default_threads)
                .validator(|s| {
                    validate_range(&s, 1usize, 1024, "Could not parse thread count", "Thread count must be between 1 and 1024")
                })
                .help("Number of render workers"),
        )
        .arg(
            Arg::with_name(STARTSIZE)
                .long(STARTSIZE)
                .takes_value(true)
                .default_value("64")
                .validator(|s| match usize::from_str(&s) {
                    Ok(n) if n.is_power_of_two() => Ok(()),
                    Ok(_) => Err("Starting block size must be a power of two".to_string()),
                    Err(_) => Err("Could not parse starting block size".to_string()),
                })
                .help("Starting block edge in pixels (power of two)"),
        )
        .arg(
            Arg::with_name(BATCH)
                .long(BATCH)
                .short("b")
                .takes_value(true)
                .default_value("20480")
                .validator(|s| validate_number::<usize>(&s, "Could not parse batch size"))
                .help("Evaluations per worker between screen updates"),
        )
        .arg(
            Arg::with_name(XCOORD)
                .long(XCOORD)
                .short("x")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-0.5")
                .validator(|s| validate_number::<f64>(&s, "Could not parse x coordinate"))
                .help("X coordinate of the view centre"),
        )
        .arg(
            Arg::with_name(YCOORD)
                .long(YCOORD)
                .short("y")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("0")
                .validator(|s| validate_number::<f64>(&s, "Could not parse y coordinate"))
                .help("Y coordinate of the view centre"),
        )
        .arg(
            Arg::with_name(ZOOM)
                .long(ZOOM)
                .short("z")
                .takes_value(true)
                .default_value("500")
                .validator(|s| validate_number::<f64>(&s, "Could not parse zoom"))
                .help("Zoom factor"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("200")
                .validator(|s| {
                    validate_range(&s, 1u32, 1_000_000, "Could not parse iteration count", "Iteration count must be between 1 and 1000000")
                })
                .help("Iteration cap"),
        )
        .arg(
            Arg::with_name(SEGMENT)
                .long(SEGMENT)
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("0")
                .validator(|s| validate_number::<i64>(&s, "Could not parse segment"))
                .help("View segment: 0 for the centred view, 1-6 for a hex segment"),
        )
        .arg(
            Arg::with_name(INFINITY)
                .long(INFINITY)
                .takes_value(true)
                .default_value("1e+100")
                .validator(|s| validate_number::<f64>(&s, "Could not parse infinity bound"))
                .help("Divergence bound"),
        )
        .arg(
            Arg::with_name(POWER)
                .long(POWER)
                .takes_value(true)
                .default_value("2")
                .validator(|s| validate_number::<u32>(&s, "Could not parse power"))
                .help("Exponent of the iteration (2 for the standard sets)"),
        )
        .arg(
            Arg::with_name(TRICORN)
                .long(TRICORN)
                .help("Render the tricorn"),
        )
        .arg(
            Arg::with_name(JULIA)
                .long(JULIA)
                .help("Render a Julia set"),
        )
        .arg(
            Arg::with_name(JULIA_R)
                .long(JULIA_R)
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("0")
                .validator(|s| validate_number::<f64>(&s, "Could not parse Julia seed real part"))
                .help("Real part of the Julia seed"),
        )
        .arg(
            Arg::with_name(JULIA_I)
                .long(JULIA_I)
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("0")
                .validator(|s| validate_number::<f64>(&s, "Could not parse Julia seed imaginary part"))
                .help("Imaginary part of the Julia seed"),
        )
        .arg(Arg::with_name(MONO).long(MONO).help("Monochrome palette"))
        .arg(
            Arg::with_name(PHASE)
                .long(PHASE)
                .help("Cycle the palette after the render completes"),
        )
        .arg(
            Arg::with_name(OUTPUT)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .default_value("lastrender.png")
                .help("Filename for the finished PNG; empty to disable saving"),
        )
        .arg(
            Arg::with_name(EXIT)
                .long(EXIT)
                .help("Exit immediately once the render is saved"),
        )
        .get_matches()
}

/// Assembles a clamped, validated configuration from the raw flags.
/// The validators have already rejected unparseable input, so the
/// `expect`s here cannot fire.
fn configure(matches: &ArgMatches) -> RenderConfig {
    let width = usize::from_str(matches.value_of(WIDTH).unwrap()).expect("width");
    let height = usize::from_str(matches.value_of(HEIGHT).unwrap()).expect("height");
    let threads = usize::from_str(matches.value_of(THREADS).unwrap()).expect("threads");
    let start_size = usize::from_str(matches.value_of(STARTSIZE).unwrap()).expect("startsize");
    let batch = usize::from_str(matches.value_of(BATCH).unwrap()).expect("batch");

    let frac_x = f64::from_str(matches.value_of(XCOORD).unwrap()).expect("x");
    let frac_y = f64::from_str(matches.value_of(YCOORD).unwrap()).expect("y");
    let zoom = f64::from_str(matches.value_of(ZOOM).unwrap()).expect("zoom");
    let iterations = u32::from_str(matches.value_of(ITERATIONS).unwrap()).expect("iterations");
    let segment = i64::from_str(matches.value_of(SEGMENT).unwrap()).expect("seg");
    let infinity = f64::from_str(matches.value_of(INFINITY).unwrap()).expect("inf");
    let power = u32::from_str(matches.value_of(POWER).unwrap()).expect("pow");

    let algorithm = if matches.is_present(TRICORN) {
        Algorithm::Tricorn
    } else if matches.is_present(JULIA) {
        let jr = f64::from_str(matches.value_of(JULIA_R).unwrap()).expect("jr");
        let ji = f64::from_str(matches.value_of(JULIA_I).unwrap()).expect("ji");
        Algorithm::Julia(Complex::new(jr, ji))
    } else {
        Algorithm::Mandelbrot
    };

    let (x_centre, y_centre) =
        params::segment_centre(params::clamp_segment(segment), width, height);

    let output = match matches.value_of(OUTPUT) {
        Some("") | None => None,
        Some(path) => Some(PathBuf::from(path)),
    };

    RenderConfig {
        width,
        height,
        sched: Scheduling {
            threads,
            start_size,
            batch: params::clamp_batch(batch, width, height),
        },
        params: RenderParams {
            frac_x,
            frac_y,
            scale: params::scale_for_zoom(zoom),
            iterations,
            infinity,
            power: params::clamp_power(power),
            algorithm,
            x_centre,
            y_centre,
        },
        mono: matches.is_present(MONO),
        phaser: matches.is_present(PHASE),
        output,
        exit_when_done: matches.is_present(EXIT),
    }
}

/// A headless frontend: presentations become log lines and the
/// finished canvas is saved as a PNG.
struct ConsoleFrontend {
    mono: bool,
    output: Option<PathBuf>,
}

impl Frontend for ConsoleFrontend {
    fn present(&mut self, canvas: &Canvas, phased: bool, phase: f64) {
        debug!(
            "present {}x{} (phased: {}, phase: {:.3})",
            canvas.width(),
            canvas.height(),
            phased,
            phase
        );
    }

    fn persist(&mut self, canvas: &Canvas) -> Result<(), Error> {
        let path = match self.output {
            Some(ref path) => path,
            None => return Ok(()),
        };
        let rgb = color::canvas_rgb(canvas, self.mono, false, 0.0);
        image::save_buffer(
            path,
            &rgb,
            canvas.width() as u32,
            canvas.height() as u32,
            image::ColorType::RGB(8),
        )?;
        info!("PNG saved to {}", path.display());
        Ok(())
    }

    fn poll(&mut self) -> Control {
        Control::Continue
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let default_threads = num_cpus::get().to_string();
    let matches = args(&default_threads);
    let config = configure(&matches);

    info!(
        "rendering {}x{} with {} workers (batch {}, starting block {})",
        config.width,
        config.height,
        config.sched.threads,
        config.sched.batch,
        config.sched.start_size
    );

    let mut frontend = ConsoleFrontend {
        mono: config.mono,
        output: config.output.clone(),
    };
    let mut orchestrator = Orchestrator::new(&config);

    match orchestrator.run(&mut frontend) {
        Ok(Outcome::Completed) => info!("done"),
        Ok(Outcome::Stopped) => info!("stopped before completion"),
        Err(e) => {
            eprintln!("Render failure: {}", e);
            std::process::exit(1);
        }
    }
}
