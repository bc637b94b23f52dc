use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{ArgAction, Parser, ValueEnum};
use histothresh::{
    colorize, label_image, Histogram, KMeansParams, ThresholdMethod,
    DEFAULT_BACKGROUND_DISTANCE,
};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, LevelFilter};

mod file_writing;
mod histogram_drawer;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum MethodArg {
    Isodata,
    Otsu,
    MinimumError,
    Triangle,
    Background,
    Kmeans,
    MinimumVariance,
}

/// Pick intensity thresholds for grayscale images and save the segmentation.
#[derive(Parser, Debug)]
#[command(name = "histothresh", version, about)]
struct Cli {
    /// Image files, or directories containing jpg/jpeg/png images.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = MethodArg::Otsu)]
    method: MethodArg,

    /// Number of classes for isodata, kmeans and minimum-variance.
    #[arg(short = 'k', long, default_value_t = 2)]
    classes: usize,

    /// Distance scale for the background method.
    #[arg(long, default_value_t = DEFAULT_BACKGROUND_DISTANCE)]
    distance: f64,

    /// Seed for the kmeans initialization.
    #[arg(long, default_value_t = KMeansParams::default().seed)]
    seed: u64,

    /// JSON file holding a method description; overrides the method flags.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ignore pixels with value 0 when building the histogram.
    #[arg(long)]
    exclude_zero: bool,

    #[arg(long, default_value = "results")]
    out_dir: PathBuf,

    /// CSV log of the selected thresholds [default: <out-dir>/thresholds.csv]
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Skip the histogram plots.
    #[arg(long)]
    no_plots: bool,

    /// Also save a grayscale image whose pixel values are class indices.
    #[arg(long)]
    save_labels: bool,

    /// More output per occurrence (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn threshold_method(&self) -> Result<ThresholdMethod, Box<dyn Error>> {
        if let Some(path) = &self.config {
            let text = fs::read_to_string(path)?;
            return Ok(serde_json::from_str(&text)?);
        }
        let method = match self.method {
            MethodArg::Isodata => ThresholdMethod::Isodata {
                thresholds: self.classes.saturating_sub(1),
            },
            MethodArg::Otsu => ThresholdMethod::Otsu,
            MethodArg::MinimumError => ThresholdMethod::MinimumError,
            MethodArg::Triangle => ThresholdMethod::Triangle,
            MethodArg::Background => ThresholdMethod::Background {
                distance: self.distance,
            },
            MethodArg::Kmeans => ThresholdMethod::KMeans {
                classes: self.classes,
                params: KMeansParams {
                    seed: self.seed,
                    ..KMeansParams::default()
                },
            },
            MethodArg::MinimumVariance => ThresholdMethod::MinimumVariance {
                classes: self.classes,
            },
        };
        Ok(method)
    }

    fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    let method = cli.threshold_method()?;
    let images = collect_images(&cli.inputs)?;
    if images.is_empty() {
        return Err("no images found in the given inputs".into());
    }
    fs::create_dir_all(&cli.out_dir)?;
    let csv_path = cli
        .csv
        .clone()
        .unwrap_or_else(|| cli.out_dir.join("thresholds.csv"));
    info!("{} images, method {:?}", images.len(), method);

    let pb = ProgressBar::new(images.len() as u64);
    pb.set_style(ProgressStyle::with_template(
        "[{elapsed_precise}] {bar:40.white/gray} {pos:>7}/{len:7} {msg} [{duration_precise}]",
    )?);

    let mut failures = 0;
    for img_path in &images {
        pb.set_message(img_path.display().to_string());
        match process_image(img_path, &method, &cli, &csv_path) {
            Ok(thresholds) => info!("{}: {:?}", img_path.display(), thresholds),
            Err(e) => {
                failures += 1;
                pb.suspend(|| error!("{}: {}", img_path.display(), e));
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("Done");

    if failures > 0 {
        return Err(format!("{failures} of {} images failed", images.len()).into());
    }
    println!("Results saved in {}", cli.out_dir.display());
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Application error: {}", e);
        std::process::exit(1);
    }
}

/// Expand directories into the images they contain, keeping files as given.
fn collect_images(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut images = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found = Vec::new();
            for entry in fs::read_dir(input)? {
                let path = entry?.path();
                if path.is_file() && is_image(&path) {
                    found.push(path);
                }
            }
            found.sort();
            images.extend(found);
        } else {
            images.push(input.clone());
        }
    }
    Ok(images)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            matches!(ext.to_ascii_lowercase().as_str(), "jpg" | "jpeg" | "png")
        })
}

fn process_image(
    img_path: &Path,
    method: &ThresholdMethod,
    cli: &Cli,
    csv_path: &Path,
) -> Result<Vec<f64>, Box<dyn Error>> {
    let gray_img = image::open(img_path)?.to_luma8();
    let hist = Histogram::from_gray_image(&gray_img, cli.exclude_zero);

    let start_time = Instant::now();
    let thresholds = method.select(&hist)?;
    let duration = start_time.elapsed();

    let file_stem = img_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    file_writing::writeln(csv_path, &file_stem, method.name(), &thresholds, duration)?;

    let base_path = cli.out_dir.join(method.name());
    fs::create_dir_all(&base_path)?;
    if !cli.no_plots {
        let caption = format!("Histogram of {} thresholded with {}", file_stem, method.name());
        let histogram_path = base_path.join(format!("{file_stem}_histogram.png"));
        histogram_drawer::draw_histogram_with_thresholds(
            &caption,
            &hist,
            &thresholds,
            &histogram_path,
        )?;
    }
    let segmented_path = base_path.join(format!("{file_stem}_segmented.png"));
    colorize(&gray_img, &thresholds).save(segmented_path)?;
    if cli.save_labels {
        let labels_path = base_path.join(format!("{file_stem}_labels.png"));
        label_image(&gray_img, &thresholds).save(labels_path)?;
    }

    Ok(thresholds)
}
