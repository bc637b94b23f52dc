use std::error::Error;
use std::path::Path;

use histothresh::Histogram;
use plotters::prelude::*;

/// Plot `hist` as a bar chart with a red vertical line per threshold and
/// save it as an image at `output_path`.
pub fn draw_histogram_with_thresholds(
    caption: &str,
    hist: &Histogram,
    thresholds: &[f64],
    output_path: &Path,
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(output_path, (640, 480)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_count = hist.counts().iter().copied().max().unwrap_or(0).max(1);
    let lower = hist.lower_bound();
    let width = hist.bin_width();

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 20).into_font())
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(lower..hist.upper_bound(), 0u64..(max_count + max_count / 10))?;

    chart.configure_mesh().draw()?;

    chart.draw_series(hist.counts().iter().enumerate().map(|(i, &y)| {
        let x0 = lower + i as f64 * width;
        let x1 = x0 + width;
        Rectangle::new([(x0, 0), (x1, y)], BLUE.mix(0.5).filled())
    }))?;

    for &threshold in thresholds {
        chart.draw_series(LineSeries::new(
            vec![(threshold, 0), (threshold, max_count)],
            &RED,
        ))?;
    }

    root.present()?;
    Ok(())
}
