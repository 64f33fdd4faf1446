//! SVG chart rendering.
//!
//! Draws the four metric sub-charts on a 2x2 grid, one line series per
//! gender, and writes the result to a single SVG file. All drawing is
//! delegated to plotters; this module only supplies series data, labels,
//! and titles.

use crate::analysis::{analyze_data, VitalsCollector};
use crate::models::{Gender, Metric};
use anyhow::{Context, Result};
use plotters::prelude::*;
use plotters_svg::SVGBackend;
use std::path::Path;
use tracing::info;

/// Render the comparative charts for every metric into `output`.
pub fn render_charts(
    collector: &VitalsCollector,
    sample_size: usize,
    output: &Path,
    width: u32,
    height: u32,
) -> Result<()> {
    let path = output
        .to_str()
        .context("output path is not valid UTF-8")?;

    let root = SVGBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let areas = root.split_evenly((2, 2));

    for (area, metric) in areas.iter().zip(Metric::ALL) {
        let male = analyze_data(collector.samples(metric), Gender::Male)?;
        let female = analyze_data(collector.samples(metric), Gender::Female)?;

        let x_max = male
            .ages
            .iter()
            .chain(female.ages.iter())
            .max()
            .copied()
            .unwrap_or(0)
            + 1;
        let y_max = male
            .averages
            .iter()
            .chain(female.averages.iter())
            .copied()
            .fold(f64::NAN, f64::max)
            .max(1.0);

        let caption = format!(
            "Average {} per Age (Sample Size: {})",
            metric.title(),
            sample_size
        );

        let mut chart = ChartBuilder::on(area)
            .caption(caption, ("sans-serif", 20).into_font())
            .margin(10)
            .x_label_area_size(45)
            .y_label_area_size(60)
            .build_cartesian_2d(0i32..x_max, 0f64..y_max)?;

        chart
            .configure_mesh()
            .x_desc("age (yrs)")
            .y_desc(metric.y_label())
            .draw()?;

        for (series, label, color_index) in [(&male, "Male", 0), (&female, "Female", 1)] {
            let color = Palette99::pick(color_index).mix(1.0);
            chart
                .draw_series(LineSeries::new(series.points(), color))?
                .label(label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    info!("Wrote charts to {}", output.display());

    Ok(())
}
