//! SVG Chart Generator for Training Runs
//!
//! Renders the per-epoch history as two line charts: loss vs epoch and
//! accuracy vs epoch, each with training and validation series and a
//! legend. Output is plain SVG so the charts drop straight into reports.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::training::history::TrainingHistory;

/// Chart styling constants
const CHART_WIDTH: f64 = 800.0;
const CHART_HEIGHT: f64 = 500.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_RIGHT: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 80.0;
const MARGIN_LEFT: f64 = 80.0;

const COLOR_TRAIN: &str = "#d4b106";
const COLOR_VALIDATION: &str = "#e74c3c";
const COLOR_GRID: &str = "#ecf0f1";
const COLOR_AXIS: &str = "#2c3e50";
const COLOR_TEXT: &str = "#2c3e50";

/// A data point for a line chart
#[derive(Debug, Clone)]
pub struct DataPoint {
    pub x: f64,
    pub y: f64,
}

/// A named data series
#[derive(Debug, Clone)]
pub struct DataSeries {
    pub name: String,
    pub points: Vec<DataPoint>,
    pub color: String,
}

impl DataSeries {
    fn from_values(name: &str, values: impl Iterator<Item = (usize, f64)>, color: &str) -> Self {
        Self {
            name: name.to_string(),
            points: values
                .map(|(epoch, y)| DataPoint {
                    x: epoch as f64,
                    y,
                })
                .collect(),
            color: color.to_string(),
        }
    }
}

/// Render the loss and accuracy charts for a training run.
///
/// Returns the paths of the two written SVG files.
pub fn render_history_charts(
    history: &TrainingHistory,
    output_dir: &Path,
) -> io::Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(output_dir)?;

    let loss_series = vec![
        DataSeries::from_values(
            "Training loss",
            history.records().iter().map(|r| (r.epoch, r.train_loss)),
            COLOR_TRAIN,
        ),
        DataSeries::from_values(
            "Validation loss",
            history.records().iter().map(|r| (r.epoch, r.val_loss)),
            COLOR_VALIDATION,
        ),
    ];

    let acc_series = vec![
        DataSeries::from_values(
            "Training acc",
            history.records().iter().map(|r| (r.epoch, r.train_accuracy)),
            COLOR_TRAIN,
        ),
        DataSeries::from_values(
            "Validation acc",
            history.records().iter().map(|r| (r.epoch, r.val_accuracy)),
            COLOR_VALIDATION,
        ),
    ];

    let loss_path = output_dir.join("training_loss.svg");
    generate_line_chart(
        "Training and validation loss",
        "Epochs",
        "Loss",
        &loss_series,
        &loss_path,
    )?;

    let acc_path = output_dir.join("training_accuracy.svg");
    generate_line_chart(
        "Training and validation accuracy",
        "Epochs",
        "Accuracy",
        &acc_series,
        &acc_path,
    )?;

    Ok((loss_path, acc_path))
}

/// Generate a line chart SVG
pub fn generate_line_chart(
    title: &str,
    x_label: &str,
    y_label: &str,
    series: &[DataSeries],
    output_path: &Path,
) -> io::Result<()> {
    let plot_width = CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;

    let (x_min, x_max, _, y_max) = find_ranges(series);
    let y_min = 0.0;
    let y_max = if y_max > 0.0 { y_max * 1.05 } else { 1.0 };
    let x_span = (x_max - x_min).max(1.0);

    let mut svg = String::new();

    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}" width="{}" height="{}">"#,
        CHART_WIDTH, CHART_HEIGHT, CHART_WIDTH, CHART_HEIGHT
    ));

    svg.push_str(&format!(
        r#"<rect width="{}" height="{}" fill="white"/>"#,
        CHART_WIDTH, CHART_HEIGHT
    ));

    svg.push_str(&format!(
        r#"<text x="{}" y="35" text-anchor="middle" font-family="Arial, sans-serif" font-size="18" font-weight="bold" fill="{}">{}</text>"#,
        CHART_WIDTH / 2.0,
        COLOR_TEXT,
        escape_xml(title)
    ));

    // Horizontal grid lines with y-axis labels
    for i in 0..=5 {
        let y = MARGIN_TOP + plot_height - (i as f64 / 5.0) * plot_height;
        let value = y_min + (i as f64 / 5.0) * (y_max - y_min);

        svg.push_str(&format!(
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="1"/>"#,
            MARGIN_LEFT,
            y,
            MARGIN_LEFT + plot_width,
            y,
            COLOR_GRID
        ));

        svg.push_str(&format!(
            r#"<text x="{}" y="{}" text-anchor="end" font-family="Arial, sans-serif" font-size="12" fill="{}">{:.2}</text>"#,
            MARGIN_LEFT - 10.0,
            y + 4.0,
            COLOR_TEXT,
            value
        ));
    }

    // Axes
    svg.push_str(&format!(
        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="2"/>"#,
        MARGIN_LEFT,
        MARGIN_TOP + plot_height,
        MARGIN_LEFT + plot_width,
        MARGIN_TOP + plot_height,
        COLOR_AXIS
    ));
    svg.push_str(&format!(
        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="2"/>"#,
        MARGIN_LEFT,
        MARGIN_TOP,
        MARGIN_LEFT,
        MARGIN_TOP + plot_height,
        COLOR_AXIS
    ));

    // Axis labels
    svg.push_str(&format!(
        r#"<text x="{}" y="{}" text-anchor="middle" font-family="Arial, sans-serif" font-size="14" fill="{}">{}</text>"#,
        MARGIN_LEFT + plot_width / 2.0,
        CHART_HEIGHT - 20.0,
        COLOR_TEXT,
        escape_xml(x_label)
    ));
    svg.push_str(&format!(
        r#"<text x="20" y="{}" text-anchor="middle" font-family="Arial, sans-serif" font-size="14" fill="{}" transform="rotate(-90 20 {})">{}</text>"#,
        CHART_HEIGHT / 2.0,
        COLOR_TEXT,
        CHART_HEIGHT / 2.0,
        escape_xml(y_label)
    ));

    // Plot each series
    for series_data in series {
        if series_data.points.is_empty() {
            continue;
        }

        let mut path = String::new();
        for (i, point) in series_data.points.iter().enumerate() {
            let x = MARGIN_LEFT + ((point.x - x_min) / x_span) * plot_width;
            let y = MARGIN_TOP + plot_height - ((point.y - y_min) / (y_max - y_min)) * plot_height;

            if i == 0 {
                path.push_str(&format!("M {} {}", x, y));
            } else {
                path.push_str(&format!(" L {} {}", x, y));
            }
        }

        svg.push_str(&format!(
            r#"<path d="{}" fill="none" stroke="{}" stroke-width="2"/>"#,
            path, series_data.color
        ));

        for point in &series_data.points {
            let x = MARGIN_LEFT + ((point.x - x_min) / x_span) * plot_width;
            let y = MARGIN_TOP + plot_height - ((point.y - y_min) / (y_max - y_min)) * plot_height;

            svg.push_str(&format!(
                r#"<circle cx="{}" cy="{}" r="3" fill="{}" stroke="white" stroke-width="1"/>"#,
                x, y, series_data.color
            ));
        }
    }

    // Legend
    let mut legend_y = MARGIN_TOP + 10.0;
    for series_data in series {
        svg.push_str(&format!(
            r#"<rect x="{}" y="{}" width="15" height="15" fill="{}"/>"#,
            CHART_WIDTH - MARGIN_RIGHT - 140.0,
            legend_y,
            series_data.color
        ));
        svg.push_str(&format!(
            r#"<text x="{}" y="{}" font-family="Arial, sans-serif" font-size="12" fill="{}">{}</text>"#,
            CHART_WIDTH - MARGIN_RIGHT - 120.0,
            legend_y + 12.0,
            COLOR_TEXT,
            escape_xml(&series_data.name)
        ));
        legend_y += 25.0;
    }

    svg.push_str("</svg>");

    fs::write(output_path, svg)
}

fn find_ranges(series: &[DataSeries]) -> (f64, f64, f64, f64) {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;

    for s in series {
        for p in &s.points {
            x_min = x_min.min(p.x);
            x_max = x_max.max(p.x);
            y_min = y_min.min(p.y);
            y_max = y_max.max(p.y);
        }
    }

    (x_min, x_max, y_min, y_max)
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
