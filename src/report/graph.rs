//! Observed-versus-predicted graph.
//!
//! [`GraphData`] holds everything an external plotting tool needs: the
//! first parameter's levels on the x axis, one observed/predicted series per
//! level of the second parameter, and the first parameter's own series.
//! It serialises to JSON and renders to a fixed-size text plot.
//!
//! Plot elements:
//! - observed points: `*` for the first parameter, `1`..`9`, `a`.. per level
//! - predicted lines: `-`

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::{CompositeLayout, Dataset};
use crate::error::{FitError, Result};
use crate::fit::FitResult;
use crate::model::Model;
use crate::settings::GraphSettings;

const LEVEL_MARKERS: &[u8] = b"123456789abcdefghijklmnopqrstuvwxyz";

/// One observed/predicted pair of lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub label: String,
    pub observed: Vec<f64>,
    pub predicted: Vec<f64>,
}

/// Graph of a finished fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub caption: String,
    pub legend_title: String,
    /// Tick labels for x = 1..=n, e.g. `A1`..`A5`.
    pub ticks: Vec<String>,
    /// The first parameter's own values.
    pub first: Series,
    /// One series per level of the second parameter.
    pub levels: Vec<Series>,
}

impl GraphData {
    /// Build the graph of `result` against the data it was fit to.
    pub fn build(
        model: &dyn Model,
        dataset: &Dataset,
        result: &FitResult,
        settings: &GraphSettings,
    ) -> Result<Self> {
        let stimuli = dataset.select(result.signature)?;
        if stimuli.len() < 2 || result.parameters.len() < 2 {
            return Err(FitError::Validation(format!(
                "model '{}' has fewer than two parameters to graph",
                model.name()
            )));
        }
        let (first, second) = (stimuli[0], stimuli[1]);

        let layout = CompositeLayout::new(stimuli.iter().map(|s| s.values.len()).collect());
        let observed_rows = layout.rows(&dataset.composite.values);
        let predicted_rows = layout.rows(&result.prediction);
        if observed_rows.len() != predicted_rows.len() {
            return Err(FitError::ShapeMismatch(format!(
                "prediction has {} values, observed composite has {}",
                result.prediction.len(),
                dataset.composite.values.len()
            )));
        }

        let levels = observed_rows
            .iter()
            .zip(&predicted_rows)
            .enumerate()
            .map(|(i, (observed, predicted))| {
                let level = i % second.values.len();
                Series {
                    label: format!(
                        "{}{} = {}",
                        second.abbreviation,
                        level + 1,
                        crate::parameters::round_to(second.values[level], 3)
                    ),
                    observed: observed.to_vec(),
                    predicted: predicted.to_vec(),
                }
            })
            .collect();

        let legend_title = if settings.legend_label.trim().is_empty() {
            second.label.clone()
        } else {
            settings.legend_label.clone()
        };

        Ok(Self {
            title: model.display_name().to_string(),
            x_label: settings.x_label.clone(),
            y_label: settings.y_label.clone(),
            caption: settings.caption.clone(),
            legend_title,
            ticks: (1..=first.values.len())
                .map(|i| format!("{}{}", first.abbreviation, i))
                .collect(),
            first: Series {
                label: first.label.clone(),
                observed: first.values.clone(),
                predicted: result.parameters[0].as_slice().to_vec(),
            },
            levels,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the graph as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Render a text plot of `graph` on a `width` x `height` grid.
///
/// The y axis is fixed to the proportion range [0, 1].
pub fn render_ascii_graph(graph: &GraphData, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let n = graph.ticks.len().max(1);
    let (y_min, y_max) = pad_range(0.0, 1.0, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Lines first so points can overlay.
    for series in std::iter::once(&graph.first).chain(&graph.levels) {
        draw_series(&mut grid, &series.predicted, n, y_min, y_max);
    }

    let markers = std::iter::once('*').chain(LEVEL_MARKERS.iter().map(|&b| b as char).cycle());
    for (series, marker) in std::iter::once(&graph.first).chain(&graph.levels).zip(markers) {
        for (i, &y) in series.observed.iter().enumerate() {
            let x = map_x(i, n, width);
            let row = map_y(y, y_min, y_max, height);
            grid[row][x] = marker;
        }
    }

    let mut out = String::new();
    out.push_str(&format!("{}\n", graph.title));
    out.push_str(&format!(
        "x=[{}, {}] | y=[0, 1]\n",
        graph.ticks.first().map(String::as_str).unwrap_or(""),
        graph.ticks.last().map(String::as_str).unwrap_or("")
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }

    out.push_str(&format!("{}\n", graph.legend_title));
    let markers = std::iter::once('*').chain(LEVEL_MARKERS.iter().map(|&b| b as char).cycle());
    for (series, marker) in std::iter::once(&graph.first).chain(&graph.levels).zip(markers) {
        out.push_str(&format!("  {} {}\n", marker, series.label));
    }
    if !graph.caption.is_empty() {
        out.push_str(&graph.caption);
        out.push('\n');
    }
    out
}

fn draw_series(grid: &mut [Vec<char>], values: &[f64], n: usize, y_min: f64, y_max: f64) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for (i, &y) in values.iter().enumerate() {
        let x = map_x(i, n, width);
        let row = map_y(y, y_min, y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, x, row, '-'),
            None => grid[row][x] = '-',
        }
        prev = Some((x, row));
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let pad = ((max - min).abs() * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(index: usize, n: usize, width: usize) -> usize {
    if n <= 1 {
        return width / 2;
    }
    let u = (index as f64 / (n as f64 - 1.0)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // row 0 is the top
    (height as f64 - 1.0 - u * (height as f64 - 1.0)).round() as usize
}

/// Integer line drawing (Bresenham).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let (mut x0, mut y0) = (x0 as isize, y0 as isize);
    let (x1, y1) = (x1 as isize, y1 as isize);

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        let (x, y) = (x0 as usize, y0 as usize);
        if y < grid.len() && x < grid[0].len() && grid[y][x] == ' ' {
            grid[y][x] = ch;
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
