//! pgfplots (.tex) export of envelope charts.
//!
//! Builds the document by string assembly and writes it with proper
//! buffering, so plots can be dropped straight into a LaTeX paper.

use crate::frame::Frame;
use crate::pipeline::bounds::{HIGH, LOW, MEAN};
use crate::render::chart::{LegendPos, PlotOptions};
use crate::render::style::{resolve_style, LineKind, StyleCycle};
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write the ordered group envelopes as a pgfplots picture.
///
/// `groups` must already be collapsed to {low, mean, high} and sorted into
/// draw order; the same style resolution as the SVG chart applies, so both
/// exports of one plot agree on colours.
pub fn write_tikz(
    groups: &[(String, Frame)],
    options: &PlotOptions,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing pgfplots export to: {}", output_path.display());

    validate_tikz_path(output_path)?;

    if let Some(parent) = output_path.parent() {
        if !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!("Cannot create directory: {}", e))
            })?;
        }
    }

    let document = render_document(groups, options);

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(document.as_bytes())
        .map_err(OutputError::WriteFailed)?;
    writer.flush().map_err(OutputError::WriteFailed)?;

    info!("pgfplots export written ({} bytes)", document.len());
    Ok(())
}

/// Assemble the tikzpicture source
fn render_document(groups: &[(String, Frame)], options: &PlotOptions) -> String {
    let mut doc = String::new();
    doc.push_str(&format!(
        "% Generated by trackplot v{} on {}\n",
        env!("CARGO_PKG_VERSION"),
        chrono::Utc::now().to_rfc3339(),
    ));
    doc.push_str("\\begin{tikzpicture}\n");

    // Resolve styles up front; colour definitions precede the axis
    let mut cycle = StyleCycle::new();
    let styles: Vec<(plotters::style::RGBColor, LineKind)> = groups
        .iter()
        .map(|(name, _)| resolve_style(name, &options.overrides, &mut cycle))
        .collect();

    for (i, (colour, _)) in styles.iter().enumerate() {
        doc.push_str(&format!(
            "\\definecolor{{c{}}}{{HTML}}{{{:02X}{:02X}{:02X}}}\n",
            i, colour.0, colour.1, colour.2
        ));
    }

    doc.push_str("\\begin{axis}[\n");
    if let Some(title) = &options.title {
        doc.push_str(&format!("  title={{{}}},\n", title));
    }
    if let Some(xlabel) = &options.xlabel {
        doc.push_str(&format!("  xlabel={{{}}},\n", xlabel));
    }
    if let Some(ylabel) = &options.ylabel {
        doc.push_str(&format!("  ylabel={{{}}},\n", ylabel));
    }
    if options.log_y {
        doc.push_str("  ymode=log,\n");
    }
    if let Some((lo, hi)) = options.y_limits {
        doc.push_str(&format!("  ymin={}, ymax={},\n", lo, hi));
    }
    if let Some(pos) = options.legend {
        doc.push_str(&format!("  legend pos={},\n", legend_pos(pos)));
    }
    doc.push_str("  grid=both,\n]\n");

    for (idx, ((name, frame), (_, line))) in groups.iter().zip(&styles).enumerate() {
        // Band polygon: low forward, high backward
        let mut band: Vec<(f64, f64)> = column_coords(frame, LOW);
        let mut high = column_coords(frame, HIGH);
        high.reverse();
        band.extend(high);
        if !band.is_empty() {
            doc.push_str(&format!(
                "\\addplot[c{}, fill=c{}, fill opacity=0.3, draw=none, forget plot] coordinates {{\n{}}} -- cycle;\n",
                idx,
                idx,
                coord_lines(&band)
            ));
        }

        let dash = match line {
            LineKind::Solid => "",
            LineKind::Dashed => ", dashed",
        };
        doc.push_str(&format!(
            "\\addplot[c{}, thick{}] coordinates {{\n{}}};\n",
            idx,
            dash,
            coord_lines(&column_coords(frame, MEAN))
        ));
        if options.legend.is_some() {
            doc.push_str(&format!("\\addlegendentry{{{}}}\n", escape_tex(name)));
        }
    }

    doc.push_str("\\end{axis}\n\\end{tikzpicture}\n");
    doc
}

fn column_coords(frame: &Frame, column: &str) -> Vec<(f64, f64)> {
    let Some(col) = frame.column(column) else {
        return Vec::new();
    };
    frame
        .index()
        .iter()
        .zip(&col.values)
        .filter_map(|(&step, &v)| v.map(|value| (step, value)))
        .collect()
}

fn coord_lines(points: &[(f64, f64)]) -> String {
    let mut out = String::new();
    for (x, y) in points {
        out.push_str(&format!("  ({}, {})\n", x, y));
    }
    out
}

fn legend_pos(pos: LegendPos) -> &'static str {
    match pos {
        LegendPos::Best | LegendPos::UpperRight => "north east",
        LegendPos::UpperLeft => "north west",
        LegendPos::UpperCenter => "north",
        LegendPos::LowerLeft => "south west",
        LegendPos::LowerRight => "south east",
        LegendPos::LowerCenter => "south",
    }
}

/// Escape characters LaTeX treats specially in plain text
fn escape_tex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '_' | '%' | '&' | '#' | '$' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Validate output path for the .tex export
fn validate_tikz_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }
    if path.exists() && path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }
    if let Some(ext) = path.extension() {
        if ext != "tex" {
            debug!("Warning: File does not have .tex extension: {}", path.display());
        }
    }
    Ok(())
}
