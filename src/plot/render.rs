// src/plot/render.rs

use anyhow::{Context, Result};
use chrono::NaiveDate;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{FontDesc, FontFamily, FontStyle};
use std::path::Path;
use tracing::info;

use super::model::{Chart, ChartPair};

pub const DEFAULT_SIZE: (u32, u32) = (1600, 600);

/// Draw both charts side by side into an SVG file at `path`.
pub fn render_svg(charts: &ChartPair, path: &Path, size: (u32, u32)) -> Result<()> {
    {
        let root = SVGBackend::new(path, size).into_drawing_area();
        draw_pair(&root, charts)?;
        root.present()
            .with_context(|| format!("writing {}", path.display()))?;
    }
    info!(path = %path.display(), "chart written");
    Ok(())
}

/// Same as [`render_svg`] but returns the document instead of writing it.
pub fn render_svg_string(charts: &ChartPair, size: (u32, u32)) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        draw_pair(&root, charts)?;
        root.present().context("finishing svg document")?;
    }
    Ok(svg)
}

fn draw_pair<DB>(root: &DrawingArea<DB, Shift>, charts: &ChartPair) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let (width, _) = root.dim_in_pixel();
    let (left, right) = root.split_horizontally((width / 2) as i32);
    draw_chart(&left, &charts.aggregate)?;
    draw_chart(&right, &charts.by_age)?;
    Ok(())
}

fn draw_chart<DB>(area: &DrawingArea<DB, Shift>, chart: &Chart) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (Some((start, end)), Some((lo, hi))) = (chart.date_range(), chart.value_range()) else {
        return draw_empty(area, chart);
    };

    // a single date still needs a non-empty axis
    let end = if end > start {
        end
    } else {
        end.succ_opt().unwrap_or(end)
    };
    let (y_lo, y_hi) = y_range(lo, hi);

    let mut cc = ChartBuilder::on(area)
        .caption(&chart.title, ("sans-serif", 20))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(start..end, y_lo..y_hi)?;

    cc.configure_mesh()
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .x_labels(8)
        .x_label_formatter(&|d: &NaiveDate| d.format("%d %b %y").to_string())
        .y_label_formatter(&|v: &f64| format!("{:.1}", v))
        .draw()?;

    for (i, series) in chart.series.iter().enumerate() {
        let color = Palette99::pick(i).mix(0.9);
        cc.draw_series(LineSeries::new(series.points.iter().copied(), &color))?
            .label(series.label.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    if chart.legend && !chart.series.is_empty() {
        cc.configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .position(SeriesLabelPosition::UpperLeft)
            .draw()?;
    }
    Ok(())
}

fn draw_empty<DB>(area: &DrawingArea<DB, Shift>, chart: &Chart) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let inner = area.titled(
        &chart.title,
        FontDesc::new(FontFamily::SansSerif, 20.0, FontStyle::Normal),
    )?;
    let (w, h) = inner.dim_in_pixel();
    inner.draw(&Text::new(
        "no data for the selected years",
        (w as i32 / 2 - 100, h as i32 / 2),
        FontDesc::new(FontFamily::SansSerif, 16.0, FontStyle::Normal).color(&BLACK.mix(0.6)),
    ))?;
    Ok(())
}

/// Value axis from zero (or the lowest negative value) to a tenth of the
/// span above the highest value.
fn y_range(lo: f64, hi: f64) -> (f64, f64) {
    let y_lo = lo.min(0.0);
    if hi > y_lo {
        (y_lo, hi + (hi - y_lo) * 0.1)
    } else {
        (y_lo, y_lo + 1.0)
    }
}
