//! PNG rendering of a filtered chart series.
//!
//! The image is a bare filled line plot: no axes, ticks or labels. The line and
//! fill are green for a non-negative change and red otherwise, and the last
//! point carries a red marker. One file is written per chart session.
use std::fmt::Display;
use std::path::{Path, PathBuf};

use feed_common::{FeedError, Result, SessionId};
use log::info;
use plotters::prelude::*;

/// Image width in pixels.
pub const WIDTH: u32 = 720;
/// Image height in pixels.
pub const HEIGHT: u32 = 720;

const MARGIN: u32 = 10;
const FILL_OPACITY: f64 = 0.1;
const LINE_WIDTH: u32 = 2;
const MARKER_RADIUS: i32 = 5;

/// Path of the image for `session` under `dir`.
pub fn chart_path(dir: &Path, session: &SessionId) -> PathBuf {
    dir.join(format!("{}.png", session))
}

/// Draws `values` to `<dir>/<session>.png` and returns the written path.
pub fn render_chart(
    dir: &Path,
    session: &SessionId,
    values: &[f64],
    change: f64,
) -> Result<PathBuf> {
    let path = chart_path(dir, session);
    draw(&path, values, change)?;
    info!("Chart written to {}", path.display());
    Ok(path)
}

fn draw(path: &Path, values: &[f64], change: f64) -> Result<()> {
    let Some(&last) = values.last() else {
        return Err(FeedError::Render("empty series".to_string()));
    };
    let low = values.iter().copied().fold(f64::INFINITY, f64::min);
    let high = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (y_min, y_max) = if high - low > f64::EPSILON {
        (low, high)
    } else {
        (low - 1.0, high + 1.0)
    };
    let x_max = (values.len().max(2) - 1) as f64;
    let color = if change >= 0.0 { GREEN } else { RED };
    let points: Vec<(f64, f64)> = values.iter().enumerate().map(|(i, v)| (i as f64, *v)).collect();

    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(render_error)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(MARGIN)
        .build_cartesian_2d(0f64..x_max, y_min..y_max)
        .map_err(render_error)?;

    chart
        .draw_series(AreaSeries::new(points.iter().copied(), low, color.mix(FILL_OPACITY)))
        .map_err(render_error)?;
    chart
        .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(LINE_WIDTH)))
        .map_err(render_error)?;
    chart
        .draw_series(std::iter::once(Circle::new(
            ((values.len() - 1) as f64, last),
            MARKER_RADIUS,
            RED.filled(),
        )))
        .map_err(render_error)?;

    root.present().map_err(render_error)?;
    Ok(())
}

fn render_error(e: impl Display) -> FeedError {
    FeedError::Render(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use feed_common::SessionKind;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    #[test]
    fn writes_png_named_after_session() {
        let dir = tempfile::tempdir().unwrap();
        let session = SessionId::generate(SessionKind::Chart);

        let path = render_chart(dir.path(), &session, &[10.0, 10.5, 9.75, 11.25], -0.4).unwrap();

        assert_eq!(path, dir.path().join(format!("{}.png", session)));
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes[..8], PNG_MAGIC);
    }

    #[test]
    fn flat_and_single_point_series_render() {
        let dir = tempfile::tempdir().unwrap();
        let session = SessionId::generate(SessionKind::Chart);
        render_chart(dir.path(), &session, &[42.0], 0.0).unwrap();
        render_chart(dir.path(), &session, &[42.0, 42.0, 42.0], 1.0).unwrap();
        assert!(chart_path(dir.path(), &session).is_file());
    }

    #[test]
    fn empty_series_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let session = SessionId::generate(SessionKind::Chart);
        assert!(matches!(
            render_chart(dir.path(), &session, &[], 1.0),
            Err(FeedError::Render(_))
        ));
        assert!(!chart_path(dir.path(), &session).exists());
    }
}
