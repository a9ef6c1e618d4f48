//! Performance chart rendering
//!
//! One chart per alerted token: price-change % per reporting window as bars
//! (green/red by sign) with a USD-volume line on a secondary axis, drawn on
//! a dark theme and encoded to an in-memory PNG at 2x scale. Rendering is
//! best-effort: any failure downgrades the alert to text-only.

use image::{codecs::png::PngEncoder, ColorType, ImageEncoder};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::warn;

use crate::dexscreener::{DexPair, Window};
use crate::error::{Error, Result};

// 800x450 layout rendered at 2x
const WIDTH: u32 = 1600;
const HEIGHT: u32 = 900;

const BACKGROUND: RGBColor = RGBColor(0x1e, 0x1e, 0x2e);
const GRID: RGBColor = RGBColor(0x44, 0x44, 0x44);
const BAR_GREEN: RGBColor = RGBColor(0x4c, 0xaf, 0x50);
const BAR_RED: RGBColor = RGBColor(0xf4, 0x43, 0x36);
const LINE_BLUE: RGBColor = RGBColor(0x21, 0x96, 0xf3);

/// Render the performance chart for a pair, or `None` if rendering fails.
pub fn render_performance_chart(pair: &DexPair, token_name: &str) -> Option<Vec<u8>> {
    match render(pair, token_name) {
        Ok(png) => Some(png),
        Err(e) => {
            warn!("Chart rendering failed for {}: {}", token_name, e);
            None
        }
    }
}

/// Extract the bar and line series in fixed window order; missing or
/// malformed values were already defaulted to 0 at the parse boundary.
pub(crate) fn window_series(pair: &DexPair) -> (Vec<f64>, Vec<f64>) {
    Window::ALL
        .iter()
        .map(|&w| (pair.price_change(w), pair.volume(w)))
        .unzip()
}

fn chart_err(e: impl std::fmt::Display) -> Error {
    Error::ChartRender(e.to_string())
}

fn render(pair: &DexPair, token_name: &str) -> Result<Vec<u8>> {
    let (price_changes, volumes) = window_series(pair);

    let max_pc = price_changes.iter().cloned().fold(0.0_f64, f64::max);
    let min_pc = price_changes.iter().cloned().fold(0.0_f64, f64::min);
    let span = (max_pc - min_pc).max(1.0);
    // Headroom so bar labels stay inside the plot area
    let y_hi = max_pc + span * 0.25;
    let y_lo = if min_pc < 0.0 { min_pc - span * 0.25 } else { 0.0 };

    let max_vol = volumes.iter().cloned().fold(0.0_f64, f64::max);
    let vol_hi = (max_vol * 1.25).max(1.0);

    let mut buf = vec![0u8; (WIDTH * HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&BACKGROUND).map_err(chart_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("Performance: {}", token_name),
                ("sans-serif", 36).into_font().color(&WHITE),
            )
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(80)
            .right_y_label_area_size(100)
            .build_cartesian_2d((0usize..Window::ALL.len()).into_segmented(), y_lo..y_hi)
            .map_err(chart_err)?
            .set_secondary_coord(
                (0usize..Window::ALL.len()).into_segmented(),
                0.0_f64..vol_hi,
            );

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(Window::ALL.len())
            .x_label_formatter(&|seg| match seg {
                SegmentValue::CenterOf(i) => Window::ALL
                    .get(*i)
                    .map(|w| w.label().to_string())
                    .unwrap_or_default(),
                _ => String::new(),
            })
            .x_desc("Time Interval")
            .y_desc("Price Change (%)")
            .axis_desc_style(("sans-serif", 24).into_font().color(&WHITE))
            .label_style(("sans-serif", 20).into_font().color(&WHITE))
            .axis_style(&GRID)
            .light_line_style(&GRID.mix(0.4))
            .bold_line_style(&GRID)
            .draw()
            .map_err(chart_err)?;

        chart
            .configure_secondary_axes()
            .y_desc("Volume (USD)")
            .axis_desc_style(("sans-serif", 24).into_font().color(&WHITE))
            .label_style(("sans-serif", 20).into_font().color(&WHITE))
            .draw()
            .map_err(chart_err)?;

        // Price-change bars, colored by sign
        chart
            .draw_series(price_changes.iter().enumerate().map(|(i, &pc)| {
                let color = if pc >= 0.0 { BAR_GREEN } else { BAR_RED };
                let mut bar = Rectangle::new(
                    [
                        (SegmentValue::Exact(i), 0.0),
                        (SegmentValue::Exact(i + 1), pc),
                    ],
                    color.filled(),
                );
                bar.set_margin(0, 0, 30, 30);
                bar
            }))
            .map_err(chart_err)?
            .label("Price Change (%)")
            .legend(|(x, y)| Rectangle::new([(x, y - 6), (x + 14, y + 6)], BAR_GREEN.filled()));

        // Bar labels, outside the bar end
        chart
            .draw_series(price_changes.iter().enumerate().map(|(i, &pc)| {
                let v_pos = if pc >= 0.0 { VPos::Bottom } else { VPos::Top };
                let style = ("sans-serif", 22)
                    .into_font()
                    .color(&WHITE)
                    .pos(Pos::new(HPos::Center, v_pos));
                Text::new(
                    format!("{:.1}%", pc),
                    (SegmentValue::CenterOf(i), pc),
                    style,
                )
            }))
            .map_err(chart_err)?;

        // Volume line on the secondary axis
        chart
            .draw_secondary_series(LineSeries::new(
                volumes
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| (SegmentValue::CenterOf(i), v)),
                LINE_BLUE.stroke_width(3),
            ))
            .map_err(chart_err)?
            .label("Volume (USD)")
            .legend(|(x, y)| {
                PathElement::new(vec![(x, y), (x + 14, y)], LINE_BLUE.stroke_width(3))
            });

        // Volume markers with abbreviated labels
        chart
            .draw_secondary_series(volumes.iter().enumerate().map(|(i, &v)| {
                Circle::new((SegmentValue::CenterOf(i), v), 6, LINE_BLUE.filled())
            }))
            .map_err(chart_err)?;

        chart
            .draw_secondary_series(volumes.iter().enumerate().map(|(i, &v)| {
                let style = ("sans-serif", 20)
                    .into_font()
                    .color(&LINE_BLUE)
                    .pos(Pos::new(HPos::Center, VPos::Bottom));
                Text::new(
                    format!("${:.1}K", v / 1000.0),
                    (SegmentValue::CenterOf(i), v),
                    style,
                )
            }))
            .map_err(chart_err)?;

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&BACKGROUND.mix(0.85))
            .border_style(&GRID)
            .label_font(("sans-serif", 22).into_font().color(&WHITE))
            .draw()
            .map_err(chart_err)?;

        root.present().map_err(chart_err)?;
    }

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(&buf, WIDTH, HEIGHT, ColorType::Rgb8)
        .map_err(chart_err)?;

    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dexscreener::{Liquidity, PriceChange, Volume};

    fn pair() -> DexPair {
        DexPair {
            base_token: None,
            price_change: Some(PriceChange {
                m5: Some(2.0),
                h1: Some(-5.5),
                h6: None,
                h24: Some(12.25),
            }),
            volume: Some(Volume {
                m5: Some(1000.0),
                h1: None,
                h6: Some(40_000.0),
                h24: Some(90_000.0),
            }),
            liquidity: Some(Liquidity {
                usd: Some(8000.0),
                base: None,
                quote: None,
            }),
            url: None,
        }
    }

    #[test]
    fn test_window_series_fixed_order_and_defaults() {
        let (price_changes, volumes) = window_series(&pair());
        assert_eq!(price_changes, vec![2.0, -5.5, 0.0, 12.25]);
        assert_eq!(volumes, vec![1000.0, 0.0, 40_000.0, 90_000.0]);
    }

    #[test]
    fn test_window_series_empty_pair_is_all_zeros() {
        let empty = DexPair {
            base_token: None,
            price_change: None,
            volume: None,
            liquidity: None,
            url: None,
        };
        let (price_changes, volumes) = window_series(&empty);
        assert_eq!(price_changes, vec![0.0; 4]);
        assert_eq!(volumes, vec![0.0; 4]);
    }

    #[test]
    fn test_render_never_panics_and_yields_png() {
        // Text rendering depends on system fonts; when they are missing the
        // renderer must degrade to None rather than panic. When it succeeds
        // the buffer must be a PNG.
        if let Some(png) = render_performance_chart(&pair(), "TESTTOKEN") {
            assert!(png.starts_with(&[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]));
        }
    }
}
