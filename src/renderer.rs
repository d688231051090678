// src/renderer.rs

use crate::error::{CriticError, Result};
use crate::glyphs::{draw_text, draw_text_centered, text_height, text_width};
use crate::model::{AuthorRanking, RecencyMap};
use image::{Rgb, RgbImage};
use palette::{FromColor, Lch, LinSrgb, Srgb};
use std::f32::consts::TAU;
use std::path::{Path, PathBuf};
use tracing::info;

/// The ranking chart always shows at least this many author slots
pub const MIN_AUTHOR_SLOTS: usize = 5;
const DAYS_PER_YEAR: f32 = 365.0;
const LABEL_CHARS: usize = 24;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([34, 34, 34]);
const GRID: Rgb<u8> = Rgb([200, 200, 200]);
const SINGLE_AUTHOR: Rgb<u8> = Rgb([255, 127, 14]);
const OTHER: Rgb<u8> = Rgb([31, 119, 180]);
const NO_FILES: Rgb<u8> = Rgb([190, 190, 190]);

#[derive(Debug, Clone, Copy)]
pub struct ChartSize {
    pub width: u32,
    pub height: u32,
}

pub fn total_chart_path(output_dir: &Path, project: &str) -> PathBuf {
    output_dir.join(format!("{project}_total.png"))
}

pub fn authors_chart_path(output_dir: &Path, project: &str) -> PathBuf {
    output_dir.join(format!("{project}_authors.png"))
}

/// Pie of single-author files against the rest.
pub fn render_pie(total_files: usize, included_files: usize, label: &str, size: ChartSize, path: &Path) -> Result<()> {
    let mut image = RgbImage::from_pixel(size.width, size.height, BACKGROUND);
    let scale = text_scale(size);
    let line = i64::from(text_height(scale));
    let (w, h) = (i64::from(size.width), i64::from(size.height));

    draw_text_centered(&mut image, w / 2, line, label, scale, INK);

    let excluded = total_files.saturating_sub(included_files);
    let top = line * 3;
    let bottom = h - line * 4;
    let radius = ((bottom - top).min(w) as f32 * 0.45).max(1.0);
    let (cx, cy) = (w as f32 / 2.0, (top + bottom) as f32 / 2.0);

    if total_files == 0 {
        fill_disc(&mut image, cx, cy, radius, |_| NO_FILES);
        draw_text_centered(&mut image, cx as i64, cy as i64 - line / 2, "NO FILES", scale, INK);
    } else {
        // Slices start at 3 o'clock and run counter-clockwise
        let included_angle = included_files as f32 / total_files as f32 * TAU;
        fill_disc(&mut image, cx, cy, radius, |angle| if angle < included_angle { SINGLE_AUTHOR } else { OTHER });

        for (count, start, sweep) in [
            (included_files, 0.0, included_angle),
            (excluded, included_angle, TAU - included_angle),
        ] {
            if count == 0 {
                continue;
            }
            let mid = start + sweep / 2.0;
            let tx = cx + radius * 0.6 * mid.cos();
            let ty = cy - radius * 0.6 * mid.sin();
            let pct = format!("{:.1}%", count as f32 / total_files as f32 * 100.0);
            draw_text_centered(&mut image, tx as i64, ty as i64 - line / 2, &pct, scale, INK);
        }
    }

    let legend_y = h - line * 3;
    let mut x = line;
    for (color, text) in pie_legend(total_files, included_files) {
        fill_rect(&mut image, x, legend_y, line, line, color);
        draw_text(&mut image, x + line * 3 / 2, legend_y, &text, scale, INK);
        x += line * 3 + i64::from(text_width(&text, scale));
    }

    save(&image, path)
}

/// Legend entries for the pie. The second slice holds every file that is not
/// single-author: shared files and files without any commit alike.
pub fn pie_legend(total_files: usize, included_files: usize) -> [(Rgb<u8>, String); 2] {
    let excluded = total_files.saturating_sub(included_files);
    [
        (SINGLE_AUTHOR, format!("SINGLE AUTHOR ({included_files})")),
        (OTHER, format!("OTHER ({excluded})")),
    ]
}

/// Horizontal bars of files per author, coloured by how long ago each author
/// last committed. Every ranked author needs an entry in `recency`.
pub fn render_ranking(
    ranking: &AuthorRanking,
    recency: &RecencyMap,
    label: &str,
    size: ChartSize,
    path: &Path,
) -> Result<()> {
    let days_by_slot = ranking
        .iter()
        .map(|rank| {
            recency
                .get(&rank.author)
                .copied()
                .ok_or_else(|| CriticError::NoCommitFound { author: rank.author.clone() })
        })
        .collect::<Result<Vec<i64>>>()?;

    let mut image = RgbImage::from_pixel(size.width, size.height, BACKGROUND);
    let scale = text_scale(size);
    let line = i64::from(text_height(scale));
    let (w, h) = (i64::from(size.width), i64::from(size.height));

    draw_text_centered(&mut image, w / 2, line, label, scale, INK);

    let labels = slot_labels(ranking);
    let label_width = labels.iter().map(|l| text_width(l, scale)).max().unwrap_or(0);
    let left = i64::from(label_width) + line * 2;
    let right = w - line * 2;
    let top = line * 3;
    let bottom = h - line * 8;
    let plot_w = (right - left).max(1);
    let plot_h = (bottom - top).max(1);

    let max_files = ranking.iter().map(|r| r.file_count).max().unwrap_or(0).max(1);
    let step = x_tick_step(max_files);
    let axis_max = max_files.div_ceil(step) * step;
    let x_of = |value: usize| left + (value as f32 / axis_max as f32 * plot_w as f32).round() as i64;

    for tick in (0..=axis_max).step_by(step) {
        let x = x_of(tick);
        fill_rect(&mut image, x, top, 1, plot_h, GRID);
        fill_rect(&mut image, x, bottom, 1, line / 2, INK);
        draw_text_centered(&mut image, x, bottom + line, &tick.to_string(), scale, INK);
    }
    fill_rect(&mut image, left, top, 1, plot_h, INK);
    fill_rect(&mut image, left, bottom, plot_w + 1, 1, INK);

    let years = scale_years(recency);
    let slot_h = plot_h as f32 / labels.len() as f32;
    for (slot, text) in labels.iter().enumerate() {
        // Slot 0 sits at the bottom
        let slot_top = bottom as f32 - (slot + 1) as f32 * slot_h;
        let text_y = (slot_top + slot_h / 2.0) as i64 - line / 2;
        draw_text(&mut image, left - line - i64::from(text_width(text, scale)), text_y, text, scale, INK);

        if let (Some(rank), Some(&days)) = (ranking.get(slot), days_by_slot.get(slot)) {
            let bar_top = (slot_top + slot_h * 0.1) as i64;
            let bar_h = (slot_h * 0.8).max(1.0) as i64;
            let bar_w = x_of(rank.file_count) - left;
            fill_rect(&mut image, left + 1, bar_top, bar_w, bar_h, recency_color(days, years));
        }
    }

    draw_colorbar(&mut image, left, bottom + line * 3, plot_w, line, years, scale);

    save(&image, path)
}

/// Labels for the category axis, padded with blanks to at least
/// [`MIN_AUTHOR_SLOTS`] entries.
pub fn slot_labels(ranking: &AuthorRanking) -> Vec<String> {
    let mut labels: Vec<String> = ranking.iter().map(|r| shorten(&r.author)).collect();
    while labels.len() < MIN_AUTHOR_SLOTS {
        labels.push(String::new());
    }
    labels
}

/// Tick spacing for the file-count axis: unit steps below 10, otherwise the
/// smallest 1/2/5 x 10^n step that needs at most ten intervals.
pub fn x_tick_step(max_value: usize) -> usize {
    if max_value < 10 {
        return 1;
    }
    let mut magnitude = 1;
    loop {
        for factor in [1, 2, 5] {
            let step = factor * magnitude;
            if max_value.div_ceil(step) <= 10 {
                return step;
            }
        }
        magnitude *= 10;
    }
}

/// Upper end of the colour scale in years: at least one year.
pub fn scale_years(recency: &RecencyMap) -> f32 {
    let max_days = recency.values().copied().max().unwrap_or(0).max(0);
    (max_days as f32 / DAYS_PER_YEAR).max(1.0)
}

/// Colour for an author last seen `days` ago on a scale running from 0 to
/// `scale_years`. Recent activity is green, long silence red.
pub fn recency_color(days: i64, scale_years: f32) -> Rgb<u8> {
    let position = (days.max(0) as f32 / DAYS_PER_YEAR / scale_years).clamp(0.0, 1.0);
    gradient(position)
}

fn gradient(position: f32) -> Rgb<u8> {
    let lch_colors = [
        Lch::new(45.0f32, 55.0f32, 140.0f32), // Green
        Lch::new(85.0f32, 75.0f32, 95.0f32),  // Yellow
        Lch::new(65.0f32, 85.0f32, 55.0f32),  // Orange
        Lch::new(45.0f32, 80.0f32, 35.0f32),  // Red
    ];
    let stops: Vec<LinSrgb<f32>> = lch_colors.into_iter().map(LinSrgb::from_color).collect();

    let scaled = position * (stops.len() - 1) as f32;
    let idx1 = (scaled.floor() as usize).min(stops.len() - 1);
    let idx2 = (idx1 + 1).min(stops.len() - 1);
    let t = scaled - idx1 as f32;

    let (c1, c2) = (stops[idx1], stops[idx2]);
    let mixed = LinSrgb::new(
        c1.red + (c2.red - c1.red) * t,
        c1.green + (c2.green - c1.green) * t,
        c1.blue + (c2.blue - c1.blue) * t,
    );

    let (r, g, b) = Srgb::from_linear(mixed).into_components();
    Rgb([to_u8(r), to_u8(g), to_u8(b)])
}

fn to_u8(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn draw_colorbar(image: &mut RgbImage, x: i64, y: i64, width: i64, height: i64, years: f32, scale: u32) {
    for dx in 0..width {
        let position = dx as f32 / (width - 1).max(1) as f32;
        fill_rect(image, x + dx, y, 1, height, gradient(position));
    }
    let label_y = y + height + height / 2;
    draw_text(image, x, label_y, "0", scale, INK);
    let end = format!("{years:.1}");
    draw_text(image, x + width - i64::from(text_width(&end, scale)), label_y, &end, scale, INK);
    draw_text_centered(image, x + width / 2, label_y, "YEARS SINCE LAST COMMIT", scale, INK);
}

fn shorten(author: &str) -> String {
    if author.chars().count() <= LABEL_CHARS {
        author.to_string()
    } else {
        let head: String = author.chars().take(LABEL_CHARS - 2).collect();
        format!("{head}..")
    }
}

fn text_scale(size: ChartSize) -> u32 {
    (size.width.min(size.height) / 300).max(1)
}

fn fill_rect(image: &mut RgbImage, x: i64, y: i64, w: i64, h: i64, color: Rgb<u8>) {
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + w).min(i64::from(image.width()));
    let y1 = (y + h).min(i64::from(image.height()));
    for py in y0..y1 {
        for px in x0..x1 {
            image.put_pixel(px as u32, py as u32, color);
        }
    }
}

/// Fills a disc, choosing each pixel's colour from its angle in [0, TAU)
/// measured counter-clockwise from 3 o'clock.
fn fill_disc(image: &mut RgbImage, cx: f32, cy: f32, radius: f32, color_at: impl Fn(f32) -> Rgb<u8>) {
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let dx = x as f32 + 0.5 - cx;
        let dy = cy - (y as f32 + 0.5);
        if dx * dx + dy * dy > radius * radius {
            continue;
        }
        let angle = dy.atan2(dx).rem_euclid(TAU);
        *pixel = color_at(angle);
    }
}

fn save(image: &RgbImage, path: &Path) -> Result<()> {
    image
        .save(path)
        .map_err(|source| CriticError::WriteChart { path: path.to_path_buf(), source })?;
    info!("Wrote {}", path.display());
    Ok(())
}
