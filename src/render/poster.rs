use colored::Colorize;
use image::{DynamicImage, GenericImageView, imageops::FilterType};

/// Characters from dark to bright.
pub const ASCII_RAMP: &[u8] = b" .:-=+*#%@";

/// Number of text rows for an image drawn `columns` characters wide.
///
/// Terminal cells are roughly twice as tall as they are wide, hence the
/// halving.
pub fn poster_rows(columns: u32, width: u32, height: u32) -> u32 {
    if width == 0 {
        return 0;
    }
    let rows = (columns as u64 * height as u64 / width as u64 / 2) as u32;
    rows.max(1)
}

/// Draws an image as lines of ASCII characters.
///
/// Every cell's character comes from the pixel luminance; with `color` the
/// cell is also painted with the pixel's 24-bit color.
pub fn ascii_lines(img: &DynamicImage, columns: u32, color: bool) -> Vec<String> {
    let (width, height) = img.dimensions();
    if columns == 0 || width == 0 || height == 0 {
        return Vec::new();
    }

    let rows = poster_rows(columns, width, height);
    let resized = img.resize_exact(columns, rows, FilterType::Triangle).to_rgb8();

    let mut lines = Vec::with_capacity(rows as usize);
    for y in 0..rows {
        let mut line = String::with_capacity(columns as usize);
        for x in 0..columns {
            let [r, g, b] = resized.get_pixel(x, y).0;
            let ch = ramp_char(luminance(r, g, b));
            if color {
                line.push_str(&ch.to_string().truecolor(r, g, b).to_string());
            } else {
                line.push(ch);
            }
        }
        lines.push(line);
    }
    lines
}

/// Rec. 601 luma in `0.0..=255.0`.
fn luminance(r: u8, g: u8, b: u8) -> f32 {
    0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32
}

fn ramp_char(luma: f32) -> char {
    let last = (ASCII_RAMP.len() - 1) as f32;
    let idx = ((luma / 255.0) * last).round().clamp(0.0, last) as usize;
    ASCII_RAMP[idx] as char
}
