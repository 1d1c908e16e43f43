//! Page geometry for proxy sheets. All lengths are millimetres measured from
//! the top-left corner of the page.

use crate::config;

pub const CARDS_PER_PAGE: usize = config::PROXY_CARDS_PER_PAGE;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Left margin that centres the grid horizontally.
pub fn margin_x() -> f64 {
    (config::PAGE_WIDTH_MM - config::PROXY_COLUMNS as f64 * config::CARD_WIDTH_MM) / 2.0
}

/// Top margin that centres the grid vertically.
pub fn margin_y() -> f64 {
    (config::PAGE_HEIGHT_MM - config::PROXY_ROWS as f64 * config::CARD_HEIGHT_MM) / 2.0
}

/// Rectangle of grid slot `slot` (row-major, 0-based).
pub fn cell_rect(slot: usize) -> Rect {
    let column = slot % config::PROXY_COLUMNS;
    let row = slot / config::PROXY_COLUMNS;
    Rect {
        x: margin_x() + column as f64 * config::CARD_WIDTH_MM,
        y: margin_y() + row as f64 * config::CARD_HEIGHT_MM,
        width: config::CARD_WIDTH_MM,
        height: config::CARD_HEIGHT_MM,
    }
}

/// Pixel size of a card raster at [`config::PROXY_DPI`].
pub fn card_pixels() -> (u32, u32) {
    let to_px = |mm: f64| (mm / 25.4 * config::PROXY_DPI).round() as u32;
    (to_px(config::CARD_WIDTH_MM), to_px(config::CARD_HEIGHT_MM))
}

pub fn mm_to_pt(mm: f64) -> f64 {
    mm * 72.0 / 25.4
}
