//! SVG visualization of computed album layouts.
//!
//! Renders one annotated panel: every cell drawn at its unit rect, labeled
//! with its index, size, span, and border flags. A debugging aid; the
//! production renderer consumes [`LayoutPosition`](crate::LayoutPosition)
//! records directly and never goes through SVG.
//!
//! # Example
//!
//! ```
//! use zenmosaic::{GroupContext, MediaItem, layout_group};
//! use zenmosaic::svg::render_layout_svg;
//!
//! let items = [MediaItem::new(1000, 1000), MediaItem::new(1000, 1000)];
//! let layout = layout_group(&items, &GroupContext::incoming());
//!
//! let svg = render_layout_svg(&layout);
//! assert!(svg.starts_with("<svg"));
//! assert!(svg.contains("</svg>"));
//! ```

use crate::mosaic::{CANVAS_HEIGHT, GroupLayout};

/// Pixels per virtual canvas unit.
const UNIT_SCALE: f64 = 0.5;
/// Margin around the grid, px.
const MARGIN: f64 = 24.0;
/// Inset between neighboring cell rects, px.
const CELL_INSET: f64 = 1.0;
/// Label text size, px.
const FONT_SIZE: f64 = 11.0;
/// Grid height fractions never reach this; document rows carry unit
/// pseudo-heights far above it.
const UNIT_HEIGHT_BOUND: f32 = 2.0;

/// A cell placed in unit space, ready to scale.
struct Cell {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

/// Render a complete SVG document showing each cell of the arrangement.
///
/// An empty layout renders as an empty panel.
pub fn render_layout_svg(layout: &GroupLayout) -> String {
    let cells = place(layout);

    let mut extent_w = 0.0f64;
    let mut extent_h = 0.0f64;
    for cell in &cells {
        extent_w = extent_w.max(cell.x + cell.w);
        extent_h = extent_h.max(cell.y + cell.h);
    }
    let width = extent_w * UNIT_SCALE + 2.0 * MARGIN;
    let height = extent_h * UNIT_SCALE + 2.0 * MARGIN;

    let mut out = String::with_capacity(1024);
    out.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.0}\" \
         height=\"{height:.0}\" viewBox=\"0 0 {width:.0} {height:.0}\">\n"
    ));
    out.push_str(&format!(
        "  <rect width=\"{width:.0}\" height=\"{height:.0}\" fill=\"#fafafa\"/>\n"
    ));

    for (index, (cell, pos)) in cells.iter().zip(&layout.positions).enumerate() {
        let x = MARGIN + cell.x * UNIT_SCALE + CELL_INSET;
        let y = MARGIN + cell.y * UNIT_SCALE + CELL_INSET;
        let w = (cell.w * UNIT_SCALE - 2.0 * CELL_INSET).max(1.0);
        let h = (cell.h * UNIT_SCALE - 2.0 * CELL_INSET).max(1.0);
        let stroke = if pos.is_edge { "#c0662f" } else { "#4a6785" };
        out.push_str(&format!(
            "  <rect x=\"{x:.1}\" y=\"{y:.1}\" width=\"{w:.1}\" height=\"{h:.1}\" \
             fill=\"#e7edf4\" stroke=\"{stroke}\"/>\n"
        ));
        out.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"{FONT_SIZE}\" \
             font-family=\"monospace\">#{index} {}u</text>\n",
            x + 5.0,
            y + 14.0,
            pos.width_units,
        ));
        out.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"{FONT_SIZE}\" \
             font-family=\"monospace\">span {} {:?}</text>\n",
            x + 5.0,
            y + 14.0 + FONT_SIZE + 2.0,
            pos.span_size,
            pos.borders,
        ));
    }

    out.push_str("</svg>\n");
    out
}

/// Walk positions in order, tracking the y offset per row and the column
/// consumed by a row-spanning cell, and emit unit-space rects.
fn place(layout: &GroupLayout) -> Vec<Cell> {
    let mut cells = Vec::with_capacity(layout.positions.len());
    let mut y = 0.0f64;
    let mut row = 0u8;
    let mut row_h = 0.0f64;
    let mut x = 0.0f64;
    let mut tall_end_x = 0.0f64;
    let mut tall_last_row = 0u8;
    let mut has_tall = false;

    for pos in &layout.positions {
        if pos.row_min != row {
            y += row_h;
            row_h = 0.0;
            row = pos.row_min;
            x = if has_tall && row <= tall_last_row {
                tall_end_x
            } else {
                0.0
            };
        }
        let h = height_units(pos.height_fraction);
        let w = pos.width_units as f64;
        cells.push(Cell { x, y, w, h });
        if pos.row_max > pos.row_min {
            has_tall = true;
            tall_end_x = x + w;
            tall_last_row = pos.row_max;
        } else {
            row_h = row_h.max(h);
        }
        x += w;
    }
    cells
}

fn height_units(fraction: f32) -> f64 {
    if fraction > UNIT_HEIGHT_BOUND {
        fraction as f64
    } else {
        (fraction * CANVAS_HEIGHT) as f64
    }
}
