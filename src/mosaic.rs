//! Grid arrangement of grouped media: fixed templates, partition search,
//! and post-processing.
//!
//! The entry point is [`Canvas::layout`] (or the convenience
//! [`layout_group`] on the default canvas). It takes the ordered items of
//! one album plus the group's context flags and returns one
//! [`LayoutPosition`] per item, computed fresh against a fixed virtual
//! canvas; the caller scales units to screen pixels.
//!
//! Groups of two, three, and four items use hand-tuned arrangements keyed
//! on the members' [`Proportion`] pattern. Larger groups, and any group
//! containing an extreme panorama, go through a bounded search over row
//! partitions scored for canvas fill. Groups made entirely of document or
//! audio attachments bypass the grid and become one full-width row each.
//!
//! # Example
//!
//! ```
//! use zenmosaic::{GroupContext, MediaItem, layout_group};
//!
//! let items = [MediaItem::new(1280, 960), MediaItem::new(1024, 768)];
//! let layout = layout_group(&items, &GroupContext::incoming());
//!
//! // Two landscape photos share one row in equal halves.
//! assert_eq!(layout.positions.len(), 2);
//! assert_eq!(layout.positions[0].width_units, 400);
//! assert_eq!(layout.positions[1].width_units, 400);
//! ```

use alloc::vec;
use alloc::vec::Vec;

use crate::aspect::{AspectProfile, Proportion};
use crate::border::Borders;
use crate::media::{GroupContext, MediaItem};

#[cfg(not(feature = "std"))]
#[allow(unused_imports)]
use num_traits::Float;

/// Virtual canvas width in layout units.
pub const CANVAS_WIDTH: i32 = 800;

/// Virtual canvas height in layout units; height fractions are relative to
/// this.
pub const CANVAS_HEIGHT: f32 = 814.0;

/// `span_size` value meaning "consume the entire span row".
pub const FULL_ROW_SPAN: i32 = 1000;

/// Span columns granted to each row's edge cell on top of its width; the
/// caller's span grid is the canvas width plus this reserve per row.
const SPAN_EXTRA: i32 = 200;

/// Horizontal allowance added to a full-height column so its content clears
/// the inner seam padding.
const EDGE_PADDING: i32 = 40;

/// Floor, in height units, for the stacked rows beside a tall first item.
const MIN_STACK_HEIGHT: f32 = 120.0;

/// Floor for any grid row's height, as a fraction of [`CANVAS_HEIGHT`].
const MIN_HEIGHT_FRAC: f32 = 100.0 / CANVAS_HEIGHT;

/// Narrowest the middle column of a four-item bottom row may get.
const MIDDLE_MIN: i32 = 58;

/// Pseudo-height, in layout units, of one document row.
const DOCUMENT_ROW_HEIGHT: f32 = 100.0;

/// Cost multiplier for partitions whose per-line counts shrink downward.
const LADDER_PENALTY: f32 = 1.2;

/// Cost multiplier for partitions containing a degenerately thin line.
const THIN_ROW_PENALTY: f32 = 1.5;

/// Engine configuration: the virtual canvas and the recognized tunables.
///
/// All geometry is computed in virtual units against `width`; the caller
/// scales units to pixels, so varying `width` only changes rounding grain.
/// The defaults match the shipped presentation; like the thresholds in
/// [`crate::aspect`], they are tuned values, not derived ones.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Canvas {
    /// Base grid unit scale (virtual canvas width).
    pub width: i32,
    /// Threshold below which a candidate row height reads as degenerate,
    /// and the narrowest a template column may be squeezed.
    pub min_row_width: i32,
    /// Units reserved beside incoming rows for the sender's avatar glyph.
    pub avatar_reserve: i32,
    /// Units surrendered to the forward/share affordance.
    pub share_margin: i32,
}

impl Canvas {
    /// The shipped configuration.
    pub const DEFAULT: Self = Self {
        width: CANVAS_WIDTH,
        min_row_width: 120,
        avatar_reserve: 108,
        share_margin: 50,
    };

    /// Same as [`Canvas::DEFAULT`].
    pub const fn new() -> Self {
        Self::DEFAULT
    }

    /// Set the virtual canvas width.
    pub const fn width(mut self, width: i32) -> Self {
        self.width = width;
        self
    }

    /// Set the degenerate-row / minimum-column threshold.
    pub const fn min_row_width(mut self, min_row_width: i32) -> Self {
        self.min_row_width = min_row_width;
        self
    }

    /// Set the avatar reservation width.
    pub const fn avatar_reserve(mut self, avatar_reserve: i32) -> Self {
        self.avatar_reserve = avatar_reserve;
        self
    }

    /// Set the share-affordance margin.
    pub const fn share_margin(mut self, share_margin: i32) -> Self {
        self.share_margin = share_margin;
        self
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Where one item of a group sits in the computed grid.
///
/// One record per input item, in input order. Widths are virtual-canvas
/// units; heights are fractions of [`CANVAS_HEIGHT`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutPosition {
    /// First grid column this cell occupies (inclusive).
    pub col_min: u8,
    /// Last grid column this cell occupies (inclusive).
    pub col_max: u8,
    /// First grid row this cell occupies (inclusive).
    pub row_min: u8,
    /// Last grid row this cell occupies (inclusive).
    pub row_max: u8,
    /// Cell width in virtual-canvas units.
    pub width_units: i32,
    /// Cell height as a fraction of [`CANVAS_HEIGHT`]. Document rows carry
    /// a fixed pseudo-height in units here instead.
    pub height_fraction: f32,
    /// The ratio actually used to size the cell: the cropped ratio on the
    /// searched path, 1.0 for document rows, the raw ratio otherwise.
    pub aspect_ratio: f32,
    /// Which outer edges of the whole group this cell touches.
    pub borders: Borders,
    /// Columns consumed in the caller's span grid; [`FULL_ROW_SPAN`] means
    /// the whole row.
    pub span_size: i32,
    /// Span columns consumed by a column-spanning sibling to the left of
    /// this cell's row, or 0.
    pub left_span_offset: i32,
    /// Whether this cell sits on the side that absorbs reserved space.
    pub is_edge: bool,
    /// Whether this is the chronologically last item of the group.
    pub is_last: bool,
    /// Heights (canvas fractions, top to bottom) of the cells stacked
    /// beside this one. Populated only on the tall cell of a composite
    /// arrangement; empty otherwise.
    pub sibling_heights: Vec<f32>,
}

impl LayoutPosition {
    fn cell(
        cols: (u8, u8),
        rows: (u8, u8),
        width: i32,
        height: f32,
        borders: Borders,
        aspect: f32,
    ) -> Self {
        Self {
            col_min: cols.0,
            col_max: cols.1,
            row_min: rows.0,
            row_max: rows.1,
            width_units: width,
            height_fraction: height,
            aspect_ratio: aspect,
            borders,
            span_size: width,
            left_span_offset: 0,
            is_edge: false,
            is_last: false,
            sibling_heights: Vec::new(),
        }
    }
}

/// A computed album arrangement: one position per item plus group facts.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupLayout {
    /// One position per input item, in input order. Empty for degenerate
    /// groups (fewer than two items, or an unsatisfiable search).
    pub positions: Vec<LayoutPosition>,
    /// Whether one cell spans rows while shorter siblings stack beside it.
    pub has_sibling: bool,
    /// Highest grid column index used by any row.
    pub max_col: u8,
}

impl GroupLayout {
    /// The empty layout, returned for groups this engine does not arrange.
    pub const fn empty() -> Self {
        Self {
            positions: Vec::new(),
            has_sibling: false,
            max_col: 0,
        }
    }

    /// Number of positioned items.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether no arrangement was produced; callers fall back to stacking
    /// items individually.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Index of the first item whose borders contain all of `flags`.
    pub fn find(&self, flags: Borders) -> Option<usize> {
        self.positions.iter().position(|p| p.borders.contains(flags))
    }

    /// Index of the top-left item, the group's visual anchor.
    pub fn primary(&self) -> Option<usize> {
        self.find(Borders::TOP.with(Borders::LEFT))
    }
}

/// Lay out one album on the default canvas.
///
/// Order- and length-preserving: position `i` belongs to `items[i]`. See
/// [`Canvas::layout`] for the degenerate cases that yield an empty layout.
pub fn layout_group(items: &[MediaItem], ctx: &GroupContext) -> GroupLayout {
    Canvas::DEFAULT.layout(items, ctx)
}

/// Output of one arrangement pass, before post-processing.
struct Draft {
    positions: Vec<LayoutPosition>,
    max_col: u8,
    has_sibling: bool,
}

/// One candidate row partition: per-line item counts and line heights.
struct Attempt {
    counts: Vec<usize>,
    heights: Vec<f32>,
}

/// The height at which `cropped` ratios side by side exactly fill `width`.
fn line_height(cropped: &[f32], width: i32) -> f32 {
    let sum: f32 = cropped.iter().sum();
    width as f32 / sum
}

impl Canvas {
    /// Compute the grid arrangement for `items` under `ctx`.
    ///
    /// Returns one position per item in input order. Groups of fewer than
    /// two items are not albums and yield an empty layout, as does the
    /// configuration-pathological case where no row partition satisfies the
    /// line caps; callers treat an empty layout as "stack items
    /// individually", not as an error.
    pub fn layout(&self, items: &[MediaItem], ctx: &GroupContext) -> GroupLayout {
        let count = items.len();
        if count < 2 {
            return GroupLayout::empty();
        }

        if items.iter().all(|item| !item.kind.is_visual()) {
            return self.finish(self.documents(count), ctx, SPAN_EXTRA);
        }

        let mut ratios = Vec::with_capacity(count);
        for item in items {
            ratios.push(item.aspect_ratio());
        }
        let profile = AspectProfile::measure(&ratios);

        // The share affordance narrows the canvas and widens the reserve.
        let (width, span_extra) = if ctx.needs_share {
            (self.width - self.share_margin, SPAN_EXTRA + self.share_margin)
        } else {
            (self.width, SPAN_EXTRA)
        };

        let draft = if !profile.extreme && (2..=4).contains(&count) {
            match count {
                2 => self.pair(width, &ratios, &profile),
                3 => self.triple(width, &ratios, ctx.outgoing),
                _ => self.quad(width, &ratios, ctx.outgoing),
            }
        } else {
            match self.search(width, &ratios, &profile, ctx.outgoing) {
                Some(draft) => draft,
                None => return GroupLayout::empty(),
            }
        };

        self.finish(draft, ctx, span_extra)
    }

    /// Two items: stacked panoramas, equal halves, or an unequal split.
    fn pair(&self, width: i32, ratios: &[f32], profile: &AspectProfile) -> Draft {
        let (r0, r1) = (ratios[0], ratios[1]);
        let shape = (Proportion::of(r0), Proportion::of(r1));
        let w = width as f32;
        let max_aspect = w / CANVAS_HEIGHT;

        use Proportion::{Square, Wide};

        if shape == (Wide, Wide) && profile.average > 1.4 * max_aspect && r0 - r1 < 0.2 {
            // Two matched panoramas: stack them full width.
            let height =
                (w / r0).min(w / r1).min(CANVAS_HEIGHT / 2.0).round() / CANVAS_HEIGHT;
            let top = LayoutPosition::cell(
                (0, 0),
                (0, 0),
                width,
                height,
                Borders::LEFT | Borders::RIGHT | Borders::TOP,
                r0,
            );
            let bottom = LayoutPosition::cell(
                (0, 0),
                (1, 1),
                width,
                height,
                Borders::LEFT | Borders::RIGHT | Borders::BOTTOM,
                r1,
            );
            Draft {
                positions: vec![top, bottom],
                max_col: 0,
                has_sibling: false,
            }
        } else if shape == (Wide, Wide) || shape == (Square, Square) {
            // Matched proportions: equal halves on one row.
            let half = width / 2;
            let hw = half as f32;
            let height = (hw / r0).min(hw / r1).min(CANVAS_HEIGHT).round() / CANVAS_HEIGHT;
            let left = LayoutPosition::cell(
                (0, 0),
                (0, 0),
                half,
                height,
                Borders::LEFT | Borders::BOTTOM | Borders::TOP,
                r0,
            );
            let right = LayoutPosition::cell(
                (1, 1),
                (0, 0),
                half,
                height,
                Borders::RIGHT | Borders::BOTTOM | Borders::TOP,
                r1,
            );
            Draft {
                positions: vec![left, right],
                max_col: 1,
                has_sibling: false,
            }
        } else {
            // Mixed proportions: ratio-weighted split, clamped so the
            // narrow side keeps a usable width.
            let mut second =
                (0.4 * w).max((w / r0 / (1.0 / r0 + 1.0 / r1)).round()) as i32;
            let mut first = width - second;
            if first < self.min_row_width {
                let diff = self.min_row_width - first;
                first = self.min_row_width;
                second -= diff;
            }
            let height = CANVAS_HEIGHT
                .min((first as f32 / r0).min(second as f32 / r1).round())
                / CANVAS_HEIGHT;
            let left = LayoutPosition::cell(
                (0, 0),
                (0, 0),
                first,
                height,
                Borders::LEFT | Borders::BOTTOM | Borders::TOP,
                r0,
            );
            let right = LayoutPosition::cell(
                (1, 1),
                (0, 0),
                second,
                height,
                Borders::RIGHT | Borders::BOTTOM | Borders::TOP,
                r1,
            );
            Draft {
                positions: vec![left, right],
                max_col: 1,
                has_sibling: false,
            }
        }
    }

    /// Three items: a tall portrait beside two stacked siblings, or a full
    /// width first item over an equal-halves row.
    fn triple(&self, width: i32, ratios: &[f32], outgoing: bool) -> Draft {
        let (r0, r1, r2) = (ratios[0], ratios[1], ratios[2]);
        let w = width as f32;

        if Proportion::of(r0) == Proportion::Narrow {
            // The portrait spans both rows; the leftover row width on each
            // row goes to one sibling.
            let third_h = (CANVAS_HEIGHT * 0.5).min((r1 * w / (r2 + r1)).round());
            let second_h = CANVAS_HEIGHT - third_h;
            let right_w = (self.min_row_width as f32)
                .max((w * 0.5).min((third_h * r2).min(second_h * r1).round()))
                as i32;
            let left_w = (CANVAS_HEIGHT * r0 + EDGE_PADDING as f32)
                .min((width - right_w) as f32)
                .round() as i32;

            let mut tall = LayoutPosition::cell(
                (0, 0),
                (0, 1),
                left_w,
                1.0,
                Borders::LEFT | Borders::BOTTOM | Borders::TOP,
                r0,
            );
            tall.sibling_heights = vec![second_h / CANVAS_HEIGHT, third_h / CANVAS_HEIGHT];
            let mut upper = LayoutPosition::cell(
                (1, 1),
                (0, 0),
                right_w,
                second_h / CANVAS_HEIGHT,
                Borders::RIGHT | Borders::TOP,
                r1,
            );
            let mut lower = LayoutPosition::cell(
                (0, 1),
                (1, 1),
                right_w,
                third_h / CANVAS_HEIGHT,
                Borders::RIGHT | Borders::BOTTOM,
                r2,
            );
            lower.span_size = width;
            if outgoing {
                tall.span_size = width - right_w;
            } else {
                upper.span_size = width - left_w;
                lower.left_span_offset = left_w;
            }
            Draft {
                positions: vec![tall, upper, lower],
                max_col: 1,
                has_sibling: true,
            }
        } else {
            let first_h = (w / r0).min(CANVAS_HEIGHT * 0.66).round() / CANVAS_HEIGHT;
            let top = LayoutPosition::cell(
                (0, 1),
                (0, 0),
                width,
                first_h,
                Borders::LEFT | Borders::RIGHT | Borders::TOP,
                r0,
            );
            let half = width / 2;
            let hw = half as f32;
            let second_h =
                ((hw / r1).min(hw / r2).round() / CANVAS_HEIGHT).max(MIN_HEIGHT_FRAC);
            let left = LayoutPosition::cell(
                (0, 0),
                (1, 1),
                half,
                second_h,
                Borders::LEFT | Borders::BOTTOM,
                r1,
            );
            let right = LayoutPosition::cell(
                (1, 1),
                (1, 1),
                half,
                second_h,
                Borders::RIGHT | Borders::BOTTOM,
                r2,
            );
            Draft {
                positions: vec![top, left, right],
                max_col: 1,
                has_sibling: false,
            }
        }
    }

    /// Four items: a full-width first item over a three-column row, or a
    /// tall first item beside three stacked siblings.
    fn quad(&self, width: i32, ratios: &[f32], outgoing: bool) -> Draft {
        let (r0, r1, r2, r3) = (ratios[0], ratios[1], ratios[2], ratios[3]);
        let w = width as f32;

        if Proportion::of(r0) == Proportion::Wide {
            let h0 = (w / r0).min(CANVAS_HEIGHT * 0.66).round() / CANVAS_HEIGHT;
            let top = LayoutPosition::cell(
                (0, 2),
                (0, 0),
                width,
                h0,
                Borders::LEFT | Borders::RIGHT | Borders::TOP,
                r0,
            );

            let h = (w / (r1 + r2 + r3)).round();
            let mut w0 = (self.min_row_width as f32).max((w * 0.4).min(h * r1)) as i32;
            let mut w2 = (self.min_row_width as f32).max(w * 0.33).max(h * r3) as i32;
            let mut w1 = width - w0 - w2;
            if w1 < MIDDLE_MIN {
                // Steal the shortfall evenly from the outer columns.
                let diff = MIDDLE_MIN - w1;
                w1 = MIDDLE_MIN;
                w0 -= diff / 2;
                w2 -= diff - diff / 2;
            }
            let height = (h / CANVAS_HEIGHT).max(MIN_HEIGHT_FRAC);

            let left = LayoutPosition::cell(
                (0, 0),
                (1, 1),
                w0,
                height,
                Borders::LEFT | Borders::BOTTOM,
                r1,
            );
            let middle =
                LayoutPosition::cell((1, 1), (1, 1), w1, height, Borders::BOTTOM, r2);
            let right = LayoutPosition::cell(
                (2, 2),
                (1, 1),
                w2,
                height,
                Borders::RIGHT | Borders::BOTTOM,
                r3,
            );
            Draft {
                positions: vec![top, left, middle, right],
                max_col: 2,
                has_sibling: false,
            }
        } else {
            let col_w = self
                .min_row_width
                .max((CANVAS_HEIGHT / (1.0 / r1 + 1.0 / r2 + 1.0 / r3)).round() as i32);
            let cw = col_w as f32;
            let h0 = (MIN_STACK_HEIGHT.max(cw / r1) / CANVAS_HEIGHT).min(0.33);
            let h1 = (MIN_STACK_HEIGHT.max(cw / r2) / CANVAS_HEIGHT).min(0.33);
            let h2 = 1.0 - h0 - h1;
            let w0 = (CANVAS_HEIGHT * r0 + EDGE_PADDING as f32)
                .min((width - col_w) as f32)
                .round() as i32;

            let mut tall = LayoutPosition::cell(
                (0, 0),
                (0, 2),
                w0,
                h0 + h1 + h2,
                Borders::LEFT | Borders::TOP | Borders::BOTTOM,
                r0,
            );
            tall.sibling_heights = vec![h0, h1, h2];
            let mut first = LayoutPosition::cell(
                (1, 1),
                (0, 0),
                col_w,
                h0,
                Borders::RIGHT | Borders::TOP,
                r1,
            );
            let mut second =
                LayoutPosition::cell((0, 1), (1, 1), col_w, h1, Borders::RIGHT, r2);
            second.span_size = width;
            let mut third = LayoutPosition::cell(
                (0, 1),
                (2, 2),
                col_w,
                h2,
                Borders::RIGHT | Borders::BOTTOM,
                r3,
            );
            third.span_size = width;
            if outgoing {
                tall.span_size = width - col_w;
            } else {
                first.span_size = width - w0;
                second.left_span_offset = w0;
                third.left_span_offset = w0;
            }
            Draft {
                positions: vec![tall, first, second, third],
                max_col: 1,
                has_sibling: true,
            }
        }
    }

    /// General case: enumerate every legal split of the ordered items into
    /// 1–4 lines, score each for canvas fill, and assign positions from the
    /// winner. Returns `None` when no split satisfies the line caps.
    fn search(
        &self,
        width: i32,
        ratios: &[f32],
        profile: &AspectProfile,
        outgoing: bool,
    ) -> Option<Draft> {
        let count = ratios.len();
        let mut cropped = Vec::with_capacity(count);
        for &ratio in ratios {
            cropped.push(profile.cropped(ratio));
        }

        let second_max = if profile.portrait_heavy() { 4 } else { 3 };
        let mut attempts: Vec<Attempt> = Vec::new();
        let push = |attempts: &mut Vec<Attempt>, counts: Vec<usize>| {
            let mut heights = Vec::with_capacity(counts.len());
            let mut start = 0;
            for &c in &counts {
                heights.push(line_height(&cropped[start..start + c], width));
                start += c;
            }
            attempts.push(Attempt { counts, heights });
        };

        // Single line.
        if count <= 3 {
            push(&mut attempts, vec![count]);
        }
        // Two lines.
        for first in 1..count {
            let second = count - first;
            if first > 3 || second > second_max {
                continue;
            }
            push(&mut attempts, vec![first, second]);
        }
        // Three lines.
        for first in 1..count.saturating_sub(1) {
            for second in 1..count - first {
                let third = count - first - second;
                if first > 3 || second > second_max || third > 3 {
                    continue;
                }
                push(&mut attempts, vec![first, second, third]);
            }
        }
        // Four lines.
        for first in 1..count.saturating_sub(2) {
            for second in 1..count - first {
                for third in 1..count - first - second {
                    let fourth = count - first - second - third;
                    if first > 3 || second > second_max || third > 3 || fourth > 3 {
                        continue;
                    }
                    push(&mut attempts, vec![first, second, third, fourth]);
                }
            }
        }

        // Score: distance from the target total height, penalized for
        // top-heavy ladders and degenerately thin lines. First found wins
        // ties.
        let target = width as f32 * 4.0 / 3.0;
        let mut best: Option<&Attempt> = None;
        let mut best_diff = 0.0f32;
        for attempt in &attempts {
            let mut total = 0.0f32;
            let mut min_line = f32::MAX;
            for &h in &attempt.heights {
                total += h;
                if h < min_line {
                    min_line = h;
                }
            }
            let mut diff = (total - target).abs();
            if attempt.counts.windows(2).any(|pair| pair[0] > pair[1]) {
                diff *= LADDER_PENALTY;
            }
            if min_line < self.min_row_width as f32 {
                diff *= THIN_ROW_PENALTY;
            }
            if best.is_none() || diff < best_diff {
                best = Some(attempt);
                best_diff = diff;
            }
        }
        let best = best?;

        // Assignment: walk lines top to bottom, items left to right. The
        // row's designated edge cell absorbs the rounding residue so each
        // line sums to the canvas width exactly.
        let mut positions: Vec<LayoutPosition> = Vec::with_capacity(count);
        let mut max_col = 0u8;
        let mut index = 0usize;
        let lines = best.counts.len();
        for (line, &line_count) in best.counts.iter().enumerate() {
            let height = best.heights[line];
            let mut span_left = width;
            max_col = max_col.max((line_count - 1) as u8);
            for k in 0..line_count {
                let ratio = cropped[index];
                let cell_w = (ratio * height).round() as i32;
                span_left -= cell_w;
                let mut borders = Borders::NONE;
                if line == 0 {
                    borders |= Borders::TOP;
                }
                if line == lines - 1 {
                    borders |= Borders::BOTTOM;
                }
                if k == 0 {
                    borders |= Borders::LEFT;
                }
                if k == line_count - 1 {
                    borders |= Borders::RIGHT;
                }
                positions.push(LayoutPosition::cell(
                    (k as u8, k as u8),
                    (line as u8, line as u8),
                    cell_w,
                    (height / CANVAS_HEIGHT).max(MIN_HEIGHT_FRAC),
                    borders,
                    ratio,
                ));
                index += 1;
            }
            let fix = if outgoing {
                positions.len() - line_count
            } else {
                positions.len() - 1
            };
            positions[fix].width_units += span_left;
            positions[fix].span_size += span_left;
            debug_assert_eq!(
                positions[positions.len() - line_count..]
                    .iter()
                    .map(|p| p.width_units)
                    .sum::<i32>(),
                width,
            );
        }

        Some(Draft {
            positions,
            max_col,
            has_sibling: false,
        })
    }

    /// Every item is a file or audio attachment: one full-width row per
    /// item, no grid geometry.
    fn documents(&self, count: usize) -> Draft {
        debug_assert!(count <= 1 + u8::MAX as usize);
        let mut positions = Vec::with_capacity(count);
        for index in 0..count {
            let mut borders = Borders::LEFT | Borders::RIGHT;
            if index == 0 {
                borders |= Borders::TOP;
            }
            if index == count - 1 {
                borders |= Borders::BOTTOM;
            }
            let mut pos = LayoutPosition::cell(
                (0, 0),
                (index as u8, index as u8),
                self.width,
                DOCUMENT_ROW_HEIGHT,
                borders,
                1.0,
            );
            pos.span_size = FULL_ROW_SPAN;
            pos.is_edge = true;
            positions.push(pos);
        }
        Draft {
            positions,
            max_col: 0,
            has_sibling: false,
        }
    }

    /// Post-processing applied uniformly to every arrangement: stamp the
    /// last item, grant the span reserve to each row's edge cell, and
    /// reserve avatar width on incoming groups. Full-row sentinel spans are
    /// never rewritten.
    fn finish(&self, mut draft: Draft, ctx: &GroupContext, span_extra: i32) -> GroupLayout {
        if let Some(last) = draft.positions.last_mut() {
            last.is_last = true;
        }
        let max_col = draft.max_col;
        for pos in &mut draft.positions {
            if ctx.outgoing {
                if pos.col_min == 0 && pos.span_size != FULL_ROW_SPAN {
                    pos.span_size += span_extra;
                }
                if pos.borders.contains(Borders::RIGHT) {
                    pos.is_edge = true;
                }
            } else {
                if (pos.col_max == max_col || pos.borders.contains(Borders::RIGHT))
                    && pos.span_size != FULL_ROW_SPAN
                {
                    pos.span_size += span_extra;
                }
                if pos.borders.contains(Borders::LEFT) {
                    pos.is_edge = true;
                }
            }

            if !ctx.outgoing && ctx.needs_avatar {
                if pos.is_edge {
                    if pos.span_size != FULL_ROW_SPAN {
                        pos.span_size += self.avatar_reserve;
                    }
                    pos.width_units += self.avatar_reserve;
                } else if pos.borders.contains(Borders::RIGHT) {
                    // The avatar column is shared across the row, not owned
                    // by this cell.
                    if pos.span_size != FULL_ROW_SPAN {
                        pos.span_size -= self.avatar_reserve;
                    } else if pos.left_span_offset != 0 {
                        pos.left_span_offset += self.avatar_reserve;
                    }
                }
            }

            debug_assert!(pos.width_units > 0);
            debug_assert!(pos.height_fraction > 0.0);
            debug_assert!(pos.col_max >= pos.col_min && pos.row_max >= pos.row_min);
        }
        GroupLayout {
            positions: draft.positions,
            has_sibling: draft.has_sibling,
            max_col,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaKind;

    fn item(ratio: f32) -> MediaItem {
        MediaItem::new((ratio * 1000.0).round() as u32, 1000)
    }

    fn photos(ratios: &[f32]) -> Vec<MediaItem> {
        ratios.iter().map(|&r| item(r)).collect()
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    // ── pairs ───────────────────────────────────────────────────────────

    #[test]
    fn matched_panoramas_stack() {
        let layout = layout_group(&photos(&[1.9, 1.9]), &GroupContext::incoming());
        let [top, bottom] = &layout.positions[..] else {
            panic!("expected two positions");
        };
        assert_eq!(top.width_units, 800);
        assert_eq!(bottom.width_units, 800);
        // Capped at half the canvas height.
        assert_eq!(top.height_fraction, 0.5);
        assert_eq!(bottom.height_fraction, 0.5);
        assert_eq!(top.borders, Borders::LEFT | Borders::RIGHT | Borders::TOP);
        assert_eq!(
            bottom.borders,
            Borders::LEFT | Borders::RIGHT | Borders::BOTTOM
        );
        assert_eq!(layout.max_col, 0);
        assert!(bottom.is_last && !top.is_last);
    }

    #[test]
    fn matched_squares_share_a_row() {
        let layout = layout_group(&photos(&[1.0, 1.0]), &GroupContext::incoming());
        let [left, right] = &layout.positions[..] else {
            panic!("expected two positions");
        };
        assert_eq!(left.width_units, 400);
        assert_eq!(right.width_units, 400);
        assert!(close(left.height_fraction, 400.0 / CANVAS_HEIGHT));
        assert_eq!(left.height_fraction, right.height_fraction);
        assert_eq!(
            left.borders,
            Borders::LEFT | Borders::TOP | Borders::BOTTOM
        );
        assert_eq!(
            right.borders,
            Borders::RIGHT | Borders::TOP | Borders::BOTTOM
        );
        // Incoming: trailing cell carries the span reserve, leading cell is
        // the avatar edge.
        assert_eq!(left.span_size, 400);
        assert_eq!(right.span_size, 600);
        assert!(left.is_edge && !right.is_edge);
    }

    #[test]
    fn mixed_pair_splits_unevenly() {
        let layout = layout_group(&photos(&[2.0, 0.5]), &GroupContext::incoming());
        let [left, right] = &layout.positions[..] else {
            panic!("expected two positions");
        };
        // The wide item keeps 60%, the narrow one gets the ratio-weighted
        // share floored at 40% of the canvas.
        assert_eq!(left.width_units, 480);
        assert_eq!(right.width_units, 320);
        assert!(close(left.height_fraction, 240.0 / CANVAS_HEIGHT));
    }

    #[test]
    fn mixed_pair_clamps_first_width() {
        let layout = layout_group(&photos(&[0.15, 2.0]), &GroupContext::incoming());
        assert_eq!(layout.positions[0].width_units, 120);
        assert_eq!(layout.positions[1].width_units, 680);
    }

    #[test]
    fn share_affordance_narrows_canvas() {
        let ctx = GroupContext::incoming().needs_share(true);
        let layout = layout_group(&photos(&[1.0, 1.0]), &ctx);
        assert_eq!(layout.positions[0].width_units, 375);
        assert_eq!(layout.positions[1].width_units, 375);
        // The span reserve widens by the share margin.
        assert_eq!(layout.positions[1].span_size, 375 + 250);
    }

    // ── triples ─────────────────────────────────────────────────────────

    #[test]
    fn portrait_first_builds_sibling_column() {
        let layout = layout_group(&photos(&[0.5, 1.0, 1.0]), &GroupContext::incoming());
        assert!(layout.has_sibling);
        assert_eq!(layout.max_col, 1);
        let [tall, upper, lower] = &layout.positions[..] else {
            panic!("expected three positions");
        };

        assert_eq!((tall.row_min, tall.row_max), (0, 1));
        assert_eq!(tall.width_units, 400);
        assert_eq!(tall.height_fraction, 1.0);
        assert_eq!(tall.sibling_heights.len(), 2);
        let sum: f32 = tall.sibling_heights.iter().sum();
        assert!(close(sum, 1.0));
        assert!(close(tall.sibling_heights[0], 414.0 / CANVAS_HEIGHT));
        assert!(close(tall.sibling_heights[1], 400.0 / CANVAS_HEIGHT));

        assert_eq!((upper.col_min, upper.col_max), (1, 1));
        assert_eq!(upper.width_units, 400);
        assert!(close(upper.height_fraction, 414.0 / CANVAS_HEIGHT));
        // Incoming: the sibling rows account for the tall column in span
        // units.
        assert_eq!(upper.span_size, 400 + 200);
        assert_eq!(lower.span_size, 1000);
        assert_eq!(lower.left_span_offset, 400);
        assert!(tall.is_edge);
    }

    #[test]
    fn portrait_first_outgoing_spans() {
        let layout = layout_group(&photos(&[0.5, 1.0, 1.0]), &GroupContext::outgoing());
        let [tall, upper, lower] = &layout.positions[..] else {
            panic!("expected three positions");
        };
        // Outgoing: the tall column owns the leftover span itself.
        assert_eq!(tall.span_size, 400 + 200);
        assert_eq!(upper.span_size, 400);
        assert_eq!(lower.left_span_offset, 0);
        assert!(upper.is_edge && lower.is_edge && !tall.is_edge);
    }

    #[test]
    fn landscape_first_takes_top_row() {
        let layout = layout_group(&photos(&[1.0, 1.0, 1.0]), &GroupContext::incoming());
        let [top, left, right] = &layout.positions[..] else {
            panic!("expected three positions");
        };
        assert_eq!(top.width_units, 800);
        assert_eq!((top.col_min, top.col_max), (0, 1));
        assert!(close(top.height_fraction, 537.0 / CANVAS_HEIGHT));
        assert_eq!(left.width_units, 400);
        assert_eq!(right.width_units, 400);
        assert!(close(left.height_fraction, 400.0 / CANVAS_HEIGHT));
        assert!(!layout.has_sibling);
    }

    // ── quads ───────────────────────────────────────────────────────────

    #[test]
    fn wide_first_over_three_columns() {
        let layout =
            layout_group(&photos(&[1.5, 1.0, 1.0, 1.0]), &GroupContext::incoming());
        assert_eq!(layout.max_col, 2);
        let [top, left, middle, right] = &layout.positions[..] else {
            panic!("expected four positions");
        };
        assert_eq!(top.width_units, 800);
        assert_eq!((top.col_min, top.col_max), (0, 2));
        assert!(close(top.height_fraction, 533.0 / CANVAS_HEIGHT));
        assert_eq!(left.width_units + middle.width_units + right.width_units, 800);
        assert_eq!(left.width_units, 267);
        assert_eq!(middle.width_units, 266);
        assert_eq!(right.width_units, 267);
        assert_eq!(middle.borders, Borders::BOTTOM);
    }

    #[test]
    fn tall_first_beside_three_siblings() {
        let layout =
            layout_group(&photos(&[1.0, 1.0, 1.0, 1.0]), &GroupContext::incoming());
        assert!(layout.has_sibling);
        let [tall, first, second, third] = &layout.positions[..] else {
            panic!("expected four positions");
        };
        assert_eq!((tall.row_min, tall.row_max), (0, 2));
        assert_eq!(tall.width_units, 529);
        assert_eq!(tall.sibling_heights.len(), 3);
        let sum: f32 = tall.sibling_heights.iter().sum();
        assert!(close(sum, 1.0));
        assert!(close(tall.sibling_heights[0], 0.33));
        assert!(close(tall.sibling_heights[2], 0.34));
        assert_eq!(first.width_units, 271);
        assert_eq!(first.span_size, 800 - 529 + 200);
        assert_eq!(second.span_size, 1000);
        assert_eq!(second.left_span_offset, 529);
        assert_eq!(third.left_span_offset, 529);
        assert!(close(second.height_fraction, 0.33));
        assert!(close(third.height_fraction, 0.34));
    }

    // ── partition search ────────────────────────────────────────────────

    #[test]
    fn five_squares_split_two_three() {
        let layout =
            layout_group(&photos(&[1.0, 1.0, 1.0, 1.0, 1.0]), &GroupContext::incoming());
        assert_eq!(layout.len(), 5);
        let rows: Vec<u8> = layout.positions.iter().map(|p| p.row_min).collect();
        assert_eq!(rows, [0, 0, 1, 1, 1]);
        let widths: Vec<i32> = layout.positions.iter().map(|p| p.width_units).collect();
        assert_eq!(widths, [400, 400, 267, 267, 266]);
        // Rounding residue lands on the trailing cell of each row.
        assert_eq!(widths[2..].iter().sum::<i32>(), 800);
        assert_eq!(layout.positions[1].span_size, 600);
        assert_eq!(layout.positions[4].span_size, 466);
    }

    #[test]
    fn forced_pair_of_panoramas_stacks_via_search() {
        let layout = layout_group(&photos(&[2.5, 2.5]), &GroupContext::incoming());
        let [top, bottom] = &layout.positions[..] else {
            panic!("expected two positions");
        };
        assert_eq!(top.width_units, 800);
        assert_eq!(bottom.width_units, 800);
        // Sized with the cropped ratio, and reported as such.
        assert_eq!(top.aspect_ratio, 1.7);
        assert!(close(top.height_fraction, (800.0 / 1.7) / CANVAS_HEIGHT));
        assert_eq!(top.borders, Borders::LEFT | Borders::RIGHT | Borders::TOP);
        assert_eq!(
            bottom.borders,
            Borders::LEFT | Borders::RIGHT | Borders::BOTTOM
        );
    }

    #[test]
    fn extreme_quad_skips_the_template() {
        let searched = layout_group(&photos(&[2.5, 1.0, 1.0, 1.0]), &GroupContext::incoming());
        let template = layout_group(&photos(&[1.8, 1.0, 1.0, 1.0]), &GroupContext::incoming());
        // The template gives the wide first item the whole top row; the
        // search keeps it a single cell.
        assert_eq!(template.positions[0].col_max, 2);
        assert_eq!(searched.positions[0].col_max, 0);
        assert_eq!(searched.len(), 4);
        assert_eq!(searched.positions[3].row_min, 1);
        assert_eq!(
            searched.positions[3].borders,
            Borders::LEFT | Borders::RIGHT | Borders::BOTTOM
        );
    }

    #[test]
    fn portrait_heavy_group_packs_four_in_second_line() {
        let layout = layout_group(&photos(&[0.5; 13]), &GroupContext::incoming());
        assert_eq!(layout.len(), 13);
        let second_line = layout.positions.iter().filter(|p| p.row_min == 1).count();
        assert_eq!(second_line, 4);
    }

    #[test]
    fn oversized_group_yields_empty() {
        let layout = layout_group(&photos(&[1.0; 14]), &GroupContext::incoming());
        assert!(layout.is_empty());
    }

    // ── documents bypass ────────────────────────────────────────────────

    #[test]
    fn documents_become_full_width_rows() {
        let items = [
            MediaItem::document(),
            MediaItem::audio(),
            MediaItem::document(),
        ];
        let layout = layout_group(&items, &GroupContext::incoming());
        assert_eq!(layout.len(), 3);
        for (index, pos) in layout.positions.iter().enumerate() {
            assert_eq!(pos.span_size, FULL_ROW_SPAN);
            assert_eq!(pos.width_units, 800);
            assert_eq!(pos.height_fraction, 100.0);
            assert_eq!(pos.aspect_ratio, 1.0);
            assert!(pos.is_edge);
            assert_eq!((pos.row_min, pos.row_max), (index as u8, index as u8));
            assert!(pos.borders.contains(Borders::LEFT | Borders::RIGHT));
            assert_eq!(pos.borders.contains(Borders::TOP), index == 0);
            assert_eq!(pos.borders.contains(Borders::BOTTOM), index == 2);
        }
        assert!(layout.positions[2].is_last);
    }

    #[test]
    fn documents_keep_sentinel_under_avatar() {
        let items = [MediaItem::document(), MediaItem::document()];
        let ctx = GroupContext::incoming().needs_avatar(true);
        let layout = layout_group(&items, &ctx);
        for pos in &layout.positions {
            // The sentinel span never changes; only the width grows.
            assert_eq!(pos.span_size, FULL_ROW_SPAN);
            assert_eq!(pos.width_units, 800 + 108);
        }
    }

    #[test]
    fn one_visual_item_disables_the_bypass() {
        let items = [MediaItem::new(1000, 1000), MediaItem::document()];
        let layout = layout_group(&items, &GroupContext::incoming());
        assert_ne!(layout.positions[0].span_size, FULL_ROW_SPAN);
        assert_eq!(layout.positions[0].width_units, 400);
        assert_eq!(items[1].kind, MediaKind::Document);
    }

    // ── post-processing ─────────────────────────────────────────────────

    #[test]
    fn outgoing_reserve_goes_to_the_leading_cell() {
        let layout = layout_group(&photos(&[1.0, 1.0]), &GroupContext::outgoing());
        let [left, right] = &layout.positions[..] else {
            panic!("expected two positions");
        };
        assert_eq!(left.span_size, 600);
        assert_eq!(right.span_size, 400);
        assert!(!left.is_edge && right.is_edge);
    }

    #[test]
    fn avatar_reservation_widens_edge_and_narrows_trailing_span() {
        let ctx = GroupContext::incoming().needs_avatar(true);
        let layout = layout_group(&photos(&[1.0, 1.0]), &ctx);
        let [left, right] = &layout.positions[..] else {
            panic!("expected two positions");
        };
        assert_eq!(left.width_units, 400 + 108);
        assert_eq!(left.span_size, 400 + 108);
        assert_eq!(right.width_units, 400);
        assert_eq!(right.span_size, 600 - 108);
    }

    #[test]
    fn avatar_reservation_shifts_sibling_offsets() {
        let ctx = GroupContext::incoming().needs_avatar(true);
        let layout = layout_group(&photos(&[1.0, 1.0, 1.0, 1.0]), &ctx);
        let [tall, first, second, third] = &layout.positions[..] else {
            panic!("expected four positions");
        };
        assert_eq!(tall.width_units, 529 + 108);
        assert_eq!(tall.span_size, 529 + 108);
        assert_eq!(first.span_size, 471 - 108);
        // Sentinel rows shift their offset instead of shrinking the span.
        assert_eq!(second.span_size, FULL_ROW_SPAN);
        assert_eq!(second.left_span_offset, 529 + 108);
        assert_eq!(third.left_span_offset, 529 + 108);
    }

    // ── degenerate input ────────────────────────────────────────────────

    #[test]
    fn fewer_than_two_items_is_not_a_group() {
        assert!(layout_group(&[], &GroupContext::incoming()).is_empty());
        let one = [MediaItem::new(1000, 1000)];
        assert!(layout_group(&one, &GroupContext::incoming()).is_empty());
    }

    #[test]
    fn unknown_dimensions_read_as_square() {
        let items = [MediaItem::new(0, 0), MediaItem::new(1000, 1000)];
        let layout = layout_group(&items, &GroupContext::incoming());
        // Both classify square, so the pair shares a row in equal halves.
        assert_eq!(layout.positions[0].width_units, 400);
        assert_eq!(layout.positions[1].width_units, 400);
    }

    #[test]
    fn layout_is_deterministic() {
        let items = photos(&[0.9, 1.4, 1.0, 0.7, 1.1, 1.0]);
        let ctx = GroupContext::incoming().needs_avatar(true);
        assert_eq!(layout_group(&items, &ctx), layout_group(&items, &ctx));
    }

    // ── lookups and configuration ───────────────────────────────────────

    #[test]
    fn primary_is_the_top_left_cell() {
        let layout =
            layout_group(&photos(&[1.0, 1.0, 1.0, 1.0, 1.0]), &GroupContext::incoming());
        assert_eq!(layout.primary(), Some(0));
        assert_eq!(layout.find(Borders::BOTTOM | Borders::RIGHT), Some(4));
        assert_eq!(layout.find(Borders::ALL), None);
        assert_eq!(GroupLayout::empty().primary(), None);
    }

    #[test]
    fn canvas_width_scales_the_grid() {
        let canvas = Canvas::new().width(400);
        let layout = canvas.layout(&photos(&[1.0, 1.0]), &GroupContext::incoming());
        assert_eq!(layout.positions[0].width_units, 200);
        assert_eq!(layout.positions[1].width_units, 200);
    }
}
