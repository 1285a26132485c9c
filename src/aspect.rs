//! Proportion classes and the cropped ratios used by the partition search.
//!
//! A group's arrangement is chosen from the coarse shape of its members
//! (wide, square, or narrow) and from the group's mean aspect ratio. The
//! thresholds here are tuned presentation parameters carried over from the
//! shipped layouts; they have no analytic derivation.

/// Ratio above which an item reads as wide.
pub const WIDE_MIN: f32 = 1.2;

/// Ratio below which an item reads as narrow (portrait).
pub const NARROW_MAX: f32 = 0.8;

/// Any item beyond this ratio is an extreme panorama. Groups containing one
/// skip the fixed 2/3/4-item arrangements and go through the general search,
/// which crops ratios into a range the row math stays stable in.
pub const EXTREME_RATIO: f32 = 2.0;

/// Mean group ratio above which search cropping biases items landscape;
/// below it, portrait.
pub const LANDSCAPE_BIAS: f32 = 1.1;

/// Mean group ratio below which the group counts as portrait-heavy and the
/// search may pack four items into the second line.
pub const PORTRAIT_HEAVY: f32 = 0.85;

/// Lower clamp for cropped ratios.
pub const CROP_MIN: f32 = 0.66667;

/// Upper clamp for cropped ratios.
pub const CROP_MAX: f32 = 1.7;

/// Coarse shape class of a single item.
///
/// Selects among the fixed arrangements for groups of two, three, and four;
/// the general search never looks at it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Proportion {
    /// Ratio above [`WIDE_MIN`].
    Wide,
    /// Ratio in `[NARROW_MAX, WIDE_MIN]`.
    Square,
    /// Ratio below [`NARROW_MAX`].
    Narrow,
}

impl Proportion {
    /// Classify an aspect ratio.
    ///
    /// ```
    /// use zenmosaic::Proportion;
    ///
    /// assert_eq!(Proportion::of(1.5), Proportion::Wide);
    /// assert_eq!(Proportion::of(1.0), Proportion::Square);
    /// assert_eq!(Proportion::of(0.5), Proportion::Narrow);
    /// ```
    pub fn of(ratio: f32) -> Self {
        if ratio > WIDE_MIN {
            Self::Wide
        } else if ratio < NARROW_MAX {
            Self::Narrow
        } else {
            Self::Square
        }
    }
}

/// Group-level aspect summary, measured once per layout call.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AspectProfile {
    /// Mean of the members' aspect ratios.
    pub average: f32,
    /// Whether any member exceeds [`EXTREME_RATIO`].
    pub extreme: bool,
}

impl AspectProfile {
    /// Measure a group's ratios. An empty slice yields a neutral profile.
    pub fn measure(ratios: &[f32]) -> Self {
        if ratios.is_empty() {
            return Self {
                average: 1.0,
                extreme: false,
            };
        }
        let mut sum = 0.0;
        let mut extreme = false;
        for &ratio in ratios {
            sum += ratio;
            if ratio > EXTREME_RATIO {
                extreme = true;
            }
        }
        Self {
            average: sum / ratios.len() as f32,
            extreme,
        }
    }

    /// Whether the group skews portrait enough for the wider second line.
    pub fn portrait_heavy(&self) -> bool {
        self.average < PORTRAIT_HEAVY
    }

    /// Bias `ratio` toward the group's dominant orientation, then clamp to
    /// `[CROP_MIN, CROP_MAX]`.
    ///
    /// Row heights in the search are `width / Σ ratios`, so one extreme
    /// member would otherwise collapse or explode its whole line. Cropped
    /// ratios are used for sizing only; the renderer still crops the actual
    /// media to the cell.
    pub fn cropped(&self, ratio: f32) -> f32 {
        let biased = if self.average > LANDSCAPE_BIAS {
            ratio.max(1.0)
        } else {
            ratio.min(1.0)
        };
        biased.clamp(CROP_MIN, CROP_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Proportion ──────────────────────────────────────────────────────

    #[test]
    fn boundaries_are_square() {
        assert_eq!(Proportion::of(WIDE_MIN), Proportion::Square);
        assert_eq!(Proportion::of(NARROW_MAX), Proportion::Square);
    }

    #[test]
    fn just_past_boundaries() {
        assert_eq!(Proportion::of(1.21), Proportion::Wide);
        assert_eq!(Proportion::of(0.79), Proportion::Narrow);
    }

    // ── AspectProfile ───────────────────────────────────────────────────

    #[test]
    fn measure_mean() {
        let p = AspectProfile::measure(&[0.5, 1.0, 1.5]);
        assert!((p.average - 1.0).abs() < 1e-6);
        assert!(!p.extreme);
    }

    #[test]
    fn measure_flags_panorama() {
        let p = AspectProfile::measure(&[1.0, 2.5]);
        assert!(p.extreme);
        // Exactly at the threshold is not extreme.
        let p = AspectProfile::measure(&[1.0, EXTREME_RATIO]);
        assert!(!p.extreme);
    }

    #[test]
    fn measure_empty_is_neutral() {
        let p = AspectProfile::measure(&[]);
        assert_eq!(p.average, 1.0);
        assert!(!p.extreme);
    }

    #[test]
    fn portrait_heavy_threshold() {
        assert!(AspectProfile::measure(&[0.8, 0.8]).portrait_heavy());
        assert!(!AspectProfile::measure(&[1.0, 1.0]).portrait_heavy());
    }

    // ── cropped ─────────────────────────────────────────────────────────

    #[test]
    fn cropped_biases_landscape_group_up() {
        let p = AspectProfile::measure(&[1.5, 1.5, 0.9]);
        // 0.9 rides up to 1.0 in a landscape-dominant group.
        assert_eq!(p.cropped(0.9), 1.0);
        assert_eq!(p.cropped(1.5), 1.5);
    }

    #[test]
    fn cropped_biases_portrait_group_down() {
        let p = AspectProfile::measure(&[0.7, 0.8, 1.4]);
        // 1.4 drops to 1.0 in a portrait-dominant group.
        assert_eq!(p.cropped(1.4), 1.0);
        assert_eq!(p.cropped(0.7), 0.7);
    }

    #[test]
    fn cropped_clamps_extremes() {
        let landscape = AspectProfile::measure(&[2.5, 2.5]);
        assert_eq!(landscape.cropped(2.5), CROP_MAX);
        let portrait = AspectProfile::measure(&[0.3, 0.4]);
        assert_eq!(portrait.cropped(0.3), CROP_MIN);
    }
}
