//! Input vocabulary: media items and the per-group context flags.

/// What kind of attachment an item is.
///
/// Only the visual kinds participate in grid geometry; a group made
/// entirely of documents or audio bypasses the grid and renders one
/// full-width row per item.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MediaKind {
    /// A photo thumbnail.
    #[default]
    Photo,
    /// A video thumbnail.
    Video,
    /// A generic file attachment; no visual dimensions.
    Document,
    /// A music/voice attachment; no visual dimensions.
    Audio,
}

impl MediaKind {
    /// Whether this kind carries an image the grid can size.
    pub const fn is_visual(self) -> bool {
        matches!(self, Self::Photo | Self::Video)
    }
}

/// One member of an album, as supplied by the caller.
///
/// Dimensions come from the caller's media-metadata subsystem (closest
/// thumbnail size, post-rotation). The engine never fetches or decodes
/// anything; it only reads the ratio.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MediaItem {
    /// Source width in pixels. Zero means unknown.
    pub width: u32,
    /// Source height in pixels. Zero means unknown.
    pub height: u32,
    /// Attachment kind.
    pub kind: MediaKind,
}

impl MediaItem {
    /// A photo with the given dimensions.
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            kind: MediaKind::Photo,
        }
    }

    /// A video with the given dimensions.
    pub const fn video(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            kind: MediaKind::Video,
        }
    }

    /// A file attachment.
    pub const fn document() -> Self {
        Self {
            width: 0,
            height: 0,
            kind: MediaKind::Document,
        }
    }

    /// A music or voice attachment.
    pub const fn audio() -> Self {
        Self {
            width: 0,
            height: 0,
            kind: MediaKind::Audio,
        }
    }

    /// Width over height. Unknown or degenerate dimensions fall back to the
    /// neutral 1.0 rather than producing a NaN or infinity.
    pub fn aspect_ratio(&self) -> f32 {
        if self.width == 0 || self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Per-group flags that shape the arrangement.
///
/// ```
/// use zenmosaic::GroupContext;
///
/// let ctx = GroupContext::incoming().needs_avatar(true);
/// assert!(!ctx.outgoing);
/// assert!(ctx.needs_avatar);
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupContext {
    /// The group was authored by the local user. Outgoing groups absorb
    /// rounding and reserved space on their leading edge, incoming ones on
    /// their trailing edge.
    pub outgoing: bool,
    /// A forward/share affordance sits beside the group and the canvas
    /// shrinks to make room for it.
    pub needs_share: bool,
    /// The sender shows an avatar glyph beside incoming rows; edge cells
    /// reserve width for it.
    pub needs_avatar: bool,
    /// At least one member carries a caption. Captions never affect the
    /// grid geometry; the flag travels with the group so renderers can pad
    /// the final row.
    pub has_caption: bool,
}

impl GroupContext {
    /// A group received from someone else.
    pub const fn incoming() -> Self {
        Self {
            outgoing: false,
            needs_share: false,
            needs_avatar: false,
            has_caption: false,
        }
    }

    /// A group authored by the local user.
    pub const fn outgoing() -> Self {
        Self {
            outgoing: true,
            needs_share: false,
            needs_avatar: false,
            has_caption: false,
        }
    }

    /// Set the share-affordance flag.
    pub const fn needs_share(mut self, needs_share: bool) -> Self {
        self.needs_share = needs_share;
        self
    }

    /// Set the avatar-reservation flag.
    pub const fn needs_avatar(mut self, needs_avatar: bool) -> Self {
        self.needs_avatar = needs_avatar;
        self
    }

    /// Set the caption flag.
    pub const fn has_caption(mut self, has_caption: bool) -> Self {
        self.has_caption = has_caption;
        self
    }
}
