// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typewriter text for the plant window.
//!
//! Each visible string is drawn three times: a dark drop shadow for
//! readability, a white haze, then a crisp pass. A blinking `_` cursor
//! follows the revealed text and keeps blinking once the line is complete.

use alloc::string::String;

use kurbo::{Point, Vec2};
use portal_core::config::TextConfig;
use portal_core::flicker::{cursor_visible, dying_bulb};
use portal_core::script::{TextCue, TextStage};
use portal_core::surface::SurfaceSize;
use rand::Rng;

use crate::plan::{Color, RenderItem, RenderPlan, Shadow, TextItem};

/// Cursor glyph.
pub const CURSOR: &str = "_";

/// Maps typing progress through the optional mid-line stall.
///
/// With `pause_at_half`, progress in `(0.45, 0.55)` holds at 0.45 and the
/// rest is compressed so typing still completes at 1.
#[must_use]
pub fn remap_progress(progress: f64, pause_at_half: bool) -> f64 {
    if !pause_at_half || progress <= 0.45 {
        progress
    } else if progress < 0.55 {
        0.45
    } else {
        (progress - 0.1) / 0.9
    }
}

/// Number of characters of a `len`-character line shown at `progress`.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    reason = "progress is clamped to [0, 1], so the product is in [0, len]"
)]
pub fn revealed_chars(progress: f64, len: usize) -> usize {
    let total = len as f64;
    (libm::floor(progress.clamp(0.0, 1.0) * total) as usize).min(len)
}

/// Prefix of `line` holding its first `n` characters.
#[must_use]
pub fn char_prefix(line: &str, n: usize) -> &str {
    match line.char_indices().nth(n) {
        Some((idx, _)) => &line[..idx],
        None => line,
    }
}

/// Estimated rendered width of `chars` monospace characters.
#[must_use]
pub fn text_width(config: &TextConfig, font_px: f64, chars: usize) -> f64 {
    config.advance_em * font_px * chars as f64
}

/// Appends the active line (and cursor) for `cue`.
///
/// Returns the number of characters revealed.
pub fn render<R: Rng + ?Sized>(
    cue: TextCue,
    now_ms: f64,
    config: &TextConfig,
    surface: &SurfaceSize,
    rng: &mut R,
    plan: &mut RenderPlan,
) -> usize {
    let Some(line) = config.lines.get(cue.line).copied() else {
        return 0;
    };
    let len = line.chars().count();
    let (shown, alpha) = match cue.stage {
        TextStage::Typing {
            progress,
            pause_at_half,
        } => (revealed_chars(remap_progress(progress, pause_at_half), len), 1.0),
        TextStage::Holding { dying } => (len, if dying { dying_bulb(rng) } else { 1.0 }),
    };

    let s = surface.size();
    let font_px = config.font_px(surface.min_side());
    let center = Point::new(s.width / 2.0, s.height * config.center_y);

    let text = char_prefix(line, shown);
    if !text.is_empty() {
        push_layers(plan, text, center, font_px, config.fill, alpha);
    }
    if cursor_visible(now_ms) {
        let x = center.x + text_width(config, font_px, shown) / 2.0 + config.cursor_gap_px;
        push_layers(plan, CURSOR, Point::new(x, center.y), font_px, config.fill, alpha);
    }
    shown
}

fn push_layers(plan: &mut RenderPlan, text: &str, center: Point, font_px: f64, fill: Color, alpha: f64) {
    let layers = [
        Some(Shadow {
            color: Color::rgba(0, 0, 0, 0.8),
            blur: 3.0,
            offset: Vec2::new(1.0, 1.0),
        }),
        Some(Shadow::glow(Color::rgba(255, 255, 255, 0.6), 8.0)),
        None,
    ];
    for shadow in layers {
        plan.push(RenderItem::Text(TextItem {
            text: String::from(text),
            center,
            font_px,
            fill,
            alpha: alpha.clamp(0.0, 1.0),
            shadow,
        }));
    }
}
