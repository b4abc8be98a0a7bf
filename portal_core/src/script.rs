// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text cues inside the plant window.
//!
//! The plant window is split into consecutive cues, one per line of text.
//! Each cue spends its first part typing and the rest holding the full line.
//! Cue bounds are fractions of the plant window's progress and must tile
//! `[0, 1)` with no gaps.

/// One line's slot within the plant window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cue {
    /// Start as a fraction of plant progress.
    pub start: f64,
    /// End (exclusive) as a fraction of plant progress.
    pub end: f64,
    /// Fraction of the cue spent typing.
    pub typing: f64,
    /// Whether typing stalls around the midpoint.
    pub pause_at_half: bool,
    /// Hold progress past which the line flickers like a failing bulb.
    pub dying_after: Option<f64>,
}

impl Cue {
    const fn plain(start: f64, end: f64, typing: f64) -> Self {
        Self {
            start,
            end,
            typing,
            pause_at_half: false,
            dying_after: None,
        }
    }
}

/// What a cue is doing at a given instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TextStage {
    /// Revealing characters.
    Typing {
        /// Typing progress in `[0, 1)`.
        progress: f64,
        /// Whether the paused remap applies.
        pause_at_half: bool,
    },
    /// The full line is on screen.
    Holding {
        /// Whether the line should flicker this tick.
        dying: bool,
    },
}

/// The active line and its stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextCue {
    /// Index into the script's lines.
    pub line: usize,
    /// Stage within the cue.
    pub stage: TextStage,
}

/// Number of text lines in the plant window.
pub const LINE_COUNT: usize = 4;

/// Ordered cue table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlantScript {
    /// Cues in playback order.
    pub cues: [Cue; LINE_COUNT],
}

impl PlantScript {
    /// Three short lines then a long final line that dies out.
    #[must_use]
    pub const fn portal() -> Self {
        Self {
            cues: [
                Cue::plain(0.0, 0.196, 0.426),
                Cue {
                    pause_at_half: true,
                    ..Cue::plain(0.196, 0.392, 0.426)
                },
                Cue::plain(0.392, 0.588, 0.426),
                Cue {
                    dying_after: Some(0.67),
                    ..Cue::plain(0.588, 1.0, 0.198)
                },
            ],
        }
    }

    /// Resolves plant progress to at most one cue.
    ///
    /// Returns `None` outside `[0, 1)`.
    #[must_use]
    pub fn cue_at(&self, plant_progress: f64) -> Option<TextCue> {
        let (line, cue) = self
            .cues
            .iter()
            .enumerate()
            .find(|(_, c)| plant_progress >= c.start && plant_progress < c.end)?;

        let elapsed = (plant_progress - cue.start) / (cue.end - cue.start);
        let stage = if elapsed < cue.typing {
            TextStage::Typing {
                progress: elapsed / cue.typing,
                pause_at_half: cue.pause_at_half,
            }
        } else {
            let hold = (elapsed - cue.typing) / (1.0 - cue.typing);
            TextStage::Holding {
                dying: cue.dying_after.is_some_and(|d| hold > d),
            }
        };
        Some(TextCue { line, stage })
    }
}
