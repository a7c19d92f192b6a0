//! Turns Telegram messages into printable segments.
//!
//! Telegram entity offsets are counted in UTF-16 code units, so every entity
//! range is translated to byte offsets before slicing the text.

mod header;
mod wrap;

pub use header::Header;
pub use wrap::{wrap_job, LineWidths};

use std::collections::BTreeSet;

use teloxide::types::{MessageEntity, MessageEntityKind};

use crate::printer::{Font, TextStyle};

/// Style toggles derived from message formatting, applied on top of the configured base style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentStyle {
    pub bold: bool,
    pub underline: bool,
    pub invert: bool,
    pub font_b: bool,
    pub double_size: bool,
}

impl SegmentStyle {
    pub fn resolve(&self, base: &TextStyle) -> TextStyle {
        let mut style = base.clone();
        if self.bold {
            style.bold = true;
        }
        if self.underline {
            style.underline = style.underline.max(1);
        }
        if self.invert {
            style.invert = true;
        }
        if self.font_b {
            style.font = Font::B;
        }
        if self.double_size {
            style.width = 2;
            style.height = 2;
        }
        style
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub style: SegmentStyle,
}

impl Segment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: SegmentStyle::default(),
        }
    }

    pub fn styled(text: impl Into<String>, style: SegmentStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

pub type PrintJob = Vec<Segment>;

/// Concatenated text of a job, used for logging and tests.
pub fn job_text(job: &[Segment]) -> String {
    job.iter().map(|s| s.text.as_str()).collect()
}

/// Builds a job from message text and its entities.
///
/// Without any usable entity the result is one plain segment holding the trimmed text.
pub fn build_print_job(text: &str, entities: &[MessageEntity]) -> PrintJob {
    if text.is_empty() {
        return Vec::new();
    }

    let ranges: Vec<(usize, usize, &MessageEntityKind)> = entities
        .iter()
        .filter_map(|entity| {
            let (start, end) = utf16_range_to_byte_range(text, entity.offset, entity.length);
            (start < end).then_some((start, end, &entity.kind))
        })
        .collect();

    if ranges.is_empty() {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }
        return vec![Segment::plain(trimmed)];
    }

    let mut boundaries = BTreeSet::from([0, text.len()]);
    for (start, end, _) in &ranges {
        boundaries.insert(*start);
        boundaries.insert(*end);
    }
    let boundaries: Vec<usize> = boundaries.into_iter().collect();

    boundaries
        .windows(2)
        .filter(|pair| pair[0] < pair[1])
        .map(|pair| {
            let (seg_start, seg_end) = (pair[0], pair[1]);
            let mut style = SegmentStyle::default();
            for (_, _, kind) in ranges
                .iter()
                .filter(|(start, end, _)| *start <= seg_start && *end >= seg_end)
            {
                apply_entity(&mut style, kind);
            }
            Segment::styled(&text[seg_start..seg_end], style)
        })
        .collect()
}

fn apply_entity(style: &mut SegmentStyle, kind: &MessageEntityKind) {
    match kind {
        MessageEntityKind::Bold => style.bold = true,
        MessageEntityKind::Underline => style.underline = true,
        MessageEntityKind::Strikethrough => style.invert = true,
        MessageEntityKind::Code | MessageEntityKind::Pre { .. } => style.font_b = true,
        MessageEntityKind::Blockquote => style.double_size = true,
        // italic has no printer equivalent
        _ => {}
    }
}

/// Maps a UTF-16 `(offset, length)` pair to byte indices, clamped to the text.
fn utf16_range_to_byte_range(text: &str, offset: usize, length: usize) -> (usize, usize) {
    let start = utf16_to_byte_index(text, offset);
    let end = utf16_to_byte_index(text, offset.saturating_add(length));
    (start, end.max(start))
}

/// Byte index of the first character starting at or after `target` UTF-16 units.
fn utf16_to_byte_index(text: &str, target: usize) -> usize {
    let mut units = 0;
    for (idx, ch) in text.char_indices() {
        if units >= target {
            return idx;
        }
        units += ch.len_utf16();
    }
    text.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(kind: MessageEntityKind, offset: usize, length: usize) -> MessageEntity {
        MessageEntity { kind, offset, length }
    }

    #[test]
    fn test_build_print_job_basic_styles() {
        let job = build_print_job(
            "Hello world",
            &[
                entity(MessageEntityKind::Bold, 0, 5),
                entity(MessageEntityKind::Code, 6, 5),
            ],
        );

        assert_eq!(job_text(&job), "Hello world");
        let bold = job.iter().find(|s| s.text == "Hello").unwrap();
        let code = job.iter().find(|s| s.text == "world").unwrap();
        assert!(bold.style.bold);
        assert!(!bold.style.font_b);
        assert!(code.style.font_b);
        assert_eq!(job.iter().find(|s| s.text == " ").unwrap().style, SegmentStyle::default());
    }

    #[test]
    fn test_entity_kind_mapping() {
        let cases = [
            (MessageEntityKind::Bold, SegmentStyle { bold: true, ..Default::default() }),
            (MessageEntityKind::Underline, SegmentStyle { underline: true, ..Default::default() }),
            (MessageEntityKind::Strikethrough, SegmentStyle { invert: true, ..Default::default() }),
            (MessageEntityKind::Code, SegmentStyle { font_b: true, ..Default::default() }),
            (
                MessageEntityKind::Pre { language: None },
                SegmentStyle { font_b: true, ..Default::default() },
            ),
            (MessageEntityKind::Blockquote, SegmentStyle { double_size: true, ..Default::default() }),
            (MessageEntityKind::Italic, SegmentStyle::default()),
        ];

        for (kind, expected) in cases {
            let job = build_print_job("X", &[entity(kind.clone(), 0, 1)]);
            assert_eq!(job, vec![Segment::styled("X", expected)], "{:?}", kind);
        }
    }

    #[test]
    fn test_overlapping_entities_combine() {
        let job = build_print_job(
            "abcdef",
            &[
                entity(MessageEntityKind::Bold, 0, 4),
                entity(MessageEntityKind::Underline, 2, 4),
            ],
        );

        let texts: Vec<&str> = job.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["ab", "cd", "ef"]);
        assert!(job[0].style.bold && !job[0].style.underline);
        assert!(job[1].style.bold && job[1].style.underline);
        assert!(!job[2].style.bold && job[2].style.underline);
    }

    #[test]
    fn test_utf16_offsets() {
        // the emoji takes two UTF-16 units, the Cyrillic letters one each
        let text = "😀 Привет";
        let job = build_print_job(text, &[entity(MessageEntityKind::Bold, 3, 6)]);

        assert_eq!(job_text(&job), text);
        let bold = job.iter().find(|s| s.style.bold).unwrap();
        assert_eq!(bold.text, "Привет");
    }

    #[test]
    fn test_out_of_range_entities() {
        let job = build_print_job("short", &[entity(MessageEntityKind::Bold, 3, 100)]);
        assert_eq!(job_text(&job), "short");
        assert_eq!(job.last().unwrap().text, "rt");
        assert!(job.last().unwrap().style.bold);

        // entirely past the end: dropped, falls back to trimmed text
        let job = build_print_job("  short  ", &[entity(MessageEntityKind::Bold, 50, 2)]);
        assert_eq!(job, vec![Segment::plain("short")]);
    }

    #[test]
    fn test_no_entities_trims() {
        assert_eq!(build_print_job("  Hello  ", &[]), vec![Segment::plain("Hello")]);
        assert!(build_print_job("   ", &[]).is_empty());
        assert!(build_print_job("", &[]).is_empty());
    }

    #[test]
    fn test_resolve_against_base() {
        let base = TextStyle {
            underline: 2,
            ..TextStyle::default()
        };
        let resolved = SegmentStyle {
            underline: true,
            font_b: true,
            double_size: true,
            ..Default::default()
        }
        .resolve(&base);

        assert_eq!(resolved.underline, 2);
        assert_eq!(resolved.font, Font::B);
        assert_eq!((resolved.width, resolved.height), (2, 2));
        assert_eq!(SegmentStyle::default().resolve(&base), base);
    }
}
