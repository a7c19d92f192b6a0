use crate::printer::{Font, TextStyle};

use super::{Segment, SegmentStyle};

/// Characters per printed line for each font at normal width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineWidths {
    pub font_a: usize,
    pub font_b: usize,
}

impl Default for LineWidths {
    fn default() -> Self {
        Self { font_a: 32, font_b: 42 }
    }
}

impl LineWidths {
    /// Characters that fit on one line in `style` (font and width magnification).
    pub fn chars_per_line(&self, style: &TextStyle) -> usize {
        (self.line_units() / self.glyph_units(style)).max(1)
    }

    // A line is `font_a * font_b` units wide, so a Font A glyph costs `font_b`
    // units and a Font B glyph costs `font_a`; both fill the line exactly.
    fn line_units(&self) -> usize {
        self.font_a.max(1) * self.font_b.max(1)
    }

    fn glyph_units(&self, style: &TextStyle) -> usize {
        let base = match style.font {
            Font::A => self.font_b.max(1),
            Font::B => self.font_a.max(1),
        };
        base * usize::from(style.width.max(1))
    }
}

struct Glyph {
    ch: char,
    style: SegmentStyle,
    units: usize,
}

/// Inserts line breaks so that no printed line is wider than the paper.
///
/// Breaks go after the last whitespace on an overflowing line when there is
/// one, otherwise right before the overflowing character. Existing newlines
/// are kept and reset the line. No character is dropped or duplicated.
pub fn wrap_job(job: &[Segment], widths: &LineWidths, base: &TextStyle) -> Vec<Segment> {
    let glyphs: Vec<Glyph> = job
        .iter()
        .flat_map(|segment| {
            let units = widths.glyph_units(&segment.style.resolve(base));
            segment.text.chars().map(move |ch| Glyph {
                ch,
                style: segment.style,
                units,
            })
        })
        .collect();

    let breaks = find_breaks(&glyphs, widths.line_units());

    let mut wrapped: Vec<Segment> = Vec::new();
    let mut next_break = breaks.iter().peekable();
    for (idx, glyph) in glyphs.iter().enumerate() {
        if next_break.peek() == Some(&&idx) {
            next_break.next();
            // the break ends the previous line, so it takes that line's style
            let style = idx.checked_sub(1).map_or(glyph.style, |prev| glyphs[prev].style);
            push_char(&mut wrapped, '\n', style);
        }
        push_char(&mut wrapped, glyph.ch, glyph.style);
    }
    wrapped
}

/// Indices of glyphs that must start a new line.
fn find_breaks(glyphs: &[Glyph], line_units: usize) -> Vec<usize> {
    let mut breaks = Vec::new();
    let mut column = 0;
    let mut line_start = 0;
    let mut after_space: Option<usize> = None;

    for (idx, glyph) in glyphs.iter().enumerate() {
        if glyph.ch == '\n' {
            column = 0;
            line_start = idx + 1;
            after_space = None;
            continue;
        }

        if column > 0 && column + glyph.units > line_units {
            match after_space {
                Some(pos) if pos > line_start && pos < idx => {
                    breaks.push(pos);
                    line_start = pos;
                    column = glyphs[pos..idx].iter().map(|g| g.units).sum();
                }
                _ => {
                    breaks.push(idx);
                    line_start = idx;
                    column = 0;
                }
            }
            after_space = None;

            if column > 0 && column + glyph.units > line_units {
                breaks.push(idx);
                line_start = idx;
                column = 0;
            }
        }

        column += glyph.units;
        if glyph.ch.is_whitespace() {
            after_space = Some(idx + 1);
        }
    }

    breaks
}

fn push_char(segments: &mut Vec<Segment>, ch: char, style: SegmentStyle) {
    match segments.last_mut() {
        Some(last) if last.style == style => last.text.push(ch),
        _ => segments.push(Segment::styled(ch.to_string(), style)),
    }
}
