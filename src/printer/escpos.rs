//! ESC/POS command builders.
//!
//! Every function returns the raw bytes of one command; callers concatenate
//! them and hand the buffer to the transport.

use super::{Align, Font, QrErrorCorrection, QrOptions, TextStyle};

const ESC: u8 = 0x1B;
const GS: u8 = 0x1D;
const DLE: u8 = 0x10;
const EOT: u8 = 0x04;

/// Largest payload `GS ( k` can store for a model 2 symbol.
pub const QR_MAX_BYTES: usize = 7089;

/// `DLE EOT 1`: printer status.
pub const STATUS_PRINTER: u8 = 1;
/// `DLE EOT 4`: roll paper sensor status.
pub const STATUS_PAPER: u8 = 4;

/// `ESC @`: clears the buffer and restores power-on settings.
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

/// `ESC t n`: selects the character code table.
pub fn select_code_page(id: u8) -> Vec<u8> {
    vec![ESC, b't', id]
}

pub fn bold(on: bool) -> Vec<u8> {
    vec![ESC, b'E', u8::from(on)]
}

/// `ESC - n` with n in 0..=2 (dot thickness).
pub fn underline(thickness: u8) -> Vec<u8> {
    vec![ESC, b'-', thickness.min(2)]
}

/// `GS B n`: white on black.
pub fn invert(on: bool) -> Vec<u8> {
    vec![GS, b'B', u8::from(on)]
}

pub fn font(font: Font) -> Vec<u8> {
    let n = match font {
        Font::A => 0,
        Font::B => 1,
    };
    vec![ESC, b'M', n]
}

/// `GS ! n`: width and height magnification, each 1..=8.
pub fn size(width: u8, height: u8) -> Vec<u8> {
    let w = width.clamp(1, 8) - 1;
    let h = height.clamp(1, 8) - 1;
    vec![GS, b'!', (w << 4) | h]
}

pub fn align(align: Align) -> Vec<u8> {
    let n = match align {
        Align::Left => 0,
        Align::Center => 1,
        Align::Right => 2,
    };
    vec![ESC, b'a', n]
}

/// `ESC { n`: upside-down printing.
pub fn flip(on: bool) -> Vec<u8> {
    vec![ESC, b'{', u8::from(on)]
}

/// `GS b n`: glyph smoothing.
pub fn smooth(on: bool) -> Vec<u8> {
    vec![GS, b'b', u8::from(on)]
}

/// `GS ( K` function 49: print density relative to the device default.
///
/// Level 4 is the default; lower is lighter, higher is darker.
pub fn density(level: u8) -> Vec<u8> {
    let offset = i16::from(level.min(8)) - 4;
    vec![GS, b'(', b'K', 0x02, 0x00, 0x31, offset as i8 as u8]
}

/// Every style command for `style`, in an order that does not depend on previous state.
pub fn style(style: &TextStyle) -> Vec<u8> {
    [
        font(style.font),
        bold(style.bold),
        underline(style.underline),
        invert(style.invert),
        size(style.width, style.height),
        align(style.align),
        flip(style.flip),
        smooth(style.smooth),
    ]
    .concat()
}

/// `ESC d n`: prints the buffer and feeds `lines` lines.
pub fn feed(lines: u8) -> Vec<u8> {
    vec![ESC, b'd', lines]
}

/// `GS V 66 n`: feeds to the cutter and makes a partial cut.
pub fn partial_cut() -> Vec<u8> {
    vec![GS, b'V', 66, 0]
}

/// `GS ( k` sequence storing and printing a model 2 QR symbol.
///
/// Returns `None` when the payload does not fit in one symbol.
pub fn qr(data: &[u8], options: &QrOptions) -> Option<Vec<u8>> {
    if data.is_empty() || data.len() > QR_MAX_BYTES {
        return None;
    }

    let store_len = u16::try_from(data.len() + 3).ok()?;
    let [p_l, p_h] = store_len.to_le_bytes();
    let ec = match options.error_correction {
        QrErrorCorrection::L => 48,
        QrErrorCorrection::M => 49,
        QrErrorCorrection::Q => 50,
        QrErrorCorrection::H => 51,
    };

    let mut out = Vec::with_capacity(data.len() + 40);
    // model 2
    out.extend([GS, b'(', b'k', 0x04, 0x00, 0x31, 0x41, 0x32, 0x00]);
    // module size
    out.extend([GS, b'(', b'k', 0x03, 0x00, 0x31, 0x43, options.size.clamp(1, 16)]);
    out.extend([GS, b'(', b'k', 0x03, 0x00, 0x31, 0x45, ec]);
    // store
    out.extend([GS, b'(', b'k', p_l, p_h, 0x31, 0x50, 0x30]);
    out.extend_from_slice(data);
    // print
    out.extend([GS, b'(', b'k', 0x03, 0x00, 0x31, 0x51, 0x30]);
    Some(out)
}

/// `DLE EOT n`: real-time status request.
pub fn status_request(kind: u8) -> Vec<u8> {
    vec![DLE, EOT, kind]
}

/// Bit 3 of the printer status byte is set while offline.
pub fn decode_online(status: u8) -> bool {
    status & 0x08 == 0
}

/// Decodes the roll paper sensor byte into 0 (out), 1 (near end) or 2 (adequate).
pub fn decode_paper(status: u8) -> Option<u8> {
    const NO_PAPER: u8 = 0x72;
    const LOW_PAPER: u8 = 0x1E;
    const PAPER: u8 = 0x12;

    if status & NO_PAPER == NO_PAPER {
        Some(0)
    } else if status & LOW_PAPER == LOW_PAPER {
        Some(1)
    } else if status & PAPER == PAPER {
        Some(2)
    } else {
        None
    }
}
