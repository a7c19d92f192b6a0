//! Code page test sheet: every byte `0x00..=0xFF` laid out as a 16x16 grid,
//! so the right `ESC t` id can be read off paper.

use std::str::FromStr;

use super::{escpos, Align, Font, PrinterError, TextStyle};

/// ESC, LF, FF, CR, HT and VT would act as commands; they print as a blank.
const CONTROL_BYTES: [u8; 6] = [0x1B, b'\n', 0x0C, b'\r', b'\t', 0x0B];

/// One table to print: the `ESC t` id and the label shown above its grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSelector {
    pub label: String,
    pub id: u8,
}

impl FromStr for TableSelector {
    type Err = PrinterError;

    /// A numeric id (`17`) or a table name (`USA`, `PC866`, `WPC1251`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        let id = match label.parse::<u8>() {
            Ok(id) => id,
            Err(_) => named_table_id(label).ok_or_else(|| PrinterError::UnsupportedCodePage(label.to_string()))?,
        };
        Ok(Self {
            label: label.to_string(),
            id,
        })
    }
}

/// Epson numbering; clones may differ, which is what the sheet is for.
fn named_table_id(name: &str) -> Option<u8> {
    match name.to_uppercase().as_str() {
        "USA" | "PC437" | "CP437" => Some(0),
        "KATAKANA" => Some(1),
        "PC850" | "CP850" => Some(2),
        "PC860" | "CP860" => Some(3),
        "PC863" | "CP863" => Some(4),
        "PC865" | "CP865" => Some(5),
        "WPC1252" | "CP1252" => Some(16),
        "PC866" | "CP866" => Some(17),
        "PC852" | "CP852" => Some(18),
        "PC858" | "CP858" => Some(19),
        "WPC1251" | "CP1251" => Some(46),
        _ => None,
    }
}

fn printable(byte: u8) -> u8 {
    if CONTROL_BYTES.contains(&byte) {
        b' '
    } else {
        byte
    }
}

fn grid(id: u8) -> Vec<u8> {
    let mut bytes = escpos::select_code_page(id);

    bytes.extend(escpos::font(Font::B));
    bytes.extend_from_slice(b"  0123456789abcdef\n");
    bytes.extend(escpos::font(Font::A));

    for row in 0..16u8 {
        bytes.extend(escpos::font(Font::B));
        bytes.extend(format!("{:x} ", row).into_bytes());
        bytes.extend(escpos::font(Font::A));
        bytes.extend((0..16u8).map(|col| printable(row * 16 + col)));
        bytes.push(b'\n');
    }
    bytes
}

/// Title, one grid per selector, then feed and cut.
pub fn codepage_sheet(selectors: &[TableSelector]) -> Vec<u8> {
    let plain = escpos::style(&TextStyle::default());

    let mut bytes = escpos::init();
    bytes.extend(escpos::size(2, 2));
    bytes.extend(escpos::align(Align::Center));
    bytes.extend_from_slice(b"Code page tables\n\n");
    bytes.extend_from_slice(&plain);

    for selector in selectors {
        bytes.extend(escpos::size(2, 2));
        bytes.extend(format!("{}\n\n", selector.label).into_bytes());
        bytes.extend_from_slice(&plain);
        bytes.extend(grid(selector.id));
        bytes.extend_from_slice(b"\n\n");
    }

    bytes.extend(escpos::feed(4));
    bytes.extend(escpos::partial_cut());
    bytes
}
