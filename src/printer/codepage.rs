use encoding_rs::{Encoder, EncoderResult, Encoding};
use oem_cp::code_table::{
    ENCODING_TABLE_CP437, ENCODING_TABLE_CP850, ENCODING_TABLE_CP852, ENCODING_TABLE_CP860, ENCODING_TABLE_CP863,
    ENCODING_TABLE_CP865,
};
use oem_cp::encode_string_lossy;

use super::PrinterError;

#[derive(Debug, Clone, Copy)]
enum Table {
    Whatwg(&'static Encoding),
    Oem { name: &'static str, encode: fn(&str) -> Vec<u8> },
}

/// Text encoding matching the code page selected on the printer.
#[derive(Debug, Clone, Copy)]
pub struct CodePage {
    table: Table,
}

macro_rules! oem_table {
    ($name:literal, $table:ident) => {
        Table::Oem {
            name: $name,
            encode: |text| encode_string_lossy(text, &$table),
        }
    };
}

/// DOS code pages printers ship with that WHATWG does not define.
fn oem_table(label: &str) -> Option<Table> {
    let number = ["cp", "ibm", "pc"]
        .iter()
        .find_map(|prefix| label.strip_prefix(prefix))
        .unwrap_or(label);

    match number {
        "437" => Some(oem_table!("cp437", ENCODING_TABLE_CP437)),
        "850" => Some(oem_table!("cp850", ENCODING_TABLE_CP850)),
        "852" => Some(oem_table!("cp852", ENCODING_TABLE_CP852)),
        "860" => Some(oem_table!("cp860", ENCODING_TABLE_CP860)),
        "863" => Some(oem_table!("cp863", ENCODING_TABLE_CP863)),
        "865" => Some(oem_table!("cp865", ENCODING_TABLE_CP865)),
        _ => None,
    }
}

impl CodePage {
    /// Accepts WHATWG labels such as `cp1251`, `windows-1251`, `cp866` or `utf-8`,
    /// and the DOS pages `cp437`, `cp850`, `cp852`, `cp860`, `cp863`, `cp865`.
    pub fn from_label(label: &str) -> Result<Self, PrinterError> {
        let normalized = label.trim().to_lowercase();
        oem_table(&normalized)
            .or_else(|| {
                Encoding::for_label(normalized.as_bytes()).map(|encoding| Table::Whatwg(encoding.output_encoding()))
            })
            .map(|table| Self { table })
            .ok_or_else(|| PrinterError::UnsupportedCodePage(label.to_string()))
    }

    pub fn name(&self) -> &'static str {
        match self.table {
            Table::Whatwg(encoding) => encoding.name(),
            Table::Oem { name, .. } => name,
        }
    }

    /// Encodes `text`, replacing characters the code page cannot represent with `?`.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self.table {
            Table::Whatwg(encoding) => encode_whatwg(encoding, text),
            Table::Oem { encode, .. } => encode(text),
        }
    }
}

fn encode_whatwg(encoding: &'static Encoding, text: &str) -> Vec<u8> {
    let mut encoder = encoding.new_encoder();
    let mut out = Vec::with_capacity(text.len());
    let mut rest = text;

    loop {
        let (result, read) = encode_chunk(&mut encoder, rest, &mut out);
        rest = &rest[read..];
        match result {
            EncoderResult::InputEmpty => break,
            EncoderResult::OutputFull => continue,
            EncoderResult::Unmappable(_) => out.push(b'?'),
        }
    }

    out
}

fn encode_chunk(encoder: &mut Encoder, src: &str, out: &mut Vec<u8>) -> (EncoderResult, usize) {
    let needed = encoder
        .max_buffer_length_from_utf8_without_replacement(src.len())
        .unwrap_or(src.len() * 4 + 16);
    let start = out.len();
    out.resize(start + needed, 0);
    let (result, read, written) = encoder.encode_from_utf8_without_replacement(src, &mut out[start..], true);
    out.truncate(start + written);
    (result, read)
}
