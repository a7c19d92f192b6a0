use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Font {
    #[default]
    A,
    B,
}

impl FromStr for Font {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "a" => Ok(Font::A),
            "b" => Ok(Font::B),
            _ => Err(format!("unknown font: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl FromStr for Align {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "left" => Ok(Align::Left),
            "center" | "centre" => Ok(Align::Center),
            "right" => Ok(Align::Right),
            _ => Err(format!("unknown alignment: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QrErrorCorrection {
    L,
    #[default]
    M,
    Q,
    H,
}

impl FromStr for QrErrorCorrection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "L" => Ok(QrErrorCorrection::L),
            "M" => Ok(QrErrorCorrection::M),
            "Q" => Ok(QrErrorCorrection::Q),
            "H" => Ok(QrErrorCorrection::H),
            _ => Err(format!("unknown error correction level: {}", s)),
        }
    }
}

/// Base text style applied after every reset; segments toggle on top of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextStyle {
    pub bold: bool,
    pub font: Font,
    pub align: Align,
    pub underline: u8,
    pub width: u8,
    pub height: u8,
    pub invert: bool,
    pub smooth: bool,
    pub flip: bool,
    pub density: u8,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            bold: false,
            font: Font::A,
            align: Align::Left,
            underline: 0,
            width: 1,
            height: 1,
            invert: false,
            smooth: false,
            flip: false,
            density: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrOptions {
    pub size: u8,
    pub align: Align,
    pub error_correction: QrErrorCorrection,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            size: 3,
            align: Align::Center,
            error_correction: QrErrorCorrection::M,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrinterStatus {
    pub online: bool,
    /// Raw paper sensor code: 2 adequate, 1 near end, 0 out. `None` when the query failed.
    pub paper: Option<u8>,
}

impl PrinterStatus {
    pub fn unreachable() -> Self {
        Self {
            online: false,
            paper: None,
        }
    }

    pub fn paper_status(&self) -> PaperStatus {
        PaperStatus::from_code(self.paper)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaperStatus {
    Adequate,
    NearEnd,
    Out,
    Unknown,
}

impl PaperStatus {
    pub fn from_code(code: Option<u8>) -> Self {
        match code {
            Some(2) => PaperStatus::Adequate,
            Some(1) => PaperStatus::NearEnd,
            Some(0) => PaperStatus::Out,
            _ => PaperStatus::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaperStatus::Adequate => "adequate",
            PaperStatus::NearEnd => "near-end",
            PaperStatus::Out => "no paper",
            PaperStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PaperStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
