use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serialport::{DataBits, Parity, StopBits};
use teloxide::types::{ChatId, UserId};

use crate::format::LineWidths;
use crate::printer::{Align, Font, QrErrorCorrection, QrOptions, TextStyle};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub printer: PrinterConfig,
    pub print: PrintConfig,
    pub log: LogConfig,
}

#[derive(Clone, Debug)]
pub struct TelegramConfig {
    pub token: String,
    pub admin_id: ChatId,
    pub whitelist: Vec<UserId>,
}

#[derive(Clone, Debug)]
pub struct PrinterConfig {
    pub mock: bool,
    pub serial: SerialConfig,
    /// Encoding label used to turn text into printer bytes, e.g. `cp1251`.
    pub codepage: String,
    /// Value sent with `ESC t n`; must match `codepage` on the device.
    pub codepage_id: u8,
    pub text_style: TextStyle,
    pub line_widths: LineWidths,
    pub qr: QrOptions,
}

#[derive(Clone, Debug)]
pub struct SerialConfig {
    pub port: String,
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub timeout: Duration,
    pub dsrdtr: bool,
}

#[derive(Clone, Debug)]
pub struct PrintConfig {
    pub rate_limit_secs: u64,
    pub telegram_formatting: bool,
    pub header_enabled: bool,
    pub header_line_width: usize,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub dir: PathBuf,
    pub max_bytes: u64,
    pub backups: usize,
}

/// Loads `.env` into the process environment. `Ok(None)` when there is no file.
pub fn load_dotenv() -> Result<Option<PathBuf>, dotenvy::Error> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        build_config(env_var)
    }
}

impl PrinterConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        printer_config(&Source { get: env_var })
    }
}

impl LogConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        log_config(&Source { get: env_var })
    }
}

pub fn build_config<F>(get: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    info!("Building AppConfig...");
    let source = Source { get };

    let config = AppConfig {
        telegram: telegram_config(&source)?,
        printer: printer_config(&source)?,
        print: print_config(&source)?,
        log: log_config(&source)?,
    };

    info!("AppConfig built");
    Ok(config)
}

fn telegram_config<F>(source: &Source<F>) -> Result<TelegramConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(TelegramConfig {
        token: source.required("BOT_TOKEN")?,
        admin_id: ChatId(source.required_parse::<i64>("ADMIN_ID")?),
        whitelist: source.whitelist("WHITELIST")?,
    })
}

fn printer_config<F>(source: &Source<F>) -> Result<PrinterConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let serial = SerialConfig {
        port: source.string_or("SERIAL_PORT", "/dev/serial0"),
        baud_rate: source.parse_or("BAUDRATE", 9600)?,
        data_bits: source.map_or("SERIAL_BYTESIZE", DataBits::Eight, |v| match v {
            "5" => Some(DataBits::Five),
            "6" => Some(DataBits::Six),
            "7" => Some(DataBits::Seven),
            "8" => Some(DataBits::Eight),
            _ => None,
        })?,
        parity: source.map_or("SERIAL_PARITY", Parity::None, |v| match v.to_uppercase().as_str() {
            "N" => Some(Parity::None),
            "E" => Some(Parity::Even),
            "O" => Some(Parity::Odd),
            _ => None,
        })?,
        stop_bits: source.map_or("SERIAL_STOPBITS", StopBits::One, |v| match v {
            "1" => Some(StopBits::One),
            "2" => Some(StopBits::Two),
            _ => None,
        })?,
        timeout: source.map_or("SERIAL_TIMEOUT", Duration::from_secs(1), |v| {
            v.parse::<f64>()
                .ok()
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        })?,
        dsrdtr: source.bool_or("SERIAL_DSRDTR", true),
    };

    let text_style = TextStyle {
        bold: source.bool_or("TEXT_BOLD", false),
        font: source.parse_or("FONT", Font::A)?,
        align: source.parse_or("TEXT_ALIGN", Align::Left)?,
        underline: source.bounded_or("TEXT_UNDERLINE", 0, 0..=2)?,
        width: source.bounded_or("TEXT_WIDTH", 1, 1..=8)?,
        height: source.bounded_or("TEXT_HEIGHT", 1, 1..=8)?,
        invert: source.bounded_or::<u8>("TEXT_INVERT", 0, 0..=1)? == 1,
        smooth: source.bool_or("TEXT_SMOOTH", false),
        flip: source.bool_or("TEXT_FLIP", false),
        density: source.bounded_or("DENSITY_LEVEL", 4, 0..=8)?,
    };

    Ok(PrinterConfig {
        mock: source.bool_or("MOCK_PRINTER", false),
        serial,
        codepage: source.string_or("CODEPAGE", "cp1251"),
        codepage_id: source.parse_or("CODEPAGE_ID", 6)?,
        text_style,
        line_widths: LineWidths {
            font_a: source.bounded_or("LINE_CHARS_FONT_A", 32, 1..=255)?,
            font_b: source.bounded_or("LINE_CHARS_FONT_B", 42, 1..=255)?,
        },
        qr: QrOptions {
            size: source.bounded_or("QR_SIZE", 3, 1..=16)?,
            align: source.parse_or("QR_ALIGN", Align::Center)?,
            error_correction: source.parse_or("QR_ERROR_CORRECTION", QrErrorCorrection::M)?,
        },
    })
}

fn print_config<F>(source: &Source<F>) -> Result<PrintConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(PrintConfig {
        rate_limit_secs: source.parse_or("PRINT_RATE_LIMIT_SECONDS", 10)?,
        telegram_formatting: source.bool_or("PRINT_TELEGRAM_FORMATTING", true),
        header_enabled: source.bool_or("PRINT_HEADER_ENABLED", true),
        header_line_width: source.bounded_or("HEADER_LINE_WIDTH", 42, 1..=255)?,
    })
}

fn log_config<F>(source: &Source<F>) -> Result<LogConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(LogConfig {
        dir: PathBuf::from(source.string_or("LOG_DIR", "logs")),
        max_bytes: source.parse_or("LOG_MAX_BYTES", 10 * 1024 * 1024)?,
        backups: source.parse_or("LOG_BACKUPS", 5)?,
    })
}

/// Accepts `true/1/yes/on` in any case; everything else is false.
pub fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

/// Parses `1,2,3` or `[1,2,3]`.
pub fn parse_whitelist(value: &str) -> Result<Vec<UserId>, ConfigError> {
    let raw = value.trim();
    let raw = raw
        .strip_prefix('[')
        .and_then(|r| r.strip_suffix(']'))
        .unwrap_or(raw);

    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse::<u64>().map(UserId).map_err(|_| ConfigError::Invalid {
                key: "WHITELIST".to_string(),
                value: id.to_string(),
            })
        })
        .collect()
}

struct Source<F> {
    get: F,
}

impl<F> Source<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn value(&self, key: &str) -> Option<String> {
        (self.get)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.value(key).ok_or_else(|| {
            warn!("Missing or empty required key: {}", key);
            ConfigError::Missing(key.to_string())
        })
    }

    fn required_parse<T: FromStr>(&self, key: &str) -> Result<T, ConfigError> {
        let value = self.required(key)?;
        value.parse::<T>().map_err(|_| invalid(key, &value))
    }

    fn string_or(&self, key: &str, default: &str) -> String {
        self.value(key).unwrap_or_else(|| default.to_string())
    }

    fn bool_or(&self, key: &str, default: bool) -> bool {
        self.value(key).map(|v| parse_bool(&v)).unwrap_or(default)
    }

    fn parse_or<T: FromStr>(&self, key: &str, default: T) -> Result<T, ConfigError> {
        match self.value(key) {
            Some(value) => value.parse::<T>().map_err(|_| invalid(key, &value)),
            None => Ok(default),
        }
    }

    fn bounded_or<T>(&self, key: &str, default: T, range: std::ops::RangeInclusive<T>) -> Result<T, ConfigError>
    where
        T: FromStr + PartialOrd + ToString,
    {
        let value = self.parse_or(key, default)?;
        if range.contains(&value) {
            Ok(value)
        } else {
            Err(invalid(key, &value.to_string()))
        }
    }

    fn map_or<T>(&self, key: &str, default: T, map: impl Fn(&str) -> Option<T>) -> Result<T, ConfigError> {
        match self.value(key) {
            Some(value) => map(&value).ok_or_else(|| invalid(key, &value)),
            None => Ok(default),
        }
    }

    fn whitelist(&self, key: &str) -> Result<Vec<UserId>, ConfigError> {
        match self.value(key) {
            Some(value) => parse_whitelist(&value),
            None => Ok(Vec::new()),
        }
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
pub fn test_config() -> AppConfig {
    test_config_with(&[])
}

/// Test config with `overrides` applied on top of the defaults used by dispatcher tests.
#[cfg(test)]
pub fn test_config_with(overrides: &[(&str, &str)]) -> AppConfig {
    let defaults = [
        ("BOT_TOKEN", "123456:TEST"),
        ("ADMIN_ID", "1"),
        ("WHITELIST", "12345678"),
        ("MOCK_PRINTER", "true"),
        ("PRINT_HEADER_ENABLED", "false"),
    ];
    build_config(|key| {
        overrides
            .iter()
            .chain(defaults.iter())
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    })
    .expect("test config must build")
}
