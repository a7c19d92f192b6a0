#[derive(Debug, thiserror::Error)]
pub enum PrinterError {
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("printer task failed: {0}")]
    Task(String),

    #[error("unsupported code page: {0}")]
    UnsupportedCodePage(String),

    #[error("QR payload is empty or too large ({0} bytes)")]
    QrPayload(usize),

    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: usize,
        #[source]
        last: Box<PrinterError>,
    },
}

impl PrinterError {
    /// Whether another attempt could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, PrinterError::Serial(_) | PrinterError::Io(_) | PrinterError::Task(_))
    }
}
