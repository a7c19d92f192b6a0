mod codepage;
mod device;
mod error;
pub mod escpos;
mod mock;
mod model;
mod retry;
mod serial;
mod table;

use std::sync::Arc;

use async_trait::async_trait;

pub use codepage::CodePage;
pub use device::{DevicePrinter, EscPosDevice};
pub use error::PrinterError;
pub use mock::{MockPrinter, PrintRecord};
pub use model::*;
pub use retry::RetryPolicy;
pub use table::TableSelector;

use crate::config::PrinterConfig;
use crate::format::PrintJob;

/// The print surface handlers talk to. Hardware and mock printers share it.
#[async_trait]
pub trait PrinterAdapter: Send + Sync {
    fn name(&self) -> &str;

    async fn print_text(&self, job: PrintJob) -> Result<(), PrinterError>;

    /// Prints `lead` (usually a header) followed by a QR symbol encoding `data`.
    async fn print_qr(&self, lead: PrintJob, data: String) -> Result<(), PrinterError>;

    /// Never fails: an unreachable printer reports offline with unknown paper.
    async fn status(&self) -> PrinterStatus;
}

/// First 50 characters, for log lines.
pub fn preview(text: &str) -> String {
    text.chars().take(50).collect()
}

/// Opens the configured printer and runs its init sequence once.
pub fn connect(config: &PrinterConfig) -> Result<Arc<dyn PrinterAdapter>, PrinterError> {
    if config.mock {
        info!("Using mock printer");
        return Ok(Arc::new(MockPrinter::new()));
    }

    info!(
        "Opening serial printer on {} at {} baud",
        config.serial.port, config.serial.baud_rate
    );
    let port = serial::open(&config.serial)?;
    let codepage = CodePage::from_label(&config.codepage)?;
    let mut device = EscPosDevice::new(
        port,
        codepage,
        config.codepage_id,
        config.text_style.clone(),
        config.qr.clone(),
    );

    // Not every printer accepts every setting; a failed init is not fatal.
    if let Err(e) = device.initialize() {
        warn!("Printer initialization failed: {}", e);
    }

    Ok(Arc::new(DevicePrinter::new(device, RetryPolicy::default())))
}

/// Prints one grid per selector so the printer's code page numbering can be checked by eye.
pub fn print_codepage_tables(config: &PrinterConfig, selectors: &[TableSelector]) -> Result<(), PrinterError> {
    let labels: Vec<&str> = selectors.iter().map(|s| s.label.as_str()).collect();
    if config.mock {
        info!("Mock printer: skipping code page tables {:?}", labels);
        return Ok(());
    }

    let port = serial::open(&config.serial)?;
    let codepage = CodePage::from_label(&config.codepage)?;
    let mut device = EscPosDevice::new(
        port,
        codepage,
        config.codepage_id,
        config.text_style.clone(),
        config.qr.clone(),
    );
    device.print_codepage_sheet(selectors)?;
    info!("Printed code page tables {:?} on {}", labels, config.serial.port);
    Ok(())
}
