use std::io::{ErrorKind, Read, Write};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::escpos::{self, STATUS_PAPER, STATUS_PRINTER};
use super::table::{self, TableSelector};
use super::{preview, CodePage, PrinterAdapter, PrinterError, PrinterStatus, QrOptions, RetryPolicy, TextStyle};
use crate::format::{job_text, PrintJob, Segment};

/// An ESC/POS printer behind any byte transport, usually a serial port.
pub struct EscPosDevice<T> {
    port: T,
    codepage: CodePage,
    codepage_id: u8,
    base: TextStyle,
    qr: QrOptions,
}

impl<T: Read + Write> EscPosDevice<T> {
    pub fn new(port: T, codepage: CodePage, codepage_id: u8, base: TextStyle, qr: QrOptions) -> Self {
        Self {
            port,
            codepage,
            codepage_id,
            base,
            qr,
        }
    }

    /// Reset, select the code page, apply the base style.
    pub fn initialize(&mut self) -> Result<(), PrinterError> {
        let bytes = [
            escpos::init(),
            escpos::select_code_page(self.codepage_id),
            escpos::style(&self.base),
            escpos::density(self.base.density),
        ]
        .concat();
        self.send(&bytes)?;
        info!(
            "Printer initialized (code page {} as ESC t {})",
            self.codepage.name(),
            self.codepage_id
        );
        Ok(())
    }

    pub fn print_job(&mut self, job: &[Segment]) -> Result<(), PrinterError> {
        let mut bytes = self.segment_bytes(job);
        bytes.push(b'\n');
        bytes.extend(Self::finish());
        self.send(&bytes)
    }

    pub fn print_qr(&mut self, lead: &[Segment], data: &str) -> Result<(), PrinterError> {
        let symbol = escpos::qr(data.as_bytes(), &self.qr).ok_or(PrinterError::QrPayload(data.len()))?;

        let mut bytes = self.segment_bytes(lead);
        bytes.extend(escpos::align(self.qr.align));
        bytes.extend(symbol);
        bytes.extend(escpos::align(self.base.align));
        bytes.extend(Self::finish());
        self.send(&bytes)
    }

    pub fn is_online(&mut self) -> Result<bool, PrinterError> {
        Ok(self.query(STATUS_PRINTER)?.is_some_and(escpos::decode_online))
    }

    pub fn paper_status(&mut self) -> Result<Option<u8>, PrinterError> {
        Ok(self.query(STATUS_PAPER)?.and_then(escpos::decode_paper))
    }

    /// Prints the code page sheet, then switches back to the configured table.
    pub fn print_codepage_sheet(&mut self, selectors: &[TableSelector]) -> Result<(), PrinterError> {
        let mut bytes = table::codepage_sheet(selectors);
        bytes.extend(escpos::select_code_page(self.codepage_id));
        self.send(&bytes)
    }

    fn segment_bytes(&self, segments: &[Segment]) -> Vec<u8> {
        let mut bytes = Vec::new();
        for segment in segments {
            bytes.extend(escpos::style(&segment.style.resolve(&self.base)));
            bytes.extend(self.codepage.encode(&segment.text));
        }
        bytes.extend(escpos::style(&self.base));
        bytes
    }

    fn finish() -> Vec<u8> {
        [escpos::feed(4), escpos::partial_cut()].concat()
    }

    /// Sends a real-time status request; `None` when the printer does not answer in time.
    fn query(&mut self, kind: u8) -> Result<Option<u8>, PrinterError> {
        self.send(&escpos::status_request(kind))?;
        let mut byte = [0u8; 1];
        match self.port.read(&mut byte) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn send(&mut self, bytes: &[u8]) -> Result<(), PrinterError> {
        self.port.write_all(bytes)?;
        self.port.flush()?;
        Ok(())
    }
}

/// Async adapter over a blocking device: one call at a time, run on the blocking pool, retried.
pub struct DevicePrinter<T> {
    device: Arc<Mutex<EscPosDevice<T>>>,
    retry: RetryPolicy,
}

impl<T> DevicePrinter<T>
where
    T: Read + Write + Send + 'static,
{
    pub fn new(device: EscPosDevice<T>, retry: RetryPolicy) -> Self {
        Self {
            device: Arc::new(Mutex::new(device)),
            retry,
        }
    }

    async fn blocking<R, F>(&self, f: F) -> Result<R, PrinterError>
    where
        F: FnOnce(&mut EscPosDevice<T>) -> Result<R, PrinterError> + Send + 'static,
        R: Send + 'static,
    {
        let device = Arc::clone(&self.device);
        tokio::task::spawn_blocking(move || {
            // the guarded value is a port handle; a panic elsewhere leaves it usable
            let mut guard = device.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            f(&mut guard)
        })
        .await
        .map_err(|e| PrinterError::Task(e.to_string()))?
    }
}

#[async_trait]
impl<T> PrinterAdapter for DevicePrinter<T>
where
    T: Read + Write + Send + 'static,
{
    fn name(&self) -> &str {
        "escpos"
    }

    async fn print_text(&self, job: PrintJob) -> Result<(), PrinterError> {
        let job = Arc::new(job);
        self.retry
            .run("Print", || {
                let job = Arc::clone(&job);
                self.blocking(move |device| device.print_job(&job))
            })
            .await?;
        info!("Printed: {}", preview(&job_text(&job)));
        Ok(())
    }

    async fn print_qr(&self, lead: PrintJob, data: String) -> Result<(), PrinterError> {
        let lead = Arc::new(lead);
        let data = Arc::new(data);
        self.retry
            .run("QR print", || {
                let lead = Arc::clone(&lead);
                let data = Arc::clone(&data);
                self.blocking(move |device| device.print_qr(&lead, &data))
            })
            .await?;
        info!("QR printed: {}", preview(&data));
        Ok(())
    }

    async fn status(&self) -> PrinterStatus {
        let result = self
            .blocking(|device| {
                let online = device.is_online()?;
                let paper = device.paper_status().unwrap_or_else(|e| {
                    warn!("Paper status query failed: {}", e);
                    None
                });
                Ok(PrinterStatus { online, paper })
            })
            .await;

        result.unwrap_or_else(|e| {
            error!("Status check failed: {}", e);
            PrinterStatus::unreachable()
        })
    }
}
