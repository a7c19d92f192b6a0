use serialport::{FlowControl, SerialPort};

use super::PrinterError;
use crate::config::SerialConfig;

pub fn open(config: &SerialConfig) -> Result<Box<dyn SerialPort>, PrinterError> {
    let mut port = serialport::new(config.port.as_str(), config.baud_rate)
        .data_bits(config.data_bits)
        .parity(config.parity)
        .stop_bits(config.stop_bits)
        .flow_control(FlowControl::None)
        .timeout(config.timeout)
        .open()?;

    // Printers wired for DSR/DTR handshaking stay idle until DTR is asserted.
    if config.dsrdtr {
        if let Err(e) = port.write_data_terminal_ready(true) {
            warn!("Failed to assert DTR on {}: {}", config.port, e);
        }
    }

    debug!("Serial port {} opened", config.port);
    Ok(port)
}
