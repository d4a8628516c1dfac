//! Hardware serial port backed by the `serialport` crate

use super::{PortOpener, SerialTransport};
use crate::config::SerialConfig;
use crate::error::{Result, ResultExt};
use serialport::SerialPort;
use std::io::{self, Read, Write};

/// An open system serial port
pub struct SystemPort {
    port: Box<dyn SerialPort>,
}

impl Read for SystemPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }
}

impl Write for SystemPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}

impl SerialTransport for SystemPort {
    fn bytes_to_read(&self) -> Result<u32> {
        Ok(self.port.bytes_to_read()?)
    }

    fn try_clone_transport(&self) -> Result<Box<dyn SerialTransport>> {
        let port = self.port.try_clone()?;
        Ok(Box::new(SystemPort { port }))
    }

    fn name(&self) -> Option<String> {
        self.port.name()
    }
}

/// Opens the configured device at the configured baud rate
#[derive(Debug, Clone)]
pub struct SystemPortOpener {
    config: SerialConfig,
}

impl SystemPortOpener {
    pub fn new(config: SerialConfig) -> Self {
        Self { config }
    }
}

impl PortOpener for SystemPortOpener {
    fn open(&self) -> Result<Box<dyn SerialTransport>> {
        let port = serialport::new(&self.config.port, self.config.baud_rate)
            .timeout(self.config.read_timeout())
            .open()
            .with_context(|| format!("Failed to open {}", self.describe()))?;

        Ok(Box::new(SystemPort { port }))
    }

    fn describe(&self) -> String {
        format!("{} @ {} baud", self.config.port, self.config.baud_rate)
    }
}

/// Names of serial ports present on this machine
pub fn available_ports() -> Vec<String> {
    match serialport::available_ports() {
        Ok(ports) => ports.into_iter().map(|p| p.port_name).collect(),
        Err(e) => {
            tracing::warn!("Failed to enumerate serial ports: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_uses_config() {
        let opener = SystemPortOpener::new(SerialConfig {
            port: "COM3".to_string(),
            baud_rate: 9600,
            ..SerialConfig::default()
        });
        assert_eq!(opener.describe(), "COM3 @ 9600 baud");
    }

    #[test]
    fn test_open_missing_device_fails() {
        let opener = SystemPortOpener::new(SerialConfig {
            port: "/dev/tagtrace-does-not-exist".to_string(),
            ..SerialConfig::default()
        });
        let err = opener.open().err().unwrap();
        assert!(err.to_string().contains("/dev/tagtrace-does-not-exist"));
    }
}
