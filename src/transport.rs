//! USB transport for LittleWire control transfers.
//!
//! The firmware only exposes endpoint 0, so every operation is a vendor
//! control transfer addressed to the device. [`Transport`] is the seam the
//! protocol layer talks through; [`UsbTransport`] implements it with `nusb`.

use crate::consts;
use crate::error::{Error, Result};
use log::{debug, trace};
use nusb::transfer::{Control, ControlType, Recipient};
use std::time::Duration;

/// A blocking channel of vendor control transfers to one device.
///
/// Implementations must keep `open` idempotent. The protocol layer opens
/// lazily before the first transfer and never interleaves transfers.
pub trait Transport {
    /// Acquires the device handle if it is not already held.
    fn open(&mut self) -> Result<()>;

    /// Whether the device handle is currently held.
    fn is_open(&self) -> bool;

    /// Releases the device handle so other processes can claim it.
    fn close(&mut self);

    /// Performs a device-to-host vendor request and returns the number of
    /// bytes written into `buf`.
    fn control_in(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<usize>;

    /// Performs a host-to-device vendor request with no data stage.
    fn control_out(&mut self, request: u8, value: u16, index: u16, timeout: Duration)
        -> Result<()>;

    /// Blocks while the device is busy and cannot service requests.
    fn hold_off(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn control_in(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<usize> {
        (**self).control_in(request, value, index, buf, timeout)
    }

    fn control_out(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        timeout: Duration,
    ) -> Result<()> {
        (**self).control_out(request, value, index, timeout)
    }

    fn hold_off(&mut self, duration: Duration) {
        (**self).hold_off(duration)
    }
}

/// Information about a discovered LittleWire device.
#[derive(Debug, Clone)]
pub struct WireInfo {
    /// USB bus number.
    pub bus_number: u8,
    /// Device address on the bus.
    pub device_address: u8,
    /// Device serial number string, if it reports one.
    pub serial_number: Option<String>,
    /// Human-readable product name.
    pub product_string: Option<String>,
    pub(crate) device: nusb::DeviceInfo,
}

/// Finds all LittleWire devices connected to this computer.
pub fn find_all() -> Result<Vec<WireInfo>> {
    let found: Vec<WireInfo> = nusb::list_devices()?
        .filter(|info| {
            info.vendor_id() == consts::LITTLEWIRE_VID
                && info.product_id() == consts::LITTLEWIRE_PID
                && info.product_string() == Some(consts::LITTLEWIRE_PRODUCT)
        })
        .map(|info| {
            debug!(
                "Found LittleWire: bus={}, address={}, SN={:?}",
                info.bus_number(),
                info.device_address(),
                info.serial_number()
            );
            WireInfo {
                bus_number: info.bus_number(),
                device_address: info.device_address(),
                serial_number: info.serial_number().map(|s| s.to_string()),
                product_string: info.product_string().map(|s| s.to_string()),
                device: info,
            }
        })
        .collect();
    Ok(found)
}

/// Finds the first LittleWire device.
/// **Warning:** Ambiguous if multiple devices exist.
pub fn find_first() -> Result<WireInfo> {
    find_all()?.into_iter().next().ok_or(Error::DeviceNotFound)
}

/// `nusb`-backed transport. The device is opened on first use and released
/// by [`Transport::close`] or when the transport is dropped.
pub struct UsbTransport {
    info: WireInfo,
    interface: Option<nusb::Interface>,
}

impl UsbTransport {
    /// Creates a transport for a discovered device without opening it.
    pub fn new(info: WireInfo) -> Self {
        UsbTransport {
            info,
            interface: None,
        }
    }

    /// Information about the device this transport talks to.
    pub fn info(&self) -> &WireInfo {
        &self.info
    }

    fn interface(&self) -> Result<&nusb::Interface> {
        self.interface.as_ref().ok_or(Error::NotConnected)
    }

    fn vendor_request(request: u8, value: u16, index: u16) -> Control {
        Control {
            control_type: ControlType::Vendor,
            recipient: Recipient::Device,
            request,
            value,
            index,
        }
    }
}

impl std::fmt::Debug for UsbTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsbTransport")
            .field("info", &self.info)
            .field("open", &self.interface.is_some())
            .finish()
    }
}

impl Transport for UsbTransport {
    fn open(&mut self) -> Result<()> {
        if self.interface.is_some() {
            return Ok(());
        }
        debug!(
            "Opening LittleWire at bus {} address {}",
            self.info.bus_number, self.info.device_address
        );
        let device = self.info.device.open()?;
        self.interface = Some(device.claim_interface(0)?);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.interface.is_some()
    }

    fn close(&mut self) {
        if self.interface.take().is_some() {
            debug!(
                "Released LittleWire at bus {} address {}",
                self.info.bus_number, self.info.device_address
            );
        }
    }

    fn control_in(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<usize> {
        let interface = self.interface()?;
        let received = interface.control_in_blocking(
            Self::vendor_request(request, value, index),
            buf,
            timeout,
        )?;
        trace!(
            "IN  req={:3} value=0x{:04X} index=0x{:04X} -> {:02X?}",
            request,
            value,
            index,
            &buf[..received]
        );
        Ok(received)
    }

    fn control_out(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        timeout: Duration,
    ) -> Result<()> {
        let interface = self.interface()?;
        trace!(
            "OUT req={:3} value=0x{:04X} index=0x{:04X}",
            request,
            value,
            index
        );
        interface.control_out_blocking(Self::vendor_request(request, value, index), &[], timeout)?;
        Ok(())
    }
}
