//! Simulated LittleWire shared by the integration tests.
//!
//! `MockTransport` answers control requests the way the firmware does and
//! records every transfer and hold-off. Tests keep a handle to the shared
//! [`DeviceState`] to inspect it after the transport has been moved into a
//! `LittleWire`.

#![allow(dead_code)]

use littlewire::{Config, Error, Function, LittleWire, Result, Transport};
use nusb::transfer::TransferError;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

/// One thing the host did to the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    In {
        request: u8,
        value: u16,
        index: u16,
        len: usize,
    },
    Out {
        request: u8,
        value: u16,
        index: u16,
    },
    HoldOff(Duration),
}

impl Event {
    pub fn request(&self) -> Option<u8> {
        match self {
            Event::In { request, .. } | Event::Out { request, .. } => Some(*request),
            Event::HoldOff(_) => None,
        }
    }
}

/// 1-Wire bus state while a ROM search is running.
#[derive(Debug, Default)]
struct OneWireSearch {
    active: Vec<[u8; 8]>,
    bit: usize,
    complement_next: bool,
}

#[derive(Debug)]
pub struct DeviceState {
    pub version: u8,
    pub port: u8,
    pub adc: HashMap<u16, u16>,
    pub i2c_devices: Vec<u8>,
    /// Bytes returned by the next I2C read.
    pub i2c_data: Vec<u8>,
    pub onewire_devices: Vec<[u8; 8]>,
    /// Errors returned, in order, by the next transfers.
    pub failures: VecDeque<TransferError>,
    pub events: Vec<Event>,
    pub open: bool,
    pub open_count: usize,
    pub close_count: usize,
    buffer: [u8; 8],
    onewire_search: Option<OneWireSearch>,
}

impl DeviceState {
    fn new(version: u8) -> Self {
        DeviceState {
            version,
            // USB D- idles high
            port: 0b0000_1000,
            adc: HashMap::new(),
            i2c_devices: Vec::new(),
            i2c_data: Vec::new(),
            onewire_devices: Vec::new(),
            failures: VecDeque::new(),
            events: Vec::new(),
            open: false,
            open_count: 0,
            close_count: 0,
            buffer: [0; 8],
            onewire_search: None,
        }
    }

    /// Control transfers only, without hold-offs.
    pub fn transfers(&self) -> Vec<Event> {
        self.events
            .iter()
            .filter(|e| !matches!(e, Event::HoldOff(_)))
            .cloned()
            .collect()
    }

    pub fn requests(&self) -> Vec<u8> {
        self.events.iter().filter_map(Event::request).collect()
    }

    pub fn hold_offs(&self) -> Vec<Duration> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::HoldOff(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, function: Function) -> usize {
        self.requests()
            .iter()
            .filter(|&&r| r == function.code())
            .count()
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    fn handle_in(&mut self, request: u8, value: u16, index: u16, buf: &mut [u8]) -> usize {
        let reply: Vec<u8> = match request {
            r if r == Function::Version.code() => vec![self.version],
            r if r == Function::Echo.code() => {
                let mut echo = vec![0xC0, request];
                echo.extend_from_slice(&value.to_le_bytes());
                echo.extend_from_slice(&index.to_le_bytes());
                echo.extend_from_slice(&(buf.len() as u16).to_le_bytes());
                echo
            }
            r if r == Function::Read.code() => vec![self.port],
            r if r == Function::ReadAdc.code() => {
                let raw = self.adc.get(&value).copied().unwrap_or(0);
                raw.to_le_bytes().to_vec()
            }
            r if r == Function::ReadBuffer.code() => self.buffer.to_vec(),
            r if r == Function::I2cBegin.code() => {
                let address = (value >> 1) as u8;
                let acked = self.i2c_devices.contains(&address);
                self.buffer = [if acked { 0 } else { 1 }, 0, 0, 0, 0, 0, 0, 0];
                vec![0; 8]
            }
            r if r == Function::I2cRead.code() => {
                let length = usize::from(value >> 8);
                self.buffer = [0; 8];
                for (slot, byte) in self.buffer.iter_mut().zip(self.i2c_data.iter().take(length)) {
                    *slot = *byte;
                }
                vec![0; 8]
            }
            r if r & 0xF0 == 0xF0 => {
                // SPI loopback: MISO wired to MOSI
                let len = usize::from(r & 0x07);
                let bytes = [value as u8, (value >> 8) as u8, index as u8, (index >> 8) as u8];
                self.buffer = [0; 8];
                self.buffer[..len].copy_from_slice(&bytes[..len]);
                vec![0; 8]
            }
            r if r == Function::DebugSpi.code() => {
                self.buffer = [0xFE, 0, 0, 0, 0, 0, 0, 0];
                vec![0; 8]
            }
            _ => vec![0; buf.len()],
        };
        let n = reply.len().min(buf.len());
        buf[..n].copy_from_slice(&reply[..n]);
        n
    }

    fn handle_out(&mut self, request: u8, value: u16) {
        match request {
            r if r == Function::PinSetHigh.code() || r == Function::SetBit.code() => {
                self.port |= 1 << value
            }
            r if r == Function::PinSetLow.code() || r == Function::ClearBit.code() => {
                self.port &= !(1 << value)
            }
            r if r == Function::Write.code() => self.port = value as u8,
            r if r == Function::OnewireResetPulse.code() => {
                self.onewire_search = None;
                self.buffer = [0; 8];
                self.buffer[0] = u8::from(!self.onewire_devices.is_empty());
            }
            r if r == Function::OnewireSendByte.code() => {
                if value == 0xF0 {
                    self.onewire_search = Some(OneWireSearch {
                        active: self.onewire_devices.clone(),
                        ..Default::default()
                    });
                }
            }
            r if r == Function::OnewireReadBit.code() => {
                let bit = match self.onewire_search.as_mut() {
                    Some(search) => {
                        let byte = search.bit / 8;
                        let mask = 1u8 << (search.bit % 8);
                        let complement = search.complement_next;
                        search.complement_next = !complement;
                        // Open-drain bus: any device pulling low wins
                        search
                            .active
                            .iter()
                            .all(|rom| (rom[byte] & mask != 0) != complement)
                    }
                    None => true,
                };
                self.buffer = [u8::from(bit), 0, 0, 0, 0, 0, 0, 0];
            }
            r if r == Function::OnewireWriteBit.code() => {
                if let Some(search) = self.onewire_search.as_mut() {
                    let byte = search.bit / 8;
                    let mask = 1u8 << (search.bit % 8);
                    search
                        .active
                        .retain(|rom| (rom[byte] & mask != 0) == (value != 0));
                    search.bit += 1;
                    search.complement_next = false;
                }
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone)]
pub struct MockTransport {
    state: Rc<RefCell<DeviceState>>,
}

impl MockTransport {
    pub fn new(version: u8) -> (Self, Rc<RefCell<DeviceState>>) {
        let state = Rc::new(RefCell::new(DeviceState::new(version)));
        (
            MockTransport {
                state: Rc::clone(&state),
            },
            state,
        )
    }

    fn check(&self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if !state.open {
            return Err(Error::NotConnected);
        }
        match state.failures.pop_front() {
            Some(e) => Err(Error::Transport(e)),
            None => Ok(()),
        }
    }
}

impl Transport for MockTransport {
    fn open(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if !state.open {
            state.open = true;
            state.open_count += 1;
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.state.borrow().open
    }

    fn close(&mut self) {
        let mut state = self.state.borrow_mut();
        if state.open {
            state.open = false;
            state.close_count += 1;
        }
    }

    fn control_in(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        buf: &mut [u8],
        _timeout: Duration,
    ) -> Result<usize> {
        self.check()?;
        let mut state = self.state.borrow_mut();
        state.events.push(Event::In {
            request,
            value,
            index,
            len: buf.len(),
        });
        Ok(state.handle_in(request, value, index, buf))
    }

    fn control_out(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        _timeout: Duration,
    ) -> Result<()> {
        self.check()?;
        let mut state = self.state.borrow_mut();
        state.events.push(Event::Out {
            request,
            value,
            index,
        });
        state.handle_out(request, value);
        Ok(())
    }

    fn hold_off(&mut self, duration: Duration) {
        self.state.borrow_mut().events.push(Event::HoldOff(duration));
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A session over a simulated device running `version`.
pub fn mock_wire(version: u8) -> (LittleWire<MockTransport>, Rc<RefCell<DeviceState>>) {
    mock_wire_with_config(version, Config::default())
}

pub fn mock_wire_with_config(
    version: u8,
    config: Config,
) -> (LittleWire<MockTransport>, Rc<RefCell<DeviceState>>) {
    init_logger();
    let (transport, state) = MockTransport::new(version);
    (LittleWire::with_transport(transport, config), state)
}

/// A session whose version handshake has already happened, with the event
/// log cleared.
pub fn ready_wire(version: u8) -> (LittleWire<MockTransport>, Rc<RefCell<DeviceState>>) {
    let (mut wire, state) = mock_wire(version);
    wire.version().expect("handshake");
    state.borrow_mut().clear_events();
    (wire, state)
}

pub fn out(function: Function, value: u16, index: u16) -> Event {
    Event::Out {
        request: function.code(),
        value,
        index,
    }
}

pub fn input(function: Function, value: u16, index: u16, len: usize) -> Event {
    Event::In {
        request: function.code(),
        value,
        index,
        len,
    }
}
