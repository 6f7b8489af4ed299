//! I2C sub-protocol encoding against the simulated device.

mod common;

use common::{input, ready_wire, Event};
use littlewire::{Error, Function, I2cDirection};

fn raw_in(request: u8, value: u16, index: u16) -> Event {
    Event::In {
        request,
        value,
        index,
        len: 8,
    }
}

#[test]
fn test_init_runs_once_per_session() {
    let (mut wire, state) = ready_wire(0x13);
    wire.i2c().unwrap();
    wire.i2c().unwrap();
    assert_eq!(state.borrow().count(Function::I2cInit), 1);

    wire.finished();
    wire.i2c().unwrap();
    assert_eq!(state.borrow().count(Function::I2cInit), 2);
}

#[test]
fn test_start_encodes_address_and_direction() {
    let (mut wire, state) = ready_wire(0x13);
    state.borrow_mut().i2c_devices = vec![0x48];
    let mut i2c = wire.i2c().unwrap();
    state.borrow_mut().clear_events();

    assert!(i2c.start(0x48, I2cDirection::Write).unwrap());
    assert!(!i2c.start(0x49, I2cDirection::Read).unwrap());

    assert_eq!(
        state.borrow().transfers(),
        vec![
            input(Function::I2cBegin, 0x90, 0, 8),
            input(Function::ReadBuffer, 0, 0, 8),
            input(Function::I2cBegin, 0x93, 0, 8),
            input(Function::ReadBuffer, 0, 0, 8),
        ]
    );
}

#[test]
fn test_address_out_of_range_sends_nothing() {
    let (mut wire, state) = ready_wire(0x13);
    let mut i2c = wire.i2c().unwrap();
    state.borrow_mut().clear_events();

    assert!(matches!(
        i2c.start(128, I2cDirection::Write),
        Err(Error::I2cAddressOutOfRange(128))
    ));
    assert!(matches!(
        i2c.transmit(200, &[1]),
        Err(Error::I2cAddressOutOfRange(200))
    ));
    assert!(state.borrow().events.is_empty());
}

#[test]
fn test_write_chunks_with_stop_on_last() {
    let (mut wire, state) = ready_wire(0x13);
    let mut i2c = wire.i2c().unwrap();
    state.borrow_mut().clear_events();

    i2c.write(&[1, 2, 3, 4, 5, 6, 7, 8, 9], true).unwrap();
    assert_eq!(
        state.borrow().transfers(),
        vec![
            raw_in(0xE4, 0x0201, 0x0403),
            raw_in(0xE4, 0x0605, 0x0807),
            raw_in(0xE9, 0x0009, 0x0000),
        ]
    );

    state.borrow_mut().clear_events();
    i2c.write(&[0xAA, 0xBB, 0xCC, 0xDD], false).unwrap();
    assert_eq!(
        state.borrow().transfers(),
        vec![raw_in(0xE4, 0xBBAA, 0xDDCC)]
    );
}

#[test]
fn test_empty_write_with_stop_is_stop_only() {
    let (mut wire, state) = ready_wire(0x13);
    let mut i2c = wire.i2c().unwrap();
    state.borrow_mut().clear_events();

    i2c.write(&[], false).unwrap();
    assert!(state.borrow().events.is_empty());

    i2c.write(&[], true).unwrap();
    i2c.stop().unwrap();
    assert_eq!(
        state.borrow().transfers(),
        vec![raw_in(0xE8, 0, 0), raw_in(0xE8, 0, 0)]
    );
}

#[test]
fn test_read_encodes_length_stop_and_nack() {
    let (mut wire, state) = ready_wire(0x13);
    state.borrow_mut().i2c_data = vec![0xDE, 0xAD, 0xBE, 0xEF];
    let mut i2c = wire.i2c().unwrap();
    state.borrow_mut().clear_events();

    assert_eq!(i2c.read(2, true, true).unwrap(), vec![0xDE, 0xAD]);
    assert_eq!(i2c.read(3, false, false).unwrap(), vec![0xDE, 0xAD, 0xBE]);
    assert_eq!(
        state.borrow().transfers(),
        vec![
            input(Function::I2cRead, 0x0201, 1, 8),
            input(Function::ReadBuffer, 0, 0, 8),
            input(Function::I2cRead, 0x0300, 0, 8),
            input(Function::ReadBuffer, 0, 0, 8),
        ]
    );

    assert!(matches!(
        i2c.read(9, true, true),
        Err(Error::OperationTooLarge { max: 8, actual: 9 })
    ));
}

#[test]
fn test_transmit_and_request() {
    let (mut wire, state) = ready_wire(0x13);
    {
        let mut state = state.borrow_mut();
        state.i2c_devices = vec![0x50];
        state.i2c_data = vec![0x12, 0x34];
    }
    let mut i2c = wire.i2c().unwrap();

    i2c.transmit(0x50, &[0x00, 0x10]).unwrap();
    assert_eq!(i2c.request(0x50, 2).unwrap(), vec![0x12, 0x34]);

    match i2c.transmit(0x51, &[0x00]) {
        Err(Error::DeviceUnresponsive { address }) => assert_eq!(address, 0x51),
        other => panic!("expected DeviceUnresponsive, got {:?}", other),
    }
    assert!(matches!(
        i2c.request(0x51, 1),
        Err(Error::DeviceUnresponsive { address: 0x51 })
    ));
}

#[test]
fn test_search_finds_exactly_the_responding_addresses() {
    let (mut wire, state) = ready_wire(0x13);
    state.borrow_mut().i2c_devices = vec![0x00, 0x3C, 0x68, 0x7F];
    let mut i2c = wire.i2c().unwrap();
    state.borrow_mut().clear_events();

    let first = i2c.search().unwrap();
    assert_eq!(first, vec![0x00, 0x3C, 0x68, 0x7F]);
    assert_eq!(state.borrow().count(Function::I2cBegin), 128);

    let second = i2c.search().unwrap();
    assert_eq!(first, second);
    assert!(i2c.address_responds(0x3C).unwrap());
    assert!(!i2c.address_responds(0x3D).unwrap());
}

#[test]
fn test_set_delay() {
    let (mut wire, state) = ready_wire(0x13);
    let mut i2c = wire.i2c().unwrap();
    state.borrow_mut().clear_events();
    i2c.set_delay(10).unwrap();
    assert_eq!(
        state.borrow().transfers(),
        vec![common::out(Function::I2cUpdateDelay, 10, 0)]
    );
}

#[test]
fn test_firmware_1_2_still_works() {
    let (mut wire, state) = ready_wire(0x12);
    state.borrow_mut().i2c_devices = vec![0x20];
    let found = wire.i2c().unwrap().search().unwrap();
    assert_eq!(found, vec![0x20]);
}
