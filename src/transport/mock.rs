//! Mock I2C bus implementation for testing
//!
//! This module provides an in-memory ST25DV that can be used to exercise the
//! tag driver without an adapter or a tag. It answers on the system and user
//! device addresses, stores written bytes, emulates the I2C security session
//! and records every transaction for later inspection.

use crate::password::{PASSWORD_FRAME_LEN, PASSWORD_LEN, PRESENT_PASSWORD_MARKER};
use crate::registers::{MemorySpace, Register, I2C_PWD_OFFSET, SYSTEM_DEVICE_ADDR, USER_DEVICE_ADDR};
use crate::transport::{I2cTransport, TransportError};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

/// UID programmed into a fresh mock tag (LSB first, as read from 0x0018)
pub const MOCK_UID: [u8; 8] = [0x44, 0x33, 0x22, 0x11, 0x00, 0x26, 0x02, 0xE0];

/// One recorded bus operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    Exchange {
        target: u8,
        write: Vec<u8>,
        read_len: usize,
    },
    PollAck {
        target: u8,
    },
}

impl Transaction {
    /// Memory offset carried in the first two bytes of an exchange
    pub fn offset(&self) -> Option<u16> {
        match self {
            Transaction::Exchange { write, .. } if write.len() >= 2 => {
                Some(u16::from_be_bytes([write[0], write[1]]))
            }
            _ => None,
        }
    }

    /// Payload bytes of a write exchange (everything after the offset)
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Transaction::Exchange { write, .. } if write.len() >= 2 => Some(&write[2..]),
            _ => None,
        }
    }

    pub fn target(&self) -> u8 {
        match self {
            Transaction::Exchange { target, .. } | Transaction::PollAck { target } => *target,
        }
    }

    pub fn is_exchange(&self) -> bool {
        matches!(self, Transaction::Exchange { .. })
    }
}

#[derive(Debug)]
struct MockState {
    system: HashMap<u16, u8>,
    user: HashMap<u16, u8>,
    password: [u8; PASSWORD_LEN],
    session_open: bool,
    accept_passwords: bool,
    ack_script: VecDeque<bool>,
    ack_default: bool,
    log: Vec<Transaction>,
    next_error: Option<TransportError>,
}

impl MockState {
    fn memory(&mut self, space: MemorySpace) -> &mut HashMap<u16, u8> {
        match space {
            MemorySpace::System => &mut self.system,
            MemorySpace::User => &mut self.user,
        }
    }

    fn read_byte(&self, space: MemorySpace, offset: u16) -> u8 {
        if space == MemorySpace::User && offset == Register::I2cSsoDyn.descriptor().offset {
            return u8::from(self.session_open);
        }
        let memory = match space {
            MemorySpace::System => &self.system,
            MemorySpace::User => &self.user,
        };
        memory.get(&offset).copied().unwrap_or(0)
    }

    fn present_password(&mut self, payload: &[u8]) {
        let matches = payload.len() == PASSWORD_FRAME_LEN
            && payload[PASSWORD_LEN] == PRESENT_PASSWORD_MARKER
            && payload[..PASSWORD_LEN] == self.password
            && payload[PASSWORD_LEN + 1..] == self.password;
        self.session_open = matches && self.accept_passwords;
    }
}

/// Mock bus that simulates one ST25DV tag.
///
/// Clones share state, so a test can keep a handle for inspection while the
/// driver owns another.
#[derive(Clone)]
pub struct MockI2cBus {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockI2cBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MockI2cBus {
    /// A KC-series tag with factory password, closed session and an
    /// always-acknowledging write poll.
    pub fn new() -> Self {
        let mut state = MockState {
            system: HashMap::new(),
            user: HashMap::new(),
            password: [0u8; PASSWORD_LEN],
            session_open: false,
            accept_passwords: true,
            ack_script: VecDeque::new(),
            ack_default: true,
            log: Vec::new(),
            next_error: None,
        };

        let ic_ref = Register::IcRef.descriptor().offset;
        state.system.insert(ic_ref, 0x51);
        let uid = Register::Uid.descriptor().offset;
        for (i, b) in MOCK_UID.iter().enumerate() {
            state.system.insert(uid + i as u16, *b);
        }
        // 2048 blocks of 4 bytes
        let mem_size = Register::MemSize.descriptor().offset;
        state.system.insert(mem_size, 0xFF);
        state.system.insert(mem_size + 1, 0x07);
        state.system.insert(Register::BlkSize.descriptor().offset, 0x03);

        MockI2cBus {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replace the IC_REF byte
    pub fn with_ic_ref(self, ic_ref: u8) -> Self {
        self.load(
            MemorySpace::System,
            Register::IcRef.descriptor().offset,
            &[ic_ref],
        );
        self
    }

    /// Program a non-default I2C password
    pub fn with_password(self, password: [u8; PASSWORD_LEN]) -> Self {
        self.lock().password = password;
        self
    }

    pub fn with_session_open(self, open: bool) -> Self {
        self.set_session_open(open);
        self
    }

    /// Make the tag reject every password presentation
    pub fn rejecting_passwords(self) -> Self {
        self.lock().accept_passwords = false;
        self
    }

    /// Make every acknowledgment poll fail
    pub fn never_ack(self) -> Self {
        self.lock().ack_default = false;
        self
    }

    pub fn set_session_open(&self, open: bool) {
        self.lock().session_open = open;
    }

    pub fn session_open(&self) -> bool {
        self.lock().session_open
    }

    /// Queue answers for the next acknowledgment polls; once drained, polls
    /// fall back to the default answer.
    pub fn queue_ack_responses(&self, responses: &[bool]) {
        self.lock().ack_script.extend(responses.iter().copied());
    }

    /// Fail the next exchange or poll with `error`
    pub fn fail_next(&self, error: TransportError) {
        self.lock().next_error = Some(error);
    }

    /// Write bytes directly into simulated memory, bypassing the log
    pub fn load(&self, space: MemorySpace, offset: u16, bytes: &[u8]) {
        let mut state = self.lock();
        let memory = state.memory(space);
        for (i, b) in bytes.iter().enumerate() {
            memory.insert(offset.wrapping_add(i as u16), *b);
        }
    }

    /// Read simulated memory directly, bypassing the log
    pub fn peek(&self, space: MemorySpace, offset: u16, len: usize) -> Vec<u8> {
        let state = self.lock();
        (0..len)
            .map(|i| state.read_byte(space, offset.wrapping_add(i as u16)))
            .collect()
    }

    /// All recorded transactions, oldest first
    pub fn transactions(&self) -> Vec<Transaction> {
        self.lock().log.clone()
    }

    /// Recorded exchanges only
    pub fn exchanges(&self) -> Vec<Transaction> {
        self.lock()
            .log
            .iter()
            .filter(|t| t.is_exchange())
            .cloned()
            .collect()
    }

    pub fn exchange_count(&self) -> usize {
        self.lock().log.iter().filter(|t| t.is_exchange()).count()
    }

    pub fn poll_count(&self) -> usize {
        self.lock().log.iter().filter(|t| !t.is_exchange()).count()
    }

    pub fn clear_log(&self) {
        self.lock().log.clear();
    }
}

fn space_for(target: u8) -> Option<MemorySpace> {
    match target {
        SYSTEM_DEVICE_ADDR => Some(MemorySpace::System),
        USER_DEVICE_ADDR => Some(MemorySpace::User),
        _ => None,
    }
}

impl I2cTransport for MockI2cBus {
    fn exchange(
        &mut self,
        target: u8,
        write: &[u8],
        read_len: usize,
    ) -> Result<Vec<u8>, TransportError> {
        let mut state = self.lock();
        state.log.push(Transaction::Exchange {
            target,
            write: write.to_vec(),
            read_len,
        });

        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        let space = space_for(target).ok_or(TransportError::Nack { target })?;
        if write.len() < 2 {
            return Err(TransportError::Bus(format!(
                "exchange on 0x{target:02X} without a memory offset"
            )));
        }
        let offset = u16::from_be_bytes([write[0], write[1]]);
        let payload = &write[2..];

        if space == MemorySpace::System && offset == I2C_PWD_OFFSET && !payload.is_empty() {
            state.present_password(payload);
        } else if space == MemorySpace::User
            && offset == Register::I2cSsoDyn.descriptor().offset
        {
            // read-only on the chip
        } else {
            let memory = state.memory(space);
            for (i, b) in payload.iter().enumerate() {
                memory.insert(offset.wrapping_add(i as u16), *b);
            }
        }

        Ok((0..read_len)
            .map(|i| state.read_byte(space, offset.wrapping_add(i as u16)))
            .collect())
    }

    fn poll_ack(&mut self, target: u8) -> Result<bool, TransportError> {
        let mut state = self.lock();
        state.log.push(Transaction::PollAck { target });

        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        Ok(state.ack_script.pop_front().unwrap_or(state.ack_default))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_bus_creation() {
        let bus = MockI2cBus::new();
        assert_eq!(bus.transactions().len(), 0);
        assert!(!bus.session_open());
        assert_eq!(bus.peek(MemorySpace::System, 0x0017, 1), vec![0x51]);
        assert_eq!(bus.peek(MemorySpace::System, 0x0018, 8), MOCK_UID.to_vec());
    }

    #[test]
    fn test_write_then_read_echoes() {
        let mut bus = MockI2cBus::new();
        bus.exchange(USER_DEVICE_ADDR, &[0x00, 0x10, 0xAA, 0xBB], 0).unwrap();
        let read = bus.exchange(USER_DEVICE_ADDR, &[0x00, 0x10], 2).unwrap();
        assert_eq!(read, vec![0xAA, 0xBB]);
        // same offset in the other space is untouched
        assert_eq!(bus.peek(MemorySpace::System, 0x0010, 2), vec![0, 0]);
        assert_eq!(bus.exchange_count(), 2);
    }

    #[test]
    fn test_password_opens_session() {
        let mut bus = MockI2cBus::new();
        let mut frame = vec![0x09, 0x00];
        frame.extend_from_slice(&[0u8; 8]);
        frame.push(0x09);
        frame.extend_from_slice(&[0u8; 8]);

        bus.exchange(SYSTEM_DEVICE_ADDR, &frame, 0).unwrap();
        assert!(bus.session_open());
        assert_eq!(bus.exchange(USER_DEVICE_ADDR, &[0x20, 0x04], 1).unwrap(), vec![1]);
    }

    #[test]
    fn test_wrong_password_closes_session() {
        let mut bus = MockI2cBus::new().with_session_open(true);
        let mut frame = vec![0x09, 0x00];
        frame.extend_from_slice(&[1u8; 8]);
        frame.push(0x09);
        frame.extend_from_slice(&[1u8; 8]);

        bus.exchange(SYSTEM_DEVICE_ADDR, &frame, 0).unwrap();
        assert!(!bus.session_open());
    }

    #[test]
    fn test_ack_script_then_default() {
        let mut bus = MockI2cBus::new().never_ack();
        bus.queue_ack_responses(&[true]);
        assert!(bus.poll_ack(SYSTEM_DEVICE_ADDR).unwrap());
        assert!(!bus.poll_ack(SYSTEM_DEVICE_ADDR).unwrap());
        assert_eq!(bus.poll_count(), 2);
    }

    #[test]
    fn test_unknown_target_nacks() {
        let mut bus = MockI2cBus::new();
        assert!(matches!(
            bus.exchange(0x51, &[0x00, 0x00], 1),
            Err(TransportError::Nack { target: 0x51 })
        ));
    }

    #[test]
    fn test_injected_error_is_one_shot() {
        let mut bus = MockI2cBus::new();
        bus.fail_next(TransportError::Disconnected("unplugged".into()));
        assert!(bus.exchange(SYSTEM_DEVICE_ADDR, &[0x00, 0x17], 1).is_err());
        assert_eq!(bus.exchange(SYSTEM_DEVICE_ADDR, &[0x00, 0x17], 1).unwrap(), vec![0x51]);
    }
}
