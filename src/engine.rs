use log::trace;

use crate::layout::{CMOS_ADDREG1, CMOS_ADDREG2, CMOS_DATAREG1, CMOS_DATAREG2, RTC_SIZE};
use crate::transport::{PortOffset, PortTransport};

/// One of the two independent address/data register pairs. Each bank folds
/// its 7-bit local addressing into a disjoint 128-byte half of RTC memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bank {
    One,
    Two,
}

impl Bank {
    fn base(self) -> usize {
        match self {
            Bank::One => 0x00,
            Bank::Two => 0x80,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PortKind {
    Address(Bank),
    Data(Bank),
}

fn classify(offset: PortOffset) -> Option<PortKind> {
    match offset {
        CMOS_ADDREG1 => Some(PortKind::Address(Bank::One)),
        CMOS_DATAREG1 => Some(PortKind::Data(Bank::One)),
        CMOS_ADDREG2 => Some(PortKind::Address(Bank::Two)),
        CMOS_DATAREG2 => Some(PortKind::Data(Bank::Two)),
        _ => None,
    }
}

/// Transient addressing state of the two-phase port protocol. A data-register
/// access always consumes it, matching bank or not; a second address-register
/// write before that replaces it outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum AddressingState {
    #[default]
    Idle,
    AddressPending { bank: Bank, offset: u8 },
}

fn absolute_offset(bank: Bank, raw: u8) -> usize {
    bank.base() + (raw & 0x7F) as usize
}

/// Emulation context for the legacy CMOS/RTC port protocol.
///
/// Intercepted byte accesses to the four address/data registers flow through
/// [`RtcEmulator::io_write_8`] and [`RtcEmulator::io_read_8`]; offsets marked
/// emulated are serviced from the shadow table, everything else is delegated
/// to the real transport. One context per running system, mirroring the
/// hardware's single addressing sequence.
pub struct RtcEmulator {
    emulated: [bool; RTC_SIZE],
    shadow: [u8; RTC_SIZE],
    state: AddressingState,
}

impl RtcEmulator {
    pub fn new() -> Self {
        Self {
            emulated: [false; RTC_SIZE],
            shadow: [0; RTC_SIZE],
            state: AddressingState::Idle,
        }
    }

    /// Replaces the emulation flag table. Configuration-time only; the
    /// protocol handlers never touch the flags.
    pub fn set_emulated_flags(&mut self, flags: [bool; RTC_SIZE]) {
        self.emulated = flags;
    }

    pub fn is_emulated(&self, offset: u8) -> bool {
        self.emulated[offset as usize]
    }

    /// Current shadow content at an absolute offset. Debug introspection;
    /// protocol reads are the real interface.
    pub fn shadow_byte(&self, offset: u8) -> u8 {
        self.shadow[offset as usize]
    }

    /// Write handler for the legacy port range.
    ///
    /// Address-register writes record the addressing state and always reach
    /// hardware. A data-register write with a matching pending bank and an
    /// emulated target offset lands in the shadow table instead; the
    /// hardware handshake is preserved by re-issuing the original read with
    /// the written value as its offset argument. Every other access is
    /// delegated untouched.
    pub fn io_write_8<T: PortTransport>(&mut self, hw: &mut T, offset: PortOffset, value: u8) {
        let kind = match classify(offset) {
            Some(kind) => kind,
            None => {
                hw.write_8(offset, value);
                return;
            }
        };

        match kind {
            PortKind::Address(bank) => {
                self.state = AddressingState::AddressPending {
                    bank,
                    offset: value,
                };
                // Hardware tracks addressing state too, for any offset we
                // do not emulate.
                hw.write_8(offset, value);
            }
            PortKind::Data(bank) => {
                let pending = std::mem::take(&mut self.state);
                if let AddressingState::AddressPending {
                    bank: pending_bank,
                    offset: target,
                } = pending
                {
                    if pending_bank == bank {
                        let abs = absolute_offset(bank, target);
                        if self.emulated[abs] {
                            self.shadow[abs] = value;
                            trace!(
                                "diverted write of {:02X} to emulated offset {:02X}",
                                value,
                                abs
                            );
                            // Acknowledge the sequence without exposing the
                            // byte to hardware.
                            hw.read_8(PortOffset::from(value));
                            return;
                        }
                    }
                }
                hw.write_8(offset, value);
            }
        }
    }

    /// Read handler for the legacy port range.
    ///
    /// The original read is always issued first so hardware side effects
    /// (latching, status flags) happen exactly as without the engine. The
    /// result is overridden from the shadow table only for a data-register
    /// read whose pending addressing state matches the register's bank and
    /// targets an emulated offset.
    pub fn io_read_8<T: PortTransport>(&mut self, hw: &mut T, offset: PortOffset) -> u8 {
        let mut result = hw.read_8(offset);

        let bank = match classify(offset) {
            Some(PortKind::Data(bank)) => bank,
            _ => return result,
        };

        let pending = std::mem::take(&mut self.state);
        if let AddressingState::AddressPending {
            bank: pending_bank,
            offset: target,
        } = pending
        {
            if pending_bank == bank {
                let abs = absolute_offset(pending_bank, target);
                if self.emulated[abs] {
                    trace!("read of emulated offset {:02X} served from shadow", abs);
                    result = self.shadow[abs];
                }
            }
        }

        result
    }
}

impl Default for RtcEmulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    enum Access {
        Read(PortOffset),
        Write(PortOffset, u8),
    }

    /// Fake transport recording every access; reads return the byte most
    /// recently written to the same port, else 0xFF.
    struct RecordingTransport {
        accesses: Vec<Access>,
        ports: std::collections::HashMap<PortOffset, u8>,
    }

    impl RecordingTransport {
        fn new() -> Self {
            Self {
                accesses: vec![],
                ports: std::collections::HashMap::new(),
            }
        }

        fn writes(&self) -> Vec<(PortOffset, u8)> {
            self.accesses
                .iter()
                .filter_map(|a| match a {
                    Access::Write(offset, value) => Some((*offset, *value)),
                    _ => None,
                })
                .collect()
        }

        fn reads(&self) -> Vec<PortOffset> {
            self.accesses
                .iter()
                .filter_map(|a| match a {
                    Access::Read(offset) => Some(*offset),
                    _ => None,
                })
                .collect()
        }
    }

    impl PortTransport for RecordingTransport {
        fn read_8(&mut self, offset: PortOffset) -> u8 {
            self.accesses.push(Access::Read(offset));
            self.ports.get(&offset).copied().unwrap_or(0xFF)
        }

        fn write_8(&mut self, offset: PortOffset, value: u8) {
            self.accesses.push(Access::Write(offset, value));
            self.ports.insert(offset, value);
        }
    }

    fn engine_with_emulated(offsets: &[u8]) -> RtcEmulator {
        let mut flags = [false; RTC_SIZE];
        for offset in offsets {
            flags[*offset as usize] = true;
        }
        let mut engine = RtcEmulator::new();
        engine.set_emulated_flags(flags);
        engine
    }

    #[test]
    fn unrelated_ports_pass_through() {
        let mut engine = RtcEmulator::new();
        let mut hw = RecordingTransport::new();

        engine.io_write_8(&mut hw, 0x60, 0xAB);
        let value = engine.io_read_8(&mut hw, 0x60);

        assert_eq!(value, 0xAB);
        assert_eq!(hw.writes(), vec![(0x60, 0xAB)]);
        assert_eq!(hw.reads(), vec![0x60]);
    }

    #[test]
    fn non_emulated_offset_is_transparent() {
        let mut engine = RtcEmulator::new();
        let mut hw = RecordingTransport::new();

        engine.io_write_8(&mut hw, CMOS_ADDREG1, 0x10);
        engine.io_write_8(&mut hw, CMOS_DATAREG1, 0x42);

        assert_eq!(hw.writes(), vec![(CMOS_ADDREG1, 0x10), (CMOS_DATAREG1, 0x42)]);

        engine.io_write_8(&mut hw, CMOS_ADDREG1, 0x10);
        let value = engine.io_read_8(&mut hw, CMOS_DATAREG1);
        assert_eq!(value, 0x42);
    }

    #[test]
    fn emulated_offset_round_trips_through_shadow() {
        let mut engine = engine_with_emulated(&[0x34]);
        let mut hw = RecordingTransport::new();

        engine.io_write_8(&mut hw, CMOS_ADDREG1, 0x34);
        engine.io_write_8(&mut hw, CMOS_DATAREG1, 0x99);

        // The data write never reaches hardware.
        assert_eq!(hw.writes(), vec![(CMOS_ADDREG1, 0x34)]);

        engine.io_write_8(&mut hw, CMOS_ADDREG1, 0x34);
        let value = engine.io_read_8(&mut hw, CMOS_DATAREG1);
        assert_eq!(value, 0x99);
        assert_eq!(engine.shadow_byte(0x34), 0x99);
    }

    #[test]
    fn diverted_write_issues_handshake_read() {
        let mut engine = engine_with_emulated(&[0x34]);
        let mut hw = RecordingTransport::new();

        engine.io_write_8(&mut hw, CMOS_ADDREG1, 0x34);
        engine.io_write_8(&mut hw, CMOS_DATAREG1, 0x99);

        // The suppressed write is replaced by a read carrying the value.
        assert_eq!(hw.reads(), vec![0x99]);
    }

    #[test]
    fn bank_two_folds_into_upper_half() {
        let mut engine = engine_with_emulated(&[0xB4]);
        let mut hw = RecordingTransport::new();

        // Raw offset 0x34 through bank 2 addresses absolute 0xB4.
        engine.io_write_8(&mut hw, CMOS_ADDREG2, 0x34);
        engine.io_write_8(&mut hw, CMOS_DATAREG2, 0x05);

        assert_eq!(engine.shadow_byte(0xB4), 0x05);
        assert_eq!(hw.writes(), vec![(CMOS_ADDREG2, 0x34)]);
    }

    #[test]
    fn banks_are_isolated() {
        let mut engine = engine_with_emulated(&[0x34, 0xB4]);
        let mut hw = RecordingTransport::new();

        engine.io_write_8(&mut hw, CMOS_ADDREG1, 0x34);
        engine.io_write_8(&mut hw, CMOS_DATAREG1, 0x11);

        engine.io_write_8(&mut hw, CMOS_ADDREG2, 0x34);
        let value = engine.io_read_8(&mut hw, CMOS_DATAREG2);

        // Bank 2 never observes bank 1's shadow byte.
        assert_ne!(value, 0x11);
        assert_eq!(engine.shadow_byte(0x34), 0x11);
        assert_eq!(engine.shadow_byte(0xB4), 0x00);
    }

    #[test]
    fn high_bit_of_raw_offset_is_masked() {
        let mut engine = engine_with_emulated(&[0x34]);
        let mut hw = RecordingTransport::new();

        // Bit 7 selects NMI masking on real hardware, not an offset.
        engine.io_write_8(&mut hw, CMOS_ADDREG1, 0xB4);
        engine.io_write_8(&mut hw, CMOS_DATAREG1, 0x77);

        assert_eq!(engine.shadow_byte(0x34), 0x77);
    }

    #[test]
    fn second_address_write_replaces_the_first() {
        let mut engine = engine_with_emulated(&[0x10, 0x20]);
        let mut hw = RecordingTransport::new();

        engine.io_write_8(&mut hw, CMOS_ADDREG1, 0x10);
        engine.io_write_8(&mut hw, CMOS_ADDREG1, 0x20);
        engine.io_write_8(&mut hw, CMOS_DATAREG1, 0x42);

        assert_eq!(engine.shadow_byte(0x10), 0x00);
        assert_eq!(engine.shadow_byte(0x20), 0x42);
    }

    #[test]
    fn mismatched_bank_delegates_and_clears_state() {
        let mut engine = engine_with_emulated(&[0x34]);
        let mut hw = RecordingTransport::new();

        engine.io_write_8(&mut hw, CMOS_ADDREG1, 0x34);
        engine.io_write_8(&mut hw, CMOS_DATAREG2, 0x42);

        // Wrong bank: the write reaches hardware and consumes the state.
        assert_eq!(
            hw.writes(),
            vec![(CMOS_ADDREG1, 0x34), (CMOS_DATAREG2, 0x42)]
        );
        assert_eq!(engine.shadow_byte(0x34), 0x00);

        // The abandoned sequence does not leak into the next data access.
        engine.io_write_8(&mut hw, CMOS_DATAREG1, 0x43);
        assert_eq!(engine.shadow_byte(0x34), 0x00);
    }

    #[test]
    fn data_access_without_pending_state_delegates() {
        let mut engine = engine_with_emulated(&[0x34]);
        let mut hw = RecordingTransport::new();

        engine.io_write_8(&mut hw, CMOS_DATAREG1, 0x42);
        assert_eq!(hw.writes(), vec![(CMOS_DATAREG1, 0x42)]);

        let value = engine.io_read_8(&mut hw, CMOS_DATAREG1);
        assert_eq!(value, 0x42);
    }

    #[test]
    fn baseline_read_is_always_issued_first() {
        let mut engine = engine_with_emulated(&[0x34]);
        let mut hw = RecordingTransport::new();

        engine.io_write_8(&mut hw, CMOS_ADDREG1, 0x34);
        engine.io_write_8(&mut hw, CMOS_DATAREG1, 0x99);
        engine.io_write_8(&mut hw, CMOS_ADDREG1, 0x34);
        let value = engine.io_read_8(&mut hw, CMOS_DATAREG1);

        assert_eq!(value, 0x99);
        // Handshake read plus the baseline read of the data register.
        assert_eq!(hw.reads(), vec![0x99, CMOS_DATAREG1]);
    }

    #[test]
    fn read_consumes_state_even_when_not_emulated() {
        let mut engine = RtcEmulator::new();
        let mut hw = RecordingTransport::new();

        engine.io_write_8(&mut hw, CMOS_ADDREG1, 0x10);
        let _ = engine.io_read_8(&mut hw, CMOS_DATAREG1);

        // State was consumed; a bare data read afterwards sees hardware.
        assert_eq!(engine.state, AddressingState::Idle);
    }
}
