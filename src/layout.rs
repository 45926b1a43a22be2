//! CMOS port numbers and the offset map of the 256-byte RTC memory.
//!
//! The offset constants document what the platform stores where; the engine
//! itself treats every offset uniformly and never interprets these bytes.

use crate::transport::PortOffset;

/// Address register of bank 1 (offsets 0x00-0x7F).
pub const CMOS_ADDREG1: PortOffset = 0x70;
/// Data register of bank 1.
pub const CMOS_DATAREG1: PortOffset = 0x71;
/// Address register of bank 2 (offsets 0x80-0xFF).
pub const CMOS_ADDREG2: PortOffset = 0x72;
/// Data register of bank 2.
pub const CMOS_DATAREG2: PortOffset = 0x73;

/// All platform firmware cares about 256 bytes of RTC memory.
pub const RTC_SIZE: usize = 0x100;

pub const RTC_ADDRESS_SECONDS: u8 = 0x00; // R/W  Range 0..59
pub const RTC_ADDRESS_SECONDS_ALARM: u8 = 0x01; // R/W  Range 0..59
pub const RTC_ADDRESS_MINUTES: u8 = 0x02; // R/W  Range 0..59
pub const RTC_ADDRESS_MINUTES_ALARM: u8 = 0x03; // R/W  Range 0..59
pub const RTC_ADDRESS_HOURS: u8 = 0x04; // R/W  Range 1..12 or 0..23, bit 7 is AM/PM
pub const RTC_ADDRESS_HOURS_ALARM: u8 = 0x05; // R/W  Range 1..12 or 0..23, bit 7 is AM/PM
pub const RTC_ADDRESS_DAY_OF_THE_WEEK: u8 = 0x06; // R/W  Range 1..7
pub const RTC_ADDRESS_DAY_OF_THE_MONTH: u8 = 0x07; // R/W  Range 1..31
pub const RTC_ADDRESS_MONTH: u8 = 0x08; // R/W  Range 1..12
pub const RTC_ADDRESS_YEAR: u8 = 0x09; // R/W  Range 0..99
pub const RTC_ADDRESS_REGISTER_A: u8 = 0x0A; // R/W[0..6]  R0[7]
pub const RTC_ADDRESS_REGISTER_B: u8 = 0x0B; // R/W
pub const RTC_ADDRESS_REGISTER_C: u8 = 0x0C; // RO
pub const RTC_ADDRESS_REGISTER_D: u8 = 0x0D; // RO

/// The firmware checksum covers everything from this offset up.
pub const RTC_HASHED_ADDR: u8 = 0x0E;

/// Default background colour preference, may be set to 01 FE by the
/// firmware updater.
pub const RTC_BG_COLOUR_ADDR1: u8 = 0x30;
pub const RTC_BG_COLOUR_ADDR2: u8 = 0x31;

pub const RTC_CHECKSUM_ADDR1: u8 = 0x58;
pub const RTC_CHECKSUM_ADDR2: u8 = 0x59;

/// 0x5 - exit boot services, 0x4 - recovery.
pub const RTC_BOOT_STATUS_ADDR: u8 = 0x5C;

/// Hibernation key block written by the OS before hibernating.
pub const RTC_HIBERNATION_KEY_ADDR: u8 = 0x80;
pub const RTC_HIBERNATION_KEY_LEN: u8 = 0x2C;

/// Boot-target override used when blessing a volume for the next boot.
pub const RTC_BLESS_BOOT_TARGET: u8 = 0xAC;
/// 0x0 when booting into recovery, tied to the boot-status byte.
pub const RTC_RECOVERYCHECK_STATUS: u8 = 0xAF;

/// Power-management bytes maintained by the power daemon.
pub const RTC_POWER_BYTES_ADDR: u8 = 0xB0;
/// Power state byte inside the power-management block.
pub const RTC_POWER_BYTE_PM_ADDR: u8 = 0xB4;
pub const RTC_POWER_BYTES_LEN: u8 = 0x08;
