use std::cell::RefCell;
use std::rc::Rc;

use log::{info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use rtc_shadow::config::parse_offset_list;
use rtc_shadow::engine::RtcEmulator;
use rtc_shadow::hook::{HandlerTable, RtcHook};
use rtc_shadow::layout::{
    CMOS_ADDREG1, CMOS_ADDREG2, CMOS_DATAREG1, CMOS_DATAREG2, RTC_POWER_BYTE_PM_ADDR, RTC_SIZE,
};

/// Stand-in for the real CMOS chip: one 256-byte array behind two
/// bank-indexed register pairs.
struct CmosChip {
    mem: [u8; RTC_SIZE],
    index: [u8; 2],
}

impl CmosChip {
    fn new() -> Self {
        Self {
            mem: [0; RTC_SIZE],
            index: [0; 2],
        }
    }

    fn table(chip: Rc<RefCell<Self>>) -> HandlerTable {
        let read_chip = Rc::clone(&chip);
        HandlerTable::new(
            Box::new(move |offset| {
                let chip = read_chip.borrow();
                match offset {
                    CMOS_DATAREG1 => chip.mem[(chip.index[0] & 0x7F) as usize],
                    CMOS_DATAREG2 => chip.mem[0x80 + (chip.index[1] & 0x7F) as usize],
                    _ => 0xFF,
                }
            }),
            Box::new(move |offset, value| {
                let mut chip = chip.borrow_mut();
                match offset {
                    CMOS_ADDREG1 => chip.index[0] = value,
                    CMOS_ADDREG2 => chip.index[1] = value,
                    CMOS_DATAREG1 => {
                        let index = (chip.index[0] & 0x7F) as usize;
                        chip.mem[index] = value;
                    }
                    CMOS_DATAREG2 => {
                        let index = 0x80 + (chip.index[1] & 0x7F) as usize;
                        chip.mem[index] = value;
                    }
                    _ => {}
                }
            }),
        )
    }
}

fn main() {
    TermLogger::init(
        LevelFilter::Debug,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .unwrap();

    let mut engine = RtcEmulator::new();
    match std::env::args().nth(1) {
        Some(exclude) => engine.set_emulated_flags(parse_offset_list(&exclude)),
        None => info!("no offset list specified, running in pass-through test mode"),
    }
    let engine = Rc::new(RefCell::new(engine));

    let chip = Rc::new(RefCell::new(CmosChip::new()));
    let mut table = CmosChip::table(Rc::clone(&chip));

    let hook = RtcHook::new(Rc::clone(&engine));
    // The real service hooks its provider on both attach and start; the
    // second call is a no-op.
    hook.install(&mut table);
    hook.install(&mut table);

    // Write the power-management state byte through bank 2, then read it
    // back the same way.
    let raw = RTC_POWER_BYTE_PM_ADDR & 0x7F;
    table.write_8(CMOS_ADDREG2, raw);
    table.write_8(CMOS_DATAREG2, 0x05);
    table.write_8(CMOS_ADDREG2, raw);
    let value = table.read_8(CMOS_DATAREG2);

    info!(
        "offset {:02X}: protocol read returned {:02X}, chip holds {:02X}",
        RTC_POWER_BYTE_PM_ADDR,
        value,
        chip.borrow().mem[RTC_POWER_BYTE_PM_ADDR as usize]
    );
}
