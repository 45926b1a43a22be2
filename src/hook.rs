use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};

use crate::engine::RtcEmulator;
use crate::transport::{PortOffset, PortTransport};

pub type ReadHandler = Box<dyn FnMut(PortOffset) -> u8>;
pub type WriteHandler = Box<dyn FnMut(PortOffset, u8)>;

#[derive(Debug)]
pub enum RouteError {
    TargetNotFound,
}

/// The host's handler-redirection facility: installing a handler yields the
/// one previously in place.
pub trait RedirectTarget {
    fn route_read(&mut self, handler: ReadHandler) -> Result<ReadHandler, RouteError>;
    fn route_write(&mut self, handler: WriteHandler) -> Result<WriteHandler, RouteError>;
}

/// In-process handler substitution table. All port accesses the hosting
/// system issues for the legacy range are dispatched through it, so routing
/// a new handler here redirects the corresponding entry point.
pub struct HandlerTable {
    read: ReadHandler,
    write: WriteHandler,
}

impl HandlerTable {
    pub fn new(read: ReadHandler, write: WriteHandler) -> Self {
        Self { read, write }
    }

    pub fn read_8(&mut self, offset: PortOffset) -> u8 {
        (self.read)(offset)
    }

    pub fn write_8(&mut self, offset: PortOffset, value: u8) {
        (self.write)(offset, value)
    }
}

impl RedirectTarget for HandlerTable {
    fn route_read(&mut self, handler: ReadHandler) -> Result<ReadHandler, RouteError> {
        Ok(std::mem::replace(&mut self.read, handler))
    }

    fn route_write(&mut self, handler: WriteHandler) -> Result<WriteHandler, RouteError> {
        Ok(std::mem::replace(&mut self.write, handler))
    }
}

/// Original handlers captured at install time; the engine delegates every
/// access it does not service from shadow memory to these.
struct Originals {
    read: Option<ReadHandler>,
    write: Option<WriteHandler>,
}

impl PortTransport for Originals {
    fn read_8(&mut self, offset: PortOffset) -> u8 {
        match self.read.as_mut() {
            Some(read) => read(offset),
            // Only reachable while the read slot is unhooked; behaves like
            // an open bus.
            None => 0xFF,
        }
    }

    fn write_8(&mut self, offset: PortOffset, value: u8) {
        if let Some(write) = self.write.as_mut() {
            write(offset, value);
        }
    }
}

/// Installs the engine's read/write handlers over a redirection target,
/// retaining the displaced originals for delegation.
///
/// Installation is idempotent per slot: only the first successful call
/// redirects a handler, later calls observe the hooked state and return
/// without touching the target. A failed redirection is logged and leaves
/// that slot on real hardware.
pub struct RtcHook {
    engine: Rc<RefCell<RtcEmulator>>,
    originals: Rc<RefCell<Originals>>,
}

impl RtcHook {
    pub fn new(engine: Rc<RefCell<RtcEmulator>>) -> Self {
        Self {
            engine,
            originals: Rc::new(RefCell::new(Originals {
                read: None,
                write: None,
            })),
        }
    }

    /// Hooks both entry points. Returns false if either redirection failed;
    /// the feature then stays inactive for that entry point and accesses
    /// keep reaching real hardware.
    pub fn install(&self, target: &mut dyn RedirectTarget) -> bool {
        let read_ok = self.install_read(target);
        let write_ok = self.install_write(target);
        read_ok && write_ok
    }

    pub fn install_read(&self, target: &mut dyn RedirectTarget) -> bool {
        if self.originals.borrow().read.is_some() {
            return true;
        }

        let engine = Rc::clone(&self.engine);
        let originals = Rc::clone(&self.originals);
        let handler: ReadHandler = Box::new(move |offset| {
            let mut originals = originals.borrow_mut();
            engine.borrow_mut().io_read_8(&mut *originals, offset)
        });

        match target.route_read(handler) {
            Ok(previous) => {
                self.originals.borrow_mut().read = Some(previous);
                debug!("read interceptor installed");
                true
            }
            Err(err) => {
                warn!("installing the read interceptor failed: {:?}", err);
                false
            }
        }
    }

    pub fn install_write(&self, target: &mut dyn RedirectTarget) -> bool {
        if self.originals.borrow().write.is_some() {
            return true;
        }

        let engine = Rc::clone(&self.engine);
        let originals = Rc::clone(&self.originals);
        let handler: WriteHandler = Box::new(move |offset, value| {
            let mut originals = originals.borrow_mut();
            engine.borrow_mut().io_write_8(&mut *originals, offset, value)
        });

        match target.route_write(handler) {
            Ok(previous) => {
                self.originals.borrow_mut().write = Some(previous);
                debug!("write interceptor installed");
                true
            }
            Err(err) => {
                warn!("installing the write interceptor failed: {:?}", err);
                false
            }
        }
    }

    pub fn is_installed(&self) -> bool {
        let originals = self.originals.borrow();
        originals.read.is_some() && originals.write.is_some()
    }
}
