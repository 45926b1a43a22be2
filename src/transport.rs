pub type PortOffset = u16;

/// Byte-level access to the legacy I/O port range, as exposed by the
/// platform's port service. The engine delegates to this for every access
/// it does not service from shadow memory.
pub trait PortTransport {
    fn read_8(&mut self, offset: PortOffset) -> u8;
    fn write_8(&mut self, offset: PortOffset, value: u8);
}
