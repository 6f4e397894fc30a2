//! Memory-mapped device model
//!
//! A registry maps 32-bit device IDs to handlers reached through the
//! `snd` opcode: `handle(device_id, command, argument) -> word`.
//! Unknown devices and unknown commands answer 0.

use irre_spec::Word;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Conventional device IDs
pub mod device_ids {
    use irre_spec::Word;

    pub const CONSOLE: Word = 0;
    pub const TIMER: Word = 1;
    pub const INPUT: Word = 2;
    pub const STORAGE: Word = 3;
}

/// A device handler
pub trait Device {
    /// Handle a command sent with `snd`; the return value lands in the
    /// instruction's rC
    fn handle(&mut self, device_id: Word, command: Word, argument: Word) -> Word;

    /// Device name for debugging
    fn name(&self) -> &'static str;

    /// Reset device to its initial state
    fn reset(&mut self) {}
}

/// Console device command numbers
pub mod console_commands {
    use irre_spec::Word;

    pub const PUTCHAR: Word = 0;
    pub const CLEAR: Word = 2;
}

/// Text-output console.
///
/// The output buffer is shared: [`ConsoleDevice::output`] hands out a
/// handle that stays readable after the device moves into a registry.
pub struct ConsoleDevice {
    output: Rc<RefCell<String>>,
}

impl ConsoleDevice {
    pub fn new() -> Self {
        ConsoleDevice {
            output: Rc::new(RefCell::new(String::new())),
        }
    }

    /// Shared handle to the accumulated output buffer
    pub fn output(&self) -> Rc<RefCell<String>> {
        Rc::clone(&self.output)
    }
}

impl Default for ConsoleDevice {
    fn default() -> Self {
        ConsoleDevice::new()
    }
}

impl Device for ConsoleDevice {
    fn handle(&mut self, _device_id: Word, command: Word, argument: Word) -> Word {
        match command {
            console_commands::PUTCHAR => {
                self.output.borrow_mut().push((argument & 0xFF) as u8 as char);
                1
            }
            console_commands::CLEAR => {
                self.output.borrow_mut().clear();
                1
            }
            _ => 0,
        }
    }

    fn name(&self) -> &'static str {
        "console"
    }

    fn reset(&mut self) {
        self.output.borrow_mut().clear();
    }
}

/// A device that ignores every command
pub struct NullDevice;

impl Device for NullDevice {
    fn handle(&mut self, _device_id: Word, _command: Word, _argument: Word) -> Word {
        0
    }

    fn name(&self) -> &'static str {
        "null"
    }
}

/// Maps device IDs to handlers
#[derive(Default)]
pub struct DeviceRegistry {
    devices: HashMap<Word, Box<dyn Device>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        DeviceRegistry::default()
    }

    pub fn register(&mut self, device_id: Word, device: Box<dyn Device>) {
        self.devices.insert(device_id, device);
    }

    /// Route an access; unknown device answers 0
    pub fn access(&mut self, device_id: Word, command: Word, argument: Word) -> Word {
        match self.devices.get_mut(&device_id) {
            Some(device) => device.handle(device_id, command, argument),
            None => {
                tracing::warn!(device_id, command, "access to unregistered device");
                0
            }
        }
    }

    pub fn has_device(&self, device_id: Word) -> bool {
        self.devices.contains_key(&device_id)
    }

    pub fn get(&self, device_id: Word) -> Option<&dyn Device> {
        self.devices.get(&device_id).map(|d| d.as_ref())
    }

    pub fn reset_all(&mut self) {
        for device in self.devices.values_mut() {
            device.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_putchar() {
        let console = ConsoleDevice::new();
        let output = console.output();
        let mut registry = DeviceRegistry::new();
        registry.register(device_ids::CONSOLE, Box::new(console));

        assert_eq!(
            registry.access(device_ids::CONSOLE, console_commands::PUTCHAR, b'H' as Word),
            1
        );
        assert_eq!(
            registry.access(device_ids::CONSOLE, console_commands::PUTCHAR, b'i' as Word),
            1
        );
        assert_eq!(*output.borrow(), "Hi");
    }

    #[test]
    fn test_console_putchar_uses_low_byte() {
        let mut console = ConsoleDevice::new();
        let output = console.output();
        console.handle(0, console_commands::PUTCHAR, 0x1234_5641); // low byte 'A'
        assert_eq!(*output.borrow(), "A");
    }

    #[test]
    fn test_console_clear() {
        let mut console = ConsoleDevice::new();
        let output = console.output();
        console.handle(0, console_commands::PUTCHAR, b'x' as Word);
        assert_eq!(console.handle(0, console_commands::CLEAR, 0), 1);
        assert!(output.borrow().is_empty());
    }

    #[test]
    fn test_unknown_command_returns_zero() {
        let mut console = ConsoleDevice::new();
        assert_eq!(console.handle(0, 99, 0), 0);
    }

    #[test]
    fn test_unknown_device_returns_zero() {
        let mut registry = DeviceRegistry::new();
        assert_eq!(registry.access(42, 0, 0), 0);
        assert!(!registry.has_device(42));
    }

    #[test]
    fn test_null_device() {
        let mut registry = DeviceRegistry::new();
        registry.register(7, Box::new(NullDevice));
        assert_eq!(registry.access(7, 0, 123), 0);
        assert_eq!(registry.get(7).unwrap().name(), "null");
    }

    #[test]
    fn test_reset_all() {
        let console = ConsoleDevice::new();
        let output = console.output();
        let mut registry = DeviceRegistry::new();
        registry.register(device_ids::CONSOLE, Box::new(console));
        registry.access(device_ids::CONSOLE, console_commands::PUTCHAR, b'z' as Word);
        registry.reset_all();
        assert!(output.borrow().is_empty());
    }
}
