use core::panic::PanicInfo;

use log::error;
use x86_64::instructions::{hlt, interrupts};

/// There is nothing to unwind to: ring 0, one address space, no user
/// threads. Every panic halts the CPU.
pub fn handle_panic(info: &PanicInfo) -> ! {
    error!("{}", info);
    interrupts::disable();
    loop {
        hlt();
    }
}
