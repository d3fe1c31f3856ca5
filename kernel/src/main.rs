#![no_std]
#![no_main]

extern crate alloc;

use core::panic::PanicInfo;

use kernel::arch::panic::handle_panic;
use kernel::driver::hid;
use kernel::driver::usb;
use kernel::kernel_init;
use kernel::task::scheduler;
use log::{error, info};
use x86_64::instructions::hlt;

#[unsafe(no_mangle)]
extern "C" fn kernel_main() -> ! {
    kernel_init().expect("kernel_init failed");

    info!("kernel initialized, entering idle loop");

    loop {
        if scheduler::needs_reschedule() {
            scheduler::yield_now();
        }

        poll_usb();
        hlt();
    }
}

/// Drains controller completions and services every bound HID device, once
/// per idle-loop tick. There are no interrupts wired for USB completions
/// (§4.7's note on cooperative polling), so this is the only path that moves
/// keyboard/mouse input from the wire into [`kernel::input`].
fn poll_usb() {
    let controller = usb::controller();
    controller.host.poll();

    for device in controller.devices.lock().iter() {
        hid::driver::poll(device);
    }
}

#[cfg(not(test))]
#[panic_handler]
fn panic_handler(info: &PanicInfo) -> ! {
    error!("kernel panicked: {}", info);
    if let Some(location) = info.location() {
        error!("\tat {}:{}:{}", location.file(), location.line(), location.column());
    }

    handle_panic(info)
}
