#![no_std]
#![no_main]
#![feature(abi_x86_interrupt)]

extern crate alloc;

#[path = "acpi.rs"]
pub mod acpi_platform;
pub mod arch;
pub mod backtrace;
pub mod driver;
pub mod error;
pub mod input;
pub mod limine;
#[path = "log.rs"]
pub mod logging;
pub mod mem;
pub mod qemu;
pub mod serial;
pub mod sse;
pub mod task;

pub use error::{KernelError, Result};

/// `usize -> u64`, lossless on x86_64; spares call sites an `as` cast that
/// would silently truncate on a narrower target.
pub trait UsizeExt {
    fn into_u64(self) -> u64;
}

impl UsizeExt for usize {
    fn into_u64(self) -> u64 {
        self as u64
    }
}

/// `u64 -> usize`, the reverse of [`UsizeExt`]; also lossless on x86_64.
pub trait U64Ext {
    fn into_usize(self) -> usize;
}

impl U64Ext for u64 {
    fn into_usize(self) -> usize {
        self as usize
    }
}

/// Brings every subsystem up in dependency order (§4.1-§4.7): memory before
/// anything that allocates, interrupts before anything that waits on them,
/// ACPI before the APIC init it feeds, PCI enumeration last since it's what
/// probes the xHCI controller and brings USB input online.
pub fn kernel_init() -> Result<()> {
    logging::init();
    mem::init()?;
    sse::init();
    arch::init();
    backtrace::init();

    match acpi_platform::init()? {
        ::acpi::InterruptModel::Apic(apic) => driver::apic::init(apic)?,
        _ => panic!("no APIC interrupt model reported by ACPI"),
    }

    task::scheduler::init();
    driver::pci::init();

    unsafe {
        x86_64::instructions::interrupts::enable();
    }

    Ok(())
}
