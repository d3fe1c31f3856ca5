use log::debug;

pub mod gdt;
pub mod idt;
pub mod panic;
pub mod switch;

/// Brings the bootstrap processor to a state where exceptions, IRQs and the
/// cooperative scheduler can run. There is no separate per-CPU init step:
/// the design has no AP bring-up (§1 non-goals).
pub fn init() {
    gdt::init();
    idt::init();

    debug!("arch initialized");
}
