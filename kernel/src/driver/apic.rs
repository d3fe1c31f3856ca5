use acpi::platform::interrupt::Apic;
use alloc::alloc::Global;
use alloc::format;
use conquer_once::spin::OnceCell;
use spin::Mutex;
use x2apic::ioapic::{IoApic, IrqFlags, IrqMode, RedirectionTableEntry};
use x2apic::lapic::{xapic_base, LocalApic, LocalApicBuilder, TimerDivide, TimerMode};
use x86_64::instructions::port::Port;
use x86_64::PhysAddr;

use crate::arch::idt::InterruptIndex;
use crate::mem::map_mmio_hhdm;
use crate::Result;

pub static LAPIC: OnceCell<Mutex<LocalApic>> = OnceCell::uninit();
static IOAPICS: OnceCell<Mutex<alloc::vec::Vec<IoApic>>> = OnceCell::uninit();

const LAPIC_WINDOW_BYTES: u64 = 4096;
const IOAPIC_WINDOW_BYTES: u64 = 4096;

/// Legacy ISA IRQ for the PS/2 keyboard, redirected to [`InterruptIndex::Keyboard`].
const LEGACY_IRQ_KEYBOARD: u8 = 1;

pub fn init(apic: Apic<Global>) -> Result<()> {
    disable_8259();

    let lapic_id = init_lapic(apic.local_apic_address)?;

    let mut ioapics = alloc::vec::Vec::new();
    for io_apic in &apic.io_apics {
        let phys = PhysAddr::try_new(io_apic.address as u64)
            .map_err(|e| format!("physical address {:#p} is not valid", e.0 as *const ()))?;
        let virt = map_mmio_hhdm(phys, IOAPIC_WINDOW_BYTES);

        let mut ioapic = unsafe { IoApic::new(virt.as_u64()) };
        const OFFSET: u8 = 32;
        unsafe {
            ioapic.init(OFFSET);
        }

        // Only the legacy IRQs the design actually consumes are routed; the
        // rest stay masked until something claims them (e.g. xHCI's legacy
        // INTx line via `route_irq`).
        if (io_apic.global_system_interrupt_base..io_apic.global_system_interrupt_base + 24)
            .contains(&u32::from(LEGACY_IRQ_KEYBOARD))
        {
            let mut entry = RedirectionTableEntry::default();
            entry.set_mode(IrqMode::Fixed);
            entry.set_flags(IrqFlags::LEVEL_TRIGGERED | IrqFlags::LOW_ACTIVE);
            entry.set_vector(InterruptIndex::Keyboard as u8);
            entry.set_dest(u8::try_from(lapic_id).unwrap());
            unsafe {
                ioapic.set_table_entry(LEGACY_IRQ_KEYBOARD, entry);
                ioapic.enable_irq(LEGACY_IRQ_KEYBOARD);
            }
        }

        ioapics.push(ioapic);
    }
    IOAPICS.init_once(|| Mutex::new(ioapics));

    Ok(())
}

/// Routes a global system interrupt to `vector` on the first IOAPIC, for use
/// by drivers (xHCI) that were handed a legacy INTx line rather than MSI.
pub fn route_irq(gsi: u8, vector: u8, lapic_id: u8) {
    let mut ioapics = IOAPICS.get().expect("ioapics not initialized").lock();
    let ioapic = ioapics.first_mut().expect("no ioapic registered");
    let mut entry = RedirectionTableEntry::default();
    entry.set_mode(IrqMode::Fixed);
    entry.set_flags(IrqFlags::LEVEL_TRIGGERED | IrqFlags::LOW_ACTIVE);
    entry.set_vector(vector);
    entry.set_dest(lapic_id);
    unsafe {
        ioapic.set_table_entry(gsi, entry);
        ioapic.enable_irq(gsi);
    }
}

fn init_lapic(lapic_address: u64) -> Result<u32> {
    debug_assert_eq!(unsafe { xapic_base() }, lapic_address);
    let phys = PhysAddr::try_new(lapic_address)
        .map_err(|e| format!("physical address {:#p} is not valid", e.0 as *const ()))?;
    let virt = map_mmio_hhdm(phys, LAPIC_WINDOW_BYTES);

    let mut lapic = LocalApicBuilder::new()
        .timer_vector(InterruptIndex::Timer as usize)
        .error_vector(InterruptIndex::LapicErr as usize)
        .spurious_vector(InterruptIndex::Spurious as usize)
        .set_xapic_base(virt.as_u64())
        .timer_mode(TimerMode::Periodic)
        .timer_initial(312500)
        .timer_divide(TimerDivide::Div16)
        .build()?;

    unsafe {
        lapic.enable();
    }
    let id = unsafe { lapic.id() };
    LAPIC.init_once(move || Mutex::new(lapic));
    Ok(id)
}

fn disable_8259() {
    unsafe {
        let mut cmd_8259a = Port::<u8>::new(0x20);
        let mut data_8259a = Port::<u8>::new(0x21);
        let mut cmd_8259b = Port::<u8>::new(0xa0);
        let mut data_8259b = Port::<u8>::new(0xa1);

        let mut spin_port = Port::<u8>::new(0x80);
        let mut spin = || spin_port.write(0);

        cmd_8259a.write(0x11);
        cmd_8259b.write(0x11);
        spin();

        data_8259a.write(0xf8);
        data_8259b.write(0xff);
        spin();

        data_8259a.write(0b100);
        spin();

        data_8259b.write(0b10);
        spin();

        data_8259a.write(0x1);
        data_8259b.write(0x1);
        spin();

        data_8259a.write(u8::MAX);
        data_8259b.write(u8::MAX);
    };
}
