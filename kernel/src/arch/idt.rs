use conquer_once::spin::Lazy;
use log::info;
use seq_macro::seq;
use x86_64::structures::idt::{InterruptDescriptorTable, InterruptStackFrame, PageFaultErrorCode};
use x86_64::structures::paging::{Page, PageTableFlags, PhysFrame, Size4KiB};

use crate::driver::apic::LAPIC;
use crate::mem::{in_kernel_range, phys::PhysicalMemory, AddressSpace};
use crate::task;

static IDT: Lazy<InterruptDescriptorTable> = Lazy::new(|| {
    let mut idt = InterruptDescriptorTable::new();
    idt.divide_error.set_handler_fn(divide_error_handler);
    idt.breakpoint.set_handler_fn(breakpoint_handler);
    idt.page_fault.set_handler_fn(page_fault_handler);
    idt.overflow.set_handler_fn(overflow_handler);
    idt.general_protection_fault
        .set_handler_fn(general_protection_fault_handler);
    idt.stack_segment_fault
        .set_handler_fn(stack_segment_fault_handler);
    idt.segment_not_present
        .set_handler_fn(segment_not_present_fault_handler);
    idt.invalid_opcode.set_handler_fn(invalid_opcode_handler);
    unsafe {
        idt.double_fault
            .set_handler_fn(double_fault_handler)
            .set_stack_index(crate::arch::gdt::DOUBLE_FAULT_IST_INDEX);
    }

    seq!(VECTOR in 32..256 {
        idt[VECTOR].set_handler_fn(catch_all_handler::<VECTOR>);
    });

    idt[InterruptIndex::Timer as u8].set_handler_fn(timer_interrupt_handler);
    idt[InterruptIndex::Keyboard as u8].set_handler_fn(keyboard_interrupt_handler);
    idt[InterruptIndex::LapicErr as u8].set_handler_fn(lapic_err_interrupt_handler);
    idt[InterruptIndex::Spurious as u8].set_handler_fn(spurious_interrupt_handler);
    idt
});

pub fn init() {
    IDT.load();
}

/// Interrupt vectors. Exceptions live below 0x20; everything the design
/// assigns (§4.4) lives at or above it. The xHCI controller's vector is
/// whatever the PCI line/MSI assignment hands back at probe time, so it
/// isn't fixed here.
#[derive(Debug, Clone, Copy)]
#[repr(u8)]
pub enum InterruptIndex {
    Timer = 0x20,
    Keyboard = 0x21,
    LapicErr = 0x31,
    Spurious = 0xff,
}

extern "x86-interrupt" fn catch_all_handler<const VECTOR: usize>(
    _stack_frame: InterruptStackFrame,
) {
    unsafe {
        end_of_interrupt();
    }
}

extern "x86-interrupt" fn divide_error_handler(stack_frame: InterruptStackFrame) {
    panic!("EXCEPTION: DIVIDE ERROR\n{:#?}", stack_frame);
}

extern "x86-interrupt" fn lapic_err_interrupt_handler(stack_frame: InterruptStackFrame) {
    panic!("EXCEPTION: LAPIC ERROR\n{:#?}", stack_frame);
}

extern "x86-interrupt" fn spurious_interrupt_handler(_stack_frame: InterruptStackFrame) {
    // the local APIC doesn't expect an EOI for the spurious vector.
}

extern "x86-interrupt" fn general_protection_fault_handler(
    stack_frame: InterruptStackFrame,
    error_code: u64,
) {
    info!(
        "encountered a general protection fault, error code {} =",
        error_code
    );
    info!("index: {}", (error_code >> 3) & ((1 << 14) - 1));
    info!("tbl: {}", (error_code >> 1) & 0b11);
    info!("e: {}", error_code & 1);

    panic!("EXCEPTION: GENERAL PROTECTION FAULT\n{:#?}", stack_frame);
}

extern "x86-interrupt" fn breakpoint_handler(stack_frame: InterruptStackFrame) {
    info!("EXCEPTION: BREAKPOINT\n{:#?}", stack_frame);
}

extern "x86-interrupt" fn overflow_handler(stack_frame: InterruptStackFrame) {
    panic!("EXCEPTION: OVERFLOW\n{:#?}", stack_frame);
}

extern "x86-interrupt" fn double_fault_handler(
    stack_frame: InterruptStackFrame,
    _error_code: u64,
) -> ! {
    panic!("EXCEPTION: DOUBLE FAULT\n{:#?}", stack_frame);
}

extern "x86-interrupt" fn stack_segment_fault_handler(
    stack_frame: InterruptStackFrame,
    error_code: u64,
) {
    panic!(
        "EXCEPTION: STACK SEGMENT FAULT\nerror code: {}\n{:#?}",
        error_code, stack_frame
    );
}

extern "x86-interrupt" fn segment_not_present_fault_handler(
    stack_frame: InterruptStackFrame,
    error_code: u64,
) {
    panic!(
        r#"EXCEPTION: SEGMENT NOT PRESENT FAULT
instruction pointer: {:p}
error code: {} ({:#b})
external: {}
table[index]: {}[{}]
{:#?}"#,
        stack_frame.instruction_pointer.as_u64() as *const u8,
        error_code,
        error_code,
        (error_code & 1) == 1,
        match (error_code & 0b110) >> 1 {
            0b00 => "GDT",
            0b01 => "IDT",
            0b10 => "LDT",
            0b11 => "IDT",
            _ => "unknown",
        },
        ((error_code & ((1 << 14) - 1)) >> 3),
        stack_frame
    );
}

extern "x86-interrupt" fn invalid_opcode_handler(stack_frame: InterruptStackFrame) {
    panic!("EXCEPTION: INVALID OPCODE\n{:#?}", stack_frame);
}

extern "x86-interrupt" fn timer_interrupt_handler(_stack_frame: InterruptStackFrame) {
    unsafe {
        end_of_interrupt();
    }

    // the timer only raises the flag; the actual switch happens at the next
    // voluntary yield from kernel code (§4.5).
    task::scheduler::request_reschedule();
}

/// Lazily backs any fault inside the kernel's own virtual range (heap window
/// plus MMIO window, see [`crate::mem::in_kernel_range`]) with a zeroed
/// frame. Anything else — including a write fault against a read-only
/// mapping — is an unrecoverable kernel bug.
extern "x86-interrupt" fn page_fault_handler(
    stack_frame: InterruptStackFrame,
    error_code: PageFaultErrorCode,
) {
    use x86_64::registers::control::Cr2;

    let accessed_address = Cr2::read().expect("CR2 should hold a valid virtual address on #PF");

    if error_code.contains(PageFaultErrorCode::PROTECTION_VIOLATION)
        || !in_kernel_range(accessed_address)
    {
        panic!(
            "EXCEPTION: PAGE FAULT\nAccessed Address: {:?}\nError Code: {:?}\n{:#?}",
            accessed_address, error_code, stack_frame
        );
    }

    let frame = PhysicalMemory::allocate_frame()
        .expect("out of physical memory while servicing a kernel page fault");
    let page = Page::<Size4KiB>::containing_address(accessed_address);
    AddressSpace::kernel()
        .map(
            page,
            PhysFrame::containing_address(frame.start_address()),
            PageTableFlags::PRESENT | PageTableFlags::WRITABLE | PageTableFlags::NO_EXECUTE,
        )
        .expect("lazily mapping a kernel-range page should never fail");
}

extern "x86-interrupt" fn keyboard_interrupt_handler(_stack_frame: InterruptStackFrame) {
    // legacy PS/2 IRQ1 is plumbing outside the core (§1); just acknowledge it
    // so a stray BIOS-routed interrupt doesn't wedge the IOAPIC.
    unsafe {
        end_of_interrupt();
    }
}

/// Notifies the LAPIC that the interrupt has been handled.
///
/// # Safety
/// This is unsafe since it writes to an LAPIC register.
#[inline]
pub unsafe fn end_of_interrupt() {
    LAPIC.get().unwrap().lock().end_of_interrupt();
}

#[cfg(feature = "kernel_test")]
mod tests {
    use kernel_test_framework::kernel_test;

    #[kernel_test]
    fn test_breakpoint_exception() {
        // invoke a breakpoint exception
        x86_64::instructions::interrupts::int3();
        // if this test returns that means that the interrupt handler is working
    }
}
