//! Cooperative round-robin scheduler over a fixed array of tasks (§4.5).
//!
//! Every task runs in the kernel's single shared address space, so a
//! context switch is nothing more than swapping `%rsp` — see
//! [`crate::arch::switch::switch`]. The timer IRQ never switches directly;
//! it only raises [`request_reschedule`]'s flag, and the actual switch
//! happens the next time kernel code calls [`yield_now`].

use core::sync::atomic::{AtomicBool, Ordering};

use spin::Mutex;

use crate::arch::switch::switch;

const MAX_TASKS: usize = 32;
const STACK_SIZE: usize = 16 * 1024;

pub type Pid = u64;

static NEED_RESCHED: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskState {
    Unused,
    Ready,
    Running,
    Blocked,
}

#[derive(Clone, Copy)]
struct Task {
    state: TaskState,
    pid: Pid,
    /// Saved `%rsp` while the task isn't running. Meaningless while `Running`.
    saved_sp: usize,
    stack: [u8; STACK_SIZE],
}

impl Task {
    const fn empty() -> Self {
        Task {
            state: TaskState::Unused,
            pid: 0,
            saved_sp: 0,
            stack: [0; STACK_SIZE],
        }
    }
}

struct Tasks {
    slots: [Task; MAX_TASKS],
    /// Index of the slot currently executing. Slot 0 is the boot task and is
    /// always `Running` or `Ready` — there is always something to run.
    current: usize,
    next_pid: Pid,
}

static TASKS: Mutex<Tasks> = Mutex::new(Tasks {
    slots: [Task::empty(); MAX_TASKS],
    current: 0,
    next_pid: 1,
});

/// Marks slot 0 as the boot task. Must run once, before any interrupt that
/// could call [`yield_now`] is unmasked.
pub fn init() {
    let mut tasks = TASKS.lock();
    tasks.slots[0].state = TaskState::Running;
    tasks.slots[0].pid = 0;
}

/// Registers a new task and returns its PID. The task starts `Ready`; it
/// becomes `Running` the next time the scheduler picks it.
///
/// # Panics
/// Panics if all 32 task slots are occupied.
pub fn add_task(entry: extern "C" fn(usize), arg: usize) -> Pid {
    let mut tasks = TASKS.lock();
    let pid = tasks.next_pid;
    tasks.next_pid += 1;

    let slot = tasks
        .slots
        .iter_mut()
        .find(|t| t.state == TaskState::Unused)
        .expect("no free task slots");

    slot.pid = pid;
    slot.saved_sp = init_stack(&mut slot.stack, entry, arg);
    slot.state = TaskState::Ready;
    pid
}

/// Marks `pid`'s slot `Unused`. If it was the running task, forces an
/// immediate reschedule — the caller never returns from this call in that
/// case, matching `yield_now`'s own contract.
pub fn kill(pid: Pid) {
    let mut was_running = false;
    {
        let mut tasks = TASKS.lock();
        if let Some(slot) = tasks.slots.iter_mut().find(|t| t.pid == pid && t.state != TaskState::Unused) {
            was_running = slot.state == TaskState::Running;
            slot.state = TaskState::Unused;
        }
    }
    if was_running {
        yield_now();
    }
}

/// Sets the "reschedule requested" flag. Called from the timer IRQ; the
/// actual switch happens at the next [`yield_now`].
pub fn request_reschedule() {
    NEED_RESCHED.store(true, Ordering::SeqCst);
}

/// Returns and clears whether a reschedule has been requested since the last
/// check. Idle loops poll this to decide whether to call [`yield_now`].
pub fn needs_reschedule() -> bool {
    NEED_RESCHED.swap(false, Ordering::SeqCst)
}

/// Switches to the next `Ready` slot, round-robin starting after the
/// current index. If no other task is ready, returns immediately without
/// switching.
pub fn yield_now() {
    NEED_RESCHED.store(false, Ordering::SeqCst);

    let (old_sp_ptr, new_sp): (*mut usize, usize) = {
        let mut tasks = TASKS.lock();
        let current = tasks.current;
        let next = match find_next_ready(&tasks, current) {
            Some(n) => n,
            None => return,
        };

        tasks.slots[current].state = TaskState::Ready;
        tasks.slots[next].state = TaskState::Running;
        tasks.current = next;

        let old_sp_ptr = &mut tasks.slots[current].saved_sp as *mut usize;
        let new_sp = tasks.slots[next].saved_sp;
        (old_sp_ptr, new_sp)
        // lock is dropped here, before the switch, since `switch` does not
        // return until this task is scheduled again — another task could
        // need the same lock in the meantime.
    };

    unsafe {
        switch(old_sp_ptr, new_sp as *const u8);
    }
}

fn find_next_ready(tasks: &Tasks, current: usize) -> Option<usize> {
    (1..=MAX_TASKS)
        .map(|offset| (current + offset) % MAX_TASKS)
        .find(|&i| tasks.slots[i].state == TaskState::Ready)
}

/// Entry trampoline every new task's stack is wound up to `ret` into. Calls
/// the real entry point and, once it returns, kills the task it's running
/// as — it never returns to its caller (§9: the first switch into a task
/// never returns along the switching call's stack).
extern "C" fn task_trampoline(entry: extern "C" fn(usize), arg: usize) -> ! {
    entry(arg);
    let pid = {
        let tasks = TASKS.lock();
        tasks.slots[tasks.current].pid
    };
    kill(pid);
    unreachable!("a killed running task must not resume");
}

/// Lays out a fake saved-register frame at the top of `stack` so that the
/// first `switch()` into this task pops straight into [`task_trampoline`]
/// with `entry`/`arg` already sitting in the registers SysV passes them in.
fn init_stack(stack: &mut [u8; STACK_SIZE], entry: extern "C" fn(usize), arg: usize) -> usize {
    // 17 pushed words (rflags, rax, rcx, rdx, rbx, pad, rbp, rsi, rdi, r8..r15)
    // plus the trampoline's return address; keep `%rsp` at entry congruent to
    // 8 mod 16 as a normal `call` would leave it.
    const CONTEXT_WORDS: usize = 18;
    let top = (stack.as_ptr() as usize + STACK_SIZE) & !0xf;
    let top = top - 8;
    let base = top - CONTEXT_WORDS * 8;
    assert!(base >= stack.as_ptr() as usize, "task stack too small");

    let words = base as *mut usize;
    unsafe {
        // offsets are in 8-byte words, ascending from the final %rsp (r15).
        core::ptr::write(words.add(0), 0); // r15
        core::ptr::write(words.add(1), 0); // r14
        core::ptr::write(words.add(2), 0); // r13
        core::ptr::write(words.add(3), 0); // r12
        core::ptr::write(words.add(4), 0); // r11
        core::ptr::write(words.add(5), 0); // r10
        core::ptr::write(words.add(6), 0); // r9
        core::ptr::write(words.add(7), 0); // r8
        core::ptr::write(words.add(8), entry as usize); // rdi (arg 1)
        core::ptr::write(words.add(9), arg); // rsi (arg 2)
        core::ptr::write(words.add(10), 0); // rbp
        core::ptr::write(words.add(11), 0); // padding
        core::ptr::write(words.add(12), 0); // rbx
        core::ptr::write(words.add(13), 0); // rdx
        core::ptr::write(words.add(14), 0); // rcx
        core::ptr::write(words.add(15), 0); // rax
        core::ptr::write(words.add(16), 0x202); // rflags (IF set)
        core::ptr::write(words.add(17), task_trampoline as usize); // return address
    }

    base
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_next_ready_wraps_round_robin() {
        let mut tasks = Tasks {
            slots: [Task::empty(); MAX_TASKS],
            current: 0,
            next_pid: 1,
        };
        tasks.slots[0].state = TaskState::Running;
        tasks.slots[3].state = TaskState::Ready;
        tasks.slots[MAX_TASKS - 1].state = TaskState::Ready;

        assert_eq!(find_next_ready(&tasks, 0), Some(3));
        assert_eq!(find_next_ready(&tasks, 3), Some(MAX_TASKS - 1));
    }

    #[test]
    fn find_next_ready_none_when_alone() {
        let mut tasks = Tasks {
            slots: [Task::empty(); MAX_TASKS],
            current: 0,
            next_pid: 1,
        };
        tasks.slots[0].state = TaskState::Running;
        assert_eq!(find_next_ready(&tasks, 0), None);
    }
}
