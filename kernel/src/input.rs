//! Global input event queue (§3, §4's data-flow summary): HID report
//! decoding pushes events in here; cooperative tasks (shell, window server)
//! drain them with [`poll`].

use log::warn;
use spin::Mutex;

const CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyPress { code: u8, mods: u8 },
    KeyRelease { code: u8 },
    KeyChar { ascii: u8 },
    MouseMove { x: i32, y: i32, dx: i16, dy: i16, buttons: u8 },
    MouseButton { button: u8, pressed: bool },
    MouseScroll { delta: i8 },
}

struct Ring {
    buf: [Option<InputEvent>; CAPACITY],
    head: usize,
    len: usize,
}

static QUEUE: Mutex<Ring> = Mutex::new(Ring {
    buf: [None; CAPACITY],
    head: 0,
    len: 0,
});

/// Pushes an event onto the queue. If the queue is full the oldest event is
/// dropped and a warning is logged, per §4's stated overflow policy.
pub fn push(event: InputEvent) {
    let mut queue = QUEUE.lock();
    if queue.len == CAPACITY {
        queue.head = (queue.head + 1) % CAPACITY;
        queue.len -= 1;
        warn!("input queue full, dropping oldest event");
    }
    let tail = (queue.head + queue.len) % CAPACITY;
    queue.buf[tail] = Some(event);
    queue.len += 1;
}

/// Dequeues the oldest pending event into `out`, returning whether one was
/// available.
pub fn poll(out: &mut InputEvent) -> bool {
    let mut queue = QUEUE.lock();
    if queue.len == 0 {
        return false;
    }
    let event = queue.buf[queue.head].take().expect("queue.len > 0 implies a live slot");
    queue.head = (queue.head + 1) % CAPACITY;
    queue.len -= 1;
    *out = event;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order() {
        // isolate from other tests touching the global queue
        while poll(&mut InputEvent::KeyChar { ascii: 0 }) {}

        push(InputEvent::KeyChar { ascii: b'a' });
        push(InputEvent::KeyChar { ascii: b'b' });

        let mut out = InputEvent::KeyChar { ascii: 0 };
        assert!(poll(&mut out));
        assert_eq!(out, InputEvent::KeyChar { ascii: b'a' });
        assert!(poll(&mut out));
        assert_eq!(out, InputEvent::KeyChar { ascii: b'b' });
        assert!(!poll(&mut out));
    }

    #[test]
    fn drops_oldest_on_overflow() {
        while poll(&mut InputEvent::KeyChar { ascii: 0 }) {}

        for i in 0..CAPACITY + 1 {
            push(InputEvent::KeyChar { ascii: i as u8 });
        }

        let mut out = InputEvent::KeyChar { ascii: 0 };
        assert!(poll(&mut out));
        assert_eq!(out, InputEvent::KeyChar { ascii: 1 });
    }
}
