pub mod scheduler;

pub use scheduler::{add_task, kill, request_reschedule, yield_now, Pid};
