pub use bytes::*;
pub use cursor::*;
pub use read::*;
pub use seek::*;
pub use write::*;

mod bytes;
mod cursor;
mod read;
mod seek;
mod write;
