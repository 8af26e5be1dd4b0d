/// proxy file for when no_std support is enabled. Simply defines aliases for std modules so we don't need to
/// deal with different names elsewhere

pub mod convert {
    pub use core::convert::From;
    pub use core::convert::TryFrom;
}

pub mod fmt {
    pub use core::fmt::{Debug, Display, Formatter, Result, Write};
}

pub mod vec {
    pub use alloc::vec::Vec;
}

pub mod string {
    pub use alloc::string::String;
}
