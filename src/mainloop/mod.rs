pub(crate) mod core;
mod fdset;
mod funcs;

pub use self::core::MainLoop;
pub use self::fdset::FdSet;
pub use self::funcs::FuncId;
