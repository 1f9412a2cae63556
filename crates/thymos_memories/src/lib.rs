//! Anniversary-style memory resolution for Thymos.
//!
//! An independent read-only consumer of day records: given a base date,
//! surfaces the content recorded at fixed calendar intervals before it.

pub mod resolver;

pub use resolver::{DayMemory, MemoryOffset, MemoryResolver, WeekMemory};
