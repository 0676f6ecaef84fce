//! Architecture-specific definitions. This loader targets ARM/Thumb-2
//! exclusively; `arm32` is the only architecture module.

pub mod arm32;
