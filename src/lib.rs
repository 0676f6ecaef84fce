//! A position-independent loader for 32-bit little-endian ARM/Thumb-2
//! relocatable ELF objects.
//!
//! This crate parses the object's section and symbol tables, loads each
//! section into host-allocated memory, resolves external symbols through a
//! host-supplied [`host::SymbolResolver`], and patches `R_ARM_ABS32` /
//! `R_ARM_THM_PC22` / `R_ARM_THM_JUMP24` relocations in place. The
//! filesystem, symbol registry, scheduler, and allocator are all modeled as
//! trait seams ([`cursor::FileCursor`], [`host`]) so the core has no
//! dependency on any particular platform.
//!
//! Typical use:
//!
//! ```no_run
//! use fap_elf_loader::{
//!     config::LoaderConfig,
//!     cursor::StdFileCursor,
//!     host::{NoopScheduler, VecSectionAllocator},
//!     image::ElfImage,
//! };
//!
//! struct NoImports;
//! impl fap_elf_loader::host::SymbolResolver for NoImports {
//!     fn resolve(&self, _name: &str) -> Option<u32> {
//!         None
//!     }
//! }
//!
//! # fn run(file: std::fs::File) -> Result<(), fap_elf_loader::error::LoadError> {
//! let config = LoaderConfig::default();
//! let mut cursor = StdFileCursor::new(file);
//! let mut image = ElfImage::new();
//! image.load_headers(&mut cursor, &config)?;
//! image.load_section_table(&mut cursor, &config)?;
//! let status = image.load_sections(
//!     &mut cursor,
//!     &NoImports,
//!     &mut NoopScheduler::default(),
//!     &mut VecSectionAllocator,
//!     &config,
//! )?;
//! println!("entry point: {:#010x}, status: {:?}", image.entry_point(), status);
//! image.teardown(&mut VecSectionAllocator);
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub mod arch;
pub mod base;
pub mod classify;
pub mod config;
pub mod cursor;
pub mod error;
pub mod header;
pub mod host;
pub mod image;
pub mod load;
pub mod relocate;
pub mod resolve;
pub mod section_map;
pub mod strtab;
pub mod traits;
