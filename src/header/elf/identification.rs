//! `e_ident` — the 16-byte identification block at the start of every ELF
//! file. This loader only accepts one combination (32-bit, little-endian),
//! but the fields are still parsed individually and validated, rather than
//! matched as a single magic blob, so a rejection names exactly which byte
//! was wrong.

use crate::{
    config::LoaderConfig,
    cursor::FileCursor,
    error::LoadError,
    traits::{read_array, FromReader},
};
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;
use typed_builder::TypedBuilder;

/// Magic bytes every ELF file begins with.
pub const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive, Default)]
#[repr(u8)]
/// `EI_CLASS` — word size of the object.
pub enum ElfClass {
    #[default]
    /// `ELFCLASSNONE`
    None = 0,
    /// `ELFCLASS32` — the only class this loader accepts.
    Elf32 = 1,
    /// `ELFCLASS64`
    Elf64 = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive, Default)]
#[repr(u8)]
/// `EI_DATA` — byte order of multi-byte fields.
pub enum ElfDataEncoding {
    #[default]
    /// `ELFDATANONE`
    None = 0,
    /// `ELFDATA2LSB` — little-endian, the only encoding this loader accepts.
    LittleEndian = 1,
    /// `ELFDATA2MSB`
    BigEndian = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
#[repr(u8)]
/// `EI_VERSION` — ELF format version. Only `Current` (1) is valid.
pub enum ElfIdentifierVersion {
    /// Invalid placeholder, never produced by a conforming object.
    None = 0,
    /// The only defined version.
    Current = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive, Default)]
#[repr(u8)]
/// `EI_OSABI`. Not validated beyond being parseable; carried through for
/// diagnostics.
pub enum ElfOSABI {
    #[default]
    /// System V ABI, the common default for bare-metal toolchains.
    SystemV = 0,
    /// ARM extended application binary interface.
    ArmExtendedApplicationBinaryInterface = 64,
    /// Plain ARM.
    Arm = 97,
    /// Unrecognized value, kept verbatim as its own variant.
    Unknown = 255,
}

#[derive(Debug, Clone, TypedBuilder)]
/// The full 16-byte `e_ident` block, decoded.
pub struct ElfHeaderIdentifier {
    /// Word size; always [`ElfClass::Elf32`] for an accepted object.
    pub class: ElfClass,
    /// Byte order; always [`ElfDataEncoding::LittleEndian`] for an accepted
    /// object.
    pub data_encoding: ElfDataEncoding,
    /// Format version of the identification block itself.
    pub version: ElfIdentifierVersion,
    /// OS/ABI tag.
    pub os_abi: ElfOSABI,
    /// ABI version, OS/ABI-specific.
    pub abi_version: u8,
}

impl<C> FromReader<C> for ElfHeaderIdentifier
where
    C: FileCursor,
{
    type Error = LoadError;

    fn from_reader_with(cursor: &mut C, _config: &LoaderConfig) -> Result<Self, Self::Error> {
        let magic: [u8; 4] = read_array(cursor)?;
        if magic != ELF_MAGIC {
            return Err(LoadError::InvalidMagic);
        }
        let [class_byte] = read_array::<C, 1>(cursor)?;
        let [data_byte] = read_array::<C, 1>(cursor)?;
        let [version_byte] = read_array::<C, 1>(cursor)?;
        let [os_abi_byte] = read_array::<C, 1>(cursor)?;
        let [abi_version] = read_array::<C, 1>(cursor)?;
        // 7 bytes of `EI_PAD`.
        let _pad: [u8; 7] = read_array(cursor)?;

        let class = ElfClass::from_u8(class_byte).unwrap_or(ElfClass::None);
        if class != ElfClass::Elf32 {
            return Err(LoadError::UnsupportedClass { value: class_byte });
        }
        let data_encoding = ElfDataEncoding::from_u8(data_byte).unwrap_or(ElfDataEncoding::None);
        if data_encoding != ElfDataEncoding::LittleEndian {
            return Err(LoadError::UnsupportedDataEncoding { value: data_byte });
        }
        let version =
            ElfIdentifierVersion::from_u8(version_byte).unwrap_or(ElfIdentifierVersion::None);
        let os_abi = ElfOSABI::from_u8(os_abi_byte).unwrap_or(ElfOSABI::Unknown);

        Ok(Self::builder()
            .class(class)
            .data_encoding(data_encoding)
            .version(version)
            .os_abi(os_abi)
            .abi_version(abi_version)
            .build())
    }
}
