//! Descriptor block sum type and verbose field dumps.

use super::decode::resolve_string;
use super::layout::*;
use super::window::Window;
use oxitape_core::error::Result;

/// A decoded descriptor block body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descriptor {
    /// Tape header.
    Tape(TapeBody),
    /// Start of data set.
    Sset(SsetBody),
    /// Volume.
    Volb(VolbBody),
    /// Directory.
    Dirb(DirbBody),
    /// File.
    File(FileBody),
    /// Corrupt object.
    Cfil(CfilBody),
    /// End of set pad.
    Espb,
    /// End of data set.
    Eset(EsetBody),
    /// End of tape marker.
    Eotm(EotmBody),
    /// Soft filemark.
    Sfmb(SfmbBody),
    /// A tag this reader does not know.
    Unknown(Tag),
}

impl Descriptor {
    /// Decode the body of the descriptor at the front of `window`.
    pub fn parse(header: &DescriptorHeader, window: &Window) -> Result<Self> {
        Ok(match header.block_type {
            TAPE => Self::Tape(window.read(0)?),
            SSET => Self::Sset(window.read(0)?),
            VOLB => Self::Volb(window.read(0)?),
            DIRB => Self::Dirb(window.read(0)?),
            FILE => Self::File(window.read(0)?),
            CFIL => Self::Cfil(window.read(0)?),
            ESPB => Self::Espb,
            ESET => Self::Eset(window.read(0)?),
            EOTM => Self::Eotm(window.read(0)?),
            SFMB => Self::Sfmb(window.read(0)?),
            other => Self::Unknown(other),
        })
    }

    /// Whether this is a recognised block type.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    /// Log every decoded field: names at info level, everything else at
    /// debug level. `block` starts at the descriptor.
    pub fn log_fields(&self, header: &DescriptorHeader, block: &[u8]) {
        let string =
            |addr: TapeAddress| resolve_string(header.string_type, block, addr).unwrap_or_default();

        log::debug!("Descriptor Block Attributes: {:08X}", header.attributes);
        log::debug!("Format Logical Address: {}", header.logical_address);
        log::debug!("Offset To First Event: {}", header.first_stream);
        log::debug!("String Type: {}", header.string_type);
        log::debug!("OS: {} ({})", header.os_id, os_name(header.os_id));

        match self {
            Self::Tape(tape) => {
                log::debug!("TAPE Block Attributes: {:08X}", tape.attributes);
                log::debug!("MTF Major Version: {}", tape.major_version);
                log::debug!("Format Logical Block Size: {}", tape.logical_block_size);
                log::debug!("Media Family ID: {}", tape.family_id);
                log::debug!("Media Sequence Number: {}", tape.sequence);
                log::debug!("Software Vendor ID: {}", tape.vendor_id);
                log::debug!("Media Date: {}", tape.date);
                log::info!("Media Name: {}", string(tape.name));
                log::info!("Media Description: {}", string(tape.description));
                log::info!("Software: {}", string(tape.software));
            }
            Self::Sset(sset) => {
                log::debug!("SSET Block Attributes: {:08X}", sset.attributes);
                log::debug!("MTF Minor Version: {}", sset.minor_version);
                log::debug!("Software Vendor: {}", sset.vendor_id);
                log::debug!("Software Major Version: {}", sset.software_major);
                log::debug!("Software Minor Version: {}", sset.software_minor);
                log::debug!("Data Set Number: {}", sset.number);
                log::debug!("Physical Block Address: {}", sset.physical_block_address);
                log::debug!("Password Encryption: {}", sset.password_encryption);
                log::debug!("Software Compression: {}", sset.software_compression);
                log::debug!("Media Write Date: {}", sset.write_date);
                log::info!("Data Set Name: {}", string(sset.name));
                log::info!("Data Set Description: {}", string(sset.description));
                log::info!("User Name: {}", string(sset.user));
            }
            Self::Volb(volb) => {
                log::debug!("VOLB Block Attributes: {:08X}", volb.attributes);
                log::debug!("Media Write Date: {}", volb.write_date);
                log::info!("Device Name: {}", string(volb.device));
                log::info!("Volume Name: {}", string(volb.volume));
                log::info!("Machine Name: {}", string(volb.machine));
            }
            Self::Dirb(dirb) => {
                log::debug!("DIRB Block Attributes: {:08X}", dirb.attributes);
                log::debug!("Directory ID: {}", dirb.directory_id);
                log::debug!("Modification Date: {}", dirb.modified);
                log::debug!("Creation Date: {}", dirb.created);
                log::debug!("Backup Date: {}", dirb.backup);
                log::debug!("Access Date: {}", dirb.accessed);
            }
            Self::File(file) => {
                log::debug!("FILE Block Attributes: {:08X}", file.attributes);
                log::debug!("Directory ID: {}", file.directory_id);
                log::debug!("File ID: {}", file.file_id);
                log::debug!("Modification Date: {}", file.modified);
                log::debug!("Creation Date: {}", file.created);
                log::debug!("Backup Date: {}", file.backup);
                log::debug!("Access Date: {}", file.accessed);
            }
            Self::Cfil(cfil) => {
                log::debug!("CFIL Block Attributes: {:08X}", cfil.attributes);
                log::debug!("Stream Number: {}", cfil.stream_number);
                log::debug!("Stream Offset: {}", cfil.stream_offset);
            }
            Self::Espb => {}
            Self::Eset(eset) => {
                log::debug!("ESET Block Attributes: {:08X}", eset.attributes);
                log::debug!("Corrupt File Count: {}", eset.corrupt_count);
                log::debug!("FDD Media Sequence Number: {}", eset.fdd_sequence);
                log::debug!("Data Set Number: {}", eset.number);
                log::debug!("Media Write Date: {}", eset.write_date);
            }
            Self::Eotm(eotm) => {
                log::debug!("Last ESET Physical Block Address: {}", eotm.last_eset);
            }
            Self::Sfmb(sfmb) => {
                log::debug!("Filemark Entries: {}", sfmb.entries);
                log::debug!("Filemark Entries Used: {}", sfmb.used);
            }
            Self::Unknown(_) => {}
        }
    }
}
