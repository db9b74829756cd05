//! MTF on-tape record layouts and constants.
//!
//! Every descriptor block starts with the 52-byte common header, followed by
//! a type-specific body. Offsets below are from the start of the descriptor.
//! All integers are little-endian; type tags are four ASCII bytes compared as
//! byte arrays.

use super::decode::MtfDateTime;

/// A four-character type tag.
pub type Tag = [u8; 4];

// Descriptor block types
/// Tape header.
pub const TAPE: Tag = *b"TAPE";
/// Start of data set.
pub const SSET: Tag = *b"SSET";
/// Volume.
pub const VOLB: Tag = *b"VOLB";
/// Directory.
pub const DIRB: Tag = *b"DIRB";
/// File.
pub const FILE: Tag = *b"FILE";
/// Corrupt object.
pub const CFIL: Tag = *b"CFIL";
/// End of set pad.
pub const ESPB: Tag = *b"ESPB";
/// End of data set.
pub const ESET: Tag = *b"ESET";
/// End of tape marker.
pub const EOTM: Tag = *b"EOTM";
/// Soft filemark.
pub const SFMB: Tag = *b"SFMB";

// Platform-independent stream types
/// Standard data.
pub const STAN: Tag = *b"STAN";
/// Pad to the next descriptor block.
pub const SPAD: Tag = *b"SPAD";
/// Path name.
pub const PNAM: Tag = *b"PNAM";
/// File name.
pub const FNAM: Tag = *b"FNAM";
/// Checksum of the preceding stream.
pub const CSUM: Tag = *b"CSUM";
/// Corrupt data.
pub const CRPT: Tag = *b"CRPT";
/// Sparse data.
pub const SPAR: Tag = *b"SPAR";
/// Set map, media based catalog type 1.
pub const TSMP: Tag = *b"TSMP";
/// File/directory detail, media based catalog type 1.
pub const TFDD: Tag = *b"TFDD";
/// Set map, media based catalog type 2.
pub const MAP2: Tag = *b"MAP2";
/// File/directory detail, media based catalog type 2.
pub const FDD2: Tag = *b"FDD2";

// Windows NT streams
/// Alternate data.
pub const ADAT: Tag = *b"ADAT";
/// Extended attributes.
pub const NTEA: Tag = *b"NTEA";
/// Security descriptor.
pub const NACL: Tag = *b"NACL";
/// Encrypted data.
pub const NTED: Tag = *b"NTED";
/// Quota information.
pub const NTQU: Tag = *b"NTQU";
/// Property data.
pub const NTPR: Tag = *b"NTPR";
/// Object identifier.
pub const NTOI: Tag = *b"NTOI";
// Windows 95
/// Registry data.
pub const GERC: Tag = *b"GERC";
// NetWare
/// NetWare 386 attributes.
pub const N386: Tag = *b"N386";
/// NetWare bindery.
pub const NBND: Tag = *b"NBND";
/// SMS data.
pub const SMSD: Tag = *b"SMSD";
// OS/2
/// OS/2 access control list.
pub const OACL: Tag = *b"OACL";
// Macintosh
/// Resource fork.
pub const MRSC: Tag = *b"MRSC";
/// Privileges.
pub const MPRV: Tag = *b"MPRV";
/// Finder information.
pub const MINF: Tag = *b"MINF";

// Common descriptor header attributes
/// Block continues from a previous medium.
pub const ATTR_CONTINUATION: u32 = 0x0000_0001;
/// Streams of this block may be compressed.
pub const ATTR_COMPRESSION: u32 = 0x0000_0004;
/// End of stream at end of medium.
pub const ATTR_EOS_AT_EOM: u32 = 0x0000_0008;

// Descriptor header attributes by block type
/// TAPE: a set map exists.
pub const TAPE_SET_MAP_EXISTS: u32 = 0x0001_0000;
/// TAPE: file/directory detail allowed.
pub const TAPE_FDD_ALLOWED: u32 = 0x0002_0000;
/// SSET: file/directory detail exists.
pub const SSET_FDD_EXISTS: u32 = 0x0001_0000;
/// SSET: data set is encrypted.
pub const SSET_ENCRYPTION: u32 = 0x0002_0000;
/// ESET: file/directory detail aborted.
pub const ESET_FDD_ABORTED: u32 = 0x0001_0000;
/// ESET: last set of the media family.
pub const ESET_END_OF_FAMILY: u32 = 0x0002_0000;
/// ESET: data set was aborted.
pub const ESET_ABORTED_SET: u32 = 0x0004_0000;
/// EOTM: no ESET PBA recorded.
pub const EOTM_NO_ESET_PBA: u32 = 0x0001_0000;
/// EOTM: recorded ESET PBA is invalid.
pub const EOTM_INVALID_ESET_PBA: u32 = 0x0002_0000;

// TAPE body attributes
/// Soft filemarks are in use.
pub const TAPE_SOFT_FILEMARK: u32 = 0x0000_0001;
/// Medium carries a label.
pub const TAPE_MEDIA_LABEL: u32 = 0x0000_0002;

// SSET body attributes
/// Transfer set.
pub const SSET_TRANSFER: u32 = 0x0000_0001;
/// Copy set.
pub const SSET_COPY: u32 = 0x0000_0002;
/// Normal set.
pub const SSET_NORMAL: u32 = 0x0000_0004;
/// Differential set.
pub const SSET_DIFFERENTIAL: u32 = 0x0000_0008;
/// Incremental set.
pub const SSET_INCREMENTAL: u32 = 0x0000_0010;
/// Daily set.
pub const SSET_DAILY: u32 = 0x0000_0020;

// DIRB body attributes
/// Directory was empty.
pub const DIRB_EMPTY: u32 = 0x0001_0000;
/// Directory name is stored in a stream.
pub const DIRB_PATH_IN_STREAM: u32 = 0x0002_0000;
/// Directory is corrupt.
pub const DIRB_CORRUPT: u32 = 0x0004_0000;

// FILE body attributes
/// File was in use during backup.
pub const FILE_IN_USE: u32 = 0x0001_0000;
/// File name is stored in a stream.
pub const FILE_NAME_IN_STREAM: u32 = 0x0002_0000;
/// File data is corrupt.
pub const FILE_CORRUPT: u32 = 0x0004_0000;

// CFIL body attributes
/// Length changed during backup.
pub const CFIL_LENGTH_CHANGE: u32 = 0x0001_0000;
/// Unreadable block.
pub const CFIL_UNREADABLE_BLOCK: u32 = 0x0002_0000;
/// Deadlock while reading.
pub const CFIL_DEADLOCK: u32 = 0x0008_0000;

// Stream file-system attributes
/// Stream modified while being read.
pub const STREAM_MODIFIED_FOR_READ: u16 = 0x0001;
/// Stream contains security data.
pub const STREAM_CONTAINS_SECURITY: u16 = 0x0002;
/// Stream is not portable between systems.
pub const STREAM_IS_NON_PORTABLE: u16 = 0x0004;
/// Stream is sparse.
pub const STREAM_IS_SPARSE: u16 = 0x0008;

// Stream media attributes
/// Stream continues from a previous medium.
pub const STREAM_CONTINUE: u16 = 0x0001;
/// Variable-length stream.
pub const STREAM_VARIABLE: u16 = 0x0002;
/// Last piece of a variable-length stream.
pub const STREAM_VAR_END: u16 = 0x0004;
/// Stream data is encrypted.
pub const STREAM_ENCRYPTED: u16 = 0x0008;
/// Stream data is compressed.
pub const STREAM_COMPRESSED: u16 = 0x0010;
/// A CSUM stream follows.
pub const STREAM_CHECKSUMED: u16 = 0x0020;
/// Length is embedded in the data.
pub const STREAM_EMBEDDED_LENGTH: u16 = 0x0040;

// Operating system ids
/// NetWare.
pub const OS_NETWARE: u8 = 1;
/// NetWare SMS.
pub const OS_NETWARE_SMS: u8 = 13;
/// Windows NT.
pub const OS_WINDOWS_NT: u8 = 14;
/// DOS.
pub const OS_DOS: u8 = 24;
/// OS/2.
pub const OS_OS2: u8 = 25;
/// Windows 95.
pub const OS_WINDOWS_95: u8 = 26;
/// Macintosh.
pub const OS_MACINTOSH: u8 = 27;
/// Unix.
pub const OS_UNIX: u8 = 28;

/// Name of an operating system id, for verbose output.
pub fn os_name(id: u8) -> &'static str {
    match id {
        OS_NETWARE => "NetWare",
        OS_NETWARE_SMS => "NetWare SMS",
        OS_WINDOWS_NT => "Windows NT",
        OS_DOS => "DOS",
        OS_OS2 => "OS/2",
        OS_WINDOWS_95 => "Windows 95",
        OS_MACINTOSH => "Macintosh",
        OS_UNIX => "Unix",
        _ => "unknown",
    }
}

/// Printable form of a tag: the four characters when alphanumeric, hex
/// otherwise.
pub fn tag_name(tag: &Tag) -> String {
    if tag.iter().all(|b| b.is_ascii_alphanumeric()) {
        tag.iter().map(|&b| b as char).collect()
    } else {
        format!("{:#010x}", u32::from_le_bytes(*tag))
    }
}

/// A fixed-size record that can be decoded from the front of a byte slice.
pub trait Layout: Sized {
    /// Encoded size in bytes.
    const SIZE: usize;

    /// Decode from `bytes`, which is at least [`Self::SIZE`] long.
    fn parse(bytes: &[u8]) -> Self;
}

fn u16_at(b: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([b[at], b[at + 1]])
}

fn u32_at(b: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

fn u64_at(b: &[u8], at: usize) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&b[at..at + 8]);
    u64::from_le_bytes(word)
}

fn tag_at(b: &[u8], at: usize) -> Tag {
    [b[at], b[at + 1], b[at + 2], b[at + 3]]
}

fn address_at(b: &[u8], at: usize) -> TapeAddress {
    TapeAddress {
        size: u16_at(b, at),
        offset: u16_at(b, at + 2),
    }
}

fn date_at(b: &[u8], at: usize) -> MtfDateTime {
    MtfDateTime::unpack([b[at], b[at + 1], b[at + 2], b[at + 3], b[at + 4]])
}

/// Size and offset of variable data, relative to the descriptor start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TapeAddress {
    /// Length in bytes.
    pub size: u16,
    /// Offset from the start of the descriptor block.
    pub offset: u16,
}

/// Common descriptor block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorHeader {
    /// Block type tag.
    pub block_type: Tag,
    /// Block attributes.
    pub attributes: u32,
    /// Offset to the first stream header.
    pub first_stream: u16,
    /// Operating system id.
    pub os_id: u8,
    /// Operating system version.
    pub os_version: u8,
    /// Displayable size.
    pub displayable_size: u64,
    /// Format logical address.
    pub logical_address: u64,
    /// Control block id.
    pub control_block_id: u32,
    /// OS-specific data.
    pub os_data: TapeAddress,
    /// String type (see [`super::decode`]).
    pub string_type: u8,
    /// Header checksum.
    pub checksum: u16,
}

impl DescriptorHeader {
    /// Bytes covered by the header checksum.
    pub const CHECKSUMMED: usize = 50;

    /// Whether streams of this block may be compressed.
    pub fn compression_allowed(&self) -> bool {
        self.attributes & ATTR_COMPRESSION != 0
    }
}

impl Layout for DescriptorHeader {
    const SIZE: usize = 52;

    fn parse(b: &[u8]) -> Self {
        Self {
            block_type: tag_at(b, 0),
            attributes: u32_at(b, 4),
            first_stream: u16_at(b, 8),
            os_id: b[10],
            os_version: b[11],
            displayable_size: u64_at(b, 12),
            logical_address: u64_at(b, 20),
            control_block_id: u32_at(b, 36),
            os_data: address_at(b, 44),
            string_type: b[48],
            checksum: u16_at(b, 50),
        }
    }
}

/// TAPE body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapeBody {
    /// Media family id.
    pub family_id: u32,
    /// TAPE attributes.
    pub attributes: u32,
    /// Media sequence number.
    pub sequence: u16,
    /// Password encryption algorithm.
    pub password_encryption: u16,
    /// Soft filemark block size.
    pub soft_filemark_size: u16,
    /// Media-based catalog type.
    pub catalog_type: u16,
    /// Media name.
    pub name: TapeAddress,
    /// Media description.
    pub description: TapeAddress,
    /// Media password.
    pub password: TapeAddress,
    /// Software name.
    pub software: TapeAddress,
    /// Format logical block size.
    pub logical_block_size: u16,
    /// Software vendor id.
    pub vendor_id: u16,
    /// Media date.
    pub date: MtfDateTime,
    /// MTF major version.
    pub major_version: u8,
}

impl Layout for TapeBody {
    const SIZE: usize = 94;

    fn parse(b: &[u8]) -> Self {
        Self {
            family_id: u32_at(b, 52),
            attributes: u32_at(b, 56),
            sequence: u16_at(b, 60),
            password_encryption: u16_at(b, 62),
            soft_filemark_size: u16_at(b, 64),
            catalog_type: u16_at(b, 66),
            name: address_at(b, 68),
            description: address_at(b, 72),
            password: address_at(b, 76),
            software: address_at(b, 80),
            logical_block_size: u16_at(b, 84),
            vendor_id: u16_at(b, 86),
            date: date_at(b, 88),
            major_version: b[93],
        }
    }
}

/// SSET body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SsetBody {
    /// SSET attributes.
    pub attributes: u32,
    /// Password encryption algorithm.
    pub password_encryption: u16,
    /// Software compression algorithm.
    pub software_compression: u16,
    /// Software vendor id.
    pub vendor_id: u16,
    /// Data set number.
    pub number: u16,
    /// Data set name.
    pub name: TapeAddress,
    /// Data set description.
    pub description: TapeAddress,
    /// Data set password.
    pub password: TapeAddress,
    /// User name.
    pub user: TapeAddress,
    /// Physical block address.
    pub physical_block_address: u64,
    /// Media write date.
    pub write_date: MtfDateTime,
    /// Software major version.
    pub software_major: u8,
    /// Software minor version.
    pub software_minor: u8,
    /// Time zone.
    pub time_zone: i8,
    /// MTF minor version.
    pub minor_version: u8,
    /// Media catalog version.
    pub catalog_version: u8,
}

impl SsetBody {
    /// Time zone value meaning "local time".
    pub const LOCAL_TIME_ZONE: i8 = 127;
}

impl Layout for SsetBody {
    const SIZE: usize = 98;

    fn parse(b: &[u8]) -> Self {
        Self {
            attributes: u32_at(b, 52),
            password_encryption: u16_at(b, 56),
            software_compression: u16_at(b, 58),
            vendor_id: u16_at(b, 60),
            number: u16_at(b, 62),
            name: address_at(b, 64),
            description: address_at(b, 68),
            password: address_at(b, 72),
            user: address_at(b, 76),
            physical_block_address: u64_at(b, 80),
            write_date: date_at(b, 88),
            software_major: b[93],
            software_minor: b[94],
            time_zone: b[95] as i8,
            minor_version: b[96],
            catalog_version: b[97],
        }
    }
}

/// VOLB body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolbBody {
    /// VOLB attributes.
    pub attributes: u32,
    /// Device name.
    pub device: TapeAddress,
    /// Volume name.
    pub volume: TapeAddress,
    /// Machine name.
    pub machine: TapeAddress,
    /// Media write date.
    pub write_date: MtfDateTime,
}

impl Layout for VolbBody {
    const SIZE: usize = 73;

    fn parse(b: &[u8]) -> Self {
        Self {
            attributes: u32_at(b, 52),
            device: address_at(b, 56),
            volume: address_at(b, 60),
            machine: address_at(b, 64),
            write_date: date_at(b, 68),
        }
    }
}

/// DIRB body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirbBody {
    /// DIRB attributes.
    pub attributes: u32,
    /// Last modification date.
    pub modified: MtfDateTime,
    /// Creation date.
    pub created: MtfDateTime,
    /// Backup date.
    pub backup: MtfDateTime,
    /// Last access date.
    pub accessed: MtfDateTime,
    /// Directory id.
    pub directory_id: u32,
    /// Directory name.
    pub name: TapeAddress,
}

impl Layout for DirbBody {
    const SIZE: usize = 84;

    fn parse(b: &[u8]) -> Self {
        Self {
            attributes: u32_at(b, 52),
            modified: date_at(b, 56),
            created: date_at(b, 61),
            backup: date_at(b, 66),
            accessed: date_at(b, 71),
            directory_id: u32_at(b, 76),
            name: address_at(b, 80),
        }
    }
}

/// FILE body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileBody {
    /// FILE attributes.
    pub attributes: u32,
    /// Last modification date.
    pub modified: MtfDateTime,
    /// Creation date.
    pub created: MtfDateTime,
    /// Backup date.
    pub backup: MtfDateTime,
    /// Last access date.
    pub accessed: MtfDateTime,
    /// Id of the containing directory.
    pub directory_id: u32,
    /// File id.
    pub file_id: u32,
    /// File name.
    pub name: TapeAddress,
}

impl Layout for FileBody {
    const SIZE: usize = 88;

    fn parse(b: &[u8]) -> Self {
        Self {
            attributes: u32_at(b, 52),
            modified: date_at(b, 56),
            created: date_at(b, 61),
            backup: date_at(b, 66),
            accessed: date_at(b, 71),
            directory_id: u32_at(b, 76),
            file_id: u32_at(b, 80),
            name: address_at(b, 84),
        }
    }
}

/// CFIL body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CfilBody {
    /// CFIL attributes.
    pub attributes: u32,
    /// Offset of the corrupt data within its stream.
    pub stream_offset: u64,
    /// Number of the corrupt stream.
    pub stream_number: u64,
}

impl Layout for CfilBody {
    const SIZE: usize = 80;

    fn parse(b: &[u8]) -> Self {
        Self {
            attributes: u32_at(b, 52),
            stream_offset: u64_at(b, 64),
            stream_number: u64_at(b, 72),
        }
    }
}

/// ESET body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EsetBody {
    /// ESET attributes.
    pub attributes: u32,
    /// Number of corrupt files in the set.
    pub corrupt_count: u32,
    /// File/directory detail media sequence number.
    pub fdd_sequence: u16,
    /// Data set number.
    pub number: u16,
    /// Media write date.
    pub write_date: MtfDateTime,
}

impl Layout for EsetBody {
    const SIZE: usize = 85;

    fn parse(b: &[u8]) -> Self {
        Self {
            attributes: u32_at(b, 52),
            corrupt_count: u32_at(b, 56),
            fdd_sequence: u16_at(b, 76),
            number: u16_at(b, 78),
            write_date: date_at(b, 80),
        }
    }
}

/// EOTM body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EotmBody {
    /// Physical block address of the last ESET.
    pub last_eset: u64,
}

impl Layout for EotmBody {
    const SIZE: usize = 60;

    fn parse(b: &[u8]) -> Self {
        Self {
            last_eset: u64_at(b, 52),
        }
    }
}

/// SFMB body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SfmbBody {
    /// Number of filemark entries.
    pub entries: u32,
    /// Filemark entries in use.
    pub used: u32,
}

impl Layout for SfmbBody {
    const SIZE: usize = 60;

    fn parse(b: &[u8]) -> Self {
        Self {
            entries: u32_at(b, 52),
            used: u32_at(b, 56),
        }
    }
}

/// Stream header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamHeader {
    /// Stream type tag.
    pub id: Tag,
    /// File-system attributes.
    pub fs_attributes: u16,
    /// Media format attributes.
    pub media_attributes: u16,
    /// Length of the stream data.
    pub length: u64,
    /// Data encryption algorithm.
    pub encryption: u16,
    /// Data compression algorithm.
    pub compression: u16,
    /// Header checksum.
    pub checksum: u16,
}

impl StreamHeader {
    /// Bytes covered by the header checksum.
    pub const CHECKSUMMED: usize = 20;

    /// Whether the stream payload is compressed.
    pub fn is_compressed(&self) -> bool {
        self.media_attributes & STREAM_COMPRESSED != 0
    }

    /// Whether the stream payload is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.media_attributes & STREAM_ENCRYPTED != 0
    }

    /// Whether the stream is sparse.
    pub fn is_sparse(&self) -> bool {
        self.fs_attributes & STREAM_IS_SPARSE != 0
    }
}

impl Layout for StreamHeader {
    const SIZE: usize = 22;

    fn parse(b: &[u8]) -> Self {
        Self {
            id: tag_at(b, 0),
            fs_attributes: u16_at(b, 4),
            media_attributes: u16_at(b, 6),
            length: u64_at(b, 8),
            encryption: u16_at(b, 16),
            compression: u16_at(b, 18),
            checksum: u16_at(b, 20),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_name() {
        assert_eq!(tag_name(&TAPE), "TAPE");
        assert_eq!(tag_name(&[0, 1, 2, 3]), "0x03020100");
    }

    #[test]
    fn test_tags_match_little_endian_constants() {
        assert_eq!(u32::from_le_bytes(TAPE), 0x4550_4154);
        assert_eq!(u32::from_le_bytes(SSET), 0x5445_5353);
        assert_eq!(u32::from_le_bytes(STAN), 0x4E41_5453);
        assert_eq!(u32::from_le_bytes(SPAD), 0x4441_5053);
    }

    #[test]
    fn test_parse_descriptor_header() {
        let mut b = vec![0u8; DescriptorHeader::SIZE];
        b[0..4].copy_from_slice(b"FILE");
        b[4..8].copy_from_slice(&ATTR_COMPRESSION.to_le_bytes());
        b[8..10].copy_from_slice(&88u16.to_le_bytes());
        b[10] = OS_WINDOWS_NT;
        b[12..20].copy_from_slice(&11u64.to_le_bytes());
        b[20..28].copy_from_slice(&42u64.to_le_bytes());
        b[44..46].copy_from_slice(&6u16.to_le_bytes());
        b[46..48].copy_from_slice(&100u16.to_le_bytes());
        b[48] = 2;
        b[50..52].copy_from_slice(&0xBEEFu16.to_le_bytes());

        let hdr = DescriptorHeader::parse(&b);
        assert_eq!(hdr.block_type, FILE);
        assert!(hdr.compression_allowed());
        assert_eq!(hdr.first_stream, 88);
        assert_eq!(os_name(hdr.os_id), "Windows NT");
        assert_eq!(hdr.displayable_size, 11);
        assert_eq!(hdr.logical_address, 42);
        assert_eq!(hdr.os_data, TapeAddress { size: 6, offset: 100 });
        assert_eq!(hdr.string_type, 2);
        assert_eq!(hdr.checksum, 0xBEEF);
    }

    #[test]
    fn test_parse_stream_header() {
        let mut b = vec![0u8; StreamHeader::SIZE];
        b[0..4].copy_from_slice(b"STAN");
        b[4..6].copy_from_slice(&STREAM_IS_SPARSE.to_le_bytes());
        b[6..8].copy_from_slice(&(STREAM_COMPRESSED | STREAM_ENCRYPTED).to_le_bytes());
        b[8..16].copy_from_slice(&0x1_0000_0001u64.to_le_bytes());

        let hdr = StreamHeader::parse(&b);
        assert_eq!(hdr.id, STAN);
        assert!(hdr.is_sparse());
        assert!(hdr.is_compressed());
        assert!(hdr.is_encrypted());
        assert_eq!(hdr.length, 0x1_0000_0001);
    }

    #[test]
    fn test_parse_tape_body() {
        let mut b = vec![0u8; TapeBody::SIZE];
        b[52..56].copy_from_slice(&0xCAFEu32.to_le_bytes());
        b[68..70].copy_from_slice(&8u16.to_le_bytes());
        b[70..72].copy_from_slice(&94u16.to_le_bytes());
        b[84..86].copy_from_slice(&1024u16.to_le_bytes());
        b[93] = 1;

        let tape = TapeBody::parse(&b);
        assert_eq!(tape.family_id, 0xCAFE);
        assert_eq!(tape.name, TapeAddress { size: 8, offset: 94 });
        assert_eq!(tape.logical_block_size, 1024);
        assert_eq!(tape.major_version, 1);
    }

    #[test]
    fn test_parse_eset_body() {
        let mut b = vec![0u8; EsetBody::SIZE];
        b[52..56].copy_from_slice(&ESET_ABORTED_SET.to_le_bytes());
        b[56..60].copy_from_slice(&3u32.to_le_bytes());
        b[78..80].copy_from_slice(&7u16.to_le_bytes());

        let eset = EsetBody::parse(&b);
        assert_eq!(eset.attributes, ESET_ABORTED_SET);
        assert_eq!(eset.corrupt_count, 3);
        assert_eq!(eset.number, 7);
    }
}
