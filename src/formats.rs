//! FourCC resource formats and variant type tags used by the Blackmagic RAW SDK.

/// Build a big-endian FourCC at compile time.
const fn fourcc(code: &[u8; 4]) -> u32 {
    u32::from_be_bytes(*code)
}

/// Pixel layout of a processed image (`BlackmagicRawResourceFormat`).
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResourceFormat(pub u32);

impl ResourceFormat {
    /// 8-bit RGBA ('rgba')
    pub const RGBA_U8: ResourceFormat = ResourceFormat(fourcc(b"rgba"));
    /// 8-bit BGRA ('bgra')
    pub const BGRA_U8: ResourceFormat = ResourceFormat(fourcc(b"bgra"));
    /// 16-bit interleaved RGB ('16il')
    pub const RGB_U16: ResourceFormat = ResourceFormat(fourcc(b"16il"));
    /// 16-bit interleaved RGBA ('16al')
    pub const RGBA_U16: ResourceFormat = ResourceFormat(fourcc(b"16al"));
    /// 16-bit interleaved BGRA ('16la')
    pub const BGRA_U16: ResourceFormat = ResourceFormat(fourcc(b"16la"));
    /// 16-bit planar RGB ('16pl')
    pub const RGB_U16_PLANAR: ResourceFormat = ResourceFormat(fourcc(b"16pl"));
    /// 32-bit float interleaved RGB ('f32s')
    pub const RGB_F32: ResourceFormat = ResourceFormat(fourcc(b"f32s"));
    /// 32-bit float planar RGB ('f32p')
    pub const RGB_F32_PLANAR: ResourceFormat = ResourceFormat(fourcc(b"f32p"));
    /// 32-bit float interleaved BGRA ('f32a')
    pub const BGRA_F32: ResourceFormat = ResourceFormat(fourcc(b"f32a"));

    /// Bytes per pixel for the interleaved formats, `None` for planar ones.
    pub fn bytes_per_pixel(self) -> Option<u32> {
        match self {
            Self::RGBA_U8 | Self::BGRA_U8 => Some(4),
            Self::RGB_U16 => Some(6),
            Self::RGBA_U16 | Self::BGRA_U16 => Some(8),
            Self::RGB_F32 => Some(12),
            Self::BGRA_F32 => Some(16),
            _ => None,
        }
    }

    /// The four ASCII characters of the code, for logging.
    pub fn to_fourcc_string(self) -> String {
        self.0
            .to_be_bytes()
            .iter()
            .map(|&b| if b.is_ascii_graphic() { b as char } else { '?' })
            .collect()
    }
}

/// Tag of a vendor `Variant` (`BlackmagicRawVariantType`).
pub mod variant_type {
    pub const EMPTY: u32 = 0;
    pub const U8: u32 = 1;
    pub const S16: u32 = 2;
    pub const U16: u32 = 3;
    pub const S32: u32 = 4;
    pub const U32: u32 = 5;
    pub const FLOAT32: u32 = 6;
    pub const STRING: u32 = 7;
    pub const SAFE_ARRAY: u32 = 8;
    pub const FLOAT64: u32 = 9;
}
