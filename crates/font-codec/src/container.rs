use std::fmt;

/// Outer file wrapping of a font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContainerFormat {
    /// Plain TrueType/OpenType.
    Sfnt,
    /// WOFF 1.0, zlib-compressed tables.
    Woff,
    /// WOFF 2.0, Brotli-compressed and transformed tables.
    Woff2,
}

impl ContainerFormat {
    pub const ALL: [Self; 3] = [Self::Sfnt, Self::Woff, Self::Woff2];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Sfnt => "ttf",
            Self::Woff => "woff",
            Self::Woff2 => "woff2",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "ttf" | "otf" => Some(Self::Sfnt),
            "woff" => Some(Self::Woff),
            "woff2" => Some(Self::Woff2),
            _ => None,
        }
    }

    /// Identifies the container from the first four bytes.
    pub fn detect(data: &[u8]) -> Option<Self> {
        match data.get(..4)? {
            [0x00, 0x01, 0x00, 0x00] | b"OTTO" | b"true" => Some(Self::Sfnt),
            b"wOFF" => Some(Self::Woff),
            b"wOF2" => Some(Self::Woff2),
            _ => None,
        }
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
