use derive_more::Display;

/// The separator placed between chunk coordinates in a chunk key.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Display)]
pub enum ChunkKeySeparator {
    /// `/`, nested chunk keys.
    #[display("/")]
    Slash,
    /// `.`, flat chunk keys.
    #[default]
    #[display(".")]
    Dot,
}

impl ChunkKeySeparator {
    /// The separator as a [`char`].
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Slash => '/',
            Self::Dot => '.',
        }
    }
}

impl TryFrom<char> for ChunkKeySeparator {
    type Error = char;

    fn try_from(separator: char) -> Result<Self, Self::Error> {
        match separator {
            '/' => Ok(Self::Slash),
            '.' => Ok(Self::Dot),
            _ => Err(separator),
        }
    }
}

impl serde::Serialize for ChunkKeySeparator {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_char(self.as_char())
    }
}

impl<'de> serde::Deserialize<'de> for ChunkKeySeparator {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let separator = String::deserialize(d)?;
        match separator.as_str() {
            "/" => Ok(Self::Slash),
            "." => Ok(Self::Dot),
            _ => Err(serde::de::Error::custom(
                "dimension_separator must be `.` or `/`",
            )),
        }
    }
}
