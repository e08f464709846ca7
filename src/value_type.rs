/// The type of a value, as determined by its head byte.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum ValueType {
    None,
    Illegal,
    Null,
    Bool,
    Array,
    Object,
    Double,
    UtcDate,
    External,
    MinKey,
    MaxKey,
    Int,
    UInt,
    SmallInt,
    String,
    Binary,
    Bcd,
    Custom,
    Tagged,
}

impl ValueType {
    /// Every value type, in declaration order.
    pub const ALL: [ValueType; 19] = [
        ValueType::None,
        ValueType::Illegal,
        ValueType::Null,
        ValueType::Bool,
        ValueType::Array,
        ValueType::Object,
        ValueType::Double,
        ValueType::UtcDate,
        ValueType::External,
        ValueType::MinKey,
        ValueType::MaxKey,
        ValueType::Int,
        ValueType::UInt,
        ValueType::SmallInt,
        ValueType::String,
        ValueType::Binary,
        ValueType::Bcd,
        ValueType::Custom,
        ValueType::Tagged,
    ];

    /// Returns the type a head byte denotes.
    ///
    /// Reserved head bytes (`0x15`, `0x16`, `0xd8..=0xed`) are reported as
    /// [`ValueType::Illegal`].
    ///
    /// # Example
    ///
    /// ```
    /// use na_vpack::ValueType;
    ///
    /// assert_eq!(ValueType::of_head(0x00), ValueType::None);
    /// assert_eq!(ValueType::of_head(0x35), ValueType::SmallInt);
    /// assert_eq!(ValueType::of_head(0x43), ValueType::String);
    /// ```
    pub const fn of_head(head: u8) -> Self {
        match head {
            0x00 => ValueType::None,
            0x01..=0x09 | 0x13 => ValueType::Array,
            0x0a..=0x12 | 0x14 => ValueType::Object,
            0x17 => ValueType::Illegal,
            0x18 => ValueType::Null,
            0x19 | 0x1a => ValueType::Bool,
            0x1b => ValueType::Double,
            0x1c => ValueType::UtcDate,
            0x1d => ValueType::External,
            0x1e => ValueType::MinKey,
            0x1f => ValueType::MaxKey,
            0x20..=0x27 => ValueType::Int,
            0x28..=0x2f => ValueType::UInt,
            0x30..=0x3f => ValueType::SmallInt,
            0x40..=0xbf => ValueType::String,
            0xc0..=0xc7 => ValueType::Binary,
            0xc8..=0xd7 => ValueType::Bcd,
            0xee | 0xef => ValueType::Tagged,
            0xf0..=0xff => ValueType::Custom,
            // 0x15, 0x16, 0xd8..=0xed
            _ => ValueType::Illegal,
        }
    }

    /// Returns the human-readable name of the type.
    pub const fn name(self) -> &'static str {
        match self {
            ValueType::None => "none",
            ValueType::Illegal => "illegal",
            ValueType::Null => "null",
            ValueType::Bool => "bool",
            ValueType::Array => "array",
            ValueType::Object => "object",
            ValueType::Double => "double",
            ValueType::UtcDate => "utc-date",
            ValueType::External => "external",
            ValueType::MinKey => "min-key",
            ValueType::MaxKey => "max-key",
            ValueType::Int => "int",
            ValueType::UInt => "uint",
            ValueType::SmallInt => "smallint",
            ValueType::String => "string",
            ValueType::Binary => "binary",
            ValueType::Bcd => "bcd",
            ValueType::Custom => "custom",
            ValueType::Tagged => "tagged",
        }
    }

    /// Returns `true` for the three integer types.
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::Int | Self::UInt | Self::SmallInt)
    }

    /// Returns `true` for integers and doubles.
    pub const fn is_number(self) -> bool {
        self.is_integer() || matches!(self, Self::Double)
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Byte width of the length and offset fields of a non-empty, non-compact
/// container head.
#[inline]
pub(crate) const fn offset_width(head: u8) -> usize {
    match head {
        0x02 | 0x06 | 0x0b | 0x0f => 1,
        0x03 | 0x07 | 0x0c | 0x10 => 2,
        0x04 | 0x08 | 0x0d | 0x11 => 4,
        _ => 8,
    }
}

/// Position of the first member when no padding is present, 0 for compact
/// containers.
#[inline]
pub(crate) const fn first_sub_offset(head: u8) -> usize {
    match head {
        0x02 => 2,
        0x03 | 0x06 | 0x0b | 0x0f => 3,
        0x04 | 0x07 | 0x0c | 0x10 => 5,
        0x05 | 0x08 | 0x09 | 0x0d | 0x0e | 0x11 | 0x12 => 9,
        _ => 0,
    }
}
