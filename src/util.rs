use zerocopy::byteorder::{LittleEndian, U64};

use crate::{Error, Result};

#[inline(always)]
#[cold]
pub(crate) fn cold_path() {}

/// The canonical "none" value every empty handle points at.
pub(crate) static NONE_SLICE_DATA: [u8; 1] = [0x00];

pub(crate) static ILLEGAL_SLICE_DATA: [u8; 1] = [0x17];

/// Reads an unsigned little-endian integer of `width` (1 to 8) bytes at `offset`.
#[inline]
pub(crate) fn read_uint(data: &[u8], offset: usize, width: usize) -> Result<u64> {
    debug_assert!((1..=8).contains(&width));
    let end = offset.checked_add(width).ok_or(Error::MalformedData)?;
    let Some(bytes) = data.get(offset..end) else {
        cold_path();
        return Err(Error::MalformedData);
    };
    let mut buf = [0u8; 8];
    buf[..width].copy_from_slice(bytes);
    Ok(U64::<LittleEndian>::from_bytes(buf).get())
}

/// Same as [`read_uint`], converted to a buffer position.
#[inline]
pub(crate) fn read_len(data: &[u8], offset: usize, width: usize) -> Result<usize> {
    usize::try_from(read_uint(data, offset, width)?).map_err(|_| Error::MalformedData)
}

/// Reads a forward varint (7 bits per byte, high bit = continuation).
///
/// Returns the value and the number of bytes it occupies.
pub(crate) fn read_varint_forward(data: &[u8], offset: usize) -> Result<(u64, usize)> {
    let mut value = 0u64;
    let mut shift = 0u32;
    let mut pos = offset;
    loop {
        let byte = *data.get(pos).ok_or(Error::MalformedData)?;
        if shift >= 64 {
            cold_path();
            return Err(Error::MalformedData);
        }
        value |= u64::from(byte & 0x7f) << shift;
        pos += 1;
        if byte & 0x80 == 0 {
            return Ok((value, pos - offset));
        }
        shift += 7;
    }
}

/// Reads a varint stored backwards, ending at `last` (inclusive).
pub(crate) fn read_varint_backward(data: &[u8], last: usize) -> Result<(u64, usize)> {
    let mut value = 0u64;
    let mut shift = 0u32;
    let mut pos = last;
    let mut read = 0;
    loop {
        let byte = *data.get(pos).ok_or(Error::MalformedData)?;
        if shift >= 64 {
            cold_path();
            return Err(Error::MalformedData);
        }
        value |= u64::from(byte & 0x7f) << shift;
        read += 1;
        if byte & 0x80 == 0 {
            return Ok((value, read));
        }
        pos = pos.checked_sub(1).ok_or(Error::MalformedData)?;
        shift += 7;
    }
}

/// Number of bytes needed to store `value` as an unsigned integer (at least 1).
#[inline]
pub(crate) fn uint_width(value: u64) -> usize {
    (8 - (value.leading_zeros() as usize / 8)).max(1)
}

#[inline]
pub(crate) fn write_uint(buf: &mut Vec<u8>, value: u64, width: usize) {
    buf.extend_from_slice(&U64::<LittleEndian>::new(value).to_bytes()[..width]);
}

pub(crate) fn write_varint_forward(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uint_widths() {
        assert_eq!(uint_width(0), 1);
        assert_eq!(uint_width(0xff), 1);
        assert_eq!(uint_width(0x100), 2);
        assert_eq!(uint_width(u64::MAX), 8);
    }

    #[test]
    fn read_uint_is_bounds_checked() {
        let data = [0x34, 0x12];
        assert_eq!(read_uint(&data, 0, 2), Ok(0x1234));
        assert_eq!(read_uint(&data, 1, 2), Err(Error::MalformedData));
    }

    #[test]
    fn varint_forward() {
        let mut buf = Vec::new();
        write_varint_forward(&mut buf, 300);
        assert_eq!(buf, [0xac, 0x02]);
        assert_eq!(read_varint_forward(&buf, 0), Ok((300, 2)));
    }

    #[test]
    fn varint_backward() {
        // 300 stored backwards: last byte holds the low bits
        let data = [0x02, 0xac];
        assert_eq!(read_varint_backward(&data, 1), Ok((300, 2)));
        assert_eq!(read_varint_backward(&[0x85], 0), Err(Error::MalformedData));
    }
}
