//! Value hashing.
//!
//! [`hash`](Slice::hash) covers the exact encoding. The slow and normalized
//! variants look through encoding choices: object member order for
//! [`hash_slow`](Slice::hash_slow), and additionally numeric representation
//! and string width for [`normalized_hash`](Slice::normalized_hash).

use xxhash_rust::{xxh3::xxh3_64_with_seed, xxh32::xxh32};

use crate::{Result, SharedSlice, Slice, ValueType};

pub const DEFAULT_SEED64: u64 = 0xdead_beef;
pub const DEFAULT_SEED32: u32 = 0xdead_beef;

// type markers for normalized hashing
const NUMBER: u8 = 0x01;
const STRING: u8 = 0x02;
const ARRAY: u8 = 0x03;
const OBJECT: u8 = 0x04;

#[inline]
fn fold(hash: u64) -> u32 {
    (hash ^ (hash >> 32)) as u32
}

#[inline]
fn hash_header(marker: u8, length: usize, seed: u64) -> u64 {
    let mut buf = [0u8; 9];
    buf[0] = marker;
    buf[1..].copy_from_slice(&(length as u64).to_le_bytes());
    xxh3_64_with_seed(&buf, seed)
}

impl Slice<'_> {
    /// xxh3-64 of the value's encoding.
    pub fn hash(&self, seed: u64) -> Result<u64> {
        Ok(xxh3_64_with_seed(self.start()?, seed))
    }

    /// xxh32 of the value's encoding.
    pub fn hash32(&self, seed: u32) -> Result<u32> {
        Ok(xxh32(self.start()?, seed))
    }

    /// Like [`hash`](Slice::hash), but equal for objects whose members differ
    /// only in order.
    pub fn hash_slow(&self, seed: u64) -> Result<u64> {
        match self.value_type() {
            ValueType::Object => {
                let mut hash = hash_header(OBJECT, self.length()?, seed);
                for pair in self.object_iter()? {
                    let (key, value) = pair?;
                    hash ^= key.hash(seed)?.rotate_left(17) ^ value.hash_slow(seed)?;
                }
                Ok(hash)
            }
            ValueType::Array => {
                let mut hash = hash_header(ARRAY, self.length()?, seed);
                for member in self.array_iter()? {
                    hash = member?.hash_slow(hash)?;
                }
                Ok(hash)
            }
            _ => self.hash(seed),
        }
    }

    /// A hash equal for values that compare equal as data: numbers by value,
    /// strings by content, containers recursively, tags ignored.
    ///
    /// # Example
    ///
    /// ```
    /// use na_vpack::{Builder, DEFAULT_SEED64, Value};
    ///
    /// let mut a = Builder::new();
    /// a.add(Value::Int(3)).unwrap();
    /// let mut b = Builder::new();
    /// b.add(Value::Double(3.0)).unwrap();
    ///
    /// let a = a.slice().unwrap().normalized_hash(DEFAULT_SEED64).unwrap();
    /// let b = b.slice().unwrap().normalized_hash(DEFAULT_SEED64).unwrap();
    /// assert_eq!(a, b);
    /// ```
    pub fn normalized_hash(&self, seed: u64) -> Result<u64> {
        let value = self.value()?;
        match value.value_type() {
            ValueType::Int | ValueType::UInt | ValueType::SmallInt | ValueType::Double => {
                let number = value.get_number::<f64>()?;
                let mut buf = [NUMBER; 9];
                buf[1..].copy_from_slice(&number.to_bits().to_le_bytes());
                Ok(xxh3_64_with_seed(&buf, seed))
            }
            ValueType::String => {
                let payload = value.get_string()?;
                Ok(xxh3_64_with_seed(payload, hash_header(STRING, payload.len(), seed)))
            }
            ValueType::Array => {
                let mut hash = hash_header(ARRAY, value.length()?, seed);
                for member in value.array_iter()? {
                    hash = member?.normalized_hash(hash)?;
                }
                Ok(hash)
            }
            ValueType::Object => {
                let mut hash = hash_header(OBJECT, value.length()?, seed);
                for pair in value.object_iter()? {
                    let (key, member) = pair?;
                    hash ^= key.normalized_hash(seed)?.rotate_left(17)
                        ^ member.normalized_hash(seed)?;
                }
                Ok(hash)
            }
            _ => value.hash(seed),
        }
    }

    pub fn normalized_hash32(&self, seed: u32) -> Result<u32> {
        self.normalized_hash(u64::from(seed)).map(fold)
    }

    /// Hash of a string value; fails with a type mismatch on other values.
    pub fn hash_string(&self, seed: u64) -> Result<u64> {
        if !self.is_string() {
            return Err(self.mismatch("string"));
        }
        self.hash(seed)
    }

    pub fn hash_string32(&self, seed: u32) -> Result<u32> {
        if !self.is_string() {
            return Err(self.mismatch("string"));
        }
        self.hash32(seed)
    }
}

impl SharedSlice {
    pub fn hash(&self, seed: u64) -> Result<u64> {
        self.slice().hash(seed)
    }

    pub fn hash32(&self, seed: u32) -> Result<u32> {
        self.slice().hash32(seed)
    }

    pub fn hash_slow(&self, seed: u64) -> Result<u64> {
        self.slice().hash_slow(seed)
    }

    pub fn normalized_hash(&self, seed: u64) -> Result<u64> {
        self.slice().normalized_hash(seed)
    }

    pub fn normalized_hash32(&self, seed: u32) -> Result<u32> {
        self.slice().normalized_hash32(seed)
    }

    pub fn hash_string(&self, seed: u64) -> Result<u64> {
        self.slice().hash_string(seed)
    }

    pub fn hash_string32(&self, seed: u32) -> Result<u32> {
        self.slice().hash_string32(seed)
    }
}
