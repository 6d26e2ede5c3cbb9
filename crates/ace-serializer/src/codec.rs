// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The `Persist` trait and encodings of primitive values.
//!
//! | value          | encoding                                     |
//! |----------------|----------------------------------------------|
//! | integers       | fixed width, little endian                   |
//! | `bool`         | one byte, 0 or 1                             |
//! | `String`       | `u32` byte length, then UTF-8 bytes          |
//! | `Option<T>`    | one presence byte, then `T` if present       |
//! | `Vec<T>`       | `u32` element count, then each element       |
//! | enums          | one tag byte, validated on read              |
//!
//! Nothing is self-describing: the reader must know what comes next.

use std::io::{Read, Write};

use crate::error::{Result, SerializerError};

/// Upper bound accepted for any length or count prefix.
pub const MAX_LENGTH: u32 = 16 * 1024 * 1024;

/// A value with a binary encoding.
pub trait Persist: Sized {
	fn serialize<W: Write + ?Sized>(&self, w: &mut W) -> Result<()>;
	fn deserialize<R: Read + ?Sized>(r: &mut R) -> Result<Self>;
}

/// Writes `value` to `w`.
pub fn serialize<T: Persist, W: Write + ?Sized>(w: &mut W, value: &T) -> Result<()> {
	value.serialize(w)
}

/// Reads a `T` from `r`.
pub fn deserialize<T: Persist, R: Read + ?Sized>(r: &mut R) -> Result<T> {
	T::deserialize(r)
}

/// Encodes `value` into a fresh buffer.
pub fn to_bytes<T: Persist>(value: &T) -> Result<Vec<u8>> {
	let mut buf = Vec::new();
	value.serialize(&mut buf)?;
	Ok(buf)
}

/// Decodes a `T` from the start of `bytes`.
pub fn from_bytes<T: Persist>(mut bytes: &[u8]) -> Result<T> {
	T::deserialize(&mut bytes)
}

macro_rules! persist_int {
	($($ty:ty),+) => {
		$(
			impl Persist for $ty {
				fn serialize<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
					w.write_all(&self.to_le_bytes())?;
					Ok(())
				}

				fn deserialize<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
					let mut buf = [0u8; std::mem::size_of::<$ty>()];
					r.read_exact(&mut buf)?;
					Ok(<$ty>::from_le_bytes(buf))
				}
			}
		)+
	};
}

persist_int!(u8, u16, u32, u64, i32, i64);

impl Persist for bool {
	fn serialize<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
		u8::from(*self).serialize(w)
	}

	fn deserialize<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
		match u8::deserialize(r)? {
			0 => Ok(false),
			1 => Ok(true),
			tag => Err(SerializerError::UnknownTag { what: "bool", tag }),
		}
	}
}

/// Writes a length or count prefix.
pub(crate) fn write_len<W: Write + ?Sized>(w: &mut W, len: usize) -> Result<()> {
	let len = u32::try_from(len).unwrap_or(u32::MAX);
	if len > MAX_LENGTH {
		return Err(SerializerError::LengthOverLimit {
			len,
			limit: MAX_LENGTH,
		});
	}
	len.serialize(w)
}

/// Reads a length or count prefix.
pub(crate) fn read_len<R: Read + ?Sized>(r: &mut R) -> Result<usize> {
	let len = u32::deserialize(r)?;
	if len > MAX_LENGTH {
		return Err(SerializerError::LengthOverLimit {
			len,
			limit: MAX_LENGTH,
		});
	}
	Ok(len as usize)
}

impl Persist for String {
	fn serialize<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
		write_len(w, self.len())?;
		w.write_all(self.as_bytes())?;
		Ok(())
	}

	fn deserialize<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
		let len = read_len(r)?;
		let mut buf = vec![0u8; len];
		r.read_exact(&mut buf)?;
		Ok(String::from_utf8(buf)?)
	}
}

impl<T: Persist> Persist for Option<T> {
	fn serialize<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
		match self {
			None => false.serialize(w),
			Some(value) => {
				true.serialize(w)?;
				value.serialize(w)
			}
		}
	}

	fn deserialize<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
		if bool::deserialize(r)? {
			Ok(Some(T::deserialize(r)?))
		} else {
			Ok(None)
		}
	}
}

/// Writes a slice with the same layout as `Vec<T>`.
pub fn write_slice<T: Persist, W: Write + ?Sized>(w: &mut W, items: &[T]) -> Result<()> {
	write_len(w, items.len())?;
	for item in items {
		item.serialize(w)?;
	}
	Ok(())
}

impl<T: Persist> Persist for Vec<T> {
	fn serialize<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
		write_slice(w, self)
	}

	fn deserialize<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
		let count = read_len(r)?;
		// The count is untrusted; let the vector grow as elements arrive.
		let mut out = Vec::with_capacity(count.min(256));
		for _ in 0..count {
			out.push(T::deserialize(r)?);
		}
		Ok(out)
	}
}
