//! Primitive and string arrays.
//!
//! Every array is an `i32` count (`-1` for null) followed by its
//! elements. Byte arrays pack their payload into one span padded to the
//! next cell; every other element type is written as its own scalar.
//!
//! Each element type comes in three flavours:
//! - `write_*_array(Option<&[T]>)`
//! - `create_*_array() -> Option<Vec<T>>`, allocating
//! - `read_*_array(&mut [T])`, filling a caller buffer whose length must
//!   match the encoded count

use skein_core::{align4, ParcelError, Result, SpanKind};

use crate::parcel::Parcel;

impl Parcel {
    fn write_array<T: Copy>(
        &mut self,
        values: Option<&[T]>,
        mut write: impl FnMut(&mut Self, T) -> Result<()>,
    ) -> Result<()> {
        self.write_rolled_back(|p| {
            p.write_count(values.map(<[T]>::len))?;
            for &value in values.into_iter().flatten() {
                write(p, value)?;
            }
            Ok(())
        })
    }

    fn create_array<T>(
        &mut self,
        element_width: usize,
        mut read: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Option<Vec<T>>> {
        let Some(count) = self.read_count(element_width)? else {
            return Ok(None);
        };
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(read(self)?);
        }
        Ok(Some(out))
    }

    fn read_array_into<T>(
        &mut self,
        dst: &mut [T],
        mut read: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<()> {
        self.expect_count(dst.len())?;
        for slot in dst.iter_mut() {
            *slot = read(self)?;
        }
        Ok(())
    }

    /// Read a count prefix that must equal `expected`.
    fn expect_count(&mut self, expected: usize) -> Result<()> {
        let at = self.position;
        let count = self.read_int()?;
        if usize::try_from(count).ok() != Some(expected) {
            self.position = at;
            return Err(ParcelError::invalid(format!(
                "bad array lengths: encoded {count}, destination holds {expected}"
            )));
        }
        Ok(())
    }

    // ── Bytes ───────────────────────────────────────────────────

    /// Write a byte array as a count plus a packed, padded payload.
    pub fn write_byte_array(&mut self, values: Option<&[u8]>) -> Result<()> {
        self.write_rolled_back(|p| {
            p.write_count(values.map(<[u8]>::len))?;
            match values {
                Some(bytes) if !bytes.is_empty() => {
                    let mut payload = bytes.to_vec();
                    payload.resize(align4(bytes.len()), 0);
                    p.write_span(SpanKind::ByteArray, &payload)
                }
                _ => Ok(()),
            }
        })
    }

    /// Read a byte array written by [`write_byte_array`](Self::write_byte_array).
    pub fn create_byte_array(&mut self) -> Result<Option<Vec<u8>>> {
        let Some(count) = self.read_count(1)? else {
            return Ok(None);
        };
        Ok(Some(self.read_byte_payload(count)?.to_vec()))
    }

    /// Fill `dst` from a byte array whose count must equal `dst.len()`.
    pub fn read_byte_array(&mut self, dst: &mut [u8]) -> Result<()> {
        self.expect_count(dst.len())?;
        let payload = self.read_byte_payload(dst.len())?;
        dst.copy_from_slice(payload);
        Ok(())
    }

    fn read_byte_payload(&mut self, count: usize) -> Result<&[u8]> {
        if count == 0 {
            return Ok(&[]);
        }
        let at = self.position;
        match self.claim(SpanKind::ByteArray, align4(count))? {
            Some(start) => Ok(self.storage.slice(start, count)),
            None => Err(ParcelError::malformed(
                at,
                format!("byte array of {count} bytes runs past end of data"),
            )),
        }
    }

    // ── Booleans ────────────────────────────────────────────────

    /// Write a boolean array, one cell per element.
    pub fn write_bool_array(&mut self, values: Option<&[bool]>) -> Result<()> {
        self.write_array(values, Self::write_bool)
    }

    /// Read a boolean array.
    pub fn create_bool_array(&mut self) -> Result<Option<Vec<bool>>> {
        self.create_array(4, Self::read_bool)
    }

    /// Fill `dst` from a boolean array of matching length.
    pub fn read_bool_array(&mut self, dst: &mut [bool]) -> Result<()> {
        self.read_array_into(dst, Self::read_bool)
    }

    // ── Chars ───────────────────────────────────────────────────

    /// Write a UTF-16 code unit array, one cell per element.
    pub fn write_char_array(&mut self, values: Option<&[u16]>) -> Result<()> {
        self.write_array(values, Self::write_char)
    }

    /// Read a UTF-16 code unit array.
    pub fn create_char_array(&mut self) -> Result<Option<Vec<u16>>> {
        self.create_array(4, Self::read_char)
    }

    /// Fill `dst` from a code unit array of matching length.
    pub fn read_char_array(&mut self, dst: &mut [u16]) -> Result<()> {
        self.read_array_into(dst, Self::read_char)
    }

    // ── Integers ────────────────────────────────────────────────

    /// Write an `i32` array.
    pub fn write_int_array(&mut self, values: Option<&[i32]>) -> Result<()> {
        self.write_array(values, Self::write_int)
    }

    /// Read an `i32` array.
    pub fn create_int_array(&mut self) -> Result<Option<Vec<i32>>> {
        self.create_array(4, Self::read_int)
    }

    /// Fill `dst` from an `i32` array of matching length.
    pub fn read_int_array(&mut self, dst: &mut [i32]) -> Result<()> {
        self.read_array_into(dst, Self::read_int)
    }

    /// Write an `i64` array.
    pub fn write_long_array(&mut self, values: Option<&[i64]>) -> Result<()> {
        self.write_array(values, Self::write_long)
    }

    /// Read an `i64` array.
    pub fn create_long_array(&mut self) -> Result<Option<Vec<i64>>> {
        self.create_array(8, Self::read_long)
    }

    /// Fill `dst` from an `i64` array of matching length.
    pub fn read_long_array(&mut self, dst: &mut [i64]) -> Result<()> {
        self.read_array_into(dst, Self::read_long)
    }

    // ── Floats ──────────────────────────────────────────────────

    /// Write an `f32` array.
    pub fn write_float_array(&mut self, values: Option<&[f32]>) -> Result<()> {
        self.write_array(values, Self::write_float)
    }

    /// Read an `f32` array.
    pub fn create_float_array(&mut self) -> Result<Option<Vec<f32>>> {
        self.create_array(4, Self::read_float)
    }

    /// Fill `dst` from an `f32` array of matching length.
    pub fn read_float_array(&mut self, dst: &mut [f32]) -> Result<()> {
        self.read_array_into(dst, Self::read_float)
    }

    /// Write an `f64` array.
    pub fn write_double_array(&mut self, values: Option<&[f64]>) -> Result<()> {
        self.write_array(values, Self::write_double)
    }

    /// Read an `f64` array.
    pub fn create_double_array(&mut self) -> Result<Option<Vec<f64>>> {
        self.create_array(8, Self::read_double)
    }

    /// Fill `dst` from an `f64` array of matching length.
    pub fn read_double_array(&mut self, dst: &mut [f64]) -> Result<()> {
        self.read_array_into(dst, Self::read_double)
    }

    // ── Strings ─────────────────────────────────────────────────

    /// Write a string array. Elements may be null.
    pub fn write_string_array<S: AsRef<str>>(&mut self, values: Option<&[Option<S>]>) -> Result<()> {
        self.write_rolled_back(|p| {
            p.write_count(values.map(<[Option<S>]>::len))?;
            for value in values.into_iter().flatten() {
                let text: Option<&str> = value.as_ref().map(|s| s.as_ref());
                p.write_string(text)?;
            }
            Ok(())
        })
    }

    /// Read a string array.
    pub fn create_string_array(&mut self) -> Result<Option<Vec<Option<String>>>> {
        self.create_array(4, Self::read_string)
    }

    /// Fill `dst` from a string array of matching length.
    pub fn read_string_array(&mut self, dst: &mut [Option<String>]) -> Result<()> {
        self.read_array_into(dst, Self::read_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_array_payload_is_packed() {
        let mut p = Parcel::new();
        p.write_byte_array(Some(&[0xFF, 2, 3, 127, 9])).unwrap();
        // count + 5 bytes padded to 8
        assert_eq!(p.data_size(), 12);
        p.set_data_position(0);
        assert_eq!(
            p.create_byte_array().unwrap(),
            Some(vec![0xFF, 2, 3, 127, 9])
        );
    }

    #[test]
    fn empty_byte_array_is_just_a_count() {
        let mut p = Parcel::new();
        p.write_byte_array(Some(&[])).unwrap();
        assert_eq!(p.data_size(), 4);
        p.set_data_position(0);
        assert_eq!(p.create_byte_array().unwrap(), Some(vec![]));
    }

    #[test]
    fn null_arrays_round_trip() {
        let mut p = Parcel::new();
        p.write_int_array(None).unwrap();
        p.write_long_array(None).unwrap();
        p.write_byte_array(None).unwrap();
        p.write_string_array::<&str>(None).unwrap();
        p.set_data_position(0);
        assert_eq!(p.create_int_array().unwrap(), None);
        assert_eq!(p.create_long_array().unwrap(), None);
        assert_eq!(p.create_byte_array().unwrap(), None);
        assert_eq!(p.create_string_array().unwrap(), None);
    }

    #[test]
    fn read_into_rejects_wrong_length() {
        let mut p = Parcel::new();
        p.write_byte_array(Some(&[1, 2, 3, 4])).unwrap();
        p.set_data_position(0);
        let mut short = [0u8; 0];
        let err = p.read_byte_array(&mut short).unwrap_err();
        assert!(matches!(err, ParcelError::InvalidArgument { .. }));
        assert_eq!(p.data_position(), 0);
    }

    #[test]
    fn read_into_fills_buffer() {
        let mut p = Parcel::new();
        p.write_double_array(Some(&[1.1, 2.0])).unwrap();
        p.set_data_position(0);
        let mut out = [0.0; 2];
        p.read_double_array(&mut out).unwrap();
        assert_eq!(out, [1.1, 2.0]);
    }

    #[test]
    fn elements_are_typed_spans() {
        let mut p = Parcel::new();
        p.write_long_array(Some(&[1, 2])).unwrap();
        // Landing in the middle of the first element is caught.
        p.set_data_position(8);
        assert!(matches!(
            p.read_int(),
            Err(ParcelError::OverwriteViolation { offset: 8, .. })
        ));
    }

    #[test]
    fn string_array_keeps_null_elements() {
        let mut p = Parcel::new();
        let names: &[Option<&str>] = &[Some("a1"), None, Some("b2")];
        p.write_string_array(Some(names)).unwrap();
        p.set_data_position(0);
        assert_eq!(
            p.create_string_array().unwrap(),
            Some(vec![Some("a1".to_string()), None, Some("b2".to_string())])
        );
    }

    #[test]
    fn corrupt_count_is_rejected() {
        let mut p = Parcel::new();
        p.write_int(1_000_000).unwrap();
        p.set_data_position(0);
        assert!(matches!(
            p.create_int_array(),
            Err(ParcelError::MalformedData { .. })
        ));
    }
}
