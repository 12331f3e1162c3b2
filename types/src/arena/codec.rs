use bytes::{Buf, BufMut};
use commonware_codec::{Error, ReadExt, Write};

/// Helper to write a byte blob with a u32 length prefix.
pub fn write_bytes(bytes: &[u8], writer: &mut impl BufMut) {
    (bytes.len() as u32).write(writer);
    writer.put_slice(bytes);
}

/// Helper to read a u32-length-prefixed byte blob, rejecting anything longer than `max_len`.
pub fn read_bytes(
    reader: &mut impl Buf,
    max_len: usize,
    context: &'static str,
) -> Result<Vec<u8>, Error> {
    let len = u32::read(reader)? as usize;
    if len > max_len {
        return Err(Error::Invalid(context, "too long"));
    }
    if reader.remaining() < len {
        return Err(Error::EndOfBuffer);
    }
    let mut bytes = vec![0u8; len];
    reader.copy_to_slice(&mut bytes);
    Ok(bytes)
}

/// Helper to get the encode size of a length-prefixed byte blob.
pub fn bytes_encode_size(bytes: &[u8]) -> usize {
    4 + bytes.len()
}
