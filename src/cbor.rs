//! Minimal canonical CBOR writer: only the items a Shelley-era value
//! transfer needs. Lengths always use the shortest encoding, which keeps
//! the output canonical and the body hash reproducible.

const MAJOR_UNSIGNED: u8 = 0;
const MAJOR_BYTES: u8 = 2;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_MAP: u8 = 5;

pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Encoder { buf: Vec::new() }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn unsigned(&mut self, value: u64) -> &mut Self {
        self.header(MAJOR_UNSIGNED, value);
        self
    }

    pub fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.header(MAJOR_BYTES, bytes.len() as u64);
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Write an array header; the caller writes `len` items afterwards.
    pub fn array(&mut self, len: u64) -> &mut Self {
        self.header(MAJOR_ARRAY, len);
        self
    }

    /// Write a map header; the caller writes `len` key/value pairs afterwards.
    pub fn map(&mut self, len: u64) -> &mut Self {
        self.header(MAJOR_MAP, len);
        self
    }

    pub fn bool(&mut self, value: bool) -> &mut Self {
        self.buf.push(if value { 0xf5 } else { 0xf4 });
        self
    }

    pub fn null(&mut self) -> &mut Self {
        self.buf.push(0xf6);
        self
    }

    // Shortest-form initial byte plus big-endian argument.
    fn header(&mut self, major: u8, value: u64) {
        let tag = major << 5;
        match value {
            0..=23 => self.buf.push(tag | value as u8),
            24..=0xff => {
                self.buf.push(tag | 24);
                self.buf.push(value as u8);
            }
            0x100..=0xffff => {
                self.buf.push(tag | 25);
                self.buf.extend_from_slice(&(value as u16).to_be_bytes());
            }
            0x1_0000..=0xffff_ffff => {
                self.buf.push(tag | 26);
                self.buf.extend_from_slice(&(value as u32).to_be_bytes());
            }
            _ => {
                self.buf.push(tag | 27);
                self.buf.extend_from_slice(&value.to_be_bytes());
            }
        }
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}
