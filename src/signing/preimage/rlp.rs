//! RLP encoding and decoding
//!
//! The canonical transaction encoding and the signed envelope are both
//! RLP. Decoding is strict: only the canonical (shortest) form of every
//! header and scalar is accepted, so one logical value has exactly one
//! byte representation.

/// Deepest list nesting accepted by the decoder
///
/// Transactions and envelopes are flat lists of byte strings.
pub const MAX_DEPTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RlpError {
    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("non-canonical encoding at offset {0}")]
    NonCanonical(usize),

    #[error("{0} trailing bytes after item")]
    TrailingBytes(usize),

    #[error("expected a byte string, found a list")]
    ExpectedBytes,

    #[error("expected a list, found a byte string")]
    ExpectedList,

    #[error("integer does not fit in 64 bits")]
    IntegerOverflow,

    #[error("lists nested deeper than {} levels", MAX_DEPTH)]
    TooDeep,
}

/// Decoded RLP item borrowing from the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RlpItem<'a> {
    Bytes(&'a [u8]),
    List(Vec<RlpItem<'a>>),
}

impl<'a> RlpItem<'a> {
    pub fn as_bytes(&self) -> Result<&'a [u8], RlpError> {
        match self {
            Self::Bytes(b) => Ok(b),
            Self::List(_) => Err(RlpError::ExpectedBytes),
        }
    }

    pub fn as_list(&self) -> Result<&[RlpItem<'a>], RlpError> {
        match self {
            Self::List(items) => Ok(items),
            Self::Bytes(_) => Err(RlpError::ExpectedList),
        }
    }

    /// Interpret as a big-endian scalar without leading zeros
    pub fn as_u64(&self) -> Result<u64, RlpError> {
        let bytes = self.as_bytes()?;
        if bytes.len() > 8 {
            return Err(RlpError::IntegerOverflow);
        }
        if bytes.first() == Some(&0) {
            return Err(RlpError::NonCanonical(0));
        }
        Ok(bytes.iter().fold(0u64, |acc, b| (acc << 8) | *b as u64))
    }
}

// Encoding

pub fn encode_u64(val: u64) -> Vec<u8> {
    if val == 0 {
        return vec![0x80];
    }
    let bytes = val.to_be_bytes();
    let leading_zeros = bytes.iter().take_while(|&&b| b == 0).count();
    encode_bytes(&bytes[leading_zeros..])
}

pub fn encode_bytes(data: &[u8]) -> Vec<u8> {
    if data.len() == 1 && data[0] < 0x80 {
        return data.to_vec();
    }

    let mut result = encode_header(0x80, 0xb7, data.len());
    result.extend_from_slice(data);
    result
}

pub fn encode_str(s: &str) -> Vec<u8> {
    encode_bytes(s.as_bytes())
}

pub fn encode_list(items: &[Vec<u8>]) -> Vec<u8> {
    let payload_len = items.iter().map(Vec::len).sum();
    let mut result = encode_header(0xc0, 0xf7, payload_len);
    for item in items {
        result.extend_from_slice(item);
    }
    result
}

fn encode_header(short_base: u8, long_base: u8, len: usize) -> Vec<u8> {
    if len < 56 {
        vec![short_base + len as u8]
    } else {
        let len_bytes = encode_length(len);
        let mut header = vec![long_base + len_bytes.len() as u8];
        header.extend_from_slice(&len_bytes);
        header
    }
}

fn encode_length(len: usize) -> Vec<u8> {
    let bytes = (len as u64).to_be_bytes();
    let leading_zeros = bytes.iter().take_while(|&&b| b == 0).count();
    bytes[leading_zeros..].to_vec()
}

// Decoding

struct Header {
    is_list: bool,
    offset: usize,
    len: usize,
}

fn decode_header(input: &[u8]) -> Result<Header, RlpError> {
    let first = *input.first().ok_or(RlpError::UnexpectedEnd)?;

    let header = match first {
        0x00..=0x7f => Header { is_list: false, offset: 0, len: 1 },
        0x80..=0xb7 => {
            let len = (first - 0x80) as usize;
            if len == 1 && input.get(1).is_some_and(|b| *b < 0x80) {
                return Err(RlpError::NonCanonical(0));
            }
            Header { is_list: false, offset: 1, len }
        }
        0xb8..=0xbf => {
            let len_of_len = (first - 0xb7) as usize;
            Header { is_list: false, offset: 1 + len_of_len, len: read_long_length(input, len_of_len)? }
        }
        0xc0..=0xf7 => Header { is_list: true, offset: 1, len: (first - 0xc0) as usize },
        0xf8..=0xff => {
            let len_of_len = (first - 0xf7) as usize;
            Header { is_list: true, offset: 1 + len_of_len, len: read_long_length(input, len_of_len)? }
        }
    };

    let end = header.offset.checked_add(header.len).ok_or(RlpError::UnexpectedEnd)?;
    if input.len() < end {
        return Err(RlpError::UnexpectedEnd);
    }
    Ok(header)
}

fn read_long_length(input: &[u8], len_of_len: usize) -> Result<usize, RlpError> {
    let len_bytes = input.get(1..1 + len_of_len).ok_or(RlpError::UnexpectedEnd)?;
    if len_bytes[0] == 0 || len_of_len > std::mem::size_of::<usize>() {
        return Err(RlpError::NonCanonical(1));
    }
    let len = len_bytes.iter().fold(0usize, |acc, b| (acc << 8) | *b as usize);
    if len < 56 {
        return Err(RlpError::NonCanonical(0));
    }
    Ok(len)
}

/// Decode one item from the front of `input`, returning it and the rest
pub fn decode_item(input: &[u8]) -> Result<(RlpItem<'_>, &[u8]), RlpError> {
    decode_nested(input, 0)
}

fn decode_nested(input: &[u8], depth: usize) -> Result<(RlpItem<'_>, &[u8]), RlpError> {
    let header = decode_header(input)?;
    let end = header.offset + header.len;
    let payload = &input[header.offset..end];

    let item = if header.is_list {
        if depth >= MAX_DEPTH {
            return Err(RlpError::TooDeep);
        }
        let mut items = Vec::new();
        let mut rest = payload;
        while !rest.is_empty() {
            let (item, tail) = decode_nested(rest, depth + 1)?;
            items.push(item);
            rest = tail;
        }
        RlpItem::List(items)
    } else {
        RlpItem::Bytes(payload)
    };

    Ok((item, &input[end..]))
}

/// Decode a buffer holding exactly one item
pub fn decode_exact(input: &[u8]) -> Result<RlpItem<'_>, RlpError> {
    let (item, rest) = decode_item(input)?;
    if !rest.is_empty() {
        return Err(RlpError::TrailingBytes(rest.len()));
    }
    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_u64() {
        assert_eq!(encode_u64(0), vec![0x80]);
        assert_eq!(encode_u64(127), vec![127]);
        assert_eq!(encode_u64(128), vec![0x81, 128]);
        assert_eq!(encode_u64(256), vec![0x82, 1, 0]);
        assert_eq!(encode_u64(1000), vec![0x82, 0x03, 0xe8]);
    }

    #[test]
    fn test_encode_bytes() {
        assert_eq!(encode_bytes(&[]), vec![0x80]);
        assert_eq!(encode_bytes(&[0x7f]), vec![0x7f]);
        assert_eq!(encode_bytes(&[0x80]), vec![0x81, 0x80]);
        assert_eq!(encode_bytes(&[1, 2, 3]), vec![0x83, 1, 2, 3]);

        let long = vec![0xaa; 60];
        let encoded = encode_bytes(&long);
        assert_eq!(&encoded[..2], &[0xb8, 60]);
        assert_eq!(encoded.len(), 62);
    }

    #[test]
    fn test_encode_list() {
        assert_eq!(encode_list(&[]), vec![0xc0]);
        // ["cat", "dog"]
        assert_eq!(
            encode_list(&[encode_str("cat"), encode_str("dog")]),
            vec![0xc8, 0x83, b'c', b'a', b't', 0x83, b'd', b'o', b'g']
        );
    }

    #[test]
    fn test_decode_nested() {
        let encoded = encode_list(&[
            encode_u64(1000),
            encode_list(&[encode_str("group0")]),
            encode_bytes(&vec![0x11; 70]),
        ]);
        let item = decode_exact(&encoded).unwrap();
        let list = item.as_list().unwrap();

        assert_eq!(list.len(), 3);
        assert_eq!(list[0].as_u64().unwrap(), 1000);
        assert_eq!(list[1].as_list().unwrap()[0].as_bytes().unwrap(), b"group0");
        assert_eq!(list[2].as_bytes().unwrap(), &[0x11; 70][..]);
    }

    #[test]
    fn test_decode_rejects_non_canonical() {
        // single byte below 0x80 wrapped in a string header
        assert_eq!(decode_exact(&[0x81, 0x05]), Err(RlpError::NonCanonical(0)));
        // short length written in long form
        let mut long_form = vec![0xb8, 3];
        long_form.extend_from_slice(b"abc");
        assert_eq!(decode_exact(&long_form), Err(RlpError::NonCanonical(0)));
        // scalar with a leading zero
        let item = decode_exact(&[0x82, 0x00, 0x01]).unwrap();
        assert!(item.as_u64().is_err());
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(decode_exact(&[]), Err(RlpError::UnexpectedEnd));
        assert_eq!(decode_exact(&[0x83, 1, 2]), Err(RlpError::UnexpectedEnd));
        assert_eq!(decode_exact(&[0x01, 0x02]), Err(RlpError::TrailingBytes(1)));
        assert_eq!(decode_exact(&[0xc0]).unwrap().as_bytes(), Err(RlpError::ExpectedBytes));
        let nine = encode_bytes(&[1u8; 9]);
        assert_eq!(decode_exact(&nine).unwrap().as_u64(), Err(RlpError::IntegerOverflow));
    }

    fn nested_lists(levels: usize) -> Vec<u8> {
        let mut encoded = encode_list(&[]);
        for _ in 1..levels {
            encoded = encode_list(&[encoded]);
        }
        encoded
    }

    #[test]
    fn test_decode_depth_bound() {
        assert!(decode_exact(&nested_lists(MAX_DEPTH)).is_ok());
        assert_eq!(decode_exact(&nested_lists(MAX_DEPTH + 1)), Err(RlpError::TooDeep));

        // long-form headers all the way down must not exhaust the stack
        let mut deep = encode_bytes(&[0xaa; 60]);
        for _ in 0..2_000 {
            deep = encode_list(&[deep]);
        }
        assert_eq!(decode_exact(&deep), Err(RlpError::TooDeep));
        assert_eq!(decode_item(&deep).map(|_| ()), Err(RlpError::TooDeep));
    }
}
