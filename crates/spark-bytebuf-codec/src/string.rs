//! 字符串编码：码点长度前缀（L）、varint 长度前缀（V）、NUL 结尾（C）与裸 UTF-8。
//!
//! # 契约说明（What）
//! - 读取返回 `Decoded<String>`，`length` 计入前缀、负载与终止符；
//!   隐式形式把 `position` 推进 `length`，`_at` 形式不动游标；
//! - 写入先在内存中拼出完整编码，再一次性写入：容量不足时先扩容，失败时缓冲不变；
//! - 解出的码点若不是合法 Unicode 标量值（代理区、超过 `0x10FFFF`）返回 `Range`。

use spark_bytebuf::{BufferError, ByteBuffer, Decoded, Result};

use crate::utf8::{self, MAX_CODEPOINT, MAX_UTF8_CHAR_LEN};
use crate::varint::{self, MAX_VARINT64_LEN};

/// 字符串编解码，作为扩展 trait 挂在 [`ByteBuffer`] 上。
pub trait StringCodec {
    /// 写入裸 UTF-8 字节，不带任何前缀或终止符，返回写入字节数。
    fn write_utf8_str(&mut self, text: &str) -> Result<usize>;
    /// 在显式偏移处写入裸 UTF-8 字节。
    fn write_utf8_str_at(&mut self, offset: usize, text: &str) -> Result<usize>;
    /// 按码点个数读取裸 UTF-8 字符串。
    fn read_utf8_string(&mut self, chars: usize) -> Result<Decoded<String>>;
    /// 在显式偏移处按码点个数读取。
    fn read_utf8_string_at(&mut self, offset: usize, chars: usize) -> Result<Decoded<String>>;
    /// 按字节长度读取裸 UTF-8 字符串，末尾码点不得跨越长度边界。
    fn read_utf8_string_bytes(&mut self, len: usize) -> Result<Decoded<String>>;
    /// 在显式偏移处按字节长度读取。
    fn read_utf8_string_bytes_at(&mut self, offset: usize, len: usize)
    -> Result<Decoded<String>>;

    /// 写入以码点编码字节长度为前缀的字符串。
    fn write_lstring(&mut self, text: &str) -> Result<usize>;
    /// 在显式偏移处写入 L 字符串。
    fn write_lstring_at(&mut self, offset: usize, text: &str) -> Result<usize>;
    /// 读取 L 字符串。
    fn read_lstring(&mut self) -> Result<Decoded<String>>;
    /// 在显式偏移处读取 L 字符串。
    fn read_lstring_at(&mut self, offset: usize) -> Result<Decoded<String>>;

    /// 写入以 varint32 字节长度为前缀的字符串。
    fn write_vstring(&mut self, text: &str) -> Result<usize>;
    /// 在显式偏移处写入 V 字符串。
    fn write_vstring_at(&mut self, offset: usize, text: &str) -> Result<usize>;
    /// 读取 V 字符串。
    fn read_vstring(&mut self) -> Result<Decoded<String>>;
    /// 在显式偏移处读取 V 字符串。
    fn read_vstring_at(&mut self, offset: usize) -> Result<Decoded<String>>;

    /// 写入以单个 0 字节结尾的字符串；文本内含 U+0000 时返回 `Range` 且不写入任何字节。
    fn write_cstring(&mut self, text: &str) -> Result<usize>;
    /// 在显式偏移处写入 C 字符串。
    fn write_cstring_at(&mut self, offset: usize, text: &str) -> Result<usize>;
    /// 读取 C 字符串，扫描到 0 码点为止。
    fn read_cstring(&mut self) -> Result<Decoded<String>>;
    /// 在显式偏移处读取 C 字符串。
    fn read_cstring_at(&mut self, offset: usize) -> Result<Decoded<String>>;
}

fn push_scalar(operation: &'static str, out: &mut String, codepoint: u32) -> Result<()> {
    let c = char::from_u32(codepoint).ok_or_else(|| {
        BufferError::range(
            operation,
            format!("codepoint {codepoint:#X} is not a unicode scalar value"),
        )
    })?;
    out.push(c);
    Ok(())
}

fn decode_chars(operation: &'static str, bytes: &[u8], chars: usize) -> Result<(String, usize)> {
    // 码点数来自调用方，预留空间只按窗口长度估计。
    let mut text = String::with_capacity(chars.min(bytes.len()));
    let mut consumed = 0;
    for _ in 0..chars {
        let (codepoint, len) = utf8::decode_for(operation, &bytes[consumed..])?;
        push_scalar(operation, &mut text, codepoint)?;
        consumed += len;
    }
    Ok((text, consumed))
}

fn decode_exact(operation: &'static str, bytes: &[u8], len: usize) -> Result<(String, usize)> {
    let Some(payload) = bytes.get(..len) else {
        return Err(BufferError::range(
            operation,
            format!("string needs {len} bytes, window holds {}", bytes.len()),
        ));
    };
    let mut text = String::with_capacity(len);
    let mut consumed = 0;
    while consumed < len {
        let (codepoint, width) = utf8::decode_for(operation, &payload[consumed..])?;
        push_scalar(operation, &mut text, codepoint)?;
        consumed += width;
    }
    Ok((text, len))
}

pub(crate) fn decode_lstring(operation: &'static str, bytes: &[u8]) -> Result<(String, usize)> {
    let (len, prefix) = utf8::decode_for(operation, bytes)?;
    let (text, payload) = decode_exact(operation, &bytes[prefix..], len as usize)?;
    Ok((text, prefix + payload))
}

fn decode_vstring(operation: &'static str, bytes: &[u8]) -> Result<(String, usize)> {
    let (len, prefix) = varint::decode_varint32_for(operation, bytes)?;
    let (text, payload) = decode_exact(operation, &bytes[prefix..], len as usize)?;
    Ok((text, prefix + payload))
}

fn decode_cstring(operation: &'static str, bytes: &[u8]) -> Result<(String, usize)> {
    let mut text = String::new();
    let mut consumed = 0;
    loop {
        if consumed == bytes.len() {
            return Err(BufferError::range(
                operation,
                "missing NUL terminator before end of window",
            ));
        }
        let (codepoint, len) = utf8::decode_for(operation, &bytes[consumed..])?;
        consumed += len;
        if codepoint == 0 {
            return Ok((text, consumed));
        }
        push_scalar(operation, &mut text, codepoint)?;
    }
}

fn encode_lstring(operation: &'static str, text: &str) -> Result<Vec<u8>> {
    let len = u32::try_from(text.len())
        .ok()
        .filter(|len| *len <= MAX_CODEPOINT)
        .ok_or_else(|| {
            BufferError::range(operation, format!("string of {} bytes is too long", text.len()))
        })?;
    let mut prefix = [0u8; MAX_UTF8_CHAR_LEN];
    let width = utf8::encode_codepoint(len, &mut prefix)?;
    let mut encoded = Vec::with_capacity(width + text.len());
    encoded.extend_from_slice(&prefix[..width]);
    encoded.extend_from_slice(text.as_bytes());
    Ok(encoded)
}

fn encode_vstring(operation: &'static str, text: &str) -> Result<Vec<u8>> {
    let len = u32::try_from(text.len()).map_err(|_| {
        BufferError::range(operation, format!("string of {} bytes is too long", text.len()))
    })?;
    let mut prefix = [0u8; MAX_VARINT64_LEN];
    let width = varint::encode_varint64(u64::from(len), &mut prefix);
    let mut encoded = Vec::with_capacity(width + text.len());
    encoded.extend_from_slice(&prefix[..width]);
    encoded.extend_from_slice(text.as_bytes());
    Ok(encoded)
}

fn encode_cstring(operation: &'static str, text: &str) -> Result<Vec<u8>> {
    if let Some(index) = text.bytes().position(|b| b == 0) {
        return Err(BufferError::range(
            operation,
            format!("embedded NUL at byte {index}"),
        ));
    }
    let mut encoded = Vec::with_capacity(text.len() + 1);
    encoded.extend_from_slice(text.as_bytes());
    encoded.push(0);
    Ok(encoded)
}

fn write_encoded(
    buffer: &mut ByteBuffer,
    operation: &'static str,
    offset: Option<usize>,
    encode: fn(&'static str, &str) -> Result<Vec<u8>>,
    text: &str,
) -> Result<usize> {
    let encoded = encode(operation, text)?;
    buffer.write_bytes(operation, offset, &encoded)
}

impl StringCodec for ByteBuffer {
    fn write_utf8_str(&mut self, text: &str) -> Result<usize> {
        self.write_bytes("write_utf8_str", None, text.as_bytes())
    }

    fn write_utf8_str_at(&mut self, offset: usize, text: &str) -> Result<usize> {
        self.write_bytes("write_utf8_str", Some(offset), text.as_bytes())
    }

    fn read_utf8_string(&mut self, chars: usize) -> Result<Decoded<String>> {
        self.decode_with("read_utf8_string", None, |bytes| {
            decode_chars("read_utf8_string", bytes, chars)
        })
    }

    fn read_utf8_string_at(&mut self, offset: usize, chars: usize) -> Result<Decoded<String>> {
        self.decode_with("read_utf8_string", Some(offset), |bytes| {
            decode_chars("read_utf8_string", bytes, chars)
        })
    }

    fn read_utf8_string_bytes(&mut self, len: usize) -> Result<Decoded<String>> {
        self.decode_with("read_utf8_string_bytes", None, |bytes| {
            decode_exact("read_utf8_string_bytes", bytes, len)
        })
    }

    fn read_utf8_string_bytes_at(
        &mut self,
        offset: usize,
        len: usize,
    ) -> Result<Decoded<String>> {
        self.decode_with("read_utf8_string_bytes", Some(offset), |bytes| {
            decode_exact("read_utf8_string_bytes", bytes, len)
        })
    }

    fn write_lstring(&mut self, text: &str) -> Result<usize> {
        write_encoded(self, "write_lstring", None, encode_lstring, text)
    }

    fn write_lstring_at(&mut self, offset: usize, text: &str) -> Result<usize> {
        write_encoded(self, "write_lstring", Some(offset), encode_lstring, text)
    }

    fn read_lstring(&mut self) -> Result<Decoded<String>> {
        self.decode_with("read_lstring", None, |bytes| {
            decode_lstring("read_lstring", bytes)
        })
    }

    fn read_lstring_at(&mut self, offset: usize) -> Result<Decoded<String>> {
        self.decode_with("read_lstring", Some(offset), |bytes| {
            decode_lstring("read_lstring", bytes)
        })
    }

    fn write_vstring(&mut self, text: &str) -> Result<usize> {
        write_encoded(self, "write_vstring", None, encode_vstring, text)
    }

    fn write_vstring_at(&mut self, offset: usize, text: &str) -> Result<usize> {
        write_encoded(self, "write_vstring", Some(offset), encode_vstring, text)
    }

    fn read_vstring(&mut self) -> Result<Decoded<String>> {
        self.decode_with("read_vstring", None, |bytes| {
            decode_vstring("read_vstring", bytes)
        })
    }

    fn read_vstring_at(&mut self, offset: usize) -> Result<Decoded<String>> {
        self.decode_with("read_vstring", Some(offset), |bytes| {
            decode_vstring("read_vstring", bytes)
        })
    }

    fn write_cstring(&mut self, text: &str) -> Result<usize> {
        write_encoded(self, "write_cstring", None, encode_cstring, text)
    }

    fn write_cstring_at(&mut self, offset: usize, text: &str) -> Result<usize> {
        write_encoded(self, "write_cstring", Some(offset), encode_cstring, text)
    }

    fn read_cstring(&mut self) -> Result<Decoded<String>> {
        self.decode_with("read_cstring", None, |bytes| {
            decode_cstring("read_cstring", bytes)
        })
    }

    fn read_cstring_at(&mut self, offset: usize) -> Result<Decoded<String>> {
        self.decode_with("read_cstring", Some(offset), |bytes| {
            decode_cstring("read_cstring", bytes)
        })
    }
}
