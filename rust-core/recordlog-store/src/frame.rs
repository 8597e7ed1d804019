// SPDX-License-Identifier: PMPL-1.0-or-later
//
// recordlog storage engine - Frame codec
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// A frame is one record in the store's byte stream:
//   [8 bytes: payload length (u64 BE)]
//   [N bytes: payload]

/// Width in bytes of the length prefix written before every payload.
pub const LEN_WIDTH: u64 = 8;

/// Encode a payload length as the on-disk prefix.
pub fn encode_len(len: u64) -> [u8; LEN_WIDTH as usize] {
    len.to_be_bytes()
}

/// Decode an on-disk prefix back into a payload length.
pub fn decode_len(prefix: [u8; LEN_WIDTH as usize]) -> u64 {
    u64::from_be_bytes(prefix)
}

/// Build a whole frame (prefix followed by payload) in one buffer, so it
/// reaches the writer as a single contiguous write.
pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(LEN_WIDTH as usize + payload.len());
    frame.extend_from_slice(&encode_len(payload.len() as u64));
    frame.extend_from_slice(payload);
    frame
}

/// Total bytes a frame carrying `payload_len` bytes occupies in the store.
///
/// Returns `None` if the size does not fit in a `u64`, which can only happen
/// when decoding a garbage prefix.
pub fn frame_size(payload_len: u64) -> Option<u64> {
    payload_len.checked_add(LEN_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_is_big_endian() {
        assert_eq!(encode_len(13), [0, 0, 0, 0, 0, 0, 0, 13]);
        assert_eq!(encode_len(0x0102), [0, 0, 0, 0, 0, 0, 1, 2]);
        assert_eq!(decode_len([0, 0, 0, 0, 0, 0, 1, 2]), 0x0102);
    }

    #[test]
    fn test_encode_frame() {
        let frame = encode_frame(b"abc");
        assert_eq!(frame.len() as u64, frame_size(3).unwrap());
        assert_eq!(frame[..8], encode_len(3));
        assert_eq!(&frame[8..], b"abc");

        assert_eq!(encode_frame(b""), encode_len(0));
    }

    #[test]
    fn test_frame_size() {
        assert_eq!(frame_size(0), Some(8));
        assert_eq!(frame_size(13), Some(21));
        assert_eq!(frame_size(u64::MAX), None);
    }
}
