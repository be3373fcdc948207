//! Black-box round-trip tests driving the crate only through its public
//! API, the way the upstream codec's own test suite exercises a whole
//! compressed stream against fixture-style input rather than poking at
//! internals.

use gkey::bits::{Input, Output};
use gkey::{compress_to_vec, decompress_to_vec, Compressor, Decompressor, Params, Status};

fn roundtrip(data: &[u8], k: u32) {
    let compressed = compress_to_vec(data, k).expect("compress");
    let decompressed = decompress_to_vec(&compressed, k, data.len()).expect("decompress");
    assert_eq!(&decompressed, data, "k={}", k);
}

#[test]
fn empty_input_roundtrips() {
    roundtrip(b"", 9);
}

#[test]
fn single_byte_roundtrips() {
    roundtrip(b"Z", 9);
}

#[test]
fn lorem_like_text_roundtrips() {
    let data = b"Lorem ipsum dolor sit amet, consectetur adipiscing elit, \
                 sed do eiusmod tempor incididunt ut labore et dolore magna \
                 aliqua. Ut enim ad minim veniam, quis nostrud exercitation.";
    roundtrip(data, 9);
}

#[test]
fn binary_data_with_runs_roundtrips() {
    let mut data = Vec::new();
    for i in 0..600u32 {
        data.push((i % 251) as u8);
    }
    data.extend(std::iter::repeat(0xAAu8).take(300));
    roundtrip(&data, 9);
}

#[test]
fn every_history_log2_roundtrips_the_same_input() {
    let data = b"the quick brown fox jumps over the lazy dog, the lazy dog sleeps";
    for k in 0..=9 {
        roundtrip(data, k);
    }
}

/// Sizing mode's `out_size` delta matches the byte count written with an
/// ample real output window, for the same input.
#[test]
fn sizing_mode_matches_real_output_total() {
    let data = b"abcabcabcabcabcabcabcxyzxyzxyz";
    let buffered = compress_to_vec(data, 9).unwrap();

    let mut enc = Compressor::new(9);
    let mut params = Params::new(Input::new(data), Output::sizing());
    loop {
        match enc.compress(&mut params, true) {
            Status::BufferOverflow => continue,
            Status::Finished => break,
            other => panic!("unexpected status: {:?}", other),
        }
    }
    assert_eq!(params.output.sized_total(), buffered.len());
}

/// Feeding the encoder one byte of input and one byte of output room at a
/// time yields byte-identical output to a single call.
#[test]
fn byte_at_a_time_io_matches_single_shot() {
    let data = b"mississippi river delta, mississippi river delta again";
    let whole = compress_to_vec(data, 9).unwrap();

    let mut enc = Compressor::new(9);
    let mut out = Vec::new();
    for (i, chunk) in data.chunks(1).enumerate() {
        let finish = i == data.len() - 1;
        let mut one = [0u8; 1];
        let mut params = Params::new(Input::new(chunk), Output::buffer(&mut one));
        loop {
            let status = enc.compress(&mut params, finish);
            out.extend_from_slice(&one[..params.output.emitted()]);
            match status {
                Status::BufferOverflow => continue,
                Status::Ok | Status::Finished => break,
                other => panic!("unexpected status: {:?}", other),
            }
        }
    }
    loop {
        let mut one = [0u8; 1];
        let mut params = Params::new(Input::new(&[]), Output::buffer(&mut one));
        let status = enc.compress(&mut params, true);
        out.extend_from_slice(&one[..params.output.emitted()]);
        match status {
            Status::BufferOverflow => continue,
            Status::Finished => break,
            other => panic!("unexpected status while finishing: {:?}", other),
        }
    }
    assert_eq!(out, whole);

    let decompressed = decompress_to_vec(&out, 9, data.len()).unwrap();
    assert_eq!(&decompressed, data);
}

/// After processing the same bytes, encoder and decoder rings hold
/// byte-identical content, not merely an equivalent stream. Exercised
/// indirectly: decoding a stream produced from data longer than the window
/// must still round-trip, which only holds if both sides track history the
/// same way once the ring has wrapped.
#[test]
fn history_wraps_past_window_and_still_roundtrips() {
    let mut data = Vec::new();
    for i in 0..2000u32 {
        data.push((i % 7) as u8);
    }
    roundtrip(&data, 9);
}

#[test]
fn decoder_rejects_zero_length_copy_by_default() {
    // type bit (1 = copy), 9 bits offset = 0, 9 bits size = 0
    let mut bits = vec![true];
    bits.extend(std::iter::repeat(false).take(18));
    let bytes = pack_lsb_first(&bits);

    let mut dec = Decompressor::new(9);
    let mut out = [0u8; 8];
    let mut params = Params::new(Input::new(&bytes), Output::buffer(&mut out));
    assert_eq!(dec.decompress(&mut params), Status::BadInput);
}

#[test]
fn finished_decoder_rejects_further_calls() {
    let mut dec = Decompressor::new(9);
    let mut out = [0u8; 8];
    let mut params = Params::new(Input::new(&[]), Output::buffer(&mut out));
    assert_eq!(dec.decompress(&mut params), Status::Finished);

    let mut params2 = Params::new(Input::new(&[0xff, 0xff]), Output::buffer(&mut out));
    assert_eq!(dec.decompress(&mut params2), Status::Finished);
}

fn pack_lsb_first(bits: &[bool]) -> Vec<u8> {
    let mut bytes = vec![0u8; (bits.len() + 7) / 8];
    for (i, &b) in bits.iter().enumerate() {
        if b {
            bytes[i / 8] |= 1 << (i % 8);
        }
    }
    bytes
}
