#![no_main]
use libfuzzer_sys::fuzz_target;
use rover_core::FrameDecoder;

// Decoding must not depend on how the stream is split across reads.
fuzz_target!(|input: (u8, &[u8])| {
    let (split, data) = input;
    let whole = FrameDecoder::new().decode_all(data);

    let mut chunked = FrameDecoder::new();
    let mut frames = Vec::new();
    for chunk in data.chunks(usize::from(split.max(1))) {
        frames.extend(chunked.decode_all(chunk));
    }
    assert_eq!(whole, frames);
});
