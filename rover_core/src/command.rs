//! Operator commands and the byte-stream decoder that produces them.
//!
//! Accepted frames (whitespace and `;` between frames are ignored):
//!
//! | bytes            | meaning                                   |
//! |------------------|-------------------------------------------|
//! | `LF5`, `RB3`     | side, direction, power digit `0..=9`      |
//! | `SL`, `SR`       | stop one side                             |
//! | `L:0.4\n`        | analog value in [-1, 1], sign = direction |
//! | `reset`          | end the session                           |
//!
//! Power `0` and analog values that round to level 0 decode as a stop.

use rover_traits::Side;
use thiserror::Error;

use crate::ramp::PowerLevel;

/// Longest analog line accepted, newline excluded.
pub const MAX_LINE: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Forward(PowerLevel),
    Backward(PowerLevel),
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionCommand {
    pub side: Side,
    pub action: Action,
}

impl MotionCommand {
    pub fn forward(side: Side, level: u8) -> Self {
        Self {
            side,
            action: Action::Forward(PowerLevel::new(level)),
        }
    }

    pub fn backward(side: Side, level: u8) -> Self {
        Self {
            side,
            action: Action::Backward(PowerLevel::new(level)),
        }
    }

    pub fn stop(side: Side) -> Self {
        Self {
            side,
            action: Action::Stop,
        }
    }

    /// Build from a normalized value; 0 (after quantizing) is a stop.
    pub fn from_fraction(side: Side, x: f32) -> Self {
        let level = PowerLevel::from_fraction(x);
        let action = if level == PowerLevel::ZERO {
            Action::Stop
        } else if x > 0.0 {
            Action::Forward(level)
        } else {
            Action::Backward(level)
        };
        Self { side, action }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    Motion(MotionCommand),
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unexpected byte 0x{0:02x}")]
    UnexpectedByte(u8),
    #[error("unknown direction 0x{0:02x}")]
    UnknownDirection(u8),
    #[error("unknown side 0x{0:02x} after stop")]
    UnknownSide(u8),
    #[error("invalid power digit 0x{0:02x}")]
    InvalidPower(u8),
    #[error("invalid analog value {0:?}")]
    InvalidAnalog(String),
    #[error("analog line too long ({0} bytes)")]
    LineTooLong(usize),
}

/// Incremental decoder; tolerates frames split across reads.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
    rejected: u64,
    /// Inside an over-long analog line; drop bytes up to its newline.
    discarding: bool,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Bytes held back waiting for the rest of a frame.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Malformed frames skipped so far.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    fn consume(&mut self, n: usize) {
        let n = n.min(self.buf.len());
        self.buf.drain(..n);
    }

    /// Decode one frame. `None` means more input is needed.
    ///
    /// On error the offending bytes are dropped so decoding can resync.
    pub fn try_next(&mut self) -> Option<Result<Frame, DecodeError>> {
        loop {
            if self.discarding {
                match self.buf.iter().position(|&b| b == b'\n') {
                    Some(end) => {
                        self.consume(end + 1);
                        self.discarding = false;
                    }
                    None => {
                        self.buf.clear();
                        return None;
                    }
                }
            }
            let first = *self.buf.first()?;
            match first {
                b' ' | b'\t' | b'\r' | b'\n' | b';' => self.consume(1),
                b'L' => return self.side_frame(Side::Left),
                b'R' => return self.side_frame(Side::Right),
                b'S' => return self.stop_frame(),
                b'r' => return self.reset_frame(),
                other => {
                    self.consume(1);
                    return Some(Err(DecodeError::UnexpectedByte(other)));
                }
            }
        }
    }

    fn side_frame(&mut self, side: Side) -> Option<Result<Frame, DecodeError>> {
        let dir = *self.buf.get(1)?;
        match dir {
            b'F' | b'B' => {
                let digit = *self.buf.get(2)?;
                if !digit.is_ascii_digit() {
                    self.consume(2);
                    return Some(Err(DecodeError::InvalidPower(digit)));
                }
                self.consume(3);
                let level = PowerLevel::new(digit - b'0');
                let action = match (dir, level) {
                    (_, PowerLevel::ZERO) => Action::Stop,
                    (b'F', l) => Action::Forward(l),
                    (_, l) => Action::Backward(l),
                };
                Some(Ok(Frame::Motion(MotionCommand { side, action })))
            }
            b':' => self.analog_frame(side),
            other => {
                self.consume(1);
                Some(Err(DecodeError::UnknownDirection(other)))
            }
        }
    }

    fn analog_frame(&mut self, side: Side) -> Option<Result<Frame, DecodeError>> {
        let Some(end) = self.buf.iter().position(|&b| b == b'\n') else {
            if self.buf.len() > MAX_LINE + 2 {
                let n = self.buf.len();
                self.buf.clear();
                self.discarding = true;
                return Some(Err(DecodeError::LineTooLong(n)));
            }
            return None;
        };
        let line: Vec<u8> = self.buf.drain(..=end).collect();
        if end > MAX_LINE + 2 {
            return Some(Err(DecodeError::LineTooLong(end)));
        }
        let text = String::from_utf8_lossy(&line[2..end]);
        let text = text.trim();
        match text.parse::<f32>() {
            Ok(x) if x.is_finite() => Some(Ok(Frame::Motion(MotionCommand::from_fraction(
                side,
                x.clamp(-1.0, 1.0),
            )))),
            _ => Some(Err(DecodeError::InvalidAnalog(text.to_string()))),
        }
    }

    fn stop_frame(&mut self) -> Option<Result<Frame, DecodeError>> {
        let side = match *self.buf.get(1)? {
            b'L' => Side::Left,
            b'R' => Side::Right,
            other => {
                self.consume(1);
                return Some(Err(DecodeError::UnknownSide(other)));
            }
        };
        self.consume(2);
        Some(Ok(Frame::Motion(MotionCommand::stop(side))))
    }

    fn reset_frame(&mut self) -> Option<Result<Frame, DecodeError>> {
        const WORD: &[u8] = b"reset";
        if self.buf.starts_with(WORD) {
            self.consume(WORD.len());
            return Some(Ok(Frame::Reset));
        }
        if WORD.starts_with(&self.buf) {
            return None;
        }
        self.consume(1);
        Some(Err(DecodeError::UnexpectedByte(b'r')))
    }

    /// Next valid frame, skipping and logging malformed input.
    pub fn next_frame(&mut self) -> Option<Frame> {
        loop {
            match self.try_next()? {
                Ok(frame) => return Some(frame),
                Err(e) => {
                    self.rejected += 1;
                    tracing::warn!(error = %e, "dropping malformed command bytes");
                }
            }
        }
    }

    /// Feed `bytes` and collect every complete frame.
    pub fn decode_all(&mut self, bytes: &[u8]) -> Vec<Frame> {
        self.feed(bytes);
        std::iter::from_fn(|| self.next_frame()).collect()
    }
}
