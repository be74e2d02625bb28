//! TCP command listener.
//!
//! One operator connection at a time. Bytes are decoded into frames on this
//! thread and queued for the control loop; malformed frames are counted and
//! skipped.

use std::io::{ErrorKind, Read};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{SendTimeoutError, Sender};
use rover_core::{Frame, FrameDecoder};

/// Wait between accept attempts while nobody is connecting.
const ACCEPT_BACKOFF: Duration = Duration::from_secs(1);
/// Granularity of stop-flag checks while idle.
const STOP_POLL: Duration = Duration::from_millis(50);
const READ_TIMEOUT: Duration = Duration::from_millis(100);

pub struct CommandServer {
    local_addr: SocketAddr,
    rejected: Arc<AtomicU64>,
    stop: Arc<AtomicBool>,
    join_handle: Option<JoinHandle<()>>,
}

impl CommandServer {
    /// Bind `addr` and start serving on a background thread.
    pub fn spawn(addr: &str, frames: Sender<Frame>) -> eyre::Result<Self> {
        let listener =
            TcpListener::bind(addr).map_err(|e| eyre::eyre!("bind command listener {addr}: {e}"))?;
        listener.set_nonblocking(true)?;
        let local_addr = listener.local_addr()?;
        let rejected = Arc::new(AtomicU64::new(0));
        let stop = Arc::new(AtomicBool::new(false));

        let worker = Worker {
            listener,
            frames,
            rejected: rejected.clone(),
            stop: stop.clone(),
        };
        let join_handle = std::thread::Builder::new()
            .name("rover-net".into())
            .spawn(move || worker.serve())?;

        Ok(Self {
            local_addr,
            rejected,
            stop,
            join_handle: Some(join_handle),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Malformed frames dropped across all connections.
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }
}

impl Drop for CommandServer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(h) = self.join_handle.take() {
            let _ = h.join();
        }
    }
}

struct Worker {
    listener: TcpListener,
    frames: Sender<Frame>,
    rejected: Arc<AtomicU64>,
    stop: Arc<AtomicBool>,
}

enum Session {
    /// Peer closed or the connection failed; accept the next one.
    Closed,
    /// The control loop is gone; nothing left to serve.
    Finished,
}

impl Worker {
    fn stopping(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    fn idle(&self, span: Duration) {
        let until = Instant::now() + span;
        while !self.stopping() && Instant::now() < until {
            std::thread::sleep(STOP_POLL);
        }
    }

    /// Queue a frame, waiting while the queue is full. False once stopping
    /// or the control loop is gone.
    fn forward(&self, mut frame: Frame) -> bool {
        loop {
            if self.stopping() {
                return false;
            }
            match self.frames.send_timeout(frame, STOP_POLL) {
                Ok(()) => return true,
                Err(SendTimeoutError::Timeout(f)) => frame = f,
                Err(SendTimeoutError::Disconnected(_)) => return false,
            }
        }
    }

    fn serve(self) {
        while !self.stopping() {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    tracing::info!(%peer, "operator connected");
                    let outcome = self.session(stream);
                    tracing::info!(%peer, "operator disconnected");
                    if matches!(outcome, Session::Finished) {
                        break;
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => self.idle(ACCEPT_BACKOFF),
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                    self.idle(ACCEPT_BACKOFF);
                }
            }
        }
        tracing::debug!("command listener exiting");
    }

    fn session(&self, mut stream: TcpStream) -> Session {
        if let Err(e) = stream
            .set_nonblocking(false)
            .and_then(|()| stream.set_read_timeout(Some(READ_TIMEOUT)))
        {
            tracing::warn!(error = %e, "could not configure client socket");
            return Session::Closed;
        }

        let mut decoder = FrameDecoder::new();
        let mut buf = [0u8; 256];
        while !self.stopping() {
            match stream.read(&mut buf) {
                Ok(0) => return Session::Closed,
                Ok(n) => decoder.feed(&buf[..n]),
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    continue;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!(error = %e, "client read failed");
                    return Session::Closed;
                }
            }

            while let Some(next) = decoder.try_next() {
                match next {
                    Ok(frame) => {
                        tracing::debug!(?frame, "frame received");
                        if !self.forward(frame) {
                            return Session::Finished;
                        }
                    }
                    Err(e) => {
                        self.rejected.fetch_add(1, Ordering::Relaxed);
                        tracing::warn!(error = %e, "malformed frame dropped");
                    }
                }
            }
        }
        Session::Finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn connect(addr: SocketAddr) -> TcpStream {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            match TcpStream::connect(addr) {
                Ok(s) => return s,
                Err(_) if Instant::now() < deadline => {
                    std::thread::sleep(Duration::from_millis(20));
                }
                Err(e) => panic!("connect {addr}: {e}"),
            }
        }
    }

    #[test]
    fn frames_flow_through_and_garbage_is_counted() {
        let (tx, rx) = crossbeam_channel::bounded(16);
        let server = CommandServer::spawn("127.0.0.1:0", tx).expect("bind");
        let mut client = connect(server.local_addr());
        client.write_all(b"LF5 X SR\nL:0.5\nreset\n").expect("write");

        let mut got = Vec::new();
        for _ in 0..4 {
            got.push(rx.recv_timeout(Duration::from_secs(5)).expect("frame"));
        }
        assert!(matches!(got[0], Frame::Motion(_)));
        assert!(matches!(got[3], Frame::Reset));
        assert_eq!(server.rejected(), 1);
    }

    #[test]
    fn drop_returns_while_queue_is_full() {
        let (tx, rx) = crossbeam_channel::bounded(2);
        let server = CommandServer::spawn("127.0.0.1:0", tx).expect("bind");
        let mut client = connect(server.local_addr());
        client
            .write_all(b"reset\nLF5LF5LF5LF5LF5LF5")
            .expect("write");

        let first = rx.recv_timeout(Duration::from_secs(5)).expect("frame");
        assert!(matches!(first, Frame::Reset));
        // let the listener fill the queue and block on the next frame
        std::thread::sleep(Duration::from_millis(200));
        assert!(rx.is_full());

        let start = Instant::now();
        drop(server);
        assert!(start.elapsed() < Duration::from_secs(3));
        drop(rx);
    }

    #[test]
    fn drop_joins_listener_thread() {
        let (tx, _rx) = crossbeam_channel::bounded(1);
        let server = CommandServer::spawn("127.0.0.1:0", tx).expect("bind");
        let start = Instant::now();
        drop(server);
        assert!(start.elapsed() < Duration::from_secs(3));
    }
}
