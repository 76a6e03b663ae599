//! Streaming byte pipe.
//!
//! A [`Pipe`] moves chunks of bytes from [`Writer`]s to [`Reader`]s without
//! buffering a whole body up front. Both ends can be closed independently:
//!
//! * Closing the write end signals end-of-stream. Readers drain whatever was
//!   buffered and then get an empty chunk.
//! * Closing the read end abandons the stream. Buffered data is discarded,
//!   pending reads fail with [`Error::PipeClosed`] and the writer can notice
//!   via [`Writer::reader_closed()`].
//!
//! ```
//! use futures::executor::block_on;
//! use process_http::pipe::Pipe;
//!
//! let pipe = Pipe::new();
//! let reader = pipe.reader();
//! let writer = pipe.writer();
//!
//! let read = reader.read();
//!
//! assert!(writer.write("hello"));
//! assert!(writer.close());
//!
//! assert_eq!(block_on(read).unwrap(), b"hello");
//! assert_eq!(block_on(reader.read()).unwrap(), b"");
//! ```
//!
//! The shared state is guarded by a mutex that is only held for queue
//! manipulation. Pending reads are completed after the guard is released, so
//! whatever wakes up from a completed read may call straight back into the
//! same pipe.

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::future::{FutureExt, Shared};

use crate::Error;

type Chunk = Vec<u8>;
type PendingRead = oneshot::Sender<Result<Chunk, Error>>;

/// A stream with independently closable read and write ends.
///
/// The pipe itself is only a factory for handles. Every [`Reader`] and
/// [`Writer`] obtained from it observes the same stream, and the stream lives
/// until the last handle is dropped.
#[derive(Clone)]
pub struct Pipe {
    data: Arc<Data>,
}

/// Read end of a [`Pipe`].
#[derive(Clone)]
pub struct Reader {
    data: Arc<Data>,
}

/// Write end of a [`Pipe`].
#[derive(Clone)]
pub struct Writer {
    data: Arc<Data>,
}

struct Data {
    state: Mutex<State>,
    reader_closed: Shared<oneshot::Receiver<()>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum End {
    Open,
    Closed,
}

struct State {
    read_end: End,
    write_end: End,
    writes: VecDeque<Chunk>,
    reads: VecDeque<PendingRead>,
    reader_closure: Option<oneshot::Sender<()>>,
}

impl Data {
    fn lock(&self) -> MutexGuard<'_, State> {
        // No critical section can panic half way, the state is always consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Pipe {
    /// Create a new pipe with both ends open.
    pub fn new() -> Self {
        let (tx, rx) = oneshot::channel();

        let state = State {
            read_end: End::Open,
            write_end: End::Open,
            writes: VecDeque::new(),
            reads: VecDeque::new(),
            reader_closure: Some(tx),
        };

        Pipe {
            data: Arc::new(Data {
                state: Mutex::new(state),
                reader_closed: rx.shared(),
            }),
        }
    }

    /// A handle to the read end.
    pub fn reader(&self) -> Reader {
        Reader {
            data: self.data.clone(),
        }
    }

    /// A handle to the write end.
    pub fn writer(&self) -> Writer {
        Writer {
            data: self.data.clone(),
        }
    }
}

impl Default for Pipe {
    fn default() -> Self {
        Self::new()
    }
}

// //////////////////////////////////////////////////////////////////////////////////////////// READER

impl Reader {
    /// Read the next chunk.
    ///
    /// Resolves to an empty chunk once the write end is closed and everything
    /// buffered has been read. Fails with [`Error::PipeClosed`] if the read end
    /// is closed, either before the call or while the read is pending.
    ///
    /// Reads are satisfied in the order they were issued.
    pub fn read(&self) -> Read {
        let mut state = self.data.lock();

        if state.read_end == End::Closed {
            return Read::ready(Err(Error::PipeClosed));
        }

        if let Some(chunk) = state.writes.pop_front() {
            return Read::ready(Ok(chunk));
        }

        if state.write_end == End::Closed {
            // End-of-stream.
            return Read::ready(Ok(Chunk::new()));
        }

        let (tx, rx) = oneshot::channel();
        state.reads.push_back(tx);

        Read {
            inner: ReadInner::Pending(rx),
        }
    }

    /// Read chunks until end-of-stream and concatenate them.
    pub async fn read_all(&self) -> Result<Vec<u8>, Error> {
        let mut all = Vec::new();

        loop {
            let chunk = self.read().await?;

            if chunk.is_empty() {
                return Ok(all);
            }

            all.extend_from_slice(&chunk);
        }
    }

    /// Close the read end.
    ///
    /// Discards buffered chunks and fails all pending reads. If the write end
    /// is still open, [`Writer::reader_closed()`] resolves.
    ///
    /// Returns `false` if the read end was already closed.
    pub fn close(&self) -> bool {
        let (reads, notify) = {
            let mut state = self.data.lock();

            if state.read_end == End::Closed {
                return false;
            }

            // Throw away outstanding data.
            state.writes.clear();
            state.read_end = End::Closed;

            let notify = if state.write_end == End::Open {
                state.reader_closure.take()
            } else {
                None
            };

            (mem::take(&mut state.reads), notify)
        };

        for read in reads {
            let _ = read.send(Err(Error::PipeClosed));
        }

        if let Some(tx) = notify {
            let _ = tx.send(());
        }

        true
    }
}

// //////////////////////////////////////////////////////////////////////////////////////////// WRITER

impl Writer {
    /// Write a chunk.
    ///
    /// The chunk goes straight to the oldest pending read if there is one,
    /// otherwise it is buffered. Empty chunks are accepted and dropped, they
    /// never reach a reader (an empty chunk means end-of-stream).
    ///
    /// A pending read dropped while the chunk is handed over does not lose it,
    /// the chunk goes to the next pending read or the front of the buffer.
    ///
    /// Returns `false`, and drops the chunk, if either end is closed.
    pub fn write(&self, chunk: impl Into<Vec<u8>>) -> bool {
        let mut chunk = chunk.into();
        let mut retry = false;

        loop {
            let (tx, pending) = match self.deliver(chunk, retry) {
                Delivery::Closed => return false,
                Delivery::Done => return true,
                Delivery::Read(tx, pending) => (tx, pending),
            };

            // The read can be dropped after deliver(), the chunk comes back.
            match tx.send(Ok(pending)) {
                Err(Ok(returned)) => {
                    trace!("Pending read dropped during write, {} bytes", returned.len());
                    chunk = returned;
                    retry = true;
                }
                _ => return true,
            }
        }
    }

    /// Pair the chunk with the oldest live pending read, or buffer it.
    ///
    /// A retried chunk was accepted before anything buffered since and goes to
    /// the front of the queue. It is dropped if the read end closed meanwhile.
    fn deliver(&self, chunk: Chunk, retry: bool) -> Delivery {
        let mut state = self.data.lock();

        if !retry {
            if state.write_end == End::Closed || state.read_end == End::Closed {
                return Delivery::Closed;
            }

            if chunk.is_empty() {
                return Delivery::Done;
            }
        } else if state.read_end == End::Closed {
            return Delivery::Done;
        }

        // Readers that dropped their Read future are no longer waiting.
        while let Some(tx) = state.reads.pop_front() {
            if !tx.is_canceled() {
                return Delivery::Read(tx, chunk);
            }
        }

        if retry {
            state.writes.push_front(chunk);
        } else {
            state.writes.push_back(chunk);
        }

        Delivery::Done
    }

    /// Close the write end.
    ///
    /// All pending reads resolve with an empty chunk. Buffered chunks remain
    /// readable.
    ///
    /// Returns `false` if the write end was already closed.
    pub fn close(&self) -> bool {
        let reads = {
            let mut state = self.data.lock();

            if state.write_end == End::Closed {
                return false;
            }

            state.write_end = End::Closed;

            mem::take(&mut state.reads)
        };

        for read in reads {
            // End-of-stream.
            let _ = read.send(Ok(Chunk::new()));
        }

        true
    }

    /// A future that resolves when the read end is closed while the write end
    /// is still open.
    ///
    /// Lets a producer stop producing once nobody is listening. If the write
    /// end is closed first, the future never resolves.
    pub fn reader_closed(&self) -> ReaderClosed {
        ReaderClosed {
            inner: self.data.reader_closed.clone(),
        }
    }
}

enum Delivery {
    Closed,
    Done,
    Read(PendingRead, Chunk),
}

// //////////////////////////////////////////////////////////////////////////////////////////// FUTURES

/// Future returned by [`Reader::read()`].
#[must_use = "futures do nothing unless polled"]
pub struct Read {
    inner: ReadInner,
}

enum ReadInner {
    Ready(Option<Result<Chunk, Error>>),
    Pending(oneshot::Receiver<Result<Chunk, Error>>),
}

impl Read {
    fn ready(v: Result<Chunk, Error>) -> Self {
        Read {
            inner: ReadInner::Ready(Some(v)),
        }
    }
}

impl Future for Read {
    type Output = Result<Chunk, Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().inner {
            ReadInner::Ready(v) => Poll::Ready(v.take().expect("Read polled after completion")),
            // The sender only goes away without a value when every handle to
            // the pipe is gone, nobody can ever write to this read again.
            ReadInner::Pending(rx) => rx
                .poll_unpin(cx)
                .map(|r| r.unwrap_or(Err(Error::PipeClosed))),
        }
    }
}

/// Future returned by [`Writer::reader_closed()`].
#[must_use = "futures do nothing unless polled"]
pub struct ReaderClosed {
    inner: Shared<oneshot::Receiver<()>>,
}

impl Future for ReaderClosed {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        match self.inner.poll_unpin(cx) {
            Poll::Ready(Ok(())) => Poll::Ready(()),
            // Canceled means the pipe is gone without the read end closing
            // while the write end was open. That never resolves.
            Poll::Ready(Err(_)) | Poll::Pending => Poll::Pending,
        }
    }
}

// ////////////////////////////////////////////////////////////////////////////////////////////

impl fmt::Debug for Pipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.data.lock();
        f.debug_struct("Pipe")
            .field("read_end", &state.read_end)
            .field("write_end", &state.write_end)
            .field("writes", &state.writes.len())
            .field("reads", &state.reads.len())
            .finish()
    }
}

impl fmt::Debug for Reader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reader").finish()
    }
}

impl fmt::Debug for Writer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Writer").finish()
    }
}

impl fmt::Debug for Read {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner {
            ReadInner::Ready(_) => write!(f, "Read<Ready>"),
            ReadInner::Pending(_) => write!(f, "Read<Pending>"),
        }
    }
}

impl fmt::Debug for ReaderClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderClosed").finish()
    }
}
