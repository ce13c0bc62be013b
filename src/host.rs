//! The stdio side of a native messaging host.
//!
//! A reader thread pulls raw chunks from stdin (or any [`Read`]) into one [`Decoder`];
//! a writer task drains encoded frames to stdout (or any [`Write`]). Your handler runs
//! on the calling task, one inbound message at a time, in stream order.
//!
//! The reader lives on its own detached thread rather than in tokio's blocking pool: a
//! read on idle stdin cannot be interrupted, and the runtime would otherwise wait for it
//! on shutdown. When the loop stops early the thread is simply abandoned and ends with
//! the process.
//!
//! Never write to stdout yourself while the loop runs. Log to stderr
//! (see [`crate::logging`]).
//!
//! ## Quick start
//!
//! ```no_run
//! use native_editor_host::host::{event_loop, NmError};
//! use native_editor_host::{config::HostConfig, logging};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), NmError> {
//!     let config = HostConfig::from_env()?;
//!     logging::init(&config.log)?;
//!
//!     event_loop(|incoming, send| async move {
//!         match incoming {
//!             Ok(msg) => send.send(&json!({"echo": msg})).await,
//!             // Bad frames are reported back, not fatal.
//!             Err(e) => send.send(&json!({"ok": false, "error": e.to_string()})).await,
//!         }
//!     })
//!     .await
//! }
//! ```

use std::future::Future;
use std::io::{self, ErrorKind, Read, Write};
use std::thread;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::codec::{Decoder, Encoder, LENGTH_PREFIX_SIZE};
use crate::config::{HostConfig, MAX_TO_BROWSER};
pub use crate::error::NmError;
use crate::error::{FrameError, Result};

pub use crate::codec::encode_message;
pub use crate::config::MAX_FROM_BROWSER;

/// One decoded inbound frame. Malformed frames arrive as `Err` so the dispatcher can
/// answer them; they do not stop the loop.
pub type Inbound = std::result::Result<Value, FrameError>;

/// Cloneable handle for replying to the browser.
#[derive(Debug, Clone)]
pub struct Sender {
    tx: mpsc::UnboundedSender<Vec<u8>>,
    encoder: Encoder,
    max_to_browser: usize,
}

impl Sender {
    /// Encode `msg` and queue it for the writer.
    ///
    /// Fails with [`FrameError::PayloadTooLarge`] when the payload exceeds the
    /// host -> browser limit, and with [`NmError::Disconnected`] once the writer is gone.
    pub async fn send<T: Serialize + ?Sized>(&self, msg: &T) -> Result<()> {
        let frame = encode_checked(&self.encoder, msg, self.max_to_browser)?;
        self.tx.send(frame).map_err(|_| NmError::Disconnected)
    }
}

fn encode_checked<T: Serialize + ?Sized>(
    encoder: &Encoder,
    msg: &T,
    max: usize,
) -> std::result::Result<Vec<u8>, FrameError> {
    let frame = encoder.encode(msg)?;
    let size = frame.len() - LENGTH_PREFIX_SIZE;
    if size > max {
        return Err(FrameError::PayloadTooLarge { size, max });
    }
    Ok(frame)
}

/// Start the reader on a detached thread; the receiver yields how it ended.
fn spawn_reader<R>(
    reader: R,
    config: &HostConfig,
    tx: mpsc::UnboundedSender<Inbound>,
) -> Result<oneshot::Receiver<Result<()>>>
where
    R: Read + Send + 'static,
{
    let (done_tx, done_rx) = oneshot::channel();
    let config = config.clone();
    thread::Builder::new()
        .name("nm-reader".to_string())
        .spawn(move || {
            // Nobody waits for the outcome once the loop has given up.
            let _ = done_tx.send(read_frames(reader, &config, &tx));
        })?;
    Ok(done_rx)
}

fn read_frames<R: Read>(
    mut reader: R,
    config: &HostConfig,
    tx: &mpsc::UnboundedSender<Inbound>,
) -> Result<()> {
    let max = config.max_from_browser;
    let mut decoder = Decoder::with_byte_order(config.byte_order);
    let mut chunk = vec![0u8; config.read_chunk_size];
    loop {
        let read = match reader.read(&mut chunk) {
            Ok(0) => {
                if decoder.buffered_len() > 0 || decoder.pending_len().is_some() {
                    debug!(
                        buffered = decoder.buffered_len(),
                        "input closed mid-frame"
                    );
                }
                return Ok(());
            }
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(NmError::Io(err)),
        };

        decoder.push(&chunk[..read]);
        loop {
            if let Some(size) = decoder.pending_len() {
                if size > max {
                    warn!(size, max, "incoming message too large");
                    return Err(FrameError::PayloadTooLarge { size, max }.into());
                }
            }
            let Some(message) = decoder.next_message() else {
                break;
            };
            if tx.send(message).is_err() {
                // The loop has stopped listening.
                return Ok(());
            }
        }
    }
}

fn spawn_writer<W>(
    mut writer: W,
    mut rx: mpsc::UnboundedReceiver<Vec<u8>>,
) -> JoinHandle<Result<W>>
where
    W: Write + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        while let Some(frame) = rx.blocking_recv() {
            write_frame(&mut writer, &frame)?;
        }
        Ok(writer)
    })
}

fn write_frame<W: Write>(writer: &mut W, frame: &[u8]) -> Result<()> {
    writer
        .write_all(frame)
        .and_then(|()| writer.flush())
        .map_err(|err| match err.kind() {
            ErrorKind::BrokenPipe => NmError::Disconnected,
            _ => NmError::Io(err),
        })
}

async fn join<T>(handle: JoinHandle<Result<T>>) -> Result<T> {
    handle
        .await
        .map_err(|e| NmError::TaskFailed(e.to_string()))?
}

/// Run a host over an arbitrary reader/writer pair until the input closes.
///
/// The handler is called once per inbound frame, sequentially. Returning `Err` from it
/// stops the loop with that error right away; a reader still blocked on input is left
/// behind and does not hold up runtime shutdown. When the input reaches EOF the loop
/// waits for all queued replies to be written and hands the writer back.
///
/// ```rust
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), native_editor_host::host::NmError> {
/// use native_editor_host::codec::{encode_message, Decoder};
/// use native_editor_host::config::HostConfig;
/// use native_editor_host::host::run;
/// use serde_json::json;
/// use std::io::Cursor;
///
/// let input = Cursor::new(encode_message(&json!({"ping": 1})).unwrap());
/// let out = run(input, Vec::new(), &HostConfig::default(), |msg, send| async move {
///     let msg = msg?;
///     send.send(&json!({"pong": msg["ping"]})).await
/// })
/// .await?;
///
/// let replies: Vec<_> = Decoder::new().decode(&out).into_iter().map(Result::unwrap).collect();
/// assert_eq!(replies, vec![json!({"pong": 1})]);
/// # Ok(())
/// # }
/// ```
pub async fn run<R, W, F, Fut>(
    reader: R,
    writer: W,
    config: &HostConfig,
    mut handler: F,
) -> Result<W>
where
    R: Read + Send + 'static,
    W: Write + Send + 'static,
    F: FnMut(Inbound, Sender) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let (in_tx, mut in_rx) = mpsc::unbounded_channel();
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    let sender = Sender {
        tx: out_tx,
        encoder: Encoder::new(config.byte_order),
        max_to_browser: config.max_to_browser,
    };

    let reader_done = spawn_reader(reader, config, in_tx)?;
    let writer_task = spawn_writer(writer, out_rx);
    info!(byte_order = ?config.byte_order, "host loop started");

    let mut outcome = Ok(());
    while let Some(message) = in_rx.recv().await {
        if let Err(err) = handler(message, sender.clone()).await {
            outcome = Err(err);
            break;
        }
    }

    drop(in_rx);
    drop(sender);
    let writer = join(writer_task).await;
    outcome?;
    reader_done
        .await
        .map_err(|_| NmError::TaskFailed("reader thread ended without a result".to_string()))??;
    info!("input closed, host loop finished");
    writer
}

/// Run a host over stdin/stdout with default settings.
///
/// Browser disconnect (stdin EOF) ends the loop with `Ok(())`.
pub async fn event_loop<F, Fut>(handler: F) -> Result<()>
where
    F: FnMut(Inbound, Sender) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    event_loop_with_config(&HostConfig::default(), handler).await
}

/// Like [`event_loop`], with explicit limits and byte order.
pub async fn event_loop_with_config<F, Fut>(config: &HostConfig, handler: F) -> Result<()>
where
    F: FnMut(Inbound, Sender) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    run(io::stdin(), io::stdout(), config, handler)
        .await
        .map(|_| ())
}

/// Write one message to stdout, outside of any loop.
pub async fn send_message<T: Serialize + ?Sized>(msg: &T) -> Result<()> {
    let frame = encode_checked(&Encoder::default(), msg, MAX_TO_BROWSER)?;
    tokio::task::spawn_blocking(move || write_frame(&mut io::stdout().lock(), &frame))
        .await
        .map_err(|e| NmError::TaskFailed(e.to_string()))?
}
