//! # native_editor_host
//!
//! The core of a **native messaging host** that lets a browser extension hand page text to
//! a local text editor and get the edited text back.
//!
//! Two pieces sit right on the process boundary and have to cope with whatever arrives:
//!
//! - [`codec`] turns the browser's stdin byte stream, split however the OS pleases, into
//!   JSON messages, and turns replies back into frames.
//! - [`args`] parses the editor arguments a user typed into settings into an argument
//!   vector, and writes such a vector back out as a string.
//!
//! Around them: [`host`] (async stdio loop, `tokio` feature), [`editor`] (building the
//! editor invocation), [`config`] (TOML settings) and [`logging`] (stderr-only tracing).
//!
//! ---
//!
//! ## Wire protocol
//!
//! 1. The sender writes a **4-byte length prefix** (`u32`) in **native endianness**.
//! 2. Then writes **that many bytes** of UTF-8 JSON.
//!
//! ```rust
//! use native_editor_host::codec::{Decoder, Encoder, ByteOrder};
//! use serde_json::json;
//!
//! let frame = Encoder::new(ByteOrder::Little).encode(&json!({"a": 1})).unwrap();
//! assert_eq!(&frame[..4], &[7, 0, 0, 0]);
//! assert_eq!(&frame[4..], br#"{"a":1}"#);
//!
//! let mut decoder = Decoder::with_byte_order(ByteOrder::Little);
//! let mut wire = frame.clone();
//! wire.extend_from_slice(&frame);
//! let out: Vec<_> = decoder.decode(&wire).into_iter().map(Result::unwrap).collect();
//! assert_eq!(out, vec![json!({"a": 1}), json!({"a": 1})]);
//! ```
//!
//! ### Gotchas
//!
//! - **Disconnect is normal:** the browser closes stdin when the extension disconnects.
//!   [`host::run`] and [`host::event_loop`] return `Ok` on EOF.
//! - **Message limits:** host → browser is capped at **1 MiB**
//!   ([`config::MAX_TO_BROWSER`]), browser → host at **64 MiB**
//!   ([`config::MAX_FROM_BROWSER`]). The codec itself enforces neither; [`host`] does.
//! - **Never log to stdout.** Use [`logging::init`], which writes to stderr.
//!
//! ---
//!
//! ## Quick start
//!
//! See the [`host`] module (behind the default `tokio` feature) for a complete host
//! `main`. The `nm_echo_host` binary in this crate is a runnable version of it.
//!
//! ---
//!
//! ## Editor arguments
//!
//! ```rust
//! use native_editor_host::args::{stringify, tokenize};
//!
//! let args = tokenize(r#"--wait "--title=Page text" -n"#);
//! assert_eq!(args, ["--wait", "--title=Page text", "-n"]);
//! assert_eq!(tokenize(&stringify(&args)), args);
//! ```

pub mod args;
pub mod codec;
pub mod config;
pub mod editor;
pub mod error;
#[cfg(feature = "tokio")]
pub mod host;
pub mod logging;

#[doc(inline)]
pub use args::{stringify, tokenize};
#[doc(inline)]
pub use codec::{encode_message, ByteOrder, Decoder, Encoder};
#[doc(inline)]
pub use config::HostConfig;
#[doc(inline)]
pub use editor::EditorCommand;
#[doc(inline)]
pub use error::{ConfigError, FrameError, NmError};

#[cfg(feature = "tokio")]
#[doc(inline)]
pub use host::{event_loop, run, send_message, Sender};
