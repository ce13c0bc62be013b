mod common;

use common::{raw_frame, wire};
use native_editor_host::codec::{ByteOrder, Decoder};
use native_editor_host::config::HostConfig;
use native_editor_host::host::{run, NmError};
use native_editor_host::FrameError;
use serde_json::{json, Value};
use std::io::{self, Cursor, Read};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

fn replies(order: ByteOrder, out: &[u8]) -> Vec<Value> {
    Decoder::with_byte_order(order)
        .decode(out)
        .into_iter()
        .map(|r| r.expect("host wrote a malformed frame"))
        .collect()
}

/// Hands out one byte per read call.
struct ByteByByteReader {
    data: Vec<u8>,
    pos: usize,
}

impl Read for ByteByByteReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos >= self.data.len() || buf.is_empty() {
            return Ok(0);
        }
        buf[0] = self.data[self.pos];
        self.pos += 1;
        Ok(1)
    }
}

/// Returns `data` once, then blocks like idle stdin until `release` is dropped.
struct IdleAfterDataReader {
    data: Option<Vec<u8>>,
    release: mpsc::Receiver<()>,
}

impl Read for IdleAfterDataReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(data) = self.data.take() {
            buf[..data.len()].copy_from_slice(&data);
            return Ok(data.len());
        }
        let _ = self.release.recv();
        Ok(0)
    }
}

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "no stdin"))
    }
}

#[tokio::test]
async fn echoes_every_message_in_order() {
    let input = wire(
        ByteOrder::Native,
        &[json!({"n": 1}), json!({"n": 2}), json!({"n": 3})],
    );

    let out = run(
        Cursor::new(input),
        Vec::new(),
        &HostConfig::default(),
        |msg, send| async move {
            let msg = msg?;
            send.send(&json!({"echo": msg["n"]})).await
        },
    )
    .await
    .unwrap();

    assert_eq!(
        replies(ByteOrder::Native, &out),
        vec![json!({"echo": 1}), json!({"echo": 2}), json!({"echo": 3})]
    );
}

#[tokio::test]
async fn empty_input_is_a_clean_disconnect() {
    let out = run(
        Cursor::new(Vec::new()),
        Vec::new(),
        &HostConfig::default(),
        |_msg, _send| async { Ok(()) },
    )
    .await
    .unwrap();
    assert!(out.is_empty());
}

#[tokio::test]
async fn malformed_frames_reach_the_handler() {
    let mut input = raw_frame(ByteOrder::Native, b"{oops");
    input.extend(wire(ByteOrder::Native, &[json!("fine")]));

    let mut seen = Vec::new();
    let out = run(
        Cursor::new(input),
        Vec::new(),
        &HostConfig::default(),
        |msg, send| {
            seen.push(msg.is_ok());
            async move {
                match msg {
                    Ok(v) => send.send(&json!({"ok": true, "got": v})).await,
                    Err(e) => {
                        assert!(matches!(e, FrameError::InvalidJson(_)));
                        send.send(&json!({"ok": false})).await
                    }
                }
            }
        },
    )
    .await
    .unwrap();

    assert_eq!(seen, vec![false, true]);
    assert_eq!(
        replies(ByteOrder::Native, &out),
        vec![json!({"ok": false}), json!({"ok": true, "got": "fine"})]
    );
}

#[tokio::test]
async fn fragmented_reads_still_yield_whole_messages() {
    let messages = vec![json!({"text": "hello world"}), json!([1, 2, 3])];
    let reader = ByteByByteReader {
        data: wire(ByteOrder::Native, &messages),
        pos: 0,
    };
    let config = HostConfig {
        read_chunk_size: 3,
        ..HostConfig::default()
    };

    let mut seen = Vec::new();
    run(reader, Vec::new(), &config, |msg, _send| {
        seen.push(msg.unwrap());
        async { Ok(()) }
    })
    .await
    .unwrap();

    assert_eq!(seen, messages);
}

#[tokio::test]
async fn configured_byte_order_applies_both_ways() {
    let config = HostConfig {
        byte_order: ByteOrder::Big,
        ..HostConfig::default()
    };
    let input = wire(ByteOrder::Big, &[json!("ping")]);

    let out = run(Cursor::new(input), Vec::new(), &config, |msg, send| async move {
        assert_eq!(msg?, json!("ping"));
        send.send("pong").await
    })
    .await
    .unwrap();

    assert_eq!(&out[..4], &[0, 0, 0, 6]);
    assert_eq!(replies(ByteOrder::Big, &out), vec![json!("pong")]);
}

#[tokio::test]
async fn oversized_reply_is_refused_before_writing() {
    let config = HostConfig {
        max_to_browser: 16,
        ..HostConfig::default()
    };
    let input = wire(ByteOrder::Native, &[json!(1)]);

    let out = run(Cursor::new(input), Vec::new(), &config, |_msg, send| {
        let big = json!({"blob": "x".repeat(64)});
        let small = json!("ok");
        async move {
            match send.send(&big).await {
                Err(NmError::Frame(FrameError::PayloadTooLarge { size, max })) => {
                    assert_eq!(max, 16);
                    assert!(size > 16);
                }
                other => panic!("expected PayloadTooLarge, got {other:?}"),
            }
            send.send(&small).await
        }
    })
    .await
    .unwrap();

    assert_eq!(replies(ByteOrder::Native, &out), vec![json!("ok")]);
}

#[tokio::test]
async fn oversized_incoming_frame_stops_the_loop() {
    let config = HostConfig {
        max_from_browser: 8,
        ..HostConfig::default()
    };
    let input = wire(ByteOrder::Native, &[json!({"too": "long for the cap"})]);

    let mut delivered = 0;
    let err = run(Cursor::new(input), Vec::new(), &config, |_msg, _send| {
        delivered += 1;
        async { Ok(()) }
    })
    .await
    .expect_err("cap exceeded");

    assert_eq!(delivered, 0);
    assert!(matches!(
        err,
        NmError::Frame(FrameError::PayloadTooLarge { max: 8, .. })
    ));
}

#[tokio::test]
async fn handler_error_stops_the_loop() {
    let input = wire(ByteOrder::Native, &[json!(1), json!(2), json!(3)]);

    let mut calls = 0;
    let err = run(
        Cursor::new(input),
        Vec::new(),
        &HostConfig::default(),
        |_msg, _send| {
            calls += 1;
            async { Err(NmError::Disconnected) }
        },
    )
    .await
    .expect_err("handler failed");

    assert!(matches!(err, NmError::Disconnected));
    assert_eq!(calls, 1);
}

#[tokio::test]
async fn reader_errors_surface_as_io() {
    let err = run(
        FailingReader,
        Vec::new(),
        &HostConfig::default(),
        |_msg, _send| async { Ok(()) },
    )
    .await
    .expect_err("read failed");

    assert!(matches!(err, NmError::Io(e) if e.kind() == io::ErrorKind::PermissionDenied));
}

#[test]
fn handler_error_does_not_wait_on_idle_reader() {
    let (release_tx, release_rx) = mpsc::channel();
    let reader = IdleAfterDataReader {
        data: Some(wire(ByteOrder::Native, &[json!("only")])),
        release: release_rx,
    };

    let rt = tokio::runtime::Runtime::new().unwrap();
    let result = rt.block_on(run(
        reader,
        Vec::new(),
        &HostConfig::default(),
        |_msg, _send| async { Err(NmError::Disconnected) },
    ));
    assert!(matches!(result, Err(NmError::Disconnected)));

    let (dropped_tx, dropped_rx) = mpsc::channel();
    thread::spawn(move || {
        drop(rt);
        let _ = dropped_tx.send(());
    });
    let dropped = dropped_rx.recv_timeout(Duration::from_secs(3));
    drop(release_tx);
    assert!(dropped.is_ok(), "runtime shutdown waited on the blocked reader");
}
