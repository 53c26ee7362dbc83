// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for `ResettableStream`, in particular the interaction of
//! in-flight reads and writes with concurrent resets.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use resettable::testing::BufferStream;
use resettable::{Error, ResettableStream, Stream};

#[test]
fn write_then_read_round_trip() {
    let stream = ResettableStream::new(Arc::new(BufferStream::new()));

    let data = b"hello";
    assert_eq!(stream.write(data).unwrap(), data.len());

    let mut buf = [0_u8; 5];
    assert_eq!(stream.read(&mut buf).unwrap(), data.len());
    assert_eq!(&buf, data);
}

#[test]
fn rejected_resets_leave_everything_unchanged() {
    let installed = Arc::new(BufferStream::new());
    let stream = Arc::new(ResettableStream::new(
        Arc::clone(&installed) as Arc<dyn Stream>
    ));

    let err = stream
        .reset(Arc::clone(&installed) as Arc<dyn Stream>, true)
        .unwrap_err();
    assert!(matches!(err, Error::AlreadyInstalled));

    let err = stream
        .reset(Arc::clone(&stream) as Arc<dyn Stream>, true)
        .unwrap_err();
    assert!(matches!(err, Error::ResetToSelf));

    assert_eq!(stream.reset_count(), 0);
    assert!(!installed.is_closed());
    assert!(Arc::ptr_eq(
        &(Arc::clone(&installed) as Arc<dyn Stream>),
        &stream.current()
    ));
}

#[test]
fn reset_closes_old_stream_and_redirects_traffic() {
    let first = Arc::new(BufferStream::new());
    let stream = ResettableStream::new(Arc::clone(&first) as Arc<dyn Stream>);

    assert_eq!(stream.write(b"hello").unwrap(), 5);
    let mut buf = [0_u8; 5];
    assert_eq!(stream.read(&mut buf).unwrap(), 5);
    assert_eq!(&buf, b"hello");

    let second = Arc::new(BufferStream::new());
    stream
        .reset(Arc::clone(&second) as Arc<dyn Stream>, true)
        .unwrap();
    assert_eq!(stream.reset_count(), 1);

    // The replaced stream was closed for us.
    assert!(matches!(first.write(b"test"), Err(Error::Closed)));

    // Traffic through the wrapper lands on the replacement.
    assert_eq!(stream.write(b"test").unwrap(), 4);
    assert_eq!(second.contents(), b"test");
}

#[test]
fn reset_without_close_old_preserves_old_stream() {
    let first = Arc::new(BufferStream::new());
    let stream = ResettableStream::new(Arc::clone(&first) as Arc<dyn Stream>);

    stream.reset(Arc::new(BufferStream::new()), false).unwrap();

    assert!(!first.is_closed());
    assert_eq!(first.write(b"direct").unwrap(), 6);
}

#[test]
fn concurrent_reads_and_writes_do_not_deadlock() {
    let stream = Arc::new(ResettableStream::new(Arc::new(BufferStream::new())));

    let mut handles = Vec::new();
    for i in 0..10_u8 {
        let writer = Arc::clone(&stream);
        handles.push(thread::spawn(move || {
            let _ = writer.write(&[i]);
        }));

        let reader = Arc::clone(&stream);
        handles.push(thread::spawn(move || {
            let mut buf = [0_u8; 1];
            let _ = reader.read(&mut buf);
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

/// A write and a read are both in flight against a deliberately slow stream when a
/// reset lands. Both must report the reset, both must carry the byte count the old
/// stream really transferred, and the bytes must be the real buffer contents.
#[test]
fn delayed_read_and_write_observe_reset() {
    let slow = Arc::new(
        BufferStream::builder()
            .delay(Duration::from_millis(300))
            .build(),
    );
    let stream = Arc::new(ResettableStream::new(Arc::clone(&slow) as Arc<dyn Stream>));

    let writer = {
        let stream = Arc::clone(&stream);
        thread::spawn(move || stream.write(b"test"))
    };

    let reader = {
        let stream = Arc::clone(&stream);
        thread::spawn(move || {
            // Start after the writer but before the reset, so the generation
            // snapshot happens against the pre-reset stream.
            thread::sleep(Duration::from_millis(100));
            let mut buf = [0_u8; 4];
            let result = stream.read(&mut buf);
            (result, buf)
        })
    };

    // Let both operations pass their pre-checks and sit in the stream's delay,
    // then swap. close_old stays false so the old stream keeps functioning and
    // the delayed transfers still go through against it.
    thread::sleep(Duration::from_millis(200));
    stream.reset(Arc::new(BufferStream::new()), false).unwrap();

    let write_result = writer.join().unwrap();
    match write_result {
        Err(Error::Reset { transferred }) => assert_eq!(transferred, 4),
        other => panic!("expected reset during write, got {other:?}"),
    }

    let (read_result, buf) = reader.join().unwrap();
    match read_result {
        Err(Error::Reset { transferred }) => assert_eq!(transferred, 4),
        other => panic!("expected reset during read, got {other:?}"),
    }
    assert_eq!(&buf, b"test");

    // The old stream was fully drained by the raced read.
    assert!(slow.is_empty());
}

#[test]
fn operations_after_reset_complete_normally() {
    let slow = Arc::new(
        BufferStream::builder()
            .delay(Duration::from_millis(150))
            .build(),
    );
    let stream = Arc::new(ResettableStream::new(Arc::clone(&slow) as Arc<dyn Stream>));

    let writer = {
        let stream = Arc::clone(&stream);
        thread::spawn(move || stream.write(b"racing"))
    };

    thread::sleep(Duration::from_millis(50));
    let replacement = Arc::new(BufferStream::new());
    stream
        .reset(Arc::clone(&replacement) as Arc<dyn Stream>, false)
        .unwrap();

    // The raced write reports the reset...
    assert!(matches!(
        writer.join().unwrap(),
        Err(Error::Reset { transferred: 6 })
    ));

    // ...while an operation issued after the reset is entirely unaffected.
    assert_eq!(stream.write(b"settled").unwrap(), 7);
    assert_eq!(replacement.contents(), b"settled");
}

#[test]
fn close_through_wrapper_surfaces_closed_outcome() {
    let buffer = Arc::new(BufferStream::new());
    let stream = ResettableStream::new(Arc::clone(&buffer) as Arc<dyn Stream>);

    stream.close().unwrap();

    // The underlying stream's closed outcome passes through unchanged; close does
    // not participate in reset detection.
    assert!(matches!(stream.write(b"x"), Err(Error::Closed)));
    assert_eq!(stream.reset_count(), 0);

    // The wrapper survives its stream being closed and can be reset afterwards.
    stream.reset(Arc::new(BufferStream::new()), false).unwrap();
    assert_eq!(stream.write(b"x").unwrap(), 1);
}

#[test]
fn short_operations_pass_through() {
    let stream = ResettableStream::new(Arc::new(
        BufferStream::builder().max_io_size(3).build(),
    ));

    // Short writes and reads are outcomes of the underlying stream, passed
    // through untouched - not something the wrapper smooths over.
    assert_eq!(stream.write(b"hello").unwrap(), 3);

    let mut buf = [0_u8; 5];
    assert_eq!(stream.read(&mut buf).unwrap(), 3);
    assert_eq!(&buf[..3], b"hel");
}
