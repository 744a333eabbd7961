use shardfs::wire::{read_frame, write_frame, Frame};
use shardfs::StoreError;

/// Framing tests: header lines plus an exact-length binary payload.

#[test]
fn frame_round_trip() {
    let frame = Frame::new(
        "store",
        "~/S2/a/report.pdf",
        b"%PDF-1.4\n\x00\x01 binary \xff".to_vec(),
    );
    let mut buf = Vec::new();
    write_frame(&mut buf, &frame).unwrap();

    let decoded = read_frame(&mut &buf[..]).unwrap().unwrap();
    assert_eq!(decoded, frame);
}

#[test]
fn empty_payload_frame() {
    let frame = Frame::bare("list", "~/S3");
    let mut buf = Vec::new();
    write_frame(&mut buf, &frame).unwrap();

    let decoded = read_frame(&mut &buf[..]).unwrap().unwrap();
    assert_eq!(decoded.command, "list");
    assert_eq!(decoded.arg, "~/S3");
    assert!(decoded.payload.is_empty());
}

#[test]
fn empty_argument_line_round_trips() {
    let frame = Frame::bare("dispfnames", "");
    let mut buf = Vec::new();
    write_frame(&mut buf, &frame).unwrap();

    let decoded = read_frame(&mut &buf[..]).unwrap().unwrap();
    assert_eq!(decoded.arg, "");
}

#[test]
fn clean_eof_is_end_of_stream() {
    assert!(read_frame(&mut &b""[..]).unwrap().is_none());
}

#[test]
fn eof_inside_header_is_truncated() {
    // Length line never arrives
    let buf: &[u8] = b"fetch\n~/S2/x.pdf\n";
    match read_frame(&mut &buf[..]) {
        Err(StoreError::Truncated) => {}
        other => panic!("expected truncated frame, got {:?}", other),
    }
}

#[test]
fn eof_inside_payload_is_truncated() {
    let frame = Frame::new("store", "~/S3/note.txt", b"hello world".to_vec());
    let mut buf = Vec::new();
    write_frame(&mut buf, &frame).unwrap();
    buf.truncate(buf.len() - 3);

    match read_frame(&mut &buf[..]) {
        Err(StoreError::Truncated) => {}
        other => panic!("expected truncated frame, got {:?}", other),
    }
}

#[test]
fn reader_stops_exactly_at_declared_length() {
    // Two frames back to back; consuming the first must leave the second intact
    let first = Frame::new("store", "~/S3/a.txt", b"payload\nwith\nnewlines".to_vec());
    let second = Frame::bare("delete", "~/S3/a.txt");
    let mut buf = Vec::new();
    write_frame(&mut buf, &first).unwrap();
    write_frame(&mut buf, &second).unwrap();

    let mut cursor: &[u8] = &buf;
    assert_eq!(read_frame(&mut cursor).unwrap().unwrap(), first);
    assert_eq!(read_frame(&mut cursor).unwrap().unwrap(), second);
    assert!(read_frame(&mut cursor).unwrap().is_none());
}

#[test]
fn bad_length_line_is_rejected() {
    let buf: &[u8] = b"store\n~/S3/a.txt\nnot-a-number\n";
    match read_frame(&mut &buf[..]) {
        Err(StoreError::MalformedCommand(_)) => {}
        other => panic!("expected malformed command, got {:?}", other),
    }
}
