use std::io::{Cursor, Read};
use std::time::{Duration, Instant};

use rstest::rstest;
use thermo_hardware::StreamTransport;
use thermo_traits::{Line, LineTransport};

/// Poll until the reader thread delivers a line or the deadline passes.
fn next_line<W: std::io::Write>(t: &mut StreamTransport<W>, max_len: usize) -> Option<Line> {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if let Some(line) = t.read_line(max_len).unwrap() {
            return Some(line);
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    None
}

#[test]
fn delivers_lines_in_order() {
    let input = Cursor::new(b"*IDN?\nCTRL:TEMP?\r\n".to_vec());
    let mut t = StreamTransport::spawn(input, Vec::new(), 256);
    assert_eq!(next_line(&mut t, 256).unwrap().text, "*IDN?");
    assert_eq!(next_line(&mut t, 256).unwrap().text, "CTRL:TEMP?");
}

#[test]
fn empty_input_yields_nothing_and_closes() {
    let mut t = StreamTransport::spawn(Cursor::new(Vec::new()), Vec::new(), 256);
    assert!(next_line(&mut t, 256).is_none());
    assert!(t.is_closed());
}

#[rstest]
#[case(10, false)]
#[case(4, true)]
fn flags_overlong_lines(#[case] max_len: usize, #[case] overflowed: bool) {
    let mut t = StreamTransport::spawn(Cursor::new(b"CTRL:ON\n".to_vec()), Vec::new(), 256);
    let line = next_line(&mut t, max_len).unwrap();
    assert_eq!(line.overflowed, overflowed);
    assert!(line.text.len() <= max_len);
}

#[test]
fn write_line_appends_newline() {
    let mut t = StreamTransport::spawn(Cursor::new(Vec::new()), Vec::new(), 256);
    t.write_line("OIC,Embedded SCPI Example,1,10").unwrap();
    t.write_line("0.0").unwrap();
    assert_eq!(
        String::from_utf8_lossy(t.writer()),
        "OIC,Embedded SCPI Example,1,10\n0.0\n"
    );
}

#[test]
fn huge_line_is_truncated_and_following_line_survives() {
    let mut input = vec![b'A'; 4 * 1024 * 1024];
    input.extend_from_slice(b"\n*IDN?\n");
    let mut t = StreamTransport::spawn(Cursor::new(input), Vec::new(), 256);

    let first = next_line(&mut t, 256).unwrap();
    assert!(first.overflowed);
    assert_eq!(first.text.len(), 256);

    let second = next_line(&mut t, 256).unwrap();
    assert_eq!(second.text, "*IDN?");
    assert!(!second.overflowed);
}

#[test]
fn unterminated_input_arrives_as_one_truncated_line() {
    let input = std::io::repeat(b'A').take(8 * 1024 * 1024);
    let mut t = StreamTransport::spawn(input, Vec::new(), 64);
    let line = next_line(&mut t, 64).unwrap();
    assert!(line.overflowed);
    assert_eq!(line.text.len(), 64);
    assert!(next_line(&mut t, 64).is_none());
    assert!(t.is_closed());
}

#[rstest]
#[case(b"12345\r\n".as_slice(), "12345", false)]
#[case(b"123456\n".as_slice(), "12345", true)]
#[case(b"1234567\n".as_slice(), "12345", true)]
#[case(b"1234".as_slice(), "1234", false)]
fn line_limit_boundaries(#[case] input: &[u8], #[case] text: &str, #[case] overflowed: bool) {
    let mut t = StreamTransport::spawn(Cursor::new(input.to_vec()), Vec::new(), 5);
    let line = next_line(&mut t, 5).unwrap();
    assert_eq!(line.text, text);
    assert_eq!(line.overflowed, overflowed);
}
