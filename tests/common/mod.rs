#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use rox::lox::{Lox, RunStatus};

/// In-memory sink whose contents stay readable after being handed to a
/// session.
#[derive(Clone, Default)]
pub struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A session wired to in-memory output and diagnostic sinks.
pub struct Session {
    pub lox: Lox,
    pub out: SharedBuf,
    pub err: SharedBuf,
}

impl Session {
    pub fn new() -> Self {
        let out = SharedBuf::default();
        let err = SharedBuf::default();
        let lox = Lox::with_output(out.clone(), err.clone());

        Session { lox, out, err }
    }

    pub fn run(&mut self, source: &str) -> RunStatus {
        self.lox.run(source)
    }
}

/// Run `source` in a fresh session; returns (stdout, stderr, status).
pub fn run(source: &str) -> (String, String, RunStatus) {
    let mut session = Session::new();
    let status = session.run(source);

    (session.out.contents(), session.err.contents(), status)
}

/// Run `source` expecting success; returns what it printed.
pub fn output_of(source: &str) -> String {
    let (out, err, status) = run(source);

    assert_eq!(err, "", "unexpected diagnostics for:\n{}", source);
    assert_eq!(status, RunStatus::default());

    out
}
