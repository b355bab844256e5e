#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use rox::runner::{Lox, RunError};

/// A `Write` sink the test keeps a handle to after giving it away.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).expect("program output is UTF-8")
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A fresh session plus a handle on everything it prints.
pub fn session() -> (Lox, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let lox = Lox::with_output(Box::new(buffer.clone()));
    (lox, buffer)
}

/// Run `source` in a fresh session; returns printed output and the outcome.
pub fn run(source: &str) -> (String, Result<(), RunError>) {
    let (mut lox, buffer) = session();
    let result = lox.run(source);
    (buffer.contents(), result)
}

/// Run a program that must succeed and return its output.
pub fn run_ok(source: &str) -> String {
    let (output, result) = run(source);
    if let Err(e) = result {
        panic!("program failed:\n{}\noutput so far:\n{}", e, output);
    }
    output
}

/// Messages of the static errors a program produces.
pub fn static_errors(source: &str) -> Vec<String> {
    match run(source).1 {
        Err(RunError::Static(errors)) => errors.iter().map(ToString::to_string).collect(),
        Err(RunError::Runtime(e)) => panic!("expected static errors, got runtime error: {}", e),
        Ok(()) => panic!("expected static errors, program ran"),
    }
}

/// The runtime error a program stops with, plus what it printed before.
pub fn runtime_error(source: &str) -> (String, String) {
    match run(source) {
        (output, Err(RunError::Runtime(e))) => (output, e.to_string()),
        (_, Err(RunError::Static(errors))) => {
            panic!("expected a runtime error, got static errors: {:?}", errors)
        }
        (_, Ok(())) => panic!("expected a runtime error, program ran"),
    }
}
