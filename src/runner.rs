//! The scan → parse → resolve → interpret pipeline behind the CLI.
//!
//! A [`Lox`] session keeps one interpreter alive across calls to
//! [`Lox::run`], so globals, functions and classes defined by one REPL line
//! are visible to the next.

use std::io::Write;

use log::{debug, info};
use thiserror::Error;

use crate::error::LoxError;
use crate::expr::ExprId;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::Scanner;
use crate::stmt::Stmt;
use crate::token::Token;

/// Process exit status for a malformed command line.
pub const EXIT_USAGE: i32 = 64;

/// Process exit status for lexical, syntax and resolution errors.
pub const EXIT_STATIC_ERROR: i32 = 65;

/// Process exit status for runtime errors.
pub const EXIT_RUNTIME_ERROR: i32 = 70;

/// Why a run stopped early.
#[derive(Debug, Error)]
pub enum RunError {
    /// Everything found before execution; nothing was executed.
    #[error("{}", render_all(.0))]
    Static(Vec<LoxError>),

    /// The single runtime error that halted execution.
    #[error("{0}")]
    Runtime(LoxError),
}

fn render_all(errors: &[LoxError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl RunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Static(_) => EXIT_STATIC_ERROR,
            RunError::Runtime(_) => EXIT_RUNTIME_ERROR,
        }
    }
}

/// An interpreter session plus the process‑wide error flags.
pub struct Lox {
    interpreter: Interpreter,
    next_id: ExprId,
    had_error: bool,
    had_runtime_error: bool,
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}

impl Lox {
    pub fn new() -> Self {
        Self::with_interpreter(Interpreter::new())
    }

    /// A session whose `print` output goes to `output`.
    pub fn with_output(output: Box<dyn Write>) -> Self {
        Self::with_interpreter(Interpreter::with_output(output))
    }

    fn with_interpreter(interpreter: Interpreter) -> Self {
        Self {
            interpreter,
            next_id: 0,
            had_error: false,
            had_runtime_error: false,
        }
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    /// Forget earlier static errors (between REPL lines).  The runtime flag
    /// is kept.
    pub fn reset_error(&mut self) {
        self.had_error = false;
    }

    /// Run one program (or REPL line).
    pub fn run(&mut self, source: &str) -> Result<(), RunError> {
        info!("Running {} bytes of source", source.len());

        let statements: Vec<Stmt> = self.front_end(source).map_err(|errors| {
            self.had_error = true;
            RunError::Static(errors)
        })?;

        debug!("Front end produced {} statement(s)", statements.len());

        self.interpreter.interpret(&statements).map_err(|e| {
            self.had_runtime_error = true;
            RunError::Runtime(e)
        })
    }

    /// Scan, parse and resolve.  Lexical and syntax errors are reported
    /// together; resolution only runs on a clean parse.
    fn front_end(&mut self, source: &str) -> Result<Vec<Stmt>, Vec<LoxError>> {
        let (tokens, mut errors): (Vec<Token>, Vec<LoxError>) = Scanner::new(source).scan_all();

        let mut parser = Parser::with_first_id(&tokens, self.next_id);
        let parsed = parser.parse();
        self.next_id = parser.next_id();

        let statements: Vec<Stmt> = match parsed {
            Ok(statements) if errors.is_empty() => statements,
            Ok(_) => return Err(errors),
            Err(parse_errors) => {
                errors.extend(parse_errors);
                return Err(errors);
            }
        };

        Resolver::new(&mut self.interpreter).resolve(&statements)?;

        Ok(statements)
    }
}
