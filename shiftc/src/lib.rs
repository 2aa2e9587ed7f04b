pub mod codegen;
pub mod lexer;
pub mod parser;
pub mod print;
pub mod types;

use std::fmt::Display;

use codegen::codegen::{Compiler, CompilerError};
use codegen::emitter::Emitter;
use lexer::lexer::Lexer;
use parser::ast::Program;
use parser::parser::{Parse, ParseError, Parser, Precedence};

/// Why a compilation produced no module: a fatal parse error with a precise
/// position, or the lowering diagnostics collected over the whole pass.
#[derive(Debug)]
pub enum Error {
    Parse(ParseError),
    Lowering(Vec<CompilerError>),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Parse(err) => err.fmt(f),
            Error::Lowering(errors) => {
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    err.fmt(f)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for Error {}

/// Runs the whole pipeline: lex, parse, lower, emit.
pub fn compile(source: &str) -> Result<Vec<u8>, Error> {
    let mut lexer = Lexer::new(source.to_string());
    let mut parser = Parser::new(&mut lexer);
    let program = Program::parse(&mut parser, Precedence::Lowest).map_err(Error::Parse)?;

    let mut compiler = Compiler::new();
    let module = compiler.compile_program(&program);
    if !compiler.errors().is_empty() {
        return Err(Error::Lowering(compiler.into_errors()));
    }

    let mut emitter = Emitter::new();
    emitter.emit_module(&module);

    Ok(emitter.into_bytes())
}
