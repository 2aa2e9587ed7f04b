use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::process::exit;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use shiftc::codegen::codegen::Compiler;
use shiftc::codegen::emitter::Emitter;
use shiftc::lexer::lexer::Lexer;
use shiftc::parser::ast::Program;
use shiftc::parser::parser::{Parse, Parser as ShiftParser, Precedence};
use shiftc::print::print::Printer;
use wasmprinter::print_bytes;

#[derive(Parser, Debug)]
#[command(author, version, about = "Shift language compiler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compiles a Shift file to a Wasm module
    Build(BuildArgs),
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Shift file path
    shift_file_path: PathBuf,

    #[arg(long, action)]
    /// Print the compiled module as Wat
    print_wat: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Build(args) => build(args),
    }
}

fn build(args: &BuildArgs) -> Result<()> {
    let source = fs::read_to_string(&args.shift_file_path)
        .with_context(|| format!("opening {}", args.shift_file_path.display()))?;

    let mut lexer = Lexer::new(source.clone());
    let mut parser = ShiftParser::new(&mut lexer);
    let program = match Program::parse(&mut parser, Precedence::Lowest) {
        Ok(program) => program,
        Err(err) => {
            let printer = Printer::new(&source);
            println!("{}", printer.print_error(err.position(), err.message()));
            exit(1);
        }
    };

    let mut compiler = Compiler::new();
    let module = compiler.compile_program(&program);
    if !compiler.errors().is_empty() {
        for error in compiler.errors() {
            println!("{}", error);
        }
        exit(1);
    }

    let mut emitter = Emitter::new();
    emitter.emit_module(&module);

    if args.print_wat {
        let wat = print_bytes(emitter.bytes())
            .unwrap_or_else(|_| "could not print compiled wasm as wat".to_string());
        println!("{}", wat);
    }

    let wasm_file_path = args.shift_file_path.with_extension("wasm");
    fs::write(&wasm_file_path, emitter.bytes())
        .with_context(|| format!("writing {}", wasm_file_path.display()))?;
    fs::set_permissions(&wasm_file_path, fs::Permissions::from_mode(0o644))
        .with_context(|| format!("setting permissions on {}", wasm_file_path.display()))?;

    Ok(())
}
