// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Thin CLI driver: reads Lonala source, compiles it, and prints a
//! disassembly of the resulting chunk. Does not execute anything; the
//! instruction-dispatch loop is out of scope for this crate.

use std::env;
use std::fs;
use std::io::{self, Read as _};
use std::process::ExitCode;

use lonala_compiler::{VmState, compile};

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let source = match read_source() {
        Ok(source) => source,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    let mut vm = VmState::new();
    match compile(&source, &mut vm) {
        Ok(chunk) => {
            print!("{}", chunk.disassemble("lonalac"));
            ExitCode::SUCCESS
        }
        Err(_) => ExitCode::FAILURE,
    }
}

fn read_source() -> Result<String, String> {
    let mut args = env::args().skip(1);
    match args.next().as_deref() {
        Some("--source") => {
            let path = args.next().ok_or_else(|| "--source requires a file path".to_string())?;
            fs::read_to_string(&path).map_err(|err| format!("failed to read {path}: {err}"))
        }
        Some(other) => Err(format!("unrecognized argument: {other}")),
        None => {
            let mut line = String::new();
            io::stdin()
                .read_to_string(&mut line)
                .map_err(|err| format!("failed to read stdin: {err}"))?;
            Ok(line)
        }
    }
}
