// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Unholy CLI - the front-end driver.
//!
//! Reads a source file, runs the scanner or the full parser over it, and
//! renders any diagnostic with its source context.

mod print;

use std::env;
use std::fs;
use std::process;

use unholy_ast::SyntaxKind;
use unholy_diagnostics::formatter::DiagnosticFormatter;
use unholy_diagnostics::{json, ToDiagnostic};
use unholy_parser::parse_source;
use unholy_scanner::Scanner;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    match args[1].as_str() {
        "lex" => {
            if args.len() < 3 {
                eprintln!("Usage: unholy lex <file.uh>");
                process::exit(1);
            }
            cmd_lex(&args[2]);
        }
        "parse" => {
            let json = args.iter().any(|a| a == "--json");
            let path = args[2..].iter().find(|a| !a.starts_with("--"));
            match path {
                Some(path) => cmd_parse(path, json),
                None => {
                    eprintln!("Usage: unholy parse [--json] <file.uh>");
                    process::exit(1);
                }
            }
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-V" => {
            println!("unholy {}", env!("CARGO_PKG_VERSION"));
        }
        other => {
            // Treat as filename
            if other.ends_with(".uh") {
                cmd_parse(other, false);
            } else {
                eprintln!("Unknown command: {}", other);
                print_usage();
                process::exit(1);
            }
        }
    }
}

fn print_usage() {
    println!("Unholy - a small imperative language");
    println!();
    println!("Usage: unholy <command> [args]");
    println!();
    println!("Commands:");
    println!("  lex <file>            Tokenize a file and print the elements");
    println!("  parse [--json] <file> Parse a file and print the tree");
    println!("  help                  Show this help");
    println!("  version               Show version");
}

fn read_source(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {}: {}", path, e);
            process::exit(1);
        }
    }
}

fn cmd_lex(path: &str) {
    let source = read_source(path);
    let mut scanner = Scanner::new(&source);
    let mut count = 0;

    loop {
        match scanner.next_token() {
            Ok(element) => {
                if element.kind == SyntaxKind::EndOfFileToken {
                    break;
                }
                count += 1;
                println!(
                    "{:4}..{:<4} {:3}:{:<3} {:?} {}",
                    element.pos,
                    element.end(),
                    element.line,
                    element.column,
                    element.kind,
                    element.raw_text
                );
            }
            Err(e) => {
                show_error(&source, path, &e.to_diagnostic());
                eprintln!("=== Lex FAILED ===");
                process::exit(1);
            }
        }
    }

    println!("\n=== Lex OK: {} elements ===", count);
}

fn cmd_parse(path: &str, emit_json: bool) {
    let source = read_source(path);

    match parse_source(path, &source) {
        Ok(tree) => {
            print!("{}", print::render_tree(&tree));
            println!("\n=== Parse OK: {} nodes ===", tree.len());
        }
        Err(e) => {
            let diagnostic = e.to_diagnostic();
            if emit_json {
                println!("{}", json::to_json(path, &[diagnostic]));
            } else {
                show_error(&source, path, &diagnostic);
                eprintln!("=== Parse FAILED ===");
            }
            process::exit(1);
        }
    }
}

fn show_error(source: &str, path: &str, diagnostic: &unholy_diagnostics::Diagnostic) {
    let formatter = DiagnosticFormatter::new(source).with_file_name(path);
    eprint!("{}", formatter.format(diagnostic));
}
