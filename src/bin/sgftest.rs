use sgftree_engine::sgf_parser::input_stream::InputStream;
use sgftree_engine::sgf_parser::token::{Token, TokenType};
use sgftree_engine::sgf_parser::tokenizer::Tokenizer;
use std::process::exit;
use std::{env, fs, io};

#[macro_use]
extern crate serde_derive;

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Root {
    pub tests: Vec<Test>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Test {
    pub description: String,
    pub input: String,
    #[serde(default)]
    pub output: Vec<Vec<String>>,
    #[serde(default)]
    pub errors: Vec<Error>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Error {
    pub message: String,
    pub start: usize,
    pub end: usize,
}

fn main() -> io::Result<()> {
    let default_dir = "./sgf-tests";
    let dir = env::args().nth(1).unwrap_or(default_dir.to_string());

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if !path.is_file() || path.extension().unwrap_or_default() != "test" {
            continue;
        }

        let contents = fs::read_to_string(&path)?;
        let container: Root = match serde_json::from_str(&contents) {
            Ok(container) => container,
            Err(_) => continue,
        };

        println!("***");
        println!("*** Running {} tests from 🗄️ {:?}", container.tests.len(), path);
        println!("***");

        for test in container.tests {
            if !run_token_test(&test) {
                exit(1);
            }
        }
        println!();
    }

    Ok(())
}

fn run_token_test(test: &Test) -> bool {
    println!("🧪 running test: {}", test.description);

    let mut is = InputStream::new();
    is.read_from_str(test.input.as_str());
    let mut tknzr = Tokenizer::new(&mut is, None);

    for expected_token in test.output.iter() {
        match tknzr.next_token() {
            Ok(token) => {
                if !match_token(&token, expected_token) {
                    return false;
                }
            }
            Err(e) => {
                return match_error(&e.message, e.start, e.end, &test.errors);
            }
        }
    }

    // any expected error must have surfaced by now
    if !test.errors.is_empty() {
        match tknzr.next_token() {
            Ok(token) => {
                println!("❌ expected an error, got token {}", token);
                return false;
            }
            Err(e) => {
                return match_error(&e.message, e.start, e.end, &test.errors);
            }
        }
    }

    println!("----------------------------------------");
    true
}

fn match_token(have: &Token, expected: &[String]) -> bool {
    let expected_type = match expected.first().map(|s| s.as_str()) {
        Some("LeftParen") => TokenType::LeftParen,
        Some("RightParen") => TokenType::RightParen,
        Some("Semicolon") => TokenType::Semicolon,
        Some("Tag") => TokenType::Tag,
        Some("Value") => TokenType::Value,
        Some("EndOfFile") => TokenType::Eof,
        other => panic!("unknown output token type {:?}", other),
    };

    if have.token_type != expected_type {
        println!(
            "❌ Incorrect token type found (want: {:?}, got {:?})",
            expected_type, have.token_type
        );
        return false;
    }

    if let Some(value) = expected.get(1) {
        if have.value != *value {
            println!(
                "❌ Incorrect token text (want: {}, got: {})",
                value, have.value
            );
            return false;
        }
    }

    println!("✅ matched {}", have);
    true
}

fn match_error(message: &str, start: usize, end: usize, errors: &[Error]) -> bool {
    for want_err in errors {
        if want_err.message == message && want_err.start == start && want_err.end == end {
            println!("✅ found error '{}' at {}:{}", message, start, end);
            return true;
        }
    }

    println!("❌ unexpected error '{}' at {}:{}", message, start, end);
    for want_err in errors {
        println!("    wanted '{}' at {}:{}", want_err.message, want_err.start, want_err.end);
    }
    false
}
