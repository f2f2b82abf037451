#![no_main]

use arf::frontend::{lexer, parser};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to UTF-8 string (ignore invalid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        // The lexer recovers from every error, so the parser always gets a token stream
        let (tokens, _) = lexer::tokenize(s);
        let _ = parser::parse_file(&tokens);
    }
});
