#![no_main]

use kestrel_syntax::diagnostics::NullErrorListener;
use kestrel_syntax::{parser, scanner};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Scanning and parsing are total: any text yields tokens and a tree.
    if let Ok(text) = std::str::from_utf8(data) {
        let tokens = scanner::scan(text, &mut NullErrorListener);
        let _ = parser::parse(&tokens, &mut NullErrorListener);
    }
});
