#![no_main]

use libfuzzer_sys::fuzz_target;
use tenet_syntax::source::SourceFile;
use tenet_syntax::{diagnostics, lexer, parser};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        match lexer::lex(s) {
            Ok(tokens) => {
                if let Err(errs) = parser::parse(&tokens) {
                    // Rendering must cope with any span the parser reports
                    let file = SourceFile::new("fuzz.tnt", s);
                    for err in &errs {
                        let _ = diagnostics::format_error(&file, err);
                    }
                }
            }
            Err(errs) => {
                let file = SourceFile::new("fuzz.tnt", s);
                for err in &errs {
                    let _ = diagnostics::format_error(&file, err);
                }
            }
        }
    }
});
