// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_usfm_book(chapters: usize, verses: usize) -> String {
    let mut content = String::from("\\id TST Generated\n\\h Test\n\\mt1 The Test Book\n");
    content.push_str("\\is1 Introduction\n\\ip This book is generated for \\bk benchmarking\\bk*.\n");

    for chapter in 1..=chapters {
        content.push_str(&format!("\\c {chapter}\n\\s1 Section {chapter}\n\\p\n"));
        for verse in 1..=verses {
            if verse % 5 == 0 {
                content.push_str("\\q1\n");
            }
            content.push_str(&format!(
                "\\v {verse} And the \\nd LORD\\nd* said <<verse {verse}>>"
            ));
            if verse % 3 == 0 {
                content.push_str(&format!(
                    "\\f + \\fr {chapter}:{verse} \\ft A note on the verse.\\f*"
                ));
            }
            if verse % 7 == 0 {
                content.push_str(" \\x - \\xo 1:1 \\xt Gen 1:1\\x*");
            }
            content.push_str(" to the people.\n");
        }
    }

    content
}

#[allow(dead_code)]
pub fn generate_inline_usfm(chapters: usize, verses: usize) -> String {
    let mut content = String::from("\\id TST\n");
    for chapter in 1..=chapters {
        content.push_str(&format!("\\c {chapter}\n\\p"));
        for verse in 1..=verses {
            content.push_str(&format!(" \\v {verse} text of verse {verse}"));
        }
        content.push('\n');
    }
    content
}
