#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sarex::index::{RecordSearch, SuffixArrayBuilder};
use sarex::regex::{ExecutorConfig, MatchMode};

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    text: &'a [u8],
    pattern: &'a str,
    all: bool,
}

fuzz_target!(|input: Input| {
    if input.pattern.len() > 32 || input.text.len() > 256 {
        return;
    }

    let mut builder = SuffixArrayBuilder::with_defaults();
    builder.add_text(input.text);
    let sa = builder.build();

    let config = ExecutorConfig {
        mode: if input.all { MatchMode::NonGreedy } else { MatchMode::Greedy },
        ..Default::default()
    };

    // Every match must lie inside the text
    if let Ok(matches) = sa.regex_search(input.pattern, &config) {
        for m in &matches {
            assert!(m.length > 0);
            assert!(m.end() <= sa.text.len() as u64);
        }
    }
});
