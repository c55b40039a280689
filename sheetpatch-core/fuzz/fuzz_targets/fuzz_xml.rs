#![no_main]

//! Fuzz target for the part tree.
//!
//! Anything the parser accepts must serialize, and the serialized text must
//! parse again to a tree that serializes identically.

use libfuzzer_sys::fuzz_target;
use sheetpatch_core::xml::XmlDocument;

fuzz_target!(|data: &[u8]| {
    let Ok(document) = XmlDocument::parse("fuzz.xml", data) else {
        return;
    };
    let first = document.to_crlf_string().expect("parsed tree must serialize");

    let reparsed = XmlDocument::parse("fuzz.xml", first.as_bytes()).expect("serialized tree must parse");
    let second = reparsed.to_crlf_string().expect("reparsed tree must serialize");
    assert_eq!(first, second);
});
