#![no_main]

use libfuzzer_sys::fuzz_target;
use ublmap::ubl::{self, ConvertOptions};

fuzz_target!(|data: &[u8]| {
    // parse → reverse → forward → serialize must not panic at any step.
    let Ok(doc) = ubl::parse(data) else {
        return;
    };
    let _ = doc.extract_binary_attachments();
    let Ok(invoice) = doc.to_invoice() else {
        return;
    };
    for ctx in ublmap::ubl::CONTEXTS.iter() {
        let opts = ConvertOptions::new().context(ctx.clone());
        if let Ok(out) = ubl::convert(&invoice, &opts) {
            let _ = ubl::to_xml(&out);
        }
    }
});
