#![no_main]

use ilscope::{decode_method_body, MethodContext, TableResolver};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // First byte picks static vs. instance, the rest is the IL stream
    let Some((&flags, il)) = data.split_first() else {
        return;
    };

    let resolver = TableResolver::new();
    let context = MethodContext::new(&resolver).with_static(flags & 1 == 1);
    let _ = decode_method_body(il, &context);
});
