//! Panic reporting. Wasm has no native backtraces, so the hook borrows the JS
//! error stack and logs it through the regular logger.

/// Frames below the panic machinery. Falls back to the whole stack without its
/// leading `Error` line when the marker symbol was optimized away.
pub fn panic_frames(stack: &str) -> Vec<&str> {
    const MARKER: &str = "__rust_end_short_backtrace";

    if stack.contains(MARKER) {
        stack.lines().skip_while(|line| !line.contains(MARKER)).skip(1).collect()
    } else {
        stack.lines().skip(1).collect()
    }
}

#[cfg(target_arch = "wasm32")]
mod hook {
    use std::{fmt::Write, panic};
    use wasm_bindgen::prelude::wasm_bindgen;

    #[wasm_bindgen]
    extern "C" {
        type Error;

        #[wasm_bindgen(constructor)]
        fn new() -> Error;

        #[wasm_bindgen(structural, method, getter)]
        fn stack(error: &Error) -> String;

        #[wasm_bindgen(static_method_of = Error, setter, js_name = stackTraceLimit)]
        fn stack_trace_limit(size: f32);
    }

    pub fn setup_panic_hook() {
        panic::set_hook(Box::new(panic_hook));
    }

    fn panic_hook(info: &panic::PanicHookInfo) {
        let mut report = String::new();
        let _ = writeln!(report, "{}", info);

        Error::stack_trace_limit(10000_f32);

        let stack = Error::new().stack();

        for frame in super::panic_frames(&stack) {
            let _ = writeln!(report, "{}", frame);
        }

        log::error!("{}", report);
    }
}

#[cfg(target_arch = "wasm32")]
pub use hook::setup_panic_hook;
