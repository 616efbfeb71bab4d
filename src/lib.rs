#![recursion_limit = "256"]
#![warn(clippy::all)]

#[cfg(target_arch = "wasm32")]
#[global_allocator]
static ALLOC: talc::TalckWasm = unsafe { talc::TalckWasm::new_global() };

pub mod features;
pub mod game_loop;
pub mod logging;
pub mod memorysystem;
pub mod military;
pub mod serialize;

pub mod panic;
#[cfg(target_arch = "wasm32")]
mod screeps_impl;

#[cfg(test)]
mod testing;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_name = setup)]
pub fn setup() {
    if let Err(err) = logging::setup_logging(logging::Info) {
        web_sys::console::log_1(&format!("Failed to set up logging: {}", err).into());
    }

    panic::setup_panic_hook();
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_name = game_loop)]
pub fn game_loop_export() {
    screeps_impl::run_tick();
}
