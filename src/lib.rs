#![cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

mod api;
mod audio;
mod constants;
mod dom;
mod events;
mod frame;
mod keymap;
mod labels;
mod view;

pub use api::TwinWheels;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("twinwheels-web starting");
    Ok(())
}
