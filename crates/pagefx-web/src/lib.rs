#![forbid(unsafe_code)]

//! Browser binding for pagefx.
//!
//! This crate provides [`PageRunner`], a `wasm-bindgen`-exported struct that
//! drives a `pagefx_runtime::PageRuntime` over the live DOM: `web-sys`
//! elements behind the `Document` trait, `localStorage` behind
//! `KeyValueStore`, `IntersectionObserver` for reveal and lazy images, and a
//! `setTimeout`/`requestAnimationFrame` pump aimed at the runtime's next
//! deadline.
//!
//! Logging goes through `tracing` to the browser console.

#[cfg(target_arch = "wasm32")]
mod console;
#[cfg(target_arch = "wasm32")]
mod wasm;
#[cfg(target_arch = "wasm32")]
mod web_document;
#[cfg(target_arch = "wasm32")]
mod web_storage;

#[cfg(target_arch = "wasm32")]
pub use wasm::PageRunner;

// Runner core is used by the wasm module and by native tests.
#[cfg(any(target_arch = "wasm32", test))]
mod runner_core;
