//! FFI bindings and helpers for the Blackmagic RAW SDK.
//!
//! The SDK decodes `.braw` clips through COM-style interfaces: every object is a pointer
//! to a virtual table and lifetimes are managed with `AddRef` / `Release`. This crate
//! describes those tables in Rust, loads the vendor library at run time and bridges two
//! things the vendor ABI cannot carry on its own:
//!
//! - text, which the SDK represents as `CFStringRef` on macOS and as a C string
//!   elsewhere, is copied into owned [`buffer::Buffer`]s;
//! - job results, which the SDK delivers by calling an object implementing
//!   `IBlackmagicRawCallback`, are forwarded by [`callback`] to plain functions.
//!
//! # Features
//!
//! - `helpers` - Safe owning wrappers and the `Callback` trait (default)
//! - `capi` - Export the [`api`] functions unmangled for non-Rust hosts
//!
//! # Example
//!
//! ```no_run
//! use blackmagic_raw_sys::helpers::Factory;
//!
//! let factory = Factory::new().expect("Blackmagic RAW API not installed");
//! let codec = factory.create_codec().expect("Failed to create codec");
//! let clip = codec.open_clip("/media/A001_08122231_C001.braw").expect("Failed to open clip");
//! println!("{}x{} @ {} fps", clip.width().unwrap(), clip.height().unwrap(), clip.frame_rate().unwrap());
//! ```

#![allow(non_snake_case, non_camel_case_types, non_upper_case_globals)]

pub mod api;
pub mod base;
pub mod buffer;
pub mod callback;
pub mod errors;
pub mod formats;
pub mod interfaces;
pub mod library;
pub mod text;

#[cfg(feature = "helpers")]
pub mod helpers;

#[cfg(test)]
mod testing;
