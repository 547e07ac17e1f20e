//! A small OpenGL shader program wrapper, driven through [glow].
//!
//! [`ShaderProgram`] turns a vertex and a fragment GLSL source into one linked
//! program object and offers a typed uniform setter. It does nothing beyond
//! that: windowing, buffers, textures, and transform math belong to the
//! caller.
//!
//! # Features
//!
//! - **One setter for every shape.** [`ShaderProgram::set_uniform`] takes any
//!   [`UniformValue`] (`bool`, `int`, `float`, `vec2`-`vec4`, `mat2`-`mat4`).
//!   [glam] types and plain arrays convert into it.
//! - **Strict by default.** A compile or link failure is returned as a
//!   [`ShaderError`]. [`CompilePolicy::Permissive`] keeps the classic
//!   log-and-continue behaviour. It hands back a possibly broken program with
//!   its failures listed in [`ShaderProgram::diagnostics`].
//! - **Swappable driver.** Everything goes through [`GraphicsBackend`],
//!   implemented for `glow::Context` (feature `glow`) and for an in-memory
//!   `MockBackend` (feature `mock`) that records calls for tests.
//!
//! Diagnostics are emitted through the [log] facade in the familiar
//! `ERROR::SHADER::COMPILATION_FAILED` block format.
//!
//! # Safety
//!
//! Building and using a [`ShaderProgram`] requires a valid, current OpenGL
//! context. The methods that touch the driver are `unsafe` because they issue
//! raw GL calls.
//!
//! [glow]: https://docs.rs/glow
//! [glam]: https://docs.rs/glam
//! [log]: https://docs.rs/log

mod backend;
mod error;
mod options;
mod program;
mod source;
mod uniform;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use backend::GraphicsBackend;
pub use error::{ShaderError, DIAGNOSTIC_SEPARATOR};
pub use options::{CompilePolicy, ShaderOptions, DEFAULT_MAX_LOG_LEN, SHADER_DIR_ENV};
pub use program::ShaderProgram;
pub use source::{ShaderSource, ShaderStage};
pub use uniform::{UniformKind, UniformValue};
