//! The driver capability a [`ShaderProgram`](crate::ShaderProgram) is built on.
//!
//! [`GraphicsBackend`] mirrors the slice of `glow::HasContext` needed to
//! compile, link, bind, and feed uniforms to a program. With the `glow`
//! feature it is implemented for [`glow::Context`]. The `mock` feature adds
//! an in-memory implementation for tests.

use std::fmt;

use crate::source::ShaderStage;
use crate::uniform::UniformValue;

/// Shader compile/link and uniform entry points of a graphics driver.
///
/// # Safety
///
/// Every method is `unsafe` because a real implementation issues raw GL
/// calls, which require a valid context current on the calling thread. Handles
/// passed in must have come from the same backend and not yet been deleted.
pub trait GraphicsBackend {
    /// A compiled (or failed) stage object.
    type Shader: Copy + fmt::Debug;
    /// A program object.
    type Program: Copy + fmt::Debug;
    /// A resolved uniform slot within a program.
    type UniformLocation: fmt::Debug;

    /// Allocate an empty shader object for `stage`.
    unsafe fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;
    /// Replace the shader's source text.
    unsafe fn shader_source(&self, shader: Self::Shader, source: &str);
    /// Compile the shader's current source.
    unsafe fn compile_shader(&self, shader: Self::Shader);
    /// Whether the last compile succeeded.
    unsafe fn get_shader_compile_status(&self, shader: Self::Shader) -> bool;
    /// The compiler's log for the last compile.
    unsafe fn get_shader_info_log(&self, shader: Self::Shader) -> String;
    /// Free a shader object. Attached shaders are freed once detached.
    unsafe fn delete_shader(&self, shader: Self::Shader);

    /// Allocate an empty program object.
    unsafe fn create_program(&self) -> Result<Self::Program, String>;
    /// Attach a shader to a program.
    unsafe fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    /// Detach a shader from a program.
    unsafe fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    /// Link the attached shaders.
    unsafe fn link_program(&self, program: Self::Program);
    /// Whether the last link succeeded.
    unsafe fn get_program_link_status(&self, program: Self::Program) -> bool;
    /// The linker's log for the last link.
    unsafe fn get_program_info_log(&self, program: Self::Program) -> String;
    /// Free a program object.
    unsafe fn delete_program(&self, program: Self::Program);
    /// Make `program` current, or unbind with `None`.
    unsafe fn use_program(&self, program: Option<Self::Program>);

    /// Names of the uniforms the linker kept.
    unsafe fn active_uniform_names(&self, program: Self::Program) -> Vec<String>;
    /// Resolve a uniform by name. `None` when the program has no such
    /// active uniform.
    unsafe fn get_uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation>;
    /// Write `value` to `location` in the current program. A `None`
    /// location is ignored, like GL's `-1`.
    unsafe fn set_uniform(&self, location: Option<&Self::UniformLocation>, value: &UniformValue);
    /// Read float components of a uniform into `out`.
    unsafe fn get_uniform_f32(
        &self,
        program: Self::Program,
        location: &Self::UniformLocation,
        out: &mut [f32],
    );
    /// Read integer components of a uniform into `out`.
    unsafe fn get_uniform_i32(
        &self,
        program: Self::Program,
        location: &Self::UniformLocation,
        out: &mut [i32],
    );
}

#[cfg(feature = "glow")]
impl GraphicsBackend for glow::Context {
    type Shader = glow::Shader;
    type Program = glow::Program;
    type UniformLocation = glow::UniformLocation;

    unsafe fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String> {
        unsafe { glow::HasContext::create_shader(self, stage.gl_enum()) }
    }

    unsafe fn shader_source(&self, shader: Self::Shader, source: &str) {
        unsafe { glow::HasContext::shader_source(self, shader, source) };
    }

    unsafe fn compile_shader(&self, shader: Self::Shader) {
        unsafe { glow::HasContext::compile_shader(self, shader) };
    }

    unsafe fn get_shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { glow::HasContext::get_shader_compile_status(self, shader) }
    }

    unsafe fn get_shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { glow::HasContext::get_shader_info_log(self, shader) }
    }

    unsafe fn delete_shader(&self, shader: Self::Shader) {
        unsafe { glow::HasContext::delete_shader(self, shader) };
    }

    unsafe fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { glow::HasContext::create_program(self) }
    }

    unsafe fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { glow::HasContext::attach_shader(self, program, shader) };
    }

    unsafe fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { glow::HasContext::detach_shader(self, program, shader) };
    }

    unsafe fn link_program(&self, program: Self::Program) {
        unsafe { glow::HasContext::link_program(self, program) };
    }

    unsafe fn get_program_link_status(&self, program: Self::Program) -> bool {
        unsafe { glow::HasContext::get_program_link_status(self, program) }
    }

    unsafe fn get_program_info_log(&self, program: Self::Program) -> String {
        unsafe { glow::HasContext::get_program_info_log(self, program) }
    }

    unsafe fn delete_program(&self, program: Self::Program) {
        unsafe { glow::HasContext::delete_program(self, program) };
    }

    unsafe fn use_program(&self, program: Option<Self::Program>) {
        unsafe { glow::HasContext::use_program(self, program) };
    }

    unsafe fn active_uniform_names(&self, program: Self::Program) -> Vec<String> {
        unsafe {
            let count = glow::HasContext::get_active_uniforms(self, program);
            (0..count)
                .filter_map(|index| glow::HasContext::get_active_uniform(self, program, index))
                .map(|uniform| uniform.name)
                .collect()
        }
    }

    unsafe fn get_uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { glow::HasContext::get_uniform_location(self, program, name) }
    }

    unsafe fn set_uniform(&self, location: Option<&Self::UniformLocation>, value: &UniformValue) {
        use glow::HasContext as _;

        unsafe {
            match *value {
                UniformValue::Bool(v) => self.uniform_1_i32(location, i32::from(v)),
                UniformValue::Int(v) => self.uniform_1_i32(location, v),
                UniformValue::Float(v) => self.uniform_1_f32(location, v),
                UniformValue::Vec2(v) => self.uniform_2_f32_slice(location, &v.to_array()),
                UniformValue::Vec3(v) => self.uniform_3_f32_slice(location, &v.to_array()),
                UniformValue::Vec4(v) => self.uniform_4_f32_slice(location, &v.to_array()),
                UniformValue::Mat2(m) => {
                    self.uniform_matrix_2_f32_slice(location, false, &m.to_cols_array());
                }
                UniformValue::Mat3(m) => {
                    self.uniform_matrix_3_f32_slice(location, false, &m.to_cols_array());
                }
                UniformValue::Mat4(m) => {
                    self.uniform_matrix_4_f32_slice(location, false, &m.to_cols_array());
                }
            }
        }
    }

    unsafe fn get_uniform_f32(
        &self,
        program: Self::Program,
        location: &Self::UniformLocation,
        out: &mut [f32],
    ) {
        unsafe { glow::HasContext::get_uniform_f32(self, program, location, out) };
    }

    unsafe fn get_uniform_i32(
        &self,
        program: Self::Program,
        location: &Self::UniformLocation,
        out: &mut [i32],
    ) {
        unsafe { glow::HasContext::get_uniform_i32(self, program, location, out) };
    }
}
