//! The [`ShaderProgram`] wrapper: build, bind, feed uniforms, release.

use std::path::Path;
use std::sync::Arc;

use crate::backend::GraphicsBackend;
use crate::error::{truncate_log, ShaderError};
use crate::options::{CompilePolicy, ShaderOptions};
use crate::source::{ShaderSource, ShaderStage};
use crate::uniform::{UniformKind, UniformValue};

/// Components in the largest uniform a program can declare (`mat4`).
const MAX_UNIFORM_COMPONENTS: usize = 16;

/// A linked vertex + fragment shader program.
///
/// Built from two GLSL sources. Each stage is compiled and the two are linked
/// into one program object owned by this value. The stage objects are
/// deleted once linking has been attempted.
///
/// There is no `Drop` impl: GL objects must be freed with the right context
/// current, so the owner calls [`release`](Self::release) exactly once.
///
/// # Example
///
/// ```no_run
/// # use glow_shader_program::{GraphicsBackend, ShaderError, ShaderOptions, ShaderProgram};
/// # use std::sync::Arc;
/// # fn example<B: GraphicsBackend>(gl: Arc<B>) -> Result<(), ShaderError> {
/// let options = ShaderOptions::from_env();
/// let shader = unsafe { ShaderProgram::from_files(gl, "shader.vs", "shader.fs", &options) }?;
///
/// unsafe {
///     shader.activate();
///     shader.set_uniform("texture1", 0);
///     shader.set_uniform("projection", glam::Mat4::IDENTITY);
///     // ... draw ...
///     shader.release();
/// }
/// # Ok(())
/// # }
/// ```
pub struct ShaderProgram<B: GraphicsBackend> {
    /// The backend the program lives in, shared with the render loop.
    gl: Arc<B>,
    /// The linked program object.
    program: B::Program,
    /// Compile and link failures tolerated under [`CompilePolicy::Permissive`].
    diagnostics: Vec<ShaderError>,
}

impl<B: GraphicsBackend> std::fmt::Debug for ShaderProgram<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("program", &self.program)
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}

impl<B: GraphicsBackend> ShaderProgram<B> {
    /// Read a vertex and a fragment shader from disk and build a program.
    ///
    /// Relative paths are resolved against
    /// [`ShaderOptions::source_root`].
    ///
    /// # Safety
    ///
    /// The backend's context must be current. The returned program must be
    /// released with the same context.
    ///
    /// # Errors
    ///
    /// Always fails with [`ShaderError::SourceUnreadable`] if either file
    /// cannot be read. Nothing is compiled in that case. Otherwise see
    /// [`from_source`](Self::from_source).
    pub unsafe fn from_files(
        gl: Arc<B>,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
        options: &ShaderOptions,
    ) -> Result<Self, ShaderError> {
        let source = ShaderSource::load(
            vertex_path,
            fragment_path,
            options.source_root.as_deref(),
        )
        .inspect_err(|err| log::error!("{}", err.diagnostic()))?;
        unsafe { Self::from_source(gl, &source, options) }
    }

    /// Compile and link a program from source text.
    ///
    /// Under [`CompilePolicy::Strict`] the first compile failure (vertex
    /// before fragment) or the link failure is returned, and every object
    /// created along the way is freed. Under [`CompilePolicy::Permissive`]
    /// each failure is logged and kept in
    /// [`diagnostics`](Self::diagnostics), and the program is returned anyway.
    ///
    /// # Safety
    ///
    /// The backend's context must be current.
    ///
    /// # Errors
    ///
    /// [`ShaderError::Backend`] if the driver cannot allocate an object, in
    /// either policy. Under the strict policy, also
    /// [`ShaderError::CompileFailed`] and [`ShaderError::LinkFailed`].
    pub unsafe fn from_source(
        gl: Arc<B>,
        source: &ShaderSource,
        options: &ShaderOptions,
    ) -> Result<Self, ShaderError> {
        let mut diagnostics = Vec::new();

        let (vertex, failure) =
            unsafe { compile_stage(&*gl, ShaderStage::Vertex, source, options) }?;
        diagnostics.extend(failure);

        let fragment =
            match unsafe { compile_stage(&*gl, ShaderStage::Fragment, source, options) } {
                Ok((shader, failure)) => {
                    diagnostics.extend(failure);
                    shader
                }
                Err(err) => {
                    unsafe { gl.delete_shader(vertex) };
                    return Err(err);
                }
            };

        for failure in &diagnostics {
            log::error!("{}", failure.diagnostic());
        }

        if options.policy == CompilePolicy::Strict && !diagnostics.is_empty() {
            unsafe {
                gl.delete_shader(vertex);
                gl.delete_shader(fragment);
            }
            return Err(diagnostics.remove(0));
        }

        let program = match unsafe { gl.create_program() } {
            Ok(program) => program,
            Err(reason) => {
                unsafe {
                    gl.delete_shader(vertex);
                    gl.delete_shader(fragment);
                }
                return Err(ShaderError::Backend {
                    object: "program",
                    reason,
                });
            }
        };

        let linked = unsafe {
            gl.attach_shader(program, vertex);
            gl.attach_shader(program, fragment);
            gl.link_program(program);
            let linked = gl.get_program_link_status(program);

            // Stage objects are no use once linking has been attempted.
            gl.detach_shader(program, vertex);
            gl.detach_shader(program, fragment);
            gl.delete_shader(vertex);
            gl.delete_shader(fragment);
            linked
        };

        if !linked {
            let log = truncate_log(
                unsafe { gl.get_program_info_log(program) },
                options.max_log_len,
            );
            let err = ShaderError::LinkFailed { log };
            log::error!("{}", err.diagnostic());
            if options.policy == CompilePolicy::Strict {
                unsafe { gl.delete_program(program) };
                return Err(err);
            }
            diagnostics.push(err);
        }

        if diagnostics.is_empty() {
            log::debug!("linked shader program {program:?}");
        } else {
            log::warn!(
                "shader program {program:?} built with {} error(s); it may not render",
                diagnostics.len()
            );
        }

        Ok(Self {
            gl,
            program,
            diagnostics,
        })
    }

    /// The raw program handle, for binding from outside this wrapper.
    pub fn handle(&self) -> B::Program {
        self.program
    }

    /// The backend this program was built with.
    pub fn backend(&self) -> &Arc<B> {
        &self.gl
    }

    /// Compile and link failures recorded under the permissive policy.
    /// Always empty for strictly built programs.
    pub fn diagnostics(&self) -> &[ShaderError] {
        &self.diagnostics
    }

    /// Whether the program linked. Only a permissively built program can
    /// report `false`.
    pub fn is_linked(&self) -> bool {
        !self
            .diagnostics
            .iter()
            .any(|err| matches!(err, ShaderError::LinkFailed { .. }))
    }

    /// Make this the current program for draws and uniform writes.
    ///
    /// # Safety
    ///
    /// The backend's context must be current.
    pub unsafe fn activate(&self) {
        unsafe { self.gl.use_program(Some(self.program)) };
    }

    /// Resolve a uniform by name.
    ///
    /// # Safety
    ///
    /// The backend's context must be current.
    pub unsafe fn uniform_location(&self, name: &str) -> Option<B::UniformLocation> {
        unsafe { self.gl.get_uniform_location(self.program, name) }
    }

    /// Write a uniform by name.
    ///
    /// The location is looked up in this program. The write goes to the
    /// current program, so call [`activate`](Self::activate) first. A name the
    /// program does not have is silently ignored, which lets one set of
    /// uniform writes serve shader variants that omit some of them.
    ///
    /// # Safety
    ///
    /// The backend's context must be current.
    pub unsafe fn set_uniform(&self, name: &str, value: impl Into<UniformValue>) {
        let value = value.into();
        let location = unsafe { self.uniform_location(name) };
        if location.is_none() {
            log::trace!(
                "uniform `{name}` not found in program {:?}; write ignored",
                self.program
            );
        }
        unsafe { self.gl.set_uniform(location.as_ref(), &value) };
    }

    /// Read a uniform back through the driver as a value of `kind`.
    ///
    /// The driver writes every component of the uniform's declared type, so
    /// the read always goes through a buffer sized for the largest one
    /// (`mat4`). Only the leading components `kind` needs are used.
    ///
    /// Returns `None` if the name does not resolve.
    ///
    /// # Safety
    ///
    /// The backend's context must be current.
    pub unsafe fn uniform(&self, name: &str, kind: UniformKind) -> Option<UniformValue> {
        let location = unsafe { self.uniform_location(name) }?;
        if kind.is_integer() {
            let mut components = [0_i32; MAX_UNIFORM_COMPONENTS];
            unsafe { self.gl.get_uniform_i32(self.program, &location, &mut components) };
            UniformValue::from_integer(kind, components[0])
        } else {
            let mut components = [0.0_f32; MAX_UNIFORM_COMPONENTS];
            unsafe { self.gl.get_uniform_f32(self.program, &location, &mut components) };
            UniformValue::from_float_components(kind, &components)
        }
    }

    /// Names of the program's active uniforms.
    ///
    /// # Safety
    ///
    /// The backend's context must be current.
    pub unsafe fn active_uniforms(&self) -> Vec<String> {
        unsafe { self.gl.active_uniform_names(self.program) }
    }

    /// Delete the program object.
    ///
    /// # Safety
    ///
    /// The backend's context must be current. The handle must not be bound
    /// for drawing afterwards (see [`handle`](Self::handle)).
    pub unsafe fn release(self) {
        unsafe { self.gl.delete_program(self.program) };
    }
}

/// Create and compile one stage.
///
/// Returns the shader object together with its compile failure, if any; the
/// object is returned either way so the caller can link or delete it.
unsafe fn compile_stage<B: GraphicsBackend>(
    gl: &B,
    stage: ShaderStage,
    source: &ShaderSource,
    options: &ShaderOptions,
) -> Result<(B::Shader, Option<ShaderError>), ShaderError> {
    unsafe {
        let shader = gl
            .create_shader(stage)
            .map_err(|reason| ShaderError::Backend {
                object: "shader",
                reason,
            })?;
        gl.shader_source(shader, source.stage(stage));
        gl.compile_shader(shader);

        if gl.get_shader_compile_status(shader) {
            return Ok((shader, None));
        }

        let log = truncate_log(gl.get_shader_info_log(shader), options.max_log_len);
        Ok((shader, Some(ShaderError::CompileFailed { stage, log })))
    }
}
