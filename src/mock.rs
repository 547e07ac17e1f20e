//! Mock backend for testing
//!
//! [`MockBackend`] implements [`GraphicsBackend`] without a GPU. It records
//! every call for later inspection, keeps a uniform table per linked
//! program, and decides compile and link outcomes with a small scanner over
//! the GLSL source:
//!
//! - a stage fails to compile on empty source, unbalanced `{}`/`()`, a
//!   statement that does not end in `;`, or a global `uniform`/`in`/`out`
//!   declaration with an unknown type;
//! - a program fails to link when a stage is missing or did not compile,
//!   when a fragment `in` has no vertex `out` of the same name and type, or
//!   when both stages declare a uniform with different types.
//!
//! Uniform writes follow GL rules: they go to the current program, a missing
//! location is ignored, and a location from another program or a value of
//! the wrong shape is rejected and logged in [`MockBackend::errors`]. So is
//! a read-back into a buffer shorter than the uniform's declared type.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::backend::GraphicsBackend;
use crate::source::ShaderStage;
use crate::uniform::{UniformKind, UniformValue};

/// Shader handle issued by [`MockBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MockShader(pub u32);

/// Program handle issued by [`MockBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MockProgram(pub u32);

/// Uniform location issued by [`MockBackend`]. Only valid for the program
/// it was resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MockUniformLocation {
    program: u32,
    index: usize,
}

/// Record of a backend call for test inspection
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    /// A shader object was created
    CreateShader(ShaderStage, MockShader),
    /// A shader was compiled
    CompileShader(MockShader),
    /// A shader object was deleted
    DeleteShader(MockShader),
    /// A program object was created
    CreateProgram(MockProgram),
    /// A shader was attached to a program
    AttachShader(MockProgram, MockShader),
    /// A shader was detached from a program
    DetachShader(MockProgram, MockShader),
    /// A program was linked
    LinkProgram(MockProgram),
    /// A program object was deleted
    DeleteProgram(MockProgram),
    /// The current program changed
    UseProgram(Option<MockProgram>),
    /// A uniform write was issued (whether or not it took effect)
    SetUniform(Option<MockUniformLocation>, UniformValue),
}

/// A GLSL type as far as the scanner cares.
#[derive(Debug, Clone, PartialEq, Eq)]
enum GlslType {
    Value(UniformKind),
    /// Samplers, integer vectors and user structs: legal in source, not
    /// settable through [`UniformValue`] except samplers taking an `Int`
    /// unit.
    Opaque(String),
}

impl GlslType {
    fn parse(name: &str) -> Option<Self> {
        if let Some(kind) = UniformKind::from_glsl_name(name) {
            return Some(Self::Value(kind));
        }
        let opaque = name.starts_with("sampler")
            || matches!(
                name,
                "uint" | "ivec2" | "ivec3" | "ivec4" | "uvec2" | "uvec3" | "uvec4" | "bvec2"
                    | "bvec3" | "bvec4"
            );
        opaque.then(|| Self::Opaque(name.to_owned()))
    }

    /// Components the driver writes when this uniform is read back.
    fn component_count(&self) -> usize {
        match self {
            Self::Value(kind) => kind.component_count(),
            Self::Opaque(name) if name.contains("vec") => match name.chars().last() {
                Some('2') => 2,
                Some('3') => 3,
                _ => 4,
            },
            Self::Opaque(_) => 1,
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Value(kind) => kind.glsl_name(),
            Self::Opaque(name) => name,
        }
    }

    fn zero(&self) -> UniformValue {
        match self {
            Self::Value(kind) if kind.is_integer() => {
                UniformValue::from_integer(*kind, 0).unwrap_or(UniformValue::Int(0))
            }
            Self::Value(kind) => UniformValue::from_float_components(*kind, &[0.0; 16])
                .unwrap_or(UniformValue::Float(0.0)),
            Self::Opaque(_) => UniformValue::Int(0),
        }
    }

    /// The value actually stored for a write of `value`, if GL would accept it.
    fn accept(&self, value: UniformValue) -> Option<UniformValue> {
        match (self, value) {
            (Self::Value(UniformKind::Bool), UniformValue::Int(v)) => {
                Some(UniformValue::Bool(v != 0))
            }
            (Self::Value(kind), value) if *kind == value.kind() => Some(value),
            (Self::Opaque(name), UniformValue::Int(_)) if name.starts_with("sampler") => {
                Some(value)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Declaration {
    name: String,
    ty: GlslType,
}

#[derive(Debug, Clone, Default)]
struct StageInterface {
    inputs: Vec<Declaration>,
    outputs: Vec<Declaration>,
    uniforms: Vec<Declaration>,
}

#[derive(Debug)]
struct ShaderObject {
    stage: ShaderStage,
    source: String,
    compiled: bool,
    log: String,
    interface: StageInterface,
}

#[derive(Debug)]
struct UniformSlot {
    name: String,
    ty: GlslType,
    value: UniformValue,
}

#[derive(Debug, Default)]
struct ProgramObject {
    attached: Vec<u32>,
    linked: bool,
    log: String,
    uniforms: Vec<UniformSlot>,
}

#[derive(Debug, Default)]
struct MockState {
    next_id: u32,
    shaders: HashMap<u32, ShaderObject>,
    programs: HashMap<u32, ProgramObject>,
    current: Option<u32>,
    calls: Vec<BackendCall>,
    errors: Vec<String>,
}

impl MockState {
    fn allocate_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

/// A fake GL driver that records all calls for testing
///
/// Not `Sync`; like a GL context it belongs to one thread.
#[derive(Debug, Default)]
pub struct MockBackend {
    state: RefCell<MockState>,
    fail_allocations: Cell<bool>,
}

impl MockBackend {
    /// Create a new mock backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `create_shader`/`create_program` fail, as a
    /// driver out of object names would.
    pub fn fail_allocations(&self, fail: bool) {
        self.fail_allocations.set(fail);
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.state.borrow().calls.clone()
    }

    /// Clear all recorded calls
    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// GL-style errors raised by rejected calls.
    pub fn errors(&self) -> Vec<String> {
        self.state.borrow().errors.clone()
    }

    /// Number of shader objects not yet deleted.
    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    /// Number of program objects not yet deleted.
    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    /// The program bound by the last `use_program`, if it still exists.
    pub fn current_program(&self) -> Option<MockProgram> {
        let state = self.state.borrow();
        state
            .current
            .filter(|id| state.programs.contains_key(id))
            .map(MockProgram)
    }

    /// Source last given to a shader, if the shader still exists.
    pub fn shader_source_text(&self, shader: MockShader) -> Option<String> {
        self.state
            .borrow()
            .shaders
            .get(&shader.0)
            .map(|s| s.source.clone())
    }

    /// Stored value of a uniform, bypassing locations and the current
    /// program.
    pub fn uniform_value(&self, program: MockProgram, name: &str) -> Option<UniformValue> {
        let state = self.state.borrow();
        let program = state.programs.get(&program.0)?;
        program
            .uniforms
            .iter()
            .find(|slot| slot.name == name)
            .map(|slot| slot.value)
    }

    fn record(&self, call: BackendCall) {
        self.state.borrow_mut().calls.push(call);
    }

    fn error(&self, message: String) {
        log::trace!("mock backend: {message}");
        self.state.borrow_mut().errors.push(message);
    }

    /// Stored value of the slot behind `location`, or `None` (with an error
    /// recorded) when `out_len` is too short for the declared type, as the
    /// real driver would write past it.
    fn read_slot(
        &self,
        program: MockProgram,
        location: &MockUniformLocation,
        out_len: usize,
    ) -> Option<UniformValue> {
        if location.program != program.0 {
            return None;
        }
        let (value, needed, name) = {
            let state = self.state.borrow();
            let slot = state
                .programs
                .get(&program.0)
                .and_then(|p| p.uniforms.get(location.index))?;
            (slot.value, slot.ty.component_count(), slot.name.clone())
        };
        if out_len < needed {
            self.error(format!(
                "buffer overflow: uniform `{name}` has {needed} components, buffer holds {out_len}"
            ));
            return None;
        }
        Some(value)
    }
}

impl GraphicsBackend for MockBackend {
    type Shader = MockShader;
    type Program = MockProgram;
    type UniformLocation = MockUniformLocation;

    unsafe fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String> {
        if self.fail_allocations.get() {
            return Err("out of shader objects".into());
        }
        let shader = {
            let mut state = self.state.borrow_mut();
            let id = state.allocate_id();
            state.shaders.insert(
                id,
                ShaderObject {
                    stage,
                    source: String::new(),
                    compiled: false,
                    log: String::new(),
                    interface: StageInterface::default(),
                },
            );
            MockShader(id)
        };
        self.record(BackendCall::CreateShader(stage, shader));
        Ok(shader)
    }

    unsafe fn shader_source(&self, shader: Self::Shader, source: &str) {
        if let Some(object) = self.state.borrow_mut().shaders.get_mut(&shader.0) {
            object.source = source.to_owned();
        }
    }

    unsafe fn compile_shader(&self, shader: Self::Shader) {
        self.record(BackendCall::CompileShader(shader));
        let mut state = self.state.borrow_mut();
        if let Some(object) = state.shaders.get_mut(&shader.0) {
            match scan_stage(&object.source) {
                Ok(interface) => {
                    object.compiled = true;
                    object.log.clear();
                    object.interface = interface;
                }
                Err(log) => {
                    object.compiled = false;
                    object.log = log;
                    object.interface = StageInterface::default();
                }
            }
        }
    }

    unsafe fn get_shader_compile_status(&self, shader: Self::Shader) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader.0)
            .is_some_and(|s| s.compiled)
    }

    unsafe fn get_shader_info_log(&self, shader: Self::Shader) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader.0)
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    unsafe fn delete_shader(&self, shader: Self::Shader) {
        self.record(BackendCall::DeleteShader(shader));
        self.state.borrow_mut().shaders.remove(&shader.0);
    }

    unsafe fn create_program(&self) -> Result<Self::Program, String> {
        if self.fail_allocations.get() {
            return Err("out of program objects".into());
        }
        let program = {
            let mut state = self.state.borrow_mut();
            let id = state.allocate_id();
            state.programs.insert(id, ProgramObject::default());
            MockProgram(id)
        };
        self.record(BackendCall::CreateProgram(program));
        Ok(program)
    }

    unsafe fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        self.record(BackendCall::AttachShader(program, shader));
        if let Some(object) = self.state.borrow_mut().programs.get_mut(&program.0) {
            if !object.attached.contains(&shader.0) {
                object.attached.push(shader.0);
            }
        }
    }

    unsafe fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        self.record(BackendCall::DetachShader(program, shader));
        if let Some(object) = self.state.borrow_mut().programs.get_mut(&program.0) {
            object.attached.retain(|id| *id != shader.0);
        }
    }

    unsafe fn link_program(&self, program: Self::Program) {
        self.record(BackendCall::LinkProgram(program));
        let mut state = self.state.borrow_mut();
        let MockState {
            shaders, programs, ..
        } = &mut *state;
        let Some(object) = programs.get_mut(&program.0) else {
            return;
        };
        let attached: Vec<&ShaderObject> = object
            .attached
            .iter()
            .filter_map(|id| shaders.get(id))
            .collect();
        match link_stages(&attached) {
            Ok(uniforms) => {
                object.linked = true;
                object.log.clear();
                object.uniforms = uniforms;
            }
            Err(log) => {
                object.linked = false;
                object.log = log;
                object.uniforms.clear();
            }
        }
    }

    unsafe fn get_program_link_status(&self, program: Self::Program) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program.0)
            .is_some_and(|p| p.linked)
    }

    unsafe fn get_program_info_log(&self, program: Self::Program) -> String {
        self.state
            .borrow()
            .programs
            .get(&program.0)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    unsafe fn delete_program(&self, program: Self::Program) {
        self.record(BackendCall::DeleteProgram(program));
        let mut state = self.state.borrow_mut();
        state.programs.remove(&program.0);
        if state.current == Some(program.0) {
            state.current = None;
        }
    }

    unsafe fn use_program(&self, program: Option<Self::Program>) {
        self.record(BackendCall::UseProgram(program));
        self.state.borrow_mut().current = program.map(|p| p.0);
    }

    unsafe fn active_uniform_names(&self, program: Self::Program) -> Vec<String> {
        self.state
            .borrow()
            .programs
            .get(&program.0)
            .map(|p| p.uniforms.iter().map(|slot| slot.name.clone()).collect())
            .unwrap_or_default()
    }

    unsafe fn get_uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        let state = self.state.borrow();
        let object = state.programs.get(&program.0)?;
        if !object.linked {
            return None;
        }
        object
            .uniforms
            .iter()
            .position(|slot| slot.name == name)
            .map(|index| MockUniformLocation {
                program: program.0,
                index,
            })
    }

    unsafe fn set_uniform(&self, location: Option<&Self::UniformLocation>, value: &UniformValue) {
        self.record(BackendCall::SetUniform(location.copied(), *value));
        let Some(location) = location else {
            return;
        };

        let mut state = self.state.borrow_mut();
        if state.current != Some(location.program) {
            drop(state);
            self.error(format!(
                "GL_INVALID_OPERATION: location belongs to program {} but current program is {:?}",
                location.program,
                self.state.borrow().current
            ));
            return;
        }
        let Some(slot) = state
            .programs
            .get_mut(&location.program)
            .and_then(|p| p.uniforms.get_mut(location.index))
        else {
            return;
        };
        match slot.ty.accept(*value) {
            Some(stored) => slot.value = stored,
            None => {
                let message = format!(
                    "GL_INVALID_OPERATION: cannot write {} to uniform `{}` of type {}",
                    value.kind(),
                    slot.name,
                    slot.ty.name()
                );
                drop(state);
                self.error(message);
            }
        }
    }

    unsafe fn get_uniform_f32(
        &self,
        program: Self::Program,
        location: &Self::UniformLocation,
        out: &mut [f32],
    ) {
        let Some(value) = self.read_slot(program, location, out.len()) else {
            return;
        };
        if let Some(components) = value.float_components() {
            for (dst, src) in out.iter_mut().zip(components) {
                *dst = *src;
            }
        } else if let (Some(v), Some(dst)) = (value.integer(), out.first_mut()) {
            #[allow(clippy::cast_precision_loss)]
            {
                *dst = v as f32;
            }
        }
    }

    unsafe fn get_uniform_i32(
        &self,
        program: Self::Program,
        location: &Self::UniformLocation,
        out: &mut [i32],
    ) {
        let Some(value) = self.read_slot(program, location, out.len()) else {
            return;
        };
        if let Some(v) = value.integer() {
            if let Some(dst) = out.first_mut() {
                *dst = v;
            }
        } else if let Some(components) = value.float_components() {
            for (dst, src) in out.iter_mut().zip(components) {
                #[allow(clippy::cast_possible_truncation)]
                {
                    *dst = *src as i32;
                }
            }
        }
    }
}

/// Remove `//` and `/* */` comments, keeping newlines so line numbers hold.
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut in_block = false;
    while let Some(c) = chars.next() {
        if in_block {
            if c == '*' && chars.peek() == Some(&'/') {
                chars.next();
                in_block = false;
            } else if c == '\n' {
                out.push('\n');
            }
            continue;
        }
        match (c, chars.peek()) {
            ('/', Some('/')) => {
                // Skip to end of line, keep the newline.
                for rest in chars.by_ref() {
                    if rest == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                in_block = true;
            }
            _ => out.push(c),
        }
    }
    out
}

const CONTROL_PREFIXES: &[&str] = &["void", "if", "for", "while", "else", "switch", "}"];

/// Whether `word` can start a function signature or control header.
fn starts_header(word: &str, structs: &[String]) -> bool {
    CONTROL_PREFIXES.contains(&word)
        || GlslType::parse(word).is_some()
        || structs.iter().any(|s| s == word)
}

fn line_is_terminated(line: &str, structs: &[String]) -> bool {
    if line == "else" || line == "do" || line.starts_with("struct ") {
        return true;
    }
    match line.chars().last() {
        Some(';' | '{' | '}' | ',' | '(') => true,
        Some('+' | '-' | '*' | '/' | '=' | '&' | '|' | '?' | ':' | '<' | '>') => true,
        // Function signatures and control headers.
        Some(')') => {
            let first = line
                .split(|c: char| c.is_whitespace() || c == '(')
                .next()
                .unwrap_or_default();
            starts_header(first, structs)
        }
        _ => false,
    }
}

/// Strip a leading `layout(...)` qualifier.
fn strip_layout(statement: &str) -> &str {
    let Some(rest) = statement.strip_prefix("layout") else {
        return statement;
    };
    match rest.find(')') {
        Some(end) => rest[end + 1..].trim_start(),
        None => statement,
    }
}

const INTERPOLATION_QUALIFIERS: &[&str] =
    &["flat", "smooth", "noperspective", "highp", "mediump", "lowp", "centroid"];

/// Parse a global `uniform`/`in`/`out` declaration. `Ok(None)` means the
/// statement is something else.
fn parse_declaration(
    statement: &str,
    line_no: usize,
    structs: &[String],
) -> Result<Option<(&'static str, Vec<Declaration>)>, String> {
    let statement = strip_layout(statement.trim_end_matches(';').trim());
    let mut words = statement.split_whitespace().peekable();
    while words
        .peek()
        .is_some_and(|w| INTERPOLATION_QUALIFIERS.contains(w))
    {
        words.next();
    }
    let storage = match words.next() {
        Some("uniform") => "uniform",
        Some("in" | "attribute") => "in",
        Some("out" | "varying") => "out",
        _ => return Ok(None),
    };
    while words
        .peek()
        .is_some_and(|w| INTERPOLATION_QUALIFIERS.contains(w))
    {
        words.next();
    }
    let Some(type_name) = words.next() else {
        return Err(format!("0:{line_no}: error: syntax error, expected type after `{storage}`"));
    };
    let ty = match GlslType::parse(type_name) {
        Some(ty) => ty,
        None if structs.iter().any(|s| s == type_name) => GlslType::Opaque(type_name.to_owned()),
        None => return Err(format!("0:{line_no}: error: unknown type `{type_name}`")),
    };
    let names: String = words.collect::<Vec<_>>().join(" ");
    let mut declarations = Vec::new();
    for name in names.split(',') {
        // Drop array suffixes and initialisers.
        let name = name
            .split(['[', '='])
            .next()
            .unwrap_or_default()
            .trim();
        if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(format!("0:{line_no}: error: syntax error, expected identifier"));
        }
        declarations.push(Declaration {
            name: name.to_owned(),
            ty: ty.clone(),
        });
    }
    Ok(Some((storage, declarations)))
}

/// Decide whether a stage compiles and collect its global interface.
fn scan_stage(source: &str) -> Result<StageInterface, String> {
    let source = strip_comments(source);
    if source.trim().is_empty() {
        return Err("0:1: error: syntax error, unexpected end of file".into());
    }

    let mut interface = StageInterface::default();
    let mut structs: Vec<String> = Vec::new();
    let mut braces = 0_i32;
    let mut parens = 0_i32;

    for (index, raw) in source.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if braces == 0 {
            if let Some(name) = line.strip_prefix("struct ") {
                let name = name.trim_end_matches('{').trim();
                structs.push(name.to_owned());
            }
        }
        if parens == 0 && !line_is_terminated(line, &structs) {
            return Err(format!(
                "0:{line_no}: error: syntax error, unexpected end of statement, expecting ';'"
            ));
        }
        if braces == 0 && line.ends_with(';') {
            if let Some((storage, declarations)) = parse_declaration(line, line_no, &structs)? {
                let target = match storage {
                    "uniform" => &mut interface.uniforms,
                    "in" => &mut interface.inputs,
                    _ => &mut interface.outputs,
                };
                target.extend(declarations);
            }
        }
        for c in line.chars() {
            match c {
                '{' => braces += 1,
                '}' => braces -= 1,
                '(' => parens += 1,
                ')' => parens -= 1,
                _ => {}
            }
            if braces < 0 || parens < 0 {
                return Err(format!("0:{line_no}: error: syntax error, unexpected '{c}'"));
            }
        }
    }

    if braces != 0 || parens != 0 {
        let line_no = source.lines().count();
        return Err(format!("0:{line_no}: error: syntax error, unexpected end of file"));
    }
    Ok(interface)
}

/// Link attached stages into a uniform table, or explain why not.
fn link_stages(attached: &[&ShaderObject]) -> Result<Vec<UniformSlot>, String> {
    if attached.is_empty() {
        return Err("error: linking with no shaders attached".into());
    }
    if let Some(bad) = attached.iter().find(|s| !s.compiled) {
        return Err(format!(
            "error: linking with uncompiled {} shader",
            bad.stage.to_string().to_lowercase()
        ));
    }
    let find = |stage| attached.iter().find(|s| s.stage == stage);
    let Some(vertex) = find(ShaderStage::Vertex) else {
        return Err("error: program lacks a vertex shader".into());
    };
    let Some(fragment) = find(ShaderStage::Fragment) else {
        return Err("error: program lacks a fragment shader".into());
    };

    let mut problems = Vec::new();
    for input in &fragment.interface.inputs {
        match vertex
            .interface
            .outputs
            .iter()
            .find(|out| out.name == input.name)
        {
            None => problems.push(format!(
                "error: fragment shader input `{}` has no matching output in the vertex shader",
                input.name
            )),
            Some(out) if out.ty != input.ty => problems.push(format!(
                "error: `{}` declared as type {} in vertex shader but type {} in fragment shader",
                input.name,
                out.ty.name(),
                input.ty.name()
            )),
            Some(_) => {}
        }
    }

    let mut uniforms: Vec<UniformSlot> = Vec::new();
    for decl in vertex
        .interface
        .uniforms
        .iter()
        .chain(&fragment.interface.uniforms)
    {
        match uniforms.iter().find(|slot| slot.name == decl.name) {
            Some(slot) if slot.ty != decl.ty => problems.push(format!(
                "error: uniform `{}` declared as type {} and type {}",
                decl.name,
                slot.ty.name(),
                decl.ty.name()
            )),
            Some(_) => {}
            None => uniforms.push(UniformSlot {
                name: decl.name.clone(),
                value: decl.ty.zero(),
                ty: decl.ty.clone(),
            }),
        }
    }

    if problems.is_empty() {
        Ok(uniforms)
    } else {
        Err(problems.join("\n"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const VS: &str = r"#version 330 core
layout (location = 0) in vec3 aPos;
layout (location = 1) in vec3 aColor;

out vec3 ourColor;

uniform mat4 transform;

void main()
{
    gl_Position = transform * vec4(aPos, 1.0);
    ourColor = aColor;
}
";

    const FS: &str = r"#version 330 core
out vec4 FragColor;
in vec3 ourColor;

uniform float alpha; // fade
uniform sampler2D texture1;

void main()
{
    FragColor = vec4(ourColor, alpha);
}
";

    #[test]
    fn scan_collects_global_interface() {
        let vs = scan_stage(VS).unwrap();
        let names = |decls: &[Declaration]| {
            decls.iter().map(|d| d.name.clone()).collect::<Vec<_>>()
        };
        assert_eq!(names(&vs.inputs), ["aPos", "aColor"]);
        assert_eq!(names(&vs.outputs), ["ourColor"]);
        assert_eq!(names(&vs.uniforms), ["transform"]);

        let fs = scan_stage(FS).unwrap();
        assert_eq!(names(&fs.uniforms), ["alpha", "texture1"]);
        assert_eq!(fs.uniforms[1].ty, GlslType::Opaque("sampler2D".into()));
    }

    #[test]
    fn scan_rejects_missing_semicolon_with_line_number() {
        let broken = FS.replace(
            "FragColor = vec4(ourColor, alpha);",
            "FragColor = vec4(ourColor, alpha)",
        );
        let log = scan_stage(&broken).unwrap_err();
        assert!(log.starts_with("0:10: error:"), "{log}");
    }

    #[test]
    fn scan_rejects_unbalanced_braces_and_unknown_types() {
        assert!(scan_stage("#version 330 core\nvoid main()\n{\n").is_err());
        let unknown = "#version 330 core\nuniform colour tint;\nvoid main()\n{\n}\n";
        assert!(scan_stage(unknown).is_err());
        assert!(scan_stage("   \n").is_err());
    }

    #[test]
    fn comments_do_not_affect_scanning() {
        let src = "#version 330 core
/* uniform float hidden;
 */
uniform float shown; // trailing
void main()
{
}
";
        let interface = scan_stage(src).unwrap();
        assert_eq!(interface.uniforms.len(), 1);
        assert_eq!(interface.uniforms[0].name, "shown");
    }

    #[test]
    fn locals_inside_functions_are_not_interface() {
        let src = "#version 330 core
out vec4 FragColor;
void main()
{
    vec4 tint = vec4(1.0);
    FragColor = tint;
}
";
        let interface = scan_stage(src).unwrap();
        assert_eq!(interface.outputs.len(), 1);
        assert!(interface.uniforms.is_empty());
    }

    #[test]
    fn integer_vector_functions_and_struct_uniforms_compile() {
        let src = r"#version 330 core
out vec4 FragColor;

struct Light
{
    vec3 color;
    float strength;
};

uniform Light light;
uniform ivec2 tile;

ivec2 wrap(ivec2 p)
{
    return p % tile;
}

Light dimmed(Light l)
{
    return l;
}

void main()
{
    FragColor = vec4(light.color * light.strength, 1.0);
}
";
        let interface = scan_stage(src).unwrap();
        assert_eq!(interface.uniforms.len(), 2);
        assert_eq!(interface.uniforms[0].ty, GlslType::Opaque("Light".into()));
        assert_eq!(interface.uniforms[1].ty.component_count(), 2);
    }

    fn link(gl: &MockBackend, vs: &str, fs: &str) -> MockProgram {
        unsafe {
            let program = gl.create_program().unwrap();
            for (stage, source) in [(ShaderStage::Vertex, vs), (ShaderStage::Fragment, fs)] {
                let shader = gl.create_shader(stage).unwrap();
                gl.shader_source(shader, source);
                gl.compile_shader(shader);
                gl.attach_shader(program, shader);
            }
            gl.link_program(program);
            assert!(gl.get_program_link_status(program));
            program
        }
    }

    #[test]
    fn read_back_into_a_short_buffer_is_rejected() {
        let gl = MockBackend::new();
        let program = link(&gl, VS, FS);
        unsafe {
            let transform = gl.get_uniform_location(program, "transform").unwrap();

            let mut one = [7_i32; 1];
            gl.get_uniform_i32(program, &transform, &mut one);
            assert_eq!(one, [7]);
            assert_eq!(gl.errors().len(), 1);
            assert!(gl.errors()[0].contains("transform"), "{:?}", gl.errors());

            let mut four = [0.0_f32; 4];
            gl.get_uniform_f32(program, &transform, &mut four);
            assert_eq!(gl.errors().len(), 2);

            let mut full = [1.0_f32; 16];
            gl.get_uniform_f32(program, &transform, &mut full);
            assert_eq!(full, [0.0; 16]);
            assert_eq!(gl.errors().len(), 2);
        }
    }

    #[test]
    fn clear_calls_forgets_history_but_not_objects() {
        let gl = MockBackend::new();
        let program = link(&gl, VS, FS);
        assert!(!gl.calls().is_empty());

        gl.clear_calls();
        assert!(gl.calls().is_empty());
        assert_eq!(gl.live_programs(), 1);

        unsafe { gl.use_program(Some(program)) };
        assert_eq!(gl.calls(), [BackendCall::UseProgram(Some(program))]);
    }

    #[test]
    fn uniform_write_requires_current_program_and_matching_type() {
        let gl = MockBackend::new();
        unsafe {
            let vs = gl.create_shader(ShaderStage::Vertex).unwrap();
            gl.shader_source(vs, VS);
            gl.compile_shader(vs);
            assert_eq!(gl.shader_source_text(vs).as_deref(), Some(VS));
            let fs = gl.create_shader(ShaderStage::Fragment).unwrap();
            gl.shader_source(fs, FS);
            gl.compile_shader(fs);
            let program = gl.create_program().unwrap();
            gl.attach_shader(program, vs);
            gl.attach_shader(program, fs);
            gl.link_program(program);
            assert!(gl.get_program_link_status(program));

            let alpha = gl.get_uniform_location(program, "alpha");
            assert!(alpha.is_some());

            // Not current yet: rejected.
            gl.set_uniform(alpha.as_ref(), &UniformValue::Float(0.5));
            assert_eq!(gl.errors().len(), 1);
            assert_eq!(gl.uniform_value(program, "alpha"), Some(UniformValue::Float(0.0)));

            gl.use_program(Some(program));
            gl.set_uniform(alpha.as_ref(), &UniformValue::Float(0.5));
            assert_eq!(gl.uniform_value(program, "alpha"), Some(UniformValue::Float(0.5)));

            // Wrong shape: rejected, value untouched.
            gl.set_uniform(alpha.as_ref(), &UniformValue::Int(2));
            assert_eq!(gl.errors().len(), 2);
            assert_eq!(gl.uniform_value(program, "alpha"), Some(UniformValue::Float(0.5)));

            // Samplers take texture units.
            let unit = gl.get_uniform_location(program, "texture1");
            gl.set_uniform(unit.as_ref(), &UniformValue::Int(1));
            assert_eq!(gl.uniform_value(program, "texture1"), Some(UniformValue::Int(1)));
            assert_eq!(gl.errors().len(), 2);
        }
    }

    #[test]
    fn deleting_current_program_unbinds_it() {
        let gl = MockBackend::new();
        unsafe {
            let program = gl.create_program().unwrap();
            gl.use_program(Some(program));
            assert_eq!(gl.current_program(), Some(program));
            gl.delete_program(program);
        }
        assert_eq!(gl.current_program(), None);
        assert_eq!(gl.live_programs(), 0);
    }
}
