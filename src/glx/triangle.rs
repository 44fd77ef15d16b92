// Copyright 2020 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! The fixed triangle pipeline.

use std::ffi::CString;
use std::mem;
use std::ptr;

use anyhow::{Context, Error};
use gl::types::{GLchar, GLenum, GLint, GLsizei, GLsizeiptr, GLuint};
use tracing::info;

use super::context::GlxContext;
use crate::backend::x11::{VisualInfo, XlibDisplay};
use crate::config::{pixel_to_rgba, WindowConfig};
use crate::error::Error as SessionError;
use crate::session::{FrameHandler, MappedWindow};

/// Passes positions through untouched.
pub const VERTEX_SHADER: &str = "#version 330 core
layout (location = 0) in vec3 aPos;
void main()
{
    gl_Position = vec4(aPos.x, aPos.y, aPos.z, 1.0);
}
";

/// Three vertices, `x, y, z` each, in normalized device coordinates.
pub const TRIANGLE: [f32; 9] = [
    -0.5, -0.5, 0.0, //
    0.5, -0.5, 0.0, //
    0.0, 0.5, 0.0,
];

/// A fragment shader that paints everything in `color`.
pub fn fragment_shader(color: [f32; 4]) -> String {
    let [r, g, b, a] = color;
    format!(
        "#version 330 core
out vec4 FragColor;
void main()
{{
    FragColor = vec4({r:?}, {g:?}, {b:?}, {a:?});
}}
"
    )
}

/// Compiled program plus the buffers holding [`TRIANGLE`]. Needs a current context.
struct Pipeline {
    program: GLuint,
    vao: GLuint,
    vbo: GLuint,
}

impl Pipeline {
    fn new(fragment_source: &str) -> Result<Pipeline, SessionError> {
        let vertex = compile(gl::VERTEX_SHADER, VERTEX_SHADER)?;
        let fragment = match compile(gl::FRAGMENT_SHADER, fragment_source) {
            Ok(fragment) => fragment,
            Err(e) => {
                unsafe { gl::DeleteShader(vertex) };
                return Err(e);
            }
        };
        let program = link(vertex, fragment);
        // The program keeps what it needs.
        unsafe {
            gl::DeleteShader(vertex);
            gl::DeleteShader(fragment);
        }
        let program = program?;

        let (mut vao, mut vbo) = (0, 0);
        unsafe {
            gl::GenVertexArrays(1, &mut vao);
            gl::GenBuffers(1, &mut vbo);

            gl::BindVertexArray(vao);
            gl::BindBuffer(gl::ARRAY_BUFFER, vbo);
            gl::BufferData(
                gl::ARRAY_BUFFER,
                mem::size_of_val(&TRIANGLE) as GLsizeiptr,
                TRIANGLE.as_ptr().cast(),
                gl::STATIC_DRAW,
            );
            gl::VertexAttribPointer(
                0,
                3,
                gl::FLOAT,
                gl::FALSE,
                (3 * mem::size_of::<f32>()) as GLsizei,
                ptr::null(),
            );
            gl::EnableVertexAttribArray(0);

            gl::BindBuffer(gl::ARRAY_BUFFER, 0);
            gl::BindVertexArray(0);
        }
        Ok(Pipeline { program, vao, vbo })
    }

    fn draw(&self) {
        unsafe {
            gl::UseProgram(self.program);
            gl::BindVertexArray(self.vao);
            gl::DrawArrays(gl::TRIANGLES, 0, 3);
        }
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteVertexArrays(1, &self.vao);
            gl::DeleteBuffers(1, &self.vbo);
            gl::DeleteProgram(self.program);
        }
    }
}

fn compile(kind: GLenum, source: &str) -> Result<GLuint, SessionError> {
    let source = CString::new(source)
        .map_err(|_| SessionError::Shader("shader source contains a NUL byte".into()))?;
    unsafe {
        let shader = gl::CreateShader(kind);
        gl::ShaderSource(shader, 1, &source.as_ptr(), ptr::null());
        gl::CompileShader(shader);
        let mut status = GLint::from(gl::FALSE);
        gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status);
        if status != GLint::from(gl::TRUE) {
            let mut len = 0;
            gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len);
            let log = info_log(len, |cap, buf| {
                gl::GetShaderInfoLog(shader, cap, ptr::null_mut(), buf)
            });
            gl::DeleteShader(shader);
            return Err(SessionError::Shader(log));
        }
        Ok(shader)
    }
}

fn link(vertex: GLuint, fragment: GLuint) -> Result<GLuint, SessionError> {
    unsafe {
        let program = gl::CreateProgram();
        gl::AttachShader(program, vertex);
        gl::AttachShader(program, fragment);
        gl::LinkProgram(program);
        let mut status = GLint::from(gl::FALSE);
        gl::GetProgramiv(program, gl::LINK_STATUS, &mut status);
        if status != GLint::from(gl::TRUE) {
            let mut len = 0;
            gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
            let log = info_log(len, |cap, buf| {
                gl::GetProgramInfoLog(program, cap, ptr::null_mut(), buf)
            });
            gl::DeleteProgram(program);
            return Err(SessionError::Shader(log));
        }
        Ok(program)
    }
}

fn info_log(len: GLint, read: impl FnOnce(GLsizei, *mut GLchar)) -> String {
    let mut buf = vec![0u8; usize::try_from(len).unwrap_or(0).max(1)];
    read(buf.len() as GLsizei, buf.as_mut_ptr().cast());
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).trim_end().to_owned()
}

/// Clears the window and draws [`TRIANGLE`] every frame.
pub struct TriangleRenderer<'d> {
    // Fields drop in order; the pipeline needs the context to still be current.
    pipeline: Pipeline,
    clear_color: [f32; 4],
    context: GlxContext<'d>,
}

impl<'d> TriangleRenderer<'d> {
    /// Creates a context on `window` and builds the pipeline in it.
    ///
    /// The triangle takes the configured foreground color, the background clears to the
    /// configured background color.
    pub fn new(
        display: &'d XlibDisplay,
        visual: &VisualInfo<'d>,
        window: MappedWindow,
        config: &WindowConfig,
    ) -> Result<TriangleRenderer<'d>, Error> {
        let context =
            GlxContext::new(display, visual, window).context("create GLX context")?;
        let version = context.load_gl().context("load GL")?;
        info!("Loaded GL {}.{}", version.major, version.minor);

        unsafe {
            gl::Viewport(
                0,
                0,
                GLsizei::from(window.width()),
                GLsizei::from(window.height()),
            )
        };
        let pipeline = Pipeline::new(&fragment_shader(pixel_to_rgba(config.foreground_pixel())))
            .context("build triangle pipeline")?;
        Ok(TriangleRenderer {
            pipeline,
            clear_color: pixel_to_rgba(config.background_pixel()),
            context,
        })
    }
}

impl FrameHandler for TriangleRenderer<'_> {
    fn render(&mut self) -> Result<(), Error> {
        let [r, g, b, a] = self.clear_color;
        unsafe {
            gl::ClearColor(r, g, b, a);
            gl::Clear(gl::COLOR_BUFFER_BIT);
        }
        self.pipeline.draw();
        self.context.swap_buffers();
        Ok(())
    }
}
