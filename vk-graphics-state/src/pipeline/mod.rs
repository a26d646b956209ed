// Copyright (c) 2026 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Pipeline-level flags that decide which parts of the graphics state a pipeline provides.
//!
//! The state itself lives in the [`graphics`] module.

use crate::macros::vulkan_bitflags;

pub mod graphics;

vulkan_bitflags! {
    /// A set of shader stages.
    ShaderStages = ShaderStageFlags(u32);

    /// The vertex stage.
    VERTEX = VERTEX,

    /// The tessellation control stage.
    TESSELLATION_CONTROL = TESSELLATION_CONTROL,

    /// The tessellation evaluation stage.
    TESSELLATION_EVALUATION = TESSELLATION_EVALUATION,

    /// The geometry stage.
    GEOMETRY = GEOMETRY,

    /// The fragment stage.
    FRAGMENT = FRAGMENT,

    /// The task stage.
    TASK = TASK_EXT,

    /// The mesh stage.
    MESH = MESH_EXT,
}

impl ShaderStages {
    /// The stages that belong to the pre-rasterization part of a graphics pipeline.
    pub const PRE_RASTERIZATION: Self = Self(
        Self::VERTEX.0
            | Self::TESSELLATION_CONTROL.0
            | Self::TESSELLATION_EVALUATION.0
            | Self::GEOMETRY.0
            | Self::TASK.0
            | Self::MESH.0,
    );
}

vulkan_bitflags! {
    /// The parts of a graphics pipeline that a pipeline library provides.
    GraphicsPipelineLibraryFlags = GraphicsPipelineLibraryFlagsEXT(u32);

    /// Vertex input state and input assembly state.
    VERTEX_INPUT_INTERFACE = VERTEX_INPUT_INTERFACE,

    /// The pre-rasterization shaders and their fixed-function state.
    PRE_RASTERIZATION_SHADERS = PRE_RASTERIZATION_SHADERS,

    /// The fragment shader and the state it depends on.
    FRAGMENT_SHADER = FRAGMENT_SHADER,

    /// Color blending and the attachment formats.
    FRAGMENT_OUTPUT_INTERFACE = FRAGMENT_OUTPUT_INTERFACE,
}

vulkan_bitflags! {
    /// The pipeline creation flags that graphics state depends on.
    PipelineCreateFlags = PipelineCreateFlags(u32);

    /// The pipeline is a library.
    LIBRARY = LIBRARY_KHR,

    /// Color attachments may be read while being written.
    COLOR_ATTACHMENT_FEEDBACK_LOOP = COLOR_ATTACHMENT_FEEDBACK_LOOP_EXT,

    /// Depth/stencil attachments may be read while being written.
    DEPTH_STENCIL_ATTACHMENT_FEEDBACK_LOOP = DEPTH_STENCIL_ATTACHMENT_FEEDBACK_LOOP_EXT,
}

impl PipelineCreateFlags {
    /// The flags that declare attachment feedback loops.
    pub const FEEDBACK_LOOPS: Self = Self(
        Self::COLOR_ATTACHMENT_FEEDBACK_LOOP.0 | Self::DEPTH_STENCIL_ATTACHMENT_FEEDBACK_LOOP.0,
    );
}
