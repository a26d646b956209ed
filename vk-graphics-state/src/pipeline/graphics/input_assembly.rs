// Copyright (c) 2026 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Configures how input vertices are assembled into primitives.

use crate::{macros::vulkan_enum, DynamicState, DynamicStates};
use ash::vk;

/// The state in a graphics pipeline describing how the input assembly stage should behave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InputAssemblyState {
    /// The type of primitives.
    ///
    /// This is read even when [`DynamicState::IaPrimitiveTopology`] is dynamic, because the
    /// topology class of the pipeline is still fixed in that case.
    ///
    /// The default value is [`PrimitiveTopology::PointList`].
    pub primitive_topology: PrimitiveTopology,

    /// If true, then when drawing with an index buffer, the special index value consisting of the
    /// maximum unsigned value (`0xff`, `0xffff`, `0xffffffff`) will tell the GPU that it is the
    /// end of the current primitive. A new primitive will restart at the next index.
    ///
    /// The default value is `false`.
    pub primitive_restart_enable: bool,
}

impl Default for InputAssemblyState {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl InputAssemblyState {
    /// Returns an `InputAssemblyState` with default values.
    #[inline]
    pub const fn new() -> Self {
        Self {
            primitive_topology: PrimitiveTopology::PointList,
            primitive_restart_enable: false,
        }
    }

    /// Builds the state from `info`.
    pub fn from_vk(
        dynamic: DynamicStates,
        info: Option<&vk::PipelineInputAssemblyStateCreateInfo<'_>>,
    ) -> Self {
        let mut state = Self::new();

        let Some(info) = info else {
            return state;
        };

        state.primitive_topology = PrimitiveTopology::from_vk(info.topology);

        if !dynamic.contains(DynamicState::IaPrimitiveRestartEnable) {
            state.primitive_restart_enable = info.primitive_restart_enable != vk::FALSE;
        }

        state
    }
}

vulkan_enum! {
    /// Describes how vertices must be grouped together to form primitives.
    PrimitiveTopology = PrimitiveTopology(i32);

    /// A series of separate point primitives.
    PointList = POINT_LIST,

    /// A series of separate line primitives.
    LineList = LINE_LIST,

    /// A series of consecutive line primitives, with consecutive lines sharing a vertex.
    LineStrip = LINE_STRIP,

    /// A series of separate triangle primitives.
    TriangleList = TRIANGLE_LIST,

    /// A series of consecutive triangle primitives, with consecutive triangles sharing an edge
    /// (two vertices).
    TriangleStrip = TRIANGLE_STRIP,

    /// A series of consecutive triangle primitives, with all triangles sharing a common vertex
    /// (the first).
    TriangleFan = TRIANGLE_FAN,

    /// As `LineList`, but with adjacency, used in combination with geometry shaders.
    LineListWithAdjacency = LINE_LIST_WITH_ADJACENCY,

    /// As `LineStrip`, but with adjacency, used in combination with geometry shaders.
    LineStripWithAdjacency = LINE_STRIP_WITH_ADJACENCY,

    /// As `TriangleList`, but with adjacency, used in combination with geometry shaders.
    TriangleListWithAdjacency = TRIANGLE_LIST_WITH_ADJACENCY,

    /// As `TriangleStrip`, but with adjacency, used in combination with geometry shaders.
    TriangleStripWithAdjacency = TRIANGLE_STRIP_WITH_ADJACENCY,

    /// Separate patch primitives, used in combination with tessellation shaders.
    PatchList = PATCH_LIST,
}

impl Default for PrimitiveTopology {
    #[inline]
    fn default() -> Self {
        PrimitiveTopology::PointList
    }
}

impl PrimitiveTopology {
    /// Returns the topology class that `self` belongs to. Pipelines with a dynamic topology can
    /// only switch between topologies of the same class.
    pub const fn class(self) -> PrimitiveTopologyClass {
        match self {
            Self::PointList => PrimitiveTopologyClass::Point,
            Self::LineList
            | Self::LineStrip
            | Self::LineListWithAdjacency
            | Self::LineStripWithAdjacency => PrimitiveTopologyClass::Line,
            Self::TriangleList
            | Self::TriangleStrip
            | Self::TriangleFan
            | Self::TriangleListWithAdjacency
            | Self::TriangleStripWithAdjacency => PrimitiveTopologyClass::Triangle,
            Self::PatchList => PrimitiveTopologyClass::Patch,
        }
    }
}

/// Describes the shape of a primitive topology.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveTopologyClass {
    Point,
    Line,
    Triangle,
    Patch,
}
