// Copyright (c) 2026 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Configures how primitives should be converted into collections of fragments.

use crate::{chain::find_struct, macros::vulkan_enum, DynamicState, DynamicStates};
use ash::vk;
use std::ffi::c_void;

/// The state in a graphics pipeline describing how the rasterization stage should behave.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RasterizationState {
    /// If true, all the fragments will be discarded, and the fragment shader will not be run.
    ///
    /// The default value is `false`.
    pub rasterizer_discard_enable: bool,

    /// If true, then the depth value of the vertices will be clamped to the viewport's depth
    /// range.
    ///
    /// The default value is `false`.
    pub depth_clamp_enable: bool,

    /// Whether fragments outside of the depth range are clipped. Use
    /// [`depth_clip_enable`](Self::depth_clip_enable()) to get the effective value.
    ///
    /// The default value is [`DepthClipEnable::True`], or [`DepthClipEnable::NotClamp`] if depth
    /// clamping is dynamic.
    pub depth_clip_enable: DepthClipEnable,

    /// The default value is [`PolygonMode::Fill`].
    pub polygon_mode: PolygonMode,

    /// Specifies whether front faces or back faces should be discarded, or none, or both.
    ///
    /// The default value is [`CullMode::None`].
    pub cull_mode: CullMode,

    /// Specifies which triangle orientation is considered to be the front of the triangle.
    ///
    /// The default value is [`FrontFace::CounterClockwise`].
    pub front_face: FrontFace,

    /// The conservative rasterization mode.
    ///
    /// The default value is [`ConservativeRasterizationMode::Disabled`].
    pub conservative_mode: ConservativeRasterizationMode,

    /// The extra size in pixels to increase the generating primitive during conservative
    /// overestimation.
    ///
    /// The default value is `0.0`.
    pub extra_primitive_overestimation_size: f32,

    /// The default value is [`RasterizationOrder::Strict`].
    pub rasterization_order_amd: RasterizationOrder,

    /// The vertex used as the source of flat-shaded varyings.
    ///
    /// The default value is [`ProvokingVertexMode::FirstVertex`].
    pub provoking_vertex: ProvokingVertexMode,

    /// The vertex stream that is rasterized.
    ///
    /// The default value is `0`.
    pub rasterization_stream: u32,

    pub depth_bias: DepthBiasState,

    pub line: LineState,
}

impl Default for RasterizationState {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl RasterizationState {
    /// Returns a `RasterizationState` with default values.
    #[inline]
    pub const fn new() -> Self {
        Self {
            rasterizer_discard_enable: false,
            depth_clamp_enable: false,
            depth_clip_enable: DepthClipEnable::True,
            polygon_mode: PolygonMode::Fill,
            cull_mode: CullMode::None,
            front_face: FrontFace::CounterClockwise,
            conservative_mode: ConservativeRasterizationMode::Disabled,
            extra_primitive_overestimation_size: 0.0,
            rasterization_order_amd: RasterizationOrder::Strict,
            provoking_vertex: ProvokingVertexMode::FirstVertex,
            rasterization_stream: 0,
            depth_bias: DepthBiasState::new(),
            line: LineState::new(),
        }
    }

    /// Builds the state from `info`.
    ///
    /// # Safety
    ///
    /// - `info` must be a valid `VkPipelineRasterizationStateCreateInfo`, including its `pNext`
    ///   chain.
    pub unsafe fn from_vk(
        dynamic: DynamicStates,
        info: Option<&vk::PipelineRasterizationStateCreateInfo<'_>>,
    ) -> Self {
        let mut state = Self::new();

        if dynamic.contains(DynamicState::RsDepthClampEnable) {
            state.depth_clip_enable = DepthClipEnable::NotClamp;
        }

        let Some(info) = info else {
            return state;
        };

        if !dynamic.contains(DynamicState::RsRasterizerDiscardEnable) {
            state.rasterizer_discard_enable = info.rasterizer_discard_enable != vk::FALSE;
        }

        // Without an explicit depth clip struct, clipping is disabled exactly when clamping is
        // enabled.
        if !dynamic.contains(DynamicState::RsDepthClampEnable) {
            state.depth_clamp_enable = info.depth_clamp_enable != vk::FALSE;
            state.depth_clip_enable = if state.depth_clamp_enable {
                DepthClipEnable::False
            } else {
                DepthClipEnable::True
            };
        }

        if !dynamic.contains(DynamicState::RsPolygonMode) {
            state.polygon_mode = PolygonMode::from_vk(info.polygon_mode);
        }

        if !dynamic.contains(DynamicState::RsCullMode) {
            state.cull_mode = CullMode::from_vk(info.cull_mode);
        }

        if !dynamic.contains(DynamicState::RsFrontFace) {
            state.front_face = FrontFace::from_vk(info.front_face);
        }

        if !dynamic.contains(DynamicState::RsDepthBiasEnable) {
            state.depth_bias.enable = info.depth_bias_enable != vk::FALSE;
        }

        if (state.depth_bias.enable || dynamic.contains(DynamicState::RsDepthBiasEnable))
            && !dynamic.contains(DynamicState::RsDepthBiasFactors)
        {
            state.depth_bias.constant_factor = info.depth_bias_constant_factor;
            state.depth_bias.clamp = info.depth_bias_clamp;
            state.depth_bias.slope_factor = info.depth_bias_slope_factor;
        }

        if !dynamic.contains(DynamicState::RsLineWidth) {
            state.line.width = info.line_width;
        }

        unsafe { state.read_extensions(dynamic, info.p_next) };

        state
    }

    unsafe fn read_extensions(&mut self, dynamic: DynamicStates, p_next: *const c_void) {
        let depth_clip_info: Option<&vk::PipelineRasterizationDepthClipStateCreateInfoEXT<'_>> =
            unsafe { find_struct(p_next) };

        if let Some(depth_clip_info) = depth_clip_info {
            if !dynamic.contains(DynamicState::RsDepthClipEnable) {
                self.depth_clip_enable = if depth_clip_info.depth_clip_enable != vk::FALSE {
                    DepthClipEnable::True
                } else {
                    DepthClipEnable::False
                };
            }
        }

        let conservative_info: Option<
            &vk::PipelineRasterizationConservativeStateCreateInfoEXT<'_>,
        > = unsafe { find_struct(p_next) };

        if let Some(conservative_info) = conservative_info {
            if !dynamic.contains(DynamicState::RsConservativeMode) {
                self.conservative_mode = ConservativeRasterizationMode::from_vk(
                    conservative_info.conservative_rasterization_mode,
                );
            }

            if !dynamic.contains(DynamicState::RsExtraPrimitiveOverestimationSize) {
                self.extra_primitive_overestimation_size =
                    conservative_info.extra_primitive_overestimation_size;
            }
        }

        let order_info: Option<&vk::PipelineRasterizationStateRasterizationOrderAMD<'_>> =
            unsafe { find_struct(p_next) };

        if let Some(order_info) = order_info {
            self.rasterization_order_amd = RasterizationOrder::from_vk(order_info.rasterization_order);
        }

        let provoking_vertex_info: Option<
            &vk::PipelineRasterizationProvokingVertexStateCreateInfoEXT<'_>,
        > = unsafe { find_struct(p_next) };

        if let Some(provoking_vertex_info) = provoking_vertex_info {
            if !dynamic.contains(DynamicState::RsProvokingVertex) {
                self.provoking_vertex =
                    ProvokingVertexMode::from_vk(provoking_vertex_info.provoking_vertex_mode);
            }
        }

        let stream_info: Option<&vk::PipelineRasterizationStateStreamCreateInfoEXT<'_>> =
            unsafe { find_struct(p_next) };

        if let Some(stream_info) = stream_info {
            if !dynamic.contains(DynamicState::RsRasterizationStream) {
                self.rasterization_stream = stream_info.rasterization_stream;
            }
        }

        let line_info: Option<&vk::PipelineRasterizationLineStateCreateInfoKHR<'_>> =
            unsafe { find_struct(p_next) };

        if let Some(line_info) = line_info {
            if !dynamic.contains(DynamicState::RsLineMode) {
                self.line.mode = LineRasterizationMode::from_vk(line_info.line_rasterization_mode);
            }

            if !dynamic.contains(DynamicState::RsLineStippleEnable) {
                self.line.stipple.enable = line_info.stippled_line_enable != vk::FALSE;
            }

            if (self.line.stipple.enable || dynamic.contains(DynamicState::RsLineStippleEnable))
                && !dynamic.contains(DynamicState::RsLineStipple)
            {
                self.line.stipple.factor = line_info.line_stipple_factor;
                self.line.stipple.pattern = line_info.line_stipple_pattern;
            }
        }
    }

    /// Returns whether depth clipping is effectively enabled.
    #[inline]
    pub const fn depth_clip_enable(&self) -> bool {
        match self.depth_clip_enable {
            DepthClipEnable::False => false,
            DepthClipEnable::True => true,
            DepthClipEnable::NotClamp => !self.depth_clamp_enable,
        }
    }
}

/// Whether depth clipping is enabled, possibly as a consequence of depth clamping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DepthClipEnable {
    /// Depth clipping is disabled.
    False,

    /// Depth clipping is enabled.
    #[default]
    True,

    /// Depth clipping is enabled when depth clamping is disabled, and the other way around.
    NotClamp,
}

/// The values to use for depth biasing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepthBiasState {
    /// Whether depth biasing is enabled.
    ///
    /// The default value is `false`.
    pub enable: bool,

    /// Specifies a constant factor to be multiplied to every depth value.
    ///
    /// The default value is `0.0`.
    pub constant_factor: f32,

    /// The maximum (or minimum) depth bias of a fragment.
    ///
    /// The default value is `0.0`.
    pub clamp: f32,

    /// A scalar factor to multiply with a fragment's slope in depth bias calculations.
    ///
    /// The default value is `0.0`.
    pub slope_factor: f32,
}

impl Default for DepthBiasState {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl DepthBiasState {
    /// Returns a default `DepthBiasState`.
    #[inline]
    pub const fn new() -> Self {
        Self {
            enable: false,
            constant_factor: 0.0,
            clamp: 0.0,
            slope_factor: 0.0,
        }
    }
}

/// How lines are rasterized.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineState {
    /// Width, in pixels, of lines when drawing lines.
    ///
    /// The default value is `1.0`.
    pub width: f32,

    /// The default value is [`LineRasterizationMode::Default`].
    pub mode: LineRasterizationMode,

    pub stipple: LineStipple,
}

impl Default for LineState {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl LineState {
    /// Returns a default `LineState`.
    #[inline]
    pub const fn new() -> Self {
        Self {
            width: 1.0,
            mode: LineRasterizationMode::Default,
            stipple: LineStipple::new(),
        }
    }
}

/// The parameters of a stippled line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineStipple {
    /// Whether line stippling is enabled.
    ///
    /// The default value is `false`.
    pub enable: bool,

    /// The repeat factor used in stippled line rasterization.
    ///
    /// The default value is `0`.
    pub factor: u32,

    /// The bit pattern used in stippled line rasterization.
    ///
    /// The default value is `0`.
    pub pattern: u16,
}

impl LineStipple {
    /// Returns a default `LineStipple`.
    #[inline]
    pub const fn new() -> Self {
        Self {
            enable: false,
            factor: 0,
            pattern: 0,
        }
    }
}

vulkan_enum! {
    /// Specifies the culling mode.
    ///
    /// This setting works in pair with `front_face`. The `front_face` setting tells the GPU whether
    /// clockwise or counter-clockwise correspond to the front and the back of each triangle. Then
    /// `cull_mode` lets you specify whether front faces should be discarded, back faces should be
    /// discarded, or none, or both.
    CullMode = CullModeFlags(u32);

    /// No culling.
    None = NONE,

    /// The faces facing the front of the screen (ie. facing the user) will be removed.
    Front = FRONT,

    /// The faces facing the back of the screen will be removed.
    Back = BACK,

    /// All faces will be removed.
    FrontAndBack = FRONT_AND_BACK,
}

impl Default for CullMode {
    #[inline]
    fn default() -> CullMode {
        CullMode::None
    }
}

vulkan_enum! {
    /// Specifies which triangle orientation corresponds to the front or the triangle.
    FrontFace = FrontFace(i32);

    /// Triangles whose vertices are oriented counter-clockwise on the screen will be considered
    /// as facing their front. Otherwise they will be considered as facing their back.
    CounterClockwise = COUNTER_CLOCKWISE,

    /// Triangles whose vertices are oriented clockwise on the screen will be considered
    /// as facing their front. Otherwise they will be considered as facing their back.
    Clockwise = CLOCKWISE,
}

impl Default for FrontFace {
    #[inline]
    fn default() -> FrontFace {
        FrontFace::CounterClockwise
    }
}

vulkan_enum! {
    /// How polygons are turned into fragments.
    PolygonMode = PolygonMode(i32);

    /// The interior of the polygon is filled.
    Fill = FILL,

    /// Only the edges of the polygon are drawn, as lines.
    Line = LINE,

    /// Only the vertices of the polygon are drawn, as points.
    Point = POINT,

    /// The whole bounding rectangle of the polygon is filled.
    FillRectangle = FILL_RECTANGLE_NV,
}

impl Default for PolygonMode {
    #[inline]
    fn default() -> PolygonMode {
        PolygonMode::Fill
    }
}

vulkan_enum! {
    /// The rasterization mode to use for lines.
    LineRasterizationMode = LineRasterizationModeEXT(i32);

    /// Either `Rectangular` or parallelograms, depending on the implementation.
    Default = DEFAULT,

    /// Lines are drawn as if they were rectangles extruded from the line.
    Rectangular = RECTANGULAR,

    /// Lines are drawn by determining which pixel diamonds the line intersects and exits.
    Bresenham = BRESENHAM,

    /// As `Rectangular`, but with alpha falloff.
    RectangularSmooth = RECTANGULAR_SMOOTH,
}

impl Default for LineRasterizationMode {
    #[inline]
    fn default() -> Self {
        Self::Default
    }
}

vulkan_enum! {
    /// Describes how fragments will be generated based on how much is covered by a primitive.
    ConservativeRasterizationMode = ConservativeRasterizationModeEXT(i32);

    /// Conservative rasterization is disabled and rasterization proceeds as normal.
    Disabled = DISABLED,

    /// Fragments will be generated if any part of a primitive touches a pixel.
    Overestimate = OVERESTIMATE,

    /// Fragments will be generated only if a primitive completely covers a pixel.
    Underestimate = UNDERESTIMATE,
}

impl Default for ConservativeRasterizationMode {
    #[inline]
    fn default() -> ConservativeRasterizationMode {
        ConservativeRasterizationMode::Disabled
    }
}

vulkan_enum! {
    /// The order in which primitives are rasterized.
    RasterizationOrder = RasterizationOrderAMD(i32);

    /// Primitives are rasterized in API order.
    Strict = STRICT,

    /// Primitives may be rasterized out of order.
    Relaxed = RELAXED,
}

impl Default for RasterizationOrder {
    #[inline]
    fn default() -> Self {
        Self::Strict
    }
}

vulkan_enum! {
    /// Which vertex of a primitive provides the values of flat-shaded varyings.
    ProvokingVertexMode = ProvokingVertexModeEXT(i32);

    /// The first vertex of the primitive.
    FirstVertex = FIRST_VERTEX,

    /// The last vertex of the primitive.
    LastVertex = LAST_VERTEX,
}

impl Default for ProvokingVertexMode {
    #[inline]
    fn default() -> Self {
        Self::FirstVertex
    }
}
