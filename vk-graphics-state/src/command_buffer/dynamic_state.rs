// Copyright (c) 2026 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

use super::{installed, DynamicGraphicsState};
use crate::{
    image::{ImageAspects, SampleCount},
    pipeline::graphics::{
        color_blend::{BlendFactor, BlendOp, ColorComponents, LogicOp},
        depth_stencil::{CompareOp, StencilFaces, StencilOp, StencilOps},
        discard_rectangle::DiscardRectangleMode,
        fragment_shading_rate::FragmentShadingRateCombinerOp,
        input_assembly::PrimitiveTopology,
        multisample::SampleLocationsState,
        rasterization::{
            ConservativeRasterizationMode, CullMode, DepthClipEnable, FrontFace,
            LineRasterizationMode, PolygonMode, ProvokingVertexMode,
        },
        tessellation::TessellationDomainOrigin,
        vertex_input::{VertexInputAttribute, VertexInputBinding, VertexInputRate, VertexInputState},
        viewport::{Scissor, Viewport},
    },
    DynamicState, MAX_COLOR_ATTACHMENTS, MAX_DISCARD_RECTANGLES, MAX_SCISSORS,
    MAX_VERTEX_ATTRIBUTES, MAX_VERTEX_BINDINGS, MAX_VERTEX_BINDING_STRIDE, MAX_VIEWPORTS,
};
use ash::vk;

/// Applies `set_dyn_value!` to `$field` of each stencil face in `$faces`.
macro_rules! set_stencil_faces {
    ($self:ident, $faces:expr, $state:ident, $field:ident, $value:expr) => {{
        let faces = $faces;
        let value = $value;

        if faces.intersects(StencilFaces::FRONT) {
            set_dyn_value!($self, $state, $self.ds.stencil.front.$field, value);
        }

        if faces.intersects(StencilFaces::BACK) {
            set_dyn_value!($self, $state, $self.ds.stencil.back.$field, value);
        }
    }};
}

/// # Commands to set dynamic state.
///
/// There is one method for each `vkCmdSet*` command. Each of them stores the new values, and
/// marks the states they belong to as set. A state is also marked as dirty if it was not set
/// before, or if one of its values actually changed.
///
/// The arguments are expected to have passed Vulkan validation already. Out of range arguments
/// cause a panic.
impl DynamicGraphicsState {
    /// Sets the complete vertex input state, as `vkCmdSetVertexInputEXT` does.
    ///
    /// # Panics
    ///
    /// - Panics if no vertex input storage is installed.
    /// - Panics if a binding, attribute location or stride is out of range.
    /// - Panics if an attribute refers to a binding that is not in `bindings`.
    pub fn set_vertex_input(
        &mut self,
        bindings: &[vk::VertexInputBindingDescription2EXT<'_>],
        attributes: &[vk::VertexInputAttributeDescription2EXT<'_>],
    ) -> &mut Self {
        let mut vi = VertexInputState::new();

        for desc in bindings {
            assert!((desc.binding as usize) < MAX_VERTEX_BINDINGS);
            assert!(desc.stride <= MAX_VERTEX_BINDING_STRIDE);

            vi.bindings_valid |= 1 << desc.binding;
            vi.bindings[desc.binding as usize] = VertexInputBinding {
                stride: desc.stride,
                input_rate: VertexInputRate::from_vk(desc.input_rate),
                divisor: desc.divisor,
            };
        }

        for desc in attributes {
            assert!((desc.location as usize) < MAX_VERTEX_ATTRIBUTES);
            assert!(
                vi.bindings_valid & (1 << desc.binding) != 0,
                "vertex attribute {} uses binding {}, which is not described",
                desc.location,
                desc.binding,
            );

            vi.attributes_valid |= 1 << desc.location;
            vi.attributes[desc.location as usize] = VertexInputAttribute {
                binding: desc.binding,
                format: desc.format,
                offset: desc.offset,
            };
        }

        let dst = installed(&mut self.vi, "vertex input");

        if !self.set.contains(DynamicState::Vi) || *dst != vi {
            *dst = vi;
            self.set.insert(DynamicState::Vi);
            self.dirty.insert(DynamicState::Vi);
        }

        set_dyn_value!(self, ViBindingsValid, self.vi_bindings_valid, vi.bindings_valid);

        for desc in bindings {
            set_dyn_value!(
                self,
                ViBindingStrides,
                self.vi_binding_strides[desc.binding as usize],
                desc.stride
            );
        }

        self
    }

    /// Sets the strides of the vertex bindings starting at `first_binding`, as
    /// `vkCmdBindVertexBuffers2` does when it is given strides.
    ///
    /// # Panics
    ///
    /// - Panics if the bindings or strides are out of range.
    pub fn set_vertex_binding_strides(&mut self, first_binding: u32, strides: &[u32]) -> &mut Self {
        assert!(first_binding as usize + strides.len() <= MAX_VERTEX_BINDINGS);
        assert!(strides
            .iter()
            .all(|&stride| stride <= MAX_VERTEX_BINDING_STRIDE));

        set_dyn_array!(
            self,
            ViBindingStrides,
            self.vi_binding_strides,
            first_binding,
            strides
        );

        self
    }

    #[inline]
    pub fn set_primitive_topology(&mut self, topology: PrimitiveTopology) -> &mut Self {
        set_dyn_value!(self, IaPrimitiveTopology, self.ia.primitive_topology, topology);

        self
    }

    #[inline]
    pub fn set_primitive_restart_enable(&mut self, enable: bool) -> &mut Self {
        set_dyn_value!(
            self,
            IaPrimitiveRestartEnable,
            self.ia.primitive_restart_enable,
            enable
        );

        self
    }

    #[inline]
    pub fn set_patch_control_points(&mut self, num: u32) -> &mut Self {
        set_dyn_value!(self, TsPatchControlPoints, self.ts.patch_control_points, num);

        self
    }

    #[inline]
    pub fn set_tessellation_domain_origin(
        &mut self,
        domain_origin: TessellationDomainOrigin,
    ) -> &mut Self {
        set_dyn_value!(self, TsDomainOrigin, self.ts.domain_origin, domain_origin);

        self
    }

    /// Sets the viewports starting at `first_viewport`. The viewport count is unchanged.
    ///
    /// # Panics
    ///
    /// - Panics if the highest viewport slot is not less than [`MAX_VIEWPORTS`].
    pub fn set_viewport(&mut self, first_viewport: u32, viewports: &[Viewport]) -> &mut Self {
        assert!(
            first_viewport as usize + viewports.len() <= MAX_VIEWPORTS,
            "the highest viewport slot is out of range",
        );

        set_dyn_array!(self, VpViewports, self.vp.viewports, first_viewport, viewports);

        self
    }

    /// Sets both the viewport count and the viewports.
    ///
    /// # Panics
    ///
    /// - Panics if there are more than [`MAX_VIEWPORTS`] viewports.
    pub fn set_viewport_with_count(&mut self, viewports: &[Viewport]) -> &mut Self {
        assert!(viewports.len() <= MAX_VIEWPORTS, "too many viewports");

        set_dyn_value!(
            self,
            VpViewportCount,
            self.vp.viewport_count,
            viewports.len() as u32
        );
        set_dyn_array!(self, VpViewports, self.vp.viewports, 0, viewports);

        self
    }

    /// Sets the scissors starting at `first_scissor`. The scissor count is unchanged.
    ///
    /// # Panics
    ///
    /// - Panics if the highest scissor slot is not less than [`MAX_SCISSORS`].
    pub fn set_scissor(&mut self, first_scissor: u32, scissors: &[Scissor]) -> &mut Self {
        assert!(
            first_scissor as usize + scissors.len() <= MAX_SCISSORS,
            "the highest scissor slot is out of range",
        );

        set_dyn_array!(self, VpScissors, self.vp.scissors, first_scissor, scissors);

        self
    }

    /// Sets both the scissor count and the scissors.
    ///
    /// # Panics
    ///
    /// - Panics if there are more than [`MAX_SCISSORS`] scissors.
    pub fn set_scissor_with_count(&mut self, scissors: &[Scissor]) -> &mut Self {
        assert!(scissors.len() <= MAX_SCISSORS, "too many scissors");

        set_dyn_value!(self, VpScissorCount, self.vp.scissor_count, scissors.len() as u32);
        set_dyn_array!(self, VpScissors, self.vp.scissors, 0, scissors);

        self
    }

    #[inline]
    pub fn set_depth_clip_negative_one_to_one(&mut self, negative_one_to_one: bool) -> &mut Self {
        set_dyn_value!(
            self,
            VpDepthClipNegativeOneToOne,
            self.vp.depth_clip_negative_one_to_one,
            negative_one_to_one
        );

        self
    }

    /// Sets the discard rectangles starting at `first_rectangle`.
    ///
    /// The rectangle count becomes `first_rectangle + rectangles.len()`.
    ///
    /// # Panics
    ///
    /// - Panics if the highest rectangle slot is not less than [`MAX_DISCARD_RECTANGLES`].
    pub fn set_discard_rectangle(
        &mut self,
        first_rectangle: u32,
        rectangles: &[Scissor],
    ) -> &mut Self {
        let count = first_rectangle as usize + rectangles.len();
        assert!(
            count <= MAX_DISCARD_RECTANGLES,
            "the highest discard rectangle slot is out of range",
        );

        set_dyn_value!(self, DrRectangles, self.dr.rectangle_count, count as u32);
        set_dyn_array!(
            self,
            DrRectangles,
            self.dr.rectangles,
            first_rectangle,
            rectangles
        );

        self
    }

    #[inline]
    pub fn set_discard_rectangle_enable(&mut self, enable: bool) -> &mut Self {
        set_dyn_value!(self, DrEnable, self.dr.enable, enable);

        self
    }

    #[inline]
    pub fn set_discard_rectangle_mode(&mut self, mode: DiscardRectangleMode) -> &mut Self {
        set_dyn_value!(self, DrMode, self.dr.mode, mode);

        self
    }

    #[inline]
    pub fn set_rasterizer_discard_enable(&mut self, enable: bool) -> &mut Self {
        set_dyn_value!(
            self,
            RsRasterizerDiscardEnable,
            self.rs.rasterizer_discard_enable,
            enable
        );

        self
    }

    #[inline]
    pub fn set_depth_clamp_enable(&mut self, enable: bool) -> &mut Self {
        set_dyn_value!(self, RsDepthClampEnable, self.rs.depth_clamp_enable, enable);

        self
    }

    /// Sets whether depth clipping is enabled.
    ///
    /// Once set, depth clipping no longer follows the depth clamp enable.
    #[inline]
    pub fn set_depth_clip_enable(&mut self, enable: bool) -> &mut Self {
        let enable = if enable {
            DepthClipEnable::True
        } else {
            DepthClipEnable::False
        };
        set_dyn_value!(self, RsDepthClipEnable, self.rs.depth_clip_enable, enable);

        self
    }

    #[inline]
    pub fn set_polygon_mode(&mut self, polygon_mode: PolygonMode) -> &mut Self {
        set_dyn_value!(self, RsPolygonMode, self.rs.polygon_mode, polygon_mode);

        self
    }

    #[inline]
    pub fn set_cull_mode(&mut self, cull_mode: CullMode) -> &mut Self {
        set_dyn_value!(self, RsCullMode, self.rs.cull_mode, cull_mode);

        self
    }

    #[inline]
    pub fn set_front_face(&mut self, face: FrontFace) -> &mut Self {
        set_dyn_value!(self, RsFrontFace, self.rs.front_face, face);

        self
    }

    #[inline]
    pub fn set_conservative_rasterization_mode(
        &mut self,
        mode: ConservativeRasterizationMode,
    ) -> &mut Self {
        set_dyn_value!(self, RsConservativeMode, self.rs.conservative_mode, mode);

        self
    }

    #[inline]
    pub fn set_extra_primitive_overestimation_size(&mut self, size: f32) -> &mut Self {
        set_dyn_value!(
            self,
            RsExtraPrimitiveOverestimationSize,
            self.rs.extra_primitive_overestimation_size,
            size
        );

        self
    }

    #[inline]
    pub fn set_provoking_vertex_mode(&mut self, mode: ProvokingVertexMode) -> &mut Self {
        set_dyn_value!(self, RsProvokingVertex, self.rs.provoking_vertex, mode);

        self
    }

    #[inline]
    pub fn set_rasterization_stream(&mut self, stream: u32) -> &mut Self {
        set_dyn_value!(
            self,
            RsRasterizationStream,
            self.rs.rasterization_stream,
            stream
        );

        self
    }

    #[inline]
    pub fn set_depth_bias_enable(&mut self, enable: bool) -> &mut Self {
        set_dyn_value!(self, RsDepthBiasEnable, self.rs.depth_bias.enable, enable);

        self
    }

    /// Sets the three depth bias factors.
    pub fn set_depth_bias(
        &mut self,
        constant_factor: f32,
        clamp: f32,
        slope_factor: f32,
    ) -> &mut Self {
        set_dyn_value!(
            self,
            RsDepthBiasFactors,
            self.rs.depth_bias.constant_factor,
            constant_factor
        );
        set_dyn_value!(self, RsDepthBiasFactors, self.rs.depth_bias.clamp, clamp);
        set_dyn_value!(
            self,
            RsDepthBiasFactors,
            self.rs.depth_bias.slope_factor,
            slope_factor
        );

        self
    }

    #[inline]
    pub fn set_line_width(&mut self, line_width: f32) -> &mut Self {
        set_dyn_value!(self, RsLineWidth, self.rs.line.width, line_width);

        self
    }

    #[inline]
    pub fn set_line_rasterization_mode(&mut self, mode: LineRasterizationMode) -> &mut Self {
        set_dyn_value!(self, RsLineMode, self.rs.line.mode, mode);

        self
    }

    #[inline]
    pub fn set_line_stipple_enable(&mut self, enable: bool) -> &mut Self {
        set_dyn_value!(
            self,
            RsLineStippleEnable,
            self.rs.line.stipple.enable,
            enable
        );

        self
    }

    /// Sets the line stipple factor and pattern. Stippling is enabled separately.
    pub fn set_line_stipple(&mut self, factor: u32, pattern: u16) -> &mut Self {
        set_dyn_value!(self, RsLineStipple, self.rs.line.stipple.factor, factor);
        set_dyn_value!(self, RsLineStipple, self.rs.line.stipple.pattern, pattern);

        self
    }

    /// Sets the pipeline fragment size and the combiner operations.
    pub fn set_fragment_shading_rate(
        &mut self,
        fragment_size: [u32; 2],
        combiner_ops: [FragmentShadingRateCombinerOp; 2],
    ) -> &mut Self {
        set_dyn_value!(self, Fsr, self.fsr.fragment_size, fragment_size);
        set_dyn_value!(self, Fsr, self.fsr.combiner_ops, combiner_ops);

        self
    }

    #[inline]
    pub fn set_rasterization_samples(&mut self, samples: SampleCount) -> &mut Self {
        set_dyn_value!(
            self,
            MsRasterizationSamples,
            self.ms.rasterization_samples,
            samples
        );

        self
    }

    #[inline]
    pub fn set_sample_mask(&mut self, sample_mask: u16) -> &mut Self {
        set_dyn_value!(self, MsSampleMask, self.ms.sample_mask, sample_mask);

        self
    }

    #[inline]
    pub fn set_alpha_to_coverage_enable(&mut self, enable: bool) -> &mut Self {
        set_dyn_value!(
            self,
            MsAlphaToCoverageEnable,
            self.ms.alpha_to_coverage_enable,
            enable
        );

        self
    }

    #[inline]
    pub fn set_alpha_to_one_enable(&mut self, enable: bool) -> &mut Self {
        set_dyn_value!(self, MsAlphaToOneEnable, self.ms.alpha_to_one_enable, enable);

        self
    }

    #[inline]
    pub fn set_sample_locations_enable(&mut self, enable: bool) -> &mut Self {
        set_dyn_value!(
            self,
            MsSampleLocationsEnable,
            self.ms.sample_locations_enable,
            enable
        );

        self
    }

    /// Sets the custom sample locations.
    ///
    /// Only the locations that `sample_locations` actually uses are compared and copied.
    ///
    /// # Panics
    ///
    /// - Panics if no sample locations storage is installed.
    #[inline]
    pub fn set_sample_locations(&mut self, sample_locations: &SampleLocationsState) -> &mut Self {
        self.copy_sample_locations(sample_locations);

        self
    }

    #[inline]
    pub fn set_depth_test_enable(&mut self, enable: bool) -> &mut Self {
        set_dyn_value!(self, DsDepthTestEnable, self.ds.depth.test_enable, enable);

        self
    }

    #[inline]
    pub fn set_depth_write_enable(&mut self, enable: bool) -> &mut Self {
        set_dyn_value!(self, DsDepthWriteEnable, self.ds.depth.write_enable, enable);

        self
    }

    #[inline]
    pub fn set_depth_compare_op(&mut self, compare_op: CompareOp) -> &mut Self {
        set_dyn_value!(self, DsDepthCompareOp, self.ds.depth.compare_op, compare_op);

        self
    }

    #[inline]
    pub fn set_depth_bounds_test_enable(&mut self, enable: bool) -> &mut Self {
        set_dyn_value!(
            self,
            DsDepthBoundsTestEnable,
            self.ds.depth.bounds_test.enable,
            enable
        );

        self
    }

    /// Sets the minimum and maximum depth values that the depth bounds test accepts.
    pub fn set_depth_bounds(&mut self, min: f32, max: f32) -> &mut Self {
        set_dyn_value!(
            self,
            DsDepthBoundsTestBounds,
            self.ds.depth.bounds_test.min,
            min
        );
        set_dyn_value!(
            self,
            DsDepthBoundsTestBounds,
            self.ds.depth.bounds_test.max,
            max
        );

        self
    }

    #[inline]
    pub fn set_stencil_test_enable(&mut self, enable: bool) -> &mut Self {
        set_dyn_value!(self, DsStencilTestEnable, self.ds.stencil.test_enable, enable);

        self
    }

    /// Sets the stencil operations of the faces in `faces`.
    pub fn set_stencil_op(
        &mut self,
        faces: StencilFaces,
        fail_op: StencilOp,
        pass_op: StencilOp,
        depth_fail_op: StencilOp,
        compare_op: CompareOp,
    ) -> &mut Self {
        let ops = StencilOps {
            fail_op,
            pass_op,
            depth_fail_op,
            compare_op,
        };
        set_stencil_faces!(self, faces, DsStencilOp, ops, ops);

        self
    }

    /// Sets the stencil compare mask of the faces in `faces`. Only the low 8 bits are kept.
    pub fn set_stencil_compare_mask(&mut self, faces: StencilFaces, compare_mask: u32) -> &mut Self {
        set_stencil_faces!(
            self,
            faces,
            DsStencilCompareMask,
            compare_mask,
            compare_mask as u8
        );

        self
    }

    /// Sets the stencil write mask of the faces in `faces`. Only the low 8 bits are kept.
    pub fn set_stencil_write_mask(&mut self, faces: StencilFaces, write_mask: u32) -> &mut Self {
        set_stencil_faces!(self, faces, DsStencilWriteMask, write_mask, write_mask as u8);

        self
    }

    /// Sets the stencil reference of the faces in `faces`. Only the low 8 bits are kept.
    pub fn set_stencil_reference(&mut self, faces: StencilFaces, reference: u32) -> &mut Self {
        set_stencil_faces!(self, faces, DsStencilReference, reference, reference as u8);

        self
    }

    #[inline]
    pub fn set_logic_op_enable(&mut self, enable: bool) -> &mut Self {
        set_dyn_value!(self, CbLogicOpEnable, self.cb.logic_op_enable, enable);

        self
    }

    #[inline]
    pub fn set_logic_op(&mut self, logic_op: LogicOp) -> &mut Self {
        set_dyn_value!(self, CbLogicOp, self.cb.logic_op, logic_op);

        self
    }

    /// Sets the number of color attachments that the color blend state covers. This is done by
    /// the driver when a render pass instance begins.
    ///
    /// # Panics
    ///
    /// - Panics if `count` is greater than [`MAX_COLOR_ATTACHMENTS`].
    #[inline]
    pub fn set_color_blend_attachment_count(&mut self, count: u32) -> &mut Self {
        assert!(count as usize <= MAX_COLOR_ATTACHMENTS);

        set_dyn_value!(self, CbAttachmentCount, self.cb.attachment_count, count);

        self
    }

    /// Sets which color attachments can be written. Attachments past the end of `enables` can't.
    ///
    /// # Panics
    ///
    /// - Panics if `enables` has more than [`MAX_COLOR_ATTACHMENTS`] elements.
    pub fn set_color_write_enable(&mut self, enables: &[bool]) -> &mut Self {
        assert!(enables.len() <= MAX_COLOR_ATTACHMENTS);

        let color_write_enables = enables
            .iter()
            .enumerate()
            .filter(|&(_, &enable)| enable)
            .fold(0u8, |mask, (index, _)| mask | (1 << index));

        set_dyn_value!(
            self,
            CbColorWriteEnables,
            self.cb.color_write_enables,
            color_write_enables
        );

        self
    }

    /// Sets whether blending is enabled for the attachments starting at `first_attachment`.
    ///
    /// # Panics
    ///
    /// - Panics if the highest attachment is not less than [`MAX_COLOR_ATTACHMENTS`].
    pub fn set_color_blend_enable(&mut self, first_attachment: u32, enables: &[bool]) -> &mut Self {
        let first = first_attachment as usize;
        assert!(first + enables.len() <= MAX_COLOR_ATTACHMENTS);

        for (i, &enable) in enables.iter().enumerate() {
            set_dyn_value!(
                self,
                CbBlendEnables,
                self.cb.attachments[first + i].blend_enable,
                enable
            );
        }

        self
    }

    /// Sets the blend factors and operations of the attachments starting at `first_attachment`.
    ///
    /// # Panics
    ///
    /// - Panics if the highest attachment is not less than [`MAX_COLOR_ATTACHMENTS`].
    /// - Panics if a blend factor or operation is not supported.
    pub fn set_color_blend_equation(
        &mut self,
        first_attachment: u32,
        equations: &[vk::ColorBlendEquationEXT],
    ) -> &mut Self {
        let first = first_attachment as usize;
        assert!(first + equations.len() <= MAX_COLOR_ATTACHMENTS);

        for (i, equation) in equations.iter().enumerate() {
            let a = first + i;

            set_dyn_value!(
                self,
                CbBlendEquations,
                self.cb.attachments[a].src_color_blend_factor,
                BlendFactor::from_vk(equation.src_color_blend_factor)
            );
            set_dyn_value!(
                self,
                CbBlendEquations,
                self.cb.attachments[a].dst_color_blend_factor,
                BlendFactor::from_vk(equation.dst_color_blend_factor)
            );
            set_dyn_value!(
                self,
                CbBlendEquations,
                self.cb.attachments[a].color_blend_op,
                BlendOp::from_vk(equation.color_blend_op)
            );
            set_dyn_value!(
                self,
                CbBlendEquations,
                self.cb.attachments[a].src_alpha_blend_factor,
                BlendFactor::from_vk(equation.src_alpha_blend_factor)
            );
            set_dyn_value!(
                self,
                CbBlendEquations,
                self.cb.attachments[a].dst_alpha_blend_factor,
                BlendFactor::from_vk(equation.dst_alpha_blend_factor)
            );
            set_dyn_value!(
                self,
                CbBlendEquations,
                self.cb.attachments[a].alpha_blend_op,
                BlendOp::from_vk(equation.alpha_blend_op)
            );
        }

        self
    }

    /// Sets which components are written for the attachments starting at `first_attachment`.
    ///
    /// # Panics
    ///
    /// - Panics if the highest attachment is not less than [`MAX_COLOR_ATTACHMENTS`].
    pub fn set_color_write_mask(
        &mut self,
        first_attachment: u32,
        write_masks: &[ColorComponents],
    ) -> &mut Self {
        let first = first_attachment as usize;
        assert!(first + write_masks.len() <= MAX_COLOR_ATTACHMENTS);

        for (i, &write_mask) in write_masks.iter().enumerate() {
            set_dyn_value!(
                self,
                CbWriteMasks,
                self.cb.attachments[first + i].color_write_mask,
                write_mask
            );
        }

        self
    }

    #[inline]
    pub fn set_blend_constants(&mut self, constants: [f32; 4]) -> &mut Self {
        set_dyn_value!(self, CbBlendConstants, self.cb.blend_constants, constants);

        self
    }

    /// Sets the aspects of the attachments of the current render pass instance. This is done by
    /// the driver when a render pass instance begins.
    #[inline]
    pub fn set_render_pass_attachments(&mut self, attachments: ImageAspects) -> &mut Self {
        set_dyn_value!(self, RpAttachments, self.rp.attachments, attachments);

        self
    }

    #[inline]
    pub fn set_attachment_feedback_loop_enable(&mut self, aspects: ImageAspects) -> &mut Self {
        set_dyn_value!(
            self,
            AttachmentFeedbackLoopEnable,
            self.feedback_loops,
            aspects
        );

        self
    }
}
