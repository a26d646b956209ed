// Copyright (c) 2026 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! The graphics state of a command buffer while it is being recorded.
//!
//! A [`DynamicGraphicsState`] holds one value for every [`DynamicState`], whether it came from
//! the bound pipeline or from a `vkCmdSet*` command. Two bitsets track what happened to each
//! value:
//!
//! - `set` contains the states that have a meaningful value. A state that was never set still
//!   holds its Vulkan default.
//! - `dirty` contains the states whose value changed since the driver last called
//!   [`DynamicGraphicsState::clear_dirty`].
//!
//! Binding a pipeline with [`DynamicGraphicsState::fill`] marks its static states as set, but not
//! as dirty. A driver is expected to emit the whole static state of a pipeline when binding it,
//! and only needs the dirty bits for what changes afterwards.
//!
//! The vertex input state and the sample locations are large, so they live in storage that the
//! driver installs once with [`DynamicGraphicsState::install_vertex_input_storage`] and
//! [`DynamicGraphicsState::install_sample_locations_storage`]. The storage is kept across
//! [`DynamicGraphicsState::clear`].

use crate::{
    image::{ImageAspects, SampleCount},
    pipeline::{
        graphics::{
            color_blend::ColorBlendState,
            depth_stencil::{DepthBoundsState, DepthState, DepthStencilState},
            discard_rectangle::DiscardRectangleMode,
            fragment_shading_rate::FragmentShadingRateState,
            input_assembly::InputAssemblyState,
            multisample::SampleLocationsState,
            rasterization::RasterizationState,
            tessellation::TessellationState,
            vertex_input::VertexInputState,
            viewport::{Scissor, ViewportState},
            GraphicsPipelineState,
        },
        PipelineCreateFlags,
    },
    DynamicState, DynamicStates, MAX_COLOR_ATTACHMENTS, MAX_DISCARD_RECTANGLES,
    MAX_VERTEX_BINDINGS,
};
use log::trace;

/// Assigns `$value` to `$dst`, and marks `$state` as set and dirty, unless `$state` is already
/// set to that same value.
macro_rules! set_dyn_value {
    ($self:ident, $state:ident, $dst:expr, $value:expr) => {{
        let value = $value;

        if !$self.set.contains(DynamicState::$state) || $dst != value {
            $dst = value;
            $self.set.insert(DynamicState::$state);
            $self.dirty.insert(DynamicState::$state);
        }
    }};
}

/// Like `set_dyn_value!`, but for the elements `$first..$first + $values.len()` of `$array`.
macro_rules! set_dyn_array {
    ($self:ident, $state:ident, $array:expr, $first:expr, $values:expr) => {{
        let first = $first as usize;
        let values = $values;
        let dst = &mut $array[first..first + values.len()];

        if !$self.set.contains(DynamicState::$state) || dst[..] != values[..] {
            dst.copy_from_slice(values);
            $self.set.insert(DynamicState::$state);
            $self.dirty.insert(DynamicState::$state);
        }
    }};
}

mod dynamic_state;

/// The complete graphics state of a command buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct DynamicGraphicsState {
    /// The vertex input state, in storage installed by the driver.
    pub vi: Option<Box<VertexInputState>>,

    /// Bit mask of the vertex bindings that are used.
    ///
    /// This is tracked apart from `vi`, because it is always known even when the rest of the
    /// vertex input state comes from elsewhere.
    pub vi_bindings_valid: u32,

    /// The stride of each vertex binding, as given when binding vertex buffers.
    pub vi_binding_strides: [u32; MAX_VERTEX_BINDINGS],

    pub ia: InputAssemblyState,
    pub ts: TessellationState,
    pub vp: ViewportState,
    pub dr: DiscardRectangleDynamicState,
    pub rs: RasterizationState,
    pub fsr: FragmentShadingRateState,
    pub ms: MultisampleDynamicState,
    pub ds: DepthStencilState,
    pub cb: ColorBlendState,
    pub rp: RenderPassDynamicState,

    /// The aspects of the attachments that may be read while they are being written.
    ///
    /// The default value is empty.
    pub feedback_loops: ImageAspects,

    /// The states that hold a meaningful value.
    pub set: DynamicStates,

    /// The states that changed since the last call to [`clear_dirty`](Self::clear_dirty).
    pub dirty: DynamicStates,
}

impl Default for DynamicGraphicsState {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicGraphicsState {
    /// Returns a state holding the Vulkan default of every value, with nothing set or dirty and
    /// no storage installed.
    #[inline]
    pub fn new() -> Self {
        Self {
            vi: None,
            vi_bindings_valid: 0,
            vi_binding_strides: [0; MAX_VERTEX_BINDINGS],
            ia: InputAssemblyState::new(),
            ts: TessellationState::new(),
            vp: ViewportState::new(),
            dr: DiscardRectangleDynamicState::new(),
            rs: RasterizationState::new(),
            fsr: FragmentShadingRateState::new(),
            ms: MultisampleDynamicState::new(),
            ds: DepthStencilState {
                depth: DepthState {
                    bounds_test: DepthBoundsState {
                        max: 1.0,
                        ..DepthBoundsState::new()
                    },
                    ..DepthState::new()
                },
                ..DepthStencilState::new()
            },
            cb: ColorBlendState {
                attachment_count: MAX_COLOR_ATTACHMENTS as u32,
                ..ColorBlendState::new()
            },
            rp: RenderPassDynamicState::new(),
            feedback_loops: ImageAspects::empty(),
            set: DynamicStates::empty(),
            dirty: DynamicStates::empty(),
        }
    }

    /// Resets every value to its Vulkan default, and clears both bitsets.
    ///
    /// Installed storage is released. Use [`clear`](Self::clear) to keep it.
    #[inline]
    pub fn init(&mut self) {
        *self = Self::new();
    }

    /// Resets every value to its Vulkan default, and clears both bitsets, keeping the installed
    /// storage.
    pub fn clear(&mut self) {
        let vi = self.vi.take();
        let sample_locations = self.ms.sample_locations.take();

        self.init();

        self.vi = vi.map(|mut vi| {
            *vi = VertexInputState::new();
            vi
        });
        self.ms.sample_locations = sample_locations.map(|mut sample_locations| {
            *sample_locations = SampleLocationsState::new();
            sample_locations
        });
    }

    /// Installs the storage for the vertex input state, and returns the previous one.
    #[inline]
    pub fn install_vertex_input_storage(
        &mut self,
        storage: Box<VertexInputState>,
    ) -> Option<Box<VertexInputState>> {
        self.vi.replace(storage)
    }

    /// Installs the storage for the sample locations, and returns the previous one.
    #[inline]
    pub fn install_sample_locations_storage(
        &mut self,
        storage: Box<SampleLocationsState>,
    ) -> Option<Box<SampleLocationsState>> {
        self.ms.sample_locations.replace(storage)
    }

    /// Loads the static state of `pipeline`.
    ///
    /// Every state that `pipeline` provides statically is copied and marked as set. Nothing is
    /// marked as dirty. States that are dynamic in `pipeline` keep their current value.
    ///
    /// The vertex input state and the sample locations are only copied if their storage is
    /// installed.
    pub fn fill(&mut self, pipeline: &GraphicsPipelineState<'_>) {
        let needed = pipeline.static_states();

        macro_rules! fill {
            ($state:ident, $dst:expr, $src:expr) => {
                if needed.contains(DynamicState::$state) {
                    $dst = $src;
                }
            };
        }

        if let Some(vi) = pipeline.vi.as_deref() {
            if needed.contains(DynamicState::Vi) {
                if let Some(dst) = self.vi.as_deref_mut() {
                    *dst = *vi;
                }
            }

            fill!(ViBindingsValid, self.vi_bindings_valid, vi.bindings_valid);

            if needed.contains(DynamicState::ViBindingStrides) {
                for (binding, desc) in vi.valid_bindings() {
                    self.vi_binding_strides[binding as usize] = desc.stride;
                }
            }
        }

        if let Some(ia) = pipeline.ia.as_deref() {
            fill!(IaPrimitiveTopology, self.ia.primitive_topology, ia.primitive_topology);
            fill!(
                IaPrimitiveRestartEnable,
                self.ia.primitive_restart_enable,
                ia.primitive_restart_enable
            );
        }

        if let Some(ts) = pipeline.ts.as_deref() {
            fill!(TsPatchControlPoints, self.ts.patch_control_points, ts.patch_control_points);
            fill!(TsDomainOrigin, self.ts.domain_origin, ts.domain_origin);
        }

        if let Some(vp) = pipeline.vp.as_deref() {
            fill!(VpViewportCount, self.vp.viewport_count, vp.viewport_count);
            fill!(VpViewports, self.vp.viewports, vp.viewports);
            fill!(VpScissorCount, self.vp.scissor_count, vp.scissor_count);
            fill!(VpScissors, self.vp.scissors, vp.scissors);
            fill!(
                VpDepthClipNegativeOneToOne,
                self.vp.depth_clip_negative_one_to_one,
                vp.depth_clip_negative_one_to_one
            );
        }

        if let Some(dr) = pipeline.dr.as_deref() {
            fill!(DrEnable, self.dr.enable, dr.rectangle_count > 0);
            fill!(DrMode, self.dr.mode, dr.mode);

            if needed.contains(DynamicState::DrRectangles) {
                self.dr.rectangle_count = dr.rectangle_count;
                self.dr.rectangles = dr.rectangles;
            }
        }

        if let Some(rs) = pipeline.rs.as_deref() {
            fill!(
                RsRasterizerDiscardEnable,
                self.rs.rasterizer_discard_enable,
                rs.rasterizer_discard_enable
            );
            fill!(RsDepthClampEnable, self.rs.depth_clamp_enable, rs.depth_clamp_enable);
            fill!(RsDepthClipEnable, self.rs.depth_clip_enable, rs.depth_clip_enable);
            fill!(RsPolygonMode, self.rs.polygon_mode, rs.polygon_mode);
            fill!(RsCullMode, self.rs.cull_mode, rs.cull_mode);
            fill!(RsFrontFace, self.rs.front_face, rs.front_face);
            fill!(RsConservativeMode, self.rs.conservative_mode, rs.conservative_mode);
            fill!(
                RsExtraPrimitiveOverestimationSize,
                self.rs.extra_primitive_overestimation_size,
                rs.extra_primitive_overestimation_size
            );
            fill!(
                RsRasterizationOrderAmd,
                self.rs.rasterization_order_amd,
                rs.rasterization_order_amd
            );
            fill!(RsProvokingVertex, self.rs.provoking_vertex, rs.provoking_vertex);
            fill!(
                RsRasterizationStream,
                self.rs.rasterization_stream,
                rs.rasterization_stream
            );
            fill!(RsDepthBiasEnable, self.rs.depth_bias.enable, rs.depth_bias.enable);

            if needed.contains(DynamicState::RsDepthBiasFactors) {
                self.rs.depth_bias.constant_factor = rs.depth_bias.constant_factor;
                self.rs.depth_bias.clamp = rs.depth_bias.clamp;
                self.rs.depth_bias.slope_factor = rs.depth_bias.slope_factor;
            }

            fill!(RsLineWidth, self.rs.line.width, rs.line.width);
            fill!(RsLineMode, self.rs.line.mode, rs.line.mode);
            fill!(
                RsLineStippleEnable,
                self.rs.line.stipple.enable,
                rs.line.stipple.enable
            );

            if needed.contains(DynamicState::RsLineStipple) {
                self.rs.line.stipple.factor = rs.line.stipple.factor;
                self.rs.line.stipple.pattern = rs.line.stipple.pattern;
            }
        }

        if let Some(fsr) = pipeline.fsr.as_deref() {
            fill!(Fsr, self.fsr, *fsr);
        }

        if let Some(ms) = pipeline.ms.as_deref() {
            fill!(
                MsRasterizationSamples,
                self.ms.rasterization_samples,
                ms.rasterization_samples
            );
            fill!(MsSampleMask, self.ms.sample_mask, ms.sample_mask);
            fill!(
                MsAlphaToCoverageEnable,
                self.ms.alpha_to_coverage_enable,
                ms.alpha_to_coverage_enable
            );
            fill!(
                MsAlphaToOneEnable,
                self.ms.alpha_to_one_enable,
                ms.alpha_to_one_enable
            );
            fill!(
                MsSampleLocationsEnable,
                self.ms.sample_locations_enable,
                ms.sample_locations_enable
            );

            if needed.contains(DynamicState::MsSampleLocations) {
                if let (Some(dst), Some(src)) = (
                    self.ms.sample_locations.as_deref_mut(),
                    ms.sample_locations.as_deref(),
                ) {
                    *dst = *src;
                }
            }
        }

        if let Some(ds) = pipeline.ds.as_deref() {
            fill!(DsDepthTestEnable, self.ds.depth.test_enable, ds.depth.test_enable);
            fill!(DsDepthWriteEnable, self.ds.depth.write_enable, ds.depth.write_enable);
            fill!(DsDepthCompareOp, self.ds.depth.compare_op, ds.depth.compare_op);
            fill!(
                DsDepthBoundsTestEnable,
                self.ds.depth.bounds_test.enable,
                ds.depth.bounds_test.enable
            );

            if needed.contains(DynamicState::DsDepthBoundsTestBounds) {
                self.ds.depth.bounds_test.min = ds.depth.bounds_test.min;
                self.ds.depth.bounds_test.max = ds.depth.bounds_test.max;
            }

            fill!(DsStencilTestEnable, self.ds.stencil.test_enable, ds.stencil.test_enable);

            if needed.contains(DynamicState::DsStencilOp) {
                self.ds.stencil.front.ops = ds.stencil.front.ops;
                self.ds.stencil.back.ops = ds.stencil.back.ops;
            }

            if needed.contains(DynamicState::DsStencilCompareMask) {
                self.ds.stencil.front.compare_mask = ds.stencil.front.compare_mask;
                self.ds.stencil.back.compare_mask = ds.stencil.back.compare_mask;
            }

            if needed.contains(DynamicState::DsStencilWriteMask) {
                self.ds.stencil.front.write_mask = ds.stencil.front.write_mask;
                self.ds.stencil.back.write_mask = ds.stencil.back.write_mask;
            }

            if needed.contains(DynamicState::DsStencilReference) {
                self.ds.stencil.front.reference = ds.stencil.front.reference;
                self.ds.stencil.back.reference = ds.stencil.back.reference;
            }
        }

        if let Some(cb) = pipeline.cb.as_deref() {
            let count = cb.attachment_count as usize;

            fill!(CbLogicOpEnable, self.cb.logic_op_enable, cb.logic_op_enable);
            fill!(CbLogicOp, self.cb.logic_op, cb.logic_op);
            fill!(CbAttachmentCount, self.cb.attachment_count, cb.attachment_count);
            fill!(
                CbColorWriteEnables,
                self.cb.color_write_enables,
                cb.color_write_enables
            );

            for (dst, src) in self.cb.attachments[..count]
                .iter_mut()
                .zip(&cb.attachments[..count])
            {
                fill!(CbBlendEnables, dst.blend_enable, src.blend_enable);

                if needed.contains(DynamicState::CbBlendEquations) {
                    dst.src_color_blend_factor = src.src_color_blend_factor;
                    dst.dst_color_blend_factor = src.dst_color_blend_factor;
                    dst.color_blend_op = src.color_blend_op;
                    dst.src_alpha_blend_factor = src.src_alpha_blend_factor;
                    dst.dst_alpha_blend_factor = src.dst_alpha_blend_factor;
                    dst.alpha_blend_op = src.alpha_blend_op;
                }

                fill!(CbWriteMasks, dst.color_write_mask, src.color_write_mask);
            }

            fill!(CbBlendConstants, self.cb.blend_constants, cb.blend_constants);
        }

        let mut set = needed;

        if let Some(rp) = pipeline.rp.as_deref() {
            fill!(
                RpAttachments,
                self.rp.attachments,
                rp.attachment_aspects.unwrap_or_default()
            );

            // Without color attachments there is no color blend state to take the count from.
            if rp.is_complete()
                && !rp.has_color()
                && !pipeline.dynamic.contains(DynamicState::CbAttachmentCount)
            {
                self.cb.attachment_count = 0;
                set.insert(DynamicState::CbAttachmentCount);
            }
        }

        if needed.contains(DynamicState::AttachmentFeedbackLoopEnable) {
            let flags = pipeline.feedback_loop_flags;
            let mut feedback_loops = ImageAspects::empty();

            if flags.intersects(PipelineCreateFlags::COLOR_ATTACHMENT_FEEDBACK_LOOP) {
                feedback_loops |= ImageAspects::COLOR;
            }

            if flags.intersects(PipelineCreateFlags::DEPTH_STENCIL_ATTACHMENT_FEEDBACK_LOOP) {
                feedback_loops |= ImageAspects::DEPTH | ImageAspects::STENCIL;
            }

            self.feedback_loops = feedback_loops;
        }

        self.set |= set;

        trace!("filled {:?} from pipeline", set);
    }

    /// Copies every state that is set in `src` into `self`.
    ///
    /// Values are compared one field at a time, so that only the states that actually change are
    /// marked as dirty. A state that was not set in `self` before is always marked as dirty.
    ///
    /// # Panics
    ///
    /// - Panics if `src` has the vertex input state or the sample locations set, and the
    ///   corresponding storage is not installed in `self`.
    pub fn copy(&mut self, src: &DynamicGraphicsState) {
        let newly_set = src.set - self.set;

        macro_rules! copy {
            ($state:ident, $($field:tt)+) => {
                if src.set.contains(DynamicState::$state) {
                    set_dyn_value!(self, $state, self.$($field)+, src.$($field)+);
                }
            };
        }

        if src.set.contains(DynamicState::Vi) {
            let src_vi = installed_ref(&src.vi, "vertex input");
            let dst_vi = installed(&mut self.vi, "vertex input");

            if !self.set.contains(DynamicState::Vi) || *dst_vi != *src_vi {
                *dst_vi = *src_vi;
                self.set.insert(DynamicState::Vi);
                self.dirty.insert(DynamicState::Vi);
            }
        }

        copy!(ViBindingsValid, vi_bindings_valid);

        if src.set.contains(DynamicState::ViBindingStrides) {
            set_dyn_array!(
                self,
                ViBindingStrides,
                self.vi_binding_strides,
                0,
                &src.vi_binding_strides
            );
        }

        copy!(IaPrimitiveTopology, ia.primitive_topology);
        copy!(IaPrimitiveRestartEnable, ia.primitive_restart_enable);
        copy!(TsPatchControlPoints, ts.patch_control_points);
        copy!(TsDomainOrigin, ts.domain_origin);

        copy!(VpViewportCount, vp.viewport_count);

        if src.set.contains(DynamicState::VpViewports) {
            let count = src.vp.viewport_count as usize;
            set_dyn_array!(self, VpViewports, self.vp.viewports, 0, &src.vp.viewports[..count]);
        }

        copy!(VpScissorCount, vp.scissor_count);

        if src.set.contains(DynamicState::VpScissors) {
            let count = src.vp.scissor_count as usize;
            set_dyn_array!(self, VpScissors, self.vp.scissors, 0, &src.vp.scissors[..count]);
        }

        copy!(VpDepthClipNegativeOneToOne, vp.depth_clip_negative_one_to_one);

        copy!(DrEnable, dr.enable);
        copy!(DrMode, dr.mode);

        if src.set.contains(DynamicState::DrRectangles) {
            let count = src.dr.rectangle_count as usize;
            copy!(DrRectangles, dr.rectangle_count);
            set_dyn_array!(self, DrRectangles, self.dr.rectangles, 0, &src.dr.rectangles[..count]);
        }

        copy!(RsRasterizerDiscardEnable, rs.rasterizer_discard_enable);
        copy!(RsDepthClampEnable, rs.depth_clamp_enable);
        copy!(RsDepthClipEnable, rs.depth_clip_enable);
        copy!(RsPolygonMode, rs.polygon_mode);
        copy!(RsCullMode, rs.cull_mode);
        copy!(RsFrontFace, rs.front_face);
        copy!(RsConservativeMode, rs.conservative_mode);
        copy!(
            RsExtraPrimitiveOverestimationSize,
            rs.extra_primitive_overestimation_size
        );
        copy!(RsRasterizationOrderAmd, rs.rasterization_order_amd);
        copy!(RsProvokingVertex, rs.provoking_vertex);
        copy!(RsRasterizationStream, rs.rasterization_stream);
        copy!(RsDepthBiasEnable, rs.depth_bias.enable);
        copy!(RsDepthBiasFactors, rs.depth_bias.constant_factor);
        copy!(RsDepthBiasFactors, rs.depth_bias.clamp);
        copy!(RsDepthBiasFactors, rs.depth_bias.slope_factor);
        copy!(RsLineWidth, rs.line.width);
        copy!(RsLineMode, rs.line.mode);
        copy!(RsLineStippleEnable, rs.line.stipple.enable);
        copy!(RsLineStipple, rs.line.stipple.factor);
        copy!(RsLineStipple, rs.line.stipple.pattern);

        copy!(Fsr, fsr.fragment_size);
        copy!(Fsr, fsr.combiner_ops);

        copy!(MsRasterizationSamples, ms.rasterization_samples);
        copy!(MsSampleMask, ms.sample_mask);
        copy!(MsAlphaToCoverageEnable, ms.alpha_to_coverage_enable);
        copy!(MsAlphaToOneEnable, ms.alpha_to_one_enable);
        copy!(MsSampleLocationsEnable, ms.sample_locations_enable);

        if src.set.contains(DynamicState::MsSampleLocations) {
            let src_sl = installed_ref(&src.ms.sample_locations, "sample locations");
            self.copy_sample_locations(src_sl);
        }

        copy!(DsDepthTestEnable, ds.depth.test_enable);
        copy!(DsDepthWriteEnable, ds.depth.write_enable);
        copy!(DsDepthCompareOp, ds.depth.compare_op);
        copy!(DsDepthBoundsTestEnable, ds.depth.bounds_test.enable);
        copy!(DsDepthBoundsTestBounds, ds.depth.bounds_test.min);
        copy!(DsDepthBoundsTestBounds, ds.depth.bounds_test.max);
        copy!(DsStencilTestEnable, ds.stencil.test_enable);
        copy!(DsStencilOp, ds.stencil.front.ops.fail_op);
        copy!(DsStencilOp, ds.stencil.front.ops.pass_op);
        copy!(DsStencilOp, ds.stencil.front.ops.depth_fail_op);
        copy!(DsStencilOp, ds.stencil.front.ops.compare_op);
        copy!(DsStencilOp, ds.stencil.back.ops.fail_op);
        copy!(DsStencilOp, ds.stencil.back.ops.pass_op);
        copy!(DsStencilOp, ds.stencil.back.ops.depth_fail_op);
        copy!(DsStencilOp, ds.stencil.back.ops.compare_op);
        copy!(DsStencilCompareMask, ds.stencil.front.compare_mask);
        copy!(DsStencilCompareMask, ds.stencil.back.compare_mask);
        copy!(DsStencilWriteMask, ds.stencil.front.write_mask);
        copy!(DsStencilWriteMask, ds.stencil.back.write_mask);
        copy!(DsStencilReference, ds.stencil.front.reference);
        copy!(DsStencilReference, ds.stencil.back.reference);

        copy!(CbLogicOpEnable, cb.logic_op_enable);
        copy!(CbLogicOp, cb.logic_op);
        copy!(CbAttachmentCount, cb.attachment_count);
        copy!(CbColorWriteEnables, cb.color_write_enables);

        for a in 0..MAX_COLOR_ATTACHMENTS {
            copy!(CbBlendEnables, cb.attachments[a].blend_enable);
            copy!(CbBlendEquations, cb.attachments[a].src_color_blend_factor);
            copy!(CbBlendEquations, cb.attachments[a].dst_color_blend_factor);
            copy!(CbBlendEquations, cb.attachments[a].color_blend_op);
            copy!(CbBlendEquations, cb.attachments[a].src_alpha_blend_factor);
            copy!(CbBlendEquations, cb.attachments[a].dst_alpha_blend_factor);
            copy!(CbBlendEquations, cb.attachments[a].alpha_blend_op);
            copy!(CbWriteMasks, cb.attachments[a].color_write_mask);
        }

        copy!(CbBlendConstants, cb.blend_constants);

        copy!(RpAttachments, rp.attachments);
        copy!(AttachmentFeedbackLoopEnable, feedback_loops);

        self.set |= src.set;
        self.dirty |= newly_set;
    }

    /// Returns whether `state` changed since the last call to [`clear_dirty`](Self::clear_dirty).
    #[inline]
    pub fn is_dirty(&self, state: DynamicState) -> bool {
        self.dirty.contains(state)
    }

    /// Returns whether any of `states` changed since the last call to
    /// [`clear_dirty`](Self::clear_dirty).
    #[inline]
    pub fn any_dirty(&self, states: DynamicStates) -> bool {
        self.dirty.intersects(states)
    }

    /// Forgets which states changed. Drivers call this once they have emitted the state.
    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = DynamicStates::empty();
    }

    fn copy_sample_locations(&mut self, src: &SampleLocationsState) {
        let dst = installed(&mut self.ms.sample_locations, "sample locations");
        let count = src.valid_locations().len();

        if !self.set.contains(DynamicState::MsSampleLocations)
            || dst.per_pixel != src.per_pixel
            || dst.grid_size != src.grid_size
            || dst.locations[..count] != src.locations[..count]
        {
            dst.per_pixel = src.per_pixel;
            dst.grid_size = src.grid_size;
            dst.locations[..count].copy_from_slice(&src.locations[..count]);
            self.set.insert(DynamicState::MsSampleLocations);
            self.dirty.insert(DynamicState::MsSampleLocations);
        }
    }
}

/// Discard rectangle state of a command buffer.
///
/// Unlike in a pipeline, the rectangles can be disabled without removing them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DiscardRectangleDynamicState {
    /// Whether the discard rectangle test is enabled.
    ///
    /// The default value is `false`.
    pub enable: bool,

    /// The default value is [`DiscardRectangleMode::Inclusive`].
    pub mode: DiscardRectangleMode,

    /// The default value is `0`.
    pub rectangle_count: u32,

    pub rectangles: [Scissor; MAX_DISCARD_RECTANGLES],
}

impl Default for DiscardRectangleDynamicState {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl DiscardRectangleDynamicState {
    #[inline]
    pub const fn new() -> Self {
        Self {
            enable: false,
            mode: DiscardRectangleMode::Inclusive,
            rectangle_count: 0,
            rectangles: [Scissor::new(); MAX_DISCARD_RECTANGLES],
        }
    }
}

/// Multisample state of a command buffer.
///
/// The sample shading parameters are not included, because they can't be set dynamically.
#[derive(Clone, Debug, PartialEq)]
pub struct MultisampleDynamicState {
    /// The default value is [`SampleCount::Sample1`].
    pub rasterization_samples: SampleCount,

    /// The default value is `0xffff`.
    pub sample_mask: u16,

    /// The default value is `false`.
    pub alpha_to_coverage_enable: bool,

    /// The default value is `false`.
    pub alpha_to_one_enable: bool,

    /// The default value is `false`.
    pub sample_locations_enable: bool,

    /// The custom sample locations, in storage installed by the driver.
    pub sample_locations: Option<Box<SampleLocationsState>>,
}

impl Default for MultisampleDynamicState {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl MultisampleDynamicState {
    #[inline]
    pub const fn new() -> Self {
        Self {
            rasterization_samples: SampleCount::Sample1,
            sample_mask: 0xffff,
            alpha_to_coverage_enable: false,
            alpha_to_one_enable: false,
            sample_locations_enable: false,
            sample_locations: None,
        }
    }
}

/// Render pass state of a command buffer, as far as graphics state depends on it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RenderPassDynamicState {
    /// The aspects of the attachments of the current render pass instance.
    ///
    /// The default value is empty.
    pub attachments: ImageAspects,
}

impl RenderPassDynamicState {
    #[inline]
    pub const fn new() -> Self {
        Self {
            attachments: ImageAspects::empty(),
        }
    }
}

#[track_caller]
fn installed<'a, T>(storage: &'a mut Option<Box<T>>, what: &str) -> &'a mut T {
    match storage {
        Some(storage) => storage,
        None => panic!("no {} storage is installed", what),
    }
}

#[track_caller]
fn installed_ref<'a, T>(storage: &'a Option<Box<T>>, what: &str) -> &'a T {
    match storage {
        Some(storage) => storage,
        None => panic!("no {} storage is installed", what),
    }
}

#[cfg(test)]
mod tests {
    use super::DynamicGraphicsState;
    use crate::{
        image::{ImageAspects, SampleCount},
        pipeline::{
            graphics::{
                color_blend::ColorBlendState,
                depth_stencil::{CompareOp, StencilFaces, StencilOp},
                input_assembly::{InputAssemblyState, PrimitiveTopology},
                multisample::{MultisampleState, SampleLocationsState},
                rasterization::{CullMode, RasterizationState},
                render_pass::RenderPassState,
                vertex_input::VertexInputState,
                viewport::{Viewport, ViewportState},
                GraphicsPipelineState, StateRef,
            },
            PipelineCreateFlags,
        },
        DynamicState, DynamicStates,
    };
    use std::{ptr, sync::Arc};

    fn with_storage() -> DynamicGraphicsState {
        let mut state = DynamicGraphicsState::new();
        state.install_vertex_input_storage(Box::default());
        state.install_sample_locations_storage(Box::default());
        state
    }

    fn viewport(width: f32) -> Viewport {
        Viewport {
            extent: [width, 100.0],
            max_depth: 1.0,
            ..Viewport::new()
        }
    }

    #[test]
    fn defaults() {
        let state = DynamicGraphicsState::new();

        assert_eq!(state.rs.line.width, 1.0);
        assert_eq!(state.ds.depth.bounds_test.max, 1.0);
        assert_eq!(state.ds.stencil.front.compare_mask, 0xff);
        assert_eq!(state.ds.stencil.back.write_mask, 0xff);
        assert_eq!(state.fsr.fragment_size, [1, 1]);
        assert_eq!(state.cb.color_write_enables, 0xff);
        assert_eq!(state.cb.attachment_count, 8);
        assert_eq!(state.ms.sample_mask, 0xffff);
        assert_eq!(state.ms.rasterization_samples, SampleCount::Sample1);
        assert!(state.set.is_empty());
        assert!(state.dirty.is_empty());
    }

    #[test]
    fn setter_marks_set_and_dirty_on_change() {
        let mut state = DynamicGraphicsState::new();

        // The first assignment always counts, even when it matches the default.
        state.set_line_width(1.0);
        assert!(state.set.contains(DynamicState::RsLineWidth));
        assert!(state.is_dirty(DynamicState::RsLineWidth));

        state.clear_dirty();
        state.set_line_width(1.0);
        assert!(!state.is_dirty(DynamicState::RsLineWidth));

        state.set_line_width(2.0);
        assert!(state.is_dirty(DynamicState::RsLineWidth));
        assert_eq!(state.rs.line.width, 2.0);
        assert!(!state.any_dirty(DynamicStates::from(DynamicState::RsCullMode)));
    }

    #[test]
    fn array_setter_compares_sub_range() {
        let mut state = DynamicGraphicsState::new();

        state.set_viewport_with_count(&[viewport(10.0), viewport(20.0)]);
        assert_eq!(state.vp.viewport_count, 2);
        assert!(state.is_dirty(DynamicState::VpViewportCount));
        assert!(state.is_dirty(DynamicState::VpViewports));

        state.clear_dirty();
        state.set_viewport(1, &[viewport(20.0)]);
        assert!(!state.is_dirty(DynamicState::VpViewports));

        state.set_viewport(1, &[viewport(30.0)]);
        assert!(state.is_dirty(DynamicState::VpViewports));
        assert!(!state.is_dirty(DynamicState::VpViewportCount));
        assert_eq!(state.vp.viewports[0], viewport(10.0));
        assert_eq!(state.vp.viewports[1], viewport(30.0));
    }

    #[test]
    fn stencil_setters_respect_faces() {
        let mut state = DynamicGraphicsState::new();

        state.set_stencil_op(
            StencilFaces::BACK,
            StencilOp::Zero,
            StencilOp::Replace,
            StencilOp::Invert,
            CompareOp::Less,
        );
        state.set_stencil_reference(StencilFaces::FRONT_AND_BACK, 3);

        assert_eq!(state.ds.stencil.front.ops.fail_op, StencilOp::Keep);
        assert_eq!(state.ds.stencil.back.ops.fail_op, StencilOp::Zero);
        assert_eq!(state.ds.stencil.back.ops.compare_op, CompareOp::Less);
        assert_eq!(state.ds.stencil.front.reference, 3);
        assert_eq!(state.ds.stencil.back.reference, 3);
        assert!(state.is_dirty(DynamicState::DsStencilOp));
    }

    #[test]
    fn fill_sets_without_dirtying() {
        let rs = RasterizationState {
            cull_mode: CullMode::Back,
            ..RasterizationState::new()
        };
        let pipeline = GraphicsPipelineState {
            dynamic: DynamicStates::from(DynamicState::RsLineWidth),
            rs: Some(StateRef::Owned(Arc::new(rs))),
            ..Default::default()
        };

        let mut state = DynamicGraphicsState::new();
        state.set_line_width(4.0);
        state.clear_dirty();
        state.fill(&pipeline);

        assert_eq!(state.rs.cull_mode, CullMode::Back);
        assert!(state.set.contains(DynamicState::RsCullMode));
        assert!(state.dirty.is_empty());

        // Dynamic in the pipeline, so the value set by the command buffer stays.
        assert_eq!(state.rs.line.width, 4.0);

        // Always set, even though the pipeline has no vertex input state.
        assert!(state.set.contains(DynamicState::ViBindingsValid));
    }

    #[test]
    fn fill_without_color_attachments() {
        let rp = RenderPassState {
            attachment_aspects: Some(ImageAspects::DEPTH),
            ..RenderPassState::new()
        };
        let pipeline = GraphicsPipelineState {
            rp: Some(StateRef::Owned(Arc::new(rp))),
            feedback_loop_flags: PipelineCreateFlags::DEPTH_STENCIL_ATTACHMENT_FEEDBACK_LOOP,
            ..Default::default()
        };

        let mut state = DynamicGraphicsState::new();
        state.fill(&pipeline);

        assert_eq!(state.cb.attachment_count, 0);
        assert!(state.set.contains(DynamicState::CbAttachmentCount));
        assert_eq!(state.rp.attachments, ImageAspects::DEPTH);
        assert_eq!(
            state.feedback_loops,
            ImageAspects::DEPTH | ImageAspects::STENCIL,
        );
        assert!(state.dirty.is_empty());
    }

    #[test]
    fn fill_copies_color_blend_and_sample_locations() {
        let mut cb = ColorBlendState {
            attachment_count: 2,
            color_write_enables: 0b01,
            ..ColorBlendState::new()
        };
        cb.attachments[1].blend_enable = true;

        let ms = MultisampleState {
            rasterization_samples: SampleCount::Sample4,
            sample_locations: Some(StateRef::Borrowed(SampleLocationsState::standard(
                SampleCount::Sample4,
            ))),
            ..MultisampleState::new()
        };

        let pipeline = GraphicsPipelineState {
            cb: Some(StateRef::Owned(Arc::new(cb))),
            ms: Some(StateRef::Owned(Arc::new(ms))),
            ..Default::default()
        };

        let mut state = with_storage();
        state.fill(&pipeline);

        assert_eq!(state.cb.attachment_count, 2);
        assert_eq!(state.cb.color_write_enables, 0b01);
        assert!(state.cb.attachments[1].blend_enable);
        assert_eq!(state.ms.rasterization_samples, SampleCount::Sample4);
        assert_eq!(
            state.ms.sample_locations.as_deref(),
            Some(SampleLocationsState::standard(SampleCount::Sample4)),
        );
    }

    #[test]
    fn copy_is_idempotent() {
        let mut src = with_storage();
        src.set_primitive_topology(PrimitiveTopology::LineStrip)
            .set_cull_mode(CullMode::Front)
            .set_viewport_with_count(&[viewport(64.0)])
            .set_blend_constants([0.5; 4])
            .set_sample_locations(SampleLocationsState::standard(SampleCount::Sample2));

        let mut dst = with_storage();
        dst.copy(&src);

        assert_eq!(dst.ia.primitive_topology, PrimitiveTopology::LineStrip);
        assert_eq!(dst.rs.cull_mode, CullMode::Front);
        assert_eq!(dst.vp.viewports[0], viewport(64.0));
        assert_eq!(dst.set, src.set);
        assert_eq!(dst.dirty, src.set);

        dst.clear_dirty();
        dst.copy(&src);
        assert!(dst.dirty.is_empty());
    }

    #[test]
    fn copy_dirties_newly_set_default_values() {
        let mut src = DynamicGraphicsState::new();
        src.set_line_width(1.0);
        src.clear_dirty();

        let mut dst = DynamicGraphicsState::new();
        dst.set.insert(DynamicState::RsCullMode);
        dst.copy(&src);

        assert!(dst.is_dirty(DynamicState::RsLineWidth));
        assert!(!dst.is_dirty(DynamicState::RsCullMode));
    }

    #[test]
    fn clear_keeps_storage() {
        let mut state = with_storage();
        state.set_vertex_input(
            &[ash::vk::VertexInputBindingDescription2EXT {
                binding: 0,
                stride: 16,
                input_rate: ash::vk::VertexInputRate::VERTEX,
                divisor: 1,
                ..Default::default()
            }],
            &[],
        );

        let vi: *const VertexInputState = state.vi.as_deref().unwrap();
        let sl: *const SampleLocationsState = state.ms.sample_locations.as_deref().unwrap();

        state.clear();

        assert!(ptr::eq(state.vi.as_deref().unwrap(), vi));
        assert!(ptr::eq(state.ms.sample_locations.as_deref().unwrap(), sl));
        assert_eq!(**state.vi.as_ref().unwrap(), VertexInputState::new());
        assert!(state.set.is_empty());

        state.init();
        assert_eq!(state, DynamicGraphicsState::new());
    }

    #[test]
    fn missing_vertex_input_storage() {
        let mut state = DynamicGraphicsState::new();

        assert_should_panic!("no vertex input storage is installed", {
            state.set_vertex_input(&[], &[]);
        });
    }

    #[test]
    fn input_assembly_from_pipeline() {
        let pipeline = GraphicsPipelineState {
            ia: Some(StateRef::Owned(Arc::new(InputAssemblyState {
                primitive_topology: PrimitiveTopology::PointList,
                primitive_restart_enable: true,
            }))),
            vp: Some(StateRef::Owned(Arc::new(ViewportState::new()))),
            ..Default::default()
        };

        let mut state = DynamicGraphicsState::new();
        state.fill(&pipeline);

        assert_eq!(state.ia.primitive_topology, PrimitiveTopology::PointList);
        assert!(state.ia.primitive_restart_enable);
        assert!(state.set.contains(DynamicState::VpScissorCount));
    }
}
