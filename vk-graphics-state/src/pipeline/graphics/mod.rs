// Copyright (c) 2026 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! The fixed-function state of a graphics pipeline.
//!
//! A graphics pipeline performs many separate steps, that execute more or less in sequence.
//! Most of them are configured by a collection of "state", which is described by one
//! sub-structure of `VkGraphicsPipelineCreateInfo`:
//!
//! 1. Vertex input and assembly: [`vertex_input`] and [`input_assembly`].
//! 2. (Optional) Tessellation: [`tessellation`].
//! 3. Vertex post-processing and rasterization: [`viewport`], [`discard_rectangle`] and
//!    [`rasterization`].
//! 4. Fragment operations: [`fragment_shading_rate`], [`multisample`] and [`depth_stencil`].
//! 5. Color attachment output: [`color_blend`], into the attachments of [`render_pass`].
//!
//! A [`GraphicsPipelineState`] holds one value for each of these groups that a pipeline provides
//! statically. Groups whose state is entirely dynamic, and groups that the pipeline doesn't
//! provide at all, are left out.
//!
//! # Pipeline libraries
//!
//! With `VK_EXT_graphics_pipeline_library`, a pipeline can be split into up to four libraries,
//! each providing some of the groups. Each library is filled on its own, and the results are
//! combined with [`GraphicsPipelineState::merge`] when the libraries are linked. Merging shares
//! the group values rather than copying them. [`GraphicsPipelineState::copy`] makes a snapshot
//! that owns all of its groups.

use self::{
    color_blend::ColorBlendState,
    depth_stencil::DepthStencilState,
    discard_rectangle::DiscardRectangleState,
    fragment_shading_rate::FragmentShadingRateState,
    input_assembly::InputAssemblyState,
    multisample::{MultisampleState, SampleLocationsState},
    rasterization::RasterizationState,
    render_pass::RenderPassState,
    tessellation::TessellationState,
    vertex_input::VertexInputState,
    viewport::ViewportState,
};
use crate::{
    chain::{find_struct, slice_from_raw},
    pipeline::{GraphicsPipelineLibraryFlags, PipelineCreateFlags, ShaderStages},
    DynamicState, DynamicStates, HostAllocation, HostAllocator, OomError, StateGroups,
};
use ash::vk;
use log::{debug, trace, warn};
use std::{alloc::Layout, fmt, ops::Deref, sync::Arc};

pub mod color_blend;
pub mod depth_stencil;
pub mod discard_rectangle;
pub mod fragment_shading_rate;
pub mod input_assembly;
pub mod multisample;
pub mod rasterization;
pub mod render_pass;
pub mod tessellation;
pub mod vertex_input;
pub mod viewport;

/// A reference to a state value that is either owned, or borrowed from storage that outlives
/// `'a`.
pub enum StateRef<'a, T> {
    /// The value was allocated for this state and is shared between its clones.
    Owned(Arc<T>),

    /// The value lives in caller-provided storage, or in a static table.
    Borrowed(&'a T),
}

impl<T> Deref for StateRef<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        match self {
            StateRef::Owned(value) => value,
            StateRef::Borrowed(value) => value,
        }
    }
}

impl<T> Clone for StateRef<'_, T> {
    #[inline]
    fn clone(&self) -> Self {
        match self {
            StateRef::Owned(value) => StateRef::Owned(value.clone()),
            StateRef::Borrowed(value) => StateRef::Borrowed(value),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for StateRef<'_, T> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<T: PartialEq> PartialEq for StateRef<'_, T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        **self == **other
    }
}

/// The static state of a graphics pipeline, or of a graphics pipeline library.
#[derive(Clone, Debug, Default)]
pub struct GraphicsPipelineState<'a> {
    /// The states that are dynamic in any of the groups this state was filled with.
    pub dynamic: DynamicStates,

    /// The shader stages that the pipeline contains.
    pub shader_stages: ShaderStages,

    /// The attachment feedback loops that the pipeline declares.
    pub feedback_loop_flags: PipelineCreateFlags,

    pub vi: Option<StateRef<'a, VertexInputState>>,
    pub ia: Option<StateRef<'a, InputAssemblyState>>,
    pub ts: Option<StateRef<'a, TessellationState>>,
    pub vp: Option<StateRef<'a, ViewportState>>,
    pub dr: Option<StateRef<'a, DiscardRectangleState>>,
    pub rs: Option<StateRef<'a, RasterizationState>>,
    pub fsr: Option<StateRef<'a, FragmentShadingRateState>>,
    pub ms: Option<StateRef<'a, MultisampleState<'a>>>,
    pub ds: Option<StateRef<'a, DepthStencilState>>,
    pub cb: Option<StateRef<'a, ColorBlendState>>,
    pub rp: Option<StateRef<'a, RenderPassState>>,

    /// The host allocations that the owned groups are accounted against.
    ///
    /// They are shared with the clones of this state and with the states it was merged into, and
    /// are given back to their allocator once the last of those is dropped.
    pub allocations: Vec<Arc<HostAllocation>>,
}

/// Storage for every group of a [`GraphicsPipelineState`], for drivers that keep the state
/// inside their pipeline object instead of allocating it.
#[derive(Debug, Default)]
pub struct GraphicsPipelineAllState<'a> {
    pub vi: VertexInputState,
    pub ia: InputAssemblyState,
    pub ts: TessellationState,
    pub vp: ViewportState,
    pub dr: DiscardRectangleState,
    pub rs: RasterizationState,
    pub fsr: FragmentShadingRateState,
    pub ms: MultisampleState<'a>,
    pub ds: DepthStencilState,
    pub cb: ColorBlendState,
    pub rp: RenderPassState,
    pub ms_sample_locations: SampleLocationsState,
}

impl<'a> GraphicsPipelineAllState<'a> {
    fn slots(&'a mut self) -> StateSlots<'a> {
        let Self {
            vi,
            ia,
            ts,
            vp,
            dr,
            rs,
            fsr,
            ms,
            ds,
            cb,
            rp,
            ms_sample_locations,
        } = self;

        StateSlots {
            vi: Some(vi),
            ia: Some(ia),
            ts: Some(ts),
            vp: Some(vp),
            dr: Some(dr),
            rs: Some(rs),
            fsr: Some(fsr),
            ms: Some(ms),
            ds: Some(ds),
            cb: Some(cb),
            rp: Some(rp),
            ms_sample_locations: Some(ms_sample_locations),
        }
    }
}

/// Where [`GraphicsPipelineState::fill`] puts the groups that it builds.
pub enum StateStorage<'a> {
    /// Write the groups into storage provided by the caller.
    Preallocated(&'a mut GraphicsPipelineAllState<'a>),

    /// Allocate the groups, after asking `allocator` for the memory with the given scope.
    Allocate(Arc<dyn HostAllocator>, vk::SystemAllocationScope),
}

impl fmt::Debug for StateStorage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateStorage::Preallocated(_) => f.write_str("Preallocated"),
            StateStorage::Allocate(_, scope) => f.debug_tuple("Allocate").field(scope).finish(),
        }
    }
}

#[derive(Default)]
struct StateSlots<'a> {
    vi: Option<&'a mut VertexInputState>,
    ia: Option<&'a mut InputAssemblyState>,
    ts: Option<&'a mut TessellationState>,
    vp: Option<&'a mut ViewportState>,
    dr: Option<&'a mut DiscardRectangleState>,
    rs: Option<&'a mut RasterizationState>,
    fsr: Option<&'a mut FragmentShadingRateState>,
    ms: Option<&'a mut MultisampleState<'a>>,
    ds: Option<&'a mut DepthStencilState>,
    cb: Option<&'a mut ColorBlendState>,
    rp: Option<&'a mut RenderPassState>,
    ms_sample_locations: Option<&'a mut SampleLocationsState>,
}

/// Puts `value` in `slot` if there is one, or in a new allocation otherwise.
fn place<'a, T>(slot: Option<&'a mut T>, value: T) -> StateRef<'a, T> {
    match slot {
        Some(slot) => {
            *slot = value;
            StateRef::Borrowed(slot)
        }
        None => StateRef::Owned(Arc::new(value)),
    }
}

/// Returns the layout of a single allocation that holds all of `groups`.
fn groups_layout(groups: StateGroups, sample_locations: bool) -> Layout {
    let group_layouts = [
        (StateGroups::VERTEX_INPUT, Layout::new::<VertexInputState>()),
        (StateGroups::INPUT_ASSEMBLY, Layout::new::<InputAssemblyState>()),
        (StateGroups::TESSELLATION, Layout::new::<TessellationState>()),
        (StateGroups::VIEWPORT, Layout::new::<ViewportState>()),
        (StateGroups::DISCARD_RECTANGLES, Layout::new::<DiscardRectangleState>()),
        (StateGroups::RASTERIZATION, Layout::new::<RasterizationState>()),
        (StateGroups::FRAGMENT_SHADING_RATE, Layout::new::<FragmentShadingRateState>()),
        (StateGroups::MULTISAMPLE, Layout::new::<MultisampleState<'static>>()),
        (StateGroups::DEPTH_STENCIL, Layout::new::<DepthStencilState>()),
        (StateGroups::COLOR_BLEND, Layout::new::<ColorBlendState>()),
        (StateGroups::RENDER_PASS, Layout::new::<RenderPassState>()),
    ];

    group_layouts
        .into_iter()
        .filter(|&(group, _)| groups.intersects(group))
        .map(|(_, layout)| layout)
        .chain(sample_locations.then(Layout::new::<SampleLocationsState>))
        .fold(Layout::new::<()>(), |layout, next| match layout.extend(next) {
            Ok((layout, _)) => layout,
            Err(_) => unreachable!("graphics state layouts are small"),
        })
        .pad_to_align()
}

/// Asks `allocator` for one allocation of `layout`.
fn allocate(
    allocator: Arc<dyn HostAllocator>,
    layout: Layout,
    scope: vk::SystemAllocationScope,
) -> Result<Arc<HostAllocation>, OomError> {
    HostAllocation::new(allocator, layout, scope)
        .map(Arc::new)
        .inspect_err(|err| {
            warn!(
                "refused {} bytes of graphics pipeline state ({:?}): {}",
                layout.size(),
                scope,
                err,
            )
        })
}

impl<'a> GraphicsPipelineState<'a> {
    /// Returns an empty `GraphicsPipelineState`.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the groups that are present.
    pub fn groups(&self) -> StateGroups {
        let mut groups = StateGroups::empty();

        let present = [
            (StateGroups::VERTEX_INPUT, self.vi.is_some()),
            (StateGroups::INPUT_ASSEMBLY, self.ia.is_some()),
            (StateGroups::TESSELLATION, self.ts.is_some()),
            (StateGroups::VIEWPORT, self.vp.is_some()),
            (StateGroups::DISCARD_RECTANGLES, self.dr.is_some()),
            (StateGroups::RASTERIZATION, self.rs.is_some()),
            (StateGroups::FRAGMENT_SHADING_RATE, self.fsr.is_some()),
            (StateGroups::MULTISAMPLE, self.ms.is_some()),
            (StateGroups::DEPTH_STENCIL, self.ds.is_some()),
            (StateGroups::COLOR_BLEND, self.cb.is_some()),
            (StateGroups::RENDER_PASS, self.rp.is_some()),
        ];

        for (group, is_present) in present {
            if is_present {
                groups |= group;
            }
        }

        groups
    }

    /// Adds the state of `info` to `self`.
    ///
    /// Only the groups that `info` is responsible for, and that `self` doesn't have yet, are
    /// built. This makes it possible to fill the same state with a pipeline library and then
    /// with the pipeline that links it.
    ///
    /// `driver_rp` is the driver's state of `info.render_pass`, if that is not null, and
    /// `driver_rp_flags` are the attachment feedback loop flags of the render pass.
    ///
    /// # Safety
    ///
    /// - `info` must be a valid `VkGraphicsPipelineCreateInfo`, including everything it points
    ///   to.
    ///
    /// # Panics
    ///
    /// - Panics if `info` violates one of the rules that Vulkan validation checks, as far as the
    ///   state is concerned.
    pub unsafe fn fill(
        &mut self,
        info: &vk::GraphicsPipelineCreateInfo<'_>,
        driver_rp: Option<&RenderPassState>,
        driver_rp_flags: PipelineCreateFlags,
        storage: StateStorage<'a>,
    ) -> Result<(), OomError> {
        let flags = PipelineCreateFlags::from(info.flags);
        let library_info: Option<&vk::GraphicsPipelineLibraryCreateInfoEXT<'_>> =
            unsafe { find_struct(info.p_next) };
        let link_info: Option<&vk::PipelineLibraryCreateInfoKHR<'_>> =
            unsafe { find_struct(info.p_next) };

        let allowed_stages = if !flags.intersects(PipelineCreateFlags::LIBRARY) {
            ShaderStages::all()
        } else if let Some(library_info) = library_info {
            let library_flags = GraphicsPipelineLibraryFlags::from(library_info.flags);
            let mut allowed_stages = ShaderStages::empty();

            if library_flags.intersects(GraphicsPipelineLibraryFlags::PRE_RASTERIZATION_SHADERS) {
                allowed_stages |= ShaderStages::PRE_RASTERIZATION;
            }

            if library_flags.intersects(GraphicsPipelineLibraryFlags::FRAGMENT_SHADER) {
                allowed_stages |= ShaderStages::FRAGMENT;
            }

            allowed_stages
        } else {
            // Without library flags, a library is as if it provides nothing.
            ShaderStages::empty()
        };

        let stages = unsafe { slice_from_raw(info.p_stages, info.stage_count) };

        for stage in stages {
            self.shader_stages |= ShaderStages::from(stage.stage) & allowed_stages;
        }

        let info_dynamic = unsafe { DynamicStates::from_create_info(info.p_dynamic_state.as_ref()) };

        let lib = if let Some(library_info) = library_info {
            GraphicsPipelineLibraryFlags::from(library_info.flags)
        } else if link_info.is_some_and(|link_info| link_info.library_count > 0)
            || flags.intersects(PipelineCreateFlags::LIBRARY)
        {
            GraphicsPipelineLibraryFlags::empty()
        } else {
            let mut lib = GraphicsPipelineLibraryFlags::PRE_RASTERIZATION_SHADERS;

            if self.shader_stages.intersects(ShaderStages::VERTEX) {
                lib |= GraphicsPipelineLibraryFlags::VERTEX_INPUT_INTERFACE;
            }

            if unsafe { self.may_have_rasterization(info_dynamic, info) } {
                lib |= GraphicsPipelineLibraryFlags::FRAGMENT_SHADER
                    | GraphicsPipelineLibraryFlags::FRAGMENT_OUTPUT_INTERFACE;
            }

            lib
        };

        let mut needs = StateGroups::empty();

        if lib.intersects(GraphicsPipelineLibraryFlags::VERTEX_INPUT_INTERFACE)
            && (!lib.intersects(GraphicsPipelineLibraryFlags::PRE_RASTERIZATION_SHADERS)
                || self.shader_stages.intersects(ShaderStages::VERTEX))
        {
            needs |= StateGroups::VERTEX_INPUT | StateGroups::INPUT_ASSEMBLY;
        }

        let mut rp = None;

        if lib.intersects(
            GraphicsPipelineLibraryFlags::PRE_RASTERIZATION_SHADERS
                | GraphicsPipelineLibraryFlags::FRAGMENT_SHADER
                | GraphicsPipelineLibraryFlags::FRAGMENT_OUTPUT_INTERFACE,
        ) {
            let new_rp = unsafe { RenderPassState::from_vk(self.rp.as_deref(), driver_rp, info, lib) };
            needs |= StateGroups::RENDER_PASS;

            // A complete render pass replaces an incomplete one.
            if self.rp.as_ref().is_some_and(|old| !old.is_complete()) && new_rp.is_complete() {
                self.rp = None;
            }

            rp = Some(new_rp);
        }

        if lib.intersects(GraphicsPipelineLibraryFlags::PRE_RASTERIZATION_SHADERS) {
            if self.shader_stages.intersects(
                ShaderStages::TESSELLATION_CONTROL | ShaderStages::TESSELLATION_EVALUATION,
            ) {
                needs |= StateGroups::TESSELLATION;
            }

            needs |= StateGroups::RASTERIZATION;

            if unsafe { self.may_have_rasterization(info_dynamic, info) } {
                needs |= StateGroups::VIEWPORT
                    | StateGroups::DISCARD_RECTANGLES
                    | StateGroups::FRAGMENT_SHADING_RATE;
            }
        }

        if lib.intersects(GraphicsPipelineLibraryFlags::FRAGMENT_SHADER) {
            needs |= StateGroups::FRAGMENT_SHADING_RATE;

            if !info.p_multisample_state.is_null() {
                needs |= StateGroups::MULTISAMPLE;
            }

            if rp.is_some_and(|rp| !rp.is_complete() || rp.has_depth() || rp.has_stencil()) {
                needs |= StateGroups::DEPTH_STENCIL;
            }
        }

        if lib.intersects(GraphicsPipelineLibraryFlags::FRAGMENT_OUTPUT_INTERFACE) {
            if rp.is_some_and(|rp| rp.has_color()) {
                needs |= StateGroups::COLOR_BLEND;
            }

            needs |= StateGroups::MULTISAMPLE;

            self.feedback_loop_flags |= flags & PipelineCreateFlags::FEEDBACK_LOOPS;

            if info.render_pass != vk::RenderPass::null() {
                self.feedback_loop_flags |= driver_rp_flags & PipelineCreateFlags::FEEDBACK_LOOPS;
            }
        }

        needs -= self.groups();

        let mut dynamic_filter = DynamicStates::from_groups(needs);

        // The feedback loop state belongs to the render pass group, which every library has,
        // but it only means something to the fragment output interface.
        if !lib.intersects(GraphicsPipelineLibraryFlags::FRAGMENT_OUTPUT_INTERFACE) {
            dynamic_filter.remove(DynamicState::AttachmentFeedbackLoopEnable);
        }

        let dynamic = info_dynamic & dynamic_filter;
        self.dynamic |= dynamic;
        needs -= self.dynamic.fully_dynamic_groups();

        debug!(
            "filling graphics pipeline state: library flags {:?}, stages {:?}, groups {:?}",
            lib, self.shader_stages, needs,
        );

        if needs.is_empty() {
            trace!("no graphics pipeline state groups to build");
            return Ok(());
        }

        let ms_info = unsafe { info.p_multisample_state.as_ref() };
        let store_sample_locations = needs.intersects(StateGroups::MULTISAMPLE)
            && unsafe { MultisampleState::needs_sample_locations_storage(dynamic, ms_info) };

        let mut slots = match storage {
            StateStorage::Preallocated(all) => all.slots(),
            StateStorage::Allocate(allocator, scope) => {
                let allocation =
                    allocate(allocator, groups_layout(needs, store_sample_locations), scope)?;
                self.allocations.push(allocation);
                StateSlots::default()
            }
        };

        if needs.intersects(StateGroups::VERTEX_INPUT) {
            let vi = unsafe { VertexInputState::from_vk(dynamic, info.p_vertex_input_state.as_ref()) };
            self.vi = Some(place(slots.vi.take(), vi));
        }

        if needs.intersects(StateGroups::INPUT_ASSEMBLY) {
            let ia = InputAssemblyState::from_vk(dynamic, unsafe {
                info.p_input_assembly_state.as_ref()
            });
            self.ia = Some(place(slots.ia.take(), ia));
        }

        if needs.intersects(StateGroups::TESSELLATION) {
            let ts = unsafe {
                TessellationState::from_vk(dynamic, info.p_tessellation_state.as_ref())
            };
            self.ts = Some(place(slots.ts.take(), ts));
        }

        if needs.intersects(StateGroups::VIEWPORT) {
            let vp = unsafe { ViewportState::from_vk(dynamic, info.p_viewport_state.as_ref()) };
            self.vp = Some(place(slots.vp.take(), vp));
        }

        if needs.intersects(StateGroups::DISCARD_RECTANGLES) {
            let dr = unsafe { DiscardRectangleState::from_vk(dynamic, find_struct(info.p_next)) };
            self.dr = Some(place(slots.dr.take(), dr));
        }

        if needs.intersects(StateGroups::RASTERIZATION) {
            let rs = unsafe {
                RasterizationState::from_vk(dynamic, info.p_rasterization_state.as_ref())
            };
            self.rs = Some(place(slots.rs.take(), rs));
        }

        if needs.intersects(StateGroups::FRAGMENT_SHADING_RATE) {
            let fsr =
                FragmentShadingRateState::from_vk(dynamic, unsafe { find_struct(info.p_next) });
            self.fsr = Some(place(slots.fsr.take(), fsr));
        }

        if needs.intersects(StateGroups::MULTISAMPLE) {
            let sample_locations_slot = slots.ms_sample_locations.take();
            let ms = unsafe {
                MultisampleState::from_vk(dynamic, ms_info, |locations| {
                    Ok(place(sample_locations_slot, locations))
                })
            }?;
            self.ms = Some(place(slots.ms.take(), ms));
        }

        if needs.intersects(StateGroups::DEPTH_STENCIL) {
            let ds = DepthStencilState::from_vk(dynamic, unsafe {
                info.p_depth_stencil_state.as_ref()
            });
            self.ds = Some(place(slots.ds.take(), ds));
        }

        if needs.intersects(StateGroups::COLOR_BLEND) {
            let cb = unsafe { ColorBlendState::from_vk(dynamic, info.p_color_blend_state.as_ref()) };
            self.cb = Some(place(slots.cb.take(), cb));
        }

        if needs.intersects(StateGroups::RENDER_PASS) {
            if let Some(rp) = rp {
                self.rp = Some(place(slots.rp.take(), rp));
            }
        }

        Ok(())
    }

    /// Returns whether rasterization can happen, as far as is known when filling from `info`.
    unsafe fn may_have_rasterization(
        &self,
        dynamic: DynamicStates,
        info: &vk::GraphicsPipelineCreateInfo<'_>,
    ) -> bool {
        match &self.rs {
            // A dynamic discard is built as `false`.
            Some(rs) => !rs.rasterizer_discard_enable,
            None => {
                dynamic.contains(DynamicState::RsRasterizerDiscardEnable)
                    || unsafe { info.p_rasterization_state.as_ref() }
                        .map_or(true, |rs| rs.rasterizer_discard_enable == vk::FALSE)
            }
        }
    }

    /// Adds the state of the pipeline library `src` to `self`.
    ///
    /// Groups that `self` already has are kept, except that an incomplete render pass is
    /// replaced by a complete one.
    pub fn merge(&mut self, src: &GraphicsPipelineState<'a>) {
        self.dynamic |= src.dynamic;
        self.shader_stages |= src.shader_stages;
        self.feedback_loop_flags |= src.feedback_loop_flags;

        if let (Some(dst_rp), Some(src_rp)) = (&self.rp, &src.rp) {
            if !dst_rp.is_complete() && src_rp.is_complete() {
                self.rp = Some(src_rp.clone());
            }
        }

        macro_rules! merge_groups {
            ($($group:ident),+) => {
                $(
                    if self.$group.is_none() {
                        self.$group = src.$group.clone();
                    }
                )+
            };
        }

        merge_groups!(vi, ia, ts, vp, dr, rs, fsr, ms, ds, cb, rp);

        for allocation in &src.allocations {
            if !self.allocations.iter().any(|a| Arc::ptr_eq(a, allocation)) {
                self.allocations.push(allocation.clone());
            }
        }
    }

    /// Returns a copy of `self` that owns all of its groups.
    ///
    /// Groups that have become fully dynamic, for example because a library that was merged
    /// later made them dynamic, are left out.
    pub fn copy(
        &self,
        allocator: Arc<dyn HostAllocator>,
        scope: vk::SystemAllocationScope,
    ) -> Result<GraphicsPipelineState<'static>, OomError> {
        let groups = self.groups() - self.dynamic.fully_dynamic_groups();
        let sample_locations = groups.intersects(StateGroups::MULTISAMPLE)
            && self
                .ms
                .as_ref()
                .is_some_and(|ms| ms.sample_locations.is_some());

        let allocations = if groups.is_empty() {
            Vec::new()
        } else {
            vec![allocate(
                allocator,
                groups_layout(groups, sample_locations),
                scope,
            )?]
        };

        fn own<T: Copy>(
            groups: StateGroups,
            group: StateGroups,
            value: &Option<StateRef<'_, T>>,
        ) -> Option<StateRef<'static, T>> {
            value
                .as_deref()
                .filter(|_| groups.intersects(group))
                .map(|value| StateRef::Owned(Arc::new(*value)))
        }

        let ms = self
            .ms
            .as_deref()
            .filter(|_| groups.intersects(StateGroups::MULTISAMPLE))
            .map(|ms| {
                StateRef::Owned(Arc::new(MultisampleState {
                    rasterization_samples: ms.rasterization_samples,
                    sample_shading_enable: ms.sample_shading_enable,
                    min_sample_shading: ms.min_sample_shading,
                    sample_mask: ms.sample_mask,
                    alpha_to_coverage_enable: ms.alpha_to_coverage_enable,
                    alpha_to_one_enable: ms.alpha_to_one_enable,
                    sample_locations_enable: ms.sample_locations_enable,
                    sample_locations: ms
                        .sample_locations
                        .as_deref()
                        .map(|locations| StateRef::Owned(Arc::new(*locations))),
                }))
            });

        Ok(GraphicsPipelineState {
            dynamic: self.dynamic,
            shader_stages: self.shader_stages,
            feedback_loop_flags: self.feedback_loop_flags,
            vi: own(groups, StateGroups::VERTEX_INPUT, &self.vi),
            ia: own(groups, StateGroups::INPUT_ASSEMBLY, &self.ia),
            ts: own(groups, StateGroups::TESSELLATION, &self.ts),
            vp: own(groups, StateGroups::VIEWPORT, &self.vp),
            dr: own(groups, StateGroups::DISCARD_RECTANGLES, &self.dr),
            rs: own(groups, StateGroups::RASTERIZATION, &self.rs),
            fsr: own(groups, StateGroups::FRAGMENT_SHADING_RATE, &self.fsr),
            ms,
            ds: own(groups, StateGroups::DEPTH_STENCIL, &self.ds),
            cb: own(groups, StateGroups::COLOR_BLEND, &self.cb),
            rp: own(groups, StateGroups::RENDER_PASS, &self.rp),
            allocations,
        })
    }

    /// Returns the states whose value the pipeline provides.
    ///
    /// These are the states of every present group, minus the dynamic ones.
    /// [`DynamicState::ViBindingsValid`] is included unless it is dynamic, even without vertex
    /// input state, because drivers rely on it on its own.
    pub fn static_states(&self) -> DynamicStates {
        let mut states = DynamicStates::from_groups(self.groups()) - self.dynamic;

        if !self.dynamic.contains(DynamicState::ViBindingsValid) {
            states.insert(DynamicState::ViBindingsValid);
        }

        states
    }
}

#[cfg(test)]
mod tests {
    use super::{
        multisample::SampleLocationsState, render_pass::RenderPassState, GraphicsPipelineAllState,
        GraphicsPipelineState, StateRef, StateStorage,
    };
    use crate::{
        image::{ImageAspects, SampleCount},
        pipeline::{PipelineCreateFlags, ShaderStages},
        DynamicState, DynamicStates, LimitedAllocator, OomError, StateGroups, SystemAllocator,
    };
    use ash::vk;
    use std::sync::Arc;

    const SCOPE: vk::SystemAllocationScope = vk::SystemAllocationScope::OBJECT;

    fn allocate() -> StateStorage<'static> {
        StateStorage::Allocate(Arc::new(SystemAllocator), SCOPE)
    }

    fn stage(stage: vk::ShaderStageFlags) -> vk::PipelineShaderStageCreateInfo<'static> {
        vk::PipelineShaderStageCreateInfo::default().stage(stage)
    }

    #[test]
    fn vertex_only_discard() {
        let stages = [stage(vk::ShaderStageFlags::VERTEX)];
        let vertex_input = vk::PipelineVertexInputStateCreateInfo::default();
        let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::default()
            .topology(vk::PrimitiveTopology::TRIANGLE_LIST);
        let rasterization =
            vk::PipelineRasterizationStateCreateInfo::default().rasterizer_discard_enable(true);
        let info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&stages)
            .vertex_input_state(&vertex_input)
            .input_assembly_state(&input_assembly)
            .rasterization_state(&rasterization);

        let mut state = GraphicsPipelineState::new();
        unsafe { state.fill(&info, None, PipelineCreateFlags::empty(), allocate()) }.unwrap();

        assert_eq!(state.shader_stages, ShaderStages::VERTEX);
        assert_eq!(
            state.groups(),
            StateGroups::VERTEX_INPUT
                | StateGroups::INPUT_ASSEMBLY
                | StateGroups::RASTERIZATION
                | StateGroups::RENDER_PASS,
        );
        assert!(state.rs.as_ref().unwrap().rasterizer_discard_enable);
    }

    #[test]
    fn complete_pipeline() {
        let stages = [
            stage(vk::ShaderStageFlags::VERTEX),
            stage(vk::ShaderStageFlags::FRAGMENT),
        ];
        let vertex_input = vk::PipelineVertexInputStateCreateInfo::default();
        let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::default();
        let viewport = vk::PipelineViewportStateCreateInfo::default()
            .viewport_count(1)
            .scissor_count(1);
        let rasterization = vk::PipelineRasterizationStateCreateInfo::default().line_width(1.0);
        let multisample = vk::PipelineMultisampleStateCreateInfo::default()
            .rasterization_samples(vk::SampleCountFlags::TYPE_4);
        let depth_stencil = vk::PipelineDepthStencilStateCreateInfo::default()
            .depth_test_enable(true)
            .depth_compare_op(vk::CompareOp::LESS);
        let attachments = [vk::PipelineColorBlendAttachmentState::default()
            .color_write_mask(vk::ColorComponentFlags::R | vk::ColorComponentFlags::G)];
        let color_blend =
            vk::PipelineColorBlendStateCreateInfo::default().attachments(&attachments);
        let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
        let dynamic = vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&dynamic_states);
        let formats = [vk::Format::R8G8B8A8_UNORM];
        let mut rendering = vk::PipelineRenderingCreateInfo::default()
            .color_attachment_formats(&formats)
            .depth_attachment_format(vk::Format::D32_SFLOAT);
        let info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&stages)
            .vertex_input_state(&vertex_input)
            .input_assembly_state(&input_assembly)
            .viewport_state(&viewport)
            .rasterization_state(&rasterization)
            .multisample_state(&multisample)
            .depth_stencil_state(&depth_stencil)
            .color_blend_state(&color_blend)
            .dynamic_state(&dynamic)
            .push_next(&mut rendering);

        let mut state = GraphicsPipelineState::new();
        unsafe { state.fill(&info, None, PipelineCreateFlags::empty(), allocate()) }.unwrap();

        assert_eq!(
            state.groups(),
            StateGroups::all() - StateGroups::TESSELLATION,
        );
        assert_eq!(
            state.dynamic,
            [DynamicState::VpViewports, DynamicState::VpScissors]
                .into_iter()
                .collect(),
        );
        assert_eq!(state.vp.as_ref().unwrap().viewport_count, 1);
        assert_eq!(
            state.ms.as_ref().unwrap().rasterization_samples,
            SampleCount::Sample4,
        );
        assert_eq!(state.cb.as_ref().unwrap().attachment_count, 1);
        assert!(state.ds.as_ref().unwrap().depth.test_enable);
        assert_eq!(
            state.rp.as_ref().unwrap().attachment_aspects,
            Some(ImageAspects::COLOR | ImageAspects::DEPTH),
        );

        let static_states = state.static_states();
        assert!(!static_states.contains(DynamicState::VpViewports));
        assert!(static_states.contains(DynamicState::VpViewportCount));
        assert!(static_states.contains(DynamicState::ViBindingsValid));
        assert!(!static_states.contains(DynamicState::TsPatchControlPoints));

        // Filling again with the same info builds nothing new.
        let vi = state.vi.clone();
        unsafe { state.fill(&info, None, PipelineCreateFlags::empty(), allocate()) }.unwrap();
        assert!(matches!(
            (&vi, &state.vi),
            (Some(StateRef::Owned(a)), Some(StateRef::Owned(b))) if Arc::ptr_eq(a, b),
        ));
    }

    #[test]
    fn fully_dynamic_group_not_built() {
        let stages = [stage(vk::ShaderStageFlags::VERTEX)];
        let vertex_input = vk::PipelineVertexInputStateCreateInfo::default();
        let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::default();
        let rasterization = vk::PipelineRasterizationStateCreateInfo::default();
        let dynamic_states = [
            vk::DynamicState::VIEWPORT_WITH_COUNT,
            vk::DynamicState::SCISSOR_WITH_COUNT,
            vk::DynamicState::DEPTH_CLIP_NEGATIVE_ONE_TO_ONE_EXT,
            vk::DynamicState::VERTEX_INPUT_EXT,
        ];
        let dynamic = vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&dynamic_states);
        let info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&stages)
            .vertex_input_state(&vertex_input)
            .input_assembly_state(&input_assembly)
            .rasterization_state(&rasterization)
            .dynamic_state(&dynamic);

        let mut state = GraphicsPipelineState::new();
        unsafe { state.fill(&info, None, PipelineCreateFlags::empty(), allocate()) }.unwrap();

        assert!(state.vp.is_none());
        assert!(state.vi.is_none());
        assert!(state.ia.is_some());
        assert!(state.dynamic.contains(DynamicState::VpScissorCount));
        assert!(!state.static_states().contains(DynamicState::ViBindingsValid));
    }

    #[test]
    fn out_of_memory() {
        let stages = [stage(vk::ShaderStageFlags::VERTEX)];
        let rasterization = vk::PipelineRasterizationStateCreateInfo::default();
        let info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&stages)
            .rasterization_state(&rasterization);
        let allocator = Arc::new(LimitedAllocator::new(0));

        let mut state = GraphicsPipelineState::new();
        let result = unsafe {
            state.fill(
                &info,
                None,
                PipelineCreateFlags::empty(),
                StateStorage::Allocate(allocator.clone(), SCOPE),
            )
        };

        assert_eq!(result, Err(OomError::OutOfHostMemory));
        assert!(state.groups().is_empty());

        let allocator = Arc::new(LimitedAllocator::new(1 << 20));
        unsafe {
            state.fill(
                &info,
                None,
                PipelineCreateFlags::empty(),
                StateStorage::Allocate(allocator.clone(), SCOPE),
            )
        }
        .unwrap();
        assert!(allocator.remaining() < 1 << 20);
        assert!(state.groups().contains(StateGroups::RASTERIZATION));
    }

    #[test]
    fn dropped_state_returns_memory() {
        let stages = [stage(vk::ShaderStageFlags::VERTEX)];
        let rasterization = vk::PipelineRasterizationStateCreateInfo::default();
        let info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&stages)
            .rasterization_state(&rasterization);
        let fill = |allocator: &Arc<LimitedAllocator>| {
            let mut state = GraphicsPipelineState::new();
            unsafe {
                state.fill(
                    &info,
                    None,
                    PipelineCreateFlags::empty(),
                    StateStorage::Allocate(allocator.clone(), SCOPE),
                )
            }
            .map(|()| state)
        };

        let budget = 1 << 20;
        let allocator = Arc::new(LimitedAllocator::new(budget));
        let state = fill(&allocator).unwrap();
        let used = budget - allocator.remaining();
        assert!(used > 0);
        assert_eq!(state.allocations.len(), 1);
        assert_eq!(state.allocations[0].layout().size(), used);

        // Clones and merged states share the allocation.
        let clone = state.clone();
        let mut merged = GraphicsPipelineState::new();
        merged.merge(&state);
        merged.merge(&clone);
        assert_eq!(merged.allocations.len(), 1);
        drop(state);
        drop(clone);
        assert_eq!(allocator.remaining(), budget - used);
        drop(merged);
        assert_eq!(allocator.remaining(), budget);

        // A budget of exactly one state can be reused as long as the states are dropped.
        let allocator = Arc::new(LimitedAllocator::new(used));
        for _ in 0..3 {
            let state = fill(&allocator).unwrap();
            assert_eq!(allocator.remaining(), 0);
            assert_eq!(fill(&allocator).unwrap_err(), OomError::OutOfHostMemory);

            let copy = state.copy(allocator.clone(), SCOPE);
            assert_eq!(copy.unwrap_err(), OomError::OutOfHostMemory);
            drop(state);
            assert_eq!(allocator.remaining(), used);
        }

        let state = fill(&allocator).unwrap();
        let copy = state.copy(Arc::new(SystemAllocator), SCOPE).unwrap();
        drop(state);
        assert_eq!(allocator.remaining(), used);
        assert!(copy.groups().contains(StateGroups::RASTERIZATION));
    }

    #[test]
    fn preallocated_storage() {
        let stages = [
            stage(vk::ShaderStageFlags::VERTEX),
            stage(vk::ShaderStageFlags::FRAGMENT),
        ];
        let rasterization = vk::PipelineRasterizationStateCreateInfo::default();
        let locations = [vk::SampleLocationEXT { x: 0.5, y: 0.5 }; 2];
        let sample_locations_info = vk::SampleLocationsInfoEXT::default()
            .sample_locations_per_pixel(vk::SampleCountFlags::TYPE_2)
            .sample_location_grid_size(vk::Extent2D {
                width: 1,
                height: 1,
            })
            .sample_locations(&locations);
        let mut sample_locations = vk::PipelineSampleLocationsStateCreateInfoEXT::default()
            .sample_locations_enable(true)
            .sample_locations_info(sample_locations_info);
        let multisample = vk::PipelineMultisampleStateCreateInfo::default()
            .rasterization_samples(vk::SampleCountFlags::TYPE_2)
            .push_next(&mut sample_locations);
        let info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&stages)
            .rasterization_state(&rasterization)
            .multisample_state(&multisample);

        let mut storage = GraphicsPipelineAllState::default();
        let mut state = GraphicsPipelineState::new();
        unsafe {
            state.fill(
                &info,
                None,
                PipelineCreateFlags::empty(),
                StateStorage::Preallocated(&mut storage),
            )
        }
        .unwrap();

        assert!(matches!(state.rs, Some(StateRef::Borrowed(_))));

        let ms = state.ms.as_deref().unwrap();
        assert!(ms.sample_locations_enable);
        let locations = ms.sample_locations.as_ref().unwrap();
        assert!(matches!(locations, StateRef::Borrowed(_)));
        assert_eq!(locations.per_pixel, SampleCount::Sample2);
        assert_ne!(
            &**locations,
            SampleLocationsState::standard(SampleCount::Sample2),
        );

        let copy = state.copy(Arc::new(SystemAllocator), SCOPE).unwrap();
        assert!(matches!(copy.rs, Some(StateRef::Owned(_))));
        assert_eq!(copy.ms, state.ms);
        assert_eq!(copy.rs, state.rs);
    }

    #[test]
    fn library_linking() {
        let flags = vk::PipelineCreateFlags::LIBRARY_KHR;
        let vertex_stages = [stage(vk::ShaderStageFlags::VERTEX)];
        let fragment_stages = [stage(vk::ShaderStageFlags::FRAGMENT)];
        let vertex_input = vk::PipelineVertexInputStateCreateInfo::default();
        let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::default();
        let viewport = vk::PipelineViewportStateCreateInfo::default();
        let rasterization = vk::PipelineRasterizationStateCreateInfo::default();
        let depth_stencil = vk::PipelineDepthStencilStateCreateInfo::default();
        let multisample = vk::PipelineMultisampleStateCreateInfo::default()
            .rasterization_samples(vk::SampleCountFlags::TYPE_1);
        let color_blend = vk::PipelineColorBlendStateCreateInfo::default();
        let formats = [vk::Format::B8G8R8A8_SRGB];
        let feedback_dynamic = [vk::DynamicState::ATTACHMENT_FEEDBACK_LOOP_ENABLE_EXT];
        let dynamic =
            vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&feedback_dynamic);
        let rendering = || {
            vk::PipelineRenderingCreateInfo::default()
                .view_mask(1)
                .color_attachment_formats(&formats)
        };
        let library = |flags| vk::GraphicsPipelineLibraryCreateInfoEXT::default().flags(flags);

        let mut vertex_input_library = GraphicsPipelineState::new();
        let mut library_info = library(vk::GraphicsPipelineLibraryFlagsEXT::VERTEX_INPUT_INTERFACE);
        let info = vk::GraphicsPipelineCreateInfo::default()
            .flags(flags)
            .vertex_input_state(&vertex_input)
            .input_assembly_state(&input_assembly)
            .push_next(&mut library_info);
        unsafe { vertex_input_library.fill(&info, None, PipelineCreateFlags::empty(), allocate()) }
            .unwrap();
        assert_eq!(
            vertex_input_library.groups(),
            StateGroups::VERTEX_INPUT | StateGroups::INPUT_ASSEMBLY,
        );

        let mut pre_rasterization_library = GraphicsPipelineState::new();
        let mut library_info =
            library(vk::GraphicsPipelineLibraryFlagsEXT::PRE_RASTERIZATION_SHADERS);
        let mut rendering_info = rendering();
        let info = vk::GraphicsPipelineCreateInfo::default()
            .flags(flags)
            .stages(&vertex_stages)
            .viewport_state(&viewport)
            .rasterization_state(&rasterization)
            .dynamic_state(&dynamic)
            .push_next(&mut library_info)
            .push_next(&mut rendering_info);
        unsafe {
            pre_rasterization_library.fill(&info, None, PipelineCreateFlags::empty(), allocate())
        }
        .unwrap();
        assert!(!pre_rasterization_library.rp.as_ref().unwrap().is_complete());
        assert!(pre_rasterization_library.vp.is_some());
        assert!(!pre_rasterization_library
            .dynamic
            .contains(DynamicState::AttachmentFeedbackLoopEnable));

        let mut fragment_library = GraphicsPipelineState::new();
        let mut library_info = library(vk::GraphicsPipelineLibraryFlagsEXT::FRAGMENT_SHADER);
        let mut rendering_info = rendering();
        let info = vk::GraphicsPipelineCreateInfo::default()
            .flags(flags)
            .stages(&fragment_stages)
            .depth_stencil_state(&depth_stencil)
            .multisample_state(&multisample)
            .push_next(&mut library_info)
            .push_next(&mut rendering_info);
        unsafe { fragment_library.fill(&info, None, PipelineCreateFlags::empty(), allocate()) }
            .unwrap();
        // The attachments aren't known yet, so depth/stencil state is kept.
        assert!(fragment_library.ds.is_some());
        assert!(fragment_library.ms.is_some());

        let mut output_library = GraphicsPipelineState::new();
        let mut library_info =
            library(vk::GraphicsPipelineLibraryFlagsEXT::FRAGMENT_OUTPUT_INTERFACE);
        let mut rendering_info = rendering();
        let info = vk::GraphicsPipelineCreateInfo::default()
            .flags(flags | vk::PipelineCreateFlags::COLOR_ATTACHMENT_FEEDBACK_LOOP_EXT)
            .multisample_state(&multisample)
            .color_blend_state(&color_blend)
            .dynamic_state(&dynamic)
            .push_next(&mut library_info)
            .push_next(&mut rendering_info);
        unsafe { output_library.fill(&info, None, PipelineCreateFlags::empty(), allocate()) }
            .unwrap();
        assert!(output_library.rp.as_ref().unwrap().is_complete());
        assert!(output_library.cb.is_some());
        assert!(output_library
            .dynamic
            .contains(DynamicState::AttachmentFeedbackLoopEnable));

        let mut pipeline = GraphicsPipelineState::new();
        pipeline.merge(&vertex_input_library);
        pipeline.merge(&pre_rasterization_library);
        pipeline.merge(&fragment_library);
        pipeline.merge(&output_library);

        assert_eq!(
            pipeline.groups(),
            StateGroups::all() - StateGroups::TESSELLATION,
        );
        assert_eq!(
            pipeline.shader_stages,
            ShaderStages::VERTEX | ShaderStages::FRAGMENT,
        );
        assert_eq!(
            pipeline.feedback_loop_flags,
            PipelineCreateFlags::COLOR_ATTACHMENT_FEEDBACK_LOOP,
        );
        // The incomplete render pass of the first library is replaced.
        assert_eq!(pipeline.rp.as_deref(), output_library.rp.as_deref());
    }

    #[test]
    fn merge_replaces_incomplete_render_pass() {
        let incomplete = GraphicsPipelineState {
            rp: Some(StateRef::Owned(Arc::new(RenderPassState::incomplete(3)))),
            ..Default::default()
        };
        let complete = GraphicsPipelineState {
            rp: Some(StateRef::Owned(Arc::new(RenderPassState {
                attachment_aspects: Some(ImageAspects::COLOR),
                view_mask: 3,
                color_attachment_count: 1,
                ..RenderPassState::new()
            }))),
            ..Default::default()
        };

        let mut merged = incomplete.clone();
        merged.merge(&complete);
        assert_eq!(merged.rp, complete.rp);

        // The left side wins otherwise.
        let mut merged = complete.clone();
        merged.merge(&incomplete);
        assert_eq!(merged.rp, complete.rp);
    }

    #[test]
    fn copy_drops_fully_dynamic_groups() {
        let state = GraphicsPipelineState {
            dynamic: DynamicStates::from_groups(StateGroups::VIEWPORT),
            vp: Some(StateRef::Owned(Arc::new(Default::default()))),
            ds: Some(StateRef::Owned(Arc::new(Default::default()))),
            ..Default::default()
        };

        let copy = state.copy(Arc::new(SystemAllocator), SCOPE).unwrap();
        assert_eq!(copy.groups(), StateGroups::DEPTH_STENCIL);
        assert_eq!(copy.dynamic, state.dynamic);
        assert_eq!(copy.ds, state.ds);

        assert_eq!(
            state
                .copy(Arc::new(LimitedAllocator::new(0)), SCOPE)
                .unwrap_err(),
            OomError::OutOfHostMemory,
        );

        // Nothing to allocate.
        let empty = GraphicsPipelineState::new();
        let copy = empty.copy(Arc::new(LimitedAllocator::new(0)), SCOPE).unwrap();
        assert!(copy.allocations.is_empty());
    }
}
