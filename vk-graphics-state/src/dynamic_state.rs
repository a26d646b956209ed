// Copyright (c) 2026 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Classification of graphics state into individually tracked items and groups.
//!
//! Every piece of graphics state that Vulkan lets an application supply at command buffer
//! recording time is a [`DynamicState`]. The Vulkan API itself is coarser than this: a single
//! `VkDynamicState` value can cover several items, for example
//! `VK_DYNAMIC_STATE_VIEWPORT_WITH_COUNT` covers both the viewport count and the viewports
//! themselves. Each item belongs to exactly one of the [`StateGroups`], which correspond to the
//! sub-structures of `VkGraphicsPipelineCreateInfo`.

use crate::macros::vulkan_bitflags;
use ash::vk;
use std::fmt;

macro_rules! dynamic_states {
    {
        $(
            $(#[doc = $doc:literal])*
            $item:ident = $group:ident, $name:literal;
        )+
    } => {
        /// A single piece of graphics state that is tracked individually.
        ///
        /// The numeric values are dense and never change meaning. New states are only ever added
        /// at the end.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[repr(u8)]
        pub enum DynamicState {
            $(
                $(#[doc = $doc])*
                $item,
            )+
        }

        impl DynamicState {
            /// The number of dynamic states.
            pub const COUNT: usize = [$(DynamicState::$item),+].len();

            /// All dynamic states, in enumeration order.
            pub const ALL: [DynamicState; Self::COUNT] = [$(DynamicState::$item),+];

            /// Returns the state group that `self` belongs to.
            #[inline]
            pub const fn group(self) -> StateGroups {
                match self {
                    $(DynamicState::$item => StateGroups::$group,)+
                }
            }

            /// Returns the name of `self`, for logging and debugging.
            #[inline]
            pub const fn name(self) -> &'static str {
                match self {
                    $(DynamicState::$item => $name,)+
                }
            }
        }
    };
}

dynamic_states! {
    /// The complete vertex input state: bindings, attributes and divisors.
    Vi = VERTEX_INPUT, "VI";
    /// Which vertex bindings are in use.
    ViBindingsValid = VERTEX_INPUT, "VI_BINDINGS_VALID";
    /// The stride of each vertex binding.
    ViBindingStrides = VERTEX_INPUT, "VI_BINDING_STRIDES";
    IaPrimitiveTopology = INPUT_ASSEMBLY, "IA_PRIMITIVE_TOPOLOGY";
    IaPrimitiveRestartEnable = INPUT_ASSEMBLY, "IA_PRIMITIVE_RESTART_ENABLE";
    TsPatchControlPoints = TESSELLATION, "TS_PATCH_CONTROL_POINTS";
    TsDomainOrigin = TESSELLATION, "TS_DOMAIN_ORIGIN";
    VpViewportCount = VIEWPORT, "VP_VIEWPORT_COUNT";
    VpViewports = VIEWPORT, "VP_VIEWPORTS";
    VpScissorCount = VIEWPORT, "VP_SCISSOR_COUNT";
    VpScissors = VIEWPORT, "VP_SCISSORS";
    VpDepthClipNegativeOneToOne = VIEWPORT, "VP_DEPTH_CLIP_NEGATIVE_ONE_TO_ONE";
    DrEnable = DISCARD_RECTANGLES, "DR_ENABLE";
    DrMode = DISCARD_RECTANGLES, "DR_MODE";
    DrRectangles = DISCARD_RECTANGLES, "DR_RECTANGLES";
    RsRasterizerDiscardEnable = RASTERIZATION, "RS_RASTERIZER_DISCARD_ENABLE";
    RsDepthClampEnable = RASTERIZATION, "RS_DEPTH_CLAMP_ENABLE";
    RsDepthClipEnable = RASTERIZATION, "RS_DEPTH_CLIP_ENABLE";
    RsPolygonMode = RASTERIZATION, "RS_POLYGON_MODE";
    RsCullMode = RASTERIZATION, "RS_CULL_MODE";
    RsFrontFace = RASTERIZATION, "RS_FRONT_FACE";
    RsConservativeMode = RASTERIZATION, "RS_CONSERVATIVE_MODE";
    RsExtraPrimitiveOverestimationSize = RASTERIZATION, "RS_EXTRA_PRIMITIVE_OVERESTIMATION_SIZE";
    /// There is no Vulkan dynamic state for this one, so it is always static.
    RsRasterizationOrderAmd = RASTERIZATION, "RS_RASTERIZATION_ORDER_AMD";
    RsProvokingVertex = RASTERIZATION, "RS_PROVOKING_VERTEX";
    RsRasterizationStream = RASTERIZATION, "RS_RASTERIZATION_STREAM";
    RsDepthBiasEnable = RASTERIZATION, "RS_DEPTH_BIAS_ENABLE";
    /// The constant, clamp and slope depth bias factors.
    RsDepthBiasFactors = RASTERIZATION, "RS_DEPTH_BIAS_FACTORS";
    RsLineWidth = RASTERIZATION, "RS_LINE_WIDTH";
    RsLineMode = RASTERIZATION, "RS_LINE_MODE";
    RsLineStippleEnable = RASTERIZATION, "RS_LINE_STIPPLE_ENABLE";
    /// The line stipple factor and pattern.
    RsLineStipple = RASTERIZATION, "RS_LINE_STIPPLE";
    /// The fragment size and both combiner operations.
    Fsr = FRAGMENT_SHADING_RATE, "FSR";
    MsRasterizationSamples = MULTISAMPLE, "MS_RASTERIZATION_SAMPLES";
    MsSampleMask = MULTISAMPLE, "MS_SAMPLE_MASK";
    MsAlphaToCoverageEnable = MULTISAMPLE, "MS_ALPHA_TO_COVERAGE_ENABLE";
    MsAlphaToOneEnable = MULTISAMPLE, "MS_ALPHA_TO_ONE_ENABLE";
    MsSampleLocationsEnable = MULTISAMPLE, "MS_SAMPLE_LOCATIONS_ENABLE";
    MsSampleLocations = MULTISAMPLE, "MS_SAMPLE_LOCATIONS";
    DsDepthTestEnable = DEPTH_STENCIL, "DS_DEPTH_TEST_ENABLE";
    DsDepthWriteEnable = DEPTH_STENCIL, "DS_DEPTH_WRITE_ENABLE";
    DsDepthCompareOp = DEPTH_STENCIL, "DS_DEPTH_COMPARE_OP";
    DsDepthBoundsTestEnable = DEPTH_STENCIL, "DS_DEPTH_BOUNDS_TEST_ENABLE";
    DsDepthBoundsTestBounds = DEPTH_STENCIL, "DS_DEPTH_BOUNDS_TEST_BOUNDS";
    DsStencilTestEnable = DEPTH_STENCIL, "DS_STENCIL_TEST_ENABLE";
    DsStencilOp = DEPTH_STENCIL, "DS_STENCIL_OP";
    DsStencilCompareMask = DEPTH_STENCIL, "DS_STENCIL_COMPARE_MASK";
    DsStencilWriteMask = DEPTH_STENCIL, "DS_STENCIL_WRITE_MASK";
    DsStencilReference = DEPTH_STENCIL, "DS_STENCIL_REFERENCE";
    CbLogicOpEnable = COLOR_BLEND, "CB_LOGIC_OP_ENABLE";
    CbLogicOp = COLOR_BLEND, "CB_LOGIC_OP";
    CbAttachmentCount = COLOR_BLEND, "CB_ATTACHMENT_COUNT";
    CbColorWriteEnables = COLOR_BLEND, "CB_COLOR_WRITE_ENABLES";
    CbBlendEnables = COLOR_BLEND, "CB_BLEND_ENABLES";
    CbBlendEquations = COLOR_BLEND, "CB_BLEND_EQUATIONS";
    CbWriteMasks = COLOR_BLEND, "CB_WRITE_MASKS";
    CbBlendConstants = COLOR_BLEND, "CB_BLEND_CONSTANTS";
    /// Which attachments the current render pass or rendering has. Only set by the driver.
    RpAttachments = RENDER_PASS, "RP_ATTACHMENTS";
    AttachmentFeedbackLoopEnable = RENDER_PASS, "ATTACHMENT_FEEDBACK_LOOP_ENABLE";
}

impl fmt::Display for DynamicState {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

vulkan_bitflags! {
    /// Groups of graphics state, each matching one sub-structure of a graphics pipeline create
    /// info.
    StateGroups = u32;

    /// `VkPipelineVertexInputStateCreateInfo`.
    VERTEX_INPUT = 1 << 0,

    /// `VkPipelineInputAssemblyStateCreateInfo`.
    INPUT_ASSEMBLY = 1 << 1,

    /// `VkPipelineTessellationStateCreateInfo`.
    TESSELLATION = 1 << 2,

    /// `VkPipelineViewportStateCreateInfo`.
    VIEWPORT = 1 << 3,

    /// `VkPipelineDiscardRectangleStateCreateInfoEXT`.
    DISCARD_RECTANGLES = 1 << 4,

    /// `VkPipelineRasterizationStateCreateInfo`.
    RASTERIZATION = 1 << 5,

    /// `VkPipelineFragmentShadingRateStateCreateInfoKHR`.
    FRAGMENT_SHADING_RATE = 1 << 6,

    /// `VkPipelineMultisampleStateCreateInfo`.
    MULTISAMPLE = 1 << 7,

    /// `VkPipelineDepthStencilStateCreateInfo`.
    DEPTH_STENCIL = 1 << 8,

    /// `VkPipelineColorBlendStateCreateInfo`.
    COLOR_BLEND = 1 << 9,

    /// The render pass and subpass, or `VkPipelineRenderingCreateInfo`.
    ///
    /// This group is never fully dynamic, because the view mask is always static.
    RENDER_PASS = 1 << 10,
}

impl StateGroups {
    /// Returns the dynamic states that belong to the groups in `self`.
    #[inline]
    pub const fn dynamic_states(self) -> DynamicStates {
        let mut result = DynamicStates::empty();
        let mut i = 0;

        while i < GROUP_STATES.len() {
            let (group, states) = GROUP_STATES[i];

            if self.intersects(group) {
                result = result.union(states);
            }

            i += 1;
        }

        result
    }
}

const GROUP_COUNT: usize = StateGroups::all().count() as usize;

// Computed at compile time from the table above.
const GROUP_STATES: [(StateGroups, DynamicStates); GROUP_COUNT] = {
    let mut table = [(StateGroups::empty(), DynamicStates::empty()); GROUP_COUNT];
    let mut g = 0;

    while g < GROUP_COUNT {
        let group = StateGroups(1 << g);
        let mut states = DynamicStates::empty();
        let mut i = 0;

        while i < DynamicState::COUNT {
            let state = DynamicState::ALL[i];

            if state.group().0 == group.0 {
                states = states.with(state);
            }

            i += 1;
        }

        table[g] = (group, states);
        g += 1;
    }

    table
};

/// A set of [`DynamicState`] values.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DynamicStates(u128);

impl DynamicStates {
    /// Returns an empty set.
    #[inline]
    pub const fn empty() -> Self {
        DynamicStates(0)
    }

    /// Returns a set containing every dynamic state.
    #[inline]
    pub const fn all() -> Self {
        DynamicStates(u128::MAX >> (u128::BITS as usize - DynamicState::COUNT))
    }

    /// Returns the set of dynamic states that belong to `groups`.
    #[inline]
    pub const fn from_groups(groups: StateGroups) -> Self {
        groups.dynamic_states()
    }

    /// Converts a list of Vulkan dynamic states into the set of items they cover.
    ///
    /// # Panics
    ///
    /// - Panics if `dynamic_states` contains a value that is not a graphics dynamic state.
    pub fn from_vk(dynamic_states: &[vk::DynamicState]) -> Self {
        let mut result = DynamicStates::empty();

        for &dynamic_state in dynamic_states {
            for &state in vk_dynamic_state_items(dynamic_state) {
                result.insert(state);
            }
        }

        // The attachment count is only read by the blend enables, blend equations and write
        // masks. If all of those are dynamic, so is the count.
        if result.contains(DynamicState::CbBlendEnables)
            && result.contains(DynamicState::CbBlendEquations)
            && result.contains(DynamicState::CbWriteMasks)
        {
            result.insert(DynamicState::CbAttachmentCount);
        }

        result
    }

    /// Converts the dynamic state create info of a pipeline into the set of items it covers.
    ///
    /// # Safety
    ///
    /// - `info` must be a valid `VkPipelineDynamicStateCreateInfo`.
    ///
    /// # Panics
    ///
    /// - Panics if `info` contains a value that is not a graphics dynamic state.
    pub unsafe fn from_create_info(info: Option<&vk::PipelineDynamicStateCreateInfo<'_>>) -> Self {
        match info {
            Some(info) => Self::from_vk(unsafe {
                crate::chain::slice_from_raw(info.p_dynamic_states, info.dynamic_state_count)
            }),
            None => Self::empty(),
        }
    }

    /// Returns the groups whose states are all contained in `self`.
    ///
    /// [`StateGroups::RENDER_PASS`] is never returned, because the view mask can't be dynamic.
    pub fn fully_dynamic_groups(self) -> StateGroups {
        let mut result = StateGroups::empty();

        for &(group, states) in &GROUP_STATES {
            if group != StateGroups::RENDER_PASS && self.is_superset(states) {
                result |= group;
            }
        }

        result
    }

    /// Checks, in debug builds, that `self` only contains states that belong to `groups`.
    #[inline]
    #[track_caller]
    pub fn validate(self, groups: StateGroups) {
        debug_assert!(
            DynamicStates::from_groups(groups).is_superset(self),
            "dynamic states {:?} are not part of the groups {:?}",
            self - DynamicStates::from_groups(groups),
            groups,
        );
    }

    /// Returns whether `state` is in the set.
    #[inline]
    pub const fn contains(self, state: DynamicState) -> bool {
        self.0 & Self::bit(state) != 0
    }

    /// Adds `state` to the set.
    #[inline]
    pub fn insert(&mut self, state: DynamicState) {
        self.0 |= Self::bit(state);
    }

    /// Removes `state` from the set.
    #[inline]
    pub fn remove(&mut self, state: DynamicState) {
        self.0 &= !Self::bit(state);
    }

    /// Returns `self` with `state` added.
    #[inline]
    pub const fn with(self, state: DynamicState) -> Self {
        DynamicStates(self.0 | Self::bit(state))
    }

    /// Returns whether the set is empty.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns the number of states in the set.
    #[inline]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Returns whether all states in `other` are also in `self`.
    #[inline]
    pub const fn is_superset(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns whether `self` and `other` have any state in common.
    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns the union of `self` and `other`.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        DynamicStates(self.0 | other.0)
    }

    /// Returns the intersection of `self` and `other`.
    #[inline]
    pub const fn intersection(self, other: Self) -> Self {
        DynamicStates(self.0 & other.0)
    }

    /// Returns `self` without the states in `other`.
    #[inline]
    pub const fn difference(self, other: Self) -> Self {
        DynamicStates(self.0 & !other.0)
    }

    /// Returns an iterator over the states in the set, in enumeration order.
    #[inline]
    pub fn iter(self) -> impl Iterator<Item = DynamicState> {
        DynamicState::ALL
            .into_iter()
            .filter(move |&state| self.contains(state))
    }

    #[inline]
    const fn bit(state: DynamicState) -> u128 {
        1 << state as u8
    }
}

impl fmt::Debug for DynamicStates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(DynamicState::name)).finish()
    }
}

impl From<DynamicState> for DynamicStates {
    #[inline]
    fn from(state: DynamicState) -> Self {
        DynamicStates::empty().with(state)
    }
}

impl FromIterator<DynamicState> for DynamicStates {
    fn from_iter<I: IntoIterator<Item = DynamicState>>(iter: I) -> Self {
        iter.into_iter()
            .fold(DynamicStates::empty(), DynamicStates::with)
    }
}

impl std::ops::BitOr for DynamicStates {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl std::ops::BitOrAssign for DynamicStates {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl std::ops::BitAnd for DynamicStates {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        self.intersection(rhs)
    }
}

impl std::ops::BitAndAssign for DynamicStates {
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        *self = self.intersection(rhs);
    }
}

impl std::ops::Sub for DynamicStates {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self.difference(rhs)
    }
}

impl std::ops::SubAssign for DynamicStates {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = self.difference(rhs);
    }
}

/// Returns the items covered by a Vulkan dynamic state.
#[track_caller]
fn vk_dynamic_state_items(dynamic_state: vk::DynamicState) -> &'static [DynamicState] {
    use DynamicState::*;

    match dynamic_state {
        vk::DynamicState::VIEWPORT => &[VpViewports],
        vk::DynamicState::SCISSOR => &[VpScissors],
        vk::DynamicState::LINE_WIDTH => &[RsLineWidth],
        vk::DynamicState::DEPTH_BIAS => &[RsDepthBiasFactors],
        vk::DynamicState::BLEND_CONSTANTS => &[CbBlendConstants],
        vk::DynamicState::DEPTH_BOUNDS => &[DsDepthBoundsTestBounds],
        vk::DynamicState::STENCIL_COMPARE_MASK => &[DsStencilCompareMask],
        vk::DynamicState::STENCIL_WRITE_MASK => &[DsStencilWriteMask],
        vk::DynamicState::STENCIL_REFERENCE => &[DsStencilReference],
        vk::DynamicState::CULL_MODE => &[RsCullMode],
        vk::DynamicState::FRONT_FACE => &[RsFrontFace],
        vk::DynamicState::PRIMITIVE_TOPOLOGY => &[IaPrimitiveTopology],
        vk::DynamicState::VIEWPORT_WITH_COUNT => &[VpViewportCount, VpViewports],
        vk::DynamicState::SCISSOR_WITH_COUNT => &[VpScissorCount, VpScissors],
        vk::DynamicState::VERTEX_INPUT_BINDING_STRIDE => &[ViBindingStrides],
        vk::DynamicState::DEPTH_TEST_ENABLE => &[DsDepthTestEnable],
        vk::DynamicState::DEPTH_WRITE_ENABLE => &[DsDepthWriteEnable],
        vk::DynamicState::DEPTH_COMPARE_OP => &[DsDepthCompareOp],
        vk::DynamicState::DEPTH_BOUNDS_TEST_ENABLE => &[DsDepthBoundsTestEnable],
        vk::DynamicState::STENCIL_TEST_ENABLE => &[DsStencilTestEnable],
        vk::DynamicState::STENCIL_OP => &[DsStencilOp],
        vk::DynamicState::RASTERIZER_DISCARD_ENABLE => &[RsRasterizerDiscardEnable],
        vk::DynamicState::DEPTH_BIAS_ENABLE => &[RsDepthBiasEnable],
        vk::DynamicState::PRIMITIVE_RESTART_ENABLE => &[IaPrimitiveRestartEnable],
        vk::DynamicState::DISCARD_RECTANGLE_EXT => &[DrRectangles],
        vk::DynamicState::DISCARD_RECTANGLE_ENABLE_EXT => &[DrEnable],
        vk::DynamicState::DISCARD_RECTANGLE_MODE_EXT => &[DrMode],
        vk::DynamicState::SAMPLE_LOCATIONS_EXT => &[MsSampleLocations],
        vk::DynamicState::FRAGMENT_SHADING_RATE_KHR => &[Fsr],
        vk::DynamicState::LINE_STIPPLE_EXT => &[RsLineStipple],
        vk::DynamicState::PATCH_CONTROL_POINTS_EXT => &[TsPatchControlPoints],
        vk::DynamicState::VERTEX_INPUT_EXT => &[Vi, ViBindingsValid, ViBindingStrides],
        vk::DynamicState::LOGIC_OP_EXT => &[CbLogicOp],
        vk::DynamicState::COLOR_WRITE_ENABLE_EXT => &[CbColorWriteEnables],
        vk::DynamicState::TESSELLATION_DOMAIN_ORIGIN_EXT => &[TsDomainOrigin],
        vk::DynamicState::DEPTH_CLAMP_ENABLE_EXT => &[RsDepthClampEnable],
        vk::DynamicState::POLYGON_MODE_EXT => &[RsPolygonMode],
        vk::DynamicState::RASTERIZATION_SAMPLES_EXT => &[MsRasterizationSamples],
        vk::DynamicState::SAMPLE_MASK_EXT => &[MsSampleMask],
        vk::DynamicState::ALPHA_TO_COVERAGE_ENABLE_EXT => &[MsAlphaToCoverageEnable],
        vk::DynamicState::ALPHA_TO_ONE_ENABLE_EXT => &[MsAlphaToOneEnable],
        vk::DynamicState::LOGIC_OP_ENABLE_EXT => &[CbLogicOpEnable],
        vk::DynamicState::COLOR_BLEND_ENABLE_EXT => &[CbBlendEnables],
        vk::DynamicState::COLOR_BLEND_EQUATION_EXT => &[CbBlendEquations],
        vk::DynamicState::COLOR_WRITE_MASK_EXT => &[CbWriteMasks],
        vk::DynamicState::RASTERIZATION_STREAM_EXT => &[RsRasterizationStream],
        vk::DynamicState::CONSERVATIVE_RASTERIZATION_MODE_EXT => &[RsConservativeMode],
        vk::DynamicState::EXTRA_PRIMITIVE_OVERESTIMATION_SIZE_EXT => {
            &[RsExtraPrimitiveOverestimationSize]
        }
        vk::DynamicState::DEPTH_CLIP_ENABLE_EXT => &[RsDepthClipEnable],
        vk::DynamicState::SAMPLE_LOCATIONS_ENABLE_EXT => &[MsSampleLocationsEnable],
        vk::DynamicState::PROVOKING_VERTEX_MODE_EXT => &[RsProvokingVertex],
        vk::DynamicState::LINE_RASTERIZATION_MODE_EXT => &[RsLineMode],
        vk::DynamicState::LINE_STIPPLE_ENABLE_EXT => &[RsLineStippleEnable],
        vk::DynamicState::DEPTH_CLIP_NEGATIVE_ONE_TO_ONE_EXT => &[VpDepthClipNegativeOneToOne],
        vk::DynamicState::ATTACHMENT_FEEDBACK_LOOP_ENABLE_EXT => {
            &[AttachmentFeedbackLoopEnable]
        }
        _ => unreachable!("unsupported dynamic graphics state {:?}", dynamic_state),
    }
}
