// Copyright (c) 2026 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Controls how many fragment shader invocations are run per pixel.

use crate::{macros::vulkan_enum, DynamicState, DynamicStates};
use ash::vk;

/// The state in a graphics pipeline describing the fragment shading rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FragmentShadingRateState {
    /// The pipeline fragment shading rate.
    ///
    /// The default value is `[1, 1]`.
    pub fragment_size: [u32; 2],

    /// Determines how the pipeline, primitive, and attachment shading rates are combined for
    /// fragments generated.
    ///
    /// The default value is `[FragmentShadingRateCombinerOp::Keep; 2]`.
    pub combiner_ops: [FragmentShadingRateCombinerOp; 2],
}

impl Default for FragmentShadingRateState {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl FragmentShadingRateState {
    /// Returns a `FragmentShadingRateState` with a 1x1 rate that ignores the primitive and
    /// attachment rates.
    #[inline]
    pub const fn new() -> Self {
        Self {
            fragment_size: [1, 1],
            combiner_ops: [FragmentShadingRateCombinerOp::Keep; 2],
        }
    }

    /// Builds the state from `info`, which is found in the `pNext` chain of the pipeline create
    /// info itself.
    pub fn from_vk(
        dynamic: DynamicStates,
        info: Option<&vk::PipelineFragmentShadingRateStateCreateInfoKHR<'_>>,
    ) -> Self {
        let mut state = Self::new();

        if dynamic.contains(DynamicState::Fsr) {
            return state;
        }

        if let Some(info) = info {
            state.fragment_size = [info.fragment_size.width, info.fragment_size.height];
            state.combiner_ops = info.combiner_ops.map(FragmentShadingRateCombinerOp::from_vk);
        }

        state
    }
}

vulkan_enum! {
    /// Control how fragment shading rates are combined.
    FragmentShadingRateCombinerOp = FragmentShadingRateCombinerOpKHR(i32);

    /// Specifies a combiner operation of combine(Axy,Bxy) = Axy.
    Keep = KEEP,

    /// Specifies a combiner operation of combine(Axy,Bxy) = Bxy.
    Replace = REPLACE,

    /// Specifies a combiner operation of combine(Axy,Bxy) = min(Axy,Bxy).
    Min = MIN,

    /// Specifies a combiner operation of combine(Axy,Bxy) = max(Axy,Bxy).
    Max = MAX,

    /// Specifies a combiner operation of combine(Axy,Bxy) = Axy * Bxy.
    Mul = MUL,
}

impl Default for FragmentShadingRateCombinerOp {
    #[inline]
    fn default() -> Self {
        Self::Keep
    }
}
