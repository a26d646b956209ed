// Copyright (c) 2026 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Subdivides primitives into smaller primitives.

use crate::{chain::find_struct, macros::vulkan_enum, DynamicState, DynamicStates};
use ash::vk;

/// The state in a graphics pipeline describing the tessellation shader execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TessellationState {
    /// The number of patch control points to use.
    ///
    /// The default value is `0`.
    pub patch_control_points: u32,

    /// The origin to use for the tessellation domain.
    ///
    /// The default value is [`TessellationDomainOrigin::UpperLeft`].
    pub domain_origin: TessellationDomainOrigin,
}

impl Default for TessellationState {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TessellationState {
    /// Returns a `TessellationState` with default values.
    #[inline]
    pub const fn new() -> Self {
        Self {
            patch_control_points: 0,
            domain_origin: TessellationDomainOrigin::UpperLeft,
        }
    }

    /// Builds the state from `info`.
    ///
    /// # Safety
    ///
    /// - `info` must be a valid `VkPipelineTessellationStateCreateInfo`, including its `pNext`
    ///   chain.
    pub unsafe fn from_vk(
        dynamic: DynamicStates,
        info: Option<&vk::PipelineTessellationStateCreateInfo<'_>>,
    ) -> Self {
        let mut state = Self::new();

        let Some(info) = info else {
            return state;
        };

        if !dynamic.contains(DynamicState::TsPatchControlPoints) {
            state.patch_control_points = info.patch_control_points;
        }

        if !dynamic.contains(DynamicState::TsDomainOrigin) {
            let domain_origin_info: Option<
                &vk::PipelineTessellationDomainOriginStateCreateInfo<'_>,
            > = unsafe { find_struct(info.p_next) };

            if let Some(domain_origin_info) = domain_origin_info {
                state.domain_origin =
                    TessellationDomainOrigin::from_vk(domain_origin_info.domain_origin);
            }
        }

        state
    }
}

vulkan_enum! {
    /// The origin of the tessellation domain.
    TessellationDomainOrigin = TessellationDomainOrigin(i32);

    /// The origin is in the upper left corner.
    UpperLeft = UPPER_LEFT,

    /// The origin is in the lower left corner.
    LowerLeft = LOWER_LEFT,
}

impl Default for TessellationDomainOrigin {
    #[inline]
    fn default() -> Self {
        Self::UpperLeft
    }
}
