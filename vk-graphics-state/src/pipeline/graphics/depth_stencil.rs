// Copyright (c) 2026 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Configures the operation of the depth, stencil and depth bounds tests.
//!
//! The depth test passes of fails depending on how the depth value of each fragment compares
//! to the existing depth value in the depth buffer at that fragment's location. Depth values
//! are always between 0.0 and 1.0.
//!
//! The depth bounds test allows you to ask the GPU to exclude fragments that are outside of a
//! certain range. This is done in addition to the regular depth test.
//!
//! The stencil test passes or fails depending on how a reference value compares to the existing
//! value in the stencil buffer at each fragment's location. Depending on the outcome of the
//! depth and stencil tests, the value of the stencil buffer at that location can be updated.
//!
//! Much of this state has no observable effect for some attachment configurations. The
//! [`DepthStencilState::optimize`] pass detects those cases and turns the corresponding tests and
//! writes off.

use crate::{
    image::ImageAspects,
    macros::{vulkan_bitflags, vulkan_enum},
    DynamicState, DynamicStates,
};
use ash::vk;

/// The state in a graphics pipeline describing how the depth, depth bounds and stencil tests
/// should behave.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DepthStencilState {
    pub depth: DepthState,
    pub stencil: StencilState,
}

impl DepthStencilState {
    /// Returns a `DepthStencilState` where all tests are disabled.
    #[inline]
    pub const fn new() -> Self {
        Self {
            depth: DepthState::new(),
            stencil: StencilState::new(),
        }
    }

    /// Builds the state from `info`.
    pub fn from_vk(
        dynamic: DynamicStates,
        info: Option<&vk::PipelineDepthStencilStateCreateInfo<'_>>,
    ) -> Self {
        let mut state = Self::new();

        let Some(info) = info else {
            return state;
        };

        let depth = &mut state.depth;

        if !dynamic.contains(DynamicState::DsDepthTestEnable) {
            depth.test_enable = info.depth_test_enable != vk::FALSE;
        }

        if !dynamic.contains(DynamicState::DsDepthWriteEnable) {
            depth.write_enable = info.depth_write_enable != vk::FALSE;
        }

        if !dynamic.contains(DynamicState::DsDepthCompareOp) {
            depth.compare_op = CompareOp::from_vk(info.depth_compare_op);
        }

        if !dynamic.contains(DynamicState::DsDepthBoundsTestEnable) {
            depth.bounds_test.enable = info.depth_bounds_test_enable != vk::FALSE;
        }

        if !dynamic.contains(DynamicState::DsDepthBoundsTestBounds) {
            depth.bounds_test.min = info.min_depth_bounds;
            depth.bounds_test.max = info.max_depth_bounds;
        }

        let stencil = &mut state.stencil;

        if !dynamic.contains(DynamicState::DsStencilTestEnable) {
            stencil.test_enable = info.stencil_test_enable != vk::FALSE;
        }

        stencil.front.read_vk(dynamic, &info.front);
        stencil.back.read_vk(dynamic, &info.back);

        state
    }

    /// Disables the tests and writes that can have no observable effect, given the aspects of
    /// the depth/stencil attachment that are actually present.
    ///
    /// If `consider_write_mask` is true, a stencil face whose write mask is zero is treated as
    /// never writing. This is only valid if the write mask is known, for example if it is not
    /// dynamic or has already been set.
    ///
    /// Applying this more than once gives the same result as applying it once.
    pub fn optimize(&mut self, aspects: ImageAspects, consider_write_mask: bool) {
        let Self { depth, stencil } = self;

        if !aspects.intersects(ImageAspects::DEPTH) {
            depth.test_enable = false;
        }

        if !aspects.intersects(ImageAspects::STENCIL) {
            stencil.test_enable = false;
        }

        if !depth.test_enable {
            depth.write_enable = false;
            depth.compare_op = CompareOp::Always;
        }

        if !stencil.test_enable {
            stencil.write_enable = false;
            stencil.front.ops.compare_op = CompareOp::Always;
            stencil.back.ops.compare_op = CompareOp::Always;
        }

        // The stencil test rejects everything before the depth test runs.
        if stencil.front.ops.compare_op == CompareOp::Never
            && stencil.back.ops.compare_op == CompareOp::Never
        {
            depth.test_enable = false;
            depth.write_enable = false;
            depth.compare_op = CompareOp::Always;
        }

        if depth.compare_op == CompareOp::Equal {
            depth.write_enable = false;
        }

        let front_writes = stencil
            .front
            .optimize(depth.compare_op, consider_write_mask);
        let back_writes = stencil.back.optimize(depth.compare_op, consider_write_mask);

        if !front_writes && !back_writes {
            stencil.write_enable = false;
        }

        if depth.compare_op == CompareOp::Always && !depth.write_enable {
            depth.test_enable = false;
        }

        if stencil.front.ops.compare_op == CompareOp::Always
            && stencil.back.ops.compare_op == CompareOp::Always
            && !stencil.write_enable
        {
            stencil.test_enable = false;
        }
    }
}

/// Returns `state` with the tests and writes that can have no observable effect disabled.
///
/// This is the by-value form of [`DepthStencilState::optimize`].
#[inline]
pub fn optimize_depth_stencil_state(
    mut state: DepthStencilState,
    aspects: ImageAspects,
    consider_write_mask: bool,
) -> DepthStencilState {
    state.optimize(aspects, consider_write_mask);
    state
}

/// The state in a graphics pipeline describing how the depth test should behave.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepthState {
    /// Whether the depth test is enabled.
    ///
    /// The default value is `false`.
    pub test_enable: bool,

    /// Sets whether the value in the depth buffer will be updated when the depth test succeeds.
    ///
    /// The default value is `false`.
    pub write_enable: bool,

    /// Comparison operation to use between the depth value of each incoming fragment and the
    /// depth value currently in the depth buffer.
    ///
    /// The default value is [`CompareOp::Never`].
    pub compare_op: CompareOp,

    pub bounds_test: DepthBoundsState,
}

impl Default for DepthState {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl DepthState {
    /// Returns a `DepthState` with the test disabled.
    #[inline]
    pub const fn new() -> Self {
        Self {
            test_enable: false,
            write_enable: false,
            compare_op: CompareOp::Never,
            bounds_test: DepthBoundsState::new(),
        }
    }
}

/// The state in a graphics pipeline describing how the depth bounds test should behave.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepthBoundsState {
    /// The default value is `false`.
    pub enable: bool,

    /// The minimum depth value to accept.
    ///
    /// The default value is `0.0`.
    pub min: f32,

    /// The maximum depth value to accept.
    ///
    /// The default value is `0.0`.
    pub max: f32,
}

impl Default for DepthBoundsState {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl DepthBoundsState {
    /// Returns a `DepthBoundsState` with the test disabled.
    #[inline]
    pub const fn new() -> Self {
        Self {
            enable: false,
            min: 0.0,
            max: 0.0,
        }
    }
}

/// The state in a graphics pipeline describing how the stencil test should behave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StencilState {
    /// Whether the stencil test is enabled.
    ///
    /// The default value is `false`.
    pub test_enable: bool,

    /// Whether the stencil buffer may be written. This is not part of the Vulkan state, but can
    /// be cleared by [`DepthStencilState::optimize`].
    ///
    /// The default value is `true`.
    pub write_enable: bool,

    /// The stencil operation state to use for points and lines, and for triangles whose front is
    /// facing the user.
    pub front: StencilOpState,

    /// The stencil operation state to use for triangles whose back is facing the user.
    pub back: StencilOpState,
}

impl Default for StencilState {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl StencilState {
    /// Returns a `StencilState` with the test disabled.
    #[inline]
    pub const fn new() -> Self {
        Self {
            test_enable: false,
            write_enable: true,
            front: StencilOpState::new(),
            back: StencilOpState::new(),
        }
    }
}

/// Stencil test operations for a single face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StencilOpState {
    /// The stencil operations to perform.
    pub ops: StencilOps,

    /// A bit mask applied to both the reference value and the value in the stencil buffer
    /// before the comparison.
    ///
    /// The default value is `0xff`.
    pub compare_mask: u8,

    /// A bit mask that selects the bits of the stencil buffer that are updated.
    ///
    /// The default value is `0xff`.
    pub write_mask: u8,

    /// The value that the stencil buffer is compared against, and that the `Replace` operation
    /// writes.
    ///
    /// The default value is `0`.
    pub reference: u8,
}

impl Default for StencilOpState {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl StencilOpState {
    /// Returns a default `StencilOpState`.
    #[inline]
    pub const fn new() -> Self {
        Self {
            ops: StencilOps::new(),
            compare_mask: 0xff,
            write_mask: 0xff,
            reference: 0,
        }
    }

    fn read_vk(&mut self, dynamic: DynamicStates, info: &vk::StencilOpState) {
        if !dynamic.contains(DynamicState::DsStencilOp) {
            self.ops = StencilOps {
                fail_op: StencilOp::from_vk(info.fail_op),
                pass_op: StencilOp::from_vk(info.pass_op),
                depth_fail_op: StencilOp::from_vk(info.depth_fail_op),
                compare_op: CompareOp::from_vk(info.compare_op),
            };
        }

        if !dynamic.contains(DynamicState::DsStencilCompareMask) {
            self.compare_mask = info.compare_mask as u8;
        }

        if !dynamic.contains(DynamicState::DsStencilWriteMask) {
            self.write_mask = info.write_mask as u8;
        }

        if !dynamic.contains(DynamicState::DsStencilReference) {
            self.reference = info.reference as u8;
        }
    }

    /// Replaces the operations that can never run with `Keep`, and returns whether any
    /// operation may still write.
    fn optimize(&mut self, depth_compare_op: CompareOp, consider_write_mask: bool) -> bool {
        let ops = &mut self.ops;

        if ops.compare_op == CompareOp::Always {
            ops.fail_op = StencilOp::Keep;
        }

        if ops.compare_op == CompareOp::Never || depth_compare_op == CompareOp::Never {
            ops.pass_op = StencilOp::Keep;
        }

        if ops.compare_op == CompareOp::Never || depth_compare_op == CompareOp::Always {
            ops.depth_fail_op = StencilOp::Keep;
        }

        if consider_write_mask && self.write_mask == 0 {
            ops.fail_op = StencilOp::Keep;
            ops.pass_op = StencilOp::Keep;
            ops.depth_fail_op = StencilOp::Keep;
        }

        ops.fail_op != StencilOp::Keep
            || ops.pass_op != StencilOp::Keep
            || ops.depth_fail_op != StencilOp::Keep
    }
}

/// The stencil operations of a single face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StencilOps {
    /// The operation to perform when the stencil test failed.
    ///
    /// The default value is [`StencilOp::Keep`].
    pub fail_op: StencilOp,

    /// The operation to perform when both the depth test and the stencil test passed.
    ///
    /// The default value is [`StencilOp::Keep`].
    pub pass_op: StencilOp,

    /// The operation to perform when the stencil test passed but the depth test failed.
    ///
    /// The default value is [`StencilOp::Keep`].
    pub depth_fail_op: StencilOp,

    /// The comparison to perform between the existing stencil value in the stencil buffer, and
    /// the reference value (given by `reference`).
    ///
    /// The default value is [`CompareOp::Never`].
    pub compare_op: CompareOp,
}

impl Default for StencilOps {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl StencilOps {
    /// Returns `StencilOps` that keep the stencil buffer untouched.
    #[inline]
    pub const fn new() -> Self {
        Self {
            fail_op: StencilOp::Keep,
            pass_op: StencilOp::Keep,
            depth_fail_op: StencilOp::Keep,
            compare_op: CompareOp::Never,
        }
    }
}

vulkan_enum! {
    /// Operation to perform after the depth and stencil tests.
    StencilOp = StencilOp(i32);

    Keep = KEEP,
    Zero = ZERO,
    Replace = REPLACE,
    IncrementAndClamp = INCREMENT_AND_CLAMP,
    DecrementAndClamp = DECREMENT_AND_CLAMP,
    Invert = INVERT,
    IncrementAndWrap = INCREMENT_AND_WRAP,
    DecrementAndWrap = DECREMENT_AND_WRAP,
}

impl Default for StencilOp {
    #[inline]
    fn default() -> Self {
        StencilOp::Keep
    }
}

vulkan_bitflags! {
    /// Specifies a set of stencil faces.
    StencilFaces = StencilFaceFlags(u32);

    /// The front face.
    FRONT = FRONT,

    /// The back face.
    BACK = BACK,
}

impl StencilFaces {
    /// Both faces.
    pub const FRONT_AND_BACK: Self = Self(Self::FRONT.0 | Self::BACK.0);
}

vulkan_enum! {
    /// Specifies how two values should be compared to decide whether a test passes or fails.
    ///
    /// Used for both depth testing and stencil testing.
    CompareOp = CompareOp(i32);

    /// The test never passes.
    Never = NEVER,

    /// The test passes if `value < reference_value`.
    Less = LESS,

    /// The test passes if `value == reference_value`.
    Equal = EQUAL,

    /// The test passes if `value <= reference_value`.
    LessOrEqual = LESS_OR_EQUAL,

    /// The test passes if `value > reference_value`.
    Greater = GREATER,

    /// The test passes if `value != reference_value`.
    NotEqual = NOT_EQUAL,

    /// The test passes if `value >= reference_value`.
    GreaterOrEqual = GREATER_OR_EQUAL,

    /// The test always passes.
    Always = ALWAYS,
}

impl Default for CompareOp {
    #[inline]
    fn default() -> Self {
        CompareOp::Never
    }
}
