// Copyright (c) 2026 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Defines how the color output of the fragment shader is written to the attachment.
//!
//! # Blending in details
//!
//! There are three kinds of color attachments for the purpose of blending:
//!
//! - Attachments with a floating-point or fixed point format.
//! - Attachments with a (non-normalized) integer format.
//! - Attachments with a normalized integer format.
//!
//! For floating-point and fixed-point formats, the blending operation is applied. For integer
//! formats, the logic operation is applied. For normalized integer formats, the logic operation
//! will take precedence if it is activated, otherwise the blending operation is applied.

use crate::{
    chain::{find_struct, slice_from_raw},
    macros::{vulkan_bitflags, vulkan_enum},
    DynamicState, DynamicStates, MAX_COLOR_ATTACHMENTS,
};
use ash::vk;

/// Describes how the color output of the fragment shader is written to the attachment. See the
/// documentation of the `blend` module for more info.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorBlendState {
    /// Whether a logical operation is used instead of blending.
    ///
    /// The default value is `false`.
    pub logic_op_enable: bool,

    /// The logical operation to apply.
    ///
    /// The default value is [`LogicOp::Clear`].
    pub logic_op: LogicOp,

    /// The number of color attachments that `attachments` describes.
    ///
    /// The default value is `0`.
    pub attachment_count: u32,

    /// A bit mask of the color attachments that can be written, indexed by attachment.
    ///
    /// The default value is all ones.
    pub color_write_enables: u8,

    /// Sets how the output of the fragment shader is written to each color attachment.
    pub attachments: [ColorBlendAttachmentState; MAX_COLOR_ATTACHMENTS],

    /// The constant color to use for some of the `BlendFactor` variants.
    ///
    /// The default value is `[0.0; 4]`.
    pub blend_constants: [f32; 4],
}

impl Default for ColorBlendState {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl ColorBlendState {
    /// Returns a `ColorBlendState` with no attachments.
    #[inline]
    pub const fn new() -> Self {
        Self {
            logic_op_enable: false,
            logic_op: LogicOp::Clear,
            attachment_count: 0,
            color_write_enables: u8::MAX,
            attachments: [ColorBlendAttachmentState::new(); MAX_COLOR_ATTACHMENTS],
            blend_constants: [0.0; 4],
        }
    }

    /// Builds the state from `info`.
    ///
    /// # Safety
    ///
    /// - `info` must be a valid `VkPipelineColorBlendStateCreateInfo`, including its `pNext`
    ///   chain.
    ///
    /// # Panics
    ///
    /// - Panics if there are more than [`MAX_COLOR_ATTACHMENTS`] attachments.
    pub unsafe fn from_vk(
        dynamic: DynamicStates,
        info: Option<&vk::PipelineColorBlendStateCreateInfo<'_>>,
    ) -> Self {
        let mut state = Self::new();

        let Some(info) = info else {
            return state;
        };

        if !dynamic.contains(DynamicState::CbLogicOpEnable) {
            state.logic_op_enable = info.logic_op_enable != vk::FALSE;
        }

        if !dynamic.contains(DynamicState::CbLogicOp) {
            state.logic_op = LogicOp::from_vk(info.logic_op);
        }

        assert!(info.attachment_count as usize <= MAX_COLOR_ATTACHMENTS);
        state.attachment_count = info.attachment_count;

        let blend_enables_dynamic = dynamic.contains(DynamicState::CbBlendEnables);
        let blend_equations_dynamic = dynamic.contains(DynamicState::CbBlendEquations);
        let write_masks_dynamic = dynamic.contains(DynamicState::CbWriteMasks);

        // `pAttachments` is ignored when everything it holds is dynamic.
        let attachments = if blend_enables_dynamic && blend_equations_dynamic && write_masks_dynamic
        {
            &[]
        } else {
            unsafe { slice_from_raw(info.p_attachments, info.attachment_count) }
        };

        for (dst, src) in state.attachments.iter_mut().zip(attachments) {
            if !blend_enables_dynamic {
                dst.blend_enable = src.blend_enable != vk::FALSE;
            }

            if !blend_equations_dynamic {
                dst.src_color_blend_factor = BlendFactor::from_vk(src.src_color_blend_factor);
                dst.dst_color_blend_factor = BlendFactor::from_vk(src.dst_color_blend_factor);
                dst.color_blend_op = BlendOp::from_vk(src.color_blend_op);
                dst.src_alpha_blend_factor = BlendFactor::from_vk(src.src_alpha_blend_factor);
                dst.dst_alpha_blend_factor = BlendFactor::from_vk(src.dst_alpha_blend_factor);
                dst.alpha_blend_op = BlendOp::from_vk(src.alpha_blend_op);
            }

            if !write_masks_dynamic {
                dst.color_write_mask = ColorComponents::from(src.color_write_mask);
            }
        }

        if !dynamic.contains(DynamicState::CbBlendConstants) {
            state.blend_constants = info.blend_constants;
        }

        if !dynamic.contains(DynamicState::CbColorWriteEnables) {
            let color_write_info: Option<&vk::PipelineColorWriteCreateInfoEXT<'_>> =
                unsafe { find_struct(info.p_next) };

            if let Some(color_write_info) = color_write_info {
                let enables = unsafe {
                    slice_from_raw(
                        color_write_info.p_color_write_enables,
                        color_write_info.attachment_count,
                    )
                };

                for (index, &enable) in enables.iter().enumerate() {
                    if enable == vk::FALSE {
                        state.color_write_enables &= !(1 << index);
                    }
                }
            }
        }

        state
    }
}

/// Describes how a framebuffer color attachment is handled in the pipeline during the color
/// blend stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorBlendAttachmentState {
    /// Whether blending is enabled for the attachment.
    ///
    /// The default value is `false`.
    pub blend_enable: bool,

    /// The default value is [`BlendFactor::Zero`].
    pub src_color_blend_factor: BlendFactor,

    /// The default value is [`BlendFactor::Zero`].
    pub dst_color_blend_factor: BlendFactor,

    /// The default value is [`BlendOp::Add`].
    pub color_blend_op: BlendOp,

    /// The default value is [`BlendFactor::Zero`].
    pub src_alpha_blend_factor: BlendFactor,

    /// The default value is [`BlendFactor::Zero`].
    pub dst_alpha_blend_factor: BlendFactor,

    /// The default value is [`BlendOp::Add`].
    pub alpha_blend_op: BlendOp,

    /// Sets which components of the final pixel value are written to the attachment.
    ///
    /// The default value is `ColorComponents::all()`.
    pub color_write_mask: ColorComponents,
}

impl Default for ColorBlendAttachmentState {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl ColorBlendAttachmentState {
    /// Returns a `ColorBlendAttachmentState` with blending disabled that writes all components.
    #[inline]
    pub const fn new() -> Self {
        Self {
            blend_enable: false,
            src_color_blend_factor: BlendFactor::Zero,
            dst_color_blend_factor: BlendFactor::Zero,
            color_blend_op: BlendOp::Add,
            src_alpha_blend_factor: BlendFactor::Zero,
            dst_alpha_blend_factor: BlendFactor::Zero,
            alpha_blend_op: BlendOp::Add,
            color_write_mask: ColorComponents::all(),
        }
    }
}

vulkan_enum! {
    /// Which logical operation to apply to the output values.
    ///
    /// The operation is applied individually for each channel (red, green, blue and alpha).
    ///
    /// Only relevant for integer or unsigned attachments.
    LogicOp = LogicOp(i32);

    /// Returns `0`.
    Clear = CLEAR,

    /// Returns `source & destination`.
    And = AND,

    /// Returns `source & !destination`.
    AndReverse = AND_REVERSE,

    /// Returns `source`.
    Copy = COPY,

    /// Returns `!source & destination`.
    AndInverted = AND_INVERTED,

    /// Returns `destination`.
    Noop = NO_OP,

    /// Returns `source ^ destination`.
    Xor = XOR,

    /// Returns `source | destination`.
    Or = OR,

    /// Returns `!(source | destination)`.
    Nor = NOR,

    /// Returns `!(source ^ destination)`.
    Equivalent = EQUIVALENT,

    /// Returns `!destination`.
    Invert = INVERT,

    /// Returns `source | !destination`.
    OrReverse = OR_REVERSE,

    /// Returns `!source`.
    CopyInverted = COPY_INVERTED,

    /// Returns `!source | destination`.
    OrInverted = OR_INVERTED,

    /// Returns `!(source & destination)`.
    Nand = NAND,

    /// Returns `!0` (all bits set to 1).
    Set = SET,
}

vulkan_enum! {
    /// The operation that takes `source` (output from the fragment shader), `destination` (value
    /// currently in the framebuffer attachment) and `blend_constant` input values,
    /// and produces new inputs to be fed to `BlendOp`.
    BlendFactor = BlendFactor(i32);

    /// Always `0`.
    Zero = ZERO,

    /// Always `1`.
    One = ONE,

    /// `source` component-wise.
    SrcColor = SRC_COLOR,

    /// `1 - source` component-wise.
    OneMinusSrcColor = ONE_MINUS_SRC_COLOR,

    /// `destination` component-wise.
    DstColor = DST_COLOR,

    /// `1 - destination` component-wise.
    OneMinusDstColor = ONE_MINUS_DST_COLOR,

    /// `source.a` for all components.
    SrcAlpha = SRC_ALPHA,

    /// `1 - source.a` for all components.
    OneMinusSrcAlpha = ONE_MINUS_SRC_ALPHA,

    /// `destination.a` for all components.
    DstAlpha = DST_ALPHA,

    /// `1 - destination.a` for all components.
    OneMinusDstAlpha = ONE_MINUS_DST_ALPHA,

    /// `blend_constants` component-wise.
    ConstantColor = CONSTANT_COLOR,

    /// `1 - blend_constants` component-wise.
    OneMinusConstantColor = ONE_MINUS_CONSTANT_COLOR,

    /// `blend_constants.a` for all components.
    ConstantAlpha = CONSTANT_ALPHA,

    /// `1 - blend_constants.a` for all components.
    OneMinusConstantAlpha = ONE_MINUS_CONSTANT_ALPHA,

    /// For the alpha component, always `1`. For the color components,
    /// `min(source.a, 1 - destination.a)` for all components.
    SrcAlphaSaturate = SRC_ALPHA_SATURATE,

    /// `source1` component-wise.
    Src1Color = SRC1_COLOR,

    /// `1 - source1` component-wise.
    OneMinusSrc1Color = ONE_MINUS_SRC1_COLOR,

    /// `source1.a` for all components.
    Src1Alpha = SRC1_ALPHA,

    /// `1 - source1.a` for all components.
    OneMinusSrc1Alpha = ONE_MINUS_SRC1_ALPHA,
}

vulkan_enum! {
    /// The arithmetic operation that is applied between the `source` and `destination` component
    /// values, after the appropriate `BlendFactor` is applied to both.
    BlendOp = BlendOp(i32);

    /// `source + destination`.
    Add = ADD,

    /// `source - destination`.
    Subtract = SUBTRACT,

    /// `destination - source`.
    ReverseSubtract = REVERSE_SUBTRACT,

    /// `min(source, destination)`.
    Min = MIN,

    /// `max(source, destination)`.
    Max = MAX,
}

impl Default for BlendOp {
    #[inline]
    fn default() -> Self {
        BlendOp::Add
    }
}

vulkan_bitflags! {
    /// A mask specifying color components that can be written to a framebuffer attachment.
    ColorComponents = ColorComponentFlags(u32);

    /// The red component.
    R = R,

    /// The green component.
    G = G,

    /// The blue component.
    B = B,

    /// The alpha component.
    A = A,
}

#[cfg(test)]
mod tests {
    use super::{BlendFactor, BlendOp, ColorBlendAttachmentState, ColorBlendState, ColorComponents};
    use crate::{DynamicState, DynamicStates};
    use ash::vk;

    fn attachment() -> vk::PipelineColorBlendAttachmentState {
        vk::PipelineColorBlendAttachmentState {
            blend_enable: vk::TRUE,
            src_color_blend_factor: vk::BlendFactor::SRC_ALPHA,
            dst_color_blend_factor: vk::BlendFactor::ONE_MINUS_SRC_ALPHA,
            color_blend_op: vk::BlendOp::ADD,
            src_alpha_blend_factor: vk::BlendFactor::ONE,
            dst_alpha_blend_factor: vk::BlendFactor::ZERO,
            alpha_blend_op: vk::BlendOp::MAX,
            color_write_mask: vk::ColorComponentFlags::R | vk::ColorComponentFlags::G,
        }
    }

    #[test]
    fn static_attachments() {
        let attachments = [attachment(), attachment()];
        let enables = [vk::TRUE, vk::FALSE];
        let mut color_write = vk::PipelineColorWriteCreateInfoEXT::default()
            .color_write_enables(&enables);
        let info = vk::PipelineColorBlendStateCreateInfo::default()
            .logic_op(vk::LogicOp::XOR)
            .attachments(&attachments)
            .blend_constants([0.25, 0.5, 0.75, 1.0])
            .push_next(&mut color_write);

        let state = unsafe { ColorBlendState::from_vk(DynamicStates::empty(), Some(&info)) };

        assert_eq!(state.attachment_count, 2);
        assert!(state.attachments[1].blend_enable);
        assert_eq!(state.attachments[0].src_color_blend_factor, BlendFactor::SrcAlpha);
        assert_eq!(state.attachments[0].alpha_blend_op, BlendOp::Max);
        assert_eq!(
            state.attachments[0].color_write_mask,
            ColorComponents::R | ColorComponents::G,
        );
        assert_eq!(state.attachments[2], ColorBlendAttachmentState::new());
        assert_eq!(state.blend_constants, [0.25, 0.5, 0.75, 1.0]);
        assert_eq!(state.color_write_enables, 0b1111_1101);
    }

    #[test]
    fn all_dynamic_attachments_not_read() {
        let dynamic = DynamicStates::from_vk(&[
            vk::DynamicState::COLOR_BLEND_ENABLE_EXT,
            vk::DynamicState::COLOR_BLEND_EQUATION_EXT,
            vk::DynamicState::COLOR_WRITE_MASK_EXT,
        ]);
        assert!(dynamic.contains(DynamicState::CbAttachmentCount));

        // A dangling attachment pointer must not be dereferenced.
        let info = vk::PipelineColorBlendStateCreateInfo {
            attachment_count: 2,
            p_attachments: std::ptr::NonNull::<vk::PipelineColorBlendAttachmentState>::dangling()
                .as_ptr()
                .cast_const(),
            ..Default::default()
        };

        let state = unsafe { ColorBlendState::from_vk(dynamic, Some(&info)) };
        assert_eq!(state.attachment_count, 2);
        assert_eq!(state.attachments[0], ColorBlendAttachmentState::new());
        assert_eq!(state.attachments[1].color_write_mask, ColorComponents::all());
    }

    #[test]
    fn partially_dynamic_attachments() {
        let attachments = [attachment()];
        let info = vk::PipelineColorBlendStateCreateInfo::default().attachments(&attachments);
        let dynamic = DynamicStates::from(DynamicState::CbBlendEnables)
            .with(DynamicState::CbBlendEquations);

        let state = unsafe { ColorBlendState::from_vk(dynamic, Some(&info)) };
        let attachment = state.attachments[0];
        assert!(!attachment.blend_enable);
        assert_eq!(attachment.src_color_blend_factor, BlendFactor::Zero);
        assert_eq!(
            attachment.color_write_mask,
            ColorComponents::R | ColorComponents::G,
        );
    }

    #[test]
    fn dynamic_write_enables() {
        let enables = [vk::FALSE; 3];
        let mut color_write = vk::PipelineColorWriteCreateInfoEXT::default()
            .color_write_enables(&enables);
        let info = vk::PipelineColorBlendStateCreateInfo::default().push_next(&mut color_write);
        let dynamic = DynamicStates::from(DynamicState::CbColorWriteEnables);

        let state = unsafe { ColorBlendState::from_vk(dynamic, Some(&info)) };
        assert_eq!(state.color_write_enables, u8::MAX);

        let state = unsafe { ColorBlendState::from_vk(DynamicStates::empty(), Some(&info)) };
        assert_eq!(state.color_write_enables, 0b1111_1000);
    }
}
