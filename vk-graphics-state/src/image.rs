// Copyright (c) 2026 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Attachment properties that graphics state depends on.

use crate::macros::{vulkan_bitflags, vulkan_enum};

vulkan_enum! {
    /// The number of samples per texel of an image.
    SampleCount = SampleCountFlags(u32);

    /// 1 sample per texel.
    Sample1 = TYPE_1,

    /// 2 samples per texel.
    Sample2 = TYPE_2,

    /// 4 samples per texel.
    Sample4 = TYPE_4,

    /// 8 samples per texel.
    Sample8 = TYPE_8,

    /// 16 samples per texel.
    Sample16 = TYPE_16,

    /// 32 samples per texel.
    Sample32 = TYPE_32,

    /// 64 samples per texel.
    Sample64 = TYPE_64,
}

impl Default for SampleCount {
    #[inline]
    fn default() -> Self {
        SampleCount::Sample1
    }
}

impl From<SampleCount> for u32 {
    #[inline]
    fn from(value: SampleCount) -> Self {
        value as u32
    }
}

vulkan_bitflags! {
    /// The aspects of the attachments used by a render pass.
    ImageAspects = ImageAspectFlags(u32);

    /// The color components of an image.
    COLOR = COLOR,

    /// The depth component.
    DEPTH = DEPTH,

    /// The stencil component.
    STENCIL = STENCIL,
}

#[cfg(test)]
mod tests {
    use super::{ImageAspects, SampleCount};
    use ash::vk;

    #[test]
    fn sample_count_values() {
        assert_eq!(u32::from(SampleCount::Sample8), 8);
        assert_eq!(
            SampleCount::try_from(vk::SampleCountFlags::TYPE_16),
            Ok(SampleCount::Sample16),
        );
        assert!(SampleCount::try_from(vk::SampleCountFlags::TYPE_4 | vk::SampleCountFlags::TYPE_8).is_err());
    }

    #[test]
    fn aspects_drop_unknown_bits() {
        let aspects = ImageAspects::from(vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::METADATA);
        assert_eq!(aspects, ImageAspects::DEPTH);
        assert_eq!(format!("{:?}", ImageAspects::COLOR | ImageAspects::STENCIL), "COLOR | STENCIL");
    }
}
