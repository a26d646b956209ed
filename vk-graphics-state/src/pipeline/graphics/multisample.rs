// Copyright (c) 2026 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Multisampling allows you to ask the GPU to run the rasterizer to generate more than one
//! sample per pixel.
//!
//! For example, if `rasterization_samples` is 1 then the fragment shader, depth test and stencil
//! test will be run once for each pixel. However if `rasterization_samples` is `n`, then the
//! GPU will pick `n` different locations within each pixel and assign to each of these locations
//! a different depth value. The depth and stencil test will then be run `n` times.
//!
//! Where these locations are depends on the [`SampleLocationsState`] in use. Unless custom
//! locations are requested, the standard locations of the Vulkan specification apply, and they
//! are available through [`SampleLocationsState::standard`].

use super::StateRef;
use crate::{
    chain::{find_struct, slice_from_raw},
    image::SampleCount,
    DynamicState, DynamicStates, OomError, MAX_SAMPLE_LOCATIONS,
};
use ash::vk;

/// State of the multisampling.
#[derive(Clone, Debug, PartialEq)]
pub struct MultisampleState<'a> {
    /// The number of rasterization samples.
    ///
    /// The default value is [`SampleCount::Sample1`].
    pub rasterization_samples: SampleCount,

    /// Whether the fragment shader runs once per sample instead of once per pixel.
    ///
    /// The default value is `false`.
    pub sample_shading_enable: bool,

    /// The minimum fraction of samples to run the fragment shader for, when sample shading is
    /// enabled.
    ///
    /// The default value is `0.0`.
    pub min_sample_shading: f32,

    /// A mask of bits that is ANDed with the coverage mask of each set of `rasterization_samples`
    /// samples. Only the first `rasterization_samples / 32` bits are used, the rest is ignored.
    ///
    /// The default value is `0xffff`.
    pub sample_mask: u16,

    /// Controls whether the alpha value of the fragment will be used in an implementation-defined
    /// way to determine which samples get disabled or not.
    ///
    /// The default value is `false`.
    pub alpha_to_coverage_enable: bool,

    /// Controls whether the alpha value of all the samples will be forced to 1.0 (or the maximum
    /// possible value) after the effects of `alpha_to_coverage` have been applied.
    ///
    /// The default value is `false`.
    pub alpha_to_one_enable: bool,

    /// Whether custom sample locations are used.
    ///
    /// The default value is `false`.
    pub sample_locations_enable: bool,

    /// The sample locations, if they are known when the pipeline is created.
    ///
    /// The default value is `None`.
    pub sample_locations: Option<StateRef<'a, SampleLocationsState>>,
}

impl Default for MultisampleState<'_> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> MultisampleState<'a> {
    /// Returns a `MultisampleState` with a single sample and no sample locations.
    #[inline]
    pub const fn new() -> Self {
        Self {
            rasterization_samples: SampleCount::Sample1,
            sample_shading_enable: false,
            min_sample_shading: 0.0,
            sample_mask: 0xffff,
            alpha_to_coverage_enable: false,
            alpha_to_one_enable: false,
            sample_locations_enable: false,
            sample_locations: None,
        }
    }

    /// Builds the state from `info`.
    ///
    /// Custom sample locations are handed to `store_sample_locations`, which puts them in storage
    /// that lives for `'a`. It is only called when custom locations are actually provided.
    ///
    /// # Safety
    ///
    /// - `info` must be a valid `VkPipelineMultisampleStateCreateInfo`, including its `pNext`
    ///   chain.
    ///
    /// # Panics
    ///
    /// - Panics if the custom sample locations don't match their grid, or if there are more than
    ///   [`MAX_SAMPLE_LOCATIONS`] of them.
    pub unsafe fn from_vk(
        dynamic: DynamicStates,
        info: Option<&vk::PipelineMultisampleStateCreateInfo<'_>>,
        store_sample_locations: impl FnOnce(
            SampleLocationsState,
        ) -> Result<StateRef<'a, SampleLocationsState>, OomError>,
    ) -> Result<Self, OomError> {
        let mut state = Self::new();
        let mut sample_locations_info = None;

        if let Some(info) = info {
            if !dynamic.contains(DynamicState::MsRasterizationSamples) {
                state.rasterization_samples = SampleCount::from_vk(info.rasterization_samples);
            }

            state.sample_shading_enable = info.sample_shading_enable != vk::FALSE;
            state.min_sample_shading = info.min_sample_shading;

            // A null sample mask is treated as all ones.
            if !dynamic.contains(DynamicState::MsSampleMask) && !info.p_sample_mask.is_null() {
                state.sample_mask = unsafe { *info.p_sample_mask } as u16;
            }

            if !dynamic.contains(DynamicState::MsAlphaToCoverageEnable) {
                state.alpha_to_coverage_enable = info.alpha_to_coverage_enable != vk::FALSE;
            }

            if !dynamic.contains(DynamicState::MsAlphaToOneEnable) {
                state.alpha_to_one_enable = info.alpha_to_one_enable != vk::FALSE;
            }

            sample_locations_info = unsafe {
                find_struct::<vk::PipelineSampleLocationsStateCreateInfoEXT<'_>>(info.p_next)
            };
        }

        if !dynamic.contains(DynamicState::MsSampleLocationsEnable) {
            state.sample_locations_enable = sample_locations_info
                .is_some_and(|sl_info| sl_info.sample_locations_enable != vk::FALSE);
        }

        if dynamic.contains(DynamicState::MsSampleLocations) {
            return Ok(state);
        }

        let custom_locations = dynamic.contains(DynamicState::MsSampleLocationsEnable)
            || state.sample_locations_enable;

        match sample_locations_info {
            Some(sl_info) if custom_locations => {
                let locations =
                    unsafe { SampleLocationsState::from_vk(&sl_info.sample_locations_info) };
                state.sample_locations = Some(store_sample_locations(locations)?);
            }
            _ if !dynamic.contains(DynamicState::MsRasterizationSamples) => {
                state.sample_locations = Some(StateRef::Borrowed(SampleLocationsState::standard(
                    state.rasterization_samples,
                )));
            }
            _ => (),
        }

        Ok(state)
    }

    /// Returns whether `sample_locations` would have to be stored outside of the standard
    /// tables when building from `info`.
    ///
    /// # Safety
    ///
    /// - `info` must be a valid `VkPipelineMultisampleStateCreateInfo`, including its `pNext`
    ///   chain.
    pub(crate) unsafe fn needs_sample_locations_storage(
        dynamic: DynamicStates,
        info: Option<&vk::PipelineMultisampleStateCreateInfo<'_>>,
    ) -> bool {
        if dynamic.contains(DynamicState::MsSampleLocations) {
            return false;
        }

        let sample_locations_info = info.and_then(|info| unsafe {
            find_struct::<vk::PipelineSampleLocationsStateCreateInfoEXT<'_>>(info.p_next)
        });

        match sample_locations_info {
            Some(sl_info) => {
                dynamic.contains(DynamicState::MsSampleLocationsEnable)
                    || sl_info.sample_locations_enable != vk::FALSE
            }
            None => false,
        }
    }
}

/// A set of sample locations, repeated over a grid of pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampleLocationsState {
    /// The number of samples per pixel.
    ///
    /// The default value is [`SampleCount::Sample1`].
    pub per_pixel: SampleCount,

    /// The size of the pixel grid that the locations are defined over.
    ///
    /// The default value is `[1, 1]`.
    pub grid_size: [u32; 2],

    /// The locations, `per_pixel` for each pixel of the grid in row-major order.
    pub locations: [SampleLocation; MAX_SAMPLE_LOCATIONS],
}

impl Default for SampleLocationsState {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl SampleLocationsState {
    /// Returns a `SampleLocationsState` with a single sample and all locations at the origin.
    #[inline]
    pub const fn new() -> Self {
        Self {
            per_pixel: SampleCount::Sample1,
            grid_size: [1, 1],
            locations: [SampleLocation::new(0.0, 0.0); MAX_SAMPLE_LOCATIONS],
        }
    }

    /// Builds the state from custom sample locations.
    ///
    /// # Safety
    ///
    /// - `info` must be a valid `VkSampleLocationsInfoEXT`.
    ///
    /// # Panics
    ///
    /// - Panics if the number of locations doesn't match the grid, or is greater than
    ///   [`MAX_SAMPLE_LOCATIONS`].
    pub unsafe fn from_vk(info: &vk::SampleLocationsInfoEXT<'_>) -> Self {
        let per_pixel = SampleCount::from_vk(info.sample_locations_per_pixel);
        let grid_size = [
            info.sample_location_grid_size.width,
            info.sample_location_grid_size.height,
        ];

        assert_eq!(
            info.sample_locations_count,
            u32::from(per_pixel) * grid_size[0] * grid_size[1],
            "the sample location count doesn't match the sample location grid",
        );
        assert!(info.sample_locations_count as usize <= MAX_SAMPLE_LOCATIONS);

        let mut state = Self {
            per_pixel,
            grid_size,
            ..Self::new()
        };

        let locations =
            unsafe { slice_from_raw(info.p_sample_locations, info.sample_locations_count) };

        for (dst, src) in state.locations.iter_mut().zip(locations) {
            *dst = SampleLocation::new(src.x, src.y);
        }

        state
    }

    /// Returns the standard sample locations for `samples`, defined over a 1x1 grid.
    ///
    /// # Panics
    ///
    /// - Panics if `samples` is greater than [`SampleCount::Sample16`], which has no standard
    ///   locations.
    pub fn standard(samples: SampleCount) -> &'static Self {
        match samples {
            SampleCount::Sample1 => &STANDARD_1X,
            SampleCount::Sample2 => &STANDARD_2X,
            SampleCount::Sample4 => &STANDARD_4X,
            SampleCount::Sample8 => &STANDARD_8X,
            SampleCount::Sample16 => &STANDARD_16X,
            SampleCount::Sample32 | SampleCount::Sample64 => {
                panic!("there are no standard sample locations for {:?}", samples)
            }
        }
    }

    /// Returns the locations that are in use.
    #[inline]
    pub fn valid_locations(&self) -> &[SampleLocation] {
        let count = u32::from(self.per_pixel) * self.grid_size[0] * self.grid_size[1];

        &self.locations[..count as usize]
    }

    const fn standard_table(per_pixel: SampleCount, table: &[[f32; 2]]) -> Self {
        let mut state = Self::new();
        state.per_pixel = per_pixel;

        let mut i = 0;
        while i < table.len() {
            state.locations[i] = SampleLocation::new(table[i][0], table[i][1]);
            i += 1;
        }

        state
    }
}

/// The position of a sample within a pixel, where `(0.0, 0.0)` is the top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SampleLocation {
    pub x: f32,
    pub y: f32,
}

impl SampleLocation {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

static STANDARD_1X: SampleLocationsState =
    SampleLocationsState::standard_table(SampleCount::Sample1, &[[0.5, 0.5]]);

static STANDARD_2X: SampleLocationsState = SampleLocationsState::standard_table(
    SampleCount::Sample2,
    &[[0.75, 0.75], [0.25, 0.25]],
);

static STANDARD_4X: SampleLocationsState = SampleLocationsState::standard_table(
    SampleCount::Sample4,
    &[
        [0.375, 0.125],
        [0.875, 0.375],
        [0.125, 0.625],
        [0.625, 0.875],
    ],
);

static STANDARD_8X: SampleLocationsState = SampleLocationsState::standard_table(
    SampleCount::Sample8,
    &[
        [0.5625, 0.3125],
        [0.4375, 0.6875],
        [0.8125, 0.5625],
        [0.3125, 0.1875],
        [0.1875, 0.8125],
        [0.0625, 0.4375],
        [0.6875, 0.9375],
        [0.9375, 0.0625],
    ],
);

static STANDARD_16X: SampleLocationsState = SampleLocationsState::standard_table(
    SampleCount::Sample16,
    &[
        [0.5625, 0.5625],
        [0.4375, 0.3125],
        [0.3125, 0.625],
        [0.75, 0.4375],
        [0.1875, 0.375],
        [0.625, 0.8125],
        [0.8125, 0.6875],
        [0.6875, 0.1875],
        [0.375, 0.875],
        [0.5, 0.0625],
        [0.25, 0.125],
        [0.125, 0.75],
        [0.0, 0.5],
        [0.9375, 0.25],
        [0.875, 0.9375],
        [0.0625, 0.0],
    ],
);

#[cfg(test)]
mod tests {
    use super::{MultisampleState, SampleLocation, SampleLocationsState};
    use crate::{
        image::SampleCount, pipeline::graphics::StateRef, DynamicState, DynamicStates, OomError,
    };
    use ash::vk;
    use std::sync::Arc;

    fn store(
        locations: SampleLocationsState,
    ) -> Result<StateRef<'static, SampleLocationsState>, OomError> {
        Ok(StateRef::Owned(Arc::new(locations)))
    }

    fn no_storage(
        _locations: SampleLocationsState,
    ) -> Result<StateRef<'static, SampleLocationsState>, OomError> {
        panic!("sample locations storage was not expected")
    }

    #[test]
    fn standard_tables() {
        for samples in [
            SampleCount::Sample1,
            SampleCount::Sample2,
            SampleCount::Sample4,
            SampleCount::Sample8,
            SampleCount::Sample16,
        ] {
            let state = SampleLocationsState::standard(samples);
            assert_eq!(state.per_pixel, samples);
            assert_eq!(state.grid_size, [1, 1]);
            assert_eq!(state.valid_locations().len(), u32::from(samples) as usize);
        }

        let state = SampleLocationsState::standard(SampleCount::Sample4);
        assert_eq!(state.locations[1], SampleLocation::new(0.875, 0.375));
        assert_eq!(state.locations[4], SampleLocation::new(0.0, 0.0));

        let state = SampleLocationsState::standard(SampleCount::Sample16);
        assert_eq!(state.locations[15], SampleLocation::new(0.0625, 0.0));
    }

    #[test]
    fn null_info() {
        let state =
            unsafe { MultisampleState::from_vk(DynamicStates::empty(), None, no_storage) }.unwrap();

        assert_eq!(state.rasterization_samples, SampleCount::Sample1);
        assert_eq!(state.sample_mask, 0xffff);
        assert_eq!(
            state.sample_locations.as_deref(),
            Some(SampleLocationsState::standard(SampleCount::Sample1)),
        );
    }

    #[test]
    fn sample_mask() {
        let mask = [0b1010];
        let info = vk::PipelineMultisampleStateCreateInfo::default()
            .rasterization_samples(vk::SampleCountFlags::TYPE_4)
            .sample_mask(&mask)
            .alpha_to_coverage_enable(true);

        let state =
            unsafe { MultisampleState::from_vk(DynamicStates::empty(), Some(&info), no_storage) }
                .unwrap();
        assert_eq!(state.rasterization_samples, SampleCount::Sample4);
        assert_eq!(state.sample_mask, 0b1010);
        assert!(state.alpha_to_coverage_enable);
        assert_eq!(
            state.sample_locations.as_deref(),
            Some(SampleLocationsState::standard(SampleCount::Sample4)),
        );
    }

    #[test]
    fn dynamic_samples_leave_locations_unset() {
        let info = vk::PipelineMultisampleStateCreateInfo::default()
            .rasterization_samples(vk::SampleCountFlags::TYPE_4);
        let dynamic = DynamicStates::from(DynamicState::MsRasterizationSamples);

        let state = unsafe { MultisampleState::from_vk(dynamic, Some(&info), no_storage) }.unwrap();
        assert_eq!(state.rasterization_samples, SampleCount::Sample1);
        assert!(state.sample_locations.is_none());
    }

    #[test]
    fn custom_locations() {
        let locations = [
            vk::SampleLocationEXT { x: 0.25, y: 0.5 },
            vk::SampleLocationEXT { x: 0.75, y: 0.5 },
            vk::SampleLocationEXT { x: 0.25, y: 0.25 },
            vk::SampleLocationEXT { x: 0.75, y: 0.25 },
        ];
        let sample_locations_info = vk::SampleLocationsInfoEXT::default()
            .sample_locations_per_pixel(vk::SampleCountFlags::TYPE_2)
            .sample_location_grid_size(vk::Extent2D {
                width: 2,
                height: 1,
            })
            .sample_locations(&locations);
        let mut sl_info = vk::PipelineSampleLocationsStateCreateInfoEXT::default()
            .sample_locations_enable(true)
            .sample_locations_info(sample_locations_info);
        let info = vk::PipelineMultisampleStateCreateInfo::default()
            .rasterization_samples(vk::SampleCountFlags::TYPE_2)
            .push_next(&mut sl_info);

        assert!(unsafe {
            MultisampleState::needs_sample_locations_storage(DynamicStates::empty(), Some(&info))
        });

        let state =
            unsafe { MultisampleState::from_vk(DynamicStates::empty(), Some(&info), store) }
                .unwrap();
        assert!(state.sample_locations_enable);

        let sample_locations = state.sample_locations.unwrap();
        assert_eq!(sample_locations.per_pixel, SampleCount::Sample2);
        assert_eq!(sample_locations.grid_size, [2, 1]);
        assert_eq!(sample_locations.valid_locations().len(), 4);
        assert_eq!(sample_locations.locations[1], SampleLocation::new(0.75, 0.5));

        // Dynamic locations are never stored.
        let dynamic = DynamicStates::from(DynamicState::MsSampleLocations);
        assert!(!unsafe { MultisampleState::needs_sample_locations_storage(dynamic, Some(&info)) });
        let state = unsafe { MultisampleState::from_vk(dynamic, Some(&info), no_storage) }.unwrap();
        assert!(state.sample_locations.is_none());
    }

    #[test]
    fn storage_failure() {
        let locations = [vk::SampleLocationEXT { x: 0.5, y: 0.5 }];
        let sample_locations_info = vk::SampleLocationsInfoEXT::default()
            .sample_locations_per_pixel(vk::SampleCountFlags::TYPE_1)
            .sample_location_grid_size(vk::Extent2D {
                width: 1,
                height: 1,
            })
            .sample_locations(&locations);
        let mut sl_info = vk::PipelineSampleLocationsStateCreateInfoEXT::default()
            .sample_locations_info(sample_locations_info);
        let info = vk::PipelineMultisampleStateCreateInfo::default()
            .rasterization_samples(vk::SampleCountFlags::TYPE_1)
            .push_next(&mut sl_info);
        let dynamic = DynamicStates::from(DynamicState::MsSampleLocationsEnable);

        let result = unsafe {
            MultisampleState::from_vk(dynamic, Some(&info), |_| Err(OomError::OutOfHostMemory))
        };
        assert_eq!(result, Err(OomError::OutOfHostMemory));
    }

    #[test]
    fn mismatched_grid() {
        let locations = [vk::SampleLocationEXT { x: 0.5, y: 0.5 }; 3];
        let info = vk::SampleLocationsInfoEXT::default()
            .sample_locations_per_pixel(vk::SampleCountFlags::TYPE_2)
            .sample_location_grid_size(vk::Extent2D {
                width: 1,
                height: 1,
            })
            .sample_locations(&locations);

        assert_should_panic!("doesn't match the sample location grid", {
            unsafe { SampleLocationsState::from_vk(&info) };
        });
    }
}
