#![no_main]
#[macro_use] extern crate libfuzzer_sys;
extern crate bmp_filters;

use bmp_filters::{apply_filter, Filter, Preset};

fuzz_target!(|data: &[u8]| {
    if let Ok(mut image) = bmp_filters::decode(data) {
        let dimensions = image.dimensions();
        let delta = i32::from(data[data.len() - 1]) - 128;
        let filters = [
            Filter::Negative,
            Filter::Brightness(delta),
            Filter::Convolve(Preset::ALL[data.len() % Preset::ALL.len()]),
        ];
        for filter in filters.iter() {
            apply_filter(&mut image, filter).expect("depth independent filter");
        }
        assert_eq!(image.dimensions(), dimensions);
    }
});
