#![no_main]
#[macro_use] extern crate libfuzzer_sys;
extern crate bmp_filters;

fuzz_target!(|data: &[u8]| {
    if let Ok(image) = bmp_filters::decode(data) {
        let bytes = bmp_filters::encode(&image).expect("decoded images encode");
        let again = bmp_filters::decode(&bytes).expect("encoded images decode");
        assert_eq!(image.dimensions(), again.dimensions());
    }
});
