#[macro_use]
extern crate afl;
extern crate bmp_filters;

fn main() {
    fuzz!(|data: &[u8]| {
        let _ = bmp_filters::decode(data);
    });
}
