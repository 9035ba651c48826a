#[macro_use]
extern crate afl;
extern crate na_world_fuzz;

fn main() {
    fuzz!(|data: &[u8]| {
        na_world_fuzz::test(data);
    });
}
